//! Agent configuration schema.

use crate::orchestrator::stages::StageKind;
use crate::provider::{CompletionOptions, ProviderConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One generation stage bound to a provider and a system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique agent identifier
    pub agent_id: String,

    /// Stage this agent fills
    pub stage: StageKind,

    /// Key into the `[providers]` table
    pub provider_name: String,

    /// Inline system prompt; the built-in default is used when neither this nor
    /// `system_prompt_path` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Prompt template file, absolute, `~/`-prefixed, or relative to the workspace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_path: Option<String>,

    /// Overrides the provider's default completion options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<CompletionOptions>,
}

impl AgentConfig {
    pub fn validate(&self, providers: &HashMap<String, ProviderConfig>) -> Result<(), String> {
        if self.agent_id.trim().is_empty() {
            return Err("agent_id cannot be empty".to_string());
        }
        if !providers.contains_key(&self.provider_name) {
            return Err(format!("Unknown provider '{}'", self.provider_name));
        }
        if self.system_prompt.is_some() && self.system_prompt_path.is_some() {
            return Err("Set system_prompt or system_prompt_path, not both".to_string());
        }
        if matches!(&self.system_prompt, Some(p) if p.trim().is_empty()) {
            return Err("system_prompt cannot be empty".to_string());
        }
        Ok(())
    }
}
