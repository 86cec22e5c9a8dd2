//! Configuration System
//!
//! Layered configuration: built-in defaults, the global file, workspace files, then
//! `SCENESMITH__`-prefixed environment variables. Validation collects every problem instead
//! of stopping at the first.

use crate::logging::LoggingConfig;
use crate::pipeline::repair::RepairConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub use crate::agent::AgentConfig;
pub use crate::provider::{ProviderConfig, ProviderType};

mod facade;
mod merge;
mod sections;
mod sources;

pub use facade::ConfigLoader;
pub use sections::{output_contract, render_settings, RenderConfig, StorageConfig};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenesmithConfig {
    /// Model provider configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Stage agent definitions
    #[serde(default)]
    pub agents: HashMap<String, AgentConfig>,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub repair: RepairConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Provider(String, String),
    Agent(String, String),
    Render(String),
    Storage(String),
    Repair(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Provider(name, msg) => write!(f, "Provider '{}': {}", name, msg),
            ValidationError::Agent(name, msg) => write!(f, "Agent '{}': {}", name, msg),
            ValidationError::Render(msg) => write!(f, "Render: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
            ValidationError::Repair(msg) => write!(f, "Repair: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ScenesmithConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let mut provider_names: Vec<&String> = self.providers.keys().collect();
        provider_names.sort();
        for name in provider_names {
            if let Err(e) = self.providers[name].validate() {
                errors.push(ValidationError::Provider(name.clone(), e));
            }
        }

        let mut agent_names: Vec<&String> = self.agents.keys().collect();
        agent_names.sort();
        let mut agent_ids: HashMap<&str, &str> = HashMap::new();
        let mut stages = HashMap::new();
        for name in agent_names {
            let agent = &self.agents[name];
            if let Err(e) = agent.validate(&self.providers) {
                errors.push(ValidationError::Agent(name.clone(), e));
            }
            if let Some(existing) = agent_ids.insert(agent.agent_id.as_str(), name.as_str()) {
                errors.push(ValidationError::Agent(
                    name.clone(),
                    format!(
                        "Duplicate agent_id '{}' (also defined in '{}')",
                        agent.agent_id, existing
                    ),
                ));
            }
            if let Some(existing) = stages.insert(agent.stage, name.as_str()) {
                errors.push(ValidationError::Agent(
                    name.clone(),
                    format!("Stage {} is already assigned to '{}'", agent.stage, existing),
                ));
            }
        }

        if let Err(e) = self.render.validate() {
            errors.push(ValidationError::Render(e));
        }
        if let Err(e) = self.storage.validate() {
            errors.push(ValidationError::Storage(e));
        }
        if self.repair.max_attempts == 0 {
            errors.push(ValidationError::Repair(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.repair.max_feedback_chars == 0 {
            errors.push(ValidationError::Repair(
                "max_feedback_chars must be greater than zero".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
