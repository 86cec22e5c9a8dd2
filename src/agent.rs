//! Stage agents
//!
//! Configured generation stages backed by a model provider. An [`LlmStage`] fills any of
//! the three orchestrator capabilities; its `stage` decides which one the orchestrator
//! wires it into.

pub mod profile;
pub mod prompt;

pub use profile::AgentConfig;
pub use prompt::{default_system_prompt, load_prompt_template, render_user_prompt, resolve_prompt_path};

use crate::error::PipelineError;
use crate::orchestrator::context::GenerationContext;
use crate::orchestrator::stages::{CodeAuthor, Decomposer, Scripter, StageKind};
use crate::orchestrator::Orchestrator;
use crate::provider::{ChatMessage, CompletionOptions, ModelProviderClient, ProviderRegistry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub struct LlmStage {
    agent_id: String,
    stage: StageKind,
    client: Arc<dyn ModelProviderClient>,
    system_prompt: String,
    options: CompletionOptions,
}

impl LlmStage {
    pub fn new(
        agent_id: impl Into<String>,
        stage: StageKind,
        client: Arc<dyn ModelProviderClient>,
        system_prompt: impl Into<String>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            stage,
            client,
            system_prompt: system_prompt.into(),
            options,
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn stage(&self) -> StageKind {
        self.stage
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    async fn ask(
        &self,
        ctx: &GenerationContext,
        breakdown: Option<&str>,
        script: Option<&str>,
    ) -> Result<String, PipelineError> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(render_user_prompt(self.stage, ctx, breakdown, script)),
        ];
        let response = self.client.complete(messages, self.options.clone()).await?;
        tracing::debug!(
            agent_id = %self.agent_id,
            provider = self.client.provider_name(),
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            "Completion received"
        );
        Ok(response.content)
    }
}

#[async_trait]
impl Decomposer for LlmStage {
    async fn decompose(&self, ctx: &GenerationContext) -> Result<String, PipelineError> {
        self.ask(ctx, None, None).await
    }
}

#[async_trait]
impl Scripter for LlmStage {
    async fn script(&self, ctx: &GenerationContext, breakdown: &str) -> Result<String, PipelineError> {
        self.ask(ctx, Some(breakdown), None).await
    }
}

#[async_trait]
impl CodeAuthor for LlmStage {
    async fn author(
        &self,
        ctx: &GenerationContext,
        breakdown: &str,
        script: &str,
    ) -> Result<String, PipelineError> {
        self.ask(ctx, Some(breakdown), Some(script)).await
    }
}

/// Build one [`LlmStage`] from its config.
pub fn build_stage(
    agent: &AgentConfig,
    providers: &ProviderRegistry,
    workspace_root: &Path,
    scene_name: &str,
) -> Result<LlmStage, PipelineError> {
    let provider = providers.get_or_error(&agent.provider_name)?;
    let client = providers.create_client(&agent.provider_name)?;

    let system_prompt = match (&agent.system_prompt, &agent.system_prompt_path) {
        (Some(inline), _) => inline.replace("{scene_name}", scene_name),
        (None, Some(path)) => {
            load_prompt_template(&resolve_prompt_path(path, workspace_root), scene_name)?
        }
        (None, None) => default_system_prompt(agent.stage, scene_name),
    };
    let options = agent
        .options
        .clone()
        .unwrap_or_else(|| provider.default_options.clone());

    Ok(LlmStage::new(
        agent.agent_id.clone(),
        agent.stage,
        client,
        system_prompt,
        options,
    ))
}

/// Wire one configured agent per stage into an orchestrator.
pub fn build_orchestrator(
    agents: &HashMap<String, AgentConfig>,
    providers: &ProviderRegistry,
    workspace_root: &Path,
    scene_name: &str,
) -> Result<Orchestrator, PipelineError> {
    let mut by_stage: HashMap<StageKind, Arc<LlmStage>> = HashMap::new();
    // Sorted so a duplicate stage always reports the same pair.
    let mut names: Vec<&String> = agents.keys().collect();
    names.sort();
    for name in names {
        let agent = &agents[name];
        let stage = Arc::new(build_stage(agent, providers, workspace_root, scene_name)?);
        if let Some(existing) = by_stage.insert(agent.stage, stage) {
            return Err(PipelineError::ConfigError(format!(
                "Stage {} is assigned to both '{}' and '{}'",
                agent.stage,
                existing.agent_id(),
                agent.agent_id
            )));
        }
    }

    let take = |stage: StageKind| {
        by_stage.get(&stage).cloned().ok_or_else(|| {
            PipelineError::ConfigError(format!("No agent configured for stage {}", stage))
        })
    };

    Ok(Orchestrator::new(
        take(StageKind::Decomposer)?,
        take(StageKind::Scripter)?,
        take(StageKind::CodeAuthor)?,
    ))
}
