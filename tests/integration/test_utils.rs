//! Shared test utilities for integration tests
//!
//! Scripted model clients, a renderer double that writes where the real renderer would,
//! deterministic namers, and XDG isolation for config tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use scenesmith::agent::LlmStage;
use scenesmith::artifact::{Identifier, Namer, OutputContract, SourceArtifact};
use scenesmith::config::{output_contract, ScenesmithConfig};
use scenesmith::error::PipelineError;
use scenesmith::orchestrator::{Orchestrator, StageKind};
use scenesmith::pipeline::{build_compiler, Compiler, RepairConfig, ScenePipeline};
use scenesmith::provider::{
    ChatMessage, CompletionOptions, CompletionResponse, ModelProviderClient, TokenUsage,
};
use scenesmith::render::{RenderResult, Renderer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Global mutex to serialize XDG environment variable access across all tests
static XDG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    home: Option<String>,
    xdg_config_home: Option<String>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
        }
    }

    fn restore(self) {
        match self.home {
            Some(orig) => std::env::set_var("HOME", orig),
            None => std::env::remove_var("HOME"),
        }
        match self.xdg_config_home {
            Some(orig) => std::env::set_var("XDG_CONFIG_HOME", orig),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME inside `test_dir`, restoring both afterwards.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = XDG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_home = test_dir.path().join("home");
    std::fs::create_dir_all(&test_home).unwrap();
    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_dir.path().to_str().unwrap());

    let result = f();
    env_state.restore();
    result
}

/// Model client that replays canned replies and records every user prompt it saw.
pub struct ScriptedClient {
    replies: Vec<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl ModelProviderClient for ScriptedClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, PipelineError> {
        let user = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        let mut prompts = self.prompts.lock();
        let index = prompts.len().min(self.replies.len().saturating_sub(1));
        prompts.push(user);
        let content = self.replies.get(index).cloned().unwrap_or_default();
        Ok(CompletionResponse {
            content,
            model: "scripted".to_string(),
            usage: TokenUsage {
                prompt_tokens: 0,
                completion_tokens: 0,
                total_tokens: 0,
            },
            finish_reason: Some("stop".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Hands out a fixed list of identifiers in order, then falls back to random ones.
pub struct SequenceNamer {
    queue: Mutex<Vec<Identifier>>,
}

impl SequenceNamer {
    pub fn new(ids: &[&str]) -> Arc<Self> {
        let mut queue: Vec<Identifier> = ids.iter().map(|id| Identifier::parse(id).unwrap()).collect();
        queue.reverse();
        Arc::new(Self {
            queue: Mutex::new(queue),
        })
    }
}

impl Namer for SequenceNamer {
    fn next_identifier(&self) -> Identifier {
        self.queue.lock().pop().unwrap_or_else(Identifier::generate)
    }
}

/// Renderer double: writes `video:<source text>` at the contract path after `delay`.
/// The first `failures` calls exit nonzero with a traceback naming the call number.
pub struct FakeRenderer {
    contract: OutputContract,
    delay: Duration,
    failures: usize,
    calls: Mutex<usize>,
}

impl FakeRenderer {
    pub fn new(contract: OutputContract) -> Self {
        Self {
            contract,
            delay: Duration::ZERO,
            failures: 0,
            calls: Mutex::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_first(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render(&self, source: &SourceArtifact) -> Result<RenderResult, PipelineError> {
        let call = {
            let mut calls = self.calls.lock();
            *calls += 1;
            *calls
        };
        tokio::time::sleep(self.delay).await;
        if call <= self.failures {
            return Err(PipelineError::Render {
                exit_status: 1,
                stderr: format!("Traceback (most recent call last):\nNameError on render {call}"),
            });
        }
        let path = self.contract.video_path(&source.identifier);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, format!("video:{}", source.text)).unwrap();
        Ok(RenderResult {
            success: true,
            exit_status: 0,
            stdout: String::new(),
            stderr: String::new(),
            elapsed: self.delay,
        })
    }
}

/// Output contract with storage paths resolved against `workspace`.
pub fn contract_for(config: &ScenesmithConfig, workspace: &Path) -> OutputContract {
    output_contract(&config.render, &config.storage.resolve_paths(workspace))
}

pub fn compiler(
    config: &ScenesmithConfig,
    workspace: &Path,
    renderer: Arc<dyn Renderer>,
    namer: Arc<dyn Namer>,
) -> Compiler {
    build_compiler(config, workspace, renderer, namer)
}

/// Orchestrator whose decomposer and scripter echo fixed text and whose code author
/// replays `code_client`.
pub fn orchestrator(code_client: Arc<ScriptedClient>) -> Orchestrator {
    let options = CompletionOptions::default();
    let decomposer = LlmStage::new(
        "math",
        StageKind::Decomposer,
        ScriptedClient::new(&["1. area = pi r^2"]),
        "decompose",
        options.clone(),
    );
    let scripter = LlmStage::new(
        "script",
        StageKind::Scripter,
        ScriptedClient::new(&["Show a circle, then the formula."]),
        "script",
        options.clone(),
    );
    let author = LlmStage::new("video", StageKind::CodeAuthor, code_client, "author", options);
    Orchestrator::new(Arc::new(decomposer), Arc::new(scripter), Arc::new(author))
}

pub fn pipeline(
    config: &ScenesmithConfig,
    workspace: &Path,
    code_client: Arc<ScriptedClient>,
    renderer: Arc<dyn Renderer>,
    namer: Arc<dyn Namer>,
    repair: RepairConfig,
) -> ScenePipeline {
    ScenePipeline::new(
        orchestrator(code_client),
        Arc::new(compiler(config, workspace, renderer, namer)),
        repair,
    )
}

/// Fenced answer the code author would return.
pub fn fenced(body: &str) -> String {
    format!("```python\n{}\n```", body)
}

pub fn source_path(workspace: &Path, id: &str) -> PathBuf {
    workspace.join("manim/scripts").join(format!("{id}.py"))
}
