//! Generation stages: the capability set the orchestrator composes, plus entry hooks.

use crate::error::PipelineError;
use crate::orchestrator::context::GenerationContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three specialised generation stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Breaks the problem into solution steps.
    Decomposer,
    /// Turns the steps into a narrated scene script.
    Scripter,
    /// Writes the scene source for the renderer.
    CodeAuthor,
}

impl StageKind {
    pub const ALL: [StageKind; 3] = [
        StageKind::Decomposer,
        StageKind::Scripter,
        StageKind::CodeAuthor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Decomposer => "decomposer",
            StageKind::Scripter => "scripter",
            StageKind::CodeAuthor => "code_author",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait Decomposer: Send + Sync {
    async fn decompose(&self, ctx: &GenerationContext) -> Result<String, PipelineError>;
}

#[async_trait]
pub trait Scripter: Send + Sync {
    async fn script(&self, ctx: &GenerationContext, breakdown: &str) -> Result<String, PipelineError>;
}

#[async_trait]
pub trait CodeAuthor: Send + Sync {
    /// Raw model output; expected to hold exactly one fenced code block.
    async fn author(
        &self,
        ctx: &GenerationContext,
        breakdown: &str,
        script: &str,
    ) -> Result<String, PipelineError>;
}

/// Observes stage boundaries for diagnostics.
pub trait StageHook: Send + Sync {
    fn on_stage_enter(&self, stage: StageKind, attempt: u32);

    fn on_stage_complete(&self, _stage: StageKind, _attempt: u32, _output: &str) {}
}

/// Logs every stage entry and completion.
pub struct TracingHook;

impl StageHook for TracingHook {
    fn on_stage_enter(&self, stage: StageKind, attempt: u32) {
        tracing::info!(stage = %stage, attempt, "Stage invoked");
    }

    fn on_stage_complete(&self, stage: StageKind, attempt: u32, output: &str) {
        tracing::info!(stage = %stage, attempt, chars = output.len(), "Stage responded");
    }
}
