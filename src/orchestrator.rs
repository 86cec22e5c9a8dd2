//! Orchestrator: delegates a problem through decomposition, scripting, and code authoring.
//!
//! Each stage sees the outputs of the stages before it. Completion of the code-author stage
//! hands its raw output to the compile chain exactly once per round.

pub mod context;
pub mod stages;

pub use context::{FailureKind, GenerationContext, RepairNote, RepairPolicy};
pub use stages::{CodeAuthor, Decomposer, Scripter, StageHook, StageKind, TracingHook};

use crate::artifact::registry::RunId;
use crate::artifact::resolver::ResolvedVideo;
use crate::error::PipelineError;
use crate::pipeline::compile::CompileChain;
use crate::pipeline::state::{PipelineState, StateObserver};
use crate::session::Session;
use std::sync::Arc;

pub struct Orchestrator {
    decomposer: Arc<dyn Decomposer>,
    scripter: Arc<dyn Scripter>,
    code_author: Arc<dyn CodeAuthor>,
    hooks: Vec<Arc<dyn StageHook>>,
}

impl Orchestrator {
    pub fn new(
        decomposer: Arc<dyn Decomposer>,
        scripter: Arc<dyn Scripter>,
        code_author: Arc<dyn CodeAuthor>,
    ) -> Self {
        Self {
            decomposer,
            scripter,
            code_author,
            hooks: vec![Arc::new(TracingHook)],
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn StageHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// One full delegation round followed by a single compile of the code-author output.
    pub async fn run_round(
        &self,
        session: &mut Session,
        ctx: &GenerationContext,
        chain: &dyn CompileChain,
        observer: &dyn StateObserver,
    ) -> Result<ResolvedVideo, PipelineError> {
        observer.enter(PipelineState::Generating);
        let attempt = ctx.attempt;

        self.enter(StageKind::Decomposer, attempt);
        let breakdown = self.decomposer.decompose(ctx).await?;
        self.complete(session, StageKind::Decomposer, attempt, &breakdown)?;

        self.enter(StageKind::Scripter, attempt);
        let script = self.scripter.script(ctx, &breakdown).await?;
        self.complete(session, StageKind::Scripter, attempt, &script)?;

        self.enter(StageKind::CodeAuthor, attempt);
        let raw = self.code_author.author(ctx, &breakdown, &script).await?;
        self.complete(session, StageKind::CodeAuthor, attempt, &raw)?;

        let run_id = RunId::new();
        session.attach_run(attempt, StageKind::CodeAuthor, run_id);
        chain.compile(run_id, &raw, observer).await
    }

    fn enter(&self, stage: StageKind, attempt: u32) {
        for hook in &self.hooks {
            hook.on_stage_enter(stage, attempt);
        }
    }

    fn complete(
        &self,
        session: &mut Session,
        stage: StageKind,
        attempt: u32,
        output: &str,
    ) -> Result<(), PipelineError> {
        if output.trim().is_empty() {
            return Err(PipelineError::EmptyStageOutput(stage.to_string()));
        }
        session.record(attempt, stage, output);
        for hook in &self.hooks {
            hook.on_stage_complete(stage, attempt, output);
        }
        Ok(())
    }
}
