//! Repair loop: bounded retries that feed each failure back into the next generation round.

use crate::artifact::resolver::ResolvedVideo;
use crate::error::PipelineError;
use crate::orchestrator::context::{FailureKind, GenerationContext, RepairPolicy};
use crate::orchestrator::Orchestrator;
use crate::pipeline::compile::CompileChain;
use crate::pipeline::state::{PipelineState, StateObserver};
use crate::session::{Session, SessionStatus};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    pub max_attempts: u32,
    pub policy: RepairPolicy,
    pub max_feedback_chars: usize,
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            policy: RepairPolicy::RetainAll,
            max_feedback_chars: 4000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub attempt: u32,
    pub state: PipelineState,
    pub at: DateTime<Utc>,
}

/// Every state transition of one pipeline run, in order.
#[derive(Debug, Default)]
pub struct RepairTrace {
    entries: Mutex<Vec<TraceEntry>>,
}

impl RepairTrace {
    fn push(&self, attempt: u32, state: PipelineState) {
        self.entries.lock().push(TraceEntry {
            attempt,
            state,
            at: Utc::now(),
        });
    }

    pub fn into_entries(self) -> Vec<TraceEntry> {
        self.entries.into_inner()
    }
}

struct AttemptObserver<'a> {
    trace: &'a RepairTrace,
    attempt: u32,
}

impl StateObserver for AttemptObserver<'_> {
    fn enter(&self, state: PipelineState) {
        tracing::debug!(attempt = self.attempt, state = %state, "Pipeline transition");
        self.trace.push(self.attempt, state);
    }
}

/// Result of a pipeline run with everything needed to explain it.
#[derive(Debug)]
pub struct PipelineReport {
    pub outcome: Result<ResolvedVideo, PipelineError>,
    pub attempts: u32,
    pub trace: Vec<TraceEntry>,
    pub session: Session,
}

impl PipelineReport {
    pub fn into_result(self) -> Result<ResolvedVideo, PipelineError> {
        self.outcome
    }

    pub fn states(&self) -> Vec<PipelineState> {
        self.trace.iter().map(|e| e.state).collect()
    }
}

pub struct RepairLoop {
    orchestrator: Arc<Orchestrator>,
    chain: Arc<dyn CompileChain>,
    config: RepairConfig,
}

impl RepairLoop {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        chain: Arc<dyn CompileChain>,
        config: RepairConfig,
    ) -> Self {
        Self {
            orchestrator,
            chain,
            config,
        }
    }

    pub fn config(&self) -> &RepairConfig {
        &self.config
    }

    /// Run attempts until one succeeds, a non-repairable error occurs, or the budget runs out.
    pub async fn run(&self, mut ctx: GenerationContext) -> PipelineReport {
        let max_attempts = self.config.max_attempts.max(1);
        let trace = RepairTrace::default();
        let mut session = Session::new();
        let mut attempt = 1;

        let outcome = loop {
            ctx.attempt = attempt;
            let observer = AttemptObserver {
                trace: &trace,
                attempt,
            };

            match self
                .orchestrator
                .run_round(&mut session, &ctx, self.chain.as_ref(), &observer)
                .await
            {
                Ok(video) => {
                    observer.enter(PipelineState::Success);
                    tracing::info!(
                        attempt,
                        identifier = %video.artifact.identifier,
                        "Pipeline succeeded"
                    );
                    break Ok(video);
                }
                Err(err) if err.is_repairable() => {
                    if attempt >= max_attempts {
                        observer.enter(PipelineState::Exhausted);
                        tracing::error!(attempts = attempt, error = %err, "Pipeline exhausted");
                        break Err(PipelineError::PipelineExhausted {
                            attempts: attempt,
                            last_error: Box::new(err),
                        });
                    }

                    observer.enter(PipelineState::Repairing);
                    tracing::warn!(attempt, error = %err, "Attempt failed, repairing");
                    let kind = match err {
                        PipelineError::Format(_) => FailureKind::Format,
                        _ => FailureKind::Render,
                    };
                    let feedback = err.repair_feedback().unwrap_or_else(|| err.to_string());
                    ctx.record_failure(
                        attempt,
                        kind,
                        &feedback,
                        self.config.policy,
                        self.config.max_feedback_chars,
                    );
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(attempt, error = %err, "Pipeline aborted");
                    break Err(err);
                }
            }
        };

        session.finish(if outcome.is_ok() {
            SessionStatus::Completed
        } else {
            SessionStatus::Failed
        });

        PipelineReport {
            outcome,
            attempts: attempt,
            trace: trace.into_entries(),
            session,
        }
    }
}
