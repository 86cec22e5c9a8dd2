//! Pipeline states and the observer that sees every transition.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Generating,
    Extracting,
    Writing,
    Rendering,
    Resolving,
    Success,
    Repairing,
    Exhausted,
}

impl PipelineState {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineState::Generating => "generating",
            PipelineState::Extracting => "extracting",
            PipelineState::Writing => "writing",
            PipelineState::Rendering => "rendering",
            PipelineState::Resolving => "resolving",
            PipelineState::Success => "success",
            PipelineState::Repairing => "repairing",
            PipelineState::Exhausted => "exhausted",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Success | PipelineState::Exhausted)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait StateObserver: Send + Sync {
    fn enter(&self, state: PipelineState);
}

/// Discards transitions. Used for one-off compiles outside the repair loop.
pub struct NoopObserver;

impl StateObserver for NoopObserver {
    fn enter(&self, _state: PipelineState) {}
}
