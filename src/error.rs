//! Error types for the scenesmith render pipeline.
//!
//! `Format` and `Render` are the only recoverable failures: they feed the repair loop.
//! Everything else surfaces to the caller as a typed failure.

use std::fmt;
use thiserror::Error;

/// Which half of a source/video pair an artifact lookup was about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Source,
    Video,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Source => write!(f, "source"),
            ArtifactKind::Video => write!(f, "video"),
        }
    }
}

/// Storage-related errors
///
/// Messages carry the failed operation, never the path it touched.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to {operation}: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),
}

impl StorageError {
    pub fn io(operation: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| StorageError::Io { operation, source }
    }
}

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Malformed generation output: {0}")]
    Format(String),

    #[error("Render failed with exit status {exit_status}: {stderr}")]
    Render { exit_status: i32, stderr: String },

    #[error("Renderer unavailable: {0}")]
    RendererUnavailable(String),

    #[error("Artifact mismatch: source {source_id} does not match video {video_id}")]
    ArtifactMismatch { source_id: String, video_id: String },

    #[error("No {kind} artifact found ({scope})")]
    ArtifactNotFound { kind: ArtifactKind, scope: String },

    #[error("Pipeline exhausted after {attempts} attempts; last error: {last_error}")]
    PipelineExhausted {
        attempts: u32,
        last_error: Box<PipelineError>,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Stage {0} returned no text")]
    EmptyStageOutput(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PipelineError {
    /// True for the failures the repair loop may feed back into generation.
    pub fn is_repairable(&self) -> bool {
        matches!(self, PipelineError::Format(_) | PipelineError::Render { .. })
    }

    /// Text handed to the next generation attempt, if this failure is repairable.
    pub fn repair_feedback(&self) -> Option<String> {
        match self {
            PipelineError::Format(msg) => Some(format!("The previous answer was rejected: {msg}")),
            PipelineError::Render { stderr, .. } => Some(stderr.clone()),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(err: config::ConfigError) -> Self {
        PipelineError::ConfigError(err.to_string())
    }
}
