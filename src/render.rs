//! Renderer invocation
//!
//! Runs the external scene renderer as a subprocess against a written source file. The
//! invoker knows the command line, not where the output lands; that belongs to
//! [`OutputContract`].

use crate::artifact::layout::OutputContract;
use crate::artifact::writer::SourceArtifact;
use crate::error::{PipelineError, StorageError};
use async_trait::async_trait;
use std::ffi::OsString;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Outcome of one renderer process.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub success: bool,
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl RenderResult {
    /// Turn a nonzero exit into `PipelineError::Render` carrying the captured stderr.
    pub fn into_result(self) -> Result<RenderResult, PipelineError> {
        if self.success {
            Ok(self)
        } else {
            Err(PipelineError::Render {
                exit_status: self.exit_status,
                stderr: self.stderr,
            })
        }
    }
}

/// Renders a written source file.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `source`, failing with `PipelineError::Render` on a nonzero exit or timeout.
    async fn render(&self, source: &SourceArtifact) -> Result<RenderResult, PipelineError>;
}

/// Fixed renderer configuration.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub program: String,
    pub timeout: Duration,
    pub extra_args: Vec<String>,
    pub contract: OutputContract,
}

pub struct ManimRenderer {
    settings: RenderSettings,
}

impl ManimRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Arguments passed after the program name.
    pub fn command_args(&self, source: &SourceArtifact) -> Vec<OsString> {
        let contract = &self.settings.contract;
        let mut args: Vec<OsString> = vec![
            contract.quality.flag().into(),
            "--fps".into(),
            contract.fps.to_string().into(),
            "--media_dir".into(),
            contract.media_root.clone().into_os_string(),
        ];
        args.extend(self.settings.extra_args.iter().map(OsString::from));
        args.push(source.path.clone().into_os_string());
        args.push(contract.scene_name.clone().into());
        args.extend(contract.renderer_args(&source.identifier));
        args
    }

    /// Run the renderer to completion (or timeout) and capture its output.
    ///
    /// A nonzero exit is reported in the result, not as an error; see [`Renderer::render`].
    pub async fn invoke(&self, source: &SourceArtifact) -> Result<RenderResult, PipelineError> {
        let mut cmd = Command::new(&self.settings.program);
        cmd.args(self.command_args(source))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::info!(
            identifier = %source.identifier,
            program = %self.settings.program,
            "Starting render"
        );

        let child = cmd.spawn().map_err(|e| {
            PipelineError::RendererUnavailable(format!(
                "failed to spawn '{}' (is it installed and on PATH?): {}",
                self.settings.program, e
            ))
        })?;

        let started = Instant::now();
        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.settings.timeout, child.wait_with_output()).await
        {
            Ok(output) => output.map_err(StorageError::io("wait for renderer"))?,
            Err(_) => {
                tracing::warn!(
                    identifier = %source.identifier,
                    timeout_secs = self.settings.timeout.as_secs(),
                    "Render timed out"
                );
                return Ok(RenderResult {
                    success: false,
                    exit_status: -1,
                    stdout: String::new(),
                    stderr: format!(
                        "Render timed out after {} seconds",
                        self.settings.timeout.as_secs()
                    ),
                    elapsed: started.elapsed(),
                });
            }
        };

        let result = RenderResult {
            success: output.status.success(),
            exit_status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            elapsed: started.elapsed(),
        };

        if result.success {
            tracing::info!(
                identifier = %source.identifier,
                elapsed_ms = result.elapsed.as_millis() as u64,
                "Render completed"
            );
        } else {
            tracing::warn!(
                identifier = %source.identifier,
                exit_status = result.exit_status,
                "Render failed"
            );
        }
        tracing::debug!(identifier = %source.identifier, stdout = %result.stdout, "Renderer output");

        Ok(result)
    }
}

#[async_trait]
impl Renderer for ManimRenderer {
    async fn render(&self, source: &SourceArtifact) -> Result<RenderResult, PipelineError> {
        self.invoke(source).await?.into_result()
    }
}
