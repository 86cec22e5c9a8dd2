//! CLI route: single route table and run context. Dispatches to the pipeline and presentation.

use crate::artifact::namer::{Identifier, RandomNamer};
use crate::artifact::registry::RunId;
use crate::artifact::resolver::{ArtifactResolver, ResolvedVideo};
use crate::cli::help::command_name;
use crate::cli::parse::{Commands, ConfigCommands};
use crate::cli::presentation::{
    format_config, format_validation_result, format_video_json, format_video_text,
};
use crate::config::{ConfigLoader, ScenesmithConfig};
use crate::error::{PipelineError, StorageError};
use crate::orchestrator::GenerationContext;
use crate::pipeline::{
    build_compiler, build_renderer, build_resolver, CompileChain, NoopObserver, ScenePipeline,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Runtime;

/// Runtime context for CLI execution: workspace, effective config, and the async runtime.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: ScenesmithConfig,
    runtime: Runtime,
}

impl RunContext {
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, PipelineError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        let runtime = Runtime::new().map_err(StorageError::io("start async runtime"))?;
        Ok(Self {
            workspace_root,
            config,
            runtime,
        })
    }

    pub fn config(&self) -> &ScenesmithConfig {
        &self.config
    }

    /// Execute a command; the returned string is printed on stdout.
    pub fn execute(&self, command: &Commands) -> Result<String, PipelineError> {
        let started = Instant::now();
        let name = command_name(command);
        tracing::debug!(command = %name, "Executing command");
        let result = self.execute_inner(command);
        tracing::info!(
            command = %name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, PipelineError> {
        match command {
            Commands::Generate {
                problem,
                notes,
                output,
                format,
            } => self.handle_generate(problem, notes.as_deref(), output.as_deref(), format),
            Commands::Compile {
                input,
                output,
                format,
            } => self.handle_compile(input, output.as_deref(), format),
            Commands::Fetch {
                identifier,
                output,
                format,
            } => {
                self.ensure_valid()?;
                let identifier = Identifier::parse(identifier)?;
                let video = self.resolver().resolve_identifier(&identifier)?;
                present(&video, output.as_deref(), format, None)
            }
            Commands::Latest { output, format } => {
                self.ensure_valid()?;
                tracing::warn!("Resolving by recency; concurrent renders may return another run's video");
                let video = self.resolver().resolve_latest()?;
                present(&video, output.as_deref(), format, None)
            }
            Commands::Config { command } => self.handle_config(command),
        }
    }

    fn handle_generate(
        &self,
        problem: &str,
        notes: Option<&str>,
        output: Option<&Path>,
        format: &str,
    ) -> Result<String, PipelineError> {
        self.ensure_valid()?;
        let pipeline = ScenePipeline::from_config(&self.config, &self.workspace_root)?;
        let mut ctx = GenerationContext::new(problem);
        if let Some(notes) = notes {
            ctx = ctx.with_notes(notes);
        }
        let report = self.runtime.block_on(pipeline.generate(ctx));
        let attempts = report.attempts;
        let video = report.into_result()?;
        present(&video, output, format, Some(attempts))
    }

    fn handle_compile(
        &self,
        input: &Path,
        output: Option<&Path>,
        format: &str,
    ) -> Result<String, PipelineError> {
        self.ensure_valid()?;
        let raw = std::fs::read_to_string(input).map_err(StorageError::io("read raw answer"))?;
        let compiler = build_compiler(
            &self.config,
            &self.workspace_root,
            Arc::new(build_renderer(&self.config, &self.workspace_root)),
            Arc::new(RandomNamer),
        );
        let video = self
            .runtime
            .block_on(compiler.compile(RunId::new(), &raw, &NoopObserver))?;
        present(&video, output, format, Some(1))
    }

    fn handle_config(&self, command: &ConfigCommands) -> Result<String, PipelineError> {
        match command {
            ConfigCommands::Show { format } => {
                format_config(&self.config, format).map_err(PipelineError::ConfigError)
            }
            ConfigCommands::Validate => {
                let result = self.config.validate();
                let text = format_validation_result(&result);
                if result.is_ok() {
                    Ok(text)
                } else {
                    Err(PipelineError::ConfigError(text))
                }
            }
        }
    }

    fn resolver(&self) -> ArtifactResolver {
        let storage = self.config.storage.resolve_paths(&self.workspace_root);
        build_resolver(&self.config, &storage)
    }

    fn ensure_valid(&self) -> Result<(), PipelineError> {
        self.config
            .validate()
            .map_err(|errors| PipelineError::ConfigError(format_validation_result(&Err(errors))))
    }
}

fn present(
    video: &ResolvedVideo,
    output: Option<&Path>,
    format: &str,
    attempts: Option<u32>,
) -> Result<String, PipelineError> {
    if let Some(path) = output {
        std::fs::write(path, &video.bytes).map_err(StorageError::io("write video"))?;
    }
    match format {
        "json" => Ok(format_video_json(video, output, attempts)),
        "text" => Ok(format_video_text(video, output, attempts)),
        other => Err(PipelineError::ConfigError(format!(
            "Unknown format '{}' (expected text or json)",
            other
        ))),
    }
}
