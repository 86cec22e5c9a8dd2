//! Compile chain: raw code-author output to a resolved video.

use crate::artifact::extract::extract_source;
use crate::artifact::namer::Namer;
use crate::artifact::registry::{RunId, RunRegistry};
use crate::artifact::resolver::{ArtifactResolver, ResolvedVideo};
use crate::artifact::writer::SourceWriter;
use crate::error::{ArtifactKind, PipelineError};
use crate::pipeline::state::{PipelineState, StateObserver};
use crate::render::Renderer;
use crate::timer::StageTimer;
use async_trait::async_trait;
use std::sync::Arc;

/// Seam between the orchestrator and the build side of the pipeline.
#[async_trait]
pub trait CompileChain: Send + Sync {
    async fn compile(
        &self,
        run_id: RunId,
        raw_output: &str,
        observer: &dyn StateObserver,
    ) -> Result<ResolvedVideo, PipelineError>;
}

pub struct Compiler {
    writer: SourceWriter,
    renderer: Arc<dyn Renderer>,
    resolver: ArtifactResolver,
    registry: Arc<RunRegistry>,
    namer: Arc<dyn Namer>,
}

impl Compiler {
    pub fn new(
        writer: SourceWriter,
        renderer: Arc<dyn Renderer>,
        resolver: ArtifactResolver,
        registry: Arc<RunRegistry>,
        namer: Arc<dyn Namer>,
    ) -> Self {
        Self {
            writer,
            renderer,
            resolver,
            registry,
            namer,
        }
    }

    pub fn registry(&self) -> &Arc<RunRegistry> {
        &self.registry
    }

    pub fn resolver(&self) -> &ArtifactResolver {
        &self.resolver
    }
}

#[async_trait]
impl CompileChain for Compiler {
    async fn compile(
        &self,
        run_id: RunId,
        raw_output: &str,
        observer: &dyn StateObserver,
    ) -> Result<ResolvedVideo, PipelineError> {
        let _timer = StageTimer::start("Compile Code to Video");

        observer.enter(PipelineState::Extracting);
        let text = extract_source(raw_output)?;

        observer.enter(PipelineState::Writing);
        let identifier = self.namer.next_identifier();
        let source = self.writer.write(&identifier, &text)?;
        self.registry
            .register_source(run_id, identifier.clone(), source.path.clone());
        tracing::info!(run_id = %run_id, identifier = %identifier, "Source registered");

        observer.enter(PipelineState::Rendering);
        self.renderer.render(&source).await?;

        observer.enter(PipelineState::Resolving);
        let entry = self
            .registry
            .get(run_id)
            .ok_or_else(|| PipelineError::ArtifactNotFound {
                kind: ArtifactKind::Source,
                scope: format!("run {run_id}"),
            })?;
        let video = self.resolver.resolve_run(&entry)?;
        self.registry
            .record_video(run_id, video.artifact.path.clone());

        Ok(video)
    }
}
