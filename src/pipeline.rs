//! Render pipeline: compile chain, repair loop, and the facade that wires them from config.

pub mod compile;
pub mod repair;
pub mod state;

pub use compile::{CompileChain, Compiler};
pub use repair::{PipelineReport, RepairConfig, RepairLoop, RepairTrace, TraceEntry};
pub use state::{NoopObserver, PipelineState, StateObserver};

use crate::agent::build_orchestrator;
use crate::artifact::namer::{Namer, RandomNamer};
use crate::artifact::registry::RunRegistry;
use crate::artifact::resolver::ArtifactResolver;
use crate::artifact::writer::SourceWriter;
use crate::config::{output_contract, render_settings, ScenesmithConfig, StorageConfig};
use crate::error::PipelineError;
use crate::orchestrator::{GenerationContext, Orchestrator};
use crate::provider::ProviderRegistry;
use crate::render::{ManimRenderer, Renderer};
use std::path::Path;
use std::sync::Arc;

/// Resolver for the configured layout, with storage paths already resolved.
pub fn build_resolver(config: &ScenesmithConfig, storage: &StorageConfig) -> ArtifactResolver {
    let resolver = ArtifactResolver::new(
        output_contract(&config.render, storage),
        storage.source_dir.clone(),
        storage.source_extension.clone(),
    );
    if storage.mirror_videos {
        resolver.with_mirror_dir(storage.video_dir.clone())
    } else {
        resolver
    }
}

/// Compile chain from config, using the given renderer and identifier source.
pub fn build_compiler(
    config: &ScenesmithConfig,
    workspace_root: &Path,
    renderer: Arc<dyn Renderer>,
    namer: Arc<dyn Namer>,
) -> Compiler {
    let storage = config.storage.resolve_paths(workspace_root);
    Compiler::new(
        SourceWriter::new(storage.source_dir.clone(), storage.source_extension.clone()),
        renderer,
        build_resolver(config, &storage),
        Arc::new(RunRegistry::new()),
        namer,
    )
}

/// Subprocess renderer for the configured program and output contract.
pub fn build_renderer(config: &ScenesmithConfig, workspace_root: &Path) -> ManimRenderer {
    let storage = config.storage.resolve_paths(workspace_root);
    ManimRenderer::new(render_settings(&config.render, &storage))
}

/// End-to-end generator: orchestrated stages feeding a compile chain under a repair loop.
pub struct ScenePipeline {
    repair: RepairLoop,
    compiler: Arc<Compiler>,
}

impl ScenePipeline {
    pub fn new(orchestrator: Orchestrator, compiler: Arc<Compiler>, config: RepairConfig) -> Self {
        let chain: Arc<dyn CompileChain> = compiler.clone();
        Self {
            repair: RepairLoop::new(Arc::new(orchestrator), chain, config),
            compiler,
        }
    }

    /// Wire providers, agents, renderer, and storage from `config`.
    pub fn from_config(config: &ScenesmithConfig, workspace_root: &Path) -> Result<Self, PipelineError> {
        let providers = ProviderRegistry::from_configs(&config.providers);
        let orchestrator = build_orchestrator(
            &config.agents,
            &providers,
            workspace_root,
            &config.render.scene_name,
        )?;
        let compiler = build_compiler(
            config,
            workspace_root,
            Arc::new(build_renderer(config, workspace_root)),
            Arc::new(RandomNamer),
        );
        Ok(Self::new(orchestrator, Arc::new(compiler), config.repair))
    }

    pub fn compiler(&self) -> &Arc<Compiler> {
        &self.compiler
    }

    pub async fn generate(&self, ctx: GenerationContext) -> PipelineReport {
        tracing::info!(
            max_attempts = self.repair.config().max_attempts,
            "Generating scene video"
        );
        self.repair.run(ctx).await
    }
}
