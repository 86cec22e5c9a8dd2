//! Configuration loading facade over the layered sources.

use crate::config::merge::builder_with_defaults;
use crate::config::sources::{environment, global_file, workspace_file};
use crate::config::ScenesmithConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load defaults, then global file, workspace files, and environment.
    pub fn load(workspace_root: &Path) -> Result<ScenesmithConfig, ConfigError> {
        let builder = builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder);
        builder.build()?.try_deserialize()
    }

    /// Load one explicit file over the defaults, still honoring environment overrides.
    pub fn load_from_file(path: &Path) -> Result<ScenesmithConfig, ConfigError> {
        let builder = builder_with_defaults()?.add_source(File::from(path).required(true));
        environment::add_to_builder(builder)
            .build()?
            .try_deserialize()
    }

    pub fn xdg_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn default() -> ScenesmithConfig {
        ScenesmithConfig::default()
    }
}
