//! Merge rules: defaults applied beneath every file and environment source.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("render.program", "manim")?
        .set_default("render.scene_name", "SolutionAnimation")?
        .set_default("storage.source_dir", "manim/scripts")?
        .set_default("storage.media_dir", "manim/media")?
        .set_default("storage.video_dir", "manim/videos")
}
