//! Render and storage sections of the configuration.

use crate::artifact::layout::{OutputContract, OutputLayout, QualityTier};
use crate::render::RenderSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Renderer invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Renderer executable, looked up on PATH when not absolute
    pub program: String,
    pub quality: QualityTier,
    pub fps: u32,
    /// Scene class the generated source must define
    pub scene_name: String,
    pub layout: OutputLayout,
    /// Hard limit on one render; the process is killed when it expires
    pub timeout_secs: u64,
    /// Extra arguments inserted before the source path
    pub extra_args: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            program: "manim".to_string(),
            quality: QualityTier::Low,
            fps: 10,
            scene_name: "SolutionAnimation".to_string(),
            layout: OutputLayout::Nested,
            timeout_secs: 300,
            extra_args: Vec::new(),
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.program.trim().is_empty() {
            return Err("Renderer program cannot be empty".to_string());
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(format!("fps must be between 1 and 120, got {}", self.fps));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than zero".to_string());
        }
        let valid_scene = self
            .scene_name
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false)
            && self
                .scene_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_scene {
            return Err(format!("scene_name is not a valid class name: {:?}", self.scene_name));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Filesystem locations. Relative paths resolve against the workspace root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub source_dir: PathBuf,
    pub source_extension: String,
    /// Root handed to the renderer as `--media_dir`
    pub media_dir: PathBuf,
    /// Flat `{identifier}.mp4` directory (flat layout output, and mirror target)
    pub video_dir: PathBuf,
    /// Copy every resolved nested-layout video into `video_dir`
    pub mirror_videos: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("manim/scripts"),
            source_extension: "py".to_string(),
            media_dir: PathBuf::from("manim/media"),
            video_dir: PathBuf::from("manim/videos"),
            mirror_videos: false,
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, path) in [
            ("source_dir", &self.source_dir),
            ("media_dir", &self.media_dir),
            ("video_dir", &self.video_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(format!("{} cannot be empty", name));
            }
        }
        if self.source_extension.is_empty() || self.source_extension.contains('.') {
            return Err(format!(
                "source_extension must be a bare extension, got {:?}",
                self.source_extension
            ));
        }
        Ok(())
    }

    /// Copy with every relative path joined onto `workspace_root`.
    pub fn resolve_paths(&self, workspace_root: &Path) -> Self {
        let resolve = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                workspace_root.join(p)
            }
        };
        Self {
            source_dir: resolve(&self.source_dir),
            source_extension: self.source_extension.clone(),
            media_dir: resolve(&self.media_dir),
            video_dir: resolve(&self.video_dir),
            mirror_videos: self.mirror_videos,
        }
    }
}

/// Output contract for already-resolved storage paths.
pub fn output_contract(render: &RenderConfig, storage: &StorageConfig) -> OutputContract {
    OutputContract {
        layout: render.layout,
        media_root: storage.media_dir.clone(),
        video_dir: storage.video_dir.clone(),
        quality: render.quality,
        fps: render.fps,
        scene_name: render.scene_name.clone(),
    }
}

pub fn render_settings(render: &RenderConfig, storage: &StorageConfig) -> RenderSettings {
    RenderSettings {
        program: render.program.clone(),
        timeout: render.timeout(),
        extra_args: render.extra_args.clone(),
        contract: output_contract(render, storage),
    }
}
