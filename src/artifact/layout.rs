//! Renderer output contract.
//!
//! The external renderer decides where its video lands, and that decision has changed
//! between versions. [`OutputContract::video_path`] is the one place that knows the
//! convention; everything else asks it.

use crate::artifact::namer::Identifier;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const VIDEO_EXTENSION: &str = "mp4";

/// Renderer quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    #[default]
    Low,
    Medium,
    High,
    Production,
    Fourk,
}

impl QualityTier {
    pub fn flag(self) -> &'static str {
        match self {
            QualityTier::Low => "-ql",
            QualityTier::Medium => "-qm",
            QualityTier::High => "-qh",
            QualityTier::Production => "-qp",
            QualityTier::Fourk => "-qk",
        }
    }

    /// Pixel height, which names the renderer's quality directory.
    pub fn height(self) -> u32 {
        match self {
            QualityTier::Low => 480,
            QualityTier::Medium => 720,
            QualityTier::High => 1080,
            QualityTier::Production => 1440,
            QualityTier::Fourk => 2160,
        }
    }
}

/// Known output conventions of the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLayout {
    /// `{media_root}/videos/{identifier}/{height}p{fps}/{Scene}.mp4`, chosen by the tool.
    #[default]
    Nested,
    /// `{video_dir}/{identifier}.mp4`, requested explicitly with `-o`.
    Flat,
}

/// Everything the renderer's output location depends on.
#[derive(Debug, Clone)]
pub struct OutputContract {
    pub layout: OutputLayout,
    pub media_root: PathBuf,
    pub video_dir: PathBuf,
    pub quality: QualityTier,
    pub fps: u32,
    pub scene_name: String,
}

impl OutputContract {
    /// Quality directory name, e.g. `480p10`.
    pub fn quality_profile(&self) -> String {
        format!("{}p{}", self.quality.height(), self.fps)
    }

    fn scene_file_name(&self) -> String {
        format!("{}.{}", self.scene_name, VIDEO_EXTENSION)
    }

    /// Where the renderer writes the video for `identifier`.
    pub fn video_path(&self, identifier: &Identifier) -> PathBuf {
        match self.layout {
            OutputLayout::Nested => self
                .media_root
                .join("videos")
                .join(identifier.as_str())
                .join(self.quality_profile())
                .join(self.scene_file_name()),
            OutputLayout::Flat => self
                .video_dir
                .join(format!("{}.{}", identifier, VIDEO_EXTENSION)),
        }
    }

    /// Extra renderer arguments the layout needs.
    pub fn renderer_args(&self, identifier: &Identifier) -> Vec<OsString> {
        match self.layout {
            OutputLayout::Nested => Vec::new(),
            OutputLayout::Flat => vec![
                OsString::from("-o"),
                self.video_path(identifier).into_os_string(),
            ],
        }
    }

    /// Recover the identifier a video path was produced for, if the path fits the layout.
    pub fn identifier_of(&self, path: &Path) -> Option<String> {
        match self.layout {
            OutputLayout::Nested => {
                if path.file_name()?.to_str()? != self.scene_file_name() {
                    return None;
                }
                let quality_dir = path.parent()?;
                if quality_dir.file_name()?.to_str()? != self.quality_profile() {
                    return None;
                }
                Some(quality_dir.parent()?.file_name()?.to_str()?.to_string())
            }
            OutputLayout::Flat => {
                if path.extension()?.to_str()? != VIDEO_EXTENSION {
                    return None;
                }
                Some(path.file_stem()?.to_str()?.to_string())
            }
        }
    }

    /// Every video currently on disk that fits the layout.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let (root, depth) = match self.layout {
            OutputLayout::Nested => (self.media_root.join("videos"), 3),
            OutputLayout::Flat => (self.video_dir.clone(), 1),
        };
        WalkDir::new(root)
            .min_depth(depth)
            .max_depth(depth)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.identifier_of(path).is_some())
            .collect()
    }
}
