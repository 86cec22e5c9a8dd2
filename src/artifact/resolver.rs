//! Artifact resolution: find the rendered video for a source and prove they belong together.

use crate::artifact::layout::{OutputContract, VIDEO_EXTENSION};
use crate::artifact::namer::Identifier;
use crate::artifact::registry::RunEntry;
use crate::artifact::writer::SourceArtifact;
use crate::error::{ArtifactKind, PipelineError, StorageError};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// A rendered video discovered on disk. Owned by the renderer; never modified here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    pub identifier: Identifier,
    pub path: PathBuf,
    pub quality_profile: String,
    pub created_at: DateTime<Utc>,
}

/// Video metadata plus its raw bytes. Transport encoding happens at the boundary.
#[derive(Debug, Clone)]
pub struct ResolvedVideo {
    pub artifact: VideoArtifact,
    pub bytes: Vec<u8>,
}

/// A file considered by the directory-scan heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCandidate {
    pub identifier: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Most recently modified candidate; equal times go to the greatest identifier so the
/// choice never depends on directory iteration order.
pub fn pick_latest(candidates: impl IntoIterator<Item = ScanCandidate>) -> Option<ScanCandidate> {
    candidates.into_iter().max_by(|a, b| {
        a.modified
            .cmp(&b.modified)
            .then_with(|| a.identifier.cmp(&b.identifier))
    })
}

#[derive(Debug, Clone)]
pub struct ArtifactResolver {
    contract: OutputContract,
    source_dir: PathBuf,
    source_extension: String,
    mirror_dir: Option<PathBuf>,
}

impl ArtifactResolver {
    pub fn new(
        contract: OutputContract,
        source_dir: impl Into<PathBuf>,
        source_extension: impl Into<String>,
    ) -> Self {
        Self {
            contract,
            source_dir: source_dir.into(),
            source_extension: source_extension.into(),
            mirror_dir: None,
        }
    }

    /// Also copy every resolved video to `{dir}/{identifier}.mp4`.
    pub fn with_mirror_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mirror_dir = Some(dir.into());
        self
    }

    pub fn contract(&self) -> &OutputContract {
        &self.contract
    }

    /// Resolve the video produced from `source` after a successful render.
    pub fn resolve(&self, source: &SourceArtifact) -> Result<ResolvedVideo, PipelineError> {
        self.resolve_source_path(&source.identifier, &source.path)
    }

    /// Resolve the video for a registered run, using the paths the run recorded.
    pub fn resolve_run(&self, entry: &RunEntry) -> Result<ResolvedVideo, PipelineError> {
        self.resolve_source_path(&entry.identifier, &entry.source_path)
    }

    fn resolve_source_path(
        &self,
        identifier: &Identifier,
        source_path: &Path,
    ) -> Result<ResolvedVideo, PipelineError> {
        let source_id = stem_of(source_path).ok_or_else(|| PipelineError::ArtifactNotFound {
            kind: ArtifactKind::Source,
            scope: format!("identifier {identifier}"),
        })?;
        if source_id != identifier.as_str() {
            return Err(PipelineError::ArtifactMismatch {
                source_id,
                video_id: identifier.to_string(),
            });
        }
        self.resolve_pair(identifier, source_path)
    }

    /// Resolve a previously rendered identifier, e.g. for a later fetch.
    pub fn resolve_identifier(&self, identifier: &Identifier) -> Result<ResolvedVideo, PipelineError> {
        let source_path = self
            .source_dir
            .join(format!("{}.{}", identifier, self.source_extension));
        self.resolve_pair(identifier, &source_path)
    }

    fn resolve_pair(
        &self,
        identifier: &Identifier,
        source_path: &Path,
    ) -> Result<ResolvedVideo, PipelineError> {
        if !source_path.is_file() {
            return Err(PipelineError::ArtifactNotFound {
                kind: ArtifactKind::Source,
                scope: format!("identifier {identifier}"),
            });
        }

        let video_path = self.contract.video_path(identifier);
        if !video_path.is_file() {
            return Err(PipelineError::ArtifactNotFound {
                kind: ArtifactKind::Video,
                scope: format!("identifier {identifier}"),
            });
        }

        let video_id = self.contract.identifier_of(&video_path).ok_or_else(|| {
            PipelineError::ArtifactNotFound {
                kind: ArtifactKind::Video,
                scope: format!("identifier {identifier}"),
            }
        })?;
        if video_id != identifier.as_str() {
            return Err(PipelineError::ArtifactMismatch {
                source_id: identifier.to_string(),
                video_id,
            });
        }

        self.load(identifier.clone(), video_path)
    }

    /// Pair the newest source file with the newest video by modification time.
    ///
    /// Unsafe under concurrent runs: another run's files may be newer. Pipeline runs use
    /// [`ArtifactResolver::resolve`], which never looks at directory state.
    pub fn resolve_latest(&self) -> Result<ResolvedVideo, PipelineError> {
        let source = pick_latest(self.scan_sources()?).ok_or(PipelineError::ArtifactNotFound {
            kind: ArtifactKind::Source,
            scope: "latest".to_string(),
        })?;
        let video = pick_latest(self.scan_videos()?).ok_or(PipelineError::ArtifactNotFound {
            kind: ArtifactKind::Video,
            scope: "latest".to_string(),
        })?;

        if source.identifier != video.identifier {
            return Err(PipelineError::ArtifactMismatch {
                source_id: source.identifier,
                video_id: video.identifier,
            });
        }

        let identifier = Identifier::parse(&video.identifier)?;
        self.load(identifier, video.path)
    }

    fn scan_sources(&self) -> Result<Vec<ScanCandidate>, PipelineError> {
        let mut out = Vec::new();
        for entry in WalkDir::new(&self.source_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
        {
            let path = entry.into_path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.source_extension.as_str()) {
                continue;
            }
            if let Some(identifier) = stem_of(&path) {
                out.push(ScanCandidate {
                    identifier,
                    modified: modified_time(&path)?,
                    path,
                });
            }
        }
        Ok(out)
    }

    fn scan_videos(&self) -> Result<Vec<ScanCandidate>, PipelineError> {
        let mut out = Vec::new();
        for path in self.contract.candidates() {
            if let Some(identifier) = self.contract.identifier_of(&path) {
                out.push(ScanCandidate {
                    identifier,
                    modified: modified_time(&path)?,
                    path,
                });
            }
        }
        Ok(out)
    }

    fn load(&self, identifier: Identifier, path: PathBuf) -> Result<ResolvedVideo, PipelineError> {
        let bytes = fs::read(&path).map_err(StorageError::io("read video file"))?;
        let created_at = DateTime::<Utc>::from(modified_time(&path)?);

        if let Some(mirror_dir) = &self.mirror_dir {
            let target = mirror_dir.join(format!("{}.{}", identifier, VIDEO_EXTENSION));
            if target != path {
                fs::create_dir_all(mirror_dir).map_err(StorageError::io("create video mirror directory"))?;
                fs::copy(&path, &target).map_err(StorageError::io("mirror video file"))?;
            }
        }

        tracing::info!(identifier = %identifier, bytes = bytes.len(), "Video resolved");

        Ok(ResolvedVideo {
            artifact: VideoArtifact {
                identifier,
                path,
                quality_profile: self.contract.quality_profile(),
                created_at,
            },
            bytes,
        })
    }
}

fn stem_of(path: &Path) -> Option<String> {
    path.file_stem()?.to_str().map(str::to_string)
}

fn modified_time(path: &Path) -> Result<SystemTime, PipelineError> {
    Ok(fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(StorageError::io("read file modification time"))?)
}
