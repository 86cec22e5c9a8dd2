//! Source persistence: one file per identifier in a flat source directory.

use crate::artifact::namer::Identifier;
use crate::error::{PipelineError, StorageError};
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Extracted scene source as written to disk. Immutable once created.
#[derive(Debug, Clone)]
pub struct SourceArtifact {
    pub identifier: Identifier,
    pub path: PathBuf,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Writes source text under `{source_dir}/{identifier}.{extension}`.
#[derive(Debug, Clone)]
pub struct SourceWriter {
    source_dir: PathBuf,
    extension: String,
}

impl SourceWriter {
    pub fn new(source_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            source_dir: source_dir.into(),
            extension: extension.into(),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn path_for(&self, identifier: &Identifier) -> PathBuf {
        self.source_dir
            .join(format!("{}.{}", identifier, self.extension))
    }

    /// Write `text` for `identifier`, replacing any previous file of the same name.
    ///
    /// The handle lives only inside this call; it is closed on success and on every error
    /// path when the writer drops.
    pub fn write(&self, identifier: &Identifier, text: &str) -> Result<SourceArtifact, PipelineError> {
        fs::create_dir_all(&self.source_dir).map_err(StorageError::io("create source directory"))?;
        let path = self.path_for(identifier);

        {
            let file = File::create(&path).map_err(StorageError::io("create source file"))?;
            let mut writer = BufWriter::new(file);
            writer
                .write_all(text.as_bytes())
                .map_err(StorageError::io("write source file"))?;
            writer.flush().map_err(StorageError::io("flush source file"))?;
        }

        tracing::debug!(identifier = %identifier, bytes = text.len(), "Source written");

        Ok(SourceArtifact {
            identifier: identifier.clone(),
            path,
            text: text.to_string(),
            created_at: Utc::now(),
        })
    }

    pub fn read_back(&self, identifier: &Identifier) -> Result<String, PipelineError> {
        fs::read_to_string(self.path_for(identifier))
            .map_err(StorageError::io("read source file"))
            .map_err(PipelineError::from)
    }
}
