//! Run registry: the explicit run-id → artifact paths map threaded through a pipeline run.
//!
//! Resolution looks paths up here instead of inferring them from directory state, so two
//! concurrent runs never see each other's files.

use crate::artifact::namer::Identifier;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEntry {
    pub identifier: Identifier,
    pub source_path: PathBuf,
    pub video_path: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct RunRegistry {
    entries: RwLock<HashMap<RunId, RunEntry>>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_source(&self, run_id: RunId, identifier: Identifier, source_path: PathBuf) {
        self.entries.write().insert(
            run_id,
            RunEntry {
                identifier,
                source_path,
                video_path: None,
            },
        );
    }

    /// Record the resolved video. Returns false if the run was never registered.
    pub fn record_video(&self, run_id: RunId, video_path: PathBuf) -> bool {
        match self.entries.write().get_mut(&run_id) {
            Some(entry) => {
                entry.video_path = Some(video_path);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, run_id: RunId) -> Option<RunEntry> {
        self.entries.read().get(&run_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
