//! In-memory record of one pipeline run: which stage produced what, on which attempt.

use crate::artifact::registry::RunId;
use crate::orchestrator::stages::StageKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const APP_NAME: &str = "scenesmith";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRecord {
    pub attempt: u32,
    pub stage: StageKind,
    /// Set for code-author outputs that were handed to a compile.
    pub run_id: Option<RunId>,
    pub output: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: Uuid,
    pub app_name: String,
    pub created_at: DateTime<Utc>,
    pub status: SessionStatus,
    pub records: Vec<StageRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            app_name: APP_NAME.to_string(),
            created_at: Utc::now(),
            status: SessionStatus::Active,
            records: Vec::new(),
        }
    }

    pub fn record(&mut self, attempt: u32, stage: StageKind, output: &str) {
        self.records.push(StageRecord {
            attempt,
            stage,
            run_id: None,
            output: output.to_string(),
            recorded_at: Utc::now(),
        });
    }

    /// Tag the latest record for `stage` in `attempt` with the compile it started.
    pub fn attach_run(&mut self, attempt: u32, stage: StageKind, run_id: RunId) {
        if let Some(record) = self
            .records
            .iter_mut()
            .rev()
            .find(|r| r.attempt == attempt && r.stage == stage)
        {
            record.run_id = Some(run_id);
        }
    }

    pub fn latest(&self, stage: StageKind) -> Option<&StageRecord> {
        self.records.iter().rev().find(|r| r.stage == stage)
    }

    pub fn records_for_attempt(&self, attempt: u32) -> impl Iterator<Item = &StageRecord> {
        self.records.iter().filter(move |r| r.attempt == attempt)
    }

    pub fn finish(&mut self, status: SessionStatus) {
        self.status = status;
        tracing::debug!(
            session_id = %self.session_id,
            status = status.as_str(),
            records = self.records.len(),
            "Session finished"
        );
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
