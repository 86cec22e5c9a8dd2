//! Scoped timing for pipeline stages.

use std::time::{Duration, Instant};

/// Logs when a task starts and, on drop, how long it took.
pub struct StageTimer {
    task: &'static str,
    started: Instant,
}

impl StageTimer {
    pub fn start(task: &'static str) -> Self {
        tracing::info!(task, "Starting");
        Self {
            task,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        tracing::info!(
            task = self.task,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Finished"
        );
    }
}
