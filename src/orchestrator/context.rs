//! Generation context handed to every stage, including repair feedback from earlier attempts.

use serde::{Deserialize, Serialize};

/// How much failure history a repair attempt sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairPolicy {
    /// Every earlier failure stays in context.
    #[default]
    RetainAll,
    /// Only the most recent failure is kept.
    LatestOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The answer had no usable code fence.
    Format,
    /// The renderer rejected the code.
    Render,
}

/// Feedback from one failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairNote {
    pub attempt: u32,
    pub kind: FailureKind,
    pub feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    /// The problem the video should explain.
    pub problem: String,
    /// Free-form extra context from the caller (e.g. a description of an attached image).
    pub notes: Option<String>,
    /// 1-based attempt number.
    pub attempt: u32,
    pub repair_notes: Vec<RepairNote>,
}

impl GenerationContext {
    pub fn new(problem: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            notes: None,
            attempt: 1,
            repair_notes: Vec::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_repair(&self) -> bool {
        !self.repair_notes.is_empty()
    }

    /// Add feedback from a failed attempt, keeping at most `max_chars` of its tail.
    pub fn record_failure(
        &mut self,
        attempt: u32,
        kind: FailureKind,
        feedback: &str,
        policy: RepairPolicy,
        max_chars: usize,
    ) {
        if policy == RepairPolicy::LatestOnly {
            self.repair_notes.clear();
        }
        self.repair_notes.push(RepairNote {
            attempt,
            kind,
            feedback: tail_chars(feedback, max_chars),
        });
    }

    /// Repair section appended to stage prompts, if any attempt has failed.
    pub fn repair_prompt(&self) -> Option<String> {
        if self.repair_notes.is_empty() {
            return None;
        }
        let mut out = String::from(
            "Previous attempts failed. Fix the problems below and return a corrected answer.\n",
        );
        for note in &self.repair_notes {
            let label = match note.kind {
                FailureKind::Format => "formatting error",
                FailureKind::Render => "render error",
            };
            out.push_str(&format!(
                "\nAttempt {} ({}):\n{}\n",
                note.attempt, label, note.feedback
            ));
        }
        Some(out)
    }
}

fn tail_chars(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    let skip = count - max_chars;
    let tail: String = text.chars().skip(skip).collect();
    format!("...{tail}")
}
