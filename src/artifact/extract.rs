//! Source extraction: pull the fenced code body out of raw stage output.

use crate::error::PipelineError;

const FENCE: &str = "```";

/// Return the body between the opening and closing fence lines, verbatim.
///
/// The text must start with a fence line (a language tag after it is allowed) and its
/// last non-blank line must be a closing fence. Nothing inside the body is inspected;
/// the renderer is the real validator.
pub fn extract_source(text: &str) -> Result<String, PipelineError> {
    if !text.starts_with(FENCE) {
        return Err(PipelineError::Format(
            "Code block must start with '```'".to_string(),
        ));
    }

    let trimmed = text.trim_end();
    let lines: Vec<&str> = trimmed.split('\n').collect();
    if lines.len() < 2 || lines[lines.len() - 1].trim_end() != FENCE {
        return Err(PipelineError::Format(
            "Code block must end with a closing '```' line".to_string(),
        ));
    }

    Ok(lines[1..lines.len() - 1].join("\n"))
}
