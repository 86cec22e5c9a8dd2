//! Stage prompts: built-in defaults, template files, and user-prompt rendering.

use crate::error::PipelineError;
use crate::orchestrator::context::GenerationContext;
use crate::orchestrator::stages::StageKind;
use std::path::{Path, PathBuf};

const DECOMPOSER_PROMPT: &str = "\
You are a mathematics tutor. Break the problem you are given into a short, ordered list of \
solution steps. State each step precisely, show the intermediate results, and finish with \
the final answer. Do not write code.";

const SCRIPTER_PROMPT: &str = "\
You write narration scripts for short animated math explainers. Turn the solution steps you \
are given into a scene-by-scene script: for each scene describe what appears on screen \
(equations, graphs, highlights) and the line of narration that accompanies it. Keep the \
whole video under two minutes. Do not write code.";

const CODE_AUTHOR_PROMPT: &str = "\
You write Manim Community Edition scenes. Implement the script you are given as a single \
Python file that defines one class named `{scene_name}` deriving from `Scene`. Use only \
the `manim` package. Reply with exactly one fenced code block containing the whole file \
and nothing else: the first line of your reply must be the opening fence and the last line \
the closing fence.";

/// Built-in system prompt for `stage`, with `{scene_name}` filled in.
pub fn default_system_prompt(stage: StageKind, scene_name: &str) -> String {
    let template = match stage {
        StageKind::Decomposer => DECOMPOSER_PROMPT,
        StageKind::Scripter => SCRIPTER_PROMPT,
        StageKind::CodeAuthor => CODE_AUTHOR_PROMPT,
    };
    template.replace("{scene_name}", scene_name)
}

/// Resolve a prompt path: `~/` expands to the home directory, relative paths resolve
/// against `base_dir`.
pub fn resolve_prompt_path(raw: &str, base_dir: &Path) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// Read a prompt template file and fill `{scene_name}`.
pub fn load_prompt_template(path: &Path, scene_name: &str) -> Result<String, PipelineError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        PipelineError::ConfigError(format!(
            "Failed to read prompt template '{}': {}",
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            e
        ))
    })?;
    if text.trim().is_empty() {
        return Err(PipelineError::ConfigError(
            "Prompt template is empty".to_string(),
        ));
    }
    Ok(text.replace("{scene_name}", scene_name))
}

/// User message for a stage: the problem, upstream outputs, then any repair feedback.
pub fn render_user_prompt(
    stage: StageKind,
    ctx: &GenerationContext,
    breakdown: Option<&str>,
    script: Option<&str>,
) -> String {
    let mut out = format!("Problem:\n{}\n", ctx.problem.trim());
    if let Some(notes) = &ctx.notes {
        out.push_str(&format!("\nAdditional context:\n{}\n", notes.trim()));
    }
    if let Some(breakdown) = breakdown {
        out.push_str(&format!("\nSolution steps:\n{}\n", breakdown.trim()));
    }
    if let Some(script) = script {
        out.push_str(&format!("\nScript:\n{}\n", script.trim()));
    }
    // Only the code author can act on renderer feedback.
    if stage == StageKind::CodeAuthor {
        if let Some(repair) = ctx.repair_prompt() {
            out.push('\n');
            out.push_str(&repair);
        }
    }
    out
}
