//! CLI output: error mapping from pipeline errors to the stable CLI surface.
//!
//! Renderer stderr is cut to its last lines and absolute paths inside it are reduced to
//! their file name, so workspace layout does not leak to callers.

use crate::error::PipelineError;
use std::path::{Path, PathBuf};

const STDERR_EXCERPT_LINES: usize = 20;
const ROOT_PLACEHOLDER: &str = "/workspace";

/// Map a pipeline error to the message printed on stderr.
pub fn map_error(e: &PipelineError) -> String {
    map_error_with(e, &redact_paths)
}

/// Like [`map_error`], also hiding the workspace root even where it contains spaces.
pub fn map_error_in(e: &PipelineError, workspace_root: &Path) -> String {
    let roots = root_forms(workspace_root);
    map_error_with(e, &|text| redact_root(text, &roots))
}

fn map_error_with(e: &PipelineError, redact: &dyn Fn(&str) -> String) -> String {
    match e {
        PipelineError::Render {
            exit_status,
            stderr,
        } => format!(
            "Render failed with exit status {}:\n{}",
            exit_status,
            redact(&stderr_excerpt(stderr))
        ),
        PipelineError::PipelineExhausted {
            attempts,
            last_error,
        } => format!(
            "Gave up after {} attempts. Last error: {}",
            attempts,
            map_error_with(last_error, redact)
        ),
        other => redact(&other.to_string()),
    }
}

/// Absolute spellings of the workspace root, longest first.
fn root_forms(workspace_root: &Path) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if workspace_root.is_absolute() {
        roots.push(workspace_root.to_path_buf());
    }
    if let Ok(canonical) = workspace_root.canonicalize() {
        if !roots.contains(&canonical) {
            roots.push(canonical);
        }
    }
    roots.retain(|root| root.parent().is_some());
    roots.sort_by_key(|root| std::cmp::Reverse(root.as_os_str().len()));
    roots
}

/// Replace literal workspace roots with a placeholder, then redact remaining paths.
pub fn redact_root(text: &str, roots: &[PathBuf]) -> String {
    let mut replaced = text.to_string();
    for root in roots {
        let root = root.to_string_lossy();
        let root = root.trim_end_matches(['/', '\\']);
        if !root.is_empty() {
            replaced = replaced.replace(root, ROOT_PLACEHOLDER);
        }
    }
    redact_paths(&replaced)
}

/// Last lines of renderer stderr; tracebacks end with the useful part.
pub fn stderr_excerpt(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim_end().lines().collect();
    if lines.len() <= STDERR_EXCERPT_LINES {
        return lines.join("\n");
    }
    let skipped = lines.len() - STDERR_EXCERPT_LINES;
    format!(
        "... ({} lines omitted)\n{}",
        skipped,
        lines[skipped..].join("\n")
    )
}

/// Replace absolute paths with `<…>/file-name`.
pub fn redact_paths(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut token = String::new();
    for ch in text.chars() {
        if is_delimiter(ch) {
            flush_token(&mut out, &mut token);
            out.push(ch);
        } else {
            token.push(ch);
        }
    }
    flush_token(&mut out, &mut token);
    out
}

fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '"' | '\'' | ',' | '(' | ')' | '[' | ']' | '`')
}

fn flush_token(out: &mut String, token: &mut String) {
    if looks_like_absolute_path(token) {
        let name = token
            .trim_end_matches(['/', '\\', ':'])
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default();
        out.push_str("<…>/");
        out.push_str(name);
        if token.ends_with(':') {
            out.push(':');
        }
    } else {
        out.push_str(token);
    }
    token.clear();
}

fn looks_like_absolute_path(token: &str) -> bool {
    let unix = token.starts_with('/') && token[1..].contains('/');
    let home = token.starts_with("~/");
    let bytes = token.as_bytes();
    let windows = bytes.len() > 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');
    unix || home || windows
}
