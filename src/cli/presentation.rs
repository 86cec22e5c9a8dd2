//! Output formatting for video results and configuration reports.

use crate::artifact::resolver::ResolvedVideo;
use crate::config::{ScenesmithConfig, ValidationError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::json;
use std::path::Path;

/// JSON envelope for a resolved video. Bytes are embedded as base64 unless they were
/// written to `written_to`.
pub fn format_video_json(
    video: &ResolvedVideo,
    written_to: Option<&Path>,
    attempts: Option<u32>,
) -> String {
    let artifact = &video.artifact;
    let mut out = json!({
        "identifier": artifact.identifier.as_str(),
        "quality_profile": artifact.quality_profile,
        "created_at": artifact.created_at.to_rfc3339(),
        "bytes": video.bytes.len(),
    });
    if let Some(attempts) = attempts {
        out["attempts"] = json!(attempts);
    }
    match written_to {
        Some(path) => out["written_to"] = json!(path.display().to_string()),
        None => out["video_base64"] = json!(STANDARD.encode(&video.bytes)),
    }
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_video_text(
    video: &ResolvedVideo,
    written_to: Option<&Path>,
    attempts: Option<u32>,
) -> String {
    let artifact = &video.artifact;
    let mut output = format!("Video: {}\n", artifact.identifier);
    output.push_str(&format!("Quality: {}\n", artifact.quality_profile));
    output.push_str(&format!("Size: {} bytes\n", video.bytes.len()));
    if let Some(attempts) = attempts {
        output.push_str(&format!("Attempts: {}\n", attempts));
    }
    match written_to {
        Some(path) => output.push_str(&format!("Written to: {}", path.display())),
        None => output.push_str("Not written (pass --output to save the video)"),
    }
    output
}

pub fn format_validation_result(result: &Result<(), Vec<ValidationError>>) -> String {
    match result {
        Ok(()) => "Configuration is valid.".to_string(),
        Err(errors) => {
            let mut output = format!("Configuration has {} problem(s):\n", errors.len());
            for error in errors {
                output.push_str(&format!("  - {}\n", error));
            }
            output.trim_end().to_string()
        }
    }
}

/// Effective configuration with inline API keys masked.
pub fn format_config(config: &ScenesmithConfig, format: &str) -> Result<String, String> {
    let mut masked = config.clone();
    for provider in masked.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some("********".to_string());
        }
    }
    match format {
        "json" => serde_json::to_string_pretty(&masked).map_err(|e| e.to_string()),
        "toml" => toml::to_string_pretty(&masked).map_err(|e| e.to_string()),
        other => Err(format!("Unknown format '{}' (expected toml or json)", other)),
    }
}
