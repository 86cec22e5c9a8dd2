//! Integration tests driving the scenesmith binary.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct Sandbox {
    _dir: TempDir,
    root: PathBuf,
    workspace: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        let workspace = root.join("ws");
        for sub in ["ws", "config", "state", "data", "home"] {
            fs::create_dir_all(root.join(sub)).unwrap();
        }
        Self {
            _dir: dir,
            root,
            workspace,
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_scenesmith"))
            .env("XDG_CONFIG_HOME", self.root.join("config"))
            .env("XDG_STATE_HOME", self.root.join("state"))
            .env("XDG_DATA_HOME", self.root.join("data"))
            .env("HOME", self.root.join("home"))
            .env_remove("SCENESMITH_LOG")
            .env_remove("SCENESMITH_LOG_OUTPUT")
            .arg("--workspace")
            .arg(&self.workspace)
            .args(args)
            .output()
            .unwrap()
    }

    fn write_workspace_config(&self, body: &str) {
        fs::create_dir_all(self.workspace.join("config")).unwrap();
        fs::write(self.workspace.join("config/config.toml"), body).unwrap();
    }

    fn place_run(&self, id: &str, bytes: &[u8]) {
        let scripts = self.workspace.join("manim/scripts");
        fs::create_dir_all(&scripts).unwrap();
        fs::write(scripts.join(format!("{id}.py")), "pass").unwrap();
        let videos = self.workspace.join("manim/media/videos").join(id).join("480p10");
        fs::create_dir_all(&videos).unwrap();
        fs::write(videos.join("SolutionAnimation.mp4"), bytes).unwrap();
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_config_validate_logs_to_stderr_by_default() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["config", "validate"]);

    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "Configuration is valid.");
    assert!(stderr(&output).contains("scenesmith CLI starting"));
}

#[test]
fn test_quiet_fetch_of_unknown_identifier_fails_cleanly() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["--quiet", "fetch", "abcdefghij"]);

    assert!(!output.status.success());
    assert_eq!(
        stderr(&output).trim(),
        "No source artifact found (identifier abcdefghij)"
    );
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_fetch_rejects_malformed_identifier() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["--quiet", "fetch", "../../etc"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid identifier"));
}

#[test]
fn test_fetch_and_latest_return_stored_video() {
    let sandbox = Sandbox::new();
    sandbox.place_run("abcdefghij", b"rendered-bytes");

    let output = sandbox.run(&["--quiet", "fetch", "abcdefghij"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let bytes = STANDARD
        .decode(value["video_base64"].as_str().unwrap())
        .unwrap();
    assert_eq!(bytes, b"rendered-bytes");

    let target = sandbox.root.join("latest.mp4");
    let output = sandbox.run(&[
        "--quiet",
        "latest",
        "--format",
        "text",
        "--output",
        target.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(stdout(&output).contains("Video: abcdefghij"));
    assert_eq!(fs::read(&target).unwrap(), b"rendered-bytes");
}

#[test]
fn test_file_output_writes_default_log_file() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["--log-output", "file", "config", "validate"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));

    let log_path = sandbox.root.join("state/scenesmith/scenesmith.log");
    let content = fs::read_to_string(&log_path).unwrap();
    assert!(content.contains("scenesmith CLI starting"));
    assert!(!stderr(&output).contains("scenesmith CLI starting"));
}

#[test]
fn test_config_show_masks_inline_keys() {
    let sandbox = Sandbox::new();
    sandbox.write_workspace_config(
        r#"
[providers.openai]
provider_type = "openai"
model = "gpt-4o"
api_key = "sk-very-secret"
"#,
    );
    let output = sandbox.run(&["--quiet", "config", "show", "--format", "json"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(stdout(&output).contains("gpt-4o"));
    assert!(!stdout(&output).contains("sk-very-secret"));
}

#[cfg(unix)]
fn fake_manim(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join("fake-manim.sh");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn test_compile_renders_through_external_program() {
    let sandbox = Sandbox::new();
    // args: -ql --fps 10 --media_dir <media> <source> <scene>
    let program = fake_manim(
        &sandbox.root,
        r#"media="$5"; src="$6"; scene="$7"
id=$(basename "$src" .py)
mkdir -p "$media/videos/$id/480p10"
cp "$src" "$media/videos/$id/480p10/$scene.mp4""#,
    );
    sandbox.write_workspace_config(&format!("[render]\nprogram = {:?}\n", program.to_str().unwrap()));
    let answer = sandbox.root.join("answer.md");
    fs::write(&answer, "```python\nclass SolutionAnimation: pass\n```\n").unwrap();

    let output = sandbox.run(&["--quiet", "compile", answer.to_str().unwrap()]);
    assert!(output.status.success(), "stderr={}", stderr(&output));

    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let identifier = value["identifier"].as_str().unwrap();
    assert_eq!(identifier.len(), 10);
    let bytes = STANDARD
        .decode(value["video_base64"].as_str().unwrap())
        .unwrap();
    assert_eq!(bytes, b"class SolutionAnimation: pass");
    assert!(sandbox
        .workspace
        .join("manim/scripts")
        .join(format!("{identifier}.py"))
        .is_file());
}

#[cfg(unix)]
#[test]
fn test_compile_render_failure_surfaces_redacted_stderr() {
    let sandbox = Sandbox::new();
    let program = fake_manim(
        &sandbox.root,
        r#"echo "  File \"$6\", line 1" >&2
echo "NameError: name 'Circl' is not defined" >&2
exit 1"#,
    );
    sandbox.write_workspace_config(&format!("[render]\nprogram = {:?}\n", program.to_str().unwrap()));
    let answer = sandbox.root.join("answer.md");
    fs::write(&answer, "```python\nCircl()\n```").unwrap();

    let output = sandbox.run(&["--quiet", "compile", answer.to_str().unwrap()]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.starts_with("Render failed with exit status 1"));
    assert!(err.contains("NameError: name 'Circl' is not defined"));
    assert!(!err.contains(sandbox.workspace.to_str().unwrap()));
}
