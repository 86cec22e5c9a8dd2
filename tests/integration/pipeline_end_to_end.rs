//! End-to-end generation: stage outputs through extraction, naming, rendering, and resolution.

use crate::integration::test_utils::{
    contract_for, fenced, pipeline, source_path, FakeRenderer, ScriptedClient, SequenceNamer,
};
use scenesmith::error::PipelineError;
use scenesmith::orchestrator::{GenerationContext, StageKind};
use scenesmith::pipeline::{PipelineState, RepairConfig};
use scenesmith::config::ScenesmithConfig;
use std::sync::Arc;
use tempfile::TempDir;

const SCENE: &str = "from manim import *\n\nclass SolutionAnimation(Scene):\n    def construct(self):\n        self.play(Create(Circle()))";

#[tokio::test]
async fn test_generate_returns_video_for_its_own_identifier() {
    let dir = TempDir::new().unwrap();
    let config = ScenesmithConfig::default();
    let renderer = Arc::new(FakeRenderer::new(contract_for(&config, dir.path())));
    let code = ScriptedClient::new(&[&fenced(SCENE)]);
    let pipeline = pipeline(
        &config,
        dir.path(),
        code,
        renderer.clone(),
        SequenceNamer::new(&["abcdefghij"]),
        RepairConfig::default(),
    );

    let report = pipeline
        .generate(GenerationContext::new("Find the area of a circle of radius 2"))
        .await;
    assert_eq!(report.attempts, 1);
    assert_eq!(
        report.states(),
        vec![
            PipelineState::Generating,
            PipelineState::Extracting,
            PipelineState::Writing,
            PipelineState::Rendering,
            PipelineState::Resolving,
            PipelineState::Success,
        ]
    );

    let session = &report.session;
    assert!(session.latest(StageKind::Decomposer).is_some());
    assert!(session.latest(StageKind::CodeAuthor).unwrap().run_id.is_some());

    let video = report.into_result().unwrap();
    assert_eq!(video.artifact.identifier.as_str(), "abcdefghij");
    assert_eq!(video.artifact.quality_profile, "480p10");
    assert_eq!(video.bytes, format!("video:{SCENE}").into_bytes());
    assert!(video
        .artifact
        .path
        .ends_with("manim/media/videos/abcdefghij/480p10/SolutionAnimation.mp4"));

    // source body is written verbatim, fences stripped
    let written = std::fs::read_to_string(source_path(dir.path(), "abcdefghij")).unwrap();
    assert_eq!(written, SCENE);
    assert_eq!(renderer.calls(), 1);
}

#[tokio::test]
async fn test_run_registry_tracks_source_and_video() {
    let dir = TempDir::new().unwrap();
    let config = ScenesmithConfig::default();
    let renderer = Arc::new(FakeRenderer::new(contract_for(&config, dir.path())));
    let pipeline = pipeline(
        &config,
        dir.path(),
        ScriptedClient::new(&[&fenced("x = 1")]),
        renderer,
        SequenceNamer::new(&["qwertyuiop"]),
        RepairConfig::default(),
    );

    let report = pipeline.generate(GenerationContext::new("1 + 1")).await;
    let run_id = report
        .session
        .latest(StageKind::CodeAuthor)
        .and_then(|r| r.run_id)
        .unwrap();
    assert!(report.outcome.is_ok());

    let entry = pipeline.compiler().registry().get(run_id).unwrap();
    assert_eq!(entry.identifier.as_str(), "qwertyuiop");
    assert_eq!(entry.source_path, source_path(dir.path(), "qwertyuiop"));
    assert!(entry.video_path.unwrap().ends_with("SolutionAnimation.mp4"));
}

#[tokio::test]
async fn test_stale_newer_video_does_not_leak_into_result() {
    let dir = TempDir::new().unwrap();
    let config = ScenesmithConfig::default();
    let contract = contract_for(&config, dir.path());

    let renderer = Arc::new(FakeRenderer::new(contract.clone()));
    let pipeline = pipeline(
        &config,
        dir.path(),
        ScriptedClient::new(&[&fenced("mine = True")]),
        renderer,
        SequenceNamer::new(&["mmmmmmmmmm"]),
        RepairConfig::default(),
    );
    let report = pipeline.generate(GenerationContext::new("mine")).await;

    // a foreign video written afterwards is newer than ours
    let foreign = contract.video_path(&scenesmith::artifact::Identifier::parse("zzzzzzzzzz").unwrap());
    std::fs::create_dir_all(foreign.parent().unwrap()).unwrap();
    std::fs::write(&foreign, b"someone else").unwrap();

    let video = report.into_result().unwrap();
    assert_eq!(video.bytes, b"video:mine = True");

    let fetched = pipeline
        .compiler()
        .resolver()
        .resolve_identifier(&video.artifact.identifier)
        .unwrap();
    assert_eq!(fetched.bytes, b"video:mine = True");
}

#[tokio::test]
async fn test_unfenced_answers_exhaust_without_rendering() {
    let dir = TempDir::new().unwrap();
    let config = ScenesmithConfig::default();
    let renderer = Arc::new(FakeRenderer::new(contract_for(&config, dir.path())));
    let pipeline = pipeline(
        &config,
        dir.path(),
        ScriptedClient::new(&["Sure! Here is the scene: class A: pass"]),
        renderer.clone(),
        SequenceNamer::new(&[]),
        RepairConfig {
            max_attempts: 2,
            ..RepairConfig::default()
        },
    );

    let report = pipeline.generate(GenerationContext::new("anything")).await;
    assert_eq!(report.attempts, 2);
    match report.into_result() {
        Err(PipelineError::PipelineExhausted {
            attempts,
            last_error,
        }) => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last_error, PipelineError::Format(_)));
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert_eq!(renderer.calls(), 0);
    assert!(!dir.path().join("manim/scripts").exists());
}
