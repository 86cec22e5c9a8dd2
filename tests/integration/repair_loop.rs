//! Repair loop behavior against real extraction, writing, and resolution.

use crate::integration::test_utils::{
    contract_for, fenced, pipeline, FakeRenderer, ScriptedClient, SequenceNamer,
};
use scenesmith::config::ScenesmithConfig;
use scenesmith::error::PipelineError;
use scenesmith::orchestrator::{GenerationContext, RepairPolicy};
use scenesmith::pipeline::{PipelineState, RepairConfig};
use scenesmith::session::SessionStatus;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_render_failure_is_fed_back_and_second_attempt_succeeds() {
    let dir = TempDir::new().unwrap();
    let config = ScenesmithConfig::default();
    let renderer = Arc::new(FakeRenderer::new(contract_for(&config, dir.path())).failing_first(1));
    let code = ScriptedClient::new(&[&fenced("Circl()"), &fenced("Circle()")]);
    let pipeline = pipeline(
        &config,
        dir.path(),
        code.clone(),
        renderer.clone(),
        SequenceNamer::new(&["aaaaaaaaaa", "bbbbbbbbbb"]),
        RepairConfig::default(),
    );

    let report = pipeline.generate(GenerationContext::new("draw a circle")).await;
    assert_eq!(report.attempts, 2);
    assert!(report.states().contains(&PipelineState::Repairing));
    assert_eq!(report.session.status, SessionStatus::Completed);

    let prompts = code.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(!prompts[0].contains("Previous attempts failed"));
    assert!(prompts[1].contains("Attempt 1 (render error)"));
    assert!(prompts[1].contains("NameError on render 1"));

    let video = report.into_result().unwrap();
    assert_eq!(video.artifact.identifier.as_str(), "bbbbbbbbbb");
    assert_eq!(video.bytes, b"video:Circle()");
    assert_eq!(renderer.calls(), 2);
}

#[tokio::test]
async fn test_exhaustion_reports_last_error_and_attempt_count() {
    let dir = TempDir::new().unwrap();
    let config = ScenesmithConfig::default();
    let renderer = Arc::new(FakeRenderer::new(contract_for(&config, dir.path())).failing_first(10));
    let pipeline = pipeline(
        &config,
        dir.path(),
        ScriptedClient::new(&[&fenced("broken()")]),
        renderer.clone(),
        SequenceNamer::new(&[]),
        RepairConfig {
            max_attempts: 3,
            ..RepairConfig::default()
        },
    );

    let report = pipeline.generate(GenerationContext::new("x")).await;
    assert_eq!(report.session.status, SessionStatus::Failed);
    assert_eq!(report.states().last(), Some(&PipelineState::Exhausted));
    match report.into_result() {
        Err(PipelineError::PipelineExhausted {
            attempts,
            last_error,
        }) => {
            assert_eq!(attempts, 3);
            match *last_error {
                PipelineError::Render { stderr, .. } => {
                    assert!(stderr.ends_with("NameError on render 3"))
                }
                other => panic!("unexpected last error {other:?}"),
            }
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert_eq!(renderer.calls(), 3);
}

#[tokio::test]
async fn test_latest_only_policy_sends_only_newest_failure() {
    let dir = TempDir::new().unwrap();
    let config = ScenesmithConfig::default();
    let renderer = Arc::new(FakeRenderer::new(contract_for(&config, dir.path())).failing_first(2));
    let code = ScriptedClient::new(&[&fenced("v1()"), &fenced("v2()"), &fenced("v3()")]);
    let pipeline = pipeline(
        &config,
        dir.path(),
        code.clone(),
        renderer,
        SequenceNamer::new(&[]),
        RepairConfig {
            policy: RepairPolicy::LatestOnly,
            ..RepairConfig::default()
        },
    );

    let report = pipeline.generate(GenerationContext::new("x")).await;
    assert!(report.outcome.is_ok());

    let third = &code.prompts()[2];
    assert!(third.contains("Attempt 2 (render error)"));
    assert!(!third.contains("Attempt 1"));
}

#[tokio::test]
async fn test_feedback_is_truncated_to_its_tail() {
    let dir = TempDir::new().unwrap();
    let config = ScenesmithConfig::default();
    let renderer = Arc::new(FakeRenderer::new(contract_for(&config, dir.path())).failing_first(1));
    let code = ScriptedClient::new(&[&fenced("a()"), &fenced("b()")]);
    let pipeline = pipeline(
        &config,
        dir.path(),
        code.clone(),
        renderer,
        SequenceNamer::new(&[]),
        RepairConfig {
            max_feedback_chars: 12,
            ..RepairConfig::default()
        },
    );

    pipeline.generate(GenerationContext::new("x")).await;
    let second = &code.prompts()[1];
    assert!(second.contains("on render 1"));
    assert!(!second.contains("Traceback"));
}
