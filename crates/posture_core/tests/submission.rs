use std::sync::Once;

use pretty_assertions::assert_eq;
use posture_core::{update, AppState, Effect, MediaArtifact, Msg, Notice, PhaseKind};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(posture_logging::initialize_for_tests);
}

fn staged() -> AppState {
    let artifact = MediaArtifact::new("squat.mp4", "video/mp4", vec![0u8; 16]);
    let (state, _) = update(AppState::new(), Msg::FileSelected(artifact));
    state
}

fn submit(state: AppState) -> (AppState, u64) {
    let (state, effects) = update(state, Msg::SubmitClicked);
    match effects.as_slice() {
        [Effect::UploadMedia { request, artifact }] => {
            assert_eq!(artifact.filename(), "squat.mp4");
            (state, *request)
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

fn with_angle(angle: f64) -> AppState {
    let (state, request) = submit(staged());
    let (state, _) = update(
        state,
        Msg::AngleReceived {
            request,
            result: Ok(angle),
        },
    );
    state
}

fn ask_advice(state: AppState) -> (AppState, u64) {
    let (state, effects) = update(state, Msg::AdviceClicked);
    match effects.as_slice() {
        [Effect::RequestAdvice { request, .. }] => (state, *request),
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn submit_without_artifact_is_noop() {
    init_logging();
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::SubmitClicked);
    assert!(effects.is_empty());
    assert_eq!(next, state);
}

#[test]
fn submission_shows_busy_and_blocks_resubmit() {
    init_logging();
    let (state, _request) = submit(staged());
    let view = state.view();
    assert!(view.busy);
    assert_eq!(view.phase, PhaseKind::Submitting);
    assert!(!view.controls.submit);
    assert!(!view.controls.start_recording);
    assert!(!view.controls.file_input);

    let (_state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty());
}

#[test]
fn successful_submission_publishes_angle() {
    init_logging();
    let state = with_angle(42.5);
    let view = state.view();
    assert_eq!(view.angle, Some(42.5));
    assert!(!view.busy);
    assert_eq!(view.phase, PhaseKind::Submitted);
}

#[test]
fn failed_submission_keeps_angle_unset() {
    init_logging();
    let (state, request) = submit(staged());
    let (state, effects) = update(
        state,
        Msg::AngleReceived {
            request,
            result: Err("http status 500".to_string()),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert!(!view.busy);
    assert_eq!(view.angle, None);
    assert_eq!(view.phase, PhaseKind::Staged);
    assert!(view.controls.submit);
    assert_eq!(
        view.notice,
        Some(Notice::UploadFailed {
            reason: "http status 500".to_string()
        })
    );
}

#[test]
fn resubmission_clears_previous_angle_and_advice() {
    init_logging();
    let (state, request) = ask_advice(with_angle(30.0));
    let (state, _) = update(
        state,
        Msg::AdviceReceived {
            request,
            result: Ok("Sit up.".to_string()),
        },
    );
    assert_eq!(state.view().advice.as_deref(), Some("Sit up."));

    let (state, request) = submit(state);
    let view = state.view();
    assert_eq!(view.angle, None);
    assert_eq!(view.advice, None);

    // A failed retry must not bring the old angle back.
    let (state, _) = update(
        state,
        Msg::AngleReceived {
            request,
            result: Err("network error".to_string()),
        },
    );
    assert_eq!(state.view().angle, None);
    assert_eq!(state.view().advice, None);
}

#[test]
fn stale_angle_response_is_ignored() {
    init_logging();
    let (state, first) = submit(staged());
    let (state, _) = update(
        state,
        Msg::AngleReceived {
            request: first,
            result: Err("timeout".to_string()),
        },
    );
    let (state, second) = submit(state);
    assert_ne!(first, second);

    let (state, _) = update(
        state,
        Msg::AngleReceived {
            request: first,
            result: Ok(10.0),
        },
    );
    assert!(state.view().busy);

    let (state, _) = update(
        state,
        Msg::AngleReceived {
            request: second,
            result: Ok(12.0),
        },
    );
    assert_eq!(state.view().angle, Some(12.0));
}

#[test]
fn advice_without_angle_is_rejected_without_request() {
    init_logging();
    for state in [AppState::new(), staged(), submit(staged()).0] {
        let (next, effects) = update(state, Msg::AdviceClicked);
        assert!(effects.is_empty());
        assert_eq!(next.view().notice, Some(Notice::AngleRequired));
    }
}

#[test]
fn advice_request_carries_angle() {
    init_logging();
    let (state, effects) = update(with_angle(42.5), Msg::AdviceClicked);
    match effects.as_slice() {
        [Effect::RequestAdvice { angle, .. }] => assert_eq!(*angle, 42.5),
        other => panic!("unexpected effects {other:?}"),
    }
    let view = state.view();
    assert!(view.advice_pending);
    assert!(!view.controls.advise);

    let (_state, effects) = update(state, Msg::AdviceClicked);
    assert!(effects.is_empty());
}

#[test]
fn advice_is_displayed_with_line_breaks() {
    init_logging();
    let (state, request) = ask_advice(with_angle(42.5));
    let (state, _) = update(
        state,
        Msg::AdviceReceived {
            request,
            result: Ok("Keep your back straight.\nBend knees.".to_string()),
        },
    );
    let view = state.view();
    assert!(!view.advice_pending);
    assert_eq!(
        view.advice_lines(),
        vec!["Keep your back straight.", "Bend knees."]
    );
}

#[test]
fn failed_advice_keeps_previous_text() {
    init_logging();
    let (state, request) = ask_advice(with_angle(42.5));
    let (state, _) = update(
        state,
        Msg::AdviceReceived {
            request,
            result: Ok("Stand tall.".to_string()),
        },
    );

    let (state, request) = ask_advice(state);
    // Previous advice stays visible while the new request is in flight.
    assert_eq!(state.view().advice.as_deref(), Some("Stand tall."));

    let (state, _) = update(
        state,
        Msg::AdviceReceived {
            request,
            result: Err("http status 502".to_string()),
        },
    );
    let view = state.view();
    assert_eq!(view.advice.as_deref(), Some("Stand tall."));
    assert_eq!(view.angle, Some(42.5));
    assert_eq!(
        view.notice,
        Some(Notice::RecommendationFailed {
            reason: "http status 502".to_string()
        })
    );
}

#[test]
fn new_artifact_drops_angle_and_advice() {
    init_logging();
    let state = with_angle(42.5);
    let (state, _) = update(
        state,
        Msg::FileSelected(MediaArtifact::new("other.webm", "video/webm", vec![1u8])),
    );
    let view = state.view();
    assert_eq!(view.phase, PhaseKind::Staged);
    assert_eq!(view.angle, None);
    assert_eq!(view.advice, None);
}
