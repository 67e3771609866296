use crate::{
    Advice, AppState, CaptureStatus, Effect, HealthStatus, Msg, Notice, Phase, RecordingSession,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::AppStarted => {
            if state.begin_health_probe() {
                vec![Effect::ProbeHealth]
            } else {
                Vec::new()
            }
        }
        Msg::HealthChecked(status) => {
            // A late `Checking` carries no information.
            if status != HealthStatus::Checking {
                state.set_health(status);
            }
            Vec::new()
        }
        Msg::StartRecordingClicked => start_recording(&mut state),
        Msg::StopRecordingClicked => stop_recording(&mut state),
        Msg::CaptureStarted { session } => capture_started(&mut state, session),
        Msg::CaptureFailed { session, reason } => {
            capture_failed(&mut state, session, reason);
            Vec::new()
        }
        Msg::ChunkAvailable { session, chunk } => {
            if let Phase::Recording(active) = state.phase_mut() {
                if active.id() == session && active.status() != CaptureStatus::Acquiring {
                    active.push_chunk(chunk);
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
        Msg::CaptureStopped { session } => {
            capture_stopped(&mut state, session);
            Vec::new()
        }
        Msg::Tick => {
            if let Phase::Recording(active) = state.phase() {
                if active.status() == CaptureStatus::Live {
                    state.increment_elapsed();
                }
            }
            Vec::new()
        }
        Msg::FileSelected(artifact) => {
            if state.phase().accepts_new_source() {
                if artifact.family().is_some() {
                    state.clear_notice();
                    state.set_phase(Phase::Staged { artifact });
                } else {
                    state.set_notice(Notice::UnsupportedMediaType {
                        mime_type: artifact.mime_type().to_string(),
                    });
                }
            }
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::AngleReceived { request, result } => {
            angle_received(&mut state, request, result);
            Vec::new()
        }
        Msg::AdviceClicked => request_advice(&mut state),
        Msg::AdviceReceived { request, result } => {
            advice_received(&mut state, request, result);
            Vec::new()
        }
        Msg::DismissNotice => {
            state.clear_notice();
            Vec::new()
        }
    };

    (state, effects)
}

fn start_recording(state: &mut AppState) -> Vec<Effect> {
    if !state.phase().accepts_new_source() {
        return Vec::new();
    }
    let prior = state.phase_mut().take_artifact();
    let session = state.next_session_id();
    state.clear_notice();
    state.set_phase(Phase::Recording(RecordingSession::new(session, prior)));
    vec![Effect::OpenCamera { session }]
}

fn capture_started(state: &mut AppState, session: crate::SessionId) -> Vec<Effect> {
    match state.phase_mut() {
        Phase::Recording(active) if active.id() == session => {
            if active.status() == CaptureStatus::Acquiring {
                active.set_status(CaptureStatus::Live);
                state.reset_elapsed();
            }
            Vec::new()
        }
        // Nobody owns this stream anymore; release it.
        _ => vec![Effect::StopCamera { session }],
    }
}

fn stop_recording(state: &mut AppState) -> Vec<Effect> {
    match state.phase_mut() {
        Phase::Recording(active) if active.status() == CaptureStatus::Live => {
            active.set_status(CaptureStatus::Stopping);
            let session = active.id();
            state.mark_dirty();
            vec![Effect::StopCamera { session }]
        }
        _ => Vec::new(),
    }
}

fn capture_failed(state: &mut AppState, session: crate::SessionId, reason: String) {
    let is_current = matches!(state.phase(), Phase::Recording(active) if active.id() == session);
    if !is_current {
        return;
    }
    if let Phase::Recording(active) = std::mem::take(state.phase_mut()) {
        let restored = match active.into_prior() {
            Some(artifact) => Phase::Staged { artifact },
            None => Phase::Idle,
        };
        state.set_phase(restored);
    }
    state.set_notice(Notice::DeviceUnavailable { reason });
}

fn capture_stopped(state: &mut AppState, session: crate::SessionId) {
    let finished = matches!(
        state.phase(),
        Phase::Recording(active)
            if active.id() == session && active.status() != CaptureStatus::Acquiring
    );
    if !finished {
        return;
    }
    if let Phase::Recording(active) = std::mem::take(state.phase_mut()) {
        let artifact = active.finalize();
        state.set_phase(Phase::Staged { artifact });
    }
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    if !matches!(
        state.phase(),
        Phase::Staged { .. } | Phase::Submitted { .. }
    ) {
        return Vec::new();
    }
    // Starting a new submission drops the previous angle and advice.
    let Some(artifact) = state.phase_mut().take_artifact() else {
        return Vec::new();
    };
    let request = state.next_request_id();
    state.clear_notice();
    state.set_phase(Phase::Submitting {
        request,
        artifact: artifact.clone(),
    });
    vec![Effect::UploadMedia { request, artifact }]
}

fn angle_received(state: &mut AppState, request: crate::RequestId, result: Result<f64, String>) {
    let is_current = matches!(
        state.phase(),
        Phase::Submitting { request: pending, .. } if *pending == request
    );
    if !is_current {
        return;
    }
    let Some(artifact) = state.phase_mut().take_artifact() else {
        return;
    };
    match result {
        Ok(angle) => state.set_phase(Phase::Submitted {
            artifact,
            angle,
            advice: Advice::None,
        }),
        Err(reason) => {
            state.set_phase(Phase::Staged { artifact });
            state.set_notice(Notice::UploadFailed { reason });
        }
    }
}

fn request_advice(state: &mut AppState) -> Vec<Effect> {
    let angle = match state.phase() {
        Phase::Submitted {
            advice: Advice::Requesting { .. },
            ..
        } => return Vec::new(),
        Phase::Submitted { angle, .. } => *angle,
        _ => {
            state.set_notice(Notice::AngleRequired);
            return Vec::new();
        }
    };

    let request = state.next_request_id();
    if let Phase::Submitted { advice, .. } = state.phase_mut() {
        let previous = match std::mem::take(advice) {
            Advice::Ready(text) => Some(text),
            Advice::None | Advice::Requesting { .. } => None,
        };
        *advice = Advice::Requesting { request, previous };
    }
    state.clear_notice();
    state.mark_dirty();
    vec![Effect::RequestAdvice { request, angle }]
}

fn advice_received(
    state: &mut AppState,
    request: crate::RequestId,
    result: Result<String, String>,
) {
    let Phase::Submitted { advice, .. } = state.phase_mut() else {
        return;
    };
    let previous = match advice {
        Advice::Requesting {
            request: pending,
            previous,
        } if *pending == request => previous.take(),
        _ => return,
    };
    match result {
        Ok(text) => {
            *advice = Advice::Ready(text);
            state.mark_dirty();
        }
        Err(reason) => {
            *advice = previous.map_or(Advice::None, Advice::Ready);
            state.set_notice(Notice::RecommendationFailed { reason });
        }
    }
}
