use bytes::Bytes;

use crate::view_model::{ArtifactView, ControlsView};
use crate::{AppViewModel, MediaArtifact, Notice};

pub type SessionId = u64;
pub type RequestId = u64;

/// Result of the one-shot backend probe.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Checking,
    /// Backend answered; carries the status string it reported.
    Ok(String),
    /// Backend answered with a non-success HTTP status.
    Unreachable,
    /// No response at all (refused, DNS, network).
    ConnectionError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// Waiting for the camera to be granted.
    Acquiring,
    /// Stream open, chunks accumulating, timer running.
    Live,
    /// Stop requested; waiting for the recorder's final chunks.
    Stopping,
}

/// Transient state for an active camera capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSession {
    id: SessionId,
    status: CaptureStatus,
    chunks: Vec<Bytes>,
    /// Artifact staged before this recording; restored if the camera fails.
    prior: Option<MediaArtifact>,
}

impl RecordingSession {
    pub(crate) fn new(id: SessionId, prior: Option<MediaArtifact>) -> Self {
        Self {
            id,
            status: CaptureStatus::Acquiring,
            chunks: Vec::new(),
            prior,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn status(&self) -> CaptureStatus {
        self.status
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn recorded_bytes(&self) -> u64 {
        self.chunks.iter().map(|chunk| chunk.len() as u64).sum()
    }

    pub(crate) fn set_status(&mut self, status: CaptureStatus) {
        self.status = status;
    }

    pub(crate) fn push_chunk(&mut self, chunk: Bytes) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    /// Drain the buffer into the finalized artifact.
    pub(crate) fn finalize(self) -> MediaArtifact {
        MediaArtifact::from_chunks(self.chunks)
    }

    pub(crate) fn into_prior(self) -> Option<MediaArtifact> {
        self.prior
    }
}

/// Advice held next to the angle it was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Advice {
    #[default]
    None,
    Requesting {
        request: RequestId,
        previous: Option<String>,
    },
    Ready(String),
}

/// Application phase. Only one of these can hold at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Recording(RecordingSession),
    Staged {
        artifact: MediaArtifact,
    },
    Submitting {
        request: RequestId,
        artifact: MediaArtifact,
    },
    Submitted {
        artifact: MediaArtifact,
        angle: f64,
        advice: Advice,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseKind {
    #[default]
    Idle,
    Recording,
    Staged,
    Submitting,
    Submitted,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Idle => PhaseKind::Idle,
            Phase::Recording(_) => PhaseKind::Recording,
            Phase::Staged { .. } => PhaseKind::Staged,
            Phase::Submitting { .. } => PhaseKind::Submitting,
            Phase::Submitted { .. } => PhaseKind::Submitted,
        }
    }

    pub fn artifact(&self) -> Option<&MediaArtifact> {
        match self {
            Phase::Idle | Phase::Recording(_) => None,
            Phase::Staged { artifact }
            | Phase::Submitting { artifact, .. }
            | Phase::Submitted { artifact, .. } => Some(artifact),
        }
    }

    /// Phases where the capture sources (camera, file input) are available.
    pub(crate) fn accepts_new_source(&self) -> bool {
        matches!(
            self,
            Phase::Idle | Phase::Staged { .. } | Phase::Submitted { .. }
        )
    }

    /// Take the active artifact out, leaving `Idle` behind.
    pub(crate) fn take_artifact(&mut self) -> Option<MediaArtifact> {
        match std::mem::take(self) {
            Phase::Idle => None,
            Phase::Recording(session) => {
                *self = Phase::Recording(session);
                None
            }
            Phase::Staged { artifact }
            | Phase::Submitting { artifact, .. }
            | Phase::Submitted { artifact, .. } => Some(artifact),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    phase: Phase,
    health: HealthStatus,
    health_probe_sent: bool,
    /// Display counter; survives the end of a recording until the next start.
    elapsed_secs: u32,
    notice: Option<Notice>,
    last_session: SessionId,
    last_request: RequestId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn health(&self) -> &HealthStatus {
        &self.health
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn view(&self) -> AppViewModel {
        let (angle, advice, advice_pending) = match &self.phase {
            Phase::Submitted { angle, advice, .. } => match advice {
                Advice::None => (Some(*angle), None, false),
                Advice::Requesting { previous, .. } => (Some(*angle), previous.clone(), true),
                Advice::Ready(text) => (Some(*angle), Some(text.clone()), false),
            },
            _ => (None, None, false),
        };

        let (recording, recorded_bytes) = match &self.phase {
            Phase::Recording(session) => (Some(session.status()), session.recorded_bytes()),
            _ => (None, 0),
        };

        let source_free = self.phase.accepts_new_source();
        let controls = ControlsView {
            start_recording: source_free,
            stop_recording: recording == Some(CaptureStatus::Live),
            file_input: source_free,
            submit: matches!(
                self.phase,
                Phase::Staged { .. } | Phase::Submitted { .. }
            ),
            advise: !advice_pending,
        };

        AppViewModel {
            health: self.health.clone(),
            phase: self.phase.kind(),
            recording,
            elapsed_secs: self.elapsed_secs,
            recorded_bytes,
            artifact: self.phase.artifact().map(ArtifactView::from),
            busy: matches!(self.phase, Phase::Submitting { .. }),
            angle,
            advice,
            advice_pending,
            notice: self.notice.clone(),
            controls,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn phase_mut(&mut self) -> &mut Phase {
        &mut self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.dirty = true;
    }

    /// Returns false if the probe was already issued this run.
    pub(crate) fn begin_health_probe(&mut self) -> bool {
        if self.health_probe_sent {
            return false;
        }
        self.health_probe_sent = true;
        self.health = HealthStatus::Checking;
        self.dirty = true;
        true
    }

    pub(crate) fn set_health(&mut self, health: HealthStatus) {
        self.health = health;
        self.dirty = true;
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.dirty = true;
    }

    pub(crate) fn clear_notice(&mut self) {
        if self.notice.take().is_some() {
            self.dirty = true;
        }
    }

    pub(crate) fn reset_elapsed(&mut self) {
        self.elapsed_secs = 0;
        self.dirty = true;
    }

    pub(crate) fn increment_elapsed(&mut self) {
        self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        self.dirty = true;
    }

    pub(crate) fn next_session_id(&mut self) -> SessionId {
        self.last_session += 1;
        self.last_session
    }

    pub(crate) fn next_request_id(&mut self) -> RequestId {
        self.last_request += 1;
        self.last_request
    }
}
