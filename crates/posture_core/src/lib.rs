//! Posture core: pure capture/submit state machine and view-model helpers.
mod effect;
mod media;
mod msg;
mod notice;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use media::{MediaArtifact, MediaFamily, RECORDING_FILENAME, RECORDING_MIME_TYPE};
pub use msg::Msg;
pub use notice::{Notice, Severity};
pub use state::{
    Advice, AppState, CaptureStatus, HealthStatus, Phase, PhaseKind, RecordingSession, RequestId,
    SessionId,
};
pub use update::update;
pub use view_model::{advice_lines, sanitize_line, AppViewModel, ArtifactView, ControlsView};
