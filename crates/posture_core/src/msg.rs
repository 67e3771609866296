use bytes::Bytes;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Front end finished setting up; triggers the one-shot health probe.
    AppStarted,
    /// User clicked Start Recording.
    StartRecordingClicked,
    /// User clicked Stop Recording.
    StopRecordingClicked,
    /// User picked a file. The artifact carries the declared MIME type.
    FileSelected(crate::MediaArtifact),
    /// User clicked Submit (angle request).
    SubmitClicked,
    /// User clicked Get Recommendations.
    AdviceClicked,
    /// User dismissed the current notice.
    DismissNotice,
    /// One-second timer tick.
    Tick,
    /// Health probe finished.
    HealthChecked(crate::HealthStatus),
    /// Camera stream acquired for a session.
    CaptureStarted { session: crate::SessionId },
    /// Camera could not be acquired, or failed while recording.
    CaptureFailed {
        session: crate::SessionId,
        reason: String,
    },
    /// Recorder delivered a chunk of encoded media.
    ChunkAvailable {
        session: crate::SessionId,
        chunk: Bytes,
    },
    /// Recorder stopped; always delivered after the session's last chunk.
    CaptureStopped { session: crate::SessionId },
    /// Angle request finished.
    AngleReceived {
        request: crate::RequestId,
        result: Result<f64, String>,
    },
    /// Recommendation request finished.
    AdviceReceived {
        request: crate::RequestId,
        result: Result<String, String>,
    },
}
