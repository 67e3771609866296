use crate::{MediaArtifact, RequestId, SessionId};

/// Side effects requested by `update`; executed by the IO engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ProbeHealth,
    OpenCamera { session: SessionId },
    StopCamera { session: SessionId },
    UploadMedia {
        request: RequestId,
        artifact: MediaArtifact,
    },
    RequestAdvice { request: RequestId, angle: f64 },
}
