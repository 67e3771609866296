//! Posture client: backend HTTP contract, capture devices and effect execution.
mod backend;
mod capture;
mod engine;
mod recorder;
mod types;

pub use backend::{Backend, BackendSettings, ReqwestBackend};
pub use capture::{CaptureDevice, FifoCamera, VideoStream, WEBM_MAGIC};
pub use engine::EngineHandle;
pub use recorder::RecorderSettings;
pub use types::{
    AdviceResponse, AngleResponse, ClientError, DeviceError, EngineEvent, FailureKind,
    HealthReport, MediaUpload, RequestId, SessionId,
};
