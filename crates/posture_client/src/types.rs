use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub type SessionId = u64;
pub type RequestId = u64;

/// Media handed to the angle endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthReport {
    pub status: String,
}

/// Body of `POST /get_back_angle`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AngleResponse {
    pub average_angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct AdviceRequest {
    pub angle: f64,
}

/// Body of `POST /back_recommendation`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdviceResponse {
    pub advice: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    HealthChecked(Result<HealthReport, ClientError>),
    AngleCompleted {
        request: RequestId,
        result: Result<f64, ClientError>,
    },
    AdviceCompleted {
        request: RequestId,
        result: Result<String, ClientError>,
    },
    CaptureStarted {
        session: SessionId,
    },
    CaptureFailed {
        session: SessionId,
        error: DeviceError,
    },
    ChunkAvailable {
        session: SessionId,
        chunk: Bytes,
    },
    /// Sent after the last `ChunkAvailable` of the session.
    CaptureStopped {
        session: SessionId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// True when the server never answered (as opposed to answering badly).
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, FailureKind::Network | FailureKind::Timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    InvalidRequest,
    HttpStatus(u16),
    Timeout,
    Network,
    InvalidResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidRequest => write!(f, "invalid request"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("camera read failed: {0}")]
    Read(String),
}
