use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// User-facing notices. Each is handled where it occurs; none is fatal.
///
/// `reason` fields hold the technical detail for logs and the detail view;
/// `Display` gives the generic text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    DeviceUnavailable { reason: String },
    UnsupportedMediaType { mime_type: String },
    UploadFailed { reason: String },
    RecommendationFailed { reason: String },
    /// Recommendation requested before an angle exists.
    AngleRequired,
}

impl Notice {
    pub fn severity(&self) -> Severity {
        match self {
            Notice::UnsupportedMediaType { .. } | Notice::AngleRequired => Severity::Warning,
            Notice::DeviceUnavailable { .. }
            | Notice::UploadFailed { .. }
            | Notice::RecommendationFailed { .. } => Severity::Error,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Notice::DeviceUnavailable { reason }
            | Notice::UploadFailed { reason }
            | Notice::RecommendationFailed { reason } => Some(reason),
            Notice::UnsupportedMediaType { mime_type } => Some(mime_type),
            Notice::AngleRequired => None,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::DeviceUnavailable { .. } => write!(f, "Could not access the camera."),
            Notice::UnsupportedMediaType { .. } => {
                write!(f, "Please select a valid video or image file.")
            }
            Notice::UploadFailed { .. } => {
                write!(f, "An error occurred while computing the angle.")
            }
            Notice::RecommendationFailed { .. } => {
                write!(f, "An error occurred while fetching recommendations.")
            }
            Notice::AngleRequired => write!(f, "Please compute the angle first."),
        }
    }
}
