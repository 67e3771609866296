use bytes::{Bytes, BytesMut};

/// Container type of finalized recordings.
pub const RECORDING_MIME_TYPE: &str = "video/webm";
pub const RECORDING_FILENAME: &str = "recording.webm";

/// Media families the analysis endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFamily {
    Video,
    Image,
}

impl MediaFamily {
    /// Classify a declared MIME type. Parameters (`; codecs=...`) are ignored
    /// and the comparison is case-insensitive. An empty subtype is rejected.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let essence = mime_type.split(';').next().unwrap_or(mime_type).trim();
        let (kind, subtype) = essence.split_once('/')?;
        if subtype.trim().is_empty() {
            return None;
        }
        if kind.eq_ignore_ascii_case("video") {
            Some(Self::Video)
        } else if kind.eq_ignore_ascii_case("image") {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// Finalized video/image payload ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaArtifact {
    filename: String,
    mime_type: String,
    bytes: Bytes,
}

impl MediaArtifact {
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Concatenate recorded chunks, in order, into one recording artifact.
    pub fn from_chunks(chunks: Vec<Bytes>) -> Self {
        let total = chunks.iter().map(Bytes::len).sum();
        let mut joined = BytesMut::with_capacity(total);
        for chunk in chunks {
            joined.extend_from_slice(&chunk);
        }
        Self::new(RECORDING_FILENAME, RECORDING_MIME_TYPE, joined.freeze())
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn family(&self) -> Option<MediaFamily> {
        MediaFamily::from_mime(&self.mime_type)
    }
}
