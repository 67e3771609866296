use crate::{CaptureStatus, HealthStatus, MediaArtifact, Notice, PhaseKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactView {
    pub filename: String,
    pub mime_type: String,
    pub byte_len: u64,
}

impl From<&MediaArtifact> for ArtifactView {
    fn from(artifact: &MediaArtifact) -> Self {
        Self {
            filename: artifact.filename().to_string(),
            mime_type: artifact.mime_type().to_string(),
            byte_len: artifact.len() as u64,
        }
    }
}

/// Which controls the front end should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlsView {
    pub start_recording: bool,
    pub stop_recording: bool,
    pub file_input: bool,
    pub submit: bool,
    pub advise: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub health: HealthStatus,
    pub phase: PhaseKind,
    pub recording: Option<CaptureStatus>,
    pub elapsed_secs: u32,
    pub recorded_bytes: u64,
    pub artifact: Option<ArtifactView>,
    pub busy: bool,
    pub angle: Option<f64>,
    /// Raw advice text; display it through `advice_lines`.
    pub advice: Option<String>,
    pub advice_pending: bool,
    pub notice: Option<Notice>,
    pub controls: ControlsView,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn advice_lines(&self) -> Vec<String> {
        self.advice.as_deref().map(advice_lines).unwrap_or_default()
    }
}

/// Split advice text into display lines.
///
/// `\r\n` and lone `\r` count as line breaks. Each line goes through
/// `sanitize_line`.
pub fn advice_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(sanitize_line)
        .collect()
}

/// Drop control characters other than tab from text received from the
/// backend, so terminal escape sequences never reach the screen.
pub fn sanitize_line(text: &str) -> String {
    text.chars()
        .filter(|ch| *ch == '\t' || !ch.is_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{advice_lines, sanitize_line};

    #[test]
    fn newlines_become_line_breaks() {
        assert_eq!(
            advice_lines("Keep your back straight.\nBend knees."),
            vec!["Keep your back straight.", "Bend knees."]
        );
    }

    #[test]
    fn carriage_returns_are_normalized() {
        assert_eq!(advice_lines("a\r\nb\rc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn escape_sequences_are_stripped() {
        assert_eq!(advice_lines("\u{1b}[31mred\u{1b}[0m\tok"), vec!["[31mred[0m\tok"]);
    }

    #[test]
    fn blank_lines_are_kept() {
        assert_eq!(advice_lines("a\n\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn sanitize_line_flattens_breaks_and_escapes() {
        assert_eq!(sanitize_line("\u{1b}[2Jok\r\nstill\tok"), "[2Jokstill\tok");
    }
}
