use std::fs;
use std::path::Path;

use anyhow::Context;
use posture_core::MediaArtifact;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Declared MIME type for a picked file, from its extension.
pub fn declared_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("mp4" | "m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("ogv") => "video/ogg",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => FALLBACK_MIME,
    }
}

/// Read a user-selected file. The type check itself happens in the core.
pub fn read_selection(path: &Path) -> anyhow::Result<MediaArtifact> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(MediaArtifact::new(filename, declared_mime_type(path), bytes))
}
