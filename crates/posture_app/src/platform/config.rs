//! Front-end configuration.
//!
//! Read from `posture_app.ron` in the working directory, or from the file named
//! by `POSTURE_CONFIG`. Every field is optional; `POSTURE_BACKEND_URL` and
//! `POSTURE_CAMERA` override the file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use posture_client::{BackendSettings, RecorderSettings};
use posture_logging::LogDestination;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILENAME: &str = "posture_app.ron";
pub const CONFIG_ENV: &str = "POSTURE_CONFIG";
pub const BACKEND_URL_ENV: &str = "POSTURE_BACKEND_URL";
pub const CAMERA_ENV: &str = "POSTURE_CAMERA";
pub const DEFAULT_CAMERA_FIFO: &str = "/tmp/posture_camera.fifo";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    /// Named pipe an external encoder writes WebM into.
    pub camera_fifo: PathBuf,
    pub chunk_interval_ms: u64,
    pub max_chunk_bytes: usize,
    pub connect_timeout_secs: u64,
    pub log_level: String,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".to_string(),
            camera_fifo: PathBuf::from(DEFAULT_CAMERA_FIFO),
            chunk_interval_ms: 250,
            max_chunk_bytes: 256 * 1024,
            connect_timeout_secs: 10,
            log_level: "info".to_string(),
            log_destination: LogDestination::File,
            log_file: PathBuf::from("./posture.log"),
        }
    }
}

impl AppConfig {
    /// Load from `POSTURE_CONFIG` or the default file name, then apply
    /// environment overrides. A missing default file is not an error.
    pub fn load_from_env() -> anyhow::Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILENAME);
                if path.exists() {
                    Self::load(path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_overrides(
            std::env::var(BACKEND_URL_ENV).ok(),
            std::env::var_os(CAMERA_ENV).map(PathBuf::from),
        );
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(content)?)
    }

    pub fn apply_overrides(&mut self, backend_url: Option<String>, camera_fifo: Option<PathBuf>) {
        if let Some(url) = backend_url.filter(|url| !url.trim().is_empty()) {
            self.backend_url = url;
        }
        if let Some(path) = camera_fifo {
            self.camera_fifo = path;
        }
    }

    /// Unknown level names fall back to `info`.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.backend_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            ..BackendSettings::default()
        }
    }

    pub fn recorder_settings(&self) -> RecorderSettings {
        RecorderSettings {
            chunk_interval: Duration::from_millis(self.chunk_interval_ms.max(1)),
            max_chunk_bytes: self.max_chunk_bytes.max(1),
            ..RecorderSettings::default()
        }
    }
}
