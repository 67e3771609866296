use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use posture_logging::{posture_debug, posture_info};
use tokio::io::AsyncReadExt;
use tokio::net::unix::pipe;

use crate::DeviceError;

/// EBML magic that opens every WebM (Matroska) stream.
pub const WEBM_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// Source of exclusive camera streams.
#[async_trait::async_trait]
pub trait CaptureDevice: Send + Sync {
    async fn open(&self) -> Result<Box<dyn VideoStream>, DeviceError>;
}

/// An open camera stream delivering encoded media. Dropping it releases the device.
#[async_trait::async_trait]
pub trait VideoStream: Send {
    /// Next chunk of at most `max_bytes`; `Ok(None)` once the source has ended.
    async fn next_chunk(&mut self, max_bytes: usize) -> Result<Option<Bytes>, DeviceError>;
}

/// Camera fed through a named pipe by an external encoder that writes WebM,
/// e.g. `ffmpeg -f v4l2 -i /dev/video0 -c:v libvpx -f webm <fifo>`.
///
/// Raw device nodes are refused: the recording is tagged `video/webm`, so the
/// stream must already be encoded. The pipe is read without blocking threads,
/// so dropping the stream closes it at once even with no data in flight.
#[derive(Debug, Clone)]
pub struct FifoCamera {
    path: PathBuf,
    in_use: Arc<AtomicBool>,
}

impl FifoCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            in_use: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a stream from this camera is currently open.
    pub fn is_in_use(&self) -> bool {
        self.in_use.load(Ordering::Acquire)
    }
}

#[async_trait::async_trait]
impl CaptureDevice for FifoCamera {
    async fn open(&self) -> Result<Box<dyn VideoStream>, DeviceError> {
        if self
            .in_use
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DeviceError::Unavailable(format!(
                "{} is already in use",
                self.path.display()
            )));
        }
        // Claimed above; the guard gives it back on every exit path from here.
        let claim = DeviceClaim {
            in_use: self.in_use.clone(),
        };

        let metadata = tokio::fs::metadata(&self.path)
            .await
            .map_err(|err| unavailable(&self.path, &err))?;
        let file_type = metadata.file_type();
        if !file_type.is_fifo() {
            let what = if file_type.is_dir() {
                "a directory"
            } else if file_type.is_char_device() {
                "a raw device node"
            } else {
                "not a FIFO"
            };
            return Err(DeviceError::Unavailable(format!(
                "{} is {what}; point the camera at a FIFO carrying WebM",
                self.path.display()
            )));
        }

        let mut options = pipe::OpenOptions::new();
        // Holding a write end keeps the pipe from reporting EOF between writers.
        #[cfg(target_os = "linux")]
        options.read_write(true);
        let receiver = options
            .open_receiver(&self.path)
            .map_err(|err| unavailable(&self.path, &err))?;

        posture_info!("Camera opened path={}", self.path.display());
        Ok(Box::new(FifoStream {
            receiver,
            path: self.path.clone(),
            header_checked: false,
            _claim: claim,
        }))
    }
}

fn unavailable(path: &Path, err: &io::Error) -> DeviceError {
    let reason = match err.kind() {
        io::ErrorKind::NotFound => "no such device".to_string(),
        io::ErrorKind::PermissionDenied => "permission denied".to_string(),
        _ => err.to_string(),
    };
    DeviceError::Unavailable(format!("{}: {reason}", path.display()))
}

struct DeviceClaim {
    in_use: Arc<AtomicBool>,
}

impl Drop for DeviceClaim {
    fn drop(&mut self) {
        self.in_use.store(false, Ordering::Release);
    }
}

// Field order matters: the pipe is closed before the claim is given back.
struct FifoStream {
    receiver: pipe::Receiver,
    path: PathBuf,
    header_checked: bool,
    _claim: DeviceClaim,
}

#[async_trait::async_trait]
impl VideoStream for FifoStream {
    async fn next_chunk(&mut self, max_bytes: usize) -> Result<Option<Bytes>, DeviceError> {
        let mut buf = vec![0u8; max_bytes.max(WEBM_MAGIC.len())];
        let mut filled = 0;
        loop {
            let read = self
                .receiver
                .read(&mut buf[filled..])
                .await
                .map_err(|err| DeviceError::Read(err.to_string()))?;
            if read == 0 {
                if filled > 0 {
                    return Err(DeviceError::Read(
                        "stream ended inside the WebM header".to_string(),
                    ));
                }
                return Ok(None);
            }
            filled += read;
            if self.header_checked {
                break;
            }
            if filled >= WEBM_MAGIC.len() {
                if buf[..WEBM_MAGIC.len()] != WEBM_MAGIC {
                    return Err(DeviceError::Read("stream is not WebM".to_string()));
                }
                self.header_checked = true;
                break;
            }
        }
        buf.truncate(filled);
        Ok(Some(Bytes::from(buf)))
    }
}

impl Drop for FifoStream {
    fn drop(&mut self) {
        posture_debug!("Camera released path={}", self.path.display());
    }
}
