mod common;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use bytes::Bytes;
use pretty_assertions::assert_eq;
use posture_client::{
    Backend, CaptureDevice, ClientError, DeviceError, EngineEvent, EngineHandle, FifoCamera,
    HealthReport, MediaUpload, RecorderSettings, VideoStream,
};

const WAIT: Duration = Duration::from_secs(5);

struct FixedBackend;

#[async_trait::async_trait]
impl Backend for FixedBackend {
    async fn health(&self) -> Result<HealthReport, ClientError> {
        Ok(HealthReport {
            status: "Backend is running".to_string(),
        })
    }

    async fn back_angle(&self, media: &MediaUpload) -> Result<f64, ClientError> {
        Ok(media.bytes.len() as f64 + 0.5)
    }

    async fn back_recommendation(&self, angle: f64) -> Result<String, ClientError> {
        Ok(format!("angle {angle}"))
    }
}

/// Camera that yields a fixed script of chunks and then idles like a live feed.
struct ScriptedCamera {
    chunks: Vec<&'static [u8]>,
    available: bool,
    released: Arc<AtomicBool>,
}

impl ScriptedCamera {
    fn new(chunks: Vec<&'static [u8]>) -> Self {
        Self {
            chunks,
            available: true,
            released: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait::async_trait]
impl CaptureDevice for ScriptedCamera {
    async fn open(&self) -> Result<Box<dyn VideoStream>, DeviceError> {
        if !self.available {
            return Err(DeviceError::Unavailable("permission denied".to_string()));
        }
        Ok(Box::new(ScriptedStream {
            chunks: self.chunks.iter().map(|c| Bytes::from_static(c)).collect(),
            released: self.released.clone(),
        }))
    }
}

struct ScriptedStream {
    chunks: VecDeque<Bytes>,
    released: Arc<AtomicBool>,
}

#[async_trait::async_trait]
impl VideoStream for ScriptedStream {
    async fn next_chunk(&mut self, _max_bytes: usize) -> Result<Option<Bytes>, DeviceError> {
        match self.chunks.pop_front() {
            Some(chunk) => Ok(Some(chunk)),
            None => std::future::pending().await,
        }
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

fn fast_recorder() -> RecorderSettings {
    RecorderSettings {
        chunk_interval: Duration::from_millis(5),
        max_chunk_bytes: 1024,
        flush_grace: Duration::from_millis(20),
    }
}

fn spawn(camera: ScriptedCamera) -> (EngineHandle, mpsc::Receiver<EngineEvent>, Arc<AtomicBool>) {
    let released = camera.released.clone();
    let (engine, events) =
        EngineHandle::spawn(Arc::new(FixedBackend), Arc::new(camera), fast_recorder())
            .expect("engine");
    (engine, events, released)
}

fn next(events: &mpsc::Receiver<EngineEvent>) -> EngineEvent {
    events.recv_timeout(WAIT).expect("engine event")
}

#[test]
fn recording_delivers_chunks_before_stop() {
    posture_logging::initialize_for_tests();
    let (engine, events, released) = spawn(ScriptedCamera::new(vec![b"a", b"bc", b"def"]));

    engine.open_camera(1);
    assert_eq!(next(&events), EngineEvent::CaptureStarted { session: 1 });

    let mut received = Vec::new();
    while received.len() < 3 {
        match next(&events) {
            EngineEvent::ChunkAvailable { session, chunk } => {
                assert_eq!(session, 1);
                received.push(chunk);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(
        received,
        vec![
            Bytes::from_static(b"a"),
            Bytes::from_static(b"bc"),
            Bytes::from_static(b"def")
        ]
    );

    engine.stop_camera(1);
    assert_eq!(next(&events), EngineEvent::CaptureStopped { session: 1 });
    assert!(released.load(Ordering::SeqCst));
    engine.shutdown();
}

#[test]
fn immediate_stop_ends_with_capture_stopped() {
    posture_logging::initialize_for_tests();
    let (engine, events, released) = spawn(ScriptedCamera::new(Vec::new()));

    engine.open_camera(4);
    engine.stop_camera(4);

    assert_eq!(next(&events), EngineEvent::CaptureStarted { session: 4 });
    assert_eq!(next(&events), EngineEvent::CaptureStopped { session: 4 });
    assert!(released.load(Ordering::SeqCst));
    engine.shutdown();
}

#[test]
fn unavailable_camera_reports_failure() {
    posture_logging::initialize_for_tests();
    let mut camera = ScriptedCamera::new(Vec::new());
    camera.available = false;
    let (engine, events, _released) = spawn(camera);

    engine.open_camera(2);
    assert_eq!(
        next(&events),
        EngineEvent::CaptureFailed {
            session: 2,
            error: DeviceError::Unavailable("permission denied".to_string()),
        }
    );
    engine.shutdown();
}

#[test]
fn shutdown_releases_active_recording() {
    posture_logging::initialize_for_tests();
    let (engine, events, released) = spawn(ScriptedCamera::new(Vec::new()));

    engine.open_camera(3);
    assert_eq!(next(&events), EngineEvent::CaptureStarted { session: 3 });
    assert!(!released.load(Ordering::SeqCst));

    engine.shutdown();
    assert!(released.load(Ordering::SeqCst));
}

#[cfg(target_os = "linux")]
#[test]
fn stop_with_idle_encoder_closes_the_pipe_before_next_session() {
    use common::{make_fifo, open_encoder, open_handles};

    posture_logging::initialize_for_tests();
    let temp = tempfile::TempDir::new().unwrap();
    let fifo = make_fifo(temp.path());
    let _encoder = open_encoder(&fifo);
    let camera = FifoCamera::new(&fifo);
    let (engine, events) =
        EngineHandle::spawn(Arc::new(FixedBackend), Arc::new(camera.clone()), fast_recorder())
            .expect("engine");

    engine.open_camera(1);
    assert_eq!(next(&events), EngineEvent::CaptureStarted { session: 1 });
    // Let the recorder park on a read the encoder never satisfies.
    std::thread::sleep(Duration::from_millis(50));
    engine.stop_camera(1);
    assert_eq!(next(&events), EngineEvent::CaptureStopped { session: 1 });
    assert!(!camera.is_in_use());
    assert_eq!(open_handles(&fifo), 1);

    engine.open_camera(2);
    assert_eq!(next(&events), EngineEvent::CaptureStarted { session: 2 });
    assert_eq!(open_handles(&fifo), 2);

    engine.shutdown();
    assert!(!camera.is_in_use());
    assert_eq!(open_handles(&fifo), 1);
}

#[test]
fn backend_requests_report_results_with_ids() {
    posture_logging::initialize_for_tests();
    let (engine, events, _released) = spawn(ScriptedCamera::new(Vec::new()));

    engine.probe_health();
    assert_eq!(
        next(&events),
        EngineEvent::HealthChecked(Ok(HealthReport {
            status: "Backend is running".to_string()
        }))
    );

    engine.upload(
        7,
        MediaUpload {
            filename: "clip.mp4".to_string(),
            mime_type: "video/mp4".to_string(),
            bytes: Bytes::from_static(b"0123456789"),
        },
    );
    assert_eq!(
        next(&events),
        EngineEvent::AngleCompleted {
            request: 7,
            result: Ok(10.5)
        }
    );

    engine.advise(8, 10.5);
    assert_eq!(
        next(&events),
        EngineEvent::AdviceCompleted {
            request: 8,
            result: Ok("angle 10.5".to_string())
        }
    );
    engine.shutdown();
}
