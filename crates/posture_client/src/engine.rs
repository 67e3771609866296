use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use posture_logging::{posture_debug, posture_info, posture_warn};
use tokio_util::sync::CancellationToken;

use crate::recorder::{run_recording, RecorderSettings};
use crate::{Backend, CaptureDevice, EngineEvent, MediaUpload, RequestId, SessionId};

/// Time given to running recordings to release their devices on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

enum EngineCommand {
    ProbeHealth,
    Upload { request: RequestId, media: MediaUpload },
    Advise { request: RequestId, angle: f64 },
    OpenCamera { session: SessionId },
    StopCamera { session: SessionId },
    Shutdown,
}

/// Handle to the IO engine thread. Commands are fire-and-forget; results come
/// back as `EngineEvent`s on the receiver returned by `spawn`.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn spawn(
        backend: Arc<dyn Backend>,
        camera: Arc<dyn CaptureDevice>,
        recorder: RecorderSettings,
    ) -> io::Result<(Self, mpsc::Receiver<EngineEvent>)> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("posture-engine")
            .build()?;

        let worker = thread::Builder::new()
            .name("posture-engine-commands".to_string())
            .spawn(move || {
                let mut worker = Worker {
                    runtime,
                    backend,
                    camera,
                    recorder,
                    event_tx,
                    recordings: HashMap::new(),
                };
                while let Ok(command) = cmd_rx.recv() {
                    if matches!(command, EngineCommand::Shutdown) {
                        break;
                    }
                    worker.handle(command);
                }
                worker.shutdown();
            })?;

        Ok((
            Self {
                cmd_tx,
                worker: Some(worker),
            },
            event_rx,
        ))
    }

    pub fn probe_health(&self) {
        let _ = self.cmd_tx.send(EngineCommand::ProbeHealth);
    }

    pub fn upload(&self, request: RequestId, media: MediaUpload) {
        let _ = self.cmd_tx.send(EngineCommand::Upload { request, media });
    }

    pub fn advise(&self, request: RequestId, angle: f64) {
        let _ = self.cmd_tx.send(EngineCommand::Advise { request, angle });
    }

    pub fn open_camera(&self, session: SessionId) {
        let _ = self.cmd_tx.send(EngineCommand::OpenCamera { session });
    }

    pub fn stop_camera(&self, session: SessionId) {
        let _ = self.cmd_tx.send(EngineCommand::StopCamera { session });
    }

    /// Stop all recordings, release their devices and join the engine thread.
    pub fn shutdown(mut self) {
        self.stop_worker();
    }

    fn stop_worker(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

struct Worker {
    runtime: tokio::runtime::Runtime,
    backend: Arc<dyn Backend>,
    camera: Arc<dyn CaptureDevice>,
    recorder: RecorderSettings,
    event_tx: mpsc::Sender<EngineEvent>,
    recordings: HashMap<SessionId, CancellationToken>,
}

impl Worker {
    fn handle(&mut self, command: EngineCommand) {
        let backend = self.backend.clone();
        let event_tx = self.event_tx.clone();
        match command {
            EngineCommand::ProbeHealth => {
                self.runtime.spawn(async move {
                    let result = backend.health().await;
                    match &result {
                        Ok(report) => posture_info!("Health ok status={}", report.status),
                        Err(err) => posture_warn!("Health check failed: {}", err),
                    }
                    let _ = event_tx.send(EngineEvent::HealthChecked(result));
                });
            }
            EngineCommand::Upload { request, media } => {
                posture_info!(
                    "Upload request={} file={} mime={} bytes={}",
                    request,
                    media.filename,
                    media.mime_type,
                    media.bytes.len()
                );
                self.runtime.spawn(async move {
                    let result = backend.back_angle(&media).await;
                    if let Err(err) = &result {
                        posture_warn!("Upload request={} failed: {}", request, err);
                    }
                    let _ = event_tx.send(EngineEvent::AngleCompleted { request, result });
                });
            }
            EngineCommand::Advise { request, angle } => {
                posture_info!("Advice request={} angle={}", request, angle);
                self.runtime.spawn(async move {
                    let result = backend.back_recommendation(angle).await;
                    if let Err(err) = &result {
                        posture_warn!("Advice request={} failed: {}", request, err);
                    }
                    let _ = event_tx.send(EngineEvent::AdviceCompleted { request, result });
                });
            }
            EngineCommand::OpenCamera { session } => self.open_camera(session),
            EngineCommand::StopCamera { session } => {
                match self.recordings.remove(&session) {
                    Some(token) => {
                        posture_info!("session={} stop requested", session);
                        token.cancel();
                    }
                    None => posture_debug!("session={} stop for unknown session", session),
                }
            }
            EngineCommand::Shutdown => {}
        }
    }

    fn open_camera(&mut self, session: SessionId) {
        // Sessions that ended on their own cancel their token.
        self.recordings.retain(|_, token| !token.is_cancelled());

        let token = CancellationToken::new();
        self.recordings.insert(session, token.clone());
        let camera = self.camera.clone();
        let settings = self.recorder.clone();
        let event_tx = self.event_tx.clone();

        posture_info!("session={} opening camera", session);
        self.runtime.spawn(async move {
            match camera.open().await {
                Ok(stream) => {
                    let _ = event_tx.send(EngineEvent::CaptureStarted { session });
                    run_recording(session, stream, settings, token, event_tx).await;
                }
                Err(error) => {
                    posture_warn!("session={} camera unavailable: {}", session, error);
                    token.cancel();
                    let _ = event_tx.send(EngineEvent::CaptureFailed { session, error });
                }
            }
        });
    }

    fn shutdown(self) {
        for (session, token) in &self.recordings {
            posture_debug!("session={} cancelled by shutdown", session);
            token.cancel();
        }
        self.runtime.shutdown_timeout(SHUTDOWN_GRACE);
    }
}
