use std::sync::{mpsc, Arc};
use std::thread;

use posture_client::{EngineEvent, EngineHandle, FifoCamera, MediaUpload, ReqwestBackend};
use posture_core::{Effect, HealthStatus, Msg};
use posture_logging::{posture_debug, posture_info};

use super::app::LoopEvent;
use super::config::AppConfig;

/// Executes core effects on the engine and feeds engine events back as `Msg`s.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: &AppConfig, loop_tx: mpsc::Sender<LoopEvent>) -> anyhow::Result<Self> {
        let backend = ReqwestBackend::new(config.backend_settings())?;
        posture_info!("Backend base url {}", backend.base_url());
        let camera = FifoCamera::new(&config.camera_fifo);
        posture_info!("Camera fifo {}", camera.path().display());

        let (engine, events) =
            EngineHandle::spawn(Arc::new(backend), Arc::new(camera), config.recorder_settings())?;
        spawn_event_forwarder(events, loop_tx)?;
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ProbeHealth => self.engine.probe_health(),
                Effect::OpenCamera { session } => self.engine.open_camera(session),
                Effect::StopCamera { session } => self.engine.stop_camera(session),
                Effect::UploadMedia { request, artifact } => {
                    let media = MediaUpload {
                        filename: artifact.filename().to_string(),
                        mime_type: artifact.mime_type().to_string(),
                        bytes: artifact.bytes().clone(),
                    };
                    self.engine.upload(request, media);
                }
                Effect::RequestAdvice { request, angle } => self.engine.advise(request, angle),
            }
        }
    }

    /// Cancels recordings (releasing the camera) and stops the engine thread.
    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}

fn spawn_event_forwarder(
    events: mpsc::Receiver<EngineEvent>,
    loop_tx: mpsc::Sender<LoopEvent>,
) -> std::io::Result<()> {
    thread::Builder::new()
        .name("posture-events".to_string())
        .spawn(move || {
            while let Ok(event) = events.recv() {
                if loop_tx.send(LoopEvent::Msg(map_event(event))).is_err() {
                    break;
                }
            }
            posture_debug!("Engine event channel closed");
        })?;
    Ok(())
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::HealthChecked(result) => Msg::HealthChecked(match result {
            Ok(report) => HealthStatus::Ok(report.status),
            Err(err) if err.is_transport() => HealthStatus::ConnectionError,
            Err(_) => HealthStatus::Unreachable,
        }),
        EngineEvent::AngleCompleted { request, result } => Msg::AngleReceived {
            request,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::AdviceCompleted { request, result } => Msg::AdviceReceived {
            request,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::CaptureStarted { session } => Msg::CaptureStarted { session },
        EngineEvent::CaptureFailed { session, error } => Msg::CaptureFailed {
            session,
            reason: error.to_string(),
        },
        EngineEvent::ChunkAvailable { session, chunk } => Msg::ChunkAvailable { session, chunk },
        EngineEvent::CaptureStopped { session } => Msg::CaptureStopped { session },
    }
}
