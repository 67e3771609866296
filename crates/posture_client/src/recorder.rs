use std::sync::mpsc;
use std::time::Duration;

use posture_logging::{posture_debug, posture_info, posture_warn};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, SessionId, VideoStream};

#[derive(Debug, Clone)]
pub struct RecorderSettings {
    /// Time slice between chunk reads.
    pub chunk_interval: Duration,
    pub max_chunk_bytes: usize,
    /// How long a read in flight at stop may take before it is abandoned.
    pub flush_grace: Duration,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            chunk_interval: Duration::from_millis(250),
            max_chunk_bytes: 256 * 1024,
            flush_grace: Duration::from_millis(500),
        }
    }
}

/// Pump chunks from `stream` until cancelled, the source ends, or a read fails.
///
/// Every `ChunkAvailable` is sent before the final `CaptureStopped` on the same
/// channel. The stream is dropped, releasing the device, before the terminal
/// event is sent.
pub(crate) async fn run_recording(
    session: SessionId,
    mut stream: Box<dyn VideoStream>,
    settings: RecorderSettings,
    cancel: CancellationToken,
    events: mpsc::Sender<EngineEvent>,
) {
    let mut ticker = tokio::time::interval(settings.chunk_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut chunks = 0usize;
    let mut failure = None;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let mut stopping = false;
        let read = {
            let read = stream.next_chunk(settings.max_chunk_bytes);
            tokio::pin!(read);
            tokio::select! {
                biased;
                result = &mut read => result,
                _ = cancel.cancelled() => {
                    stopping = true;
                    match tokio::time::timeout(settings.flush_grace, &mut read).await {
                        Ok(result) => result,
                        Err(_) => {
                            posture_debug!("session={} dropped in-flight read at stop", session);
                            break;
                        }
                    }
                }
            }
        };

        match read {
            Ok(Some(chunk)) => {
                chunks += 1;
                let _ = events.send(EngineEvent::ChunkAvailable { session, chunk });
            }
            Ok(None) => {
                posture_info!("session={} source ended", session);
                break;
            }
            Err(err) => {
                failure = Some(err);
                break;
            }
        }
        if stopping {
            break;
        }
    }

    drop(stream);
    // Marks the session finished for the engine's bookkeeping.
    cancel.cancel();

    match failure {
        Some(error) => {
            posture_warn!("session={} capture failed: {}", session, error);
            let _ = events.send(EngineEvent::CaptureFailed { session, error });
        }
        None => {
            posture_info!("session={} stopped after {} chunk(s)", session, chunks);
            let _ = events.send(EngineEvent::CaptureStopped { session });
        }
    }
}
