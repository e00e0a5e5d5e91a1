//! Detection pump
//!
//! Pulls frames from the source at the configured rate, runs the landmark
//! detector on each, and forwards one `DetectionResult` per frame to the
//! renderer. Sending awaits channel capacity, so a new frame is only
//! detected once the renderer has room for it. Frame reads and detection
//! run on the blocking pool and never stall the runtime's workers.

use std::sync::Arc;
use std::time::Duration;

use camera_capture::{CameraError, FrameSource, VideoFrame};
use landmarks::{DetectionResult, FaceLandmarks, LandmarkDetector};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Frame source + detector driven by a timer
pub struct DetectionPump {
    stage: Stage,
    frame_interval: Duration,
    max_frames: Option<u64>,
}

/// The blocking half of the pump, moved onto the blocking pool per frame
struct Stage {
    source: Box<dyn FrameSource>,
    detector: Box<dyn LandmarkDetector>,
}

impl Stage {
    /// Read one frame and detect faces on it; `None` once the source ends
    fn advance(&mut self) -> Result<Option<(VideoFrame, Vec<FaceLandmarks>)>, CameraError> {
        let Some(frame) = self.source.next_frame()? else {
            return Ok(None);
        };
        let faces = match self.detector.detect(&frame) {
            Ok(faces) => faces,
            Err(e) => {
                warn!("Detection failed on frame {}: {}", frame.sequence, e);
                Vec::new()
            }
        };
        Ok(Some((frame, faces)))
    }
}

impl DetectionPump {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn LandmarkDetector>,
        frame_interval: Duration,
        max_frames: Option<u64>,
    ) -> Self {
        Self {
            stage: Stage { source, detector },
            frame_interval,
            max_frames,
        }
    }

    /// Create a channel pair for the pump
    pub fn channel(capacity: usize) -> (mpsc::Sender<DetectionResult>, mpsc::Receiver<DetectionResult>) {
        mpsc::channel(capacity.max(1))
    }

    /// Run until the source ends, `max_frames` is reached or the receiver is dropped.
    ///
    /// Returns the number of results sent.
    pub async fn run(self, tx: mpsc::Sender<DetectionResult>) -> u64 {
        let Self {
            mut stage,
            frame_interval,
            max_frames,
        } = self;
        info!(
            "Starting detection pump ({}, every {:?})",
            stage.detector.name(),
            frame_interval
        );

        let mut ticker = interval(frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sent = 0u64;

        loop {
            if max_frames.is_some_and(|max| sent >= max) {
                debug!("Frame limit reached");
                break;
            }
            ticker.tick().await;

            let step = tokio::task::spawn_blocking(move || {
                let outcome = stage.advance();
                (stage, outcome)
            })
            .await;
            let outcome = match step {
                Ok((returned, outcome)) => {
                    stage = returned;
                    outcome
                }
                Err(e) => {
                    warn!("Detection task failed, stopping: {}", e);
                    break;
                }
            };

            let (frame, faces) = match outcome {
                Ok(Some(detected)) => detected,
                Ok(None) => {
                    info!("Frame source exhausted");
                    break;
                }
                Err(e) => {
                    warn!("Frame source failed, stopping: {}", e);
                    break;
                }
            };

            let result = DetectionResult::from_faces(Arc::new(frame), &faces);
            if tx.send(result).await.is_err() {
                debug!("Renderer gone, stopping pump");
                break;
            }
            sent += 1;
        }

        info!("Detection pump stopped after {} frames", sent);
        sent
    }
}
