//! Try-on session

use std::future::Future;
use std::io;
use std::path::PathBuf;

use asset_manager::{AssetManager, AssetSource, LoadHandle};
use camera_capture::{open_source, FrameSource};
use compositor::{Compositor, FrameStats, RgbaSurface};
use landmarks::{
    DetectionResult, FacialAnchors, LandmarkDetector, LandmarkTrack, ScriptedDetector,
    StaticDetector,
};
use pose_engine::SmoothedPose;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::pump::DetectionPump;
use crate::{SessionError, TryOnConfig};

/// Summary of a finished session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Results produced by the pump
    pub pumped: u64,
    pub frames: FrameStats,
    pub final_pose: SmoothedPose,
    pub smoothing_factor: f64,
    pub snapshots: u64,
}

struct SnapshotWriter {
    dir: PathBuf,
    every: u64,
    written: u64,
}

impl SnapshotWriter {
    fn maybe_write(&mut self, processed: u64, surface: &RgbaSurface) {
        if self.every == 0 || processed % self.every != 0 {
            return;
        }
        let path = self.dir.join(format!("frame_{:06}.png", processed));
        match surface.save_png(&path) {
            Ok(()) => {
                debug!("Wrote snapshot {}", path.display());
                self.written += 1;
            }
            Err(e) => warn!("Snapshot {} failed: {}", path.display(), e),
        }
    }
}

/// One running try-on: bootstrapped environment plus render state
pub struct TryOnSession {
    compositor: Compositor<RgbaSurface>,
    pump: DetectionPump,
    channel_capacity: usize,
    snapshots: Option<SnapshotWriter>,
}

impl TryOnSession {
    /// Bootstrap from configuration and select the default asset.
    ///
    /// Fails when the frame source, detector or output cannot be set up;
    /// the session then never starts.
    pub fn start(config: TryOnConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let source = open_source(&config.camera)?;
        let detector = build_detector(&config)?;
        let default_source = config.asset.default_source.clone();
        let session = Self::with_parts(config, source, detector)?;
        session.select(default_source);
        Ok(session)
    }

    /// Bootstrap from explicit collaborators, no asset selected
    pub fn with_parts(
        config: TryOnConfig,
        source: Box<dyn FrameSource>,
        detector: Box<dyn LandmarkDetector>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        match source.dimensions() {
            Some((w, h)) if w > 0 && h > 0 => info!("Frame source ready at {}x{}", w, h),
            _ => return Err(SessionError::NoFrameSize),
        }

        let snapshots = match &config.output.snapshot_dir {
            Some(dir) if config.output.snapshot_every > 0 => {
                std::fs::create_dir_all(dir).map_err(|e| SessionError::Output {
                    path: dir.clone(),
                    source: e,
                })?;
                Some(SnapshotWriter {
                    dir: dir.clone(),
                    every: config.output.snapshot_every,
                    written: 0,
                })
            }
            _ => None,
        };

        let compositor = Compositor::new(
            RgbaSurface::default(),
            AssetManager::new(),
            config.compositor.clone(),
        )?;
        let pump = DetectionPump::new(
            source,
            detector,
            config.camera.frame_interval(),
            config.camera.max_frames,
        );

        Ok(Self {
            compositor,
            pump,
            channel_capacity: config.channel_capacity,
            snapshots,
        })
    }

    /// Select a different overlay asset
    pub fn select(&self, source: impl Into<AssetSource>) -> LoadHandle {
        self.compositor.assets().select(source)
    }

    pub fn assets(&self) -> &AssetManager {
        self.compositor.assets()
    }

    /// Render detection results until the pump stops or ctrl-c is pressed
    pub async fn run(self) -> Result<SessionReport, SessionError> {
        self.run_until(tokio::signal::ctrl_c()).await
    }

    /// Render until the pump stops or `shutdown` resolves with `Ok`.
    ///
    /// A failing `shutdown` is logged and rendering continues.
    pub async fn run_until<F>(self, shutdown: F) -> Result<SessionReport, SessionError>
    where
        F: Future<Output = io::Result<()>>,
    {
        let Self {
            mut compositor,
            pump,
            channel_capacity,
            mut snapshots,
        } = self;

        let (tx, mut rx) = DetectionPump::channel(channel_capacity);
        let pump_task = tokio::spawn(pump.run(tx));

        tokio::pin!(shutdown);
        let mut listening = true;

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(result) => render(&mut compositor, snapshots.as_mut(), &result),
                    None => break,
                },
                signal = &mut shutdown, if listening => match signal {
                    Ok(()) => {
                        info!("Interrupted, stopping session");
                        break;
                    }
                    Err(e) => {
                        warn!("Shutdown signal unavailable, running to completion: {}", e);
                        listening = false;
                    }
                },
            }
        }
        drop(rx);

        let pumped = pump_task
            .await
            .map_err(|e| SessionError::Pump(e.to_string()))?;

        let report = SessionReport {
            pumped,
            frames: compositor.stats(),
            final_pose: compositor.pose(),
            smoothing_factor: compositor.smoothing_factor(),
            snapshots: snapshots.map(|s| s.written).unwrap_or(0),
        };
        info!(
            "Session finished: {} frames ({} composited, {} video only, {} cleared)",
            report.frames.processed,
            report.frames.composited,
            report.frames.video_only,
            report.frames.cleared
        );
        Ok(report)
    }
}

fn render(
    compositor: &mut Compositor<RgbaSurface>,
    snapshots: Option<&mut SnapshotWriter>,
    result: &DetectionResult,
) {
    compositor.process(result);
    if let Some(writer) = snapshots {
        writer.maybe_write(compositor.stats().processed, compositor.surface());
    }
}

fn build_detector(config: &TryOnConfig) -> Result<Box<dyn LandmarkDetector>, SessionError> {
    match &config.detector.track {
        Some(path) => Ok(Box::new(ScriptedDetector::new(LandmarkTrack::load(path)?))),
        None => {
            info!("No landmark track configured, reporting a fixed centered face");
            Ok(Box::new(StaticDetector::with_anchors(FacialAnchors::new(
                (0.3, 0.5),
                (0.7, 0.5),
                (0.5, 0.55),
            ))))
        }
    }
}
