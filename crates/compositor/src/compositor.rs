//! Per-frame state machine: smooth, then draw

use asset_manager::AssetManager;
use landmarks::{DetectionResult, FacialAnchors};
use pose_engine::{mirror_x, PoseParams, PoseSmoother, SmoothedPose, SmootherConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::surface::{Rect, Surface};
use crate::transform::Affine2;
use crate::CompositorError;

/// Compositor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Placement constants
    pub pose: PoseParams,
    /// Temporal smoothing
    pub smoother: SmootherConfig,
    /// Mark the three anchors on the output
    pub debug_anchors: bool,
}

/// What happened to one detection result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No face (or no usable frame): surface cleared, pose held
    Cleared,
    /// Face tracked, overlay skipped (asset not ready or no area yet)
    VideoOnly,
    /// Face tracked and overlay drawn
    Composited,
}

/// Running counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub processed: u64,
    pub cleared: u64,
    pub video_only: u64,
    pub composited: u64,
}

impl FrameStats {
    fn record(&mut self, outcome: FrameOutcome) {
        self.processed += 1;
        match outcome {
            FrameOutcome::Cleared => self.cleared += 1,
            FrameOutcome::VideoOnly => self.video_only += 1,
            FrameOutcome::Composited => self.composited += 1,
        }
    }
}

/// Owns the surface and the smoothed pose for one session
pub struct Compositor<S: Surface> {
    surface: S,
    assets: AssetManager,
    params: PoseParams,
    smoother: PoseSmoother,
    debug_anchors: bool,
    stats: FrameStats,
}

impl<S: Surface> Compositor<S> {
    pub fn new(surface: S, assets: AssetManager, config: CompositorConfig) -> Result<Self, CompositorError> {
        config.pose.validate()?;
        let smoother = PoseSmoother::new(config.smoother)?;
        Ok(Self {
            surface,
            assets,
            params: config.pose,
            smoother,
            debug_anchors: config.debug_anchors,
            stats: FrameStats::default(),
        })
    }

    /// Handle one detection result
    pub fn process(&mut self, result: &DetectionResult) -> FrameOutcome {
        let outcome = self.process_inner(result);
        self.stats.record(outcome);
        trace!("Frame {} -> {:?}", result.sequence(), outcome);
        outcome
    }

    fn process_inner(&mut self, result: &DetectionResult) -> FrameOutcome {
        let frame = result.frame.as_ref();
        let anchors = match result.anchors {
            Some(anchors) if frame.is_valid() && anchors.is_finite() => anchors,
            Some(_) => {
                debug!("Frame {}: unusable frame or anchors, clearing", frame.sequence);
                return self.clear_frame();
            }
            None => return self.clear_frame(),
        };

        let asset = self.assets.current();
        let canvas_w = f64::from(frame.width);
        let canvas_h = f64::from(frame.height);
        let raw = self
            .params
            .compute(&anchors, canvas_w, canvas_h, asset.aspect_ratio());
        if !raw.is_finite() {
            debug!("Frame {}: anchors out of range, clearing", frame.sequence);
            return self.clear_frame();
        }

        if self.surface.size() != (frame.width, frame.height) {
            debug!("Resizing surface to {}x{}", frame.width, frame.height);
            self.surface.resize(frame.width, frame.height);
        }
        self.surface.clear();
        self.surface.draw_frame_mirrored(frame);

        let pose = self.smoother.observe(&raw);

        if self.debug_anchors {
            self.mark_anchors(&anchors, canvas_w, canvas_h);
        }

        match asset.image.as_deref() {
            Some(image) if asset.ready() && pose.has_area() => {
                let transform = Affine2::mirrored_placement(pose.x, pose.y, pose.angle);
                self.surface
                    .draw_image(image, &transform, Rect::centered(pose.w, pose.h));
                FrameOutcome::Composited
            }
            _ => FrameOutcome::VideoOnly,
        }
    }

    fn clear_frame(&mut self) -> FrameOutcome {
        self.surface.clear();
        self.smoother.hold();
        FrameOutcome::Cleared
    }

    fn mark_anchors(&mut self, anchors: &FacialAnchors, canvas_w: f64, canvas_h: f64) {
        for point in [anchors.left_face, anchors.right_face, anchors.nose] {
            let (x, y) = point.to_pixels(canvas_w, canvas_h);
            self.surface.draw_marker(mirror_x(x, canvas_w), y);
        }
    }

    /// Current smoothed pose
    pub fn pose(&self) -> SmoothedPose {
        self.smoother.state()
    }

    /// Blend factor of the pose smoother
    pub fn smoothing_factor(&self) -> f64 {
        self.smoother.factor()
    }

    /// Back to the zero pose (session restart)
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.stats = FrameStats::default();
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }
}
