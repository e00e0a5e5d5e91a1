//! Try-on Compositor
//!
//! Consumes detection results one at a time, keeps the smoothed glasses
//! pose, and draws the mirrored video with the overlay on a raster surface.

mod compositor;
pub mod surface;
pub mod transform;

pub use compositor::{Compositor, CompositorConfig, FrameOutcome, FrameStats};
pub use surface::{Rect, RgbaSurface, Surface};
pub use transform::Affine2;

use thiserror::Error;

/// Compositor error types
#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("Invalid pose configuration: {0}")]
    Config(#[from] pose_engine::PoseError),

    #[error("Failed to write snapshot: {0}")]
    Snapshot(#[source] image::ImageError),
}
