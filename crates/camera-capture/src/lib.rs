//! Camera Capture Library for the try-on loop
//!
//! Provides the video frame type and the frame-source collaborators that
//! feed the landmark detector:
//! - Still image source (one decoded picture served as every frame)
//! - Synthetic source (generated frames for tests and demos)

pub mod frame;
pub mod source;

pub use frame::VideoFrame;
pub use source::{open_source, FrameSource, StillImageSource, SyntheticSource};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open frame source: {0}")]
    Open(String),

    #[error("Frame source has zero-sized frames ({width}x{height})")]
    ZeroSized { width: u32, height: u32 },
}

/// Which frame source to open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceKind {
    /// A single image file repeated as every frame
    Still { path: String },
    /// Generated gradient frames
    Synthetic,
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Frame source selection
    pub source: SourceKind,
    /// Capture width
    pub width: u32,
    /// Capture height
    pub height: u32,
    /// Target FPS
    pub fps: u32,
    /// Stop after this many frames (None = run until the source ends)
    pub max_frames: Option<u64>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Synthetic,
            width: 640,
            height: 480,
            fps: 30,
            max_frames: None,
        }
    }
}

impl CameraConfig {
    /// Config serving a still image, resized to 640x480
    pub fn still(path: impl Into<String>) -> Self {
        Self {
            source: SourceKind::Still { path: path.into() },
            ..Default::default()
        }
    }

    /// Frame interval derived from the target FPS (minimum 1 fps)
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_micros(1_000_000 / u64::from(self.fps.max(1)))
    }
}
