//! Facial landmarks
//!
//! Types exchanged with the external landmark detector:
//! - Normalized landmark points and full face meshes
//! - The three anchors used for glasses placement
//! - Detection results emitted once per processed frame
//! - The detector trait plus static and scripted implementations

pub mod anchors;
pub mod detector;
pub mod event;

pub use anchors::{FaceLandmarks, FacialAnchors, NormalizedPoint};
pub use detector::{LandmarkDetector, LandmarkTrack, ScriptedDetector, StaticDetector, TrackFrame};
pub use event::DetectionResult;

use thiserror::Error;

/// Landmark error types
#[derive(Error, Debug)]
pub enum LandmarkError {
    #[error("Failed to read landmark track: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed landmark track: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Landmark track has no frames")]
    EmptyTrack,

    #[error("Detection failed: {0}")]
    Detection(String),
}
