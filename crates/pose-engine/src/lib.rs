//! Pose Engine
//!
//! Turns three facial anchors into a 2D glasses placement and stabilizes it
//! over time:
//! - Landmark interpreter: anchors + canvas size + aspect ratio -> raw pose
//! - Temporal smoother: exponential moving average over the raw poses

pub mod interpreter;
pub mod smoother;

pub use interpreter::{compute_raw_pose, mirror_x, PoseParams, RawPose};
pub use smoother::{PoseSmoother, SmoothedPose, SmootherConfig, DEFAULT_SMOOTH_FACTOR};

use thiserror::Error;

/// Pose engine configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoseError {
    #[error("{field} value {value} is out of range {range}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        range: &'static str,
    },
}
