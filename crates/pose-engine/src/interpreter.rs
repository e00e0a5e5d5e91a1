//! Landmark interpreter
//!
//! Pure geometry: the glasses placement for one frame, in mirrored canvas
//! pixels. The caller checks that a face was detected and that the canvas
//! has positive dimensions.

use landmarks::FacialAnchors;
use serde::{Deserialize, Serialize};

use crate::PoseError;

/// Overlay placement for a single frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawPose {
    /// Overlay center, canvas pixels (mirrored)
    pub center_x: f64,
    pub center_y: f64,
    /// Overlay size, pixels
    pub width: f64,
    pub height: f64,
    /// Head roll, radians
    pub angle: f64,
}

impl RawPose {
    /// Whether every field is a finite number
    pub fn is_finite(&self) -> bool {
        [self.center_x, self.center_y, self.width, self.height, self.angle]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Placement constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseParams {
    /// Fraction of the anchor distance covered by the glasses
    pub margin_factor: f64,
    /// Upper bound on the glasses width, as a fraction of the canvas width
    pub max_width_fraction: f64,
    /// Downward shift from the nose landmark, as a fraction of the overlay height
    pub bridge_offset: f64,
}

impl Default for PoseParams {
    fn default() -> Self {
        Self {
            margin_factor: 0.85,
            max_width_fraction: 0.6,
            bridge_offset: 0.02,
        }
    }
}

impl PoseParams {
    pub fn validate(&self) -> Result<(), PoseError> {
        if !(self.margin_factor > 0.0 && self.margin_factor.is_finite()) {
            return Err(PoseError::OutOfRange {
                field: "margin_factor",
                value: self.margin_factor,
                range: "(0, inf)",
            });
        }
        if !(self.max_width_fraction > 0.0 && self.max_width_fraction <= 1.0) {
            return Err(PoseError::OutOfRange {
                field: "max_width_fraction",
                value: self.max_width_fraction,
                range: "(0, 1]",
            });
        }
        if !self.bridge_offset.is_finite() {
            return Err(PoseError::OutOfRange {
                field: "bridge_offset",
                value: self.bridge_offset,
                range: "finite",
            });
        }
        Ok(())
    }

    /// Raw pose for `anchors` on a `canvas_width` x `canvas_height` canvas
    pub fn compute(
        &self,
        anchors: &FacialAnchors,
        canvas_width: f64,
        canvas_height: f64,
        aspect_ratio: f64,
    ) -> RawPose {
        let left = anchors.left_face;
        let right = anchors.right_face;

        let dx = right.x - left.x;
        let dy = right.y - left.y;
        let angle = dy.atan2(dx);

        let face_width = dx.hypot(dy) * canvas_width;
        let width = (face_width * self.margin_factor).min(canvas_width * self.max_width_fraction);
        let height = width * aspect_ratio;

        let center_x = mirror_x((left.x + right.x) / 2.0 * canvas_width, canvas_width);
        let center_y = anchors.nose.y * canvas_height + height * self.bridge_offset;

        RawPose {
            center_x,
            center_y,
            width,
            height,
            angle,
        }
    }
}

/// Raw pose with the default placement constants
pub fn compute_raw_pose(
    anchors: &FacialAnchors,
    canvas_width: f64,
    canvas_height: f64,
    aspect_ratio: f64,
) -> RawPose {
    PoseParams::default().compute(anchors, canvas_width, canvas_height, aspect_ratio)
}

/// Reflect an x coordinate about the canvas midline (selfie view)
pub fn mirror_x(x: f64, canvas_width: f64) -> f64 {
    canvas_width - x
}
