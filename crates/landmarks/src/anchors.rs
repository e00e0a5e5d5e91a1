//! Landmark points and glasses anchors

use serde::{Deserialize, Serialize};

/// Face-mesh index of the left face boundary (viewer's left in raw video)
pub const LEFT_FACE_INDEX: usize = 234;
/// Face-mesh index of the right face boundary
pub const RIGHT_FACE_INDEX: usize = 454;
/// Face-mesh index of the nose bridge
pub const NOSE_BRIDGE_INDEX: usize = 168;

/// A landmark in normalized [0,1] video coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
    /// Relative depth, carried through but unused by the 2D engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl NormalizedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    /// Pixel position in a `width` x `height` frame (not mirrored)
    pub fn to_pixels(&self, width: f64, height: f64) -> (f64, f64) {
        (self.x * width, self.y * height)
    }
}

/// All landmarks of one detected face, indexed by mesh topology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceLandmarks {
    pub points: Vec<NormalizedPoint>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<NormalizedPoint>) -> Self {
        Self { points }
    }

    pub fn get(&self, index: usize) -> Option<NormalizedPoint> {
        self.points.get(index).copied()
    }

    /// Extract the glasses anchors from this face
    pub fn anchors(&self) -> Option<FacialAnchors> {
        Some(FacialAnchors {
            left_face: self.get(LEFT_FACE_INDEX)?,
            right_face: self.get(RIGHT_FACE_INDEX)?,
            nose: self.get(NOSE_BRIDGE_INDEX)?,
        })
    }

    /// Mesh with only the three anchor indices populated
    pub fn from_anchors(anchors: &FacialAnchors) -> Self {
        let mut points = vec![NormalizedPoint::default(); RIGHT_FACE_INDEX + 1];
        points[LEFT_FACE_INDEX] = anchors.left_face;
        points[RIGHT_FACE_INDEX] = anchors.right_face;
        points[NOSE_BRIDGE_INDEX] = anchors.nose;
        Self { points }
    }
}

/// The three landmarks the glasses placement is derived from.
///
/// Always taken together from a single face of a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacialAnchors {
    pub left_face: NormalizedPoint,
    pub right_face: NormalizedPoint,
    pub nose: NormalizedPoint,
}

impl FacialAnchors {
    pub fn new(left_face: (f64, f64), right_face: (f64, f64), nose: (f64, f64)) -> Self {
        Self {
            left_face: NormalizedPoint::new(left_face.0, left_face.1),
            right_face: NormalizedPoint::new(right_face.0, right_face.1),
            nose: NormalizedPoint::new(nose.0, nose.1),
        }
    }

    /// All coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        [self.left_face, self.right_face, self.nose]
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_extraction() {
        let anchors = FacialAnchors::new((0.3, 0.5), (0.7, 0.5), (0.5, 0.55));
        let mesh = FaceLandmarks::from_anchors(&anchors);

        assert_eq!(mesh.points.len(), 455);
        assert_eq!(mesh.anchors(), Some(anchors));
    }

    #[test]
    fn test_short_mesh_has_no_anchors() {
        let mesh = FaceLandmarks::new(vec![NormalizedPoint::new(0.5, 0.5); 300]);
        assert!(mesh.anchors().is_none());
    }

    #[test]
    fn test_non_finite_anchors() {
        let anchors = FacialAnchors::new((f64::NAN, 0.5), (0.7, 0.5), (0.5, 0.55));
        assert!(!anchors.is_finite());
        assert!(FacialAnchors::new((0.3, 0.5), (0.7, 0.5), (0.5, 0.55)).is_finite());
    }

    #[test]
    fn test_point_json() {
        let p: NormalizedPoint = serde_json::from_str(r#"{"x":0.25,"y":0.75}"#).unwrap();
        assert_eq!(p, NormalizedPoint::new(0.25, 0.75));
        assert_eq!(p.to_pixels(640.0, 480.0), (160.0, 360.0));
    }
}
