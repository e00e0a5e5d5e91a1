//! Detection result events

use std::sync::Arc;

use camera_capture::VideoFrame;

use crate::{FaceLandmarks, FacialAnchors};

/// Emitted by the detector boundary once per processed frame
#[derive(Debug, Clone)]
pub struct DetectionResult {
    /// The frame the detection ran on
    pub frame: Arc<VideoFrame>,
    /// Anchors of the first detected face, if any
    pub anchors: Option<FacialAnchors>,
}

impl DetectionResult {
    /// Keep only the first face; a face without anchorable landmarks counts as none
    pub fn from_faces(frame: Arc<VideoFrame>, faces: &[FaceLandmarks]) -> Self {
        Self {
            frame,
            anchors: faces.first().and_then(FaceLandmarks::anchors),
        }
    }

    /// A result with no face
    pub fn empty(frame: Arc<VideoFrame>) -> Self {
        Self {
            frame,
            anchors: None,
        }
    }

    pub fn face_detected(&self) -> bool {
        self.anchors.is_some()
    }

    pub fn sequence(&self) -> u32 {
        self.frame.sequence
    }
}
