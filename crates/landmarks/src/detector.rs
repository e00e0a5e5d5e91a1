//! Landmark detector boundary

use std::path::Path;

use camera_capture::VideoFrame;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{FaceLandmarks, FacialAnchors, LandmarkError};

/// External face-landmark detector.
///
/// Returns every face found in the frame; an empty vector means no face.
pub trait LandmarkDetector: Send {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<FaceLandmarks>, LandmarkError>;

    fn name(&self) -> &str;
}

/// Reports the same faces for every frame
pub struct StaticDetector {
    faces: Vec<FaceLandmarks>,
}

impl StaticDetector {
    pub fn new(faces: Vec<FaceLandmarks>) -> Self {
        Self { faces }
    }

    /// One face built from the given anchors
    pub fn with_anchors(anchors: FacialAnchors) -> Self {
        Self::new(vec![FaceLandmarks::from_anchors(&anchors)])
    }

    /// Never finds a face
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl LandmarkDetector for StaticDetector {
    fn detect(&mut self, _frame: &VideoFrame) -> Result<Vec<FaceLandmarks>, LandmarkError> {
        Ok(self.faces.clone())
    }

    fn name(&self) -> &str {
        "StaticDetector"
    }
}

/// One recorded detection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackFrame {
    /// Full meshes, in detector order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub faces: Vec<FaceLandmarks>,
    /// Shorthand for a single face given by its anchors only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchors: Option<FacialAnchors>,
}

impl TrackFrame {
    fn faces(&self) -> Vec<FaceLandmarks> {
        match &self.anchors {
            Some(anchors) => vec![FaceLandmarks::from_anchors(anchors)],
            None => self.faces.clone(),
        }
    }
}

/// A recorded sequence of detections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandmarkTrack {
    /// Restart from the first frame after the last one
    #[serde(default)]
    pub looped: bool,
    pub frames: Vec<TrackFrame>,
}

impl LandmarkTrack {
    pub fn from_json(json: &str) -> Result<Self, LandmarkError> {
        let track: LandmarkTrack = serde_json::from_str(json)?;
        if track.frames.is_empty() {
            return Err(LandmarkError::EmptyTrack);
        }
        Ok(track)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LandmarkError> {
        let path = path.as_ref();
        info!("Loading landmark track from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Replays a recorded landmark track, one entry per frame
pub struct ScriptedDetector {
    track: LandmarkTrack,
    position: usize,
}

impl ScriptedDetector {
    pub fn new(track: LandmarkTrack) -> Self {
        Self { track, position: 0 }
    }

    /// Entries not yet replayed (`None` for a looped track)
    pub fn remaining(&self) -> Option<usize> {
        if self.track.looped {
            None
        } else {
            Some(self.track.frames.len().saturating_sub(self.position))
        }
    }
}

impl LandmarkDetector for ScriptedDetector {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<FaceLandmarks>, LandmarkError> {
        let len = self.track.frames.len();
        if len == 0 {
            return Ok(Vec::new());
        }

        let index = if self.track.looped {
            self.position % len
        } else if self.position < len {
            self.position
        } else {
            debug!("Landmark track ended before frame {}", frame.sequence);
            return Ok(Vec::new());
        };
        self.position += 1;

        Ok(self.track.frames[index].faces())
    }

    fn name(&self) -> &str {
        "ScriptedDetector"
    }
}
