//! Session configuration

use std::path::{Path, PathBuf};

use camera_capture::CameraConfig;
use compositor::CompositorConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::SessionError;

/// Overlay image shown when nothing else is selected
pub const DEFAULT_FRAME_SOURCE: &str = "static/pics/glasses_PNG54292.png";

/// Largest accepted camera width or height
pub const MAX_FRAME_DIMENSION: u32 = 16_384;

/// Landmark detector selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Recorded landmark track (JSON); without one a fixed centered face is reported
    pub track: Option<String>,
}

/// Overlay asset selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Asset selected when the session starts
    pub default_source: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            default_source: DEFAULT_FRAME_SOURCE.to_string(),
        }
    }
}

/// Rendered output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for PNG snapshots of the surface
    pub snapshot_dir: Option<PathBuf>,
    /// Write a snapshot every N processed frames (0 = never)
    pub snapshot_every: u64,
}

/// Complete try-on configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TryOnConfig {
    /// Log filter used when RUST_LOG is not set
    pub log_level: String,
    /// Detection results buffered between the pump and the renderer
    pub channel_capacity: usize,
    pub camera: CameraConfig,
    pub detector: DetectorConfig,
    pub asset: AssetConfig,
    pub compositor: CompositorConfig,
    pub output: OutputConfig,
}

impl Default for TryOnConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            channel_capacity: 1,
            camera: CameraConfig::default(),
            detector: DetectorConfig::default(),
            asset: AssetConfig::default(),
            compositor: CompositorConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl TryOnConfig {
    /// Defaults, then `path` (if given), then `TRYON_*` environment variables.
    ///
    /// Nested keys use a double underscore: `TRYON_CAMERA__FPS=15`.
    pub fn load(path: Option<&Path>) -> Result<Self, SessionError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            debug!("Reading configuration from {}", path.display());
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix("TRYON")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: TryOnConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.channel_capacity == 0 {
            return Err(SessionError::Invalid("channel_capacity must be at least 1".into()));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(SessionError::Invalid(format!(
                "camera size {}x{} is empty",
                self.camera.width, self.camera.height
            )));
        }
        if self.camera.width > MAX_FRAME_DIMENSION || self.camera.height > MAX_FRAME_DIMENSION {
            return Err(SessionError::Invalid(format!(
                "camera size {}x{} exceeds {} pixels per side",
                self.camera.width, self.camera.height, MAX_FRAME_DIMENSION
            )));
        }
        if self.camera.fps == 0 {
            return Err(SessionError::Invalid("camera fps must be positive".into()));
        }
        if self.output.snapshot_every > 0 && self.output.snapshot_dir.is_none() {
            return Err(SessionError::Invalid(
                "snapshot_every is set but snapshot_dir is missing".into(),
            ));
        }
        self.compositor
            .pose
            .validate()
            .and_then(|_| self.compositor.smoother.validate())
            .map_err(|e| SessionError::Invalid(e.to_string()))
    }
}
