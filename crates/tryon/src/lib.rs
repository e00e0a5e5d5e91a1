//! Virtual Glasses Try-On
//!
//! Wires the frame source, landmark detector, asset manager and compositor
//! into a session: the pump task produces detection results, the session
//! task renders them strictly in arrival order.

pub mod config;
pub mod pump;
pub mod session;

pub use self::config::{AssetConfig, DetectorConfig, OutputConfig, TryOnConfig};
pub use self::pump::DetectionPump;
pub use self::session::{SessionReport, TryOnSession};

use std::path::PathBuf;

use thiserror::Error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Session bootstrap and run errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Frame source unavailable: {0}")]
    Camera(#[from] camera_capture::CameraError),

    #[error("Frame source reports no usable frame size")]
    NoFrameSize,

    #[error("Landmark detector unavailable: {0}")]
    Detector(#[from] landmarks::LandmarkError),

    #[error("Compositor setup failed: {0}")]
    Compositor(#[from] compositor::CompositorError),

    #[error("Output directory {path} unavailable: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Detection pump failed: {0}")]
    Pump(String),
}

/// Initialize logging; `RUST_LOG` takes precedence over `level`
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
