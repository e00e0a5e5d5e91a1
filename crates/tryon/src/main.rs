//! Glasses Try-On - Main Entry Point

use std::path::PathBuf;

use camera_capture::SourceKind;
use clap::Parser;
use tracing::{error, info};
use tryon::{init_logging, TryOnConfig, TryOnSession};

/// Render a virtual glasses try-on over a video source
#[derive(Debug, Parser)]
#[command(name = "tryon", version)]
struct Args {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overlay image to select at startup
    #[arg(long)]
    frame: Option<String>,

    /// Serve this image as the video instead of synthetic frames
    #[arg(long)]
    still: Option<String>,

    /// Replay landmarks from a recorded JSON track
    #[arg(long)]
    track: Option<String>,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Write PNG snapshots of the output into this directory
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Snapshot interval in frames (used with --snapshot-dir)
    #[arg(long, default_value_t = 30)]
    snapshot_every: u64,

    /// Mark the tracked anchors on the output
    #[arg(long)]
    debug_anchors: bool,
}

impl Args {
    fn apply(self, config: &mut TryOnConfig) {
        if let Some(frame) = self.frame {
            config.asset.default_source = frame;
        }
        if let Some(path) = self.still {
            config.camera.source = SourceKind::Still { path };
        }
        if let Some(track) = self.track {
            config.detector.track = Some(track);
        }
        if self.max_frames.is_some() {
            config.camera.max_frames = self.max_frames;
        }
        if let Some(dir) = self.snapshot_dir {
            config.output.snapshot_dir = Some(dir);
            config.output.snapshot_every = self.snapshot_every;
        }
        if self.debug_anchors {
            config.compositor.debug_anchors = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = TryOnConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    init_logging(&config.log_level);

    info!("=== Glasses TryOn v{} ===", env!("CARGO_PKG_VERSION"));

    let session = match TryOnSession::start(config) {
        Ok(session) => session,
        Err(e) => {
            error!("Session could not start: {}", e);
            return Err(e.into());
        }
    };

    let report = session.run().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
