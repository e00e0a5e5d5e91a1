//! Frame sources

use std::time::Instant;

use image::imageops::FilterType;
use tracing::{debug, info};

use crate::{CameraConfig, CameraError, SourceKind, VideoFrame};

/// Something that produces video frames on demand
pub trait FrameSource: Send {
    /// Native frame size, if known yet
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Next frame, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError>;
}

/// Open the source described by the configuration
pub fn open_source(config: &CameraConfig) -> Result<Box<dyn FrameSource>, CameraError> {
    match &config.source {
        SourceKind::Still { path } => Ok(Box::new(StillImageSource::open(
            path,
            config.width,
            config.height,
        )?)),
        SourceKind::Synthetic => Ok(Box::new(SyntheticSource::new(config.width, config.height)?)),
    }
}

/// Serves one decoded image as an endless stream of frames
pub struct StillImageSource {
    frame: VideoFrame,
    sequence: u32,
    started: Instant,
}

impl StillImageSource {
    /// Decode `path` and resize it to `width` x `height`
    pub fn open(path: &str, width: u32, height: u32) -> Result<Self, CameraError> {
        if width == 0 || height == 0 {
            return Err(CameraError::ZeroSized { width, height });
        }

        info!("Opening still image source {} at {}x{}", path, width, height);
        let img = image::open(path).map_err(|e| CameraError::Open(format!("{}: {}", path, e)))?;
        let rgb = img.to_rgb8();
        let rgb = if rgb.dimensions() == (width, height) {
            rgb
        } else {
            image::imageops::resize(&rgb, width, height, FilterType::Triangle)
        };

        Ok(Self {
            frame: VideoFrame::from_rgb_image(rgb, 0, 0),
            sequence: 0,
            started: Instant::now(),
        })
    }
}

impl FrameSource for StillImageSource {
    fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.frame.width, self.frame.height))
    }

    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
        let ts = self.started.elapsed().as_nanos() as u64;
        let frame = self.frame.restamped(ts, self.sequence);
        self.sequence = self.sequence.wrapping_add(1);
        Ok(Some(frame))
    }
}

/// Generated frames: a horizontal gradient that shifts every frame
pub struct SyntheticSource {
    width: u32,
    height: u32,
    sequence: u32,
    limit: Option<u32>,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Result<Self, CameraError> {
        if width == 0 || height == 0 {
            return Err(CameraError::ZeroSized { width, height });
        }
        Ok(Self {
            width,
            height,
            sequence: 0,
            limit: None,
        })
    }

    /// Stop after `frames` frames
    pub fn with_limit(mut self, frames: u32) -> Self {
        self.limit = Some(frames);
        self
    }
}

impl FrameSource for SyntheticSource {
    fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.width, self.height))
    }

    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
        if self.limit.is_some_and(|limit| self.sequence >= limit) {
            debug!("Synthetic source exhausted after {} frames", self.sequence);
            return Ok(None);
        }

        let shift = self.sequence % 256;
        let mut data = Vec::with_capacity(VideoFrame::byte_len(self.width, self.height));
        for y in 0..self.height {
            for x in 0..self.width {
                let r = ((x * 255 / self.width.max(1) + shift) % 256) as u8;
                let g = (y * 255 / self.height.max(1)) as u8;
                data.extend_from_slice(&[r, g, 96]);
            }
        }

        let frame = VideoFrame::new(
            data,
            self.width,
            self.height,
            u64::from(self.sequence) * 33_333_333,
            self.sequence,
        );
        self.sequence += 1;
        Ok(Some(frame))
    }
}
