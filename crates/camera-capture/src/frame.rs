//! Video frame types

use image::{ImageBuffer, Rgb, RgbImage};

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (nanoseconds)
    pub timestamp_ns: u64,
    /// Frame sequence number
    pub sequence: u32,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp_ns: u64, sequence: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp_ns,
            sequence,
        }
    }

    /// Create a frame filled with a single colour
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(Self::byte_len(width, height))
            .collect();
        Self::new(data, width, height, 0, 0)
    }

    /// Buffer length of a `width` x `height` RGB frame
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }

    /// Wrap a decoded RGB image
    pub fn from_rgb_image(img: RgbImage, timestamp_ns: u64, sequence: u32) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height, timestamp_ns, sequence)
    }

    /// Whether the frame has usable dimensions and a matching buffer
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.data.len() == Self::byte_len(self.width, self.height)
    }

    /// Borrow the pixel data as an image, if the buffer matches the size
    pub fn as_rgb_image(&self) -> Option<ImageBuffer<Rgb<u8>, &[u8]>> {
        if !self.is_valid() {
            return None;
        }
        ImageBuffer::from_raw(self.width, self.height, self.data.as_slice())
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        self.data
            .get(idx..idx + 3)
            .map(|p| [p[0], p[1], p[2]])
    }

    /// Same frame with a new timestamp and sequence number
    pub fn restamped(&self, timestamp_ns: u64, sequence: u32) -> VideoFrame {
        VideoFrame {
            timestamp_ns,
            sequence,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_frame() {
        let frame = VideoFrame::solid(4, 3, [10, 20, 30]);
        assert!(frame.is_valid());
        assert_eq!(frame.get_pixel(3, 2), Some([10, 20, 30]));
        assert_eq!(frame.get_pixel(4, 0), None);
    }

    #[test]
    fn test_from_rgb_image() {
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(1, 0, image::Rgb([255, 0, 0]));
        let frame = VideoFrame::from_rgb_image(img, 7, 3);

        assert_eq!(frame.width, 2);
        assert_eq!(frame.sequence, 3);
        assert_eq!(frame.get_pixel(1, 0), Some([255, 0, 0]));
        assert_eq!(frame.get_pixel(0, 0), Some([0, 0, 0]));
    }

    #[test]
    fn test_invalid_frame() {
        let frame = VideoFrame::new(vec![0; 5], 2, 2, 0, 0);
        assert!(!frame.is_valid());
        assert_eq!(frame.get_pixel(1, 1), None);

        let empty = VideoFrame::new(Vec::new(), 0, 0, 0, 0);
        assert!(!empty.is_valid());
        assert!(empty.as_rgb_image().is_none());
    }

    #[test]
    fn test_byte_len_does_not_wrap() {
        assert_eq!(VideoFrame::byte_len(640, 480), 921_600);
        assert_eq!(
            VideoFrame::byte_len(70_000, 70_000),
            70_000usize * 70_000 * 3
        );
    }

    #[test]
    fn test_as_rgb_image() {
        let frame = VideoFrame::solid(3, 2, [1, 2, 3]);
        let img = frame.as_rgb_image().unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1).0, [1, 2, 3]);
    }
}
