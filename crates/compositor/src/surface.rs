//! Raster drawing surface

use std::path::Path;

use camera_capture::VideoFrame;
use image::imageops::{self, FilterType};
use image::{DynamicImage, Pixel, Rgba, RgbaImage};
use imageproc::drawing::{draw_cross_mut, draw_hollow_circle_mut};

use crate::transform::Affine2;
use crate::CompositorError;

/// Axis-aligned rectangle in the current transform's local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Rectangle of the given size centered on the origin
    pub fn centered(width: f64, height: f64) -> Self {
        Self {
            x: -width / 2.0,
            y: -height / 2.0,
            width,
            height,
        }
    }

    fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x, self.y),
            (self.x + self.width, self.y),
            (self.x, self.y + self.height),
            (self.x + self.width, self.y + self.height),
        ]
    }
}

/// Drawing primitives the compositor relies on
pub trait Surface {
    fn size(&self) -> (u32, u32);

    /// Change the pixel size; resizing also clears
    fn resize(&mut self, width: u32, height: u32);

    /// Make every pixel fully transparent
    fn clear(&mut self);

    /// Draw `frame` flipped horizontally, stretched to fill the surface
    fn draw_frame_mirrored(&mut self, frame: &VideoFrame);

    /// Draw `image` into `dst` of the local space described by `transform`
    fn draw_image(&mut self, image: &RgbaImage, transform: &Affine2, dst: Rect);

    /// Debug marker at canvas position (`x`, `y`)
    fn draw_marker(&mut self, x: f64, y: f64);
}

/// In-memory RGBA surface
#[derive(Debug, Clone)]
pub struct RgbaSurface {
    canvas: RgbaImage,
}

impl RgbaSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Pixel at (x, y), if inside the surface
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.canvas.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// True when no pixel has any coverage
    pub fn is_clear(&self) -> bool {
        self.canvas.pixels().all(|p| p.0[3] == 0)
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), CompositorError> {
        self.canvas
            .save_with_format(path.as_ref(), image::ImageFormat::Png)
            .map_err(CompositorError::Snapshot)
    }
}

impl Default for RgbaSurface {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Surface for RgbaSurface {
    fn size(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas = RgbaImage::new(width, height);
    }

    fn clear(&mut self) {
        for p in self.canvas.pixels_mut() {
            *p = Rgba([0, 0, 0, 0]);
        }
    }

    fn draw_frame_mirrored(&mut self, frame: &VideoFrame) {
        let (width, height) = self.size();
        if width == 0 || height == 0 || !frame.is_valid() {
            return;
        }

        let Some(raw) = frame.as_rgb_image() else {
            return;
        };

        let mut mirrored = imageops::flip_horizontal(&raw);
        if mirrored.dimensions() != (width, height) {
            mirrored = imageops::resize(&mirrored, width, height, FilterType::Triangle);
        }
        let mirrored = DynamicImage::ImageRgb8(mirrored).into_rgba8();
        imageops::replace(&mut self.canvas, &mirrored, 0, 0);
    }

    fn draw_image(&mut self, image: &RgbaImage, transform: &Affine2, dst: Rect) {
        let (width, height) = self.size();
        let (img_w, img_h) = image.dimensions();
        if width == 0 || height == 0 || img_w == 0 || img_h == 0 {
            return;
        }
        if !(dst.width > 0.0 && dst.height > 0.0) {
            return;
        }
        let Some(inverse) = transform.invert() else {
            return;
        };

        // Canvas bounding box of the transformed destination rectangle
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (lx, ly) in dst.corners() {
            let (cx, cy) = transform.apply(lx, ly);
            min_x = min_x.min(cx);
            min_y = min_y.min(cy);
            max_x = max_x.max(cx);
            max_y = max_y.max(cy);
        }
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return;
        }

        let x0 = min_x.floor().max(0.0) as u32;
        let y0 = min_y.floor().max(0.0) as u32;
        let x1 = (max_x.ceil().min(f64::from(width))).max(0.0) as u32;
        let y1 = (max_y.ceil().min(f64::from(height))).max(0.0) as u32;

        let sx = f64::from(img_w) / dst.width;
        let sy = f64::from(img_h) / dst.height;

        for py in y0..y1 {
            for px in x0..x1 {
                let (lx, ly) = inverse.apply(f64::from(px) + 0.5, f64::from(py) + 0.5);
                let u = (lx - dst.x) * sx;
                let v = (ly - dst.y) * sy;
                if u < 0.0 || v < 0.0 || u >= f64::from(img_w) || v >= f64::from(img_h) {
                    continue;
                }

                let src = sample_bilinear(image, u - 0.5, v - 0.5);
                self.canvas.get_pixel_mut(px, py).blend(&src);
            }
        }
    }

    fn draw_marker(&mut self, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        let (cx, cy) = (x.round() as i32, y.round() as i32);
        let color = Rgba([0, 255, 0, 255]);
        draw_cross_mut(&mut self.canvas, color, cx, cy);
        draw_hollow_circle_mut(&mut self.canvas, (cx, cy), 4, color);
    }
}

/// Bilinear sample with edge clamping, `u`/`v` in pixel-center coordinates
fn sample_bilinear(image: &RgbaImage, u: f64, v: f64) -> Rgba<u8> {
    let (w, h) = image.dimensions();
    let max_x = f64::from(w - 1);
    let max_y = f64::from(h - 1);
    let u = u.clamp(0.0, max_x);
    let v = v.clamp(0.0, max_y);

    let x0 = u.floor() as u32;
    let y0 = v.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = u - f64::from(x0);
    let fy = v - f64::from(y0);

    let p00 = image.get_pixel(x0, y0).0;
    let p10 = image.get_pixel(x1, y0).0;
    let p01 = image.get_pixel(x0, y1).0;
    let p11 = image.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f64::from(p00[c]) * (1.0 - fx) + f64::from(p10[c]) * fx;
        let bottom = f64::from(p01[c]) * (1.0 - fx) + f64::from(p11[c]) * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear() {
        let mut surface = RgbaSurface::new(4, 4);
        surface.draw_frame_mirrored(&VideoFrame::solid(4, 4, [200, 0, 0]));
        assert!(!surface.is_clear());

        surface.clear();
        assert!(surface.is_clear());
    }

    #[test]
    fn test_frame_is_mirrored() {
        // Left half red, right half blue in the raw frame
        let mut data = Vec::new();
        for _y in 0..2 {
            for x in 0..4 {
                if x < 2 {
                    data.extend_from_slice(&[255, 0, 0]);
                } else {
                    data.extend_from_slice(&[0, 0, 255]);
                }
            }
        }
        let frame = VideoFrame::new(data, 4, 2, 0, 0);

        let mut surface = RgbaSurface::new(4, 2);
        surface.draw_frame_mirrored(&frame);
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(surface.pixel(3, 1), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_frame_stretched_to_surface() {
        let mut surface = RgbaSurface::new(8, 8);
        surface.draw_frame_mirrored(&VideoFrame::solid(2, 2, [9, 9, 9]));
        assert_eq!(surface.pixel(7, 7), Some([9, 9, 9, 255]));
    }

    #[test]
    fn test_draw_image_identity() {
        let mut surface = RgbaSurface::new(10, 10);
        let image = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        surface.draw_image(
            &image,
            &Affine2::identity(),
            Rect {
                x: 2.0,
                y: 2.0,
                width: 4.0,
                height: 4.0,
            },
        );

        assert_eq!(surface.pixel(3, 3), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(5, 5), Some([255, 255, 255, 255]));
        assert_eq!(surface.pixel(1, 1), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(6, 6), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_draw_image_mirrored_placement() {
        // Left half of the overlay red, right half green
        let mut image = RgbaImage::new(4, 2);
        for (x, _y, p) in image.enumerate_pixels_mut() {
            *p = if x < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 255, 0, 255])
            };
        }

        let mut surface = RgbaSurface::new(40, 20);
        let t = Affine2::mirrored_placement(20.0, 10.0, 0.0);
        surface.draw_image(&image, &t, Rect::centered(16.0, 8.0));

        // The overlay's left half lands right of the center
        assert_eq!(surface.pixel(25, 10), Some([255, 0, 0, 255]));
        assert_eq!(surface.pixel(14, 10), Some([0, 255, 0, 255]));
        assert_eq!(surface.pixel(2, 10), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_transparent_overlay_keeps_background() {
        let mut surface = RgbaSurface::new(6, 6);
        surface.draw_frame_mirrored(&VideoFrame::solid(6, 6, [10, 20, 30]));

        let image = RgbaImage::from_pixel(6, 6, Rgba([255, 255, 255, 0]));
        surface.draw_image(&image, &Affine2::identity(), Rect::centered(6.0, 6.0));
        assert_eq!(surface.pixel(0, 0), Some([10, 20, 30, 255]));
    }

    #[test]
    fn test_offscreen_draw_is_ignored() {
        let mut surface = RgbaSurface::new(6, 6);
        let image = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255]));
        let t = Affine2::identity().translate(-1000.0, -1000.0);
        surface.draw_image(&image, &t, Rect::centered(2.0, 2.0));
        assert!(surface.is_clear());
    }

    #[test]
    fn test_half_alpha_overlay_blends_over_frame() {
        let mut surface = RgbaSurface::new(4, 4);
        surface.draw_frame_mirrored(&VideoFrame::solid(4, 4, [0, 0, 0]));

        let image = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 128]));
        surface.draw_image(
            &image,
            &Affine2::identity(),
            Rect {
                x: 0.0,
                y: 0.0,
                width: 4.0,
                height: 4.0,
            },
        );

        let px = surface.pixel(1, 1).unwrap();
        assert_eq!(px[3], 255);
        assert!((i32::from(px[0]) - 128).abs() <= 1);
    }

    #[test]
    fn test_mirrored_frame_resized_to_surface() {
        // 2x1 frame, red then blue, drawn onto a 4x2 surface
        let frame = VideoFrame::new(vec![255, 0, 0, 0, 0, 255], 2, 1, 0, 0);
        let mut surface = RgbaSurface::new(4, 2);
        surface.draw_frame_mirrored(&frame);

        let left = surface.pixel(0, 0).unwrap();
        let right = surface.pixel(3, 1).unwrap();
        assert!(left[2] > left[0]);
        assert!(right[0] > right[2]);
        assert_eq!(left[3], 255);
    }

    #[test]
    fn test_malformed_frame_is_skipped() {
        let mut surface = RgbaSurface::new(4, 4);
        surface.draw_frame_mirrored(&VideoFrame::new(vec![1, 2, 3], 4, 4, 0, 0));
        assert!(surface.is_clear());
    }

    #[test]
    fn test_marker_and_snapshot() {
        let mut surface = RgbaSurface::new(16, 16);
        surface.draw_marker(8.0, 8.0);
        assert_eq!(surface.pixel(8, 8), Some([0, 255, 0, 255]));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.png");
        surface.save_png(&path).unwrap();
        let reloaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(reloaded.dimensions(), (16, 16));
    }
}
