//! 2D affine transforms with canvas-style composition
//!
//! `scale`, `translate` and `rotate` post-multiply, so the last operation
//! applied is the first one a point goes through.

/// Row-major 2x3 affine matrix: `x' = a*x + b*y + c`, `y' = d*x + e*y + f`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine2 {
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 1.0,
            f: 0.0,
        }
    }

    #[must_use]
    pub fn translate(self, tx: f64, ty: f64) -> Self {
        Self {
            c: self.a * tx + self.b * ty + self.c,
            f: self.d * tx + self.e * ty + self.f,
            ..self
        }
    }

    #[must_use]
    pub fn scale(self, sx: f64, sy: f64) -> Self {
        Self {
            a: self.a * sx,
            b: self.b * sy,
            d: self.d * sx,
            e: self.e * sy,
            ..self
        }
    }

    /// Rotate by `theta` radians (clockwise on a y-down canvas)
    #[must_use]
    pub fn rotate(self, theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self {
            a: self.a * cos + self.b * sin,
            b: -self.a * sin + self.b * cos,
            d: self.d * cos + self.e * sin,
            e: -self.d * sin + self.e * cos,
            ..self
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.b * y + self.c,
            self.d * x + self.e * y + self.f,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// Inverse transform, `None` when the matrix is singular
    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }
        Some(Self {
            a: self.e / det,
            b: -self.b / det,
            c: (self.b * self.f - self.e * self.c) / det,
            d: -self.d / det,
            e: self.a / det,
            f: (self.d * self.c - self.a * self.f) / det,
        })
    }

    /// Overlay placement: mirror, move to the center, then roll
    pub fn mirrored_placement(center_x: f64, center_y: f64, angle: f64) -> Self {
        Self::identity()
            .scale(-1.0, 1.0)
            .translate(-center_x, center_y)
            .rotate(angle)
    }
}
