use tracing::warn;

use crate::frame_pipeline::common::error::{PipelineError, Result};
use crate::frame_pipeline::geometry::types::AspectMode;

/// 2D affine map
///
/// ```text
/// x' = a*x + b*y + c
/// y' = d*x + e*y + f
/// ```
///
/// Coordinates are in pixel-edge units: (0, 0) is the top-left corner of the
/// first pixel and (w, h) the bottom-right corner of the last.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    pub const fn identity() -> Self {
        Self { a: 1.0, b: 0.0, c: 0.0, d: 0.0, e: 1.0, f: 0.0 }
    }

    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self { a: 1.0, b: 0.0, c: tx, d: 0.0, e: 1.0, f: ty }
    }

    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self { a: sx, b: 0.0, c: 0.0, d: 0.0, e: sy, f: 0.0 }
    }

    /// Clockwise rotation in image coordinates (y pointing down).
    ///
    /// Quarter turns use exact sine/cosine so that axis-aligned frames stay
    /// axis-aligned.
    pub fn rotation(degrees: i32) -> Self {
        let (sin, cos) = match degrees.rem_euclid(360) {
            0 => (0.0, 1.0),
            90 => (1.0, 0.0),
            180 => (0.0, -1.0),
            270 => (-1.0, 0.0),
            other => (other as f64).to_radians().sin_cos(),
        };
        Self { a: cos, b: -sin, c: 0.0, d: sin, e: cos, f: 0.0 }
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &AffineTransform) -> Self {
        Self {
            a: next.a * self.a + next.b * self.d,
            b: next.a * self.b + next.b * self.e,
            c: next.a * self.c + next.b * self.f + next.c,
            d: next.d * self.a + next.e * self.d,
            e: next.d * self.b + next.e * self.e,
            f: next.d * self.c + next.e * self.f + next.f,
        }
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    pub fn invert(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON {
            return None;
        }
        let a = self.e / det;
        let b = -self.b / det;
        let d = -self.d / det;
        let e = self.a / det;
        Some(Self {
            a,
            b,
            c: -(a * self.c + b * self.f),
            d,
            e,
            f: -(d * self.c + e * self.f),
        })
    }

    #[inline]
    pub fn map_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.b * y + self.c,
            self.d * x + self.e * y + self.f,
        )
    }

    /// Transform from a `src_width`x`src_height` frame onto a
    /// `dst_width`x`dst_height` target.
    ///
    /// The frame is rotated about its centre by `rotation_degrees` (a multiple
    /// of 90), scaled according to `aspect`, and centred on the target.
    pub fn frame_to_target(
        src_width: usize,
        src_height: usize,
        dst_width: usize,
        dst_height: usize,
        rotation_degrees: i32,
        aspect: AspectMode,
    ) -> Result<Self> {
        if src_width == 0 || src_height == 0 {
            return Err(PipelineError::InvalidDimensions(src_width, src_height));
        }
        if dst_width == 0 || dst_height == 0 {
            return Err(PipelineError::InvalidDimensions(dst_width, dst_height));
        }
        if rotation_degrees % 90 != 0 {
            warn!("Rotation of {} % 90 != 0", rotation_degrees);
            return Err(PipelineError::UnsupportedRotation(rotation_degrees));
        }

        let (src_w, src_h) = (src_width as f64, src_height as f64);
        let (dst_w, dst_h) = (dst_width as f64, dst_height as f64);

        let mut transform = Self::translation(-src_w / 2.0, -src_h / 2.0)
            .then(&Self::rotation(rotation_degrees));

        // A quarter turn swaps which frame axis lands on the target's x axis.
        let transpose = rotation_degrees.rem_euclid(180) == 90;
        let (in_w, in_h) = if transpose { (src_h, src_w) } else { (src_w, src_h) };

        let scale_x = dst_w / in_w;
        let scale_y = dst_h / in_h;
        transform = match aspect {
            AspectMode::CenterCrop => {
                let scale = scale_x.max(scale_y);
                transform.then(&Self::scale(scale, scale))
            }
            AspectMode::Stretch => transform.then(&Self::scale(scale_x, scale_y)),
        };

        Ok(transform.then(&Self::translation(dst_w / 2.0, dst_h / 2.0)))
    }
}
