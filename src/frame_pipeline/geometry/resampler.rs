use tracing::info;

use crate::frame_pipeline::color::PackedImage;
use crate::frame_pipeline::common::error::{PipelineError, Result};
use crate::frame_pipeline::geometry::affine::AffineTransform;
use crate::frame_pipeline::geometry::types::{AspectMode, Interpolation};

/// Value written to target pixels whose source falls outside the frame.
const BACKGROUND: u32 = 0;

/// Resamples preview-sized frames onto the classifier input.
///
/// Immutable once built. A new preview size means a new resampler.
#[derive(Debug, Clone)]
pub struct FrameResampler {
    frame_to_target: AffineTransform,
    target_to_frame: AffineTransform,
    source_size: (usize, usize),
    target_size: (usize, usize),
    interpolation: Interpolation,
}

impl FrameResampler {
    pub fn new(
        source_size: (usize, usize),
        target_size: (usize, usize),
        rotation_degrees: i32,
        aspect: AspectMode,
        interpolation: Interpolation,
    ) -> Result<Self> {
        let frame_to_target = AffineTransform::frame_to_target(
            source_size.0,
            source_size.1,
            target_size.0,
            target_size.1,
            rotation_degrees,
            aspect,
        )?;
        let target_to_frame = frame_to_target
            .invert()
            .ok_or(PipelineError::SingularTransform)?;

        let resampler = Self {
            frame_to_target,
            target_to_frame,
            source_size,
            target_size,
            interpolation,
        };
        let (x0, y0, x1, y1) = resampler.source_window();
        info!(
            "Resampling {}x{} -> {}x{} ({:?}, {} deg), source window ({:.1}, {:.1})..({:.1}, {:.1})",
            source_size.0,
            source_size.1,
            target_size.0,
            target_size.1,
            aspect,
            rotation_degrees,
            x0,
            y0,
            x1,
            y1
        );
        Ok(resampler)
    }

    pub fn frame_to_target(&self) -> &AffineTransform {
        &self.frame_to_target
    }

    pub fn target_to_frame(&self) -> &AffineTransform {
        &self.target_to_frame
    }

    pub fn source_size(&self) -> (usize, usize) {
        self.source_size
    }

    pub fn target_size(&self) -> (usize, usize) {
        self.target_size
    }

    /// Bounding box `(x0, y0, x1, y1)` of the frame region that lands on the
    /// target. Extends past the frame edges when the target is not fully covered.
    pub fn source_window(&self) -> (f64, f64, f64, f64) {
        let (tw, th) = (self.target_size.0 as f64, self.target_size.1 as f64);
        let corners = [
            self.target_to_frame.map_point(0.0, 0.0),
            self.target_to_frame.map_point(tw, 0.0),
            self.target_to_frame.map_point(0.0, th),
            self.target_to_frame.map_point(tw, th),
        ];
        corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        )
    }

    /// Fills every target pixel from `source`. Does not allocate.
    pub fn resample(&self, source: &PackedImage, target: &mut PackedImage) -> Result<()> {
        if source.dimensions() != self.source_size {
            return Err(PipelineError::FrameSizeMismatch {
                expected_width: self.source_size.0,
                expected_height: self.source_size.1,
                actual_width: source.width(),
                actual_height: source.height(),
            });
        }
        if target.dimensions() != self.target_size {
            return Err(PipelineError::BufferSizeMismatch {
                expected: self.target_size.0 * self.target_size.1,
                actual: target.pixels().len(),
            });
        }

        match self.interpolation {
            Interpolation::Nearest => self.resample_nearest(source, target),
            Interpolation::Bilinear => self.resample_bilinear(source, target),
        }
        Ok(())
    }

    fn resample_nearest(&self, source: &PackedImage, target: &mut PackedImage) {
        let inv = &self.target_to_frame;
        let (src_w, src_h) = (source.width() as isize, source.height() as isize);
        let src = source.pixels();
        let width = self.target_size.0;

        for (ty, row) in target.pixels_mut().chunks_exact_mut(width).enumerate() {
            // Sample at pixel centres, stepping along the row.
            let (mut sx, mut sy) = inv.map_point(0.5, ty as f64 + 0.5);
            for pixel in row.iter_mut() {
                let x = sx.floor() as isize;
                let y = sy.floor() as isize;
                *pixel = if x >= 0 && y >= 0 && x < src_w && y < src_h {
                    src[(y * src_w + x) as usize]
                } else {
                    BACKGROUND
                };
                sx += inv.a;
                sy += inv.d;
            }
        }
    }

    fn resample_bilinear(&self, source: &PackedImage, target: &mut PackedImage) {
        let inv = &self.target_to_frame;
        let (src_w, src_h) = (source.width(), source.height());
        let (max_x, max_y) = (src_w as f64, src_h as f64);
        let src = source.pixels();
        let width = self.target_size.0;

        for (ty, row) in target.pixels_mut().chunks_exact_mut(width).enumerate() {
            let (mut sx, mut sy) = inv.map_point(0.5, ty as f64 + 0.5);
            for pixel in row.iter_mut() {
                *pixel = if sx >= 0.0 && sy >= 0.0 && sx < max_x && sy < max_y {
                    // Neighbourhood is centred on pixel centres, clamped at the edges.
                    let fx = (sx - 0.5).max(0.0);
                    let fy = (sy - 0.5).max(0.0);
                    let x0 = (fx as usize).min(src_w - 1);
                    let y0 = (fy as usize).min(src_h - 1);
                    let x1 = (x0 + 1).min(src_w - 1);
                    let y1 = (y0 + 1).min(src_h - 1);
                    let wx = (fx - x0 as f64).clamp(0.0, 1.0) as f32;
                    let wy = (fy - y0 as f64).clamp(0.0, 1.0) as f32;
                    blend(
                        src[y0 * src_w + x0],
                        src[y0 * src_w + x1],
                        src[y1 * src_w + x0],
                        src[y1 * src_w + x1],
                        wx,
                        wy,
                    )
                } else {
                    BACKGROUND
                };
                sx += inv.a;
                sy += inv.d;
            }
        }
    }
}

#[inline]
fn blend(p00: u32, p10: u32, p01: u32, p11: u32, wx: f32, wy: f32) -> u32 {
    let mut out = 0u32;
    for shift in [0u32, 8, 16, 24] {
        let channel = |p: u32| ((p >> shift) & 0xff) as f32;
        let top = channel(p00) + (channel(p10) - channel(p00)) * wx;
        let bottom = channel(p01) + (channel(p11) - channel(p01)) * wx;
        let value = top + (bottom - top) * wy;
        out |= (value.round().clamp(0.0, 255.0) as u32) << shift;
    }
    out
}
