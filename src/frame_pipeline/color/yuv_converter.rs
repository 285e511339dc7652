use crate::frame_pipeline::color::types::{
    ChromaSampling, ColorRange, PackedImage, YuvFrameRef, pack_argb,
};
use crate::frame_pipeline::common::error::{PipelineError, Result};

/// Fixed-point precision of the conversion coefficients.
const SHIFT: u32 = 16;
const ROUND: i32 = 1 << (SHIFT - 1);

/// BT.601 coefficients scaled by 2^16.
struct Coefficients {
    luma_offset: i32,
    luma_scale: i32,
    v_to_r: i32,
    u_to_g: i32,
    v_to_g: i32,
    u_to_b: i32,
}

const FULL_RANGE: Coefficients = Coefficients {
    luma_offset: 0,
    luma_scale: 65536,
    v_to_r: 91881,
    u_to_g: 22554,
    v_to_g: 46802,
    u_to_b: 116130,
};

const LIMITED_RANGE: Coefficients = Coefficients {
    luma_offset: 16,
    luma_scale: 76284,
    v_to_r: 104595,
    u_to_g: 25624,
    v_to_g: 53281,
    u_to_b: 132251,
};

/// Chroma contribution to each output channel, already scaled.
#[derive(Clone, Copy)]
struct ChromaTerms {
    r: i32,
    g: i32,
    b: i32,
}

/// Converts 4:2:0 YUV into packed ARGB8888 with full opacity.
///
/// Writes into a caller-owned [`PackedImage`]; the per-frame path does not
/// allocate.
#[derive(Debug, Clone, Copy, Default)]
pub struct YuvConverter {
    sampling: ChromaSampling,
    range: ColorRange,
}

impl YuvConverter {
    pub fn new(sampling: ChromaSampling, range: ColorRange) -> Self {
        Self { sampling, range }
    }

    pub fn sampling(&self) -> ChromaSampling {
        self.sampling
    }

    pub fn range(&self) -> ColorRange {
        self.range
    }

    pub fn convert(&self, frame: &YuvFrameRef<'_>, output: &mut PackedImage) -> Result<()> {
        validate(frame, output)?;

        let coefficients = match self.range {
            ColorRange::Full => &FULL_RANGE,
            ColorRange::Limited => &LIMITED_RANGE,
        };

        match self.sampling {
            ChromaSampling::PerPixel => convert_per_pixel(frame, coefficients, output.pixels_mut()),
            ChromaSampling::PerBlock => convert_per_block(frame, coefficients, output.pixels_mut()),
        }
        Ok(())
    }
}

fn validate(frame: &YuvFrameRef<'_>, output: &PackedImage) -> Result<()> {
    let (width, height) = (frame.width, frame.height);
    if width == 0 || height == 0 {
        return Err(PipelineError::InvalidDimensions(width, height));
    }

    if output.dimensions() != (width, height) {
        return Err(PipelineError::FrameSizeMismatch {
            expected_width: output.width(),
            expected_height: output.height(),
            actual_width: width,
            actual_height: height,
        });
    }

    if frame.y_row_stride < width {
        return Err(PipelineError::InvalidStride(format!(
            "luma row stride {} is narrower than width {}",
            frame.y_row_stride, width
        )));
    }

    let chroma_width = width.div_ceil(2);
    let chroma_height = height.div_ceil(2);
    if frame.uv_pixel_stride == 0 {
        return Err(PipelineError::InvalidStride("chroma pixel stride is zero".to_string()));
    }
    let chroma_row_span = (chroma_width - 1) * frame.uv_pixel_stride + 1;
    if frame.uv_row_stride < chroma_row_span {
        return Err(PipelineError::InvalidStride(format!(
            "chroma row stride {} cannot hold {} samples at pixel stride {}",
            frame.uv_row_stride, chroma_width, frame.uv_pixel_stride
        )));
    }

    let luma_required = (height - 1) * frame.y_row_stride + width;
    let chroma_required = (chroma_height - 1) * frame.uv_row_stride + chroma_row_span;
    for (plane, data, required) in [
        (0, frame.y, luma_required),
        (1, frame.u, chroma_required),
        (2, frame.v, chroma_required),
    ] {
        if data.len() < required {
            return Err(PipelineError::PlaneTooSmall {
                plane,
                required,
                available: data.len(),
            });
        }
    }
    Ok(())
}

#[inline(always)]
fn chroma_terms(u: u8, v: u8, c: &Coefficients) -> ChromaTerms {
    let u = u as i32 - 128;
    let v = v as i32 - 128;
    ChromaTerms {
        r: c.v_to_r * v,
        g: -c.u_to_g * u - c.v_to_g * v,
        b: c.u_to_b * u,
    }
}

#[inline(always)]
fn to_argb(y: u8, chroma: ChromaTerms, c: &Coefficients) -> u32 {
    let luma = (y as i32 - c.luma_offset).max(0) * c.luma_scale + ROUND;
    let r = ((luma + chroma.r) >> SHIFT).clamp(0, 255) as u8;
    let g = ((luma + chroma.g) >> SHIFT).clamp(0, 255) as u8;
    let b = ((luma + chroma.b) >> SHIFT).clamp(0, 255) as u8;
    pack_argb(r, g, b, 0xff)
}

fn convert_per_pixel(frame: &YuvFrameRef<'_>, c: &Coefficients, out: &mut [u32]) {
    let width = frame.width;
    for (row, out_row) in out.chunks_exact_mut(width).enumerate() {
        let y_row = &frame.y[row * frame.y_row_stride..][..width];
        let uv_row = (row >> 1) * frame.uv_row_stride;

        for (col, (pixel, &y)) in out_row.iter_mut().zip(y_row).enumerate() {
            let uv = uv_row + (col >> 1) * frame.uv_pixel_stride;
            let chroma = chroma_terms(frame.u[uv], frame.v[uv], c);
            *pixel = to_argb(y, chroma, c);
        }
    }
}

fn convert_per_block(frame: &YuvFrameRef<'_>, c: &Coefficients, out: &mut [u32]) {
    let width = frame.width;
    for (block_row, out_rows) in out.chunks_mut(width * 2).enumerate() {
        let top = block_row * 2;
        let uv_row = block_row * frame.uv_row_stride;
        let rows_in_block = out_rows.len() / width;

        for block_col in 0..width.div_ceil(2) {
            let uv = uv_row + block_col * frame.uv_pixel_stride;
            let chroma = chroma_terms(frame.u[uv], frame.v[uv], c);
            let left = block_col * 2;
            let cols_in_block = (width - left).min(2);

            for dy in 0..rows_in_block {
                let y_base = (top + dy) * frame.y_row_stride + left;
                let out_base = dy * width + left;
                for dx in 0..cols_in_block {
                    out_rows[out_base + dx] = to_argb(frame.y[y_base + dx], chroma, c);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_pipeline::capture::{CapturedFrame, OwnedFrame};

    fn frame_ref(frame: &OwnedFrame) -> YuvFrameRef<'_> {
        let [y, u, v] = frame.planes();
        YuvFrameRef {
            width: frame.width,
            height: frame.height,
            y: y.data,
            u: u.data,
            v: v.data,
            y_row_stride: y.row_stride,
            uv_row_stride: u.row_stride,
            uv_pixel_stride: u.pixel_stride,
        }
    }

    fn convert_solid(yuv: (u8, u8, u8), converter: YuvConverter) -> PackedImage {
        let frame = OwnedFrame::solid(8, 6, yuv, 0, false);
        let mut out = PackedImage::new(8, 6);
        converter.convert(&frame_ref(&frame), &mut out).unwrap();
        out
    }

    fn assert_close(actual: [u8; 4], expected: [u8; 4], tolerance: u8) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!(
                a.abs_diff(*e) <= tolerance,
                "expected {:?} within {}, got {:?}",
                expected,
                tolerance,
                actual
            );
        }
    }

    #[test]
    fn test_mid_gray_full_range() {
        let out = convert_solid((128, 128, 128), YuvConverter::default());
        assert!(out.pixels().iter().all(|&p| p == 0xff80_8080));
    }

    #[test]
    fn test_mid_gray_limited_range_within_tolerance() {
        let converter = YuvConverter::new(ChromaSampling::PerPixel, ColorRange::Limited);
        let out = convert_solid((128, 128, 128), converter);
        assert_close(out.rgba(3, 3), [128, 128, 128, 255], 3);
    }

    #[test]
    fn test_known_primaries() {
        let converter = YuvConverter::default();
        assert_close(convert_solid((76, 85, 255), converter).rgba(0, 0), [255, 0, 0, 255], 2);
        assert_close(convert_solid((150, 44, 21), converter).rgba(0, 0), [0, 255, 0, 255], 2);
        assert_close(convert_solid((29, 255, 107), converter).rgba(0, 0), [0, 0, 255, 255], 2);
    }

    #[test]
    fn test_channels_clamp_at_extremes() {
        let converter = YuvConverter::default();
        // R and B overshoot past 255, G undershoots below 0
        assert_eq!(convert_solid((255, 255, 255), converter).rgba(0, 0), [255, 121, 255, 255]);
        assert_eq!(convert_solid((0, 0, 0), converter).rgba(0, 0), [0, 135, 0, 255]);
    }

    #[test]
    fn test_row_padding_is_ignored() {
        let mut frame = OwnedFrame::solid(6, 4, (90, 128, 128), 10, false);
        // poison the padding bytes of every luma row
        for row in 0..4 {
            frame.data[0][row * 16 + 6..row * 16 + 16].fill(255);
        }
        let mut out = PackedImage::new(6, 4);
        YuvConverter::default().convert(&frame_ref(&frame), &mut out).unwrap();
        assert!(out.pixels().iter().all(|&p| p == 0xff5a_5a5a));
    }

    #[test]
    fn test_semi_planar_matches_planar() {
        let planar = OwnedFrame::solid(10, 6, (120, 60, 200), 0, false);
        let semi = OwnedFrame::solid(10, 6, (120, 60, 200), 4, true);

        let mut a = PackedImage::new(10, 6);
        let mut b = PackedImage::new(10, 6);
        YuvConverter::default().convert(&frame_ref(&planar), &mut a).unwrap();
        YuvConverter::default().convert(&frame_ref(&semi), &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_block_sampling_matches_per_pixel_on_odd_sizes() {
        let (width, height) = (7, 5);
        let mut frame = OwnedFrame::solid(width, height, (0, 0, 0), 3, false);
        for (i, byte) in frame.data[0].iter_mut().enumerate() {
            *byte = (i * 37 % 256) as u8;
        }
        for (i, byte) in frame.data[1].iter_mut().enumerate() {
            *byte = (i * 53 % 256) as u8;
        }
        for (i, byte) in frame.data[2].iter_mut().enumerate() {
            *byte = (255 - i * 29 % 256) as u8;
        }

        let mut per_pixel = PackedImage::new(width, height);
        let mut per_block = PackedImage::new(width, height);
        YuvConverter::new(ChromaSampling::PerPixel, ColorRange::Full)
            .convert(&frame_ref(&frame), &mut per_pixel)
            .unwrap();
        YuvConverter::new(ChromaSampling::PerBlock, ColorRange::Full)
            .convert(&frame_ref(&frame), &mut per_block)
            .unwrap();
        assert_eq!(per_pixel, per_block);
        assert!(per_pixel.pixels().iter().all(|p| p >> 24 == 0xff));
    }

    #[test]
    fn test_short_chroma_plane_is_rejected() {
        let mut frame = OwnedFrame::solid(8, 8, (128, 128, 128), 0, false);
        frame.data[2].truncate(10);
        let mut out = PackedImage::new(8, 8);
        let err = YuvConverter::default()
            .convert(&frame_ref(&frame), &mut out)
            .unwrap_err();
        assert!(matches!(err, PipelineError::PlaneTooSmall { plane: 2, required: 16, available: 10 }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_output_size_must_match_frame() {
        let frame = OwnedFrame::solid(8, 8, (128, 128, 128), 0, false);
        let mut out = PackedImage::new(8, 4);
        let err = YuvConverter::default()
            .convert(&frame_ref(&frame), &mut out)
            .unwrap_err();
        assert!(matches!(err, PipelineError::FrameSizeMismatch { .. }));
    }

    #[test]
    fn test_narrow_luma_stride_is_rejected() {
        let frame = OwnedFrame::solid(8, 2, (128, 128, 128), 0, false);
        let mut view = frame_ref(&frame);
        view.y_row_stride = 4;
        let mut out = PackedImage::new(8, 2);
        let err = YuvConverter::default().convert(&view, &mut out).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidStride(_)));
    }
}
