//! Frame and plane types

/// Borrowed view of one sensor plane.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    /// Readable bytes of the plane, including any row padding
    pub data: &'a [u8],
    /// Bytes between the start of consecutive rows
    pub row_stride: usize,
    /// Bytes between consecutive samples within a row (2 for semi-planar chroma)
    pub pixel_stride: usize,
}

/// One capture event: a 4:2:0 frame laid out as Y, U, V planes.
///
/// The backing memory belongs to the capture source and is only valid until
/// the frame is released.
pub trait CapturedFrame {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn planes(&self) -> [Plane<'_>; 3];
}

/// Heap-backed frame, used by in-process sources and tests.
#[derive(Debug, Clone)]
pub struct OwnedFrame {
    pub width: usize,
    pub height: usize,
    /// Y, U, V plane bytes
    pub data: [Vec<u8>; 3],
    /// Row strides for Y, U, V
    pub row_strides: [usize; 3],
    /// Pixel strides for Y, U, V
    pub pixel_strides: [usize; 3],
}

impl OwnedFrame {
    /// Builds a solid-colour frame.
    ///
    /// `row_padding` extra bytes are appended to every row of every plane, the
    /// way hardware capture buffers align rows. With `semi_planar` the U and V
    /// planes alias one interleaved UV buffer with pixel stride 2, matching how
    /// NV21/NV12 buffers are exposed as three planes.
    pub fn solid(
        width: usize,
        height: usize,
        yuv: (u8, u8, u8),
        row_padding: usize,
        semi_planar: bool,
    ) -> Self {
        let (y, u, v) = yuv;
        let chroma_width = width.div_ceil(2);
        let chroma_height = height.div_ceil(2);

        let y_stride = width + row_padding;
        let y_plane = vec![y; y_stride * height];

        if semi_planar {
            let uv_stride = chroma_width * 2 + row_padding;
            let mut u_plane = vec![0u8; uv_stride * chroma_height];
            let mut v_plane = vec![0u8; uv_stride * chroma_height];
            for row in 0..chroma_height {
                for col in 0..chroma_width {
                    let offset = row * uv_stride + col * 2;
                    // u_plane starts at U, v_plane starts at V; each sees the other channel at +1
                    u_plane[offset] = u;
                    u_plane[offset + 1] = v;
                    v_plane[offset] = v;
                    v_plane[offset + 1] = u;
                }
            }
            // Exposed planes stop one byte short of the shared buffer end.
            let exposed = uv_stride * chroma_height.saturating_sub(1)
                + chroma_width.saturating_sub(1) * 2
                + 1;
            u_plane.truncate(exposed);
            v_plane.truncate(exposed);

            Self {
                width,
                height,
                data: [y_plane, u_plane, v_plane],
                row_strides: [y_stride, uv_stride, uv_stride],
                pixel_strides: [1, 2, 2],
            }
        } else {
            let uv_stride = chroma_width + row_padding;
            Self {
                width,
                height,
                data: [
                    y_plane,
                    vec![u; uv_stride * chroma_height],
                    vec![v; uv_stride * chroma_height],
                ],
                row_strides: [y_stride, uv_stride, uv_stride],
                pixel_strides: [1, 1, 1],
            }
        }
    }
}

impl CapturedFrame for OwnedFrame {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn planes(&self) -> [Plane<'_>; 3] {
        std::array::from_fn(|i| Plane {
            data: &self.data[i],
            row_stride: self.row_strides[i],
            pixel_stride: self.pixel_strides[i],
        })
    }
}
