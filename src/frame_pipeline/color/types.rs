//! Types for colour conversion

/// How chroma is looked up for each output pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromaSampling {
    /// Chroma site resolved and converted for every pixel
    #[default]
    PerPixel,
    /// Chroma converted once per 2x2 block and reused for its four luma samples
    PerBlock,
}

/// Luma/chroma quantisation range of the sensor output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorRange {
    /// Y in 0..=255, chroma centred on 128 (BT.601 full swing)
    #[default]
    Full,
    /// Y in 16..=235, chroma in 16..=240 (BT.601 studio swing)
    Limited,
}

/// Borrowed 4:2:0 frame data ready for conversion.
#[derive(Debug, Clone, Copy)]
pub struct YuvFrameRef<'a> {
    pub width: usize,
    pub height: usize,
    pub y: &'a [u8],
    pub u: &'a [u8],
    pub v: &'a [u8],
    pub y_row_stride: usize,
    pub uv_row_stride: usize,
    pub uv_pixel_stride: usize,
}

/// Interleaved ARGB8888 image, one `u32` per pixel (`0xAARRGGBB`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedImage {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl PackedImage {
    /// Zero-filled (transparent black) image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Pixels in row-major order.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    pub fn argb(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    /// Channels of pixel (x, y) as `[r, g, b, a]`.
    pub fn rgba(&self, x: usize, y: usize) -> [u8; 4] {
        unpack_rgba(self.argb(x, y))
    }

    pub fn fill(&mut self, argb: u32) {
        self.pixels.fill(argb);
    }

    /// Copies the image out as tightly packed RGBA bytes.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&p| unpack_rgba(p)).collect()
    }
}

#[inline]
pub(crate) fn pack_argb(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

#[inline]
pub(crate) fn unpack_rgba(argb: u32) -> [u8; 4] {
    [
        (argb >> 16) as u8,
        (argb >> 8) as u8,
        argb as u8,
        (argb >> 24) as u8,
    ]
}
