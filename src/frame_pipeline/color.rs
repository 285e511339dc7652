//! Colour-space conversion module
//!
//! Planar/semi-planar YUV 4:2:0 to packed ARGB8888.

mod yuv_converter;
pub mod types;

pub use types::{ChromaSampling, ColorRange, PackedImage, YuvFrameRef};
pub use yuv_converter::YuvConverter;
