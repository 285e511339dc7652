//! Geometric resampling module
//!
//! The frame-to-target transform is built once per stream configuration;
//! every frame is then resampled through its inverse.

mod affine;
mod resampler;
pub mod types;

pub use affine::AffineTransform;
pub use resampler::FrameResampler;
pub use types::{AspectMode, Interpolation};
