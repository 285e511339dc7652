//! Resampling configuration types

/// How the frame is fitted into the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectMode {
    /// Uniform scale that covers the target, cropping the centre of the frame
    #[default]
    CenterCrop,
    /// Independent x/y scale so the whole frame fills the target
    Stretch,
}

/// Source sampling used per target pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Nearest,
    Bilinear,
}
