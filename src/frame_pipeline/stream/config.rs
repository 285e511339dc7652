use crate::frame_pipeline::color::{ChromaSampling, ColorRange};
use crate::frame_pipeline::common::error::{PipelineError, Result};
use crate::frame_pipeline::geometry::{AspectMode, Interpolation};

/// Configuration for a live classification stream
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Classifier input width in pixels
    pub target_width: usize,
    /// Classifier input height in pixels
    pub target_height: usize,
    /// Clockwise rotation applied to the frame, a multiple of 90
    pub rotation_degrees: i32,
    /// Crop or stretch the frame into the target
    pub aspect: AspectMode,
    /// Per-pixel or per-2x2-block chroma conversion
    pub chroma_sampling: ChromaSampling,
    /// Quantisation range of the sensor's YUV output
    pub color_range: ColorRange,
    /// Sampling used when resampling into the target
    pub interpolation: Interpolation,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_width: 224,
            target_height: 224,
            rotation_degrees: 0,
            aspect: AspectMode::CenterCrop,
            chroma_sampling: ChromaSampling::PerPixel,
            color_range: ColorRange::Full,
            interpolation: Interpolation::Nearest,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_width == 0 || self.target_height == 0 {
            return Err(PipelineError::InvalidDimensions(self.target_width, self.target_height));
        }
        if self.rotation_degrees % 90 != 0 {
            return Err(PipelineError::UnsupportedRotation(self.rotation_degrees));
        }
        Ok(())
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    target_size: Option<(usize, usize)>,
    rotation_degrees: Option<i32>,
    aspect: Option<AspectMode>,
    chroma_sampling: Option<ChromaSampling>,
    color_range: Option<ColorRange>,
    interpolation: Option<Interpolation>,
}

impl PipelineConfigBuilder {
    pub fn target_size(mut self, width: usize, height: usize) -> Self {
        self.target_size = Some((width, height));
        self
    }

    pub fn rotation_degrees(mut self, degrees: i32) -> Self {
        self.rotation_degrees = Some(degrees);
        self
    }

    pub fn aspect(mut self, aspect: AspectMode) -> Self {
        self.aspect = Some(aspect);
        self
    }

    pub fn chroma_sampling(mut self, sampling: ChromaSampling) -> Self {
        self.chroma_sampling = Some(sampling);
        self
    }

    pub fn color_range(mut self, range: ColorRange) -> Self {
        self.color_range = Some(range);
        self
    }

    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = Some(interpolation);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        let (target_width, target_height) = self
            .target_size
            .unwrap_or((default.target_width, default.target_height));
        PipelineConfig {
            target_width,
            target_height,
            rotation_degrees: self.rotation_degrees.unwrap_or(default.rotation_degrees),
            aspect: self.aspect.unwrap_or(default.aspect),
            chroma_sampling: self.chroma_sampling.unwrap_or(default.chroma_sampling),
            color_range: self.color_range.unwrap_or(default.color_range),
            interpolation: self.interpolation.unwrap_or(default.interpolation),
        }
    }
}
