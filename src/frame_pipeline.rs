//! Live camera frame pipeline
//!
//! Frames arrive as planar 4:2:0 YUV, are copied out of the capture buffers,
//! converted to packed ARGB, resampled to the classifier input size and handed
//! to a single inference worker. While inference is in flight, new frames are
//! dropped rather than queued.

pub mod common;
pub mod capture;
pub mod planes;
pub mod color;
pub mod geometry;
pub mod admission;
pub mod inference;
pub mod stream;

pub use common::{
    PipelineError,
    Result,
};

pub use capture::{
    CapturedFrame,
    FrameSource,
    OwnedFrame,
    Plane,
    SyntheticFrameSource,
};

pub use planes::PlaneBufferManager;

pub use color::{
    ChromaSampling,
    ColorRange,
    PackedImage,
    YuvConverter,
};

pub use geometry::{
    AffineTransform,
    AspectMode,
    FrameResampler,
    Interpolation,
};

pub use admission::{
    AdmissionController,
    Completion,
};

pub use inference::{
    Classifier,
    ClassifierConsumer,
    FrameConsumer,
    InferenceDispatcher,
    Recognition,
};

pub use stream::{
    FrameOutcome,
    FramePipeline,
    PipelineConfig,
    PipelineConfigBuilder,
    PipelineStats,
    StatsSnapshot,
};
