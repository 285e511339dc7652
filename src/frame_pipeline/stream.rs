//! Stream orchestration module
//!
//! Ties capture, conversion, resampling, admission and dispatch together.

mod config;
mod pipeline;
mod stats;


pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use pipeline::{FrameOutcome, FramePipeline};
pub use stats::{PipelineStats, StatsSnapshot, Timer};
