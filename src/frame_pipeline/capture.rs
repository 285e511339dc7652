//! Capture-side frame model
//!
//! The pipeline never owns camera state. It sees frames through
//! [`CapturedFrame`] and hands them back through [`FrameSource::release_frame`].

mod source;
mod synthetic_source;
pub mod types;

pub use source::FrameSource;
pub use synthetic_source::SyntheticFrameSource;
pub use types::{CapturedFrame, OwnedFrame, Plane};
