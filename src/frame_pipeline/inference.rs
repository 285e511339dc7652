//! Inference hand-off module
//!
//! A single background worker classifies the resampled frame so capture never
//! waits on the inference engine.

mod classifier;
mod dispatcher;

pub use classifier::{Classifier, ClassifierConsumer, FrameConsumer, Recognition};
pub use dispatcher::InferenceDispatcher;
