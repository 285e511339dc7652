use crossbeam_channel::Sender;
use tracing::{debug, debug_span, warn};

use crate::frame_pipeline::admission::Completion;
use crate::frame_pipeline::color::PackedImage;

/// One labelled guess from the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub label: String,
    pub confidence: f32,
}

/// Receives each admitted frame on the inference worker.
///
/// The image is only valid for the duration of the call. `completion` must be
/// completed (or dropped) once the frame is no longer needed; until then every
/// new frame is dropped. Completing inside the call is fine: admission is only
/// released once the call has also returned.
pub trait FrameConsumer: Send + 'static {
    fn classify(&mut self, image: &PackedImage, completion: Completion);
}

impl<F> FrameConsumer for F
where
    F: FnMut(&PackedImage, Completion) + Send + 'static,
{
    fn classify(&mut self, image: &PackedImage, completion: Completion) {
        self(image, completion)
    }
}

/// An inference engine taking a fixed-size packed image.
pub trait Classifier: Send + 'static {
    /// Input size `(width, height)` the engine expects.
    fn input_size(&self) -> (usize, usize);

    fn classify(&mut self, image: &PackedImage) -> anyhow::Result<Vec<Recognition>>;
}

/// Runs a [`Classifier`] on each frame and publishes the top results.
///
/// Engine failures are logged and the frame is still completed.
pub struct ClassifierConsumer<C: Classifier> {
    classifier: C,
    results: Sender<Vec<Recognition>>,
    max_results: usize,
}

impl<C: Classifier> ClassifierConsumer<C> {
    pub fn new(classifier: C, results: Sender<Vec<Recognition>>) -> Self {
        Self {
            classifier,
            results,
            max_results: 3,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

impl<C: Classifier> FrameConsumer for ClassifierConsumer<C> {
    fn classify(&mut self, image: &PackedImage, completion: Completion) {
        let _span = debug_span!("classify", width = image.width(), height = image.height()).entered();

        match self.classifier.classify(image) {
            Ok(mut recognitions) => {
                recognitions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
                recognitions.truncate(self.max_results);
                if self.results.send(recognitions).is_err() {
                    debug!("Result receiver gone, discarding recognitions");
                }
            }
            Err(err) => warn!("Classification failed: {:#}", err),
        }

        completion.complete();
    }
}
