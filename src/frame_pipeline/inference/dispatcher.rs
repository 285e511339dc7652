use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, TrySendError};
use tracing::{debug, error, info, warn};

use crate::frame_pipeline::admission::Completion;
use crate::frame_pipeline::color::PackedImage;
use crate::frame_pipeline::common::error::Result;
use crate::frame_pipeline::inference::classifier::FrameConsumer;

/// Unit of work posted to the worker. The image itself stays in the shared slot.
struct InferenceJob {
    completion: Completion,
}

/// Owns the single inference worker thread.
///
/// The target image is shared through a one-slot `Mutex`; admission control
/// guarantees the capture side never writes it while a job is in flight.
pub struct InferenceDispatcher {
    sender: Option<Sender<InferenceJob>>,
    worker: Option<JoinHandle<()>>,
}

impl InferenceDispatcher {
    /// Spawns the `inference` worker.
    pub fn start<C: FrameConsumer>(slot: Arc<Mutex<PackedImage>>, mut consumer: C) -> Result<Self> {
        let (sender, receiver) = crossbeam_channel::bounded::<InferenceJob>(1);

        let worker = thread::Builder::new()
            .name("inference".to_string())
            .spawn(move || {
                debug!("Inference worker started");
                for job in receiver.iter() {
                    // Admission stays BUSY until the slot lock is released,
                    // even if the consumer completes before returning.
                    let held = job.completion.share();
                    let image = slot.lock().unwrap_or_else(PoisonError::into_inner);
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        consumer.classify(&image, job.completion)
                    }));
                    drop(image);
                    drop(held);
                    if outcome.is_err() {
                        error!("Frame consumer panicked; frame discarded");
                    }
                }
                debug!("Inference worker stopped");
            })?;

        info!("Inference worker running");
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    pub fn is_running(&self) -> bool {
        self.sender.is_some()
    }

    /// Posts the frame in the shared slot to the worker without waiting.
    ///
    /// Returns `false` (and releases `completion`) when the worker is stopped
    /// or already has a job queued.
    pub fn dispatch(&self, completion: Completion) -> bool {
        let Some(sender) = &self.sender else {
            debug!("Dispatch after stop ignored");
            return false;
        };

        match sender.try_send(InferenceJob { completion }) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Inference queue already holds a frame; dropping");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("Inference worker gone; dropping frame");
                false
            }
        }
    }

    /// Stops accepting work, lets the worker finish what it holds, and joins it.
    pub fn stop(&mut self) {
        // Closing the channel ends the worker loop once the queue is drained.
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Inference worker panicked during shutdown");
            }
            info!("Inference worker joined");
        }
    }
}

impl Drop for InferenceDispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_pipeline::admission::AdmissionController;
    use std::sync::mpsc;
    use std::time::Duration;

    fn slot() -> Arc<Mutex<PackedImage>> {
        Arc::new(Mutex::new(PackedImage::new(2, 2)))
    }

    #[test]
    fn test_worker_runs_off_the_calling_thread() {
        let (tx, rx) = mpsc::channel();
        let controller = AdmissionController::new();
        let mut dispatcher = InferenceDispatcher::start(slot(), move |image: &PackedImage, done: Completion| {
            let name = thread::current().name().map(str::to_string);
            tx.send((name, image.dimensions())).unwrap();
            done.complete();
        })
        .unwrap();

        assert!(dispatcher.dispatch(controller.try_admit().unwrap()));
        let (name, dims) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("inference"));
        assert_eq!(dims, (2, 2));

        dispatcher.stop();
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_stop_drains_in_flight_job() {
        let (tx, rx) = mpsc::channel();
        let controller = AdmissionController::new();
        let mut dispatcher = InferenceDispatcher::start(slot(), move |_: &PackedImage, done: Completion| {
            thread::sleep(Duration::from_millis(50));
            tx.send(()).unwrap();
            done.complete();
        })
        .unwrap();

        assert!(dispatcher.dispatch(controller.try_admit().unwrap()));
        dispatcher.stop();

        // joined only after the job finished
        assert!(rx.try_recv().is_ok());
        assert!(!controller.is_busy());
        assert!(!dispatcher.is_running());
    }

    #[test]
    fn test_dispatch_after_stop_is_a_no_op() {
        let controller = AdmissionController::new();
        let mut dispatcher =
            InferenceDispatcher::start(slot(), |_: &PackedImage, done: Completion| done.complete())
                .unwrap();
        dispatcher.stop();

        assert!(!dispatcher.dispatch(controller.try_admit().unwrap()));
        assert!(!controller.is_busy());
    }

    #[test]
    fn test_panicking_consumer_releases_admission_and_keeps_worker() {
        let (tx, rx) = mpsc::channel();
        let controller = AdmissionController::new();
        let mut calls = 0;
        let mut dispatcher = InferenceDispatcher::start(slot(), move |_: &PackedImage, done: Completion| {
            calls += 1;
            tx.send(calls).unwrap();
            if calls == 1 {
                panic!("engine crashed");
            }
            done.complete();
        })
        .unwrap();

        assert!(dispatcher.dispatch(controller.try_admit().unwrap()));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);

        // wait for the unwinding job to give the admission back
        let mut next = None;
        for _ in 0..500 {
            if let Some(admitted) = controller.try_admit() {
                next = Some(admitted);
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        assert!(dispatcher.dispatch(next.expect("admission released after panic")));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 2);
        dispatcher.stop();
    }
}
