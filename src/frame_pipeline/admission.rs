//! Frame admission control
//!
//! At most one frame is in flight. A frame that arrives while another is
//! being classified is dropped, never queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::trace;

/// Shared IDLE/BUSY flag. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct AdmissionController {
    busy: Arc<AtomicBool>,
}

impl AdmissionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips IDLE to BUSY in one atomic step.
    ///
    /// Returns `None` if a frame is already in flight. The returned
    /// [`Completion`] flips the flag back when completed or dropped.
    pub fn try_admit(&self) -> Option<Completion> {
        match self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Some(Completion {
                admitted: Arc::new(Admitted {
                    busy: Arc::clone(&self.busy),
                }),
            }),
            Err(_) => {
                trace!("Pipeline busy, frame not admitted");
                None
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Admission for one in-flight frame.
///
/// Completing, or dropping on any path including a panic, returns the
/// controller to IDLE exactly once. If the pipeline still holds a share of
/// the admission (the worker does while it holds the target image), IDLE is
/// reached only when that share is dropped too.
#[derive(Debug)]
#[must_use = "dropping a Completion immediately releases the admission"]
pub struct Completion {
    admitted: Arc<Admitted>,
}

impl Completion {
    /// Reports inference done.
    pub fn complete(self) {
        drop(self);
    }

    /// Another handle on the same admission. The controller stays BUSY until
    /// every handle is completed or dropped.
    pub(crate) fn share(&self) -> Completion {
        Completion {
            admitted: Arc::clone(&self.admitted),
        }
    }
}

#[derive(Debug)]
struct Admitted {
    busy: Arc<AtomicBool>,
}

impl Drop for Admitted {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
