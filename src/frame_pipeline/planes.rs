//! Persistent per-plane copies of sensor data.
//!
//! Capture buffers are recycled as soon as a frame is released, so plane bytes
//! are copied out first. Row stride can exceed the visible width, which makes
//! the required size unknowable until a frame is seen: each buffer is sized
//! from the first frame and then fixed for the rest of the stream.

use tracing::{debug, error};

use crate::frame_pipeline::capture::Plane;
use crate::frame_pipeline::common::error::{PipelineError, Result};

#[derive(Debug, Default)]
pub struct PlaneBufferManager {
    buffers: [Option<Box<[u8]>>; 3],
    /// Bytes written by the most recent fill, per plane
    filled: [usize; 3],
}

impl PlaneBufferManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies every plane into its persistent buffer, allocating on first use.
    ///
    /// A plane larger than its buffer is a [`PipelineError::PlaneOverflow`];
    /// nothing is written for that plane or any after it.
    pub fn fill(&mut self, planes: &[Plane<'_>; 3]) -> Result<()> {
        for (index, plane) in planes.iter().enumerate() {
            let buffer = self.buffers[index].get_or_insert_with(|| {
                debug!("Initializing buffer {} at size {}", index, plane.data.len());
                vec![0u8; plane.data.len()].into_boxed_slice()
            });

            let required = plane.data.len();
            if required > buffer.len() {
                error!(
                    plane = index,
                    capacity = buffer.len(),
                    required,
                    "Plane exceeds its allocated buffer"
                );
                return Err(PipelineError::PlaneOverflow {
                    plane: index,
                    capacity: buffer.len(),
                    required,
                });
            }

            buffer[..required].copy_from_slice(plane.data);
            self.filled[index] = required;
        }
        Ok(())
    }

    /// Bytes of plane `index` from the last fill. Empty before the first fill.
    pub fn plane(&self, index: usize) -> &[u8] {
        match &self.buffers[index] {
            Some(buffer) => &buffer[..self.filled[index]],
            None => &[],
        }
    }

    /// Y, U and V as copied by the last fill.
    pub fn yuv(&self) -> (&[u8], &[u8], &[u8]) {
        (self.plane(0), self.plane(1), self.plane(2))
    }

    /// Allocated size of plane `index`, if it has been allocated.
    pub fn capacity(&self, index: usize) -> Option<usize> {
        self.buffers[index].as_ref().map(|buffer| buffer.len())
    }

    /// Drops all buffers; the next fill sizes them again.
    pub fn reset(&mut self) {
        self.buffers = Default::default();
        self.filled = [0; 3];
    }
}
