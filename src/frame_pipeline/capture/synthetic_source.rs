use std::collections::VecDeque;

use tracing::trace;

use crate::frame_pipeline::capture::source::FrameSource;
use crate::frame_pipeline::capture::types::{CapturedFrame, OwnedFrame};

/// In-memory frame source.
///
/// Replays a script of ticks where `None` means "no frame ready", then keeps
/// returning `None` once the script is exhausted. Tracks how many frames were
/// acquired and released so callers can check nothing leaks.
#[derive(Debug, Default)]
pub struct SyntheticFrameSource {
    script: VecDeque<Option<OwnedFrame>>,
    acquired: usize,
    released: usize,
}

impl SyntheticFrameSource {
    pub fn from_script(script: impl IntoIterator<Item = Option<OwnedFrame>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// `count` copies of the same frame.
    pub fn repeating(frame: OwnedFrame, count: usize) -> Self {
        Self::from_script(std::iter::repeat_n(Some(frame), count))
    }

    pub fn push(&mut self, frame: Option<OwnedFrame>) {
        self.script.push_back(frame);
    }

    pub fn acquired(&self) -> usize {
        self.acquired
    }

    pub fn released(&self) -> usize {
        self.released
    }

    /// Frames handed out and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.acquired - self.released
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl FrameSource for SyntheticFrameSource {
    type Frame = OwnedFrame;

    fn acquire_latest_frame(&mut self) -> Option<OwnedFrame> {
        let frame = self.script.pop_front().flatten()?;
        self.acquired += 1;
        trace!(
            width = frame.width(),
            height = frame.height(),
            acquired = self.acquired,
            "Synthetic frame acquired"
        );
        Some(frame)
    }

    fn release_frame(&mut self, frame: OwnedFrame) {
        self.released += 1;
        drop(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaps_are_not_counted() {
        let frame = OwnedFrame::solid(4, 4, (16, 128, 128), 0, false);
        let mut source = SyntheticFrameSource::from_script([None, Some(frame), None]);

        assert!(source.acquire_latest_frame().is_none());
        let frame = source.acquire_latest_frame().expect("scripted frame");
        assert_eq!(source.outstanding(), 1);
        source.release_frame(frame);
        assert!(source.acquire_latest_frame().is_none());
        assert!(source.acquire_latest_frame().is_none());

        assert_eq!(source.acquired(), 1);
        assert_eq!(source.released(), 1);
        assert_eq!(source.outstanding(), 0);
    }

    #[test]
    fn test_semi_planar_frame_layout() {
        let frame = OwnedFrame::solid(6, 4, (50, 100, 200), 2, true);
        let [y, u, v] = frame.planes();

        assert_eq!(y.row_stride, 8);
        assert_eq!(u.pixel_stride, 2);
        assert_eq!(u.row_stride, 8);
        assert_eq!(u.data[0], 100);
        assert_eq!(u.data[1], 200);
        assert_eq!(v.data[0], 200);
        // last sample of the last chroma row is readable
        assert_eq!(u.data.len(), 8 + 2 * 2 + 1);
        assert_eq!(*u.data.last().unwrap(), 100);
    }
}
