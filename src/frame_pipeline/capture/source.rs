use crate::frame_pipeline::capture::types::CapturedFrame;

pub trait FrameSource {
    type Frame: CapturedFrame;

    /// Most recent frame, skipping any older ones, or `None` if nothing is ready.
    fn acquire_latest_frame(&mut self) -> Option<Self::Frame>;

    /// Hands the frame's memory back to the source.
    fn release_frame(&mut self, frame: Self::Frame);
}
