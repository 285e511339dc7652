use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Plane {plane} holds {required} bytes but its buffer was sized at {capacity}; camera configuration changed mid-stream")]
    PlaneOverflow {
        plane: usize,
        capacity: usize,
        required: usize,
    },

    #[error("Plane {plane} too small: need {required} bytes, have {available}")]
    PlaneTooSmall {
        plane: usize,
        required: usize,
        available: usize,
    },

    #[error("Output buffer size mismatch: expected {expected} pixels, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid stride: {0}")]
    InvalidStride(String),

    #[error("Unsupported rotation: {0} degrees (only quarter turns are supported)")]
    UnsupportedRotation(i32),

    #[error("Transform is not invertible")]
    SingularTransform,

    #[error("Stream not configured: no preview size chosen yet")]
    NotConfigured,

    #[error("Frame size {actual_width}x{actual_height} does not match preview size {expected_width}x{expected_height}")]
    FrameSizeMismatch {
        expected_width: usize,
        expected_height: usize,
        actual_width: usize,
        actual_height: usize,
    },

    #[error("Classifier input is still being read")]
    TargetBusy,

    #[error("Frame processing fault: {0}")]
    FrameFault(String),

    #[error("Failed to spawn inference worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

impl PipelineError {
    /// Fatal errors end the stream; everything else abandons one frame.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PipelineError::PlaneOverflow { .. } | PipelineError::WorkerSpawn(_))
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
