use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, TryLockError};

use tracing::{debug_span, error, info, trace, warn};

use crate::frame_pipeline::{
    admission::AdmissionController,
    capture::{CapturedFrame, FrameSource},
    color::{PackedImage, YuvConverter, YuvFrameRef},
    common::error::{PipelineError, Result},
    geometry::FrameResampler,
    inference::{FrameConsumer, InferenceDispatcher},
    planes::PlaneBufferManager,
    stream::config::PipelineConfig,
    stream::stats::{PipelineStats, Timer},
};

/// What happened to one capture tick.
#[derive(Debug)]
pub enum FrameOutcome {
    /// The source had no frame ready
    NoFrame,
    /// Inference was in flight; the frame was released untouched
    Dropped,
    /// The frame was processed and handed to the inference worker
    Dispatched,
    /// The frame was processed but the worker is stopped
    Undelivered,
    /// A per-frame fault; the frame was released and admission restored
    Abandoned(PipelineError),
}

/// Live camera-to-classifier pipeline.
///
/// `on_image_available` is called from the capture context, one call at a
/// time. Classification happens on the worker started by [`FramePipeline::start`].
pub struct FramePipeline {
    config: PipelineConfig,
    converter: YuvConverter,
    planes: PlaneBufferManager,
    preview: Option<PackedImage>,
    resampler: Option<FrameResampler>,
    target: Arc<Mutex<PackedImage>>,
    admission: AdmissionController,
    dispatcher: Option<InferenceDispatcher>,
    stats: PipelineStats,
}

impl FramePipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let target = PackedImage::new(config.target_width, config.target_height);
        Ok(Self {
            converter: YuvConverter::new(config.chroma_sampling, config.color_range),
            planes: PlaneBufferManager::new(),
            preview: None,
            resampler: None,
            target: Arc::new(Mutex::new(target)),
            admission: AdmissionController::new(),
            dispatcher: None,
            stats: PipelineStats::new(),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    pub fn resampler(&self) -> Option<&FrameResampler> {
        self.resampler.as_ref()
    }

    pub fn plane_buffers(&self) -> &PlaneBufferManager {
        &self.planes
    }

    pub fn is_running(&self) -> bool {
        self.dispatcher.as_ref().is_some_and(InferenceDispatcher::is_running)
    }

    /// Last preview-size conversion, once configured.
    pub fn preview_image(&self) -> Option<&PackedImage> {
        self.preview.as_ref()
    }

    /// Copy of the classifier input as last written.
    pub fn target_image(&self) -> PackedImage {
        match self.target.lock() {
            Ok(image) => image.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Starts the inference worker. A running worker is stopped first.
    pub fn start<C: FrameConsumer>(&mut self, consumer: C) -> Result<()> {
        self.stop();
        self.dispatcher = Some(InferenceDispatcher::start(Arc::clone(&self.target), consumer)?);
        info!(
            "Stream started, classifier input {}x{}",
            self.config.target_width, self.config.target_height
        );
        Ok(())
    }

    /// Drains and joins the inference worker. Frames keep being accepted but
    /// are no longer delivered.
    pub fn stop(&mut self) {
        if let Some(mut dispatcher) = self.dispatcher.take() {
            info!("Pausing stream");
            dispatcher.stop();
        }
    }

    /// Sizes the preview buffers and builds the frame-to-target transform.
    ///
    /// Called once the camera settles on a preview size. Plane buffers are
    /// reset so they are sized from the next frame.
    pub fn on_preview_size_chosen(&mut self, width: usize, height: usize) -> Result<()> {
        info!("Initializing camera preview at size {}x{}", width, height);
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }

        let resampler = FrameResampler::new(
            (width, height),
            (self.config.target_width, self.config.target_height),
            self.config.rotation_degrees,
            self.config.aspect,
            self.config.interpolation,
        )?;

        self.preview = Some(PackedImage::new(width, height));
        self.resampler = Some(resampler);
        self.planes.reset();
        Ok(())
    }

    /// Handles one "frame available" notification from `source`.
    ///
    /// Returns `Err` only for fatal errors, after which the stream should be
    /// torn down. Every acquired frame is released before returning.
    pub fn on_image_available<S: FrameSource>(&mut self, source: &mut S) -> Result<FrameOutcome> {
        let Some(frame) = source.acquire_latest_frame() else {
            return Ok(FrameOutcome::NoFrame);
        };
        self.stats.frame_seen();

        let Some(completion) = self.admission.try_admit() else {
            source.release_frame(frame);
            self.stats.frame_dropped();
            trace!("Frame dropped while inference in flight");
            return Ok(FrameOutcome::Dropped);
        };

        let _span = debug_span!("image_available").entered();

        let converted = self.guarded(|pipeline| pipeline.convert_frame(&frame));
        source.release_frame(frame);
        let prepared = converted.and_then(|()| self.guarded(Self::resample_frame));

        if let Err(err) = prepared {
            // Admission goes back to IDLE before anything is reported.
            drop(completion);
            if err.is_fatal() {
                error!("Fatal pipeline error: {}", err);
                return Err(err);
            }
            warn!("Abandoning frame: {}", err);
            self.stats.frame_abandoned();
            return Ok(FrameOutcome::Abandoned(err));
        }

        let timer = Timer::start("dispatch");
        let delivered = {
            let _span = debug_span!("dispatch").entered();
            match &self.dispatcher {
                Some(dispatcher) => dispatcher.dispatch(completion),
                None => {
                    drop(completion);
                    false
                }
            }
        };
        let (name, duration) = timer.stop();
        self.stats.record_stage(name, duration);

        if delivered {
            self.stats.frame_dispatched();
            Ok(FrameOutcome::Dispatched)
        } else {
            Ok(FrameOutcome::Undelivered)
        }
    }

    /// Runs one stage, turning a panic into a per-frame fault.
    fn guarded<T>(&mut self, stage: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        panic::catch_unwind(AssertUnwindSafe(|| stage(self))).unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(PipelineError::FrameFault(message))
        })
    }

    fn convert_frame<F: CapturedFrame>(&mut self, frame: &F) -> Result<()> {
        let preview = self.preview.as_mut().ok_or(PipelineError::NotConfigured)?;
        let (width, height) = (frame.width(), frame.height());
        if (width, height) != preview.dimensions() {
            return Err(PipelineError::FrameSizeMismatch {
                expected_width: preview.width(),
                expected_height: preview.height(),
                actual_width: width,
                actual_height: height,
            });
        }

        let planes = frame.planes();
        {
            let _span = debug_span!("fill_planes").entered();
            let timer = Timer::start("fill_planes");
            self.planes.fill(&planes)?;
            let (name, duration) = timer.stop();
            self.stats.record_stage(name, duration);
        }

        let _span = debug_span!("convert_yuv", width, height).entered();
        let timer = Timer::start("convert_yuv");
        let (y, u, v) = self.planes.yuv();
        let view = YuvFrameRef {
            width,
            height,
            y,
            u,
            v,
            y_row_stride: planes[0].row_stride,
            uv_row_stride: planes[1].row_stride,
            uv_pixel_stride: planes[1].pixel_stride,
        };
        self.converter.convert(&view, preview)?;
        self.stats.frame_converted();
        let (name, duration) = timer.stop();
        self.stats.record_stage(name, duration);
        Ok(())
    }

    fn resample_frame(&mut self) -> Result<()> {
        let _span = debug_span!("resample").entered();
        let timer = Timer::start("resample");

        let resampler = self.resampler.as_ref().ok_or(PipelineError::NotConfigured)?;
        let preview = self.preview.as_ref().ok_or(PipelineError::NotConfigured)?;
        let mut target = match self.target.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => return Err(PipelineError::TargetBusy),
        };
        resampler.resample(preview, &mut target)?;
        drop(target);

        let (name, duration) = timer.stop();
        self.stats.record_stage(name, duration);
        Ok(())
    }
}

impl Drop for FramePipeline {
    fn drop(&mut self) {
        self.stop();
    }
}
