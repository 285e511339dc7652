use std::thread;
use std::time::Duration;

use camstream_rs::frame_pipeline::{
    Classifier, ClassifierConsumer, FrameOutcome, FramePipeline, OwnedFrame, PackedImage,
    PipelineConfig, Recognition, SyntheticFrameSource,
};
use camstream_rs::logger;

use anyhow::Context;
use tracing::{error, info, warn};

const PREVIEW_WIDTH: usize = 640;
const PREVIEW_HEIGHT: usize = 480;
const FRAME_INTERVAL: Duration = Duration::from_millis(10);

/// Stand-in engine: ranks "bright" against "dark" by mean luminance and
/// takes a while doing it, so most camera frames get dropped.
struct BrightnessClassifier {
    latency: Duration,
}

impl Classifier for BrightnessClassifier {
    fn input_size(&self) -> (usize, usize) {
        (224, 224)
    }

    fn classify(&mut self, image: &PackedImage) -> anyhow::Result<Vec<Recognition>> {
        thread::sleep(self.latency);
        let total: u64 = image
            .to_rgba_bytes()
            .chunks_exact(4)
            .map(|px| (px[0] as u64 * 299 + px[1] as u64 * 587 + px[2] as u64 * 114) / 1000)
            .sum();
        let mean = total as f32 / image.pixels().len().max(1) as f32 / 255.0;
        Ok(vec![
            Recognition { label: "bright".to_string(), confidence: mean },
            Recognition { label: "dark".to_string(), confidence: 1.0 - mean },
        ])
    }
}

fn main() -> anyhow::Result<()> {
    logger::init();

    info!("Starting camstream...");

    let classifier = BrightnessClassifier { latency: Duration::from_millis(45) };
    let (input_width, input_height) = classifier.input_size();
    let config = PipelineConfig::builder()
        .target_size(input_width, input_height)
        .build();
    info!("Aspect: {:?}", config.aspect);
    info!("Chroma sampling: {:?}", config.chroma_sampling);

    let (results_tx, results_rx) = crossbeam_channel::unbounded();
    let mut pipeline = FramePipeline::new(config).context("invalid pipeline configuration")?;
    pipeline.start(ClassifierConsumer::new(classifier, results_tx))?;
    pipeline.on_preview_size_chosen(PREVIEW_WIDTH, PREVIEW_HEIGHT)?;

    let shades = [40u8, 128, 220];
    let mut source = SyntheticFrameSource::default();
    for tick in 0..90 {
        if tick % 7 == 3 {
            // camera had nothing new this tick
            source.push(None);
        }
        let luma = shades[tick / 30];
        let frame = OwnedFrame::solid(PREVIEW_WIDTH, PREVIEW_HEIGHT, (luma, 128, 128), 32, true);
        source.push(Some(frame));
    }

    while source.remaining() > 0 {
        match pipeline.on_image_available(&mut source) {
            Ok(FrameOutcome::Abandoned(err)) => warn!("Frame abandoned: {}", err),
            Ok(_) => {}
            Err(err) => {
                error!("Stream failed: {}", err);
                break;
            }
        }
        for recognitions in results_rx.try_iter() {
            if let Some(best) = recognitions.first() {
                info!("{} ({:.1}%)", best.label, best.confidence * 100.0);
            }
        }
        thread::sleep(FRAME_INTERVAL);
    }

    pipeline.stop();
    pipeline.stats().log_summary();
    Ok(())
}
