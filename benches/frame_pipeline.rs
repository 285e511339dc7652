use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use camstream_rs::frame_pipeline::{
    AspectMode, CapturedFrame, ChromaSampling, ColorRange, FrameResampler, Interpolation,
    OwnedFrame, PackedImage, YuvConverter,
};
use camstream_rs::frame_pipeline::color::YuvFrameRef;

fn generate_mock_frame(width: usize, height: usize) -> OwnedFrame {
    let mut frame = OwnedFrame::solid(width, height, (0, 0, 0), 64, true);
    for (i, byte) in frame.data[0].iter_mut().enumerate() {
        *byte = (i % 256) as u8;
    }
    frame
}

fn frame_ref(frame: &OwnedFrame) -> YuvFrameRef<'_> {
    let [y, u, v] = frame.planes();
    YuvFrameRef {
        width: frame.width,
        height: frame.height,
        y: y.data,
        u: u.data,
        v: v.data,
        y_row_stride: y.row_stride,
        uv_row_stride: u.row_stride,
        uv_pixel_stride: u.pixel_stride,
    }
}

fn benchmark_conversion_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("yuv_conversion_by_size");

    let sizes = vec![
        (320, 240, "320x240"),
        (640, 480, "640x480"),
        (1280, 720, "1280x720"),
    ];

    for (width, height, label) in sizes {
        let frame = generate_mock_frame(width, height);

        group.bench_with_input(
            BenchmarkId::from_parameter(label),
            &frame,
            |b, frame| {
                let converter = YuvConverter::default();
                let view = frame_ref(frame);
                let mut output = PackedImage::new(width, height);

                b.iter(|| {
                    let _ = converter.convert(black_box(&view), &mut output);
                });
            },
        );
    }

    group.finish();
}

fn benchmark_chroma_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("chroma_sampling");
    let frame = generate_mock_frame(640, 480);
    let view = frame_ref(&frame);

    for (sampling, label) in [
        (ChromaSampling::PerPixel, "per_pixel"),
        (ChromaSampling::PerBlock, "per_block"),
    ] {
        group.bench_function(label, |b| {
            let converter = YuvConverter::new(sampling, ColorRange::Full);
            let mut output = PackedImage::new(640, 480);

            b.iter(|| {
                let _ = converter.convert(black_box(&view), &mut output);
            });
        });
    }

    group.finish();
}

fn benchmark_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample_640x480_to_224");
    let mut source = PackedImage::new(640, 480);
    for (i, pixel) in source.pixels_mut().iter_mut().enumerate() {
        *pixel = 0xff00_0000 | (i as u32 & 0x00ff_ffff);
    }

    let cases = [
        (AspectMode::CenterCrop, Interpolation::Nearest, 0, "crop_nearest"),
        (AspectMode::Stretch, Interpolation::Nearest, 0, "stretch_nearest"),
        (AspectMode::CenterCrop, Interpolation::Nearest, 90, "crop_nearest_rot90"),
        (AspectMode::CenterCrop, Interpolation::Bilinear, 0, "crop_bilinear"),
    ];

    for (aspect, interpolation, rotation, label) in cases {
        group.bench_function(label, |b| {
            let resampler =
                FrameResampler::new((640, 480), (224, 224), rotation, aspect, interpolation)
                    .expect("valid resampler");
            let mut target = PackedImage::new(224, 224);

            b.iter(|| {
                let _ = resampler.resample(black_box(&source), &mut target);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_conversion_sizes,
    benchmark_chroma_sampling,
    benchmark_resample
);
criterion_main!(benches);
