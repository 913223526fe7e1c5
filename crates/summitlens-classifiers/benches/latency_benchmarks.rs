//! Latency benchmarks for the inference pipeline
//!
//! Covers the CPU-bound stages of a request:
//! - preprocessing of uploads at common photo resolutions
//! - the threshold decision over a probability vector
//! - a full forward pass of the Candle network
//!
//! Run with: cargo bench -p summitlens-classifiers

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use tokio::runtime::Runtime;

use summitlens_classifiers::{
    apply_threshold, ClassCatalog, DescriptionStyle, ImageClassifier, MountainNet, Preprocessor,
};
use summitlens_core::ProbabilityVector;

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

/// Benchmark decode + resize + scale at typical upload sizes
fn benchmark_preprocess(c: &mut Criterion) {
    let preprocessor = Preprocessor::default();

    let test_cases = vec![
        ("thumbnail_160x120", jpeg(160, 120)),
        ("native_224x224", jpeg(224, 224)),
        ("phone_1280x960", jpeg(1280, 960)),
    ];

    let mut group = c.benchmark_group("Preprocess");
    group.sample_size(30);

    for (name, bytes) in test_cases {
        group.bench_with_input(BenchmarkId::new("preprocess", name), &bytes, |b, bytes| {
            b.iter(|| preprocessor.preprocess(black_box(bytes)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the threshold decision
fn benchmark_decision(c: &mut Criterion) {
    let catalog = ClassCatalog::sri_lanka(DescriptionStyle::Short);
    let probs = ProbabilityVector::new(vec![
        0.1, 0.05, 0.02, 0.03, 0.7, 0.0, 0.0, 0.0, 0.1, 0.0,
    ]);

    c.bench_function("apply_threshold", |b| {
        b.iter(|| apply_threshold(black_box(&probs), &catalog, 0.6).unwrap());
    });
}

/// Benchmark a forward pass of the Candle network on CPU
fn benchmark_mountain_net(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let vb = VarBuilder::zeros(DType::F32, &Device::Cpu);
    let model = MountainNet::new(vb, 10).expect("Failed to build network");
    let tensor = Preprocessor::default().preprocess(&jpeg(640, 480)).unwrap();

    let mut group = c.benchmark_group("MountainNet");
    group.sample_size(10);
    group.bench_function("infer_cpu", |b| {
        b.iter(|| rt.block_on(async { model.infer(black_box(&tensor)).await.unwrap() }));
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_preprocess,
    benchmark_decision,
    benchmark_mountain_net
);
criterion_main!(benches);
