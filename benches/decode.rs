use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use image::DynamicImage;
use rust_fgc::detector::{FeatureExtractor, HoughCircles};
use rust_fgc::tools::{bench_limit_from_env, dataset_iter, dataset_root_from_env, load_image};
use rust_fgc::utils::binarization::{Threshold, binarize};
use rust_fgc::FgcDecoder;

fn synthetic(text: &str, scale: f32) -> DynamicImage {
    let code = rust_fgc::encode(text).expect("encodable text");
    DynamicImage::ImageLuma8(code.to_image(scale))
}

fn bench_synthetic_decode(c: &mut Criterion) {
    let decoder = FgcDecoder::default();
    let mut group = c.benchmark_group("decode_synthetic");
    group.sample_size(20);
    for scale in [8.0f32, 12.0] {
        let image = synthetic("Milch.", scale);
        group.bench_with_input(BenchmarkId::from_parameter(scale), &image, |b, image| {
            b.iter(|| decoder.read(black_box(image)))
        });
    }
    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let gray = synthetic("Fancy Galaxy Code", 12.0).to_luma8();
    let hough = HoughCircles::default();
    let features = FeatureExtractor::default();
    let (mask, _) = binarize(&gray, Threshold::Otsu);

    let mut group = c.benchmark_group("stages");
    group.sample_size(20);
    group.bench_function("hough", |b| b.iter(|| hough.detect(black_box(&gray))));
    group.bench_function("binarize", |b| {
        b.iter(|| binarize(black_box(&gray), Threshold::Otsu))
    });
    group.bench_function("features", |b| {
        b.iter(|| features.extract(black_box(&mask), &gray))
    });
    group.finish();
}

fn bench_dataset(c: &mut Criterion) {
    let Some(root) = dataset_root_from_env() else {
        eprintln!("FGC_DATASET_ROOT not set, skipping dataset bench");
        return;
    };
    let images: Vec<(String, DynamicImage)> = dataset_iter(&root, bench_limit_from_env())
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            load_image(&path).ok().map(|image| (name, image))
        })
        .collect();
    if images.is_empty() {
        eprintln!("No images under {}", root.display());
        return;
    }

    let decoder = FgcDecoder::default();
    let decoded = images
        .iter()
        .filter(|(_, image)| decoder.read(image).is_ok())
        .count();
    println!("Reading rate: {}/{} images", decoded, images.len());

    let mut group = c.benchmark_group("decode_dataset");
    group.sample_size(10);
    for (name, image) in &images {
        group.bench_with_input(BenchmarkId::from_parameter(name), image, |b, image| {
            b.iter(|| decoder.read(black_box(image)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_synthetic_decode, bench_stages, bench_dataset);
criterion_main!(benches);
