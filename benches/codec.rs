use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rust_fgc::codec::{BitCodec, ErrorCorrector};
use rust_fgc::layout::marks::ring_marks;
use rust_fgc::layout::{BoundaryPolicy, RingLayout, RingTable};

const TEXTS: [&str; 3] = ["Milch.", "Fancy Galaxy Code", "The quick brown fox jumps over it"];

fn bench_text_to_bits(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_to_bits");
    for text in TEXTS {
        group.bench_with_input(BenchmarkId::from_parameter(text.len()), text, |b, text| {
            b.iter(|| BitCodec::encode(black_box(text)))
        });
    }
    group.finish();
}

fn bench_hamming(c: &mut Criterion) {
    let mut group = c.benchmark_group("hamming");
    for text in TEXTS {
        let data = BitCodec::encode(text);
        let mut encoded = ErrorCorrector::encode(&data);
        group.bench_with_input(BenchmarkId::new("encode", data.len()), &data, |b, data| {
            b.iter(|| ErrorCorrector::encode(black_box(data)))
        });
        encoded[5] = !encoded[5];
        group.bench_with_input(
            BenchmarkId::new("decode_flipped", encoded.len()),
            &encoded,
            |b, encoded| b.iter(|| ErrorCorrector::decode(black_box(encoded))),
        );
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let table = RingTable::default();
    let bits = ErrorCorrector::encode(&BitCodec::encode(TEXTS[2]));
    c.bench_function("partition_and_marks", |b| {
        b.iter(|| {
            let layout = RingLayout::partition(black_box(&bits), &table);
            layout
                .rings
                .iter()
                .map(|ring| ring_marks(ring, BoundaryPolicy::Closed).marks.len())
                .sum::<usize>()
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let code = rust_fgc::encode(TEXTS[1]).unwrap();
    c.bench_function("render_png_scale_12", |b| b.iter(|| code.to_image(black_box(12.0))));
    c.bench_function("render_svg", |b| {
        b.iter(|| code.to_svg(rust_fgc::layout::SvgStyle::default(), black_box(true)))
    });
}

criterion_group!(benches, bench_text_to_bits, bench_hamming, bench_layout, bench_render);
criterion_main!(benches);
