//! Codec benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rosc::OscPacket;
use tuio_core::messages::{AliveMessage, ConvexHull, FrameMessage, Pointer};
use tuio_core::{Bundle, ConvertorRegistry, Point2, Timetag};

fn sample_bundle(pointers: u32) -> Bundle {
    let bundle = Bundle::new();
    bundle.push(FrameMessage::new(1, Timetag::new(3_900_000_000, 0)));
    for id in 1..=pointers {
        bundle.push(Pointer::new(id, id as f32 * 0.01, 0.5));
    }
    bundle.push(ConvexHull::new(
        pointers + 1,
        (0..16)
            .map(|i| {
                let a = i as f32 * std::f32::consts::TAU / 16.0;
                Point2::new(a.cos(), a.sin())
            })
            .collect(),
    ));
    bundle.push(AliveMessage::new((1..=pointers + 1).collect()));
    bundle
}

fn encode_benchmark(c: &mut Criterion) {
    let bundle = sample_bundle(10);

    c.bench_function("encode_bundle_10_pointers", |b| {
        b.iter(|| black_box(bundle.encode().unwrap()))
    });
}

fn decode_benchmark(c: &mut Criterion) {
    let bytes = sample_bundle(10).encode().unwrap();
    let registry = ConvertorRegistry::with_defaults();

    c.bench_function("decode_bundle_10_pointers", |b| {
        b.iter(|| {
            let OscPacket::Bundle(osc) = ConvertorRegistry::decode_packet(&bytes).unwrap() else {
                unreachable!()
            };
            black_box(registry.decode_bundle(&osc, false))
        })
    });
}

fn copy_out_benchmark(c: &mut Criterion) {
    let bundle = sample_bundle(50);

    c.bench_function("deep_copy_bundle_50_pointers", |b| {
        b.iter(|| black_box(bundle.deep_copy()))
    });
}

criterion_group!(benches, encode_benchmark, decode_benchmark, copy_out_benchmark);
criterion_main!(benches);
