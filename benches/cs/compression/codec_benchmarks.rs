use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lzhuff::{huffman_decode, huffman_encode, lzw_decode, lzw_encode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn sample_inputs() -> Vec<(&'static str, Vec<u8>)> {
    let mut rng = StdRng::seed_from_u64(42);
    let text = b"It was the best of times, it was the worst of times, it was the age of wisdom, "
        .repeat(256);
    let skewed: Vec<u8> = (0..20_000)
        .map(|_| {
            let a: u8 = rng.gen_range(0..32);
            a.min(rng.gen_range(0..32))
        })
        .collect();
    let random: Vec<u8> = (0..20_000).map(|_| rng.gen()).collect();
    vec![("text", text), ("skewed", skewed), ("random", random)]
}

fn bench_lzw(c: &mut Criterion) {
    let mut group = c.benchmark_group("lzw");
    for (name, input) in sample_inputs() {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", name), &input, |b, input| {
            b.iter(|| lzw_encode(black_box(input)))
        });
        let stream = lzw_encode(&input);
        group.bench_with_input(BenchmarkId::new("decode", name), &stream, |b, stream| {
            b.iter(|| lzw_decode(black_box(stream)).unwrap())
        });
    }
    group.finish();
}

fn bench_huffman(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman");
    for (name, input) in sample_inputs() {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode", name), &input, |b, input| {
            b.iter(|| huffman_encode(black_box(input)))
        });
        let encoded = huffman_encode(&input);
        group.bench_with_input(BenchmarkId::new("decode", name), &encoded, |b, encoded| {
            b.iter(|| huffman_decode(black_box(encoded)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lzw, bench_huffman);
criterion_main!(benches);
