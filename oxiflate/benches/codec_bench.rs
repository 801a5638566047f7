//! Criterion benchmarks for the codec.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oxiflate::deflate::deflate;
use oxiflate::inflate::inflate;
use oxiflate::zlib::{zlib_compress, zlib_decompress};

fn sample_text(len: usize) -> Vec<u8> {
    let phrase = b"the quick brown fox jumps over the lazy dog. ";
    phrase.iter().cycle().take(len).copied().collect()
}

fn sample_noise(len: usize) -> Vec<u8> {
    let mut state = 0x9E3779B97F4A7C15u64;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 56) as u8
        })
        .collect()
}

fn bench_deflate(c: &mut Criterion) {
    let text = sample_text(64 * 1024);
    let noise = sample_noise(64 * 1024);

    let mut group = c.benchmark_group("deflate");
    for level in [1u8, 4, 9] {
        group.bench_function(format!("text_level_{level}"), |b| {
            b.iter(|| deflate(black_box(&text), level).unwrap())
        });
        group.bench_function(format!("noise_level_{level}"), |b| {
            b.iter(|| deflate(black_box(&noise), level).unwrap())
        });
    }
    group.finish();
}

fn bench_inflate(c: &mut Criterion) {
    let text = sample_text(64 * 1024);
    let compressed = deflate(&text, 6).unwrap();

    c.bench_function("inflate_text", |b| {
        b.iter(|| inflate(black_box(&compressed)).unwrap())
    });
}

fn bench_zlib_roundtrip(c: &mut Criterion) {
    let text = sample_text(16 * 1024);

    c.bench_function("zlib_roundtrip", |b| {
        b.iter(|| {
            let compressed = zlib_compress(black_box(&text), 6).unwrap();
            zlib_decompress(&compressed).unwrap()
        })
    });
}

criterion_group!(benches, bench_deflate, bench_inflate, bench_zlib_roundtrip);
criterion_main!(benches);
