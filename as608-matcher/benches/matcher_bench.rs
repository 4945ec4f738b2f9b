//! Benchmarks for alignment and minutiae matching.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench matcher_bench
//! ```

use as608_matcher::{MatchConfig, align, identify, match_count};
use as608_types::{FingerprintRecord, Minutia};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use image::{GrayImage, Luma};
use std::hint::black_box;

/// Deterministic pseudo-random minutiae spread over the sensor area
fn minutiae(n: usize, seed: u32) -> Vec<Minutia> {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };

    (0..n)
        .map(|_| {
            let x = (next() % 256) as i32;
            let y = (next() % 288) as i32;
            let angle = f64::from(next() % 360);
            if next() % 3 == 0 {
                Minutia::bifurcation(x, y, angle).unwrap()
            } else {
                Minutia::termination(x, y, angle).unwrap()
            }
        })
        .collect()
}

/// Skeleton-like raster with a diagonal ridge off to one side
fn skeleton() -> GrayImage {
    let mut img = GrayImage::new(256, 288);
    for i in 0..200 {
        img.put_pixel(20 + i / 2, 10 + i, Luma([255]));
    }
    img
}

fn bench_match_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_count");
    let config = MatchConfig::strict();

    for size in [20usize, 40, 80] {
        let probe = minutiae(size, 1);
        let enrolled = minutiae(size, 2);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| match_count(black_box(&enrolled), black_box(&probe), &config));
        });
    }

    group.finish();
}

fn bench_identify(c: &mut Criterion) {
    let mut group = c.benchmark_group("identify");
    let config = MatchConfig::strict();
    let probe = minutiae(40, 7);
    let img = GrayImage::new(1, 1);

    for gallery_size in [16usize, 256] {
        let gallery: Vec<(String, FingerprintRecord)> = (0..gallery_size)
            .map(|i| {
                let record = FingerprintRecord::new(
                    img.clone(),
                    img.clone(),
                    img.clone(),
                    img.clone(),
                    minutiae(40, i as u32 + 100),
                );
                (format!("id{i}"), record)
            })
            .collect();

        group.throughput(Throughput::Elements(gallery_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(gallery_size),
            &gallery,
            |b, gallery| {
                b.iter(|| identify(black_box(&probe), black_box(gallery), &config));
            },
        );
    }

    group.finish();
}

fn bench_align(c: &mut Criterion) {
    let raster = skeleton();
    c.bench_function("align_256x288", |b| {
        b.iter(|| align(black_box(&raster)).unwrap());
    });
}

criterion_group!(benches, bench_match_count, bench_identify, bench_align);
criterion_main!(benches);
