//! Benchmarks for the row combiners and image composites.
//! Run with: cargo bench -p mixtura --features bench --bench combine -- "<pattern>"
//!
//! Examples:
//!   cargo bench -p mixtura --features bench --bench combine -- "over"
//!   cargo bench -p mixtura --features bench --bench combine -- "avx2"
//!   cargo bench -p mixtura --features bench --bench combine -- "composite"

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput};
use strum::IntoEnumIterator;

use crate::combine::{kernels, Capability, Operator};
use crate::composite::Source;
use crate::config::Config;
use crate::format::PixelFormat;
use crate::image::{ImageDesc, ImageView, ImageViewMut};
use crate::pixel::{pack, AlphaPosition, Pixel};
use crate::registry::Registry;

const ROW_WIDTH: usize = 1920;
const IMAGE_SIZE: usize = 2048;

/// Deterministic premultiplied pixels mixing transparent, opaque and
/// translucent runs, so shortcuts fire some of the time.
fn pattern_row(width: usize, seed: usize) -> Vec<Pixel> {
    (0..width)
        .map(|i| {
            let n = i + seed;
            let a = match (n / 16) % 4 {
                0 => 0,
                1 => 255,
                _ => (n * 37 % 256) as u8,
            };
            let c = |k: usize| ((n * k) % (a as usize + 1)) as u8;
            pack([c(3), c(5), c(7), a])
        })
        .collect()
}

pub fn benchmarks(c: &mut Criterion) {
    benchmark_rows(c);
    benchmark_composite(c);
}

fn benchmark_rows(c: &mut Criterion) {
    let src = pattern_row(ROW_WIDTH, 0);
    let dst = pattern_row(ROW_WIDTH, 7);
    let mask: Vec<Pixel> = pattern_row(ROW_WIDTH, 3);

    let mut group = c.benchmark_group("combine_row");
    group.throughput(Throughput::Elements(ROW_WIDTH as u64));

    for capability in Capability::available() {
        let Some(kernels) = kernels(capability, AlphaPosition::High) else {
            continue;
        };
        for op in Operator::iter() {
            let f = kernels.combiner(op);
            let mut out = dst.clone();

            group.bench_function(BenchmarkId::new(format!("{}", op), capability), |b| {
                b.iter(|| {
                    out.copy_from_slice(&dst);
                    f(black_box(&mut out), black_box(&src), None)
                })
            });
            group.bench_function(
                BenchmarkId::new(format!("{}_masked", op), capability),
                |b| {
                    b.iter(|| {
                        out.copy_from_slice(&dst);
                        f(black_box(&mut out), black_box(&src), Some(black_box(&mask[..])))
                    })
                },
            );
        }
    }
    group.finish();
}

fn benchmark_composite(c: &mut Criterion) {
    let desc = ImageDesc::new(IMAGE_SIZE, IMAGE_SIZE, PixelFormat::A8R8G8B8);
    let src_pixels: Vec<Pixel> = (0..IMAGE_SIZE)
        .flat_map(|y| pattern_row(IMAGE_SIZE, y))
        .collect();
    let dst_pixels: Vec<Pixel> = (0..IMAGE_SIZE)
        .flat_map(|y| pattern_row(IMAGE_SIZE, y + 11))
        .collect();
    let src = ImageView::new(desc, &src_pixels).unwrap();

    let mut group = c.benchmark_group("composite");
    group.throughput(Throughput::Elements((IMAGE_SIZE * IMAGE_SIZE) as u64));

    for (name, config) in [
        ("parallel", Config::default()),
        ("single_threaded", Config::single_threaded()),
        ("scalar", Config::scalar_only()),
    ] {
        let registry = Registry::new(config);
        let mut out = dst_pixels.clone();
        group.bench_function(BenchmarkId::new("over_8888_8888", name), |b| {
            b.iter(|| {
                let mut dst = ImageViewMut::new(desc, &mut out).unwrap();
                registry
                    .composite(Operator::Over, Source::Image(src), None, &mut dst)
                    .unwrap();
            })
        });
    }
    group.finish();
}
