//! Criterion benchmarks for ppmview critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Parser: P3 header and pixel row parsing
//! - Renderer: channel normalization into RGBA
//! - Resize: display scaling with each filter
//! - Output: PNG encoding

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ppmview::output::encode_png;
use ppmview::parser::parse_ppm;
use ppmview::renderer::{decode, rasterize};
use ppmview::resize::{scale_raster, CanvasSize, ScaleFilter};

// =============================================================================
// Test Data Generators
// =============================================================================

/// Generate a P3 document with a deterministic gradient
fn make_document(width: u32, height: u32, max: u32) -> String {
    let mut text = format!("P3\n{} {}\n{}\n", width, height, max);
    for y in 0..height {
        for x in 0..width {
            let r = x * max / width.max(1);
            let g = y * max / height.max(1);
            let b = (x + y) % (max + 1);
            text.push_str(&format!("{} {} {}\n", r, g, b));
        }
    }
    text
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for size in [16u32, 64, 256] {
        let text = make_document(size, size, 255);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| parse_ppm(black_box(text)))
        });
    }
    group.finish();
}

fn bench_rasterize(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterize");
    for (size, max) in [(64u32, 255u32), (256, 255), (256, 65535)] {
        let parsed = parse_ppm(&make_document(size, size, max)).expect("benchmark document should parse");
        group.throughput(Throughput::Elements(u64::from(size * size)));
        group.bench_with_input(BenchmarkId::new(format!("max_{}", max), size), &parsed, |b, parsed| {
            b.iter(|| rasterize(black_box(parsed)))
        });
    }
    group.finish();
}

fn bench_scale(c: &mut Criterion) {
    let raster = decode(&make_document(64, 64, 255)).expect("benchmark document should decode");
    let canvas = CanvasSize::new(512, 512);

    let mut group = c.benchmark_group("scale_64_to_512");
    for filter in [ScaleFilter::Nearest, ScaleFilter::Triangle, ScaleFilter::Lanczos3] {
        group.bench_with_input(BenchmarkId::from_parameter(format!("{:?}", filter)), &filter, |b, &filter| {
            b.iter(|| scale_raster(black_box(&raster), canvas, filter))
        });
    }
    group.finish();
}

fn bench_encode_png(c: &mut Criterion) {
    let raster = decode(&make_document(256, 256, 255)).expect("benchmark document should decode");
    c.bench_function("encode_png_256", |b| b.iter(|| encode_png(black_box(raster.as_image()))));
}

criterion_group!(benches, bench_parse, bench_rasterize, bench_scale, bench_encode_png);
criterion_main!(benches);
