use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{GrayImage, Luma};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};

use sketchfsm::{ExtractConfig, extract_gray, preprocess};

/// Synthetic two-state page: dark pen strokes on a bright background.
fn drawn_page(w: u32, h: u32) -> GrayImage {
    let mut page = GrayImage::from_pixel(w, h, Luma([235]));
    let ink = Luma([25]);
    let cy = (h / 2) as i32;
    for cx in [(w / 4) as i32, (3 * w / 4) as i32] {
        for r in 38..=42 {
            draw_hollow_circle_mut(&mut page, (cx, cy), r, ink);
        }
    }
    for dy in -2..=2i32 {
        let y = (cy + dy) as f32;
        draw_line_segment_mut(
            &mut page,
            (w as f32 / 4.0 + 45.0, y),
            (3.0 * w as f32 / 4.0 - 45.0, y),
            ink,
        );
    }
    page
}

fn bench_preprocess(c: &mut Criterion) {
    let page = drawn_page(640, 480);
    let config = ExtractConfig::default();
    c.bench_function("edge_map_640x480", |b| {
        b.iter(|| preprocess::edge_map(black_box(&page), &config.preprocess).unwrap())
    });
}

fn bench_full_extract(c: &mut Criterion) {
    let page = drawn_page(640, 480);
    let config = ExtractConfig::default();
    c.bench_function("extract_640x480", |b| {
        b.iter(|| extract_gray(black_box(&page), &config).unwrap())
    });
}

criterion_group!(benches, bench_preprocess, bench_full_extract);
criterion_main!(benches);
