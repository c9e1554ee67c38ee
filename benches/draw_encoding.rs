//! Benchmarks for visualizer command encoding.
//!
//! Drawing runs inside debug overlays on the agent loop; what matters is
//! the cost of accumulating commands, not the UDP send.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use touchline::DrawTransport;

fn bench_line_accumulation(c: &mut Criterion) {
    let draw = DrawTransport::new("127.0.0.1:32769");

    c.bench_function("draw/line", |b| {
        b.iter(|| {
            draw.draw_line(
                black_box(1.5),
                black_box(-2.5),
                black_box(0.0),
                black_box(3.0),
                black_box(4.0),
                black_box(0.5),
                black_box(2.0),
                black_box(1.0),
                black_box(0.5),
                black_box(0.0),
                "bench",
            );
            draw.clear();
        })
    });
}

fn bench_field_overlay(c: &mut Criterion) {
    let draw = DrawTransport::new("127.0.0.1:32769");

    c.bench_function("draw/overlay_22_players", |b| {
        b.iter(|| {
            for unum in 0..22 {
                let x = unum as f32 - 11.0;
                draw.draw_sphere(x, 0.0, 0.2, 0.1, 1.0, 1.0, 0.0, "overlay");
                draw.draw_annotation("p", x, 0.0, 0.6, 1.0, 1.0, 1.0, "overlay");
            }
            draw.swap_buffers("overlay");
            draw.clear();
        })
    });
}

criterion_group!(benches, bench_line_accumulation, bench_field_overlay);
criterion_main!(benches);
