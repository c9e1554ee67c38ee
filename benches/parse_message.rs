//! Benchmarks for sensor-frame decoding.
//!
//! The parser sits on the 50 Hz hot path: every agent decodes one frame per
//! cycle, and vision frames are the largest the server sends. Decoding must
//! stay far below the ~20 ms cycle budget.

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;
use touchline::{parse_frame, AsyncLogger, WorldState};

/// A realistic full sensor frame: clock, game state, IMU, joints, feet, and
/// a busy vision block.
fn full_frame() -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(b"(time (now 47.82))");
    frame.extend_from_slice(b"(GS (sl 2) (sr 1) (t 12.46) (team left) (unum 5) (pm PlayOn))");
    frame.extend_from_slice(b"(GYR (n torso) (rt 0.01 0.07 0.46))");
    frame.extend_from_slice(b"(ACC (n torso) (a 0.00 -0.05 8.83))");
    for joint in ["hj1", "hj2", "laj1", "raj1", "llj1", "rlj1"] {
        frame.extend_from_slice(format!("(HJ (n {joint}) (ax -1.02))").as_bytes());
    }
    frame.extend_from_slice(b"(FRP (n lf) (c -0.01 -0.01 -0.02) (f 0.00 0.00 22.67))");
    frame.extend_from_slice(b"(FRP (n rf) (c 0.02 0.00 -0.01) (f 0.10 0.00 21.90))");

    frame.extend_from_slice(b"(See");
    for landmark in ["F1L", "F2L", "F1R", "F2R", "G1L", "G2L", "G1R", "G2R"] {
        frame.extend_from_slice(format!(" ({landmark} (pol 17.55 -3.33 4.31))").as_bytes());
    }
    frame.extend_from_slice(b" (B (pol 8.51 -0.21 -0.17))");
    for unum in 1..=5 {
        frame.extend_from_slice(
            format!(
                " (P (team RoboIME) (id {unum}) (head (pol 4.01 0.00 0.50)) \
                 (rlowerarm (pol 4.00 -0.10 0.30)) (llowerarm (pol 3.95 0.12 0.31)) \
                 (rfoot (pol 4.05 -0.08 -0.50)) (lfoot (pol 4.10 0.20 -0.51)))"
            )
            .as_bytes(),
        );
    }
    for _ in 0..6 {
        frame.extend_from_slice(b" (L (pol 10.0 -20.0 0.0) (pol 10.0 20.0 0.0))");
    }
    frame.extend_from_slice(b")");
    frame
}

fn bench_full_frame(c: &mut Criterion) {
    let frame = full_frame();
    let logger = AsyncLogger::new(std::env::temp_dir().join("touchline-bench-logs"));
    let mut world = WorldState::new(5, "RoboIME");

    let mut group = c.benchmark_group("parse_frame");
    group.throughput(Throughput::Bytes(frame.len() as u64));
    group.bench_function("full_sensor_frame", |b| {
        b.iter(|| {
            parse_frame(black_box(&frame), black_box(&mut world), &logger);
        })
    });
    group.finish();
}

fn bench_gamestate_only(c: &mut Criterion) {
    let frame = b"(GS (sl 2) (sr 1) (t 12.46) (team left) (pm KickOff_Left))";
    let logger = AsyncLogger::new(std::env::temp_dir().join("touchline-bench-logs"));
    let mut world = WorldState::new(5, "RoboIME");

    c.bench_function("parse_frame/gamestate_only", |b| {
        b.iter(|| {
            parse_frame(black_box(frame), black_box(&mut world), &logger);
        })
    });
}

criterion_group!(benches, bench_full_frame, bench_gamestate_only);
criterion_main!(benches);
