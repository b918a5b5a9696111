//! Criterion benchmarks for instruction lowering and basic visualization.

use camoverlay_visualizer::{basic_vis, lower_ebb, lower_gcode, lower_sbp, slice};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn gcode_program(passes: usize) -> Vec<String> {
    let mut lines = vec!["G21".to_string(), "G0 X0 Y0 Z5".to_string()];
    for pass in 1..=passes {
        lines.push(format!("G1 Z-{}.0 F300", pass));
        for i in 0..100 {
            let t = i as f64 / 100.0 * std::f64::consts::TAU;
            lines.push(format!("G1 X{:.3} Y{:.3}", 50.0 * t.cos(), 50.0 * t.sin()));
        }
    }
    lines
}

fn lowering_bench(c: &mut Criterion) {
    let gcode = gcode_program(20);
    let sbp: Vec<String> = (0..2000)
        .map(|i| format!("M3,{:.2},{:.2},-{:.2}", i as f64 * 0.1, (i % 50) as f64, (i % 7) as f64))
        .collect();
    let ebb: Vec<String> = (0..2000)
        .map(|i| if i % 10 == 0 { format!("SP,{}", i % 20 / 10) } else { "SM,10,40,-8".to_string() })
        .collect();

    let mut group = c.benchmark_group("lowering");
    group.bench_function("gcode", |b| b.iter(|| black_box(lower_gcode(black_box(&gcode)))));
    group.bench_function("sbp", |b| b.iter(|| black_box(lower_sbp(black_box(&sbp)))));
    group.bench_function("ebb", |b| b.iter(|| black_box(lower_ebb(black_box(&ebb)))));
    group.finish();

    let irs = lower_gcode(&gcode);
    let mut group = c.benchmark_group("visualize");
    group.bench_function("basic_vis", |b| b.iter(|| black_box(basic_vis(black_box(&irs)))));
    group.sample_size(10);
    group.bench_function("slice", |b| b.iter(|| black_box(slice(black_box(&irs)))));
    group.finish();
}

criterion_group!(benches, lowering_bench);
criterion_main!(benches);
