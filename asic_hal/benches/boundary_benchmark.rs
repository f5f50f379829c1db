//! Boundary computation micro-benchmark.
//!
//! Measures the pure window computation and one full monitor cycle against
//! the simulated ASIC (gate acquire, 4 reads, 8 writes, release).

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

use asic_common::device::consts::ENV_CONFIG_INIT_VALUE;
use asic_hal::boundary::compute_windows;
use asic_hal::gate::DeviceGate;
use asic_hal::monitor::BoundaryMonitor;
use asic_hal::transports::simulation::SimulatedAsic;

fn bench_compute_windows(c: &mut Criterion) {
    let mut positions = [0, 100, 300, 350];

    c.bench_function("compute_windows", |b| {
        b.iter(|| {
            positions[1] = positions[1].wrapping_add(1) % 200;
            black_box(compute_windows(black_box(positions)))
        })
    });
}

fn bench_compute_windows_extremes(c: &mut Criterion) {
    let positions = [i32::MIN, -1, 1, i32::MAX];

    c.bench_function("compute_windows_extremes", |b| {
        b.iter(|| black_box(compute_windows(black_box(positions))))
    });
}

fn bench_monitor_cycle(c: &mut Criterion) {
    let gate = DeviceGate::new(SimulatedAsic::new([0, 100, 300, 350]));
    let mut monitor = BoundaryMonitor::new(gate, Duration::from_millis(10), ENV_CONFIG_INIT_VALUE);

    c.bench_function("monitor_cycle_simulated", |b| {
        b.iter(|| black_box(monitor.run_cycle()))
    });
}

criterion_group!(
    benches,
    bench_compute_windows,
    bench_compute_windows_extremes,
    bench_monitor_cycle
);
criterion_main!(benches);
