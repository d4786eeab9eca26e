use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use dev_utils::{get_example_scenario, get_example_window};
use mc_transit_planner::run_range_mcraptor;

fn range_mcraptor_benchmark(c: &mut Criterion) {
    let (tt, origin, _start_time, _destination) = get_example_scenario();
    let window = get_example_window();
    c.bench_function("RangeMcRaptor", |b| b.iter(|| run_range_mcraptor(&tt, black_box(origin), black_box(window), 5)));
}

criterion_group!(benches, range_mcraptor_benchmark);
criterion_main!(benches);
