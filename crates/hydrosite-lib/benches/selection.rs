use criterion::{criterion_group, criterion_main, Criterion};
use hydrosite_lib::{
    find_plants, Config, Grid, PlantParameters, PlantSelector, Point, RiverLine, SegmentEvaluator,
};
use once_cell::sync::Lazy;
use std::hint::black_box;

const COLS: usize = 5_010;

static DEM: Lazy<Grid> = Lazy::new(|| {
    // Gentle slope with a ripple so candidates differ in head.
    Grid::from_fn(COLS, 1, 0.0, 0.0, 1.0, |col, _| {
        let x = col as f64;
        Some(5_000.0 - x + 3.0 * (x / 40.0).sin())
    })
});
static FLOW: Lazy<Grid> = Lazy::new(|| {
    Grid::from_fn(COLS, 1, 0.0, 0.0, 1.0, |col, _| Some(1.0 + col as f64 / 1_000.0))
});
static RIVER: Lazy<RiverLine> =
    Lazy::new(|| RiverLine::new(1, vec![Point::new(0.0, 0.5), Point::new(5_000.0, 0.5)]));
static CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::new(PlantParameters {
        len_plant: 300.0,
        len_min: 50.0,
        distance: 20.0,
        ..PlantParameters::default()
    })
    .expect("valid parameters")
});

fn benchmark_selection(c: &mut Criterion) {
    let config = &*CONFIG;
    let report = find_plants(std::slice::from_ref(&*RIVER), &*DEM, &*FLOW, config)
        .expect("run succeeds");
    let profile = &report.lines[0].profile;
    let candidates = SegmentEvaluator::new(config).evaluate(profile);

    c.bench_function("evaluate_5000_stations", |b| {
        b.iter(|| black_box(SegmentEvaluator::new(config).evaluate(profile).len()));
    });

    c.bench_function("select_5000_stations", |b| {
        let selector = PlantSelector::for_profile(config, profile);
        b.iter(|| black_box(selector.select(1, &candidates).total_power()));
    });

    c.bench_function("find_plants_single_line", |b| {
        b.iter(|| {
            let report = find_plants(std::slice::from_ref(&*RIVER), &*DEM, &*FLOW, config)
                .expect("run succeeds");
            black_box(report.plant_count())
        });
    });
}

criterion_group!(benches, benchmark_selection);
criterion_main!(benches);
