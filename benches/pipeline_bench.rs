//! Recompute and CSV export timings for fleets of growing size.
//!
//! Run with: `cargo bench --bench pipeline_bench`

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use oekorps::catalog::VEHICLE_TYPES;
use oekorps::emission_factors::EmissionFactorSelection;
use oekorps::export::{export_csv, import_csv};
use oekorps::performance::ServiceVolume;
use oekorps::reference_mobility::Methodology;
use oekorps::ridepooling_emissions::ElectricityBlendPolicy;
use oekorps::session::SessionState;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn build_session(fleet_size: usize, methodology: Methodology, preset: &str) -> SessionState {
    let mut state = SessionState::new();
    state.set_service_volume(ServiceVolume { completed_bookings: 151415, passengers_transported: 187309 });
    for i in 0..fleet_size {
        let entry = VEHICLE_TYPES[i % (VEHICLE_TYPES.len() - 1)]
            .to_entry().with_distances(1000.0 + i as f64, 4000.0 + 2.0 * i as f64);
        state.add_vehicle(entry).unwrap();
    }
    state.set_emission_factors(EmissionFactorSelection::default()).unwrap();
    state.select_methodology(methodology).unwrap();
    state.apply_share_preset(preset).unwrap();
    state
}

fn bench_recompute(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute");
    for &fleet_size in &[1usize, 10, 100, 1000] {
        let state = build_session(fleet_size, Methodology::ModalSplitTrips, "Modal Split (Wege) MiD 2017");
        group.bench_with_input(BenchmarkId::from_parameter(fleet_size), &state, |b, state| {
            b.iter(|| state.recompute(black_box(ElectricityBlendPolicy::LegacyDoubleScaling), today()));
        });
    }
    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let state = build_session(10, Methodology::ModalSplitPkm, "Modal Split (Personenkilometer) MiD 2017");
    let report = state.recompute(ElectricityBlendPolicy::LegacyDoubleScaling, today());
    c.bench_function("export_csv", |b| {
        b.iter(|| export_csv(black_box(&state), black_box(&report)).unwrap());
    });
    let table = export_csv(&state, &report).unwrap();
    c.bench_function("import_csv", |b| {
        b.iter(|| import_csv(black_box(&table), today()).unwrap());
    });
}

criterion_group!(benches, bench_recompute, bench_export);
criterion_main!(benches);
