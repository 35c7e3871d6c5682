//! Latency benchmarks for risk calculation hot paths.
//!
//! Run with: `cargo bench --bench latency`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fair_engine::{calculate_risk, detect_parameter_change, susceptibility_envelope};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use register_core::numeric::parse_lenient;
use register_core::types::{
    Asset, Control, CostModule, CostModuleAssignment, FairFactors, ImplementationStatus,
    RiskCalculationInput, RiskRecord, Severity, TriangularValue,
};
use serde_json::json;

fn random_triangular(rng: &mut StdRng, scale: f64) -> TriangularValue {
    let min = rng.gen_range(0.0..scale * 0.5);
    let avg = min + rng.gen_range(0.0..scale * 0.25);
    let max = avg + rng.gen_range(0.0..scale * 0.25);
    TriangularValue::new(min, avg, max)
}

fn random_factors(rng: &mut StdRng) -> FairFactors {
    FairFactors {
        contact_frequency: random_triangular(rng, 20.0),
        probability_of_action: random_triangular(rng, 1.0),
        threat_capability: random_triangular(rng, 10.0),
        resistance_strength: random_triangular(rng, 10.0),
        primary_loss_magnitude: random_triangular(rng, 100_000.0),
        secondary_loss_event_frequency: Some(random_triangular(rng, 1.0)),
        secondary_loss_magnitude: random_triangular(rng, 250_000.0),
    }
}

/// Generate an input with the given number of assets, controls, and cost modules.
fn generate_input(rng: &mut StdRng, width: usize) -> RiskCalculationInput {
    let assets = (0..width)
        .map(|i| Asset::new(format!("AST-{}", i), rng.gen_range(1_000.0..1_000_000.0)))
        .collect();
    let controls = (0..width)
        .map(|_| Control::new(rng.gen_range(0.0..10.0), ImplementationStatus::FullyImplemented))
        .collect();
    let modules = (0..width)
        .map(|i| {
            let module = match i % 4 {
                0 => CostModule::fixed(rng.gen_range(0.0..50_000.0)),
                1 => CostModule::per_event(rng.gen_range(0.0..5_000.0)),
                2 => CostModule::per_hour(rng.gen_range(0.0..500.0)),
                _ => CostModule::percent(rng.gen_range(0.0..0.3)),
            };
            CostModuleAssignment::weighted(module, rng.gen_range(0.1..1.0))
        })
        .collect();

    RiskCalculationInput::new(random_factors(rng))
        .with_severity(Severity::High)
        .with_assets(assets)
        .with_controls(controls)
        .with_cost_modules(modules)
}

/// Benchmark the full risk calculation.
fn bench_calculate_risk(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_risk");
    let mut rng = StdRng::seed_from_u64(42);

    for width in [0, 1, 10, 100].iter() {
        let input = generate_input(&mut rng, *width);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("full", width), &input, |b, input| {
            b.iter(|| black_box(calculate_risk(black_box(input))))
        });
    }

    group.finish();
}

/// Benchmark the susceptibility envelope.
fn bench_susceptibility(c: &mut Criterion) {
    let tc = TriangularValue::new(2.0, 5.0, 8.0);
    let rs = TriangularValue::new(3.0, 4.0, 9.0);

    c.bench_function("susceptibility_envelope", |b| {
        b.iter(|| black_box(susceptibility_envelope(black_box(&tc), black_box(&rs))))
    });
}

/// Benchmark change detection over persisted record snapshots.
fn bench_change_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("change_detection");
    let mut rng = StdRng::seed_from_u64(7);

    let mut record = RiskRecord {
        associated_assets: (0..20).map(|i| format!("AST-{}", i)).collect(),
        ..Default::default()
    };
    record.set_factors(&random_factors(&mut rng));
    let original = record.snapshot();

    let unchanged = original.clone();
    let mut late_change = original.clone();
    late_change["associatedAssets"][19] = json!("AST-99");

    group.bench_function("unchanged", |b| {
        b.iter(|| black_box(detect_parameter_change(black_box(&original), black_box(&unchanged))))
    });

    group.bench_function("asset_changed", |b| {
        b.iter(|| {
            black_box(detect_parameter_change(black_box(&original), black_box(&late_change)))
        })
    });

    group.finish();
}

/// Benchmark lenient numeric parsing of stored columns.
fn bench_numeric_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("numeric_parsing");

    let number = json!(12345.678);
    let decimal_string = json!("12345.678");
    let scientific = json!("1.2345678e4");

    group.bench_function("number", |b| b.iter(|| black_box(parse_lenient(black_box(&number)))));
    group.bench_function("decimal_string", |b| {
        b.iter(|| black_box(parse_lenient(black_box(&decimal_string))))
    });
    group.bench_function("scientific_string", |b| {
        b.iter(|| black_box(parse_lenient(black_box(&scientific))))
    });

    group.finish();
}

/// Benchmark record deserialization and snapshotting.
fn bench_record_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_serialization");
    let mut rng = StdRng::seed_from_u64(3);

    let mut record = RiskRecord {
        title: "Credential stuffing".to_string(),
        associated_assets: vec!["AST-1".to_string(), "AST-2".to_string()],
        ..Default::default()
    };
    record.set_factors(&random_factors(&mut rng));
    let json = record.snapshot();

    group.bench_function("snapshot", |b| b.iter(|| black_box(record.snapshot())));
    group.bench_function("from_json", |b| {
        b.iter(|| black_box(RiskRecord::from_json(black_box(json.clone()))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_calculate_risk,
    bench_susceptibility,
    bench_change_detection,
    bench_numeric_parsing,
    bench_record_serialization,
);

criterion_main!(benches);
