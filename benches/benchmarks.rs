//! Performance benchmarks for Autodoc.
//!
//! This module contains benchmarks for:
//! - Flow module counting over nested router trees
//! - Table reference detection against large schemas
//! - Scheduling over large manifests
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};

use autodoc::flow::{count_modules, detect_subscenario_references, Blueprint};
use autodoc::{detect_referenced_tables, Manifest, ProgressLedger, ScenarioManifestEntry, SchemaIndex, TableDescriptor};

// ============================================================================
// Mock Data Fixtures
// ============================================================================

mod fixtures {
    use super::*;

    /// A flow of `width` modules per level, with a router every fifth module.
    pub fn generate_flow(width: usize, depth: usize) -> Value {
        let flow: Vec<Value> = (0..width)
            .map(|i| {
                if depth > 0 && i % 5 == 4 {
                    json!({
                        "id": i,
                        "module": "builtin:BasicRouter",
                        "routes": [{"flow": generate_flow(width, depth - 1)}]
                    })
                } else {
                    json!({
                        "id": i,
                        "module": "supabase:SearchRows",
                        "mapper": {"table": format!("table_{}", i % 50), "scenario": i}
                    })
                }
            })
            .collect();
        Value::Array(flow)
    }

    pub fn generate_blueprint(width: usize, depth: usize) -> Value {
        json!({"name": "Bench", "flow": generate_flow(width, depth)})
    }

    pub fn generate_schema(num_tables: usize) -> SchemaIndex {
        SchemaIndex {
            tables: (0..num_tables)
                .map(|i| TableDescriptor::new("public", format!("table_{i}")))
                .collect(),
            ..SchemaIndex::default()
        }
    }

    pub fn generate_manifest(num_scenarios: u64) -> Manifest {
        Manifest::new(
            (0..num_scenarios)
                .map(|id| ScenarioManifestEntry {
                    id,
                    name: format!("Scenario {id}"),
                    category: format!("Category {}", id % 12),
                    is_active: id % 3 == 0,
                    kind: "scenario".to_string(),
                    filename: format!("blueprints/{id}.json"),
                })
                .collect(),
        )
    }
}

// ============================================================================
// Flow Analysis Benchmarks
// ============================================================================

fn bench_count_modules(c: &mut Criterion) {
    let mut group = c.benchmark_group("count_modules");

    for depth in [1, 3, 5] {
        let blueprint = Blueprint::from_value(fixtures::generate_blueprint(10, depth)).unwrap();
        let modules = count_modules(blueprint.flow());

        group.throughput(Throughput::Elements(modules as u64));
        group.bench_with_input(BenchmarkId::new("depth", depth), &blueprint, |b, blueprint| {
            b.iter(|| count_modules(black_box(blueprint.flow())))
        });
    }

    group.finish();
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detection");
    let blueprint = fixtures::generate_blueprint(20, 3);

    for tables in [50, 500, 2000] {
        let schema = fixtures::generate_schema(tables);
        group.bench_with_input(BenchmarkId::new("tables", tables), &schema, |b, schema| {
            b.iter(|| detect_referenced_tables(black_box(&blueprint), Some(schema)))
        });
    }

    group.bench_function("subscenarios", |b| {
        b.iter(|| detect_subscenario_references(black_box(&blueprint)))
    });

    group.finish();
}

// ============================================================================
// Scheduling Benchmarks
// ============================================================================

fn bench_next(c: &mut Criterion) {
    let mut group = c.benchmark_group("schedule");
    let ledger = ProgressLedger::default();

    for size in [100_u64, 1000, 5000] {
        let manifest = fixtures::generate_manifest(size);
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("next", size), &manifest, |b, manifest| {
            b.iter(|| autodoc::report::next(black_box(&ledger), manifest, 10).len())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_count_modules, bench_detection, bench_next);
criterion_main!(benches);
