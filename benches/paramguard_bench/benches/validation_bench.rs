//! Validation throughput benchmarks
//!
//! Measures schema compilation and per-request validation cost.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use paramguard::Session;
use serde_json::{json, Value};

fn signup_schema() -> Value {
    json!({
        "username": {"type": "String", "required": true, "length": {"min": 3, "max": 16}, "test": "^[a-z0-9_]+$"},
        "email": {"type": "String", "required": true, "test": ["@", "\\.[a-z]{2,}$"]},
        "age": {"type": "Number", "length": {"min": 13, "max": 120}},
        "profile": {
            "bio": {"type": "String", "length": {"max": 140}},
            "locale": {"type": "String", "default": "en-US"},
            "links": {
                "site": {"type": "String", "test": "^https?://"}
            }
        }
    })
}

/// Benchmark schema compilation
fn bench_compile(c: &mut Criterion) {
    let schema = signup_schema();
    c.bench_function("compile_schema", |b| {
        b.iter(|| Session::new(black_box(schema.clone())).unwrap())
    });
}

/// Benchmark validation of valid and invalid inputs
fn bench_check(c: &mut Criterion) {
    let session = Session::new(signup_schema()).unwrap();
    let mut group = c.benchmark_group("check");

    let valid = json!({
        "username": "al_99",
        "email": "al@example.org",
        "age": 30,
        "profile": {"bio": "hello", "links": {"site": "https://example.org"}}
    });
    group.bench_function("valid_nested", |b| {
        b.iter(|| session.check(black_box(&valid)).unwrap())
    });

    // Fails on the first field, so this measures the fail-fast path
    let invalid = json!({"username": "A"});
    group.bench_function("invalid_first_field", |b| {
        b.iter(|| session.check(black_box(&invalid)).unwrap_err())
    });

    let sparse = json!({"username": "al_99", "email": "al@example.org"});
    group.bench_function("defaults_only", |b| {
        b.iter(|| session.check(black_box(&sparse)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_check);
criterion_main!(benches);
