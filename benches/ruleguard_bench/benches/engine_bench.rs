//! Validation engine benchmarks
//!
//! Measures a full field pass over a derived subject, with and without the
//! validator cache, and in strict mode.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ruleguard::prelude::*;

#[derive(Inspect)]
struct SignupForm {
    #[rule(not_null, email)]
    email: Option<String>,

    #[rule(length(min = 3, max = 32))]
    username: String,

    #[rule(min_length(value = 8))]
    password: String,

    #[rule(match_field(value = "password"))]
    confirm: String,

    #[rule(greater_than(value = 17))]
    age: u32,

    #[rule(zip_code)]
    zip: String,

    #[rule(exempt)]
    referrer: Option<String>,
}

fn valid_form() -> SignupForm {
    SignupForm {
        email: Some("ada@example.com".into()),
        username: "ada".into(),
        password: "correct horse".into(),
        confirm: "correct horse".into(),
        age: 36,
        zip: "12345-6789".into(),
        referrer: None,
    }
}

fn invalid_form() -> SignupForm {
    SignupForm {
        email: Some("not-an-email".into()),
        username: "a".into(),
        password: "short".into(),
        confirm: "other".into(),
        age: 12,
        zip: "1234".into(),
        referrer: None,
    }
}

/// Benchmark field validation
fn bench_validate_fields(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_fields");

    let cached = ValidationEngine::standard();
    let uncached = ValidationEngine::builder()
        .standard_rules()
        .cache_validators(false)
        .build();
    let valid = valid_form();
    let invalid = invalid_form();

    group.bench_function("valid_cached", |b| {
        b.iter(|| cached.validate_fields(black_box(&valid)).map(|r| r.len()))
    });

    group.bench_function("valid_uncached", |b| {
        b.iter(|| uncached.validate_fields(black_box(&valid)).map(|r| r.len()))
    });

    group.bench_function("invalid_cached", |b| {
        b.iter(|| cached.validate_fields(black_box(&invalid)).map(|r| r.len()))
    });

    group.bench_function("valid_strict", |b| {
        b.iter(|| {
            cached
                .validate_fields_strict(black_box(&valid))
                .map(|r| r.len())
        })
    });

    group.finish();
}

/// Benchmark building engines
fn bench_engine_setup(c: &mut Criterion) {
    c.bench_function("engine_standard", |b| b.iter(ValidationEngine::standard));
}

criterion_group!(benches, bench_validate_fields, bench_engine_setup);
criterion_main!(benches);
