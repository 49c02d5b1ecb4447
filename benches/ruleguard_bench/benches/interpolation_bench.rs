//! Message interpolation benchmarks
//!
//! Compares the accessor chain evaluator against the Tera-backed one.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ruleguard::prelude::*;

#[derive(Inspect)]
struct Profile {
    #[rule(max_length(value = 8))]
    handle: String,
}

/// Benchmark rendering a catalog message
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let engine = ValidationEngine::standard();
    let profile = Profile {
        handle: "much-too-long-handle".into(),
    };
    let results = engine
        .validate_fields(&profile)
        .expect("profile validates");
    let violation = &results.violations()[0];
    let template = "${problem.value} exceeds ${problem.rule.value} characters on ${problem.target.name}";

    let accessors = Interpolator::accessors();
    let templated = Interpolator::templated();

    group.bench_function("accessor_chain", |b| {
        b.iter(|| accessors.render(black_box(template), violation))
    });

    group.bench_function("templated_chain", |b| {
        b.iter(|| templated.render(black_box(template), violation))
    });

    group.bench_function("templated_filter", |b| {
        b.iter(|| templated.render(black_box("${problem.value | upper}"), violation))
    });

    let messages = ruleguard::rules::default_messages();
    group.bench_function("localized_message", |b| {
        b.iter(|| violation.localized_message(&messages, black_box("en-US")))
    });

    group.finish();
}

criterion_group!(benches, bench_render);
criterion_main!(benches);
