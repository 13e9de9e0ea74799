//! # Resolver Benchmarks
//!
//! Performance benchmarks for classification and resolution.
//!
//! Run with: `cargo bench -p cxxcaps-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use cxxcaps_core::{
    Environment, LanguageStandard, ResolutionCache, classify, detect, render_header,
};
use std::hint::black_box;

/// A GCC dump padded with `extra` unrelated definitions.
fn gcc_environment(extra: usize) -> Environment {
    let base = Environment::new()
        .define("__GNUC__", 11)
        .define("__GNUC_MINOR__", 2)
        .define("__GNUC_PATCHLEVEL__", 0)
        .with_standard(LanguageStandard::Cxx17);

    (0..extra).fold(base, |env, i| env.define(format!("__PAD_{}__", i), i))
}

/// A dump in `-dM -E` form with `lines` definitions.
fn gcc_dump(lines: usize) -> String {
    let mut dump = String::from("#define __GNUC__ 11\n#define __GNUC_MINOR__ 2\n");
    for i in 0..lines {
        dump.push_str(&format!("#define __PAD_{}__ {}\n", i, i));
    }
    dump
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    // MSVC and the unmatched case walk the whole table.
    let cases = [
        ("comeau", Environment::new().define_flag("__COMO__")),
        ("gnu", gcc_environment(0)),
        ("msvc", Environment::new().define("_MSC_VER", 1929)),
        ("none", Environment::new()),
    ];

    for (name, env) in cases.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(name), env, |b, env| {
            b.iter(|| black_box(classify(env)));
        });
    }

    group.finish();
}

fn bench_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");

    for size in [0, 300, 3000].iter() {
        let env = gcc_environment(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &env, |b, env| {
            b.iter(|| black_box(detect(env)));
        });
    }

    group.finish();
}

fn bench_cached_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_detect");

    for size in [0, 300, 3000].iter() {
        let env = gcc_environment(*size);
        let mut cache = ResolutionCache::new();
        let _ = cache.detect(&env);

        group.bench_with_input(BenchmarkId::from_parameter(size), &env, |b, env| {
            b.iter(|| black_box(cache.detect(env)));
        });
    }

    group.finish();
}

fn bench_parse_dump(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_dump");

    for size in [300, 3000].iter() {
        let dump = gcc_dump(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &dump, |b, dump| {
            b.iter(|| black_box(Environment::from_predefined_macros(dump)));
        });
    }

    group.finish();
}

fn bench_render_header(c: &mut Criterion) {
    let resolution = detect(&gcc_environment(0)).expect("resolve");
    c.bench_function("render_header", |b| {
        b.iter(|| black_box(render_header(&resolution, "BENCH")));
    });
}

criterion_group!(
    benches,
    bench_classify,
    bench_detect,
    bench_cached_detect,
    bench_parse_dump,
    bench_render_header
);
criterion_main!(benches);
