//! Criterion benchmarks for the mapping codec and table lookup.
//!
//! Parsing runs once at startup, but table lookup sits on the dispatch hot
//! path for every remote key press, so both are measured.
//!
//! Run with:
//! ```bash
//! cargo bench --package cec-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cec_core::{parse_entry, parse_mappings, MappingTable};

// ── Grammar fixtures ──────────────────────────────────────────────────────────

const ENTRIES: &[(&str, &str)] = &[
    ("single_press", "0=p:28"),
    ("press_and_hold", "5=p:30,h:31"),
    ("modifier_chord", "113=h:29,h:42,h:56,p:20"),
    ("explicit_phases", "2=d:56,p:15,u:56"),
];

/// A realistic remote: arrows, select, back, colour keys and digits.
fn remote_mappings() -> Vec<String> {
    let mut mappings = vec![
        "0=p:28".to_string(),
        "1=p:103".to_string(),
        "2=p:108".to_string(),
        "3=p:105".to_string(),
        "4=p:106".to_string(),
        "13=p:1".to_string(),
        "113=h:29,p:46".to_string(),
        "114=h:29,p:47".to_string(),
        "115=h:56,p:15".to_string(),
        "116=p:125".to_string(),
    ];
    // Digit keys 0x20..=0x29 map to KEY_1..KEY_0.
    for (offset, key) in (2u16..=11).enumerate() {
        mappings.push(format!("{}=p:{key}", 0x20 + offset));
    }
    mappings
}

// ── Benchmark groups ──────────────────────────────────────────────────────────

/// Benchmarks `parse_entry` for each representative entry shape.
fn bench_parse_entry(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_entry");
    for (name, input) in ENTRIES {
        group.bench_with_input(BenchmarkId::new("entry", name), input, |b, input| {
            b.iter(|| parse_entry(black_box(input)).expect("parse must succeed"))
        });
    }
    group.finish();
}

/// Benchmarks building a complete table from a remote-sized mapping list.
fn bench_parse_mappings(c: &mut Criterion) {
    let mappings = remote_mappings();
    c.bench_function("parse_mappings/remote", |b| {
        b.iter(|| parse_mappings(black_box(&mappings)).expect("build must succeed"))
    });
}

/// Benchmarks the per-event lookup, hit and miss.
fn bench_lookup(c: &mut Criterion) {
    let table: MappingTable =
        parse_mappings(remote_mappings()).expect("build must succeed for benchmark setup");

    let mut group = c.benchmark_group("table_lookup");
    group.bench_function("hit", |b| b.iter(|| table.get(black_box(113))));
    group.bench_function("miss", |b| b.iter(|| table.get(black_box(200))));
    group.finish();
}

criterion_group!(benches, bench_parse_entry, bench_parse_mappings, bench_lookup);
criterion_main!(benches);
