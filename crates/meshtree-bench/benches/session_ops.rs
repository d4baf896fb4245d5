//! Criterion benchmarks for whole-file write, read and legacy upgrade.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use meshtree_bench::{reference_profile, section_profile};
use meshtree_core::{FileMode, FileVersion};
use meshtree_io::{Session, SessionConfig};
use meshtree_model::Base;
use meshtree_store::{BackendFlavor, MemoryStore};
use meshtree_test_utils::legacy;

fn written(base: Base) -> MemoryStore {
    let mut store = MemoryStore::new(BackendFlavor::Modern);
    let mut s = Session::open(&mut store, "bench.cgns", FileMode::Write, SessionConfig::default()).unwrap();
    s.tree_mut().bases.push(base);
    s.close().unwrap();
    store
}

fn bench_write(c: &mut Criterion) {
    let base = reference_profile(8);
    c.bench_function("write_reference_8_blocks", |b| {
        b.iter(|| black_box(written(base.clone())));
    });
}

fn bench_read(c: &mut Criterion) {
    let mut store = written(reference_profile(8));
    c.bench_function("read_reference_8_blocks", |b| {
        b.iter(|| {
            let s = Session::open(&mut store, "bench.cgns", FileMode::Read, SessionConfig::default()).unwrap();
            black_box(s.tree().bases.len());
            s.close().unwrap();
        });
    });
}

fn bench_upgrade(c: &mut Criterion) {
    let mut store = written(section_profile(10_000));
    legacy::inline_counts(&mut store, "bench.cgns", "/Base/Mesh/Faces").unwrap();
    legacy::stamp_version(&mut store, "bench.cgns", FileVersion(3200)).unwrap();
    c.bench_function("read_legacy_ngon_10k", |b| {
        b.iter(|| {
            let s = Session::open(&mut store, "bench.cgns", FileMode::Read, SessionConfig::default()).unwrap();
            black_box(s.tree().bases[0].zones[0].sections.len());
            s.close().unwrap();
        });
    });
}

criterion_group!(benches, bench_write, bench_read, bench_upgrade);
criterion_main!(benches);
