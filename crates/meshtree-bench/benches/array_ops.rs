//! Criterion micro-benchmarks for range verification, block transfers and
//! numeric conversion.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use meshtree_array::{general_read, verify_range, RindIndex, Selection};
use meshtree_bench::buffer;
use meshtree_core::{DataType, FileMode};
use meshtree_store::{BackendFlavor, MemoryStore, NodeStore};

const EDGE: usize = 64;

fn block_store() -> (MemoryStore, meshtree_core::NodeId) {
    let mut store = MemoryStore::new(BackendFlavor::Modern);
    let root = store.open_file("bench.cgns", FileMode::Write).unwrap();
    let data = buffer(EDGE * EDGE * EDGE);
    let node = store
        .create_data_node(root, "Block", "DataArray_t", &[EDGE, EDGE, EDGE], Some(&data))
        .unwrap();
    (store, node)
}

fn bench_verify(c: &mut Criterion) {
    let dims = [EDGE + 2; 3];
    let mem_dims = [EDGE; 3];
    let (lo, hi) = ([0i64; 3], [EDGE as i64 - 1; 3]);
    let (mlo, mhi) = ([1i64; 3], [EDGE as i64; 3]);
    c.bench_function("verify_range_3d_rind", |b| {
        b.iter(|| {
            black_box(
                verify_range(
                    RindIndex::Core,
                    &[1, 1, 1, 1, 1, 1],
                    Selection::new(&dims, &lo, &hi),
                    Selection::new(&mem_dims, &mlo, &mhi),
                )
                .unwrap(),
            )
        });
    });
}

fn bench_block_read(c: &mut Criterion) {
    let (store, node) = block_store();
    let dims = [EDGE; 3];
    let half = EDGE as i64 / 2;
    let (lo, hi) = ([1, 1, 1], [half, half, half]);
    let mem_dims = [half as usize; 3];
    let (mlo, mhi) = ([1i64; 3], [half; 3]);
    let range = verify_range(
        RindIndex::Core,
        &[],
        Selection::new(&dims, &lo, &hi),
        Selection::new(&mem_dims, &mlo, &mhi),
    )
    .unwrap();

    let mut group = c.benchmark_group("block_read_32cubed");
    for (label, dtype) in [("same_type", DataType::Float64), ("to_f32", DataType::Float32)] {
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut out = meshtree_core::Data::zeros(dtype, range.count).unwrap();
                general_read(&store, node, &range, &mem_dims, &mut out).unwrap();
                black_box(out)
            });
        });
    }
    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let data = buffer(1 << 20);
    c.bench_function("convert_r8_to_r4_1m", |b| {
        b.iter(|| black_box(data.convert(DataType::Float32)));
    });
}

criterion_group!(benches, bench_verify, bench_block_read, bench_convert);
criterion_main!(benches);
