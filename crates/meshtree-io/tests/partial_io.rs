//! Integration test: rind-aware block transfers and point-set sizing.

use meshtree_core::{Data, DataType, FileMode, GridLocation, Label, PointSetType, StoreError, TreeError, ZoneType};
use meshtree_io::{RindIndex, Selection, Session, SessionConfig};
use meshtree_model::Selector;
use meshtree_store::{BackendFlavor, MemoryStore};

/// 2-D block of 4 x 3 vertices; solution 1 is cell-centered with one rind
/// column on each side of the i axis, holding `0..10` over `[5, 2]`.
fn rinded(flavor: BackendFlavor) -> MemoryStore {
    let mut store = MemoryStore::new(flavor);
    let mut s = Session::open(&mut store, "r.cgns", FileMode::Write, SessionConfig::default()).unwrap();
    s.base_write("Base", 2, 2).unwrap();
    s.zone_write(1, "Block", ZoneType::Structured, &[4, 3, 3, 2, 0, 0]).unwrap();
    s.solution_write(1, 1, "Rinded", GridLocation::CellCenter).unwrap();
    s.goto(1, &[(Label::Zone, Selector::Index(1)), (Label::FlowSolution, Selector::Index(1))])
        .unwrap();
    s.rind_write(&[1, 1, 0, 0]).unwrap();
    s.field_write(1, 1, 1, "P", Data::R8((0..10).map(f64::from).collect())).unwrap();
    s.close().unwrap();
    store
}

fn read_block(store: &mut MemoryStore, rind_index: RindIndex, min: &[i64], max: &[i64], n: usize) -> Data {
    let config = SessionConfig {
        rind_index,
        ..SessionConfig::default()
    };
    let mut s = Session::open(store, "r.cgns", FileMode::Read, config).unwrap();
    let mut out = Data::R8(vec![0.0; n]);
    let dims = [n];
    let (lo, hi) = ([1], [n as i64]);
    s.field_general_read(1, 1, 1, "P", min, max, Selection::new(&dims, &lo, &hi), &mut out)
        .unwrap();
    s.close().unwrap();
    out
}

#[test]
fn core_index_reaches_rind_at_zero() {
    let mut store = rinded(BackendFlavor::Modern);
    assert_eq!(read_block(&mut store, RindIndex::Core, &[0, 1], &[0, 2], 2), Data::R8(vec![0.0, 5.0]));
    assert_eq!(
        read_block(&mut store, RindIndex::Core, &[1, 1], &[3, 2], 6),
        Data::R8(vec![1.0, 2.0, 3.0, 6.0, 7.0, 8.0])
    );
}

#[test]
fn zero_index_counts_rind_as_first_plane() {
    let mut store = rinded(BackendFlavor::Modern);
    assert_eq!(read_block(&mut store, RindIndex::Zero, &[1, 1], &[1, 2], 2), Data::R8(vec![0.0, 5.0]));
    assert_eq!(read_block(&mut store, RindIndex::Zero, &[5, 2], &[5, 2], 1), Data::R8(vec![9.0]));
}

#[test]
fn converted_block_write() {
    let mut store = rinded(BackendFlavor::Modern);
    let mut s = Session::open(&mut store, "r.cgns", FileMode::Modify, SessionConfig::default()).unwrap();
    let patch = Data::R4(vec![-1.0, -2.0]);
    s.field_general_write(1, 1, 1, "P", &[4, 1], &[4, 2], Selection::new(&[2], &[1], &[2]), &patch)
        .unwrap();
    let all = s.field_read(1, 1, 1, "P", DataType::Float64).unwrap();
    assert_eq!(all, Data::R8(vec![0.0, 1.0, 2.0, 3.0, -1.0, 5.0, 6.0, 7.0, 8.0, -2.0]));
    s.close().unwrap();
}

#[test]
fn legacy_backend_refuses_converted_blocks() {
    let mut store = rinded(BackendFlavor::Legacy);
    let mut s = Session::open(&mut store, "r.cgns", FileMode::Modify, SessionConfig::default()).unwrap();
    let patch = Data::R4(vec![-1.0]);
    let err = s
        .field_general_write(1, 1, 1, "P", &[1, 1], &[1, 1], Selection::new(&[1], &[1], &[1]), &patch)
        .unwrap_err();
    assert!(matches!(err, TreeError::Store(StoreError::Conversion { .. })));
}

#[test]
fn block_outside_rind_is_rejected() {
    let mut store = rinded(BackendFlavor::Modern);
    let mut s = Session::open(&mut store, "r.cgns", FileMode::Read, SessionConfig::default()).unwrap();
    let mut out = Data::R8(vec![0.0; 2]);
    let err = s
        .field_general_read(1, 1, 1, "P", &[-1, 1], &[-1, 2], Selection::new(&[2], &[1], &[2]), &mut out)
        .unwrap_err();
    assert!(matches!(err, TreeError::RangeInvalid { .. }));
}

#[test]
fn point_set_fixes_field_length() {
    let mut store = MemoryStore::new(BackendFlavor::Modern);
    let mut s = Session::open(&mut store, "p.cgns", FileMode::Write, SessionConfig::default()).unwrap();
    s.base_write("Base", 2, 2).unwrap();
    s.zone_write(1, "Block", ZoneType::Structured, &[4, 3, 3, 2, 0, 0]).unwrap();
    s.solution_write(1, 1, "Range", GridLocation::Vertex).unwrap();
    s.solution_write(1, 1, "List", GridLocation::Vertex).unwrap();

    s.goto(1, &[(Label::Zone, Selector::Index(1)), (Label::FlowSolution, Selector::Index(1))])
        .unwrap();
    s.ptset_write(PointSetType::PointRange, &[1, 1, 2, 3]).unwrap();
    assert_eq!(s.ptset_info().unwrap(), (PointSetType::PointRange, 2));
    assert_eq!(s.ptset_read().unwrap().size_of_patch, 6);
    assert!(s.field_write(1, 1, 1, "Q", Data::R8(vec![0.0; 4])).is_err());
    s.field_write(1, 1, 1, "Q", Data::R8(vec![0.0; 6])).unwrap();

    s.gopath("../List").unwrap();
    s.ptset_write(PointSetType::PointList, &[1, 1, 2, 2, 4, 3]).unwrap();
    assert_eq!(s.ptset_info().unwrap(), (PointSetType::PointList, 3));
    s.field_write(1, 1, 2, "Q", Data::I4(vec![1, 2, 3])).unwrap();
    s.close().unwrap();

    let s = Session::open(&mut store, "p.cgns", FileMode::Read, SessionConfig::default()).unwrap();
    let zone = &s.tree().bases[0].zones[0];
    assert_eq!(zone.solutions[0].arrays[0].dims.as_slice(), [6]);
    assert_eq!(zone.solutions[1].arrays[0].dims.as_slice(), [3]);
    assert_eq!(zone.solutions[1].ptset.as_ref().map(|p| p.size_of_patch), Some(3));
}
