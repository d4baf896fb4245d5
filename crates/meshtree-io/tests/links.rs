//! Integration test: zones shared between files through links.

use meshtree_core::{Data, DataType, FileMode, Label, Link, TreeError};
use meshtree_io::{Session, SessionConfig};
use meshtree_model::{Base, Header, Selector, Zone};
use meshtree_store::{BackendFlavor, MemoryStore};
use meshtree_test_utils::{ramp, structured_two_zone};

fn shared_grid() -> MemoryStore {
    let mut store = MemoryStore::new(BackendFlavor::Modern);
    let mut s = Session::open(&mut store, "grid.cgns", FileMode::Write, SessionConfig::default()).unwrap();
    s.tree_mut().bases.push(structured_two_zone());
    s.close().unwrap();

    let mut s = Session::open(&mut store, "case.cgns", FileMode::Write, SessionConfig::default()).unwrap();
    let mut base = Base::new("Base", 3, 3);
    base.zones.push(Zone {
        header: Header::linked("Left", Link::new("grid.cgns", "/Base/Left")),
        ..Zone::default()
    });
    s.tree_mut().bases.push(base);
    s.close().unwrap();
    store
}

#[test]
fn linked_zone_reads_its_target() {
    let mut store = shared_grid();
    let mut s = Session::open(&mut store, "case.cgns", FileMode::Read, SessionConfig::default()).unwrap();
    let zone = &s.tree().bases[0].zones[0];
    assert_eq!(zone.header.link, Some(Link::new("grid.cgns", "/Base/Left")));
    assert!(zone.coordinates[0].header.in_link);
    assert_eq!(zone.sizes, [3, 3, 2, 2, 2, 1, 0, 0, 0]);
    assert_eq!(s.coord_read(1, 1, "CoordinateX", DataType::Float64).unwrap(), ramp(0.0, 18));

    s.gopath("/Base/Left/ZoneBC").unwrap();
    assert!(!s.is_link().unwrap());
    s.up().unwrap();
    assert!(s.is_link().unwrap());
}

#[test]
fn linked_subtree_is_read_only() {
    let mut store = shared_grid();
    let mut s = Session::open(&mut store, "case.cgns", FileMode::Modify, SessionConfig::default()).unwrap();

    let err = s.coord_write(1, 1, "CoordinateW", ramp(0.0, 18)).unwrap_err();
    assert!(matches!(err, TreeError::InsideLink { .. }));

    s.goto(1, &[(Label::Zone, Selector::Index(1)), (Label::GridCoordinates, Selector::Index(1))])
        .unwrap();
    assert!(matches!(s.delete_node("CoordinateX"), Err(TreeError::InsideLink { .. })));
    assert!(matches!(
        s.array_write("Extra", &[1], Data::I4(vec![1])),
        Err(TreeError::InsideLink { .. })
    ));

    // The link itself belongs to this file.
    s.gopath("/Base").unwrap();
    s.delete_node("Left").unwrap();
    s.close().unwrap();

    let s = Session::open(&mut store, "grid.cgns", FileMode::Read, SessionConfig::default()).unwrap();
    assert_eq!(s.tree().bases[0].zones.len(), 2);
}
