//! Integration test: trees written through a session read back equal.
//!
//! Fixture bases are added to the in-memory tree and persisted by
//! `close`; a fresh read-mode session must reproduce every field the
//! fixture set.

use meshtree_core::{Data, DataType, ElementType, FileMode, GridLocation, Label, PointSetType, TreeError};
use meshtree_io::{Session, SessionConfig};
use meshtree_model::{Base, DataArray, Selector};
use meshtree_store::{BackendFlavor, MemoryStore};
use meshtree_test_utils::{structured_two_zone, unstructured_mixed};
use proptest::prelude::*;

fn write_base(store: &mut MemoryStore, file: &str, base: Base) {
    let mut s = Session::open(store, file, FileMode::Write, SessionConfig::default()).unwrap();
    s.tree_mut().bases.push(base);
    s.close().unwrap();
}

fn read_back(store: &mut MemoryStore, file: &str) -> Base {
    let s = Session::open(store, file, FileMode::Read, SessionConfig::default()).unwrap();
    let base = s.tree().bases[0].clone();
    s.close().unwrap();
    base
}

// ── Structured ───────────────────────────────────────────────────────

#[test]
fn structured_tree_round_trips() {
    let mut store = MemoryStore::new(BackendFlavor::Modern);
    let expected = structured_two_zone();
    write_base(&mut store, "s.cgns", expected.clone());
    let base = read_back(&mut store, "s.cgns");

    assert_eq!((base.cell_dim, base.phys_dim), (3, 3));
    assert_eq!(base.zones.len(), 2);
    for (got, want) in base.zones.iter().zip(&expected.zones) {
        assert_eq!(got.header, want.header);
        assert_eq!(got.sizes, want.sizes);
        for (g, w) in got.coordinates[0].arrays.iter().zip(&want.coordinates[0].arrays) {
            assert_eq!(g.header.name, w.header.name);
            assert_eq!(g.dims, w.dims);
            assert_eq!(g.data, w.data);
        }
        assert_eq!(got.solutions[0].location(), GridLocation::CellCenter);
        assert_eq!(got.solutions[0].arrays[0].data, want.solutions[0].arrays[0].data);
    }

    let left = &base.zones[0];
    let inlet = &left.bc.as_ref().unwrap().bcs[0];
    let set = inlet.ptset.as_ref().unwrap();
    assert_eq!(set.kind, PointSetType::PointRange);
    assert_eq!(set.points, [1, 1, 1, 1, 3, 2]);
    assert_eq!(set.size_of_patch, 6);

    let iface = &left.connectivity[0].one_to_one[0];
    assert_eq!(iface.donor, "Right");
    assert_eq!(iface.transform, [1, 2, 3]);
    assert_eq!(iface.donor_range.kind, PointSetType::PointRangeDonor);
}

// ── Unstructured ─────────────────────────────────────────────────────

#[test]
fn unstructured_sections_round_trip() {
    let mut store = MemoryStore::new(BackendFlavor::Modern);
    let expected = unstructured_mixed();
    write_base(&mut store, "u.cgns", expected.clone());
    let base = read_back(&mut store, "u.cgns");

    let zone = &base.zones[0];
    let kinds: Vec<_> = zone.sections.iter().map(|s| s.element_type).collect();
    assert_eq!(
        kinds,
        [ElementType::Mixed, ElementType::Tri3, ElementType::NGon, ElementType::NFace]
    );
    for (got, want) in zone.sections.iter().zip(&expected.zones[0].sections) {
        assert_eq!(got.range, want.range);
        assert_eq!(got.connectivity.index_values(), want.connectivity.index_values());
        assert_eq!(
            got.offsets.as_ref().and_then(|o| o.index_values()),
            want.offsets.as_ref().and_then(|o| o.index_values())
        );
    }
    let faces = &zone.sections[1];
    assert_eq!(faces.boundary, 2);
    assert_eq!(
        faces.parent_elements.as_ref().and_then(|p| p.index_values()),
        Some(vec![1, 2, 0, 0])
    );
}

// ── Cursor over a read tree ─────────────────────────────────────────

#[test]
fn cursor_paths_reach_fixture_entities() {
    let mut store = MemoryStore::new(BackendFlavor::Modern);
    write_base(&mut store, "c.cgns", structured_two_zone());
    let mut s = Session::open(&mut store, "c.cgns", FileMode::Read, SessionConfig::default()).unwrap();

    s.gopath("/Base/Left/ZoneBC/Inlet").unwrap();
    assert_eq!(s.where_am_i(), "/Base/Left/ZoneBC/Inlet");
    s.gopath("../../Solution").unwrap();
    assert_eq!(s.array_count().unwrap(), 1);
    assert_eq!(
        s.array_read(Selector::Name("Density".into()), DataType::Float32).unwrap(),
        Data::R4(vec![1.0, 1.1, 1.2, 1.3])
    );

    s.goto(1, &[(Label::Zone, Selector::Index(2)), (Label::GridCoordinates, Selector::Index(1))])
        .unwrap();
    let (name, dtype, dims) = s.array_info(Selector::Index(1)).unwrap();
    assert_eq!((name.as_str(), dtype, dims.as_slice()), ("CoordinateX", DataType::Float64, &[3usize, 3, 2][..]));
    assert!(s.descriptor_write("Note", "read only").is_err());
}

// ── Shape checks on flush ────────────────────────────────────────────

#[test]
fn flush_refuses_misshaped_coordinates() {
    let mut store = MemoryStore::new(BackendFlavor::Modern);
    let mut base = structured_two_zone();
    base.zones[1].coordinates[0].arrays[0] = DataArray::new("CoordinateX", &[5], Data::R8(vec![0.0; 5]));

    let mut s = Session::open(&mut store, "bad.cgns", FileMode::Write, SessionConfig::default()).unwrap();
    s.tree_mut().bases.push(base);
    let err = s.flush().unwrap_err();
    assert!(
        matches!(err, TreeError::SchemaViolation { label: Label::GridCoordinates, .. }),
        "{err:?}"
    );
    assert!(s.close().is_err());

    let s = Session::open(&mut store, "bad.cgns", FileMode::Read, SessionConfig::default()).unwrap();
    assert!(s.tree().bases.is_empty());
    s.close().unwrap();
}

#[test]
fn flush_refuses_section_range_disagreeing_with_connectivity() {
    let mut store = MemoryStore::new(BackendFlavor::Modern);
    let mut base = unstructured_mixed();
    base.zones[0].sections[1].range = [3, 5];

    let mut s = Session::open(&mut store, "sec.cgns", FileMode::Write, SessionConfig::default()).unwrap();
    s.tree_mut().bases.push(base);
    assert!(matches!(
        s.flush(),
        Err(TreeError::SchemaViolation { label: Label::Elements, .. })
    ));
}

// ── Conversion ───────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn stored_doubles_read_as_floats(values in prop::collection::vec(-1.0e6f64..1.0e6, 18)) {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut base = structured_two_zone();
        base.zones[0].coordinates[0].arrays[0].data = Some(Data::R8(values.clone()));
        write_base(&mut store, "p.cgns", base);

        let mut s = Session::open(&mut store, "p.cgns", FileMode::Read, SessionConfig::default()).unwrap();
        let got = s.coord_read(1, 1, "CoordinateX", DataType::Float32).unwrap();
        let want: Vec<f32> = values.iter().map(|&v| v as f32).collect();
        prop_assert_eq!(got, Data::R4(want));
    }
}
