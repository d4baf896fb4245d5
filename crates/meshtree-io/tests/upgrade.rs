//! Integration test: files laid out by older library versions.
//!
//! A current file is written, then rewritten at the store level into the
//! legacy layout. Reading must yield the current representation; modify
//! mode writes it back unless configured not to.

use meshtree_core::{Data, DataType, ElementType, FileMode, FileVersion, LIBRARY_VERSION};
use meshtree_io::{Session, SessionConfig};
use meshtree_model::Section;
use meshtree_store::{BackendFlavor, MemoryStore, NodeStore};
use meshtree_test_utils::{legacy, unstructured_mixed};

const FILE: &str = "legacy.cgns";

/// Show the upgrade warnings with `RUST_LOG=meshtree_io=warn`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The mixed fixture as a 3.2 file: combined parent data, counted
/// polyhedral connectivity, no `MIXED` offsets.
fn legacy_store() -> MemoryStore {
    init_tracing();
    let mut store = MemoryStore::new(BackendFlavor::Modern);
    let mut s = Session::open(&mut store, FILE, FileMode::Write, SessionConfig::default()).unwrap();
    s.tree_mut().bases.push(unstructured_mixed());
    s.close().unwrap();

    legacy::merge_parent_data(&mut store, FILE, "/Base/Mesh/Faces").unwrap();
    legacy::inline_counts(&mut store, FILE, "/Base/Mesh/Polygons").unwrap();
    legacy::inline_counts(&mut store, FILE, "/Base/Mesh/Polyhedra").unwrap();
    legacy::drop_node(&mut store, FILE, "/Base/Mesh/Cells/ElementStartOffset").unwrap();
    legacy::stamp_version(&mut store, FILE, FileVersion(3200)).unwrap();
    store
}

fn stored_version(store: &MemoryStore) -> Data {
    let node = store.lookup(FILE, "/CGNSLibraryVersion").unwrap();
    store.read_all(node, DataType::Float32).unwrap().unwrap()
}

fn sections(store: &mut MemoryStore, mode: FileMode, config: SessionConfig) -> Vec<Section> {
    let s = Session::open(store, FILE, mode, config).unwrap();
    let sections = s.tree().bases[0].zones[0].sections.clone();
    s.close().unwrap();
    sections
}

fn offsets(section: &Section) -> Option<Vec<i64>> {
    section.offsets.as_ref().and_then(|o| o.index_values())
}

#[test]
fn read_upgrades_in_memory_only() {
    let mut store = legacy_store();
    let s = Session::open(&mut store, FILE, FileMode::Read, SessionConfig::default()).unwrap();
    assert_eq!(s.version(), FileVersion(3200));
    let zone = &s.tree().bases[0].zones[0];

    let cells = &zone.sections[0];
    assert_eq!(offsets(cells), Some(vec![0, 5, 11]));

    let faces = &zone.sections[1];
    let elements = faces.parent_elements.as_ref().unwrap();
    assert_eq!(elements.header.name, Section::PARENT_ELEMENTS_NODE);
    assert_eq!(elements.dims.as_slice(), [2, 2]);
    assert_eq!(elements.index_values(), Some(vec![1, 2, 0, 0]));
    assert_eq!(
        faces.parent_positions.as_ref().and_then(|p| p.index_values()),
        Some(vec![1, 4, 0, 0])
    );

    let polygons = &zone.sections[2];
    assert_eq!(offsets(polygons), Some(vec![0, 3, 7]));
    assert_eq!(polygons.connectivity.index_values(), Some(vec![1, 2, 3, 2, 3, 5, 6]));
    s.close().unwrap();

    assert!(store.lookup(FILE, "/Base/Mesh/Faces/ParentData").is_ok());
    assert_eq!(stored_version(&store), Data::R4(vec![3.2]));
}

#[test]
fn modify_writes_upgrades_back() {
    let mut store = legacy_store();
    let upgraded = sections(&mut store, FileMode::Modify, SessionConfig::default());
    assert_eq!(offsets(&upgraded[3]), Some(vec![0, 2]));

    assert!(store.lookup(FILE, "/Base/Mesh/Faces/ParentData").is_err());
    assert!(store.lookup(FILE, "/Base/Mesh/Faces/ParentElementsPosition").is_ok());
    assert!(store.lookup(FILE, "/Base/Mesh/Cells/ElementStartOffset").is_ok());
    assert_eq!(stored_version(&store), Data::R4(vec![LIBRARY_VERSION.to_stored()]));

    // A second read finds nothing left to upgrade.
    let again = sections(&mut store, FileMode::Read, SessionConfig::default());
    assert_eq!(again, upgraded);
}

#[test]
fn modify_without_rewrite_keeps_the_old_version() {
    let mut store = legacy_store();
    let config = SessionConfig {
        rewrite_upgrades: false,
        ..SessionConfig::default()
    };
    let kept = sections(&mut store, FileMode::Modify, config);
    assert_eq!(offsets(&kept[2]), Some(vec![0, 3, 7]));
    assert!(store.lookup(FILE, "/Base/Mesh/Faces/ParentData").is_ok());
    assert!(store.lookup(FILE, "/Base/Mesh/Faces/ParentElements").is_err());
    assert!(store.lookup(FILE, "/Base/Mesh/Polygons/ElementStartOffset").is_err());
    assert_eq!(stored_version(&store), Data::R4(vec![3.2]));
}

#[test]
fn renumbered_element_codes_are_read_current() {
    let mut store = MemoryStore::new(BackendFlavor::Modern);
    let mut s = Session::open(&mut store, FILE, FileMode::Write, SessionConfig::default()).unwrap();
    s.tree_mut().bases.push(unstructured_mixed());
    s.close().unwrap();
    legacy::lower_element_code(&mut store, FILE, "/Base/Mesh/Polygons").unwrap();
    legacy::lower_element_code(&mut store, FILE, "/Base/Mesh/Polyhedra").unwrap();
    legacy::stamp_version(&mut store, FILE, FileVersion(3000)).unwrap();

    let read = sections(&mut store, FileMode::Read, SessionConfig::default());
    assert_eq!(read[2].element_type, ElementType::NGon);
    assert_eq!(read[3].element_type, ElementType::NFace);
}
