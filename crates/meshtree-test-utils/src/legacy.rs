//! Rewrite a current file into the layout of an older library version.
//!
//! Write the file with a session first, close it, then apply these to the
//! closed file. Section paths are absolute (`/Base/Zone/Section`).

use meshtree_core::{Data, DataType, FileVersion, StoreError};
use meshtree_model::{File, Section};
use meshtree_store::{MemoryStore, NodeStore};

fn index_values(store: &MemoryStore, node: meshtree_core::NodeId) -> Result<(Vec<i64>, DataType), StoreError> {
    let dtype = store.data_type(node)?;
    let values = store
        .read_all(node, dtype)?
        .and_then(|d| d.to_index_vec())
        .unwrap_or_default();
    Ok((values, dtype))
}

fn replace(store: &mut MemoryStore, node: meshtree_core::NodeId, dims: &[usize], data: &Data) -> Result<(), StoreError> {
    store.set_dimensions(node, data.data_type(), dims)?;
    store.write_all(node, data)
}

/// Overwrite the stored library version of `file`.
pub fn stamp_version(store: &mut MemoryStore, file: &str, version: FileVersion) -> Result<(), StoreError> {
    let node = store.lookup(file, &format!("/{}", File::VERSION_NODE))?;
    replace(store, node, &[1], &Data::R4(vec![version.to_stored()]))
}

/// Replace `ParentElements` and `ParentElementsPosition` of a section by
/// the combined `[count, 4]` `ParentData` array written before 3.4.
pub fn merge_parent_data(store: &mut MemoryStore, file: &str, section: &str) -> Result<(), StoreError> {
    let elements = store.lookup(file, &format!("{section}/{}", Section::PARENT_ELEMENTS_NODE))?;
    let positions = store.lookup(file, &format!("{section}/{}", Section::PARENT_POSITIONS_NODE))?;
    let count = store.dimensions(elements)?.first().copied().unwrap_or(0);
    let (mut values, dtype) = index_values(store, elements)?;
    values.extend(index_values(store, positions)?.0);

    let parent = store.lookup(file, section)?;
    store.delete_node(elements)?;
    store.delete_node(positions)?;
    store.create_data_node(
        parent,
        Section::LEGACY_PARENT_NODE,
        "DataArray_t",
        &[count, 4],
        Some(&Data::index(&values, dtype)),
    )?;
    Ok(())
}

/// Fold the start offsets of an `NGON_n`/`NFACE_n` section back into its
/// connectivity as a count before each element, as written before 4.0.
pub fn inline_counts(store: &mut MemoryStore, file: &str, section: &str) -> Result<(), StoreError> {
    let offsets_node = store.lookup(file, &format!("{section}/{}", Section::OFFSET_NODE))?;
    let conn_node = store.lookup(file, &format!("{section}/{}", Section::CONNECTIVITY_NODE))?;
    let (offsets, _) = index_values(store, offsets_node)?;
    let (conn, dtype) = index_values(store, conn_node)?;

    let mut counted = Vec::with_capacity(conn.len() + offsets.len());
    for pair in offsets.windows(2) {
        let (start, end) = (pair[0] as usize, pair[1] as usize);
        counted.push((end - start) as i64);
        counted.extend_from_slice(&conn[start..end]);
    }
    replace(store, conn_node, &[counted.len()], &Data::index(&counted, dtype))?;
    store.delete_node(offsets_node)
}

/// Delete the node at `path`, e.g. the start offsets of a `MIXED`
/// section, which files before 4.0 did not store.
pub fn drop_node(store: &mut MemoryStore, file: &str, path: &str) -> Result<(), StoreError> {
    let node = store.lookup(file, path)?;
    store.delete_node(node)
}

/// Store a section's element type with the numbering used before 3.1,
/// where every code from `PYRA_13` on was one lower.
pub fn lower_element_code(store: &mut MemoryStore, file: &str, section: &str) -> Result<(), StoreError> {
    let node = store.lookup(file, section)?;
    let (mut header, _) = index_values(store, node)?;
    if let Some(code) = header.first_mut() {
        if *code > 21 {
            *code -= 1;
        }
    }
    replace(store, node, &[2], &Data::index(&header, DataType::Int32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshtree_core::FileMode;

    fn section_file(store: &mut MemoryStore) {
        let root = store.open_file("old.cgns", FileMode::Write).unwrap();
        store
            .create_data_node(root, File::VERSION_NODE, "CGNSLibraryVersion_t", &[1], Some(&Data::R4(vec![4.5])))
            .unwrap();
        let base = store.create_data_node(root, "Base", "CGNSBase_t", &[2], Some(&Data::I4(vec![3, 3]))).unwrap();
        let zone = store.create_data_node(base, "Mesh", "Zone_t", &[1, 3], Some(&Data::I4(vec![4, 2, 0]))).unwrap();
        let sec = store
            .create_data_node(zone, "Polygons", "Elements_t", &[2], Some(&Data::I4(vec![22, 0])))
            .unwrap();
        store
            .create_data_node(sec, Section::CONNECTIVITY_NODE, "DataArray_t", &[7], Some(&Data::I4(vec![1, 2, 3, 2, 3, 4, 1])))
            .unwrap();
        store
            .create_data_node(sec, Section::OFFSET_NODE, "DataArray_t", &[3], Some(&Data::I4(vec![0, 3, 7])))
            .unwrap();
        store.close_file(root).unwrap();
    }

    #[test]
    fn counts_are_folded_back() {
        let mut store = MemoryStore::new(meshtree_store::BackendFlavor::Modern);
        section_file(&mut store);
        inline_counts(&mut store, "old.cgns", "/Base/Mesh/Polygons").unwrap();
        let conn = store.lookup("old.cgns", "/Base/Mesh/Polygons/ElementConnectivity").unwrap();
        assert_eq!(
            store.read_all(conn, DataType::Int32).unwrap(),
            Some(Data::I4(vec![3, 1, 2, 3, 4, 2, 3, 4, 1]))
        );
        assert!(store.lookup("old.cgns", "/Base/Mesh/Polygons/ElementStartOffset").is_err());
    }

    #[test]
    fn version_and_code_are_lowered() {
        let mut store = MemoryStore::new(meshtree_store::BackendFlavor::Modern);
        section_file(&mut store);
        stamp_version(&mut store, "old.cgns", FileVersion(3000)).unwrap();
        lower_element_code(&mut store, "old.cgns", "/Base/Mesh/Polygons").unwrap();
        let sec = store.lookup("old.cgns", "/Base/Mesh/Polygons").unwrap();
        assert_eq!(store.read_all(sec, DataType::Int32).unwrap(), Some(Data::I4(vec![21, 0])));
        let v = store.lookup("old.cgns", "/CGNSLibraryVersion").unwrap();
        assert_eq!(store.read_all(v, DataType::Float32).unwrap(), Some(Data::R4(vec![3.0])));
    }
}
