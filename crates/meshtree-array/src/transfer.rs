//! Whole and partial transfers with element-type conversion.
//!
//! When the buffer type equals the stored type, data moves directly,
//! through the full-array path when both sides are complete and through a
//! hyperslab otherwise. When the types differ the policy depends on the
//! backend:
//!
//! - a [`Modern`](BackendFlavor::Modern) store converts in flight;
//! - a [`Legacy`](BackendFlavor::Legacy) store cannot, so a full-range
//!   transfer is staged through a temporary buffer of the stored type and a
//!   partial one is refused.

use meshtree_core::{Data, DataType, NodeId, StoreError, TreeError};
use meshtree_store::{BackendFlavor, NodeStore};
use tracing::trace;

use crate::range::VerifiedRange;

fn refuse_partial(node: NodeId, from: DataType, to: DataType) -> TreeError {
    TreeError::Store(StoreError::Conversion {
        node,
        from: from.code(),
        to: to.code(),
    })
}

/// Write `data` (with extents `mem_dims`) through a verified range.
pub fn general_write<S: NodeStore + ?Sized>(
    store: &mut S,
    node: NodeId,
    range: &VerifiedRange,
    mem_dims: &[usize],
    data: &Data,
) -> Result<(), TreeError> {
    let stored = store.data_type(node)?;
    let same = data.data_type() == stored;
    trace!(%node, count = range.count, full = range.is_full(), same, "general write");
    if same || store.flavor() == BackendFlavor::Modern {
        if range.is_full() {
            store.write_all(node, data)?;
        } else {
            store.write_range(node, &range.file, mem_dims, &range.memory, data)?;
        }
        return Ok(());
    }
    if !range.is_full() {
        return Err(refuse_partial(node, data.data_type(), stored));
    }
    let staged = data
        .convert(stored)
        .ok_or_else(|| refuse_partial(node, data.data_type(), stored))?;
    store.write_all(node, &staged)?;
    Ok(())
}

/// Read through a verified range into `out` (extents `mem_dims`, element
/// type = memory type).
pub fn general_read<S: NodeStore + ?Sized>(
    store: &S,
    node: NodeId,
    range: &VerifiedRange,
    mem_dims: &[usize],
    out: &mut Data,
) -> Result<(), TreeError> {
    let stored = store.data_type(node)?;
    let wanted = out.data_type();
    let same = wanted == stored;
    trace!(%node, count = range.count, full = range.is_full(), same, "general read");
    if same || store.flavor() == BackendFlavor::Modern {
        if range.is_full() {
            if let Some(data) = store.read_all(node, wanted)? {
                *out = data;
            }
        } else {
            store.read_range(node, &range.file, mem_dims, &range.memory, out)?;
        }
        return Ok(());
    }
    if !range.is_full() {
        return Err(refuse_partial(node, stored, wanted));
    }
    if let Some(staged) = store.read_all(node, stored)? {
        *out = staged
            .convert(wanted)
            .ok_or_else(|| refuse_partial(node, stored, wanted))?;
    }
    Ok(())
}

/// Read a whole node as `dtype`, staging the conversion when the backend
/// cannot convert. `None` for an `MT` node.
pub fn read_full<S: NodeStore + ?Sized>(
    store: &S,
    node: NodeId,
    dtype: DataType,
) -> Result<Option<Data>, TreeError> {
    let stored = store.data_type(node)?;
    if stored == DataType::Empty {
        return Ok(None);
    }
    if stored == dtype || store.flavor() == BackendFlavor::Modern {
        return Ok(store.read_all(node, dtype)?);
    }
    Ok(store
        .read_all(node, stored)?
        .and_then(|data| data.convert(dtype)))
}

/// Replace a whole node's data, staging the conversion when the backend
/// cannot convert.
pub fn write_full<S: NodeStore + ?Sized>(
    store: &mut S,
    node: NodeId,
    data: &Data,
) -> Result<(), TreeError> {
    let stored = store.data_type(node)?;
    if stored == data.data_type() || store.flavor() == BackendFlavor::Modern {
        store.write_all(node, data)?;
        return Ok(());
    }
    let staged = data
        .convert(stored)
        .ok_or_else(|| refuse_partial(node, data.data_type(), stored))?;
    store.write_all(node, &staged)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::{verify_range, RindIndex, Selection};
    use meshtree_core::FileMode;
    use meshtree_store::MemoryStore;
    use proptest::prelude::*;

    fn array(flavor: BackendFlavor, dtype: DataType, dims: &[usize]) -> (MemoryStore, NodeId) {
        let mut store = MemoryStore::new(flavor);
        let root = store.open_file("t", FileMode::Write).unwrap();
        let node = store.create_node(root, "A").unwrap();
        store.set_dimensions(node, dtype, dims).unwrap();
        (store, node)
    }

    fn window(dims: &[usize], min: &[i64], max: &[i64]) -> VerifiedRange {
        let n: usize = min.iter().zip(max).map(|(a, b)| (b - a + 1) as usize).product();
        verify_range(
            RindIndex::Zero,
            &[],
            Selection::new(dims, min, max),
            Selection::new(&[n], &[1], &[n as i64]),
        )
        .unwrap()
    }

    #[test]
    fn legacy_partial_conversion_refused() {
        let (mut store, node) = array(BackendFlavor::Legacy, DataType::Float64, &[4]);
        let range = window(&[4], &[2], &[3]);
        let err = general_write(&mut store, node, &range, &[2], &Data::I4(vec![1, 2]));
        assert!(matches!(err, Err(TreeError::Store(StoreError::Conversion { .. }))));
    }

    #[test]
    fn legacy_full_conversion_staged() {
        let (mut store, node) = array(BackendFlavor::Legacy, DataType::Float64, &[3]);
        let range = window(&[3], &[1], &[3]);
        general_write(&mut store, node, &range, &[3], &Data::I4(vec![1, 2, 3])).unwrap();
        let mut out = Data::I8(vec![0; 3]);
        general_read(&store, node, &range, &[3], &mut out).unwrap();
        assert_eq!(out, Data::I8(vec![1, 2, 3]));
    }

    #[test]
    fn modern_partial_conversion_allowed() {
        let (mut store, node) = array(BackendFlavor::Modern, DataType::Float32, &[4]);
        let range = window(&[4], &[3], &[4]);
        general_write(&mut store, node, &range, &[2], &Data::I8(vec![7, 8])).unwrap();
        assert_eq!(
            read_full(&store, node, DataType::Int32).unwrap(),
            Some(Data::I4(vec![0, 0, 7, 8]))
        );
    }

    #[test]
    fn read_full_stages_on_legacy() {
        let (mut store, node) = array(BackendFlavor::Legacy, DataType::Int32, &[2]);
        write_full(&mut store, node, &Data::R8(vec![1.5, -2.5])).unwrap();
        assert_eq!(
            read_full(&store, node, DataType::Float64).unwrap(),
            Some(Data::R8(vec![1.0, -2.0]))
        );
    }

    proptest! {
        #[test]
        fn partial_and_full_paths_agree(
            nx in 1usize..6,
            ny in 1usize..6,
            seed in any::<u32>(),
        ) {
            let dims = [nx, ny];
            let (lo0, lo1) = ((seed as usize % nx) as i64 + 1, ((seed / 7) as usize % ny) as i64 + 1);
            let (hi0, hi1) = (nx as i64, ny as i64);
            let range = window(&dims, &[lo0, lo1], &[hi0, hi1]);
            let values: Vec<i32> = (0..range.count as i32).map(|v| v * 3 + 1).collect();
            let n = values.len();

            let (mut store, node) = array(BackendFlavor::Legacy, DataType::Int32, &dims);
            general_write(&mut store, node, &range, &[n], &Data::I4(values.clone())).unwrap();
            let mut out = Data::I4(vec![0; n]);
            general_read(&store, node, &range, &[n], &mut out).unwrap();
            prop_assert_eq!(out, Data::I4(values));
        }
    }
}
