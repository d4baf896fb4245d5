//! Upgrades of legacy element representations.
//!
//! Files older than the current revision store sections differently:
//!
//! | Written before | Legacy form                                   | Current form                                  |
//! |----------------|-----------------------------------------------|-----------------------------------------------|
//! | 3.1            | element codes 21+ numbered one lower          | `PYRA_13` inserted at 21                      |
//! | 3.4            | `ParentData [N, 4]`                           | `ParentElements` + `ParentElementsPosition`   |
//! | 4.0            | `NGON_n`/`NFACE_n` counts inline, no offsets  | `ElementStartOffset` + stripped connectivity  |
//!
//! The functions here are pure. The read engine applies them to the
//! in-memory tree and records a [`Rewrite`] for each; in modify mode the
//! session replays the rewrites against the store so the file itself is
//! upgraded.

use meshtree_core::{Data, Dims, ElementType, FileVersion, NamedEnum, NodeId, TreeError};
use meshtree_model::Section;
use meshtree_store::NodeStore;
use smallvec::smallvec;
use tracing::debug;

/// First revision storing start offsets for variable-length sections.
pub(crate) const OFFSETS_IN: FileVersion = FileVersion(4000);
/// First revision storing parent elements and positions separately.
pub(crate) const PARENT_SPLIT_IN: FileVersion = FileVersion(3400);

// ── Rewrite ────────────────────────────────────────────────────────

/// A store mutation that brings one legacy node up to date.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Rewrite {
    /// Replace a node's payload, possibly changing its extents.
    Replace {
        node: NodeId,
        dims: Dims,
        data: Data,
    },
    /// Create a `DataArray_t` child.
    Create {
        parent: NodeId,
        name: &'static str,
        dims: Dims,
        data: Data,
    },
    /// Delete a superseded node.
    Remove { node: NodeId },
}

impl Rewrite {
    pub(crate) fn apply<S: NodeStore + ?Sized>(&self, store: &mut S) -> Result<(), TreeError> {
        match self {
            Rewrite::Replace { node, dims, data } => {
                debug!(%node, dims = ?dims.as_slice(), "rewriting legacy payload");
                store.set_dimensions(*node, data.data_type(), dims)?;
                store.write_all(*node, data)?;
            }
            Rewrite::Create {
                parent,
                name,
                dims,
                data,
            } => {
                debug!(%parent, name, "creating upgraded array");
                store.create_data_node(*parent, name, "DataArray_t", dims, Some(data))?;
            }
            Rewrite::Remove { node } => {
                debug!(%node, "removing legacy node");
                store.delete_node(*node)?;
            }
        }
        Ok(())
    }
}

// ── Connectivity ───────────────────────────────────────────────────

/// Renumber the inline element codes of a legacy `MIXED` connectivity.
/// Returns how many codes changed.
pub(crate) fn remap_mixed_codes(
    conn: &mut [i64],
    version: FileVersion,
) -> Result<usize, String> {
    let mut changed = 0;
    let mut i = 0;
    while i < conn.len() {
        let stored = conn[i] as i32;
        let code = ElementType::current_code(stored, version);
        if code != stored {
            conn[i] = code as i64;
            changed += 1;
        }
        i += 1 + inline_nodes(code, i)?;
    }
    Ok(changed)
}

fn inline_nodes(code: i32, at: usize) -> Result<usize, String> {
    let npe = ElementType::from_code(code)
        .map(ElementType::nodes_per_element)
        .unwrap_or(0);
    if npe == 0 {
        return Err(format!("invalid element code {code} at connectivity index {at}"));
    }
    Ok(npe)
}

/// Start offsets of a `MIXED` connectivity holding `count` elements, each
/// stored as its code followed by its nodes.
pub(crate) fn mixed_offsets(conn: &[i64], count: usize) -> Result<Vec<i64>, String> {
    let mut offsets = Vec::with_capacity(count + 1);
    offsets.push(0);
    let mut i = 0;
    for _ in 0..count {
        let code = *conn
            .get(i)
            .ok_or_else(|| format!("connectivity ends after {} elements", offsets.len() - 1))?;
        i += 1 + inline_nodes(code as i32, i)?;
        offsets.push(i as i64);
    }
    if i != conn.len() {
        return Err(format!(
            "{count} elements span {i} values, connectivity holds {}",
            conn.len()
        ));
    }
    Ok(offsets)
}

/// Split an `NGON_n`/`NFACE_n` connectivity with an inline count before
/// each element into start offsets and the stripped connectivity.
pub(crate) fn split_counted(conn: &[i64], count: usize) -> Result<(Vec<i64>, Vec<i64>), String> {
    let mut offsets = Vec::with_capacity(count + 1);
    let mut stripped = Vec::with_capacity(conn.len().saturating_sub(count));
    offsets.push(0);
    let mut i = 0;
    for element in 0..count {
        let n = *conn
            .get(i)
            .ok_or_else(|| format!("connectivity ends before element {element}"))?;
        let end = i + 1 + usize::try_from(n).map_err(|_| format!("negative count {n} for element {element}"))?;
        let run = conn
            .get(i + 1..end)
            .ok_or_else(|| format!("element {element} runs past the connectivity"))?;
        stripped.extend_from_slice(run);
        offsets.push(stripped.len() as i64);
        i = end;
    }
    if i != conn.len() {
        return Err(format!(
            "{count} elements span {i} values, connectivity holds {}",
            conn.len()
        ));
    }
    Ok((offsets, stripped))
}

// ── Parent data ────────────────────────────────────────────────────

/// Split a column-major `[count, 4]` parent table into its parent
/// elements and parent positions, each `[count, 2]`.
pub(crate) fn split_parent_data(values: &[i64], count: usize) -> Result<(Vec<i64>, Vec<i64>), String> {
    if values.len() != 4 * count {
        return Err(format!(
            "{} holds {} values, expected {count} x 4",
            Section::LEGACY_PARENT_NODE,
            values.len()
        ));
    }
    let (elements, positions) = values.split_at(2 * count);
    Ok((elements.to_vec(), positions.to_vec()))
}

/// Extents of an `[count, 2]` parent array.
pub(crate) fn parent_dims(count: usize) -> Dims {
    smallvec![count, 2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const OLD: FileVersion = FileVersion(3000);

    #[test]
    fn mixed_codes_below_pyra13_are_kept() {
        // TRI_3 then HEXA_8.
        let mut conn = vec![5, 1, 2, 3, 17, 1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(remap_mixed_codes(&mut conn, OLD), Ok(0));
        assert_eq!(conn[0], 5);
        assert_eq!(conn[4], 17);
    }

    #[test]
    fn mixed_codes_above_twenty_are_renumbered() {
        // Legacy code 23 is today's 24 (BAR_4, four nodes).
        let mut conn = vec![23, 1, 2, 3, 4, 3, 5, 6];
        assert_eq!(remap_mixed_codes(&mut conn, OLD), Ok(1));
        assert_eq!(conn, vec![24, 1, 2, 3, 4, 3, 5, 6]);
    }

    #[test]
    fn current_files_keep_codes() {
        let mut conn = vec![21, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13];
        assert_eq!(remap_mixed_codes(&mut conn, FileVersion(3100)), Ok(0));
        assert_eq!(conn[0], 21);
    }

    #[test]
    fn mixed_offsets_include_code_slot() {
        let conn = [5, 1, 2, 3, 7, 1, 2, 3, 4];
        assert_eq!(mixed_offsets(&conn, 2), Ok(vec![0, 4, 9]));
        assert!(mixed_offsets(&conn, 3).is_err());
        assert!(mixed_offsets(&conn, 1).is_err());
        assert!(mixed_offsets(&[22, 3, 1, 2, 3], 1).is_err());
    }

    #[test]
    fn counted_runs_split_into_offsets() {
        let conn = [3, 1, 2, 3, 4, 2, 3, 4, 5];
        let (offsets, stripped) = split_counted(&conn, 2).unwrap();
        assert_eq!(offsets, vec![0, 3, 7]);
        assert_eq!(stripped, vec![1, 2, 3, 2, 3, 4, 5]);
    }

    #[test]
    fn counted_runs_reject_bad_lengths() {
        assert!(split_counted(&[3, 1, 2], 1).is_err());
        assert!(split_counted(&[1, 1, 1, 2], 1).is_err());
        assert!(split_counted(&[-1], 1).is_err());
    }

    #[test]
    fn parent_data_splits_by_column() {
        // Two elements: parents (1,0) (2,3), positions (4,0) (1,2).
        let values = [1, 2, 0, 3, 4, 1, 0, 2];
        let (elements, positions) = split_parent_data(&values, 2).unwrap();
        assert_eq!(elements, vec![1, 2, 0, 3]);
        assert_eq!(positions, vec![4, 1, 0, 2]);
        assert!(split_parent_data(&values, 3).is_err());
    }

    proptest! {
        #[test]
        fn split_offsets_bracket_stripped_connectivity(
            runs in proptest::collection::vec(proptest::collection::vec(1i64..100, 1..8), 1..20)
        ) {
            let mut conn = Vec::new();
            for run in &runs {
                conn.push(run.len() as i64);
                conn.extend(run);
            }
            let (offsets, stripped) = split_counted(&conn, runs.len()).unwrap();
            prop_assert_eq!(offsets.len(), runs.len() + 1);
            prop_assert_eq!(offsets[0], 0);
            prop_assert_eq!(*offsets.last().unwrap() as usize, stripped.len());
            for (i, run) in runs.iter().enumerate() {
                let (a, b) = (offsets[i] as usize, offsets[i + 1] as usize);
                prop_assert_eq!(&stripped[a..b], run.as_slice());
            }
        }
    }
}
