//! Node handles and the [`Dims`] extent type.

use smallvec::SmallVec;
use std::fmt;

/// Opaque handle to a node in a node store.
///
/// Handles are assigned by the store when a node is created or opened and
/// are only meaningful to the store that issued them. They carry no
/// numeric meaning: two handles compare equal only if they name the same
/// node in the same store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Per-axis extents of a stored array.
///
/// Uses `SmallVec<[usize; 4]>` so arrays up to rank 4 (every rank the
/// schema produces except rind vectors of 3D zones) never touch the heap.
pub type Dims = SmallVec<[usize; 4]>;

/// Number of elements described by a set of extents.
///
/// A rank-0 extent list describes no data and yields 0.
pub fn element_count(dims: &[usize]) -> usize {
    if dims.is_empty() {
        0
    } else {
        dims.iter().product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_count_of_empty_is_zero() {
        assert_eq!(element_count(&[]), 0);
        assert_eq!(element_count(&[3, 4]), 12);
        assert_eq!(element_count(&[5, 0]), 0);
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId(7).to_string(), "#7");
    }
}
