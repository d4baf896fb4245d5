//! Verification of partial-array requests.
//!
//! A request names an inclusive, 1-based block of the stored array and an
//! inclusive, 1-based block of the caller's buffer. Verification checks
//! both blocks, translates the file block into store-relative indices, and
//! reports whether either block spans its whole array so the transfer can
//! take the full-array path.

use meshtree_core::TreeError;
use meshtree_store::Hyperslab;

/// How rind planes are indexed in caller-supplied file ranges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RindIndex {
    /// Index 1 is the first core (non-rind) plane; rind planes before it
    /// are addressed with indices `1 - rind_lo ..= 0`.
    #[default]
    Core,
    /// Index 1 is the first stored plane, rind or not (historic
    /// convention).
    Zero,
}

/// One side of a transfer: array extents plus an inclusive 1-based block.
#[derive(Clone, Copy, Debug)]
pub struct Selection<'a> {
    /// Extents of the whole array.
    pub dims: &'a [usize],
    /// Lower corner (inclusive, 1-based).
    pub min: &'a [i64],
    /// Upper corner (inclusive, 1-based).
    pub max: &'a [i64],
}

impl<'a> Selection<'a> {
    /// A selection of the block `min..=max` of an array with extents `dims`.
    pub fn new(dims: &'a [usize], min: &'a [i64], max: &'a [i64]) -> Self {
        Self { dims, min, max }
    }
}

/// The outcome of [`verify_range`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedRange {
    /// Store-relative lower corner (first stored plane is 1).
    pub file_min: Vec<i64>,
    /// Store-relative upper corner.
    pub file_max: Vec<i64>,
    /// The file block as a hyperslab.
    pub file: Hyperslab,
    /// The memory block as a hyperslab.
    pub memory: Hyperslab,
    /// Whether the file block covers the whole stored array.
    pub file_full: bool,
    /// Whether the memory block covers the whole buffer.
    pub memory_full: bool,
    /// Number of elements transferred.
    pub count: usize,
}

impl VerifiedRange {
    /// Whether both sides span their whole arrays.
    pub fn is_full(&self) -> bool {
        self.file_full && self.memory_full
    }
}

fn rind_lo(rind: &[i32], axis: usize) -> i64 {
    rind.get(2 * axis).copied().unwrap_or(0) as i64
}

fn check_rank(what: &str, sel: &Selection<'_>) -> Result<(), TreeError> {
    let rank = sel.dims.len();
    if sel.min.len() != rank || sel.max.len() != rank {
        return Err(TreeError::range(format!(
            "{what} range has rank {}/{} but the array has rank {rank}",
            sel.min.len(),
            sel.max.len()
        )));
    }
    Ok(())
}

fn block_count(min: &[i64], max: &[i64]) -> usize {
    min.iter()
        .zip(max)
        .map(|(&lo, &hi)| (hi - lo + 1) as usize)
        .product()
}

/// Verify a (file block, memory block) pair.
///
/// `rind` holds `[lo0, hi0, lo1, hi1, ...]` rind-plane counts of the stored
/// array (empty means none). The file block is interpreted per
/// `rind_index`. Element counts of the two blocks must agree; ranks need
/// not.
pub fn verify_range(
    rind_index: RindIndex,
    rind: &[i32],
    file: Selection<'_>,
    memory: Selection<'_>,
) -> Result<VerifiedRange, TreeError> {
    check_rank("file", &file)?;
    check_rank("memory", &memory)?;

    let mut file_min = Vec::with_capacity(file.dims.len());
    let mut file_max = Vec::with_capacity(file.dims.len());
    for axis in 0..file.dims.len() {
        let (lo, hi, extent) = (file.min[axis], file.max[axis], file.dims[axis] as i64);
        let (lowest, highest, shift) = match rind_index {
            RindIndex::Zero => (1, extent, 0),
            RindIndex::Core => {
                let r = rind_lo(rind, axis);
                (1 - r, extent - r, r)
            }
        };
        if lo > hi || lo < lowest || hi > highest {
            return Err(TreeError::range(format!(
                "invalid file range {lo}..={hi} on axis {axis} (allowed {lowest}..={highest})"
            )));
        }
        file_min.push(lo + shift);
        file_max.push(hi + shift);
    }

    for axis in 0..memory.dims.len() {
        let (lo, hi, extent) = (memory.min[axis], memory.max[axis], memory.dims[axis] as i64);
        if lo > hi || lo < 1 || hi > extent {
            return Err(TreeError::range(format!(
                "invalid memory range {lo}..={hi} on axis {axis} (allowed 1..={extent})"
            )));
        }
    }

    let file_count = block_count(&file_min, &file_max);
    let memory_count = block_count(memory.min, memory.max);
    if file_count != memory_count {
        return Err(TreeError::range(format!(
            "memory range holds {memory_count} elements but the file range requests {file_count}"
        )));
    }

    let file_full = file_min.iter().all(|&m| m == 1)
        && file_max.iter().zip(file.dims).all(|(&m, &d)| m == d as i64);
    let memory_full = memory.min.iter().all(|&m| m == 1)
        && memory.max.iter().zip(memory.dims).all(|(&m, &d)| m == d as i64);

    Ok(VerifiedRange {
        file: Hyperslab::from_bounds(&file_min, &file_max),
        memory: Hyperslab::from_bounds(memory.min, memory.max),
        file_min,
        file_max,
        file_full,
        memory_full,
        count: file_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn core_index_shifts_by_rind() {
        // 1 rind plane each side: stored extent 7 = 5 core + 2 rind.
        let v = verify_range(
            RindIndex::Core,
            &[1, 1],
            Selection::new(&[7], &[0], &[6]),
            Selection::new(&[7], &[1], &[7]),
        )
        .unwrap();
        assert_eq!(v.file_min, [1]);
        assert_eq!(v.file_max, [7]);
        assert!(v.is_full());
    }

    #[test]
    fn zero_index_is_unshifted() {
        let v = verify_range(
            RindIndex::Zero,
            &[1, 1],
            Selection::new(&[7], &[2], &[4]),
            Selection::new(&[3], &[1], &[3]),
        )
        .unwrap();
        assert_eq!(v.file_min, [2]);
        assert!(!v.file_full);
        assert!(v.memory_full);
    }

    #[test]
    fn core_rejects_below_rind() {
        let err = verify_range(
            RindIndex::Core,
            &[1, 1],
            Selection::new(&[7], &[-1], &[2]),
            Selection::new(&[4], &[1], &[4]),
        );
        assert!(matches!(err, Err(TreeError::RangeInvalid { .. })));
    }

    #[test]
    fn inverted_and_out_of_bounds_rejected() {
        for (min, max) in [([3i64], [2i64]), ([0], [2]), ([1], [9])] {
            let err = verify_range(
                RindIndex::Zero,
                &[],
                Selection::new(&[5], &min, &max),
                Selection::new(&[5], &[1], &[5]),
            );
            assert!(matches!(err, Err(TreeError::RangeInvalid { .. })), "{min:?}..{max:?}");
        }
    }

    #[test]
    fn reshape_is_legal_size_mismatch_is_not() {
        let ok = verify_range(
            RindIndex::Core,
            &[],
            Selection::new(&[4, 3], &[1, 1], &[4, 3]),
            Selection::new(&[12], &[1], &[12]),
        );
        assert!(ok.is_ok());
        let bad = verify_range(
            RindIndex::Core,
            &[],
            Selection::new(&[4, 3], &[1, 1], &[4, 3]),
            Selection::new(&[11], &[1], &[11]),
        );
        assert!(matches!(bad, Err(TreeError::RangeInvalid { .. })));
    }

    #[test]
    fn rank_mismatch_rejected() {
        let err = verify_range(
            RindIndex::Core,
            &[],
            Selection::new(&[4, 3], &[1], &[4]),
            Selection::new(&[4], &[1], &[4]),
        );
        assert!(matches!(err, Err(TreeError::RangeInvalid { .. })));
    }

    proptest! {
        #[test]
        fn count_matches_block_product(
            extent in 1usize..20,
            a in 1i64..20,
            b in 1i64..20,
        ) {
            let (lo, hi) = (a.min(b), a.max(b));
            prop_assume!(hi <= extent as i64);
            let n = (hi - lo + 1) as usize;
            let v = verify_range(
                RindIndex::Zero,
                &[],
                Selection::new(&[extent], &[lo], &[hi]),
                Selection::new(&[n], &[1], &[n as i64]),
            ).unwrap();
            prop_assert_eq!(v.count, n);
            prop_assert_eq!(v.file_full, lo == 1 && hi == extent as i64);
            prop_assert!(v.memory_full);
        }
    }
}
