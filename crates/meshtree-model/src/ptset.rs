//! Point sets: index ranges and index lists.

use meshtree_core::{DataType, Label, NamedEnum, PointSetType};

use crate::header::{impl_named, Header};

/// The narrowest index type that holds every value.
pub fn fitting_index_type(values: &[i64]) -> DataType {
    if values
        .iter()
        .all(|&v| v >= i32::MIN as i64 && v <= i32::MAX as i64)
    {
        DataType::Int32
    } else {
        DataType::Int64
    }
}

/// A subset of mesh points, cells or elements.
///
/// Range kinds store two corners (`npts == 2`); list kinds store `npts`
/// explicit indices. Points are column-major `[index_dim, npts]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointSet {
    /// Identity; normally named after the kind (`PointRange`, ...).
    pub header: Header,
    /// Which kind of set this is.
    pub kind: PointSetType,
    /// Stored index type (`I4` or `I8`).
    pub data_type: DataType,
    /// Number of indices per point.
    pub index_dim: usize,
    /// Number of stored points (2 for ranges).
    pub npts: usize,
    /// Number of mesh entities the set describes.
    pub size_of_patch: usize,
    /// The indices.
    pub points: Vec<i64>,
}

impl PointSet {
    /// A range set between inclusive corners `min` and `max`.
    pub fn range(kind: PointSetType, min: &[i64], max: &[i64]) -> Self {
        let mut points = min.to_vec();
        points.extend_from_slice(max);
        Self::new(kind, min.len(), points)
    }

    /// A list set of `points.len() / index_dim` points.
    pub fn list(kind: PointSetType, index_dim: usize, points: Vec<i64>) -> Self {
        Self::new(kind, index_dim, points)
    }

    fn new(kind: PointSetType, index_dim: usize, points: Vec<i64>) -> Self {
        let npts = if index_dim == 0 { 0 } else { points.len() / index_dim };
        let data_type = fitting_index_type(&points);
        let mut set = Self {
            header: Header::new(kind.name()),
            kind,
            data_type,
            index_dim,
            npts,
            size_of_patch: 0,
            points,
        };
        set.refresh_patch_size();
        set
    }

    /// Recompute [`size_of_patch`](Self::size_of_patch) from the points.
    ///
    /// For lists it equals `npts`; for ranges it is the product over axes
    /// of the inclusive span of the two corners.
    pub fn refresh_patch_size(&mut self) {
        self.size_of_patch = Self::patch_size(self.kind, self.index_dim, self.npts, &self.points);
    }

    /// Patch size of a set with these contents.
    pub fn patch_size(kind: PointSetType, index_dim: usize, npts: usize, points: &[i64]) -> usize {
        if kind.is_range() {
            if points.len() < 2 * index_dim || index_dim == 0 {
                return 0;
            }
            (0..index_dim)
                .map(|i| (points[index_dim + i] - points[i]).unsigned_abs() as usize + 1)
                .product()
        } else {
            npts
        }
    }

    /// The label a set of this kind is stored under.
    pub fn label(&self) -> Label {
        if self.kind.is_range() {
            Label::IndexRange
        } else {
            Label::IndexArray
        }
    }

    /// Stored extents `[index_dim, npts]`.
    pub fn dims(&self) -> [usize; 2] {
        [self.index_dim, self.npts]
    }

    /// Lower corner of a range set.
    pub fn min(&self) -> &[i64] {
        &self.points[..self.index_dim.min(self.points.len())]
    }

    /// Upper corner of a range set.
    pub fn max(&self) -> &[i64] {
        let start = self.index_dim.min(self.points.len());
        let end = (2 * self.index_dim).min(self.points.len());
        &self.points[start..end]
    }

    /// Structural problems with the set, if any.
    pub fn check(&self) -> Result<(), String> {
        if self.kind.is_range() && self.npts != 2 {
            return Err(format!("{} must hold 2 points, holds {}", self.kind, self.npts));
        }
        if !self.kind.is_range() && !self.kind.is_list() {
            return Err(format!("{} is not a point set kind", self.kind));
        }
        if self.points.len() != self.index_dim * self.npts {
            return Err(format!(
                "{} holds {} indices, expected {} x {}",
                self.kind,
                self.points.len(),
                self.index_dim,
                self.npts
            ));
        }
        if !self.data_type.is_integer() {
            return Err(format!("{} must be integer, is {}", self.kind, self.data_type));
        }
        Ok(())
    }
}

/// The point set a boundary-condition dataset applies to.
///
/// A dataset without its own set applies to its parent boundary
/// condition's set; that set is borrowed, never copied.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DataSetPoints {
    /// Use the parent boundary condition's point set.
    #[default]
    Inherited,
    /// The dataset's own point set.
    Own(PointSet),
}

impl DataSetPoints {
    /// The owned set, if any.
    pub fn own(&self) -> Option<&PointSet> {
        match self {
            DataSetPoints::Own(p) => Some(p),
            DataSetPoints::Inherited => None,
        }
    }

    /// The effective set given the parent's set.
    pub fn resolve<'a>(&'a self, parent: Option<&'a PointSet>) -> Option<&'a PointSet> {
        match self {
            DataSetPoints::Own(p) => Some(p),
            DataSetPoints::Inherited => parent,
        }
    }
}

impl_named!(PointSet);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn range_patch_is_product_of_spans() {
        let r = PointSet::range(PointSetType::PointRange, &[1, 1, 3], &[5, 4, 3]);
        assert_eq!(r.npts, 2);
        assert_eq!(r.size_of_patch, 5 * 4);
        assert_eq!(r.min(), &[1, 1, 3]);
        assert_eq!(r.max(), &[5, 4, 3]);
        assert_eq!(r.header.name, "PointRange");
        assert_eq!(r.label(), Label::IndexRange);
        assert!(r.check().is_ok());
    }

    #[test]
    fn reversed_donor_range_counts_span() {
        let r = PointSet::range(PointSetType::PointRangeDonor, &[9, 1], &[5, 1]);
        assert_eq!(r.size_of_patch, 5);
    }

    #[test]
    fn list_patch_is_npts() {
        let l = PointSet::list(PointSetType::ElementList, 1, vec![4, 8, 15, 16]);
        assert_eq!(l.size_of_patch, 4);
        assert_eq!(l.label(), Label::IndexArray);
    }

    #[test]
    fn wide_values_select_i8() {
        let l = PointSet::list(PointSetType::PointList, 1, vec![1, 1 << 40]);
        assert_eq!(l.data_type, DataType::Int64);
    }

    #[test]
    fn dataset_points_resolve_to_parent() {
        let parent = PointSet::range(PointSetType::PointRange, &[1], &[4]);
        assert_eq!(DataSetPoints::Inherited.resolve(Some(&parent)), Some(&parent));
        let own = PointSet::list(PointSetType::PointList, 1, vec![2]);
        assert_eq!(
            DataSetPoints::Own(own.clone()).resolve(Some(&parent)),
            Some(&own)
        );
    }

    proptest! {
        #[test]
        fn range_patch_matches_product(
            corners in proptest::collection::vec((1i64..50, 1i64..50), 1..4)
        ) {
            let min: Vec<i64> = corners.iter().map(|c| c.0.min(c.1)).collect();
            let max: Vec<i64> = corners.iter().map(|c| c.0.max(c.1)).collect();
            let expected: usize = min.iter().zip(&max).map(|(a, b)| (b - a + 1) as usize).product();
            let r = PointSet::range(PointSetType::ElementRange, &min, &max);
            prop_assert_eq!(r.size_of_patch, expected);
        }
    }
}
