//! User-defined data.

use meshtree_core::GridLocation;

use crate::feature::{AdditionalFamilyName, DataArray};
use crate::header::{impl_named, Header, Meta};
use crate::ptset::PointSet;

/// A free-form container of arrays, nestable to any depth.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserDefinedData {
    /// Identity.
    pub header: Header,
    /// Location of the arrays.
    pub location: Option<GridLocation>,
    /// Point set the arrays apply to.
    pub ptset: Option<PointSet>,
    /// Family reference.
    pub family: Option<String>,
    /// Additional family references.
    pub additional_families: Vec<AdditionalFamilyName>,
    /// Ordinal.
    pub ordinal: Option<i32>,
    /// Arrays.
    pub arrays: Vec<DataArray>,
    /// Descriptors, data class, units and nested user data.
    pub meta: Meta,
}

impl UserDefinedData {
    /// An empty container named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            header: Header::new(name),
            ..Self::default()
        }
    }
}

impl_named!(UserDefinedData);
