//! Grid connectivity between zones.

use meshtree_core::{AverageInterfaceType, GridConnectivityType, GridLocation};

use crate::feature::DataArray;
use crate::header::{impl_named, Header, Meta};
use crate::ptset::PointSet;

/// The connectivity container of one zone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneGridConnectivity {
    /// Identity (conventionally `ZoneGridConnectivity`).
    pub header: Header,
    /// One-to-one interfaces.
    pub one_to_one: Vec<GridConnectivity1to1>,
    /// General interfaces.
    pub general: Vec<GridConnectivity>,
    /// Overset holes.
    pub holes: Vec<OversetHoles>,
    /// Descriptors and user data.
    pub meta: Meta,
}

impl ZoneGridConnectivity {
    /// Conventional node name.
    pub const NODE_NAME: &'static str = "ZoneGridConnectivity";

    /// An empty container.
    pub fn new() -> Self {
        Self {
            header: Header::new(Self::NODE_NAME),
            ..Self::default()
        }
    }
}

/// A point-matched interface between two structured zones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridConnectivity1to1 {
    /// Identity.
    pub header: Header,
    /// Donor zone name.
    pub donor: String,
    /// Index transform (`±1..=±index_dim` per axis).
    pub transform: Vec<i32>,
    /// Receiver range.
    pub range: PointSet,
    /// Donor range.
    pub donor_range: PointSet,
    /// Properties.
    pub property: Option<GridConnectivityProperty>,
    /// Ordinal.
    pub ordinal: Option<i32>,
    /// Descriptors and user data.
    pub meta: Meta,
}

impl GridConnectivity1to1 {
    /// Name of the transform node.
    pub const TRANSFORM_NODE: &'static str = "Transform";

    /// Whether every transform entry is a signed axis number without
    /// repeats.
    pub fn transform_is_valid(&self) -> bool {
        let n = self.transform.len() as i32;
        let mut seen = vec![false; self.transform.len()];
        self.transform.iter().all(|&t| {
            let axis = t.unsigned_abs() as usize;
            if t == 0 || t.abs() > n || seen[axis - 1] {
                return false;
            }
            seen[axis - 1] = true;
            true
        })
    }
}

/// A general (abutting, overset or point-matched) interface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridConnectivity {
    /// Identity.
    pub header: Header,
    /// Donor zone name.
    pub donor: String,
    /// Connectivity type (overset when absent).
    pub connectivity_type: Option<GridConnectivityType>,
    /// Location of the receiver points.
    pub location: Option<GridLocation>,
    /// Receiver points.
    pub ptset: Option<PointSet>,
    /// Donor points.
    pub donor_ptset: Option<PointSet>,
    /// Interpolation factors.
    pub interpolants: Vec<DataArray>,
    /// Properties.
    pub property: Option<GridConnectivityProperty>,
    /// Ordinal.
    pub ordinal: Option<i32>,
    /// Descriptors and user data.
    pub meta: Meta,
}

impl GridConnectivity {
    /// Name of the connectivity type node.
    pub const TYPE_NODE: &'static str = "GridConnectivityType";

    /// Effective connectivity type.
    pub fn connectivity_type(&self) -> GridConnectivityType {
        self.connectivity_type.unwrap_or(GridConnectivityType::Overset)
    }
}

/// Interface properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridConnectivityProperty {
    /// Identity (named `GridConnectivityProperty`).
    pub header: Header,
    /// Periodic interface.
    pub periodic: Option<Periodic>,
    /// Averaging interface.
    pub average: Option<AverageInterface>,
    /// Descriptors and user data.
    pub meta: Meta,
}

impl GridConnectivityProperty {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "GridConnectivityProperty";
}

/// Periodic interface geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Periodic {
    /// Identity (named `Periodic`).
    pub header: Header,
    /// `RotationCenter`, `RotationAngle` and `Translation`.
    pub arrays: Vec<DataArray>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl Periodic {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "Periodic";
}

/// Averaging interface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AverageInterface {
    /// Identity (named `AverageInterface`).
    pub header: Header,
    /// Averaging type.
    pub interface_type: AverageInterfaceType,
    /// Descriptors and user data.
    pub meta: Meta,
}

impl AverageInterface {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "AverageInterface";
    /// Name of the type node.
    pub const TYPE_NODE: &'static str = "AverageInterfaceType";
}

/// Points blanked by an overset interface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OversetHoles {
    /// Identity.
    pub header: Header,
    /// Location of the points.
    pub location: Option<GridLocation>,
    /// One list, or any number of ranges.
    pub ptsets: Vec<PointSet>,
    /// Descriptors and user data.
    pub meta: Meta,
}

impl OversetHoles {
    /// Total number of blanked entities.
    pub fn point_count(&self) -> usize {
        self.ptsets.iter().map(|p| p.size_of_patch).sum()
    }
}

impl_named!(
    ZoneGridConnectivity,
    GridConnectivity1to1,
    GridConnectivity,
    GridConnectivityProperty,
    Periodic,
    AverageInterface,
    OversetHoles,
);
