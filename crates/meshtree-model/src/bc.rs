//! Boundary conditions.

use meshtree_core::{AreaType, BCDataType, BCType, GridLocation, WallFunctionType};

use crate::feature::{AdditionalFamilyName, DataArray};
use crate::header::{impl_named, Header, Meta};
use crate::physics::ReferenceState;
use crate::ptset::{DataSetPoints, PointSet};

/// The boundary conditions of one zone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneBC {
    /// Identity (named `ZoneBC`).
    pub header: Header,
    /// Boundary conditions.
    pub bcs: Vec<BC>,
    /// Reference state.
    pub state: Option<ReferenceState>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl ZoneBC {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "ZoneBC";

    /// An empty container.
    pub fn new() -> Self {
        Self {
            header: Header::new(Self::NODE_NAME),
            ..Self::default()
        }
    }
}

/// One boundary condition patch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BC {
    /// Identity.
    pub header: Header,
    /// Boundary condition type.
    pub bc_type: BCType,
    /// The patch.
    pub ptset: Option<PointSet>,
    /// Location of the patch indices.
    pub location: Option<GridLocation>,
    /// Inward normal index (structured zones).
    pub normal_index: Option<Vec<i32>>,
    /// Inward normal vectors, one per patch entity.
    pub normal_list: Option<DataArray>,
    /// Family reference.
    pub family: Option<String>,
    /// Additional family references.
    pub additional_families: Vec<AdditionalFamilyName>,
    /// Datasets.
    pub datasets: Vec<BCDataSet>,
    /// Properties.
    pub property: Option<BCProperty>,
    /// Reference state.
    pub state: Option<ReferenceState>,
    /// Ordinal.
    pub ordinal: Option<i32>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl BC {
    /// Name of the inward normal index node.
    pub const NORMAL_INDEX_NODE: &'static str = "InwardNormalIndex";
    /// Name of the inward normal list node.
    pub const NORMAL_LIST_NODE: &'static str = "InwardNormalList";

    /// A boundary condition of `bc_type` over `ptset`.
    pub fn new(name: impl Into<String>, bc_type: BCType, ptset: PointSet) -> Self {
        Self {
            header: Header::new(name),
            bc_type,
            ptset: Some(ptset),
            ..Self::default()
        }
    }

    /// Effective location.
    pub fn location(&self) -> GridLocation {
        self.location.unwrap_or(GridLocation::Vertex)
    }
}

/// Boundary data for part or all of a boundary condition patch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BCDataSet {
    /// Identity.
    pub header: Header,
    /// Boundary condition type.
    pub bc_type: BCType,
    /// Dirichlet data.
    pub dirichlet: Option<BCData>,
    /// Neumann data.
    pub neumann: Option<BCData>,
    /// Own point set or the parent's.
    pub ptset: DataSetPoints,
    /// Location of the dataset's own point set.
    pub location: Option<GridLocation>,
    /// Reference state.
    pub state: Option<ReferenceState>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl BCDataSet {
    /// A dataset of `bc_type` using the parent's patch.
    pub fn new(name: impl Into<String>, bc_type: BCType) -> Self {
        Self {
            header: Header::new(name),
            bc_type,
            ..Self::default()
        }
    }

    /// The data block of `kind`.
    pub fn data(&self, kind: BCDataType) -> Option<&BCData> {
        match kind {
            BCDataType::Dirichlet => self.dirichlet.as_ref(),
            BCDataType::Neumann => self.neumann.as_ref(),
            _ => None,
        }
    }

    /// The data block slot of `kind`.
    pub fn data_slot(&mut self, kind: BCDataType) -> Option<&mut Option<BCData>> {
        match kind {
            BCDataType::Dirichlet => Some(&mut self.dirichlet),
            BCDataType::Neumann => Some(&mut self.neumann),
            _ => None,
        }
    }
}

/// Dirichlet or Neumann data arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BCData {
    /// Identity (`DirichletData` or `NeumannData`).
    pub header: Header,
    /// Arrays.
    pub arrays: Vec<DataArray>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl BCData {
    /// Node name of the data block for `kind`.
    pub fn node_name(kind: BCDataType) -> Option<&'static str> {
        match kind {
            BCDataType::Dirichlet => Some("DirichletData"),
            BCDataType::Neumann => Some("NeumannData"),
            _ => None,
        }
    }

    /// Kind of data a block holds, from its node name.
    pub fn kind_of(name: &str) -> Option<BCDataType> {
        match name {
            "DirichletData" => Some(BCDataType::Dirichlet),
            "NeumannData" => Some(BCDataType::Neumann),
            _ => None,
        }
    }
}

/// Extra properties of a boundary condition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BCProperty {
    /// Identity (named `BCProperty`).
    pub header: Header,
    /// Wall function.
    pub wall_function: Option<WallFunction>,
    /// Bleed or capture area.
    pub area: Option<Area>,
    /// Descriptors and user data.
    pub meta: Meta,
}

impl BCProperty {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "BCProperty";
}

/// Wall function property.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WallFunction {
    /// Identity (named `WallFunction`).
    pub header: Header,
    /// Wall function type.
    pub function_type: WallFunctionType,
    /// Descriptors and user data.
    pub meta: Meta,
}

impl WallFunction {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "WallFunction";
    /// Name of the type node.
    pub const TYPE_NODE: &'static str = "WallFunctionType";
}

/// Area property.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Area {
    /// Identity (named `Area`).
    pub header: Header,
    /// Area type.
    pub area_type: AreaType,
    /// `SurfaceArea` and `RegionName` arrays.
    pub arrays: Vec<DataArray>,
    /// Descriptors and user data.
    pub meta: Meta,
}

impl Area {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "Area";
    /// Name of the type node.
    pub const TYPE_NODE: &'static str = "AreaType";
}

impl_named!(ZoneBC, BC, BCDataSet, BCData, BCProperty, WallFunction, Area);

#[cfg(test)]
mod tests {
    use super::*;
    use meshtree_core::PointSetType;

    #[test]
    fn dataset_inherits_parent_points() {
        let bc = BC::new(
            "Wall",
            BCType::BCWall,
            PointSet::range(PointSetType::PointRange, &[1, 1], &[5, 1]),
        );
        let ds = BCDataSet::new("WallData", BCType::BCWall);
        let pts = ds.ptset.resolve(bc.ptset.as_ref());
        assert_eq!(pts.map(|p| p.size_of_patch), Some(5));
    }

    #[test]
    fn data_block_names() {
        assert_eq!(BCData::node_name(BCDataType::Neumann), Some("NeumannData"));
        assert_eq!(BCData::kind_of("DirichletData"), Some(BCDataType::Dirichlet));
        assert_eq!(BCData::kind_of("Other"), None);
    }
}
