//! Zones and the data containers they own.

use meshtree_core::{
    ArbitraryGridMotionType, Data, DataType, ElementType, GridLocation, RigidGridMotionType,
    ZoneType,
};

use crate::bc::ZoneBC;
use crate::connectivity::ZoneGridConnectivity;
use crate::feature::{AdditionalFamilyName, DataArray, Descriptor};
use crate::header::{impl_named, Header, Meta};
use crate::physics::{ConvergenceHistory, FlowEquationSet, ReferenceState, RotatingCoordinates};
use crate::ptset::{fitting_index_type, PointSet};

/// A zone: one block of mesh with its solution and metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Zone {
    /// Identity.
    pub header: Header,
    /// Structured or unstructured.
    pub zone_type: ZoneType,
    /// Sizes `[index_dim, 3]` column-major: vertex counts, cell counts,
    /// boundary vertex counts.
    pub sizes: Vec<i64>,
    /// Stored type of the sizes (`I4` or `I8`).
    pub size_type: DataType,
    /// Coordinate containers.
    pub coordinates: Vec<GridCoordinates>,
    /// Family reference.
    pub family: Option<String>,
    /// Additional family references.
    pub additional_families: Vec<AdditionalFamilyName>,
    /// Element sections.
    pub sections: Vec<Section>,
    /// Flow solutions.
    pub solutions: Vec<FlowSolution>,
    /// Discrete data.
    pub discrete: Vec<DiscreteData>,
    /// Integral data.
    pub integrals: Vec<IntegralData>,
    /// Grid connectivity containers.
    pub connectivity: Vec<ZoneGridConnectivity>,
    /// Boundary conditions.
    pub bc: Option<ZoneBC>,
    /// Reference state.
    pub state: Option<ReferenceState>,
    /// Rigid grid motions.
    pub rigid_motions: Vec<RigidGridMotion>,
    /// Arbitrary grid motions.
    pub arbitrary_motions: Vec<ArbitraryGridMotion>,
    /// Iterative data.
    pub iterative: Option<ZoneIterativeData>,
    /// Rotating frame.
    pub rotating: Option<RotatingCoordinates>,
    /// Zone convergence history.
    pub convergence: Option<ConvergenceHistory>,
    /// Flow equation set.
    pub equations: Option<FlowEquationSet>,
    /// Ordinal.
    pub ordinal: Option<i32>,
    /// Sub-regions.
    pub subregions: Vec<ZoneSubRegion>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl Zone {
    /// Name of the zone-type node.
    pub const TYPE_NODE: &'static str = "ZoneType";

    /// A structured zone with the given vertex counts per axis.
    pub fn structured(name: impl Into<String>, vertex: &[i64]) -> Self {
        let mut sizes = vertex.to_vec();
        sizes.extend(vertex.iter().map(|v| v - 1));
        sizes.extend(std::iter::repeat(0).take(vertex.len()));
        Self::with_sizes(name, ZoneType::Structured, sizes)
    }

    /// An unstructured zone.
    pub fn unstructured(name: impl Into<String>, vertices: i64, cells: i64, boundary: i64) -> Self {
        Self::with_sizes(name, ZoneType::Unstructured, vec![vertices, cells, boundary])
    }

    fn with_sizes(name: impl Into<String>, zone_type: ZoneType, sizes: Vec<i64>) -> Self {
        Self {
            header: Header::new(name),
            zone_type,
            size_type: fitting_index_type(&sizes),
            sizes,
            ..Self::default()
        }
    }

    /// Index dimension (1 for unstructured zones).
    pub fn index_dim(&self) -> usize {
        self.sizes.len() / 3
    }

    /// Vertex counts per axis.
    pub fn vertex_size(&self) -> &[i64] {
        &self.sizes[..self.index_dim()]
    }

    /// Cell counts per axis.
    pub fn cell_size(&self) -> &[i64] {
        let n = self.index_dim();
        &self.sizes[n..2 * n]
    }

    /// Boundary vertex counts per axis.
    pub fn boundary_size(&self) -> &[i64] {
        let n = self.index_dim();
        &self.sizes[2 * n..3 * n]
    }

    /// Total number of vertices.
    pub fn vertex_count(&self) -> i64 {
        self.vertex_size().iter().product()
    }
}

/// A coordinate container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridCoordinates {
    /// Identity (conventionally `GridCoordinates`).
    pub header: Header,
    /// Rind planes `[lo0, hi0, lo1, hi1, ...]`.
    pub rind: Option<Vec<i32>>,
    /// Coordinate arrays.
    pub arrays: Vec<DataArray>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl GridCoordinates {
    /// Conventional name of a zone's primary coordinates.
    pub const DEFAULT_NAME: &'static str = "GridCoordinates";

    /// An empty container.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            header: Header::new(name),
            ..Self::default()
        }
    }
}

/// An element section of an unstructured zone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Section {
    /// Identity.
    pub header: Header,
    /// Element type.
    pub element_type: ElementType,
    /// Number of trailing boundary elements (0 if unsorted).
    pub boundary: i32,
    /// First and last element number.
    pub range: [i64; 2],
    /// Node (or face) connectivity.
    pub connectivity: DataArray,
    /// Start offsets into the connectivity, required for variable-length
    /// element types.
    pub offsets: Option<DataArray>,
    /// Parent elements `[N, 2]`.
    pub parent_elements: Option<DataArray>,
    /// Parent face positions `[N, 2]`.
    pub parent_positions: Option<DataArray>,
    /// Rind elements.
    pub rind: Option<Vec<i32>>,
    /// Descriptors and user data.
    pub meta: Meta,
}

impl Section {
    /// Name of the range node.
    pub const RANGE_NODE: &'static str = "ElementRange";
    /// Name of the connectivity array.
    pub const CONNECTIVITY_NODE: &'static str = "ElementConnectivity";
    /// Name of the start-offset array.
    pub const OFFSET_NODE: &'static str = "ElementStartOffset";
    /// Name of the parent-element array.
    pub const PARENT_ELEMENTS_NODE: &'static str = "ParentElements";
    /// Name of the parent-position array.
    pub const PARENT_POSITIONS_NODE: &'static str = "ParentElementsPosition";
    /// Name of the legacy combined parent array.
    pub const LEGACY_PARENT_NODE: &'static str = "ParentData";

    /// A section of elements `start..=end` with the given connectivity and,
    /// for variable-length types, start offsets.
    pub fn new(
        name: impl Into<String>,
        element_type: ElementType,
        start: i64,
        end: i64,
        connectivity: &[i64],
        offsets: Option<&[i64]>,
    ) -> Self {
        let mut all = connectivity.to_vec();
        all.extend(offsets.unwrap_or(&[]));
        all.extend([start, end]);
        let dtype = fitting_index_type(&all);
        Self {
            header: Header::new(name),
            element_type,
            boundary: 0,
            range: [start, end],
            connectivity: DataArray::vector(Self::CONNECTIVITY_NODE, Data::index(connectivity, dtype)),
            offsets: offsets.map(|o| DataArray::vector(Self::OFFSET_NODE, Data::index(o, dtype))),
            parent_elements: None,
            parent_positions: None,
            rind: None,
            meta: Meta::default(),
        }
    }

    /// Number of elements in the section.
    pub fn element_count(&self) -> i64 {
        self.range[1] - self.range[0] + 1
    }

    /// Index type of the section's integer arrays.
    pub fn index_type(&self) -> DataType {
        match self.connectivity.data_type {
            DataType::Int64 => DataType::Int64,
            _ => DataType::Int32,
        }
    }
}

macro_rules! solution_like {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $name {
            /// Identity.
            pub header: Header,
            /// Location of the arrays (vertex when absent).
            pub location: Option<GridLocation>,
            /// Rind planes.
            pub rind: Option<Vec<i32>>,
            /// Point set the arrays are restricted to.
            pub ptset: Option<PointSet>,
            /// Arrays.
            pub arrays: Vec<DataArray>,
            /// Descriptors, data class, units and user data.
            pub meta: Meta,
        }

        impl $name {
            /// An empty container at `location`.
            pub fn new(name: impl Into<String>, location: GridLocation) -> Self {
                Self {
                    header: Header::new(name),
                    location: Some(location),
                    ..Self::default()
                }
            }

            /// Effective location.
            pub fn location(&self) -> GridLocation {
                self.location.unwrap_or(GridLocation::Vertex)
            }
        }
    };
}

solution_like! {
    /// A flow solution.
    FlowSolution
}

solution_like! {
    /// Discrete (non-field) data.
    DiscreteData
}

macro_rules! array_container {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $name {
            /// Identity.
            pub header: Header,
            /// Arrays.
            pub arrays: Vec<DataArray>,
            /// Descriptors, data class, units and user data.
            pub meta: Meta,
        }

        impl $name {
            /// An empty container.
            pub fn new(name: impl Into<String>) -> Self {
                Self {
                    header: Header::new(name),
                    ..Self::default()
                }
            }
        }
    };
}

array_container! {
    /// Integrated quantities.
    IntegralData
}

array_container! {
    /// Per-zone time history.
    ZoneIterativeData
}

/// Per-base time history.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BaseIterativeData {
    /// Identity.
    pub header: Header,
    /// Number of recorded steps.
    pub steps: i32,
    /// Arrays (`TimeValues`, `IterationValues`, ...).
    pub arrays: Vec<DataArray>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl BaseIterativeData {
    /// Iterative data of `steps` steps.
    pub fn new(name: impl Into<String>, steps: i32) -> Self {
        Self {
            header: Header::new(name),
            steps,
            ..Self::default()
        }
    }
}

/// Rigid-body grid motion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RigidGridMotion {
    /// Identity.
    pub header: Header,
    /// Motion type.
    pub motion_type: RigidGridMotionType,
    /// Arrays (`OriginLocation`, `RigidVelocity`, ...).
    pub arrays: Vec<DataArray>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl RigidGridMotion {
    /// A motion of `motion_type`.
    pub fn new(name: impl Into<String>, motion_type: RigidGridMotionType) -> Self {
        Self {
            header: Header::new(name),
            motion_type,
            ..Self::default()
        }
    }
}

/// Deforming grid motion.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArbitraryGridMotion {
    /// Identity.
    pub header: Header,
    /// Motion type.
    pub motion_type: ArbitraryGridMotionType,
    /// Location of the velocity arrays.
    pub location: Option<GridLocation>,
    /// Rind planes.
    pub rind: Option<Vec<i32>>,
    /// Grid velocity arrays.
    pub arrays: Vec<DataArray>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl ArbitraryGridMotion {
    /// A motion of `motion_type`.
    pub fn new(name: impl Into<String>, motion_type: ArbitraryGridMotionType) -> Self {
        Self {
            header: Header::new(name),
            motion_type,
            ..Self::default()
        }
    }
}

/// A sub-region of a zone carrying its own data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneSubRegion {
    /// Identity.
    pub header: Header,
    /// Dimension of the region.
    pub region_dim: i32,
    /// Location of the arrays.
    pub location: Option<GridLocation>,
    /// Rind planes.
    pub rind: Option<Vec<i32>>,
    /// Explicit extent.
    pub ptset: Option<PointSet>,
    /// Name of a boundary condition whose extent is reused.
    pub bc_region: Option<Descriptor>,
    /// Name of a connectivity whose extent is reused.
    pub gc_region: Option<Descriptor>,
    /// Family reference.
    pub family: Option<String>,
    /// Additional family references.
    pub additional_families: Vec<AdditionalFamilyName>,
    /// Arrays.
    pub arrays: Vec<DataArray>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl ZoneSubRegion {
    /// Name of the boundary-condition region descriptor.
    pub const BC_REGION_NODE: &'static str = "BCRegionName";
    /// Name of the connectivity region descriptor.
    pub const GC_REGION_NODE: &'static str = "GridConnectivityRegionName";

    /// An empty sub-region of dimension `region_dim`.
    pub fn new(name: impl Into<String>, region_dim: i32) -> Self {
        Self {
            header: Header::new(name),
            region_dim,
            ..Self::default()
        }
    }

    /// Number of extent specifications present (must be exactly one).
    pub fn extent_sources(&self) -> usize {
        self.ptset.is_some() as usize + self.bc_region.is_some() as usize + self.gc_region.is_some() as usize
    }
}

impl_named!(
    Zone,
    GridCoordinates,
    Section,
    FlowSolution,
    DiscreteData,
    IntegralData,
    ZoneIterativeData,
    BaseIterativeData,
    RigidGridMotion,
    ArbitraryGridMotion,
    ZoneSubRegion,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_sizes_layout() {
        let z = Zone::structured("Block", &[5, 4, 3]);
        assert_eq!(z.index_dim(), 3);
        assert_eq!(z.vertex_size(), &[5, 4, 3]);
        assert_eq!(z.cell_size(), &[4, 3, 2]);
        assert_eq!(z.boundary_size(), &[0, 0, 0]);
        assert_eq!(z.vertex_count(), 60);
        assert_eq!(z.size_type, DataType::Int32);
    }

    #[test]
    fn unstructured_sizes_layout() {
        let z = Zone::unstructured("Tets", 100, 300, 0);
        assert_eq!(z.index_dim(), 1);
        assert_eq!(z.cell_size(), &[300]);
    }

    #[test]
    fn section_picks_index_type() {
        let s = Section::new("Tets", ElementType::Tetra4, 1, 1, &[1, 2, 3, 4], None);
        assert_eq!(s.index_type(), DataType::Int32);
        assert_eq!(s.element_count(), 1);
        let wide = Section::new("Big", ElementType::Bar2, 1, 1, &[1, 1 << 33], None);
        assert_eq!(wide.index_type(), DataType::Int64);
    }

    #[test]
    fn solution_location_defaults_to_vertex() {
        let mut s = FlowSolution::new("Sol", GridLocation::CellCenter);
        assert_eq!(s.location(), GridLocation::CellCenter);
        s.location = None;
        assert_eq!(s.location(), GridLocation::Vertex);
    }
}
