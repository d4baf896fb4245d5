//! The file root, bases and families.

use meshtree_core::{BCType, FileVersion, SimulationType, LIBRARY_VERSION};

use crate::bc::BCDataSet;
use crate::feature::AdditionalFamilyName;
use crate::header::{impl_named, Header, Meta};
use crate::physics::{
    Axisymmetry, ConvergenceHistory, FlowEquationSet, Gravity, ReferenceState,
    RotatingCoordinates,
};
use crate::zone::{BaseIterativeData, IntegralData, Zone};

/// The root of one file's entity tree.
#[derive(Clone, Debug, PartialEq)]
pub struct File {
    /// Identity; the name is the file name and the handle the root node.
    pub header: Header,
    /// Revision the file was written with.
    pub version: FileVersion,
    /// Bases in store order.
    pub bases: Vec<Base>,
}

impl File {
    /// Name of the version node.
    pub const VERSION_NODE: &'static str = "CGNSLibraryVersion";

    /// An empty tree for a new file.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            header: Header::new(name),
            version: LIBRARY_VERSION,
            bases: Vec::new(),
        }
    }

    /// The base named `name`.
    pub fn base(&self, name: &str) -> Option<&Base> {
        self.bases.iter().find(|b| b.header.name == name)
    }
}

/// A simulation base.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Base {
    /// Identity.
    pub header: Header,
    /// Dimension of the cells (1, 2 or 3).
    pub cell_dim: i32,
    /// Dimension of physical space (at least `cell_dim`).
    pub phys_dim: i32,
    /// Reference state.
    pub state: Option<ReferenceState>,
    /// Gravity.
    pub gravity: Option<Gravity>,
    /// Axisymmetry description.
    pub axisymmetry: Option<Axisymmetry>,
    /// Rotating frame.
    pub rotating: Option<RotatingCoordinates>,
    /// Global convergence history.
    pub convergence: Option<ConvergenceHistory>,
    /// Flow equation set.
    pub equations: Option<FlowEquationSet>,
    /// Integral data.
    pub integrals: Vec<IntegralData>,
    /// Simulation type.
    pub simulation: Option<SimulationType>,
    /// Iterative data.
    pub iterative: Option<BaseIterativeData>,
    /// Families.
    pub families: Vec<Family>,
    /// Zones.
    pub zones: Vec<Zone>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl Base {
    /// Name of the simulation-type node.
    pub const SIMULATION_NODE: &'static str = "SimulationType";

    /// An empty base.
    pub fn new(name: impl Into<String>, cell_dim: i32, phys_dim: i32) -> Self {
        Self {
            header: Header::new(name),
            cell_dim,
            phys_dim,
            ..Self::default()
        }
    }

    /// The zone named `name`.
    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.header.name == name)
    }
}

/// A family of mesh entities sharing boundary conditions or geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Family {
    /// Identity.
    pub header: Header,
    /// Family boundary condition.
    pub family_bc: Option<FamilyBC>,
    /// Geometry references.
    pub geometries: Vec<GeometryReference>,
    /// Rotating frame.
    pub rotating: Option<RotatingCoordinates>,
    /// Nested families.
    pub families: Vec<Family>,
    /// Parent family reference.
    pub family: Option<String>,
    /// Additional family references.
    pub additional_families: Vec<AdditionalFamilyName>,
    /// Ordinal.
    pub ordinal: Option<i32>,
    /// Descriptors and user data.
    pub meta: Meta,
}

impl Family {
    /// An empty family.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            header: Header::new(name),
            ..Self::default()
        }
    }
}

/// A boundary condition applied to every member of a family.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FamilyBC {
    /// Identity.
    pub header: Header,
    /// Boundary condition type.
    pub bc_type: BCType,
    /// Datasets.
    pub datasets: Vec<BCDataSet>,
}

impl FamilyBC {
    /// Conventional node name.
    pub const NODE_NAME: &'static str = "FamBC";

    /// A family boundary condition of `bc_type`.
    pub fn new(bc_type: BCType) -> Self {
        Self {
            header: Header::new(Self::NODE_NAME),
            bc_type,
            datasets: Vec::new(),
        }
    }
}

/// A reference into an external CAD geometry file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryReference {
    /// Identity.
    pub header: Header,
    /// Geometry file name.
    pub file: String,
    /// Geometry format name.
    pub format: String,
    /// Names of the referenced geometry entities (parts).
    pub entities: Vec<String>,
    /// Descriptors and user data.
    pub meta: Meta,
}

impl GeometryReference {
    /// Name of the file node.
    pub const FILE_NODE: &'static str = "GeometryFile";
    /// Name of the format node.
    pub const FORMAT_NODE: &'static str = "GeometryFormat";

    /// A reference to `file` in `format`.
    pub fn new(name: impl Into<String>, file: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            header: Header::new(name),
            file: file.into(),
            format: format.into(),
            ..Self::default()
        }
    }
}

impl_named!(File, Base, Family, FamilyBC, GeometryReference);
