//! Entity registry for meshtree.
//!
//! Every node kind of the on-disk schema has a record here. Records own
//! their children by value, so dropping a subtree frees it completely.
//! A dataset that shares its parent boundary condition's point set says so
//! with [`DataSetPoints::Inherited`] instead of holding a copy.
//!
//! [`schema`] holds the static relation table; [`EntityMut`] is the closed
//! sum over navigable kinds used by the cursor and the engines.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod base;
pub mod bc;
pub mod connectivity;
pub mod context;
pub mod entity;
pub mod feature;
pub mod header;
pub mod physics;
pub mod ptset;
pub mod schema;
pub mod user_data;
pub mod zone;

pub use base::{Base, Family, FamilyBC, File, GeometryReference};
pub use bc::{Area, BCData, BCDataSet, BCProperty, WallFunction, ZoneBC, BC};
pub use connectivity::{
    AverageInterface, GridConnectivity, GridConnectivity1to1, GridConnectivityProperty,
    OversetHoles, Periodic, ZoneGridConnectivity,
};
pub use context::{TraversalContext, ZoneContext};
pub use entity::{pick, pick_one, EntityMut, PtsetSlot, Selector};
pub use feature::{
    AdditionalFamilyName, DataArray, DataConversion, Descriptor, DimensionalExponents,
    DimensionalUnits,
};
pub use header::{Header, Meta, Named};
pub use physics::{
    Axisymmetry, ConvergenceHistory, FlowEquationSet, GoverningEquations, Gravity, Model,
    ReferenceState, RotatingCoordinates,
};
pub use ptset::{fitting_index_type, DataSetPoints, PointSet};
pub use schema::{EntityKind, Multiplicity, Relation};
pub use user_data::UserDefinedData;
pub use zone::{
    ArbitraryGridMotion, BaseIterativeData, DiscreteData, FlowSolution, GridCoordinates,
    IntegralData, RigidGridMotion, Section, Zone, ZoneIterativeData, ZoneSubRegion,
};
