//! Core types for the meshtree persistence layer.
//!
//! This crate is the leaf of the dependency graph. It defines the shared
//! vocabulary every other crate speaks:
//!
//! - [`NodeId`] handles and [`Dims`] extents
//! - [`DataType`] codes and [`Data`] buffers with numeric conversion
//! - the fixed set of schema [`Label`]s
//! - named enumerations ([`GridLocation`], [`ElementType`], units, ...)
//! - [`FileVersion`] revisions, [`Link`] references and [`FileMode`]
//! - [`StoreError`] and [`TreeError`]

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod datatype;
pub mod element;
pub mod enums;
pub mod error;
pub mod id;
pub mod label;
pub mod link;
pub mod mode;
pub mod name;
pub mod version;

pub use datatype::{convert_element, trim_text, Data, DataType, Element};
pub use element::ElementType;
pub use enums::{
    AngleUnits, ArbitraryGridMotionType, AreaType, AverageInterfaceType, BCDataType, BCType,
    DataClass, ElectricCurrentUnits, GoverningEquationsType, GridConnectivityType, GridLocation,
    LengthUnits, LuminousIntensityUnits, MassUnits, ModelType, NamedEnum, PointSetType,
    RigidGridMotionType, SimulationType, SubstanceAmountUnits, TemperatureUnits, TimeUnits,
    WallFunctionType, ZoneType,
};
pub use error::{StoreError, TreeError};
pub use id::{element_count, Dims, NodeId};
pub use label::Label;
pub use link::Link;
pub use mode::FileMode;
pub use name::{validate_name, MAX_NAME_LEN};
pub use version::{FileVersion, LIBRARY_VERSION};

/// Maximum depth of the navigation cursor stack.
pub const MAX_CURSOR_DEPTH: usize = 20;
