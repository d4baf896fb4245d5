//! meshtree: a typed persistence layer for hierarchical CFD mesh and
//! solution trees.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all meshtree sub-crates. For most users, adding `meshtree` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use meshtree::prelude::*;
//!
//! let mut store = MemoryStore::new(BackendFlavor::Modern);
//!
//! // Write a 2-D structured block with one coordinate array.
//! let mut s = Session::open(&mut store, "demo.cgns", FileMode::Write, SessionConfig::default()).unwrap();
//! s.base_write("Base", 2, 2).unwrap();
//! s.zone_write(1, "Block", ZoneType::Structured, &[3, 2, 2, 1, 0, 0]).unwrap();
//! s.coord_write(1, 1, "CoordinateX", Data::R8(vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0])).unwrap();
//! s.goto(1, &[(Label::Zone, Selector::Index(1))]).unwrap();
//! s.descriptor_write("Origin", "written by the quick start").unwrap();
//! s.close().unwrap();
//!
//! // Read it back as single precision.
//! let mut s = Session::open(&mut store, "demo.cgns", FileMode::Read, SessionConfig::default()).unwrap();
//! let x = s.coord_read(1, 1, "CoordinateX", DataType::Float32).unwrap();
//! assert_eq!(x, Data::R4(vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0]));
//! s.gopath("/Base/Block").unwrap();
//! assert_eq!(s.descriptor_count().unwrap(), 1);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `meshtree-core` | data buffers, labels, enumerations, versions, errors |
//! | [`store`] | `meshtree-store` | the node store contract and the in-memory backend |
//! | [`array`] | `meshtree-array` | range verification, block transfers, array sizing |
//! | [`model`] | `meshtree-model` | entity records, the relation table, typed entity handles |
//! | [`cursor`] | `meshtree-cursor` | navigation cursor and feature addressing |
//! | [`io`] | `meshtree-io` | sessions, read and write engines, upgrades, links |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Shared vocabulary (`meshtree-core`).
///
/// Data buffers ([`types::Data`]) and their conversions, schema labels,
/// named enumerations, file versions and the error types.
pub use meshtree_core as types;

/// Node storage (`meshtree-store`).
///
/// The [`store::NodeStore`] contract every backend implements, and
/// [`store::MemoryStore`], a multi-file in-memory backend.
pub use meshtree_store as store;

/// Generic array I/O (`meshtree-array`).
pub use meshtree_array as array;

/// Entity records (`meshtree-model`).
///
/// One record type per entity kind, plus [`model::EntityMut`] for
/// kind-independent access and the parent/child relation table.
pub use meshtree_model as model;

/// Navigation (`meshtree-cursor`).
pub use meshtree_cursor as cursor;

/// Sessions (`meshtree-io`).
///
/// [`io::Session`] is the entry point for opening, reading, editing and
/// closing files.
pub use meshtree_io as io;

/// Common imports for typical meshtree usage.
///
/// ```rust
/// use meshtree::prelude::*;
/// ```
pub mod prelude {
    // Vocabulary
    pub use meshtree_core::{
        BCType, Data, DataType, ElementType, FileMode, FileVersion, GridLocation, Label, Link,
        PointSetType, ZoneType,
    };

    // Errors
    pub use meshtree_core::{StoreError, TreeError};

    // Storage
    pub use meshtree_store::{BackendFlavor, MemoryStore, NodeStore};

    // Model
    pub use meshtree_model::{Base, DataArray, File, Header, Selector, Zone};

    // Sessions
    pub use meshtree_io::{IndexWidth, RindIndex, Selection, Session, SessionConfig};
}
