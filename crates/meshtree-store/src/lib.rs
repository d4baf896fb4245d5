//! Hierarchical node store for the meshtree persistence layer.
//!
//! The persistence engine never touches bytes directly. Everything it
//! stores goes through the [`NodeStore`] trait: create, label, size,
//! read, write, link, move, rename and delete of named nodes.
//!
//! [`MemoryStore`] is a complete in-memory implementation that can emulate
//! either container family ([`BackendFlavor`]); it backs the test suites
//! and benchmarks and serves embedders that want an in-process tree.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod hyperslab;
pub mod memory;
pub mod store;

pub use hyperslab::{Hyperslab, SlabOffsets};
pub use memory::{MemoryStore, DEFAULT_LINK_DEPTH};
pub use store::{BackendFlavor, NodeStore};
