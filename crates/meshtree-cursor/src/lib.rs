//! Navigation cursor ("goto") over a live entity tree.
//!
//! A [`Cursor`] is a bounded stack of frames, one per step from a base
//! down to the current entity. It holds names rather than borrows, so the
//! tree can be mutated between steps; [`Cursor::resolve`] walks the frames
//! again to produce a typed [`EntityMut`](meshtree_model::EntityMut) and
//! the [`TraversalContext`](meshtree_model::TraversalContext) in force
//! there.
//!
//! [`address_single`] and [`address_multiple`] apply the read/write
//! multiplicity rules to one feature slot of the current entity.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod address;
pub mod cursor;

pub use address::{address_multiple, address_single, Access, AddressCtx, Addressed};
pub use cursor::{Cursor, Frame, Resolved};
