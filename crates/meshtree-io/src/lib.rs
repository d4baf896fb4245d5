//! Read and write engines for meshtree files.
//!
//! A [`Session`] is one open file: it reads the whole tree at open time
//! (upgrading files written by older library versions), keeps a navigation
//! cursor over it, and writes every change through to the node store.
//!
//! The session API has four layers:
//!
//! - lifecycle: [`Session::open`], [`Session::flush`], [`Session::close`]
//! - convenience writers for the common entities (`base_write`,
//!   `zone_write`, `section_write`, `bc_write`, ...)
//! - cursor navigation (`goto`, `gopath`, `up`) and the feature getters
//!   and setters that act on the entity at the cursor
//! - array I/O, whole or by rind-aware block, at the cursor and on
//!   coordinates and solution fields
//!
//! Links are followed transparently on read; everything reached through a
//! link is read-only from the linking file.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod arrays;
pub mod config;
mod features;
mod link;
mod read;
mod session;
mod upgrade;
mod validate;
mod write;
mod writers;

pub use config::{ConfigError, IndexWidth, SessionConfig, MAX_LINK_DEPTH, MIN_LINK_DEPTH};
pub use meshtree_array::{RindIndex, Selection};
pub use session::Session;
