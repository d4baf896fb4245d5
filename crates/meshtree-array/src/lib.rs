//! Generic array I/O for the meshtree persistence layer.
//!
//! - [`verify_range`] validates a (file block, memory block) request and
//!   translates it into store-relative hyperslabs, honouring rind planes
//!   under either [`RindIndex`] convention
//! - [`general_read`] / [`general_write`] move data through a verified
//!   range with backend-appropriate type conversion
//! - [`read_full`] / [`write_full`] move whole arrays the same way
//! - [`data_size`] derives an array's extents from its zone and location

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod range;
pub mod size;
pub mod transfer;

pub use range::{verify_range, RindIndex, Selection, VerifiedRange};
pub use size::{check_location, data_size};
pub use transfer::{general_read, general_write, read_full, write_full};
