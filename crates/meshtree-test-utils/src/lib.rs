//! Test fixtures for meshtree development.
//!
//! - [`fixtures`]: in-memory trees covering the common entity kinds, ready
//!   to be added to a session and flushed.
//! - [`legacy`]: store-level surgery that turns a freshly written file into
//!   one laid out the way older library versions wrote it.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod legacy;

pub use fixtures::{structured_two_zone, unstructured_mixed};

use meshtree_core::Data;

/// `n` evenly spaced `R8` values starting at `start`.
pub fn ramp(start: f64, n: usize) -> Data {
    Data::R8((0..n).map(|i| start + i as f64).collect())
}
