//! Session configuration, validation, and error types.
//!
//! [`SessionConfig`] is the input to [`Session::open`](crate::Session::open).
//! [`validate()`](SessionConfig::validate) checks it before any store call
//! is made.

use meshtree_array::RindIndex;
use meshtree_core::{DataType, TreeError};
use meshtree_model::fitting_index_type;

// ── IndexWidth ─────────────────────────────────────────────────────

/// Integer width used for index data created by the convenience writers
/// (zone sizes, element ranges, connectivity, point sets).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum IndexWidth {
    /// `I4` when every value fits, else `I8`.
    #[default]
    Auto,
    /// Always `I4`.
    I4,
    /// Always `I8`.
    I8,
}

impl IndexWidth {
    /// The datatype to store `values` with.
    pub fn data_type(self, values: &[i64]) -> DataType {
        match self {
            IndexWidth::Auto => fitting_index_type(values),
            IndexWidth::I4 => DataType::Int32,
            IndexWidth::I8 => DataType::Int64,
        }
    }
}

// ── SessionConfig ──────────────────────────────────────────────────

/// Smallest accepted link depth limit.
pub const MIN_LINK_DEPTH: usize = 1;
/// Largest accepted link depth limit.
pub const MAX_LINK_DEPTH: usize = 100;

/// Per-session settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// How rind planes are addressed in partial-array requests.
    /// Default: [`RindIndex::Core`].
    pub rind_index: RindIndex,
    /// Width of index data created by convenience writers. Default: `Auto`.
    pub index_width: IndexWidth,
    /// Maximum chain of links followed when resolving a node. Default: 20.
    pub link_depth_limit: usize,
    /// In modify mode, write upgraded legacy representations back to the
    /// file. Default: true.
    pub rewrite_upgrades: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rind_index: RindIndex::Core,
            index_width: IndexWidth::Auto,
            link_depth_limit: 20,
            rewrite_upgrades: true,
        }
    }
}

impl SessionConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_LINK_DEPTH..=MAX_LINK_DEPTH).contains(&self.link_depth_limit) {
            return Err(ConfigError::LinkDepthOutOfRange {
                value: self.link_depth_limit,
            });
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected by [`SessionConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `link_depth_limit` is outside `1..=100`.
    #[error("link_depth_limit {value} is outside {MIN_LINK_DEPTH}..={MAX_LINK_DEPTH}")]
    LinkDepthOutOfRange {
        /// The rejected value.
        value: usize,
    },
}

impl From<ConfigError> for TreeError {
    fn from(e: ConfigError) -> Self {
        TreeError::Config(e.to_string())
    }
}
