//! Error types shared by every layer.
//!
//! [`StoreError`] is what a node store reports; [`TreeError`] is what the
//! registry, array, cursor and engine layers report, wrapping store errors
//! unchanged.

use crate::id::NodeId;
use crate::label::Label;

/// Errors reported by a node store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The handle does not name a live node.
    #[error("no node with handle {0}")]
    NoSuchNode(NodeId),
    /// No file with this name exists in the store.
    #[error("no file named '{0}'")]
    NoSuchFile(String),
    /// The file is already open.
    #[error("file '{0}' is already open")]
    FileOpen(String),
    /// A sibling with this name already exists.
    #[error("node {parent} already has a child named '{name}'")]
    NameExists {
        /// Parent handle.
        parent: NodeId,
        /// Colliding name.
        name: String,
    },
    /// A buffer does not match the node's declared extents.
    #[error("node {node}: {detail}")]
    ShapeMismatch {
        /// Node being transferred.
        node: NodeId,
        /// What did not match.
        detail: String,
    },
    /// The backend cannot perform the requested type conversion.
    #[error("node {node}: backend cannot convert {from} to {to} during transfer")]
    Conversion {
        /// Node being transferred.
        node: NodeId,
        /// Source element type code.
        from: &'static str,
        /// Destination element type code.
        to: &'static str,
    },
    /// A link target could not be found.
    #[error("link target '{file}:{path}' not found")]
    LinkUnresolved {
        /// Target file.
        file: String,
        /// Target path.
        path: String,
    },
    /// A chain of links exceeded the configured depth.
    #[error("link chain deeper than {limit} at node {node}")]
    LinkDepth {
        /// Node where resolution stopped.
        node: NodeId,
        /// The configured limit.
        limit: usize,
    },
    /// A mutation was attempted on a file opened read-only.
    #[error("file '{0}' is open read-only")]
    ReadOnly(String),
    /// The operation would detach or re-parent a root node.
    #[error("operation not permitted on root node {0}")]
    RootNode(NodeId),
}

/// Errors reported above the node store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// Stored content does not match the schema for its label.
    #[error("schema violation in {label} '{name}': {detail}")]
    SchemaViolation {
        /// Label of the offending node.
        label: Label,
        /// Name of the offending node.
        name: String,
        /// What was wrong.
        detail: String,
    },
    /// A singleton relation appears twice, or a named child collides.
    #[error("duplicate {label} '{name}'")]
    DuplicateChild {
        /// Label of the duplicated child.
        label: Label,
        /// Name of the duplicated child.
        name: String,
    },
    /// A requested index, name, or feature does not exist.
    #[error("not found: {what}")]
    NotFound {
        /// Description of what was requested.
        what: String,
    },
    /// A navigation step names a relation the current entity does not have.
    #[error("incorrect path: {from} has no {requested} children")]
    IncorrectPath {
        /// Label of the current entity.
        from: Label,
        /// The requested child label or feature.
        requested: String,
    },
    /// The node store failed.
    #[error("store: {0}")]
    Store(#[from] StoreError),
    /// A partial-array request is out of bounds or size-mismatched.
    #[error("invalid range: {detail}")]
    RangeInvalid {
        /// What was wrong with the range.
        detail: String,
    },
    /// A node name is not legal.
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// The target lies inside a linked subtree and cannot be restructured.
    #[error("'{name}' is inside a link and cannot be modified structurally")]
    InsideLink {
        /// Name of the entity inside the link.
        name: String,
    },
    /// The operation is not permitted in the file's open mode.
    #[error("operation requires {required} mode, file is open in {actual} mode")]
    ModeViolation {
        /// Mode(s) the operation needs.
        required: &'static str,
        /// Mode the file was opened in.
        actual: &'static str,
    },
    /// The cursor stack is full.
    #[error("cursor depth limit of {limit} exceeded")]
    DepthExceeded {
        /// The depth limit.
        limit: usize,
    },
    /// A cursor operation was attempted before the cursor was set.
    #[error("cursor is not positioned")]
    NoCursor,
    /// Session configuration is invalid.
    #[error("configuration: {0}")]
    Config(String),
}

impl TreeError {
    /// Shorthand for a [`TreeError::SchemaViolation`].
    pub fn schema(label: Label, name: &str, detail: impl Into<String>) -> Self {
        TreeError::SchemaViolation {
            label,
            name: name.to_owned(),
            detail: detail.into(),
        }
    }

    /// Shorthand for a [`TreeError::NotFound`].
    pub fn not_found(what: impl Into<String>) -> Self {
        TreeError::NotFound { what: what.into() }
    }

    /// Shorthand for a [`TreeError::RangeInvalid`].
    pub fn range(detail: impl Into<String>) -> Self {
        TreeError::RangeInvalid {
            detail: detail.into(),
        }
    }

    /// Whether the error means "absent" rather than "broken".
    pub fn is_not_found(&self) -> bool {
        matches!(self, TreeError::NotFound { .. })
    }
}
