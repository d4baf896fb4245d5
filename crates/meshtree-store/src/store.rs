//! The node store contract.

use meshtree_core::{Data, DataType, Dims, FileMode, Link, NodeId, StoreError};

use crate::hyperslab::Hyperslab;

/// Which physical container family a store emulates.
///
/// The two families differ in one observable way: a
/// [`Modern`](BackendFlavor::Modern) store converts element types during
/// any transfer, while a [`Legacy`](BackendFlavor::Legacy) store only moves
/// data whose buffer type equals the stored type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendFlavor {
    /// Array-database container without in-flight conversion.
    Legacy,
    /// HDF5-style container with in-flight conversion.
    Modern,
}

/// A hierarchical store of named, labelled, typed, dimensioned nodes.
///
/// Nodes form one tree per file; every node has a name unique among its
/// siblings, a label, a datatype, extents, and optionally data. Arrays are
/// column-major. Link nodes are resolved transparently by every accessor
/// except [`name`](NodeStore::name), [`is_link`](NodeStore::is_link),
/// [`link_target`](NodeStore::link_target), [`set_name`](NodeStore::set_name),
/// [`move_node`](NodeStore::move_node) and
/// [`delete_node`](NodeStore::delete_node), which act on the link node
/// itself.
pub trait NodeStore {
    /// The container family this store emulates.
    fn flavor(&self) -> BackendFlavor;

    /// Open (or, in write mode, create) a file and return its root node.
    fn open_file(&mut self, name: &str, mode: FileMode) -> Result<NodeId, StoreError>;

    /// Close a file previously opened with [`open_file`](NodeStore::open_file).
    fn close_file(&mut self, root: NodeId) -> Result<(), StoreError>;

    /// Create an empty (`MT`, rank 0, unlabelled) child of `parent`.
    fn create_node(&mut self, parent: NodeId, name: &str) -> Result<NodeId, StoreError>;

    /// Set a node's label.
    fn set_label(&mut self, node: NodeId, label: &str) -> Result<(), StoreError>;

    /// Set a node's datatype and extents, discarding any data.
    fn set_dimensions(
        &mut self,
        node: NodeId,
        dtype: DataType,
        dims: &[usize],
    ) -> Result<(), StoreError>;

    /// Replace all of a node's data.
    fn write_all(&mut self, node: NodeId, data: &Data) -> Result<(), StoreError>;

    /// Write the memory block `mem` of a buffer with extents `mem_dims` into
    /// the file block `file` of the node.
    fn write_range(
        &mut self,
        node: NodeId,
        file: &Hyperslab,
        mem_dims: &[usize],
        mem: &Hyperslab,
        data: &Data,
    ) -> Result<(), StoreError>;

    /// Read all of a node's data as `dtype`. `None` for an `MT` node.
    fn read_all(&self, node: NodeId, dtype: DataType) -> Result<Option<Data>, StoreError>;

    /// Read the file block `file` of the node into the memory block `mem`
    /// of `out`, whose extents are `mem_dims`. The element type of `out`
    /// is the memory type.
    fn read_range(
        &self,
        node: NodeId,
        file: &Hyperslab,
        mem_dims: &[usize],
        mem: &Hyperslab,
        out: &mut Data,
    ) -> Result<(), StoreError>;

    /// The node's own name.
    fn name(&self, node: NodeId) -> Result<String, StoreError>;

    /// The node's label.
    fn label(&self, node: NodeId) -> Result<String, StoreError>;

    /// The node's datatype.
    fn data_type(&self, node: NodeId) -> Result<DataType, StoreError>;

    /// The node's extents.
    fn dimensions(&self, node: NodeId) -> Result<Dims, StoreError>;

    /// Number of children.
    fn number_of_children(&self, node: NodeId) -> Result<usize, StoreError>;

    /// Child handles in store order.
    fn child_ids(&self, node: NodeId) -> Result<Vec<NodeId>, StoreError>;

    /// Whether the node itself is a link.
    fn is_link(&self, node: NodeId) -> Result<bool, StoreError>;

    /// The link target, if the node is a link.
    fn link_target(&self, node: NodeId) -> Result<Option<Link>, StoreError>;

    /// Create a link node under `parent`.
    fn create_link(
        &mut self,
        parent: NodeId,
        name: &str,
        target: &Link,
    ) -> Result<NodeId, StoreError>;

    /// Re-parent a node, keeping its name.
    fn move_node(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), StoreError>;

    /// Rename a node in place.
    fn set_name(&mut self, node: NodeId, name: &str) -> Result<(), StoreError>;

    /// Delete a node and its whole subtree. Link targets are untouched.
    fn delete_node(&mut self, node: NodeId) -> Result<(), StoreError>;

    // ── Provided ──────────────────────────────────────────────────

    /// Bound the number of links followed while resolving a node. Stores
    /// without links ignore it.
    fn set_link_depth_limit(&mut self, _limit: usize) {}

    /// Children of `parent` whose label is `label`, in store order.
    fn children_with_label(&self, parent: NodeId, label: &str) -> Result<Vec<NodeId>, StoreError> {
        let mut found = Vec::new();
        for child in self.child_ids(parent)? {
            if self.label(child)? == label {
                found.push(child);
            }
        }
        Ok(found)
    }

    /// The child of `parent` named `name`, if any.
    fn child_by_name(&self, parent: NodeId, name: &str) -> Result<Option<NodeId>, StoreError> {
        for child in self.child_ids(parent)? {
            if self.name(child)? == name {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Create a labelled child and, when `data` is given, size and fill it.
    ///
    /// Without data the node is `MT`. With data, `dims` must describe the
    /// buffer's element count.
    fn create_data_node(
        &mut self,
        parent: NodeId,
        name: &str,
        label: &str,
        dims: &[usize],
        data: Option<&Data>,
    ) -> Result<NodeId, StoreError> {
        let node = self.create_node(parent, name)?;
        self.set_label(node, label)?;
        if let Some(data) = data {
            self.set_dimensions(node, data.data_type(), dims)?;
            self.write_all(node, data)?;
        }
        Ok(node)
    }
}
