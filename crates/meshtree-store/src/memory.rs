//! In-memory node store.
//!
//! [`MemoryStore`] keeps any number of files in a single arena of nodes.
//! Handles are arena slots; a deleted node's slot is never reused, so a
//! stale handle reports [`StoreError::NoSuchNode`] instead of aliasing a
//! newer node.

use indexmap::IndexMap;
use meshtree_core::{element_count, Data, DataType, Dims, FileMode, Link, NodeId, StoreError};
use tracing::{debug, trace};

use crate::hyperslab::Hyperslab;
use crate::store::{BackendFlavor, NodeStore};

/// Default maximum length of a link chain.
pub const DEFAULT_LINK_DEPTH: usize = 20;

#[derive(Clone, Debug)]
struct Node {
    name: String,
    label: String,
    dtype: DataType,
    dims: Dims,
    data: Option<Data>,
    parent: Option<NodeId>,
    children: IndexMap<String, NodeId>,
    link: Option<Link>,
    file: String,
}

#[derive(Clone, Debug)]
struct FileEntry {
    root: NodeId,
    /// `None` while the file is closed.
    mode: Option<FileMode>,
}

/// An in-memory, multi-file node store.
///
/// Files persist across [`close_file`](NodeStore::close_file) and can be
/// reopened, so a store can stand in for a directory of container files.
#[derive(Clone, Debug)]
pub struct MemoryStore {
    flavor: BackendFlavor,
    nodes: Vec<Option<Node>>,
    files: IndexMap<String, FileEntry>,
    link_depth_limit: usize,
}

impl MemoryStore {
    /// An empty store emulating `flavor`.
    pub fn new(flavor: BackendFlavor) -> Self {
        Self {
            flavor,
            nodes: Vec::new(),
            files: IndexMap::new(),
            link_depth_limit: DEFAULT_LINK_DEPTH,
        }
    }

    /// Set the maximum number of links followed while resolving a node.
    pub fn with_link_depth_limit(mut self, limit: usize) -> Self {
        self.link_depth_limit = limit;
        self
    }

    /// Names of every file in the store.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Root node of a file, open or not.
    pub fn root_of(&self, file: &str) -> Option<NodeId> {
        self.files.get(file).map(|f| f.root)
    }

    /// Number of live nodes across all files.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Look up a node by absolute path (`/Base/Zone`) in `file`, following
    /// links along the way.
    pub fn lookup(&self, file: &str, path: &str) -> Result<NodeId, StoreError> {
        let root = self
            .root_of(file)
            .ok_or_else(|| StoreError::NoSuchFile(file.to_owned()))?;
        let mut cur = root;
        for comp in path.split('/').filter(|c| !c.is_empty()) {
            let resolved = self.resolve(cur)?;
            cur = *self
                .node(resolved)?
                .children
                .get(comp)
                .ok_or_else(|| StoreError::LinkUnresolved {
                    file: file.to_owned(),
                    path: path.to_owned(),
                })?;
        }
        Ok(cur)
    }

    fn node(&self, id: NodeId) -> Result<&Node, StoreError> {
        self.nodes
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(StoreError::NoSuchNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, StoreError> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(StoreError::NoSuchNode(id))
    }

    /// Follow link nodes until a concrete node is reached.
    fn resolve(&self, id: NodeId) -> Result<NodeId, StoreError> {
        self.resolve_from(id, 0)
    }

    fn resolve_from(&self, mut id: NodeId, mut depth: usize) -> Result<NodeId, StoreError> {
        loop {
            let node = self.node(id)?;
            let Some(link) = &node.link else {
                return Ok(id);
            };
            if depth >= self.link_depth_limit {
                return Err(StoreError::LinkDepth {
                    node: id,
                    limit: self.link_depth_limit,
                });
            }
            depth += 1;
            let file = if link.is_local() { &node.file } else { &link.file };
            let unresolved = || StoreError::LinkUnresolved {
                file: file.clone(),
                path: link.path.clone(),
            };
            let mut cur = self.files.get(file.as_str()).ok_or_else(unresolved)?.root;
            for comp in link.components() {
                cur = self.resolve_from(cur, depth)?;
                cur = *self.node(cur)?.children.get(comp).ok_or_else(unresolved)?;
            }
            id = cur;
        }
    }

    fn check_writable(&self, id: NodeId) -> Result<(), StoreError> {
        let file = &self.node(id)?.file;
        match self.files.get(file.as_str()).and_then(|f| f.mode) {
            Some(FileMode::Read) => Err(StoreError::ReadOnly(file.clone())),
            _ => Ok(()),
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u64);
        self.nodes.push(Some(node));
        id
    }

    fn attach(&mut self, parent: NodeId, name: &str, node: Node) -> Result<NodeId, StoreError> {
        if self.node(parent)?.children.contains_key(name) {
            return Err(StoreError::NameExists {
                parent,
                name: name.to_owned(),
            });
        }
        let id = self.alloc(node);
        self.node_mut(parent)?.children.insert(name.to_owned(), id);
        Ok(id)
    }

    fn free_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id.0 as usize).and_then(Option::take) else {
            return;
        };
        for (_, child) in node.children {
            self.free_subtree(child);
        }
    }

    fn set_file_recursive(&mut self, id: NodeId, file: &str) {
        let children: Vec<NodeId> = match self.node_mut(id) {
            Ok(node) => {
                node.file = file.to_owned();
                node.children.values().copied().collect()
            }
            Err(_) => return,
        };
        for child in children {
            self.set_file_recursive(child, file);
        }
    }

    /// Apply the flavor's conversion policy to an outgoing or incoming
    /// buffer.
    fn converted(&self, node: NodeId, data: &Data, to: DataType) -> Result<Data, StoreError> {
        if data.data_type() == to {
            return Ok(data.clone());
        }
        let refuse = || StoreError::Conversion {
            node,
            from: data.data_type().code(),
            to: to.code(),
        };
        match self.flavor {
            BackendFlavor::Legacy => Err(refuse()),
            BackendFlavor::Modern => data.convert(to).ok_or_else(refuse),
        }
    }

    fn check_slabs(
        &self,
        node: NodeId,
        stored: &[usize],
        file: &Hyperslab,
        mem_dims: &[usize],
        mem: &Hyperslab,
        buffer_len: usize,
    ) -> Result<(), StoreError> {
        let mismatch = |detail: String| StoreError::ShapeMismatch { node, detail };
        if !file.fits(stored) {
            return Err(mismatch(format!(
                "file block {:?}+{:?} outside extents {:?}",
                file.start, file.count, stored
            )));
        }
        if !mem.fits(mem_dims) {
            return Err(mismatch(format!(
                "memory block {:?}+{:?} outside extents {:?}",
                mem.start, mem.count, mem_dims
            )));
        }
        if file.element_count() != mem.element_count() {
            return Err(mismatch(format!(
                "file block holds {} elements, memory block {}",
                file.element_count(),
                mem.element_count()
            )));
        }
        if buffer_len != element_count(mem_dims) {
            return Err(mismatch(format!(
                "buffer holds {buffer_len} elements, memory extents need {}",
                element_count(mem_dims)
            )));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(BackendFlavor::Modern)
    }
}

impl NodeStore for MemoryStore {
    fn flavor(&self) -> BackendFlavor {
        self.flavor
    }

    fn set_link_depth_limit(&mut self, limit: usize) {
        self.link_depth_limit = limit;
    }

    fn open_file(&mut self, name: &str, mode: FileMode) -> Result<NodeId, StoreError> {
        if let Some(entry) = self.files.get(name) {
            if entry.mode.is_some() {
                return Err(StoreError::FileOpen(name.to_owned()));
            }
        }
        match mode {
            FileMode::Write => {
                if let Some(old) = self.files.get(name).map(|f| f.root) {
                    self.free_subtree(old);
                }
                let root_label = match self.flavor {
                    BackendFlavor::Legacy => "Root Node of ADF File",
                    BackendFlavor::Modern => "Root Node of HDF5 File",
                };
                let root = self.alloc(Node {
                    name: String::new(),
                    label: root_label.to_owned(),
                    dtype: DataType::Empty,
                    dims: Dims::new(),
                    data: None,
                    parent: None,
                    children: IndexMap::new(),
                    link: None,
                    file: name.to_owned(),
                });
                self.files.insert(
                    name.to_owned(),
                    FileEntry {
                        root,
                        mode: Some(mode),
                    },
                );
                debug!(file = name, "created file");
                Ok(root)
            }
            FileMode::Read | FileMode::Modify => {
                let entry = self
                    .files
                    .get_mut(name)
                    .ok_or_else(|| StoreError::NoSuchFile(name.to_owned()))?;
                entry.mode = Some(mode);
                debug!(file = name, %mode, "opened file");
                Ok(entry.root)
            }
        }
    }

    fn close_file(&mut self, root: NodeId) -> Result<(), StoreError> {
        let file = self.node(root)?.file.clone();
        let entry = self
            .files
            .get_mut(&file)
            .ok_or(StoreError::NoSuchFile(file))?;
        entry.mode = None;
        Ok(())
    }

    fn create_node(&mut self, parent: NodeId, name: &str) -> Result<NodeId, StoreError> {
        let parent = self.resolve(parent)?;
        self.check_writable(parent)?;
        let file = self.node(parent)?.file.clone();
        let id = self.attach(
            parent,
            name,
            Node {
                name: name.to_owned(),
                label: String::new(),
                dtype: DataType::Empty,
                dims: Dims::new(),
                data: None,
                parent: Some(parent),
                children: IndexMap::new(),
                link: None,
                file,
            },
        )?;
        trace!(%parent, name, node = %id, "create node");
        Ok(id)
    }

    fn set_label(&mut self, node: NodeId, label: &str) -> Result<(), StoreError> {
        let node = self.resolve(node)?;
        self.check_writable(node)?;
        self.node_mut(node)?.label = label.to_owned();
        Ok(())
    }

    fn set_dimensions(
        &mut self,
        node: NodeId,
        dtype: DataType,
        dims: &[usize],
    ) -> Result<(), StoreError> {
        let node = self.resolve(node)?;
        self.check_writable(node)?;
        let n = self.node_mut(node)?;
        n.dtype = dtype;
        n.dims = dims.iter().copied().collect();
        n.data = Data::zeros(dtype, element_count(dims));
        Ok(())
    }

    fn write_all(&mut self, node: NodeId, data: &Data) -> Result<(), StoreError> {
        let node = self.resolve(node)?;
        self.check_writable(node)?;
        let n = self.node(node)?;
        if n.dtype == DataType::Empty {
            return Err(StoreError::ShapeMismatch {
                node,
                detail: "node has no datatype".into(),
            });
        }
        let expected = element_count(&n.dims);
        if data.len() != expected {
            return Err(StoreError::ShapeMismatch {
                node,
                detail: format!("buffer holds {} elements, extents need {expected}", data.len()),
            });
        }
        let stored = self.converted(node, data, n.dtype)?;
        self.node_mut(node)?.data = Some(stored);
        Ok(())
    }

    fn write_range(
        &mut self,
        node: NodeId,
        file: &Hyperslab,
        mem_dims: &[usize],
        mem: &Hyperslab,
        data: &Data,
    ) -> Result<(), StoreError> {
        let node = self.resolve(node)?;
        self.check_writable(node)?;
        let n = self.node(node)?;
        let stored_dims = n.dims.clone();
        let stored_type = n.dtype;
        self.check_slabs(node, &stored_dims, file, mem_dims, mem, data.len())?;
        if data.data_type() != stored_type && self.flavor == BackendFlavor::Legacy {
            return Err(StoreError::Conversion {
                node,
                from: data.data_type().code(),
                to: stored_type.code(),
            });
        }
        let target = self
            .node_mut(node)?
            .data
            .as_mut()
            .ok_or_else(|| StoreError::ShapeMismatch {
                node,
                detail: "node has no data".into(),
            })?;
        for (dst, src) in file.offsets(&stored_dims).zip(mem.offsets(mem_dims)) {
            target.copy_element(dst, data, src);
        }
        Ok(())
    }

    fn read_all(&self, node: NodeId, dtype: DataType) -> Result<Option<Data>, StoreError> {
        let node = self.resolve(node)?;
        match &self.node(node)?.data {
            None => Ok(None),
            Some(data) => self.converted(node, data, dtype).map(Some),
        }
    }

    fn read_range(
        &self,
        node: NodeId,
        file: &Hyperslab,
        mem_dims: &[usize],
        mem: &Hyperslab,
        out: &mut Data,
    ) -> Result<(), StoreError> {
        let node = self.resolve(node)?;
        let n = self.node(node)?;
        self.check_slabs(node, &n.dims, file, mem_dims, mem, out.len())?;
        let source = n.data.as_ref().ok_or_else(|| StoreError::ShapeMismatch {
            node,
            detail: "node has no data".into(),
        })?;
        if source.data_type() != out.data_type() && self.flavor == BackendFlavor::Legacy {
            return Err(StoreError::Conversion {
                node,
                from: source.data_type().code(),
                to: out.data_type().code(),
            });
        }
        for (src, dst) in file.offsets(&n.dims).zip(mem.offsets(mem_dims)) {
            out.copy_element(dst, source, src);
        }
        Ok(())
    }

    fn name(&self, node: NodeId) -> Result<String, StoreError> {
        Ok(self.node(node)?.name.clone())
    }

    fn label(&self, node: NodeId) -> Result<String, StoreError> {
        Ok(self.node(self.resolve(node)?)?.label.clone())
    }

    fn data_type(&self, node: NodeId) -> Result<DataType, StoreError> {
        Ok(self.node(self.resolve(node)?)?.dtype)
    }

    fn dimensions(&self, node: NodeId) -> Result<Dims, StoreError> {
        Ok(self.node(self.resolve(node)?)?.dims.clone())
    }

    fn number_of_children(&self, node: NodeId) -> Result<usize, StoreError> {
        Ok(self.node(self.resolve(node)?)?.children.len())
    }

    fn child_ids(&self, node: NodeId) -> Result<Vec<NodeId>, StoreError> {
        Ok(self
            .node(self.resolve(node)?)?
            .children
            .values()
            .copied()
            .collect())
    }

    fn is_link(&self, node: NodeId) -> Result<bool, StoreError> {
        Ok(self.node(node)?.link.is_some())
    }

    fn link_target(&self, node: NodeId) -> Result<Option<Link>, StoreError> {
        Ok(self.node(node)?.link.clone())
    }

    fn create_link(
        &mut self,
        parent: NodeId,
        name: &str,
        target: &Link,
    ) -> Result<NodeId, StoreError> {
        let parent = self.resolve(parent)?;
        self.check_writable(parent)?;
        let file = self.node(parent)?.file.clone();
        let id = self.attach(
            parent,
            name,
            Node {
                name: name.to_owned(),
                label: String::new(),
                dtype: DataType::Empty,
                dims: Dims::new(),
                data: None,
                parent: Some(parent),
                children: IndexMap::new(),
                link: Some(target.clone()),
                file,
            },
        )?;
        debug!(%parent, name, target = %target, "create link");
        Ok(id)
    }

    fn move_node(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), StoreError> {
        let new_parent = self.resolve(new_parent)?;
        self.check_writable(new_parent)?;
        let (name, old_parent) = {
            let n = self.node(node)?;
            (n.name.clone(), n.parent.ok_or(StoreError::RootNode(node))?)
        };
        if self.node(new_parent)?.children.contains_key(&name) {
            return Err(StoreError::NameExists {
                parent: new_parent,
                name,
            });
        }
        self.node_mut(old_parent)?.children.shift_remove(&name);
        self.node_mut(new_parent)?.children.insert(name, node);
        self.node_mut(node)?.parent = Some(new_parent);
        let file = self.node(new_parent)?.file.clone();
        self.set_file_recursive(node, &file);
        trace!(%node, %new_parent, "move node");
        Ok(())
    }

    fn set_name(&mut self, node: NodeId, name: &str) -> Result<(), StoreError> {
        self.check_writable(node)?;
        let (old, parent) = {
            let n = self.node(node)?;
            (n.name.clone(), n.parent.ok_or(StoreError::RootNode(node))?)
        };
        if old == name {
            return Ok(());
        }
        let siblings = &mut self.node_mut(parent)?.children;
        if siblings.contains_key(name) {
            return Err(StoreError::NameExists {
                parent,
                name: name.to_owned(),
            });
        }
        if let Some(index) = siblings.get_index_of(&old) {
            siblings.shift_remove_index(index);
            siblings.shift_insert(index, name.to_owned(), node);
        }
        self.node_mut(node)?.name = name.to_owned();
        Ok(())
    }

    fn delete_node(&mut self, node: NodeId) -> Result<(), StoreError> {
        self.check_writable(node)?;
        let (name, parent) = {
            let n = self.node(node)?;
            (n.name.clone(), n.parent.ok_or(StoreError::RootNode(node))?)
        };
        self.node_mut(parent)?.children.shift_remove(&name);
        self.free_subtree(node);
        debug!(%node, name, "delete node");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn store_with_file(flavor: BackendFlavor) -> (MemoryStore, NodeId) {
        let mut store = MemoryStore::new(flavor);
        let root = store.open_file("a.cgns", FileMode::Write).unwrap();
        (store, root)
    }

    #[test]
    fn create_and_read_back() {
        let (mut store, root) = store_with_file(BackendFlavor::Modern);
        let data = Data::R8(vec![1.0, 2.0, 3.0]);
        let node = store
            .create_data_node(root, "X", "DataArray_t", &[3], Some(&data))
            .unwrap();
        assert_eq!(store.label(node).unwrap(), "DataArray_t");
        assert_eq!(store.dimensions(node).unwrap().as_slice(), &[3]);
        assert_eq!(store.read_all(node, DataType::Float64).unwrap(), Some(data));
        assert_eq!(store.children_with_label(root, "DataArray_t").unwrap(), [node]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let (mut store, root) = store_with_file(BackendFlavor::Modern);
        store.create_node(root, "A").unwrap();
        assert!(matches!(
            store.create_node(root, "A"),
            Err(StoreError::NameExists { .. })
        ));
    }

    #[test]
    fn legacy_refuses_conversion_modern_converts() {
        for flavor in [BackendFlavor::Legacy, BackendFlavor::Modern] {
            let (mut store, root) = store_with_file(flavor);
            let node = store.create_node(root, "A").unwrap();
            store.set_dimensions(node, DataType::Float64, &[2]).unwrap();
            let result = store.write_all(node, &Data::I4(vec![1, 2]));
            match flavor {
                BackendFlavor::Legacy => {
                    assert!(matches!(result, Err(StoreError::Conversion { .. })))
                }
                BackendFlavor::Modern => {
                    result.unwrap();
                    assert_eq!(
                        store.read_all(node, DataType::Int64).unwrap(),
                        Some(Data::I8(vec![1, 2]))
                    );
                }
            }
        }
    }

    #[test]
    fn write_range_places_block() {
        let (mut store, root) = store_with_file(BackendFlavor::Legacy);
        let node = store.create_node(root, "A").unwrap();
        store.set_dimensions(node, DataType::Int32, &[3, 3]).unwrap();
        let file = Hyperslab {
            start: smallvec![1, 1],
            count: smallvec![2, 2],
        };
        let mem = Hyperslab::full(&[4]);
        store
            .write_range(node, &file, &[4], &mem, &Data::I4(vec![1, 2, 3, 4]))
            .unwrap();
        assert_eq!(
            store.read_all(node, DataType::Int32).unwrap(),
            Some(Data::I4(vec![0, 0, 0, 0, 1, 2, 0, 3, 4]))
        );
    }

    #[test]
    fn links_resolve_across_files() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let grid = store.open_file("grid.cgns", FileMode::Write).unwrap();
        let base = store.create_data_node(grid, "Base", "CGNSBase_t", &[], None).unwrap();
        let x = store
            .create_data_node(base, "X", "DataArray_t", &[1], Some(&Data::R4(vec![5.0])))
            .unwrap();
        store.close_file(grid).unwrap();

        let root = store.open_file("main.cgns", FileMode::Write).unwrap();
        let link = store
            .create_link(root, "Shared", &Link::new("grid.cgns", "/Base"))
            .unwrap();
        assert!(store.is_link(link).unwrap());
        assert_eq!(store.name(link).unwrap(), "Shared");
        assert_eq!(store.label(link).unwrap(), "CGNSBase_t");
        assert_eq!(store.child_ids(link).unwrap(), [x]);

        store.delete_node(link).unwrap();
        assert_eq!(store.label(x).unwrap(), "DataArray_t");
    }

    #[test]
    fn link_cycles_hit_depth_limit() {
        let mut store = MemoryStore::new(BackendFlavor::Modern).with_link_depth_limit(4);
        let root = store.open_file("a", FileMode::Write).unwrap();
        let l = store.create_link(root, "L", &Link::new("", "/L")).unwrap();
        assert!(matches!(store.label(l), Err(StoreError::LinkDepth { .. })));
    }

    #[test]
    fn move_and_rename_keep_order() {
        let (mut store, root) = store_with_file(BackendFlavor::Modern);
        let a = store.create_node(root, "A").unwrap();
        let tmp = store.create_node(root, "tmp").unwrap();
        store.create_node(a, "First").unwrap();
        store.move_node(tmp, a).unwrap();
        store.set_name(tmp, "PointRange").unwrap();
        let names: Vec<String> = store
            .child_ids(a)
            .unwrap()
            .into_iter()
            .map(|c| store.name(c).unwrap())
            .collect();
        assert_eq!(names, ["First", "PointRange"]);
        assert_eq!(store.child_ids(root).unwrap(), [a]);
    }

    #[test]
    fn read_only_files_refuse_writes() {
        let (mut store, root) = store_with_file(BackendFlavor::Modern);
        store.close_file(root).unwrap();
        let root = store.open_file("a.cgns", FileMode::Read).unwrap();
        assert!(matches!(
            store.create_node(root, "A"),
            Err(StoreError::ReadOnly(_))
        ));
    }

    #[test]
    fn reopening_write_truncates() {
        let (mut store, root) = store_with_file(BackendFlavor::Modern);
        store.create_node(root, "A").unwrap();
        store.close_file(root).unwrap();
        let root = store.open_file("a.cgns", FileMode::Write).unwrap();
        assert_eq!(store.number_of_children(root).unwrap(), 0);
        assert_eq!(store.node_count(), 1);
    }
}
