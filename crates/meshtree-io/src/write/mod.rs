//! The write engine.
//!
//! A [`Writer`] walks the in-memory tree top-down and persists every
//! entity that has no store handle yet. Entities that already have one are
//! descended into so that new children below them are found; their own
//! payload and scalar features are left alone. Entities inside a link are
//! never written from this file, and an entity that *is* a link is written
//! as a link node. Arrays synthesized from a legacy layout that was not
//! written back are skipped too.
//!
//! Name collisions follow the open mode: in write mode an existing name is
//! a [`TreeError::DuplicateChild`]; in modify mode a node with the same
//! label, datatype and extents is overwritten in place (its children are
//! dropped), anything else is deleted and recreated.

mod bc;
mod connectivity;
mod tree;
mod zone;

use meshtree_array::write_full;
use meshtree_core::{
    validate_name, Data, DataType, FileMode, GridLocation, Label, NamedEnum, NodeId, TreeError,
};
use meshtree_model::{
    AdditionalFamilyName, DataArray, DataConversion, Descriptor, DimensionalExponents,
    DimensionalUnits, Header, Meta, PointSet, UserDefinedData,
};
use meshtree_store::NodeStore;
use tracing::debug;

/// Name a point set is created under before it is moved into place.
const STAGING_NAME: &str = "PointSet.staging";

/// What [`Writer::enter`] found or did for an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Entry {
    /// The node was just created; scalar features must be written too.
    Fresh(NodeId),
    /// The entity was already persisted; only new children are written.
    Existing(NodeId),
    /// The entity is, or lies inside, a link.
    Skip,
}

impl Entry {
    pub(crate) fn is_fresh(self) -> bool {
        matches!(self, Entry::Fresh(_))
    }

    /// The node to descend into, unless the entity is skipped.
    pub(crate) fn id(self) -> Option<NodeId> {
        match self {
            Entry::Fresh(id) | Entry::Existing(id) => Some(id),
            Entry::Skip => None,
        }
    }
}

/// Node name of a scalar feature stored under `label`.
pub(crate) fn node_name(label: Label) -> &'static str {
    let text = label.as_str();
    text.strip_suffix("_t").unwrap_or(text)
}

/// `values` as a real buffer of `dtype` (`R8` unless `R4` is asked for).
pub(crate) fn reals(dtype: DataType, values: &[f64]) -> Data {
    match dtype {
        DataType::Float32 => Data::R4(values.iter().map(|&v| v as f32).collect()),
        _ => Data::R8(values.to_vec()),
    }
}

/// Persists an in-memory tree into one open file.
pub(crate) struct Writer<'s, S: NodeStore + ?Sized> {
    store: &'s mut S,
    mode: FileMode,
    root: NodeId,
}

impl<'s, S: NodeStore + ?Sized> Writer<'s, S> {
    pub(crate) fn new(store: &'s mut S, mode: FileMode, root: NodeId) -> Self {
        Self { store, mode, root }
    }

    pub(crate) fn store(&mut self) -> &mut S {
        self.store
    }

    // ── Nodes ──────────────────────────────────────────────────────

    /// Make room for a child `name` under `parent`: fails in write mode
    /// when the name is taken, deletes the old node in modify mode.
    pub(crate) fn clear_name(&mut self, parent: NodeId, name: &str, label: Label) -> Result<(), TreeError> {
        let Some(old) = self.store.child_by_name(parent, name)? else {
            return Ok(());
        };
        if self.mode != FileMode::Modify {
            return Err(TreeError::DuplicateChild {
                label,
                name: name.to_owned(),
            });
        }
        debug!(%parent, name, "deleting node before rewrite");
        self.store.delete_node(old)?;
        Ok(())
    }

    /// Create or overwrite the child `name` of `parent`.
    ///
    /// `dtype` [`DataType::Empty`] makes an `MT` node. With a datatype but
    /// no data the node is sized and zero-filled.
    pub(crate) fn put_node(
        &mut self,
        parent: NodeId,
        name: &str,
        label: Label,
        dtype: DataType,
        dims: &[usize],
        data: Option<&Data>,
    ) -> Result<NodeId, TreeError> {
        validate_name(name)?;
        if self.mode == FileMode::Modify {
            if let Some(old) = self.store.child_by_name(parent, name)? {
                if self.matches(old, label, dtype, dims)? {
                    debug!(%parent, name, %label, "overwriting node in place");
                    for child in self.store.child_ids(old)? {
                        self.store.delete_node(child)?;
                    }
                    match data {
                        Some(data) => write_full(self.store, old, data)?,
                        None if dtype != DataType::Empty => {
                            self.store.set_dimensions(old, dtype, dims)?
                        }
                        None => {}
                    }
                    return Ok(old);
                }
            }
        }
        self.clear_name(parent, name, label)?;
        let node = self.store.create_node(parent, name)?;
        self.store.set_label(node, label.as_str())?;
        if dtype != DataType::Empty {
            self.store.set_dimensions(node, dtype, dims)?;
            if let Some(data) = data {
                write_full(self.store, node, data)?;
            }
        }
        debug!(%parent, %node, name, %label, "created node");
        Ok(node)
    }

    fn matches(&self, node: NodeId, label: Label, dtype: DataType, dims: &[usize]) -> Result<bool, TreeError> {
        if self.store.is_link(node)? {
            return Ok(false);
        }
        Ok(self.store.label(node)? == label.as_str()
            && self.store.data_type(node)? == dtype
            && (dtype == DataType::Empty || self.store.dimensions(node)?.as_slice() == dims))
    }

    /// Persist the node of one entity.
    pub(crate) fn enter(
        &mut self,
        parent: NodeId,
        header: &mut Header,
        label: Label,
        dtype: DataType,
        dims: &[usize],
        data: Option<&Data>,
    ) -> Result<Entry, TreeError> {
        if let Some(id) = header.id {
            return Ok(if header.in_link {
                Entry::Skip
            } else {
                Entry::Existing(id)
            });
        }
        if header.in_link || header.upgraded {
            return Ok(Entry::Skip);
        }
        if let Some(link) = &header.link {
            validate_name(&header.name)?;
            self.clear_name(parent, &header.name, label)?;
            let id = self.store.create_link(parent, &header.name, link)?;
            debug!(%parent, name = %header.name, file = %link.file, path = %link.path, "created link");
            header.id = Some(id);
            header.in_link = true;
            return Ok(Entry::Skip);
        }
        let id = self.put_node(parent, &header.name, label, dtype, dims, data)?;
        header.id = Some(id);
        Ok(Entry::Fresh(id))
    }

    /// An entity node without payload.
    pub(crate) fn enter_empty(
        &mut self,
        parent: NodeId,
        header: &mut Header,
        label: Label,
    ) -> Result<Entry, TreeError> {
        self.enter(parent, header, label, DataType::Empty, &[], None)
    }

    // ── Scalar features ────────────────────────────────────────────

    pub(crate) fn text_node(
        &mut self,
        parent: NodeId,
        name: &str,
        label: Label,
        text: &str,
    ) -> Result<NodeId, TreeError> {
        let data = Data::text(text);
        self.put_node(parent, name, label, DataType::Char, &[data.len()], Some(&data))
    }

    pub(crate) fn enum_node<E: NamedEnum>(
        &mut self,
        parent: NodeId,
        label: Label,
        value: E,
    ) -> Result<NodeId, TreeError> {
        self.text_node(parent, node_name(label), label, value.name())
    }

    pub(crate) fn ints_node(
        &mut self,
        parent: NodeId,
        name: &str,
        label: Label,
        values: &[i32],
    ) -> Result<NodeId, TreeError> {
        let data = Data::I4(values.to_vec());
        self.put_node(parent, name, label, DataType::Int32, &[values.len()], Some(&data))
    }

    pub(crate) fn opt_enum<E: NamedEnum>(
        &mut self,
        parent: NodeId,
        label: Label,
        value: Option<E>,
    ) -> Result<(), TreeError> {
        if let Some(value) = value {
            self.enum_node(parent, label, value)?;
        }
        Ok(())
    }

    pub(crate) fn rind(&mut self, parent: NodeId, rind: Option<&[i32]>) -> Result<(), TreeError> {
        if let Some(planes) = rind {
            self.ints_node(parent, node_name(Label::Rind), Label::Rind, planes)?;
        }
        Ok(())
    }

    pub(crate) fn location(
        &mut self,
        parent: NodeId,
        location: Option<GridLocation>,
    ) -> Result<(), TreeError> {
        self.opt_enum(parent, Label::GridLocation, location)
    }

    pub(crate) fn ordinal(&mut self, parent: NodeId, ordinal: Option<i32>) -> Result<(), TreeError> {
        if let Some(value) = ordinal {
            self.ints_node(parent, node_name(Label::Ordinal), Label::Ordinal, &[value])?;
        }
        Ok(())
    }

    pub(crate) fn family_name(&mut self, parent: NodeId, family: Option<&str>) -> Result<(), TreeError> {
        if let Some(family) = family {
            self.text_node(parent, node_name(Label::FamilyName), Label::FamilyName, family)?;
        }
        Ok(())
    }

    pub(crate) fn additional_families(
        &mut self,
        parent: NodeId,
        families: &mut [AdditionalFamilyName],
    ) -> Result<(), TreeError> {
        for fam in families {
            let data = Data::text(&fam.family);
            self.enter(
                parent,
                &mut fam.header,
                Label::AdditionalFamilyName,
                DataType::Char,
                &[data.len()],
                Some(&data),
            )?;
        }
        Ok(())
    }

    // ── Annotations ────────────────────────────────────────────────

    /// Descriptors, units and user data always; the data class only under
    /// a freshly created owner.
    pub(crate) fn meta(&mut self, parent: NodeId, meta: &mut Meta, fresh: bool) -> Result<(), TreeError> {
        for d in &mut meta.descriptors {
            self.descriptor(parent, d)?;
        }
        if fresh {
            self.opt_enum(parent, Label::DataClass, meta.data_class)?;
        }
        if let Some(units) = &mut meta.units {
            self.units(parent, units)?;
        }
        for ud in &mut meta.user_data {
            self.user_data(parent, ud)?;
        }
        Ok(())
    }

    pub(crate) fn descriptor(&mut self, parent: NodeId, d: &mut Descriptor) -> Result<(), TreeError> {
        let data = Data::text(&d.text);
        self.enter(parent, &mut d.header, Label::Descriptor, DataType::Char, &[data.len()], Some(&data))?;
        Ok(())
    }

    pub(crate) fn opt_descriptor(
        &mut self,
        parent: NodeId,
        d: Option<&mut Descriptor>,
    ) -> Result<(), TreeError> {
        match d {
            Some(d) => self.descriptor(parent, d),
            None => Ok(()),
        }
    }

    pub(crate) fn units(&mut self, parent: NodeId, units: &mut DimensionalUnits) -> Result<(), TreeError> {
        let names = [
            units.mass.name(),
            units.length.name(),
            units.time.name(),
            units.temperature.name(),
            units.angle.name(),
        ];
        let data = padded_block(&names);
        let entry = self.enter(parent, &mut units.header, Label::DimensionalUnits, DataType::Char, &[32, 5], Some(&data))?;
        if let Entry::Fresh(id) = entry {
            if units.has_additional() {
                let extra = padded_block(&[units.current.name(), units.amount.name(), units.luminous.name()]);
                self.put_node(
                    id,
                    DimensionalUnits::ADDITIONAL_NAME,
                    Label::AdditionalUnits,
                    DataType::Char,
                    &[32, 3],
                    Some(&extra),
                )?;
            }
        }
        Ok(())
    }

    pub(crate) fn exponents(
        &mut self,
        parent: NodeId,
        exp: &mut DimensionalExponents,
    ) -> Result<(), TreeError> {
        let data = reals(exp.data_type, &exp.base);
        let entry = self.enter(parent, &mut exp.header, Label::DimensionalExponents, data.data_type(), &[5], Some(&data))?;
        if let (Entry::Fresh(id), Some(additional)) = (entry, exp.additional) {
            let extra = reals(exp.data_type, &additional);
            self.put_node(
                id,
                DimensionalExponents::ADDITIONAL_NAME,
                Label::AdditionalExponents,
                extra.data_type(),
                &[3],
                Some(&extra),
            )?;
        }
        Ok(())
    }

    pub(crate) fn conversion(&mut self, parent: NodeId, conv: &mut DataConversion) -> Result<(), TreeError> {
        let data = reals(conv.data_type, &[conv.scale, conv.offset]);
        self.enter(parent, &mut conv.header, Label::DataConversion, data.data_type(), &[2], Some(&data))?;
        Ok(())
    }

    pub(crate) fn user_data(&mut self, parent: NodeId, ud: &mut UserDefinedData) -> Result<(), TreeError> {
        let entry = self.enter_empty(parent, &mut ud.header, Label::UserDefinedData)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            self.location(id, ud.location)?;
            self.family_name(id, ud.family.as_deref())?;
            self.ordinal(id, ud.ordinal)?;
        }
        self.opt_ptset(id, ud.ptset.as_mut())?;
        self.additional_families(id, &mut ud.additional_families)?;
        self.arrays(id, &mut ud.arrays)?;
        self.meta(id, &mut ud.meta, entry.is_fresh())
    }

    // ── Arrays ─────────────────────────────────────────────────────

    pub(crate) fn array(&mut self, parent: NodeId, a: &mut DataArray, label: Label) -> Result<(), TreeError> {
        let entry = self.enter(parent, &mut a.header, label, a.data_type, &a.dims, a.data.as_ref())?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if let Some(exp) = &mut a.exponents {
            self.exponents(id, exp)?;
        }
        if let Some(conv) = &mut a.conversion {
            self.conversion(id, conv)?;
        }
        self.meta(id, &mut a.meta, entry.is_fresh())
    }

    pub(crate) fn arrays(&mut self, parent: NodeId, arrays: &mut [DataArray]) -> Result<(), TreeError> {
        for a in arrays {
            self.array(parent, a, Label::DataArray)?;
        }
        Ok(())
    }

    pub(crate) fn opt_array(&mut self, parent: NodeId, a: Option<&mut DataArray>) -> Result<(), TreeError> {
        match a {
            Some(a) => self.array(parent, a, Label::DataArray),
            None => Ok(()),
        }
    }

    // ── Point sets ─────────────────────────────────────────────────

    /// Write a point set: created under the file root with a staging name,
    /// filled, then moved under `parent` and renamed.
    pub(crate) fn ptset(&mut self, parent: NodeId, set: &mut PointSet) -> Result<(), TreeError> {
        let header = &set.header;
        if header.id.is_some() || header.in_link {
            return Ok(());
        }
        let label = set.label();
        set.check()
            .map_err(|detail| TreeError::schema(label, &set.header.name, detail))?;
        validate_name(&set.header.name)?;
        self.clear_name(parent, &set.header.name, label)?;
        if let Some(stale) = self.store.child_by_name(self.root, STAGING_NAME)? {
            self.store.delete_node(stale)?;
        }

        let data = Data::index(&set.points, set.data_type);
        let node = self.store.create_node(self.root, STAGING_NAME)?;
        self.store.set_label(node, label.as_str())?;
        self.store.set_dimensions(node, data.data_type(), &set.dims())?;
        self.store.write_all(node, &data)?;
        self.store.move_node(node, parent)?;
        self.store.set_name(node, &set.header.name)?;
        debug!(%parent, %node, name = %set.header.name, kind = %set.kind, "moved point set into place");

        set.header.id = Some(node);
        set.refresh_patch_size();
        Ok(())
    }

    pub(crate) fn opt_ptset(&mut self, parent: NodeId, set: Option<&mut PointSet>) -> Result<(), TreeError> {
        match set {
            Some(set) => self.ptset(parent, set),
            None => Ok(()),
        }
    }
}

/// Names space-padded to 32 bytes each, as one `C1[32, n]` block.
fn padded_block(names: &[&str]) -> Data {
    let mut bytes = Vec::with_capacity(32 * names.len());
    for name in names {
        if let Data::C1(block) = Data::padded_text(name, 32) {
            bytes.extend(block);
        }
    }
    Data::C1(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshtree_core::PointSetType;
    use meshtree_store::{BackendFlavor, MemoryStore};

    fn fresh(mode: FileMode) -> (MemoryStore, NodeId) {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let root = store.open_file("w.cgns", FileMode::Write).unwrap();
        if mode == FileMode::Modify {
            store.close_file(root).unwrap();
            let root = store.open_file("w.cgns", FileMode::Modify).unwrap();
            return (store, root);
        }
        (store, root)
    }

    #[test]
    fn write_mode_refuses_duplicate_names() {
        let (mut store, root) = fresh(FileMode::Write);
        let mut w = Writer::new(&mut store, FileMode::Write, root);
        w.text_node(root, "Note", Label::Descriptor, "a").unwrap();
        let err = w.text_node(root, "Note", Label::Descriptor, "b").unwrap_err();
        assert!(matches!(err, TreeError::DuplicateChild { .. }));
    }

    #[test]
    fn modify_mode_overwrites_matching_node_in_place() {
        let (mut store, root) = fresh(FileMode::Modify);
        let mut w = Writer::new(&mut store, FileMode::Modify, root);
        let first = w.ints_node(root, "Ordinal", Label::Ordinal, &[1]).unwrap();
        w.text_node(first, "Note", Label::Descriptor, "child").unwrap();
        let second = w.ints_node(root, "Ordinal", Label::Ordinal, &[7]).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.number_of_children(second).unwrap(), 0);
        assert_eq!(store.read_all(second, DataType::Int32).unwrap(), Some(Data::I4(vec![7])));
    }

    #[test]
    fn modify_mode_recreates_on_shape_change() {
        let (mut store, root) = fresh(FileMode::Modify);
        let mut w = Writer::new(&mut store, FileMode::Modify, root);
        let first = w.ints_node(root, "Rind", Label::Rind, &[0, 0]).unwrap();
        let second = w.ints_node(root, "Rind", Label::Rind, &[1, 1, 0, 0]).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.dimensions(second).unwrap().as_slice(), &[4]);
        assert_eq!(store.child_ids(root).unwrap(), vec![second]);
    }

    #[test]
    fn point_set_lands_under_parent_with_its_name() {
        let (mut store, root) = fresh(FileMode::Write);
        let mut w = Writer::new(&mut store, FileMode::Write, root);
        let parent = w.put_node(root, "BC", Label::BC, DataType::Empty, &[], None).unwrap();
        let mut set = PointSet::range(PointSetType::PointRange, &[1, 1], &[3, 4]);
        w.ptset(parent, &mut set).unwrap();
        let id = set.header.id.unwrap();
        assert_eq!(store.name(id).unwrap(), "PointRange");
        assert_eq!(store.label(id).unwrap(), "IndexRange_t");
        assert_eq!(store.dimensions(id).unwrap().as_slice(), &[2, 2]);
        assert_eq!(store.child_ids(parent).unwrap(), vec![id]);
        assert!(store.child_by_name(root, STAGING_NAME).unwrap().is_none());
        assert_eq!(set.size_of_patch, 12);
    }

    #[test]
    fn malformed_point_set_is_rejected() {
        let (mut store, root) = fresh(FileMode::Write);
        let mut w = Writer::new(&mut store, FileMode::Write, root);
        let mut set = PointSet::list(PointSetType::PointList, 2, vec![1, 2, 3]);
        let err = w.ptset(root, &mut set).unwrap_err();
        assert!(matches!(err, TreeError::SchemaViolation { .. }));
    }

    #[test]
    fn units_are_padded_to_32_bytes() {
        let block = padded_block(&["Meter", "Second"]);
        assert_eq!(block.len(), 64);
        assert_eq!(&block.as_bytes().unwrap()[32..38], b"Second");
    }

    #[test]
    fn scalar_node_names_drop_label_suffix() {
        assert_eq!(node_name(Label::GridLocation), "GridLocation");
        assert_eq!(node_name(Label::Int), "int");
    }
}
