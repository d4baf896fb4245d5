//! The read engine.
//!
//! A [`Reader`] walks a file top-down through the store, discovering
//! children by label, validating each node's datatype and shape against
//! its kind, applying version upgrades, and building the in-memory tree.
//! Dimensions in force (cell, physical, index, zone extents) travel down
//! in a [`Scope`] value; nothing is global.
//!
//! Every failure names the label and entity it was found in. A failed
//! read abandons the subtree; nothing is repaired.

mod bc;
mod connectivity;
mod tree;
mod zone;

use meshtree_array::{check_location, read_full};
use meshtree_core::{
    trim_text, Data, DataType, Dims, FileVersion, GridLocation, Label, NamedEnum, NodeId,
    PointSetType, TreeError,
};
use meshtree_model::{
    schema, AdditionalFamilyName, DataArray, DataConversion, Descriptor, DimensionalExponents,
    DimensionalUnits, EntityKind, Header, Meta, PointSet, TraversalContext, UserDefinedData,
};
use meshtree_store::NodeStore;
use tracing::warn;

use crate::upgrade::Rewrite;

/// Dimensions in force and link ancestry at the point of a read.
#[derive(Clone, Debug, Default)]
pub(crate) struct Scope {
    pub ctx: TraversalContext,
    pub in_link: bool,
}

impl Scope {
    /// This scope below an entity with `header`.
    fn below(&self, header: &Header) -> Scope {
        Scope {
            ctx: self.ctx.clone(),
            in_link: header.in_link,
        }
    }

    fn index_dim(&self) -> usize {
        self.ctx.index_dim()
    }
}

/// Reads one file into an in-memory tree.
pub(crate) struct Reader<'s, S: NodeStore + ?Sized> {
    store: &'s S,
    version: FileVersion,
    rewrites: Vec<Rewrite>,
}

impl<'s, S: NodeStore + ?Sized> Reader<'s, S> {
    pub(crate) fn new(store: &'s S, version: FileVersion) -> Self {
        Self {
            store,
            version,
            rewrites: Vec::new(),
        }
    }

    /// Upgrades applied during the read that could be written back.
    pub(crate) fn into_rewrites(self) -> Vec<Rewrite> {
        self.rewrites
    }

    // ── Discovery ──────────────────────────────────────────────────

    fn header(&self, id: NodeId, parent_in_link: bool) -> Result<Header, TreeError> {
        let link = self.store.link_target(id)?;
        Ok(Header {
            name: self.store.name(id)?,
            in_link: parent_in_link || link.is_some(),
            id: Some(id),
            link,
            upgraded: false,
        })
    }

    /// Children of `parent` labelled `label`, in store order.
    fn children(&self, parent: NodeId, label: Label) -> Result<Vec<NodeId>, TreeError> {
        let mut found = Vec::new();
        for child in self.store.child_ids(parent)? {
            if Label::parse(&self.store.label(child)?) == Some(label) {
                found.push(child);
            }
        }
        Ok(found)
    }

    /// The single child labelled `label`, if any. Two or more is an error.
    fn single(&self, parent: NodeId, label: Label) -> Result<Option<NodeId>, TreeError> {
        let mut found = self.children(parent, label)?;
        if found.len() > 1 {
            return Err(TreeError::DuplicateChild {
                label,
                name: self.store.name(found[1])?,
            });
        }
        Ok(found.pop())
    }

    /// The single child labelled `label`, which must exist.
    fn required(
        &self,
        parent: NodeId,
        label: Label,
        owner: Label,
        owner_name: &str,
    ) -> Result<NodeId, TreeError> {
        self.single(parent, label)?
            .ok_or_else(|| TreeError::schema(owner, owner_name, format!("missing {label} child")))
    }

    /// The child labelled `label` and named `name`, if any.
    fn named(&self, parent: NodeId, label: Label, name: &str) -> Result<Option<NodeId>, TreeError> {
        for child in self.children(parent, label)? {
            if self.store.name(child)? == name {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    // ── Payloads ───────────────────────────────────────────────────

    fn data(&self, id: NodeId) -> Result<Option<Data>, TreeError> {
        let dtype = self.store.data_type(id)?;
        read_full(self.store, id, dtype)
    }

    fn dims(&self, id: NodeId) -> Result<Dims, TreeError> {
        Ok(self.store.dimensions(id)?)
    }

    fn text(&self, id: NodeId, label: Label) -> Result<String, TreeError> {
        match self.data(id)? {
            None => Ok(String::new()),
            Some(Data::C1(bytes)) => Ok(trim_text(&bytes)),
            Some(other) => Err(TreeError::schema(
                label,
                &self.store.name(id)?,
                format!("expected C1 text, found {}", other.data_type()),
            )),
        }
    }

    fn ints(&self, id: NodeId, label: Label) -> Result<Vec<i64>, TreeError> {
        match self.data(id)? {
            None => Ok(Vec::new()),
            Some(data) => data.to_index_vec().ok_or_else(|| {
                TreeError::schema(
                    label,
                    &self.store.name(id).unwrap_or_default(),
                    format!("expected integer data, found {}", data.data_type()),
                )
            }),
        }
    }

    fn ints32(&self, id: NodeId, label: Label) -> Result<Vec<i32>, TreeError> {
        Ok(self.ints(id, label)?.into_iter().map(|v| v as i32).collect())
    }

    fn reals(&self, id: NodeId, label: Label) -> Result<(DataType, Vec<f64>), TreeError> {
        let dtype = self.store.data_type(id)?;
        if !dtype.is_real() {
            return Err(TreeError::schema(
                label,
                &self.store.name(id)?,
                format!("expected R4 or R8 data, found {dtype}"),
            ));
        }
        let values = self
            .data(id)?
            .and_then(|d| d.to_f64_vec())
            .unwrap_or_default();
        Ok((dtype, values))
    }

    /// A one-element integer payload.
    fn scalar(&self, id: NodeId, label: Label) -> Result<i32, TreeError> {
        let values = self.ints(id, label)?;
        match values.as_slice() {
            [v] => Ok(*v as i32),
            _ => Err(TreeError::schema(
                label,
                &self.store.name(id)?,
                format!("expected one integer, found {}", values.len()),
            )),
        }
    }

    /// Parse an enumeration name. A name outside the table is accepted as
    /// `UserDefined` only when the file was written by a newer revision.
    fn parse_enum<E: NamedEnum>(&self, text: &str, label: Label, name: &str) -> Result<E, TreeError> {
        if let Some(value) = E::parse(text) {
            return Ok(value);
        }
        if self.version.is_newer_than_library() {
            warn!(
                %label,
                name,
                value = text,
                version = %self.version,
                "unknown {} name from a newer file, using UserDefined",
                E::TYPE_NAME
            );
            return Ok(E::USER_DEFINED);
        }
        Err(TreeError::schema(
            label,
            name,
            format!("unknown {} '{text}'", E::TYPE_NAME),
        ))
    }

    /// An enumeration stored as the text payload of `id`.
    fn enum_value<E: NamedEnum>(&self, id: NodeId, label: Label) -> Result<E, TreeError> {
        let text = self.text(id, label)?;
        self.parse_enum(&text, label, &self.store.name(id)?)
    }

    fn opt_enum<E: NamedEnum>(&self, parent: NodeId, label: Label) -> Result<Option<E>, TreeError> {
        self.single(parent, label)?
            .map(|id| self.enum_value(id, label))
            .transpose()
    }

    fn opt_scalar(&self, parent: NodeId, label: Label) -> Result<Option<i32>, TreeError> {
        self.single(parent, label)?
            .map(|id| self.scalar(id, label))
            .transpose()
    }

    fn opt_text(&self, parent: NodeId, label: Label) -> Result<Option<String>, TreeError> {
        self.single(parent, label)?
            .map(|id| self.text(id, label))
            .transpose()
    }

    /// An integer vector child identified by label and name.
    fn opt_named_ints(
        &self,
        parent: NodeId,
        label: Label,
        name: &str,
    ) -> Result<Option<Vec<i32>>, TreeError> {
        self.named(parent, label, name)?
            .map(|id| self.ints32(id, label))
            .transpose()
    }

    // ── Scalar features ────────────────────────────────────────────

    fn rind(&self, parent: NodeId, scope: &Scope) -> Result<Option<Vec<i32>>, TreeError> {
        let Some(id) = self.single(parent, Label::Rind)? else {
            return Ok(None);
        };
        let planes = self.ints32(id, Label::Rind)?;
        let expected = 2 * scope.index_dim();
        if planes.len() != expected {
            return Err(TreeError::schema(
                Label::Rind,
                &self.store.name(id)?,
                format!("holds {} values, expected {expected}", planes.len()),
            ));
        }
        Ok(Some(planes))
    }

    fn location(&self, parent: NodeId, scope: &Scope) -> Result<Option<GridLocation>, TreeError> {
        let Some(location) = self.opt_enum::<GridLocation>(parent, Label::GridLocation)? else {
            return Ok(None);
        };
        if let Some(zone) = &scope.ctx.zone {
            if location != GridLocation::UserDefined {
                check_location(zone.zone_type, zone.index_dim(), location)?;
            }
        }
        Ok(Some(location))
    }

    fn additional_families(
        &self,
        parent: NodeId,
        in_link: bool,
    ) -> Result<Vec<AdditionalFamilyName>, TreeError> {
        self.children(parent, Label::AdditionalFamilyName)?
            .into_iter()
            .map(|id| {
                Ok(AdditionalFamilyName {
                    header: self.header(id, in_link)?,
                    family: self.text(id, Label::AdditionalFamilyName)?,
                })
            })
            .collect()
    }

    // ── Annotations ────────────────────────────────────────────────

    /// Descriptors, data class, units and user data admitted by `kind`.
    /// Descriptors named in `reserved` belong to the owner itself.
    fn meta(
        &self,
        parent: NodeId,
        kind: EntityKind,
        scope: &Scope,
        reserved: &[&str],
    ) -> Result<Meta, TreeError> {
        let mut meta = Meta::default();
        if schema::admits(kind, Label::Descriptor) {
            for id in self.children(parent, Label::Descriptor)? {
                if !reserved.contains(&self.store.name(id)?.as_str()) {
                    meta.descriptors.push(self.descriptor(id, scope.in_link)?);
                }
            }
        }
        if schema::admits(kind, Label::DataClass) {
            meta.data_class = self.opt_enum(parent, Label::DataClass)?;
        }
        if schema::admits(kind, Label::DimensionalUnits) {
            if let Some(id) = self.single(parent, Label::DimensionalUnits)? {
                meta.units = Some(self.units(id, scope.in_link)?);
            }
        }
        if schema::admits(kind, Label::UserDefinedData) {
            for id in self.children(parent, Label::UserDefinedData)? {
                meta.user_data.push(self.user_data(id, scope)?);
            }
        }
        Ok(meta)
    }

    fn descriptor(&self, id: NodeId, in_link: bool) -> Result<Descriptor, TreeError> {
        Ok(Descriptor {
            header: self.header(id, in_link)?,
            text: self.text(id, Label::Descriptor)?,
        })
    }

    fn opt_descriptor(
        &self,
        parent: NodeId,
        name: &str,
        in_link: bool,
    ) -> Result<Option<Descriptor>, TreeError> {
        self.named(parent, Label::Descriptor, name)?
            .map(|id| self.descriptor(id, in_link))
            .transpose()
    }

    /// Split a `C1[32, n]` payload into its `n` names.
    fn unit_names(&self, id: NodeId, label: Label, count: usize) -> Result<Vec<String>, TreeError> {
        let dims = self.dims(id)?;
        let bytes = match self.data(id)? {
            Some(Data::C1(bytes)) => bytes,
            _ => Vec::new(),
        };
        if dims.as_slice() != [32, count] || bytes.len() != 32 * count {
            return Err(TreeError::schema(
                label,
                &self.store.name(id)?,
                format!("expected C1[32,{count}], found extents {:?}", dims.as_slice()),
            ));
        }
        Ok(bytes.chunks(32).map(trim_text).collect())
    }

    fn units(&self, id: NodeId, in_link: bool) -> Result<DimensionalUnits, TreeError> {
        let header = self.header(id, in_link)?;
        let names = self.unit_names(id, Label::DimensionalUnits, 5)?;
        let label = Label::DimensionalUnits;
        let mut units = DimensionalUnits {
            mass: self.parse_enum(&names[0], label, &header.name)?,
            length: self.parse_enum(&names[1], label, &header.name)?,
            time: self.parse_enum(&names[2], label, &header.name)?,
            temperature: self.parse_enum(&names[3], label, &header.name)?,
            angle: self.parse_enum(&names[4], label, &header.name)?,
            ..DimensionalUnits::default()
        };
        if let Some(extra) = self.single(id, Label::AdditionalUnits)? {
            let names = self.unit_names(extra, Label::AdditionalUnits, 3)?;
            let label = Label::AdditionalUnits;
            units.current = self.parse_enum(&names[0], label, &header.name)?;
            units.amount = self.parse_enum(&names[1], label, &header.name)?;
            units.luminous = self.parse_enum(&names[2], label, &header.name)?;
        }
        units.header = header;
        Ok(units)
    }

    fn exponents(&self, id: NodeId, in_link: bool) -> Result<DimensionalExponents, TreeError> {
        let header = self.header(id, in_link)?;
        let (data_type, values) = self.reals(id, Label::DimensionalExponents)?;
        let base: [f64; 5] = values.as_slice().try_into().map_err(|_| {
            TreeError::schema(
                Label::DimensionalExponents,
                &header.name,
                format!("holds {} values, expected 5", values.len()),
            )
        })?;
        let additional = match self.single(id, Label::AdditionalExponents)? {
            None => None,
            Some(extra) => {
                let (_, values) = self.reals(extra, Label::AdditionalExponents)?;
                Some(values.as_slice().try_into().map_err(|_| {
                    TreeError::schema(
                        Label::AdditionalExponents,
                        &header.name,
                        format!("holds {} values, expected 3", values.len()),
                    )
                })?)
            }
        };
        Ok(DimensionalExponents {
            header,
            data_type,
            base,
            additional,
        })
    }

    fn conversion(&self, id: NodeId, in_link: bool) -> Result<DataConversion, TreeError> {
        let header = self.header(id, in_link)?;
        let (data_type, values) = self.reals(id, Label::DataConversion)?;
        match values.as_slice() {
            [scale, offset] => Ok(DataConversion {
                header,
                data_type,
                scale: *scale,
                offset: *offset,
            }),
            _ => Err(TreeError::schema(
                Label::DataConversion,
                &header.name,
                format!("holds {} values, expected 2", values.len()),
            )),
        }
    }

    fn user_data(&self, id: NodeId, scope: &Scope) -> Result<UserDefinedData, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        Ok(UserDefinedData {
            location: self.location(id, &inner)?,
            ptset: self.ptset_among(id, &[PointSetType::PointRange, PointSetType::PointList], &inner)?,
            family: self.opt_text(id, Label::FamilyName)?,
            additional_families: self.additional_families(id, inner.in_link)?,
            ordinal: self.opt_scalar(id, Label::Ordinal)?,
            arrays: self.arrays(id, &inner, &[])?,
            meta: self.meta(id, EntityKind::UserDefinedData, &inner, &[])?,
            header,
        })
    }

    // ── Arrays ─────────────────────────────────────────────────────

    fn array(&self, id: NodeId, in_link: bool) -> Result<DataArray, TreeError> {
        let header = self.header(id, in_link)?;
        let scope = Scope {
            in_link: header.in_link,
            ..Scope::default()
        };
        Ok(DataArray {
            data_type: self.store.data_type(id)?,
            dims: self.dims(id)?,
            data: self.data(id)?,
            exponents: self
                .single(id, Label::DimensionalExponents)?
                .map(|e| self.exponents(e, header.in_link))
                .transpose()?,
            conversion: self
                .single(id, Label::DataConversion)?
                .map(|c| self.conversion(c, header.in_link))
                .transpose()?,
            meta: self.meta(id, EntityKind::DataArray, &scope, &[])?,
            header,
        })
    }

    /// Every `DataArray_t` child except those named in `reserved`.
    fn arrays(
        &self,
        parent: NodeId,
        scope: &Scope,
        reserved: &[&str],
    ) -> Result<Vec<DataArray>, TreeError> {
        let mut arrays = Vec::new();
        for id in self.children(parent, Label::DataArray)? {
            if !reserved.contains(&self.store.name(id)?.as_str()) {
                arrays.push(self.array(id, scope.in_link)?);
            }
        }
        Ok(arrays)
    }

    fn named_array(
        &self,
        parent: NodeId,
        name: &str,
        in_link: bool,
    ) -> Result<Option<DataArray>, TreeError> {
        self.named(parent, Label::DataArray, name)?
            .map(|id| self.array(id, in_link))
            .transpose()
    }

    /// Require every array to have extents `expected`.
    fn check_extents(
        &self,
        arrays: &[DataArray],
        expected: &[usize],
        owner: Label,
        owner_name: &str,
    ) -> Result<(), TreeError> {
        for array in arrays {
            if array.dims.as_slice() != expected {
                return Err(TreeError::schema(
                    owner,
                    owner_name,
                    format!(
                        "array '{}' has extents {:?}, expected {expected:?}",
                        array.header.name,
                        array.dims.as_slice()
                    ),
                ));
            }
        }
        Ok(())
    }

    // ── Point sets ─────────────────────────────────────────────────

    fn ptset(&self, id: NodeId, kind: PointSetType, in_link: bool) -> Result<PointSet, TreeError> {
        let header = self.header(id, in_link)?;
        let dims = self.dims(id)?;
        let data_type = self.store.data_type(id)?;
        let label = if kind.is_range() {
            Label::IndexRange
        } else {
            Label::IndexArray
        };
        let (index_dim, npts) = match dims.as_slice() {
            [index_dim, npts] => (*index_dim, *npts),
            [npts] => (1, *npts),
            other => {
                return Err(TreeError::schema(
                    label,
                    &header.name,
                    format!("point set must be rank 2, has extents {other:?}"),
                ))
            }
        };
        let mut set = PointSet {
            kind,
            data_type,
            index_dim,
            npts,
            size_of_patch: 0,
            points: self.ints(id, label)?,
            header,
        };
        set.check()
            .map_err(|detail| TreeError::schema(label, &set.header.name, detail))?;
        set.refresh_patch_size();
        Ok(set)
    }

    /// Every point set child whose kind is in `kinds`.
    fn ptsets_among(
        &self,
        parent: NodeId,
        kinds: &[PointSetType],
        scope: &Scope,
    ) -> Result<Vec<PointSet>, TreeError> {
        let mut found = Vec::new();
        for label in [Label::IndexRange, Label::IndexArray] {
            for id in self.children(parent, label)? {
                let name = self.store.name(id)?;
                if let Some(kind) = PointSetType::parse(&name).filter(|k| kinds.contains(k)) {
                    found.push(self.ptset(id, kind, scope.in_link)?);
                }
            }
        }
        Ok(found)
    }

    /// The single point set child whose kind is in `kinds`, if any.
    fn ptset_among(
        &self,
        parent: NodeId,
        kinds: &[PointSetType],
        scope: &Scope,
    ) -> Result<Option<PointSet>, TreeError> {
        let mut found = self.ptsets_among(parent, kinds, scope)?;
        if found.len() > 1 {
            let second = &found[1];
            return Err(TreeError::DuplicateChild {
                label: second.label(),
                name: second.header.name.clone(),
            });
        }
        Ok(found.pop())
    }
}
