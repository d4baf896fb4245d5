//! Feature get/set at the cursor.
//!
//! Each setter addresses one feature slot of the entity under the cursor
//! with the multiplicity rules of [`meshtree_cursor`]: a present singleton
//! is a [`TreeError::DuplicateChild`] in write mode and is replaced in
//! modify mode. When the entity is already in the file the feature is
//! written straight away; otherwise it waits for the next flush. A slot
//! the current entity does not have is a [`TreeError::IncorrectPath`].
//!
//! Getters return copies and fail with [`TreeError::NotFound`] when the
//! feature is absent.

use meshtree_array::check_location;
use meshtree_core::{
    DataClass, GoverningEquationsType, GridLocation, Label, ModelType, NodeId, PointSetType,
    TreeError,
};
use meshtree_cursor::{address_multiple, address_single, Access, AddressCtx};
use meshtree_model::{
    AdditionalFamilyName, Axisymmetry, ConvergenceHistory, DataArray, DataConversion,
    DataSetPoints, Descriptor, DimensionalExponents, DimensionalUnits, EntityMut,
    FlowEquationSet, GoverningEquations, Gravity, Header, IntegralData, Model, Named, PointSet,
    PtsetSlot, ReferenceState, RotatingCoordinates, Selector, UserDefinedData,
};
use meshtree_store::NodeStore;

use crate::session::{Parts, Session};
use crate::write::{node_name, Writer};

/// The slot `access` finds in `entity`, or the path error naming it.
pub(crate) fn slot_of<'a, T>(
    entity: EntityMut<'a>,
    label: Label,
    access: impl FnOnce(EntityMut<'a>) -> Option<T>,
) -> Result<T, TreeError> {
    let from = entity.label();
    access(entity).ok_or_else(|| TreeError::IncorrectPath {
        from,
        requested: label.as_str().to_owned(),
    })
}

fn descriptors(e: EntityMut<'_>) -> Option<&mut Vec<Descriptor>> {
    e.into_meta().map(|m| &mut m.descriptors)
}

fn data_class(e: EntityMut<'_>) -> Option<&mut Option<DataClass>> {
    e.into_meta().map(|m| &mut m.data_class)
}

fn units(e: EntityMut<'_>) -> Option<&mut Option<DimensionalUnits>> {
    e.into_meta().map(|m| &mut m.units)
}

fn user_data(e: EntityMut<'_>) -> Option<&mut Vec<UserDefinedData>> {
    e.into_meta().map(|m| &mut m.user_data)
}

fn exponents(e: EntityMut<'_>) -> Option<&mut Option<DimensionalExponents>> {
    match e {
        EntityMut::DataArray(a) => Some(&mut a.exponents),
        _ => None,
    }
}

fn conversion(e: EntityMut<'_>) -> Option<&mut Option<DataConversion>> {
    match e {
        EntityMut::DataArray(a) => Some(&mut a.conversion),
        _ => None,
    }
}

fn governing(e: EntityMut<'_>) -> Option<&mut Option<GoverningEquations>> {
    match e {
        EntityMut::FlowEquationSet(s) => Some(&mut s.governing),
        _ => None,
    }
}

fn models(e: EntityMut<'_>) -> Option<&mut Vec<Model>> {
    match e {
        EntityMut::FlowEquationSet(s) => Some(&mut s.models),
        _ => None,
    }
}

impl<S: NodeStore + ?Sized> Session<'_, S> {
    // ── Generic slots ──────────────────────────────────────────────

    fn put_single<T, A, P>(&mut self, label: Label, name: &str, access: A, value: T, persist: P) -> Result<(), TreeError>
    where
        T: Default,
        A: for<'a> FnOnce(EntityMut<'a>) -> Option<&'a mut Option<T>>,
        P: FnOnce(&mut Writer<'_, S>, NodeId, &mut T) -> Result<(), TreeError>,
    {
        let Parts {
            resolved,
            ctx,
            mut writer,
        } = self.parts()?;
        let parent = resolved.id;
        let slot = slot_of(resolved.entity, label, access)?;
        let addressed = address_single(slot, Access::Write, &ctx, label, name)?;
        *addressed.item = value;
        match parent {
            Some(pid) => persist(&mut writer, pid, addressed.item),
            None => Ok(()),
        }
    }

    pub(crate) fn put_multiple<T, A, P>(&mut self, label: Label, value: T, access: A, persist: P) -> Result<(), TreeError>
    where
        T: Named + Default,
        A: for<'a> FnOnce(EntityMut<'a>) -> Option<&'a mut Vec<T>>,
        P: FnOnce(&mut Writer<'_, S>, NodeId, &mut T) -> Result<(), TreeError>,
    {
        let Parts {
            resolved,
            ctx,
            mut writer,
        } = self.parts()?;
        let parent = resolved.id;
        let items = slot_of(resolved.entity, label, access)?;
        let sel = Selector::Name(value.name().to_owned());
        let addressed = address_multiple(items, Access::Write, &ctx, label, &sel)?;
        *addressed.item = value;
        match parent {
            Some(pid) => persist(&mut writer, pid, addressed.item),
            None => Ok(()),
        }
    }

    fn get_single<T, A>(&mut self, label: Label, access: A) -> Result<T, TreeError>
    where
        T: Clone,
        A: for<'a> FnOnce(EntityMut<'a>) -> Option<&'a mut Option<T>>,
    {
        let path = self.cursor.path();
        let resolved = self.at()?;
        slot_of(resolved.entity, label, access)?
            .clone()
            .ok_or_else(|| TreeError::not_found(format!("{label} under {path}")))
    }

    fn get_multiple<T, A>(&mut self, label: Label, sel: &Selector, access: A) -> Result<T, TreeError>
    where
        T: Named + Clone,
        A: for<'a> FnOnce(EntityMut<'a>) -> Option<&'a mut Vec<T>>,
    {
        let path = self.cursor.path();
        let resolved = self.at()?;
        let items = slot_of(resolved.entity, label, access)?;
        meshtree_model::pick(items, sel)
            .map(|t| t.clone())
            .ok_or_else(|| TreeError::not_found(format!("{label} {sel} under {path}")))
    }

    fn count<T, A>(&mut self, label: Label, access: A) -> Result<usize, TreeError>
    where
        A: for<'a> FnOnce(EntityMut<'a>) -> Option<&'a mut Vec<T>>,
    {
        let resolved = self.at()?;
        Ok(slot_of(resolved.entity, label, access)?.len())
    }

    // ── Annotations ────────────────────────────────────────────────

    /// Add (or in modify mode replace) the descriptor `name`.
    pub fn descriptor_write(&mut self, name: &str, text: &str) -> Result<(), TreeError> {
        self.put_multiple(Label::Descriptor, Descriptor::new(name, text), descriptors, |w, pid, d| {
            w.descriptor(pid, d)
        })
    }

    /// Number of descriptors at the cursor.
    pub fn descriptor_count(&mut self) -> Result<usize, TreeError> {
        self.count(Label::Descriptor, descriptors)
    }

    /// The selected descriptor at the cursor.
    pub fn descriptor_read(&mut self, sel: impl Into<Selector>) -> Result<Descriptor, TreeError> {
        self.get_multiple(Label::Descriptor, &sel.into(), descriptors)
    }

    /// Set the data class.
    pub fn data_class_write(&mut self, class: DataClass) -> Result<(), TreeError> {
        self.put_single(Label::DataClass, node_name(Label::DataClass), data_class, class, |w, pid, c| {
            w.enum_node(pid, Label::DataClass, *c).map(drop)
        })
    }

    /// The data class.
    pub fn data_class_read(&mut self) -> Result<DataClass, TreeError> {
        self.get_single(Label::DataClass, data_class)
    }

    /// Set the dimensional units.
    pub fn units_write(&mut self, value: DimensionalUnits) -> Result<(), TreeError> {
        let value = DimensionalUnits {
            header: Header::new(DimensionalUnits::NODE_NAME),
            ..value
        };
        self.put_single(Label::DimensionalUnits, DimensionalUnits::NODE_NAME, units, value, |w, pid, u| {
            w.units(pid, u)
        })
    }

    /// The dimensional units.
    pub fn units_read(&mut self) -> Result<DimensionalUnits, TreeError> {
        self.get_single(Label::DimensionalUnits, units)
    }

    /// Set the dimensional exponents of the array at the cursor.
    pub fn exponents_write(&mut self, value: DimensionalExponents) -> Result<(), TreeError> {
        let value = DimensionalExponents {
            header: Header::new(DimensionalExponents::NODE_NAME),
            ..value
        };
        self.put_single(
            Label::DimensionalExponents,
            DimensionalExponents::NODE_NAME,
            exponents,
            value,
            |w, pid, e| w.exponents(pid, e),
        )
    }

    /// The dimensional exponents of the array at the cursor.
    pub fn exponents_read(&mut self) -> Result<DimensionalExponents, TreeError> {
        self.get_single(Label::DimensionalExponents, exponents)
    }

    /// Set the conversion factors of the array at the cursor.
    pub fn conversion_write(&mut self, scale: f64, offset: f64) -> Result<(), TreeError> {
        self.put_single(
            Label::DataConversion,
            DataConversion::NODE_NAME,
            conversion,
            DataConversion::new(scale, offset),
            |w, pid, c| w.conversion(pid, c),
        )
    }

    /// The conversion factors of the array at the cursor.
    pub fn conversion_read(&mut self) -> Result<DataConversion, TreeError> {
        self.get_single(Label::DataConversion, conversion)
    }

    /// Add an empty user-defined data container.
    pub fn user_data_write(&mut self, name: &str) -> Result<(), TreeError> {
        self.put_multiple(Label::UserDefinedData, UserDefinedData::new(name), user_data, |w, pid, u| {
            w.user_data(pid, u)
        })
    }

    /// Number of user-defined data containers at the cursor.
    pub fn user_data_count(&mut self) -> Result<usize, TreeError> {
        self.count(Label::UserDefinedData, user_data)
    }

    // ── Scalar features ────────────────────────────────────────────

    /// Set the rind planes `[lo0, hi0, lo1, hi1, ...]`.
    ///
    /// Needs two values per index axis and is refused on an entity that
    /// already has a point set.
    pub fn rind_write(&mut self, planes: &[i32]) -> Result<(), TreeError> {
        {
            let mut resolved = self.at()?;
            let expected = 2 * resolved.ctx.index_dim();
            let name = resolved.entity.header().name.clone();
            let label = resolved.entity.label();
            if planes.len() != expected {
                return Err(TreeError::schema(
                    label,
                    &name,
                    format!("rind needs {expected} values, got {}", planes.len()),
                ));
            }
            if planes.iter().any(|&p| p < 0) {
                return Err(TreeError::schema(label, &name, "negative rind plane count"));
            }
            if matches!(resolved.entity.reborrow().into_ptset(), Some(PtsetSlot::Single(Some(_)))) {
                return Err(TreeError::schema(label, &name, "rind planes and a point set are exclusive"));
            }
        }
        self.put_single(Label::Rind, node_name(Label::Rind), |e| e.into_rind(), planes.to_vec(), |w, pid, r| {
            w.rind(pid, Some(r.as_slice()))
        })
    }

    /// The rind planes.
    pub fn rind_read(&mut self) -> Result<Vec<i32>, TreeError> {
        self.get_single(Label::Rind, |e| e.into_rind())
    }

    /// Set the grid location, checked against the zone when inside one.
    pub fn location_write(&mut self, location: GridLocation) -> Result<(), TreeError> {
        if let Some(zone) = self.at()?.ctx.zone {
            check_location(zone.zone_type, zone.index_dim(), location)?;
        }
        self.put_single(
            Label::GridLocation,
            node_name(Label::GridLocation),
            |e| e.into_location(),
            location,
            |w, pid, l| w.location(pid, Some(*l)),
        )
    }

    /// The grid location; vertex when the entity admits one but has none.
    pub fn location_read(&mut self) -> Result<GridLocation, TreeError> {
        match self.get_single(Label::GridLocation, |e| e.into_location()) {
            Err(e) if e.is_not_found() => Ok(GridLocation::Vertex),
            other => other,
        }
    }

    /// Set the ordinal.
    pub fn ordinal_write(&mut self, ordinal: i32) -> Result<(), TreeError> {
        self.put_single(Label::Ordinal, node_name(Label::Ordinal), |e| e.into_ordinal(), ordinal, |w, pid, o| {
            w.ordinal(pid, Some(*o))
        })
    }

    /// The ordinal.
    pub fn ordinal_read(&mut self) -> Result<i32, TreeError> {
        self.get_single(Label::Ordinal, |e| e.into_ordinal())
    }

    /// Set the family reference.
    pub fn family_name_write(&mut self, family: &str) -> Result<(), TreeError> {
        self.put_single(
            Label::FamilyName,
            node_name(Label::FamilyName),
            |e| e.into_family_name(),
            family.to_owned(),
            |w, pid, f| w.family_name(pid, Some(f.as_str())),
        )
    }

    /// The family reference.
    pub fn family_name_read(&mut self) -> Result<String, TreeError> {
        self.get_single(Label::FamilyName, |e| e.into_family_name())
    }

    /// Add an additional family reference named `name`.
    pub fn additional_family_write(&mut self, name: &str, family: &str) -> Result<(), TreeError> {
        self.put_multiple(
            Label::AdditionalFamilyName,
            AdditionalFamilyName::new(name, family),
            |e| e.into_additional_families(),
            |w, pid, f| w.additional_families(pid, std::slice::from_mut(f)),
        )
    }

    /// The selected additional family reference.
    pub fn additional_family_read(&mut self, sel: impl Into<Selector>) -> Result<AdditionalFamilyName, TreeError> {
        self.get_multiple(Label::AdditionalFamilyName, &sel.into(), |e| e.into_additional_families())
    }

    // ── Physics ────────────────────────────────────────────────────

    /// Create the reference state, optionally with a description.
    pub fn state_write(&mut self, description: Option<&str>) -> Result<(), TreeError> {
        let state = ReferenceState {
            description: description.map(|d| Descriptor::new(ReferenceState::DESCRIPTION_NODE, d)),
            ..ReferenceState::new()
        };
        self.put_single(Label::ReferenceState, ReferenceState::NODE_NAME, |e| e.into_state(), state, |w, pid, s| {
            w.opt_state(pid, Some(s))
        })
    }

    /// The reference state.
    pub fn state_read(&mut self) -> Result<ReferenceState, TreeError> {
        self.get_single(Label::ReferenceState, |e| e.into_state())
    }

    /// Create the convergence history.
    pub fn convergence_write(&mut self, iterations: i32, norms: Option<&str>) -> Result<(), TreeError> {
        let name = match self.at()?.entity.label() {
            Label::Base => ConvergenceHistory::GLOBAL_NAME,
            _ => ConvergenceHistory::ZONE_NAME,
        };
        let history = ConvergenceHistory {
            header: Header::new(name),
            iterations,
            norm_definitions: norms.map(|n| Descriptor::new(ConvergenceHistory::NORMS_NODE, n)),
            ..ConvergenceHistory::default()
        };
        self.put_single(Label::ConvergenceHistory, name, |e| e.into_convergence(), history, |w, pid, h| {
            w.opt_convergence(pid, Some(h))
        })
    }

    /// The convergence history.
    pub fn convergence_read(&mut self) -> Result<ConvergenceHistory, TreeError> {
        self.get_single(Label::ConvergenceHistory, |e| e.into_convergence())
    }

    /// Create the flow equation set.
    pub fn equations_write(&mut self, equation_dim: Option<i32>) -> Result<(), TreeError> {
        let set = FlowEquationSet {
            equation_dim,
            ..FlowEquationSet::new()
        };
        self.put_single(
            Label::FlowEquationSet,
            FlowEquationSet::NODE_NAME,
            |e| e.into_equations(),
            set,
            |w, pid, s| w.opt_equations(pid, Some(s)),
        )
    }

    /// The flow equation set.
    pub fn equations_read(&mut self) -> Result<FlowEquationSet, TreeError> {
        self.get_single(Label::FlowEquationSet, |e| e.into_equations())
    }

    /// Set the governing equations of the flow equation set at the cursor.
    pub fn governing_write(&mut self, equations_type: GoverningEquationsType) -> Result<(), TreeError> {
        let gov = GoverningEquations {
            header: Header::new(GoverningEquations::NODE_NAME),
            equations_type,
            ..GoverningEquations::default()
        };
        self.put_single(Label::GoverningEquations, GoverningEquations::NODE_NAME, governing, gov, |w, pid, g| {
            w.governing(pid, g)
        })
    }

    /// Set the model stored under `label` (gas, viscosity, turbulence, ...)
    /// of the flow equation set at the cursor.
    pub fn model_write(&mut self, label: Label, model_type: ModelType) -> Result<(), TreeError> {
        if !meshtree_model::EntityKind::from_label(label).is_some_and(|k| matches!(k, meshtree_model::EntityKind::Model(_))) {
            return Err(TreeError::IncorrectPath {
                from: Label::FlowEquationSet,
                requested: label.as_str().to_owned(),
            });
        }
        self.put_multiple(label, Model::new(label, model_type), models, |w, pid, m| w.model(pid, m))
    }

    /// The model stored under `label`.
    pub fn model_read(&mut self, label: Label) -> Result<Model, TreeError> {
        self.get_multiple(label, &Selector::Name(Model::node_name(label).to_owned()), models)
    }

    /// Set the diffusion model flags of the governing equations or
    /// turbulence model at the cursor.
    pub fn diffusion_write(&mut self, flags: &[i32]) -> Result<(), TreeError> {
        self.put_single(
            Label::IntDiffusion,
            GoverningEquations::DIFFUSION_NODE,
            |e| e.into_diffusion(),
            flags.to_vec(),
            |w, pid, f| {
                w.ints_node(pid, GoverningEquations::DIFFUSION_NODE, Label::IntDiffusion, f)
                    .map(drop)
            },
        )
    }

    /// The diffusion model flags.
    pub fn diffusion_read(&mut self) -> Result<Vec<i32>, TreeError> {
        self.get_single(Label::IntDiffusion, |e| e.into_diffusion())
    }

    /// Set the gravity vector of the base at the cursor.
    pub fn gravity_write(&mut self, vector: &[f32]) -> Result<(), TreeError> {
        let phys_dim = self.at()?.ctx.phys_dim;
        if vector.len() != phys_dim.max(0) as usize {
            return Err(TreeError::schema(
                Label::Gravity,
                Gravity::NODE_NAME,
                format!("vector needs {phys_dim} components, got {}", vector.len()),
            ));
        }
        self.put_single(Label::Gravity, Gravity::NODE_NAME, |e| e.into_gravity(), Gravity::new(vector), |w, pid, g| {
            w.container(pid, &mut g.header, Label::Gravity, &mut g.arrays, &mut g.meta)
                .map(drop)
        })
    }

    /// Gravity of the base at the cursor.
    pub fn gravity_read(&mut self) -> Result<Gravity, TreeError> {
        self.get_single(Label::Gravity, |e| e.into_gravity())
    }

    /// Set the axisymmetry reference point and axis of the base at the
    /// cursor.
    pub fn axisymmetry_write(&mut self, point: &[f32], axis: &[f32]) -> Result<(), TreeError> {
        let mut value = Axisymmetry::new();
        value.arrays = vec![
            DataArray::vector("AxisymmetryReferencePoint", meshtree_core::Data::R4(point.to_vec())),
            DataArray::vector("AxisymmetryAxisVector", meshtree_core::Data::R4(axis.to_vec())),
        ];
        self.put_single(
            Label::Axisymmetry,
            Axisymmetry::NODE_NAME,
            |e| e.into_axisymmetry(),
            value,
            |w, pid, a| {
                w.container(pid, &mut a.header, Label::Axisymmetry, &mut a.arrays, &mut a.meta)
                    .map(drop)
            },
        )
    }

    /// Set the rotating frame (rate vector and center).
    pub fn rotating_write(&mut self, rate: &[f32], center: &[f32]) -> Result<(), TreeError> {
        let mut value = RotatingCoordinates::new();
        value.arrays = vec![
            DataArray::vector("RotationRateVector", meshtree_core::Data::R4(rate.to_vec())),
            DataArray::vector("RotationCenter", meshtree_core::Data::R4(center.to_vec())),
        ];
        self.put_single(
            Label::RotatingCoordinates,
            RotatingCoordinates::NODE_NAME,
            |e| e.into_rotating(),
            value,
            |w, pid, r| {
                w.container(pid, &mut r.header, Label::RotatingCoordinates, &mut r.arrays, &mut r.meta)
                    .map(drop)
            },
        )
    }

    /// Add an integral data container.
    pub fn integral_write(&mut self, name: &str) -> Result<(), TreeError> {
        self.put_multiple(Label::IntegralData, IntegralData::new(name), |e| e.into_integrals(), |w, pid, i| {
            w.container(pid, &mut i.header, Label::IntegralData, &mut i.arrays, &mut i.meta)
                .map(drop)
        })
    }

    // ── Point sets ─────────────────────────────────────────────────

    /// Give the entity at the cursor a point set of `kind`.
    ///
    /// Ranges take two corners (`2 * index_dim` values, element sets use
    /// index dimension 1); lists take any multiple of the index dimension.
    /// In modify mode an existing set is deleted first, whatever its kind.
    pub fn ptset_write(&mut self, kind: PointSetType, points: &[i64]) -> Result<(), TreeError> {
        let width = self.config.index_width;
        let mut set = {
            let mut resolved = self.at()?;
            let dim = match kind {
                PointSetType::ElementRange | PointSetType::ElementList => 1,
                _ => resolved.ctx.index_dim(),
            };
            let label = resolved.entity.label();
            let name = resolved.entity.header().name.clone();
            if matches!(resolved.entity.reborrow().into_rind(), Some(Some(_))) {
                return Err(TreeError::schema(label, &name, "rind planes and a point set are exclusive"));
            }
            build_ptset(kind, dim, points).map_err(|detail| TreeError::schema(label, &name, detail))?
        };
        set.data_type = width.data_type(points);

        let Parts {
            resolved,
            ctx,
            mut writer,
        } = self.parts()?;
        let parent = resolved.id;
        match slot_of(resolved.entity, set.label(), EntityMut::into_ptset)? {
            PtsetSlot::Single(slot) => {
                let placed = place_ptset(slot, set, &ctx, &mut writer)?;
                if let Some(pid) = parent {
                    writer.ptset(pid, placed)?;
                }
            }
            PtsetSlot::DataSet(points) => {
                let mut own = points.own().cloned();
                place_ptset(&mut own, set, &ctx, &mut writer)?;
                if let Some(own) = own {
                    *points = DataSetPoints::Own(own);
                }
                if let (Some(pid), DataSetPoints::Own(p)) = (parent, points) {
                    writer.ptset(pid, p)?;
                }
            }
            PtsetSlot::Many(_) => {
                return Err(TreeError::IncorrectPath {
                    from: Label::OversetHoles,
                    requested: kind.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Kind and number of stored points of the point set at the cursor.
    ///
    /// Overset holes report their first set.
    pub fn ptset_info(&mut self) -> Result<(PointSetType, usize), TreeError> {
        let set = self.ptset_read()?;
        Ok((set.kind, set.npts))
    }

    /// The point set at the cursor.
    pub fn ptset_read(&mut self) -> Result<PointSet, TreeError> {
        let path = self.cursor.path();
        let resolved = self.at()?;
        let found = match slot_of(resolved.entity, Label::IndexArray, EntityMut::into_ptset)? {
            PtsetSlot::Single(slot) => slot.clone(),
            PtsetSlot::DataSet(points) => points.own().cloned(),
            PtsetSlot::Many(sets) => sets.first().cloned(),
        };
        found.ok_or_else(|| TreeError::not_found(format!("point set under {path}")))
    }
}

/// A set of `kind` over `points` with `dim` indices per point.
pub(crate) fn build_ptset(kind: PointSetType, dim: usize, points: &[i64]) -> Result<PointSet, String> {
    if dim == 0 {
        return Err("index dimension is zero".to_owned());
    }
    if kind.is_range() {
        if points.len() != 2 * dim {
            return Err(format!("{kind} needs {} values, got {}", 2 * dim, points.len()));
        }
        Ok(PointSet::range(kind, &points[..dim], &points[dim..]))
    } else {
        if points.is_empty() || points.len() % dim != 0 {
            return Err(format!("{kind} needs a non-empty multiple of {dim} values, got {}", points.len()));
        }
        Ok(PointSet::list(kind, dim, points.to_vec()))
    }
}

/// Put `set` into `slot` under the addressing rules; a replaced set that
/// was already stored is deleted from the file.
fn place_ptset<'a, S: NodeStore + ?Sized>(
    slot: &'a mut Option<PointSet>,
    set: PointSet,
    ctx: &AddressCtx,
    writer: &mut Writer<'_, S>,
) -> Result<&'a mut PointSet, TreeError> {
    let label = set.label();
    let name = set.header.name.clone();
    let old = slot.as_ref().and_then(|p| p.header.id);
    let addressed = address_single(slot, Access::Write, ctx, label, &name)?;
    if let (true, Some(old)) = (addressed.replaced, old) {
        writer.store().delete_node(old)?;
    }
    *addressed.item = set;
    Ok(addressed.item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionConfig;
    use meshtree_core::{FileMode, MassUnits, ZoneType};
    use meshtree_store::{BackendFlavor, MemoryStore};

    fn zone_session(store: &mut MemoryStore, mode: FileMode) -> Session<'_, MemoryStore> {
        let mut s = Session::open(store, "f.cgns", mode, SessionConfig::default()).unwrap();
        if mode == FileMode::Write {
            s.base_write("Base", 2, 2).unwrap();
            s.zone_write(1, "Block", ZoneType::Structured, &[4, 3, 3, 2, 0, 0]).unwrap();
        }
        s.goto(1, &[(Label::Zone, Selector::Index(1))]).unwrap();
        s
    }

    #[test]
    fn descriptor_is_written_and_read_back() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = zone_session(&mut store, FileMode::Write);
        s.descriptor_write("Note", "hello").unwrap();
        assert_eq!(s.descriptor_count().unwrap(), 1);
        assert_eq!(s.descriptor_read(Selector::Index(1)).unwrap().text, "hello");
        assert!(matches!(
            s.descriptor_write("Note", "again"),
            Err(TreeError::DuplicateChild { .. })
        ));
        s.close().unwrap();

        let s2 = Session::open(&mut store, "f.cgns", FileMode::Read, SessionConfig::default()).unwrap();
        let zone = &s2.tree().bases[0].zones[0];
        assert_eq!(zone.meta.descriptors[0].text, "hello");
    }

    #[test]
    fn modify_mode_replaces_singletons() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        zone_session(&mut store, FileMode::Write).close().unwrap();
        let mut s = zone_session(&mut store, FileMode::Modify);
        s.ordinal_write(3).unwrap();
        s.ordinal_write(5).unwrap();
        assert_eq!(s.ordinal_read().unwrap(), 5);
        s.close().unwrap();
        let s = Session::open(&mut store, "f.cgns", FileMode::Read, SessionConfig::default()).unwrap();
        assert_eq!(s.tree().bases[0].zones[0].ordinal, Some(5));
    }

    #[test]
    fn absent_feature_is_not_found_and_foreign_slot_is_incorrect_path() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = zone_session(&mut store, FileMode::Write);
        assert!(s.family_name_read().unwrap_err().is_not_found());
        assert!(matches!(s.gravity_write(&[0.0, -9.8]), Err(TreeError::IncorrectPath { .. })));
    }

    #[test]
    fn units_survive_a_round_trip() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = zone_session(&mut store, FileMode::Write);
        let units = DimensionalUnits {
            mass: MassUnits::Kilogram,
            ..DimensionalUnits::default()
        };
        s.units_write(units).unwrap();
        s.close().unwrap();
        let mut s = zone_session(&mut store, FileMode::Read);
        assert_eq!(s.units_read().unwrap().mass, MassUnits::Kilogram);
    }

    #[test]
    fn rind_length_follows_index_dimension() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = zone_session(&mut store, FileMode::Write);
        s.grid_write(1, 1, "GridCoordinates").unwrap();
        s.advance(Label::GridCoordinates, Selector::Index(1)).unwrap();
        assert!(matches!(s.rind_write(&[1, 1]), Err(TreeError::SchemaViolation { .. })));
        s.rind_write(&[1, 1, 0, 0]).unwrap();
        assert_eq!(s.rind_read().unwrap(), vec![1, 1, 0, 0]);
    }

    #[test]
    fn ptset_replacement_in_modify_mode_changes_kind() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        {
            let mut s = zone_session(&mut store, FileMode::Write);
            s.solution_write(1, 1, "Sol", GridLocation::Vertex).unwrap();
            s.advance(Label::FlowSolution, Selector::Index(1)).unwrap();
            s.ptset_write(PointSetType::PointRange, &[1, 1, 2, 2]).unwrap();
            assert_eq!(s.ptset_info().unwrap(), (PointSetType::PointRange, 2));
            s.close().unwrap();
        }
        let mut s = zone_session(&mut store, FileMode::Modify);
        s.advance(Label::FlowSolution, Selector::Index(1)).unwrap();
        s.ptset_write(PointSetType::PointList, &[1, 1, 3, 2, 4, 3]).unwrap();
        let sol = s.tree().bases[0].zones[0].solutions[0].header.id.unwrap();
        assert!(s.store().child_by_name(sol, "PointRange").unwrap().is_none());
        assert!(s.store().child_by_name(sol, "PointList").unwrap().is_some());
        assert_eq!(s.ptset_read().unwrap().size_of_patch, 3);
    }

    #[test]
    fn models_are_keyed_by_label() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = zone_session(&mut store, FileMode::Write);
        s.equations_write(Some(4)).unwrap();
        s.advance(Label::FlowEquationSet, Selector::Index(1)).unwrap();
        s.governing_write(GoverningEquationsType::NSTurbulent).unwrap();
        s.model_write(Label::GasModel, ModelType::Ideal).unwrap();
        assert_eq!(s.model_read(Label::GasModel).unwrap().model_type, ModelType::Ideal);
        assert!(matches!(
            s.model_write(Label::Zone, ModelType::Ideal),
            Err(TreeError::IncorrectPath { .. })
        ));
    }
}
