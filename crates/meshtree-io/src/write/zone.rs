//! Zones, element sections and the field containers under a zone.

use meshtree_core::{Data, DataType, GridLocation, Label, NamedEnum, NodeId, TreeError};
use meshtree_model::{
    fitting_index_type, ArbitraryGridMotion, DataArray, GridCoordinates, Header, Meta, PointSet,
    RigidGridMotion, Section, Zone, ZoneSubRegion,
};
use meshtree_store::NodeStore;

use super::Writer;
use crate::validate::check_unwritten;

impl<S: NodeStore + ?Sized> Writer<'_, S> {
    pub(crate) fn zone(&mut self, parent: NodeId, zone: &mut Zone) -> Result<(), TreeError> {
        check_unwritten(zone)?;
        let size_type = match zone.size_type {
            DataType::Int32 | DataType::Int64 => zone.size_type,
            _ => fitting_index_type(&zone.sizes),
        };
        let data = Data::index(&zone.sizes, size_type);
        let dims = [zone.index_dim(), 3];
        let entry = self.enter(parent, &mut zone.header, Label::Zone, data.data_type(), &dims, Some(&data))?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        let fresh = entry.is_fresh();
        if fresh {
            self.text_node(id, Zone::TYPE_NODE, Label::ZoneType, zone.zone_type.name())?;
            self.family_name(id, zone.family.as_deref())?;
            self.ordinal(id, zone.ordinal)?;
        }

        for coords in &mut zone.coordinates {
            self.coordinates(id, coords)?;
        }
        for section in &mut zone.sections {
            self.section(id, section)?;
        }
        for sol in &mut zone.solutions {
            self.field(id, Label::FlowSolution, FieldRefs {
                header: &mut sol.header,
                location: sol.location,
                rind: sol.rind.as_deref(),
                ptset: sol.ptset.as_mut(),
                arrays: &mut sol.arrays,
                meta: &mut sol.meta,
            })?;
        }
        for dd in &mut zone.discrete {
            self.field(id, Label::DiscreteData, FieldRefs {
                header: &mut dd.header,
                location: dd.location,
                rind: dd.rind.as_deref(),
                ptset: dd.ptset.as_mut(),
                arrays: &mut dd.arrays,
                meta: &mut dd.meta,
            })?;
        }
        for i in &mut zone.integrals {
            self.container(id, &mut i.header, Label::IntegralData, &mut i.arrays, &mut i.meta)?;
        }
        for c in &mut zone.connectivity {
            self.zone_connectivity(id, c)?;
        }
        if let Some(bc) = &mut zone.bc {
            self.zone_bc(id, bc)?;
        }
        self.opt_state(id, zone.state.as_mut())?;
        for m in &mut zone.rigid_motions {
            self.rigid_motion(id, m)?;
        }
        for m in &mut zone.arbitrary_motions {
            self.arbitrary_motion(id, m)?;
        }
        if let Some(it) = &mut zone.iterative {
            self.container(id, &mut it.header, Label::ZoneIterativeData, &mut it.arrays, &mut it.meta)?;
        }
        if let Some(r) = &mut zone.rotating {
            self.container(id, &mut r.header, Label::RotatingCoordinates, &mut r.arrays, &mut r.meta)?;
        }
        self.opt_convergence(id, zone.convergence.as_mut())?;
        self.opt_equations(id, zone.equations.as_mut())?;
        for region in &mut zone.subregions {
            self.subregion(id, region)?;
        }
        self.additional_families(id, &mut zone.additional_families)?;
        self.meta(id, &mut zone.meta, fresh)
    }

    fn coordinates(&mut self, parent: NodeId, coords: &mut GridCoordinates) -> Result<(), TreeError> {
        let entry = self.enter_empty(parent, &mut coords.header, Label::GridCoordinates)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            self.rind(id, coords.rind.as_deref())?;
        }
        self.arrays(id, &mut coords.arrays)?;
        self.meta(id, &mut coords.meta, entry.is_fresh())
    }

    // ── Sections ───────────────────────────────────────────────────

    pub(crate) fn section(&mut self, parent: NodeId, section: &mut Section) -> Result<(), TreeError> {
        let data = Data::I4(vec![section.element_type.code(), section.boundary]);
        let entry = self.enter(parent, &mut section.header, Label::Elements, DataType::Int32, &[2], Some(&data))?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            let range = Data::index(&section.range, section.index_type());
            self.put_node(id, Section::RANGE_NODE, Label::IndexRange, range.data_type(), &[2], Some(&range))?;
            self.rind(id, section.rind.as_deref())?;
        }
        self.array(id, &mut section.connectivity, Label::DataArray)?;
        for part in [
            section.offsets.as_mut(),
            section.parent_elements.as_mut(),
            section.parent_positions.as_mut(),
        ] {
            self.opt_array(id, part)?;
        }
        self.meta(id, &mut section.meta, entry.is_fresh())
    }

    // ── Fields ─────────────────────────────────────────────────────

    fn field(&mut self, parent: NodeId, label: Label, field: FieldRefs<'_>) -> Result<(), TreeError> {
        let entry = self.enter_empty(parent, field.header, label)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            self.location(id, field.location)?;
            self.rind(id, field.rind)?;
        }
        self.opt_ptset(id, field.ptset)?;
        self.arrays(id, field.arrays)?;
        self.meta(id, field.meta, entry.is_fresh())
    }

    // ── Motion ─────────────────────────────────────────────────────

    fn rigid_motion(&mut self, parent: NodeId, motion: &mut RigidGridMotion) -> Result<(), TreeError> {
        let entry = self.enter_empty(parent, &mut motion.header, Label::RigidGridMotion)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            self.enum_node(id, Label::RigidGridMotionType, motion.motion_type)?;
        }
        self.arrays(id, &mut motion.arrays)?;
        self.meta(id, &mut motion.meta, entry.is_fresh())
    }

    fn arbitrary_motion(&mut self, parent: NodeId, motion: &mut ArbitraryGridMotion) -> Result<(), TreeError> {
        let entry = self.enter_empty(parent, &mut motion.header, Label::ArbitraryGridMotion)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            self.enum_node(id, Label::ArbitraryGridMotionType, motion.motion_type)?;
            self.location(id, motion.location)?;
            self.rind(id, motion.rind.as_deref())?;
        }
        self.arrays(id, &mut motion.arrays)?;
        self.meta(id, &mut motion.meta, entry.is_fresh())
    }

    // ── Sub-regions ────────────────────────────────────────────────

    fn subregion(&mut self, parent: NodeId, region: &mut ZoneSubRegion) -> Result<(), TreeError> {
        let data = Data::I4(vec![region.region_dim]);
        let entry = self.enter(parent, &mut region.header, Label::ZoneSubRegion, DataType::Int32, &[1], Some(&data))?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            self.location(id, region.location)?;
            self.rind(id, region.rind.as_deref())?;
            self.family_name(id, region.family.as_deref())?;
        }
        self.opt_ptset(id, region.ptset.as_mut())?;
        self.opt_descriptor(id, region.bc_region.as_mut())?;
        self.opt_descriptor(id, region.gc_region.as_mut())?;
        self.additional_families(id, &mut region.additional_families)?;
        self.arrays(id, &mut region.arrays)?;
        self.meta(id, &mut region.meta, entry.is_fresh())
    }
}

/// Borrowed parts of a flow solution or discrete data container.
struct FieldRefs<'a> {
    header: &'a mut Header,
    location: Option<GridLocation>,
    rind: Option<&'a [i32]>,
    ptset: Option<&'a mut PointSet>,
    arrays: &'a mut [DataArray],
    meta: &'a mut Meta,
}
