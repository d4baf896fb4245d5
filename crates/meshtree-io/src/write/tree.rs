//! File, bases, families and the physics records they own.

use meshtree_core::{Data, DataType, Label, NamedEnum, NodeId, TreeError};
use meshtree_model::{
    Base, BaseIterativeData, ConvergenceHistory, DataArray, Family, File, FlowEquationSet,
    GeometryReference, GoverningEquations, Header, Meta, Model, ReferenceState,
};
use meshtree_store::NodeStore;

use super::{Entry, Writer};
use crate::validate::{check_base_dims, check_unwritten, check_zone};

impl<S: NodeStore + ?Sized> Writer<'_, S> {
    /// Persist everything in `file` that has no store handle yet.
    pub(crate) fn file(&mut self, file: &mut File) -> Result<(), TreeError> {
        let root = self.root;
        for base in &mut file.bases {
            self.base(root, base)?;
        }
        Ok(())
    }

    pub(crate) fn base(&mut self, parent: NodeId, base: &mut Base) -> Result<(), TreeError> {
        let header = &base.header;
        if !header.in_link && header.link.is_none() {
            if header.id.is_none() {
                check_base_dims(base.cell_dim, base.phys_dim)
                    .map_err(|d| TreeError::schema(Label::Base, &header.name, d))?;
            }
            // Nothing of the base is stored unless every new zone is sound.
            for zone in &base.zones {
                if zone.header.id.is_none() && zone.header.link.is_none() {
                    check_zone(zone, base.cell_dim).map_err(|d| TreeError::schema(Label::Zone, &zone.header.name, d))?;
                }
                check_unwritten(zone)?;
            }
        }
        let data = Data::I4(vec![base.cell_dim, base.phys_dim]);
        let entry = self.enter(parent, &mut base.header, Label::Base, DataType::Int32, &[2], Some(&data))?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            self.opt_enum(id, Label::SimulationType, base.simulation)?;
        }
        self.opt_state(id, base.state.as_mut())?;
        if let Some(g) = &mut base.gravity {
            self.container(id, &mut g.header, Label::Gravity, &mut g.arrays, &mut g.meta)?;
        }
        if let Some(a) = &mut base.axisymmetry {
            self.container(id, &mut a.header, Label::Axisymmetry, &mut a.arrays, &mut a.meta)?;
        }
        if let Some(r) = &mut base.rotating {
            self.container(id, &mut r.header, Label::RotatingCoordinates, &mut r.arrays, &mut r.meta)?;
        }
        self.opt_convergence(id, base.convergence.as_mut())?;
        self.opt_equations(id, base.equations.as_mut())?;
        for i in &mut base.integrals {
            self.container(id, &mut i.header, Label::IntegralData, &mut i.arrays, &mut i.meta)?;
        }
        if let Some(it) = &mut base.iterative {
            self.base_iterative(id, it)?;
        }
        for fam in &mut base.families {
            self.family(id, fam, Label::Family)?;
        }
        for zone in &mut base.zones {
            self.zone(id, zone)?;
        }
        self.meta(id, &mut base.meta, entry.is_fresh())
    }

    // ── Array containers ───────────────────────────────────────────

    /// A record made of arrays and annotations only.
    pub(crate) fn container(
        &mut self,
        parent: NodeId,
        header: &mut Header,
        label: Label,
        arrays: &mut [DataArray],
        meta: &mut Meta,
    ) -> Result<Entry, TreeError> {
        let entry = self.enter_empty(parent, header, label)?;
        if let Some(id) = entry.id() {
            self.arrays(id, arrays)?;
            self.meta(id, meta, entry.is_fresh())?;
        }
        Ok(entry)
    }

    fn base_iterative(&mut self, parent: NodeId, it: &mut BaseIterativeData) -> Result<(), TreeError> {
        let data = Data::I4(vec![it.steps]);
        let entry = self.enter(parent, &mut it.header, Label::BaseIterativeData, DataType::Int32, &[1], Some(&data))?;
        if let Some(id) = entry.id() {
            self.arrays(id, &mut it.arrays)?;
            self.meta(id, &mut it.meta, entry.is_fresh())?;
        }
        Ok(())
    }

    // ── Physics ────────────────────────────────────────────────────

    pub(crate) fn opt_state(&mut self, parent: NodeId, state: Option<&mut ReferenceState>) -> Result<(), TreeError> {
        let Some(state) = state else {
            return Ok(());
        };
        let entry = self.enter_empty(parent, &mut state.header, Label::ReferenceState)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        self.opt_descriptor(id, state.description.as_mut())?;
        self.arrays(id, &mut state.arrays)?;
        self.meta(id, &mut state.meta, entry.is_fresh())
    }

    pub(crate) fn opt_convergence(
        &mut self,
        parent: NodeId,
        history: Option<&mut ConvergenceHistory>,
    ) -> Result<(), TreeError> {
        let Some(history) = history else {
            return Ok(());
        };
        let data = Data::I4(vec![history.iterations]);
        let entry = self.enter(
            parent,
            &mut history.header,
            Label::ConvergenceHistory,
            DataType::Int32,
            &[1],
            Some(&data),
        )?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        self.opt_descriptor(id, history.norm_definitions.as_mut())?;
        self.arrays(id, &mut history.arrays)?;
        self.meta(id, &mut history.meta, entry.is_fresh())
    }

    pub(crate) fn opt_equations(
        &mut self,
        parent: NodeId,
        set: Option<&mut FlowEquationSet>,
    ) -> Result<(), TreeError> {
        let Some(set) = set else {
            return Ok(());
        };
        let entry = self.enter_empty(parent, &mut set.header, Label::FlowEquationSet)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            if let Some(dim) = set.equation_dim {
                self.ints_node(id, FlowEquationSet::DIMENSION_NODE, Label::Int, &[dim])?;
            }
        }
        if let Some(gov) = &mut set.governing {
            self.governing(id, gov)?;
        }
        for model in &mut set.models {
            self.model(id, model)?;
        }
        self.meta(id, &mut set.meta, entry.is_fresh())
    }

    pub(crate) fn governing(&mut self, parent: NodeId, gov: &mut GoverningEquations) -> Result<(), TreeError> {
        let data = Data::text(gov.equations_type.name());
        let entry = self.enter(
            parent,
            &mut gov.header,
            Label::GoverningEquations,
            DataType::Char,
            &[data.len()],
            Some(&data),
        )?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            if let Some(flags) = &gov.diffusion {
                self.ints_node(id, GoverningEquations::DIFFUSION_NODE, Label::IntDiffusion, flags)?;
            }
        }
        self.meta(id, &mut gov.meta, entry.is_fresh())
    }

    pub(crate) fn model(&mut self, parent: NodeId, model: &mut Model) -> Result<(), TreeError> {
        let data = Data::text(model.model_type.name());
        let entry = self.enter(parent, &mut model.header, model.label, DataType::Char, &[data.len()], Some(&data))?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            if let Some(flags) = &model.diffusion {
                self.ints_node(id, GoverningEquations::DIFFUSION_NODE, Label::IntDiffusion, flags)?;
            }
        }
        self.arrays(id, &mut model.arrays)?;
        self.meta(id, &mut model.meta, entry.is_fresh())
    }

    // ── Families ───────────────────────────────────────────────────

    pub(crate) fn family(&mut self, parent: NodeId, family: &mut Family, label: Label) -> Result<(), TreeError> {
        let entry = self.enter_empty(parent, &mut family.header, label)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            self.family_name(id, family.family.as_deref())?;
            self.ordinal(id, family.ordinal)?;
        }
        if let Some(fbc) = &mut family.family_bc {
            let data = Data::text(fbc.bc_type.name());
            let fbc_entry = self.enter(id, &mut fbc.header, Label::FamilyBC, DataType::Char, &[data.len()], Some(&data))?;
            if let Some(fbc_id) = fbc_entry.id() {
                for ds in &mut fbc.datasets {
                    self.dataset(fbc_id, ds, Label::FamilyBCDataSet)?;
                }
            }
        }
        for geo in &mut family.geometries {
            self.geometry(id, geo)?;
        }
        if let Some(r) = &mut family.rotating {
            self.container(id, &mut r.header, Label::RotatingCoordinates, &mut r.arrays, &mut r.meta)?;
        }
        for sub in &mut family.families {
            self.family(id, sub, Label::Family)?;
        }
        self.additional_families(id, &mut family.additional_families)?;
        self.meta(id, &mut family.meta, entry.is_fresh())
    }

    fn geometry(&mut self, parent: NodeId, geo: &mut GeometryReference) -> Result<(), TreeError> {
        let entry = self.enter_empty(parent, &mut geo.header, Label::GeometryReference)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            self.text_node(id, GeometryReference::FILE_NODE, Label::GeometryFile, &geo.file)?;
            self.text_node(id, GeometryReference::FORMAT_NODE, Label::GeometryFormat, &geo.format)?;
            for part in &geo.entities {
                self.put_node(id, part, Label::GeometryEntity, DataType::Empty, &[], None)?;
            }
        }
        self.meta(id, &mut geo.meta, entry.is_fresh())
    }
}
