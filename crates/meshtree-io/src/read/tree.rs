//! File, bases, families and the physics records they own.

use meshtree_core::{Label, NodeId, SimulationType, TreeError};
use meshtree_model::{
    Axisymmetry, Base, BaseIterativeData, ConvergenceHistory, DataArray, EntityKind, Family,
    FamilyBC, File, FlowEquationSet, GeometryReference, GoverningEquations, Gravity, Header,
    IntegralData, Meta, Model, ReferenceState, RotatingCoordinates, TraversalContext,
};
use meshtree_store::NodeStore;

use super::{Reader, Scope};
use crate::validate::check_base_dims;

/// Model labels in the order they appear under a flow equation set.
const MODEL_LABELS: [Label; 10] = [
    Label::GasModel,
    Label::ViscosityModel,
    Label::ThermalConductivityModel,
    Label::TurbulenceClosure,
    Label::TurbulenceModel,
    Label::ThermalRelaxationModel,
    Label::ChemicalKineticsModel,
    Label::EMElectricFieldModel,
    Label::EMMagneticFieldModel,
    Label::EMConductivityModel,
];

impl<S: NodeStore + ?Sized> Reader<'_, S> {
    /// Read the whole file rooted at `root`.
    pub(crate) fn file(&mut self, root: NodeId, name: &str) -> Result<File, TreeError> {
        let mut file = File::new(name);
        file.header.id = Some(root);
        file.version = self.version;
        for id in self.children(root, Label::Base)? {
            let base = self.base(id)?;
            file.bases.push(base);
        }
        Ok(file)
    }

    fn base(&mut self, id: NodeId) -> Result<Base, TreeError> {
        let header = self.header(id, false)?;
        let dims = self.ints(id, Label::Base)?;
        let (cell_dim, phys_dim) = match dims.as_slice() {
            [c, p] => (*c as i32, *p as i32),
            _ => {
                return Err(TreeError::schema(
                    Label::Base,
                    &header.name,
                    format!("expected [CellDimension, PhysicalDimension], found {} values", dims.len()),
                ))
            }
        };
        check_base_dims(cell_dim, phys_dim)
            .map_err(|detail| TreeError::schema(Label::Base, &header.name, detail))?;
        let mut base = Base {
            header,
            cell_dim,
            phys_dim,
            ..Base::default()
        };
        let scope = Scope {
            ctx: TraversalContext::of_base(&base),
            in_link: base.header.in_link,
        };

        base.state = self.opt_state(id, &scope)?;
        base.gravity = self
            .single(id, Label::Gravity)?
            .map(|g| self.gravity(g, &scope))
            .transpose()?;
        base.axisymmetry = self
            .single(id, Label::Axisymmetry)?
            .map(|a| {
                self.container(a, &scope, EntityKind::Axisymmetry, |header, arrays, meta| {
                    Axisymmetry {
                        header,
                        arrays,
                        meta,
                    }
                })
            })
            .transpose()?;
        base.rotating = self.opt_rotating(id, &scope)?;
        base.convergence = self.opt_convergence(id, &scope)?;
        base.equations = self.opt_equations(id, &scope)?;
        base.integrals = self.integrals(id, &scope)?;
        base.simulation = self.opt_enum::<SimulationType>(id, Label::SimulationType)?;
        base.iterative = self
            .single(id, Label::BaseIterativeData)?
            .map(|it| self.base_iterative(it, &scope))
            .transpose()?;
        for fam in self.children(id, Label::Family)? {
            base.families.push(self.family(fam, &scope)?);
        }
        for zone in self.children(id, Label::Zone)? {
            let zone = self.zone(zone, &scope)?;
            base.zones.push(zone);
        }
        base.meta = self.meta(id, EntityKind::Base, &scope, &[])?;
        Ok(base)
    }

    // ── Array containers ───────────────────────────────────────────

    /// A record made of arrays and annotations only.
    pub(super) fn container<T>(
        &self,
        id: NodeId,
        scope: &Scope,
        kind: EntityKind,
        build: impl FnOnce(Header, Vec<DataArray>, Meta) -> T,
    ) -> Result<T, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let arrays = self.arrays(id, &inner, &[])?;
        let meta = self.meta(id, kind, &inner, &[])?;
        Ok(build(header, arrays, meta))
    }

    pub(super) fn integrals(&self, parent: NodeId, scope: &Scope) -> Result<Vec<IntegralData>, TreeError> {
        self.children(parent, Label::IntegralData)?
            .into_iter()
            .map(|id| {
                self.container(id, scope, EntityKind::IntegralData, |header, arrays, meta| {
                    IntegralData {
                        header,
                        arrays,
                        meta,
                    }
                })
            })
            .collect()
    }

    pub(super) fn opt_rotating(
        &self,
        parent: NodeId,
        scope: &Scope,
    ) -> Result<Option<RotatingCoordinates>, TreeError> {
        self.single(parent, Label::RotatingCoordinates)?
            .map(|id| {
                self.container(id, scope, EntityKind::RotatingCoordinates, |header, arrays, meta| {
                    RotatingCoordinates {
                        header,
                        arrays,
                        meta,
                    }
                })
            })
            .transpose()
    }

    fn base_iterative(&self, id: NodeId, scope: &Scope) -> Result<BaseIterativeData, TreeError> {
        let steps = self.scalar(id, Label::BaseIterativeData)?;
        self.container(id, scope, EntityKind::BaseIterativeData, |header, arrays, meta| {
            BaseIterativeData {
                header,
                steps,
                arrays,
                meta,
            }
        })
    }

    fn gravity(&self, id: NodeId, scope: &Scope) -> Result<Gravity, TreeError> {
        let gravity = self.container(id, scope, EntityKind::Gravity, |header, arrays, meta| {
            Gravity {
                header,
                arrays,
                meta,
            }
        })?;
        if let Some(vector) = gravity.vector() {
            let phys = scope.ctx.phys_dim.max(0) as usize;
            if vector.dims.as_slice() != [phys] {
                return Err(TreeError::schema(
                    Label::Gravity,
                    &gravity.header.name,
                    format!(
                        "{} has extents {:?}, expected [{phys}]",
                        Gravity::VECTOR_NODE,
                        vector.dims.as_slice()
                    ),
                ));
            }
        }
        Ok(gravity)
    }

    // ── Physics ────────────────────────────────────────────────────

    pub(super) fn opt_state(
        &self,
        parent: NodeId,
        scope: &Scope,
    ) -> Result<Option<ReferenceState>, TreeError> {
        let Some(id) = self.single(parent, Label::ReferenceState)? else {
            return Ok(None);
        };
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let reserved = [ReferenceState::DESCRIPTION_NODE];
        Ok(Some(ReferenceState {
            description: self.opt_descriptor(id, ReferenceState::DESCRIPTION_NODE, inner.in_link)?,
            arrays: self.arrays(id, &inner, &[])?,
            meta: self.meta(id, EntityKind::ReferenceState, &inner, &reserved)?,
            header,
        }))
    }

    pub(super) fn opt_convergence(
        &self,
        parent: NodeId,
        scope: &Scope,
    ) -> Result<Option<ConvergenceHistory>, TreeError> {
        let Some(id) = self.single(parent, Label::ConvergenceHistory)? else {
            return Ok(None);
        };
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let reserved = [ConvergenceHistory::NORMS_NODE];
        Ok(Some(ConvergenceHistory {
            iterations: self.scalar(id, Label::ConvergenceHistory)?,
            norm_definitions: self.opt_descriptor(id, ConvergenceHistory::NORMS_NODE, inner.in_link)?,
            arrays: self.arrays(id, &inner, &[])?,
            meta: self.meta(id, EntityKind::ConvergenceHistory, &inner, &reserved)?,
            header,
        }))
    }

    pub(super) fn opt_equations(
        &self,
        parent: NodeId,
        scope: &Scope,
    ) -> Result<Option<FlowEquationSet>, TreeError> {
        let Some(id) = self.single(parent, Label::FlowEquationSet)? else {
            return Ok(None);
        };
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let mut set = FlowEquationSet {
            equation_dim: self
                .named(id, Label::Int, FlowEquationSet::DIMENSION_NODE)?
                .map(|d| self.scalar(d, Label::Int))
                .transpose()?,
            ..FlowEquationSet::default()
        };
        if let Some(gov) = self.single(id, Label::GoverningEquations)? {
            let gov_header = self.header(gov, inner.in_link)?;
            let gov_scope = inner.below(&gov_header);
            set.governing = Some(GoverningEquations {
                equations_type: self.enum_value(gov, Label::GoverningEquations)?,
                diffusion: self.opt_named_ints(
                    gov,
                    Label::IntDiffusion,
                    GoverningEquations::DIFFUSION_NODE,
                )?,
                meta: self.meta(gov, EntityKind::GoverningEquations, &gov_scope, &[])?,
                header: gov_header,
            });
        }
        for label in MODEL_LABELS {
            if let Some(m) = self.single(id, label)? {
                set.models.push(self.model(m, label, &inner)?);
            }
        }
        set.meta = self.meta(id, EntityKind::FlowEquationSet, &inner, &[])?;
        set.header = header;
        Ok(Some(set))
    }

    fn model(&self, id: NodeId, label: Label, scope: &Scope) -> Result<Model, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let diffusion = if label == Label::TurbulenceModel {
            self.opt_named_ints(id, Label::IntDiffusion, GoverningEquations::DIFFUSION_NODE)?
        } else {
            None
        };
        Ok(Model {
            label,
            model_type: self.enum_value(id, label)?,
            diffusion,
            arrays: self.arrays(id, &inner, &[])?,
            meta: self.meta(id, EntityKind::Model(label), &inner, &[])?,
            header,
        })
    }

    // ── Families ───────────────────────────────────────────────────

    fn family(&self, id: NodeId, scope: &Scope) -> Result<Family, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let family_bc = match self.single(id, Label::FamilyBC)? {
            None => None,
            Some(fbc) => {
                let fbc_header = self.header(fbc, inner.in_link)?;
                let fbc_scope = inner.below(&fbc_header);
                let mut datasets = Vec::new();
                for label in [Label::FamilyBCDataSet, Label::BCDataSet] {
                    for ds in self.children(fbc, label)? {
                        datasets.push(self.dataset(ds, &fbc_scope)?);
                    }
                }
                Some(FamilyBC {
                    bc_type: self.enum_value(fbc, Label::FamilyBC)?,
                    datasets,
                    header: fbc_header,
                })
            }
        };
        let mut geometries = Vec::new();
        for geo in self.children(id, Label::GeometryReference)? {
            geometries.push(self.geometry(geo, &inner)?);
        }
        let mut families = Vec::new();
        for sub in self.children(id, Label::Family)? {
            families.push(self.family(sub, &inner)?);
        }
        Ok(Family {
            family_bc,
            geometries,
            rotating: self.opt_rotating(id, &inner)?,
            families,
            family: self.opt_text(id, Label::FamilyName)?,
            additional_families: self.additional_families(id, inner.in_link)?,
            ordinal: self.opt_scalar(id, Label::Ordinal)?,
            meta: self.meta(id, EntityKind::Family, &inner, &[])?,
            header,
        })
    }

    fn geometry(&self, id: NodeId, scope: &Scope) -> Result<GeometryReference, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let file = self.required(id, Label::GeometryFile, Label::GeometryReference, &header.name)?;
        let format = self.required(id, Label::GeometryFormat, Label::GeometryReference, &header.name)?;
        let mut entities = Vec::new();
        for entity in self.children(id, Label::GeometryEntity)? {
            entities.push(self.store.name(entity)?);
        }
        Ok(GeometryReference {
            file: self.text(file, Label::GeometryFile)?,
            format: self.text(format, Label::GeometryFormat)?,
            entities,
            meta: self.meta(id, EntityKind::GeometryReference, &inner, &[])?,
            header,
        })
    }
}
