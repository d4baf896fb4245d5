//! Typed, mutable views of any navigable entity.
//!
//! [`EntityMut`] is the closed sum over entity kinds. Stepping to a child
//! checks the relation table first, so a label the current kind does not
//! admit is reported as [`TreeError::IncorrectPath`] and an admitted label
//! with no matching instance as [`TreeError::NotFound`].

use std::fmt;

use meshtree_core::{GridLocation, Label, TreeError};

use crate::base::{Base, Family, FamilyBC, GeometryReference};
use crate::bc::{Area, BCData, BCDataSet, BCProperty, WallFunction, ZoneBC, BC};
use crate::connectivity::{
    AverageInterface, GridConnectivity, GridConnectivity1to1, GridConnectivityProperty,
    OversetHoles, Periodic, ZoneGridConnectivity,
};
use crate::feature::{AdditionalFamilyName, DataArray};
use crate::header::{Header, Meta, Named};
use crate::physics::{
    Axisymmetry, ConvergenceHistory, FlowEquationSet, GoverningEquations, Gravity, Model,
    ReferenceState, RotatingCoordinates,
};
use crate::ptset::{DataSetPoints, PointSet};
use crate::schema::{self, EntityKind};
use crate::user_data::UserDefinedData;
use crate::zone::{
    ArbitraryGridMotion, BaseIterativeData, DiscreteData, FlowSolution, GridCoordinates,
    IntegralData, RigidGridMotion, Section, Zone, ZoneIterativeData, ZoneSubRegion,
};

/// Which instance of a child label to select.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// 1-based position among the children of that label.
    Index(usize),
    /// Node name.
    Name(String),
}

impl Selector {
    /// Whether the `position`-th (1-based) child named `name` is selected.
    pub fn matches(&self, position: usize, name: &str) -> bool {
        match self {
            Selector::Index(i) => *i == position,
            Selector::Name(n) => n == name,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Index(i) => write!(f, "#{i}"),
            Selector::Name(n) => write!(f, "'{n}'"),
        }
    }
}

impl From<usize> for Selector {
    fn from(i: usize) -> Self {
        Selector::Index(i)
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Selector::Name(name.to_owned())
    }
}

/// The selected element of `items`.
pub fn pick<'a, T: Named>(items: &'a mut [T], sel: &Selector) -> Option<&'a mut T> {
    match sel {
        Selector::Index(i) => i.checked_sub(1).and_then(move |i| items.get_mut(i)),
        Selector::Name(n) => items.iter_mut().find(|t| t.name() == n),
    }
}

/// The singleton in `slot`, if present and selected.
pub fn pick_one<'a, T: Named>(slot: &'a mut Option<T>, sel: &Selector) -> Option<&'a mut T> {
    slot.as_mut().filter(|t| sel.matches(1, t.name()))
}

fn pick_refs<'a, T: Named>(items: Vec<&'a mut T>, sel: &Selector) -> Option<&'a mut T> {
    items
        .into_iter()
        .enumerate()
        .find(|(i, t)| sel.matches(i + 1, t.name()))
        .map(|(_, t)| t)
}

/// Where an entity's point set lives.
#[derive(Debug)]
pub enum PtsetSlot<'a> {
    /// At most one owned set.
    Single(&'a mut Option<PointSet>),
    /// A dataset's own set or its parent's.
    DataSet(&'a mut DataSetPoints),
    /// Any number of sets (overset holes).
    Many(&'a mut Vec<PointSet>),
}

macro_rules! entity_mut {
    ($( $variant:ident($t:ty) ),* $(,)?) => {
        /// A mutable reference to one entity of any navigable kind.
        #[derive(Debug)]
        pub enum EntityMut<'a> {
            $(
                #[doc = concat!("A `", stringify!($t), "`.")]
                $variant(&'a mut $t),
            )*
        }

        impl<'a> EntityMut<'a> {
            /// The entity's header.
            pub fn header(&self) -> &Header {
                match self {
                    $( EntityMut::$variant(e) => &e.header, )*
                }
            }

            /// The entity's header, mutably.
            pub fn header_mut(&mut self) -> &mut Header {
                match self {
                    $( EntityMut::$variant(e) => &mut e.header, )*
                }
            }

            /// A shorter-lived view of the same entity.
            pub fn reborrow(&mut self) -> EntityMut<'_> {
                match self {
                    $( EntityMut::$variant(e) => EntityMut::$variant(&mut **e), )*
                }
            }
        }
    };
}

entity_mut! {
    Base(Base),
    Zone(Zone),
    GridCoordinates(GridCoordinates),
    DataArray(DataArray),
    Section(Section),
    FlowSolution(FlowSolution),
    DiscreteData(DiscreteData),
    IntegralData(IntegralData),
    ZoneBC(ZoneBC),
    BC(BC),
    BCDataSet(BCDataSet),
    BCData(BCData),
    BCProperty(BCProperty),
    WallFunction(WallFunction),
    Area(Area),
    ZoneGridConnectivity(ZoneGridConnectivity),
    GridConnectivity(GridConnectivity),
    GridConnectivity1to1(GridConnectivity1to1),
    GridConnectivityProperty(GridConnectivityProperty),
    Periodic(Periodic),
    AverageInterface(AverageInterface),
    OversetHoles(OversetHoles),
    ReferenceState(ReferenceState),
    FlowEquationSet(FlowEquationSet),
    GoverningEquations(GoverningEquations),
    Model(Model),
    ConvergenceHistory(ConvergenceHistory),
    Gravity(Gravity),
    Axisymmetry(Axisymmetry),
    RotatingCoordinates(RotatingCoordinates),
    RigidGridMotion(RigidGridMotion),
    ArbitraryGridMotion(ArbitraryGridMotion),
    BaseIterativeData(BaseIterativeData),
    ZoneIterativeData(ZoneIterativeData),
    ZoneSubRegion(ZoneSubRegion),
    Family(Family),
    FamilyBC(FamilyBC),
    GeometryReference(GeometryReference),
    UserDefinedData(UserDefinedData),
}

use EntityMut as E;

impl<'a> EntityMut<'a> {
    /// The entity's kind.
    pub fn kind(&self) -> EntityKind {
        use EntityKind as K;
        match self {
            E::Base(_) => K::Base,
            E::Zone(_) => K::Zone,
            E::GridCoordinates(_) => K::GridCoordinates,
            E::DataArray(_) => K::DataArray,
            E::Section(_) => K::Section,
            E::FlowSolution(_) => K::FlowSolution,
            E::DiscreteData(_) => K::DiscreteData,
            E::IntegralData(_) => K::IntegralData,
            E::ZoneBC(_) => K::ZoneBC,
            E::BC(_) => K::BC,
            E::BCDataSet(_) => K::BCDataSet,
            E::BCData(_) => K::BCData,
            E::BCProperty(_) => K::BCProperty,
            E::WallFunction(_) => K::WallFunction,
            E::Area(_) => K::Area,
            E::ZoneGridConnectivity(_) => K::ZoneGridConnectivity,
            E::GridConnectivity(_) => K::GridConnectivity,
            E::GridConnectivity1to1(_) => K::GridConnectivity1to1,
            E::GridConnectivityProperty(_) => K::GridConnectivityProperty,
            E::Periodic(_) => K::Periodic,
            E::AverageInterface(_) => K::AverageInterface,
            E::OversetHoles(_) => K::OversetHoles,
            E::ReferenceState(_) => K::ReferenceState,
            E::FlowEquationSet(_) => K::FlowEquationSet,
            E::GoverningEquations(_) => K::GoverningEquations,
            E::Model(m) => K::Model(m.label),
            E::ConvergenceHistory(_) => K::ConvergenceHistory,
            E::Gravity(_) => K::Gravity,
            E::Axisymmetry(_) => K::Axisymmetry,
            E::RotatingCoordinates(_) => K::RotatingCoordinates,
            E::RigidGridMotion(_) => K::RigidGridMotion,
            E::ArbitraryGridMotion(_) => K::ArbitraryGridMotion,
            E::BaseIterativeData(_) => K::BaseIterativeData,
            E::ZoneIterativeData(_) => K::ZoneIterativeData,
            E::ZoneSubRegion(_) => K::ZoneSubRegion,
            E::Family(_) => K::Family,
            E::FamilyBC(_) => K::FamilyBC,
            E::GeometryReference(_) => K::GeometryReference,
            E::UserDefinedData(_) => K::UserDefinedData,
        }
    }

    /// The label the entity is stored under.
    pub fn label(&self) -> Label {
        self.kind().label()
    }

    /// Whether this entity's kind admits children labelled `label`.
    pub fn admits(&self, label: Label) -> bool {
        schema::admits(self.kind(), label)
    }

    /// Step to the child labelled `label` selected by `sel`.
    pub fn child(self, label: Label, sel: &Selector) -> Result<EntityMut<'a>, TreeError> {
        let from = self.label();
        if EntityKind::from_label(label).is_none() || !self.admits(label) {
            return Err(TreeError::IncorrectPath {
                from,
                requested: label.as_str().to_owned(),
            });
        }
        let found = match (self, label) {
            (E::Base(b), Label::Zone) => pick(&mut b.zones, sel).map(E::Zone),
            (E::Base(b), Label::Family) => pick(&mut b.families, sel).map(E::Family),
            (E::Base(b), Label::Gravity) => pick_one(&mut b.gravity, sel).map(E::Gravity),
            (E::Base(b), Label::Axisymmetry) => {
                pick_one(&mut b.axisymmetry, sel).map(E::Axisymmetry)
            }
            (E::Base(b), Label::BaseIterativeData) => {
                pick_one(&mut b.iterative, sel).map(E::BaseIterativeData)
            }
            (E::Zone(z), Label::GridCoordinates) => {
                pick(&mut z.coordinates, sel).map(E::GridCoordinates)
            }
            (E::Zone(z), Label::Elements) => pick(&mut z.sections, sel).map(E::Section),
            (E::Zone(z), Label::FlowSolution) => pick(&mut z.solutions, sel).map(E::FlowSolution),
            (E::Zone(z), Label::DiscreteData) => pick(&mut z.discrete, sel).map(E::DiscreteData),
            (E::Zone(z), Label::ZoneGridConnectivity) => {
                pick(&mut z.connectivity, sel).map(E::ZoneGridConnectivity)
            }
            (E::Zone(z), Label::ZoneBC) => pick_one(&mut z.bc, sel).map(E::ZoneBC),
            (E::Zone(z), Label::RigidGridMotion) => {
                pick(&mut z.rigid_motions, sel).map(E::RigidGridMotion)
            }
            (E::Zone(z), Label::ArbitraryGridMotion) => {
                pick(&mut z.arbitrary_motions, sel).map(E::ArbitraryGridMotion)
            }
            (E::Zone(z), Label::ZoneIterativeData) => {
                pick_one(&mut z.iterative, sel).map(E::ZoneIterativeData)
            }
            (E::Zone(z), Label::ZoneSubRegion) => {
                pick(&mut z.subregions, sel).map(E::ZoneSubRegion)
            }
            (E::Section(s), Label::DataArray) => {
                let mut arrays = vec![&mut s.connectivity];
                arrays.extend(s.offsets.as_mut());
                arrays.extend(s.parent_elements.as_mut());
                arrays.extend(s.parent_positions.as_mut());
                pick_refs(arrays, sel).map(E::DataArray)
            }
            (E::ZoneBC(zbc), Label::BC) => pick(&mut zbc.bcs, sel).map(E::BC),
            (E::BC(bc), Label::BCDataSet) => pick(&mut bc.datasets, sel).map(E::BCDataSet),
            (E::BC(bc), Label::BCProperty) => pick_one(&mut bc.property, sel).map(E::BCProperty),
            (E::BCDataSet(ds), Label::BCData) => {
                let mut blocks = Vec::new();
                blocks.extend(ds.dirichlet.as_mut());
                blocks.extend(ds.neumann.as_mut());
                pick_refs(blocks, sel).map(E::BCData)
            }
            (E::BCProperty(p), Label::WallFunction) => {
                pick_one(&mut p.wall_function, sel).map(E::WallFunction)
            }
            (E::BCProperty(p), Label::Area) => pick_one(&mut p.area, sel).map(E::Area),
            (E::ZoneGridConnectivity(c), Label::GridConnectivity1to1) => {
                pick(&mut c.one_to_one, sel).map(E::GridConnectivity1to1)
            }
            (E::ZoneGridConnectivity(c), Label::GridConnectivity) => {
                pick(&mut c.general, sel).map(E::GridConnectivity)
            }
            (E::ZoneGridConnectivity(c), Label::OversetHoles) => {
                pick(&mut c.holes, sel).map(E::OversetHoles)
            }
            (E::GridConnectivity1to1(c), Label::GridConnectivityProperty) => {
                pick_one(&mut c.property, sel).map(E::GridConnectivityProperty)
            }
            (E::GridConnectivity(c), Label::GridConnectivityProperty) => {
                pick_one(&mut c.property, sel).map(E::GridConnectivityProperty)
            }
            (E::GridConnectivityProperty(p), Label::Periodic) => {
                pick_one(&mut p.periodic, sel).map(E::Periodic)
            }
            (E::GridConnectivityProperty(p), Label::AverageInterface) => {
                pick_one(&mut p.average, sel).map(E::AverageInterface)
            }
            (E::FlowEquationSet(f), Label::GoverningEquations) => {
                pick_one(&mut f.governing, sel).map(E::GoverningEquations)
            }
            (E::FlowEquationSet(f), l) if l.is_model() => f
                .models
                .iter_mut()
                .find(|m| m.label == l && sel.matches(1, &m.header.name))
                .map(E::Model),
            (E::Family(f), Label::FamilyBC) => pick_one(&mut f.family_bc, sel).map(E::FamilyBC),
            (E::Family(f), Label::GeometryReference) => {
                pick(&mut f.geometries, sel).map(E::GeometryReference)
            }
            (E::Family(f), Label::Family) => pick(&mut f.families, sel).map(E::Family),
            (E::FamilyBC(f), Label::FamilyBCDataSet) => {
                pick(&mut f.datasets, sel).map(E::BCDataSet)
            }
            (e, Label::ReferenceState) => e
                .into_state()
                .and_then(|s| pick_one(s, sel))
                .map(E::ReferenceState),
            (e, Label::RotatingCoordinates) => e
                .into_rotating()
                .and_then(|s| pick_one(s, sel))
                .map(E::RotatingCoordinates),
            (e, Label::ConvergenceHistory) => e
                .into_convergence()
                .and_then(|s| pick_one(s, sel))
                .map(E::ConvergenceHistory),
            (e, Label::FlowEquationSet) => e
                .into_equations()
                .and_then(|s| pick_one(s, sel))
                .map(E::FlowEquationSet),
            (e, Label::IntegralData) => e
                .into_integrals()
                .and_then(|v| pick(v, sel))
                .map(E::IntegralData),
            (e, Label::DataArray) => e.into_arrays().and_then(|v| pick(v, sel)).map(E::DataArray),
            (e, Label::UserDefinedData) => e
                .into_meta()
                .and_then(|m| pick(&mut m.user_data, sel))
                .map(E::UserDefinedData),
            _ => None,
        };
        found.ok_or_else(|| TreeError::not_found(format!("{label} {sel} under {from}")))
    }

    // ── Feature slots ───────────────────────────────────────────────

    /// Descriptors, data class, units and user data.
    pub fn into_meta(self) -> Option<&'a mut Meta> {
        Some(match self {
            E::Base(e) => &mut e.meta,
            E::Zone(e) => &mut e.meta,
            E::GridCoordinates(e) => &mut e.meta,
            E::DataArray(e) => &mut e.meta,
            E::Section(e) => &mut e.meta,
            E::FlowSolution(e) => &mut e.meta,
            E::DiscreteData(e) => &mut e.meta,
            E::IntegralData(e) => &mut e.meta,
            E::ZoneBC(e) => &mut e.meta,
            E::BC(e) => &mut e.meta,
            E::BCDataSet(e) => &mut e.meta,
            E::BCData(e) => &mut e.meta,
            E::BCProperty(e) => &mut e.meta,
            E::WallFunction(e) => &mut e.meta,
            E::Area(e) => &mut e.meta,
            E::ZoneGridConnectivity(e) => &mut e.meta,
            E::GridConnectivity(e) => &mut e.meta,
            E::GridConnectivity1to1(e) => &mut e.meta,
            E::GridConnectivityProperty(e) => &mut e.meta,
            E::Periodic(e) => &mut e.meta,
            E::AverageInterface(e) => &mut e.meta,
            E::OversetHoles(e) => &mut e.meta,
            E::ReferenceState(e) => &mut e.meta,
            E::FlowEquationSet(e) => &mut e.meta,
            E::GoverningEquations(e) => &mut e.meta,
            E::Model(e) => &mut e.meta,
            E::ConvergenceHistory(e) => &mut e.meta,
            E::Gravity(e) => &mut e.meta,
            E::Axisymmetry(e) => &mut e.meta,
            E::RotatingCoordinates(e) => &mut e.meta,
            E::RigidGridMotion(e) => &mut e.meta,
            E::ArbitraryGridMotion(e) => &mut e.meta,
            E::BaseIterativeData(e) => &mut e.meta,
            E::ZoneIterativeData(e) => &mut e.meta,
            E::ZoneSubRegion(e) => &mut e.meta,
            E::Family(e) => &mut e.meta,
            E::GeometryReference(e) => &mut e.meta,
            E::UserDefinedData(e) => &mut e.meta,
            E::FamilyBC(_) => return None,
        })
    }

    /// Generic data arrays.
    pub fn into_arrays(self) -> Option<&'a mut Vec<DataArray>> {
        Some(match self {
            E::GridCoordinates(e) => &mut e.arrays,
            E::FlowSolution(e) => &mut e.arrays,
            E::DiscreteData(e) => &mut e.arrays,
            E::IntegralData(e) => &mut e.arrays,
            E::BCData(e) => &mut e.arrays,
            E::Area(e) => &mut e.arrays,
            E::GridConnectivity(e) => &mut e.interpolants,
            E::Periodic(e) => &mut e.arrays,
            E::ReferenceState(e) => &mut e.arrays,
            E::Model(e) => &mut e.arrays,
            E::ConvergenceHistory(e) => &mut e.arrays,
            E::Gravity(e) => &mut e.arrays,
            E::Axisymmetry(e) => &mut e.arrays,
            E::RotatingCoordinates(e) => &mut e.arrays,
            E::RigidGridMotion(e) => &mut e.arrays,
            E::ArbitraryGridMotion(e) => &mut e.arrays,
            E::BaseIterativeData(e) => &mut e.arrays,
            E::ZoneIterativeData(e) => &mut e.arrays,
            E::ZoneSubRegion(e) => &mut e.arrays,
            E::UserDefinedData(e) => &mut e.arrays,
            _ => return None,
        })
    }

    /// Rind planes.
    pub fn into_rind(self) -> Option<&'a mut Option<Vec<i32>>> {
        Some(match self {
            E::GridCoordinates(e) => &mut e.rind,
            E::Section(e) => &mut e.rind,
            E::FlowSolution(e) => &mut e.rind,
            E::DiscreteData(e) => &mut e.rind,
            E::ArbitraryGridMotion(e) => &mut e.rind,
            E::ZoneSubRegion(e) => &mut e.rind,
            _ => return None,
        })
    }

    /// Grid location.
    pub fn into_location(self) -> Option<&'a mut Option<GridLocation>> {
        Some(match self {
            E::FlowSolution(e) => &mut e.location,
            E::DiscreteData(e) => &mut e.location,
            E::BC(e) => &mut e.location,
            E::BCDataSet(e) => &mut e.location,
            E::GridConnectivity(e) => &mut e.location,
            E::OversetHoles(e) => &mut e.location,
            E::ArbitraryGridMotion(e) => &mut e.location,
            E::ZoneSubRegion(e) => &mut e.location,
            E::UserDefinedData(e) => &mut e.location,
            _ => return None,
        })
    }

    /// Point set.
    pub fn into_ptset(self) -> Option<PtsetSlot<'a>> {
        Some(match self {
            E::FlowSolution(e) => PtsetSlot::Single(&mut e.ptset),
            E::DiscreteData(e) => PtsetSlot::Single(&mut e.ptset),
            E::BC(e) => PtsetSlot::Single(&mut e.ptset),
            E::GridConnectivity(e) => PtsetSlot::Single(&mut e.ptset),
            E::ZoneSubRegion(e) => PtsetSlot::Single(&mut e.ptset),
            E::UserDefinedData(e) => PtsetSlot::Single(&mut e.ptset),
            E::BCDataSet(e) => PtsetSlot::DataSet(&mut e.ptset),
            E::OversetHoles(e) => PtsetSlot::Many(&mut e.ptsets),
            _ => return None,
        })
    }

    /// Reference state.
    pub fn into_state(self) -> Option<&'a mut Option<ReferenceState>> {
        Some(match self {
            E::Base(e) => &mut e.state,
            E::Zone(e) => &mut e.state,
            E::ZoneBC(e) => &mut e.state,
            E::BC(e) => &mut e.state,
            E::BCDataSet(e) => &mut e.state,
            _ => return None,
        })
    }

    /// Rotating frame.
    pub fn into_rotating(self) -> Option<&'a mut Option<RotatingCoordinates>> {
        Some(match self {
            E::Base(e) => &mut e.rotating,
            E::Zone(e) => &mut e.rotating,
            E::Family(e) => &mut e.rotating,
            _ => return None,
        })
    }

    /// Convergence history.
    pub fn into_convergence(self) -> Option<&'a mut Option<ConvergenceHistory>> {
        Some(match self {
            E::Base(e) => &mut e.convergence,
            E::Zone(e) => &mut e.convergence,
            _ => return None,
        })
    }

    /// Flow equation set.
    pub fn into_equations(self) -> Option<&'a mut Option<FlowEquationSet>> {
        Some(match self {
            E::Base(e) => &mut e.equations,
            E::Zone(e) => &mut e.equations,
            _ => return None,
        })
    }

    /// Integral data.
    pub fn into_integrals(self) -> Option<&'a mut Vec<IntegralData>> {
        Some(match self {
            E::Base(e) => &mut e.integrals,
            E::Zone(e) => &mut e.integrals,
            _ => return None,
        })
    }

    /// Gravity.
    pub fn into_gravity(self) -> Option<&'a mut Option<Gravity>> {
        match self {
            E::Base(e) => Some(&mut e.gravity),
            _ => None,
        }
    }

    /// Axisymmetry.
    pub fn into_axisymmetry(self) -> Option<&'a mut Option<Axisymmetry>> {
        match self {
            E::Base(e) => Some(&mut e.axisymmetry),
            _ => None,
        }
    }

    /// Family reference.
    pub fn into_family_name(self) -> Option<&'a mut Option<String>> {
        Some(match self {
            E::Zone(e) => &mut e.family,
            E::BC(e) => &mut e.family,
            E::ZoneSubRegion(e) => &mut e.family,
            E::UserDefinedData(e) => &mut e.family,
            E::Family(e) => &mut e.family,
            _ => return None,
        })
    }

    /// Additional family references.
    pub fn into_additional_families(self) -> Option<&'a mut Vec<AdditionalFamilyName>> {
        Some(match self {
            E::Zone(e) => &mut e.additional_families,
            E::BC(e) => &mut e.additional_families,
            E::ZoneSubRegion(e) => &mut e.additional_families,
            E::UserDefinedData(e) => &mut e.additional_families,
            E::Family(e) => &mut e.additional_families,
            _ => return None,
        })
    }

    /// Ordinal.
    pub fn into_ordinal(self) -> Option<&'a mut Option<i32>> {
        Some(match self {
            E::Zone(e) => &mut e.ordinal,
            E::BC(e) => &mut e.ordinal,
            E::GridConnectivity(e) => &mut e.ordinal,
            E::GridConnectivity1to1(e) => &mut e.ordinal,
            E::Family(e) => &mut e.ordinal,
            E::UserDefinedData(e) => &mut e.ordinal,
            _ => return None,
        })
    }

    /// Diffusion model flags.
    pub fn into_diffusion(self) -> Option<&'a mut Option<Vec<i32>>> {
        match self {
            E::GoverningEquations(e) => Some(&mut e.diffusion),
            E::Model(e) if e.label == Label::TurbulenceModel => Some(&mut e.diffusion),
            _ => None,
        }
    }

    // ── Structural removal ─────────────────────────────────────────

    /// Remove the child (entity or feature) named `name` from the
    /// in-memory tree. Returns whether anything was removed.
    pub fn remove_child(self, name: &str) -> bool {
        match self {
            E::Base(e) => {
                drop_named(&mut e.zones, name)
                    || drop_named(&mut e.families, name)
                    || drop_opt(&mut e.state, name)
                    || drop_opt(&mut e.gravity, name)
                    || drop_opt(&mut e.axisymmetry, name)
                    || drop_opt(&mut e.rotating, name)
                    || drop_opt(&mut e.convergence, name)
                    || drop_opt(&mut e.equations, name)
                    || drop_named(&mut e.integrals, name)
                    || drop_opt(&mut e.iterative, name)
                    || drop_scalar(&mut e.simulation, name, Base::SIMULATION_NODE)
                    || drop_meta(&mut e.meta, name)
            }
            E::Zone(e) => {
                drop_named(&mut e.coordinates, name)
                    || drop_named(&mut e.sections, name)
                    || drop_named(&mut e.solutions, name)
                    || drop_named(&mut e.discrete, name)
                    || drop_named(&mut e.integrals, name)
                    || drop_named(&mut e.connectivity, name)
                    || drop_opt(&mut e.bc, name)
                    || drop_opt(&mut e.state, name)
                    || drop_named(&mut e.rigid_motions, name)
                    || drop_named(&mut e.arbitrary_motions, name)
                    || drop_opt(&mut e.iterative, name)
                    || drop_opt(&mut e.rotating, name)
                    || drop_opt(&mut e.convergence, name)
                    || drop_opt(&mut e.equations, name)
                    || drop_named(&mut e.subregions, name)
                    || drop_scalar(&mut e.family, name, "FamilyName")
                    || drop_named(&mut e.additional_families, name)
                    || drop_scalar(&mut e.ordinal, name, "Ordinal")
                    || drop_meta(&mut e.meta, name)
            }
            E::Section(e) => {
                drop_opt(&mut e.offsets, name)
                    || drop_opt(&mut e.parent_elements, name)
                    || drop_opt(&mut e.parent_positions, name)
                    || drop_scalar(&mut e.rind, name, "Rind")
                    || drop_meta(&mut e.meta, name)
            }
            E::DataArray(e) => {
                drop_opt(&mut e.exponents, name)
                    || drop_opt(&mut e.conversion, name)
                    || drop_meta(&mut e.meta, name)
            }
            E::ZoneBC(e) => {
                drop_named(&mut e.bcs, name)
                    || drop_opt(&mut e.state, name)
                    || drop_meta(&mut e.meta, name)
            }
            E::BC(e) => {
                drop_named(&mut e.datasets, name)
                    || drop_opt(&mut e.property, name)
                    || drop_opt(&mut e.state, name)
                    || drop_opt(&mut e.ptset, name)
                    || drop_scalar(&mut e.location, name, "GridLocation")
                    || drop_scalar(&mut e.normal_index, name, BC::NORMAL_INDEX_NODE)
                    || drop_opt(&mut e.normal_list, name)
                    || drop_scalar(&mut e.family, name, "FamilyName")
                    || drop_named(&mut e.additional_families, name)
                    || drop_scalar(&mut e.ordinal, name, "Ordinal")
                    || drop_meta(&mut e.meta, name)
            }
            E::BCDataSet(e) => {
                let own = matches!(&e.ptset, DataSetPoints::Own(p) if p.header.name == name);
                if own {
                    e.ptset = DataSetPoints::Inherited;
                }
                own || drop_opt(&mut e.dirichlet, name)
                    || drop_opt(&mut e.neumann, name)
                    || drop_opt(&mut e.state, name)
                    || drop_scalar(&mut e.location, name, "GridLocation")
                    || drop_meta(&mut e.meta, name)
            }
            E::BCProperty(e) => {
                drop_opt(&mut e.wall_function, name)
                    || drop_opt(&mut e.area, name)
                    || drop_meta(&mut e.meta, name)
            }
            E::ZoneGridConnectivity(e) => {
                drop_named(&mut e.one_to_one, name)
                    || drop_named(&mut e.general, name)
                    || drop_named(&mut e.holes, name)
                    || drop_meta(&mut e.meta, name)
            }
            E::GridConnectivity1to1(e) => {
                drop_opt(&mut e.property, name)
                    || drop_scalar(&mut e.ordinal, name, "Ordinal")
                    || drop_meta(&mut e.meta, name)
            }
            E::GridConnectivity(e) => {
                drop_opt(&mut e.property, name)
                    || drop_opt(&mut e.ptset, name)
                    || drop_opt(&mut e.donor_ptset, name)
                    || drop_named(&mut e.interpolants, name)
                    || drop_scalar(&mut e.location, name, "GridLocation")
                    || drop_scalar(&mut e.ordinal, name, "Ordinal")
                    || drop_meta(&mut e.meta, name)
            }
            E::GridConnectivityProperty(e) => {
                drop_opt(&mut e.periodic, name)
                    || drop_opt(&mut e.average, name)
                    || drop_meta(&mut e.meta, name)
            }
            E::OversetHoles(e) => {
                drop_named(&mut e.ptsets, name)
                    || drop_scalar(&mut e.location, name, "GridLocation")
                    || drop_meta(&mut e.meta, name)
            }
            E::FlowEquationSet(e) => {
                drop_opt(&mut e.governing, name)
                    || drop_named(&mut e.models, name)
                    || drop_scalar(&mut e.equation_dim, name, FlowEquationSet::DIMENSION_NODE)
                    || drop_meta(&mut e.meta, name)
            }
            E::GoverningEquations(e) => {
                drop_scalar(&mut e.diffusion, name, GoverningEquations::DIFFUSION_NODE)
                    || drop_meta(&mut e.meta, name)
            }
            E::Model(e) => {
                drop_scalar(&mut e.diffusion, name, GoverningEquations::DIFFUSION_NODE)
                    || drop_named(&mut e.arrays, name)
                    || drop_meta(&mut e.meta, name)
            }
            E::ReferenceState(e) => {
                drop_opt(&mut e.description, name)
                    || drop_named(&mut e.arrays, name)
                    || drop_meta(&mut e.meta, name)
            }
            E::ConvergenceHistory(e) => {
                drop_opt(&mut e.norm_definitions, name)
                    || drop_named(&mut e.arrays, name)
                    || drop_meta(&mut e.meta, name)
            }
            E::Family(e) => {
                drop_opt(&mut e.family_bc, name)
                    || drop_named(&mut e.geometries, name)
                    || drop_opt(&mut e.rotating, name)
                    || drop_named(&mut e.families, name)
                    || drop_scalar(&mut e.family, name, "FamilyName")
                    || drop_named(&mut e.additional_families, name)
                    || drop_scalar(&mut e.ordinal, name, "Ordinal")
                    || drop_meta(&mut e.meta, name)
            }
            E::FamilyBC(e) => drop_named(&mut e.datasets, name),
            E::ZoneSubRegion(e) => {
                drop_opt(&mut e.ptset, name)
                    || drop_opt(&mut e.bc_region, name)
                    || drop_opt(&mut e.gc_region, name)
                    || drop_scalar(&mut e.location, name, "GridLocation")
                    || drop_scalar(&mut e.rind, name, "Rind")
                    || drop_scalar(&mut e.family, name, "FamilyName")
                    || drop_named(&mut e.additional_families, name)
                    || drop_named(&mut e.arrays, name)
                    || drop_meta(&mut e.meta, name)
            }
            E::UserDefinedData(e) => {
                drop_opt(&mut e.ptset, name)
                    || drop_scalar(&mut e.location, name, "GridLocation")
                    || drop_scalar(&mut e.family, name, "FamilyName")
                    || drop_named(&mut e.additional_families, name)
                    || drop_scalar(&mut e.ordinal, name, "Ordinal")
                    || drop_named(&mut e.arrays, name)
                    || drop_meta(&mut e.meta, name)
            }
            E::GridCoordinates(e) => {
                drop_scalar(&mut e.rind, name, "Rind")
                    || drop_named(&mut e.arrays, name)
                    || drop_meta(&mut e.meta, name)
            }
            E::FlowSolution(e) => drop_solution_child(
                &mut e.rind,
                &mut e.location,
                &mut e.ptset,
                &mut e.arrays,
                &mut e.meta,
                name,
            ),
            E::DiscreteData(e) => drop_solution_child(
                &mut e.rind,
                &mut e.location,
                &mut e.ptset,
                &mut e.arrays,
                &mut e.meta,
                name,
            ),
            E::ArbitraryGridMotion(e) => {
                drop_scalar(&mut e.rind, name, "Rind")
                    || drop_scalar(&mut e.location, name, "GridLocation")
                    || drop_named(&mut e.arrays, name)
                    || drop_meta(&mut e.meta, name)
            }
            E::IntegralData(e) => drop_named(&mut e.arrays, name) || drop_meta(&mut e.meta, name),
            E::BCData(e) => drop_named(&mut e.arrays, name) || drop_meta(&mut e.meta, name),
            E::Area(e) => drop_named(&mut e.arrays, name) || drop_meta(&mut e.meta, name),
            E::Periodic(e) => drop_named(&mut e.arrays, name) || drop_meta(&mut e.meta, name),
            E::Gravity(e) => drop_named(&mut e.arrays, name) || drop_meta(&mut e.meta, name),
            E::Axisymmetry(e) => drop_named(&mut e.arrays, name) || drop_meta(&mut e.meta, name),
            E::RotatingCoordinates(e) => {
                drop_named(&mut e.arrays, name) || drop_meta(&mut e.meta, name)
            }
            E::RigidGridMotion(e) => {
                drop_named(&mut e.arrays, name) || drop_meta(&mut e.meta, name)
            }
            E::BaseIterativeData(e) => {
                drop_named(&mut e.arrays, name) || drop_meta(&mut e.meta, name)
            }
            E::ZoneIterativeData(e) => {
                drop_named(&mut e.arrays, name) || drop_meta(&mut e.meta, name)
            }
            E::WallFunction(e) => drop_meta(&mut e.meta, name),
            E::AverageInterface(e) => drop_meta(&mut e.meta, name),
            E::GeometryReference(e) => drop_meta(&mut e.meta, name),
        }
    }
}

fn drop_named<T: Named>(items: &mut Vec<T>, name: &str) -> bool {
    let before = items.len();
    items.retain(|t| t.name() != name);
    items.len() != before
}

fn drop_opt<T: Named>(slot: &mut Option<T>, name: &str) -> bool {
    if slot.as_ref().is_some_and(|t| t.name() == name) {
        *slot = None;
        true
    } else {
        false
    }
}

fn drop_scalar<T>(slot: &mut Option<T>, name: &str, node: &str) -> bool {
    if name == node && slot.is_some() {
        *slot = None;
        true
    } else {
        false
    }
}

fn drop_solution_child(
    rind: &mut Option<Vec<i32>>,
    location: &mut Option<GridLocation>,
    ptset: &mut Option<PointSet>,
    arrays: &mut Vec<DataArray>,
    meta: &mut Meta,
    name: &str,
) -> bool {
    drop_scalar(rind, name, "Rind")
        || drop_scalar(location, name, "GridLocation")
        || drop_opt(ptset, name)
        || drop_named(arrays, name)
        || drop_meta(meta, name)
}

fn drop_meta(meta: &mut Meta, name: &str) -> bool {
    drop_named(&mut meta.descriptors, name)
        || drop_opt(&mut meta.units, name)
        || drop_named(&mut meta.user_data, name)
        || drop_scalar(&mut meta.data_class, name, "DataClass")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::File;
    use meshtree_core::ElementType;

    fn sample() -> File {
        let mut file = File::new("sample.cgns");
        let mut base = Base::new("Base", 3, 3);
        let mut zone = Zone::unstructured("Tets", 4, 1, 0);
        zone.sections.push(Section::new(
            "Body",
            ElementType::Tetra4,
            1,
            1,
            &[1, 2, 3, 4],
            None,
        ));
        zone.sections.push(Section::new(
            "Faces",
            ElementType::Tri3,
            2,
            2,
            &[1, 2, 3],
            None,
        ));
        base.zones.push(zone);
        file.bases.push(base);
        file
    }

    #[test]
    fn steps_by_index_and_name() {
        let mut file = sample();
        let base = E::Base(&mut file.bases[0]);
        let zone = base.child(Label::Zone, &Selector::Index(1)).unwrap();
        assert_eq!(zone.header().name, "Tets");
        let section = zone.child(Label::Elements, &"Faces".into()).unwrap();
        assert_eq!(section.kind(), EntityKind::Section);
        assert_eq!(section.header().name, "Faces");
    }

    #[test]
    fn unrelated_label_is_incorrect_path() {
        let mut file = sample();
        let base = E::Base(&mut file.bases[0]);
        let err = base.child(Label::Elements, &Selector::Index(1)).unwrap_err();
        assert!(matches!(err, TreeError::IncorrectPath { from: Label::Base, .. }));
    }

    #[test]
    fn missing_instance_is_not_found() {
        let mut file = sample();
        let base = E::Base(&mut file.bases[0]);
        let err = base.child(Label::Zone, &Selector::Index(2)).unwrap_err();
        assert!(err.is_not_found());
        let base = E::Base(&mut file.bases[0]);
        assert!(base.child(Label::Zone, &Selector::Index(0)).unwrap_err().is_not_found());
    }

    #[test]
    fn section_arrays_are_navigable() {
        let mut file = sample();
        let zone = E::Zone(&mut file.bases[0].zones[0]);
        let section = zone.child(Label::Elements, &Selector::Index(1)).unwrap();
        let conn = section.child(Label::DataArray, &Selector::Index(1)).unwrap();
        assert_eq!(conn.header().name, Section::CONNECTIVITY_NODE);
    }

    #[test]
    fn remove_child_drops_named_entity() {
        let mut file = sample();
        assert!(E::Zone(&mut file.bases[0].zones[0]).remove_child("Body"));
        assert_eq!(file.bases[0].zones[0].sections.len(), 1);
        assert!(!E::Zone(&mut file.bases[0].zones[0]).remove_child("Body"));
    }

    #[test]
    fn feature_slots_follow_kind() {
        let mut file = sample();
        let mut base = E::Base(&mut file.bases[0]);
        assert!(base.reborrow().into_state().is_some());
        assert!(base.reborrow().into_rind().is_none());
        assert!(base.into_arrays().is_none());
    }
}
