//! The relation table: which child labels each entity kind admits, and how
//! many of each.
//!
//! Navigation and the engines consult this table instead of comparing label
//! strings. A kind's table lists structural children (other entity kinds)
//! and feature children (descriptors, rind, grid location, point sets, ...)
//! alike.

use meshtree_core::Label;

/// The navigable entity kinds.
///
/// The ten physical model labels share one record layout and are told
/// apart by the label they carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// `CGNSBase_t`
    Base,
    /// `Zone_t`
    Zone,
    /// `GridCoordinates_t`
    GridCoordinates,
    /// `DataArray_t`
    DataArray,
    /// `Elements_t`
    Section,
    /// `FlowSolution_t`
    FlowSolution,
    /// `DiscreteData_t`
    DiscreteData,
    /// `IntegralData_t`
    IntegralData,
    /// `ZoneBC_t`
    ZoneBC,
    /// `BC_t`
    BC,
    /// `BCDataSet_t` or `FamilyBCDataSet_t`
    BCDataSet,
    /// `BCData_t`
    BCData,
    /// `BCProperty_t`
    BCProperty,
    /// `WallFunction_t`
    WallFunction,
    /// `Area_t`
    Area,
    /// `ZoneGridConnectivity_t`
    ZoneGridConnectivity,
    /// `GridConnectivity_t`
    GridConnectivity,
    /// `GridConnectivity1to1_t`
    GridConnectivity1to1,
    /// `GridConnectivityProperty_t`
    GridConnectivityProperty,
    /// `Periodic_t`
    Periodic,
    /// `AverageInterface_t`
    AverageInterface,
    /// `OversetHoles_t`
    OversetHoles,
    /// `ReferenceState_t`
    ReferenceState,
    /// `FlowEquationSet_t`
    FlowEquationSet,
    /// `GoverningEquations_t`
    GoverningEquations,
    /// One of the ten model labels.
    Model(Label),
    /// `ConvergenceHistory_t`
    ConvergenceHistory,
    /// `Gravity_t`
    Gravity,
    /// `Axisymmetry_t`
    Axisymmetry,
    /// `RotatingCoordinates_t`
    RotatingCoordinates,
    /// `RigidGridMotion_t`
    RigidGridMotion,
    /// `ArbitraryGridMotion_t`
    ArbitraryGridMotion,
    /// `BaseIterativeData_t`
    BaseIterativeData,
    /// `ZoneIterativeData_t`
    ZoneIterativeData,
    /// `ZoneSubRegion_t`
    ZoneSubRegion,
    /// `Family_t`
    Family,
    /// `FamilyBC_t`
    FamilyBC,
    /// `GeometryReference_t`
    GeometryReference,
    /// `UserDefinedData_t`
    UserDefinedData,
}

impl EntityKind {
    /// The kind stored under `label`, if the label names a navigable entity.
    pub fn from_label(label: Label) -> Option<Self> {
        use EntityKind as K;
        Some(match label {
            Label::Base => K::Base,
            Label::Zone => K::Zone,
            Label::GridCoordinates => K::GridCoordinates,
            Label::DataArray => K::DataArray,
            Label::Elements => K::Section,
            Label::FlowSolution => K::FlowSolution,
            Label::DiscreteData => K::DiscreteData,
            Label::IntegralData => K::IntegralData,
            Label::ZoneBC => K::ZoneBC,
            Label::BC => K::BC,
            Label::BCDataSet | Label::FamilyBCDataSet => K::BCDataSet,
            Label::BCData => K::BCData,
            Label::BCProperty => K::BCProperty,
            Label::WallFunction => K::WallFunction,
            Label::Area => K::Area,
            Label::ZoneGridConnectivity => K::ZoneGridConnectivity,
            Label::GridConnectivity => K::GridConnectivity,
            Label::GridConnectivity1to1 => K::GridConnectivity1to1,
            Label::GridConnectivityProperty => K::GridConnectivityProperty,
            Label::Periodic => K::Periodic,
            Label::AverageInterface => K::AverageInterface,
            Label::OversetHoles => K::OversetHoles,
            Label::ReferenceState => K::ReferenceState,
            Label::FlowEquationSet => K::FlowEquationSet,
            Label::GoverningEquations => K::GoverningEquations,
            l if l.is_model() => K::Model(l),
            Label::ConvergenceHistory => K::ConvergenceHistory,
            Label::Gravity => K::Gravity,
            Label::Axisymmetry => K::Axisymmetry,
            Label::RotatingCoordinates => K::RotatingCoordinates,
            Label::RigidGridMotion => K::RigidGridMotion,
            Label::ArbitraryGridMotion => K::ArbitraryGridMotion,
            Label::BaseIterativeData => K::BaseIterativeData,
            Label::ZoneIterativeData => K::ZoneIterativeData,
            Label::ZoneSubRegion => K::ZoneSubRegion,
            Label::Family => K::Family,
            Label::FamilyBC => K::FamilyBC,
            Label::GeometryReference => K::GeometryReference,
            Label::UserDefinedData => K::UserDefinedData,
            _ => return None,
        })
    }

    /// The label entities of this kind are normally stored under.
    pub fn label(self) -> Label {
        use EntityKind as K;
        match self {
            K::Base => Label::Base,
            K::Zone => Label::Zone,
            K::GridCoordinates => Label::GridCoordinates,
            K::DataArray => Label::DataArray,
            K::Section => Label::Elements,
            K::FlowSolution => Label::FlowSolution,
            K::DiscreteData => Label::DiscreteData,
            K::IntegralData => Label::IntegralData,
            K::ZoneBC => Label::ZoneBC,
            K::BC => Label::BC,
            K::BCDataSet => Label::BCDataSet,
            K::BCData => Label::BCData,
            K::BCProperty => Label::BCProperty,
            K::WallFunction => Label::WallFunction,
            K::Area => Label::Area,
            K::ZoneGridConnectivity => Label::ZoneGridConnectivity,
            K::GridConnectivity => Label::GridConnectivity,
            K::GridConnectivity1to1 => Label::GridConnectivity1to1,
            K::GridConnectivityProperty => Label::GridConnectivityProperty,
            K::Periodic => Label::Periodic,
            K::AverageInterface => Label::AverageInterface,
            K::OversetHoles => Label::OversetHoles,
            K::ReferenceState => Label::ReferenceState,
            K::FlowEquationSet => Label::FlowEquationSet,
            K::GoverningEquations => Label::GoverningEquations,
            K::Model(l) => l,
            K::ConvergenceHistory => Label::ConvergenceHistory,
            K::Gravity => Label::Gravity,
            K::Axisymmetry => Label::Axisymmetry,
            K::RotatingCoordinates => Label::RotatingCoordinates,
            K::RigidGridMotion => Label::RigidGridMotion,
            K::ArbitraryGridMotion => Label::ArbitraryGridMotion,
            K::BaseIterativeData => Label::BaseIterativeData,
            K::ZoneIterativeData => Label::ZoneIterativeData,
            K::ZoneSubRegion => Label::ZoneSubRegion,
            K::Family => Label::Family,
            K::FamilyBC => Label::FamilyBC,
            K::GeometryReference => Label::GeometryReference,
            K::UserDefinedData => Label::UserDefinedData,
        }
    }
}

/// How many children of one label an entity may have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Multiplicity {
    /// Zero or one.
    Optional,
    /// Zero or more.
    Many,
    /// Exactly one.
    One,
}

impl Multiplicity {
    /// Whether `count` children satisfy this multiplicity.
    pub fn admits(self, count: usize) -> bool {
        match self {
            Multiplicity::Optional => count <= 1,
            Multiplicity::Many => true,
            Multiplicity::One => count == 1,
        }
    }
}

/// One admitted child relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Relation {
    /// Child label.
    pub label: Label,
    /// How many children of that label.
    pub multiplicity: Multiplicity,
    /// Fixed child name, when the schema prescribes one.
    pub name: Option<&'static str>,
}

const fn opt(label: Label) -> Relation {
    Relation {
        label,
        multiplicity: Multiplicity::Optional,
        name: None,
    }
}

const fn many(label: Label) -> Relation {
    Relation {
        label,
        multiplicity: Multiplicity::Many,
        name: None,
    }
}

const fn one(label: Label) -> Relation {
    Relation {
        label,
        multiplicity: Multiplicity::One,
        name: None,
    }
}

const fn named(label: Label, multiplicity: Multiplicity, name: &'static str) -> Relation {
    Relation {
        label,
        multiplicity,
        name: Some(name),
    }
}

use Label as L;
use Multiplicity::{One, Optional};

// ── Tables ──────────────────────────────────────────────────────

const BASE: &[Relation] = &[
    many(L::Zone),
    many(L::Family),
    opt(L::ReferenceState),
    opt(L::Gravity),
    opt(L::Axisymmetry),
    opt(L::RotatingCoordinates),
    opt(L::ConvergenceHistory),
    opt(L::FlowEquationSet),
    many(L::IntegralData),
    named(L::SimulationType, Optional, "SimulationType"),
    opt(L::BaseIterativeData),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

const ZONE: &[Relation] = &[
    named(L::ZoneType, One, "ZoneType"),
    many(L::GridCoordinates),
    named(L::FamilyName, Optional, "FamilyName"),
    many(L::AdditionalFamilyName),
    many(L::Elements),
    many(L::FlowSolution),
    many(L::DiscreteData),
    many(L::IntegralData),
    many(L::ZoneGridConnectivity),
    opt(L::ZoneBC),
    opt(L::ReferenceState),
    many(L::RigidGridMotion),
    many(L::ArbitraryGridMotion),
    opt(L::ZoneIterativeData),
    opt(L::RotatingCoordinates),
    opt(L::ConvergenceHistory),
    opt(L::FlowEquationSet),
    named(L::Ordinal, Optional, "Ordinal"),
    many(L::ZoneSubRegion),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

const GRID_COORDINATES: &[Relation] = &[
    named(L::Rind, Optional, "Rind"),
    many(L::DataArray),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

const DATA_ARRAY: &[Relation] = &[
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    named(L::DimensionalExponents, Optional, "DimensionalExponents"),
    named(L::DataConversion, Optional, "DataConversion"),
];

const SECTION: &[Relation] = &[
    named(L::IndexRange, One, "ElementRange"),
    named(L::DataArray, One, "ElementConnectivity"),
    named(L::DataArray, Optional, "ElementStartOffset"),
    named(L::DataArray, Optional, "ParentElements"),
    named(L::DataArray, Optional, "ParentElementsPosition"),
    named(L::Rind, Optional, "Rind"),
    many(L::Descriptor),
    many(L::UserDefinedData),
];

const SOLUTION: &[Relation] = &[
    named(L::GridLocation, Optional, "GridLocation"),
    named(L::Rind, Optional, "Rind"),
    opt(L::IndexRange),
    opt(L::IndexArray),
    many(L::DataArray),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

const ARRAYS_ONLY: &[Relation] = &[
    many(L::DataArray),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

const ZONE_BC: &[Relation] = &[
    many(L::BC),
    opt(L::ReferenceState),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

const BC: &[Relation] = &[
    opt(L::IndexRange),
    opt(L::IndexArray),
    named(L::GridLocation, Optional, "GridLocation"),
    named(L::IntIndexDimension, Optional, "InwardNormalIndex"),
    named(L::IndexArray, Optional, "InwardNormalList"),
    named(L::FamilyName, Optional, "FamilyName"),
    many(L::AdditionalFamilyName),
    many(L::BCDataSet),
    named(L::BCProperty, Optional, "BCProperty"),
    opt(L::ReferenceState),
    named(L::Ordinal, Optional, "Ordinal"),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

const BC_DATASET: &[Relation] = &[
    named(L::BCData, Optional, "DirichletData"),
    named(L::BCData, Optional, "NeumannData"),
    named(L::GridLocation, Optional, "GridLocation"),
    opt(L::IndexRange),
    opt(L::IndexArray),
    opt(L::ReferenceState),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

const BC_PROPERTY: &[Relation] = &[
    named(L::WallFunction, Optional, "WallFunction"),
    named(L::Area, Optional, "Area"),
    many(L::Descriptor),
    many(L::UserDefinedData),
];

const WALL_FUNCTION: &[Relation] = &[
    named(L::WallFunctionType, One, "WallFunctionType"),
    many(L::Descriptor),
    many(L::UserDefinedData),
];

const AREA: &[Relation] = &[
    named(L::AreaType, One, "AreaType"),
    many(L::DataArray),
    many(L::Descriptor),
    many(L::UserDefinedData),
];

const ZONE_GRID_CONNECTIVITY: &[Relation] = &[
    many(L::GridConnectivity1to1),
    many(L::GridConnectivity),
    many(L::OversetHoles),
    many(L::Descriptor),
    many(L::UserDefinedData),
];

const ONE_TO_ONE: &[Relation] = &[
    named(L::IntIndexDimension, Optional, "Transform"),
    named(L::IndexRange, One, "PointRange"),
    named(L::IndexRange, One, "PointRangeDonor"),
    named(L::GridConnectivityProperty, Optional, "GridConnectivityProperty"),
    named(L::Ordinal, Optional, "Ordinal"),
    many(L::Descriptor),
    many(L::UserDefinedData),
];

const GRID_CONNECTIVITY: &[Relation] = &[
    named(L::GridConnectivityType, Optional, "GridConnectivityType"),
    named(L::GridLocation, Optional, "GridLocation"),
    opt(L::IndexRange),
    opt(L::IndexArray),
    many(L::DataArray),
    named(L::GridConnectivityProperty, Optional, "GridConnectivityProperty"),
    named(L::Ordinal, Optional, "Ordinal"),
    many(L::Descriptor),
    many(L::UserDefinedData),
];

const GC_PROPERTY: &[Relation] = &[
    named(L::Periodic, Optional, "Periodic"),
    named(L::AverageInterface, Optional, "AverageInterface"),
    many(L::Descriptor),
    many(L::UserDefinedData),
];

const AVERAGE_INTERFACE: &[Relation] = &[
    named(L::AverageInterfaceType, One, "AverageInterfaceType"),
    many(L::Descriptor),
    many(L::UserDefinedData),
];

const OVERSET_HOLES: &[Relation] = &[
    named(L::GridLocation, Optional, "GridLocation"),
    many(L::IndexRange),
    opt(L::IndexArray),
    many(L::Descriptor),
    many(L::UserDefinedData),
];

const FLOW_EQUATION_SET: &[Relation] = &[
    named(L::Int, Optional, "EquationDimension"),
    named(L::GoverningEquations, Optional, "GoverningEquations"),
    named(L::GasModel, Optional, "GasModel"),
    named(L::ViscosityModel, Optional, "ViscosityModel"),
    named(L::ThermalConductivityModel, Optional, "ThermalConductivityModel"),
    named(L::TurbulenceClosure, Optional, "TurbulenceClosure"),
    named(L::TurbulenceModel, Optional, "TurbulenceModel"),
    named(L::ThermalRelaxationModel, Optional, "ThermalRelaxationModel"),
    named(L::ChemicalKineticsModel, Optional, "ChemicalKineticsModel"),
    named(L::EMElectricFieldModel, Optional, "EMElectricFieldModel"),
    named(L::EMMagneticFieldModel, Optional, "EMMagneticFieldModel"),
    named(L::EMConductivityModel, Optional, "EMConductivityModel"),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

const GOVERNING_EQUATIONS: &[Relation] = &[
    named(L::IntDiffusion, Optional, "DiffusionModel"),
    many(L::Descriptor),
    many(L::UserDefinedData),
];

const TURBULENCE_MODEL: &[Relation] = &[
    named(L::IntDiffusion, Optional, "DiffusionModel"),
    many(L::DataArray),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

const ARBITRARY_MOTION: &[Relation] = &[
    named(L::ArbitraryGridMotionType, One, "ArbitraryGridMotionType"),
    named(L::GridLocation, Optional, "GridLocation"),
    named(L::Rind, Optional, "Rind"),
    many(L::DataArray),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

const RIGID_MOTION: &[Relation] = &[
    named(L::RigidGridMotionType, One, "RigidGridMotionType"),
    many(L::DataArray),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

const SUBREGION: &[Relation] = &[
    named(L::GridLocation, Optional, "GridLocation"),
    named(L::Rind, Optional, "Rind"),
    opt(L::IndexRange),
    opt(L::IndexArray),
    named(L::FamilyName, Optional, "FamilyName"),
    many(L::AdditionalFamilyName),
    many(L::DataArray),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

const FAMILY: &[Relation] = &[
    opt(L::FamilyBC),
    many(L::GeometryReference),
    opt(L::RotatingCoordinates),
    many(L::Family),
    named(L::FamilyName, Optional, "FamilyName"),
    many(L::AdditionalFamilyName),
    named(L::Ordinal, Optional, "Ordinal"),
    many(L::Descriptor),
    many(L::UserDefinedData),
];

const FAMILY_BC: &[Relation] = &[many(L::FamilyBCDataSet)];

const GEOMETRY_REFERENCE: &[Relation] = &[
    named(L::GeometryFile, One, "GeometryFile"),
    named(L::GeometryFormat, One, "GeometryFormat"),
    many(L::GeometryEntity),
    many(L::Descriptor),
    many(L::UserDefinedData),
];

const USER_DATA: &[Relation] = &[
    named(L::GridLocation, Optional, "GridLocation"),
    opt(L::IndexRange),
    opt(L::IndexArray),
    named(L::FamilyName, Optional, "FamilyName"),
    many(L::AdditionalFamilyName),
    named(L::Ordinal, Optional, "Ordinal"),
    many(L::DataArray),
    many(L::Descriptor),
    opt(L::DataClass),
    opt(L::DimensionalUnits),
    many(L::UserDefinedData),
];

/// Every relation `kind` admits.
pub fn relations(kind: EntityKind) -> &'static [Relation] {
    use EntityKind as K;
    match kind {
        K::Base => BASE,
        K::Zone => ZONE,
        K::GridCoordinates => GRID_COORDINATES,
        K::DataArray => DATA_ARRAY,
        K::Section => SECTION,
        K::FlowSolution | K::DiscreteData => SOLUTION,
        K::IntegralData
        | K::BCData
        | K::Periodic
        | K::ReferenceState
        | K::ConvergenceHistory
        | K::Gravity
        | K::Axisymmetry
        | K::RotatingCoordinates
        | K::BaseIterativeData
        | K::ZoneIterativeData => ARRAYS_ONLY,
        K::Model(Label::TurbulenceModel) => TURBULENCE_MODEL,
        K::Model(_) => ARRAYS_ONLY,
        K::ZoneBC => ZONE_BC,
        K::BC => BC,
        K::BCDataSet => BC_DATASET,
        K::BCProperty => BC_PROPERTY,
        K::WallFunction => WALL_FUNCTION,
        K::Area => AREA,
        K::ZoneGridConnectivity => ZONE_GRID_CONNECTIVITY,
        K::GridConnectivity => GRID_CONNECTIVITY,
        K::GridConnectivity1to1 => ONE_TO_ONE,
        K::GridConnectivityProperty => GC_PROPERTY,
        K::AverageInterface => AVERAGE_INTERFACE,
        K::OversetHoles => OVERSET_HOLES,
        K::FlowEquationSet => FLOW_EQUATION_SET,
        K::GoverningEquations => GOVERNING_EQUATIONS,
        K::RigidGridMotion => RIGID_MOTION,
        K::ArbitraryGridMotion => ARBITRARY_MOTION,
        K::ZoneSubRegion => SUBREGION,
        K::Family => FAMILY,
        K::FamilyBC => FAMILY_BC,
        K::GeometryReference => GEOMETRY_REFERENCE,
        K::UserDefinedData => USER_DATA,
    }
}

/// The first relation of `kind` with child label `label`.
pub fn relation(kind: EntityKind, label: Label) -> Option<&'static Relation> {
    relations(kind).iter().find(|r| r.label == label)
}

/// Whether `kind` admits children labelled `label`.
pub fn admits(kind: EntityKind, label: Label) -> bool {
    relation(kind, label).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_round_trips_for_structural_kinds() {
        for &label in Label::ALL {
            if let Some(kind) = EntityKind::from_label(label) {
                if label != Label::FamilyBCDataSet {
                    assert_eq!(kind.label(), label);
                }
            }
        }
    }

    #[test]
    fn every_structural_child_is_a_kind() {
        let kinds: Vec<EntityKind> = Label::ALL
            .iter()
            .filter_map(|&l| EntityKind::from_label(l))
            .collect();
        for kind in kinds {
            for rel in relations(kind) {
                if let Some(child) = EntityKind::from_label(rel.label) {
                    assert!(!relations(child).is_empty(), "{kind:?} -> {:?}", rel.label);
                }
            }
        }
    }

    #[test]
    fn zone_admits_sections_but_not_zones() {
        assert!(admits(EntityKind::Zone, Label::Elements));
        assert!(!admits(EntityKind::Zone, Label::Zone));
        assert_eq!(
            relation(EntityKind::Zone, Label::ZoneType).map(|r| r.multiplicity),
            Some(Multiplicity::One)
        );
    }

    #[test]
    fn only_turbulence_models_carry_diffusion() {
        assert!(admits(EntityKind::Model(Label::TurbulenceModel), Label::IntDiffusion));
        assert!(!admits(EntityKind::Model(Label::GasModel), Label::IntDiffusion));
    }

    #[test]
    fn multiplicity_admits_counts() {
        assert!(Multiplicity::Optional.admits(0));
        assert!(!Multiplicity::Optional.admits(2));
        assert!(!Multiplicity::One.admits(0));
        assert!(Multiplicity::Many.admits(7));
    }
}
