//! The fixed set of schema labels.
//!
//! Every stored node carries one of these labels. The label, not the node
//! name, determines how a node is interpreted.

use std::fmt;

macro_rules! labels {
    ($( $(#[$doc:meta])* $variant:ident => $text:expr, )*) => {
        /// A schema label.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Label {
            $( $(#[$doc])* $variant, )*
        }

        impl Label {
            /// Every label in declaration order.
            pub const ALL: &'static [Label] = &[$( Label::$variant, )*];

            /// The on-disk label text.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Label::$variant => $text, )*
                }
            }
        }
    };
}

labels! {
    /// Library version stamp at the file root.
    LibraryVersion => "CGNSLibraryVersion_t",
    /// Simulation base.
    Base => "CGNSBase_t",
    /// Zone.
    Zone => "Zone_t",
    /// Zone type enumeration.
    ZoneType => "ZoneType_t",
    /// Grid coordinates container.
    GridCoordinates => "GridCoordinates_t",
    /// Generic data array.
    DataArray => "DataArray_t",
    /// Element section.
    Elements => "Elements_t",
    /// Index range (`[index_dim, 2]`).
    IndexRange => "IndexRange_t",
    /// Index list (`[index_dim, n]`).
    IndexArray => "IndexArray_t",
    /// Flow solution container.
    FlowSolution => "FlowSolution_t",
    /// Discrete data container.
    DiscreteData => "DiscreteData_t",
    /// Integral data container.
    IntegralData => "IntegralData_t",
    /// Zone boundary condition container.
    ZoneBC => "ZoneBC_t",
    /// Boundary condition.
    BC => "BC_t",
    /// Boundary condition dataset.
    BCDataSet => "BCDataSet_t",
    /// Family boundary condition dataset.
    FamilyBCDataSet => "FamilyBCDataSet_t",
    /// Dirichlet or Neumann data of a dataset.
    BCData => "BCData_t",
    /// Boundary condition properties.
    BCProperty => "BCProperty_t",
    /// Wall function property.
    WallFunction => "WallFunction_t",
    /// Wall function type enumeration.
    WallFunctionType => "WallFunctionType_t",
    /// Area property.
    Area => "Area_t",
    /// Area type enumeration.
    AreaType => "AreaType_t",
    /// Zone grid connectivity container.
    ZoneGridConnectivity => "ZoneGridConnectivity_t",
    /// General grid connectivity.
    GridConnectivity => "GridConnectivity_t",
    /// One-to-one grid connectivity.
    GridConnectivity1to1 => "GridConnectivity1to1_t",
    /// Grid connectivity type enumeration.
    GridConnectivityType => "GridConnectivityType_t",
    /// Grid connectivity properties.
    GridConnectivityProperty => "GridConnectivityProperty_t",
    /// Periodic interface property.
    Periodic => "Periodic_t",
    /// Average interface property.
    AverageInterface => "AverageInterface_t",
    /// Average interface type enumeration.
    AverageInterfaceType => "AverageInterfaceType_t",
    /// Overset holes.
    OversetHoles => "OversetHoles_t",
    /// Reference state.
    ReferenceState => "ReferenceState_t",
    /// Flow equation set.
    FlowEquationSet => "FlowEquationSet_t",
    /// Governing equations.
    GoverningEquations => "GoverningEquations_t",
    /// Gas model.
    GasModel => "GasModel_t",
    /// Viscosity model.
    ViscosityModel => "ViscosityModel_t",
    /// Thermal conductivity model.
    ThermalConductivityModel => "ThermalConductivityModel_t",
    /// Turbulence closure.
    TurbulenceClosure => "TurbulenceClosure_t",
    /// Turbulence model.
    TurbulenceModel => "TurbulenceModel_t",
    /// Thermal relaxation model.
    ThermalRelaxationModel => "ThermalRelaxationModel_t",
    /// Chemical kinetics model.
    ChemicalKineticsModel => "ChemicalKineticsModel_t",
    /// Electric field model.
    EMElectricFieldModel => "EMElectricFieldModel_t",
    /// Magnetic field model.
    EMMagneticFieldModel => "EMMagneticFieldModel_t",
    /// Conductivity model.
    EMConductivityModel => "EMConductivityModel_t",
    /// Convergence history.
    ConvergenceHistory => "ConvergenceHistory_t",
    /// Gravity vector.
    Gravity => "Gravity_t",
    /// Axisymmetry description.
    Axisymmetry => "Axisymmetry_t",
    /// Rotating coordinates description.
    RotatingCoordinates => "RotatingCoordinates_t",
    /// Rigid grid motion.
    RigidGridMotion => "RigidGridMotion_t",
    /// Rigid grid motion type enumeration.
    RigidGridMotionType => "RigidGridMotionType_t",
    /// Arbitrary grid motion.
    ArbitraryGridMotion => "ArbitraryGridMotion_t",
    /// Arbitrary grid motion type enumeration.
    ArbitraryGridMotionType => "ArbitraryGridMotionType_t",
    /// Base iterative data.
    BaseIterativeData => "BaseIterativeData_t",
    /// Zone iterative data.
    ZoneIterativeData => "ZoneIterativeData_t",
    /// Zone sub-region.
    ZoneSubRegion => "ZoneSubRegion_t",
    /// Family.
    Family => "Family_t",
    /// Family boundary condition.
    FamilyBC => "FamilyBC_t",
    /// Family name reference.
    FamilyName => "FamilyName_t",
    /// Additional family name reference.
    AdditionalFamilyName => "AdditionalFamilyName_t",
    /// Geometry reference.
    GeometryReference => "GeometryReference_t",
    /// Geometry file name.
    GeometryFile => "GeometryFile_t",
    /// Geometry file format.
    GeometryFormat => "GeometryFormat_t",
    /// Geometry entity (part) name.
    GeometryEntity => "GeometryEntity_t",
    /// User-defined data.
    UserDefinedData => "UserDefinedData_t",
    /// Free text descriptor.
    Descriptor => "Descriptor_t",
    /// Dimensional units.
    DimensionalUnits => "DimensionalUnits_t",
    /// Additional (electromagnetic, amount, luminous) units.
    AdditionalUnits => "AdditionalUnits_t",
    /// Dimensional exponents.
    DimensionalExponents => "DimensionalExponents_t",
    /// Additional dimensional exponents.
    AdditionalExponents => "AdditionalExponents_t",
    /// Data conversion factors.
    DataConversion => "DataConversion_t",
    /// Data class enumeration.
    DataClass => "DataClass_t",
    /// Grid location enumeration.
    GridLocation => "GridLocation_t",
    /// Rind planes.
    Rind => "Rind_t",
    /// Ordinal.
    Ordinal => "Ordinal_t",
    /// Simulation type enumeration.
    SimulationType => "SimulationType_t",
    /// Per-index-dimension integer vector (transform, inward normal index).
    IntIndexDimension => "int[IndexDimension]",
    /// Diffusion model flags.
    IntDiffusion => "int[1+...+IndexDimension]",
    /// Scalar integer (equation dimension).
    Int => "int",
}

impl Label {
    /// Look up a label by its on-disk text.
    pub fn parse(text: &str) -> Option<Label> {
        let text = text.trim().trim_matches('"');
        Self::ALL.iter().copied().find(|l| l.as_str() == text)
    }

    /// Whether this label names one of the ten physical model kinds.
    pub fn is_model(self) -> bool {
        matches!(
            self,
            Label::GasModel
                | Label::ViscosityModel
                | Label::ThermalConductivityModel
                | Label::TurbulenceClosure
                | Label::TurbulenceModel
                | Label::ThermalRelaxationModel
                | Label::ChemicalKineticsModel
                | Label::EMElectricFieldModel
                | Label::EMMagneticFieldModel
                | Label::EMConductivityModel
        )
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
