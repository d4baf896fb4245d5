//! Named enumerations stored as space-padded character data.
//!
//! Each enumeration has a fixed numeric code and a fixed on-disk name.
//! `Null` (code 0) and `UserDefined` (code 1) are present in every table;
//! `UserDefined` doubles as the placeholder for names written by a newer
//! schema revision than this library understands.

/// Common behaviour of the named enumerations.
pub trait NamedEnum: Copy + Eq + Sized + 'static {
    /// Every value in code order.
    const ALL: &'static [Self];
    /// Placeholder for names outside the table.
    const USER_DEFINED: Self;
    /// Type name used in diagnostics.
    const TYPE_NAME: &'static str;

    /// The on-disk name.
    fn name(self) -> &'static str;

    /// The numeric code.
    fn code(self) -> i32;

    /// Look up a value by on-disk name (trailing blanks ignored).
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim_end_matches([' ', '\0']);
        Self::ALL.iter().copied().find(|v| v.name() == text)
    }

    /// Look up a value by numeric code.
    fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.code() == code)
    }
}

macro_rules! named_enum {
    (
        $(#[$doc:meta])*
        $name:ident {
            $( $variant:ident = $code:expr => $text:expr ),* $(,)?
        }
    ) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            /// Unset.
            #[default]
            Null,
            /// User-defined or unrecognized value.
            UserDefined,
            $( #[doc = concat!("`", $text, "`")] $variant, )*
        }

        impl NamedEnum for $name {
            const ALL: &'static [Self] = &[$name::Null, $name::UserDefined, $( $name::$variant, )*];
            const USER_DEFINED: Self = $name::UserDefined;
            const TYPE_NAME: &'static str = stringify!($name);

            fn name(self) -> &'static str {
                match self {
                    $name::Null => "Null",
                    $name::UserDefined => "UserDefined",
                    $( $name::$variant => $text, )*
                }
            }

            fn code(self) -> i32 {
                match self {
                    $name::Null => 0,
                    $name::UserDefined => 1,
                    $( $name::$variant => $code, )*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

// ── Units ─────────────────────────────────────────────────────────

named_enum! {
    /// Mass units.
    MassUnits { Kilogram = 2 => "Kilogram", Gram = 3 => "Gram", Slug = 4 => "Slug", PoundMass = 5 => "PoundMass" }
}

named_enum! {
    /// Length units.
    LengthUnits {
        Meter = 2 => "Meter", Centimeter = 3 => "Centimeter", Millimeter = 4 => "Millimeter",
        Foot = 5 => "Foot", Inch = 6 => "Inch",
    }
}

named_enum! {
    /// Time units.
    TimeUnits { Second = 2 => "Second" }
}

named_enum! {
    /// Temperature units.
    TemperatureUnits {
        Kelvin = 2 => "Kelvin", Celsius = 3 => "Celsius", Rankine = 4 => "Rankine",
        Fahrenheit = 5 => "Fahrenheit",
    }
}

named_enum! {
    /// Angle units.
    AngleUnits { Degree = 2 => "Degree", Radian = 3 => "Radian" }
}

named_enum! {
    /// Electric current units.
    ElectricCurrentUnits {
        Ampere = 2 => "Ampere", Abampere = 3 => "Abampere", Statampere = 4 => "Statampere",
        Edison = 5 => "Edison", AuCurrent = 6 => "auCurrent",
    }
}

named_enum! {
    /// Substance amount units.
    SubstanceAmountUnits {
        Mole = 2 => "Mole", Entities = 3 => "Entities",
        StandardCubicFoot = 4 => "StandardCubicFoot", StandardCubicMeter = 5 => "StandardCubicMeter",
    }
}

named_enum! {
    /// Luminous intensity units.
    LuminousIntensityUnits {
        Candela = 2 => "Candela", Candle = 3 => "Candle", Carcel = 4 => "Carcel",
        Hefner = 5 => "Hefner", Violle = 6 => "Violle",
    }
}

// ── Data description ──────────────────────────────────────────────

named_enum! {
    /// How array values relate to physical dimensions.
    DataClass {
        Dimensional = 2 => "Dimensional",
        NormalizedByDimensional = 3 => "NormalizedByDimensional",
        NormalizedByUnknownDimensional = 4 => "NormalizedByUnknownDimensional",
        NondimensionalParameter = 5 => "NondimensionalParameter",
        DimensionlessConstant = 6 => "DimensionlessConstant",
    }
}

named_enum! {
    /// Where in a cell a value is located.
    GridLocation {
        Vertex = 2 => "Vertex", CellCenter = 3 => "CellCenter", FaceCenter = 4 => "FaceCenter",
        IFaceCenter = 5 => "IFaceCenter", JFaceCenter = 6 => "JFaceCenter",
        KFaceCenter = 7 => "KFaceCenter", EdgeCenter = 8 => "EdgeCenter",
    }
}

named_enum! {
    /// Kind of point set.
    PointSetType {
        PointList = 2 => "PointList", PointListDonor = 3 => "PointListDonor",
        PointRange = 4 => "PointRange", PointRangeDonor = 5 => "PointRangeDonor",
        ElementRange = 6 => "ElementRange", ElementList = 7 => "ElementList",
        CellListDonor = 8 => "CellListDonor",
    }
}

impl PointSetType {
    /// Whether the set is stored as a two-corner index range.
    pub fn is_range(self) -> bool {
        matches!(
            self,
            PointSetType::PointRange | PointSetType::PointRangeDonor | PointSetType::ElementRange
        )
    }

    /// Whether the set is stored as an explicit index list.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            PointSetType::PointList
                | PointSetType::PointListDonor
                | PointSetType::ElementList
                | PointSetType::CellListDonor
        )
    }

    /// Whether the set describes donor points of a connectivity.
    pub fn is_donor(self) -> bool {
        matches!(
            self,
            PointSetType::PointListDonor | PointSetType::PointRangeDonor | PointSetType::CellListDonor
        )
    }
}

named_enum! {
    /// Zone topology.
    ZoneType { Structured = 2 => "Structured", Unstructured = 3 => "Unstructured" }
}

named_enum! {
    /// Simulation time treatment.
    SimulationType { TimeAccurate = 2 => "TimeAccurate", NonTimeAccurate = 3 => "NonTimeAccurate" }
}

// ── Boundary conditions and connectivity ──────────────────────────

named_enum! {
    /// Boundary condition type.
    BCType {
        BCAxisymmetricWedge = 2 => "BCAxisymmetricWedge", BCDegenerateLine = 3 => "BCDegenerateLine",
        BCDegeneratePoint = 4 => "BCDegeneratePoint", BCDirichlet = 5 => "BCDirichlet",
        BCExtrapolate = 6 => "BCExtrapolate", BCFarfield = 7 => "BCFarfield",
        BCGeneral = 8 => "BCGeneral", BCInflow = 9 => "BCInflow",
        BCInflowSubsonic = 10 => "BCInflowSubsonic", BCInflowSupersonic = 11 => "BCInflowSupersonic",
        BCNeumann = 12 => "BCNeumann", BCOutflow = 13 => "BCOutflow",
        BCOutflowSubsonic = 14 => "BCOutflowSubsonic", BCOutflowSupersonic = 15 => "BCOutflowSupersonic",
        BCSymmetryPlane = 16 => "BCSymmetryPlane", BCSymmetryPolar = 17 => "BCSymmetryPolar",
        BCTunnelInflow = 18 => "BCTunnelInflow", BCTunnelOutflow = 19 => "BCTunnelOutflow",
        BCWall = 20 => "BCWall", BCWallInviscid = 21 => "BCWallInviscid",
        BCWallViscous = 22 => "BCWallViscous", BCWallViscousHeatFlux = 23 => "BCWallViscousHeatFlux",
        BCWallViscousIsothermal = 24 => "BCWallViscousIsothermal", FamilySpecified = 25 => "FamilySpecified",
    }
}

named_enum! {
    /// Which boundary data a dataset holds.
    BCDataType { Dirichlet = 2 => "Dirichlet", Neumann = 3 => "Neumann" }
}

named_enum! {
    /// Grid connectivity type.
    GridConnectivityType {
        Overset = 2 => "Overset", Abutting = 3 => "Abutting", Abutting1to1 = 4 => "Abutting1to1",
    }
}

named_enum! {
    /// Wall function type.
    WallFunctionType { Generic = 2 => "Generic" }
}

named_enum! {
    /// Area type.
    AreaType { BleedArea = 2 => "BleedArea", CaptureArea = 3 => "CaptureArea" }
}

named_enum! {
    /// Average interface type.
    AverageInterfaceType {
        AverageAll = 2 => "AverageAll", AverageCircumferential = 3 => "AverageCircumferential",
        AverageRadial = 4 => "AverageRadial", AverageI = 5 => "AverageI",
        AverageJ = 6 => "AverageJ", AverageK = 7 => "AverageK",
    }
}

// ── Physics ───────────────────────────────────────────────────────

named_enum! {
    /// Governing equations type.
    GoverningEquationsType {
        FullPotential = 2 => "FullPotential", Euler = 3 => "Euler", NSLaminar = 4 => "NSLaminar",
        NSTurbulent = 5 => "NSTurbulent", NSLaminarIncompressible = 6 => "NSLaminarIncompressible",
        NSTurbulentIncompressible = 7 => "NSTurbulentIncompressible",
        LatticeBoltzmann = 8 => "LatticeBoltzmann",
    }
}

named_enum! {
    /// Physical model type.
    ModelType {
        Ideal = 2 => "Ideal", VanderWaals = 3 => "VanderWaals", Constant = 4 => "Constant",
        PowerLaw = 5 => "PowerLaw", SutherlandLaw = 6 => "SutherlandLaw",
        ConstantPrandtl = 7 => "ConstantPrandtl", EddyViscosity = 8 => "EddyViscosity",
        ReynoldsStress = 9 => "ReynoldsStress", ReynoldsStressAlgebraic = 10 => "ReynoldsStressAlgebraic",
        AlgebraicBaldwinLomax = 11 => "Algebraic_BaldwinLomax",
        AlgebraicCebeciSmith = 12 => "Algebraic_CebeciSmith",
        HalfEquationJohnsonKing = 13 => "HalfEquation_JohnsonKing",
        OneEquationBaldwinBarth = 14 => "OneEquation_BaldwinBarth",
        OneEquationSpalartAllmaras = 15 => "OneEquation_SpalartAllmaras",
        TwoEquationJonesLaunder = 16 => "TwoEquation_JonesLaunder",
        TwoEquationMenterSST = 17 => "TwoEquation_MenterSST",
        TwoEquationWilcox = 18 => "TwoEquation_Wilcox",
        CaloricallyPerfect = 19 => "CaloricallyPerfect", ThermallyPerfect = 20 => "ThermallyPerfect",
        ConstantDensity = 21 => "ConstantDensity", RedlichKwong = 22 => "RedlichKwong",
        Frozen = 23 => "Frozen", ThermalEquilib = 24 => "ThermalEquilib",
        ThermalNonequilib = 25 => "ThermalNonequilib",
        ChemicalEquilibCurveFit = 26 => "ChemicalEquilibCurveFit",
        ChemicalEquilibMinimization = 27 => "ChemicalEquilibMinimization",
        ChemicalNonequilib = 28 => "ChemicalNonequilib",
        EMElectricField = 29 => "EMElectricField", EMMagneticField = 30 => "EMMagneticField",
        EMConductivity = 31 => "EMConductivity", Voltage = 32 => "Voltage",
        Interpolated = 33 => "Interpolated",
        EquilibriumLinRessler = 34 => "Equilibrium_LinRessler",
        ChemistryLinRessler = 35 => "Chemistry_LinRessler",
    }
}

// ── Motion ────────────────────────────────────────────────────────

named_enum! {
    /// Rigid grid motion type.
    RigidGridMotionType { ConstantRate = 2 => "ConstantRate", VariableRate = 3 => "VariableRate" }
}

named_enum! {
    /// Arbitrary grid motion type.
    ArbitraryGridMotionType {
        NonDeformingGrid = 2 => "NonDeformingGrid", DeformingGrid = 3 => "DeformingGrid",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_padding() {
        assert_eq!(MassUnits::parse("Kilogram    "), Some(MassUnits::Kilogram));
        assert_eq!(GridLocation::parse("CellCenter\0\0"), Some(GridLocation::CellCenter));
        assert_eq!(MassUnits::parse("Stone"), None);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(GridLocation::EdgeCenter.code(), 8);
        assert_eq!(PointSetType::CellListDonor.code(), 8);
        assert_eq!(BCType::FamilySpecified.code(), 25);
        assert_eq!(ModelType::ChemistryLinRessler.code(), 35);
        assert_eq!(ModelType::from_code(15), Some(ModelType::OneEquationSpalartAllmaras));
    }

    #[test]
    fn underscore_names_survive() {
        assert_eq!(ModelType::AlgebraicBaldwinLomax.name(), "Algebraic_BaldwinLomax");
        assert_eq!(ElectricCurrentUnits::AuCurrent.name(), "auCurrent");
    }

    #[test]
    fn point_set_classes_partition() {
        for &kind in PointSetType::ALL.iter().skip(2) {
            assert!(kind.is_range() ^ kind.is_list(), "{kind}");
        }
    }
}
