//! Leaf records: descriptors, units, exponents, conversions and data
//! arrays.

use meshtree_core::{
    element_count, AngleUnits, Data, DataType, Dims, ElectricCurrentUnits, LengthUnits,
    LuminousIntensityUnits, MassUnits, SubstanceAmountUnits, TemperatureUnits, TimeUnits,
};

use crate::header::{impl_named, Header, Meta};

/// A named block of free text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Descriptor {
    /// Identity.
    pub header: Header,
    /// The text.
    pub text: String,
}

impl Descriptor {
    /// A descriptor named `name` holding `text`.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            header: Header::new(name),
            text: text.into(),
        }
    }
}

/// The unit system of dimensional data.
///
/// The first five units are always stored; the last three are stored in
/// an additional node only when any of them is set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DimensionalUnits {
    /// Identity (named `DimensionalUnits`).
    pub header: Header,
    /// Mass.
    pub mass: MassUnits,
    /// Length.
    pub length: LengthUnits,
    /// Time.
    pub time: TimeUnits,
    /// Temperature.
    pub temperature: TemperatureUnits,
    /// Angle.
    pub angle: AngleUnits,
    /// Electric current.
    pub current: ElectricCurrentUnits,
    /// Substance amount.
    pub amount: SubstanceAmountUnits,
    /// Luminous intensity.
    pub luminous: LuminousIntensityUnits,
}

impl DimensionalUnits {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "DimensionalUnits";
    /// Fixed name of the additional-units node.
    pub const ADDITIONAL_NAME: &'static str = "AdditionalUnits";

    /// SI-style base units with the additional units unset.
    pub fn new(
        mass: MassUnits,
        length: LengthUnits,
        time: TimeUnits,
        temperature: TemperatureUnits,
        angle: AngleUnits,
    ) -> Self {
        Self {
            header: Header::new(Self::NODE_NAME),
            mass,
            length,
            time,
            temperature,
            angle,
            ..Self::default()
        }
    }

    /// Whether any additional unit is set.
    pub fn has_additional(&self) -> bool {
        self.current != ElectricCurrentUnits::Null
            || self.amount != SubstanceAmountUnits::Null
            || self.luminous != LuminousIntensityUnits::Null
    }
}

/// Exponents of the base units for one array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DimensionalExponents {
    /// Identity (named `DimensionalExponents`).
    pub header: Header,
    /// Stored element type (`R4` or `R8`).
    pub data_type: DataType,
    /// Mass, length, time, temperature, angle exponents.
    pub base: [f64; 5],
    /// Current, amount, luminous exponents, when stored.
    pub additional: Option<[f64; 3]>,
}

impl DimensionalExponents {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "DimensionalExponents";
    /// Fixed name of the additional-exponents node.
    pub const ADDITIONAL_NAME: &'static str = "AdditionalExponents";

    /// `R8` exponents with no additional exponents.
    pub fn new(base: [f64; 5]) -> Self {
        Self {
            header: Header::new(Self::NODE_NAME),
            data_type: DataType::Float64,
            base,
            additional: None,
        }
    }
}

/// Linear scale and offset from stored to physical values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataConversion {
    /// Identity (named `DataConversion`).
    pub header: Header,
    /// Stored element type (`R4` or `R8`).
    pub data_type: DataType,
    /// Scale factor.
    pub scale: f64,
    /// Offset.
    pub offset: f64,
}

impl DataConversion {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "DataConversion";

    /// `R8` factors.
    pub fn new(scale: f64, offset: f64) -> Self {
        Self {
            header: Header::new(Self::NODE_NAME),
            data_type: DataType::Float64,
            scale,
            offset,
        }
    }
}

/// A named, typed, dimensioned array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataArray {
    /// Identity.
    pub header: Header,
    /// Stored element type.
    pub data_type: DataType,
    /// Per-axis extents.
    pub dims: Dims,
    /// Contents, `None` while a placeholder is being filled.
    pub data: Option<Data>,
    /// Dimensional exponents.
    pub exponents: Option<DimensionalExponents>,
    /// Data conversion factors.
    pub conversion: Option<DataConversion>,
    /// Descriptors, data class and units.
    pub meta: Meta,
}

impl DataArray {
    /// An array named `name` holding `data` with extents `dims`.
    pub fn new(name: impl Into<String>, dims: &[usize], data: Data) -> Self {
        Self {
            header: Header::new(name),
            data_type: data.data_type(),
            dims: dims.iter().copied().collect(),
            data: Some(data),
            ..Self::default()
        }
    }

    /// A rank-1 array holding all of `data`.
    pub fn vector(name: impl Into<String>, data: Data) -> Self {
        let len = data.len();
        Self::new(name, &[len], data)
    }

    /// Number of elements described by the extents.
    pub fn len(&self) -> usize {
        element_count(&self.dims)
    }

    /// Whether the extents describe no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Integer contents widened to `i64`.
    pub fn index_values(&self) -> Option<Vec<i64>> {
        self.data.as_ref().and_then(Data::to_index_vec)
    }
}

/// An additional family reference.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdditionalFamilyName {
    /// Identity.
    pub header: Header,
    /// Referenced family path or name.
    pub family: String,
}

impl AdditionalFamilyName {
    /// A reference named `name` to `family`.
    pub fn new(name: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            header: Header::new(name),
            family: family.into(),
        }
    }
}

impl_named!(
    Descriptor,
    DimensionalUnits,
    DimensionalExponents,
    DataConversion,
    DataArray,
    AdditionalFamilyName,
);
