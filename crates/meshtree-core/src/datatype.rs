//! Element datatypes, owned data buffers, and numeric conversion.
//!
//! Every stored node declares one [`DataType`], written on disk as a
//! two-character code (`"I4"`, `"R8"`, ...). Node payloads travel between
//! layers as a [`Data`] buffer whose variant fixes the element type.
//!
//! Conversion between element types follows ordinary numeric-cast
//! semantics: widening is exact, narrowing wraps or truncates toward zero,
//! and nothing is range-checked. Float-to-integer conversion goes through
//! `i64` so out-of-range values wrap like an integer narrowing instead of
//! saturating.

use std::fmt;

/// Element datatype of a stored node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    /// No data (`MT`). Structural nodes carry no payload.
    #[default]
    Empty,
    /// 32-bit signed integer (`I4`).
    Int32,
    /// 64-bit signed integer (`I8`).
    Int64,
    /// 32-bit IEEE float (`R4`).
    Float32,
    /// 64-bit IEEE float (`R8`).
    Float64,
    /// Single byte character (`C1`).
    Char,
}

impl DataType {
    /// All datatypes in code order.
    pub const ALL: [DataType; 6] = [
        DataType::Empty,
        DataType::Int32,
        DataType::Int64,
        DataType::Float32,
        DataType::Float64,
        DataType::Char,
    ];

    /// The two-character on-disk code.
    pub fn code(self) -> &'static str {
        match self {
            DataType::Empty => "MT",
            DataType::Int32 => "I4",
            DataType::Int64 => "I8",
            DataType::Float32 => "R4",
            DataType::Float64 => "R8",
            DataType::Char => "C1",
        }
    }

    /// Parse an on-disk code. Returns `None` for codes outside the
    /// supported set.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code.trim())
    }

    /// Size of one element in bytes (0 for [`DataType::Empty`]).
    pub fn size(self) -> usize {
        match self {
            DataType::Empty => 0,
            DataType::Char => 1,
            DataType::Int32 | DataType::Float32 => 4,
            DataType::Int64 | DataType::Float64 => 8,
        }
    }

    /// Whether the type holds integers (index data must be integral).
    pub fn is_integer(self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int64)
    }

    /// Whether the type holds floating-point values.
    pub fn is_real(self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ── Element conversion ────────────────────────────────────────────

/// A primitive that can live in a [`Data`] buffer.
///
/// Integers route through `i64` and floats through `f64`; the target
/// type then applies its own cast.
pub trait Element: Copy {
    /// The datatype code this element is stored as.
    const TYPE: DataType;
    /// Whether the source value should be treated as an integer.
    const INTEGRAL: bool;
    /// Widen to `i64` (floats truncate toward zero).
    fn to_i64(self) -> i64;
    /// Widen to `f64`.
    fn to_f64(self) -> f64;
    /// Narrow from `i64` with wrapping cast semantics.
    fn from_i64(v: i64) -> Self;
    /// Narrow from `f64` with truncating cast semantics.
    fn from_f64(v: f64) -> Self;
}

macro_rules! int_element {
    ($t:ty, $dt:expr) => {
        impl Element for $t {
            const TYPE: DataType = $dt;
            const INTEGRAL: bool = true;
            fn to_i64(self) -> i64 {
                self as i64
            }
            fn to_f64(self) -> f64 {
                self as f64
            }
            fn from_i64(v: i64) -> Self {
                v as $t
            }
            fn from_f64(v: f64) -> Self {
                (v as i64) as $t
            }
        }
    };
}

macro_rules! float_element {
    ($t:ty, $dt:expr) => {
        impl Element for $t {
            const TYPE: DataType = $dt;
            const INTEGRAL: bool = false;
            fn to_i64(self) -> i64 {
                self as i64
            }
            fn to_f64(self) -> f64 {
                self as f64
            }
            fn from_i64(v: i64) -> Self {
                v as $t
            }
            fn from_f64(v: f64) -> Self {
                v as $t
            }
        }
    };
}

int_element!(i32, DataType::Int32);
int_element!(i64, DataType::Int64);
int_element!(u8, DataType::Char);
float_element!(f32, DataType::Float32);
float_element!(f64, DataType::Float64);

/// Convert one element between primitive types.
pub fn convert_element<T: Element, U: Element>(v: T) -> U {
    if T::INTEGRAL {
        U::from_i64(v.to_i64())
    } else {
        U::from_f64(v.to_f64())
    }
}

fn cast_all<T: Element, U: Element>(src: &[T]) -> Vec<U> {
    src.iter().map(|&v| convert_element(v)).collect()
}

// ── Data ──────────────────────────────────────────────────────────

/// An owned, typed element buffer.
///
/// Multi-dimensional payloads are flattened in column-major order (first
/// axis fastest), the order they have on disk.
#[derive(Clone, Debug, PartialEq)]
pub enum Data {
    /// `I4` elements.
    I4(Vec<i32>),
    /// `I8` elements.
    I8(Vec<i64>),
    /// `R4` elements.
    R4(Vec<f32>),
    /// `R8` elements.
    R8(Vec<f64>),
    /// `C1` elements.
    C1(Vec<u8>),
}

macro_rules! convert_from {
    ($v:expr, $to:expr) => {
        match $to {
            DataType::Empty => None,
            DataType::Int32 => Some(Data::I4(cast_all($v))),
            DataType::Int64 => Some(Data::I8(cast_all($v))),
            DataType::Float32 => Some(Data::R4(cast_all($v))),
            DataType::Float64 => Some(Data::R8(cast_all($v))),
            DataType::Char => Some(Data::C1(cast_all($v))),
        }
    };
}

impl Data {
    /// A zero-filled buffer of `len` elements. `None` for [`DataType::Empty`].
    pub fn zeros(dtype: DataType, len: usize) -> Option<Self> {
        match dtype {
            DataType::Empty => None,
            DataType::Int32 => Some(Data::I4(vec![0; len])),
            DataType::Int64 => Some(Data::I8(vec![0; len])),
            DataType::Float32 => Some(Data::R4(vec![0.0; len])),
            DataType::Float64 => Some(Data::R8(vec![0.0; len])),
            DataType::Char => Some(Data::C1(vec![0; len])),
        }
    }

    /// A `C1` buffer holding the bytes of `text`.
    pub fn text(text: &str) -> Self {
        Data::C1(text.as_bytes().to_vec())
    }

    /// A `C1` buffer holding `text` space-padded (or cut) to `width` bytes.
    pub fn padded_text(text: &str, width: usize) -> Self {
        let mut bytes: Vec<u8> = text.bytes().take(width).collect();
        bytes.resize(width, b' ');
        Data::C1(bytes)
    }

    /// Index data narrowed to `dtype` (`I4` or `I8`).
    ///
    /// Any other datatype is widened to `I8`.
    pub fn index(values: &[i64], dtype: DataType) -> Self {
        match dtype {
            DataType::Int32 => Data::I4(cast_all(values)),
            _ => Data::I8(values.to_vec()),
        }
    }

    /// The element type of this buffer.
    pub fn data_type(&self) -> DataType {
        match self {
            Data::I4(_) => DataType::Int32,
            Data::I8(_) => DataType::Int64,
            Data::R4(_) => DataType::Float32,
            Data::R8(_) => DataType::Float64,
            Data::C1(_) => DataType::Char,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Data::I4(v) => v.len(),
            Data::I8(v) => v.len(),
            Data::R4(v) => v.len(),
            Data::R8(v) => v.len(),
            Data::C1(v) => v.len(),
        }
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert every element to `to`. `None` when `to` is
    /// [`DataType::Empty`].
    pub fn convert(&self, to: DataType) -> Option<Data> {
        if self.data_type() == to {
            return Some(self.clone());
        }
        match self {
            Data::I4(v) => convert_from!(v, to),
            Data::I8(v) => convert_from!(v, to),
            Data::R4(v) => convert_from!(v, to),
            Data::R8(v) => convert_from!(v, to),
            Data::C1(v) => convert_from!(v, to),
        }
    }

    /// Integer contents widened to `i64`. `None` for real or character
    /// buffers.
    pub fn to_index_vec(&self) -> Option<Vec<i64>> {
        match self {
            Data::I4(v) => Some(v.iter().map(|&x| x as i64).collect()),
            Data::I8(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Contents converted to `f64`. `None` for character buffers.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            Data::C1(_) => None,
            Data::R8(v) => Some(v.clone()),
            other => match other.convert(DataType::Float64) {
                Some(Data::R8(v)) => Some(v),
                _ => None,
            },
        }
    }

    /// Character contents as text with trailing blanks and NULs removed.
    /// `None` for numeric buffers.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Data::C1(bytes) => Some(trim_text(bytes)),
            _ => None,
        }
    }

    /// Borrow `I4` contents.
    pub fn as_i32(&self) -> Option<&[i32]> {
        match self {
            Data::I4(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow `I8` contents.
    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            Data::I8(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow `R4` contents.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Data::R4(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow `R8` contents.
    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            Data::R8(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow `C1` contents.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Data::C1(v) => Some(v),
            _ => None,
        }
    }

    /// Copy element `src` of `from` into element `dst` of `self`,
    /// converting when the types differ.
    pub fn copy_element(&mut self, dst: usize, from: &Data, src: usize) {
        macro_rules! put {
            ($d:expr) => {
                match from {
                    Data::I4(s) => $d[dst] = convert_element(s[src]),
                    Data::I8(s) => $d[dst] = convert_element(s[src]),
                    Data::R4(s) => $d[dst] = convert_element(s[src]),
                    Data::R8(s) => $d[dst] = convert_element(s[src]),
                    Data::C1(s) => $d[dst] = convert_element(s[src]),
                }
            };
        }
        match self {
            Data::I4(d) => put!(d),
            Data::I8(d) => put!(d),
            Data::R4(d) => put!(d),
            Data::R8(d) => put!(d),
            Data::C1(d) => put!(d),
        }
    }
}

/// Strip trailing blanks and NUL padding from fixed-width character data.
pub fn trim_text(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |p| p + 1);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
