//! Element types of mesh sections.

use crate::enums::NamedEnum;
use crate::version::FileVersion;

macro_rules! element_types {
    ($( $variant:ident = $code:expr, $npe:expr => $text:expr, )*) => {
        /// Element type of a section.
        ///
        /// Fixed-size types carry their node count; `MIXED`, `NGON_n` and
        /// `NFACE_n` are variable-length and need a start-offset array.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
        pub enum ElementType {
            /// Unset.
            #[default]
            Null,
            /// User-defined element.
            UserDefined,
            $( #[doc = concat!("`", $text, "`")] $variant, )*
        }

        impl NamedEnum for ElementType {
            const ALL: &'static [Self] =
                &[ElementType::Null, ElementType::UserDefined, $( ElementType::$variant, )*];
            const USER_DEFINED: Self = ElementType::UserDefined;
            const TYPE_NAME: &'static str = "ElementType";

            fn name(self) -> &'static str {
                match self {
                    ElementType::Null => "ElementTypeNull",
                    ElementType::UserDefined => "ElementTypeUserDefined",
                    $( ElementType::$variant => $text, )*
                }
            }

            fn code(self) -> i32 {
                match self {
                    ElementType::Null => 0,
                    ElementType::UserDefined => 1,
                    $( ElementType::$variant => $code, )*
                }
            }
        }

        impl ElementType {
            /// Nodes per element, or 0 for variable-length and unset types.
            pub fn nodes_per_element(self) -> usize {
                match self {
                    ElementType::Null | ElementType::UserDefined => 0,
                    $( ElementType::$variant => $npe, )*
                }
            }
        }
    };
}

element_types! {
    Node = 2, 1 => "NODE",
    Bar2 = 3, 2 => "BAR_2",
    Bar3 = 4, 3 => "BAR_3",
    Tri3 = 5, 3 => "TRI_3",
    Tri6 = 6, 6 => "TRI_6",
    Quad4 = 7, 4 => "QUAD_4",
    Quad8 = 8, 8 => "QUAD_8",
    Quad9 = 9, 9 => "QUAD_9",
    Tetra4 = 10, 4 => "TETRA_4",
    Tetra10 = 11, 10 => "TETRA_10",
    Pyra5 = 12, 5 => "PYRA_5",
    Pyra14 = 13, 14 => "PYRA_14",
    Penta6 = 14, 6 => "PENTA_6",
    Penta15 = 15, 15 => "PENTA_15",
    Penta18 = 16, 18 => "PENTA_18",
    Hexa8 = 17, 8 => "HEXA_8",
    Hexa20 = 18, 20 => "HEXA_20",
    Hexa27 = 19, 27 => "HEXA_27",
    Mixed = 20, 0 => "MIXED",
    Pyra13 = 21, 13 => "PYRA_13",
    NGon = 22, 0 => "NGON_n",
    NFace = 23, 0 => "NFACE_n",
    Bar4 = 24, 4 => "BAR_4",
    Tri9 = 25, 9 => "TRI_9",
    Tri10 = 26, 10 => "TRI_10",
    Quad12 = 27, 12 => "QUAD_12",
    Quad16 = 28, 16 => "QUAD_16",
    Tetra16 = 29, 16 => "TETRA_16",
    Tetra20 = 30, 20 => "TETRA_20",
    Pyra21 = 31, 21 => "PYRA_21",
    Pyra29 = 32, 29 => "PYRA_29",
    Pyra30 = 33, 30 => "PYRA_30",
    Penta24 = 34, 24 => "PENTA_24",
    Penta38 = 35, 38 => "PENTA_38",
    Penta40 = 36, 40 => "PENTA_40",
    Hexa32 = 37, 32 => "HEXA_32",
    Hexa56 = 38, 56 => "HEXA_56",
    Hexa64 = 39, 64 => "HEXA_64",
    Bar5 = 40, 5 => "BAR_5",
    Tri12 = 41, 12 => "TRI_12",
    Tri15 = 42, 15 => "TRI_15",
    QuadP416 = 43, 16 => "QUAD_P4_16",
    Quad25 = 44, 25 => "QUAD_25",
    Tetra22 = 45, 22 => "TETRA_22",
    Tetra34 = 46, 34 => "TETRA_34",
    Tetra35 = 47, 35 => "TETRA_35",
    PyraP429 = 48, 29 => "PYRA_P4_29",
    Pyra50 = 49, 50 => "PYRA_50",
    Pyra55 = 50, 55 => "PYRA_55",
    Penta33 = 51, 33 => "PENTA_33",
    Penta66 = 52, 66 => "PENTA_66",
    Penta75 = 53, 75 => "PENTA_75",
    Hexa44 = 54, 44 => "HEXA_44",
    Hexa98 = 55, 98 => "HEXA_98",
    Hexa125 = 56, 125 => "HEXA_125",}

/// First revision using the current element numbering (`PYRA_13` = 21).
const RENUMBERED_IN: FileVersion = FileVersion(3100);

impl ElementType {
    /// Whether elements of this type have a variable node count.
    pub fn is_variable(self) -> bool {
        matches!(self, ElementType::Mixed | ElementType::NGon | ElementType::NFace)
    }

    /// Whether elements of this type are polyhedral (`NGON_n`/`NFACE_n`).
    pub fn is_polyhedral(self) -> bool {
        matches!(self, ElementType::NGon | ElementType::NFace)
    }

    /// Translate a stored element code written by a file of `version`
    /// into the current numbering.
    ///
    /// Before the renumbering, `NGON_n` was 21 and `NFACE_n` 22; every code
    /// from 21 upward moved up by one when `PYRA_13` took slot 21.
    pub fn current_code(stored: i32, version: FileVersion) -> i32 {
        if version < RENUMBERED_IN && stored >= 21 {
            stored + 1
        } else {
            stored
        }
    }

    /// Decode a stored element code written by a file of `version`.
    pub fn from_stored_code(stored: i32, version: FileVersion) -> Option<Self> {
        Self::from_code(Self::current_code(stored, version))
    }

    /// Whether a file of `version` stores element codes in the legacy
    /// numbering.
    pub fn legacy_numbering(version: FileVersion) -> bool {
        version < RENUMBERED_IN
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_counts_follow_names() {
        assert_eq!(ElementType::Node.nodes_per_element(), 1);
        assert_eq!(ElementType::Hexa8.nodes_per_element(), 8);
        assert_eq!(ElementType::QuadP416.nodes_per_element(), 16);
        assert_eq!(ElementType::Hexa125.nodes_per_element(), 125);
        assert_eq!(ElementType::Mixed.nodes_per_element(), 0);
        assert_eq!(ElementType::NGon.nodes_per_element(), 0);
    }

    #[test]
    fn codes_cover_the_table() {
        assert_eq!(ElementType::ALL.len(), 57);
        assert_eq!(ElementType::from_code(22), Some(ElementType::NGon));
        assert_eq!(ElementType::from_code(56), Some(ElementType::Hexa125));
        assert_eq!(ElementType::parse("TETRA_10"), Some(ElementType::Tetra10));
    }

    #[test]
    fn legacy_codes_shift_past_pyra13() {
        let old = FileVersion(3000);
        assert_eq!(ElementType::from_stored_code(21, old), Some(ElementType::NGon));
        assert_eq!(ElementType::from_stored_code(22, old), Some(ElementType::NFace));
        assert_eq!(ElementType::from_stored_code(20, old), Some(ElementType::Mixed));
        assert_eq!(ElementType::from_stored_code(21, FileVersion(3100)), Some(ElementType::Pyra13));
    }
}
