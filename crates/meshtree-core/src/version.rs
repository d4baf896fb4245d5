//! File-format revisions.

use std::fmt;

/// A file-format revision as an integer (`4.5` is `4500`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileVersion(pub i32);

/// The revision this library writes.
pub const LIBRARY_VERSION: FileVersion = FileVersion(4500);

impl FileVersion {
    /// Decode the `R4` value stored in the library-version node.
    pub fn from_stored(value: f32) -> Self {
        FileVersion((1000.0 * value as f64 + 0.5).floor() as i32)
    }

    /// The `R4` value stored in the library-version node.
    pub fn to_stored(self) -> f32 {
        self.0 as f32 / 1000.0
    }

    /// Whether this revision is newer than the library, in which case
    /// unknown enumeration names are tolerated.
    pub fn is_newer_than_library(self) -> bool {
        self > LIBRARY_VERSION
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 1000, (self.0 % 1000) / 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_value_rounds() {
        assert_eq!(FileVersion::from_stored(4.5), FileVersion(4500));
        assert_eq!(FileVersion::from_stored(3.21), FileVersion(3210));
        assert_eq!(FileVersion::from_stored(LIBRARY_VERSION.to_stored()), LIBRARY_VERSION);
    }

    #[test]
    fn display() {
        assert_eq!(LIBRARY_VERSION.to_string(), "4.50");
        assert_eq!(FileVersion(3100).to_string(), "3.10");
    }
}
