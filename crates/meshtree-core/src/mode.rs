//! File open modes.

use std::fmt;

/// How a file is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// Read only.
    Read,
    /// Create (or truncate) and write.
    Write,
    /// Read, then modify in place.
    Modify,
}

impl FileMode {
    /// Whether the mode permits any mutation.
    pub fn is_writable(self) -> bool {
        !matches!(self, FileMode::Read)
    }

    /// Lower-case mode name.
    pub fn as_str(self) -> &'static str {
        match self {
            FileMode::Read => "read",
            FileMode::Write => "write",
            FileMode::Modify => "modify",
        }
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
