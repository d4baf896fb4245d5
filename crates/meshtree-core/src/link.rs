//! Cross-file node references.

use std::fmt;

/// A symbolic reference to a node, possibly in another file.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Link {
    /// Target file name; empty for a link within the same file.
    pub file: String,
    /// Absolute in-file path of the target node (`/Base/Zone/...`).
    pub path: String,
}

impl Link {
    /// A link to `path` in `file`.
    pub fn new(file: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            path: path.into(),
        }
    }

    /// Whether the target lives in the same file as the link.
    pub fn is_local(&self) -> bool {
        self.file.is_empty()
    }

    /// Path components of the target, skipping empty segments.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|c| !c.is_empty())
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_local() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}:{}", self.file, self.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_skip_empty_segments() {
        let link = Link::new("grid.cgns", "/Base//Zone/");
        assert_eq!(link.components().collect::<Vec<_>>(), ["Base", "Zone"]);
        assert_eq!(link.to_string(), "grid.cgns:/Base//Zone/");
        assert!(Link::new("", "/B").is_local());
    }
}
