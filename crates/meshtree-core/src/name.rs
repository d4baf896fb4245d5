//! Node name validation.

use crate::error::TreeError;

/// Maximum length of a node name in bytes.
pub const MAX_NAME_LEN: usize = 32;

/// Check that `name` is a legal node name.
///
/// Names are 1 to 32 bytes, contain no `/`, and are not `.` or `..`
/// (those are cursor path components).
pub fn validate_name(name: &str) -> Result<(), TreeError> {
    let reason = if name.trim().is_empty() {
        "name is empty"
    } else if name.len() > MAX_NAME_LEN {
        "name exceeds 32 characters"
    } else if name.contains('/') {
        "name contains '/'"
    } else if name == "." || name == ".." {
        "name is a path component"
    } else {
        return Ok(());
    };
    Err(TreeError::InvalidName {
        name: name.to_owned(),
        reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        assert!(validate_name("Zone 1").is_ok());
        assert!(validate_name(&"x".repeat(32)).is_ok());
    }

    #[test]
    fn rejects_bad_names() {
        for bad in ["", "  ", "a/b", ".", "..", &"x".repeat(33)] {
            assert!(
                matches!(validate_name(bad), Err(TreeError::InvalidName { .. })),
                "{bad:?}"
            );
        }
    }
}
