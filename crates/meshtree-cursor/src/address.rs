//! Generic addressing of one feature slot of the current entity.
//!
//! A slot is either a singleton (`Option<T>`) or a collection (`Vec<T>`).
//! Reading an absent feature is [`TreeError::NotFound`]. Writing
//! allocates a placeholder when absent; when present, a file opened for
//! writing reports [`TreeError::DuplicateChild`] and a file opened for
//! modification resets the feature and reports it as replaced so the
//! caller can drop the stored node.

use meshtree_core::{FileMode, Label, TreeError};
use meshtree_model::{pick, Named, Selector};
use tracing::debug;

/// What the caller intends to do with the addressed feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Inspect an existing feature.
    Read,
    /// Create or overwrite the feature.
    Write,
}

/// Session state addressing depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressCtx {
    /// Mode the file is open in.
    pub mode: FileMode,
    /// Whether the current entity lies inside a link.
    pub in_link: bool,
}

/// An addressed feature.
#[derive(Debug)]
pub struct Addressed<'a, T> {
    /// The feature, freshly allocated or reset when written.
    pub item: &'a mut T,
    /// Whether a previously existing feature was reset.
    pub replaced: bool,
}

fn check_write(ctx: &AddressCtx, name: &str) -> Result<(), TreeError> {
    if !ctx.mode.is_writable() {
        return Err(TreeError::ModeViolation {
            required: "write or modify",
            actual: ctx.mode.as_str(),
        });
    }
    if ctx.in_link {
        return Err(TreeError::InsideLink {
            name: name.to_owned(),
        });
    }
    Ok(())
}

/// Address a singleton feature stored under `label` as `name`.
pub fn address_single<'a, T: Default>(
    slot: &'a mut Option<T>,
    access: Access,
    ctx: &AddressCtx,
    label: Label,
    name: &str,
) -> Result<Addressed<'a, T>, TreeError> {
    if access == Access::Read {
        return slot
            .as_mut()
            .map(|item| Addressed {
                item,
                replaced: false,
            })
            .ok_or_else(|| TreeError::not_found(format!("{label} '{name}'")));
    }
    check_write(ctx, name)?;
    let replaced = slot.is_some();
    if replaced {
        if ctx.mode == FileMode::Write {
            return Err(TreeError::DuplicateChild {
                label,
                name: name.to_owned(),
            });
        }
        debug!(%label, name, "overwriting feature");
    }
    let item = slot.insert(T::default());
    Ok(Addressed { item, replaced })
}

/// Address one element of a collection feature stored under `label`.
///
/// Writing requires a name selector; the new element carries that name.
pub fn address_multiple<'a, T: Named + Default>(
    items: &'a mut Vec<T>,
    access: Access,
    ctx: &AddressCtx,
    label: Label,
    sel: &Selector,
) -> Result<Addressed<'a, T>, TreeError> {
    if access == Access::Read {
        return pick(items, sel)
            .map(|item| Addressed {
                item,
                replaced: false,
            })
            .ok_or_else(|| TreeError::not_found(format!("{label} {sel}")));
    }
    let name = match sel {
        Selector::Name(n) => n.as_str(),
        Selector::Index(_) => {
            return Err(TreeError::not_found(format!(
                "{label} {sel}: writing requires a name"
            )))
        }
    };
    check_write(ctx, name)?;
    let position = items.iter().position(|t| t.name() == name);
    let replaced = position.is_some();
    let index = match position {
        Some(_) if ctx.mode == FileMode::Write => {
            return Err(TreeError::DuplicateChild {
                label,
                name: name.to_owned(),
            })
        }
        Some(i) => {
            debug!(%label, name, "overwriting feature");
            items[i] = T::default();
            i
        }
        None => {
            items.push(T::default());
            items.len() - 1
        }
    };
    let item = &mut items[index];
    item.header_mut().name = name.to_owned();
    Ok(Addressed { item, replaced })
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshtree_model::{DataArray, Descriptor};

    const WRITE: AddressCtx = AddressCtx {
        mode: FileMode::Write,
        in_link: false,
    };
    const MODIFY: AddressCtx = AddressCtx {
        mode: FileMode::Modify,
        in_link: false,
    };

    #[test]
    fn read_of_absent_singleton_is_not_found() {
        let mut slot: Option<Vec<i32>> = None;
        let err = address_single(&mut slot, Access::Read, &WRITE, Label::Rind, "Rind").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn second_write_depends_on_mode() {
        let mut slot: Option<Vec<i32>> = None;
        let first = address_single(&mut slot, Access::Write, &WRITE, Label::Rind, "Rind").unwrap();
        assert!(!first.replaced);
        *first.item = vec![1, 1];
        let err = address_single(&mut slot, Access::Write, &WRITE, Label::Rind, "Rind").unwrap_err();
        assert!(matches!(err, TreeError::DuplicateChild { .. }));
        let again = address_single(&mut slot, Access::Write, &MODIFY, Label::Rind, "Rind").unwrap();
        assert!(again.replaced);
        assert!(again.item.is_empty());
    }

    #[test]
    fn writes_inside_links_and_read_only_files_are_refused() {
        let mut slot: Option<Descriptor> = None;
        let linked = AddressCtx {
            mode: FileMode::Modify,
            in_link: true,
        };
        let err = address_single(&mut slot, Access::Write, &linked, Label::Descriptor, "D").unwrap_err();
        assert!(matches!(err, TreeError::InsideLink { .. }));
        let read = AddressCtx {
            mode: FileMode::Read,
            in_link: false,
        };
        let err = address_single(&mut slot, Access::Write, &read, Label::Descriptor, "D").unwrap_err();
        assert!(matches!(err, TreeError::ModeViolation { .. }));
    }

    #[test]
    fn multiple_write_names_and_replaces() {
        let mut arrays: Vec<DataArray> = Vec::new();
        let sel = Selector::Name("Density".into());
        let a = address_multiple(&mut arrays, Access::Write, &MODIFY, Label::DataArray, &sel).unwrap();
        assert_eq!(a.item.header.name, "Density");
        assert!(!a.replaced);
        let b = address_multiple(&mut arrays, Access::Write, &MODIFY, Label::DataArray, &sel).unwrap();
        assert!(b.replaced);
        assert_eq!(arrays.len(), 1);
        let read = address_multiple(&mut arrays, Access::Read, &MODIFY, Label::DataArray, &1.into());
        assert!(read.is_ok());
        assert!(
            address_multiple(&mut arrays, Access::Write, &MODIFY, Label::DataArray, &1.into())
                .is_err()
        );
    }
}
