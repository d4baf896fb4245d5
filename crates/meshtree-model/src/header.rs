//! Identity shared by every entity record.

use meshtree_core::{DataClass, Link, NodeId};

use crate::feature::{Descriptor, DimensionalUnits};
use crate::user_data::UserDefinedData;

/// Name, store handle and link state of an entity.
///
/// Equality compares only the name and the link: handles are store
/// artifacts, and `in_link` and `upgraded` describe how the entity was
/// read rather than what it is.
#[derive(Clone, Debug, Default)]
pub struct Header {
    /// Node name (at most 32 bytes, no `/`).
    pub name: String,
    /// Store handle, `None` until the entity is persisted.
    pub id: Option<NodeId>,
    /// Target of the entity when it is a link.
    pub link: Option<Link>,
    /// Whether the entity or any ancestor is a link.
    pub in_link: bool,
    /// Whether the entity was synthesized in memory from a legacy layout
    /// that the file still holds. Such entities are never written.
    pub upgraded: bool,
}

impl Header {
    /// A header for a new, unpersisted entity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A header for a new entity that is a link to `target`.
    pub fn linked(name: impl Into<String>, target: Link) -> Self {
        Self {
            name: name.into(),
            link: Some(target),
            ..Self::default()
        }
    }

    /// Whether the entity has a store handle.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.link == other.link
    }
}

/// Access to an entity's [`Header`].
pub trait Named {
    /// The entity's header.
    fn header(&self) -> &Header;

    /// The entity's header, mutably.
    fn header_mut(&mut self) -> &mut Header;

    /// The entity's node name.
    fn name(&self) -> &str {
        &self.header().name
    }
}

macro_rules! impl_named {
    ($($t:ty),* $(,)?) => {
        $(
            impl $crate::header::Named for $t {
                fn header(&self) -> &$crate::header::Header {
                    &self.header
                }
                fn header_mut(&mut self) -> &mut $crate::header::Header {
                    &mut self.header
                }
            }
        )*
    };
}

pub(crate) use impl_named;

/// Annotations most entities may carry: descriptors, a data class,
/// dimensional units and user-defined data.
///
/// Which of these a kind admits is decided by the relation table; fields
/// a kind does not admit stay empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Meta {
    /// Free text descriptors.
    pub descriptors: Vec<Descriptor>,
    /// Data class.
    pub data_class: Option<DataClass>,
    /// Dimensional units.
    pub units: Option<DimensionalUnits>,
    /// User-defined data.
    pub user_data: Vec<UserDefinedData>,
}

impl Meta {
    /// Whether nothing is set.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
            && self.data_class.is_none()
            && self.units.is_none()
            && self.user_data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_handle_and_in_link() {
        let mut a = Header::new("Zone");
        let b = Header::new("Zone");
        a.id = Some(NodeId(4));
        a.in_link = true;
        assert_eq!(a, b);
        assert_ne!(a, Header::linked("Zone", Link::new("f", "/B/Z")));
    }
}
