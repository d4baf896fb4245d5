//! Links at the cursor.
//!
//! A link created here exists only in the file until the next open: the
//! in-memory tree does not gain an entity for it, since its kind is only
//! known once the target is resolved.

use meshtree_core::{validate_name, Label, Link, TreeError};
use meshtree_store::NodeStore;
use tracing::debug;

use crate::session::{Parts, Session};

impl<S: NodeStore + ?Sized> Session<'_, S> {
    /// Create a link `name` under the cursor node pointing at `path` in
    /// `file` (empty for this file).
    ///
    /// # Errors
    ///
    /// [`TreeError::InsideLink`] when the cursor lies inside a link, and
    /// [`TreeError::DuplicateChild`] in write mode when `name` is taken. In
    /// modify mode an existing child of that name is replaced.
    pub fn link_write(&mut self, name: &str, file: &str, path: &str) -> Result<(), TreeError> {
        self.require_writable()?;
        validate_name(name)?;
        self.flush()?;
        let cursor = self.cursor.path();
        let Parts {
            resolved,
            mut writer,
            ..
        } = self.parts()?;
        if resolved.in_link {
            return Err(TreeError::InsideLink {
                name: resolved.entity.header().name.clone(),
            });
        }
        let parent = resolved
            .id
            .ok_or_else(|| TreeError::not_found(format!("stored node at {cursor}")))?;

        let existing = writer.store().child_by_name(parent, name)?;
        let label = match existing {
            Some(node) => Label::parse(&writer.store().label(node)?).unwrap_or(resolved.entity.label()),
            None => resolved.entity.label(),
        };
        writer.clear_name(parent, name, label)?;
        if existing.is_some() {
            resolved.entity.remove_child(name);
        }

        let target = Link::new(file, path);
        let id = writer.store().create_link(parent, name, &target)?;
        debug!(%parent, %id, name, target = %target, "linked");
        Ok(())
    }

    /// Whether the entity at the cursor is a link.
    pub fn is_link(&mut self) -> Result<bool, TreeError> {
        Ok(self.at()?.entity.header().link.is_some())
    }

    /// Target of the entity at the cursor, if it is a link.
    pub fn link_read(&mut self) -> Result<Option<Link>, TreeError> {
        Ok(self.at()?.entity.header().link.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SessionConfig;
    use crate::session::Session;
    use meshtree_core::{FileMode, Label, Link, TreeError, ZoneType};
    use meshtree_model::Selector;
    use meshtree_store::{BackendFlavor, MemoryStore, NodeStore};

    fn grid_file(store: &mut MemoryStore) {
        let mut s = Session::open(store, "grid.cgns", FileMode::Write, SessionConfig::default()).unwrap();
        s.base_write("Base", 3, 3).unwrap();
        s.zone_write(1, "Block", ZoneType::Structured, &[2, 2, 2, 1, 1, 1, 0, 0, 0]).unwrap();
        s.grid_write(1, 1, "GridCoordinates").unwrap();
        s.close().unwrap();
    }

    #[test]
    fn linked_zone_reads_through_and_is_isolated() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        grid_file(&mut store);

        let mut s = Session::open(&mut store, "case.cgns", FileMode::Write, SessionConfig::default()).unwrap();
        s.base_write("Base", 3, 3).unwrap();
        s.goto(1, &[]).unwrap();
        s.link_write("Block", "grid.cgns", "/Base/Block").unwrap();
        assert!(matches!(
            s.link_write("Block", "grid.cgns", "/Base/Block"),
            Err(TreeError::DuplicateChild { .. })
        ));
        s.close().unwrap();

        let mut s = Session::open(&mut store, "case.cgns", FileMode::Modify, SessionConfig::default()).unwrap();
        s.goto(1, &[(Label::Zone, Selector::Index(1))]).unwrap();
        assert!(s.is_link().unwrap());
        assert_eq!(s.link_read().unwrap(), Some(Link::new("grid.cgns", "/Base/Block")));
        assert_eq!(s.tree().bases[0].zones[0].sizes, [2, 2, 2, 1, 1, 1, 0, 0, 0]);

        assert!(matches!(s.descriptor_write("Note", "x"), Err(TreeError::InsideLink { .. })));
        assert_eq!(s.tree().bases[0].zones[0].coordinates.len(), 1);
        assert!(matches!(s.delete_node("GridCoordinates"), Err(TreeError::InsideLink { .. })));

        s.up().unwrap();
        s.delete_node("Block").unwrap();
        s.close().unwrap();

        let grid = store.open_file("grid.cgns", FileMode::Read).unwrap();
        assert_eq!(store.children_with_label(grid, "CGNSBase_t").unwrap().len(), 1);
        let base = store.child_by_name(grid, "Base").unwrap().unwrap();
        let block = store.child_by_name(base, "Block").unwrap().unwrap();
        assert!(store.child_by_name(block, "GridCoordinates").unwrap().is_some());
    }

    #[test]
    fn link_write_needs_a_writable_file() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        grid_file(&mut store);
        let mut s = Session::open(&mut store, "grid.cgns", FileMode::Read, SessionConfig::default()).unwrap();
        s.goto(1, &[]).unwrap();
        assert!(matches!(
            s.link_write("Other", "", "/Base/Block"),
            Err(TreeError::ModeViolation { .. })
        ));
        assert!(!s.is_link().unwrap());
    }
}
