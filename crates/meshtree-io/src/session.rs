//! The per-open-file session.
//!
//! A [`Session`] owns everything that is only valid while one file is open:
//! the store root, the open mode, the in-memory tree read at open time and
//! the navigation cursor. Nothing is shared between sessions; two files
//! open at once are two independent sessions over the same store.
//!
//! # Lifecycle
//!
//! [`open`](Session::open) validates the configuration, opens the file and
//! reads it (applying version upgrades). In modify mode the upgrades are
//! written back right away when the configuration allows it.
//! [`close`](Session::close) flushes entities added since the last flush,
//! stamps the library version on an upgraded file and closes it.

use meshtree_array::read_full;
use meshtree_core::{
    Data, DataType, FileMode, FileVersion, Label, NodeId, TreeError, LIBRARY_VERSION,
};
use meshtree_cursor::{AddressCtx, Cursor, Resolved};
use meshtree_model::{File, Header, Selector};
use meshtree_store::NodeStore;
use tracing::{debug, instrument, warn};

use crate::config::SessionConfig;
use crate::read::Reader;
use crate::write::Writer;

/// One open file.
pub struct Session<'s, S: NodeStore + ?Sized> {
    pub(crate) store: &'s mut S,
    pub(crate) config: SessionConfig,
    pub(crate) mode: FileMode,
    pub(crate) root: NodeId,
    pub(crate) tree: File,
    pub(crate) cursor: Cursor,
    upgrades_pending: bool,
}

impl<S: NodeStore + ?Sized> std::fmt::Debug for Session<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("file", &self.tree.header.name)
            .field("mode", &self.mode)
            .field("version", &self.tree.version)
            .field("cursor", &self.cursor.path())
            .finish_non_exhaustive()
    }
}

impl<'s, S: NodeStore + ?Sized> Session<'s, S> {
    // ── Lifecycle ──────────────────────────────────────────────────

    /// Open `name` in `mode` and read it.
    ///
    /// # Errors
    ///
    /// [`TreeError::Config`] for an invalid configuration, a store error
    /// when the file cannot be opened, and any read error of the tree.
    #[instrument(skip(store, config), fields(version = tracing::field::Empty))]
    pub fn open(
        store: &'s mut S,
        name: &str,
        mode: FileMode,
        config: SessionConfig,
    ) -> Result<Self, TreeError> {
        config.validate()?;
        store.set_link_depth_limit(config.link_depth_limit);
        let root = store.open_file(name, mode)?;

        let mut session = Self {
            store,
            config,
            mode,
            root,
            tree: File::new(name),
            cursor: Cursor::new(),
            upgrades_pending: false,
        };
        session.tree.header.id = Some(root);

        if mode == FileMode::Write {
            session.stamp_version()?;
            tracing::Span::current().record("version", tracing::field::display(LIBRARY_VERSION));
            return Ok(session);
        }

        let version = session.stored_version(name)?;
        tracing::Span::current().record("version", tracing::field::display(version));
        let mut reader = Reader::new(&*session.store, version);
        let tree = reader.file(root, name)?;
        let rewrites = reader.into_rewrites();
        session.tree = tree;

        if mode == FileMode::Modify && !rewrites.is_empty() {
            if session.config.rewrite_upgrades {
                for rewrite in &rewrites {
                    rewrite.apply(&mut *session.store)?;
                }
                session.stamp_version()?;
                debug!(count = rewrites.len(), "wrote upgraded nodes back");
                session.tree = Reader::new(&*session.store, LIBRARY_VERSION).file(root, name)?;
            } else {
                warn!(count = rewrites.len(), %version, "upgrades applied in memory only");
                session.upgrades_pending = true;
            }
        }
        Ok(session)
    }

    /// Flush, stamp the version of an older file opened for modification,
    /// and close the file.
    ///
    /// The version is left alone while upgrades applied at open time are
    /// still missing from the file.
    ///
    /// The file is closed even when flushing fails; the first error is
    /// returned.
    #[instrument(skip(self), fields(file = %self.tree.header.name))]
    pub fn close(mut self) -> Result<(), TreeError> {
        let finished = self.finish();
        if let Err(err) = &finished {
            warn!(error = %err, "closing after a failed flush");
        }
        let closed = self.store.close_file(self.root).map_err(TreeError::from);
        finished.and(closed)
    }

    fn finish(&mut self) -> Result<(), TreeError> {
        if self.mode.is_writable() {
            self.flush()?;
        }
        if self.mode == FileMode::Modify && self.tree.version < LIBRARY_VERSION {
            if self.upgrades_pending {
                warn!(version = %self.tree.version, "file keeps its old version; upgrades were not written");
            } else {
                self.stamp_version()?;
            }
        }
        Ok(())
    }

    /// Persist every entity added to the tree since it was read or last
    /// flushed.
    #[instrument(skip(self), fields(file = %self.tree.header.name))]
    pub fn flush(&mut self) -> Result<(), TreeError> {
        self.require_writable()?;
        Writer::new(&mut *self.store, self.mode, self.root).file(&mut self.tree)
    }

    fn stored_version(&self, name: &str) -> Result<FileVersion, TreeError> {
        let id = self
            .store
            .children_with_label(self.root, Label::LibraryVersion.as_str())?
            .into_iter()
            .next()
            .ok_or_else(|| TreeError::schema(Label::LibraryVersion, name, "missing library version node"))?;
        match read_full(&*self.store, id, DataType::Float32)? {
            Some(Data::R4(v)) if v.len() == 1 => Ok(FileVersion::from_stored(v[0])),
            other => Err(TreeError::schema(
                Label::LibraryVersion,
                name,
                format!("expected one R4 value, found {:?}", other.map(|d| d.len())),
            )),
        }
    }

    fn stamp_version(&mut self) -> Result<(), TreeError> {
        let data = Data::R4(vec![LIBRARY_VERSION.to_stored()]);
        Writer::new(&mut *self.store, self.mode, self.root).put_node(
            self.root,
            File::VERSION_NODE,
            Label::LibraryVersion,
            DataType::Float32,
            &[1],
            Some(&data),
        )?;
        debug!(from = %self.tree.version, to = %LIBRARY_VERSION, "stamped library version");
        self.tree.version = LIBRARY_VERSION;
        Ok(())
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// The in-memory tree.
    pub fn tree(&self) -> &File {
        &self.tree
    }

    /// The in-memory tree, mutably.
    ///
    /// Entities added here (with no store handle) are persisted by the
    /// next [`flush`](Self::flush). Scalar fields edited on entities that
    /// are already persisted are not; use the feature setters for those.
    pub fn tree_mut(&mut self) -> &mut File {
        &mut self.tree
    }

    /// Mode the file is open in.
    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// Revision of the file as read (the library revision once stamped).
    pub fn version(&self) -> FileVersion {
        self.tree.version
    }

    /// The configuration in force.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Store handle of the file root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &*self.store
    }

    pub(crate) fn require_writable(&self) -> Result<(), TreeError> {
        if self.mode.is_writable() {
            Ok(())
        } else {
            Err(TreeError::ModeViolation {
                required: "write or modify",
                actual: self.mode.as_str(),
            })
        }
    }

    // ── Cursor ─────────────────────────────────────────────────────

    /// The cursor.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Reset the cursor to the `base`-th (1-based) base.
    pub fn set_cursor(&mut self, base: usize) -> Result<(), TreeError> {
        self.cursor.set(&self.tree, base)
    }

    /// Go to the `base`-th base, then take each `(label, selector)` step.
    /// On failure the cursor is unchanged.
    pub fn goto(&mut self, base: usize, steps: &[(Label, Selector)]) -> Result<(), TreeError> {
        let mut cursor = Cursor::new();
        cursor.set(&self.tree, base)?;
        for (label, sel) in steps {
            cursor.advance(&mut self.tree, *label, sel)?;
        }
        self.cursor = cursor;
        Ok(())
    }

    /// Take one step down from the current position.
    pub fn advance(&mut self, label: Label, sel: Selector) -> Result<(), TreeError> {
        self.cursor.advance(&mut self.tree, label, &sel)
    }

    /// Follow a `/`-separated path, absolute (from a base name) or relative
    /// to the cursor, with `.` and `..` components.
    pub fn gopath(&mut self, path: &str) -> Result<(), TreeError> {
        self.cursor.goto_path(&mut self.tree, path)
    }

    /// Go up one level.
    pub fn up(&mut self) -> Result<(), TreeError> {
        self.cursor.up()
    }

    /// The current path.
    pub fn where_am_i(&self) -> String {
        self.cursor.path()
    }

    /// The entity at the cursor.
    pub(crate) fn at(&mut self) -> Result<Resolved<'_>, TreeError> {
        self.cursor.resolve(&mut self.tree)
    }

    /// The entity at the cursor together with a writer and the addressing
    /// context, borrowed from disjoint parts of the session.
    pub(crate) fn parts(&mut self) -> Result<Parts<'_, S>, TreeError> {
        let resolved = self.cursor.resolve(&mut self.tree)?;
        let ctx = AddressCtx {
            mode: self.mode,
            in_link: resolved.in_link,
        };
        Ok(Parts {
            resolved,
            ctx,
            writer: Writer::new(&mut *self.store, self.mode, self.root),
        })
    }

    // ── Structure ──────────────────────────────────────────────────

    /// Delete the child `name` of the cursor entity from the tree and the
    /// file.
    ///
    /// Refused when the cursor entity is, or lies inside, a link. A child
    /// that is itself a link is deletable: only the link node goes.
    pub fn delete_node(&mut self, name: &str) -> Result<(), TreeError> {
        self.require_writable()?;
        let path = self.cursor.path();
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
        let parent = resolved.id;
        let removed = resolved.entity.remove_child(name);
        let stored = match parent {
            Some(p) => writer.store().child_by_name(p, name)?,
            None => None,
        };
        if let Some(node) = stored {
            writer.store().delete_node(node)?;
            debug!(%node, name, "deleted node");
        }
        if !removed && stored.is_none() {
            return Err(TreeError::not_found(format!("'{name}' under {path}")));
        }
        Ok(())
    }
}

/// Disjoint borrows of a session: the cursor entity, the addressing
/// context and a writer over the store.
pub(crate) struct Parts<'a, S: NodeStore + ?Sized> {
    pub resolved: Resolved<'a>,
    pub ctx: AddressCtx,
    pub writer: Writer<'a, S>,
}

/// Addressing context of an entity outside the cursor.
pub(crate) fn ctx_of(mode: FileMode, header: &Header) -> AddressCtx {
    AddressCtx {
        mode,
        in_link: header.in_link || header.link.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshtree_core::ZoneType;
    use meshtree_model::{Base, Zone};
    use meshtree_store::{BackendFlavor, MemoryStore};

    fn store() -> MemoryStore {
        MemoryStore::new(BackendFlavor::Modern)
    }

    #[test]
    fn write_mode_records_library_version() {
        let mut store = store();
        let session = Session::open(&mut store, "v.cgns", FileMode::Write, SessionConfig::default()).unwrap();
        assert_eq!(session.version(), LIBRARY_VERSION);
        session.close().unwrap();
        let root = store.root_of("v.cgns").unwrap();
        let node = store.child_by_name(root, File::VERSION_NODE).unwrap().unwrap();
        assert_eq!(store.label(node).unwrap(), "CGNSLibraryVersion_t");
        assert_eq!(store.read_all(node, DataType::Float32).unwrap(), Some(Data::R4(vec![4.5])));
    }

    #[test]
    fn failed_close_still_releases_the_file() {
        let mut store = store();
        let mut s = Session::open(&mut store, "f.cgns", FileMode::Write, SessionConfig::default()).unwrap();
        let mut base = Base::new("Base", 3, 3);
        let mut zone = Zone::structured("Block", &[3, 3, 2]);
        zone.sizes.truncate(5);
        base.zones.push(zone);
        s.tree_mut().bases.push(base);
        assert!(matches!(
            s.close(),
            Err(TreeError::SchemaViolation { label: Label::Zone, .. })
        ));

        let s = Session::open(&mut store, "f.cgns", FileMode::Read, SessionConfig::default()).unwrap();
        assert!(s.tree().bases.is_empty());
        s.close().unwrap();
    }

    #[test]
    fn invalid_config_is_rejected_before_opening() {
        let mut store = store();
        let config = SessionConfig {
            link_depth_limit: 0,
            ..SessionConfig::default()
        };
        let err = Session::open(&mut store, "c.cgns", FileMode::Write, config).unwrap_err();
        assert!(matches!(err, TreeError::Config(_)));
        assert_eq!(store.file_names().count(), 0);
    }

    #[test]
    fn missing_version_node_is_a_schema_violation() {
        let mut store = store();
        let root = store.open_file("bare.cgns", FileMode::Write).unwrap();
        store.close_file(root).unwrap();
        let err = Session::open(&mut store, "bare.cgns", FileMode::Read, SessionConfig::default()).unwrap_err();
        assert!(matches!(err, TreeError::SchemaViolation { label: Label::LibraryVersion, .. }));
    }

    #[test]
    fn read_mode_refuses_flush() {
        let mut store = store();
        Session::open(&mut store, "r.cgns", FileMode::Write, SessionConfig::default())
            .unwrap()
            .close()
            .unwrap();
        let mut session = Session::open(&mut store, "r.cgns", FileMode::Read, SessionConfig::default()).unwrap();
        assert!(matches!(session.flush(), Err(TreeError::ModeViolation { .. })));
    }

    #[test]
    fn failed_goto_keeps_the_cursor() {
        let mut store = store();
        let mut session = Session::open(&mut store, "g.cgns", FileMode::Write, SessionConfig::default()).unwrap();
        session.base_write("Base", 3, 3).unwrap();
        session.zone_write(1, "Block", ZoneType::Structured, &[3, 3, 3, 2, 2, 2, 0, 0, 0]).unwrap();
        session.goto(1, &[(Label::Zone, Selector::Index(1))]).unwrap();
        let err = session.goto(1, &[(Label::Zone, Selector::Index(2))]).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(session.where_am_i(), "/Base/Block");
    }

    #[test]
    fn delete_node_removes_from_tree_and_file() {
        let mut store = store();
        let mut session = Session::open(&mut store, "d.cgns", FileMode::Write, SessionConfig::default()).unwrap();
        session.base_write("Base", 3, 3).unwrap();
        session.zone_write(1, "Block", ZoneType::Structured, &[3, 3, 3, 2, 2, 2, 0, 0, 0]).unwrap();
        let zone_id = session.tree().bases[0].zones[0].header.id.unwrap();
        session.set_cursor(1).unwrap();
        session.delete_node("Block").unwrap();
        assert!(session.tree().bases[0].zones.is_empty());
        assert!(session.store().name(zone_id).is_err());
        assert!(session.delete_node("Block").unwrap_err().is_not_found());
    }
}
