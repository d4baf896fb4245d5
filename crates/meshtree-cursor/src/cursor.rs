//! The frame stack and its navigation operations.

use meshtree_core::{Label, NodeId, TreeError, MAX_CURSOR_DEPTH};
use meshtree_model::{schema, EntityKind, EntityMut, File, Selector, TraversalContext};
use tracing::debug;

/// One step of the cursor path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Kind of the entity reached.
    pub kind: EntityKind,
    /// Label the step was taken with.
    pub label: Label,
    /// 1-based position among siblings of that label when the step was
    /// taken.
    pub index: usize,
    /// Entity name; later resolution selects by this.
    pub name: String,
    /// Store handle at the time of the step.
    pub id: Option<NodeId>,
}

/// The entity at the top of the cursor and the context around it.
#[derive(Debug)]
pub struct Resolved<'t> {
    /// The current entity.
    pub entity: EntityMut<'t>,
    /// Dimensions in force at the current entity.
    pub ctx: TraversalContext,
    /// Whether the entity or any ancestor is a link.
    pub in_link: bool,
    /// Store handle of the current entity.
    pub id: Option<NodeId>,
}

/// A bounded stack of navigation frames.
///
/// The bottom frame is always a base. An empty cursor has not been set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    frames: Vec<Frame>,
}

impl Cursor {
    /// An unset cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cursor has been set to a base.
    pub fn is_set(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Number of frames, base included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The frames, base first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// The current frame.
    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Forget the current position.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// The current path as `/Base/Zone/...`.
    pub fn path(&self) -> String {
        let mut path = String::new();
        for frame in &self.frames {
            path.push('/');
            path.push_str(&frame.name);
        }
        path
    }

    /// Reset to a single frame at the `base`-th (1-based) base.
    pub fn set(&mut self, file: &File, base: usize) -> Result<(), TreeError> {
        let found = base
            .checked_sub(1)
            .and_then(|i| file.bases.get(i))
            .ok_or_else(|| TreeError::not_found(format!("{} #{base}", Label::Base)))?;
        self.frames = vec![Frame {
            kind: EntityKind::Base,
            label: Label::Base,
            index: base,
            name: found.header.name.clone(),
            id: found.header.id,
        }];
        debug!(base = %found.header.name, "cursor set");
        Ok(())
    }

    /// Reset to a single frame at the base named `name`.
    pub fn set_named(&mut self, file: &File, name: &str) -> Result<(), TreeError> {
        let index = file
            .bases
            .iter()
            .position(|b| b.header.name == name)
            .ok_or_else(|| TreeError::not_found(format!("{} '{name}'", Label::Base)))?;
        self.set(file, index + 1)
    }

    /// Push a frame for the child labelled `label` selected by `sel`.
    ///
    /// Fails with [`TreeError::IncorrectPath`] when the current kind has no
    /// such relation and [`TreeError::NotFound`] when no instance matches.
    /// On failure the cursor is unchanged.
    pub fn advance(
        &mut self,
        file: &mut File,
        label: Label,
        sel: &Selector,
    ) -> Result<(), TreeError> {
        if self.frames.len() >= MAX_CURSOR_DEPTH {
            return Err(TreeError::DepthExceeded {
                limit: MAX_CURSOR_DEPTH,
            });
        }
        let current = self.resolve(file)?;
        let parent_kind = current.entity.kind();
        let child = current.entity.child(label, sel)?;
        let header = child.header();
        let frame = Frame {
            kind: child.kind(),
            label,
            index: match sel {
                Selector::Index(i) => *i,
                Selector::Name(_) => 0,
            },
            name: header.name.clone(),
            id: header.id,
        };
        debug!(from = ?parent_kind, %label, name = %frame.name, "cursor advance");
        self.frames.push(frame);
        Ok(())
    }

    /// Pop one frame. Fails at the base frame.
    pub fn up(&mut self) -> Result<(), TreeError> {
        match self.frames.len() {
            0 => Err(TreeError::NoCursor),
            1 => Err(TreeError::IncorrectPath {
                from: Label::Base,
                requested: "..".to_owned(),
            }),
            _ => {
                self.frames.pop();
                Ok(())
            }
        }
    }

    /// Follow a `/`-separated path of node names.
    ///
    /// An absolute path starts at a base name; a relative one starts at the
    /// current frame. `.` stays put and `..` goes up. On failure the cursor
    /// is unchanged.
    pub fn goto_path(&mut self, file: &mut File, path: &str) -> Result<(), TreeError> {
        let saved = self.frames.clone();
        let result = self.follow(file, path);
        if result.is_err() {
            self.frames = saved;
        }
        result
    }

    fn follow(&mut self, file: &mut File, path: &str) -> Result<(), TreeError> {
        let mut parts = path.split('/').filter(|p| !p.is_empty());
        if path.starts_with('/') {
            let base = parts
                .next()
                .ok_or_else(|| TreeError::not_found("empty path"))?;
            self.set_named(file, base)?;
        } else if !self.is_set() {
            return Err(TreeError::NoCursor);
        }
        for part in parts {
            match part {
                "." => {}
                ".." => self.up()?,
                name => self.advance_by_name(file, name)?,
            }
        }
        Ok(())
    }

    /// Step to the child named `name`, whatever its label.
    fn advance_by_name(&mut self, file: &mut File, name: &str) -> Result<(), TreeError> {
        let kind = self.resolve(file)?.entity.kind();
        let sel = Selector::Name(name.to_owned());
        let candidates = schema::relations(kind)
            .iter()
            .map(|r| r.label)
            .filter(|&l| EntityKind::from_label(l).is_some());
        for label in candidates {
            match self.advance(file, label, &sel) {
                Ok(()) => return Ok(()),
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        Err(TreeError::not_found(format!("'{name}' under {}", self.path())))
    }

    /// Walk the frames over `file` and return the current entity.
    pub fn resolve<'t>(&self, file: &'t mut File) -> Result<Resolved<'t>, TreeError> {
        let (first, rest) = self.frames.split_first().ok_or(TreeError::NoCursor)?;
        let base = file
            .bases
            .iter_mut()
            .find(|b| b.header.name == first.name)
            .ok_or_else(|| TreeError::not_found(format!("{} '{}'", Label::Base, first.name)))?;
        let mut ctx = TraversalContext::of_base(base);
        let mut in_link = base.header.link.is_some() || base.header.in_link;
        let mut entity = EntityMut::Base(base);
        for frame in rest {
            entity = entity.child(frame.label, &Selector::Name(frame.name.clone()))?;
            if let EntityMut::Zone(zone) = &entity {
                ctx = ctx.enter_zone(zone);
            }
            let header = entity.header();
            in_link |= header.link.is_some() || header.in_link;
        }
        let id = entity.header().id;
        Ok(Resolved {
            entity,
            ctx,
            in_link,
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshtree_core::{ElementType, Link};
    use meshtree_model::{Base, Section, Zone};

    fn tree() -> File {
        let mut file = File::new("t.cgns");
        let mut base = Base::new("Base", 3, 3);
        let mut zone = Zone::unstructured("Tets", 4, 1, 0);
        for (i, name) in ["Body", "Skin"].iter().enumerate() {
            let e = i as i64 + 1;
            zone.sections.push(Section::new(
                *name,
                ElementType::Tri3,
                e,
                e,
                &[1, 2, 3],
                None,
            ));
        }
        base.zones.push(zone);
        file.bases.push(base);
        file
    }

    #[test]
    fn set_rejects_missing_base() {
        let file = tree();
        let mut cursor = Cursor::new();
        assert!(cursor.set(&file, 2).unwrap_err().is_not_found());
        assert!(!cursor.is_set());
        cursor.set(&file, 1).unwrap();
        assert_eq!(cursor.path(), "/Base");
    }

    #[test]
    fn advance_up_returns_to_root() {
        let mut file = tree();
        let mut cursor = Cursor::new();
        cursor.set(&file, 1).unwrap();
        let root = cursor.clone();
        cursor.advance(&mut file, Label::Zone, &1.into()).unwrap();
        cursor.advance(&mut file, Label::Elements, &2.into()).unwrap();
        assert_eq!(cursor.path(), "/Base/Tets/Skin");
        cursor.up().unwrap();
        cursor.up().unwrap();
        assert_eq!(cursor, root);
        assert!(cursor.up().is_err());
    }

    #[test]
    fn failed_advance_leaves_cursor_unchanged() {
        let mut file = tree();
        let mut cursor = Cursor::new();
        cursor.set(&file, 1).unwrap();
        let err = cursor
            .advance(&mut file, Label::Elements, &1.into())
            .unwrap_err();
        assert!(matches!(err, TreeError::IncorrectPath { .. }));
        assert_eq!(cursor.depth(), 1);
    }

    #[test]
    fn paths_absolute_and_relative() {
        let mut file = tree();
        let mut cursor = Cursor::new();
        cursor.goto_path(&mut file, "/Base/Tets/Body").unwrap();
        assert_eq!(cursor.depth(), 3);
        cursor.goto_path(&mut file, "../Skin").unwrap();
        assert_eq!(cursor.path(), "/Base/Tets/Skin");
        cursor.goto_path(&mut file, "./../..").unwrap();
        assert_eq!(cursor.path(), "/Base");
        assert!(cursor.goto_path(&mut file, "Tets/Nope").is_err());
        assert_eq!(cursor.path(), "/Base");
    }

    #[test]
    fn resolve_tracks_zone_and_links() {
        let mut file = tree();
        file.bases[0].zones[0].header.link = Some(Link::new("other.cgns", "/Base/Tets"));
        let mut cursor = Cursor::new();
        cursor.goto_path(&mut file, "/Base/Tets/Body").unwrap();
        let resolved = cursor.resolve(&mut file).unwrap();
        assert!(resolved.in_link);
        assert_eq!(resolved.ctx.index_dim(), 1);
        assert_eq!(resolved.entity.kind(), EntityKind::Section);
    }

    #[test]
    fn depth_is_bounded() {
        let mut file = File::new("deep.cgns");
        let mut base = Base::new("Base", 3, 3);
        let mut nested = meshtree_model::UserDefinedData::new("U");
        for _ in 0..MAX_CURSOR_DEPTH + 2 {
            let mut outer = meshtree_model::UserDefinedData::new("U");
            outer.meta.user_data.push(nested);
            nested = outer;
        }
        base.meta.user_data.push(nested);
        file.bases.push(base);
        let mut cursor = Cursor::new();
        cursor.set(&file, 1).unwrap();
        let mut last = Ok(());
        for _ in 0..MAX_CURSOR_DEPTH + 1 {
            last = cursor.advance(&mut file, Label::UserDefinedData, &1.into());
            if last.is_err() {
                break;
            }
        }
        assert_eq!(
            last,
            Err(TreeError::DepthExceeded {
                limit: MAX_CURSOR_DEPTH
            })
        );
        assert_eq!(cursor.depth(), MAX_CURSOR_DEPTH);
    }
}
