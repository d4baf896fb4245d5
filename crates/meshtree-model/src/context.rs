//! Per-traversal context: the dimensions in force while one file or zone
//! is being read, written or navigated.
//!
//! This is never stored in entities. Each traversal builds it from the
//! base and zone it passes through and hands it down explicitly.

use meshtree_core::{Label, TreeError, ZoneType};

use crate::base::Base;
use crate::zone::Zone;

/// Sizing of the zone a traversal is inside.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ZoneContext {
    /// Zone name, for diagnostics.
    pub name: String,
    /// Structured or unstructured.
    pub zone_type: ZoneType,
    /// Vertex counts per index axis.
    pub vertex: Vec<i64>,
    /// Cell counts per index axis.
    pub cell: Vec<i64>,
}

impl ZoneContext {
    /// Context of `zone`.
    pub fn of(zone: &Zone) -> Self {
        Self {
            name: zone.header.name.clone(),
            zone_type: zone.zone_type,
            vertex: zone.vertex_size().to_vec(),
            cell: zone.cell_size().to_vec(),
        }
    }

    /// Index dimension.
    pub fn index_dim(&self) -> usize {
        self.vertex.len()
    }
}

/// Dimensions in force during one traversal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraversalContext {
    /// Cell dimension of the current base.
    pub cell_dim: i32,
    /// Physical dimension of the current base.
    pub phys_dim: i32,
    /// The zone being traversed, once inside one.
    pub zone: Option<ZoneContext>,
}

impl TraversalContext {
    /// Context at `base`, outside any zone.
    pub fn of_base(base: &Base) -> Self {
        Self {
            cell_dim: base.cell_dim,
            phys_dim: base.phys_dim,
            zone: None,
        }
    }

    /// This context narrowed to `zone`.
    pub fn enter_zone(&self, zone: &Zone) -> Self {
        Self {
            zone: Some(ZoneContext::of(zone)),
            ..self.clone()
        }
    }

    /// Index dimension: the zone's, or the cell dimension outside a zone.
    pub fn index_dim(&self) -> usize {
        match &self.zone {
            Some(z) => z.index_dim(),
            None => self.cell_dim.max(0) as usize,
        }
    }

    /// The current zone, or an error naming what needed it.
    pub fn require_zone(&self, what: &str) -> Result<&ZoneContext, TreeError> {
        self.zone.as_ref().ok_or_else(|| TreeError::IncorrectPath {
            from: Label::Base,
            requested: format!("{what} outside a zone"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_dim_follows_zone() {
        let base = Base::new("Base", 3, 3);
        let ctx = TraversalContext::of_base(&base);
        assert_eq!(ctx.index_dim(), 3);
        let zone = Zone::unstructured("U", 10, 4, 0);
        let inner = ctx.enter_zone(&zone);
        assert_eq!(inner.index_dim(), 1);
        assert_eq!(inner.zone.as_ref().map(|z| z.cell.clone()), Some(vec![4]));
        assert!(ctx.require_zone("coordinates").is_err());
    }
}
