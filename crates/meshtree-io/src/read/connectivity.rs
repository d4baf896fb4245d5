//! Zone-to-zone connectivity.

use meshtree_core::{Label, NodeId, PointSetType, TreeError};
use meshtree_model::{
    AverageInterface, EntityKind, GridConnectivity, GridConnectivity1to1,
    GridConnectivityProperty, OversetHoles, Periodic, PointSet, ZoneGridConnectivity,
};
use meshtree_store::NodeStore;

use super::{Reader, Scope};

const RECEIVER_SETS: [PointSetType; 2] = [PointSetType::PointRange, PointSetType::PointList];

const DONOR_SETS: [PointSetType; 3] = [
    PointSetType::PointListDonor,
    PointSetType::CellListDonor,
    PointSetType::PointRangeDonor,
];

impl<S: NodeStore + ?Sized> Reader<'_, S> {
    pub(super) fn zone_connectivity(
        &self,
        id: NodeId,
        scope: &Scope,
    ) -> Result<ZoneGridConnectivity, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let mut zgc = ZoneGridConnectivity::default();
        for c in self.children(id, Label::GridConnectivity1to1)? {
            zgc.one_to_one.push(self.one_to_one(c, &inner)?);
        }
        for c in self.children(id, Label::GridConnectivity)? {
            zgc.general.push(self.general(c, &inner)?);
        }
        for c in self.children(id, Label::OversetHoles)? {
            zgc.holes.push(self.holes(c, &inner)?);
        }
        zgc.meta = self.meta(id, EntityKind::ZoneGridConnectivity, &inner, &[])?;
        zgc.header = header;
        Ok(zgc)
    }

    fn one_to_one(&self, id: NodeId, scope: &Scope) -> Result<GridConnectivity1to1, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let index_dim = inner.index_dim();
        let missing = |what: PointSetType| {
            TreeError::schema(
                Label::GridConnectivity1to1,
                &header.name,
                format!("missing {what}"),
            )
        };
        let range = self
            .ptset_among(id, &[PointSetType::PointRange], &inner)?
            .ok_or_else(|| missing(PointSetType::PointRange))?;
        let donor_range = self
            .ptset_among(id, &[PointSetType::PointRangeDonor], &inner)?
            .ok_or_else(|| missing(PointSetType::PointRangeDonor))?;
        let transform = self
            .opt_named_ints(id, Label::IntIndexDimension, GridConnectivity1to1::TRANSFORM_NODE)?
            .unwrap_or_else(|| (1..=index_dim as i32).collect());
        let gc = GridConnectivity1to1 {
            donor: self.text(id, Label::GridConnectivity1to1)?,
            transform,
            range,
            donor_range,
            property: self
                .single(id, Label::GridConnectivityProperty)?
                .map(|p| self.gc_property(p, &inner))
                .transpose()?,
            ordinal: self.opt_scalar(id, Label::Ordinal)?,
            meta: self.meta(id, EntityKind::GridConnectivity1to1, &inner, &[])?,
            header,
        };
        let bad = |detail: String| {
            TreeError::schema(Label::GridConnectivity1to1, &gc.header.name, detail)
        };
        if gc.transform.len() != index_dim || !gc.transform_is_valid() {
            return Err(bad(format!(
                "invalid {} {:?} for index dimension {index_dim}",
                GridConnectivity1to1::TRANSFORM_NODE,
                gc.transform
            )));
        }
        for set in [&gc.range, &gc.donor_range] {
            if set.index_dim != index_dim {
                return Err(bad(format!(
                    "{} has index dimension {}, expected {index_dim}",
                    set.kind, set.index_dim
                )));
            }
        }
        Ok(gc)
    }

    fn general(&self, id: NodeId, scope: &Scope) -> Result<GridConnectivity, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        Ok(GridConnectivity {
            donor: self.text(id, Label::GridConnectivity)?,
            connectivity_type: self.opt_enum(id, Label::GridConnectivityType)?,
            location: self.location(id, &inner)?,
            ptset: self.ptset_among(id, &RECEIVER_SETS, &inner)?,
            donor_ptset: self.ptset_among(id, &DONOR_SETS, &inner)?,
            interpolants: self.arrays(id, &inner, &[])?,
            property: self
                .single(id, Label::GridConnectivityProperty)?
                .map(|p| self.gc_property(p, &inner))
                .transpose()?,
            ordinal: self.opt_scalar(id, Label::Ordinal)?,
            meta: self.meta(id, EntityKind::GridConnectivity, &inner, &[])?,
            header,
        })
    }

    fn gc_property(&self, id: NodeId, scope: &Scope) -> Result<GridConnectivityProperty, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let periodic = self
            .single(id, Label::Periodic)?
            .map(|p| {
                self.container(p, &inner, EntityKind::Periodic, |header, arrays, meta| Periodic {
                    header,
                    arrays,
                    meta,
                })
            })
            .transpose()?;
        let average = match self.single(id, Label::AverageInterface)? {
            None => None,
            Some(a) => {
                let avg_header = self.header(a, inner.in_link)?;
                let avg_scope = inner.below(&avg_header);
                let type_id = self.required(
                    a,
                    Label::AverageInterfaceType,
                    Label::AverageInterface,
                    &avg_header.name,
                )?;
                Some(AverageInterface {
                    interface_type: self.enum_value(type_id, Label::AverageInterfaceType)?,
                    meta: self.meta(a, EntityKind::AverageInterface, &avg_scope, &[])?,
                    header: avg_header,
                })
            }
        };
        Ok(GridConnectivityProperty {
            periodic,
            average,
            meta: self.meta(id, EntityKind::GridConnectivityProperty, &inner, &[])?,
            header,
        })
    }

    /// Overset holes keep their point sets under arbitrary names.
    fn holes(&self, id: NodeId, scope: &Scope) -> Result<OversetHoles, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let mut ptsets: Vec<PointSet> = Vec::new();
        for (label, kind) in [
            (Label::IndexRange, PointSetType::PointRange),
            (Label::IndexArray, PointSetType::PointList),
        ] {
            for set in self.children(id, label)? {
                ptsets.push(self.ptset(set, kind, inner.in_link)?);
            }
        }
        Ok(OversetHoles {
            location: self.location(id, &inner)?,
            ptsets,
            meta: self.meta(id, EntityKind::OversetHoles, &inner, &[])?,
            header,
        })
    }
}
