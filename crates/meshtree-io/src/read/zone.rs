//! Zones, element sections and the field containers under a zone.

use meshtree_array::data_size;
use meshtree_core::{
    Data, DataType, ElementType, GridLocation, Label, NamedEnum, NodeId, PointSetType, TreeError,
    ZoneType,
};
use meshtree_model::{
    ArbitraryGridMotion, DataArray, DiscreteData, EntityKind, FlowSolution, GridCoordinates,
    Header, Meta, PointSet, RigidGridMotion, Section, Zone, ZoneContext, ZoneIterativeData,
    ZoneSubRegion,
};
use meshtree_store::NodeStore;
use smallvec::smallvec;
use tracing::warn;

use super::{Reader, Scope};
use crate::upgrade::{self, Rewrite, OFFSETS_IN, PARENT_SPLIT_IN};
use crate::validate::check_section;

const FIELD_SETS: [PointSetType; 2] = [PointSetType::PointRange, PointSetType::PointList];

/// The parts shared by flow solutions and discrete data.
struct FieldParts {
    header: Header,
    location: Option<GridLocation>,
    rind: Option<Vec<i32>>,
    ptset: Option<PointSet>,
    arrays: Vec<DataArray>,
    meta: Meta,
}

impl<S: NodeStore + ?Sized> Reader<'_, S> {
    pub(super) fn zone(&mut self, id: NodeId, base: &Scope) -> Result<Zone, TreeError> {
        let header = self.header(id, base.in_link)?;
        let dims = self.dims(id)?;
        let type_id = self.required(id, Label::ZoneType, Label::Zone, &header.name)?;
        let zone_type: ZoneType = self.enum_value(type_id, Label::ZoneType)?;
        let sizes = self.ints(id, Label::Zone)?;
        let index_dim = match dims.as_slice() {
            [n, 3] => *n,
            other => {
                return Err(TreeError::schema(
                    Label::Zone,
                    &header.name,
                    format!("sizes must be [IndexDimension, 3], found {other:?}"),
                ))
            }
        };
        let expected_dim = match zone_type {
            ZoneType::Structured => base.ctx.cell_dim.max(0) as usize,
            ZoneType::Unstructured => 1,
            ZoneType::UserDefined => index_dim,
            ZoneType::Null => {
                return Err(TreeError::schema(Label::Zone, &header.name, "zone type is Null"))
            }
        };
        if index_dim != expected_dim || sizes.len() != 3 * index_dim {
            return Err(TreeError::schema(
                Label::Zone,
                &header.name,
                format!(
                    "{zone_type} zone has index dimension {index_dim} and {} sizes, expected {expected_dim}",
                    sizes.len()
                ),
            ));
        }

        let mut zone = Zone {
            size_type: self.store.data_type(id)?,
            header,
            zone_type,
            sizes,
            ..Zone::default()
        };
        let scope = Scope {
            ctx: base.ctx.enter_zone(&zone),
            in_link: zone.header.in_link,
        };

        for c in self.children(id, Label::GridCoordinates)? {
            zone.coordinates.push(self.coordinates(c, &scope)?);
        }
        zone.family = self.opt_text(id, Label::FamilyName)?;
        zone.additional_families = self.additional_families(id, scope.in_link)?;
        for s in self.children(id, Label::Elements)? {
            let section = self.section(s, &scope)?;
            zone.sections.push(section);
        }
        for s in self.children(id, Label::FlowSolution)? {
            let p = self.field_parts(s, &scope, EntityKind::FlowSolution)?;
            zone.solutions.push(FlowSolution {
                header: p.header,
                location: p.location,
                rind: p.rind,
                ptset: p.ptset,
                arrays: p.arrays,
                meta: p.meta,
            });
        }
        for s in self.children(id, Label::DiscreteData)? {
            let p = self.field_parts(s, &scope, EntityKind::DiscreteData)?;
            zone.discrete.push(DiscreteData {
                header: p.header,
                location: p.location,
                rind: p.rind,
                ptset: p.ptset,
                arrays: p.arrays,
                meta: p.meta,
            });
        }
        zone.integrals = self.integrals(id, &scope)?;
        for c in self.children(id, Label::ZoneGridConnectivity)? {
            zone.connectivity.push(self.zone_connectivity(c, &scope)?);
        }
        zone.bc = self
            .single(id, Label::ZoneBC)?
            .map(|bc| self.zone_bc(bc, &scope))
            .transpose()?;
        zone.state = self.opt_state(id, &scope)?;
        for m in self.children(id, Label::RigidGridMotion)? {
            zone.rigid_motions.push(self.rigid_motion(m, &scope)?);
        }
        for m in self.children(id, Label::ArbitraryGridMotion)? {
            zone.arbitrary_motions.push(self.arbitrary_motion(m, &scope)?);
        }
        zone.iterative = self
            .single(id, Label::ZoneIterativeData)?
            .map(|it| {
                self.container(it, &scope, EntityKind::ZoneIterativeData, |header, arrays, meta| {
                    ZoneIterativeData {
                        header,
                        arrays,
                        meta,
                    }
                })
            })
            .transpose()?;
        zone.rotating = self.opt_rotating(id, &scope)?;
        zone.convergence = self.opt_convergence(id, &scope)?;
        zone.equations = self.opt_equations(id, &scope)?;
        zone.ordinal = self.opt_scalar(id, Label::Ordinal)?;
        for r in self.children(id, Label::ZoneSubRegion)? {
            zone.subregions.push(self.subregion(r, &scope)?);
        }
        zone.meta = self.meta(id, EntityKind::Zone, &scope, &[])?;
        Ok(zone)
    }

    /// Zone-derived extents at `location`; `None` when the location has no
    /// derivable size (user-defined locations from newer files).
    fn expected_extents(
        &self,
        zone: &ZoneContext,
        location: GridLocation,
        rind: Option<&[i32]>,
    ) -> Result<Option<Vec<usize>>, TreeError> {
        if location == GridLocation::UserDefined {
            return Ok(None);
        }
        let dims = data_size(zone.zone_type, location, &zone.vertex, &zone.cell, rind.unwrap_or(&[]))?;
        Ok(Some(dims.to_vec()))
    }

    fn coordinates(&self, id: NodeId, scope: &Scope) -> Result<GridCoordinates, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let zone = inner.ctx.require_zone("coordinates")?;
        let rind = self.rind(id, &inner)?;
        let arrays = self.arrays(id, &inner, &[])?;
        if let Some(expected) = self.expected_extents(zone, GridLocation::Vertex, rind.as_deref())? {
            self.check_extents(&arrays, &expected, Label::GridCoordinates, &header.name)?;
        }
        Ok(GridCoordinates {
            rind,
            arrays,
            meta: self.meta(id, EntityKind::GridCoordinates, &inner, &[])?,
            header,
        })
    }

    fn field_parts(&self, id: NodeId, scope: &Scope, kind: EntityKind) -> Result<FieldParts, TreeError> {
        let label = kind.label();
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let zone = inner.ctx.require_zone(label.as_str())?;
        let location = self.location(id, &inner)?;
        let rind = self.rind(id, &inner)?;
        let ptset = self.ptset_among(id, &FIELD_SETS, &inner)?;
        let arrays = self.arrays(id, &inner, &[])?;
        let expected = match &ptset {
            Some(set) => {
                if rind.is_some() {
                    return Err(TreeError::schema(
                        label,
                        &header.name,
                        "rind planes and a point set are exclusive",
                    ));
                }
                Some(vec![set.size_of_patch])
            }
            None => self.expected_extents(
                zone,
                location.unwrap_or(GridLocation::Vertex),
                rind.as_deref(),
            )?,
        };
        if let Some(expected) = expected {
            self.check_extents(&arrays, &expected, label, &header.name)?;
        }
        Ok(FieldParts {
            meta: self.meta(id, kind, &inner, &[])?,
            header,
            location,
            rind,
            ptset,
            arrays,
        })
    }

    fn rigid_motion(&self, id: NodeId, scope: &Scope) -> Result<RigidGridMotion, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let type_id = self.required(id, Label::RigidGridMotionType, Label::RigidGridMotion, &header.name)?;
        Ok(RigidGridMotion {
            motion_type: self.enum_value(type_id, Label::RigidGridMotionType)?,
            arrays: self.arrays(id, &inner, &[])?,
            meta: self.meta(id, EntityKind::RigidGridMotion, &inner, &[])?,
            header,
        })
    }

    fn arbitrary_motion(&self, id: NodeId, scope: &Scope) -> Result<ArbitraryGridMotion, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let zone = inner.ctx.require_zone("grid motion")?;
        let type_id = self.required(
            id,
            Label::ArbitraryGridMotionType,
            Label::ArbitraryGridMotion,
            &header.name,
        )?;
        let location = self.location(id, &inner)?;
        let rind = self.rind(id, &inner)?;
        let arrays = self.arrays(id, &inner, &[])?;
        if let Some(expected) = self.expected_extents(
            zone,
            location.unwrap_or(GridLocation::Vertex),
            rind.as_deref(),
        )? {
            self.check_extents(&arrays, &expected, Label::ArbitraryGridMotion, &header.name)?;
        }
        Ok(ArbitraryGridMotion {
            motion_type: self.enum_value(type_id, Label::ArbitraryGridMotionType)?,
            location,
            rind,
            arrays,
            meta: self.meta(id, EntityKind::ArbitraryGridMotion, &inner, &[])?,
            header,
        })
    }

    fn subregion(&self, id: NodeId, scope: &Scope) -> Result<ZoneSubRegion, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let reserved = [ZoneSubRegion::BC_REGION_NODE, ZoneSubRegion::GC_REGION_NODE];
        let region = ZoneSubRegion {
            region_dim: self.scalar(id, Label::ZoneSubRegion)?,
            location: self.location(id, &inner)?,
            rind: self.rind(id, &inner)?,
            ptset: self.ptset_among(id, &FIELD_SETS, &inner)?,
            bc_region: self.opt_descriptor(id, ZoneSubRegion::BC_REGION_NODE, inner.in_link)?,
            gc_region: self.opt_descriptor(id, ZoneSubRegion::GC_REGION_NODE, inner.in_link)?,
            family: self.opt_text(id, Label::FamilyName)?,
            additional_families: self.additional_families(id, inner.in_link)?,
            arrays: self.arrays(id, &inner, &[])?,
            meta: self.meta(id, EntityKind::ZoneSubRegion, &inner, &reserved)?,
            header,
        };
        if region.extent_sources() != 1 {
            return Err(TreeError::schema(
                Label::ZoneSubRegion,
                &region.header.name,
                format!(
                    "needs exactly one of a point set, {} or {}, has {}",
                    ZoneSubRegion::BC_REGION_NODE,
                    ZoneSubRegion::GC_REGION_NODE,
                    region.extent_sources()
                ),
            ));
        }
        if let Some(set) = &region.ptset {
            self.check_extents(&region.arrays, &[set.size_of_patch], Label::ZoneSubRegion, &region.header.name)?;
        }
        Ok(region)
    }

    // ── Sections ───────────────────────────────────────────────────

    fn section(&mut self, id: NodeId, scope: &Scope) -> Result<Section, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let name = header.name.clone();
        let bad = |detail: String| TreeError::schema(Label::Elements, &name, detail);

        let payload = self.ints(id, Label::Elements)?;
        let (stored, boundary) = match payload.as_slice() {
            [t, b] => (*t as i32, *b as i32),
            _ => return Err(bad(format!("expected [ElementType, boundary], found {} values", payload.len()))),
        };
        let code = ElementType::current_code(stored, self.version);
        let element_type = match ElementType::from_code(code) {
            Some(t) => t,
            None if self.version.is_newer_than_library() => {
                warn!(section = %name, code, version = %self.version, "unknown element code from a newer file");
                ElementType::UserDefined
            }
            None => return Err(bad(format!("unknown element code {stored}"))),
        };

        let range_id = self
            .named(id, Label::IndexRange, Section::RANGE_NODE)?
            .ok_or_else(|| bad(format!("missing {}", Section::RANGE_NODE)))?;
        let (start, end) = match self.ints(range_id, Label::IndexRange)?.as_slice() {
            [s, e] if e >= s => (*s, *e),
            other => return Err(bad(format!("invalid {} {other:?}", Section::RANGE_NODE))),
        };
        let count = (end - start + 1) as usize;

        let in_link = inner.in_link;
        let mut section = Section {
            element_type,
            boundary,
            range: [start, end],
            connectivity: self
                .named_array(id, Section::CONNECTIVITY_NODE, in_link)?
                .ok_or_else(|| bad(format!("missing {}", Section::CONNECTIVITY_NODE)))?,
            offsets: self.named_array(id, Section::OFFSET_NODE, in_link)?,
            parent_elements: self.named_array(id, Section::PARENT_ELEMENTS_NODE, in_link)?,
            parent_positions: self.named_array(id, Section::PARENT_POSITIONS_NODE, in_link)?,
            rind: self.rind(id, &inner)?,
            meta: self.meta(id, EntityKind::Section, &inner, &[])?,
            header,
        };
        let legacy_parent = self.named_array(id, Section::LEGACY_PARENT_NODE, in_link)?;

        let mut rewrites = Vec::new();
        if code != stored {
            warn!(section = %name, stored, code, version = %self.version, "renumbered legacy element type");
            rewrites.push(Rewrite::Replace {
                node: id,
                dims: smallvec![2],
                data: Data::I4(vec![code, boundary]),
            });
        }
        self.upgrade_connectivity(&mut section, count, &mut rewrites)
            .map_err(&bad)?;
        self.upgrade_parents(&mut section, legacy_parent, id, count, &mut rewrites)
            .map_err(&bad)?;
        check_section(&section, count).map_err(&bad)?;

        if !in_link {
            self.rewrites.extend(rewrites);
        }
        Ok(section)
    }

    fn upgrade_connectivity(
        &self,
        section: &mut Section,
        count: usize,
        rewrites: &mut Vec<Rewrite>,
    ) -> Result<(), String> {
        let element_type = section.element_type;
        if !element_type.is_variable() {
            return Ok(());
        }
        let conn_array = &mut section.connectivity;
        let dtype = conn_array.data_type;
        let Some(mut conn) = conn_array.index_values() else {
            return Ok(());
        };
        let mut conn_changed = false;

        if element_type == ElementType::Mixed && ElementType::legacy_numbering(self.version) {
            let renumbered = upgrade::remap_mixed_codes(&mut conn, self.version)?;
            if renumbered > 0 {
                warn!(section = %section.header.name, renumbered, "renumbered inline element codes");
                conn_changed = true;
            }
        }

        if section.offsets.is_none() && self.version < OFFSETS_IN {
            let offsets = if element_type.is_polyhedral() {
                let (offsets, stripped) = upgrade::split_counted(&conn, count)?;
                conn = stripped;
                conn_changed = true;
                offsets
            } else {
                upgrade::mixed_offsets(&conn, count)?
            };
            warn!(
                section = %section.header.name,
                version = %self.version,
                "synthesized {} for legacy {element_type} section",
                Section::OFFSET_NODE
            );
            let data = Data::index(&offsets, dtype);
            if let Some(parent) = section.header.id {
                rewrites.push(Rewrite::Create {
                    parent,
                    name: Section::OFFSET_NODE,
                    dims: smallvec![offsets.len()],
                    data: data.clone(),
                });
            }
            section.offsets = Some(synthesized(DataArray::vector(Section::OFFSET_NODE, data)));
        }

        if conn_changed {
            let data = Data::index(&conn, dtype);
            let conn_array = &mut section.connectivity;
            conn_array.dims = smallvec![conn.len()];
            if let Some(node) = conn_array.header.id {
                rewrites.push(Rewrite::Replace {
                    node,
                    dims: conn_array.dims.clone(),
                    data: data.clone(),
                });
            }
            conn_array.data = Some(data);
        }
        Ok(())
    }

    fn upgrade_parents(
        &self,
        section: &mut Section,
        legacy: Option<DataArray>,
        section_id: NodeId,
        count: usize,
        rewrites: &mut Vec<Rewrite>,
    ) -> Result<(), String> {
        let Some(legacy) = legacy else {
            return Ok(());
        };
        if section.parent_elements.is_some() || self.version >= PARENT_SPLIT_IN {
            warn!(
                section = %section.header.name,
                version = %self.version,
                "ignoring legacy {} node",
                Section::LEGACY_PARENT_NODE
            );
            return Ok(());
        }
        if legacy.dims.as_slice() != [count, 4] {
            return Err(format!(
                "{} has extents {:?}, expected [{count}, 4]",
                Section::LEGACY_PARENT_NODE,
                legacy.dims.as_slice()
            ));
        }
        let values = legacy.index_values().unwrap_or_default();
        let (elements, positions) = upgrade::split_parent_data(&values, count)?;
        warn!(
            section = %section.header.name,
            version = %self.version,
            "split legacy {} into {} and {}",
            Section::LEGACY_PARENT_NODE,
            Section::PARENT_ELEMENTS_NODE,
            Section::PARENT_POSITIONS_NODE
        );
        let dtype = match legacy.data_type {
            DataType::Int64 => DataType::Int64,
            _ => DataType::Int32,
        };
        let dims = upgrade::parent_dims(count);
        for (name, values) in [
            (Section::PARENT_ELEMENTS_NODE, &elements),
            (Section::PARENT_POSITIONS_NODE, &positions),
        ] {
            rewrites.push(Rewrite::Create {
                parent: section_id,
                name,
                dims: dims.clone(),
                data: Data::index(values, dtype),
            });
        }
        if let Some(node) = legacy.header.id {
            rewrites.push(Rewrite::Remove { node });
        }
        section.parent_elements = Some(synthesized(DataArray::new(
            Section::PARENT_ELEMENTS_NODE,
            &dims,
            Data::index(&elements, dtype),
        )));
        section.parent_positions = Some(synthesized(DataArray::new(
            Section::PARENT_POSITIONS_NODE,
            &dims,
            Data::index(&positions, dtype),
        )));
        Ok(())
    }
}

/// Mark an array built from a legacy layout so the writer leaves it alone.
fn synthesized(mut array: DataArray) -> DataArray {
    array.header.upgraded = true;
    array
}
