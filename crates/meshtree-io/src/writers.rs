//! Convenience writers addressed by 1-based base/zone/... positions.
//!
//! Each writer builds one entity, checks it against the shape rules,
//! inserts it into the in-memory tree with the usual multiplicity rules
//! and persists it at once when its parent is already in the file.
//! Writers that create a collection element return its 1-based position.

use meshtree_array::check_location;
use meshtree_core::{
    validate_name, ArbitraryGridMotionType, BCType, Data, ElementType, FileMode,
    GridConnectivityType, GridLocation, Label, NodeId, PointSetType, RigidGridMotionType,
    SimulationType, TreeError, ZoneType,
};
use meshtree_cursor::{address_multiple, address_single, Access, AddressCtx};
use meshtree_model::{
    ArbitraryGridMotion, Base, BaseIterativeData, BCDataSet, DataArray, Descriptor, DiscreteData,
    Family, FamilyBC, FlowSolution, GeometryReference, GridConnectivity, GridConnectivity1to1,
    GridCoordinates, Header, Named, OversetHoles, PointSet, RigidGridMotion, Section, Selector,
    Zone, ZoneBC, ZoneGridConnectivity, ZoneIterativeData, ZoneSubRegion, BC,
};
use meshtree_store::NodeStore;

use crate::config::IndexWidth;
use crate::features::build_ptset;
use crate::session::{ctx_of, Session};
use crate::validate::{check_base_dims, check_section, check_zone};
use crate::write::Writer;

/// The `n`-th (1-based) element of `items`.
pub(crate) fn nth<T>(items: &mut [T], n: usize, label: Label) -> Result<&mut T, TreeError> {
    n.checked_sub(1)
        .and_then(move |i| items.get_mut(i))
        .ok_or_else(|| TreeError::not_found(format!("{label} #{n}")))
}

/// Insert `item` under its own name; returns its 1-based position.
pub(crate) fn insert<T: Named + Default>(
    items: &mut Vec<T>,
    item: T,
    label: Label,
    ctx: &AddressCtx,
) -> Result<usize, TreeError> {
    validate_name(item.name())?;
    let name = item.name().to_owned();
    let position = items
        .iter()
        .position(|t| t.name() == name)
        .unwrap_or(items.len());
    let addressed = address_multiple(items, Access::Write, ctx, label, &Selector::Name(name))?;
    *addressed.item = item;
    Ok(position + 1)
}

/// A point set of `kind` checked against `dim` and stored at `width`.
fn point_set(
    kind: PointSetType,
    dim: usize,
    points: &[i64],
    width: IndexWidth,
    owner: (Label, &str),
) -> Result<PointSet, TreeError> {
    let mut set = build_ptset(kind, dim, points).map_err(|d| TreeError::schema(owner.0, owner.1, d))?;
    set.data_type = width.data_type(points);
    Ok(set)
}

fn index_dim_for(kind: PointSetType, zone: &Zone) -> usize {
    match kind {
        PointSetType::ElementRange | PointSetType::ElementList => 1,
        _ => zone.index_dim(),
    }
}

fn base_mut(tree: &mut meshtree_model::File, base: usize) -> Result<&mut Base, TreeError> {
    nth(&mut tree.bases, base, Label::Base)
}

pub(crate) fn zone_mut(tree: &mut meshtree_model::File, base: usize, zone: usize) -> Result<(Option<NodeId>, &mut Zone), TreeError> {
    let b = base_mut(tree, base)?;
    let id = b.header.id;
    Ok((id, nth(&mut b.zones, zone, Label::Zone)?))
}

/// Write whatever of `zone` is not yet in the file.
pub(crate) fn persist_zone<S: NodeStore + ?Sized>(
    store: &mut S,
    mode: FileMode,
    root: NodeId,
    base_id: Option<NodeId>,
    zone: &mut Zone,
) -> Result<(), TreeError> {
    match base_id {
        Some(id) => Writer::new(store, mode, root).zone(id, zone),
        None => Ok(()),
    }
}

impl<S: NodeStore + ?Sized> Session<'_, S> {
    // ── Base and zone ──────────────────────────────────────────────

    /// Add a base with the given cell and physical dimensions.
    pub fn base_write(&mut self, name: &str, cell_dim: i32, phys_dim: i32) -> Result<usize, TreeError> {
        self.require_writable()?;
        check_base_dims(cell_dim, phys_dim).map_err(|d| TreeError::schema(Label::Base, name, d))?;
        let ctx = ctx_of(self.mode, &self.tree.header);
        let index = insert(&mut self.tree.bases, Base::new(name, cell_dim, phys_dim), Label::Base, &ctx)?;
        let base = &mut self.tree.bases[index - 1];
        Writer::new(&mut *self.store, self.mode, self.root).base(self.root, base)?;
        Ok(index)
    }

    /// Add a zone. `sizes` holds vertex, cell and boundary-vertex counts,
    /// `index_dim` values each.
    pub fn zone_write(
        &mut self,
        base: usize,
        name: &str,
        zone_type: ZoneType,
        sizes: &[i64],
    ) -> Result<usize, TreeError> {
        self.require_writable()?;
        let zone = Zone {
            header: Header::new(name),
            zone_type,
            sizes: sizes.to_vec(),
            size_type: self.config.index_width.data_type(sizes),
            ..Zone::default()
        };
        let mode = self.mode;
        let b = base_mut(&mut self.tree, base)?;
        check_zone(&zone, b.cell_dim).map_err(|d| TreeError::schema(Label::Zone, name, d))?;
        let ctx = ctx_of(mode, &b.header);
        let index = insert(&mut b.zones, zone, Label::Zone, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, b.header.id, &mut b.zones[index - 1])?;
        Ok(index)
    }

    /// Set the simulation type of a base.
    pub fn simulation_type_write(&mut self, base: usize, simulation: SimulationType) -> Result<(), TreeError> {
        self.require_writable()?;
        let mode = self.mode;
        let b = base_mut(&mut self.tree, base)?;
        let ctx = ctx_of(mode, &b.header);
        let addressed = address_single(&mut b.simulation, Access::Write, &ctx, Label::SimulationType, Base::SIMULATION_NODE)?;
        *addressed.item = simulation;
        if let Some(id) = b.header.id {
            Writer::new(&mut *self.store, mode, self.root).enum_node(id, Label::SimulationType, simulation)?;
        }
        Ok(())
    }

    // ── Grid and sections ──────────────────────────────────────────

    /// Add an empty coordinate container to a zone.
    pub fn grid_write(&mut self, base: usize, zone: usize, name: &str) -> Result<usize, TreeError> {
        self.require_writable()?;
        let mode = self.mode;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        let ctx = ctx_of(mode, &z.header);
        let index = insert(&mut z.coordinates, GridCoordinates::new(name), Label::GridCoordinates, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    /// Add an element section covering elements `start..=end`.
    ///
    /// Variable-length types (MIXED, NGON_n, NFACE_n) need `offsets`, one
    /// more than the element count, starting at 0.
    #[allow(clippy::too_many_arguments)]
    pub fn section_write(
        &mut self,
        base: usize,
        zone: usize,
        name: &str,
        element_type: ElementType,
        start: i64,
        end: i64,
        boundary: i32,
        connectivity: &[i64],
        offsets: Option<&[i64]>,
    ) -> Result<usize, TreeError> {
        self.require_writable()?;
        if start < 1 || end < start {
            return Err(TreeError::RangeInvalid {
                detail: format!("element range {start}..={end}"),
            });
        }
        let mut all = connectivity.to_vec();
        all.extend(offsets.unwrap_or(&[]));
        all.extend([start, end]);
        let dtype = self.config.index_width.data_type(&all);

        let mut section = Section::new(name, element_type, start, end, connectivity, offsets);
        section.boundary = boundary;
        section.connectivity = DataArray::vector(Section::CONNECTIVITY_NODE, Data::index(connectivity, dtype));
        section.offsets = offsets.map(|o| DataArray::vector(Section::OFFSET_NODE, Data::index(o, dtype)));
        let count = (end - start + 1) as usize;
        check_section(&section, count).map_err(|d| TreeError::schema(Label::Elements, name, d))?;
        if boundary < 0 || boundary as i64 > end - start + 1 {
            return Err(TreeError::schema(Label::Elements, name, format!("boundary count {boundary} out of range")));
        }

        let mode = self.mode;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        let ctx = ctx_of(mode, &z.header);
        let index = insert(&mut z.sections, section, Label::Elements, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    /// Attach parent elements and parent face positions to a section, two
    /// values per element each.
    pub fn parent_data_write(
        &mut self,
        base: usize,
        zone: usize,
        section: usize,
        elements: &[i64],
        positions: &[i64],
    ) -> Result<(), TreeError> {
        self.require_writable()?;
        let width = self.config.index_width;
        let mode = self.mode;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        let s = nth(&mut z.sections, section, Label::Elements)?;
        let count = s.element_count().max(0) as usize;
        for (what, values) in [(Section::PARENT_ELEMENTS_NODE, elements), (Section::PARENT_POSITIONS_NODE, positions)] {
            if values.len() != 2 * count {
                return Err(TreeError::schema(
                    Label::Elements,
                    &s.header.name,
                    format!("{what} needs {} values, got {}", 2 * count, values.len()),
                ));
            }
        }
        let ctx = ctx_of(mode, &s.header);
        let dtype = width.data_type(elements);
        for (slot, name, values) in [
            (&mut s.parent_elements, Section::PARENT_ELEMENTS_NODE, elements),
            (&mut s.parent_positions, Section::PARENT_POSITIONS_NODE, positions),
        ] {
            let addressed = address_single(slot, Access::Write, &ctx, Label::DataArray, name)?;
            *addressed.item = DataArray::new(name, &[count, 2], Data::index(values, dtype));
        }
        persist_zone(&mut *self.store, mode, self.root, bid, z)
    }

    // ── Fields ─────────────────────────────────────────────────────

    /// Add a flow solution at `location`.
    pub fn solution_write(&mut self, base: usize, zone: usize, name: &str, location: GridLocation) -> Result<usize, TreeError> {
        self.require_writable()?;
        let mode = self.mode;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        check_location(z.zone_type, z.index_dim(), location)?;
        let ctx = ctx_of(mode, &z.header);
        let index = insert(&mut z.solutions, FlowSolution::new(name, location), Label::FlowSolution, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    /// Add a discrete data container at `location`.
    pub fn discrete_write(&mut self, base: usize, zone: usize, name: &str, location: GridLocation) -> Result<usize, TreeError> {
        self.require_writable()?;
        let mode = self.mode;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        check_location(z.zone_type, z.index_dim(), location)?;
        let ctx = ctx_of(mode, &z.header);
        let index = insert(&mut z.discrete, DiscreteData::new(name, location), Label::DiscreteData, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    // ── Boundary conditions ────────────────────────────────────────

    /// Add a boundary condition over a point set; the zone's `ZoneBC`
    /// container is created on first use.
    pub fn bc_write(
        &mut self,
        base: usize,
        zone: usize,
        name: &str,
        bc_type: BCType,
        kind: PointSetType,
        points: &[i64],
    ) -> Result<usize, TreeError> {
        self.require_writable()?;
        let width = self.config.index_width;
        let mode = self.mode;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        let set = point_set(kind, index_dim_for(kind, z), points, width, (Label::BC, name))?;
        let ctx = ctx_of(mode, &z.header);
        if z.bc.is_none() {
            let addressed = address_single(&mut z.bc, Access::Write, &ctx, Label::ZoneBC, ZoneBC::NODE_NAME)?;
            *addressed.item = ZoneBC::new();
        }
        let Some(zbc) = z.bc.as_mut() else {
            return Err(TreeError::not_found(ZoneBC::NODE_NAME));
        };
        let ctx = ctx_of(mode, &zbc.header);
        let index = insert(&mut zbc.bcs, BC::new(name, bc_type, set), Label::BC, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    /// Add a dataset to a boundary condition; it applies to the parent's
    /// patch until it is given a point set of its own.
    pub fn dataset_write(
        &mut self,
        base: usize,
        zone: usize,
        bc: usize,
        name: &str,
        bc_type: BCType,
    ) -> Result<usize, TreeError> {
        self.require_writable()?;
        let mode = self.mode;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        let zbc = z
            .bc
            .as_mut()
            .ok_or_else(|| TreeError::not_found(format!("{} in zone #{zone}", ZoneBC::NODE_NAME)))?;
        let b = nth(&mut zbc.bcs, bc, Label::BC)?;
        let ctx = ctx_of(mode, &b.header);
        let index = insert(&mut b.datasets, BCDataSet::new(name, bc_type), Label::BCDataSet, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    // ── Connectivity ───────────────────────────────────────────────

    /// The zone's first connectivity container, created on first use.
    fn connectivity_of(z: &mut Zone, mode: FileMode) -> Result<&mut ZoneGridConnectivity, TreeError> {
        if z.connectivity.is_empty() {
            let ctx = ctx_of(mode, &z.header);
            insert(&mut z.connectivity, ZoneGridConnectivity::new(), Label::ZoneGridConnectivity, &ctx)?;
        }
        nth(&mut z.connectivity, 1, Label::ZoneGridConnectivity)
    }

    /// Add a general interface to `donor`. Donor indices use the donor
    /// zone's index dimension when the donor is in the same base; empty
    /// donor points leave the donor side unset.
    #[allow(clippy::too_many_arguments)]
    pub fn connectivity_write(
        &mut self,
        base: usize,
        zone: usize,
        name: &str,
        location: GridLocation,
        connectivity_type: GridConnectivityType,
        kind: PointSetType,
        points: &[i64],
        donor: &str,
        donor_kind: PointSetType,
        donor_points: &[i64],
    ) -> Result<usize, TreeError> {
        self.require_writable()?;
        let width = self.config.index_width;
        let mode = self.mode;
        let b = base_mut(&mut self.tree, base)?;
        let bid = b.header.id;
        let donor_dim = b.zone(donor).map(Zone::index_dim);
        let z = nth(&mut b.zones, zone, Label::Zone)?;
        check_location(z.zone_type, z.index_dim(), location)?;
        let ptset = point_set(kind, index_dim_for(kind, z), points, width, (Label::GridConnectivity, name))?;
        let donor_ptset = if donor_points.is_empty() {
            None
        } else {
            let dim = donor_dim.unwrap_or_else(|| z.index_dim());
            Some(point_set(donor_kind, dim, donor_points, width, (Label::GridConnectivity, name))?)
        };
        let gc = GridConnectivity {
            header: Header::new(name),
            donor: donor.to_owned(),
            connectivity_type: Some(connectivity_type),
            location: Some(location),
            ptset: Some(ptset),
            donor_ptset,
            ..GridConnectivity::default()
        };
        let zgc = Self::connectivity_of(z, mode)?;
        let ctx = ctx_of(mode, &zgc.header);
        let index = insert(&mut zgc.general, gc, Label::GridConnectivity, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    /// Add a 1-to-1 interface between a receiver `range` and a
    /// `donor_range`, each two corners. An empty `transform` is the
    /// identity.
    #[allow(clippy::too_many_arguments)]
    pub fn one_to_one_write(
        &mut self,
        base: usize,
        zone: usize,
        name: &str,
        donor: &str,
        range: &[i64],
        donor_range: &[i64],
        transform: &[i32],
    ) -> Result<usize, TreeError> {
        self.require_writable()?;
        let width = self.config.index_width;
        let mode = self.mode;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        let dim = z.index_dim();
        let owner = (Label::GridConnectivity1to1, name);
        let transform = if transform.is_empty() {
            (1..=dim as i32).collect()
        } else {
            transform.to_vec()
        };
        let gc = GridConnectivity1to1 {
            header: Header::new(name),
            donor: donor.to_owned(),
            transform,
            range: point_set(PointSetType::PointRange, dim, range, width, owner)?,
            donor_range: point_set(PointSetType::PointRangeDonor, dim, donor_range, width, owner)?,
            ..GridConnectivity1to1::default()
        };
        if gc.transform.len() != dim || !gc.transform_is_valid() {
            return Err(TreeError::schema(
                Label::GridConnectivity1to1,
                name,
                format!("invalid transform {:?}", gc.transform),
            ));
        }
        let zgc = Self::connectivity_of(z, mode)?;
        let ctx = ctx_of(mode, &zgc.header);
        let index = insert(&mut zgc.one_to_one, gc, Label::GridConnectivity1to1, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    /// Add overset holes: one point list, or any number of ranges given
    /// back to back (stored as `PointRange1`, `PointRange2`, ...).
    pub fn holes_write(
        &mut self,
        base: usize,
        zone: usize,
        name: &str,
        location: GridLocation,
        kind: PointSetType,
        points: &[i64],
    ) -> Result<usize, TreeError> {
        self.require_writable()?;
        let width = self.config.index_width;
        let mode = self.mode;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        check_location(z.zone_type, z.index_dim(), location)?;
        let dim = z.index_dim();
        let owner = (Label::OversetHoles, name);
        let ptsets = match kind {
            PointSetType::PointList => vec![point_set(kind, dim, points, width, owner)?],
            PointSetType::PointRange => {
                if dim == 0 || points.is_empty() || points.len() % (2 * dim) != 0 {
                    return Err(TreeError::schema(
                        Label::OversetHoles,
                        name,
                        format!("ranges need a multiple of {} values, got {}", 2 * dim, points.len()),
                    ));
                }
                points
                    .chunks(2 * dim)
                    .enumerate()
                    .map(|(i, corners)| {
                        let mut set = point_set(kind, dim, corners, width, owner)?;
                        set.header.name = format!("{}{}", kind, i + 1);
                        Ok(set)
                    })
                    .collect::<Result<Vec<_>, TreeError>>()?
            }
            other => {
                return Err(TreeError::schema(
                    Label::OversetHoles,
                    name,
                    format!("{other} is not a hole point set"),
                ))
            }
        };
        let holes = OversetHoles {
            header: Header::new(name),
            location: Some(location),
            ptsets,
            ..OversetHoles::default()
        };
        let zgc = Self::connectivity_of(z, mode)?;
        let ctx = ctx_of(mode, &zgc.header);
        let index = insert(&mut zgc.holes, holes, Label::OversetHoles, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    // ── Families ───────────────────────────────────────────────────

    fn persist_family(&mut self, base: usize, family: usize) -> Result<(), TreeError> {
        let b = base_mut(&mut self.tree, base)?;
        let Some(bid) = b.header.id else {
            return Ok(());
        };
        let fam = nth(&mut b.families, family, Label::Family)?;
        Writer::new(&mut *self.store, self.mode, self.root).family(bid, fam, Label::Family)
    }

    /// Add a family to a base.
    pub fn family_write(&mut self, base: usize, name: &str) -> Result<usize, TreeError> {
        self.require_writable()?;
        let b = base_mut(&mut self.tree, base)?;
        let ctx = ctx_of(self.mode, &b.header);
        let index = insert(&mut b.families, Family::new(name), Label::Family, &ctx)?;
        self.persist_family(base, index)?;
        Ok(index)
    }

    /// Give a family its boundary condition.
    pub fn family_bc_write(&mut self, base: usize, family: usize, bc_type: BCType) -> Result<(), TreeError> {
        self.require_writable()?;
        let b = base_mut(&mut self.tree, base)?;
        let fam = nth(&mut b.families, family, Label::Family)?;
        let ctx = ctx_of(self.mode, &fam.header);
        let addressed = address_single(&mut fam.family_bc, Access::Write, &ctx, Label::FamilyBC, FamilyBC::NODE_NAME)?;
        *addressed.item = FamilyBC::new(bc_type);
        self.persist_family(base, family)
    }

    /// Add a geometry reference to a family.
    pub fn geometry_write(
        &mut self,
        base: usize,
        family: usize,
        name: &str,
        file: &str,
        format: &str,
    ) -> Result<usize, TreeError> {
        self.require_writable()?;
        let b = base_mut(&mut self.tree, base)?;
        let fam = nth(&mut b.families, family, Label::Family)?;
        let ctx = ctx_of(self.mode, &fam.header);
        let index = insert(
            &mut fam.geometries,
            GeometryReference::new(name, file, format),
            Label::GeometryReference,
            &ctx,
        )?;
        self.persist_family(base, family)?;
        Ok(index)
    }

    // ── Sub-regions ────────────────────────────────────────────────

    fn subregion_insert(&mut self, base: usize, zone: usize, region: ZoneSubRegion) -> Result<usize, TreeError> {
        self.require_writable()?;
        let mode = self.mode;
        let cell_dim = base_mut(&mut self.tree, base)?.cell_dim;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        if !(1..=cell_dim).contains(&region.region_dim) {
            return Err(TreeError::schema(
                Label::ZoneSubRegion,
                &region.header.name,
                format!("region dimension {} outside 1..={cell_dim}", region.region_dim),
            ));
        }
        if region.extent_sources() != 1 {
            return Err(TreeError::schema(
                Label::ZoneSubRegion,
                &region.header.name,
                "exactly one of a point set, a BC name or a connectivity name is required",
            ));
        }
        let ctx = ctx_of(mode, &z.header);
        let index = insert(&mut z.subregions, region, Label::ZoneSubRegion, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    /// Add a sub-region over its own point set.
    #[allow(clippy::too_many_arguments)]
    pub fn subregion_write(
        &mut self,
        base: usize,
        zone: usize,
        name: &str,
        region_dim: i32,
        location: GridLocation,
        kind: PointSetType,
        points: &[i64],
    ) -> Result<usize, TreeError> {
        let width = self.config.index_width;
        let (_, z) = zone_mut(&mut self.tree, base, zone)?;
        check_location(z.zone_type, z.index_dim(), location)?;
        let ptset = point_set(kind, index_dim_for(kind, z), points, width, (Label::ZoneSubRegion, name))?;
        let region = ZoneSubRegion {
            location: Some(location),
            ptset: Some(ptset),
            ..ZoneSubRegion::new(name, region_dim)
        };
        self.subregion_insert(base, zone, region)
    }

    /// Add a sub-region sharing the extent of the boundary condition
    /// `bc_name`.
    pub fn subregion_bc_write(
        &mut self,
        base: usize,
        zone: usize,
        name: &str,
        region_dim: i32,
        bc_name: &str,
    ) -> Result<usize, TreeError> {
        let region = ZoneSubRegion {
            bc_region: Some(Descriptor::new(ZoneSubRegion::BC_REGION_NODE, bc_name)),
            ..ZoneSubRegion::new(name, region_dim)
        };
        self.subregion_insert(base, zone, region)
    }

    /// Add a sub-region sharing the extent of the interface `gc_name`.
    pub fn subregion_gc_write(
        &mut self,
        base: usize,
        zone: usize,
        name: &str,
        region_dim: i32,
        gc_name: &str,
    ) -> Result<usize, TreeError> {
        let region = ZoneSubRegion {
            gc_region: Some(Descriptor::new(ZoneSubRegion::GC_REGION_NODE, gc_name)),
            ..ZoneSubRegion::new(name, region_dim)
        };
        self.subregion_insert(base, zone, region)
    }

    // ── Motion and time history ────────────────────────────────────

    /// Add a rigid grid motion.
    pub fn rigid_motion_write(
        &mut self,
        base: usize,
        zone: usize,
        name: &str,
        motion_type: RigidGridMotionType,
    ) -> Result<usize, TreeError> {
        self.require_writable()?;
        let mode = self.mode;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        let ctx = ctx_of(mode, &z.header);
        let index = insert(&mut z.rigid_motions, RigidGridMotion::new(name, motion_type), Label::RigidGridMotion, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    /// Add an arbitrary (deforming) grid motion.
    pub fn arbitrary_motion_write(
        &mut self,
        base: usize,
        zone: usize,
        name: &str,
        motion_type: ArbitraryGridMotionType,
    ) -> Result<usize, TreeError> {
        self.require_writable()?;
        let mode = self.mode;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        let ctx = ctx_of(mode, &z.header);
        let index = insert(
            &mut z.arbitrary_motions,
            ArbitraryGridMotion::new(name, motion_type),
            Label::ArbitraryGridMotion,
            &ctx,
        )?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    /// Give a base its iterative data record of `steps` steps.
    pub fn base_iterative_write(&mut self, base: usize, name: &str, steps: i32) -> Result<(), TreeError> {
        self.require_writable()?;
        validate_name(name)?;
        if steps < 0 {
            return Err(TreeError::schema(Label::BaseIterativeData, name, format!("negative step count {steps}")));
        }
        let b = base_mut(&mut self.tree, base)?;
        let ctx = ctx_of(self.mode, &b.header);
        let addressed = address_single(&mut b.iterative, Access::Write, &ctx, Label::BaseIterativeData, name)?;
        *addressed.item = BaseIterativeData::new(name, steps);
        Writer::new(&mut *self.store, self.mode, self.root).base(self.root, b)
    }

    /// Give a zone its iterative data record.
    pub fn zone_iterative_write(&mut self, base: usize, zone: usize, name: &str) -> Result<(), TreeError> {
        self.require_writable()?;
        validate_name(name)?;
        let mode = self.mode;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        let ctx = ctx_of(mode, &z.header);
        let addressed = address_single(&mut z.iterative, Access::Write, &ctx, Label::ZoneIterativeData, name)?;
        *addressed.item = ZoneIterativeData::new(name);
        persist_zone(&mut *self.store, mode, self.root, bid, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionConfig;
    use meshtree_store::{BackendFlavor, MemoryStore};

    fn open(store: &mut MemoryStore) -> Session<'_, MemoryStore> {
        Session::open(store, "w.cgns", FileMode::Write, SessionConfig::default()).unwrap()
    }

    #[test]
    fn base_and_zone_are_persisted_immediately() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = open(&mut store);
        assert_eq!(s.base_write("Base", 3, 3).unwrap(), 1);
        assert_eq!(s.zone_write(1, "Block", ZoneType::Structured, &[5, 4, 3, 4, 3, 2, 0, 0, 0]).unwrap(), 1);
        let zone = s.tree().bases[0].zones[0].header.id.unwrap();
        assert_eq!(s.store().dimensions(zone).unwrap().as_slice(), &[3, 3]);
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = open(&mut store);
        assert!(matches!(s.base_write("Bad", 3, 2), Err(TreeError::SchemaViolation { .. })));
        s.base_write("Base", 2, 3).unwrap();
        assert!(matches!(
            s.zone_write(1, "Block", ZoneType::Structured, &[5, 4, 3, 3, 0, 0]),
            Err(TreeError::SchemaViolation { .. })
        ));
        assert!(matches!(s.base_write("Base", 2, 3), Err(TreeError::DuplicateChild { .. })));
        assert!(s.zone_write(2, "Block", ZoneType::Structured, &[5, 4, 4, 3, 0, 0]).unwrap_err().is_not_found());
    }

    #[test]
    fn section_with_parent_data() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = open(&mut store);
        s.base_write("Base", 2, 2).unwrap();
        s.zone_write(1, "Tris", ZoneType::Unstructured, &[4, 2, 0]).unwrap();
        s.section_write(1, 1, "Cells", ElementType::Tri3, 1, 2, 0, &[1, 2, 3, 2, 4, 3], None).unwrap();
        s.parent_data_write(1, 1, 1, &[1, 2, 0, 0], &[1, 1, 0, 0]).unwrap();
        let sec = &s.tree().bases[0].zones[0].sections[0];
        let sec_id = sec.header.id.unwrap();
        assert_eq!(sec.parent_elements.as_ref().unwrap().dims.as_slice(), &[2, 2]);
        assert!(s.store().child_by_name(sec_id, Section::PARENT_POSITIONS_NODE).unwrap().is_some());
        assert!(matches!(
            s.parent_data_write(1, 1, 1, &[1, 2], &[1, 1]),
            Err(TreeError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn section_connectivity_length_is_checked() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = open(&mut store);
        s.base_write("Base", 3, 3).unwrap();
        s.zone_write(1, "Tets", ZoneType::Unstructured, &[4, 1, 0]).unwrap();
        assert!(matches!(
            s.section_write(1, 1, "Cells", ElementType::Tetra4, 1, 1, 0, &[1, 2, 3], None),
            Err(TreeError::SchemaViolation { .. })
        ));
        assert!(matches!(
            s.section_write(1, 1, "Cells", ElementType::Tetra4, 2, 1, 0, &[1, 2, 3, 4], None),
            Err(TreeError::RangeInvalid { .. })
        ));
    }

    #[test]
    fn bc_creates_zone_bc_once() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = open(&mut store);
        s.base_write("Base", 2, 2).unwrap();
        s.zone_write(1, "Block", ZoneType::Structured, &[3, 3, 2, 2, 0, 0]).unwrap();
        s.bc_write(1, 1, "Wall", BCType::BCWall, PointSetType::PointRange, &[1, 1, 3, 1]).unwrap();
        assert_eq!(
            s.bc_write(1, 1, "Inlet", BCType::BCInflow, PointSetType::PointList, &[1, 2, 1, 3]).unwrap(),
            2
        );
        let zbc = s.tree().bases[0].zones[0].bc.as_ref().unwrap();
        assert_eq!(zbc.bcs[0].ptset.as_ref().unwrap().size_of_patch, 3);
        assert_eq!(zbc.bcs[1].ptset.as_ref().unwrap().npts, 2);
        assert_eq!(s.dataset_write(1, 1, 1, "Heat", BCType::BCWall).unwrap(), 1);
    }

    #[test]
    fn one_to_one_defaults_to_identity_transform() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = open(&mut store);
        s.base_write("Base", 2, 2).unwrap();
        s.zone_write(1, "Left", ZoneType::Structured, &[3, 3, 2, 2, 0, 0]).unwrap();
        s.one_to_one_write(1, 1, "Match", "Right", &[3, 1, 3, 3], &[1, 1, 1, 3], &[]).unwrap();
        let gc = &s.tree().bases[0].zones[0].connectivity[0].one_to_one[0];
        assert_eq!(gc.transform, vec![1, 2]);
        assert!(matches!(
            s.one_to_one_write(1, 1, "Bad", "Right", &[3, 1, 3, 3], &[1, 1, 1, 3], &[1, 1]),
            Err(TreeError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn holes_split_ranges() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = open(&mut store);
        s.base_write("Base", 2, 2).unwrap();
        s.zone_write(1, "Block", ZoneType::Structured, &[9, 9, 8, 8, 0, 0]).unwrap();
        s.holes_write(1, 1, "Hole", GridLocation::CellCenter, PointSetType::PointRange, &[1, 1, 2, 2, 5, 5, 6, 6])
            .unwrap();
        let holes = &s.tree().bases[0].zones[0].connectivity[0].holes[0];
        assert_eq!(holes.ptsets.len(), 2);
        assert_eq!(holes.ptsets[1].header.name, "PointRange2");
        assert_eq!(holes.point_count(), 8);
    }

    #[test]
    fn subregion_needs_exactly_one_extent() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = open(&mut store);
        s.base_write("Base", 3, 3).unwrap();
        s.zone_write(1, "Tets", ZoneType::Unstructured, &[4, 1, 0]).unwrap();
        s.subregion_bc_write(1, 1, "Patch", 2, "Wall").unwrap();
        assert!(matches!(
            s.subregion_bc_write(1, 1, "Flat", 4, "Wall"),
            Err(TreeError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn families_carry_bc_and_geometry() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = open(&mut store);
        s.base_write("Base", 3, 3).unwrap();
        s.family_write(1, "Walls").unwrap();
        s.family_bc_write(1, 1, BCType::BCWallViscous).unwrap();
        s.geometry_write(1, 1, "CAD", "wing.iges", "IGES").unwrap();
        let fam = &s.tree().bases[0].families[0];
        let id = fam.header.id.unwrap();
        assert!(s.store().child_by_name(id, FamilyBC::NODE_NAME).unwrap().is_some());
        assert!(s.store().child_by_name(id, "CAD").unwrap().is_some());
        assert!(matches!(
            s.family_bc_write(1, 1, BCType::BCWall),
            Err(TreeError::DuplicateChild { .. })
        ));
    }

    #[test]
    fn simulation_type_is_a_singleton() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = open(&mut store);
        s.base_write("Base", 3, 3).unwrap();
        s.simulation_type_write(1, SimulationType::TimeAccurate).unwrap();
        assert!(s.simulation_type_write(1, SimulationType::NonTimeAccurate).is_err());
        s.base_iterative_write(1, "Steps", 10).unwrap();
        assert_eq!(s.tree().bases[0].iterative.as_ref().unwrap().steps, 10);
    }
}
