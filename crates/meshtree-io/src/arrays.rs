//! Array I/O: whole arrays at the cursor, and rind-aware partial transfers
//! at the cursor, on coordinates and on solution fields.
//!
//! Partial transfers go through [`verify_range`] with the session's
//! [`RindIndex`](meshtree_array::RindIndex) convention. A writable session
//! flushes first so the target array exists in the file.

use meshtree_array::{data_size, general_read, general_write, read_full, verify_range, RindIndex, Selection};
use meshtree_core::{element_count, Data, DataType, Dims, GridLocation, Label, TreeError};
use meshtree_model::{pick, DataArray, GridCoordinates, Selector, Zone};
use meshtree_store::NodeStore;

use crate::features::slot_of;
use crate::session::{ctx_of, Session};
use crate::writers::{insert, nth, persist_zone, zone_mut};

/// Direction of a partial transfer.
enum Transfer<'d> {
    Write(&'d Data),
    Read(&'d mut Data),
}

/// Run a partial transfer on a stored array.
#[allow(clippy::too_many_arguments)]
fn partial<S: NodeStore + ?Sized>(
    store: &mut S,
    rind_index: RindIndex,
    array: &mut DataArray,
    rind: &[i32],
    file_min: &[i64],
    file_max: &[i64],
    memory: Selection<'_>,
    io: Transfer<'_>,
) -> Result<(), TreeError> {
    let name = &array.header.name;
    let id = array
        .header
        .id
        .ok_or_else(|| TreeError::not_found(format!("stored array '{name}'")))?;
    let range = verify_range(rind_index, rind, Selection::new(&array.dims, file_min, file_max), memory)?;
    match io {
        Transfer::Write(data) => {
            if array.header.in_link || array.header.link.is_some() {
                return Err(TreeError::InsideLink { name: name.clone() });
            }
            check_buffer(data, memory.dims)?;
            general_write(store, id, &range, memory.dims, data)?;
            array.data = read_full(store, id, array.data_type)?;
        }
        Transfer::Read(out) => {
            check_buffer(out, memory.dims)?;
            general_read(store, id, &range, memory.dims, out)?;
        }
    }
    Ok(())
}

fn check_buffer(data: &Data, dims: &[usize]) -> Result<(), TreeError> {
    let expected = element_count(dims);
    if data.len() != expected {
        return Err(TreeError::range(format!(
            "buffer holds {} values, memory extents describe {expected}",
            data.len()
        )));
    }
    Ok(())
}

/// Whole contents of `array` as `dtype`, from memory or from the file.
fn whole<S: NodeStore + ?Sized>(store: &S, array: &DataArray, dtype: DataType) -> Result<Data, TreeError> {
    let name = &array.header.name;
    let data = match (&array.data, array.header.id) {
        (Some(data), _) => data.convert(dtype),
        (None, Some(id)) => read_full(store, id, dtype)?,
        (None, None) => return Err(TreeError::not_found(format!("data of array '{name}'"))),
    };
    data.ok_or_else(|| {
        TreeError::schema(
            Label::DataArray,
            name,
            format!("cannot read {} as {dtype}", array.data_type),
        )
    })
}

fn named<'a>(arrays: &'a mut [DataArray], name: &str) -> Result<&'a mut DataArray, TreeError> {
    arrays
        .iter_mut()
        .find(|a| a.header.name == name)
        .ok_or_else(|| TreeError::not_found(format!("array '{name}'")))
}

fn check_len(name: &str, dims: &[usize], data: &Data) -> Result<(), TreeError> {
    let expected = element_count(dims);
    if data.len() != expected {
        return Err(TreeError::schema(
            Label::DataArray,
            name,
            format!("extents {dims:?} need {expected} values, got {}", data.len()),
        ));
    }
    Ok(())
}

fn coordinates(zone: &mut Zone) -> Result<&mut GridCoordinates, TreeError> {
    let zone_name = &zone.header.name;
    zone.coordinates
        .iter_mut()
        .find(|c| c.header.name == GridCoordinates::DEFAULT_NAME)
        .ok_or_else(|| TreeError::not_found(format!("{} of zone '{zone_name}'", GridCoordinates::DEFAULT_NAME)))
}

/// Extents of an array at `location` in `zone` with `rind` planes.
fn extents(zone: &Zone, location: GridLocation, rind: Option<&[i32]>) -> Result<Dims, TreeError> {
    data_size(
        zone.zone_type,
        location,
        zone.vertex_size(),
        zone.cell_size(),
        rind.unwrap_or(&[]),
    )
}

impl<S: NodeStore + ?Sized> Session<'_, S> {
    fn flush_if_writable(&mut self) -> Result<(), TreeError> {
        if self.mode.is_writable() {
            self.flush()?;
        }
        Ok(())
    }

    // ── At the cursor ──────────────────────────────────────────────

    /// Add (or in modify mode replace) the array `name` under the entity at
    /// the cursor.
    pub fn array_write(&mut self, name: &str, dims: &[usize], data: Data) -> Result<(), TreeError> {
        check_len(name, dims, &data)?;
        self.put_multiple(Label::DataArray, DataArray::new(name, dims, data), |e| e.into_arrays(), |w, pid, a| {
            w.array(pid, a, Label::DataArray)
        })
    }

    /// Number of arrays under the entity at the cursor.
    pub fn array_count(&mut self) -> Result<usize, TreeError> {
        let resolved = self.at()?;
        slot_of(resolved.entity, Label::DataArray, |e| e.into_arrays()).map(|a| a.len())
    }

    fn array_at(&mut self, sel: &Selector) -> Result<DataArray, TreeError> {
        let path = self.cursor.path();
        let resolved = self.at()?;
        let arrays = slot_of(resolved.entity, Label::DataArray, |e| e.into_arrays())?;
        pick(arrays, sel)
            .map(|a| a.clone())
            .ok_or_else(|| TreeError::not_found(format!("array {sel} under {path}")))
    }

    /// Name, stored type and extents of the selected array.
    pub fn array_info(&mut self, sel: impl Into<Selector>) -> Result<(String, DataType, Dims), TreeError> {
        let a = self.array_at(&sel.into())?;
        Ok((a.header.name, a.data_type, a.dims))
    }

    /// Whole contents of the selected array as `dtype`.
    pub fn array_read(&mut self, sel: impl Into<Selector>, dtype: DataType) -> Result<Data, TreeError> {
        let a = self.array_at(&sel.into())?;
        whole(&*self.store, &a, dtype)
    }

    /// Write `data` (extents and block in `memory`) into the block
    /// `file_min..=file_max` of the array `name` at the cursor.
    pub fn array_general_write(
        &mut self,
        name: &str,
        file_min: &[i64],
        file_max: &[i64],
        memory: Selection<'_>,
        data: &Data,
    ) -> Result<(), TreeError> {
        self.require_writable()?;
        self.flush()?;
        self.cursor_partial(name, file_min, file_max, memory, Transfer::Write(data))
    }

    /// Read the block `file_min..=file_max` of the array `name` at the
    /// cursor into the `memory` block of `out`.
    pub fn array_general_read(
        &mut self,
        name: &str,
        file_min: &[i64],
        file_max: &[i64],
        memory: Selection<'_>,
        out: &mut Data,
    ) -> Result<(), TreeError> {
        self.flush_if_writable()?;
        self.cursor_partial(name, file_min, file_max, memory, Transfer::Read(out))
    }

    fn cursor_partial(
        &mut self,
        name: &str,
        file_min: &[i64],
        file_max: &[i64],
        memory: Selection<'_>,
        io: Transfer<'_>,
    ) -> Result<(), TreeError> {
        let rind_index = self.config.rind_index;
        let mut resolved = self.cursor.resolve(&mut self.tree)?;
        if matches!(io, Transfer::Write(_)) && resolved.in_link {
            return Err(TreeError::InsideLink {
                name: resolved.entity.header().name.clone(),
            });
        }
        let rind = resolved
            .entity
            .reborrow()
            .into_rind()
            .and_then(|r| r.clone())
            .unwrap_or_default();
        let arrays = slot_of(resolved.entity, Label::DataArray, |e| e.into_arrays())?;
        let array = named(arrays, name)?;
        partial(&mut *self.store, rind_index, array, &rind, file_min, file_max, memory, io)
    }

    // ── Coordinates ────────────────────────────────────────────────

    /// Write a whole coordinate array into the zone's `GridCoordinates`,
    /// creating the container on first use. Returns the array's position.
    pub fn coord_write(&mut self, base: usize, zone: usize, name: &str, data: Data) -> Result<usize, TreeError> {
        self.require_writable()?;
        let mode = self.mode;
        let has_grid = zone_mut(&mut self.tree, base, zone)?
            .1
            .coordinates
            .iter()
            .any(|c| c.header.name == GridCoordinates::DEFAULT_NAME);
        if !has_grid {
            self.grid_write(base, zone, GridCoordinates::DEFAULT_NAME)?;
        }
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        let dims = {
            let grid = coordinates(z)?;
            let rind = grid.rind.clone();
            extents(z, GridLocation::Vertex, rind.as_deref())?
        };
        check_len(name, &dims, &data)?;
        let grid = coordinates(z)?;
        let ctx = ctx_of(mode, &grid.header);
        let index = insert(&mut grid.arrays, DataArray::new(name, &dims, data), Label::DataArray, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    /// Whole coordinate array `name` as `dtype`.
    pub fn coord_read(&mut self, base: usize, zone: usize, name: &str, dtype: DataType) -> Result<Data, TreeError> {
        let (_, z) = zone_mut(&mut self.tree, base, zone)?;
        let array = named(&mut coordinates(z)?.arrays, name)?;
        whole(&*self.store, array, dtype)
    }

    /// Partial write of a coordinate array.
    #[allow(clippy::too_many_arguments)]
    pub fn coord_general_write(
        &mut self,
        base: usize,
        zone: usize,
        name: &str,
        file_min: &[i64],
        file_max: &[i64],
        memory: Selection<'_>,
        data: &Data,
    ) -> Result<(), TreeError> {
        self.require_writable()?;
        self.flush()?;
        self.coord_partial(base, zone, name, file_min, file_max, memory, Transfer::Write(data))
    }

    /// Partial read of a coordinate array.
    #[allow(clippy::too_many_arguments)]
    pub fn coord_general_read(
        &mut self,
        base: usize,
        zone: usize,
        name: &str,
        file_min: &[i64],
        file_max: &[i64],
        memory: Selection<'_>,
        out: &mut Data,
    ) -> Result<(), TreeError> {
        self.flush_if_writable()?;
        self.coord_partial(base, zone, name, file_min, file_max, memory, Transfer::Read(out))
    }

    #[allow(clippy::too_many_arguments)]
    fn coord_partial(
        &mut self,
        base: usize,
        zone: usize,
        name: &str,
        file_min: &[i64],
        file_max: &[i64],
        memory: Selection<'_>,
        io: Transfer<'_>,
    ) -> Result<(), TreeError> {
        let rind_index = self.config.rind_index;
        let (_, z) = zone_mut(&mut self.tree, base, zone)?;
        let grid = coordinates(z)?;
        let rind = grid.rind.clone().unwrap_or_default();
        let array = named(&mut grid.arrays, name)?;
        partial(&mut *self.store, rind_index, array, &rind, file_min, file_max, memory, io)
    }

    // ── Solution fields ────────────────────────────────────────────

    /// Write a whole field into flow solution `solution`. The extents come
    /// from the solution's location and rind, or from its point set.
    pub fn field_write(
        &mut self,
        base: usize,
        zone: usize,
        solution: usize,
        name: &str,
        data: Data,
    ) -> Result<usize, TreeError> {
        self.require_writable()?;
        let mode = self.mode;
        let (bid, z) = zone_mut(&mut self.tree, base, zone)?;
        let dims = {
            let zone_ref: &Zone = z;
            let sol = zone_ref
                .solutions
                .get(solution.wrapping_sub(1))
                .ok_or_else(|| TreeError::not_found(format!("{} #{solution}", Label::FlowSolution)))?;
            match &sol.ptset {
                Some(set) => Dims::from_slice(&[set.size_of_patch]),
                None => extents(zone_ref, sol.location(), sol.rind.as_deref())?,
            }
        };
        check_len(name, &dims, &data)?;
        let sol = nth(&mut z.solutions, solution, Label::FlowSolution)?;
        let ctx = ctx_of(mode, &sol.header);
        let index = insert(&mut sol.arrays, DataArray::new(name, &dims, data), Label::DataArray, &ctx)?;
        persist_zone(&mut *self.store, mode, self.root, bid, z)?;
        Ok(index)
    }

    /// Whole field `name` of flow solution `solution` as `dtype`.
    pub fn field_read(
        &mut self,
        base: usize,
        zone: usize,
        solution: usize,
        name: &str,
        dtype: DataType,
    ) -> Result<Data, TreeError> {
        let (_, z) = zone_mut(&mut self.tree, base, zone)?;
        let sol = nth(&mut z.solutions, solution, Label::FlowSolution)?;
        let array = named(&mut sol.arrays, name)?;
        whole(&*self.store, array, dtype)
    }

    /// Partial write of a field.
    #[allow(clippy::too_many_arguments)]
    pub fn field_general_write(
        &mut self,
        base: usize,
        zone: usize,
        solution: usize,
        name: &str,
        file_min: &[i64],
        file_max: &[i64],
        memory: Selection<'_>,
        data: &Data,
    ) -> Result<(), TreeError> {
        self.require_writable()?;
        self.flush()?;
        self.field_partial((base, zone, solution), name, file_min, file_max, memory, Transfer::Write(data))
    }

    /// Partial read of a field.
    #[allow(clippy::too_many_arguments)]
    pub fn field_general_read(
        &mut self,
        base: usize,
        zone: usize,
        solution: usize,
        name: &str,
        file_min: &[i64],
        file_max: &[i64],
        memory: Selection<'_>,
        out: &mut Data,
    ) -> Result<(), TreeError> {
        self.flush_if_writable()?;
        self.field_partial((base, zone, solution), name, file_min, file_max, memory, Transfer::Read(out))
    }

    fn field_partial(
        &mut self,
        (base, zone, solution): (usize, usize, usize),
        name: &str,
        file_min: &[i64],
        file_max: &[i64],
        memory: Selection<'_>,
        io: Transfer<'_>,
    ) -> Result<(), TreeError> {
        let rind_index = self.config.rind_index;
        let (_, z) = zone_mut(&mut self.tree, base, zone)?;
        let sol = nth(&mut z.solutions, solution, Label::FlowSolution)?;
        let rind = sol.rind.clone().unwrap_or_default();
        let array = named(&mut sol.arrays, name)?;
        partial(&mut *self.store, rind_index, array, &rind, file_min, file_max, memory, io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use meshtree_core::{FileMode, ZoneType};
    use meshtree_store::{BackendFlavor, MemoryStore};

    fn grid(store: &mut MemoryStore) -> Session<'_, MemoryStore> {
        let mut s = Session::open(store, "a.cgns", FileMode::Write, SessionConfig::default()).unwrap();
        s.base_write("Base", 2, 2).unwrap();
        s.zone_write(1, "Block", ZoneType::Structured, &[3, 2, 2, 1, 0, 0]).unwrap();
        s
    }

    #[test]
    fn coordinates_are_sized_from_vertices() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = grid(&mut store);
        let x = Data::R8((0..6).map(f64::from).collect());
        assert_eq!(s.coord_write(1, 1, "CoordinateX", x).unwrap(), 1);
        assert!(matches!(
            s.coord_write(1, 1, "CoordinateY", Data::R8(vec![0.0; 5])),
            Err(TreeError::SchemaViolation { .. })
        ));
        let back = s.coord_read(1, 1, "CoordinateX", DataType::Float32).unwrap();
        assert_eq!(back, Data::R4(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]));
    }

    #[test]
    fn partial_write_updates_one_row() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = grid(&mut store);
        s.coord_write(1, 1, "CoordinateX", Data::R8(vec![0.0; 6])).unwrap();
        let row = Data::R8(vec![7.0, 8.0, 9.0]);
        s.coord_general_write(1, 1, "CoordinateX", &[1, 2], &[3, 2], Selection::new(&[3], &[1], &[3]), &row)
            .unwrap();
        let back = s.coord_read(1, 1, "CoordinateX", DataType::Float64).unwrap();
        assert_eq!(back, Data::R8(vec![0.0, 0.0, 0.0, 7.0, 8.0, 9.0]));

        let mut out = Data::R8(vec![0.0; 2]);
        s.coord_general_read(1, 1, "CoordinateX", &[2, 2], &[3, 2], Selection::new(&[2], &[1], &[2]), &mut out)
            .unwrap();
        assert_eq!(out, Data::R8(vec![8.0, 9.0]));
    }

    #[test]
    fn out_of_range_block_is_rejected() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = grid(&mut store);
        s.coord_write(1, 1, "CoordinateX", Data::R8(vec![0.0; 6])).unwrap();
        let mut out = Data::R8(vec![0.0; 2]);
        let err = s
            .coord_general_read(1, 1, "CoordinateX", &[3, 1], &[4, 1], Selection::new(&[2], &[1], &[2]), &mut out)
            .unwrap_err();
        assert!(matches!(err, TreeError::RangeInvalid { .. }));
    }

    #[test]
    fn field_follows_solution_location() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = grid(&mut store);
        s.solution_write(1, 1, "Cells", GridLocation::CellCenter).unwrap();
        s.field_write(1, 1, 1, "Density", Data::R8(vec![1.0, 2.0])).unwrap();
        assert!(s.field_write(1, 1, 1, "Pressure", Data::R8(vec![1.0; 6])).is_err());
        assert_eq!(
            s.field_read(1, 1, 1, "Density", DataType::Float64).unwrap(),
            Data::R8(vec![1.0, 2.0])
        );
    }

    #[test]
    fn cursor_arrays_round_trip() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let mut s = grid(&mut store);
        s.goto(1, &[(Label::Zone, Selector::Index(1))]).unwrap();
        s.user_data_write("Extra").unwrap();
        s.advance(Label::UserDefinedData, Selector::Index(1)).unwrap();
        s.array_write("Values", &[2, 2], Data::I4(vec![1, 2, 3, 4])).unwrap();
        assert_eq!(s.array_count().unwrap(), 1);
        let (name, dtype, dims) = s.array_info(Selector::Index(1)).unwrap();
        assert_eq!((name.as_str(), dtype, dims.as_slice()), ("Values", DataType::Int32, &[2usize, 2][..]));
        assert_eq!(
            s.array_read(Selector::Index(1), DataType::Int64).unwrap(),
            Data::I8(vec![1, 2, 3, 4])
        );

        let mut out = Data::I4(vec![0; 2]);
        s.array_general_read("Values", &[1, 2], &[2, 2], Selection::new(&[2], &[1], &[2]), &mut out)
            .unwrap();
        assert_eq!(out, Data::I4(vec![3, 4]));
    }
}
