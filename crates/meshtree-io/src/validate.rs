//! Shape rules shared by the read engine, the write engine and the
//! convenience writers.

use meshtree_array::data_size;
use meshtree_core::{DataType, Dims, GridLocation, Label, TreeError, ZoneType};
use meshtree_model::{DataArray, Header, PointSet, Section, Zone};

/// Base dimensions: both in `1..=3`, physical at least cell.
pub(crate) fn check_base_dims(cell_dim: i32, phys_dim: i32) -> Result<(), String> {
    if !(1..=3).contains(&cell_dim) || !(1..=3).contains(&phys_dim) || phys_dim < cell_dim {
        return Err(format!("invalid dimensions: cell {cell_dim}, physical {phys_dim}"));
    }
    Ok(())
}

/// Zone sizes as a writer must produce them under a base of `cell_dim`.
pub(crate) fn check_zone(zone: &Zone, cell_dim: i32) -> Result<(), String> {
    let index_dim = zone.index_dim();
    if zone.sizes.len() != 3 * index_dim || index_dim == 0 {
        return Err(format!("sizes must hold 3 x IndexDimension values, hold {}", zone.sizes.len()));
    }
    if !zone.size_type.is_integer() {
        return Err(format!("sizes must be I4 or I8, are {}", zone.size_type));
    }
    if zone.size_type == DataType::Int32 && zone.sizes.iter().any(|&s| s > i32::MAX as i64) {
        return Err("sizes exceed I4".to_owned());
    }
    match zone.zone_type {
        ZoneType::Structured => {
            if index_dim != cell_dim.max(0) as usize {
                return Err(format!(
                    "structured zone has index dimension {index_dim}, base cell dimension is {cell_dim}"
                ));
            }
            for (v, c) in zone.vertex_size().iter().zip(zone.cell_size()) {
                if *v < 2 || *c != v - 1 {
                    return Err(format!("structured sizes need cells = vertices - 1, found {v} and {c}"));
                }
            }
        }
        ZoneType::Unstructured => {
            if index_dim != 1 {
                return Err(format!("unstructured zone has index dimension {index_dim}"));
            }
            let (v, c, b) = (zone.sizes[0], zone.sizes[1], zone.sizes[2]);
            if v < 1 || c < 1 || b < 0 || b > v {
                return Err(format!("invalid unstructured sizes: {v} vertices, {c} cells, {b} boundary"));
            }
        }
        other => return Err(format!("cannot write a {other} zone")),
    }
    Ok(())
}

/// Shape checks on a section in its current representation.
pub(crate) fn check_section(section: &Section, count: usize) -> Result<(), String> {
    let conn_len = section.connectivity.len();
    let element_type = section.element_type;
    let npe = element_type.nodes_per_element();
    if npe > 0 && conn_len != count * npe {
        return Err(format!(
            "{count} {element_type} elements need {} connectivity values, found {conn_len}",
            count * npe
        ));
    }
    if element_type.is_variable() {
        let offsets = section
            .offsets
            .as_ref()
            .and_then(DataArray::index_values)
            .ok_or_else(|| format!("{element_type} section without {}", Section::OFFSET_NODE))?;
        if offsets.len() != count + 1 {
            return Err(format!(
                "{} holds {} values, expected {}",
                Section::OFFSET_NODE,
                offsets.len(),
                count + 1
            ));
        }
        if offsets.first() != Some(&0)
            || offsets.windows(2).any(|w| w[1] < w[0])
            || offsets.last().copied() != Some(conn_len as i64)
        {
            return Err(format!(
                "{} must rise from 0 to the connectivity length {conn_len}",
                Section::OFFSET_NODE
            ));
        }
    }
    for array in [&section.parent_elements, &section.parent_positions].into_iter().flatten() {
        if array.dims.as_slice() != [count, 2] {
            return Err(format!(
                "{} has extents {:?}, expected [{count}, 2]",
                array.header.name,
                array.dims.as_slice()
            ));
        }
    }
    Ok(())
}

/// Extents every array of a container under `zone` must have; `None` for
/// user-defined locations, which have no derivable size.
pub(crate) fn container_extents(
    zone: &Zone,
    location: GridLocation,
    rind: Option<&[i32]>,
    ptset: Option<&PointSet>,
) -> Result<Option<Dims>, TreeError> {
    if let Some(set) = ptset {
        return Ok(Some(Dims::from_slice(&[set.size_of_patch])));
    }
    if location == GridLocation::UserDefined {
        return Ok(None);
    }
    data_size(zone.zone_type, location, zone.vertex_size(), zone.cell_size(), rind.unwrap_or(&[])).map(Some)
}

/// First array whose extents differ from `expected`.
pub(crate) fn check_extents(arrays: &[DataArray], expected: &[usize]) -> Result<(), String> {
    match arrays.iter().find(|a| a.dims.as_slice() != expected) {
        Some(array) => Err(format!(
            "array '{}' has extents {:?}, expected {expected:?}",
            array.header.name,
            array.dims.as_slice()
        )),
        None => Ok(()),
    }
}

/// Whether a container or one of its arrays still has to be stored.
fn unwritten<'a>(header: &Header, mut arrays: impl Iterator<Item = &'a DataArray>) -> bool {
    if header.in_link || header.upgraded || header.link.is_some() {
        return false;
    }
    header.id.is_none() || arrays.any(|a| a.header.id.is_none() && !a.header.upgraded)
}

/// Extent and section checks on everything under `zone` that is not in the
/// file yet. Stored content was checked when it was read.
pub(crate) fn check_unwritten(zone: &Zone) -> Result<(), TreeError> {
    if zone.header.in_link || zone.header.link.is_some() {
        return Ok(());
    }
    let extents = |label: Label,
                   header: &Header,
                   arrays: &[DataArray],
                   location: GridLocation,
                   rind: Option<&[i32]>,
                   ptset: Option<&PointSet>|
     -> Result<(), TreeError> {
        if !unwritten(header, arrays.iter()) {
            return Ok(());
        }
        if rind.is_some() && ptset.is_some() {
            return Err(TreeError::schema(label, &header.name, "rind planes and a point set are exclusive"));
        }
        match container_extents(zone, location, rind, ptset)? {
            Some(expected) => check_extents(arrays, &expected).map_err(|d| TreeError::schema(label, &header.name, d)),
            None => Ok(()),
        }
    };

    for c in &zone.coordinates {
        extents(Label::GridCoordinates, &c.header, &c.arrays, GridLocation::Vertex, c.rind.as_deref(), None)?;
    }
    for s in &zone.solutions {
        extents(Label::FlowSolution, &s.header, &s.arrays, s.location(), s.rind.as_deref(), s.ptset.as_ref())?;
    }
    for d in &zone.discrete {
        extents(Label::DiscreteData, &d.header, &d.arrays, d.location(), d.rind.as_deref(), d.ptset.as_ref())?;
    }
    for m in &zone.arbitrary_motions {
        let location = m.location.unwrap_or(GridLocation::Vertex);
        extents(Label::ArbitraryGridMotion, &m.header, &m.arrays, location, m.rind.as_deref(), None)?;
    }
    for r in zone.subregions.iter().filter(|r| r.ptset.is_some()) {
        if unwritten(&r.header, r.arrays.iter()) {
            let expected = [r.ptset.as_ref().map_or(0, |p| p.size_of_patch)];
            check_extents(&r.arrays, &expected).map_err(|d| TreeError::schema(Label::ZoneSubRegion, &r.header.name, d))?;
        }
    }
    for section in &zone.sections {
        let parts = std::iter::once(&section.connectivity)
            .chain(section.offsets.iter())
            .chain(section.parent_elements.iter())
            .chain(section.parent_positions.iter());
        if !unwritten(&section.header, parts) {
            continue;
        }
        let count = section.element_count();
        if count < 1 {
            return Err(TreeError::schema(
                Label::Elements,
                &section.header.name,
                format!("range {:?} holds no elements", section.range),
            ));
        }
        check_section(section, count as usize).map_err(|d| TreeError::schema(Label::Elements, &section.header.name, d))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshtree_core::ElementType;

    #[test]
    fn base_dims() {
        assert!(check_base_dims(3, 3).is_ok());
        assert!(check_base_dims(2, 3).is_ok());
        assert!(check_base_dims(3, 2).is_err());
        assert!(check_base_dims(0, 1).is_err());
    }

    #[test]
    fn structured_zone_needs_matching_cells() {
        let zone = Zone::structured("Block", &[3, 4, 5]);
        assert!(check_zone(&zone, 3).is_ok());
        assert!(check_zone(&zone, 2).is_err());
        let mut bad = zone.clone();
        bad.sizes[3] = 3;
        assert!(check_zone(&bad, 3).is_err());
    }

    #[test]
    fn unstructured_zone_bounds() {
        assert!(check_zone(&Zone::unstructured("U", 8, 1, 0), 3).is_ok());
        assert!(check_zone(&Zone::unstructured("U", 8, 0, 0), 3).is_err());
        assert!(check_zone(&Zone::unstructured("U", 8, 1, 9), 3).is_err());
    }

    #[test]
    fn fixed_sections_check_length() {
        let ok = Section::new("Tri", ElementType::Tri3, 1, 2, &[1, 2, 3, 2, 3, 4], None);
        assert!(check_section(&ok, 2).is_ok());
        let short = Section::new("Tri", ElementType::Tri3, 1, 2, &[1, 2, 3], None);
        assert!(check_section(&short, 2).is_err());
    }

    #[test]
    fn variable_sections_check_offsets() {
        let ngon = Section::new("Faces", ElementType::NGon, 1, 2, &[1, 2, 3, 3, 4, 1, 2], Some(&[0, 3, 7]));
        assert!(check_section(&ngon, 2).is_ok());
        let missing = Section::new("Faces", ElementType::NGon, 1, 2, &[1, 2, 3, 3, 4, 1, 2], None);
        assert!(check_section(&missing, 2).is_err());
        let falling = Section::new("Faces", ElementType::NGon, 1, 2, &[1, 2, 3, 3, 4, 1, 2], Some(&[0, 5, 3]));
        assert!(check_section(&falling, 2).is_err());
        let short = Section::new("Faces", ElementType::NGon, 1, 2, &[1, 2, 3, 3, 4, 1, 2], Some(&[0, 3, 6]));
        assert!(check_section(&short, 2).is_err());
    }

    #[test]
    fn parent_arrays_are_count_by_two() {
        let mut s = Section::new("Tri", ElementType::Tri3, 1, 1, &[1, 2, 3], None);
        s.parent_elements = Some(DataArray::new(Section::PARENT_ELEMENTS_NODE, &[1, 2], meshtree_core::Data::I4(vec![1, 0])));
        assert!(check_section(&s, 1).is_ok());
        s.parent_positions = Some(DataArray::new(Section::PARENT_POSITIONS_NODE, &[2, 1], meshtree_core::Data::I4(vec![1, 0])));
        assert!(check_section(&s, 1).is_err());
    }
}
