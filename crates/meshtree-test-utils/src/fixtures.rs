//! Ready-made trees.
//!
//! Every entity is new (no store handle), so adding a fixture base to an
//! open session and flushing writes the whole subtree.

use meshtree_core::{BCType, Data, DataType, ElementType, GridLocation, NamedEnum, PointSetType};
use meshtree_model::{
    Base, DataArray, FlowSolution, GridConnectivity1to1, GridCoordinates, Header, PointSet, Section,
    Zone, ZoneBC, ZoneGridConnectivity, BC,
};

use crate::ramp;

/// Vertex counts of each block of [`structured_two_zone`].
pub const BLOCK_VERTICES: [i64; 3] = [3, 3, 2];

fn block(name: &str, x0: f64) -> Zone {
    let mut zone = Zone::structured(name, &BLOCK_VERTICES);
    let dims: Vec<usize> = BLOCK_VERTICES.iter().map(|&v| v as usize).collect();
    let n = dims.iter().product();

    let mut grid = GridCoordinates::new(GridCoordinates::DEFAULT_NAME);
    for (axis, start) in [("CoordinateX", x0), ("CoordinateY", 0.0), ("CoordinateZ", 0.0)] {
        grid.arrays.push(DataArray::new(axis, &dims, ramp(start, n)));
    }
    zone.coordinates.push(grid);

    let mut solution = FlowSolution::new("Solution", GridLocation::CellCenter);
    solution
        .arrays
        .push(DataArray::new("Density", &[2, 2, 1], Data::R8(vec![1.0, 1.1, 1.2, 1.3])));
    zone.solutions.push(solution);
    zone
}

/// Base `Base` (3-D) with structured blocks `Left` and `Right` of
/// [`BLOCK_VERTICES`] each, joined face to face by a 1-to-1 interface.
///
/// `Left` carries an inflow BC on its `i = 1` face; both blocks carry
/// coordinates and a cell-centered `Density`.
pub fn structured_two_zone() -> Base {
    let mut base = Base::new("Base", 3, 3);
    let mut left = block("Left", 0.0);
    let right = block("Right", 2.0);

    let mut bc = ZoneBC::new();
    bc.bcs.push(BC::new(
        "Inlet",
        BCType::BCInflow,
        PointSet::range(PointSetType::PointRange, &[1, 1, 1], &[1, 3, 2]),
    ));
    left.bc = Some(bc);

    let mut gc = ZoneGridConnectivity::new();
    gc.one_to_one.push(GridConnectivity1to1 {
        header: Header::new("Left_to_Right"),
        donor: "Right".to_owned(),
        transform: vec![1, 2, 3],
        range: PointSet::range(PointSetType::PointRange, &[3, 1, 1], &[3, 3, 2]),
        donor_range: PointSet::range(PointSetType::PointRangeDonor, &[1, 1, 1], &[1, 3, 2]),
        ..GridConnectivity1to1::default()
    });
    left.connectivity.push(gc);

    base.zones.push(left);
    base.zones.push(right);
    base
}

/// Base `Base` (3-D) with one unstructured zone `Mesh` of 7 vertices:
///
/// | Section     | Type      | Elements | Notes                      |
/// |-------------|-----------|----------|----------------------------|
/// | `Cells`     | `MIXED`   | 1..=2    | one tetra, one pyramid     |
/// | `Faces`     | `TRI_3`   | 3..=4    | boundary, parent elements  |
/// | `Polygons`  | `NGON_n`  | 5..=6    | a triangle and a quad      |
/// | `Polyhedra` | `NFACE_n` | 7..=7    | bounded by both polygons   |
pub fn unstructured_mixed() -> Base {
    let mut base = Base::new("Base", 3, 3);
    let mut zone = Zone::unstructured("Mesh", 7, 3, 0);

    let tetra = ElementType::Tetra4.code() as i64;
    let pyra = ElementType::Pyra5.code() as i64;
    zone.sections.push(Section::new(
        "Cells",
        ElementType::Mixed,
        1,
        2,
        &[tetra, 1, 2, 3, 4, pyra, 2, 3, 5, 6, 7],
        Some(&[0, 5, 11]),
    ));

    let mut faces = Section::new("Faces", ElementType::Tri3, 3, 4, &[1, 2, 3, 2, 3, 5], None);
    faces.boundary = 2;
    faces.parent_elements = Some(DataArray::new(
        Section::PARENT_ELEMENTS_NODE,
        &[2, 2],
        Data::index(&[1, 2, 0, 0], DataType::Int32),
    ));
    faces.parent_positions = Some(DataArray::new(
        Section::PARENT_POSITIONS_NODE,
        &[2, 2],
        Data::index(&[1, 4, 0, 0], DataType::Int32),
    ));
    zone.sections.push(faces);

    zone.sections.push(Section::new(
        "Polygons",
        ElementType::NGon,
        5,
        6,
        &[1, 2, 3, 2, 3, 5, 6],
        Some(&[0, 3, 7]),
    ));
    zone.sections.push(Section::new(
        "Polyhedra",
        ElementType::NFace,
        7,
        7,
        &[5, -6],
        Some(&[0, 2]),
    ));

    base.zones.push(zone);
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_fixture_is_consistent() {
        let base = structured_two_zone();
        assert_eq!(base.zones.len(), 2);
        let left = &base.zones[0];
        assert_eq!(left.vertex_size(), BLOCK_VERTICES);
        assert_eq!(left.coordinates[0].arrays[0].len(), 18);
        assert_eq!(left.bc.as_ref().map(|bc| bc.bcs.len()), Some(1));
        assert!(left.connectivity[0].one_to_one[0].transform_is_valid());
    }

    #[test]
    fn unstructured_fixture_offsets_close() {
        let base = unstructured_mixed();
        for section in &base.zones[0].sections {
            if let Some(offsets) = &section.offsets {
                let last = offsets.index_values().and_then(|v| v.last().copied());
                assert_eq!(last, Some(section.connectivity.len() as i64), "{}", section.header.name);
            }
        }
    }

    #[test]
    fn mixed_runs_start_with_element_codes() {
        let base = unstructured_mixed();
        let conn = base.zones[0].sections[0].connectivity.index_values().unwrap();
        assert_eq!(conn[0], ElementType::Tetra4.code() as i64);
        assert_eq!(conn[5], ElementType::Pyra5.code() as i64);
    }
}
