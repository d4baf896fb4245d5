//! Benchmark profiles for the meshtree persistence layer.
//!
//! - [`reference_profile`]: one base of 8 structured blocks of 33^3
//!   vertices with coordinates and a cell-centered solution
//! - [`section_profile`]: one unstructured zone with a large tetra section
//!   and a polygon section

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use meshtree_core::{Data, ElementType, GridLocation};
use meshtree_model::{Base, DataArray, FlowSolution, GridCoordinates, Section, Zone};
use meshtree_test_utils::ramp;

/// Vertices per axis of a reference block.
pub const BLOCK_EDGE: i64 = 33;

/// Build `blocks` structured blocks of [`BLOCK_EDGE`]^3 vertices, each
/// with three coordinate arrays and a cell-centered `Density`.
pub fn reference_profile(blocks: usize) -> Base {
    let mut base = Base::new("Base", 3, 3);
    let vertex = [BLOCK_EDGE; 3];
    let dims = [BLOCK_EDGE as usize; 3];
    let cells = [BLOCK_EDGE as usize - 1; 3];
    for b in 0..blocks {
        let mut zone = Zone::structured(format!("Block{b}"), &vertex);
        let mut grid = GridCoordinates::new(GridCoordinates::DEFAULT_NAME);
        for axis in ["CoordinateX", "CoordinateY", "CoordinateZ"] {
            grid.arrays
                .push(DataArray::new(axis, &dims, ramp(b as f64, dims.iter().product())));
        }
        zone.coordinates.push(grid);
        let mut solution = FlowSolution::new("Solution", GridLocation::CellCenter);
        solution
            .arrays
            .push(DataArray::new("Density", &cells, ramp(1.0, cells.iter().product())));
        zone.solutions.push(solution);
        base.zones.push(zone);
    }
    base
}

/// One unstructured zone holding `tets` tetrahedra and `tets` triangles
/// stored as `NGON_n`.
pub fn section_profile(tets: usize) -> Base {
    let mut base = Base::new("Base", 3, 3);
    let vertices = tets as i64 + 3;
    let mut zone = Zone::unstructured("Mesh", vertices, tets as i64, 0);

    let conn: Vec<i64> = (0..tets as i64).flat_map(|e| [e + 1, e + 2, e + 3, e + 4]).collect();
    zone.sections
        .push(Section::new("Tets", ElementType::Tetra4, 1, tets as i64, &conn, None));

    let faces: Vec<i64> = (0..tets as i64).flat_map(|e| [e + 1, e + 2, e + 3]).collect();
    let offsets: Vec<i64> = (0..=tets as i64).map(|e| 3 * e).collect();
    let start = tets as i64 + 1;
    zone.sections.push(Section::new(
        "Faces",
        ElementType::NGon,
        start,
        start + tets as i64 - 1,
        &faces,
        Some(&offsets),
    ));
    base.zones.push(zone);
    base
}

/// `n` doubles as a flat buffer.
pub fn buffer(n: usize) -> Data {
    ramp(0.0, n)
}
