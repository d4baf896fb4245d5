//! Array sizing from a zone's extents and a grid location.

use meshtree_core::{Dims, GridLocation, Label, NamedEnum, TreeError, ZoneType};
use smallvec::SmallVec;

fn rind_pair(rind: &[i32], axis: usize) -> i64 {
    let lo = rind.get(2 * axis).copied().unwrap_or(0);
    let hi = rind.get(2 * axis + 1).copied().unwrap_or(0);
    (lo + hi) as i64
}

fn face_axis(location: GridLocation) -> Option<usize> {
    match location {
        GridLocation::IFaceCenter => Some(0),
        GridLocation::JFaceCenter => Some(1),
        GridLocation::KFaceCenter => Some(2),
        _ => None,
    }
}

fn unsupported(location: GridLocation, detail: &str) -> TreeError {
    TreeError::schema(Label::GridLocation, location.name(), detail)
}

/// Effective per-axis size of an array stored at `location` in a zone
/// with the given vertex and cell extents, including rind planes.
///
/// Vertex and cell-centred arrays follow the vertex and cell extents. A
/// face-normal-centred array (structured zones only) is cell-sized across
/// its normal and vertex-sized along it. Face- and edge-centred arrays
/// have no extent derivable from the zone and are rejected.
pub fn data_size(
    zone_type: ZoneType,
    location: GridLocation,
    vertex: &[i64],
    cell: &[i64],
    rind: &[i32],
) -> Result<Dims, TreeError> {
    let index_dim = vertex.len();
    if cell.len() != index_dim {
        return Err(TreeError::schema(
            Label::Zone,
            "",
            format!("vertex rank {index_dim} differs from cell rank {}", cell.len()),
        ));
    }
    let mut dims: Dims = SmallVec::with_capacity(index_dim);
    match location {
        GridLocation::Vertex => {
            for axis in 0..index_dim {
                dims.push((vertex[axis] + rind_pair(rind, axis)) as usize);
            }
        }
        GridLocation::CellCenter => {
            for axis in 0..index_dim {
                dims.push((cell[axis] + rind_pair(rind, axis)) as usize);
            }
        }
        GridLocation::IFaceCenter | GridLocation::JFaceCenter | GridLocation::KFaceCenter => {
            if zone_type != ZoneType::Structured {
                return Err(unsupported(location, "face-normal location needs a structured zone"));
            }
            let normal = face_axis(location).unwrap_or(0);
            if normal >= index_dim {
                return Err(unsupported(location, "face normal exceeds the index dimension"));
            }
            for axis in 0..index_dim {
                let base = if axis == normal { cell[axis] + 1 } else { cell[axis] };
                dims.push((base + rind_pair(rind, axis)) as usize);
            }
        }
        _ => return Err(unsupported(location, "location has no zone-derived size")),
    }
    Ok(dims)
}

/// Whether `location` is legal for data in a zone of this type and index
/// dimension.
pub fn check_location(
    zone_type: ZoneType,
    index_dim: usize,
    location: GridLocation,
) -> Result<(), TreeError> {
    let ok = match location {
        GridLocation::Vertex
        | GridLocation::CellCenter
        | GridLocation::FaceCenter
        | GridLocation::EdgeCenter => true,
        GridLocation::IFaceCenter => zone_type == ZoneType::Structured,
        GridLocation::JFaceCenter => zone_type == ZoneType::Structured && index_dim >= 2,
        GridLocation::KFaceCenter => zone_type == ZoneType::Structured && index_dim >= 3,
        GridLocation::Null | GridLocation::UserDefined => false,
    };
    if ok {
        Ok(())
    } else {
        Err(unsupported(
            location,
            &format!("not a valid location in a {zone_type} zone of index dimension {index_dim}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_and_cell_add_rind() {
        let v = data_size(ZoneType::Structured, GridLocation::Vertex, &[5, 4], &[4, 3], &[1, 1, 0, 2])
            .unwrap();
        assert_eq!(v.as_slice(), &[7, 6]);
        let c = data_size(ZoneType::Structured, GridLocation::CellCenter, &[5, 4], &[4, 3], &[])
            .unwrap();
        assert_eq!(c.as_slice(), &[4, 3]);
    }

    #[test]
    fn face_center_is_vertex_sized_along_normal() {
        let j = data_size(ZoneType::Structured, GridLocation::JFaceCenter, &[5, 4, 3], &[4, 3, 2], &[])
            .unwrap();
        assert_eq!(j.as_slice(), &[4, 4, 2]);
    }

    #[test]
    fn face_center_rejected_in_unstructured_and_low_rank() {
        assert!(data_size(ZoneType::Unstructured, GridLocation::IFaceCenter, &[10], &[4], &[]).is_err());
        assert!(data_size(ZoneType::Structured, GridLocation::KFaceCenter, &[5, 4], &[4, 3], &[]).is_err());
        assert!(data_size(ZoneType::Structured, GridLocation::FaceCenter, &[5, 4], &[4, 3], &[]).is_err());
    }

    #[test]
    fn locations_by_zone_type() {
        assert!(check_location(ZoneType::Unstructured, 1, GridLocation::FaceCenter).is_ok());
        assert!(check_location(ZoneType::Unstructured, 1, GridLocation::IFaceCenter).is_err());
        assert!(check_location(ZoneType::Structured, 2, GridLocation::KFaceCenter).is_err());
        assert!(check_location(ZoneType::Structured, 3, GridLocation::Null).is_err());
    }
}
