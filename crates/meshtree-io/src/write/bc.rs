//! Boundary conditions, their datasets and properties.

use meshtree_core::{Data, DataType, Label, NamedEnum, NodeId, TreeError};
use meshtree_model::{BCDataSet, BCProperty, DataSetPoints, ZoneBC, BC};
use meshtree_store::NodeStore;

use super::Writer;

impl<S: NodeStore + ?Sized> Writer<'_, S> {
    pub(crate) fn zone_bc(&mut self, parent: NodeId, zbc: &mut ZoneBC) -> Result<(), TreeError> {
        let entry = self.enter_empty(parent, &mut zbc.header, Label::ZoneBC)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        for bc in &mut zbc.bcs {
            self.bc(id, bc)?;
        }
        self.opt_state(id, zbc.state.as_mut())?;
        self.meta(id, &mut zbc.meta, entry.is_fresh())
    }

    pub(crate) fn bc(&mut self, parent: NodeId, bc: &mut BC) -> Result<(), TreeError> {
        let data = Data::text(bc.bc_type.name());
        let entry = self.enter(parent, &mut bc.header, Label::BC, DataType::Char, &[data.len()], Some(&data))?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            self.location(id, bc.location)?;
            if let Some(normal) = &bc.normal_index {
                self.ints_node(id, BC::NORMAL_INDEX_NODE, Label::IntIndexDimension, normal)?;
            }
            self.family_name(id, bc.family.as_deref())?;
            self.ordinal(id, bc.ordinal)?;
        }
        self.opt_ptset(id, bc.ptset.as_mut())?;
        if let Some(list) = &mut bc.normal_list {
            self.array(id, list, Label::IndexArray)?;
        }
        self.additional_families(id, &mut bc.additional_families)?;
        for ds in &mut bc.datasets {
            self.dataset(id, ds, Label::BCDataSet)?;
        }
        if let Some(prop) = &mut bc.property {
            self.bc_property(id, prop)?;
        }
        self.opt_state(id, bc.state.as_mut())?;
        self.meta(id, &mut bc.meta, entry.is_fresh())
    }

    /// A dataset under a boundary condition or a family BC (`label` picks
    /// which).
    pub(crate) fn dataset(&mut self, parent: NodeId, ds: &mut BCDataSet, label: Label) -> Result<(), TreeError> {
        let data = Data::text(ds.bc_type.name());
        let entry = self.enter(parent, &mut ds.header, label, DataType::Char, &[data.len()], Some(&data))?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            self.location(id, ds.location)?;
        }
        if let DataSetPoints::Own(set) = &mut ds.ptset {
            self.ptset(id, set)?;
        }
        for block in [ds.dirichlet.as_mut(), ds.neumann.as_mut()].into_iter().flatten() {
            self.container(id, &mut block.header, Label::BCData, &mut block.arrays, &mut block.meta)?;
        }
        self.opt_state(id, ds.state.as_mut())?;
        self.meta(id, &mut ds.meta, entry.is_fresh())
    }

    fn bc_property(&mut self, parent: NodeId, prop: &mut BCProperty) -> Result<(), TreeError> {
        let entry = self.enter_empty(parent, &mut prop.header, Label::BCProperty)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if let Some(wf) = &mut prop.wall_function {
            let wf_entry = self.enter_empty(id, &mut wf.header, Label::WallFunction)?;
            if let Some(wf_id) = wf_entry.id() {
                if wf_entry.is_fresh() {
                    self.enum_node(wf_id, Label::WallFunctionType, wf.function_type)?;
                }
                self.meta(wf_id, &mut wf.meta, wf_entry.is_fresh())?;
            }
        }
        if let Some(area) = &mut prop.area {
            let area_entry = self.enter_empty(id, &mut area.header, Label::Area)?;
            if let Some(area_id) = area_entry.id() {
                if area_entry.is_fresh() {
                    self.enum_node(area_id, Label::AreaType, area.area_type)?;
                }
                self.arrays(area_id, &mut area.arrays)?;
                self.meta(area_id, &mut area.meta, area_entry.is_fresh())?;
            }
        }
        self.meta(id, &mut prop.meta, entry.is_fresh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshtree_core::{BCDataType, BCType, FileMode, PointSetType};
    use meshtree_model::{BCData, PointSet};
    use meshtree_store::{BackendFlavor, MemoryStore};

    #[test]
    fn bc_with_dataset_and_own_points() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let root = store.open_file("bc.cgns", FileMode::Write).unwrap();
        let mut zbc = ZoneBC::new();
        let mut bc = BC::new(
            "Wall",
            BCType::BCWall,
            PointSet::range(PointSetType::PointRange, &[1, 1], &[4, 1]),
        );
        let mut ds = BCDataSet::new("Heat", BCType::BCWall);
        ds.ptset = DataSetPoints::Own(PointSet::list(PointSetType::PointList, 2, vec![1, 1, 2, 1]));
        ds.dirichlet = Some(BCData {
            header: meshtree_model::Header::new(BCData::node_name(BCDataType::Dirichlet).unwrap()),
            ..BCData::default()
        });
        bc.datasets.push(ds);
        zbc.bcs.push(bc);

        Writer::new(&mut store, FileMode::Write, root).zone_bc(root, &mut zbc).unwrap();

        let bc_id = zbc.bcs[0].header.id.unwrap();
        assert_eq!(store.read_all(bc_id, DataType::Char).unwrap(), Some(Data::text("BCWall")));
        assert!(store.child_by_name(bc_id, "PointRange").unwrap().is_some());
        let ds = &zbc.bcs[0].datasets[0];
        let ds_id = ds.header.id.unwrap();
        assert_eq!(store.label(ds_id).unwrap(), "BCDataSet_t");
        assert!(store.child_by_name(ds_id, "PointList").unwrap().is_some());
        let block = store.child_by_name(ds_id, "DirichletData").unwrap().unwrap();
        assert_eq!(store.label(block).unwrap(), "BCData_t");
    }
}
