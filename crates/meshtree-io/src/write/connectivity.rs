//! Grid connectivity: 1-to-1 interfaces, general interfaces and overset
//! holes.

use meshtree_core::{Data, DataType, Label, NodeId, TreeError};
use meshtree_model::{
    GridConnectivity, GridConnectivity1to1, GridConnectivityProperty, OversetHoles,
    ZoneGridConnectivity,
};
use meshtree_store::NodeStore;

use super::Writer;

impl<S: NodeStore + ?Sized> Writer<'_, S> {
    pub(crate) fn zone_connectivity(
        &mut self,
        parent: NodeId,
        zgc: &mut ZoneGridConnectivity,
    ) -> Result<(), TreeError> {
        let entry = self.enter_empty(parent, &mut zgc.header, Label::ZoneGridConnectivity)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        for gc in &mut zgc.one_to_one {
            self.one_to_one(id, gc)?;
        }
        for gc in &mut zgc.general {
            self.general(id, gc)?;
        }
        for holes in &mut zgc.holes {
            self.holes(id, holes)?;
        }
        self.meta(id, &mut zgc.meta, entry.is_fresh())
    }

    pub(crate) fn one_to_one(&mut self, parent: NodeId, gc: &mut GridConnectivity1to1) -> Result<(), TreeError> {
        let data = Data::text(&gc.donor);
        let entry = self.enter(
            parent,
            &mut gc.header,
            Label::GridConnectivity1to1,
            DataType::Char,
            &[data.len()],
            Some(&data),
        )?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            if !gc.transform.is_empty() {
                self.ints_node(id, GridConnectivity1to1::TRANSFORM_NODE, Label::IntIndexDimension, &gc.transform)?;
            }
            self.ordinal(id, gc.ordinal)?;
        }
        self.ptset(id, &mut gc.range)?;
        self.ptset(id, &mut gc.donor_range)?;
        if let Some(prop) = &mut gc.property {
            self.gc_property(id, prop)?;
        }
        self.meta(id, &mut gc.meta, entry.is_fresh())
    }

    pub(crate) fn general(&mut self, parent: NodeId, gc: &mut GridConnectivity) -> Result<(), TreeError> {
        let data = Data::text(&gc.donor);
        let entry = self.enter(
            parent,
            &mut gc.header,
            Label::GridConnectivity,
            DataType::Char,
            &[data.len()],
            Some(&data),
        )?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            self.opt_enum(id, Label::GridConnectivityType, gc.connectivity_type)?;
            self.location(id, gc.location)?;
            self.ordinal(id, gc.ordinal)?;
        }
        self.opt_ptset(id, gc.ptset.as_mut())?;
        self.opt_ptset(id, gc.donor_ptset.as_mut())?;
        self.arrays(id, &mut gc.interpolants)?;
        if let Some(prop) = &mut gc.property {
            self.gc_property(id, prop)?;
        }
        self.meta(id, &mut gc.meta, entry.is_fresh())
    }

    fn gc_property(&mut self, parent: NodeId, prop: &mut GridConnectivityProperty) -> Result<(), TreeError> {
        let entry = self.enter_empty(parent, &mut prop.header, Label::GridConnectivityProperty)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if let Some(p) = &mut prop.periodic {
            self.container(id, &mut p.header, Label::Periodic, &mut p.arrays, &mut p.meta)?;
        }
        if let Some(avg) = &mut prop.average {
            let avg_entry = self.enter_empty(id, &mut avg.header, Label::AverageInterface)?;
            if let Some(avg_id) = avg_entry.id() {
                if avg_entry.is_fresh() {
                    self.enum_node(avg_id, Label::AverageInterfaceType, avg.interface_type)?;
                }
                self.meta(avg_id, &mut avg.meta, avg_entry.is_fresh())?;
            }
        }
        self.meta(id, &mut prop.meta, entry.is_fresh())
    }

    pub(crate) fn holes(&mut self, parent: NodeId, holes: &mut OversetHoles) -> Result<(), TreeError> {
        let entry = self.enter_empty(parent, &mut holes.header, Label::OversetHoles)?;
        let Some(id) = entry.id() else {
            return Ok(());
        };
        if entry.is_fresh() {
            self.location(id, holes.location)?;
        }
        for set in &mut holes.ptsets {
            self.ptset(id, set)?;
        }
        self.meta(id, &mut holes.meta, entry.is_fresh())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshtree_core::{FileMode, PointSetType};
    use meshtree_model::{Header, PointSet};
    use meshtree_store::{BackendFlavor, MemoryStore};

    #[test]
    fn one_to_one_writes_donor_and_both_ranges() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let root = store.open_file("gc.cgns", FileMode::Write).unwrap();
        let mut zgc = ZoneGridConnectivity::new();
        zgc.one_to_one.push(GridConnectivity1to1 {
            header: Header::new("Match"),
            donor: "Right".into(),
            transform: vec![1, 2],
            range: PointSet::range(PointSetType::PointRange, &[3, 1], &[3, 4]),
            donor_range: PointSet::range(PointSetType::PointRangeDonor, &[1, 1], &[1, 4]),
            ..GridConnectivity1to1::default()
        });
        Writer::new(&mut store, FileMode::Write, root)
            .zone_connectivity(root, &mut zgc)
            .unwrap();

        let gc = zgc.one_to_one[0].header.id.unwrap();
        assert_eq!(store.read_all(gc, DataType::Char).unwrap(), Some(Data::text("Right")));
        let t = store.child_by_name(gc, "Transform").unwrap().unwrap();
        assert_eq!(store.label(t).unwrap(), "int[IndexDimension]");
        assert!(store.child_by_name(gc, "PointRange").unwrap().is_some());
        assert!(store.child_by_name(gc, "PointRangeDonor").unwrap().is_some());
        assert_eq!(zgc.one_to_one[0].donor_range.size_of_patch, 4);
    }

    #[test]
    fn holes_take_every_range() {
        let mut store = MemoryStore::new(BackendFlavor::Modern);
        let root = store.open_file("h.cgns", FileMode::Write).unwrap();
        let mut a = PointSet::range(PointSetType::PointRange, &[1, 1], &[2, 2]);
        a.header.name = "PointRange1".into();
        let mut b = PointSet::range(PointSetType::PointRange, &[4, 4], &[5, 5]);
        b.header.name = "PointRange2".into();
        let mut holes = OversetHoles {
            header: Header::new("Hole"),
            ptsets: vec![a, b],
            ..OversetHoles::default()
        };
        Writer::new(&mut store, FileMode::Write, root).holes(root, &mut holes).unwrap();
        let id = holes.header.id.unwrap();
        assert_eq!(store.number_of_children(id).unwrap(), 2);
        assert_eq!(holes.point_count(), 8);
    }
}
