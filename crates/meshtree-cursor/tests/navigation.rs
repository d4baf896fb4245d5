//! Navigation properties over a small two-zone tree.

use meshtree_core::{BCType, Data, ElementType, GridLocation, Label, PointSetType, TreeError};
use meshtree_cursor::Cursor;
use meshtree_model::{
    schema, BCDataSet, Base, DataArray, EntityKind, File, FlowSolution, PointSet, Section,
    Selector, Zone, ZoneBC, BC,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────

fn tree() -> File {
    let mut file = File::new("nav.cgns");
    let mut base = Base::new("Base", 3, 3);
    for z in 1..=2 {
        let mut zone = Zone::unstructured(format!("Zone{z}"), 8, 3, 0);
        for s in 1..=3 {
            zone.sections.push(Section::new(
                format!("Sec{s}"),
                ElementType::Bar2,
                s,
                s,
                &[1, 2],
                None,
            ));
        }
        let mut sol = FlowSolution::new("Sol", GridLocation::Vertex);
        sol.arrays
            .push(DataArray::vector("Density", Data::R8(vec![1.0; 8])));
        zone.solutions.push(sol);
        let mut bc = BC::new(
            "Wall",
            BCType::BCWall,
            PointSet::list(PointSetType::PointList, 1, vec![1, 2]),
        );
        bc.datasets.push(BCDataSet::new("WallData", BCType::BCWall));
        let mut zbc = ZoneBC::new();
        zbc.bcs.push(bc);
        zone.bc = Some(zbc);
        base.zones.push(zone);
    }
    file.bases.push(base);
    file
}

#[derive(Clone, Debug)]
enum Step {
    Zone(usize),
    Section(usize),
    Solution,
    Array,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (1usize..=2).prop_map(Step::Zone),
        (1usize..=3).prop_map(Step::Section),
        Just(Step::Solution),
        Just(Step::Array),
    ]
}

fn apply(cursor: &mut Cursor, file: &mut File, step: &Step) -> Result<(), TreeError> {
    let (label, sel): (Label, Selector) = match step {
        Step::Zone(i) => (Label::Zone, (*i).into()),
        Step::Section(i) => (Label::Elements, (*i).into()),
        Step::Solution => (Label::FlowSolution, "Sol".into()),
        Step::Array => (Label::DataArray, 1.into()),
    };
    cursor.advance(file, label, &sel)
}

// ── Properties ──────────────────────────────────────────────────

#[test]
fn zone_section_up_up_returns_to_root() {
    let mut file = tree();
    let mut cursor = Cursor::new();
    cursor.set(&file, 1).unwrap();
    let root = cursor.clone();
    cursor.advance(&mut file, Label::Zone, &1.into()).unwrap();
    cursor.advance(&mut file, Label::Elements, &2.into()).unwrap();
    cursor.up().unwrap();
    cursor.up().unwrap();
    assert_eq!(cursor, root);
}

#[test]
fn deep_path_through_boundary_conditions() {
    let mut file = tree();
    let mut cursor = Cursor::new();
    cursor
        .goto_path(&mut file, "/Base/Zone2/ZoneBC/Wall/WallData")
        .unwrap();
    let resolved = cursor.resolve(&mut file).unwrap();
    assert_eq!(resolved.entity.label(), Label::BCDataSet);
    assert_eq!(resolved.ctx.zone.map(|z| z.name), Some("Zone2".to_owned()));
}

proptest! {
    #[test]
    fn every_step_succeeds_or_fails_cleanly(steps in prop::collection::vec(step(), 0..8)) {
        let mut file = tree();
        let mut cursor = Cursor::new();
        cursor.set(&file, 1).unwrap();
        let mut pushed = 0usize;
        for s in &steps {
            let depth = cursor.depth();
            match apply(&mut cursor, &mut file, s) {
                Ok(()) => {
                    prop_assert_eq!(cursor.depth(), depth + 1);
                    pushed += 1;
                }
                Err(TreeError::IncorrectPath { .. }) | Err(TreeError::NotFound { .. }) => {
                    prop_assert_eq!(cursor.depth(), depth);
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }
        for _ in 0..pushed {
            cursor.up().unwrap();
        }
        prop_assert_eq!(cursor.path(), "/Base".to_owned());
        prop_assert!(cursor.up().is_err());
    }

    #[test]
    fn unrelated_labels_are_incorrect_paths(label_index in 0usize..Label::ALL.len()) {
        let label = Label::ALL[label_index];
        let mut file = tree();
        let mut cursor = Cursor::new();
        cursor.goto_path(&mut file, "/Base/Zone1/Sec1").unwrap();
        let result = cursor.advance(&mut file, label, &1.into());
        let related = EntityKind::from_label(label).is_some()
            && schema::admits(EntityKind::Section, label);
        if related {
            let ok_or_absent = matches!(result, Ok(()) | Err(TreeError::NotFound { .. }));
            prop_assert!(ok_or_absent);
        } else {
            let is_incorrect_path = matches!(result, Err(TreeError::IncorrectPath { .. }));
            prop_assert!(is_incorrect_path);
        }
    }
}
