//! Boundary conditions and their datasets.

use meshtree_core::{BCDataType, Label, NodeId, PointSetType, TreeError};
use meshtree_model::{
    Area, BCData, BCDataSet, BCProperty, DataSetPoints, EntityKind, WallFunction, ZoneBC, BC,
};
use meshtree_store::NodeStore;

use super::{Reader, Scope};

const BC_SETS: [PointSetType; 4] = [
    PointSetType::PointRange,
    PointSetType::PointList,
    PointSetType::ElementRange,
    PointSetType::ElementList,
];

const DATASET_SETS: [PointSetType; 2] = [PointSetType::PointRange, PointSetType::PointList];

impl<S: NodeStore + ?Sized> Reader<'_, S> {
    pub(super) fn zone_bc(&self, id: NodeId, scope: &Scope) -> Result<ZoneBC, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let mut bcs = Vec::new();
        for bc in self.children(id, Label::BC)? {
            bcs.push(self.bc(bc, &inner)?);
        }
        Ok(ZoneBC {
            bcs,
            state: self.opt_state(id, &inner)?,
            meta: self.meta(id, EntityKind::ZoneBC, &inner, &[])?,
            header,
        })
    }

    fn bc(&self, id: NodeId, scope: &Scope) -> Result<BC, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let ptset = self.ptset_among(id, &BC_SETS, &inner)?;
        if ptset.is_none() {
            return Err(TreeError::schema(Label::BC, &header.name, "missing point set"));
        }
        let normal_index =
            self.opt_named_ints(id, Label::IntIndexDimension, BC::NORMAL_INDEX_NODE)?;
        if let Some(normal) = &normal_index {
            if normal.len() != inner.index_dim() {
                return Err(TreeError::schema(
                    Label::BC,
                    &header.name,
                    format!(
                        "{} holds {} values, expected {}",
                        BC::NORMAL_INDEX_NODE,
                        normal.len(),
                        inner.index_dim()
                    ),
                ));
            }
        }
        let mut datasets = Vec::new();
        for ds in self.children(id, Label::BCDataSet)? {
            datasets.push(self.dataset(ds, &inner)?);
        }
        Ok(BC {
            bc_type: self.enum_value(id, Label::BC)?,
            ptset,
            location: self.location(id, &inner)?,
            normal_index,
            normal_list: self
                .named(id, Label::IndexArray, BC::NORMAL_LIST_NODE)?
                .map(|n| self.array(n, inner.in_link))
                .transpose()?,
            family: self.opt_text(id, Label::FamilyName)?,
            additional_families: self.additional_families(id, inner.in_link)?,
            datasets,
            property: self
                .single(id, Label::BCProperty)?
                .map(|p| self.bc_property(p, &inner))
                .transpose()?,
            state: self.opt_state(id, &inner)?,
            ordinal: self.opt_scalar(id, Label::Ordinal)?,
            meta: self.meta(id, EntityKind::BC, &inner, &[])?,
            header,
        })
    }

    /// A `BCDataSet_t` or `FamilyBCDataSet_t` node.
    pub(super) fn dataset(&self, id: NodeId, scope: &Scope) -> Result<BCDataSet, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let mut dirichlet = None;
        let mut neumann = None;
        for data in self.children(id, Label::BCData)? {
            let name = self.store.name(data)?;
            let slot = match BCData::kind_of(&name) {
                Some(BCDataType::Dirichlet) => &mut dirichlet,
                Some(BCDataType::Neumann) => &mut neumann,
                _ => {
                    return Err(TreeError::schema(
                        Label::BCDataSet,
                        &header.name,
                        format!("unexpected BCData_t child '{name}'"),
                    ))
                }
            };
            *slot = Some(self.container(data, &inner, EntityKind::BCData, |header, arrays, meta| {
                BCData {
                    header,
                    arrays,
                    meta,
                }
            })?);
        }
        Ok(BCDataSet {
            bc_type: self.enum_value(id, Label::BCDataSet)?,
            dirichlet,
            neumann,
            ptset: match self.ptset_among(id, &DATASET_SETS, &inner)? {
                Some(set) => DataSetPoints::Own(set),
                None => DataSetPoints::Inherited,
            },
            location: self.location(id, &inner)?,
            state: self.opt_state(id, &inner)?,
            meta: self.meta(id, EntityKind::BCDataSet, &inner, &[])?,
            header,
        })
    }

    fn bc_property(&self, id: NodeId, scope: &Scope) -> Result<BCProperty, TreeError> {
        let header = self.header(id, scope.in_link)?;
        let inner = scope.below(&header);
        let wall_function = match self.single(id, Label::WallFunction)? {
            None => None,
            Some(wf) => {
                let wf_header = self.header(wf, inner.in_link)?;
                let wf_scope = inner.below(&wf_header);
                let type_id =
                    self.required(wf, Label::WallFunctionType, Label::WallFunction, &wf_header.name)?;
                Some(WallFunction {
                    function_type: self.enum_value(type_id, Label::WallFunctionType)?,
                    meta: self.meta(wf, EntityKind::WallFunction, &wf_scope, &[])?,
                    header: wf_header,
                })
            }
        };
        let area = match self.single(id, Label::Area)? {
            None => None,
            Some(a) => {
                let area_header = self.header(a, inner.in_link)?;
                let area_scope = inner.below(&area_header);
                let type_id = self.required(a, Label::AreaType, Label::Area, &area_header.name)?;
                Some(Area {
                    area_type: self.enum_value(type_id, Label::AreaType)?,
                    arrays: self.arrays(a, &area_scope, &[])?,
                    meta: self.meta(a, EntityKind::Area, &area_scope, &[])?,
                    header: area_header,
                })
            }
        };
        Ok(BCProperty {
            wall_function,
            area,
            meta: self.meta(id, EntityKind::BCProperty, &inner, &[])?,
            header,
        })
    }
}
