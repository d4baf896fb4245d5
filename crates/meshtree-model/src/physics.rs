//! Reference state, equation set and other base- or zone-level physics.

use meshtree_core::{Data, GoverningEquationsType, Label, ModelType};

use crate::feature::{DataArray, Descriptor};
use crate::header::{impl_named, Header, Meta};

macro_rules! fixed_container {
    ($(#[$doc:meta])* $name:ident => $node:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $name {
            /// Identity.
            pub header: Header,
            /// Arrays.
            pub arrays: Vec<DataArray>,
            /// Descriptors, data class, units and user data.
            pub meta: Meta,
        }

        impl $name {
            /// Fixed node name.
            pub const NODE_NAME: &'static str = $node;

            /// An empty container.
            pub fn new() -> Self {
                Self {
                    header: Header::new(Self::NODE_NAME),
                    ..Self::default()
                }
            }
        }
    };
}

fixed_container! {
    /// Axisymmetry description (`AxisymmetryReferencePoint`,
    /// `AxisymmetryAxisVector`, ...).
    Axisymmetry => "Axisymmetry"
}

fixed_container! {
    /// Rotating frame (`RotationCenter`, `RotationRateVector`).
    RotatingCoordinates => "RotatingCoordinates"
}

/// Reference quantities.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceState {
    /// Identity (named `ReferenceState`).
    pub header: Header,
    /// Free-text description.
    pub description: Option<Descriptor>,
    /// Reference quantities.
    pub arrays: Vec<DataArray>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl ReferenceState {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "ReferenceState";
    /// Name of the description descriptor.
    pub const DESCRIPTION_NODE: &'static str = "ReferenceStateDescription";

    /// An empty state.
    pub fn new() -> Self {
        Self {
            header: Header::new(Self::NODE_NAME),
            ..Self::default()
        }
    }
}

/// Gravity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Gravity {
    /// Identity (named `Gravity`).
    pub header: Header,
    /// Holds `GravityVector`, `phys_dim` reals.
    pub arrays: Vec<DataArray>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl Gravity {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "Gravity";
    /// Name of the vector array.
    pub const VECTOR_NODE: &'static str = "GravityVector";

    /// Gravity along `vector`.
    pub fn new(vector: &[f32]) -> Self {
        Self {
            header: Header::new(Self::NODE_NAME),
            arrays: vec![DataArray::vector(
                Self::VECTOR_NODE,
                Data::R4(vector.to_vec()),
            )],
            meta: Meta::default(),
        }
    }

    /// The gravity vector array.
    pub fn vector(&self) -> Option<&DataArray> {
        self.arrays.iter().find(|a| a.header.name == Self::VECTOR_NODE)
    }
}

/// Convergence history.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConvergenceHistory {
    /// Identity (`GlobalConvergenceHistory` or `ZoneConvergenceHistory`).
    pub header: Header,
    /// Number of recorded iterations.
    pub iterations: i32,
    /// Definition of the recorded norms.
    pub norm_definitions: Option<Descriptor>,
    /// Recorded arrays.
    pub arrays: Vec<DataArray>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl ConvergenceHistory {
    /// Node name under a base.
    pub const GLOBAL_NAME: &'static str = "GlobalConvergenceHistory";
    /// Node name under a zone.
    pub const ZONE_NAME: &'static str = "ZoneConvergenceHistory";
    /// Name of the norm definition descriptor.
    pub const NORMS_NODE: &'static str = "NormDefinitions";
}

/// Flow equation set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowEquationSet {
    /// Identity (named `FlowEquationSet`).
    pub header: Header,
    /// Equation dimension.
    pub equation_dim: Option<i32>,
    /// Governing equations.
    pub governing: Option<GoverningEquations>,
    /// Physical models, at most one per model label.
    pub models: Vec<Model>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl FlowEquationSet {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "FlowEquationSet";
    /// Name of the equation dimension node.
    pub const DIMENSION_NODE: &'static str = "EquationDimension";

    /// An empty set.
    pub fn new() -> Self {
        Self {
            header: Header::new(Self::NODE_NAME),
            ..Self::default()
        }
    }

    /// The model stored under `label`.
    pub fn model(&self, label: Label) -> Option<&Model> {
        self.models.iter().find(|m| m.label == label)
    }
}

/// Governing equations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GoverningEquations {
    /// Identity (named `GoverningEquations`).
    pub header: Header,
    /// Equation type.
    pub equations_type: GoverningEquationsType,
    /// Diffusion model flags.
    pub diffusion: Option<Vec<i32>>,
    /// Descriptors and user data.
    pub meta: Meta,
}

impl GoverningEquations {
    /// Fixed node name.
    pub const NODE_NAME: &'static str = "GoverningEquations";
    /// Name of the diffusion flags node.
    pub const DIFFUSION_NODE: &'static str = "DiffusionModel";
}

/// One of the ten physical model kinds, told apart by label.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    /// Identity; the name is derived from the label.
    pub header: Header,
    /// Which model kind (`GasModel_t`, `TurbulenceModel_t`, ...).
    pub label: Label,
    /// Model type.
    pub model_type: ModelType,
    /// Diffusion model flags (turbulence models only).
    pub diffusion: Option<Vec<i32>>,
    /// Model parameters.
    pub arrays: Vec<DataArray>,
    /// Descriptors, data class, units and user data.
    pub meta: Meta,
}

impl Default for Model {
    fn default() -> Self {
        Self::new(Label::GasModel, ModelType::Null)
    }
}

impl Model {
    /// A model of `model_type` stored under `label`.
    pub fn new(label: Label, model_type: ModelType) -> Self {
        Self {
            header: Header::new(Self::node_name(label)),
            label,
            model_type,
            diffusion: None,
            arrays: Vec::new(),
            meta: Meta::default(),
        }
    }

    /// Node name of the model stored under `label`: the label text without
    /// its `_t` suffix.
    pub fn node_name(label: Label) -> &'static str {
        let text = label.as_str();
        text.strip_suffix("_t").unwrap_or(text)
    }
}

impl_named!(
    Axisymmetry,
    RotatingCoordinates,
    ReferenceState,
    Gravity,
    ConvergenceHistory,
    FlowEquationSet,
    GoverningEquations,
    Model,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names_follow_label() {
        assert_eq!(Model::node_name(Label::TurbulenceModel), "TurbulenceModel");
        assert_eq!(Model::node_name(Label::EMConductivityModel), "EMConductivityModel");
        let m = Model::new(Label::ViscosityModel, ModelType::SutherlandLaw);
        assert_eq!(m.header.name, "ViscosityModel");
    }

    #[test]
    fn equation_set_finds_model_by_label() {
        let mut set = FlowEquationSet::new();
        set.models.push(Model::new(Label::GasModel, ModelType::Ideal));
        assert!(set.model(Label::GasModel).is_some());
        assert!(set.model(Label::TurbulenceModel).is_none());
    }
}
