//! Feature meshes, placement math, and layer propagation.

mod mesh;
mod placement;
mod propagation;

pub use mesh::{FeatureGeometry, FeatureKind, FeatureMesh};
pub use placement::{build_feature_node, place, Placement, PlacementError};
pub use propagation::assign_layer;
