//! Scene-graph arena and node types.
//!
//! This module is the crate's stand-in for the external spatial index at the
//! boundary the orchestrator consumes: tiles with extents, levels and
//! visibility, parent/child links, local/world transforms, and lazily created
//! per-layer load state.

mod graph;
mod node;
mod removal;

pub use graph::{NodeId, SceneGraph};
pub use node::{
    FeatureData, Material, NodeKind, RenderLayers, SceneNode, TileData, Transform,
};
pub use removal::{remove_layer_children, Disposal, GeometryDisposer};
