//! FeatureLayer - vector features on a tiled spatial index
//!
//! This library attaches vector-feature geometry fetched from remote or file
//! sources onto the tiles of a quad-tree spatial index, at the correct
//! geographic position and scale, while coordinating asynchronous fetches
//! against tile visibility, zoom level, and per-(tile, layer) load state so
//! that at most one fetch per pair is ever in flight.
//!
//! # Architecture
//!
//! - [`process::FeatureUpdater`] - the per-cycle entry point: eligibility,
//!   fetch submission, and result integration.
//! - [`layer::LayerUpdateState`] - the per-(tile, layer) gate preventing
//!   duplicate fetches and memoizing "no data here".
//! - [`feature::place`] - the transform placing a mesh authored in its own
//!   projection into a tile's local frame under the reference projection.
//! - [`feature::assign_layer`] - ownership and material propagation over a
//!   fetched mesh subtree.
//!
//! The spatial index, the source pipeline, the command executor, and the
//! full transform library stay outside; they are reached through the
//! [`scene::SceneGraph`] boundary and the [`geo::Projection`],
//! [`process::FetchScheduler`], [`process::TileErrorHandler`] and
//! [`scene::Disposal`] collaborator traits.

pub mod feature;
pub mod geo;
pub mod layer;
pub mod process;
pub mod scene;

pub use feature::{FeatureGeometry, FeatureKind, FeatureMesh};
pub use geo::{Crs, Extent, GeographicProjection, Projection, TiledExtent};
pub use layer::{Layer, LayerId, LayerUpdateState, Source, UpdateState, ZoomRange};
pub use process::{
    FeatureUpdater, FetchCommand, FetchError, FetchResult, FetchScheduler, FetchedMesh,
    QueueScheduler, UpdateContext, UpdateOutcome, View,
};
pub use scene::{NodeId, RenderLayers, SceneGraph, SceneNode};
