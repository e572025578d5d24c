//! Fetch commands and their results.
//!
//! Failures are data consumed by the completion continuation, not exceptions:
//! the scheduler resolves every command with a [`FetchResult`].

use thiserror::Error;

use crate::feature::FeatureMesh;
use crate::geo::TiledExtent;
use crate::layer::LayerId;
use crate::scene::{NodeId, RenderLayers};

/// A fetch submitted to the scheduler for one (tile, layer) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCommand {
    pub layer: LayerId,
    /// Tile extents in the source's tiling scheme.
    pub extents_source: Vec<TiledExtent>,
    /// Visibility mask the fetched meshes will render under.
    pub render_layers: RenderLayers,
    /// The tile that asked for the data.
    pub requester: NodeId,
}

/// One mesh delivered by a completed fetch.
#[derive(Debug)]
pub enum FetchedMesh {
    /// Newly parsed geometry; placement wraps and attaches it.
    Fresh(FeatureMesh),
    /// A node already living in the graph (a shared file-source dataset or a
    /// mesh from an earlier cycle); reconciliation re-parents it as needed.
    Attached(NodeId),
}

/// Errors a fetch can resolve with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    /// The source answered but held no features for the extent.
    #[error("source returned no data")]
    NoData,

    /// The command was cancelled before execution; not counted as a failure.
    #[error("fetch cancelled")]
    Cancelled,
}

/// Resolution of a fetch command.
pub type FetchResult = Result<Vec<FetchedMesh>, FetchError>;
