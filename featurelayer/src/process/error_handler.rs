//! Fetch-failure handling collaborator.
//!
//! The orchestrator forwards scheduler failures verbatim; the handler owns
//! the retry-vs-permanent decision and expresses it through the load-state
//! transitions. One bad (tile, layer) pair is never fatal to its siblings.

use tracing::warn;

use crate::layer::Layer;
use crate::scene::{NodeId, SceneGraph};

use super::command::FetchError;

/// Failed fetch attempts tolerated before a pair is blocked for good.
pub const MAX_RETRY: u32 = 4;

/// Decides what a fetch failure means for a (tile, layer) pair.
pub trait TileErrorHandler {
    fn handle(
        &mut self,
        error: FetchError,
        graph: &mut SceneGraph,
        tile: NodeId,
        layer: &Layer,
        level: u8,
    );
}

/// Default handler: release the gate on cancellation, count real failures,
/// and block the pair once `max_retry` attempts have failed.
#[derive(Debug)]
pub struct LoggingErrorHandler {
    max_retry: u32,
}

impl Default for LoggingErrorHandler {
    fn default() -> Self {
        Self {
            max_retry: MAX_RETRY,
        }
    }
}

impl LoggingErrorHandler {
    pub fn new(max_retry: u32) -> Self {
        Self { max_retry }
    }
}

impl TileErrorHandler for LoggingErrorHandler {
    fn handle(
        &mut self,
        error: FetchError,
        graph: &mut SceneGraph,
        tile: NodeId,
        layer: &Layer,
        level: u8,
    ) {
        let Some(state) = graph
            .get_mut(tile)
            .and_then(|node| node.tile_data_mut())
            .and_then(|data| data.load_states.get_mut(&layer.id))
        else {
            return;
        };

        if error == FetchError::Cancelled {
            // Not a failure; release the gate so the next cycle resubmits.
            state.reset();
            return;
        }

        state.failure();
        if state.error_count() > self.max_retry {
            state.no_more_update_possible();
            warn!(
                layer = %layer.id,
                level,
                errors = state.error_count(),
                %error,
                "giving up on feature layer for tile"
            );
        } else {
            warn!(
                layer = %layer.id,
                level,
                errors = state.error_count(),
                %error,
                "feature fetch failed, will retry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Crs, Extent, TiledExtent};
    use crate::layer::{Source, UpdateState, ZoomRange};
    use crate::scene::SceneNode;

    fn layer() -> Layer {
        Layer::builder(
            "roads",
            Source {
                crs: Crs::TmsWgs84,
                zoom: ZoomRange::single(10),
                is_file_source: false,
                is_inverted: false,
                extent: Extent::new(Crs::Wgs84, -180.0, 180.0, -90.0, 90.0),
            },
        )
        .build()
    }

    fn pending_tile(graph: &mut SceneGraph, layer: &Layer) -> NodeId {
        let tiled = TiledExtent::new(Crs::TmsWgs84, 10, 100, 100).unwrap();
        let tile = graph.insert(SceneNode::tile(tiled), None);
        let data = graph.get_mut(tile).unwrap().tile_data_mut().unwrap();
        let state = data.load_states.entry(layer.id.clone()).or_default();
        state.new_try();
        tile
    }

    fn state_of(graph: &SceneGraph, tile: NodeId, layer: &Layer) -> UpdateState {
        graph
            .get(tile)
            .unwrap()
            .tile_data()
            .unwrap()
            .load_states
            .get(&layer.id)
            .unwrap()
            .state()
    }

    #[test]
    fn test_failure_releases_gate_for_retry() {
        let mut graph = SceneGraph::new();
        let layer = layer();
        let tile = pending_tile(&mut graph, &layer);

        let mut handler = LoggingErrorHandler::default();
        handler.handle(
            FetchError::Network("timeout".into()),
            &mut graph,
            tile,
            &layer,
            10,
        );
        assert_eq!(state_of(&graph, tile, &layer), UpdateState::Idle);
    }

    #[test]
    fn test_exhausted_retries_block_pair() {
        let mut graph = SceneGraph::new();
        let layer = layer();
        let tile = pending_tile(&mut graph, &layer);

        let mut handler = LoggingErrorHandler::new(2);
        for _ in 0..3 {
            handler.handle(FetchError::NoData, &mut graph, tile, &layer, 10);
            let data = graph.get_mut(tile).unwrap().tile_data_mut().unwrap();
            let state = data.load_states.get_mut(&layer.id).unwrap();
            if state.can_try_update() {
                state.new_try();
            }
        }
        assert_eq!(state_of(&graph, tile, &layer), UpdateState::Blocked);
    }

    #[test]
    fn test_cancellation_is_not_counted() {
        let mut graph = SceneGraph::new();
        let layer = layer();
        let tile = pending_tile(&mut graph, &layer);

        let mut handler = LoggingErrorHandler::default();
        handler.handle(FetchError::Cancelled, &mut graph, tile, &layer, 10);

        let data = graph.get(tile).unwrap().tile_data().unwrap();
        let state = data.load_states.get(&layer.id).unwrap();
        assert_eq!(state.state(), UpdateState::Idle);
        assert_eq!(state.error_count(), 0);
    }
}
