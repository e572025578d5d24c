//! Detached-node cleanup.
//!
//! When a tile leaves the index, or a fetched mesh can no longer be attached,
//! the subtree's rendering resources must be freed. The disposal collaborator
//! owns what "freeing" means; the default drops the nodes from the arena,
//! which drops their geometry with them.

use tracing::debug;

use crate::layer::LayerId;

use super::graph::{NodeId, SceneGraph};

/// Releases rendering resources of detached subtrees.
pub trait Disposal {
    /// Free `node` and every descendant. Returns the number of nodes dropped.
    fn release_subtree(&mut self, graph: &mut SceneGraph, layer: &LayerId, node: NodeId) -> usize;
}

/// Remove all of `node`'s children owned by `layer`, with their subtrees.
pub fn remove_layer_children(
    disposal: &mut dyn Disposal,
    graph: &mut SceneGraph,
    layer: &LayerId,
    node: NodeId,
) -> usize {
    let owned: Vec<NodeId> = graph
        .children(node)
        .iter()
        .copied()
        .filter(|child| {
            graph
                .get(*child)
                .is_some_and(|n| n.layer.as_ref() == Some(layer))
        })
        .collect();
    let mut removed = 0;
    for child in owned {
        removed += disposal.release_subtree(graph, layer, child);
    }
    removed
}

/// Default disposal: drop the subtree from the arena.
#[derive(Debug, Default)]
pub struct GeometryDisposer;

impl Disposal for GeometryDisposer {
    fn release_subtree(&mut self, graph: &mut SceneGraph, layer: &LayerId, node: NodeId) -> usize {
        let removed = graph.remove_subtree(node);
        if removed > 0 {
            debug!(layer = %layer, removed, "released feature subtree");
        }
        removed
    }
}
