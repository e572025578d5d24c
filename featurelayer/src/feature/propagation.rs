//! Layer ownership and material propagation.
//!
//! A fetched mesh may itself be a subtree of grouped sub-meshes; ownership
//! and rendering flags must propagate uniformly so the whole feature renders
//! with consistent style and visibility toggling. The walk is an explicit
//! stack over the node arena, applied to any node that carries a material.

use crate::layer::Layer;
use crate::scene::{NodeId, SceneGraph};

/// Tag `root` and every descendant with `layer`'s ownership and rendering
/// flags. Reapplying with the same layer is a no-op in effect.
pub fn assign_layer(graph: &mut SceneGraph, root: NodeId, layer: &Layer) {
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let Some(node) = graph.get_mut(id) else {
            continue;
        };
        node.layer = Some(layer.id.clone());
        if let Some(material) = node.material.as_mut() {
            material.transparent = layer.opacity < 1.0;
            material.opacity = layer.opacity;
            material.wireframe = layer.wireframe;
        }
        node.render_layers = layer.render_layers;
        stack.extend_from_slice(node.children());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Crs, Extent};
    use crate::layer::{Source, ZoomRange};
    use crate::scene::{Material, RenderLayers, SceneNode};

    fn layer(opacity: f32) -> Layer {
        Layer::builder(
            "test",
            Source {
                crs: Crs::TmsWgs84,
                zoom: ZoomRange::single(10),
                is_file_source: false,
                is_inverted: false,
                extent: Extent::new(Crs::Wgs84, -180.0, 180.0, -90.0, 90.0),
            },
        )
        .opacity(opacity)
        .wireframe(true)
        .render_layers(RenderLayers::layer(5))
        .build()
    }

    fn subtree(graph: &mut SceneGraph) -> (NodeId, NodeId, NodeId) {
        let root = graph.insert(SceneNode::group(), None);
        let mut with_material = SceneNode::group();
        with_material.material = Some(Material::default());
        let mid = graph.insert(with_material, Some(root));
        let leaf = graph.insert(SceneNode::group(), Some(mid));
        (root, mid, leaf)
    }

    #[test]
    fn test_assign_tags_whole_subtree() {
        let mut graph = SceneGraph::new();
        let (root, mid, leaf) = subtree(&mut graph);
        let layer = layer(1.0);
        assign_layer(&mut graph, root, &layer);

        for id in [root, mid, leaf] {
            let node = graph.get(id).unwrap();
            assert_eq!(node.layer, Some(layer.id.clone()));
            assert_eq!(node.render_layers, RenderLayers::layer(5));
        }
    }

    #[test]
    fn test_assign_sets_material_flags_where_present() {
        let mut graph = SceneGraph::new();
        let (root, mid, leaf) = subtree(&mut graph);
        assign_layer(&mut graph, root, &layer(0.4));

        let material = graph.get(mid).unwrap().material.unwrap();
        assert_eq!(material.opacity, 0.4);
        assert!(material.transparent, "opacity below 1.0 is transparent");
        assert!(material.wireframe);
        assert!(graph.get(root).unwrap().material.is_none());
        assert!(graph.get(leaf).unwrap().material.is_none());
    }

    #[test]
    fn test_full_opacity_is_not_transparent() {
        let mut graph = SceneGraph::new();
        let (root, mid, _) = subtree(&mut graph);
        assign_layer(&mut graph, root, &layer(1.0));
        assert!(!graph.get(mid).unwrap().material.unwrap().transparent);
    }

    #[test]
    fn test_reassign_is_idempotent() {
        let mut graph = SceneGraph::new();
        let (root, mid, _) = subtree(&mut graph);
        let layer = layer(0.7);
        assign_layer(&mut graph, root, &layer);
        let before = *graph.get(mid).unwrap().material.as_ref().unwrap();
        assign_layer(&mut graph, root, &layer);
        let after = *graph.get(mid).unwrap().material.as_ref().unwrap();
        assert_eq!(before, after);
    }
}
