//! Feature-layer update orchestration.
//!
//! [`FeatureUpdater::update`] is invoked once per refresh cycle per
//! (tile, layer): it decides eligibility, gates on the tile's load state, and
//! submits at most one fetch command. [`FeatureUpdater::complete`] is the
//! single continuation consuming the command's resolution; it re-checks the
//! tile's situation because anything may have happened during the async gap,
//! which makes it idempotent against late or stale completions.
//!
//! Both entry points run on the host's cooperative loop and are never
//! re-entered concurrently.

use glam::{DVec2, DVec3};
use tracing::{debug, warn};

use crate::feature::{assign_layer, build_feature_node, place, FeatureMesh};
use crate::geo::{Crs, Extent, Projection};
use crate::layer::Layer;
use crate::scene::{
    remove_layer_children, Disposal, Material, NodeId, NodeKind, SceneGraph, SceneNode,
};

use super::command::{FetchCommand, FetchResult, FetchedMesh};
use super::error_handler::TileErrorHandler;
use super::scheduler::FetchScheduler;

/// Viewer state the orchestrator needs: the projection everything renders in.
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub reference_crs: Crs,
}

/// Collaborators threaded through one update or completion call.
pub struct UpdateContext<'a> {
    pub view: View,
    pub scheduler: &'a mut dyn FetchScheduler,
    pub error_handler: &'a mut dyn TileErrorHandler,
    pub disposal: &'a mut dyn Disposal,
    pub projection: &'a dyn Projection,
}

/// What an update call decided, for observability and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The tile left the index; its children were released.
    Evicted,
    /// The tile is not visible this cycle.
    Hidden,
    /// The load state forbids a new attempt (in flight or blocked).
    Gated,
    /// The layer's features are already attached to this tile.
    AlreadyAttached,
    /// Wrong zoom, no data, or an unaddressable grid; permanently blocked.
    Ineligible,
    /// A fetch command was submitted.
    FetchIssued,
}

/// Orchestrates feature fetches and integrates their results.
#[derive(Debug, Default)]
pub struct FeatureUpdater;

impl FeatureUpdater {
    pub fn new() -> Self {
        Self
    }

    /// Per-cycle entry point for one (tile, layer) pair.
    pub fn update(
        &self,
        ctx: &mut UpdateContext<'_>,
        graph: &mut SceneGraph,
        layer: &Layer,
        tile: NodeId,
    ) -> UpdateOutcome {
        let Some(node) = graph.get(tile) else {
            return UpdateOutcome::Evicted;
        };
        let parent = node.parent();
        let visible = node.visible;
        let has_children = !node.children().is_empty();

        // A parentless tile was removed from the index; release the layer's
        // resources if any are still attached. Repeat calls are no-ops.
        if parent.is_none() {
            if has_children {
                let removed = remove_layer_children(ctx.disposal, graph, &layer.id, tile);
                debug!(layer = %layer.id, removed, "released children of evicted tile");
            }
            return UpdateOutcome::Evicted;
        }

        if !visible {
            return UpdateOutcome::Hidden;
        }

        {
            let Some(data) = graph.get_mut(tile).and_then(|n| n.tile_data_mut()) else {
                warn!(layer = %layer.id, "feature update invoked on a non-tile node");
                return UpdateOutcome::Gated;
            };
            let state = data.load_states.entry(layer.id.clone()).or_default();
            if !state.can_try_update() {
                return UpdateOutcome::Gated;
            }
        }

        // Features from an earlier cycle are still attached; nothing to do.
        let already_attached = graph.children(tile).iter().any(|child| {
            graph
                .get(*child)
                .is_some_and(|n| n.layer.as_ref() == Some(&layer.id))
        });
        if already_attached {
            return UpdateOutcome::AlreadyAttached;
        }

        let Some((tile_extent, level, extents_dest)) = graph
            .get(tile)
            .and_then(|n| n.tile_data())
            .map(|d| (d.extent, d.level, d.extents_by_projection(layer.source.crs)))
        else {
            return UpdateOutcome::Gated;
        };

        let eligible = match &extents_dest {
            None => false,
            Some(extents) => {
                let zoom_dest = extents[0].zoom();
                // The layer renders at exactly one level, the source must
                // report data here, and a single-file dataset attaches only
                // to the tile holding its center.
                zoom_dest == layer.source.zoom.min
                    && self.source_has_data(ctx, layer, &tile_extent, zoom_dest)
                    && (!layer.source.is_file_source
                        || self.dataset_center_inside(ctx, layer, &tile_extent))
            }
        };
        if !eligible {
            if let Some(state) = graph
                .get_mut(tile)
                .and_then(|n| n.tile_data_mut())
                .and_then(|d| d.load_states.get_mut(&layer.id))
            {
                state.no_more_update_possible();
            }
            debug!(layer = %layer.id, level, "no feature data for tile, blocking");
            return UpdateOutcome::Ineligible;
        }

        let extents_source = extents_dest.unwrap_or_default();
        if let Some(state) = graph
            .get_mut(tile)
            .and_then(|n| n.tile_data_mut())
            .and_then(|d| d.load_states.get_mut(&layer.id))
        {
            state.new_try();
        }
        debug!(layer = %layer.id, level, "submitting feature fetch");
        ctx.scheduler.execute(FetchCommand {
            layer: layer.id.clone(),
            extents_source,
            render_layers: layer.render_layers,
            requester: tile,
        });
        UpdateOutcome::FetchIssued
    }

    /// Continuation for a resolved fetch command.
    pub fn complete(
        &self,
        ctx: &mut UpdateContext<'_>,
        graph: &mut SceneGraph,
        layer: &Layer,
        tile: NodeId,
        result: FetchResult,
    ) {
        if !graph.contains(tile) {
            if let Ok(meshes) = &result {
                let fresh = meshes
                    .iter()
                    .filter(|m| matches!(m, FetchedMesh::Fresh(_)))
                    .count();
                debug!(layer = %layer.id, dropped = fresh, "completion for removed tile discarded");
            }
            return;
        }
        let level = graph
            .get(tile)
            .and_then(|n| n.tile_data())
            .map(|d| d.level)
            .unwrap_or(0);

        let meshes = match result {
            Err(error) => {
                ctx.error_handler.handle(error, graph, tile, layer, level);
                return;
            }
            Ok(meshes) => meshes,
        };

        if let Some(state) = graph
            .get_mut(tile)
            .and_then(|n| n.tile_data_mut())
            .and_then(|d| d.load_states.get_mut(&layer.id))
        {
            state.success();
        }

        for fetched in meshes {
            match fetched {
                FetchedMesh::Fresh(mesh) => self.integrate_fresh(ctx, graph, layer, tile, mesh),
                FetchedMesh::Attached(node) => {
                    self.reconcile_attached(ctx, graph, layer, tile, node)
                }
            }
        }
        // Attachment changed child positions; refresh cached world matrices.
        graph.update_matrix_world(tile);
    }

    fn source_has_data(
        &self,
        ctx: &UpdateContext<'_>,
        layer: &Layer,
        tile_extent: &Extent,
        zoom: u8,
    ) -> bool {
        let target = layer.source.extent.crs().to_geographic();
        match ctx.projection.reproject_extent(tile_extent, target) {
            Ok(reprojected) => layer.source.extent_inside_limit(&reprojected, zoom),
            Err(_) => false,
        }
    }

    fn dataset_center_inside(
        &self,
        ctx: &UpdateContext<'_>,
        layer: &Layer,
        tile_extent: &Extent,
    ) -> bool {
        let center = layer.source.center();
        match ctx.projection.reproject_point(
            DVec3::new(center.x, center.y, 0.0),
            layer.source.extent.crs(),
            tile_extent.crs(),
        ) {
            Ok(p) => tile_extent.contains(DVec2::new(p.x, p.y)),
            Err(_) => false,
        }
    }

    fn integrate_fresh(
        &self,
        ctx: &mut UpdateContext<'_>,
        graph: &mut SceneGraph,
        layer: &Layer,
        tile: NodeId,
        mesh: FeatureMesh,
    ) {
        let placement = match place(
            &mesh,
            layer.source.is_inverted,
            ctx.view.reference_crs,
            ctx.projection,
        ) {
            Ok(placement) => placement,
            Err(error) => {
                warn!(layer = %layer.id, %error, "dropping unplaceable mesh");
                return;
            }
        };

        let mut node = SceneNode::new(NodeKind::Mesh(mesh));
        node.material = Some(Material::default());
        let mesh_id = graph.insert(node, None);
        assign_layer(graph, mesh_id, layer);
        if let Some(hook) = &layer.on_mesh_created {
            if let Some(mesh_node) = graph.get_mut(mesh_id) {
                hook(mesh_node);
            }
        }

        // The tile may have been evicted while the fetch was in flight.
        if graph.parent(tile).is_none() {
            ctx.disposal.release_subtree(graph, &layer.id, mesh_id);
            return;
        }

        let Some(anchor_local) = graph.world_to_local(tile, placement.anchor) else {
            ctx.disposal.release_subtree(graph, &layer.id, mesh_id);
            return;
        };
        let wrapper = build_feature_node(graph, mesh_id, &placement, anchor_local);
        assign_layer(graph, wrapper, layer);
        graph.attach(wrapper, tile);
    }

    fn reconcile_attached(
        &self,
        ctx: &mut UpdateContext<'_>,
        graph: &mut SceneGraph,
        layer: &Layer,
        tile: NodeId,
        node: NodeId,
    ) {
        if !graph.contains(node) {
            return;
        }
        assign_layer(graph, node, layer);
        if let Some(hook) = &layer.on_mesh_created {
            if let Some(n) = graph.get_mut(node) {
                hook(n);
            }
        }

        let parent = graph.parent(node);
        if parent == Some(tile) {
            // Already correctly attached; no duplicate insert, no placement.
            return;
        }
        if parent.is_some() {
            // Stale owner from an earlier cycle or another tile.
            graph.detach(node);
        }
        if graph.parent(tile).is_none() {
            ctx.disposal.release_subtree(graph, &layer.id, node);
            return;
        }
        graph.attach(node, tile);
    }
}
