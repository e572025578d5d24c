//! Feature placement transform.
//!
//! A fetched mesh is authored against its own extent representation and local
//! origin; rendering it inside a tile expressed in the view's reference
//! projection needs an anisotropic rescale, possibly a grid-inversion
//! rotation, a recentering translation, and a reprojected anchor position.

use std::f64::consts::FRAC_PI_2;

use glam::{DVec2, DVec3};
use thiserror::Error;

use crate::geo::{Crs, CrsError, Projection};
use crate::scene::{FeatureData, NodeId, NodeKind, SceneGraph, SceneNode, Transform};

use super::mesh::FeatureMesh;

/// Errors computing a placement.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    /// The reprojected feature extent has a zero dimension; the scale ratio
    /// is undefined. Point-like datasets must be guarded upstream.
    #[error("degenerate feature extent, dimensions {0:?}")]
    DegenerateExtent(DVec2),

    #[error(transparent)]
    Crs(#[from] CrsError),
}

/// Scale, rotation, and anchor needed to place one mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Component-wise ratio of stored to reprojected extent dimensions.
    pub scale: DVec2,
    /// π/2 for inverted source grids, 0 otherwise.
    pub rotation_z: f64,
    /// Mesh anchor reprojected into the reference projection. The caller
    /// converts this into the owning tile's local frame.
    pub anchor: DVec3,
}

/// Compute the placement of `mesh` under `reference`.
///
/// The stored extent may carry a tile-scheme or alias code; it is normalized
/// to its canonical projection and reprojected (a no-op when already
/// canonical). The scale ratio corrects for geometry authored against one
/// extent representation rendering against another's physical size.
pub fn place(
    mesh: &FeatureMesh,
    inverted: bool,
    reference: Crs,
    projection: &dyn Projection,
) -> Result<Placement, PlacementError> {
    let native = mesh.extent.crs().to_geographic();
    let reprojected = projection.reproject_extent(&mesh.extent, native)?;
    let dim_reprojected = projection.dimensions(&reprojected);
    let dim_original = projection.dimensions(&mesh.extent);
    if dim_reprojected.x == 0.0 || dim_reprojected.y == 0.0 {
        return Err(PlacementError::DegenerateExtent(dim_reprojected));
    }

    let scale = dim_original / dim_reprojected;
    let rotation_z = if inverted { FRAC_PI_2 } else { 0.0 };
    let anchor = projection.reproject_point(mesh.position, native, reference)?;

    Ok(Placement {
        scale,
        rotation_z,
        anchor,
    })
}

/// Build the wrapper chain placing an inserted mesh node.
///
/// Two nested transform scopes under the wrapper: a scale scope applying the
/// anisotropic rescale and inversion rotation around the wrapper origin, and
/// a recenter scope translating the mesh so its authored anchor sits at that
/// origin. `anchor_local` is the wrapper position in the tile's local frame.
///
/// Returns the wrapper node; the caller attaches it under the tile.
pub fn build_feature_node(
    graph: &mut SceneGraph,
    mesh_node: NodeId,
    placement: &Placement,
    anchor_local: DVec3,
) -> NodeId {
    let mesh_position = graph
        .get(mesh_node)
        .and_then(SceneNode::mesh)
        .map(|mesh| mesh.position)
        .unwrap_or(DVec3::ZERO);

    let mut wrapper = SceneNode::new(NodeKind::Feature(FeatureData {
        anchor: placement.anchor,
    }));
    wrapper.transform.translation = anchor_local;
    let wrapper_id = graph.insert(wrapper, None);

    let mut scale_scope = SceneNode::group();
    scale_scope.transform = Transform {
        translation: DVec3::ZERO,
        rotation_z: placement.rotation_z,
        scale: DVec3::new(placement.scale.x, placement.scale.y, 1.0),
    };
    let scale_id = graph.insert(scale_scope, Some(wrapper_id));

    let mut recenter = SceneNode::group();
    recenter.transform.translation = -mesh_position;
    let recenter_id = graph.insert(recenter, Some(scale_id));

    graph.attach(mesh_node, recenter_id);
    wrapper_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{FeatureGeometry, FeatureKind};
    use crate::geo::{Extent, GeographicProjection};

    /// Projection stub reporting fixed dimensions for reprojected extents,
    /// standing in for an external transform library.
    struct StubProjection {
        reprojected_dimensions: DVec2,
    }

    impl Projection for StubProjection {
        fn reproject_extent(&self, extent: &Extent, target: Crs) -> Result<Extent, CrsError> {
            // Tag flip only; dimensions are answered separately.
            Ok(extent.retagged(target.to_geographic()))
        }

        fn dimensions(&self, extent: &Extent) -> DVec2 {
            if extent.crs() == extent.crs().to_geographic() {
                self.reprojected_dimensions
            } else {
                extent.dimensions()
            }
        }

        fn reproject_point(
            &self,
            point: DVec3,
            _source: Crs,
            _target: Crs,
        ) -> Result<DVec3, CrsError> {
            Ok(point)
        }
    }

    fn mesh_with_extent(extent: Extent, position: DVec3) -> FeatureMesh {
        FeatureMesh::new(
            FeatureGeometry::new(FeatureKind::Line, vec![DVec3::ZERO]),
            extent,
            position,
        )
    }

    #[test]
    fn test_scale_ratio_of_stored_to_reprojected_dimensions() {
        // Stored dimensions (200, 100), reprojected (100, 100).
        let extent = Extent::new(Crs::TmsWgs84, 0.0, 200.0, 0.0, 100.0);
        let mesh = mesh_with_extent(extent, DVec3::ZERO);
        let projection = StubProjection {
            reprojected_dimensions: DVec2::new(100.0, 100.0),
        };
        let placement = place(&mesh, false, Crs::Wgs84, &projection).unwrap();
        assert_eq!(placement.scale, DVec2::new(2.0, 1.0));
    }

    #[test]
    fn test_inversion_rotates_quarter_turn() {
        let extent = Extent::new(Crs::Wgs84, 0.0, 1.0, 0.0, 1.0);
        let mesh = mesh_with_extent(extent, DVec3::ZERO);
        let projection = GeographicProjection;

        let inverted = place(&mesh, true, Crs::Wgs84, &projection).unwrap();
        assert_eq!(inverted.rotation_z, FRAC_PI_2);

        let upright = place(&mesh, false, Crs::Wgs84, &projection).unwrap();
        assert_eq!(upright.rotation_z, 0.0);
    }

    #[test]
    fn test_self_reprojection_yields_unit_scale() {
        let extent = Extent::new(Crs::Wgs84, 2.0, 4.0, 44.0, 45.0);
        let mesh = mesh_with_extent(extent, DVec3::new(3.0, 44.5, 0.0));
        let placement = place(&mesh, false, Crs::Wgs84, &GeographicProjection).unwrap();
        assert_eq!(placement.scale, DVec2::ONE);
        assert_eq!(placement.anchor, DVec3::new(3.0, 44.5, 0.0));
    }

    #[test]
    fn test_anchor_is_reprojected_into_reference() {
        let extent = Extent::new(Crs::Wgs84, -1.0, 1.0, -1.0, 1.0);
        let mesh = mesh_with_extent(extent, DVec3::ZERO);
        let placement = place(&mesh, false, Crs::WebMercator, &GeographicProjection).unwrap();
        // Origin maps to the Mercator origin.
        assert_eq!(placement.anchor, DVec3::ZERO);
    }

    #[test]
    fn test_degenerate_extent_is_an_error() {
        let extent = Extent::new(Crs::Wgs84, 5.0, 5.0, 0.0, 1.0);
        let mesh = mesh_with_extent(extent, DVec3::ZERO);
        let err = place(&mesh, false, Crs::Wgs84, &GeographicProjection).unwrap_err();
        assert!(matches!(err, PlacementError::DegenerateExtent(_)));
    }

    #[test]
    fn test_feature_node_recenters_mesh_at_wrapper_origin() {
        let mut graph = SceneGraph::new();
        let extent = Extent::new(Crs::Wgs84, 0.0, 2.0, 0.0, 2.0);
        let position = DVec3::new(1.0, 1.0, 0.0);
        let mesh = mesh_with_extent(extent, position);
        let placement = place(&mesh, false, Crs::Wgs84, &GeographicProjection).unwrap();

        let mesh_id = graph.insert(SceneNode::new(NodeKind::Mesh(mesh)), None);
        let wrapper = build_feature_node(&mut graph, mesh_id, &placement, DVec3::ZERO);
        graph.update_matrix_world(wrapper);

        // The authored anchor lands on the wrapper origin.
        let world = graph.get(mesh_id).unwrap().world_matrix();
        assert_eq!(world.transform_point3(position), DVec3::ZERO);
        // Wrapper -> scale scope -> recenter scope -> mesh.
        let scale_scope = graph.children(wrapper)[0];
        let recenter = graph.children(scale_scope)[0];
        assert_eq!(graph.children(recenter), &[mesh_id]);
    }

    #[test]
    fn test_feature_node_applies_scale_about_anchor() {
        let mut graph = SceneGraph::new();
        let extent = Extent::new(Crs::TmsWgs84, 0.0, 4.0, 0.0, 4.0);
        let position = DVec3::new(2.0, 2.0, 0.0);
        let mesh = mesh_with_extent(extent, position);
        let projection = StubProjection {
            reprojected_dimensions: DVec2::new(2.0, 4.0),
        };
        let placement = place(&mesh, false, Crs::Wgs84, &projection).unwrap();
        assert_eq!(placement.scale, DVec2::new(2.0, 1.0));

        let mesh_id = graph.insert(SceneNode::new(NodeKind::Mesh(mesh)), None);
        let wrapper = build_feature_node(&mut graph, mesh_id, &placement, DVec3::ZERO);
        graph.update_matrix_world(wrapper);

        // A vertex one unit east of the anchor is scaled to two units.
        let world = graph.get(mesh_id).unwrap().world_matrix();
        let out = world.transform_point3(position + DVec3::X);
        assert_eq!(out, DVec3::new(2.0, 0.0, 0.0));
    }
}
