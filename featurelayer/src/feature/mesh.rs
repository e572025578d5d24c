//! Fetched feature geometry.

use glam::DVec3;

use crate::geo::Extent;

/// Kind of vector geometry a mesh was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Point,
    Line,
    Polygon,
}

/// Raw geometry of a feature set, in the units of its native projection and
/// relative to the mesh's authored local origin.
#[derive(Debug, Clone)]
pub struct FeatureGeometry {
    pub kind: FeatureKind,
    pub vertices: Vec<DVec3>,
}

impl FeatureGeometry {
    pub fn new(kind: FeatureKind, vertices: Vec<DVec3>) -> Self {
        Self { kind, vertices }
    }
}

/// Geometry produced by a source, annotated with the extent of the feature
/// set (carrying its native, possibly tile-scheme-tagged CRS) and the mesh's
/// authored local origin.
///
/// Ownership transfers to whichever feature wrapper node integrates the mesh.
#[derive(Debug, Clone)]
pub struct FeatureMesh {
    pub geometry: FeatureGeometry,
    /// Geographic extent of the feature set in its native projection.
    pub extent: Extent,
    /// Authored local origin of the geometry, in the native projection.
    pub position: DVec3,
}

impl FeatureMesh {
    pub fn new(geometry: FeatureGeometry, extent: Extent, position: DVec3) -> Self {
        Self {
            geometry,
            extent,
            position,
        }
    }
}
