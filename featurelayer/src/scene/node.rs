//! Scene-graph node types.

use std::collections::HashMap;

use glam::{DMat4, DQuat, DVec2, DVec3};

use crate::feature::FeatureMesh;
use crate::geo::{mercator_to_lon_lat, Crs, Extent, TiledExtent};
use crate::layer::{LayerId, LayerUpdateState};

use super::graph::NodeId;

/// Local transform of a node: translation, rotation about the vertical axis,
/// and per-axis scale. Rotation beyond z is never needed for placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: DVec3,
    pub rotation_z: f64,
    pub scale: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: DVec3::ZERO,
            rotation_z: 0.0,
            scale: DVec3::ONE,
        }
    }
}

impl Transform {
    pub fn to_matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(
            self.scale,
            DQuat::from_rotation_z(self.rotation_z),
            self.translation,
        )
    }
}

/// Rendering-visibility bitmask, one bit per display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderLayers(u32);

impl RenderLayers {
    /// The default display layer (bit 0).
    pub const DEFAULT: Self = Self(1);

    /// A mask with only display layer `n` set.
    pub fn layer(n: u8) -> Self {
        debug_assert!(n < 32);
        Self(1 << n)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for RenderLayers {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Renderable material flags carried by mesh nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub opacity: f32,
    pub transparent: bool,
    pub wireframe: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            transparent: false,
            wireframe: false,
        }
    }
}

/// Payload of a tile node.
#[derive(Debug)]
pub struct TileData {
    /// Geographic extent of the tile in its grid's projection.
    pub extent: Extent,
    /// The tile's cell in the index's tiling scheme.
    pub tiled: TiledExtent,
    /// Pyramid depth of the tile.
    pub level: u8,
    /// Per-layer update gates, created lazily on first visit.
    pub load_states: HashMap<LayerId, LayerUpdateState>,
}

impl TileData {
    pub fn new(tiled: TiledExtent) -> Self {
        Self {
            extent: tiled.as_extent(),
            level: tiled.zoom(),
            tiled,
            load_states: HashMap::new(),
        }
    }

    /// The tile's extents expressed in the tiling scheme of `crs`.
    ///
    /// The tile's own cell when `crs` maps to the index's scheme; otherwise a
    /// same-zoom conversion through the tile's geographic center. `None` when
    /// the tile cannot be addressed in the target grid (for example a polar
    /// tile against a Mercator grid).
    pub fn extents_by_projection(&self, crs: Crs) -> Option<Vec<TiledExtent>> {
        let scheme = crs.to_tiling_scheme();
        if scheme == self.tiled.crs() {
            return Some(vec![self.tiled]);
        }
        let center = self.extent.center();
        let lon_lat = match self.extent.crs().to_geographic() {
            Crs::WebMercator => mercator_to_lon_lat(center),
            _ => center,
        };
        TiledExtent::from_lon_lat(scheme, self.tiled.zoom(), lon_lat.x, lon_lat.y)
            .ok()
            .map(|cell| vec![cell])
    }
}

/// Payload of a feature wrapper node.
#[derive(Debug, Clone, Copy)]
pub struct FeatureData {
    /// Anchor position in the view's reference projection, before conversion
    /// into the owning tile's local frame.
    pub anchor: DVec3,
}

/// What a node is.
#[derive(Debug)]
pub enum NodeKind {
    /// Plain transform scope.
    Group,
    /// Spatial-index tile.
    Tile(TileData),
    /// Placement wrapper around one feature mesh subtree.
    Feature(FeatureData),
    /// Leaf owning fetched feature geometry.
    Mesh(FeatureMesh),
}

/// A node of the scene graph.
#[derive(Debug)]
pub struct SceneNode {
    pub transform: Transform,
    pub visible: bool,
    /// Owning layer, set by layer propagation.
    pub layer: Option<LayerId>,
    pub render_layers: RenderLayers,
    pub material: Option<Material>,
    pub kind: NodeKind,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) world: DMat4,
    pub(super) world_dirty: bool,
}

impl SceneNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            transform: Transform::default(),
            visible: true,
            layer: None,
            render_layers: RenderLayers::DEFAULT,
            material: None,
            kind,
            parent: None,
            children: Vec::new(),
            world: DMat4::IDENTITY,
            world_dirty: true,
        }
    }

    pub fn group() -> Self {
        Self::new(NodeKind::Group)
    }

    pub fn tile(tiled: TiledExtent) -> Self {
        Self::new(NodeKind::Tile(TileData::new(tiled)))
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Cached world matrix; valid after `SceneGraph::update_matrix_world`.
    pub fn world_matrix(&self) -> DMat4 {
        self.world
    }

    pub fn tile_data(&self) -> Option<&TileData> {
        match &self.kind {
            NodeKind::Tile(data) => Some(data),
            _ => None,
        }
    }

    pub fn tile_data_mut(&mut self) -> Option<&mut TileData> {
        match &mut self.kind {
            NodeKind::Tile(data) => Some(data),
            _ => None,
        }
    }

    pub fn mesh(&self) -> Option<&FeatureMesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}
