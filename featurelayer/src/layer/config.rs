//! Layer and source configuration.
//!
//! A layer names a data source rendered across tiles together with its
//! rendering flags. Configuration is read-only during an update cycle; the
//! mutable per-tile state lives on the tiles themselves.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::geo::{Crs, Extent};
use crate::scene::{RenderLayers, SceneNode};

/// Identifier of a layer, unique within a view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Zoom levels a source is authored for. Feature layers render at exactly
/// `min`; the range exists for data-availability queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: u8,
    pub max: u8,
}

impl ZoomRange {
    pub fn single(zoom: u8) -> Self {
        Self {
            min: zoom,
            max: zoom,
        }
    }

    pub fn contains(&self, zoom: u8) -> bool {
        (self.min..=self.max).contains(&zoom)
    }
}

/// Data-source description for a layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Projection or tiling scheme the source serves its data in.
    pub crs: Crs,
    /// Zoom levels with data; features render at `zoom.min`.
    pub zoom: ZoomRange,
    /// Whole dataset loaded as one unit (single file) rather than tiled.
    pub is_file_source: bool,
    /// Source grid uses the inverted row/column convention and needs the
    /// 90° placement rotation.
    pub is_inverted: bool,
    /// Geographic extent of the dataset.
    pub extent: Extent,
}

impl Source {
    /// Whether the source reports data for `extent` at `zoom`.
    ///
    /// `extent` must be expressed in the same projection as the dataset
    /// extent; the orchestrator reprojects before asking.
    pub fn extent_inside_limit(&self, extent: &Extent, zoom: u8) -> bool {
        self.zoom.contains(zoom) && self.extent.intersects(extent)
    }

    /// Center of the dataset extent, in the dataset's projection.
    pub fn center(&self) -> DVec2 {
        self.extent.center()
    }
}

/// Hook invoked on every mesh node produced for a layer.
pub type MeshCreatedHook = Box<dyn Fn(&mut SceneNode)>;

/// A named data source rendered across tiles.
pub struct Layer {
    pub id: LayerId,
    pub source: Source,
    /// Uniform opacity; below 1.0 materials are flagged transparent.
    pub opacity: f32,
    pub wireframe: bool,
    /// Rendering-visibility mask propagated onto every node of the layer.
    pub render_layers: RenderLayers,
    /// Optional side-effecting hook run on each fetched mesh.
    pub on_mesh_created: Option<MeshCreatedHook>,
}

impl Layer {
    pub fn builder(id: impl Into<LayerId>, source: Source) -> LayerBuilder {
        LayerBuilder {
            id: id.into(),
            source,
            opacity: 1.0,
            wireframe: false,
            render_layers: RenderLayers::DEFAULT,
            on_mesh_created: None,
        }
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("opacity", &self.opacity)
            .field("wireframe", &self.wireframe)
            .field("render_layers", &self.render_layers)
            .field("on_mesh_created", &self.on_mesh_created.is_some())
            .finish()
    }
}

/// Builder for [`Layer`].
pub struct LayerBuilder {
    id: LayerId,
    source: Source,
    opacity: f32,
    wireframe: bool,
    render_layers: RenderLayers,
    on_mesh_created: Option<MeshCreatedHook>,
}

impl LayerBuilder {
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn render_layers(mut self, render_layers: RenderLayers) -> Self {
        self.render_layers = render_layers;
        self
    }

    pub fn on_mesh_created(mut self, hook: impl Fn(&mut SceneNode) + 'static) -> Self {
        self.on_mesh_created = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Layer {
        Layer {
            id: self.id,
            source: self.source,
            opacity: self.opacity,
            wireframe: self.wireframe,
            render_layers: self.render_layers,
            on_mesh_created: self.on_mesh_created,
        }
    }
}
