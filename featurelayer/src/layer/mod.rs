//! Layer configuration and per-tile update state.

mod config;
mod update_state;

pub use config::{Layer, LayerBuilder, LayerId, MeshCreatedHook, Source, ZoomRange};
pub use update_state::{LayerUpdateState, UpdateState};
