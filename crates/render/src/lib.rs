//! Rendering adapter: projection math and a renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate the grid or the camera.
//! - The projection matrix is rebuilt whenever the viewport aspect changes.

mod projection;
mod renderer;

pub use projection::{ProjectionBuilder, aspect_ratio, perspective};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "blocky-render v0.1.0"
}
