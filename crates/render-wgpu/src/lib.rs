//! wgpu render backend for the maze.
//!
//! Draws a line grid on the floor and one instanced cube per solid cell.
//! Each cube side has its own flat colour so orientation is readable
//! without lighting.
//!
//! # Invariants
//! - The renderer never mutates the grid or the camera.
//! - Wall instances are uploaded once; the grid does not change after load.
//! - Projection matrices arrive in OpenGL clip depth and are remapped to
//!   wgpu's `[0, 1]` depth range here.

mod gpu;
mod mesh;
mod shaders;

pub use gpu::WgpuRenderer;
pub use mesh::OPENGL_TO_WGPU;
