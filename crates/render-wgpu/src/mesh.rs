use blocky_common::CellCoord;
use blocky_grid::GridMap;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Remaps OpenGL clip depth `[-1, 1]` to wgpu's `[0, 1]`: `z' = 0.5 z + 0.5 w`.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
]);

const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
const FLOOR_LINE: [f32; 4] = [0.4, 0.4, 0.4, 1.0];

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// World offset of one wall cube.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct WallInstance {
    pub offset: [f32; 3],
}

/// The four vertical sides of a unit cube spanning `[0, 1]` on every axis.
///
/// Top and bottom are never visible from eye height inside the maze, so
/// they are left out. Faces wind counter-clockwise seen from outside.
pub(crate) fn wall_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let v = |position: [f32; 3], color: [f32; 4]| Vertex { position, color };
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        v([0.0, 0.0, 1.0], RED),    v([1.0, 0.0, 1.0], RED),
        v([1.0, 1.0, 1.0], RED),    v([0.0, 1.0, 1.0], RED),
        // -Z face
        v([1.0, 0.0, 0.0], GREEN),  v([0.0, 0.0, 0.0], GREEN),
        v([0.0, 1.0, 0.0], GREEN),  v([1.0, 1.0, 0.0], GREEN),
        // +X face
        v([1.0, 0.0, 1.0], BLUE),   v([1.0, 0.0, 0.0], BLUE),
        v([1.0, 1.0, 0.0], BLUE),   v([1.0, 1.0, 1.0], BLUE),
        // -X face
        v([0.0, 0.0, 0.0], YELLOW), v([0.0, 0.0, 1.0], YELLOW),
        v([0.0, 1.0, 1.0], YELLOW), v([0.0, 1.0, 0.0], YELLOW),
    ];
    let indices = (0..4u16)
        .flat_map(|face| [0, 1, 2, 2, 3, 0].map(|i| face * 4 + i))
        .collect();
    (vertices, indices)
}

/// Floor line grid covering the map, one line per cell border.
pub(crate) fn floor_mesh(width: usize, height: usize) -> Vec<Vertex> {
    let (w, h) = (width as f32, height as f32);
    let mut verts = Vec::with_capacity(2 * (width + height + 2));

    for x in 0..=width {
        let x = x as f32;
        verts.push(Vertex {
            position: [x, 0.0, 0.0],
            color: FLOOR_LINE,
        });
        verts.push(Vertex {
            position: [x, 0.0, h],
            color: FLOOR_LINE,
        });
    }
    for z in 0..=height {
        let z = z as f32;
        verts.push(Vertex {
            position: [0.0, 0.0, z],
            color: FLOOR_LINE,
        });
        verts.push(Vertex {
            position: [w, 0.0, z],
            color: FLOOR_LINE,
        });
    }
    verts
}

pub(crate) fn wall_instances(grid: &GridMap) -> Vec<WallInstance> {
    grid.solid_cells()
        .map(|CellCoord { x, z }| WallInstance {
            offset: [x as f32, 0.0, z as f32],
        })
        .collect()
}
