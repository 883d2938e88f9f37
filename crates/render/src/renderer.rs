use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use blocky_common::{CellCoord, Pose};
use blocky_grid::{Cell, GridMap};
use glam::{Mat4, Vec3};

/// Everything a renderer needs from the navigation core for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Accepted camera position in world space.
    pub position: Vec3,
    /// Camera yaw in radians.
    pub yaw: f32,
    /// Latest projection matrix (OpenGL clip depth).
    pub projection: Mat4,
}

impl RenderView {
    pub fn new(pose: Pose, projection: Mat4) -> Self {
        Self {
            position: pose.position,
            yaw: pose.yaw,
            projection,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.yaw)
    }

    /// World-to-eye transform: turn the world by yaw, then move it so the
    /// camera sits at the origin.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.yaw) * Mat4::from_translation(-self.position)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the grid and a view, then produces output. It never
/// mutates either.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given grid and view.
    fn render(&self, grid: &GridMap, view: &RenderView) -> Self::Output;
}

/// Top-down text renderer.
///
/// Walls are `#`, the spawn cell `S`, floor `.`, and the camera cell shows an
/// arrow pointing the way the camera faces. Used by the CLI and in tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Arrow glyph for a yaw: `^` faces -Z, `>` +X, `v` +Z, `<` -X.
    pub fn heading_glyph(yaw: f32) -> char {
        let sector = ((yaw.rem_euclid(TAU) + FRAC_PI_4) / FRAC_PI_2) as usize % 4;
        ['^', '>', 'v', '<'][sector]
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, grid: &GridMap, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Map {}x{} ({} walls, spawn={},{}) ===\n",
            grid.width(),
            grid.height(),
            grid.solid_count(),
            grid.spawn_point().x,
            grid.spawn_point().z
        ));
        out.push_str(&format!(
            "Camera: pos=({:.2}, {:.2}, {:.2}) yaw={:.1}deg\n",
            view.position.x,
            view.position.y,
            view.position.z,
            view.yaw.to_degrees()
        ));

        let camera = view.pose().cell();
        for z in 0..grid.height() as i32 {
            for x in 0..grid.width() as i32 {
                let coord = CellCoord::new(x, z);
                let glyph = if coord == camera {
                    Self::heading_glyph(view.yaw)
                } else {
                    match grid.cell(coord) {
                        Some(Cell::Solid) => '#',
                        Some(Cell::SpawnMarker) => 'S',
                        _ => '.',
                    }
                };
                out.push(glyph);
            }
            out.push('\n');
        }

        out
    }
}
