use std::f32::consts::PI;

use glam::Mat4;
use serde::{Deserialize, Serialize};

/// Symmetric-frustum perspective matrix with OpenGL clip depth (`[-1, 1]`).
///
/// ```text
/// f = 1 / tan(fov / 2)      a = f / aspect
/// col0 = [a 0 0 0]
/// col1 = [0 f 0 0]
/// col2 = [0 0 (far + near) / (near - far)      -1]
/// col3 = [0 0 (2 * far * near) / (near - far)   0]
/// ```
///
/// # Panics
/// The caller controls every input, so bad values are bugs: `fov` must be in
/// `(0, π)`, `0 < z_near < z_far`, and `aspect` positive and finite.
pub fn perspective(fov: f32, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
    assert!(fov > 0.0 && fov < PI, "fov must be in (0, pi) radians, got {fov}");
    assert!(
        z_near > 0.0 && z_near < z_far,
        "clip planes must satisfy 0 < near < far, got near={z_near} far={z_far}"
    );
    assert!(
        aspect > 0.0 && aspect.is_finite(),
        "aspect ratio must be positive and finite, got {aspect}"
    );

    let f = 1.0 / (fov / 2.0).tan();
    let a = f / aspect;
    let c = (z_far + z_near) / (z_near - z_far);
    let d = (2.0 * z_far * z_near) / (z_near - z_far);

    #[rustfmt::skip]
    let cols = [
        a,   0.0, 0.0, 0.0,
        0.0, f,   0.0, 0.0,
        0.0, 0.0, c,   -1.0,
        0.0, 0.0, d,   0.0,
    ];
    Mat4::from_cols_array(&cols)
}

/// Viewport aspect ratio. A zero height (minimised window) counts as one pixel.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// Camera lens settings; turns a viewport size into a projection matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionBuilder {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for ProjectionBuilder {
    fn default() -> Self {
        Self {
            fov_degrees: 90.0,
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

impl ProjectionBuilder {
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    pub fn build(&self, aspect: f32) -> Mat4 {
        perspective(self.fov_radians(), aspect, self.z_near, self.z_far)
    }

    pub fn for_viewport(&self, width: u32, height: u32) -> Mat4 {
        let aspect = aspect_ratio(width, height);
        tracing::debug!(width, height, aspect, "rebuilding projection");
        self.build(aspect)
    }
}
