use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A cell coordinate in the maze grid. `x` is the column, `z` the row.
///
/// One cell spans `[x, x + 1) × [z, z + 1)` in world units on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The cell containing a world-space XZ point.
    pub fn containing(x: f32, z: f32) -> Self {
        Self {
            x: x.floor() as i32,
            z: z.floor() as i32,
        }
    }

    /// World-space centre of the cell at the given height.
    pub fn center(self, y: f32) -> Vec3 {
        Vec3::new(self.x as f32 + 0.5, y, self.z as f32 + 0.5)
    }
}

/// One of the four held-key directions the navigation layer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
    /// Turn left (yaw decreases).
    Left,
    /// Turn right (yaw increases).
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
    ];
}

/// Camera pose: eye position plus yaw in radians.
///
/// Yaw is unbounded. Zero faces -Z; forward is `(sin(yaw), 0, -cos(yaw))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub yaw: f32,
}

impl Pose {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Unit forward vector on the XZ plane.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// The grid cell the eye is standing in.
    pub fn cell(&self) -> CellCoord {
        CellCoord::containing(self.position.x, self.position.z)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
        }
    }
}
