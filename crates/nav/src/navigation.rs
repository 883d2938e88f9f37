use blocky_common::{CellCoord, Direction, Pose};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Held-key state for the four movement directions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementFlags {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementFlags {
    pub fn set(&mut self, direction: Direction, active: bool) {
        match direction {
            Direction::Forward => self.forward = active,
            Direction::Backward => self.backward = active,
            Direction::Left => self.left = active,
            Direction::Right => self.right = active,
        }
    }

    pub fn is_set(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.forward,
            Direction::Backward => self.backward,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Speeds and eye height for the walking camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// World units per second.
    pub move_speed: f32,
    /// Radians per second.
    pub turn_speed: f32,
    /// Constant camera height above the floor.
    pub eye_height: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            move_speed: 1.8,
            turn_speed: 1.8,
            eye_height: 0.5,
        }
    }
}

/// The single camera: position, yaw and held movement keys.
///
/// Owned by whoever drives the frame loop and passed by reference to input
/// handling and collision; there is no global camera.
#[derive(Debug, Clone)]
pub struct NavigationState {
    position: Vec3,
    yaw: f32,
    flags: MovementFlags,
}

impl NavigationState {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            yaw,
            flags: MovementFlags::default(),
        }
    }

    /// Camera standing in the middle of `cell`, facing -Z.
    pub fn at_cell(cell: CellCoord, eye_height: f32) -> Self {
        Self::new(cell.center(eye_height), 0.0)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.yaw)
    }

    pub fn flags(&self) -> MovementFlags {
        self.flags
    }

    /// Record a key transition. Setting a flag to its current value is a no-op.
    pub fn set_movement_flag(&mut self, direction: Direction, active: bool) {
        self.flags.set(direction, active);
    }

    /// Forget every held key. Called when the window loses focus, since the
    /// matching key-up events will never arrive.
    pub fn clear_all_flags(&mut self) {
        self.flags.clear();
    }

    /// Advance one step and return the proposed position.
    ///
    /// Translation uses the yaw at the start of the step; yaw is then
    /// updated in place. Opposite keys cancel algebraically. The grid is not
    /// consulted, so the result must go through a collision resolve before
    /// being committed.
    pub fn integrate(&mut self, turn_speed: f32, move_speed: f32, step: f32) -> Vec3 {
        let (sin, cos) = self.yaw.sin_cos();
        let distance = move_speed * step;
        let mut proposed = self.position;

        if self.flags.forward {
            proposed.x += sin * distance;
            proposed.z -= cos * distance;
        }
        if self.flags.backward {
            proposed.x -= sin * distance;
            proposed.z += cos * distance;
        }

        if self.flags.left {
            self.yaw -= turn_speed * step;
        }
        if self.flags.right {
            self.yaw += turn_speed * step;
        }

        proposed
    }

    /// Accept a resolved position. Height is left unchanged.
    pub fn commit(&mut self, accepted: Vec3) {
        self.position.x = accepted.x;
        self.position.z = accepted.z;
    }
}
