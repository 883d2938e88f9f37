//! Shared types for the blocky navigation engine.
//!
//! Everything here is plain data: grid cell addressing, the four movement
//! directions the input layer produces, and the camera pose handed to renderers.

mod types;

pub use types::{CellCoord, Direction, Pose};
