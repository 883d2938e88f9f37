//! Maze grid: an immutable occupancy map derived from a 2D image.
//!
//! # Invariants
//! - Exactly the cells whose source pixel matches the wall colour are solid.
//! - At most one cell is the spawn marker; the last one scanned wins.
//! - Anything outside the map is solid.
//! - The grid is never mutated after load.

mod map;
mod palette;

pub use map::{Cell, GridMap, MapLoadError, SolidCells};
pub use palette::MapPalette;

pub fn crate_info() -> &'static str {
    "blocky-grid v0.1.0"
}
