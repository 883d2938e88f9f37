//! Navigation core: camera state, motion integration and collision.
//!
//! # Invariants
//! - Integration never consults the grid; it only proposes a position.
//! - After a resolve, the camera footprint (a square of half-width `radius`)
//!   never overlaps a solid cell.
//! - Every per-frame operation is total: nothing here returns an error.

pub mod collision;
pub mod navigation;

pub use collision::CollisionResolver;
pub use navigation::{MovementConfig, MovementFlags, NavigationState};

pub fn crate_info() -> &'static str {
    "blocky-nav v0.1.0"
}
