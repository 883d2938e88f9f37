//! Session kernel: owns the camera and the map, and steps them once per frame.
//!
//! # Invariants
//! - One thread drives apply → advance → render; nothing here is shared.
//! - Every advance runs integrate, then resolve, then commit.
//! - The projection is rebuilt on every resize.

pub mod config;
pub mod session;
pub mod timing;

pub use config::{CollisionConfig, ConfigError, EngineConfig, WindowConfig};
pub use session::Session;
pub use timing::{FpsCounter, FrameClock, FrameTimes, StepMode};

pub fn crate_info() -> &'static str {
    "blocky-kernel v0.1.0"
}
