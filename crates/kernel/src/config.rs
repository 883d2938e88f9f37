//! Engine configuration.
//!
//! Loaded from YAML. Every field has a default, so a partial file (or no
//! file at all) works.

use std::path::{Path, PathBuf};

use blocky_grid::MapPalette;
use blocky_input::KeyBindings;
use blocky_nav::{CollisionResolver, MovementConfig};
use blocky_render::ProjectionBuilder;
use serde::{Deserialize, Serialize};

use crate::timing::StepMode;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Player footprint used for collision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Half-width of the square footprint, at most half a cell.
    pub radius: f32,
    /// Gap left between the footprint and a wall after a clamp.
    pub margin: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        let resolver = CollisionResolver::default();
        Self {
            radius: resolver.radius(),
            margin: resolver.margin(),
        }
    }
}

impl CollisionConfig {
    /// # Panics
    /// On values [`EngineConfig::validate`] would reject.
    pub fn resolver(&self) -> CollisionResolver {
        CollisionResolver::new(self.radius, self.margin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Blocky Basement".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Map image (or `.txt` text map) to load at startup.
    pub map: PathBuf,
    pub palette: MapPalette,
    pub movement: MovementConfig,
    pub collision: CollisionConfig,
    pub projection: ProjectionBuilder,
    pub timing: StepMode,
    /// Longest distance a single collision resolve may cover. Larger frame
    /// steps are split into sub-steps.
    pub max_substep: f32,
    pub bindings: KeyBindings,
    pub window: WindowConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            map: PathBuf::from("level.png"),
            palette: MapPalette::default(),
            movement: MovementConfig::default(),
            collision: CollisionConfig::default(),
            projection: ProjectionBuilder::default(),
            timing: StepMode::default(),
            max_substep: 0.2,
            bindings: KeyBindings::default(),
            window: WindowConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read, parse and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would trip a precondition assert later on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        let c = &self.collision;
        if !(c.radius > 0.0 && c.radius <= CollisionResolver::MAX_RADIUS) {
            return invalid(format!(
                "collision.radius must be in (0, {}], got {}",
                CollisionResolver::MAX_RADIUS,
                c.radius
            ));
        }
        if !(c.margin.is_finite() && c.margin > 0.0) {
            return invalid(format!("collision.margin must be > 0, got {}", c.margin));
        }
        if c.radius + c.margin >= CollisionResolver::MAX_RADIUS {
            return invalid(format!(
                "collision.radius + collision.margin must be below {}, got {}",
                CollisionResolver::MAX_RADIUS,
                c.radius + c.margin
            ));
        }

        let p = &self.projection;
        if !(p.fov_degrees > 0.0 && p.fov_degrees < 180.0) {
            return invalid(format!(
                "projection.fov_degrees must be in (0, 180), got {}",
                p.fov_degrees
            ));
        }
        if !(p.z_near > 0.0 && p.z_near < p.z_far) {
            return invalid(format!(
                "projection needs 0 < z_near < z_far, got {} and {}",
                p.z_near, p.z_far
            ));
        }

        let m = &self.movement;
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !(positive(m.move_speed) && positive(m.turn_speed)) {
            return invalid(format!(
                "movement speeds must be positive and finite, got move={} turn={}",
                m.move_speed, m.turn_speed
            ));
        }
        if !m.eye_height.is_finite() {
            return invalid("movement.eye_height must be finite".into());
        }

        let step = match self.timing {
            StepMode::Fixed { step } => step,
            StepMode::Variable { max_step } => max_step,
        };
        if !(step > 0.0 && step.is_finite()) {
            return invalid(format!("timing step must be positive, got {step}"));
        }
        if !(self.max_substep > 0.0 && self.max_substep <= 0.5) {
            return invalid(format!(
                "max_substep must be in (0, 0.5], got {}",
                self.max_substep
            ));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return invalid("window size must be non-zero".into());
        }
        Ok(())
    }
}
