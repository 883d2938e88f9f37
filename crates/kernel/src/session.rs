use blocky_common::Pose;
use blocky_grid::GridMap;
use blocky_input::Action;
use blocky_nav::{CollisionResolver, MovementConfig, NavigationState};
use blocky_render::{ProjectionBuilder, RenderView};
use glam::Mat4;

use crate::config::EngineConfig;

/// Upper bound on collision sub-steps within one frame.
pub const MAX_SUBSTEPS: u32 = 4096;

/// One walk through one maze.
///
/// Owns the grid and the camera and drives the per-frame sequence:
/// actions in, integrate, resolve, commit, view out. Single-threaded; the
/// caller schedules frames.
#[derive(Debug)]
pub struct Session {
    grid: GridMap,
    nav: NavigationState,
    resolver: CollisionResolver,
    movement: MovementConfig,
    lens: ProjectionBuilder,
    projection: Mat4,
    max_substep: f32,
    frame: u64,
}

impl Session {
    /// Place the camera at the centre of the spawn cell, facing -Z.
    ///
    /// `config` is expected to have passed [`EngineConfig::validate`].
    pub fn new(grid: GridMap, config: &EngineConfig, viewport: (u32, u32)) -> Self {
        let spawn = grid.spawn_point();
        let nav = NavigationState::at_cell(spawn, config.movement.eye_height);
        let resolver = config.collision.resolver();

        if resolver.overlaps_solid(nav.position(), &grid) {
            tracing::warn!(x = spawn.x, z = spawn.z, "spawn overlaps a wall");
        }

        let lens = config.projection;
        let projection = lens.for_viewport(viewport.0, viewport.1);
        tracing::info!(
            width = grid.width(),
            height = grid.height(),
            spawn_x = spawn.x,
            spawn_z = spawn.z,
            "session started"
        );

        Self {
            grid,
            nav,
            resolver,
            movement: config.movement,
            lens,
            projection,
            max_substep: config.max_substep,
            frame: 0,
        }
    }

    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.nav
    }

    pub fn resolver(&self) -> &CollisionResolver {
        &self.resolver
    }

    pub fn pose(&self) -> Pose {
        self.nav.pose()
    }

    /// Latest projection matrix.
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Number of completed `advance` calls.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Feed one input action. `Quit` and `Noop` are left to the caller.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Move { direction, active } => {
                tracing::trace!(?direction, active, "movement key");
                self.nav.set_movement_flag(direction, active);
            }
            Action::ReleaseAll => {
                tracing::debug!("releasing all movement keys");
                self.nav.clear_all_flags();
            }
            Action::Resize { width, height } => self.resize(width, height),
            Action::Quit | Action::Noop => {}
        }
    }

    /// Rebuild the projection for a new viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection = self.lens.for_viewport(width, height);
    }

    /// Advance the camera by `step` seconds and return the accepted pose.
    ///
    /// Steps that could move further than `max_substep` are split into equal
    /// sub-steps, each integrated and resolved on its own. A single frame
    /// never travels further than the width plus height of the map, or
    /// [`MAX_SUBSTEPS`] sub-steps; longer steps are shortened. Negative or
    /// non-finite steps leave the camera where it is.
    pub fn advance(&mut self, mut step: f32) -> Pose {
        self.frame += 1;
        if !(step.is_finite() && step >= 0.0) {
            tracing::warn!(step, "ignoring invalid frame step");
            return self.pose();
        }

        let max_distance = ((self.grid.width() + self.grid.height()) as f32)
            .min(MAX_SUBSTEPS as f32 * self.max_substep);
        let mut distance = self.movement.move_speed * step;
        if distance > max_distance {
            let clamped = max_distance / self.movement.move_speed;
            tracing::warn!(step, clamped, "frame step too long, shortening");
            step = clamped;
            distance = max_distance;
        }
        let substeps = (distance / self.max_substep).ceil().max(1.0) as u32;
        let dt = step / substeps as f32;

        for _ in 0..substeps {
            let current = self.nav.position();
            let proposed = self
                .nav
                .integrate(self.movement.turn_speed, self.movement.move_speed, dt);
            let accepted = self.resolver.resolve(current, proposed, &self.grid);
            self.nav.commit(accepted);
        }

        self.pose()
    }

    /// Snapshot for the renderer.
    pub fn view(&self) -> RenderView {
        RenderView::new(self.nav.pose(), self.projection)
    }
}
