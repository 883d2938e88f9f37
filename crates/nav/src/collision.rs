use blocky_grid::GridMap;
use glam::Vec3;

/// Axis-separated sliding collision against unit grid cells.
///
/// The camera footprint is a square of half-width `radius` on the XZ plane.
/// X is resolved first at the current Z, then Z at the already resolved X,
/// so motion into a wall keeps its tangential component and slides.
///
/// `radius + margin` must stay below half a cell: the probes assume the
/// footprint touches at most two cells per axis, and a clamp must leave the
/// footprint strictly inside the cell it started in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResolver {
    radius: f32,
    margin: f32,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new(0.25, 0.02)
    }
}

impl CollisionResolver {
    /// Largest supported footprint half-width.
    pub const MAX_RADIUS: f32 = 0.5;

    /// # Panics
    /// If `radius` is not in `(0, 0.5]`, `margin` is not a positive finite
    /// number, or `radius + margin` reaches half a cell.
    pub fn new(radius: f32, margin: f32) -> Self {
        assert!(
            radius > 0.0 && radius <= Self::MAX_RADIUS,
            "player radius must be in (0, {}], got {radius}",
            Self::MAX_RADIUS
        );
        // a zero margin leaves the clamped edge on the cell border, where
        // the other axis probes into the wall it was just clamped against
        assert!(
            margin.is_finite() && margin > 0.0,
            "collision margin must be finite and positive, got {margin}"
        );
        assert!(
            radius + margin < Self::MAX_RADIUS,
            "player radius plus collision margin must stay below {}, got {}",
            Self::MAX_RADIUS,
            radius + margin
        );
        Self { radius, margin }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    /// Clip the move from `current` to `proposed` against the grid and return
    /// the accepted position. Y passes through untouched.
    ///
    /// Checks at most four cells. Never fails: out-of-bounds space is solid.
    pub fn resolve(&self, current: Vec3, proposed: Vec3, grid: &GridMap) -> Vec3 {
        let r = self.radius;
        let mut accepted = proposed;

        let probes_z = [current.z - r, current.z + r];
        accepted.x = self.resolve_axis(current.x, accepted.x, |edge| {
            probes_z.iter().any(|&z| grid.is_solid(edge, z))
        });

        let probes_x = [accepted.x - r, accepted.x + r];
        accepted.z = self.resolve_axis(current.z, accepted.z, |edge| {
            probes_x.iter().any(|&x| grid.is_solid(x, edge))
        });

        if accepted != proposed {
            tracing::trace!(
                proposed = ?proposed,
                accepted = ?accepted,
                "movement clamped"
            );
        }
        accepted
    }

    /// Resolve one axis. `blocked(edge)` reports whether either probe at the
    /// leading edge coordinate lands in a solid cell.
    fn resolve_axis(&self, current: f32, proposed: f32, blocked: impl Fn(f32) -> bool) -> f32 {
        let (r, m) = (self.radius, self.margin);
        if proposed > current {
            let edge = proposed + r;
            if blocked(edge) {
                return edge.floor() - r - m;
            }
        } else if proposed < current {
            let edge = proposed - r;
            if blocked(edge) {
                return edge.ceil() + r + m;
            }
        }
        proposed
    }

    /// Whether the footprint centred at `position` touches a solid cell.
    ///
    /// The footprint is never wider than one cell, so its four corners
    /// cover every cell it can overlap.
    pub fn overlaps_solid(&self, position: Vec3, grid: &GridMap) -> bool {
        let r = self.radius;
        [(-r, -r), (r, -r), (-r, r), (r, r)]
            .iter()
            .any(|&(dx, dz)| grid.is_solid(position.x + dx, position.z + dz))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::NavigationState;
    use approx::assert_abs_diff_eq;
    use blocky_common::{CellCoord, Direction};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const Y: f32 = 0.5;

    fn grid(rows: &[&str]) -> GridMap {
        GridMap::from_ascii(rows).unwrap()
    }

    #[test]
    fn free_movement_is_untouched() {
        let g = grid(&["...", "...", "..."]);
        let res = CollisionResolver::new(0.25, 0.02);
        let current = Vec3::new(1.5, Y, 1.5);
        let proposed = Vec3::new(1.6, Y, 1.4);
        assert_eq!(res.resolve(current, proposed, &g), proposed);
    }

    #[test]
    fn clamps_moving_positive_x() {
        let g = grid(&["..#"]);
        let res = CollisionResolver::new(0.25, 0.02);
        let out = res.resolve(Vec3::new(1.5, Y, 0.5), Vec3::new(1.9, Y, 0.5), &g);
        assert_abs_diff_eq!(out.x, 2.0 - 0.25 - 0.02, epsilon = 1e-5);
    }

    #[test]
    fn clamps_moving_negative_x() {
        let g = grid(&["#.."]);
        let res = CollisionResolver::new(0.25, 0.02);
        let out = res.resolve(Vec3::new(1.5, Y, 0.5), Vec3::new(1.1, Y, 0.5), &g);
        assert_abs_diff_eq!(out.x, 1.0 + 0.25 + 0.02, epsilon = 1e-5);
    }

    #[test]
    fn clamps_moving_both_z_directions() {
        let g = grid(&["#", ".", "#"]);
        let res = CollisionResolver::new(0.25, 0.02);
        let up = res.resolve(Vec3::new(0.5, Y, 1.5), Vec3::new(0.5, Y, 1.1), &g);
        assert_abs_diff_eq!(up.z, 1.27, epsilon = 1e-5);
        let down = res.resolve(Vec3::new(0.5, Y, 1.5), Vec3::new(0.5, Y, 1.9), &g);
        assert_abs_diff_eq!(down.z, 1.73, epsilon = 1e-5);
    }

    #[test]
    fn map_edge_blocks_like_a_wall() {
        let g = grid(&["."]);
        let res = CollisionResolver::new(0.25, 0.02);
        let out = res.resolve(Vec3::new(0.5, Y, 0.5), Vec3::new(-0.5, Y, 1.5), &g);
        assert_abs_diff_eq!(out.x, 0.27, epsilon = 1e-5);
        assert_abs_diff_eq!(out.z, 0.73, epsilon = 1e-5);
        assert!(!res.overlaps_solid(out, &g));
    }

    #[test]
    fn either_probe_blocks() {
        // Wall only diagonally ahead: the upper probe at z - r hits it.
        let g = grid(&["..#", "...", "..."]);
        let res = CollisionResolver::new(0.3, 0.02);
        let current = Vec3::new(1.5, Y, 1.2);
        let out = res.resolve(current, Vec3::new(1.8, Y, 1.2), &g);
        assert_abs_diff_eq!(out.x, 2.0 - 0.3 - 0.02, epsilon = 1e-5);
    }

    #[test]
    fn diagonal_into_wall_slides_along_it() {
        // Wall to the east only; moving north-east keeps the north component.
        let g = grid(&["...", "..#", "..."]);
        let res = CollisionResolver::new(0.25, 0.02);
        let current = Vec3::new(1.5, Y, 1.5);
        let proposed = Vec3::new(1.9, Y, 1.3);
        let out = res.resolve(current, proposed, &g);
        assert_abs_diff_eq!(out.x, 1.73, epsilon = 1e-5);
        assert_abs_diff_eq!(out.z, 1.3, epsilon = 1e-6);
    }

    #[test]
    fn corner_stops_both_axes() {
        let g = grid(&["###", "#..", "#.."]);
        let res = CollisionResolver::new(0.25, 0.02);
        let out = res.resolve(Vec3::new(1.5, Y, 1.5), Vec3::new(1.1, Y, 1.1), &g);
        assert_abs_diff_eq!(out.x, 1.27, epsilon = 1e-5);
        assert_abs_diff_eq!(out.z, 1.27, epsilon = 1e-5);
    }

    #[test]
    fn z_probe_uses_resolved_x() {
        // Walls east (2, 2) and north-east (2, 1). Once X is clamped against
        // the east wall the Z probes no longer reach column 2, so the
        // north-east wall does not stop the northward slide.
        let g = grid(&["....", "..#.", "..#."]);
        let res = CollisionResolver::new(0.25, 0.02);
        let current = Vec3::new(1.5, Y, 2.5);
        let out = res.resolve(current, Vec3::new(1.9, Y, 2.2), &g);
        assert_abs_diff_eq!(out.x, 1.73, epsilon = 1e-5);
        assert_abs_diff_eq!(out.z, 2.2, epsilon = 1e-6);
    }

    #[test]
    fn y_is_never_checked() {
        let g = grid(&["..."]);
        let res = CollisionResolver::default();
        let out = res.resolve(Vec3::new(1.5, 0.5, 0.5), Vec3::new(1.5, 40.0, 0.5), &g);
        assert_eq!(out.y, 40.0);
    }

    #[test]
    fn pressing_into_a_wall_never_drifts_inside() {
        let g = grid(&["#", ".", "."]);
        let res = CollisionResolver::new(0.3, 0.02);
        let mut nav = NavigationState::new(Vec3::new(0.5, Y, 2.5), 0.0);
        nav.set_movement_flag(Direction::Forward, true);

        let mut settled = Vec::new();
        for frame in 0..400 {
            let current = nav.position();
            let proposed = nav.integrate(0.0, 1.8, 1.0 / 60.0);
            nav.commit(res.resolve(current, proposed, &g));
            assert!(nav.position().z - 0.3 >= 1.0, "frame {frame}: {}", nav.position().z);
            if frame >= 300 {
                settled.push(nav.position().z);
            }
        }
        for z in settled {
            assert!(z <= 1.0 + 0.3 + 0.02 + 1e-5);
        }
    }

    #[test]
    fn scenario_single_wall_above() {
        // "#" over ".": walk north from the lower cell until the wall stops us.
        let g = grid(&["#", "."]);
        let margin = 0.02;
        let res = CollisionResolver::new(0.3, margin);
        let mut nav = NavigationState::new(Vec3::new(0.5, Y, 1.5), 0.0);
        nav.set_movement_flag(Direction::Forward, true);

        let mut min_z = f32::MAX;
        for _ in 0..200 {
            let current = nav.position();
            let proposed = nav.integrate(0.0, 1.8, 1.0 / 60.0);
            nav.commit(res.resolve(current, proposed, &g));
            min_z = min_z.min(nav.position().z);
        }
        assert!(min_z >= 1.3 - 1e-5, "camera reached {min_z}");

        // One more step that overshoots the boundary lands exactly on the clamp.
        let current = Vec3::new(0.5, Y, 1.31);
        let out = res.resolve(current, Vec3::new(0.5, Y, 1.25), &g);
        assert_abs_diff_eq!(out.z, 1.0 + 0.3 + margin, epsilon = 1e-5);
    }

    #[test]
    fn random_walk_never_penetrates() {
        let g = grid(&[
            "########",
            "#..#...#",
            "#..#.#.#",
            "#....#.#",
            "##.###.#",
            "#......#",
            "#.#..#.#",
            "########",
        ]);
        for (seed, radius) in [(1_u64, 0.25_f32), (2, 0.3), (3, 0.1), (4, 0.4)] {
            let res = CollisionResolver::new(radius, 0.02);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut nav = NavigationState::at_cell(CellCoord::new(1, 1), Y);
            assert!(!res.overlaps_solid(nav.position(), &g));

            for step in 0..5_000 {
                if rng.gen_bool(0.1) {
                    for d in Direction::ALL {
                        nav.set_movement_flag(d, rng.gen_bool(0.5));
                    }
                }
                let dt = rng.gen_range(0.001..0.05);
                let current = nav.position();
                let proposed = nav.integrate(2.5, 3.0, dt);
                nav.commit(res.resolve(current, proposed, &g));
                assert!(
                    !res.overlaps_solid(nav.position(), &g),
                    "seed {seed} step {step}: {:?} overlaps a wall",
                    nav.position()
                );
            }
        }
    }

    #[test]
    fn overlap_detection() {
        let g = grid(&["#.."]);
        let res = CollisionResolver::new(0.25, 0.02);
        assert!(!res.overlaps_solid(Vec3::new(1.5, Y, 0.5), &g));
        assert!(res.overlaps_solid(Vec3::new(1.2, Y, 0.5), &g));
        assert!(res.overlaps_solid(Vec3::new(2.9, Y, 0.5), &g));
    }

    #[test]
    #[should_panic(expected = "player radius")]
    fn radius_wider_than_half_a_cell_is_rejected() {
        CollisionResolver::new(0.6, 0.02);
    }

    #[test]
    #[should_panic(expected = "collision margin")]
    fn negative_margin_is_rejected() {
        CollisionResolver::new(0.25, -0.01);
    }

    #[test]
    #[should_panic(expected = "collision margin")]
    fn zero_margin_is_rejected() {
        CollisionResolver::new(0.25, 0.0);
    }

    #[test]
    #[should_panic(expected = "radius plus collision margin")]
    fn radius_plus_margin_reaching_half_a_cell_is_rejected() {
        CollisionResolver::new(0.49, 0.02);
    }

    #[test]
    fn slide_after_clamp_follows_the_pressed_direction() {
        // Wall column on the east. Clamp against it, then walk north along it.
        let g = grid(&["..#", "..#", "..#"]);
        let res = CollisionResolver::new(0.25, 0.02);
        let clamped = res.resolve(Vec3::new(1.5, Y, 2.5), Vec3::new(1.9, Y, 2.5), &g);
        assert_abs_diff_eq!(clamped.x, 1.73, epsilon = 1e-5);
        assert!(!res.overlaps_solid(clamped, &g));

        let mut current = clamped;
        for step in 0..30 {
            let proposed = current - Vec3::Z * 0.1;
            let out = res.resolve(current, proposed, &g);
            assert!(out.z <= current.z, "step {step}: z rose from {} to {}", current.z, out.z);
            assert!(!res.overlaps_solid(out, &g), "step {step}: {out:?} overlaps a wall");
            assert_abs_diff_eq!(out.x, 1.73, epsilon = 1e-5);
            current = out;
        }
        // the map edge stops the slide at the top
        assert_abs_diff_eq!(current.z, 0.27, epsilon = 1e-5);

        // and back south along the same wall
        for step in 0..30 {
            let out = res.resolve(current, current + Vec3::Z * 0.1, &g);
            assert!(out.z >= current.z, "step {step}: z fell from {} to {}", current.z, out.z);
            assert!(!res.overlaps_solid(out, &g));
            current = out;
        }
        assert_abs_diff_eq!(current.z, 2.73, epsilon = 1e-5);
    }
}
