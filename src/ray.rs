//! Incremental ray marching over a grid map.
//!
//! This module contains the [`RayCaster`], which walks a single ray from a sub-cell origin in fixed
//! increments until it meets a wall, a distinguished target cell, the edge of the grid or its
//! maximum depth. Alongside the distance it reports the kind of hit, whether the hit landed next to
//! a cell corner, and the trail of cells the ray crossed.

use color_eyre::eyre::{ensure, Result};
use log::trace;

use crate::map::{GridMap, GridPos, Point};

/// Default marching increment, in cells.
///
/// Larger increments are cheaper but let rays tunnel through the corners of thin walls.
pub const DEFAULT_STEP: f64 = 0.1;

/// Default angular tolerance, in radians, for flagging hits next to a cell corner.
pub const DEFAULT_EDGE_TOLERANCE: f64 = 0.01;

/// Number of nearest cell corners checked for the boundary flag.
const NEAREST_CORNERS: usize = 3;

/// Classification of the event that stopped a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HitKind {
    /// Nothing was hit before the maximum depth; the ray sees the void.
    None,
    /// The ray stopped on a blocked cell.
    Wall,
    /// The ray stopped on the distinguished target cell.
    Target,
    /// The ray left the grid.
    OutOfBounds,
}

impl HitKind {
    /// Returns whether the hit has a surface to draw and to test for corners.
    #[must_use]
    pub const fn is_surface(self) -> bool {
        matches!(self, Self::Wall | Self::Target)
    }
}

/// Result of casting one ray.
#[derive(Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Absolute angle the ray was cast along.
    pub angle: f64,
    /// Distance from the origin to the stopping point.
    ///
    /// This is the Euclidean distance as marched, unless the hit went through
    /// [`RayHit::with_fish_eye_correction`].
    pub distance: f64,
    /// What stopped the ray.
    pub kind: HitKind,
    /// Whether the stopping point lies next to a corner of the hit cell.
    pub boundary: bool,
    /// Cells crossed before the stop, in order and without consecutive repeats.
    pub trail: Vec<GridPos>,
}

impl RayHit {
    /// Returns the hit with its distance rescaled to remove fish-eye distortion.
    #[must_use]
    pub fn with_fish_eye_correction(mut self, heading: f64) -> Self {
        self.distance = correct_fish_eye(self.distance, self.angle, heading);
        self
    }
}

/// Rescales a ray distance to the perpendicular distance from the viewing plane.
///
/// Without this correction, columns swept away from the heading report longer distances and
/// straight walls render curved.
#[must_use]
pub fn correct_fish_eye(distance: f64, ray_angle: f64, heading: f64) -> f64 {
    distance * (ray_angle - heading).cos()
}

/// Marches rays across a [`GridMap`].
///
/// The caster holds only its tuning; every call to [`RayCaster::cast`] builds its ray from
/// scratch, so one caster can serve any number of columns and frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayCaster {
    /// Marching increment, in cells.
    step: f64,
    /// Angular tolerance for the boundary flag, in radians.
    edge_tolerance: f64,
}

impl Default for RayCaster {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            edge_tolerance: DEFAULT_EDGE_TOLERANCE,
        }
    }
}

impl RayCaster {
    /// Creates a caster marching in increments of `step` cells.
    ///
    /// # Errors
    ///
    /// This function returns an error if `step` is not a positive finite number, since such a ray
    /// would never advance towards its maximum depth.
    pub fn new(step: f64) -> Result<Self> {
        ensure!(
            step.is_finite() && step > 0.,
            "marching step must be a positive number of cells, got {step}"
        );

        Ok(Self {
            step,
            edge_tolerance: DEFAULT_EDGE_TOLERANCE,
        })
    }

    /// Returns the caster with a different corner tolerance.
    #[must_use]
    pub const fn with_edge_tolerance(mut self, edge_tolerance: f64) -> Self {
        self.edge_tolerance = edge_tolerance;
        self
    }

    /// Returns the marching increment.
    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Casts a ray from `origin` along the absolute `angle`.
    ///
    /// The ray advances along `(cos angle, -sin angle)` one increment at a time and tests the cell
    /// under each sample, starting with the origin itself. It stops:
    /// - outside the grid, as [`HitKind::OutOfBounds`]
    /// - on a blocked cell, as [`HitKind::Wall`]
    /// - on `target`, as [`HitKind::Target`]
    /// - once the marched distance reaches `max_depth`, as [`HitKind::None`]
    ///
    /// A target cell stops the ray even when it is blocked. An origin already inside a wall,
    /// outside the grid or on the target stops at distance zero. The march also ends, as
    /// [`HitKind::None`], if the increment count saturates before reaching `max_depth`.
    #[must_use]
    pub fn cast(
        &self,
        origin: Point,
        angle: f64,
        map: &GridMap,
        max_depth: f64,
        target: Option<GridPos>,
    ) -> RayHit {
        let mut trail = Vec::new();
        let mut steps: u32 = 0;

        loop {
            let distance = f64::from(steps) * self.step;
            if steps == u32::MAX || max_depth.is_nan() || distance >= max_depth {
                return RayHit {
                    angle,
                    distance,
                    kind: HitKind::None,
                    boundary: false,
                    trail,
                };
            }

            let sample = origin.advanced(angle, distance);
            let cell = GridPos::containing(sample).filter(|&cell| map.contains(cell));
            let kind = match cell {
                None => HitKind::OutOfBounds,
                Some(cell) if target == Some(cell) => HitKind::Target,
                Some(cell) if !map.is_open(cell) => HitKind::Wall,
                Some(cell) => {
                    if trail.last() != Some(&cell) {
                        trail.push(cell);
                    }
                    steps += 1;
                    continue;
                }
            };

            let boundary = kind.is_surface()
                && cell.is_some_and(|cell| self.near_corner(origin, angle, cell));
            trace!("ray at {angle:.3} rad stopped on {kind:?} after {distance:.2} cells");

            return RayHit {
                angle,
                distance,
                kind,
                boundary,
                trail,
            };
        }
    }

    /// Returns whether the ray passes within the tolerance of one of the hit cell's nearest
    /// corners.
    ///
    /// The four corners are ordered by their distance from the origin and only the nearest ones
    /// are checked; the far corners always sit behind the visible faces. Corners coinciding with
    /// the origin carry no direction and are skipped.
    fn near_corner(&self, origin: Point, angle: f64, cell: GridPos) -> bool {
        let (dir_x, dir_y) = (angle.cos(), -angle.sin());

        let mut corners: Vec<(f64, f64)> = [(0, 0), (1, 0), (0, 1), (1, 1)]
            .into_iter()
            .filter_map(|(tx, ty)| {
                let corner = Point::new(f64::from(cell.x + tx), f64::from(cell.y + ty));
                let (vx, vy) = (corner.x - origin.x, corner.y - origin.y);
                let length = vx.hypot(vy);
                (length > f64::EPSILON).then(|| {
                    let cosine = dir_x.mul_add(vx, dir_y * vy) / length;
                    (length, cosine.clamp(-1.0, 1.0).acos())
                })
            })
            .collect();
        corners.sort_by(|lhs, rhs| lhs.0.total_cmp(&rhs.0));

        corners
            .iter()
            .take(NEAREST_CORNERS)
            .any(|&(_, deviation)| deviation < self.edge_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    use super::*;

    /// Builds a walled 7x7 room with an open interior.
    fn create_room() -> GridMap {
        GridMap::parse(
            "\
#######
#     #
#     #
#     #
#     #
#     #
#######",
        )
        .expect("failed to parse room")
    }

    /// Builds a fully open map with no walls at all.
    fn create_open_field() -> GridMap {
        let row = " ".repeat(64);
        GridMap::from_rows(&vec![row; 64]).expect("failed to build open field")
    }

    #[test]
    fn test_cast_reaches_max_depth_in_open_field() {
        let map = create_open_field();
        let caster = RayCaster::default();

        for angle in [0.0, FRAC_PI_4, FRAC_PI_2, PI, 4.0] {
            let hit = caster.cast(Point::new(32.0, 32.0), angle, &map, 10.0, None);

            assert_eq!(hit.kind, HitKind::None, "open field ray should see the void");
            assert!(
                (hit.distance - 10.0).abs() <= caster.step(),
                "void distance {} should be close to max depth",
                hit.distance
            );
            assert!(!hit.boundary, "void hits carry no boundary flag");
        }
    }

    #[test]
    fn test_cast_hits_wall_one_cell_away() {
        let map = GridMap::parse("#####\n#   #\n#####").expect("failed to parse map");
        let caster = RayCaster::default();

        let hit = caster.cast(Point::new(2.0, 1.5), 0.0, &map, 16.0, None);

        assert_eq!(hit.kind, HitKind::Wall, "ray should stop on the east wall");
        assert!(
            (hit.distance - 2.0).abs() <= caster.step() + 1e-9,
            "distance {} should be about two cells",
            hit.distance
        );

        let hit = caster.cast(Point::new(3.0, 1.5), 0.0, &map, 16.0, None);
        assert_eq!(hit.kind, HitKind::Wall, "ray should stop on the east wall");
        assert!(
            (hit.distance - 1.0).abs() <= caster.step() + 1e-9,
            "distance {} should be about one cell",
            hit.distance
        );
    }

    #[test]
    fn test_cast_up_moves_towards_lower_rows() {
        let map = create_room();
        let caster = RayCaster::default();

        let hit = caster.cast(Point::new(3.5, 4.5), FRAC_PI_2, &map, 16.0, None);

        assert_eq!(hit.kind, HitKind::Wall, "ray should hit the top wall");
        assert!(
            (hit.distance - 3.5).abs() <= caster.step() + 1e-9,
            "distance {} should reach the top wall",
            hit.distance
        );
        assert_eq!(
            hit.trail.last(),
            Some(&GridPos::new(3, 1)),
            "trail should end in the row below the wall"
        );
    }

    #[test]
    fn test_cast_reports_target() {
        let map = create_room();
        let caster = RayCaster::default();
        let target = GridPos::new(4, 3);

        let hit = caster.cast(Point::new(1.5, 3.5), 0.0, &map, 16.0, Some(target));

        assert_eq!(hit.kind, HitKind::Target, "ray should stop on the target");
        assert!(
            (hit.distance - 2.5).abs() <= caster.step() + 1e-9,
            "distance {} should reach the target face",
            hit.distance
        );
    }

    #[test]
    fn test_cast_origin_inside_wall() {
        let map = create_room();
        let hit = RayCaster::default().cast(Point::new(0.5, 0.5), 0.3, &map, 16.0, None);

        assert_eq!(hit.kind, HitKind::Wall, "origin inside a wall is a wall hit");
        assert!(hit.distance.abs() < f64::EPSILON, "hit should be at distance zero");
        assert!(hit.trail.is_empty(), "no open cell was crossed");
    }

    #[test]
    fn test_cast_origin_out_of_bounds() {
        let map = create_room();
        let hit = RayCaster::default().cast(Point::new(-3.0, 2.0), 0.0, &map, 16.0, None);

        assert_eq!(hit.kind, HitKind::OutOfBounds, "origin outside the grid");
        assert!(hit.distance.abs() < f64::EPSILON, "hit should be at distance zero");
        assert!(!hit.boundary, "out-of-bounds hits carry no boundary flag");
    }

    #[test]
    fn test_cast_leaves_open_grid() {
        let map = GridMap::parse("     ").expect("failed to parse map");
        let hit = RayCaster::default().cast(Point::new(0.5, 0.5), 0.0, &map, 16.0, None);

        assert_eq!(hit.kind, HitKind::OutOfBounds, "ray should leave the grid");
        assert_eq!(hit.trail.len(), 5, "every cell of the row should be crossed");
    }

    #[test]
    fn test_trail_has_no_consecutive_repeats() {
        let map = create_room();
        let hit = RayCaster::default().cast(Point::new(1.2, 5.3), 0.7, &map, 16.0, None);

        assert!(!hit.trail.is_empty(), "ray should cross open cells");
        assert_eq!(
            hit.trail.first(),
            Some(&GridPos::new(1, 5)),
            "trail should start at the origin cell"
        );
        assert!(
            hit.trail.windows(2).all(|pair| pair.first() != pair.get(1)),
            "consecutive trail cells should differ"
        );
        assert!(
            hit.trail.iter().all(|&cell| map.is_open(cell)),
            "trail should only contain open cells"
        );
    }

    #[test]
    fn test_boundary_flag_on_corner_hit() {
        let map = create_room();
        let caster = RayCaster::default();

        // Aimed exactly at the top-left corner of the east wall cell (6, 3).
        let origin = Point::new(3.5, 3.5);
        let angle = (0.5_f64).atan2(2.5);
        let hit = caster.cast(origin, angle, &map, 16.0, None);

        assert_eq!(hit.kind, HitKind::Wall, "ray should hit the east wall");
        assert!(hit.boundary, "hit next to a corner should be flagged");
    }

    #[test]
    fn test_zero_edge_tolerance_never_flags() {
        let map = create_room();
        let caster = RayCaster::default().with_edge_tolerance(0.0);

        let hit = caster.cast(Point::new(3.5, 3.5), (0.5_f64).atan2(2.5), &map, 16.0, None);

        assert_eq!(hit.kind, HitKind::Wall, "ray should hit the east wall");
        assert!(!hit.boundary, "a zero tolerance should disable the corner flag");
    }

    #[test]
    fn test_boundary_flag_on_target_corner() {
        let map = create_room();
        let caster = RayCaster::default();
        let target = GridPos::new(5, 2);

        // Aimed exactly at the bottom-left corner of the target cell.
        let hit = caster.cast(Point::new(3.5, 3.5), (0.5_f64).atan2(1.5), &map, 16.0, Some(target));

        assert_eq!(hit.kind, HitKind::Target, "ray should stop on the target");
        assert!(hit.boundary, "target hit next to a corner should be flagged");
        assert!(
            (hit.distance - 1.6).abs() < 1e-9,
            "distance {} should be the first sample past the corner",
            hit.distance
        );
    }

    #[test]
    fn test_blocked_target_reports_target() {
        let map = create_room();
        let caster = RayCaster::default();
        let target = GridPos::new(6, 3);

        let hit = caster.cast(Point::new(3.5, 3.5), 0.0, &map, 16.0, Some(target));

        assert_eq!(hit.kind, HitKind::Target, "a blocked target is reported as the target");
        assert!(
            (hit.distance - 2.5).abs() <= caster.step() + 1e-9,
            "distance {} should reach the target face",
            hit.distance
        );
    }

    #[test]
    fn test_target_outside_grid_is_out_of_bounds() {
        let map = GridMap::parse("   ").expect("failed to parse map");
        let caster = RayCaster::default();

        let hit = caster.cast(Point::new(0.5, 0.5), 0.0, &map, 16.0, Some(GridPos::new(3, 0)));

        assert_eq!(
            hit.kind,
            HitKind::OutOfBounds,
            "leaving the grid takes precedence over a target beyond it"
        );
    }

    #[test]
    fn test_new_rejects_non_advancing_steps() {
        for step in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(
                RayCaster::new(step).is_err(),
                "step {step} should be rejected"
            );
        }

        let caster = RayCaster::new(0.25).expect("a positive step should be accepted");
        assert!((caster.step() - 0.25).abs() < f64::EPSILON, "step should be kept");
    }

    #[test]
    fn test_nan_depth_stops_immediately() {
        let map = create_open_field();
        let hit = RayCaster::default().cast(Point::new(32.0, 32.0), 0.0, &map, f64::NAN, None);

        assert_eq!(hit.kind, HitKind::None, "an undefined depth sees the void");
        assert!(hit.trail.is_empty(), "no cell should be marched");
    }

    #[test]
    fn test_boundary_flag_clear_mid_face() {
        let map = create_room();
        let hit = RayCaster::default().cast(Point::new(3.5, 3.5), 0.0, &map, 16.0, None);

        assert_eq!(hit.kind, HitKind::Wall, "ray should hit the east wall");
        assert!(!hit.boundary, "hit in the middle of a face should not be flagged");
    }

    #[test]
    fn test_fish_eye_identity_on_heading() {
        let corrected = correct_fish_eye(4.2, 1.3, 1.3);

        assert!(
            (corrected - 4.2).abs() < 1e-12,
            "correction along the heading should leave the distance unchanged"
        );
    }

    #[test]
    fn test_fish_eye_shortens_off_axis_rays() {
        let corrected = correct_fish_eye(2.0, 0.5, 0.0);

        assert!(
            (corrected - 2.0 * 0.5_f64.cos()).abs() < 1e-12,
            "off-axis distance should be scaled by the cosine of the offset"
        );
    }

    #[test]
    fn test_with_fish_eye_correction_keeps_classification() {
        let map = create_room();
        let hit = RayCaster::default()
            .cast(Point::new(3.5, 3.5), 0.2, &map, 16.0, None)
            .with_fish_eye_correction(0.0);

        assert_eq!(hit.kind, HitKind::Wall, "correction should not change the hit kind");
        assert!(
            (hit.angle - 0.2).abs() < f64::EPSILON,
            "correction should not change the angle"
        );
    }
}
