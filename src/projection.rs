//! Column-by-column projection of the grid into a perspective view.
//!
//! This module contains the [`ProjectionScanner`], which sweeps one ray per output column across
//! the viewer's field of view and returns the fish-eye corrected hits in column order for a
//! renderer to turn into wall slices.

use log::debug;

use crate::{
    map::{GridMap, GridPos, Point},
    ray::{RayCaster, RayHit},
};

/// Position and orientation of the eye the view is projected from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewer {
    /// Sub-cell position of the eye.
    pub position: Point,
    /// Absolute facing angle, in radians.
    pub heading: f64,
    /// Angular width of the view, in radians, split evenly around the heading.
    pub fov: f64,
}

impl Viewer {
    /// Returns the absolute ray angle for a column.
    ///
    /// Column zero looks along the left edge of the view (`heading + fov / 2`) and angles decrease
    /// by `fov / columns` per column towards the right.
    #[must_use]
    pub fn column_angle(&self, column: usize, columns: usize) -> f64 {
        let fraction = to_f64(column) / to_f64(columns);

        fraction.mul_add(-self.fov, self.heading + self.fov / 2.)
    }
}

/// Drives a [`RayCaster`] across a field of view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionScanner {
    /// Caster used for every column.
    caster: RayCaster,
    /// Depth at which columns give up and report the void.
    max_depth: f64,
}

impl ProjectionScanner {
    /// Creates a scanner casting with `caster` up to `max_depth` cells.
    #[must_use]
    pub const fn new(caster: RayCaster, max_depth: f64) -> Self {
        Self { caster, max_depth }
    }

    /// Returns the depth at which rays stop.
    #[must_use]
    pub const fn max_depth(&self) -> f64 {
        self.max_depth
    }

    /// Returns the caster used for every column.
    #[must_use]
    pub const fn caster(&self) -> &RayCaster {
        &self.caster
    }

    /// Casts one ray per column and returns the corrected hits in column order.
    ///
    /// Every hit's distance has already been through fish-eye correction against the viewer's
    /// heading. Columns do not depend on each other; only their position in the output does.
    #[must_use]
    pub fn scan(
        &self,
        viewer: &Viewer,
        columns: usize,
        map: &GridMap,
        target: Option<GridPos>,
    ) -> Vec<RayHit> {
        debug!(
            "scanning {columns} columns from ({:.2}, {:.2}) heading {:.3}",
            viewer.position.x, viewer.position.y, viewer.heading
        );

        (0..columns)
            .map(|column| {
                let angle = viewer.column_angle(column, columns);
                self.caster
                    .cast(viewer.position, angle, map, self.max_depth, target)
                    .with_fish_eye_correction(viewer.heading)
            })
            .collect()
    }
}

/// Converts a column count or index to a float.
#[expect(
    clippy::cast_precision_loss,
    reason = "Column counts are terminal widths, far below the 2^52 precision limit."
)]
const fn to_f64(value: usize) -> f64 {
    value as f64
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    use super::*;
    use crate::ray::HitKind;

    /// Builds a walled 9x9 room with an open interior.
    fn create_room() -> GridMap {
        let mut rows = vec!["#########".to_owned()];
        rows.extend(std::iter::repeat("#       #".to_owned()).take(7));
        rows.push("#########".to_owned());
        GridMap::from_rows(&rows).expect("failed to build room")
    }

    /// Builds a viewer in the middle of the room facing east.
    fn create_viewer() -> Viewer {
        Viewer {
            position: Point::new(4.5, 4.5),
            heading: 0.,
            fov: FRAC_PI_2,
        }
    }

    #[test]
    fn test_scan_returns_one_hit_per_column() {
        let map = create_room();
        let scanner = ProjectionScanner::new(RayCaster::default(), 16.);

        let hits = scanner.scan(&create_viewer(), 40, &map, None);

        assert_eq!(hits.len(), 40, "one hit per column");
        assert!(
            hits.iter().all(|hit| hit.kind == HitKind::Wall),
            "every column in a closed room should hit a wall"
        );
    }

    #[test]
    fn test_scan_zero_columns() {
        let map = create_room();
        let scanner = ProjectionScanner::new(RayCaster::default(), 16.);

        assert!(
            scanner.scan(&create_viewer(), 0, &map, None).is_empty(),
            "no columns means no hits"
        );
    }

    #[test]
    fn test_column_angles_sweep_left_to_right() {
        let viewer = create_viewer();

        let first = viewer.column_angle(0, 4);
        let second = viewer.column_angle(1, 4);
        let last = viewer.column_angle(3, 4);

        assert!((first - FRAC_PI_4).abs() < 1e-12, "first column looks left");
        assert!(
            (second - (FRAC_PI_4 - PI / 8.)).abs() < 1e-12,
            "columns step by fov / columns"
        );
        assert!(first > last, "angles decrease to the right");
    }

    #[test]
    fn test_scan_order_matches_column_angles() {
        let map = create_room();
        let scanner = ProjectionScanner::new(RayCaster::default(), 16.);
        let viewer = create_viewer();

        let hits = scanner.scan(&viewer, 12, &map, None);

        for (column, hit) in hits.iter().enumerate() {
            assert!(
                (hit.angle - viewer.column_angle(column, 12)).abs() < f64::EPSILON,
                "hit {column} should belong to column {column}"
            );
        }
    }

    #[test]
    fn test_scan_applies_fish_eye_correction() {
        let map = create_room();
        let scanner = ProjectionScanner::new(RayCaster::default(), 16.);
        let viewer = create_viewer();

        let hits = scanner.scan(&viewer, 2, &map, None);
        let edge = hits.first().expect("scan should return the first column");
        let raw = scanner
            .caster()
            .cast(viewer.position, edge.angle, &map, scanner.max_depth(), None);

        assert!(
            (edge.distance - raw.distance * FRAC_PI_4.cos()).abs() < 1e-12,
            "edge column should be scaled by the cosine of its offset"
        );
    }

    #[test]
    fn test_scan_flat_wall_has_even_corrected_depth() {
        let map = create_room();
        let caster = RayCaster::new(0.01).expect("a fine step should be accepted");
        let scanner = ProjectionScanner::new(caster, 16.);
        let viewer = create_viewer();

        let hits = scanner.scan(&viewer, 20, &map, None);
        let east: Vec<f64> = hits
            .iter()
            .filter(|hit| (hit.angle - viewer.heading).abs() < 0.3)
            .map(|hit| hit.distance)
            .collect();

        assert!(!east.is_empty(), "some columns should face the east wall");
        assert!(
            east.iter().all(|distance| (distance - 3.5).abs() < 0.05),
            "corrected distances to a flat wall should be equal: {east:?}"
        );
    }

    #[test]
    fn test_scan_reports_target_column() {
        let map = create_room();
        let scanner = ProjectionScanner::new(RayCaster::default(), 16.);
        let viewer = Viewer {
            heading: PI,
            ..create_viewer()
        };

        let hits = scanner.scan(&viewer, 9, &map, Some(GridPos::new(2, 4)));

        assert!(
            hits.iter().any(|hit| hit.kind == HitKind::Target),
            "the column facing the target should report it"
        );
    }
}
