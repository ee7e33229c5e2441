//! Player motion and shots.

use std::f64::consts::{PI, TAU};

use crate::{
    config::DEFAULT_FOV,
    map::{GridMap, GridPos, Point},
    ray::{HitKind, RayCaster},
    types::Direction,
};

/// Distance covered by one movement key press, in cells.
pub(crate) const MOVE_STEP: f64 = 0.25;

/// Rotation applied by one turn key press, in radians.
pub(crate) const TURN_STEP: f64 = PI / 20.;

/// Field of view gained by one widen key press, in radians.
pub(crate) const FOV_STEP: f64 = PI / 36.;

/// Widest field of view the player can reach, in radians.
pub(crate) const MAX_FOV: f64 = PI * 0.9;

/// Speed of a shot, in cells per second.
pub(crate) const SHOT_SPEED: f64 = 40.;

/// The explorer's body: where it stands, where it looks and how wide it sees.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Player {
    /// Sub-cell position.
    pub(crate) position: Point,
    /// Facing angle in `[0, 2π)`.
    pub(crate) heading: f64,
    /// Field of view, in radians.
    pub(crate) fov: f64,
}

impl Player {
    /// Places a player at `position` facing east with the given field of view.
    pub(crate) const fn new(position: Point, fov: f64) -> Self {
        Self {
            position,
            heading: 0.,
            fov,
        }
    }

    /// Returns the cell the player stands in.
    pub(crate) fn cell(&self) -> Option<GridPos> {
        GridPos::containing(self.position)
    }

    /// Applies a motion, undoing a step that would end inside a non-open cell.
    ///
    /// Returns whether the player moved or turned.
    pub(crate) fn apply(&mut self, direction: Direction, map: &GridMap) -> bool {
        match direction {
            Direction::TurnLeft => self.turn(TURN_STEP),
            Direction::TurnRight => self.turn(-TURN_STEP),
            Direction::Forward => self.step(MOVE_STEP, map),
            Direction::Backward => self.step(-MOVE_STEP, map),
        }
    }

    /// Rotates by `delta` radians and normalises the heading.
    fn turn(&mut self, delta: f64) -> bool {
        self.heading = (self.heading + delta).rem_euclid(TAU);
        true
    }

    /// Moves `distance` cells along the heading, rolling back when the target is not open.
    fn step(&mut self, distance: f64, map: &GridMap) -> bool {
        let previous = self.position;
        self.position = previous.advanced(self.heading, distance);

        if self.cell().is_some_and(|cell| map.is_open(cell)) {
            true
        } else {
            self.position = previous;
            false
        }
    }

    /// Widens the field of view by one increment, up to [`MAX_FOV`].
    pub(crate) fn widen_fov(&mut self) {
        self.fov = (self.fov + FOV_STEP).min(MAX_FOV);
    }

    /// Restores the default field of view.
    pub(crate) fn reset_fov(&mut self) {
        self.fov = DEFAULT_FOV;
    }

    /// Returns the glyph drawn for the player on the minimap, by facing quadrant.
    pub(crate) fn tile(&self) -> char {
        let heading = self.heading;
        if !(PI / 4.0..7.0 * PI / 4.0).contains(&heading) {
            '>'
        } else if heading < 3.0 * PI / 4.0 {
            '^'
        } else if heading < 5.0 * PI / 4.0 {
            '<'
        } else {
            'v'
        }
    }
}

/// What happened to a shot during one update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ShotEvent {
    /// The shot is still in flight.
    Flying,
    /// The shot struck the target cell.
    HitTarget,
    /// The shot struck a wall or left the map.
    Spent,
}

/// Projectile fired along the player's heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Shot {
    /// Current position.
    pub(crate) position: Point,
    /// Travel angle.
    pub(crate) angle: f64,
}

impl Shot {
    /// Advances the shot by `elapsed` seconds of flight.
    ///
    /// The travelled segment is traced with the ray caster, so a fast shot cannot skip over a
    /// wall or the target between two frames.
    pub(crate) fn advance(
        &mut self,
        elapsed: f64,
        caster: &RayCaster,
        map: &GridMap,
        target: Option<GridPos>,
    ) -> ShotEvent {
        let travel = SHOT_SPEED * elapsed.max(0.);
        let hit = caster.cast(self.position, self.angle, map, travel, target);

        match hit.kind {
            HitKind::None => {
                self.position = self.position.advanced(self.angle, travel);
                ShotEvent::Flying
            }
            HitKind::Target => ShotEvent::HitTarget,
            HitKind::Wall | HitKind::OutOfBounds => ShotEvent::Spent,
        }
    }
}
