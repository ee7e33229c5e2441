//! World state and per-frame update.
//!
//! This module contains the [`Game`], which owns the map, the player, the objective and the shots,
//! keeps the guidance path up to date, and produces the projected view on request. Time enters
//! only through the explicit [`Tick`] values produced by a [`FrameClock`], so the world can be
//! stepped deterministically in tests.

use std::time::Instant;

use color_eyre::eyre::{OptionExt as _, Result};
use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng as _};

use crate::{
    config::Settings,
    map::{GridMap, GridPos},
    objective::Objective,
    pathfinding::PathFinder,
    player::{Player, Shot, ShotEvent},
    projection::{ProjectionScanner, Viewer},
    ray::{RayCaster, RayHit},
    types::Command,
};

/// Minimum time between two shots, in seconds.
pub(crate) const FIRE_COOLDOWN: f64 = 0.25;

/// Weight of the newest frame in the smoothed frame rate.
const FPS_SMOOTHING: f64 = 0.1;

/// Timing of one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Tick {
    /// Seconds since the clock started.
    pub(crate) now: f64,
    /// Seconds since the previous frame.
    pub(crate) delta: f64,
}

/// Wall-clock source of [`Tick`]s with a smoothed frame rate.
#[derive(Clone, Debug)]
pub(crate) struct FrameClock {
    /// When the clock started.
    start: Instant,
    /// When the previous tick was taken.
    previous: Instant,
    /// Exponentially smoothed frames per second.
    fps: f64,
}

impl FrameClock {
    /// Starts a clock at the current instant.
    pub(crate) fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            previous: now,
            fps: 0.,
        }
    }

    /// Takes the timing of the frame that just ended.
    pub(crate) fn tick(&mut self) -> Tick {
        let now = Instant::now();
        let delta = now.duration_since(self.previous).as_secs_f64();
        self.previous = now;

        if delta > 0. {
            let instant = delta.recip();
            self.fps = if self.fps > 0. {
                (instant - self.fps).mul_add(FPS_SMOOTHING, self.fps)
            } else {
                instant
            };
        }

        Tick {
            now: now.duration_since(self.start).as_secs_f64(),
            delta,
        }
    }

    /// Returns the smoothed frame rate.
    pub(crate) const fn fps(&self) -> f64 {
        self.fps
    }
}

/// Rate limiter for firing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct FireControl {
    /// Clock time of the last accepted shot.
    last_shot: Option<f64>,
}

impl FireControl {
    /// Returns whether a shot may be fired at `now`, recording it when so.
    pub(crate) fn try_fire(&mut self, now: f64) -> bool {
        let ready = !matches!(self.last_shot, Some(last) if now - last < FIRE_COOLDOWN);
        if ready {
            self.last_shot = Some(now);
        }
        ready
    }
}

/// The explorable world.
#[derive(Debug)]
pub(crate) struct Game {
    /// Map being explored.
    pub(crate) map: GridMap,
    /// The explorer.
    pub(crate) player: Player,
    /// Current objective.
    pub(crate) objective: Objective,
    /// Shots in flight.
    pub(crate) shots: Vec<Shot>,
    /// Objectives collected so far.
    pub(crate) score: u32,
    /// Route from the player's cell to the objective.
    pub(crate) path: Vec<GridPos>,
    /// Endpoints the cached path was computed for.
    path_key: Option<(GridPos, GridPos)>,
    /// Projection of the world onto view columns.
    scanner: ProjectionScanner,
    /// Firing rate limiter.
    fire: FireControl,
    /// Source of objective placements.
    rng: StdRng,
}

impl Game {
    /// Builds a world on `map` from the given settings.
    ///
    /// The player starts in the first open cell, scanning row after row.
    ///
    /// # Errors
    ///
    /// This function returns an error if the map has no open cell for the player or no open
    /// interior cell for the objective, or if the marching step cannot advance a ray.
    pub(crate) fn new(map: GridMap, settings: &Settings) -> Result<Self> {
        let caster = RayCaster::new(settings.step)?;
        let start = map
            .positions()
            .find(|&pos| map.is_open(pos))
            .ok_or_eyre("map has no open cell to start in")?;
        let mut rng = settings
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let objective = Objective::spawn(&map, Some(start), &mut rng)?;

        info!("player starts at ({}, {})", start.x, start.y);

        let mut game = Self {
            player: Player::new(start.center(), settings.fov),
            objective,
            shots: Vec::new(),
            score: 0,
            path: Vec::new(),
            path_key: None,
            scanner: ProjectionScanner::new(caster, settings.max_depth),
            fire: FireControl::default(),
            rng,
            map,
        };
        game.refresh_path();

        Ok(game)
    }

    /// Applies one command at the time given by `tick`.
    ///
    /// Pausing and quitting belong to the application and are ignored here.
    ///
    /// # Errors
    ///
    /// This function returns an error if a collected objective cannot be placed again.
    pub(crate) fn handle(&mut self, command: Command, tick: Tick) -> Result<()> {
        match command {
            Command::Move(direction) => {
                if self.player.apply(direction, &self.map) {
                    self.collect_if_reached()?;
                    self.refresh_path();
                }
            }
            Command::WidenFov => self.player.widen_fov(),
            Command::ResetFov => self.player.reset_fov(),
            Command::Fire => {
                if self.fire.try_fire(tick.now) {
                    self.shots.push(Shot {
                        position: self.player.position,
                        angle: self.player.heading,
                    });
                }
            }
            Command::TogglePause | Command::Quit => {}
        }

        Ok(())
    }

    /// Advances everything that moves on its own by `tick.delta` seconds.
    ///
    /// # Errors
    ///
    /// This function returns an error if a struck objective cannot be placed again.
    pub(crate) fn update(&mut self, tick: Tick) -> Result<()> {
        let target = Some(self.objective.cell);
        let caster = *self.scanner.caster();
        let mut struck = false;

        self.shots.retain_mut(|shot| {
            match shot.advance(tick.delta, &caster, &self.map, target) {
                ShotEvent::Flying => true,
                ShotEvent::HitTarget => {
                    struck = true;
                    false
                }
                ShotEvent::Spent => false,
            }
        });

        if struck {
            debug!("objective shot at ({}, {})", self.objective.cell.x, self.objective.cell.y);
            self.collect()?;
        }

        Ok(())
    }

    /// Projects the world onto `columns` view columns from the player's eye.
    pub(crate) fn project(&self, columns: usize) -> Vec<RayHit> {
        let viewer = Viewer {
            position: self.player.position,
            heading: self.player.heading,
            fov: self.player.fov,
        };

        self.scanner
            .scan(&viewer, columns, &self.map, Some(self.objective.cell))
    }

    /// Returns the depth at which the view reports the void.
    pub(crate) const fn max_depth(&self) -> f64 {
        self.scanner.max_depth()
    }

    /// Collects the objective when the player stands on it.
    fn collect_if_reached(&mut self) -> Result<()> {
        if self.player.cell() == Some(self.objective.cell) {
            debug!("objective reached at ({}, {})", self.objective.cell.x, self.objective.cell.y);
            self.collect()?;
        }

        Ok(())
    }

    /// Scores the current objective and places the next one.
    fn collect(&mut self) -> Result<()> {
        self.score = self.score.saturating_add(1);
        self.objective = Objective::spawn(&self.map, self.player.cell(), &mut self.rng)?;
        self.refresh_path();

        info!("score {}", self.score);

        Ok(())
    }

    /// Recomputes the path when the player's cell or the objective changed since the last search.
    fn refresh_path(&mut self) {
        let Some(start) = self.player.cell() else {
            self.path.clear();
            self.path_key = None;
            return;
        };
        let key = (start, self.objective.cell);
        if self.path_key == Some(key) {
            return;
        }

        self.path = PathFinder::new(&self.map).find_path(start, self.objective.cell);
        self.path_key = Some(key);
    }
}
