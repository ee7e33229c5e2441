//! A pseudo-3D maze explorer drawn with text in the terminal.
//!
//! The world is a grid of open and blocked cells. A [`ray::RayCaster`] marches rays through it,
//! a [`projection::ProjectionScanner`] turns one ray per screen column into wall slices, and a
//! [`pathfinding::PathFinder`] plots the route to the current objective on the minimap.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]

use color_eyre::eyre::Result;

mod app;
mod config;
mod events;
mod file_loader;
mod game;
mod logging;
pub mod map;
mod objective;
pub mod pathfinding;
mod player;
pub mod projection;
pub mod ray;
mod types;
mod ui;

pub use app::App;
pub use config::{Args, Settings};

/// Installs file logging when the settings name a log file.
///
/// # Errors
///
/// This function returns an error if the log file cannot be opened or a logger is already
/// installed.
pub fn init_logging(settings: &Settings) -> Result<()> {
    logging::init(settings.log_file())
}
