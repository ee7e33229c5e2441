//! Command line arguments and validated runtime settings.

use std::{f64::consts::PI, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::{ensure, Result};

use crate::ray::DEFAULT_STEP;

/// Field of view restored by the reset key, in radians.
pub(crate) const DEFAULT_FOV: f64 = PI / 3.5;

/// Default depth at which rays give up, in cells.
pub(crate) const DEFAULT_MAX_DEPTH: f64 = 16.;

/// Command line interface of the explorer.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Map file to explore; '#' marks walls, anything else is floor
    #[arg(short, long)]
    pub(crate) map: Option<PathBuf>,

    /// Field of view, in degrees
    #[arg(long)]
    pub(crate) fov: Option<f64>,

    /// Depth at which rays stop and report the void, in cells
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub(crate) max_depth: f64,

    /// Ray marching increment, in cells
    #[arg(long, default_value_t = DEFAULT_STEP)]
    pub(crate) step: f64,

    /// Seed for objective placement
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// File to write logs to; logging is off when absent
    #[arg(long)]
    pub(crate) log_file: Option<PathBuf>,
}

/// Validated settings derived from [`Args`].
///
/// Angles are stored in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Map file to load instead of the built-in map.
    pub(crate) map: Option<PathBuf>,
    /// Initial field of view, in radians.
    pub(crate) fov: f64,
    /// Depth at which rays stop, in cells.
    pub(crate) max_depth: f64,
    /// Ray marching increment, in cells.
    pub(crate) step: f64,
    /// Seed for objective placement; entropy when absent.
    pub(crate) seed: Option<u64>,
    /// Log destination.
    pub(crate) log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            map: None,
            fov: DEFAULT_FOV,
            max_depth: DEFAULT_MAX_DEPTH,
            step: DEFAULT_STEP,
            seed: None,
            log_file: None,
        }
    }
}

impl Settings {
    /// Validates the parsed arguments.
    ///
    /// # Errors
    ///
    /// This function returns an error if:
    /// - The field of view is not strictly between 0 and 180 degrees
    /// - The maximum depth is not a positive finite number
    /// - The marching step is not in `(0, 1]`
    pub fn from_args(args: Args) -> Result<Self> {
        let fov = args.fov.map_or(DEFAULT_FOV, f64::to_radians);
        ensure!(
            fov > 0. && fov < PI,
            "field of view must be between 0 and 180 degrees"
        );
        ensure!(
            args.max_depth.is_finite() && args.max_depth > 0.,
            "maximum depth must be a positive number of cells, got {}",
            args.max_depth
        );
        ensure!(
            args.step > 0. && args.step <= 1.,
            "marching step must be in (0, 1], got {}",
            args.step
        );

        Ok(Self {
            map: args.map,
            fov,
            max_depth: args.max_depth,
            step: args.step,
            seed: args.seed,
            log_file: args.log_file,
        })
    }

    /// Returns the configured log destination.
    pub(crate) fn log_file(&self) -> Option<&std::path::Path> {
        self.log_file.as_deref()
    }
}
