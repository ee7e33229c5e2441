//! Loading of map files.

use std::{fs, path::Path};

use color_eyre::eyre::{Result, WrapErr as _};
use log::info;

use crate::map::GridMap;

/// Reads and parses the map stored at `path`.
///
/// # Errors
///
/// This function returns an error if the file cannot be read or does not hold a well formed map;
/// the error names the offending path.
pub(crate) fn load_map(path: &Path) -> Result<GridMap> {
    let contents = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read map file {}", path.display()))?;
    let map = GridMap::parse(&contents)
        .wrap_err_with(|| format!("invalid map in {}", path.display()))?;

    info!(
        "loaded {}x{} map from {}",
        map.width(),
        map.height(),
        path.display()
    );

    Ok(map)
}

/// Returns the map at `path`, or the built-in map when no path is given.
///
/// # Errors
///
/// This function returns the errors of [`load_map`].
pub(crate) fn load_or_default(path: Option<&Path>) -> Result<GridMap> {
    path.map_or_else(|| Ok(GridMap::default()), load_map)
}
