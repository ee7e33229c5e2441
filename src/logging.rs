//! Optional file logging.
//!
//! The terminal belongs to the user interface, so log records only go to a file, and only when one
//! is configured.

use std::{fs::OpenOptions, path::Path};

use color_eyre::eyre::{Result, WrapErr as _};
use env_logger::{Builder, Env, Target};

/// Installs a global logger writing to `path`, honouring `RUST_LOG` and defaulting to `info`.
///
/// Does nothing when no path is given.
///
/// # Errors
///
/// This function returns an error if the file cannot be opened or a logger is already installed.
pub(crate) fn init(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .wrap_err("failed to install logger")?;

    log::info!("logging to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_without_path_is_noop() {
        assert!(init(None).is_ok(), "no log file should mean no logger and no error");
    }

    #[test]
    fn test_init_reports_unopenable_file() {
        let dir = std::env::temp_dir();

        assert!(
            init(Some(&dir)).is_err(),
            "a directory cannot be opened as a log file"
        );
    }
}
