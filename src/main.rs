//! This crate contains the source code for the binary for the maze explorer raymaze.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]
#![expect(
    unused_crate_dependencies,
    reason = "The dependencies are used in the library crate."
)]

use clap::Parser as _;
use color_eyre::{eyre::Result, install};
use raymaze::{init_logging, App, Args, Settings};

fn main() -> Result<()> {
    install()?;

    let settings = Settings::from_args(Args::parse())?;
    init_logging(&settings)?;
    let mut app = App::new(&settings)?;

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    result
}
