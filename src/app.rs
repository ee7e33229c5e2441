//! Core application state and main loop.

use color_eyre::eyre::Result;
use log::info;
use ratatui::DefaultTerminal;

use crate::{
    config::Settings,
    events, file_loader,
    game::{FrameClock, Game},
    types::Screen,
    ui,
};

/// Application state container for the explorer.
///
/// This structure holds the state of the application, which is to say the structure from which
/// Ratatui will render the view and Crossterm events will write to.
pub struct App {
    /// Application exit flag.
    ///
    /// This field indicates whether the application should exit. It is set to `true` when the user
    /// asks to leave and starts off `false`.
    pub(crate) exit: bool,
    /// Current screen being displayed to the user.
    pub(crate) screen: Screen,
    /// The world being explored.
    pub(crate) game: Game,
    /// Frame timing source.
    ///
    /// This field is the only place wall-clock time enters the application; the world receives
    /// its timing as explicit values.
    pub(crate) clock: FrameClock,
}

impl App {
    /// Creates the application from validated settings.
    ///
    /// # Errors
    ///
    /// This function returns an error if the configured map cannot be loaded or leaves no room for
    /// the player and the objective.
    pub fn new(settings: &Settings) -> Result<Self> {
        let map = file_loader::load_or_default(settings.map.as_deref())?;
        let game = Game::new(map, settings)?;

        Ok(Self {
            exit: false,
            screen: Screen::Playing,
            game,
            clock: FrameClock::new(),
        })
    }

    /// Runs the main loop of the application.
    ///
    /// This function draws a frame, then handles input and advances the world. The loop continues
    /// until the exit flag is set, after which the function returns to the call site.
    ///
    /// # Errors
    ///
    /// - [`std::io::Error`]
    /// - Errors from the world update
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        info!("entering main loop");

        while !self.exit {
            let _ = terminal.try_draw(|frame| ui::draw(self, frame).map_err(std::io::Error::other))?;
            events::handle_events(self)?;
        }

        info!("leaving main loop with score {}", self.game.score);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::GridMap;

    #[test]
    fn test_new_uses_default_map() {
        let app = App::new(&Settings::default()).expect("default app should build");

        assert!(!app.exit, "app should not start exiting");
        assert_eq!(app.screen, Screen::Playing, "app should start playing");
        assert_eq!(app.game.map, GridMap::default(), "default map should be loaded");
    }

    #[test]
    fn test_new_reports_missing_map_file() {
        let settings = Settings {
            map: Some(std::env::temp_dir().join("raymaze-no-such-map.map")),
            ..Settings::default()
        };

        assert!(App::new(&settings).is_err(), "a missing map file should fail");
    }
}
