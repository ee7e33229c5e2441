//! Event handling functions for user input and per-frame state updates.

use std::time::Duration;

use color_eyre::eyre::Result;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

use crate::{
    game::Tick,
    types::{Command, Direction, Screen},
    App,
};

/// Longest time to wait for input before advancing the world, in milliseconds.
///
/// This bounds the frame time when no key is pressed, so shots keep flying and the frame rate
/// keeps updating.
const POLL_TIMEOUT_MS: u64 = 16;

/// Handles input events and advances the world by one frame.
///
/// This function polls for keyboard events with a short timeout, takes the frame's timing, dispatches
/// a decoded key press to [`apply_command`], then steps the world unless the application is paused.
///
/// # Errors
///
/// This function returns terminal I/O errors and errors from the world update.
pub(crate) fn handle_events(app: &mut App) -> Result<()> {
    let pressed = if event::poll(Duration::from_millis(POLL_TIMEOUT_MS))? {
        match event::read()? {
            Event::Key(key) => decode_key(key),
            _ => None,
        }
    } else {
        None
    };

    let tick = app.clock.tick();
    if let Some(command) = pressed {
        apply_command(app, command, tick)?;
    }
    if app.screen == Screen::Playing {
        app.game.update(tick)?;
    }

    Ok(())
}

/// Maps a key event to a command.
///
/// Only presses are decoded; repeats and releases, which some terminals report separately, are
/// ignored so one physical press is one command.
pub(crate) const fn decode_key(key: KeyEvent) -> Option<Command> {
    if !matches!(key.kind, KeyEventKind::Press) {
        return None;
    }

    match key.code {
        KeyCode::Char('w' | 'W') | KeyCode::Up => Some(Command::Move(Direction::Forward)),
        KeyCode::Char('s' | 'S') | KeyCode::Down => Some(Command::Move(Direction::Backward)),
        KeyCode::Char('a' | 'A') | KeyCode::Left => Some(Command::Move(Direction::TurnLeft)),
        KeyCode::Char('d' | 'D') | KeyCode::Right => Some(Command::Move(Direction::TurnRight)),
        KeyCode::Char(' ') => Some(Command::WidenFov),
        KeyCode::Char('q' | 'Q') => Some(Command::ResetFov),
        KeyCode::Char('f' | 'F') => Some(Command::Fire),
        KeyCode::Char('p' | 'P') => Some(Command::TogglePause),
        KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

/// Applies a decoded command to the application at the time given by `tick`.
///
/// Quitting and pausing are handled here; everything else goes to the world, and only while the
/// world is running.
///
/// # Errors
///
/// This function returns errors from the world's command handling.
pub(crate) fn apply_command(app: &mut App, command: Command, tick: Tick) -> Result<()> {
    match (command, app.screen) {
        (Command::Quit, _) => app.exit = true,
        (Command::TogglePause, Screen::Playing) => app.screen = Screen::Paused,
        (Command::TogglePause, Screen::Paused) => app.screen = Screen::Playing,
        (_, Screen::Paused) => {}
        (command, Screen::Playing) => app.game.handle(command, tick)?,
    }

    Ok(())
}
