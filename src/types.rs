//! Type definitions for the application state and player input.

/// Enumeration of application screens.
///
/// This enumeration holds information about the current screen of the explorer. It decides what is
/// rendered and which commands are honoured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Screen {
    /// The world is running and the view is live.
    Playing,
    /// The world is frozen behind a pause overlay.
    Paused,
}

/// Motion requested by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Step along the heading.
    Forward,
    /// Step against the heading.
    Backward,
    /// Rotate counter-clockwise.
    TurnLeft,
    /// Rotate clockwise.
    TurnRight,
}

/// Command decoded from one key press.
///
/// This enumeration decouples the terminal key bindings from the game logic, so that the world
/// can be driven by tests without a terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    /// Move or rotate the player.
    Move(Direction),
    /// Widen the field of view by one increment.
    WidenFov,
    /// Restore the default field of view.
    ResetFov,
    /// Fire a shot along the heading.
    Fire,
    /// Toggle between playing and paused.
    TogglePause,
    /// Leave the application.
    Quit,
}
