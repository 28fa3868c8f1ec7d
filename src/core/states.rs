//! Game state definitions that control the overall flow of the game.
//!
//! States determine which systems run at any given time. For example,
//! character movement only runs in the InGame state, while menu systems
//! only run in the MainMenu state.

use bevy::prelude::*;

/// Main game states - controls overall game flow.
///
/// - Start in `Loading` while data files are read
/// - Move to `MainMenu` when loading completes (dedicated servers skip it)
/// - Enter `InGame` when the match starts
/// - `Paused` freezes local gameplay but keeps the world visible
/// - `MatchEnded` once the frag limit is reached
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    /// Initial state - loading data files
    #[default]
    Loading,
    /// Main menu / title screen
    MainMenu,
    /// Active match
    InGame,
    /// Game is paused (overlay on gameplay)
    Paused,
    /// Frag limit reached, scoreboard shown
    MatchEnded,
}

/// Sub-states for gameplay - only active when GameState::InGame.
///
/// These decide where local input goes:
/// - `Playing`: movement, combat and weapon input reach the pawn
/// - `Chatting`: the chat line owns the keyboard
/// - `Controls`: the key binding menu is open
#[derive(SubStates, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[source(GameState = GameState::InGame)]
pub enum PlayState {
    #[default]
    Playing,
    Chatting,
    Controls,
}
