//! UI plugin - menus, HUD, chat box and key binding menu.

use bevy::prelude::*;

use super::{chat, hud, keybinding, menus, widgets};
use crate::core::{GameState, PlayState};

/// UI plugin - handles all user interface.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<keybinding::AwaitingRebind>()

            // Main menu
            .add_systems(OnEnter(GameState::MainMenu), menus::setup_main_menu)
            .add_systems(OnExit(GameState::MainMenu), menus::cleanup_main_menu)

            // Pause menu, which can also host the key binding menu
            .add_systems(OnEnter(GameState::Paused), menus::setup_pause_menu)
            .add_systems(
                OnExit(GameState::Paused),
                (
                    menus::cleanup::<menus::PauseMenuUi>,
                    keybinding::cleanup_key_binding_menu,
                ),
            )

            // Scoreboard
            .add_systems(OnEnter(GameState::MatchEnded), menus::setup_scoreboard)
            .add_systems(OnExit(GameState::MatchEnded), menus::cleanup::<menus::ScoreboardUi>)

            // Key binding menu opened during play
            .add_systems(OnEnter(PlayState::Controls), keybinding::setup_key_binding_menu)
            .add_systems(OnExit(PlayState::Controls), keybinding::cleanup_key_binding_menu)

            // HUD and chat box live for the whole match
            .add_systems(
                OnTransition {
                    exited: GameState::MainMenu,
                    entered: GameState::InGame,
                },
                (hud::spawn_hud, chat::spawn_chat_box),
            )
            .add_systems(
                OnEnter(GameState::MainMenu),
                (menus::cleanup::<hud::HudRoot>, menus::cleanup::<chat::ChatBoxUi>),
            )
            .add_systems(
                Update,
                (hud::update_hud, chat::type_chat, chat::update_chat_box)
                    .run_if(in_state(GameState::InGame)),
            )

            // Buttons
            .add_systems(Update, (menus::menu_actions, widgets::button_feedback))
            .add_systems(
                Update,
                (
                    keybinding::key_binding_menu_actions,
                    keybinding::capture_rebind,
                    keybinding::refresh_binding_labels,
                )
                    .chain()
                    .run_if(resource_exists::<ButtonInput<KeyCode>>),
            );
    }
}
