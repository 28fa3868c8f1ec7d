//! Controller plugin - local input routing, view camera, chat and music.

use bevy::prelude::*;
use bevy_kira_audio::Audio;

use super::bindings::KeyBindings;
use super::chat::{self, ChatDraft, MessageHistory, SayEvent};
use super::music::{self, MusicEvent};
use super::{input, respawn, view};
use crate::core::{update_smooth_transforms, GameState, PlayState};
use crate::player::PlayerSet;

/// Controller plugin - only added where a local player exists.
pub struct ControllerPlugin;

impl Plugin for ControllerPlugin {
    fn build(&self, app: &mut App) {
        app
            // Resources
            .insert_resource(KeyBindings::load())
            .init_resource::<ChatDraft>()
            .init_resource::<MessageHistory>()

            // Events
            .add_event::<SayEvent>()
            .add_event::<MusicEvent>()

            .add_systems(
                Startup,
                (chat::setup_message_history, music::setup_music_player),
            )

            // The local player joins when a match starts from the menu
            .add_systems(
                OnTransition {
                    exited: GameState::MainMenu,
                    entered: GameState::InGame,
                },
                (
                    input::spawn_local_player,
                    music::start_match_music.run_if(resource_exists::<Audio>),
                ),
            )
            .add_systems(
                OnEnter(GameState::MainMenu),
                (
                    input::despawn_local_player,
                    music::stop_match_music.run_if(resource_exists::<Audio>),
                ),
            )

            // Cursor belongs to the game only while playing
            .add_systems(OnEnter(PlayState::Playing), input::grab_cursor)
            .add_systems(OnExit(PlayState::Playing), input::release_cursor)

            // Input systems
            .add_systems(
                Update,
                (input::look_input, input::movement_input, input::action_input)
                    .in_set(PlayerSet::Input)
                    .run_if(resource_exists::<ButtonInput<KeyCode>>)
                    .run_if(in_state(PlayState::Playing)),
            )
            .add_systems(
                Update,
                (
                    respawn::handle_pawn_detached,
                    respawn::release_missing_view_targets,
                    respawn::respawn_players,
                )
                    .chain()
                    .in_set(PlayerSet::Input)
                    .run_if(in_state(GameState::InGame)),
            )

            // View camera
            .add_systems(
                Update,
                view::update_view_camera
                    .in_set(PlayerSet::Camera)
                    .before(update_smooth_transforms),
            )

            // Chat and music
            .add_systems(Update, (chat::send_chat, chat::receive_messages).chain())
            .add_systems(
                Update,
                music::handle_music_events.run_if(resource_exists::<Audio>),
            );
    }
}
