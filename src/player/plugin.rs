//! Player plugin - character movement, dodging, views and footsteps.

use bevy::prelude::*;
use bevy_kira_audio::Audio;

use super::{camera, dodge, footsteps, movement, spawn};
use crate::core::GameState;

/// System set ordering for characters.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlayerSet {
    /// Controllers write `MoveInput` and `ControlRotation`
    Input,
    /// Characters move
    Movement,
    /// Characters pick their view
    View,
    /// The local camera follows the view target
    Camera,
}

/// Player plugin - handles the character pawn.
pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app
            .configure_sets(
                Update,
                (
                    PlayerSet::Input,
                    PlayerSet::Movement,
                    PlayerSet::View,
                    PlayerSet::Camera,
                )
                    .chain(),
            )

            // Presentation assets only where they can be used
            .add_systems(
                Startup,
                (
                    spawn::setup_character_assets
                        .run_if(resource_exists::<Assets<StandardMaterial>>),
                    footsteps::load_character_sounds.run_if(resource_exists::<Audio>),
                ),
            )

            .add_systems(OnEnter(GameState::MainMenu), spawn::despawn_characters)

            .add_systems(
                Update,
                (
                    dodge::perform_dodges,
                    movement::character_movement,
                    movement::update_crouch,
                )
                    .chain()
                    .in_set(PlayerSet::Movement)
                    .run_if(in_state(GameState::InGame)),
            )
            .add_systems(
                Update,
                (
                    camera::update_camera_views,
                    footsteps::tick_footsteps.run_if(resource_exists::<Audio>),
                )
                    .in_set(PlayerSet::View),
            );
    }
}
