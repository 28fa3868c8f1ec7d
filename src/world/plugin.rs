//! World plugin - arena loading, building and interactables.

use bevy::prelude::*;
use bevy_kira_audio::Audio;

use super::builder::build_arena;
use super::data::{load_arena_definitions, ArenaDefinition, ArenaRegistry, CurrentArena};
use super::geometry::{spawn_lighting, ArenaGeometry, ArenaVisuals};
use super::materials::ArenaPalette;
use super::spawning::spawn_practice_targets;
use super::{pickups, teleporter};
use crate::combat::CombatSet;
use crate::core::{GameConfig, GameState, NetMode};
use crate::player::{CharacterAssets, PlayerSet};
use crate::weapons::load_weapon_definitions;

/// World plugin - handles arena loading and world setup.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (
                load_arena_definitions.after(load_weapon_definitions),
                pickups::load_pickup_sound.run_if(resource_exists::<Audio>),
                teleporter::load_teleport_sound.run_if(resource_exists::<Audio>),
            ),
        )

        // The arena is built whenever a match starts
        .add_systems(
            OnTransition {
                exited: GameState::MainMenu,
                entered: GameState::InGame,
            },
            setup_arena,
        )
        .add_systems(
            OnTransition {
                exited: GameState::Loading,
                entered: GameState::InGame,
            },
            setup_arena,
        )
        .add_systems(OnEnter(GameState::MainMenu), cleanup_arena)

        .add_systems(
            Update,
            (
                teleporter::teleport_actors,
                pickups::collect_pickups,
                pickups::respawn_pickups,
            )
                .chain()
                .after(PlayerSet::Movement)
                .before(CombatSet::Damage)
                .run_if(in_state(GameState::InGame)),
        );
    }
}

/// Build the current arena, and practice targets where we have authority.
#[allow(clippy::too_many_arguments)]
pub fn setup_arena(
    mut commands: Commands,
    registry: Res<ArenaRegistry>,
    current: Res<CurrentArena>,
    net_mode: Res<NetMode>,
    config: Res<GameConfig>,
    character_assets: Option<Res<CharacterAssets>>,
    meshes: Option<ResMut<Assets<Mesh>>>,
    materials: Option<ResMut<Assets<StandardMaterial>>>,
) {
    let fallback;
    let arena = match registry.get(&current.id) {
        Some(arena) => arena,
        None => {
            error!("Arena '{}' not found in registry, using an empty floor", current.id);
            fallback = ArenaDefinition::fallback();
            &fallback
        }
    };

    info!("Building arena: {}", arena.name);

    let visuals = match (meshes, materials) {
        (Some(meshes), Some(materials)) => Some(ArenaVisuals {
            meshes: meshes.into_inner(),
            palette: ArenaPalette::new(materials.into_inner()),
        }),
        _ => None,
    };
    if net_mode.has_presentation() && visuals.is_some() {
        spawn_lighting(&mut commands);
    }

    let starts = build_arena(&mut commands, visuals, arena);

    if net_mode.has_authority() {
        spawn_practice_targets(&mut commands, &config, character_assets.as_deref(), &starts);
    }
}

/// Remove the arena when the match is left.
fn cleanup_arena(mut commands: Commands, arena: Query<Entity, With<ArenaGeometry>>) {
    for entity in arena.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
