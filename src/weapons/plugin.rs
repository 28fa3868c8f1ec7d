//! Weapons plugin - loads definitions and runs firing and projectiles.

use bevy::prelude::*;
use bevy_kira_audio::Audio;

use super::definition::load_weapon_definitions;
use super::{firing, inventory, projectile};
use crate::combat::CombatSet;
use crate::core::GameState;
use crate::player::PlayerSet;

/// Weapons act after characters moved and before damage is resolved.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeaponSet;

/// Weapons plugin - inventories, firing and projectiles.
pub struct WeaponsPlugin;

impl Plugin for WeaponsPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            WeaponSet
                .after(PlayerSet::Movement)
                .before(CombatSet::Damage)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            Startup,
            (
                load_weapon_definitions,
                (
                    projectile::setup_projectile_assets
                        .run_if(resource_exists::<Assets<StandardMaterial>>),
                    firing::load_weapon_sounds.run_if(resource_exists::<Audio>),
                ),
            )
                .chain(),
        )
        .add_systems(
            Update,
            (
                inventory::equip_new_characters,
                firing::fire_weapons,
                projectile::move_projectiles,
            )
                .chain()
                .in_set(WeaponSet),
        )
        .add_systems(OnEnter(GameState::MainMenu), projectile::despawn_projectiles);
    }
}
