//! Frag Arena - a first-person arena shooter in Bevy.
//!
//! # Architecture
//!
//! The game is organized into plugins, each handling a specific aspect:
//!
//! - **Core**: Game states, network role, global events, configuration
//! - **Player**: The character pawn - movement, dodging, camera, footsteps
//! - **Controller**: Input routing, chat, music, spectating and respawn
//! - **Combat**: Shield/armor/health damage pipeline, knockback, death
//! - **Weapons**: Inventory, firing, projectiles
//! - **World**: Arenas, pickups, teleporters
//! - **UI**: Menus, HUD, chat box, key binding menu
//!
//! A dedicated server runs headless, so it skips the controller and UI
//! plugins entirely.

pub mod combat;
pub mod controller;
pub mod core;
pub mod player;
pub mod ui;
pub mod weapons;
pub mod world;

use bevy::prelude::*;

use crate::core::NetMode;

/// Options chosen at launch (command line).
#[derive(Resource, Clone, Debug)]
pub struct LaunchOptions {
    pub net_mode: NetMode,
    pub arena: String,
    pub player_name: String,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            net_mode: NetMode::Standalone,
            arena: "courtyard".to_string(),
            player_name: "Player".to_string(),
        }
    }
}

/// Main game plugin that adds all sub-plugins.
#[derive(Default)]
pub struct FragArenaPlugin {
    pub options: LaunchOptions,
}

impl FragArenaPlugin {
    pub fn new(options: LaunchOptions) -> Self {
        Self { options }
    }
}

impl Plugin for FragArenaPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.options.clone())
            .insert_resource(self.options.net_mode)

            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            // Character pawn
            .add_plugins(player::PlayerPlugin)

            // Damage and death
            .add_plugins(combat::CombatPlugin)

            // Weapons and projectiles
            .add_plugins(weapons::WeaponsPlugin)

            // Arena, pickups, teleporters
            .add_plugins(world::WorldPlugin);

        if !self.options.net_mode.is_dedicated() {
            app
                // Local input, chat, music
                .add_plugins(controller::ControllerPlugin)

                // UI systems
                .add_plugins(ui::UiPlugin);
        }
    }
}
