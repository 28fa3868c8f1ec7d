//! Arena data structures and RON loading.

use std::collections::HashMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::read_ron_dir;
use crate::weapons::WeaponRegistry;
use crate::LaunchOptions;

pub const ARENAS_DIR: &str = "assets/data/arenas";

fn default_floor_color() -> (f32, f32, f32) {
    (0.3, 0.3, 0.32)
}

fn default_block_color() -> (f32, f32, f32) {
    (0.45, 0.43, 0.4)
}

fn default_respawn_time() -> f32 {
    30.0
}

fn default_pickup_radius() -> f32 {
    0.8
}

fn default_true() -> bool {
    true
}

/// What a pickup hands out.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub enum PickupKind {
    /// A weapon class from the weapon registry
    Weapon(String),
    Health(f32),
    Armor(f32),
    Shield(f32),
}

/// A solid box of level geometry.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct BlockDef {
    /// Center of the box
    pub position: (f32, f32, f32),
    pub size: (f32, f32, f32),
    #[serde(default = "default_block_color")]
    pub color: (f32, f32, f32),
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct PlayerStartDef {
    /// Feet position
    pub position: (f32, f32, f32),
    #[serde(default)]
    pub yaw_degrees: f32,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct PickupDef {
    pub kind: PickupKind,
    pub position: (f32, f32, f32),
    #[serde(default = "default_respawn_time")]
    pub respawn_time: f32,
    #[serde(default = "default_pickup_radius")]
    pub radius: f32,
}

/// Where a teleporter sends its actors.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub enum TeleportDestination {
    /// Another teleporter, by id
    Teleporter(String),
    Point {
        position: (f32, f32, f32),
        #[serde(default)]
        yaw_degrees: f32,
    },
}

/// How the actor faces after a teleport.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExitRotation {
    /// Keep the facing relative to the teleporters
    #[default]
    Relative,
    /// Face the destination's direction
    Fixed,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct TeleporterDef {
    pub id: String,
    pub position: (f32, f32, f32),
    #[serde(default)]
    pub yaw_degrees: f32,
    pub destination: TeleportDestination,
    #[serde(default)]
    pub exit_rotation: ExitRotation,
    #[serde(default = "default_true")]
    pub keep_momentum: bool,
}

/// Arena definition loaded from a RON file. The file stem is the arena id.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ArenaDefinition {
    pub name: String,
    /// Width and depth of the floor
    pub floor_size: (f32, f32),
    #[serde(default = "default_floor_color")]
    pub floor_color: (f32, f32, f32),
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
    pub player_starts: Vec<PlayerStartDef>,
    #[serde(default)]
    pub pickups: Vec<PickupDef>,
    #[serde(default)]
    pub teleporters: Vec<TeleporterDef>,
}

impl ArenaDefinition {
    /// A bare floor with four player starts, used when no arena loads.
    pub fn fallback() -> Self {
        let start = |x: f32, z: f32, yaw_degrees: f32| PlayerStartDef {
            position: (x, 0.0, z),
            yaw_degrees,
        };
        Self {
            name: "Fallback".to_string(),
            floor_size: (40.0, 40.0),
            floor_color: default_floor_color(),
            blocks: Vec::new(),
            player_starts: vec![
                start(0.0, 10.0, 0.0),
                start(0.0, -10.0, 180.0),
                start(10.0, 0.0, 90.0),
                start(-10.0, 0.0, -90.0),
            ],
            pickups: Vec::new(),
            teleporters: Vec::new(),
        }
    }

    /// Problems worth reporting when the arena is loaded.
    pub fn check(&self, weapons: &WeaponRegistry) -> Vec<String> {
        let mut problems = Vec::new();

        if self.player_starts.is_empty() {
            problems.push("no player starts".to_string());
        }

        for pickup in &self.pickups {
            if let PickupKind::Weapon(class) = &pickup.kind {
                if !weapons.contains(class) {
                    problems.push(format!("weapon pickup at {:?} has unknown weapon class '{}'", pickup.position, class));
                }
            }
        }

        for teleporter in &self.teleporters {
            if let TeleportDestination::Teleporter(target) = &teleporter.destination {
                if target == &teleporter.id {
                    problems.push(format!("teleporter '{}' leads to itself", teleporter.id));
                } else if !self.teleporters.iter().any(|t| &t.id == target) {
                    problems.push(format!("teleporter '{}' leads to unknown teleporter '{}'", teleporter.id, target));
                }
            }
        }

        problems
    }
}

/// Resource holding all loaded arenas, keyed by id.
#[derive(Resource, Debug, Default)]
pub struct ArenaRegistry {
    pub arenas: HashMap<String, ArenaDefinition>,
}

impl ArenaRegistry {
    pub fn get(&self, id: &str) -> Option<&ArenaDefinition> {
        self.arenas.get(id)
    }
}

/// The arena played in the current match.
#[derive(Resource, Debug, Clone)]
pub struct CurrentArena {
    pub id: String,
}

/// Load all arenas from the assets/data/arenas/ directory and report the
/// ones that reference things that do not exist.
pub fn load_arena_definitions(
    mut commands: Commands,
    weapons: Res<WeaponRegistry>,
    options: Res<LaunchOptions>,
) {
    let mut registry = ArenaRegistry::default();

    for (id, arena) in read_ron_dir::<ArenaDefinition>(Path::new(ARENAS_DIR)) {
        for problem in arena.check(&weapons) {
            warn!("Arena '{}': {}", id, problem);
        }
        info!("Loaded arena: {} ({})", arena.name, id);
        registry.arenas.insert(id, arena);
    }

    info!("Loaded {} arenas", registry.arenas.len());
    commands.insert_resource(registry);
    commands.insert_resource(CurrentArena {
        id: options.arena.clone(),
    });
}
