//! World module - arenas, pickups and teleporters.

mod builder;
mod data;
mod geometry;
mod materials;
mod pickups;
mod plugin;
mod spawning;
mod teleporter;

pub use builder::{build_arena, PlayerStart};
pub use data::{
    ArenaDefinition, ArenaRegistry, BlockDef, CurrentArena, ExitRotation, PickupDef, PickupKind,
    PlayerStartDef, TeleportDestination, TeleporterDef, ARENAS_DIR,
};
pub use geometry::{world_collision_groups, ArenaGeometry};
pub use pickups::{give_to, item_name, within_reach, Pickup, PickupError};
pub use plugin::WorldPlugin;
pub use spawning::practice_target_starts;
pub use teleporter::{exit_motion, inside_trigger, perform_teleport, Destination, Teleporter};
