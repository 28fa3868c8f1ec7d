//! Weapons module - definitions, inventories, firing and projectiles.

mod definition;
mod firing;
mod inventory;
mod plugin;
mod projectile;

pub use definition::{
    load_weapon_definitions, WeaponDefinition, WeaponRegistry, MAX_WEAPON_GROUP, WEAPONS_DIR,
};
pub use firing::{ready_to_fire, WeaponSounds};
pub use inventory::{Inventory, OwnedWeapon};
pub use plugin::{WeaponSet, WeaponsPlugin};
pub use projectile::{impact_damage, spawn_projectile, Projectile, ProjectileAssets};
