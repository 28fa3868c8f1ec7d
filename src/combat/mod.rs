//! Combat module - damage mitigation, knockback, death and scoring.

mod components;
mod damage;
mod death;
mod plugin;
mod rules;
mod systems;

pub use components::*;
pub use damage::*;
pub use death::{is_alive, DeathBranch, DeathParams};
pub use plugin::CombatPlugin;
pub use systems::{should_take_damage, CombatSet};
pub use rules::*;
