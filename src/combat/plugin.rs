//! Combat plugin - damage, death and scoring.

use bevy::prelude::*;

use super::systems;
use crate::player::PawnDetachedEvent;

/// Combat plugin - handles all damage resolution.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Combat sends it, the controller listens
        app.add_event::<PawnDetachedEvent>();

        // Setup combat systems
        systems::setup_combat_systems(app);
    }
}
