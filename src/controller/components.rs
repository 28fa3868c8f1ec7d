//! Controller-related components.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::player::{ControlRotation, DodgeDirection};

/// A player's will: which pawn it drives and what it looks at.
#[derive(Component, Debug, Clone, Default)]
pub struct PlayerController {
    /// Possessed character, if alive
    pub pawn: Option<Entity>,
    /// What the camera follows; stays on the corpse after death
    pub view_target: Option<Entity>,
    pub rotation: ControlRotation,
    /// Free camera position while there is nothing to view
    pub spectator_position: Vec3,
    /// Elapsed time of the last death
    pub died_at: Option<f32>,
    /// Fire was pressed without a pawn
    pub respawn_requested: bool,
}

impl PlayerController {
    pub fn possess(&mut self, pawn: Entity) {
        self.pawn = Some(pawn);
        self.view_target = Some(pawn);
        self.died_at = None;
        self.respawn_requested = false;
    }

    /// Lose the pawn but keep watching it.
    pub fn detach(&mut self, now: f32) {
        self.pawn = None;
        self.died_at = Some(now);
    }

    /// Whether the respawn delay since the last death has passed.
    pub fn can_respawn(&self, now: f32, delay: f32) -> bool {
        self.pawn.is_none() && self.died_at.map_or(true, |died_at| now - died_at >= delay)
    }
}

/// Marker for the controller driven by this machine's input.
#[derive(Component, Debug)]
pub struct LocalPlayer;

/// Team a player belongs to.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Team(pub u8);

/// The single camera the local player looks through.
#[derive(Component, Debug)]
pub struct ViewCamera;

/// Double-tap detection for dodges.
#[derive(Component, Debug, Clone, Default)]
pub struct DodgeTapTracker {
    last_taps: HashMap<DodgeDirection, f32>,
}

impl DodgeTapTracker {
    /// Register a tap. Returns true when it completes a double tap.
    pub fn tap(&mut self, direction: DodgeDirection, now: f32, window: f32) -> bool {
        if direction == DodgeDirection::None {
            return false;
        }

        match self.last_taps.get(&direction) {
            Some(last) if now - last <= window => {
                self.last_taps.clear();
                true
            }
            _ => {
                self.last_taps.insert(direction, now);
                false
            }
        }
    }
}
