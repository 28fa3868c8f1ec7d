//! Character-related components.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{CollisionGroups, Group};

use crate::core::CharacterTuning;

/// Static level geometry.
pub const WORLD_GROUP: Group = Group::GROUP_1;
/// Living characters.
pub const CHARACTER_GROUP: Group = Group::GROUP_2;
/// Ragdolls only collide with the level.
pub const CORPSE_GROUP: Group = Group::GROUP_3;

/// What a living character collides with.
pub fn character_collision_groups() -> CollisionGroups {
    CollisionGroups::new(CHARACTER_GROUP, WORLD_GROUP | CHARACTER_GROUP)
}

/// What a ragdoll collides with.
pub fn corpse_collision_groups() -> CollisionGroups {
    CollisionGroups::new(CORPSE_GROUP, WORLD_GROUP)
}

/// Marker component for character pawns.
#[derive(Component)]
pub struct Character;

/// Display name of a player or practice target.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct PlayerName(pub String);

/// The controller currently driving this character.
#[derive(Component, Debug, Clone, Copy)]
pub struct PossessedBy(pub Entity);

/// The character is driven by input on this machine.
#[derive(Component, Debug)]
pub struct LocallyControlled;

/// Sent when a character loses its controller (death).
#[derive(Event, Debug, Clone)]
pub struct PawnDetachedEvent {
    pub character: Entity,
    pub controller: Entity,
}

/// Movement modes of the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementMode {
    #[default]
    Walking,
    Falling,
    /// Free 3D movement, no gravity
    Flying,
}

impl MovementMode {
    /// Whether input may move the character vertically.
    pub fn is_3d(self) -> bool {
        matches!(self, MovementMode::Flying)
    }
}

/// Physical movement state of a character.
#[derive(Component, Debug, Clone)]
pub struct CharacterMotion {
    /// Meters per second
    pub velocity: Vec3,
    /// kg
    pub mass: f32,
    pub mode: MovementMode,
    pub is_grounded: bool,
    pub is_crouched: bool,
    /// Half height of the current capsule, caps included
    pub half_height: f32,
}

impl CharacterMotion {
    pub fn from_tuning(tuning: &CharacterTuning) -> Self {
        Self {
            velocity: Vec3::ZERO,
            mass: tuning.mass,
            mode: MovementMode::Walking,
            is_grounded: true,
            is_crouched: false,
            half_height: tuning.half_height,
        }
    }

    /// Apply an impulse in kg·cm/s.
    pub fn add_impulse(&mut self, impulse_cm: Vec3, units_per_meter: f32) {
        if self.mass <= 0.0 {
            return;
        }
        self.velocity += impulse_cm / self.mass / units_per_meter;
        if impulse_cm.y > 0.0 && self.mode == MovementMode::Walking {
            self.mode = MovementMode::Falling;
        }
    }

    /// Stop all movement at once.
    pub fn stop(&mut self) {
        self.velocity = Vec3::ZERO;
    }
}

/// Direction of a dodge relative to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DodgeDirection {
    #[default]
    None,
    Forward,
    Back,
    Left,
    Right,
}

impl DodgeDirection {
    /// Local (yaw-relative) direction: forward is -Z, right is +X.
    pub fn local_vector(self) -> Vec3 {
        match self {
            DodgeDirection::None => Vec3::ZERO,
            DodgeDirection::Forward => Vec3::NEG_Z,
            DodgeDirection::Back => Vec3::Z,
            DodgeDirection::Left => Vec3::NEG_X,
            DodgeDirection::Right => Vec3::X,
        }
    }
}

/// Movement intent written by whoever controls the character.
#[derive(Component, Debug, Clone, Default)]
pub struct MoveInput {
    /// -1..1 each
    pub forward: f32,
    pub right: f32,
    pub up: f32,
    pub jump: bool,
    pub crouch: bool,
    /// Consumed by the dodge system
    pub dodge: DodgeDirection,
}

impl MoveInput {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Where the character is looking (radians).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlRotation {
    pub yaw: f32,
    pub pitch: f32,
}

impl ControlRotation {
    /// Yaw only, used for ground movement.
    pub fn yaw_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Full view rotation.
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }
}

/// Camera height above the capsule center, smoothed while crouching.
#[derive(Component, Debug, Clone)]
pub struct EyeHeight {
    pub offset: f32,
    pub base: f32,
}

impl EyeHeight {
    pub fn new(base: f32) -> Self {
        Self { offset: base, base }
    }
}

/// Dodge bookkeeping.
#[derive(Component, Debug, Clone, Default)]
pub struct DodgeState {
    pub is_dodging: bool,
    /// Elapsed game time after which a new dodge is allowed
    pub reset_time: f32,
    pub wall_dodges: u32,
    /// Last requested direction, shared with the authority
    pub direction: DodgeDirection,
}

/// Footstep timing.
#[derive(Component, Debug, Clone, Default)]
pub struct Footsteps {
    pub last_step: f32,
}

/// The visible third-person body of a character.
#[derive(Component)]
pub struct CharacterBody;
