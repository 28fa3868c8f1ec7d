//! Global events used for cross-system communication.
//!
//! Weapons, falls and suicides all funnel into `DamageEvent`; the combat
//! plugin owns the single place where damage is resolved.

use bevy::prelude::*;

/// How a hit was delivered. Decides the knockback shape.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DamageKind {
    /// No direction information, no knockback.
    #[default]
    Generic,
    /// A direct hit travelling along `shot_direction`.
    Point {
        shot_direction: Vec3,
        hit_location: Vec3,
    },
    /// Splash damage centered on `origin`.
    Radial { origin: Vec3, max_radius: f32 },
    /// Landing too hard.
    Fall,
}

/// Sent when a character should take damage.
#[derive(Event, Debug, Clone)]
pub struct DamageEvent {
    /// Character receiving damage
    pub target: Entity,
    /// Controller responsible for the damage (the killer, if it kills)
    pub instigator: Option<Entity>,
    /// Actor that dealt the damage (projectile, the character itself...)
    pub causer: Option<Entity>,
    /// Raw damage before mitigation
    pub amount: f32,
    pub kind: DamageKind,
}

/// Sent by the authority when a character is killed for good.
#[derive(Event, Debug, Clone)]
pub struct KilledEvent {
    pub victim: Entity,
    /// Controller that possessed the victim
    pub victim_controller: Option<Entity>,
    /// Controller credited with the kill, `None` for suicides and accidents
    pub killer: Option<Entity>,
    pub causer: Option<Entity>,
}

/// Ask the authority to kill a character outright.
#[derive(Event, Debug, Clone)]
pub struct SuicideEvent {
    pub character: Entity,
}

/// Game-wide message not typed by a player (kills, joins, match end).
#[derive(Event, Debug, Clone)]
pub struct SystemMessageEvent {
    pub message: String,
}

/// A line typed by a player.
#[derive(Event, Debug, Clone)]
pub struct ChatMessageEvent {
    /// Controller that typed it
    pub sender: Entity,
    pub sender_name: String,
    pub message: String,
    /// Only delivered to the sender's team
    pub team_only: bool,
}
