//! Death lifecycle: kill prevention, tear-off, and the headless/ragdoll split.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::{Attributes, Ragdoll};
use super::rules::{GameMode, KillContext};
use crate::core::{GameConfig, KilledEvent, LifeSpan, NetMode, TornOff};
use crate::player::{
    corpse_collision_groups, CharacterMotion, LocallyControlled, MoveInput, PawnDetachedEvent,
    PossessedBy,
};

/// Outcome of a call to [`DeathParams::die`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathBranch {
    /// Already torn off, nothing happened.
    AlreadyDead,
    /// The game mode kept the victim alive.
    Prevented,
    /// Dedicated server: collision off, destroyed shortly after.
    Destroyed,
    /// Everywhere else: handed over to physics as a ragdoll.
    Ragdoll,
}

/// Whether a character still counts as alive.
///
/// A torn-off character is never alive: its health is no longer kept up to
/// date. Neither is one already waiting to be destroyed.
pub fn is_alive(attributes: &Attributes, torn_off: bool, pending_destroy: bool) -> bool {
    !torn_off && !pending_destroy && attributes.health > 0.0
}

/// Everything needed to kill a character.
#[derive(SystemParam)]
pub struct DeathParams<'w, 's> {
    commands: Commands<'w, 's>,
    net_mode: Res<'w, NetMode>,
    config: Res<'w, GameConfig>,
    game_mode: Option<Res<'w, GameMode>>,
    killed_events: EventWriter<'w, KilledEvent>,
    detached_events: EventWriter<'w, PawnDetachedEvent>,
}

impl DeathParams<'_, '_> {
    /// Kill the victim described by `context`.
    pub fn die(
        &mut self,
        context: KillContext,
        attributes: &mut Attributes,
        motion: Option<&mut CharacterMotion>,
        torn_off: bool,
    ) -> DeathBranch {
        // Several hits in one frame may all be lethal
        if torn_off {
            return DeathBranch::AlreadyDead;
        }

        if self.net_mode.has_authority() {
            if let Some(game_mode) = self.game_mode.as_deref() {
                if game_mode.prevent_death(&context) {
                    // Never leave a living character at zero health
                    if attributes.health <= 0.0 {
                        attributes.health = 1.0;
                    }
                    info!("Death of {:?} prevented by the game mode", context.victim);
                    return DeathBranch::Prevented;
                }

                self.killed_events.send(KilledEvent {
                    victim: context.victim,
                    victim_controller: context.victim_controller,
                    killer: context.killer,
                    causer: context.causer,
                });
            }
        }

        attributes.health = 0.0;

        // Freeze replicated state as it is now
        let mut victim = self.commands.entity(context.victim);
        victim.insert(TornOff);
        info!("{:?} died, replication torn off", context.victim);

        if let Some(controller) = context.victim_controller {
            victim.remove::<(PossessedBy, LocallyControlled)>();
            self.detached_events.send(PawnDetachedEvent {
                character: context.victim,
                controller,
            });
        }

        if self.net_mode.is_dedicated() {
            // Nobody watches the corpse; keep it just long enough to replicate
            victim.insert((
                ColliderDisabled,
                LifeSpan::from_secs(self.config.damage.dedicated_corpse_life_span),
            ));
            DeathBranch::Destroyed
        } else {
            let velocity = motion.map_or(Vec3::ZERO, |motion| {
                let velocity = motion.velocity;
                motion.stop();
                velocity
            });
            play_death(
                &mut self.commands,
                context.victim,
                velocity,
                self.config.damage.ragdoll_life_span,
            );
            DeathBranch::Ragdoll
        }
    }
}

/// Turn a character into a ragdoll.
///
/// The character controller goes away, the body becomes a dynamic rigid body
/// that only collides with the level, and keeps the momentum it died with.
fn play_death(commands: &mut Commands, victim: Entity, velocity: Vec3, life_span: f32) {
    // Small random tumble so corpses don't all fall the same way
    let tumble = Vec3::new(
        (rand::random::<f32>() - 0.5) * 4.0,
        0.0,
        (rand::random::<f32>() - 0.5) * 4.0,
    );

    commands
        .entity(victim)
        .remove::<(KinematicCharacterController, MoveInput)>()
        .insert((
            RigidBody::Dynamic,
            Velocity {
                linvel: velocity,
                angvel: tumble,
            },
            corpse_collision_groups(),
            Ragdoll,
            LifeSpan::from_secs(life_span),
        ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torn_off_characters_are_never_alive() {
        let attributes = Attributes::default();
        assert!(is_alive(&attributes, false, false));
        assert!(!is_alive(&attributes, true, false));
    }

    #[test]
    fn characters_waiting_for_destruction_are_not_alive() {
        let attributes = Attributes::default();
        assert!(!is_alive(&attributes, false, true));
    }

    #[test]
    fn zero_health_is_dead() {
        let attributes = Attributes {
            health: 0.0,
            ..default()
        };
        assert!(!is_alive(&attributes, false, false));
    }
}
