//! Dodging: a burst of horizontal speed with a small hop.
//!
//! Airborne dodges push off a nearby wall and are limited per jump.

use bevy::prelude::*;
use bevy_kira_audio::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::*;
use super::footsteps::CharacterSounds;
use crate::core::{DodgeTuning, GameConfig, NetMode, TornOff};

/// Whether the character's state allows a dodge right now.
pub fn dodge_permitted(motion: &CharacterMotion, dodge: &DodgeState, now: f32) -> bool {
    motion.mode != MovementMode::Flying && !dodge.is_dodging && now > dodge.reset_time
}

/// Velocity right after a dodge toward `direction` (yaw-relative).
pub fn dodge_velocity(direction: DodgeDirection, yaw: Quat, tuning: &DodgeTuning) -> Vec3 {
    let horizontal = yaw * direction.local_vector() * tuning.horizontal_speed;
    Vec3::new(horizontal.x, tuning.vertical_speed, horizontal.z)
}

/// Clear the dodge once the character is back on its feet.
pub fn on_landed(dodge: &mut DodgeState, now: f32, reset_delay: f32) {
    if dodge.is_dodging {
        dodge.is_dodging = false;
        dodge.reset_time = now + reset_delay;
    }
    dodge.wall_dodges = 0;
}

/// Perform the dodges requested through `MoveInput`.
pub fn perform_dodges(
    time: Res<Time>,
    config: Res<GameConfig>,
    net_mode: Res<NetMode>,
    rapier_context: Query<&RapierContext>,
    audio: Option<Res<Audio>>,
    sounds: Option<Res<CharacterSounds>>,
    mut characters: Query<
        (
            Entity,
            &Transform,
            &mut CharacterMotion,
            &mut MoveInput,
            &mut DodgeState,
            &ControlRotation,
        ),
        (With<Character>, Without<TornOff>),
    >,
) {
    let now = time.elapsed_secs();
    let tuning = &config.dodge;

    for (entity, transform, mut motion, mut input, mut dodge, rotation) in characters.iter_mut() {
        let direction = std::mem::take(&mut input.dodge);
        if direction == DodgeDirection::None {
            continue;
        }
        dodge.direction = direction;

        if !dodge_permitted(&motion, &dodge, now) {
            continue;
        }

        let yaw = rotation.yaw_rotation();
        if !motion.is_grounded {
            if dodge.wall_dodges >= tuning.max_wall_dodges {
                continue;
            }

            // Need a wall on the side we push off from
            let away = -(yaw * direction.local_vector());
            let reach = config.character.capsule_radius + tuning.wall_dodge_distance;
            let near_wall = rapier_context.get_single().is_ok_and(|context| {
                context
                    .cast_ray(
                        transform.translation,
                        away,
                        reach,
                        true,
                        QueryFilter::default()
                            .exclude_collider(entity)
                            .exclude_sensors(),
                    )
                    .is_some()
            });
            if !near_wall {
                continue;
            }
            dodge.wall_dodges += 1;
            debug!("{:?} wall dodges {:?}", entity, direction);
        } else {
            debug!("{:?} dodges {:?}", entity, direction);
        }

        motion.velocity = dodge_velocity(direction, yaw, tuning);
        motion.mode = MovementMode::Falling;
        dodge.is_dodging = true;

        if net_mode.has_authority() {
            if let (Some(audio), Some(sounds)) = (audio.as_deref(), sounds.as_deref()) {
                audio.play(sounds.dodge.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walking() -> CharacterMotion {
        CharacterMotion::from_tuning(&default())
    }

    #[test]
    fn dodge_waits_for_the_reset_time() {
        let dodge = DodgeState {
            reset_time: 2.0,
            ..default()
        };
        assert!(!dodge_permitted(&walking(), &dodge, 1.5));
        assert!(dodge_permitted(&walking(), &dodge, 2.5));
    }

    #[test]
    fn no_dodge_while_flying_or_dodging() {
        let mut flying = walking();
        flying.mode = MovementMode::Flying;
        assert!(!dodge_permitted(&flying, &DodgeState::default(), 1.0));

        let dodging = DodgeState {
            is_dodging: true,
            ..default()
        };
        assert!(!dodge_permitted(&walking(), &dodging, 1.0));
    }

    #[test]
    fn landing_starts_the_cooldown() {
        let mut dodge = DodgeState {
            is_dodging: true,
            wall_dodges: 1,
            ..default()
        };
        on_landed(&mut dodge, 10.0, 0.35);

        assert!(!dodge.is_dodging);
        assert_eq!(dodge.wall_dodges, 0);
        assert!((dodge.reset_time - 10.35).abs() < 1e-5);
    }

    #[test]
    fn dodge_follows_the_yaw() {
        let tuning = DodgeTuning::default();
        let yaw = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);

        // Facing -X after a quarter turn left
        let velocity = dodge_velocity(DodgeDirection::Forward, yaw, &tuning);
        assert!((velocity.x + tuning.horizontal_speed).abs() < 1e-4);
        assert!(velocity.z.abs() < 1e-4);
        assert_eq!(velocity.y, tuning.vertical_speed);
    }
}
