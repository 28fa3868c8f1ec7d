//! Character movement: walking, falling, flying, crouching and landing.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::*;
use super::dodge::on_landed;
use crate::combat::fall_damage;
use crate::core::{interp_to, DamageEvent, DamageKind, GameConfig, NetMode, TornOff, UNITS_PER_METER};

/// Direction the character wants to move in, length at most one.
///
/// Forward follows the view pitch only in 3D modes, strafing always uses yaw
/// alone, and the up axis only counts while flying.
pub fn wish_direction(input: &MoveInput, rotation: &ControlRotation, mode: MovementMode) -> Vec3 {
    let forward = if mode.is_3d() {
        rotation.forward()
    } else {
        rotation.yaw_rotation() * Vec3::NEG_Z
    };
    let right = rotation.yaw_rotation() * Vec3::X;

    let mut wish = forward * input.forward + right * input.right;
    if mode.is_3d() {
        wish += Vec3::Y * input.up;
    }
    wish.clamp_length_max(1.0)
}

/// Horizontal velocity after one frame of acceleration.
///
/// On the ground the velocity eases toward the wished velocity, which also
/// bleeds off knockback. In the air only a fraction of control remains, and
/// none without input.
pub fn horizontal_velocity(
    current: Vec3,
    wish: Vec3,
    max_speed: f32,
    grounded: bool,
    acceleration: f32,
    air_control: f32,
    delta: f32,
) -> Vec3 {
    let current = Vec3::new(current.x, 0.0, current.z);
    let target = Vec3::new(wish.x, 0.0, wish.z) * max_speed;

    if grounded {
        current.lerp(target, (acceleration * delta).clamp(0.0, 1.0))
    } else if wish != Vec3::ZERO {
        current.lerp(target, (air_control * acceleration * delta).clamp(0.0, 1.0))
    } else {
        current
    }
}

/// Walk, fall and fly every living character.
///
/// Uses Rapier's KinematicCharacterController for collision detection when
/// the character has one.
pub fn character_movement(
    time: Res<Time>,
    config: Res<GameConfig>,
    net_mode: Res<NetMode>,
    rapier_context: Query<&RapierContext>,
    mut characters: Query<
        (
            Entity,
            &mut Transform,
            &mut CharacterMotion,
            &mut MoveInput,
            &ControlRotation,
            &mut DodgeState,
            Option<&mut KinematicCharacterController>,
        ),
        (With<Character>, Without<TornOff>),
    >,
    mut damage_events: EventWriter<DamageEvent>,
) {
    let dt = time.delta_secs();
    let now = time.elapsed_secs();
    let tuning = &config.character;

    for (entity, mut transform, mut motion, mut input, rotation, mut dodge, controller) in
        characters.iter_mut()
    {
        // Ground check using raycast (more reliable than KinematicCharacterControllerOutput)
        motion.is_grounded = if let Ok(context) = rapier_context.get_single() {
            let ray_origin = transform.translation - Vec3::Y * (motion.half_height - 0.05);
            context
                .cast_ray(
                    ray_origin,
                    Vec3::NEG_Y,
                    0.15,
                    true,
                    QueryFilter::default()
                        .exclude_collider(entity)
                        .exclude_sensors(),
                )
                .is_some()
        } else {
            // Fallback: assume grounded if no physics context
            true
        };

        let wish = wish_direction(&input, rotation, motion.mode);

        if motion.mode == MovementMode::Flying {
            let target = wish * tuning.max_fly_speed;
            motion.velocity = motion
                .velocity
                .lerp(target, (tuning.ground_acceleration * dt).clamp(0.0, 1.0));
        } else {
            if motion.is_grounded && motion.velocity.y <= 0.0 {
                if motion.mode == MovementMode::Falling {
                    landed(entity, &motion, &mut dodge, now, &config, *net_mode, &mut damage_events);
                }
                motion.mode = MovementMode::Walking;
                motion.velocity.y = 0.0;
            } else if !motion.is_grounded {
                motion.mode = MovementMode::Falling;
                motion.velocity.y -= tuning.gravity * dt;
            }

            if input.jump && motion.mode == MovementMode::Walking {
                motion.velocity.y = tuning.jump_velocity;
                motion.mode = MovementMode::Falling;
            }

            let max_speed = if motion.is_crouched {
                tuning.max_crouch_speed
            } else {
                tuning.max_walk_speed
            };
            let horizontal = horizontal_velocity(
                motion.velocity,
                wish,
                max_speed,
                motion.mode == MovementMode::Walking,
                tuning.ground_acceleration,
                tuning.air_control,
                dt,
            );
            motion.velocity.x = horizontal.x;
            motion.velocity.z = horizontal.z;
        }
        input.jump = false;

        // The body faces where the controller looks
        transform.rotation = rotation.yaw_rotation();

        let translation = motion.velocity * dt;
        match controller {
            Some(mut controller) => controller.translation = Some(translation),
            None => transform.translation += translation,
        }
    }
}

/// Fall damage and dodge bookkeeping on touching the ground.
fn landed(
    entity: Entity,
    motion: &CharacterMotion,
    dodge: &mut DodgeState,
    now: f32,
    config: &GameConfig,
    net_mode: NetMode,
    damage_events: &mut EventWriter<DamageEvent>,
) {
    on_landed(dodge, now, config.dodge.landing_reset_delay);

    let falling_speed = motion.velocity.y * UNITS_PER_METER;
    let Some(damage) = fall_damage(falling_speed, config.character.fall_damage_speed_threshold)
    else {
        return;
    };

    if net_mode.has_authority() {
        debug!("Fall damage ({}) on {:?}", damage, entity);
        damage_events.send(DamageEvent {
            target: entity,
            instigator: None,
            causer: Some(entity),
            amount: damage,
            kind: DamageKind::Fall,
        });
    }
}

/// Resize the capsule on crouch changes and ease the eyes to their base
/// height.
pub fn update_crouch(
    time: Res<Time>,
    config: Res<GameConfig>,
    mut characters: Query<
        (
            &MoveInput,
            &mut CharacterMotion,
            &mut EyeHeight,
            &mut Transform,
            Option<&mut Collider>,
        ),
        (With<Character>, Without<TornOff>),
    >,
) {
    let tuning = &config.character;
    let dt = time.delta_secs();

    for (input, mut motion, mut eye, mut transform, collider) in characters.iter_mut() {
        let wants_crouch = input.crouch && motion.mode != MovementMode::Flying;

        if wants_crouch != motion.is_crouched {
            let difference = tuning.half_height - tuning.crouched_half_height;
            // Feet stay where they are, the eyes follow the capsule center
            if wants_crouch {
                motion.half_height = tuning.crouched_half_height;
                transform.translation.y -= difference;
                eye.offset += difference;
            } else {
                motion.half_height = tuning.half_height;
                transform.translation.y += difference;
                eye.offset -= difference;
            }
            motion.is_crouched = wants_crouch;

            if let Some(mut collider) = collider {
                *collider = Collider::capsule_y(
                    motion.half_height - tuning.capsule_radius,
                    tuning.capsule_radius,
                );
            }
        }

        let bonus = if motion.is_crouched {
            tuning.crouch_transition_speed
        } else {
            0.0
        };
        eye.offset = interp_to(eye.offset, eye.base, dt, tuning.crouch_transition_speed + bonus);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn walking_ignores_pitch_and_vertical_input() {
        let input = MoveInput {
            forward: 1.0,
            up: 1.0,
            ..default()
        };
        let rotation = ControlRotation {
            yaw: 0.0,
            pitch: 0.8,
        };

        let wish = wish_direction(&input, &rotation, MovementMode::Walking);
        assert!((wish - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn flying_follows_the_view() {
        let input = MoveInput {
            forward: 1.0,
            ..default()
        };
        let rotation = ControlRotation {
            yaw: 0.0,
            pitch: std::f32::consts::FRAC_PI_2,
        };

        let wish = wish_direction(&input, &rotation, MovementMode::Flying);
        assert!((wish - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn diagonal_input_is_not_faster() {
        let input = MoveInput {
            forward: 1.0,
            right: 1.0,
            ..default()
        };
        let wish = wish_direction(&input, &ControlRotation::default(), MovementMode::Walking);
        assert!((wish.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn air_control_needs_input() {
        let current = Vec3::new(5.0, -3.0, 0.0);
        let coasting = horizontal_velocity(current, Vec3::ZERO, 9.4, false, 10.0, 0.35, 0.016);
        assert_eq!(coasting, Vec3::new(5.0, 0.0, 0.0));

        let braking = horizontal_velocity(current, Vec3::ZERO, 9.4, true, 10.0, 0.35, 0.016);
        assert!(braking.x < 5.0);
    }

    fn movement_app() -> (App, Entity) {
        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(GameConfig::default())
            .insert_resource(NetMode::Standalone)
            .add_event::<DamageEvent>()
            .add_systems(Update, (character_movement, update_crouch).chain());

        let tuning = GameConfig::default().character;
        let character = app
            .world_mut()
            .spawn((
                Character,
                Transform::from_xyz(0.0, tuning.half_height, 0.0),
                CharacterMotion::from_tuning(&tuning),
                MoveInput::default(),
                ControlRotation::default(),
                DodgeState::default(),
                EyeHeight::new(tuning.base_eye_height),
            ))
            .id();
        (app, character)
    }

    fn step(app: &mut App) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(16));
        app.update();
    }

    #[test]
    fn hard_landing_hurts() {
        let (mut app, character) = movement_app();
        {
            let mut motion = app.world_mut().get_mut::<CharacterMotion>(character).unwrap();
            motion.mode = MovementMode::Falling;
            motion.velocity.y = -36.75;
        }
        step(&mut app);

        let events = app.world().resource::<Events<DamageEvent>>();
        let fall: Vec<_> = events.iter_current_update_events().collect();
        assert_eq!(fall.len(), 1);
        assert!((fall[0].amount - 150.0).abs() < 0.1);
        assert_eq!(fall[0].kind, DamageKind::Fall);

        let motion = app.world().get::<CharacterMotion>(character).unwrap();
        assert_eq!(motion.mode, MovementMode::Walking);
        assert_eq!(motion.velocity.y, 0.0);
    }

    #[test]
    fn crouching_keeps_the_eyes_in_place_then_lowers_them() {
        let (mut app, character) = movement_app();
        let tuning = GameConfig::default().character;
        let difference = tuning.half_height - tuning.crouched_half_height;

        app.world_mut().get_mut::<MoveInput>(character).unwrap().crouch = true;
        step(&mut app);

        let motion = app.world().get::<CharacterMotion>(character).unwrap();
        assert!(motion.is_crouched);
        let eye = app.world().get::<EyeHeight>(character).unwrap();
        assert!(eye.offset > tuning.base_eye_height);
        assert!(eye.offset < tuning.base_eye_height + difference);

        for _ in 0..120 {
            step(&mut app);
        }
        let eye = app.world().get::<EyeHeight>(character).unwrap();
        assert!((eye.offset - tuning.base_eye_height).abs() < 1e-3);
    }
}
