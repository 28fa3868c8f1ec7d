//! Teleporters.

use std::collections::HashSet;

use bevy::prelude::*;
use bevy_kira_audio::prelude::*;
use bevy_kira_audio::AudioSource;

use super::data::ExitRotation;
use crate::controller::PlayerController;
use crate::core::{GameConfig, TornOff};
use crate::player::{Character, CharacterMotion, ControlRotation, PossessedBy};

/// Trigger capsule of every teleporter.
pub const TELEPORTER_RADIUS: f32 = 1.0;
pub const TELEPORTER_HALF_HEIGHT: f32 = 1.5;

/// Where a teleporter leads, once resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    Teleporter(Entity),
    Point { position: Vec3, yaw: f32 },
}

#[derive(Component, Debug)]
pub struct Teleporter {
    pub id: String,
    pub destination: Option<Destination>,
    pub exit_rotation: ExitRotation,
    pub keep_momentum: bool,
    /// Actors that arrived here and have not left the trigger yet
    pub ignored: HashSet<Entity>,
}

/// Whether `position` is inside a teleporter trigger at `center`.
pub fn inside_trigger(center: Vec3, position: Vec3) -> bool {
    let offset = position - center;
    Vec2::new(offset.x, offset.z).length() <= TELEPORTER_RADIUS
        && offset.y.abs() <= TELEPORTER_HALF_HEIGHT
}

/// Yaw and velocity of an actor leaving a teleport.
///
/// Relative keeps the actor's facing relative to the teleporters, Fixed
/// faces the destination's direction. Velocity turns with the actor, or is
/// dropped without momentum.
pub fn exit_motion(
    source_yaw: f32,
    destination_yaw: f32,
    actor_yaw: f32,
    velocity: Vec3,
    exit_rotation: ExitRotation,
    keep_momentum: bool,
) -> (f32, Vec3) {
    let new_yaw = match exit_rotation {
        ExitRotation::Relative => destination_yaw + (actor_yaw - source_yaw),
        ExitRotation::Fixed => destination_yaw,
    };

    let velocity = if keep_momentum {
        Quat::from_rotation_y(new_yaw - actor_yaw) * velocity
    } else {
        Vec3::ZERO
    };

    (new_yaw, velocity)
}

/// Move an actor to `position`, facing `yaw`.
pub fn perform_teleport(
    transform: &mut Transform,
    rotation: Option<&mut ControlRotation>,
    motion: Option<&mut CharacterMotion>,
    position: Vec3,
    yaw: f32,
    velocity: Vec3,
) {
    transform.translation = position;
    transform.rotation = Quat::from_rotation_y(yaw);
    if let Some(rotation) = rotation {
        rotation.yaw = yaw;
    }
    if let Some(motion) = motion {
        motion.velocity = velocity;
    }
}

/// Teleport sound. Only loaded where an audio device exists.
#[derive(Resource)]
pub struct TeleportSound(pub Handle<AudioSource>);

pub fn load_teleport_sound(mut commands: Commands, asset_server: Res<AssetServer>, config: Res<GameConfig>) {
    commands.insert_resource(TeleportSound(asset_server.load(config.audio.teleport_sound.clone())));
}

fn yaw_of(transform: &Transform) -> f32 {
    transform.rotation.to_euler(EulerRot::YXZ).0
}

/// Send characters entering a trigger to its destination.
pub fn teleport_actors(
    audio: Option<Res<Audio>>,
    sound: Option<Res<TeleportSound>>,
    mut teleporters: Query<(Entity, &Transform, &mut Teleporter), Without<Character>>,
    mut actors: Query<
        (
            Entity,
            &mut Transform,
            Option<&mut CharacterMotion>,
            Option<&mut ControlRotation>,
            Option<&PossessedBy>,
        ),
        (With<Character>, Without<TornOff>),
    >,
    mut controllers: Query<&mut PlayerController>,
) {
    // Actors that walked out of a trigger may use it again
    for (_, transform, mut teleporter) in teleporters.iter_mut() {
        let center = transform.translation;
        teleporter
            .ignored
            .retain(|&actor| actors.get(actor).is_ok_and(|a| inside_trigger(center, a.1.translation)));
    }

    let snapshot: Vec<(Entity, Transform, Option<Destination>, ExitRotation, bool, HashSet<Entity>)> =
        teleporters
            .iter()
            .map(|(entity, transform, t)| {
                (entity, *transform, t.destination.clone(), t.exit_rotation, t.keep_momentum, t.ignored.clone())
            })
            .collect();

    let mut arrivals = Vec::new();
    let mut moved = HashSet::new();

    for (_, source, destination, exit_rotation, keep_momentum, ignored) in &snapshot {
        let Some(destination) = destination else {
            continue;
        };
        let (position, destination_yaw, arrival) = match destination {
            Destination::Teleporter(target) => {
                let Some(target_transform) = snapshot.iter().find(|s| s.0 == *target).map(|s| s.1) else {
                    continue;
                };
                (target_transform.translation, yaw_of(&target_transform), Some(*target))
            }
            Destination::Point { position, yaw } => (*position, *yaw, None),
        };

        for (actor, mut transform, mut motion, mut rotation, possessed_by) in actors.iter_mut() {
            if moved.contains(&actor)
                || ignored.contains(&actor)
                || !inside_trigger(source.translation, transform.translation)
            {
                continue;
            }

            let actor_yaw = rotation.as_ref().map_or_else(|| yaw_of(&transform), |r| r.yaw);
            let velocity = motion.as_ref().map_or(Vec3::ZERO, |m| m.velocity);
            let (yaw, velocity) = exit_motion(
                yaw_of(source),
                destination_yaw,
                actor_yaw,
                velocity,
                *exit_rotation,
                *keep_momentum,
            );

            // Keep the feet where they were relative to the trigger
            let height = transform.translation.y - source.translation.y;
            perform_teleport(
                &mut transform,
                rotation.as_deref_mut(),
                motion.as_deref_mut(),
                position + Vec3::Y * height,
                yaw,
                velocity,
            );

            // The controller owns the view rotation of its pawn
            if let Some(mut controller) = possessed_by.and_then(|p| controllers.get_mut(p.0).ok()) {
                controller.rotation.yaw = yaw;
            }

            moved.insert(actor);
            if let Some(target) = arrival {
                arrivals.push((target, actor));
            }
            if let (Some(audio), Some(sound)) = (audio.as_ref(), sound.as_ref()) {
                audio.play(sound.0.clone());
            }
            info!("Teleported {:?} to {}", actor, position);
        }
    }

    for (target, actor) in arrivals {
        if let Ok((_, _, mut teleporter)) = teleporters.get_mut(target) {
            teleporter.ignored.insert(actor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn relative_exit_keeps_the_facing() {
        let (yaw, velocity) = exit_motion(0.0, FRAC_PI_2, 0.0, Vec3::NEG_Z * 10.0, ExitRotation::Relative, true);
        assert!((yaw - FRAC_PI_2).abs() < 1e-5);
        assert!((velocity - Vec3::NEG_X * 10.0).length() < 1e-4);

        let (yaw, _) = exit_motion(0.0, FRAC_PI_2, 0.3, Vec3::ZERO, ExitRotation::Relative, true);
        assert!((yaw - (FRAC_PI_2 + 0.3)).abs() < 1e-5);
    }

    #[test]
    fn fixed_exit_faces_the_destination() {
        let (yaw, _) = exit_motion(1.0, 0.5, 2.0, Vec3::ZERO, ExitRotation::Fixed, true);
        assert_eq!(yaw, 0.5);
    }

    #[test]
    fn momentum_can_be_dropped() {
        let (_, velocity) = exit_motion(0.0, 0.0, 0.0, Vec3::X * 5.0, ExitRotation::Relative, false);
        assert_eq!(velocity, Vec3::ZERO);
    }

    #[test]
    fn arrivals_do_not_bounce_back() {
        let mut app = App::new();
        app.add_systems(Update, teleport_actors);

        let a = app.world_mut().spawn_empty().id();
        let b = app.world_mut().spawn_empty().id();
        app.world_mut().entity_mut(a).insert((
            Teleporter {
                id: "a".into(),
                destination: Some(Destination::Teleporter(b)),
                exit_rotation: ExitRotation::Relative,
                keep_momentum: true,
                ignored: HashSet::new(),
            },
            Transform::from_xyz(10.0, 0.0, 0.0),
        ));
        app.world_mut().entity_mut(b).insert((
            Teleporter {
                id: "b".into(),
                destination: Some(Destination::Teleporter(a)),
                exit_rotation: ExitRotation::Relative,
                keep_momentum: true,
                ignored: HashSet::new(),
            },
            Transform::from_xyz(-10.0, 0.0, 0.0),
        ));
        let actor = app
            .world_mut()
            .spawn((Character, Transform::from_xyz(10.0, 1.0, 0.0)))
            .id();

        app.update();
        let position = app.world().get::<Transform>(actor).unwrap().translation;
        assert_eq!(position, Vec3::new(-10.0, 1.0, 0.0));
        assert!(app.world().get::<Teleporter>(b).unwrap().ignored.contains(&actor));

        // Still standing in the destination trigger: nothing happens
        app.update();
        let position = app.world().get::<Transform>(actor).unwrap().translation;
        assert_eq!(position, Vec3::new(-10.0, 1.0, 0.0));

        // Leaving the trigger clears the guard
        app.world_mut().get_mut::<Transform>(actor).unwrap().translation = Vec3::new(-5.0, 1.0, 0.0);
        app.update();
        assert!(app.world().get::<Teleporter>(b).unwrap().ignored.is_empty());
    }
}
