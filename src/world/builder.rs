//! Arena construction from data definitions.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use super::data::{ArenaDefinition, PickupKind, TeleportDestination};
use super::geometry::{spawn_box, spawn_floor, ArenaGeometry, ArenaVisuals};
use super::pickups::Pickup;
use super::teleporter::{Destination, Teleporter, TELEPORTER_HALF_HEIGHT, TELEPORTER_RADIUS};

/// Where characters may enter the arena. The transform is at the feet.
#[derive(Component)]
pub struct PlayerStart;

fn vec3(v: (f32, f32, f32)) -> Vec3 {
    Vec3::new(v.0, v.1, v.2)
}

fn yaw_rotation(degrees: f32) -> Quat {
    Quat::from_rotation_y(degrees.to_radians())
}

/// Build an arena. Returns the player start transforms.
pub fn build_arena(
    commands: &mut Commands,
    mut visuals: Option<ArenaVisuals>,
    arena: &ArenaDefinition,
) -> Vec<Transform> {
    spawn_floor(commands, visuals.as_mut(), arena.floor_size, arena.floor_color);

    for block in &arena.blocks {
        spawn_box(commands, visuals.as_mut(), vec3(block.position), vec3(block.size), block.color);
    }

    let starts: Vec<Transform> = arena
        .player_starts
        .iter()
        .map(|start| Transform::from_translation(vec3(start.position)).with_rotation(yaw_rotation(start.yaw_degrees)))
        .collect();
    for transform in &starts {
        commands.spawn((PlayerStart, *transform, ArenaGeometry));
    }

    for pickup in &arena.pickups {
        let mut entity = commands.spawn((
            Pickup::new(pickup.kind.clone(), pickup.radius, pickup.respawn_time),
            Transform::from_translation(vec3(pickup.position) + Vec3::Y * 0.5),
            Visibility::default(),
            ArenaGeometry,
        ));
        if let Some(visuals) = visuals.as_mut() {
            let mesh = match pickup.kind {
                PickupKind::Weapon(_) => visuals.meshes.add(Cuboid::new(0.8, 0.25, 0.25)),
                _ => visuals.meshes.add(Sphere::new(0.3)),
            };
            entity.insert((Mesh3d(mesh), MeshMaterial3d(visuals.palette.pickup.clone())));
        }
    }

    spawn_teleporters(commands, visuals.as_mut(), arena);

    starts
}

/// Spawn teleporters and link them to their destinations.
fn spawn_teleporters(commands: &mut Commands, mut visuals: Option<&mut ArenaVisuals>, arena: &ArenaDefinition) {
    let mut ids = HashMap::new();
    let mut seen = HashSet::new();
    for def in &arena.teleporters {
        if !seen.insert(def.id.as_str()) {
            warn!("Duplicate teleporter id '{}'", def.id);
            continue;
        }
        ids.insert(def.id.as_str(), commands.spawn_empty().id());
    }

    for def in &arena.teleporters {
        let Some(&entity) = ids.get(def.id.as_str()) else {
            continue;
        };

        let destination = match &def.destination {
            TeleportDestination::Teleporter(target) => match ids.get(target.as_str()) {
                Some(&target) if target != entity => Some(Destination::Teleporter(target)),
                _ => {
                    warn!("Teleporter '{}' has no valid destination", def.id);
                    None
                }
            },
            TeleportDestination::Point { position, yaw_degrees } => Some(Destination::Point {
                position: vec3(*position),
                yaw: yaw_degrees.to_radians(),
            }),
        };

        // The trigger center sits one half height above the pad
        let center = vec3(def.position) + Vec3::Y * TELEPORTER_HALF_HEIGHT;
        let mut teleporter = commands.entity(entity);
        teleporter.insert((
            Teleporter {
                id: def.id.clone(),
                destination,
                exit_rotation: def.exit_rotation,
                keep_momentum: def.keep_momentum,
                ignored: HashSet::new(),
            },
            Transform::from_translation(center).with_rotation(yaw_rotation(def.yaw_degrees)),
            Visibility::default(),
            ArenaGeometry,
        ));

        if let Some(visuals) = visuals.as_mut() {
            teleporter.insert((
                Mesh3d(visuals.meshes.add(Cylinder::new(TELEPORTER_RADIUS, TELEPORTER_HALF_HEIGHT * 2.0))),
                MeshMaterial3d(visuals.palette.teleporter.clone()),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::world::CommandQueue;

    #[test]
    fn teleporters_are_linked_by_id() {
        let mut arena = ArenaDefinition::fallback();
        arena.teleporters = ron::from_str(
            r#"[
                (id: "a", position: (5.0, 0.0, 0.0), destination: Teleporter("b")),
                (id: "b", position: (-5.0, 0.0, 0.0), destination: Teleporter("a")),
                (id: "c", position: (0.0, 0.0, 5.0), destination: Teleporter("c")),
            ]"#,
        )
        .unwrap();

        let mut world = World::new();
        let mut queue = CommandQueue::default();
        let starts = {
            let mut commands = Commands::new(&mut queue, &world);
            build_arena(&mut commands, None, &arena)
        };
        queue.apply(&mut world);

        assert_eq!(starts.len(), 4);
        assert_eq!(world.query::<&PlayerStart>().iter(&world).count(), 4);

        let mut teleporters = world.query::<(Entity, &Teleporter)>();
        let by_id: HashMap<String, (Entity, Option<Destination>)> = teleporters
            .iter(&world)
            .map(|(e, t)| (t.id.clone(), (e, t.destination.clone())))
            .collect();

        assert_eq!(by_id["a"].1, Some(Destination::Teleporter(by_id["b"].0)));
        assert_eq!(by_id["b"].1, Some(Destination::Teleporter(by_id["a"].0)));
        assert_eq!(by_id["c"].1, None);
    }
}
