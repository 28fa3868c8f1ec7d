//! Geometry spawning functions for arena construction.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::materials::ArenaPalette;
use crate::player::WORLD_GROUP;

/// Marker for every arena entity that is removed with the arena.
#[derive(Component)]
pub struct ArenaGeometry;

/// Meshes and materials, absent on a dedicated server.
pub struct ArenaVisuals<'a> {
    pub meshes: &'a mut Assets<Mesh>,
    pub palette: ArenaPalette<'a>,
}

/// What static level geometry collides with.
pub fn world_collision_groups() -> CollisionGroups {
    CollisionGroups::new(WORLD_GROUP, Group::ALL)
}

/// Spawn a solid box centered on `center`.
pub fn spawn_box(
    commands: &mut Commands,
    visuals: Option<&mut ArenaVisuals>,
    center: Vec3,
    size: Vec3,
    color: (f32, f32, f32),
) -> Entity {
    let mut entity = commands.spawn((
        Transform::from_translation(center),
        Visibility::default(),
        RigidBody::Fixed,
        Collider::cuboid(size.x / 2.0, size.y / 2.0, size.z / 2.0),
        world_collision_groups(),
        ArenaGeometry,
    ));

    if let Some(visuals) = visuals {
        entity.insert((
            Mesh3d(visuals.meshes.add(Cuboid::new(size.x, size.y, size.z))),
            MeshMaterial3d(visuals.palette.solid(color)),
        ));
    }

    entity.id()
}

/// Spawn the floor: a slab whose top face is at y = 0.
pub fn spawn_floor(
    commands: &mut Commands,
    visuals: Option<&mut ArenaVisuals>,
    size: (f32, f32),
    color: (f32, f32, f32),
) -> Entity {
    let depth = 1.0;
    spawn_box(
        commands,
        visuals,
        Vec3::new(0.0, -depth / 2.0, 0.0),
        Vec3::new(size.0, depth, size.1),
        color,
    )
}

/// Set up ambient light and the sun.
pub fn spawn_lighting(commands: &mut Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.8, 0.85, 1.0),
        brightness: 300.0,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_3,
            std::f32::consts::FRAC_PI_6,
            0.0,
        )),
        ArenaGeometry,
    ));
}
