//! Character construction.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::camera::CharacterCameras;
use super::components::*;
use crate::combat::Attributes;
use crate::core::GameConfig;

/// Shared body mesh and material. Absent on a dedicated server.
#[derive(Resource)]
pub struct CharacterAssets {
    pub body_mesh: Handle<Mesh>,
    pub body_material: Handle<StandardMaterial>,
}

/// Create the body assets once a renderer is around.
pub fn setup_character_assets(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let tuning = &config.character;
    commands.insert_resource(CharacterAssets {
        body_mesh: meshes.add(Capsule3d::new(
            tuning.capsule_radius,
            (tuning.half_height - tuning.capsule_radius) * 2.0,
        )),
        body_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.75, 0.3, 0.2),
            perceptual_roughness: 0.7,
            ..default()
        }),
    });
}

/// Where and for whom a character is spawned.
#[derive(Debug, Clone)]
pub struct CharacterSpawn {
    pub position: Vec3,
    pub yaw: f32,
    pub name: String,
    /// Controller taking possession right away
    pub controller: Option<Entity>,
    /// Driven by input on this machine
    pub local: bool,
}

/// Spawn a character pawn standing on `spawn.position`.
pub fn spawn_character(
    commands: &mut Commands,
    config: &GameConfig,
    assets: Option<&CharacterAssets>,
    spawn: CharacterSpawn,
) -> Entity {
    let tuning = &config.character;
    let center = spawn.position + Vec3::Y * tuning.half_height;

    let mut character = commands.spawn((
        Character,
        PlayerName(spawn.name),
        Attributes::from_tuning(&config.damage),
        CharacterMotion::from_tuning(tuning),
        MoveInput::default(),
        ControlRotation {
            yaw: spawn.yaw,
            pitch: 0.0,
        },
        EyeHeight::new(tuning.base_eye_height),
        DodgeState::default(),
        Footsteps::default(),
        CharacterCameras::default(),
        // Transform
        Transform::from_translation(center).with_rotation(Quat::from_rotation_y(spawn.yaw)),
        Visibility::default(),
    ));

    character.insert((
        // Rapier physics components
        RigidBody::KinematicPositionBased,
        Collider::capsule_y(tuning.half_height - tuning.capsule_radius, tuning.capsule_radius),
        character_collision_groups(),
        KinematicCharacterController {
            offset: CharacterLength::Absolute(0.01),
            // Enable automatic stair climbing
            autostep: Some(CharacterAutostep {
                max_height: CharacterLength::Absolute(0.45),
                min_width: CharacterLength::Absolute(0.3),
                include_dynamic_bodies: false,
            }),
            // Slope handling
            max_slope_climb_angle: 45_f32.to_radians(),
            min_slope_slide_angle: 30_f32.to_radians(),
            snap_to_ground: Some(CharacterLength::Absolute(0.3)),
            // Ragdolls must not trip living players
            filter_groups: Some(character_collision_groups()),
            ..default()
        },
    ));

    if let Some(controller) = spawn.controller {
        character.insert(PossessedBy(controller));
    }
    if spawn.local {
        character.insert(LocallyControlled);
    }

    character.with_children(|parent| {
        let mut body = parent.spawn((CharacterBody, Transform::default(), Visibility::Inherited));
        if let Some(assets) = assets {
            body.insert((
                Mesh3d(assets.body_mesh.clone()),
                MeshMaterial3d(assets.body_material.clone()),
            ));
        }
    });

    let entity = character.id();
    info!("Spawned character {:?} at {}", entity, spawn.position);
    entity
}

/// Remove every character, corpses included, when the match is left.
pub fn despawn_characters(mut commands: Commands, characters: Query<Entity, With<Character>>) {
    for entity in characters.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
