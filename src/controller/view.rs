//! Placing the local view camera on the view target.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::*;
use crate::combat::Ragdoll;
use crate::core::{GameConfig, SmoothTransform};
use crate::player::{CameraView, CharacterCameras, EyeHeight, WORLD_GROUP};

/// Keeps the camera from touching the wall it backs into.
const ARM_WALL_MARGIN: f32 = 0.2;

/// Camera position behind `pivot` for a view `rotation`, shortened to
/// `blocked_at` when the arm hits the level.
pub fn third_person_position(pivot: Vec3, rotation: Quat, arm_length: f32, blocked_at: Option<f32>) -> Vec3 {
    let length = blocked_at.map_or(arm_length, |toi| (toi - ARM_WALL_MARGIN).clamp(0.0, arm_length));
    pivot + rotation * Vec3::Z * length
}

/// Move the view camera to the first person eyes, the third person arm, or
/// the free spectator position. A ragdoll is followed with lag.
pub fn update_view_camera(
    config: Res<GameConfig>,
    rapier_context: Query<&RapierContext>,
    controllers: Query<&PlayerController, With<LocalPlayer>>,
    targets: Query<(&Transform, Option<&EyeHeight>, Option<&CharacterCameras>, Has<Ragdoll>), Without<ViewCamera>>,
    mut cameras: Query<&mut SmoothTransform, With<ViewCamera>>,
) {
    let Ok(controller) = controllers.get_single() else {
        return;
    };
    let Ok(mut smooth) = cameras.get_single_mut() else {
        return;
    };

    let rotation = controller.rotation.rotation();
    let tuning = &config.camera;
    let target = controller
        .view_target
        .and_then(|entity| targets.get(entity).ok().map(|t| (entity, t)));

    let (translation, lagged) = match target {
        Some((_, (transform, Some(eye), Some(views), _)))
            if views.active == Some(CameraView::FirstPerson) =>
        {
            (transform.translation + Vec3::Y * eye.offset, false)
        }
        Some((entity, (transform, _, _, ragdoll))) => {
            let pivot = transform.translation + Vec3::Y * tuning.target_offset;
            let direction = rotation * Vec3::Z;
            let blocked_at = rapier_context.get_single().ok().and_then(|context| {
                context
                    .cast_ray(
                        pivot,
                        direction,
                        tuning.arm_length,
                        true,
                        QueryFilter::default()
                            .exclude_collider(entity)
                            .exclude_sensors()
                            .groups(CollisionGroups::new(Group::ALL, WORLD_GROUP)),
                    )
                    .map(|(_, toi)| toi)
            });
            (
                third_person_position(pivot, rotation, tuning.arm_length, blocked_at),
                ragdoll,
            )
        }
        None => (controller.spectator_position, false),
    };

    smooth.target_translation = Some(translation);
    smooth.target_rotation = Some(rotation);
    if lagged {
        smooth.translation_speed = tuning.lag_speed;
        smooth.rotation_speed = tuning.rotation_lag_speed;
    } else {
        smooth.translation_speed = 0.0;
        smooth.rotation_speed = 0.0;
    }
}
