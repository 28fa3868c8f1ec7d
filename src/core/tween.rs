//! Frame-rate aware interpolation helpers.

use bevy::prelude::*;

/// Move `current` toward `target` by a fraction of the remaining distance.
///
/// `speed` is how much of the gap closes per second; zero or less snaps.
pub fn interp_to(current: f32, target: f32, delta: f32, speed: f32) -> f32 {
    if speed <= 0.0 {
        return target;
    }

    let distance = target - current;
    if distance * distance < 1.0e-8 {
        return target;
    }

    current + distance * (delta * speed).clamp(0.0, 1.0)
}

/// Component for smooth transform interpolation (camera lag).
#[derive(Component)]
pub struct SmoothTransform {
    /// Target translation (None = don't animate)
    pub target_translation: Option<Vec3>,
    /// Target rotation (None = don't animate)
    pub target_rotation: Option<Quat>,
    /// Interpolation speed multiplier (higher = faster, zero snaps)
    pub translation_speed: f32,
    pub rotation_speed: f32,
}

impl Default for SmoothTransform {
    fn default() -> Self {
        Self {
            target_translation: None,
            target_rotation: None,
            translation_speed: 0.0,
            rotation_speed: 0.0,
        }
    }
}

impl SmoothTransform {
    pub fn new(translation_speed: f32, rotation_speed: f32) -> Self {
        Self {
            translation_speed,
            rotation_speed,
            ..default()
        }
    }
}

/// System that interpolates transforms toward their targets.
pub fn update_smooth_transforms(
    time: Res<Time>,
    mut query: Query<(&mut Transform, &SmoothTransform)>,
) {
    let dt = time.delta_secs();

    for (mut transform, smooth) in query.iter_mut() {
        if let Some(target) = smooth.target_translation {
            transform.translation = if smooth.translation_speed <= 0.0 {
                target
            } else {
                transform
                    .translation
                    .lerp(target, (smooth.translation_speed * dt).min(1.0))
            };
        }

        if let Some(target) = smooth.target_rotation {
            transform.rotation = if smooth.rotation_speed <= 0.0 {
                target
            } else {
                transform
                    .rotation
                    .slerp(target, (smooth.rotation_speed * dt).min(1.0))
            };
        }
    }
}
