//! Footstep sounds for the locally controlled character.

use bevy::prelude::*;
use bevy_kira_audio::prelude::*;
use bevy_kira_audio::AudioSource;

use super::components::*;
use crate::core::{GameConfig, TornOff};

/// Sounds shared by every character.
#[derive(Resource)]
pub struct CharacterSounds {
    pub footstep: Handle<AudioSource>,
    pub dodge: Handle<AudioSource>,
}

/// Load character sounds. Only runs where an audio device exists.
pub fn load_character_sounds(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<GameConfig>,
) {
    commands.insert_resource(CharacterSounds {
        footstep: asset_server.load(config.audio.footstep_sound.clone()),
        dodge: asset_server.load(config.audio.dodge_sound.clone()),
    });
}

/// Seconds until the next step at `speed`. Faster means more frequent.
pub fn footstep_interval(base_interval: f32, max_walk_speed: f32, speed: f32) -> Option<f32> {
    (speed > 0.0).then(|| base_interval * max_walk_speed / speed)
}

/// Steps get quieter as the character slows down.
pub fn footstep_volume(max_walk_speed: f32, speed: f32) -> f32 {
    if max_walk_speed <= 0.0 {
        return 1.0;
    }
    (speed / max_walk_speed).clamp(0.2, 1.0)
}

/// Play footsteps while the local character walks.
pub fn tick_footsteps(
    time: Res<Time>,
    config: Res<GameConfig>,
    audio: Res<Audio>,
    sounds: Option<Res<CharacterSounds>>,
    mut characters: Query<
        (&CharacterMotion, &mut Footsteps),
        (With<LocallyControlled>, Without<TornOff>),
    >,
) {
    let Some(sounds) = sounds else {
        return;
    };
    let now = time.elapsed_secs();
    let tuning = &config.character;

    for (motion, mut footsteps) in characters.iter_mut() {
        if motion.mode != MovementMode::Walking {
            continue;
        }

        let speed = Vec3::new(motion.velocity.x, 0.0, motion.velocity.z).length();
        let Some(interval) = footstep_interval(tuning.footstep_interval, tuning.max_walk_speed, speed)
        else {
            continue;
        };

        if now - footsteps.last_step > interval {
            audio
                .play(sounds.footstep.clone())
                .with_volume(footstep_volume(tuning.max_walk_speed, speed) as f64);
            footsteps.last_step = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_speed_up_with_velocity() {
        assert_eq!(footstep_interval(0.3, 9.4, 0.0), None);

        let full = footstep_interval(0.3, 9.4, 9.4).unwrap();
        assert!((full - 0.3).abs() < 1e-6);

        let half = footstep_interval(0.3, 9.4, 4.7).unwrap();
        assert!((half - 0.6).abs() < 1e-6);
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(footstep_volume(9.4, 9.4), 1.0);
        assert_eq!(footstep_volume(9.4, 20.0), 1.0);
        assert_eq!(footstep_volume(9.4, 0.5), 0.2);
        assert!((footstep_volume(10.0, 5.0) - 0.5).abs() < 1e-6);
    }
}
