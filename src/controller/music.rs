//! Background music with fades, owned by the local player.

use std::time::Duration;

use bevy::prelude::*;
use bevy_kira_audio::prelude::*;

use crate::core::GameConfig;

/// Music requests.
#[derive(Event, Debug, Clone)]
pub enum MusicEvent {
    Play { path: String, fade_in: f32 },
    Stop { fade_out: f32 },
    SetVolume(f64),
}

/// The current track and the player's music volume.
#[derive(Resource, Debug)]
pub struct MusicPlayer {
    volume: f64,
    current: Option<Handle<AudioInstance>>,
}

impl Default for MusicPlayer {
    fn default() -> Self {
        Self {
            volume: 1.0,
            current: None,
        }
    }
}

impl MusicPlayer {
    pub fn with_volume(volume: f64) -> Self {
        let mut player = Self::default();
        player.set_volume(volume);
        player
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Store a new volume scalar, clamped to 0..1.
    pub fn set_volume(&mut self, volume: f64) -> f64 {
        self.volume = volume.clamp(0.0, 1.0);
        self.volume
    }
}

fn fade(seconds: f32) -> AudioTween {
    AudioTween::linear(Duration::from_secs_f32(seconds.max(0.0)))
}

/// Apply music requests to the audio channel.
pub fn handle_music_events(
    mut events: EventReader<MusicEvent>,
    mut player: ResMut<MusicPlayer>,
    audio: Res<Audio>,
    asset_server: Res<AssetServer>,
    mut instances: ResMut<Assets<AudioInstance>>,
) {
    for event in events.read() {
        match event {
            MusicEvent::Play { path, fade_in } => {
                // A new track replaces the old one
                if let Some(instance) = player.current.take().and_then(|h| instances.get_mut(&h)) {
                    instance.stop(AudioTween::default());
                }

                let handle = audio
                    .play(asset_server.load(path.clone()))
                    .looped()
                    .with_volume(player.volume)
                    .fade_in(fade(*fade_in))
                    .handle();
                player.current = Some(handle);
                info!("Playing music {}", path);
            }
            MusicEvent::Stop { fade_out } => {
                if let Some(instance) = player.current.take().and_then(|h| instances.get_mut(&h)) {
                    instance.stop(fade(*fade_out));
                }
            }
            MusicEvent::SetVolume(volume) => {
                let volume = player.set_volume(*volume);
                if let Some(instance) = player.current.as_ref().and_then(|h| instances.get_mut(h)) {
                    instance.set_volume(volume, AudioTween::default());
                }
            }
        }
    }
}

pub fn setup_music_player(mut commands: Commands, config: Res<GameConfig>) {
    commands.insert_resource(MusicPlayer::with_volume(config.audio.music_volume));
}

pub fn start_match_music(config: Res<GameConfig>, mut events: EventWriter<MusicEvent>) {
    events.send(MusicEvent::Play {
        path: config.audio.music_path.clone(),
        fade_in: config.audio.music_fade_in,
    });
}

pub fn stop_match_music(config: Res<GameConfig>, mut events: EventWriter<MusicEvent>) {
    events.send(MusicEvent::Stop {
        fade_out: config.audio.music_fade_out,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_is_kept_in_range() {
        let mut player = MusicPlayer::with_volume(0.6);
        assert_eq!(player.volume(), 0.6);
        assert_eq!(player.set_volume(2.0), 1.0);
        assert_eq!(player.set_volume(-1.0), 0.0);
    }
}
