//! Game configuration loaded from assets/data/config.ron.
//!
//! Every section has defaults, so a partial file (or no file) still works.
//! Speeds used by the damage rules (fall damage, knockback) are centimeters
//! per second, everything else is meters.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::data::read_ron_file;
use super::error::DataLoadError;

pub const CONFIG_PATH: &str = "assets/data/config.ron";

/// Root configuration resource.
#[derive(Resource, Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub character: CharacterTuning,
    pub damage: DamageTuning,
    pub dodge: DodgeTuning,
    pub controls: ControlTuning,
    pub camera: CameraTuning,
    pub chat: ChatTuning,
    pub rules: MatchRules,
    pub audio: AudioTuning,
}

/// Character body and movement.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CharacterTuning {
    pub capsule_radius: f32,
    /// Half height of the standing capsule, caps included
    pub half_height: f32,
    /// Half height of the crouched capsule, caps included
    pub crouched_half_height: f32,
    /// Eye height above the capsule center
    pub base_eye_height: f32,
    pub crouch_transition_speed: f32,
    pub max_walk_speed: f32,
    pub max_crouch_speed: f32,
    pub max_fly_speed: f32,
    pub ground_acceleration: f32,
    pub air_control: f32,
    pub jump_velocity: f32,
    pub gravity: f32,
    /// kg
    pub mass: f32,
    /// Landing faster than this (cm/s) hurts
    pub fall_damage_speed_threshold: f32,
    /// Seconds between footsteps at max walk speed
    pub footstep_interval: f32,
}

impl Default for CharacterTuning {
    fn default() -> Self {
        Self {
            capsule_radius: 0.425,
            half_height: 0.975,
            crouched_half_height: 0.6,
            base_eye_height: 0.64,
            crouch_transition_speed: 12.0,
            max_walk_speed: 9.4,
            max_crouch_speed: 3.5,
            max_fly_speed: 12.0,
            ground_acceleration: 10.0,
            air_control: 0.35,
            jump_velocity: 7.3,
            gravity: 19.6,
            mass: 100.0,
            fall_damage_speed_threshold: 2675.0,
            footstep_interval: 0.3,
        }
    }
}

/// Starting attributes and damage rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DamageTuning {
    pub health: f32,
    pub health_max: f32,
    pub armor: f32,
    pub armor_max: f32,
    pub shield: f32,
    pub shield_max: f32,
    /// Share of incoming damage soaked by armor (0..1)
    pub armor_absorption: f32,
    /// Knockback impulse per point of damage (kg·cm/s)
    pub knockback_per_damage: f32,
    /// Smaller knockbacks (cm/s of velocity change) are dropped
    pub min_knockback_speed: f32,
    /// Corpse lifetime on a dedicated server (tear-off replication window)
    pub dedicated_corpse_life_span: f32,
    /// Ragdoll lifetime everywhere else
    pub ragdoll_life_span: f32,
}

impl Default for DamageTuning {
    fn default() -> Self {
        Self {
            health: 100.0,
            health_max: 100.0,
            armor: 100.0,
            armor_max: 100.0,
            shield: 0.0,
            shield_max: 100.0,
            armor_absorption: 0.5,
            knockback_per_damage: 1500.0,
            min_knockback_speed: 100.0,
            dedicated_corpse_life_span: 0.2,
            ragdoll_life_span: 5.0,
        }
    }
}

/// Dodge timing and strength.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DodgeTuning {
    /// Two taps of the same direction within this window dodge
    pub tap_window: f32,
    pub horizontal_speed: f32,
    pub vertical_speed: f32,
    /// Cooldown after landing from a dodge
    pub landing_reset_delay: f32,
    /// How close a wall must be for an airborne dodge
    pub wall_dodge_distance: f32,
    pub max_wall_dodges: u32,
}

impl Default for DodgeTuning {
    fn default() -> Self {
        Self {
            tap_window: 0.25,
            horizontal_speed: 12.0,
            vertical_speed: 3.5,
            landing_reset_delay: 0.35,
            wall_dodge_distance: 0.7,
            max_wall_dodges: 1,
        }
    }
}

/// Look and turn input.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlTuning {
    pub mouse_sensitivity: f32,
    pub invert_y: bool,
    /// Degrees per second at full deflection
    pub base_turn_rate: f32,
    pub base_look_up_rate: f32,
    pub spectator_speed: f32,
}

impl Default for ControlTuning {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 1.5,
            invert_y: false,
            base_turn_rate: 45.0,
            base_look_up_rate: 45.0,
            spectator_speed: 10.0,
        }
    }
}

/// Third person camera arm.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraTuning {
    pub arm_length: f32,
    pub target_offset: f32,
    /// Lag used once the camera follows a corpse
    pub lag_speed: f32,
    pub rotation_lag_speed: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            arm_length: 4.0,
            target_offset: 1.0,
            lag_speed: 6.0,
            rotation_lag_speed: 6.0,
        }
    }
}

/// Chat behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatTuning {
    /// Name used when the sender has none
    pub fallback_owner_name: String,
    /// Minimum seconds between two messages from the same player
    pub anti_spam_delay: f32,
    pub history_size: usize,
    pub max_message_length: usize,
    /// Seconds a message stays in the chat box
    pub display_time: f32,
}

impl Default for ChatTuning {
    fn default() -> Self {
        Self {
            fallback_owner_name: "SOMEBODY".to_string(),
            anti_spam_delay: 1.0,
            history_size: 64,
            max_message_length: 200,
            display_time: 8.0,
        }
    }
}

/// Match rules applied by the game mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchRules {
    /// Zero disables the limit
    pub frag_limit: i32,
    /// Practice mode: lethal damage leaves the character at 1 health
    pub prevent_deaths: bool,
    pub respawn_delay: f32,
    /// Unpossessed characters spawned at free player starts
    pub practice_targets: u32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            frag_limit: 25,
            prevent_deaths: false,
            respawn_delay: 1.5,
            practice_targets: 3,
        }
    }
}

/// Sound paths and volumes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioTuning {
    pub music_path: String,
    pub music_volume: f64,
    pub music_fade_in: f32,
    pub music_fade_out: f32,
    pub footstep_sound: String,
    pub dodge_sound: String,
    pub teleport_sound: String,
    pub pickup_sound: String,
}

impl Default for AudioTuning {
    fn default() -> Self {
        Self {
            music_path: "audio/music/arena.ogg".to_string(),
            music_volume: 0.6,
            music_fade_in: 2.0,
            music_fade_out: 1.0,
            footstep_sound: "audio/character/footstep.ogg".to_string(),
            dodge_sound: "audio/character/dodge.ogg".to_string(),
            teleport_sound: "audio/world/teleport.ogg".to_string(),
            pickup_sound: "audio/world/pickup.ogg".to_string(),
        }
    }
}

impl GameConfig {
    /// Read a configuration file and check its values.
    pub fn load_from(path: &Path) -> Result<Self, DataLoadError> {
        let config: Self = read_ron_file(path)?;
        config.validate(path)?;
        Ok(config)
    }

    /// Load the config, falling back to defaults on any error.
    pub fn load() -> Self {
        match Self::load_from(Path::new(CONFIG_PATH)) {
            Ok(config) => {
                info!("Loaded game config from {}", CONFIG_PATH);
                config
            }
            Err(e) => {
                warn!("{}. Using default game config.", e);
                Self::default()
            }
        }
    }

    fn validate(&self, path: &Path) -> Result<(), DataLoadError> {
        let invalid = |details: &str| DataLoadError::Invalid {
            path: path.display().to_string(),
            details: details.to_string(),
        };

        if !(0.0..=1.0).contains(&self.damage.armor_absorption) {
            return Err(invalid("damage.armor_absorption must be within 0..1"));
        }
        if self.character.mass <= 0.0 {
            return Err(invalid("character.mass must be positive"));
        }
        if self.character.crouched_half_height > self.character.half_height {
            return Err(invalid("character.crouched_half_height exceeds half_height"));
        }
        if self.character.capsule_radius >= self.character.crouched_half_height {
            return Err(invalid("character.capsule_radius must be below crouched_half_height"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let config: GameConfig =
            ron::from_str("(damage: (armor_absorption: 0.75), rules: (frag_limit: 10))").unwrap();

        assert_eq!(config.damage.armor_absorption, 0.75);
        assert_eq!(config.damage.health, 100.0);
        assert_eq!(config.rules.frag_limit, 10);
        assert_eq!(config.chat.fallback_owner_name, "SOMEBODY");
    }

    #[test]
    fn absorption_outside_unit_range_is_rejected() {
        let mut config = GameConfig::default();
        config.damage.armor_absorption = 1.5;

        let err = config.validate(Path::new("config.ron")).unwrap_err();
        assert!(matches!(err, DataLoadError::Invalid { .. }));
    }

    #[test]
    fn defaults_are_valid() {
        assert!(GameConfig::default().validate(Path::new("config.ron")).is_ok());
    }
}
