//! Weapon data loading from RON files.

use std::collections::HashMap;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{read_ron_dir, DataLoadError};

pub const WEAPONS_DIR: &str = "assets/data/weapons";

/// Highest weapon group reachable from the number keys.
pub const MAX_WEAPON_GROUP: u8 = 5;

fn default_lifetime() -> f32 {
    5.0
}

fn default_projectile_radius() -> f32 {
    0.1
}

fn default_color() -> (f32, f32, f32) {
    (1.0, 0.6, 0.2)
}

/// Weapon definition loaded from a RON file. The file stem is the weapon class.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct WeaponDefinition {
    pub name: String,
    /// Number key selecting this weapon (0..=5)
    pub group: u8,
    /// Damage of a direct hit, and the splash damage at the center
    pub damage: f32,
    /// Meters per second
    pub projectile_speed: f32,
    /// Zero for no splash
    #[serde(default)]
    pub splash_radius: f32,
    /// Seconds between two shots
    pub refire_interval: f32,
    #[serde(default = "default_lifetime")]
    pub projectile_lifetime: f32,
    #[serde(default = "default_projectile_radius")]
    pub projectile_radius: f32,
    /// Given to every character on spawn
    #[serde(default)]
    pub starting: bool,
    #[serde(default)]
    pub fire_sound: Option<String>,
    #[serde(default = "default_color")]
    pub color: (f32, f32, f32),
}

impl WeaponDefinition {
    fn validate(&self, class: &str) -> Result<(), DataLoadError> {
        let invalid = |details: String| DataLoadError::Invalid {
            path: format!("{}/{}.ron", WEAPONS_DIR, class),
            details,
        };

        if self.group > MAX_WEAPON_GROUP {
            return Err(invalid(format!("group {} is above {}", self.group, MAX_WEAPON_GROUP)));
        }
        if self.refire_interval <= 0.0 {
            return Err(invalid("refire_interval must be positive".to_string()));
        }
        if self.projectile_speed <= 0.0 {
            return Err(invalid("projectile_speed must be positive".to_string()));
        }
        Ok(())
    }
}

/// Resource holding all loaded weapon definitions, keyed by class.
#[derive(Resource, Debug, Default)]
pub struct WeaponRegistry {
    pub definitions: HashMap<String, WeaponDefinition>,
}

impl WeaponRegistry {
    /// Get a weapon definition by class.
    pub fn get(&self, class: &str) -> Option<&WeaponDefinition> {
        self.definitions.get(class)
    }

    pub fn contains(&self, class: &str) -> bool {
        self.definitions.contains_key(class)
    }

    /// Classes every character spawns with, lowest group first.
    pub fn starting_weapons(&self) -> Vec<&str> {
        let mut starting: Vec<_> = self
            .definitions
            .iter()
            .filter(|(_, definition)| definition.starting)
            .collect();
        starting.sort_by(|a, b| a.1.group.cmp(&b.1.group).then(a.0.cmp(b.0)));
        starting.into_iter().map(|(class, _)| class.as_str()).collect()
    }

    /// Load and check every definition in `dir`. Invalid ones are skipped.
    pub fn load_from(dir: &Path) -> Self {
        let mut registry = Self::default();

        for (class, definition) in read_ron_dir::<WeaponDefinition>(dir) {
            match definition.validate(&class) {
                Ok(()) => {
                    info!("Loaded weapon definition: {} ({})", definition.name, class);
                    registry.definitions.insert(class, definition);
                }
                Err(e) => error!("{}", e),
            }
        }

        registry
    }

    /// Weapons available when no data files could be read.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.definitions.insert(
            "impact_rifle".to_string(),
            WeaponDefinition {
                name: "Impact Rifle".to_string(),
                group: 1,
                damage: 35.0,
                projectile_speed: 60.0,
                splash_radius: 0.0,
                refire_interval: 0.6,
                projectile_lifetime: 3.0,
                projectile_radius: 0.08,
                starting: true,
                fire_sound: None,
                color: (0.3, 0.7, 1.0),
            },
        );
        registry.definitions.insert(
            "rocket_launcher".to_string(),
            WeaponDefinition {
                name: "Rocket Launcher".to_string(),
                group: 5,
                damage: 100.0,
                projectile_speed: 19.0,
                splash_radius: 3.6,
                refire_interval: 0.9,
                projectile_lifetime: 8.0,
                projectile_radius: 0.15,
                starting: false,
                fire_sound: None,
                color: (1.0, 0.5, 0.1),
            },
        );
        registry
    }
}

/// Load all weapon definitions from the assets/data/weapons/ directory.
pub fn load_weapon_definitions(mut commands: Commands) {
    let mut registry = WeaponRegistry::load_from(Path::new(WEAPONS_DIR));

    if registry.definitions.is_empty() {
        warn!("No weapon definitions found, using the built-in set");
        registry = WeaponRegistry::builtin();
    }

    info!("Loaded {} weapon definitions", registry.definitions.len());
    commands.insert_resource(registry);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_have_defaults() {
        let definition: WeaponDefinition = ron::from_str(
            "(name: \"Shock Rifle\", group: 4, damage: 45.0, projectile_speed: 30.0, refire_interval: 0.7)",
        )
        .unwrap();

        assert_eq!(definition.splash_radius, 0.0);
        assert_eq!(definition.projectile_lifetime, 5.0);
        assert!(!definition.starting);
        assert!(definition.validate("shock_rifle").is_ok());
    }

    #[test]
    fn groups_beyond_the_number_keys_are_rejected() {
        let mut definition = WeaponRegistry::builtin().definitions["impact_rifle"].clone();
        definition.group = 9;
        assert!(matches!(
            definition.validate("impact_rifle"),
            Err(DataLoadError::Invalid { .. })
        ));
    }

    #[test]
    fn starting_weapons_are_ordered_by_group() {
        let mut registry = WeaponRegistry::builtin();
        if let Some(rocket) = registry.definitions.get_mut("rocket_launcher") {
            rocket.starting = true;
        }

        assert_eq!(registry.starting_weapons(), ["impact_rifle", "rocket_launcher"]);
    }
}
