//! Pickups: weapons, health, armor and shield lying around the arena.

use bevy::prelude::*;
use bevy_kira_audio::prelude::*;
use bevy_kira_audio::AudioSource;
use thiserror::Error;

use super::data::PickupKind;
use crate::combat::{is_alive, Attributes};
use crate::core::{GameConfig, LifeSpan, NetMode, TornOff};
use crate::player::{Character, PlayerName};
use crate::weapons::{Inventory, WeaponRegistry};

/// Why a pickup was not taken.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PickupError {
    #[error("Unknown weapon class '{0}'")]
    UnknownWeapon(String),
    #[error("Nothing to carry weapons in")]
    NoInventory,
    #[error("Already full")]
    Full,
}

/// A pickup spot. Hidden while waiting to respawn.
#[derive(Component, Debug)]
pub struct Pickup {
    pub kind: PickupKind,
    pub radius: f32,
    pub respawn_time: f32,
    pub available: bool,
    respawn_timer: Timer,
}

impl Pickup {
    pub fn new(kind: PickupKind, radius: f32, respawn_time: f32) -> Self {
        Self {
            kind,
            radius,
            respawn_time,
            available: true,
            respawn_timer: Timer::from_seconds(respawn_time.max(0.0), TimerMode::Once),
        }
    }

    /// Take the pickup away until it respawns.
    pub fn taken(&mut self) {
        self.available = false;
        self.respawn_timer.reset();
    }

    /// Advance the respawn timer. Returns true when the pickup came back.
    pub fn tick(&mut self, delta: std::time::Duration) -> bool {
        if self.available {
            return false;
        }
        self.respawn_timer.tick(delta);
        if self.respawn_timer.finished() {
            self.available = true;
            return true;
        }
        false
    }
}

/// Name shown when the pickup is taken.
pub fn item_name(kind: &PickupKind, weapons: &WeaponRegistry) -> String {
    match kind {
        PickupKind::Weapon(class) => weapons
            .get(class)
            .map_or_else(|| class.clone(), |definition| definition.name.clone()),
        PickupKind::Health(amount) => format!("{} Health", amount),
        PickupKind::Armor(amount) => format!("{} Armor", amount),
        PickupKind::Shield(amount) => format!("{} Shield", amount),
    }
}

/// Hand the pickup's contents over.
///
/// Pools already at their maximum refuse the pickup. A weapon pickup is
/// always taken when the class exists, even if the weapon is already owned.
pub fn give_to(
    kind: &PickupKind,
    attributes: &mut Attributes,
    inventory: Option<&mut Inventory>,
    weapons: &WeaponRegistry,
) -> Result<(), PickupError> {
    let gained = match kind {
        PickupKind::Weapon(class) => {
            let definition = weapons
                .get(class)
                .ok_or_else(|| PickupError::UnknownWeapon(class.clone()))?;
            let inventory = inventory.ok_or(PickupError::NoInventory)?;
            inventory.give_weapon(class, definition);
            return Ok(());
        }
        PickupKind::Health(amount) => attributes.heal(*amount),
        PickupKind::Armor(amount) => attributes.add_armor(*amount),
        PickupKind::Shield(amount) => attributes.add_shield(*amount),
    };

    if gained > 0.0 {
        Ok(())
    } else {
        Err(PickupError::Full)
    }
}

/// Whether a character standing at `character` touches a pickup at `pickup`.
pub fn within_reach(pickup: Vec3, radius: f32, character: Vec3, half_height: f32) -> bool {
    let offset = character - pickup;
    let horizontal = Vec2::new(offset.x, offset.z).length();
    horizontal <= radius && offset.y.abs() <= half_height + radius
}

/// Pickup sound. Only loaded where an audio device exists.
#[derive(Resource)]
pub struct PickupSound(pub Handle<AudioSource>);

pub fn load_pickup_sound(mut commands: Commands, asset_server: Res<AssetServer>, config: Res<GameConfig>) {
    commands.insert_resource(PickupSound(asset_server.load(config.audio.pickup_sound.clone())));
}

/// Give pickups to the living characters touching them.
#[allow(clippy::too_many_arguments)]
pub fn collect_pickups(
    net_mode: Res<NetMode>,
    config: Res<GameConfig>,
    weapons: Res<WeaponRegistry>,
    audio: Option<Res<Audio>>,
    sound: Option<Res<PickupSound>>,
    mut pickups: Query<(&mut Pickup, &Transform, &mut Visibility), Without<Character>>,
    mut characters: Query<
        (
            &Transform,
            &mut Attributes,
            Option<&mut Inventory>,
            Option<&PlayerName>,
            Has<TornOff>,
            Has<LifeSpan>,
        ),
        With<Character>,
    >,
) {
    if !net_mode.has_authority() {
        return;
    }

    for (mut pickup, pickup_transform, mut visibility) in pickups.iter_mut() {
        if !pickup.available {
            continue;
        }

        for (transform, mut attributes, inventory, name, torn_off, pending_destroy) in characters.iter_mut() {
            if !is_alive(&attributes, torn_off, pending_destroy)
                || !within_reach(
                    pickup_transform.translation,
                    pickup.radius,
                    transform.translation,
                    config.character.half_height,
                )
            {
                continue;
            }

            match give_to(&pickup.kind, &mut attributes, inventory.map(|i| i.into_inner()), &weapons) {
                Ok(()) => {
                    info!(
                        "{} picked up {}",
                        name.map_or("Somebody", |n| n.0.as_str()),
                        item_name(&pickup.kind, &weapons)
                    );
                    pickup.taken();
                    *visibility = Visibility::Hidden;
                    if let (Some(audio), Some(sound)) = (audio.as_ref(), sound.as_ref()) {
                        audio.play(sound.0.clone());
                    }
                    break;
                }
                Err(PickupError::Full) => {}
                Err(e) => debug!("Pickup refused: {}", e),
            }
        }
    }
}

/// Bring taken pickups back once their respawn time is over.
pub fn respawn_pickups(time: Res<Time>, mut pickups: Query<(&mut Pickup, &mut Visibility)>) {
    for (mut pickup, mut visibility) in pickups.iter_mut() {
        if pickup.tick(time.delta()) {
            *visibility = Visibility::Inherited;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn health_is_refused_at_full_health() {
        let weapons = WeaponRegistry::builtin();
        let mut attributes = Attributes::default();
        assert_eq!(
            give_to(&PickupKind::Health(25.0), &mut attributes, None, &weapons),
            Err(PickupError::Full)
        );

        attributes.health = 50.0;
        assert!(give_to(&PickupKind::Health(25.0), &mut attributes, None, &weapons).is_ok());
        assert_eq!(attributes.health, 75.0);
    }

    #[test]
    fn shields_stack_up_to_the_maximum() {
        let weapons = WeaponRegistry::builtin();
        let mut attributes = Attributes::default();
        assert!(give_to(&PickupKind::Shield(150.0), &mut attributes, None, &weapons).is_ok());
        assert_eq!(attributes.shield, 100.0);
    }

    #[test]
    fn unknown_weapons_are_refused() {
        let weapons = WeaponRegistry::builtin();
        let mut attributes = Attributes::default();
        let mut inventory = Inventory::default();

        assert_eq!(
            give_to(
                &PickupKind::Weapon("bfg".to_string()),
                &mut attributes,
                Some(&mut inventory),
                &weapons
            ),
            Err(PickupError::UnknownWeapon("bfg".to_string()))
        );

        let rocket = PickupKind::Weapon("rocket_launcher".to_string());
        assert!(give_to(&rocket, &mut attributes, Some(&mut inventory), &weapons).is_ok());
        assert!(inventory.contains("rocket_launcher"));
        assert_eq!(item_name(&rocket, &weapons), "Rocket Launcher");
    }

    #[test]
    fn reach_covers_the_whole_capsule() {
        assert!(within_reach(Vec3::ZERO, 0.8, Vec3::new(0.5, 0.9, 0.0), 0.975));
        assert!(!within_reach(Vec3::ZERO, 0.8, Vec3::new(1.0, 0.9, 0.0), 0.975));
        assert!(!within_reach(Vec3::ZERO, 0.8, Vec3::new(0.0, 3.0, 0.0), 0.975));
    }

    #[test]
    fn taken_pickups_come_back() {
        let mut app = App::new();
        app.init_resource::<Time>()
            .add_systems(Update, respawn_pickups);

        let mut pickup = Pickup::new(PickupKind::Armor(50.0), 0.8, 2.0);
        pickup.taken();
        let entity = app.world_mut().spawn((pickup, Visibility::Hidden)).id();

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs(1));
        app.update();
        assert!(!app.world().get::<Pickup>(entity).unwrap().available);

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(1100));
        app.update();
        assert!(app.world().get::<Pickup>(entity).unwrap().available);
        assert_eq!(app.world().get::<Visibility>(entity), Some(&Visibility::Inherited));
    }

    #[test]
    fn living_characters_collect_pickups() {
        let mut app = App::new();
        app.insert_resource(NetMode::Standalone)
            .insert_resource(GameConfig::default())
            .insert_resource(WeaponRegistry::builtin())
            .add_systems(Update, collect_pickups);

        let pickup = app
            .world_mut()
            .spawn((
                Pickup::new(PickupKind::Health(25.0), 0.8, 30.0),
                Transform::default(),
                Visibility::default(),
            ))
            .id();
        let character = app
            .world_mut()
            .spawn((
                Character,
                Attributes {
                    health: 40.0,
                    ..default()
                },
                Transform::from_xyz(0.2, 0.9, 0.0),
            ))
            .id();

        app.update();

        assert_eq!(app.world().get::<Attributes>(character).unwrap().health, 65.0);
        assert!(!app.world().get::<Pickup>(pickup).unwrap().available);
        assert_eq!(app.world().get::<Visibility>(pickup), Some(&Visibility::Hidden));
    }
}
