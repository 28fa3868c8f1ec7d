//! Pulling the trigger.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy_kira_audio::prelude::*;
use bevy_kira_audio::AudioSource;

use super::definition::WeaponRegistry;
use super::inventory::Inventory;
use super::projectile::{spawn_projectile, ProjectileAssets};
use crate::core::{NetMode, TornOff};
use crate::player::{ControlRotation, EyeHeight, PossessedBy};

/// Shots leave slightly in front of the eyes.
const MUZZLE_OFFSET: f32 = 0.6;

/// Fire sounds, keyed by weapon class.
#[derive(Resource, Default)]
pub struct WeaponSounds {
    pub fire: HashMap<String, Handle<AudioSource>>,
}

/// Load fire sounds. Only runs where an audio device exists.
pub fn load_weapon_sounds(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    registry: Res<WeaponRegistry>,
) {
    let fire = registry
        .definitions
        .iter()
        .filter_map(|(class, definition)| {
            let path = definition.fire_sound.clone()?;
            Some((class.clone(), asset_server.load(path)))
        })
        .collect();

    commands.insert_resource(WeaponSounds { fire });
}

/// Whether the trigger is held and the weapon is ready again.
pub fn ready_to_fire(inventory: &Inventory, now: f32) -> bool {
    inventory.firing && now >= inventory.next_fire_time
}

/// Spawn a projectile for every character holding the trigger.
#[allow(clippy::too_many_arguments)]
pub fn fire_weapons(
    mut commands: Commands,
    time: Res<Time>,
    net_mode: Res<NetMode>,
    registry: Res<WeaponRegistry>,
    assets: Option<Res<ProjectileAssets>>,
    audio: Option<Res<Audio>>,
    sounds: Option<Res<WeaponSounds>>,
    mut shooters: Query<
        (Entity, &mut Inventory, &Transform, &ControlRotation, &EyeHeight, Option<&PossessedBy>),
        Without<TornOff>,
    >,
) {
    let now = time.elapsed_secs();

    for (entity, mut inventory, transform, rotation, eye, possessed_by) in shooters.iter_mut() {
        if !ready_to_fire(&inventory, now) {
            continue;
        }

        let Some(class) = inventory.active().map(|w| w.class.clone()) else {
            info!("No weapon selected");
            inventory.stop_fire();
            continue;
        };
        let Some(definition) = registry.get(&class) else {
            warn!("Weapon class '{}' is not in the registry", class);
            inventory.stop_fire();
            continue;
        };

        inventory.next_fire_time = now + definition.refire_interval;

        if let (Some(audio), Some(sound)) = (
            audio.as_ref(),
            sounds.as_ref().and_then(|s| s.fire.get(&class)),
        ) {
            audio.play(sound.clone());
        }

        // Only the authority creates gameplay projectiles
        if !net_mode.has_authority() {
            continue;
        }

        let direction = rotation.forward();
        let origin = transform.translation + Vec3::Y * eye.offset + direction * MUZZLE_OFFSET;
        spawn_projectile(
            &mut commands,
            &class,
            definition,
            assets.as_deref(),
            entity,
            possessed_by.map(|p| p.0),
            origin,
            direction,
        );
        debug!("{:?} fired {}", entity, definition.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weapons::{Projectile, WeaponRegistry};
    use std::time::Duration;

    #[test]
    fn refire_interval_is_respected() {
        let mut inventory = Inventory::default();
        assert!(!ready_to_fire(&inventory, 0.0));

        inventory.start_fire();
        inventory.next_fire_time = 1.0;
        assert!(!ready_to_fire(&inventory, 0.5));
        assert!(ready_to_fire(&inventory, 1.0));
    }

    #[test]
    fn holding_the_trigger_spawns_projectiles() {
        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(NetMode::Standalone)
            .insert_resource(WeaponRegistry::builtin())
            .add_systems(Update, fire_weapons);

        let registry = WeaponRegistry::builtin();
        let mut inventory = Inventory::default();
        inventory.give_weapon("impact_rifle", &registry.definitions["impact_rifle"]);
        inventory.start_fire();

        let shooter = app
            .world_mut()
            .spawn((
                inventory,
                Transform::default(),
                ControlRotation::default(),
                EyeHeight::new(0.64),
            ))
            .id();

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(10));
        app.update();

        let mut projectiles = app.world_mut().query::<(&Projectile, &Transform)>();
        let (projectile, transform) = projectiles.single(app.world());
        assert_eq!(projectile.owner, shooter);
        assert_eq!(projectile.velocity, Vec3::NEG_Z * 60.0);
        assert!((transform.translation.y - 0.64).abs() < 1e-5);

        // The refire interval has not passed yet
        app.update();
        assert_eq!(projectiles.iter(app.world()).count(), 1);
    }

    #[test]
    fn empty_hands_release_the_trigger() {
        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(NetMode::Standalone)
            .insert_resource(WeaponRegistry::builtin())
            .add_systems(Update, fire_weapons);

        let mut inventory = Inventory::default();
        inventory.start_fire();
        let shooter = app
            .world_mut()
            .spawn((
                inventory,
                Transform::default(),
                ControlRotation::default(),
                EyeHeight::new(0.64),
            ))
            .id();

        app.update();

        let inventory = app.world().get::<Inventory>(shooter).unwrap();
        assert!(!inventory.firing);
    }
}
