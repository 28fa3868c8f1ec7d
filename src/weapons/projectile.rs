//! Projectiles: flight, impact, point and splash damage.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::definition::{WeaponDefinition, WeaponRegistry};
use crate::combat::radial_damage;
use crate::core::{DamageEvent, DamageKind, LifeSpan, TornOff};
use crate::player::{Character, CHARACTER_GROUP, WORLD_GROUP};

/// A flying shot.
#[derive(Component, Debug, Clone)]
pub struct Projectile {
    /// Character that fired it, never hit by it
    pub owner: Entity,
    /// Controller credited with the damage
    pub instigator: Option<Entity>,
    pub speed: f32,
    pub damage: f32,
    pub splash_radius: f32,
    pub velocity: Vec3,
}

impl Projectile {
    pub fn from_definition(definition: &WeaponDefinition, owner: Entity, instigator: Option<Entity>) -> Self {
        Self {
            owner,
            instigator,
            speed: definition.projectile_speed,
            damage: definition.damage,
            splash_radius: definition.splash_radius,
            velocity: Vec3::ZERO,
        }
    }

    /// Launch along `direction` at the projectile speed.
    pub fn fire_at(&mut self, direction: Vec3) {
        self.velocity = direction.normalize_or_zero() * self.speed;
    }
}

/// Meshes and materials for projectiles, one material per weapon class.
#[derive(Resource)]
pub struct ProjectileAssets {
    pub mesh: Handle<Mesh>,
    pub materials: HashMap<String, Handle<StandardMaterial>>,
}

pub fn setup_projectile_assets(
    mut commands: Commands,
    registry: Res<WeaponRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = meshes.add(Sphere::new(1.0));
    let materials = registry
        .definitions
        .iter()
        .map(|(class, definition)| {
            let (r, g, b) = definition.color;
            let material = materials.add(StandardMaterial {
                base_color: Color::srgb(r, g, b),
                emissive: LinearRgba::new(r * 4.0, g * 4.0, b * 4.0, 1.0),
                unlit: true,
                ..default()
            });
            (class.clone(), material)
        })
        .collect();

    commands.insert_resource(ProjectileAssets { mesh, materials });
}

/// Spawn a projectile of `class` at `origin` and send it along `direction`.
#[allow(clippy::too_many_arguments)]
pub fn spawn_projectile(
    commands: &mut Commands,
    class: &str,
    definition: &WeaponDefinition,
    assets: Option<&ProjectileAssets>,
    owner: Entity,
    instigator: Option<Entity>,
    origin: Vec3,
    direction: Vec3,
) -> Entity {
    let mut projectile = Projectile::from_definition(definition, owner, instigator);
    projectile.fire_at(direction);

    let mut entity = commands.spawn((
        projectile,
        LifeSpan::from_secs(definition.projectile_lifetime),
        Transform::from_translation(origin).with_scale(Vec3::splat(definition.projectile_radius)),
        Visibility::default(),
    ));

    if let Some(assets) = assets {
        entity.insert(Mesh3d(assets.mesh.clone()));
        if let Some(material) = assets.materials.get(class) {
            entity.insert(MeshMaterial3d(material.clone()));
        }
    }

    entity.id()
}

/// Damage dealt by a projectile landing at `location`.
///
/// The character hit directly takes point damage; everybody else inside the
/// splash radius takes radial damage with a linear falloff.
pub fn impact_damage(
    projectile: &Projectile,
    causer: Entity,
    direct_hit: Option<Entity>,
    location: Vec3,
    characters: impl IntoIterator<Item = (Entity, Vec3)>,
) -> Vec<DamageEvent> {
    let mut events = Vec::new();

    if let Some(target) = direct_hit {
        events.push(DamageEvent {
            target,
            instigator: projectile.instigator,
            causer: Some(causer),
            amount: projectile.damage,
            kind: DamageKind::Point {
                shot_direction: projectile.velocity.normalize_or_zero(),
                hit_location: location,
            },
        });
    }

    if projectile.splash_radius <= 0.0 {
        return events;
    }

    for (target, position) in characters {
        if Some(target) == direct_hit {
            continue;
        }

        let amount = radial_damage(projectile.damage, position.distance(location), projectile.splash_radius);
        if amount <= 0.0 {
            continue;
        }

        events.push(DamageEvent {
            target,
            instigator: projectile.instigator,
            causer: Some(causer),
            amount,
            kind: DamageKind::Radial {
                origin: location,
                max_radius: projectile.splash_radius,
            },
        });
    }

    events
}

/// Move projectiles, sweeping their path for the level and characters.
pub fn move_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    rapier_context: Query<&RapierContext>,
    mut projectiles: Query<(Entity, &mut Transform, &Projectile)>,
    characters: Query<(Entity, &Transform), (With<Character>, Without<TornOff>, Without<Projectile>)>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    let delta = time.delta_secs();
    let context = rapier_context.get_single().ok();

    for (entity, mut transform, projectile) in projectiles.iter_mut() {
        let step = projectile.velocity * delta;
        let distance = step.length();
        if distance <= 0.0 {
            continue;
        }
        let direction = step / distance;

        let hit = context.and_then(|context| {
            context.cast_ray(
                transform.translation,
                direction,
                distance,
                true,
                QueryFilter::default()
                    .exclude_collider(projectile.owner)
                    .exclude_sensors()
                    .groups(CollisionGroups::new(Group::ALL, WORLD_GROUP | CHARACTER_GROUP)),
            )
        });

        let Some((hit_entity, toi)) = hit else {
            transform.translation += step;
            continue;
        };

        let location = transform.translation + direction * toi;
        let direct_hit = characters.get(hit_entity).ok().map(|(e, _)| e);
        debug!("Projectile {:?} hit {:?} at {}", entity, hit_entity, location);

        let targets = characters.iter().map(|(e, t)| (e, t.translation));
        for event in impact_damage(projectile, entity, direct_hit, location, targets) {
            damage_events.send(event);
        }

        commands.entity(entity).despawn_recursive();
    }
}

/// Projectiles in flight do not outlive the match.
pub fn despawn_projectiles(mut commands: Commands, projectiles: Query<Entity, With<Projectile>>) {
    for entity in projectiles.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rocket() -> Projectile {
        let mut projectile = Projectile {
            owner: Entity::from_raw(1),
            instigator: Some(Entity::from_raw(2)),
            speed: 20.0,
            damage: 100.0,
            splash_radius: 4.0,
            velocity: Vec3::ZERO,
        };
        projectile.fire_at(Vec3::new(0.0, 0.0, -3.0));
        projectile
    }

    #[test]
    fn fire_at_uses_the_projectile_speed() {
        let projectile = rocket();
        assert_eq!(projectile.velocity, Vec3::new(0.0, 0.0, -20.0));
    }

    #[test]
    fn direct_hit_takes_point_damage_only() {
        let projectile = rocket();
        let causer = Entity::from_raw(3);
        let victim = Entity::from_raw(4);

        let events = impact_damage(&projectile, causer, Some(victim), Vec3::ZERO, [(victim, Vec3::ZERO)]);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, victim);
        assert_eq!(events[0].amount, 100.0);
        assert_eq!(events[0].instigator, Some(Entity::from_raw(2)));
        assert!(matches!(events[0].kind, DamageKind::Point { shot_direction, .. } if shot_direction == Vec3::NEG_Z));
    }

    #[test]
    fn splash_falls_off_with_distance() {
        let projectile = rocket();
        let near = Entity::from_raw(5);
        let far = Entity::from_raw(6);
        let outside = Entity::from_raw(7);

        let events = impact_damage(
            &projectile,
            Entity::from_raw(3),
            None,
            Vec3::ZERO,
            [(near, Vec3::X), (far, Vec3::X * 3.0), (outside, Vec3::X * 5.0)],
        );

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].target, near);
        assert!((events[0].amount - 75.0).abs() < 1e-4);
        assert_eq!(events[1].target, far);
        assert!((events[1].amount - 25.0).abs() < 1e-4);
        assert!(matches!(events[1].kind, DamageKind::Radial { max_radius, .. } if max_radius == 4.0));
    }

    #[test]
    fn projectiles_without_splash_ignore_bystanders() {
        let mut projectile = rocket();
        projectile.splash_radius = 0.0;

        let events = impact_damage(
            &projectile,
            Entity::from_raw(3),
            None,
            Vec3::ZERO,
            [(Entity::from_raw(5), Vec3::X)],
        );
        assert!(events.is_empty());
    }
}
