//! Damage arithmetic: mitigation, knockback, falls and splash.
//!
//! Everything here is pure so the rules can be checked without a world.

use bevy::prelude::*;

use super::components::Attributes;
use crate::core::DamageKind;

/// Knockback velocity change below this (cm/s) is not worth applying.
pub const DEFAULT_MIN_KNOCKBACK_SPEED: f32 = 100.0;

/// Where a hit went, pool by pool.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mitigation {
    /// Damage after flooring
    pub incoming: f32,
    pub to_shield: f32,
    pub to_armor: f32,
    pub to_health: f32,
    /// Damage left after shield and armor; drives knockback
    pub remaining: f32,
}

/// Run a hit through shield, armor and health, in that order.
///
/// All pools stay whole numbers. Nothing is drained from a character whose
/// health is already gone.
pub fn mitigate_damage(attributes: &mut Attributes, raw_damage: f32) -> Mitigation {
    let mut damage = raw_damage.max(0.0).floor();
    let mut result = Mitigation {
        incoming: damage,
        ..default()
    };

    if attributes.health <= 0.0 {
        result.remaining = damage;
        return result;
    }

    let shield = attributes.shield.floor();
    if shield > 0.0 {
        result.to_shield = damage.min(shield);
        debug!("Damage to shield ({})", result.to_shield);

        attributes.shield = (shield - damage).max(0.0).floor();
        damage = if shield - damage > 0.0 {
            0.0
        } else {
            damage - shield
        };
    }

    let armor = attributes.armor.floor();
    if armor > 0.0 && damage > 0.0 {
        let to_armor = (damage * attributes.armor_absorption).min(armor).floor();
        result.to_armor = to_armor;
        debug!("Damage to armor ({})", to_armor);

        attributes.armor = (armor - to_armor).max(0.0);
        damage = (damage - to_armor).max(0.0);
    }

    let health = attributes.health;
    if health > 0.0 && damage > 0.0 {
        debug!("Damage to health ({})", damage);

        attributes.health = (health - damage).max(0.0).floor();
        result.to_health = health - attributes.health;
    }

    result.remaining = damage;
    result
}

/// Knockback strength for the damage that got through.
pub fn knockback_power(damage: f32, per_damage: f32) -> f32 {
    per_damage * damage
}

/// Turn a knockback power into an impulse (kg·cm/s) on a body at `location`.
///
/// Returns `None` when the resulting velocity change would be below
/// `min_speed`, or when the hit carries no direction.
pub fn knockback_impulse(
    kind: DamageKind,
    power: f32,
    mass: f32,
    min_speed: f32,
    location: Vec3,
) -> Option<Vec3> {
    if mass <= 0.0 || power / mass < min_speed {
        return None;
    }

    match kind {
        DamageKind::Point { shot_direction, .. } => {
            let direction = shot_direction.normalize_or_zero();
            (direction != Vec3::ZERO).then_some(direction * power)
        }
        DamageKind::Radial { origin, max_radius } => {
            // Constant falloff: the power was already scaled with the damage
            let offset = location - origin;
            if offset.length() > max_radius {
                return None;
            }
            let direction = offset.normalize_or(Vec3::Y);
            Some(direction * power)
        }
        DamageKind::Generic | DamageKind::Fall => None,
    }
}

/// Damage for landing at `falling_speed` (cm/s, negative when falling).
///
/// Nothing below the threshold; results under one point are dropped.
pub fn fall_damage(falling_speed: f32, speed_threshold: f32) -> Option<f32> {
    if -falling_speed <= speed_threshold {
        return None;
    }

    let damage = -0.15 * (speed_threshold + falling_speed);
    (damage >= 1.0).then_some(damage)
}

/// Splash damage at `distance` from the blast: linear falloff to zero at
/// the edge of the radius.
pub fn radial_damage(base_damage: f32, distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || distance > radius {
        return 0.0;
    }
    base_damage * (1.0 - distance / radius).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pools(health: f32, armor: f32, shield: f32, absorption: f32) -> Attributes {
        Attributes {
            health,
            health_max: 100.0,
            armor,
            armor_max: 100.0,
            shield,
            shield_max: 100.0,
            armor_absorption: absorption,
        }
    }

    #[test]
    fn shield_soaks_everything_it_can() {
        let mut attributes = pools(100.0, 100.0, 50.0, 0.5);
        let result = mitigate_damage(&mut attributes, 30.0);

        assert_eq!(result.to_shield, 30.0);
        assert_eq!(result.remaining, 0.0);
        assert_eq!(attributes.shield, 20.0);
        assert_eq!(attributes.armor, 100.0);
        assert_eq!(attributes.health, 100.0);
    }

    #[test]
    fn overflow_runs_shield_then_armor_then_health() {
        let mut attributes = pools(100.0, 100.0, 20.0, 0.5);
        let result = mitigate_damage(&mut attributes, 60.0);

        // 20 to shield, half of the remaining 40 to armor, 20 to health
        assert_eq!(result.to_shield, 20.0);
        assert_eq!(result.to_armor, 20.0);
        assert_eq!(result.to_health, 20.0);
        assert_eq!(attributes.shield, 0.0);
        assert_eq!(attributes.armor, 80.0);
        assert_eq!(attributes.health, 80.0);
    }

    #[test]
    fn armor_absorbs_at_most_what_is_left() {
        let mut attributes = pools(100.0, 10.0, 0.0, 0.5);
        let result = mitigate_damage(&mut attributes, 50.0);

        assert_eq!(result.to_armor, 10.0);
        assert_eq!(attributes.armor, 0.0);
        assert_eq!(attributes.health, 60.0);
    }

    #[test]
    fn fractions_are_floored() {
        let mut attributes = pools(100.0, 100.0, 10.5, 0.33);
        let result = mitigate_damage(&mut attributes, 25.9);

        assert_eq!(result.incoming, 25.0);
        // shield floors to 10, 15 left, armor takes floor(4.95) = 4
        assert_eq!(result.to_shield, 10.0);
        assert_eq!(result.to_armor, 4.0);
        assert_eq!(attributes.health, 89.0);
    }

    #[test]
    fn health_never_goes_negative() {
        let mut attributes = pools(10.0, 0.0, 0.0, 0.5);
        let result = mitigate_damage(&mut attributes, 500.0);

        assert_eq!(attributes.health, 0.0);
        assert_eq!(result.to_health, 10.0);
        assert_eq!(result.remaining, 500.0);
    }

    #[test]
    fn negative_damage_does_not_heal() {
        let mut attributes = pools(50.0, 0.0, 0.0, 0.5);
        mitigate_damage(&mut attributes, -20.0);
        assert_eq!(attributes.health, 50.0);
    }

    #[test]
    fn dead_characters_keep_their_pools() {
        let mut attributes = pools(0.0, 40.0, 40.0, 0.5);
        let result = mitigate_damage(&mut attributes, 30.0);

        assert_eq!(attributes.shield, 40.0);
        assert_eq!(attributes.armor, 40.0);
        assert_eq!(result.remaining, 30.0);
    }

    #[test]
    fn small_knockbacks_are_dropped() {
        let kind = DamageKind::Point {
            shot_direction: Vec3::X,
            hit_location: Vec3::ZERO,
        };

        // 1500 * 6 / 100 = 90 cm/s, under the threshold
        let weak = knockback_impulse(kind, knockback_power(6.0, 1500.0), 100.0, 100.0, Vec3::ZERO);
        assert!(weak.is_none());

        // 1500 * 7 / 100 = 105 cm/s
        let strong = knockback_impulse(kind, knockback_power(7.0, 1500.0), 100.0, 100.0, Vec3::ZERO);
        assert_eq!(strong, Some(Vec3::X * 10500.0));
    }

    #[test]
    fn radial_knockback_pushes_away_from_the_origin() {
        let kind = DamageKind::Radial {
            origin: Vec3::ZERO,
            max_radius: 5.0,
        };
        let impulse = knockback_impulse(kind, 20000.0, 100.0, 100.0, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(impulse, Some(Vec3::Z * 20000.0));

        let outside = knockback_impulse(kind, 20000.0, 100.0, 100.0, Vec3::new(0.0, 0.0, 6.0));
        assert!(outside.is_none());
    }

    #[test]
    fn generic_damage_has_no_knockback() {
        assert!(knockback_impulse(DamageKind::Generic, 1.0e6, 100.0, 100.0, Vec3::ZERO).is_none());
        assert!(knockback_impulse(DamageKind::Fall, 1.0e6, 100.0, 100.0, Vec3::ZERO).is_none());
    }

    #[test]
    fn fall_damage_starts_past_the_threshold() {
        assert_eq!(fall_damage(-2000.0, 2675.0), None);
        assert_eq!(fall_damage(-2675.0, 2675.0), None);
        // Under one point is ignored
        assert_eq!(fall_damage(-2680.0, 2675.0), None);

        let damage = fall_damage(-3675.0, 2675.0).unwrap();
        assert!((damage - 150.0).abs() < 1e-3);
    }

    #[test]
    fn splash_falls_off_linearly() {
        assert_eq!(radial_damage(100.0, 0.0, 4.0), 100.0);
        assert_eq!(radial_damage(100.0, 2.0, 4.0), 50.0);
        assert_eq!(radial_damage(100.0, 4.5, 4.0), 0.0);
    }
}
