//! Combat-related components.

use bevy::prelude::*;

use crate::core::DamageTuning;

/// Health, armor and shield pools of a character.
///
/// Damage drains shield first, then armor (partially, see
/// `armor_absorption`), then health.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Attributes {
    pub health: f32,
    pub health_max: f32,
    pub armor: f32,
    pub armor_max: f32,
    pub shield: f32,
    pub shield_max: f32,
    /// Share of the damage reaching armor that armor soaks (0..1)
    pub armor_absorption: f32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self::from_tuning(&DamageTuning::default())
    }
}

impl Attributes {
    pub fn from_tuning(tuning: &DamageTuning) -> Self {
        Self {
            health: tuning.health,
            health_max: tuning.health_max,
            armor: tuning.armor,
            armor_max: tuning.armor_max,
            shield: tuning.shield,
            shield_max: tuning.shield_max,
            armor_absorption: tuning.armor_absorption,
        }
    }

    /// Restore health up to the maximum. Returns the amount actually healed.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let actual = amount.min(self.health_max - self.health).max(0.0);
        self.health += actual;
        actual
    }

    /// Add armor up to the maximum. Returns the amount actually added.
    pub fn add_armor(&mut self, amount: f32) -> f32 {
        let actual = amount.min(self.armor_max - self.armor).max(0.0);
        self.armor += actual;
        actual
    }

    /// Add shield up to the maximum. Returns the amount actually added.
    pub fn add_shield(&mut self, amount: f32) -> f32 {
        let actual = amount.min(self.shield_max - self.shield).max(0.0);
        self.shield += actual;
        actual
    }

    pub fn health_percentage(&self) -> f32 {
        if self.health_max <= 0.0 {
            return 0.0;
        }
        (self.health / self.health_max).clamp(0.0, 1.0)
    }

    pub fn armor_percentage(&self) -> f32 {
        if self.armor_max <= 0.0 {
            return 0.0;
        }
        (self.armor / self.armor_max).clamp(0.0, 1.0)
    }

    pub fn shield_percentage(&self) -> f32 {
        if self.shield_max <= 0.0 {
            return 0.0;
        }
        (self.shield / self.shield_max).clamp(0.0, 1.0)
    }
}

/// Damage is ignored entirely (god mode, spawn protection).
#[derive(Component, Debug)]
pub struct Invulnerable;

/// Marks a corpse handed over to physics.
#[derive(Component, Debug)]
pub struct Ragdoll;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_defaults_match_the_arena_rules() {
        let attributes = Attributes::default();
        assert_eq!(attributes.health, 100.0);
        assert_eq!(attributes.health_max, 100.0);
        assert_eq!(attributes.armor, 100.0);
        assert_eq!(attributes.armor_max, 100.0);
        assert_eq!(attributes.shield, 0.0);
        assert_eq!(attributes.shield_max, 100.0);
    }

    #[test]
    fn pools_are_capped_at_their_maximum() {
        let mut attributes = Attributes::default();
        attributes.health = 90.0;

        assert_eq!(attributes.heal(25.0), 10.0);
        assert_eq!(attributes.health, 100.0);
        assert_eq!(attributes.add_armor(50.0), 0.0);
        assert_eq!(attributes.add_shield(150.0), 100.0);
        assert_eq!(attributes.shield, 100.0);
    }
}
