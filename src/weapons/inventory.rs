//! Weapons carried by a character.

use bevy::prelude::*;

use super::definition::{WeaponDefinition, WeaponRegistry};
use crate::player::Character;

/// One weapon in the inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedWeapon {
    pub class: String,
    pub name: String,
    pub group: u8,
}

/// Carried weapons, kept ordered by group, and the trigger state.
#[derive(Component, Debug, Clone, Default)]
pub struct Inventory {
    weapons: Vec<OwnedWeapon>,
    active: Option<usize>,
    pub firing: bool,
    /// Elapsed game time after which the next shot may leave
    pub next_fire_time: f32,
}

impl Inventory {
    /// Add a weapon. Returns false when it was already carried.
    ///
    /// The first weapon received becomes the active one.
    pub fn give_weapon(&mut self, class: &str, definition: &WeaponDefinition) -> bool {
        if self.contains(class) {
            return false;
        }

        let active_class = self.active().map(|w| w.class.clone());
        let index = self
            .weapons
            .iter()
            .position(|w| w.group > definition.group)
            .unwrap_or(self.weapons.len());
        self.weapons.insert(
            index,
            OwnedWeapon {
                class: class.to_string(),
                name: definition.name.clone(),
                group: definition.group,
            },
        );

        // Keep pointing at the same weapon after the insert
        self.active = match active_class {
            Some(active) => self.weapons.iter().position(|w| w.class == active),
            None => Some(index),
        };
        true
    }

    pub fn contains(&self, class: &str) -> bool {
        self.weapons.iter().any(|w| w.class == class)
    }

    pub fn weapons(&self) -> &[OwnedWeapon] {
        &self.weapons
    }

    pub fn active(&self) -> Option<&OwnedWeapon> {
        self.active.and_then(|index| self.weapons.get(index))
    }

    /// Switch to a weapon of `group`. Pressing the same group again cycles
    /// through the weapons sharing it.
    pub fn select_group(&mut self, group: u8) -> bool {
        let in_group: Vec<usize> = self
            .weapons
            .iter()
            .enumerate()
            .filter(|(_, w)| w.group == group)
            .map(|(index, _)| index)
            .collect();

        let next = match self.active.and_then(|active| in_group.iter().position(|&i| i == active)) {
            Some(position) => in_group.get(position + 1).or(in_group.first()),
            None => in_group.first(),
        };

        match next {
            Some(&index) => {
                self.active = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn next_weapon(&mut self) {
        if self.weapons.is_empty() {
            return;
        }
        self.active = Some(self.active.map_or(0, |index| (index + 1) % self.weapons.len()));
    }

    pub fn prev_weapon(&mut self) {
        if self.weapons.is_empty() {
            return;
        }
        let count = self.weapons.len();
        self.active = Some(self.active.map_or(count - 1, |index| (index + count - 1) % count));
    }

    /// Log the carried weapons.
    pub fn show(&self) {
        if self.weapons.is_empty() {
            info!("Inventory is empty");
            return;
        }
        for (index, weapon) in self.weapons.iter().enumerate() {
            let marker = if Some(index) == self.active { "*" } else { " " };
            info!("{} [{}] {} ({})", marker, weapon.group, weapon.name, weapon.class);
        }
    }

    pub fn start_fire(&mut self) {
        self.firing = true;
    }

    pub fn stop_fire(&mut self) {
        self.firing = false;
    }
}

/// Hand the starting weapons to characters as they appear.
pub fn equip_new_characters(
    mut commands: Commands,
    registry: Res<WeaponRegistry>,
    characters: Query<Entity, Added<Character>>,
) {
    for entity in characters.iter() {
        let mut inventory = Inventory::default();
        for class in registry.starting_weapons() {
            if let Some(definition) = registry.get(class) {
                inventory.give_weapon(class, definition);
            }
        }
        commands.entity(entity).insert(inventory);
    }
}
