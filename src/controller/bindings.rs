//! Key bindings loaded from assets/data/key_bindings.ron.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{read_ron_file, write_ron_file, DataLoadError};

pub const KEY_BINDINGS_PATH: &str = "assets/data/key_bindings.ron";

/// Everything a player can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InputAction {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    TurnLeft,
    TurnRight,
    LookUp,
    LookDown,
    Jump,
    Crouch,
    Fire,
    SelectWeapon(u8),
    NextWeapon,
    PrevWeapon,
    ShowInventory,
    Suicide,
    ToggleFly,
    Say,
    TeamSay,
    Controls,
}

impl InputAction {
    /// Actions in the order the controls menu lists them.
    pub fn all() -> Vec<InputAction> {
        let mut actions = vec![
            InputAction::MoveForward,
            InputAction::MoveBackward,
            InputAction::MoveLeft,
            InputAction::MoveRight,
            InputAction::MoveUp,
            InputAction::MoveDown,
            InputAction::TurnLeft,
            InputAction::TurnRight,
            InputAction::LookUp,
            InputAction::LookDown,
            InputAction::Jump,
            InputAction::Crouch,
            InputAction::Fire,
        ];
        actions.extend((0..=5).map(InputAction::SelectWeapon));
        actions.extend([
            InputAction::NextWeapon,
            InputAction::PrevWeapon,
            InputAction::ShowInventory,
            InputAction::Suicide,
            InputAction::ToggleFly,
            InputAction::Say,
            InputAction::TeamSay,
            InputAction::Controls,
        ]);
        actions
    }
}

impl fmt::Display for InputAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputAction::SelectWeapon(group) => write!(f, "Weapon {}", group),
            other => write!(f, "{:?}", other),
        }
    }
}

/// A physical input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputBinding {
    Key(KeyCode),
    Mouse(MouseButton),
}

impl fmt::Display for InputBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputBinding::Key(key) => write!(f, "{:?}", key),
            InputBinding::Mouse(button) => write!(f, "Mouse {:?}", button),
        }
    }
}

/// Action to input mapping.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub bindings: BTreeMap<InputAction, InputBinding>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use InputAction::*;
        use InputBinding::*;

        let mut bindings = BTreeMap::from([
            (MoveForward, Key(KeyCode::KeyW)),
            (MoveBackward, Key(KeyCode::KeyS)),
            (MoveLeft, Key(KeyCode::KeyA)),
            (MoveRight, Key(KeyCode::KeyD)),
            (MoveUp, Key(KeyCode::KeyE)),
            (MoveDown, Key(KeyCode::KeyQ)),
            (TurnLeft, Key(KeyCode::ArrowLeft)),
            (TurnRight, Key(KeyCode::ArrowRight)),
            (LookUp, Key(KeyCode::ArrowUp)),
            (LookDown, Key(KeyCode::ArrowDown)),
            (Jump, Key(KeyCode::Space)),
            (Crouch, Key(KeyCode::KeyC)),
            (Fire, Mouse(MouseButton::Left)),
            (NextWeapon, Key(KeyCode::BracketRight)),
            (PrevWeapon, Key(KeyCode::BracketLeft)),
            (ShowInventory, Key(KeyCode::KeyI)),
            (Suicide, Key(KeyCode::KeyK)),
            (ToggleFly, Key(KeyCode::KeyF)),
            (Say, Key(KeyCode::KeyT)),
            (TeamSay, Key(KeyCode::KeyY)),
            (Controls, Key(KeyCode::F1)),
        ]);

        let digits = [
            KeyCode::Digit0,
            KeyCode::Digit1,
            KeyCode::Digit2,
            KeyCode::Digit3,
            KeyCode::Digit4,
            KeyCode::Digit5,
        ];
        for (group, key) in digits.into_iter().enumerate() {
            bindings.insert(SelectWeapon(group as u8), Key(key));
        }

        Self { bindings }
    }
}

impl KeyBindings {
    pub fn binding(&self, action: InputAction) -> Option<InputBinding> {
        self.bindings.get(&action).copied()
    }

    /// Bind `action` to `binding`. An action already using that input gets
    /// the old binding of `action` instead, so nothing ends up bound twice.
    pub fn rebind(&mut self, action: InputAction, binding: InputBinding) {
        let previous = self.bindings.insert(action, binding);

        let clash = self
            .bindings
            .iter()
            .find(|(other, bound)| **other != action && **bound == binding)
            .map(|(other, _)| *other);

        if let Some(other) = clash {
            match previous {
                Some(previous) => {
                    self.bindings.insert(other, previous);
                }
                None => {
                    self.bindings.remove(&other);
                }
            }
        }
    }

    /// Read bindings from a file, filling missing actions with defaults.
    pub fn load_from(path: &Path) -> Result<Self, DataLoadError> {
        let mut loaded: Self = read_ron_file(path)?;
        for (action, binding) in Self::default().bindings {
            if !loaded.bindings.contains_key(&action)
                && !loaded.bindings.values().any(|bound| *bound == binding)
            {
                loaded.bindings.insert(action, binding);
            }
        }
        Ok(loaded)
    }

    /// Load the bindings, falling back to defaults on any error.
    pub fn load() -> Self {
        match Self::load_from(Path::new(KEY_BINDINGS_PATH)) {
            Ok(bindings) => {
                info!("Loaded key bindings from {}", KEY_BINDINGS_PATH);
                bindings
            }
            Err(e) => {
                warn!("{}. Using default key bindings.", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), DataLoadError> {
        write_ron_file(Path::new(KEY_BINDINGS_PATH), self)
    }
}

/// Bound actions read from the keyboard and mouse.
#[derive(SystemParam)]
pub struct ActionInput<'w> {
    bindings: Res<'w, KeyBindings>,
    keys: Res<'w, ButtonInput<KeyCode>>,
    mouse: Res<'w, ButtonInput<MouseButton>>,
}

impl ActionInput<'_> {
    pub fn pressed(&self, action: InputAction) -> bool {
        match self.bindings.binding(action) {
            Some(InputBinding::Key(key)) => self.keys.pressed(key),
            Some(InputBinding::Mouse(button)) => self.mouse.pressed(button),
            None => false,
        }
    }

    pub fn just_pressed(&self, action: InputAction) -> bool {
        match self.bindings.binding(action) {
            Some(InputBinding::Key(key)) => self.keys.just_pressed(key),
            Some(InputBinding::Mouse(button)) => self.mouse.just_pressed(button),
            None => false,
        }
    }

    pub fn just_released(&self, action: InputAction) -> bool {
        match self.bindings.binding(action) {
            Some(InputBinding::Key(key)) => self.keys.just_released(key),
            Some(InputBinding::Mouse(button)) => self.mouse.just_released(button),
            None => false,
        }
    }

    /// -1, 0 or 1 from a pair of opposite actions.
    pub fn axis(&self, positive: InputAction, negative: InputAction) -> f32 {
        let mut value = 0.0;
        if self.pressed(positive) {
            value += 1.0;
        }
        if self.pressed(negative) {
            value -= 1.0;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_every_action_once() {
        let bindings = KeyBindings::default();
        for action in InputAction::all() {
            assert!(bindings.binding(action).is_some(), "{} is unbound", action);
        }

        let mut seen: Vec<_> = bindings.bindings.values().collect();
        let total = seen.len();
        seen.sort_by_key(|b| format!("{}", b));
        seen.dedup();
        assert_eq!(seen.len(), total);
    }

    #[test]
    fn rebinding_a_used_key_swaps_the_bindings() {
        let mut bindings = KeyBindings::default();
        bindings.rebind(InputAction::Jump, InputBinding::Key(KeyCode::KeyC));

        assert_eq!(
            bindings.binding(InputAction::Jump),
            Some(InputBinding::Key(KeyCode::KeyC))
        );
        assert_eq!(
            bindings.binding(InputAction::Crouch),
            Some(InputBinding::Key(KeyCode::Space))
        );
    }

    #[test]
    fn files_may_bind_a_subset() {
        let parsed: KeyBindings = ron::from_str("(bindings: { Jump: Mouse(Right) })").unwrap();
        assert_eq!(
            parsed.binding(InputAction::Jump),
            Some(InputBinding::Mouse(MouseButton::Right))
        );
        assert_eq!(parsed.binding(InputAction::Fire), None);
    }
}
