//! Key binding menu: click an action, press the new key, save.

use bevy::prelude::*;

use super::menus::spawn_pause_menu;
use super::widgets::*;
use crate::controller::{InputAction, InputBinding, KeyBindings};
use crate::core::{GameState, PlayState};

/// Marker for key binding menu UI entities.
#[derive(Component)]
pub struct KeyBindingMenuUi;

/// Button rebinding one action.
#[derive(Component, Debug, Clone, Copy)]
pub struct BindingButton(pub InputAction);

/// Text showing the key bound to an action.
#[derive(Component, Debug, Clone, Copy)]
pub struct BindingLabel(pub InputAction);

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMenuButton {
    Save,
    Back,
}

/// The action waiting for its new input, if any.
#[derive(Resource, Debug, Default)]
pub struct AwaitingRebind(pub Option<InputAction>);

/// Text shown for an action's binding.
pub fn binding_text(bindings: &KeyBindings, action: InputAction, awaiting: Option<InputAction>) -> String {
    if awaiting == Some(action) {
        return "Press a key...".to_string();
    }
    bindings
        .binding(action)
        .map_or_else(|| "-".to_string(), |binding| binding.to_string())
}

pub fn spawn_key_binding_menu(commands: &mut Commands, bindings: &KeyBindings) {
    commands
        .spawn((overlay_node(), BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.85)), KeyBindingMenuUi))
        .with_children(|parent| {
            spawn_title(parent, "CONTROLS", 40.0, TEXT_COLOR);

            // Two columns of action rows
            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    flex_wrap: FlexWrap::Wrap,
                    justify_content: JustifyContent::Center,
                    max_width: Val::Px(900.0),
                    ..default()
                })
                .with_children(|grid| {
                    for action in InputAction::all() {
                        grid.spawn(Node {
                            width: Val::Px(420.0),
                            flex_direction: FlexDirection::Row,
                            align_items: AlignItems::Center,
                            justify_content: JustifyContent::SpaceBetween,
                            margin: UiRect::horizontal(Val::Px(10.0)),
                            ..default()
                        })
                        .with_children(|row| {
                            row.spawn((
                                Text::new(action.to_string()),
                                TextFont {
                                    font_size: 16.0,
                                    ..default()
                                },
                                TextColor(TEXT_COLOR),
                            ));
                            row.spawn((
                                Button,
                                Node {
                                    width: Val::Px(180.0),
                                    height: Val::Px(26.0),
                                    margin: UiRect::vertical(Val::Px(2.0)),
                                    justify_content: JustifyContent::Center,
                                    align_items: AlignItems::Center,
                                    ..default()
                                },
                                BackgroundColor(BUTTON_NORMAL),
                                BindingButton(action),
                            ))
                            .with_children(|button| {
                                button.spawn((
                                    Text::new(binding_text(bindings, action, None)),
                                    TextFont {
                                        font_size: 16.0,
                                        ..default()
                                    },
                                    TextColor(TEXT_COLOR),
                                    BindingLabel(action),
                                ));
                            });
                        });
                    }
                });

            parent
                .spawn(Node {
                    flex_direction: FlexDirection::Row,
                    margin: UiRect::top(Val::Px(20.0)),
                    ..default()
                })
                .with_children(|buttons| {
                    spawn_button(buttons, "Save", 160.0, BindingMenuButton::Save);
                    spawn_button(buttons, "Back", 160.0, BindingMenuButton::Back);
                });
        });
}

/// Open the menu from the in-game controls action.
pub fn setup_key_binding_menu(mut commands: Commands, bindings: Res<KeyBindings>) {
    spawn_key_binding_menu(&mut commands, &bindings);
}

pub fn cleanup_key_binding_menu(
    mut commands: Commands,
    menu: Query<Entity, With<KeyBindingMenuUi>>,
    mut awaiting: ResMut<AwaitingRebind>,
) {
    awaiting.0 = None;
    for entity in menu.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

/// Bind the waiting action to the next key or mouse button pressed.
pub fn capture_rebind(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut awaiting: ResMut<AwaitingRebind>,
    mut bindings: ResMut<KeyBindings>,
) {
    // The click that started the rebind is not the new binding
    if awaiting.is_changed() {
        return;
    }
    let Some(action) = awaiting.0 else {
        return;
    };

    if keys.just_pressed(KeyCode::Escape) {
        awaiting.0 = None;
        return;
    }

    let binding = keys
        .get_just_pressed()
        .next()
        .map(|key| InputBinding::Key(*key))
        .or_else(|| mouse.get_just_pressed().next().map(|button| InputBinding::Mouse(*button)));

    if let Some(binding) = binding {
        bindings.rebind(action, binding);
        info!("Bound {} to {}", action, binding);
        awaiting.0 = None;
    }
}

/// Handle clicks on the menu.
#[allow(clippy::too_many_arguments)]
pub fn key_binding_menu_actions(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    binding_buttons: Query<(&Interaction, &BindingButton), Changed<Interaction>>,
    menu_buttons: Query<(&Interaction, &BindingMenuButton), Changed<Interaction>>,
    menu: Query<Entity, With<KeyBindingMenuUi>>,
    bindings: Res<KeyBindings>,
    game_state: Res<State<GameState>>,
    mut awaiting: ResMut<AwaitingRebind>,
    mut next_play_state: ResMut<NextState<PlayState>>,
) {
    if menu.is_empty() {
        return;
    }

    for (interaction, button) in binding_buttons.iter() {
        if *interaction == Interaction::Pressed {
            awaiting.0 = Some(button.0);
        }
    }

    // While paused, Escape resumes the match and closes every menu
    let paused = *game_state.get() == GameState::Paused;
    let mut back = !paused && awaiting.0.is_none() && keys.just_pressed(KeyCode::Escape);
    for (interaction, button) in menu_buttons.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match button {
            BindingMenuButton::Save => match bindings.save() {
                Ok(()) => info!("Key bindings saved"),
                Err(e) => error!("{}", e),
            },
            BindingMenuButton::Back => back = true,
        }
    }

    if !back {
        return;
    }
    awaiting.0 = None;
    if paused {
        for entity in menu.iter() {
            commands.entity(entity).despawn_recursive();
        }
        spawn_pause_menu(&mut commands);
    } else {
        next_play_state.set(PlayState::Playing);
    }
}

/// Keep the labels in sync with the bindings.
pub fn refresh_binding_labels(
    bindings: Res<KeyBindings>,
    awaiting: Res<AwaitingRebind>,
    mut labels: Query<(&BindingLabel, &mut Text)>,
) {
    if !bindings.is_changed() && !awaiting.is_changed() {
        return;
    }
    for (label, mut text) in labels.iter_mut() {
        text.0 = binding_text(&bindings, label.0, awaiting.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_show_the_bound_input() {
        let bindings = KeyBindings::default();
        assert_eq!(
            binding_text(&bindings, InputAction::Jump, None),
            InputBinding::Key(KeyCode::Space).to_string()
        );
        assert_eq!(
            binding_text(&bindings, InputAction::Jump, Some(InputAction::Jump)),
            "Press a key..."
        );
    }
}
