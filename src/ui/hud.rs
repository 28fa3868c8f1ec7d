//! In-game HUD - health, armor and shield, weapon, crosshair, respawn prompt.

use bevy::prelude::*;

use crate::combat::Attributes;
use crate::controller::{LocalPlayer, PlayerController};
use crate::weapons::Inventory;

/// Marker for HUD root entities.
#[derive(Component)]
pub struct HudRoot;

/// The three damage pools shown on the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Health,
    Armor,
    Shield,
}

impl Pool {
    /// Current value and fill fraction.
    pub fn read(self, attributes: &Attributes) -> (f32, f32) {
        match self {
            Pool::Health => (attributes.health, attributes.health_percentage()),
            Pool::Armor => (attributes.armor, attributes.armor_percentage()),
            Pool::Shield => (attributes.shield, attributes.shield_percentage()),
        }
    }
}

/// Marker for bar fills.
#[derive(Component)]
pub struct BarFill(pub Pool);

/// Marker for bar value texts.
#[derive(Component)]
pub struct BarValue(pub Pool);

#[derive(Component)]
pub struct WeaponText;

#[derive(Component)]
pub struct RespawnPrompt;

/// Spawn the HUD UI.
pub fn spawn_hud(mut commands: Commands) {
    // Bars (bottom-left corner)
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::End,
                align_items: AlignItems::Start,
                padding: UiRect::all(Val::Px(20.0)),
                position_type: PositionType::Absolute,
                ..default()
            },
            HudRoot,
        ))
        .with_children(|parent| {
            spawn_bar(parent, "Shield", Color::srgb(0.3, 0.6, 1.0), Pool::Shield);
            spawn_bar(parent, "Armor", Color::srgb(0.9, 0.75, 0.2), Pool::Armor);
            spawn_bar(parent, "Health", Color::srgb(0.8, 0.2, 0.2), Pool::Health);
        });

    // Active weapon (bottom-right corner)
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::End,
                align_items: AlignItems::End,
                padding: UiRect::all(Val::Px(20.0)),
                position_type: PositionType::Absolute,
                ..default()
            },
            HudRoot,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                WeaponText,
            ));
        });

    // Crosshair and respawn prompt (center of screen)
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                position_type: PositionType::Absolute,
                ..default()
            },
            HudRoot,
        ))
        .with_children(|parent| {
            parent.spawn((
                Node {
                    width: Val::Px(4.0),
                    height: Val::Px(4.0),
                    ..default()
                },
                BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.6)),
            ));
            parent.spawn((
                Text::new("Press fire to respawn"),
                TextFont {
                    font_size: 28.0,
                    ..default()
                },
                TextColor(Color::srgb(0.95, 0.95, 0.95)),
                Node {
                    margin: UiRect::top(Val::Px(80.0)),
                    ..default()
                },
                Visibility::Hidden,
                RespawnPrompt,
            ));
        });
}

/// Helper to spawn a status bar with its value.
fn spawn_bar(parent: &mut ChildBuilder, label: &str, color: Color, pool: Pool) {
    parent
        .spawn(Node {
            flex_direction: FlexDirection::Row,
            align_items: AlignItems::Center,
            margin: UiRect::bottom(Val::Px(5.0)),
            ..default()
        })
        .with_children(|bar_parent| {
            // Label
            bar_parent.spawn((
                Text::new(label),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.8, 0.8, 0.8)),
                Node {
                    width: Val::Px(60.0),
                    ..default()
                },
            ));

            // Bar background
            bar_parent
                .spawn((
                    Node {
                        width: Val::Px(150.0),
                        height: Val::Px(12.0),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.1, 0.1, 0.1)),
                ))
                .with_children(|bg| {
                    // Bar fill
                    bg.spawn((
                        Node {
                            width: Val::Percent(0.0),
                            height: Val::Percent(100.0),
                            ..default()
                        },
                        BackgroundColor(color),
                        BarFill(pool),
                    ));
                });

            // Value
            bar_parent.spawn((
                Text::new("0"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.9)),
                Node {
                    margin: UiRect::left(Val::Px(8.0)),
                    ..default()
                },
                BarValue(pool),
            ));
        });
}

/// Update bars, weapon name and the respawn prompt from the local player.
pub fn update_hud(
    controllers: Query<&PlayerController, With<LocalPlayer>>,
    pawns: Query<(&Attributes, Option<&Inventory>)>,
    mut fills: Query<(&BarFill, &mut Node)>,
    mut values: Query<(&BarValue, &mut Text), Without<WeaponText>>,
    mut weapon_text: Query<&mut Text, With<WeaponText>>,
    mut prompt: Query<&mut Visibility, With<RespawnPrompt>>,
) {
    let Ok(controller) = controllers.get_single() else {
        return;
    };
    let pawn = controller.pawn.and_then(|entity| pawns.get(entity).ok());

    if let Ok(mut visibility) = prompt.get_single_mut() {
        *visibility = if pawn.is_some() {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
    }

    let Some((attributes, inventory)) = pawn else {
        return;
    };

    for (fill, mut node) in fills.iter_mut() {
        let (_, fraction) = fill.0.read(attributes);
        node.width = Val::Percent(fraction * 100.0);
    }
    for (value, mut text) in values.iter_mut() {
        let (amount, _) = value.0.read(attributes);
        text.0 = format!("{:.0}", amount);
    }

    if let Ok(mut text) = weapon_text.get_single_mut() {
        text.0 = inventory
            .and_then(|inventory| inventory.active())
            .map_or_else(String::new, |weapon| format!("[{}] {}", weapon.group, weapon.name));
    }
}
