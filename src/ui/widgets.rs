//! Shared widget helpers.

use bevy::prelude::*;

pub const BUTTON_NORMAL: Color = Color::srgb(0.15, 0.15, 0.2);
pub const BUTTON_HOVERED: Color = Color::srgb(0.25, 0.25, 0.3);
pub const BUTTON_PRESSED: Color = Color::srgb(0.3, 0.3, 0.35);
pub const TEXT_COLOR: Color = Color::srgb(0.8, 0.8, 0.85);

/// Full screen column, centered.
pub fn overlay_node() -> Node {
    Node {
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        flex_direction: FlexDirection::Column,
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        position_type: PositionType::Absolute,
        ..default()
    }
}

/// Title text with a bottom margin.
pub fn spawn_title(parent: &mut ChildBuilder, text: &str, size: f32, color: Color) {
    parent.spawn((
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
        Node {
            margin: UiRect::bottom(Val::Px(40.0)),
            ..default()
        },
    ));
}

/// Helper to spawn a menu button carrying `marker`.
pub fn spawn_button(parent: &mut ChildBuilder, text: &str, width: f32, marker: impl Bundle) {
    parent
        .spawn((
            Button,
            Node {
                width: Val::Px(width),
                height: Val::Px(44.0),
                margin: UiRect::all(Val::Px(6.0)),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(BUTTON_NORMAL),
            marker,
        ))
        .with_children(|button| {
            button.spawn((
                Text::new(text),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(TEXT_COLOR),
            ));
        });
}

/// Hover and press feedback for every button.
pub fn button_feedback(
    mut buttons: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<Button>)>,
) {
    for (interaction, mut background) in buttons.iter_mut() {
        *background = match interaction {
            Interaction::Pressed => BUTTON_PRESSED,
            Interaction::Hovered => BUTTON_HOVERED,
            Interaction::None => BUTTON_NORMAL,
        }
        .into();
    }
}
