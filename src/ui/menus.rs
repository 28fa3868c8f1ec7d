//! Main menu, pause menu and the end of match scoreboard.

use bevy::prelude::*;

use super::keybinding::spawn_key_binding_menu;
use super::widgets::*;
use crate::combat::Scoreboard;
use crate::controller::KeyBindings;
use crate::core::GameState;
use crate::player::PlayerName;
use crate::LaunchOptions;

/// Marker for main menu UI entities.
#[derive(Component)]
pub struct MainMenuUi;

/// Marker for the menu camera (used when no game camera exists).
#[derive(Component)]
pub struct MenuCamera;

/// Marker for pause menu UI entities.
#[derive(Component)]
pub struct PauseMenuUi;

/// Marker for scoreboard UI entities.
#[derive(Component)]
pub struct ScoreboardUi;

/// Marker for menu buttons.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuButton {
    Play,
    Resume,
    Controls,
    MainMenu,
    Quit,
}

/// Set up the main menu.
pub fn setup_main_menu(mut commands: Commands, options: Res<LaunchOptions>) {
    // Spawn a camera for UI rendering in menu state
    commands.spawn((Camera2d, MenuCamera));

    commands
        .spawn((overlay_node(), BackgroundColor(Color::srgb(0.05, 0.05, 0.08)), MainMenuUi))
        .with_children(|parent| {
            spawn_title(parent, "FRAG ARENA", 80.0, Color::srgb(0.9, 0.55, 0.2));
            spawn_title(
                parent,
                &format!("Arena: {}", options.arena),
                24.0,
                Color::srgb(0.5, 0.5, 0.55),
            );

            spawn_button(parent, "Play", 220.0, MenuButton::Play);
            spawn_button(parent, "Quit", 220.0, MenuButton::Quit);
        });
}

/// Clean up main menu entities.
pub fn cleanup_main_menu(
    mut commands: Commands,
    ui_query: Query<Entity, Or<(With<MainMenuUi>, With<MenuCamera>)>>,
) {
    for entity in ui_query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

pub fn spawn_pause_menu(commands: &mut Commands) {
    // Semi-transparent overlay
    commands
        .spawn((overlay_node(), BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)), PauseMenuUi))
        .with_children(|parent| {
            spawn_title(parent, "PAUSED", 48.0, TEXT_COLOR);

            spawn_button(parent, "Resume", 220.0, MenuButton::Resume);
            spawn_button(parent, "Controls", 220.0, MenuButton::Controls);
            spawn_button(parent, "Main Menu", 220.0, MenuButton::MainMenu);
            spawn_button(parent, "Quit", 220.0, MenuButton::Quit);
        });
}

/// Set up the pause menu.
pub fn setup_pause_menu(mut commands: Commands) {
    spawn_pause_menu(&mut commands);
}

/// One scoreboard line.
pub fn score_line(rank: usize, name: &str, frags: i32, deaths: u32) -> String {
    format!("{}. {:<16} {:>4} frags {:>4} deaths", rank, name, frags, deaths)
}

/// Show the final ranking.
pub fn setup_scoreboard(
    mut commands: Commands,
    scoreboard: Res<Scoreboard>,
    names: Query<&PlayerName>,
) {
    let ranking = scoreboard.ranking();
    let name_of = |entity: Entity| {
        names
            .get(entity)
            .map_or_else(|_| format!("{:?}", entity), |name| name.0.clone())
    };

    commands
        .spawn((overlay_node(), BackgroundColor(Color::srgba(0.02, 0.02, 0.05, 0.85)), ScoreboardUi))
        .with_children(|parent| {
            let title = match ranking.first() {
                Some((winner, _)) => format!("{} WINS", name_of(*winner).to_uppercase()),
                None => "MATCH OVER".to_string(),
            };
            spawn_title(parent, &title, 56.0, Color::srgb(0.9, 0.55, 0.2));

            for (index, (controller, score)) in ranking.iter().enumerate() {
                parent.spawn((
                    Text::new(score_line(index + 1, &name_of(*controller), score.frags, score.deaths)),
                    TextFont {
                        font_size: 22.0,
                        ..default()
                    },
                    TextColor(TEXT_COLOR),
                    Node {
                        margin: UiRect::bottom(Val::Px(6.0)),
                        ..default()
                    },
                ));
            }

            parent.spawn(Node {
                height: Val::Px(30.0),
                ..default()
            });
            spawn_button(parent, "Main Menu", 220.0, MenuButton::MainMenu);
        });
}

/// Despawn every entity carrying the marker `M`.
pub fn cleanup<M: Component>(mut commands: Commands, query: Query<Entity, With<M>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

/// Handle menu button presses.
pub fn menu_actions(
    mut commands: Commands,
    buttons: Query<(&Interaction, &MenuButton), (Changed<Interaction>, With<Button>)>,
    pause_menu: Query<Entity, With<PauseMenuUi>>,
    bindings: Res<KeyBindings>,
    mut next_state: ResMut<NextState<GameState>>,
    mut exit: EventWriter<AppExit>,
) {
    for (interaction, button) in buttons.iter() {
        if *interaction != Interaction::Pressed {
            continue;
        }

        match button {
            MenuButton::Play | MenuButton::Resume => next_state.set(GameState::InGame),
            MenuButton::Controls => {
                for entity in pause_menu.iter() {
                    commands.entity(entity).despawn_recursive();
                }
                spawn_key_binding_menu(&mut commands, &bindings);
            }
            MenuButton::MainMenu => next_state.set(GameState::MainMenu),
            MenuButton::Quit => {
                exit.send(AppExit::Success);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_lines_are_aligned() {
        let line = score_line(1, "Xan", 25, 3);
        assert!(line.starts_with("1. Xan "));
        assert!(line.ends_with("  25 frags    3 deaths"));
    }
}
