//! Core plugin that sets up game states, events, config and fundamental systems.

use bevy::prelude::*;

use super::config::GameConfig;
use super::events::*;
use super::lifespan::tick_life_spans;
use super::net::NetMode;
use super::states::*;
use super::tween::*;

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Game states (Loading, MainMenu, InGame, etc.)
/// - Global events (DamageEvent, KilledEvent, etc.)
/// - The game config resource
/// - Life spans and smooth transforms
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        // Other plugins read tuning values while building their systems
        if !app.world().contains_resource::<GameConfig>() {
            app.insert_resource(GameConfig::load());
        }
        app.init_resource::<NetMode>();

        app
            // Initialize game states
            .init_state::<GameState>()
            .add_sub_state::<PlayState>()

            // Register global events
            .add_event::<DamageEvent>()
            .add_event::<KilledEvent>()
            .add_event::<SuicideEvent>()
            .add_event::<ChatMessageEvent>()
            .add_event::<SystemMessageEvent>()

            // Data is read synchronously at startup, so loading ends right away
            .add_systems(OnEnter(GameState::Loading), finish_loading)

            // Pause/unpause with Escape key (local players only)
            .add_systems(
                Update,
                handle_pause_input
                    .run_if(resource_exists::<ButtonInput<KeyCode>>)
                    .run_if(in_state(GameState::InGame).or(in_state(GameState::Paused))),
            )

            .add_systems(Update, (tick_life_spans, update_smooth_transforms))
            .add_systems(Update, log_system_messages);
    }
}

/// Leave the loading state. A dedicated server has no menu to show.
fn finish_loading(net_mode: Res<NetMode>, mut next_state: ResMut<NextState<GameState>>) {
    if net_mode.is_dedicated() {
        info!("Dedicated server: starting match");
        next_state.set(GameState::InGame);
    } else {
        next_state.set(GameState::MainMenu);
    }
}

/// Handle Escape key to pause/unpause the game.
fn handle_pause_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    current_state: Res<State<GameState>>,
    play_state: Option<Res<State<PlayState>>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !keyboard.just_pressed(KeyCode::Escape) {
        return;
    }

    // Escape closes the chat line or the controls menu first
    if play_state.is_some_and(|state| *state.get() != PlayState::Playing) {
        return;
    }

    match current_state.get() {
        GameState::InGame => next_state.set(GameState::Paused),
        GameState::Paused => next_state.set(GameState::InGame),
        _ => {}
    }
}

/// Everything the players see in the message box also goes to the log.
fn log_system_messages(mut events: EventReader<SystemMessageEvent>) {
    for event in events.read() {
        info!("[system] {}", event.message);
    }
}
