//! Routing local input to the possessed pawn, or to the spectator camera.

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use super::bindings::{ActionInput, InputAction};
use super::chat::{ChatComponent, ChatDraft};
use super::components::*;
use crate::core::{ControlTuning, GameConfig, NetMode, PlayState, SmoothTransform, SuicideEvent};
use crate::player::{
    CharacterMotion, ControlRotation, DodgeDirection, MoveInput, MovementMode, PlayerName,
};
use crate::weapons::Inventory;
use crate::LaunchOptions;

/// Pitch limit, about 86 degrees.
const MAX_PITCH: f32 = 1.5;

/// Spawn the local player's controller and camera. The first pawn is
/// requested right away.
pub fn spawn_local_player(
    mut commands: Commands,
    options: Res<LaunchOptions>,
    config: Res<GameConfig>,
) {
    commands.spawn((
        PlayerController {
            respawn_requested: true,
            ..default()
        },
        LocalPlayer,
        Team::default(),
        PlayerName(options.player_name.clone()),
        ChatComponent::from_tuning(&config.chat),
        DodgeTapTracker::default(),
    ));

    commands.spawn((
        Camera3d::default(),
        ViewCamera,
        Transform::from_xyz(0.0, 2.0, 5.0),
        SmoothTransform::default(),
    ));

    info!("Local player {} joined", options.player_name);
}

/// Remove the local controller and its camera.
pub fn despawn_local_player(
    mut commands: Commands,
    controllers: Query<Entity, With<PlayerController>>,
    cameras: Query<Entity, With<ViewCamera>>,
) {
    for entity in controllers.iter().chain(cameras.iter()) {
        commands.entity(entity).despawn_recursive();
    }
}

/// Grab and hide cursor while input goes to the game.
pub fn grab_cursor(mut window_query: Query<&mut Window, With<PrimaryWindow>>) {
    if let Ok(mut window) = window_query.get_single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
}

/// Release cursor for menus and the chat line.
pub fn release_cursor(mut window_query: Query<&mut Window, With<PrimaryWindow>>) {
    if let Ok(mut window) = window_query.get_single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }
}

/// Rotate by the turn/look-up axes at their base rates (degrees per second).
pub fn apply_turn_rates(
    rotation: &mut ControlRotation,
    turn: f32,
    look_up: f32,
    tuning: &ControlTuning,
    delta: f32,
) {
    rotation.yaw -= turn * tuning.base_turn_rate.to_radians() * delta;
    rotation.pitch += look_up * tuning.base_look_up_rate.to_radians() * delta;
    rotation.pitch = rotation.pitch.clamp(-MAX_PITCH, MAX_PITCH);
}

/// Handle mouse movement and turn keys for looking around.
pub fn look_input(
    time: Res<Time>,
    config: Res<GameConfig>,
    actions: ActionInput,
    mut mouse_motion: EventReader<MouseMotion>,
    mut controllers: Query<&mut PlayerController, With<LocalPlayer>>,
    mut pawns: Query<&mut ControlRotation>,
) {
    // Accumulate mouse movement
    let mut delta = Vec2::ZERO;
    for event in mouse_motion.read() {
        delta += event.delta;
    }

    let Ok(mut controller) = controllers.get_single_mut() else {
        return;
    };

    let tuning = &config.controls;
    let sensitivity = tuning.mouse_sensitivity * 0.001;
    let y_invert = if tuning.invert_y { -1.0 } else { 1.0 };

    controller.rotation.yaw -= delta.x * sensitivity;
    controller.rotation.pitch -= delta.y * sensitivity * y_invert;
    apply_turn_rates(
        &mut controller.rotation,
        actions.axis(InputAction::TurnRight, InputAction::TurnLeft),
        actions.axis(InputAction::LookUp, InputAction::LookDown),
        tuning,
        time.delta_secs(),
    );

    if let Some(pawn) = controller.pawn {
        if let Ok(mut rotation) = pawns.get_mut(pawn) {
            *rotation = controller.rotation;
        }
    }
}

/// Movement axes, jump, crouch and dodge taps.
pub fn movement_input(
    time: Res<Time>,
    config: Res<GameConfig>,
    actions: ActionInput,
    mut controllers: Query<(&mut PlayerController, &mut DodgeTapTracker), With<LocalPlayer>>,
    mut pawns: Query<&mut MoveInput>,
) {
    let Ok((mut controller, mut taps)) = controllers.get_single_mut() else {
        return;
    };

    let forward = actions.axis(InputAction::MoveForward, InputAction::MoveBackward);
    let right = actions.axis(InputAction::MoveRight, InputAction::MoveLeft);
    let up = actions.axis(InputAction::MoveUp, InputAction::MoveDown);

    let pawn_input = controller.pawn.and_then(|pawn| pawns.get_mut(pawn).ok());
    let Some(mut input) = pawn_input else {
        // Nobody to drive, fly the spectator camera instead
        let rotation = controller.rotation;
        let wish = rotation.forward() * forward
            + rotation.yaw_rotation() * Vec3::X * right
            + Vec3::Y * up;
        controller.spectator_position +=
            wish.clamp_length_max(1.0) * config.controls.spectator_speed * time.delta_secs();
        return;
    };

    input.forward = forward;
    input.right = right;
    input.up = up;
    input.crouch = actions.pressed(InputAction::Crouch);
    if actions.just_pressed(InputAction::Jump) {
        input.jump = true;
    }

    let now = time.elapsed_secs();
    let window = config.dodge.tap_window;
    for (action, direction) in [
        (InputAction::MoveForward, DodgeDirection::Forward),
        (InputAction::MoveBackward, DodgeDirection::Back),
        (InputAction::MoveLeft, DodgeDirection::Left),
        (InputAction::MoveRight, DodgeDirection::Right),
    ] {
        if actions.just_pressed(action) && taps.tap(direction, now, window) {
            input.dodge = direction;
        }
    }
}

/// Fire, weapon switching, and the one-shot actions.
#[allow(clippy::too_many_arguments)]
pub fn action_input(
    actions: ActionInput,
    net_mode: Res<NetMode>,
    mut wheel: EventReader<MouseWheel>,
    mut controllers: Query<(Entity, &mut PlayerController), With<LocalPlayer>>,
    mut pawns: Query<(&mut Inventory, &mut CharacterMotion)>,
    mut suicide_events: EventWriter<SuicideEvent>,
    mut chat_draft: ResMut<ChatDraft>,
    mut next_play_state: ResMut<NextState<PlayState>>,
) {
    let scroll: f32 = wheel.read().map(|event| event.y).sum();

    let Ok((entity, mut controller)) = controllers.get_single_mut() else {
        return;
    };

    if actions.just_pressed(InputAction::Say) || actions.just_pressed(InputAction::TeamSay) {
        chat_draft.open(entity, actions.just_pressed(InputAction::TeamSay));
        next_play_state.set(PlayState::Chatting);
        return;
    }
    if actions.just_pressed(InputAction::Controls) {
        next_play_state.set(PlayState::Controls);
        return;
    }

    let Some(pawn) = controller.pawn else {
        if actions.just_pressed(InputAction::Fire) {
            controller.respawn_requested = true;
        }
        return;
    };
    let Ok((mut inventory, mut motion)) = pawns.get_mut(pawn) else {
        return;
    };

    if actions.just_pressed(InputAction::Fire) {
        inventory.start_fire();
    }
    if actions.just_released(InputAction::Fire) {
        inventory.stop_fire();
    }

    for group in 0..=5 {
        if actions.just_pressed(InputAction::SelectWeapon(group)) {
            inventory.select_group(group);
        }
    }
    if actions.just_pressed(InputAction::NextWeapon) || scroll > 0.0 {
        inventory.next_weapon();
    }
    if actions.just_pressed(InputAction::PrevWeapon) || scroll < 0.0 {
        inventory.prev_weapon();
    }
    if actions.just_pressed(InputAction::ShowInventory) {
        inventory.show();
    }

    if actions.just_pressed(InputAction::Suicide) {
        suicide_events.send(SuicideEvent { character: pawn });
    }

    if actions.just_pressed(InputAction::ToggleFly) && net_mode.has_authority() {
        motion.mode = if motion.mode == MovementMode::Flying {
            MovementMode::Falling
        } else {
            MovementMode::Flying
        };
        info!("Movement mode: {:?}", motion.mode);
    }
}
