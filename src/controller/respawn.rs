//! Losing the pawn on death and getting a new one.

use bevy::prelude::*;
use rand::seq::SliceRandom;

use super::components::*;
use crate::core::GameConfig;
use crate::player::{spawn_character, CharacterAssets, CharacterSpawn, PawnDetachedEvent, PlayerName};
use crate::world::PlayerStart;

/// Controllers keep looking at their corpse once the pawn dies.
pub fn handle_pawn_detached(
    time: Res<Time>,
    mut events: EventReader<PawnDetachedEvent>,
    mut controllers: Query<&mut PlayerController>,
) {
    for event in events.read() {
        let Ok(mut controller) = controllers.get_mut(event.controller) else {
            continue;
        };
        if controller.pawn == Some(event.character) {
            controller.detach(time.elapsed_secs());
            info!("Controller {:?} lost its pawn", event.controller);
        }
    }
}

/// Once the corpse is gone there is nothing left to view: spectate from
/// where the camera is.
pub fn release_missing_view_targets(
    targets: Query<&Transform>,
    cameras: Query<&Transform, With<ViewCamera>>,
    mut controllers: Query<&mut PlayerController>,
) {
    let camera_position = cameras.get_single().map(|t| t.translation).ok();

    for mut controller in controllers.iter_mut() {
        let Some(target) = controller.view_target else {
            continue;
        };
        if targets.get(target).is_err() {
            controller.view_target = None;
            if let Some(position) = camera_position {
                controller.spectator_position = position;
            }
        }
    }
}

/// Spawn a pawn at a random player start for every controller that asked.
pub fn respawn_players(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    assets: Option<Res<CharacterAssets>>,
    starts: Query<&Transform, With<PlayerStart>>,
    mut controllers: Query<(Entity, &mut PlayerController, Option<&PlayerName>, Has<LocalPlayer>)>,
) {
    let now = time.elapsed_secs();
    let starts: Vec<_> = starts.iter().collect();

    for (entity, mut controller, name, local) in controllers.iter_mut() {
        if !controller.respawn_requested || !controller.can_respawn(now, config.rules.respawn_delay) {
            continue;
        }

        let (position, yaw) = match starts.choose(&mut rand::thread_rng()) {
            Some(start) => (start.translation, start.rotation.to_euler(EulerRot::YXZ).0),
            None => {
                warn!("No player start in the arena, spawning at the origin");
                (Vec3::ZERO, 0.0)
            }
        };

        let pawn = spawn_character(
            &mut commands,
            &config,
            assets.as_deref(),
            CharacterSpawn {
                position,
                yaw,
                name: name.map(|n| n.0.clone()).unwrap_or_else(|| config.chat.fallback_owner_name.clone()),
                controller: Some(entity),
                local,
            },
        );
        controller.possess(pawn);
        controller.rotation.yaw = yaw;
        controller.rotation.pitch = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Character, PossessedBy};
    use std::time::Duration;

    fn respawn_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(GameConfig::default())
            .add_event::<PawnDetachedEvent>()
            .add_systems(Update, (handle_pawn_detached, respawn_players).chain());
        app
    }

    #[test]
    fn dead_pawns_are_released_but_still_watched() {
        let mut app = respawn_app();
        let corpse = app.world_mut().spawn(Transform::default()).id();
        let mut controller = PlayerController::default();
        controller.possess(corpse);
        let entity = app.world_mut().spawn(controller).id();

        app.world_mut().send_event(PawnDetachedEvent {
            character: corpse,
            controller: entity,
        });
        app.update();

        let controller = app.world().get::<PlayerController>(entity).unwrap();
        assert_eq!(controller.pawn, None);
        assert_eq!(controller.view_target, Some(corpse));
        assert!(controller.died_at.is_some());
    }

    #[test]
    fn requested_respawn_waits_for_the_delay_then_uses_a_player_start() {
        let mut app = respawn_app();
        let start = Vec3::new(12.0, 0.0, -4.0);
        app.world_mut()
            .spawn((PlayerStart, Transform::from_translation(start)));
        let entity = app
            .world_mut()
            .spawn((
                PlayerController {
                    died_at: Some(0.0),
                    respawn_requested: true,
                    ..default()
                },
                PlayerName("Xan".to_string()),
            ))
            .id();

        // Respawn delay is 1.5 s
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs(1));
        app.update();
        assert_eq!(app.world().get::<PlayerController>(entity).unwrap().pawn, None);

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs(1));
        app.update();

        let controller = app.world().get::<PlayerController>(entity).unwrap();
        let pawn = controller.pawn.unwrap();
        assert!(!controller.respawn_requested);
        assert_eq!(controller.view_target, Some(pawn));

        let world = app.world();
        assert!(world.entity(pawn).contains::<Character>());
        assert_eq!(world.get::<PossessedBy>(pawn).map(|p| p.0), Some(entity));
        assert_eq!(world.get::<PlayerName>(pawn).unwrap().0, "Xan");

        let half_height = GameConfig::default().character.half_height;
        let translation = world.get::<Transform>(pawn).unwrap().translation;
        assert_eq!(translation, start + Vec3::Y * half_height);
    }
}
