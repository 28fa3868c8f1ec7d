//! Combat systems - damage resolution, suicides, scoring.

use std::collections::HashSet;

use bevy::prelude::*;

use super::components::*;
use super::damage::{knockback_impulse, knockback_power, mitigate_damage};
use super::death::DeathParams;
use super::rules::{GameMode, KillContext, Scoreboard};
use crate::core::{
    DamageEvent, DamageKind, GameConfig, GameState, KilledEvent, LifeSpan, NetMode, SuicideEvent,
    SystemMessageEvent, TornOff, UNITS_PER_METER,
};
use crate::player::{CharacterMotion, PlayerName, PlayerSet, PossessedBy};

/// System set ordering for combat.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CombatSet {
    /// Damage and suicides are resolved, deaths happen
    Damage,
    /// Kills are booked on the scoreboard
    Scoring,
}

/// Configure combat systems.
pub fn setup_combat_systems(app: &mut App) {
    app
        // Resources
        .init_resource::<Scoreboard>()

        // System ordering
        .configure_sets(
            Update,
            (CombatSet::Damage, CombatSet::Scoring)
                .chain()
                .after(PlayerSet::Movement)
                .run_if(in_state(GameState::InGame)),
        )

        // A match starts when leaving the menu (or loading, on a dedicated server)
        .add_systems(
            OnTransition {
                exited: GameState::MainMenu,
                entered: GameState::InGame,
            },
            start_match,
        )
        .add_systems(
            OnTransition {
                exited: GameState::Loading,
                entered: GameState::InGame,
            },
            start_match,
        )
        .add_systems(OnEnter(GameState::MainMenu), end_match)

        .add_systems(
            Update,
            (apply_damage, handle_suicides).chain().in_set(CombatSet::Damage),
        )
        .add_systems(Update, score_kills.in_set(CombatSet::Scoring));
}

/// Whether a hit is processed at all.
///
/// Only the authority resolves damage; torn-off, pending-destroy and
/// invulnerable characters ignore it, and so does a zero amount.
pub fn should_take_damage(
    net_mode: NetMode,
    amount: f32,
    torn_off: bool,
    pending_destroy: bool,
    invulnerable: bool,
) -> bool {
    net_mode.has_authority() && !torn_off && !pending_destroy && !invulnerable && amount != 0.0
}

fn start_match(
    mut commands: Commands,
    net_mode: Res<NetMode>,
    config: Res<GameConfig>,
    mut scoreboard: ResMut<Scoreboard>,
) {
    scoreboard.clear();
    if net_mode.has_authority() {
        commands.insert_resource(GameMode::from_rules(&config.rules));
        info!(
            "Match started (frag limit {}, deaths prevented: {})",
            config.rules.frag_limit, config.rules.prevent_deaths
        );
    }
}

fn end_match(mut commands: Commands, mut scoreboard: ResMut<Scoreboard>) {
    scoreboard.clear();
    commands.remove_resource::<GameMode>();
}

/// Resolve every pending hit: mitigation, knockback, then death.
pub(crate) fn apply_damage(
    net_mode: Res<NetMode>,
    config: Res<GameConfig>,
    mut damage_events: EventReader<DamageEvent>,
    mut characters: Query<(
        &mut Attributes,
        Option<&mut CharacterMotion>,
        &Transform,
        Option<&PossessedBy>,
        Has<TornOff>,
        Has<LifeSpan>,
        Has<Invulnerable>,
    )>,
    mut death: DeathParams,
) {
    // Tear-off is a deferred insert, so track this frame's deaths here
    let mut died_this_frame = HashSet::new();

    for event in damage_events.read() {
        let Ok((mut attributes, mut motion, transform, possessed_by, torn_off, pending_destroy, invulnerable)) =
            characters.get_mut(event.target)
        else {
            continue;
        };

        let torn_off = torn_off || died_this_frame.contains(&event.target);
        if !should_take_damage(*net_mode, event.amount, torn_off, pending_destroy, invulnerable) {
            continue;
        }

        debug!("Damage incoming ({}) on {:?}", event.amount, event.target);
        let mitigation = mitigate_damage(&mut attributes, event.amount);

        if let Some(motion) = motion.as_mut() {
            let power = knockback_power(mitigation.remaining, config.damage.knockback_per_damage);
            if let Some(impulse) = knockback_impulse(
                event.kind,
                power,
                motion.mass,
                config.damage.min_knockback_speed,
                transform.translation,
            ) {
                motion.add_impulse(impulse, UNITS_PER_METER);
            }
        }

        if attributes.health > 0.0 {
            continue;
        }

        let context = KillContext {
            victim: event.target,
            victim_controller: possessed_by.map(|p| p.0),
            killer: event.instigator,
            causer: event.causer,
            kind: event.kind,
        };
        let branch = death.die(context, &mut attributes, motion.as_deref_mut(), torn_off);
        if matches!(branch, super::DeathBranch::Destroyed | super::DeathBranch::Ragdoll) {
            died_this_frame.insert(event.target);
        }
    }
}

/// Kill characters on request, crediting nobody.
pub(crate) fn handle_suicides(
    net_mode: Res<NetMode>,
    mut suicide_events: EventReader<SuicideEvent>,
    mut characters: Query<(
        &mut Attributes,
        Option<&mut CharacterMotion>,
        Option<&PossessedBy>,
        Has<TornOff>,
    )>,
    mut death: DeathParams,
) {
    if !net_mode.has_authority() {
        return;
    }

    for event in suicide_events.read() {
        let Ok((mut attributes, mut motion, possessed_by, torn_off)) =
            characters.get_mut(event.character)
        else {
            continue;
        };

        info!("{:?} commits suicide", event.character);
        let context = KillContext {
            victim: event.character,
            victim_controller: possessed_by.map(|p| p.0),
            killer: None,
            causer: None,
            kind: DamageKind::Generic,
        };
        death.die(context, &mut attributes, motion.as_deref_mut(), torn_off);
    }
}

/// Book kills, announce them, and end the match at the frag limit.
fn score_kills(
    mut killed_events: EventReader<KilledEvent>,
    mut scoreboard: ResMut<Scoreboard>,
    game_mode: Option<ResMut<GameMode>>,
    config: Res<GameConfig>,
    names: Query<&PlayerName>,
    mut messages: EventWriter<SystemMessageEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(mut game_mode) = game_mode else {
        killed_events.clear();
        return;
    };

    let name_of = |entity: Option<Entity>| {
        entity
            .and_then(|e| names.get(e).ok())
            .map(|name| name.0.clone())
            .unwrap_or_else(|| config.chat.fallback_owner_name.clone())
    };

    for event in killed_events.read() {
        let victim_name = name_of(Some(event.victim));
        let message = match event.killer {
            None => format!("{} died", victim_name),
            Some(killer) if Some(killer) == event.victim_controller => {
                format!("{} killed themselves", victim_name)
            }
            Some(killer) => format!("{} killed {}", name_of(Some(killer)), victim_name),
        };
        messages.send(SystemMessageEvent { message });

        let frags = scoreboard.record_kill(event.victim_controller, event.killer);
        let Some(frags) = frags else {
            continue;
        };

        if game_mode.frag_limit > 0 && frags >= game_mode.frag_limit && !game_mode.match_ended {
            game_mode.match_ended = true;
            messages.send(SystemMessageEvent {
                message: format!("{} wins the match", name_of(event.killer)),
            });
            info!("Frag limit reached, match over");
            next_state.set(GameState::MatchEnded);
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;
    use bevy_rapier3d::prelude::*;

    use super::*;
    use crate::combat::rules::{PracticeRules, StandardRules};
    use crate::core::LifeSpan;
    use crate::player::PawnDetachedEvent;

    fn test_app(net_mode: NetMode, game_mode: Option<GameMode>) -> App {
        let mut app = App::new();
        app.insert_resource(net_mode)
            .insert_resource(GameConfig::default())
            .add_event::<DamageEvent>()
            .add_event::<KilledEvent>()
            .add_event::<SuicideEvent>()
            .add_event::<PawnDetachedEvent>()
            .add_systems(Update, (apply_damage, handle_suicides).chain());
        if let Some(game_mode) = game_mode {
            app.insert_resource(game_mode);
        }
        app
    }

    fn spawn_target(app: &mut App, health: f32, armor: f32) -> (Entity, Entity) {
        let controller = app.world_mut().spawn_empty().id();
        let character = app
            .world_mut()
            .spawn((
                Attributes {
                    health,
                    armor,
                    ..default()
                },
                CharacterMotion::from_tuning(&default()),
                Transform::default(),
                PossessedBy(controller),
                KinematicCharacterController::default(),
            ))
            .id();
        (character, controller)
    }

    fn hit(app: &mut App, target: Entity, amount: f32, kind: DamageKind) {
        app.world_mut().send_event(DamageEvent {
            target,
            instigator: None,
            causer: None,
            amount,
            kind,
        });
    }

    fn kills(app: &App) -> usize {
        app.world()
            .resource::<Events<KilledEvent>>()
            .iter_current_update_events()
            .count()
    }

    #[test]
    fn only_the_authority_takes_damage() {
        assert!(should_take_damage(NetMode::Standalone, 10.0, false, false, false));
        assert!(should_take_damage(NetMode::DedicatedServer, -5.0, false, false, false));
        assert!(!should_take_damage(NetMode::Client, 10.0, false, false, false));
        assert!(!should_take_damage(NetMode::ListenServer, 0.0, false, false, false));
        assert!(!should_take_damage(NetMode::ListenServer, 10.0, true, false, false));
        assert!(!should_take_damage(NetMode::ListenServer, 10.0, false, true, false));
        assert!(!should_take_damage(NetMode::ListenServer, 10.0, false, false, true));
    }

    #[test]
    fn lethal_hit_turns_the_character_into_a_ragdoll() {
        let mut app = test_app(NetMode::Standalone, Some(GameMode::new(StandardRules, 0)));
        let (character, _) = spawn_target(&mut app, 10.0, 0.0);

        hit(&mut app, character, 50.0, DamageKind::Generic);
        app.update();

        let entity = app.world().entity(character);
        assert_eq!(entity.get::<Attributes>().unwrap().health, 0.0);
        assert!(entity.contains::<TornOff>());
        assert!(entity.contains::<Ragdoll>());
        assert!(!entity.contains::<KinematicCharacterController>());
        assert!(!entity.contains::<PossessedBy>());
        assert_eq!(entity.get::<RigidBody>(), Some(&RigidBody::Dynamic));
        let life_span = entity.get::<LifeSpan>().unwrap();
        assert_eq!(life_span.0.duration().as_secs_f32(), 5.0);
        assert_eq!(kills(&app), 1);
    }

    #[test]
    fn dedicated_server_disables_collision_and_destroys_quickly() {
        let mut app = test_app(NetMode::DedicatedServer, Some(GameMode::new(StandardRules, 0)));
        let (character, _) = spawn_target(&mut app, 10.0, 0.0);

        hit(&mut app, character, 50.0, DamageKind::Generic);
        app.update();

        let entity = app.world().entity(character);
        assert!(entity.contains::<TornOff>());
        assert!(entity.contains::<ColliderDisabled>());
        assert!(!entity.contains::<Ragdoll>());
        let life_span = entity.get::<LifeSpan>().unwrap();
        assert!((life_span.0.duration().as_secs_f32() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn game_mode_can_keep_the_victim_alive() {
        let mut app = test_app(NetMode::ListenServer, Some(GameMode::new(PracticeRules, 0)));
        let (character, _) = spawn_target(&mut app, 10.0, 0.0);

        hit(&mut app, character, 50.0, DamageKind::Generic);
        app.update();

        let entity = app.world().entity(character);
        assert_eq!(entity.get::<Attributes>().unwrap().health, 1.0);
        assert!(!entity.contains::<TornOff>());
        assert_eq!(kills(&app), 0);
    }

    #[test]
    fn several_lethal_hits_in_one_frame_kill_once() {
        let mut app = test_app(NetMode::Standalone, Some(GameMode::new(StandardRules, 0)));
        let (character, _) = spawn_target(&mut app, 10.0, 0.0);

        hit(&mut app, character, 50.0, DamageKind::Generic);
        hit(&mut app, character, 50.0, DamageKind::Generic);
        app.update();

        assert_eq!(kills(&app), 1);
        let detached = app
            .world()
            .resource::<Events<PawnDetachedEvent>>()
            .iter_current_update_events()
            .count();
        assert_eq!(detached, 1);
    }

    #[test]
    fn clients_ignore_damage() {
        let mut app = test_app(NetMode::Client, None);
        let (character, _) = spawn_target(&mut app, 100.0, 0.0);

        hit(&mut app, character, 50.0, DamageKind::Generic);
        app.update();

        let attributes = app.world().get::<Attributes>(character).unwrap();
        assert_eq!(attributes.health, 100.0);
    }

    #[test]
    fn remaining_damage_knocks_the_character_back() {
        let mut app = test_app(NetMode::Standalone, Some(GameMode::new(StandardRules, 0)));
        let (character, _) = spawn_target(&mut app, 100.0, 100.0);

        // Half of 20 goes into armor, 10 x 1500 / 100 kg = 150 cm/s
        hit(
            &mut app,
            character,
            20.0,
            DamageKind::Point {
                shot_direction: Vec3::X,
                hit_location: Vec3::ZERO,
            },
        );
        app.update();

        let motion = app.world().get::<CharacterMotion>(character).unwrap();
        assert!((motion.velocity.x - 1.5).abs() < 1e-5);
        let attributes = app.world().get::<Attributes>(character).unwrap();
        assert_eq!(attributes.armor, 90.0);
        assert_eq!(attributes.health, 90.0);
    }

    #[test]
    fn suicide_kills_without_a_killer() {
        let mut app = test_app(NetMode::Standalone, Some(GameMode::new(StandardRules, 0)));
        let (character, _) = spawn_target(&mut app, 100.0, 100.0);

        app.world_mut().send_event(SuicideEvent { character });
        app.update();

        let events = app.world().resource::<Events<KilledEvent>>();
        let killed: Vec<_> = events.iter_current_update_events().collect();
        assert_eq!(killed.len(), 1);
        assert_eq!(killed[0].killer, None);
        assert!(app.world().entity(character).contains::<TornOff>());
    }

    #[test]
    fn characters_waiting_for_destruction_ignore_damage() {
        let mut app = test_app(NetMode::Standalone, Some(GameMode::new(StandardRules, 0)));
        let (character, _) = spawn_target(&mut app, 100.0, 0.0);
        app.world_mut()
            .entity_mut(character)
            .insert(LifeSpan::from_secs(5.0));

        hit(&mut app, character, 150.0, DamageKind::Generic);
        app.update();

        assert_eq!(app.world().get::<Attributes>(character).unwrap().health, 100.0);
        assert_eq!(kills(&app), 0);
    }

    fn scoring_app(frag_limit: i32) -> App {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .init_state::<GameState>()
            .insert_resource(GameConfig::default())
            .insert_resource(GameMode::new(StandardRules, frag_limit))
            .init_resource::<Scoreboard>()
            .add_event::<KilledEvent>()
            .add_event::<SystemMessageEvent>()
            .add_systems(Update, score_kills);
        app
    }

    fn system_messages(app: &App) -> Vec<String> {
        app.world()
            .resource::<Events<SystemMessageEvent>>()
            .iter_current_update_events()
            .map(|event| event.message.clone())
            .collect()
    }

    #[test]
    fn reaching_the_frag_limit_ends_the_match() {
        let mut app = scoring_app(1);
        let killer = app.world_mut().spawn(PlayerName("Xan".to_string())).id();
        let victim_controller = app.world_mut().spawn_empty().id();
        let victim = app.world_mut().spawn(PlayerName("Malcolm".to_string())).id();

        app.world_mut().send_event(KilledEvent {
            victim,
            victim_controller: Some(victim_controller),
            killer: Some(killer),
            causer: None,
        });
        app.update();

        assert!(app.world().resource::<GameMode>().match_ended);
        assert!(matches!(
            app.world().resource::<NextState<GameState>>(),
            NextState::Pending(GameState::MatchEnded)
        ));
        assert_eq!(
            system_messages(&app),
            vec!["Xan killed Malcolm".to_string(), "Xan wins the match".to_string()]
        );

        let scoreboard = app.world().resource::<Scoreboard>();
        assert_eq!(scoreboard.get(killer).frags, 1);
        assert_eq!(scoreboard.get(victim_controller).deaths, 1);
    }

    #[test]
    fn dying_without_a_killer_costs_a_frag() {
        let mut app = scoring_app(1);
        let victim_controller = app.world_mut().spawn_empty().id();
        let victim = app.world_mut().spawn(PlayerName("Malcolm".to_string())).id();

        app.world_mut().send_event(KilledEvent {
            victim,
            victim_controller: Some(victim_controller),
            killer: None,
            causer: None,
        });
        app.update();

        let score = app.world().resource::<Scoreboard>().get(victim_controller);
        assert_eq!(score.frags, -1);
        assert_eq!(score.deaths, 1);
        assert!(!app.world().resource::<GameMode>().match_ended);
        assert!(matches!(
            app.world().resource::<NextState<GameState>>(),
            NextState::Unchanged
        ));
        assert_eq!(system_messages(&app), vec!["Malcolm died".to_string()]);
    }
}
