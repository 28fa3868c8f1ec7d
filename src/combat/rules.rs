//! Game mode: who may die, and who gets the frag.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::core::{DamageKind, MatchRules};

/// Everything the game mode knows about a killing blow.
#[derive(Debug, Clone, Copy)]
pub struct KillContext {
    pub victim: Entity,
    pub victim_controller: Option<Entity>,
    pub killer: Option<Entity>,
    pub causer: Option<Entity>,
    pub kind: DamageKind,
}

/// Authority-side hook consulted before a character dies.
pub trait DeathRules: Send + Sync + 'static {
    /// Return true to keep the victim alive (left at 1 health).
    fn prevent_death(&self, context: &KillContext) -> bool;
}

/// Regular deathmatch: everybody can die.
pub struct StandardRules;

impl DeathRules for StandardRules {
    fn prevent_death(&self, _context: &KillContext) -> bool {
        false
    }
}

/// Practice: lethal hits leave the victim standing.
pub struct PracticeRules;

impl DeathRules for PracticeRules {
    fn prevent_death(&self, _context: &KillContext) -> bool {
        true
    }
}

/// The authoritative game mode. Only exists where the process has authority.
#[derive(Resource)]
pub struct GameMode {
    rules: Box<dyn DeathRules>,
    pub frag_limit: i32,
    pub match_ended: bool,
}

impl GameMode {
    pub fn new(rules: impl DeathRules, frag_limit: i32) -> Self {
        Self {
            rules: Box::new(rules),
            frag_limit,
            match_ended: false,
        }
    }

    pub fn from_rules(rules: &MatchRules) -> Self {
        if rules.prevent_deaths {
            Self::new(PracticeRules, rules.frag_limit)
        } else {
            Self::new(StandardRules, rules.frag_limit)
        }
    }

    pub fn prevent_death(&self, context: &KillContext) -> bool {
        self.rules.prevent_death(context)
    }
}

/// Frags and deaths of one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub frags: i32,
    pub deaths: u32,
}

/// Per-controller scores for the current match.
#[derive(Resource, Debug, Default)]
pub struct Scoreboard {
    pub scores: HashMap<Entity, Score>,
}

impl Scoreboard {
    /// Book a kill. A missing killer, or killing yourself, costs a frag.
    ///
    /// Returns the killer's new frag count when someone else scored.
    pub fn record_kill(&mut self, victim: Option<Entity>, killer: Option<Entity>) -> Option<i32> {
        if let Some(victim) = victim {
            self.scores.entry(victim).or_default().deaths += 1;
        }

        match (killer, victim) {
            (Some(killer), Some(victim)) if killer == victim => {
                self.scores.entry(victim).or_default().frags -= 1;
                None
            }
            (Some(killer), _) => {
                let score = self.scores.entry(killer).or_default();
                score.frags += 1;
                Some(score.frags)
            }
            (None, Some(victim)) => {
                self.scores.entry(victim).or_default().frags -= 1;
                None
            }
            (None, None) => None,
        }
    }

    pub fn get(&self, controller: Entity) -> Score {
        self.scores.get(&controller).copied().unwrap_or_default()
    }

    /// Scores sorted best first.
    pub fn ranking(&self) -> Vec<(Entity, Score)> {
        let mut ranking: Vec<_> = self.scores.iter().map(|(e, s)| (*e, *s)).collect();
        ranking.sort_by(|a, b| b.1.frags.cmp(&a.1.frags).then(a.1.deaths.cmp(&b.1.deaths)));
        ranking
    }

    pub fn clear(&mut self) {
        self.scores.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> KillContext {
        KillContext {
            victim: Entity::from_raw(1),
            victim_controller: None,
            killer: None,
            causer: None,
            kind: DamageKind::Generic,
        }
    }

    #[test]
    fn practice_rules_prevent_every_death() {
        let practice = GameMode::from_rules(&MatchRules {
            prevent_deaths: true,
            ..default()
        });
        let standard = GameMode::from_rules(&MatchRules::default());

        assert!(practice.prevent_death(&context()));
        assert!(!standard.prevent_death(&context()));
    }

    #[test]
    fn kills_and_suicides_are_booked() {
        let alice = Entity::from_raw(10);
        let bob = Entity::from_raw(11);
        let mut scoreboard = Scoreboard::default();

        assert_eq!(scoreboard.record_kill(Some(bob), Some(alice)), Some(1));
        assert_eq!(scoreboard.record_kill(Some(alice), Some(alice)), None);
        assert_eq!(scoreboard.record_kill(Some(bob), None), None);

        assert_eq!(scoreboard.get(alice), Score { frags: 0, deaths: 1 });
        assert_eq!(scoreboard.get(bob), Score { frags: -1, deaths: 2 });
    }

    #[test]
    fn ranking_puts_the_leader_first() {
        let alice = Entity::from_raw(10);
        let bob = Entity::from_raw(11);
        let mut scoreboard = Scoreboard::default();
        scoreboard.record_kill(Some(alice), Some(bob));
        scoreboard.record_kill(Some(alice), Some(bob));

        let ranking = scoreboard.ranking();
        assert_eq!(ranking[0].0, bob);
        assert_eq!(ranking[0].1.frags, 2);
    }
}
