//! Practice targets standing on free player starts.

use bevy::prelude::*;

use crate::core::GameConfig;
use crate::player::{spawn_character, CharacterAssets, CharacterSpawn};

/// Starts used by practice targets. One start always stays free for players.
pub fn practice_target_starts(starts: &[Transform], targets: u32) -> &[Transform] {
    let count = (targets as usize).min(starts.len().saturating_sub(1));
    &starts[starts.len() - count..]
}

/// Spawn unpossessed characters to shoot at.
pub fn spawn_practice_targets(
    commands: &mut Commands,
    config: &GameConfig,
    assets: Option<&CharacterAssets>,
    starts: &[Transform],
) {
    for (index, start) in practice_target_starts(starts, config.rules.practice_targets)
        .iter()
        .enumerate()
    {
        spawn_character(
            commands,
            config,
            assets,
            CharacterSpawn {
                position: start.translation,
                yaw: start.rotation.to_euler(EulerRot::YXZ).0,
                name: format!("Target {}", index + 1),
                controller: None,
                local: false,
            },
        );
    }
}
