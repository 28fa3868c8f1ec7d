//! Delayed destruction.

use bevy::prelude::*;

/// Despawns the entity once the timer runs out.
#[derive(Component, Debug)]
pub struct LifeSpan(pub Timer);

impl LifeSpan {
    pub fn from_secs(seconds: f32) -> Self {
        Self(Timer::from_seconds(seconds, TimerMode::Once))
    }
}

/// Tick every life span and despawn the expired entities.
pub fn tick_life_spans(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut LifeSpan)>,
) {
    for (entity, mut life_span) in query.iter_mut() {
        life_span.0.tick(time.delta());

        if life_span.0.finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn expired_entities_are_despawned() {
        let mut app = App::new();
        app.init_resource::<Time>()
            .add_systems(Update, tick_life_spans);

        let short = app.world_mut().spawn(LifeSpan::from_secs(0.2)).id();
        let long = app.world_mut().spawn(LifeSpan::from_secs(5.0)).id();

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(250));
        app.update();

        assert!(app.world().get_entity(short).is_err());
        assert!(app.world().get_entity(long).is_ok());
    }
}
