//! Kill chains and scoring
//!
//! `decay` runs in State and breaks the chain once the window lapses;
//! `award` runs in Resolution, reading this frame's deaths.

use crate::ecs::ScoreValue;
use crate::sim::events::Event;
use crate::world::{ComboState, World};

/// Multiplier for a chain of `count` kills
pub fn multiplier_for(world: &World, count: u32) -> f32 {
    let c = &world.config.combo;
    (1.0 + c.step * count as f32).min(c.max_multiplier).max(1.0)
}

pub fn decay(world: &mut World, dt_ms: f32) {
    if world.combo.count == 0 {
        return;
    }
    world.combo.timer_ms -= dt_ms;
    if world.combo.timer_ms <= 0.0 {
        log::debug!("Combo of {} dropped", world.combo.count);
        world.combo = ComboState::default();
        world.emit(Event::Combo {
            count: 0,
            multiplier: 1.0,
        });
    }
}

/// Score every hostile ship that died this frame, extending the chain
pub fn award(world: &mut World, _dt_ms: f32) {
    let kills: Vec<_> = world
        .events()
        .deaths()
        .filter(|(_, kind, _, _)| kind.is_hostile_ship())
        .map(|(id, _, _, _)| id)
        .collect();
    if kills.is_empty() {
        return;
    }

    let window = world.config.combo.window_ms;
    for id in kills {
        let base = world.get_component::<ScoreValue>(id).map(|s| s.0).unwrap_or(0);
        world.combo.count += 1;
        world.combo.timer_ms = window;
        world.combo.multiplier = multiplier_for(world, world.combo.count);
        let points = (base as f64 * world.combo.multiplier as f64).round() as u64;
        world.score = world.score.saturating_add(points);
    }

    world.emit(Event::Combo {
        count: world.combo.count,
        multiplier: world.combo.multiplier,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::ecs::{EntityId, EntityKind};
    use crate::sim::blueprint::{Blueprint, spawn_entity};
    use glam::Vec2;

    fn kill(w: &mut World, id: EntityId) {
        w.emit(Event::Death {
            entity: id,
            kind: EntityKind::Enemy,
            pos: Vec2::ZERO,
            killer: None,
        });
    }

    #[test]
    fn test_chain_raises_multiplier() {
        let mut w = World::new(GameConfig::default()).unwrap();
        let a = spawn_entity(&mut w, &Blueprint::Enemy("drone".into()), 0.0, 0.0).unwrap();
        let b = spawn_entity(&mut w, &Blueprint::Enemy("drone".into()), 0.0, 0.0).unwrap();

        kill(&mut w, a);
        award(&mut w, 0.0);
        let first = w.score;
        assert_eq!(w.combo.count, 1);
        assert_eq!(first, 110);

        w.events.clear();
        kill(&mut w, b);
        award(&mut w, 0.0);
        assert_eq!(w.combo.count, 2);
        assert_eq!(w.score - first, 120);
    }

    #[test]
    fn test_multiplier_caps() {
        let w = World::new(GameConfig::default()).unwrap();
        assert_eq!(multiplier_for(&w, 1000), w.config().combo.max_multiplier);
        assert_eq!(multiplier_for(&w, 0), 1.0);
    }

    #[test]
    fn test_chain_breaks_after_window() {
        let mut w = World::new(GameConfig::default()).unwrap();
        let a = spawn_entity(&mut w, &Blueprint::Enemy("drone".into()), 0.0, 0.0).unwrap();
        kill(&mut w, a);
        award(&mut w, 0.0);
        w.events.clear();

        let window = w.config().combo.window_ms;
        decay(&mut w, window - 1.0);
        assert_eq!(w.combo.count, 1);
        decay(&mut w, 2.0);
        assert_eq!(w.combo, ComboState::default());
        assert!(w.events().iter().any(|e| matches!(e, Event::Combo { count: 0, .. })));
    }

    #[test]
    fn test_player_death_scores_nothing() {
        let mut w = World::new(GameConfig::default()).unwrap();
        let player = w.player_id.unwrap();
        w.emit(Event::Death {
            entity: player,
            kind: EntityKind::Player,
            pos: Vec2::ZERO,
            killer: None,
        });
        award(&mut w, 0.0);
        assert_eq!(w.score, 0);
        assert_eq!(w.combo.count, 0);
    }
}
