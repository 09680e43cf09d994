//! Powerup drops (Resolution phase)

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;

use crate::ecs::Loot;
use crate::sampler::WeightedSampler;
use crate::sim::blueprint::spawn_powerup;
use crate::world::World;

/// Spread of multi-drop loot around the death position
const DROP_SCATTER: f32 = 24.0;

/// Roll the loot of every entity that died this frame. Kinds come from the
/// precomputed alias table.
pub fn run(world: &mut World, _dt_ms: f32) {
    let drops: Vec<(Vec2, Loot)> = world
        .events()
        .deaths()
        .filter_map(|(id, _, pos, _)| world.get_component::<Loot>(id).map(|l| (pos, *l)))
        .collect();
    if drops.is_empty() {
        return;
    }

    let table = Arc::clone(&world.powerup_table);
    for (pos, loot) in drops {
        for roll in 0..loot.rolls {
            if world.rng.random::<f32>() >= loot.chance {
                continue;
            }
            let kind = *table.sample(&mut world.rng);
            let offset = if loot.rolls > 1 {
                let angle = std::f32::consts::TAU * roll as f32 / loot.rolls as f32;
                crate::direction_from_angle(angle) * DROP_SCATTER
            } else {
                Vec2::ZERO
            };
            spawn_powerup(world, kind, pos + offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::ecs::{EntityKind, PowerupKind};
    use crate::sim::blueprint::{Blueprint, spawn_entity};
    use crate::sim::events::Event;

    fn die(w: &mut World, id: crate::ecs::EntityId) {
        w.emit(Event::Death {
            entity: id,
            kind: EntityKind::Enemy,
            pos: Vec2::new(100.0, 100.0),
            killer: None,
        });
    }

    #[test]
    fn test_guaranteed_rolls_all_drop() {
        let mut w = World::new(GameConfig::default()).unwrap();
        let boss = spawn_entity(&mut w, &Blueprint::Boss("dreadnought".into()), 100.0, 100.0).unwrap();
        die(&mut w, boss);
        run(&mut w, 0.0);
        let rolls = w.config().bosses["dreadnought"].loot_rolls as usize;
        assert_eq!(w.count_kind(EntityKind::Powerup), rolls);
    }

    #[test]
    fn test_no_loot_component_no_drop() {
        let mut w = World::new(GameConfig::default()).unwrap();
        let e = w.create_entity(EntityKind::Enemy);
        die(&mut w, e);
        run(&mut w, 0.0);
        assert_eq!(w.count_kind(EntityKind::Powerup), 0);
    }

    #[test]
    fn test_exhausted_table_drops_fallback() {
        let mut config = GameConfig::default();
        for p in &mut config.powerups {
            p.weight = 0.0;
        }
        let mut w = World::new(config).unwrap();
        let e = w.create_entity(EntityKind::Enemy);
        w.add_component(e, Loot { chance: 1.0, rolls: 1 });
        die(&mut w, e);
        run(&mut w, 0.0);

        let kinds: Vec<_> = w.components().pickups.iter().map(|(_, p)| p.kind).collect();
        assert_eq!(kinds, vec![PowerupKind::ScoreBonus]);
    }
}
