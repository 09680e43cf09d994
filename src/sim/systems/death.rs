//! Consequences of deaths for the session (Resolution phase)

use crate::ecs::EntityKind;
use crate::sim::events::{AudioCue, Event};
use crate::sim::systems::progression::advance_level;
use crate::world::World;

pub fn run(world: &mut World, _dt_ms: f32) {
    let deaths: Vec<_> = world.events().deaths().collect();

    for (entity, kind, _, killer) in deaths {
        match kind {
            EntityKind::Player => {
                if !world.game_over {
                    world.game_over = true;
                    world.emit(Event::Audio {
                        cue: AudioCue::GameOver,
                    });
                    log::info!(
                        "Game over: score {}, level {}, {:.1}s",
                        world.score,
                        world.level + 1,
                        world.elapsed_secs()
                    );
                }
            }
            EntityKind::Boss => {
                let config = &world.config;
                world.time_scale = config.boss_slowmo_scale.clamp(0.05, 1.0);
                world.slowmo_ms = config.boss_slowmo_ms.max(0.0);
                world.emit(Event::CameraShake { intensity: 1.0 });
                log::info!("Boss {entity} defeated by {killer:?}");
                advance_level(world);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::blueprint::{Blueprint, spawn_entity};
    use glam::Vec2;

    #[test]
    fn test_player_death_ends_game() {
        let mut w = World::new(GameConfig::default()).unwrap();
        let player = w.player_id.unwrap();
        w.emit(Event::Death {
            entity: player,
            kind: EntityKind::Player,
            pos: Vec2::ZERO,
            killer: None,
        });
        run(&mut w, 0.0);
        assert!(w.game_over);
        assert!(
            w.events()
                .iter()
                .any(|e| matches!(e, Event::Audio { cue: AudioCue::GameOver }))
        );
    }

    #[test]
    fn test_boss_death_advances_and_slows_time() {
        let mut w = World::new(GameConfig::default()).unwrap();
        let boss = spawn_entity(&mut w, &Blueprint::Boss("dreadnought".into()), 100.0, 100.0).unwrap();
        w.boss_spawned = true;
        w.emit(Event::Death {
            entity: boss,
            kind: EntityKind::Boss,
            pos: Vec2::ZERO,
            killer: None,
        });
        run(&mut w, 0.0);
        assert_eq!(w.level, 1);
        assert!(!w.boss_spawned);
        assert_eq!(w.time_scale, w.config().boss_slowmo_scale);
        assert!(w.slowmo_ms > 0.0);
    }
}
