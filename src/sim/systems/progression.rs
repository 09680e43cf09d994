//! Level clock, difficulty and level transitions (State phase)

use crate::ecs::EntityKind;
use crate::sim::blueprint::{Blueprint, spawn_entity};
use crate::sim::events::{AudioCue, Event};
use crate::world::World;

/// Boss entry point above the top edge
const BOSS_ENTRY_Y: f32 = -60.0;

/// Difficulty for a level index after `elapsed_ms` of play
pub fn difficulty_at(world: &World, level: usize, elapsed_ms: f32) -> f32 {
    let d = &world.config.difficulty;
    let minutes = elapsed_ms / 60_000.0;
    (1.0 + d.per_level * level as f32 + d.per_minute * minutes).min(d.max.max(1.0))
}

pub fn run(world: &mut World, dt_ms: f32) {
    world.elapsed_ms += dt_ms;
    world.level_elapsed_ms += dt_ms;
    world.difficulty = difficulty_at(world, world.level, world.elapsed_ms);

    let level = world.current_level().clone();

    if !world.boss_spawned && world.level_elapsed_ms >= level.boss_after_secs * 1000.0 {
        world.boss_spawned = true;
        let x = world.bounds.center().x;
        match spawn_entity(world, &Blueprint::Boss(level.boss_id.clone()), x, BOSS_ENTRY_Y) {
            Ok(_) => {
                world.emit(Event::Audio {
                    cue: AudioCue::BossWarning,
                });
                world.emit(Event::CameraShake { intensity: 0.4 });
            }
            Err(e) => log::warn!("Boss spawn for level '{}' failed: {e}", level.name),
        }
    }

    // Only a threshold crossed during this level counts
    if let Some(target) = level.score_to_advance {
        if world.level_start_score < target && world.score >= target && world.boss_id.is_none() {
            log::info!("Score {} reached {target}, skipping ahead", world.score);
            advance_level(world);
        }
    }
}

/// Move to the next level: reset the level clock and the spawn economy to the
/// new level's values. The last level repeats.
pub fn advance_level(world: &mut World) {
    let last = world.config.levels.len().saturating_sub(1);
    let next = (world.level + 1).min(last);
    world.level = next;
    world.level_start_score = world.score;
    world.level_elapsed_ms = 0.0;
    world.boss_spawned = false;
    world.spawn_timer_ms = 0.0;
    world.spawn_credits = world.current_level().starting_credits;
    world.difficulty = difficulty_at(world, world.level, world.elapsed_ms);

    world.emit(Event::Audio {
        cue: AudioCue::LevelUp,
    });
    log::info!(
        "Level {} '{}' (difficulty {:.2}, {} enemies live)",
        world.level + 1,
        world.current_level().name,
        world.difficulty,
        world.count_kind(EntityKind::Enemy)
    );
}
