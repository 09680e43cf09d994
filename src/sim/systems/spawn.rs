//! Spawn economy (State phase)
//!
//! Credits trickle in every frame at the level's base income, modulated by a
//! slow sine "wave" so pressure comes in calm and intense stretches. Every
//! `spawn_interval_ms` of real time a purchase round runs: each attempt draws
//! one pool entry by weight, buys it if affordable and under the live cap, and
//! otherwise ends the round on the spot. The round never falls back to a
//! cheaper entry.

use std::f32::consts::TAU;

use crate::config::{EconomyDef, SpawnEntry};
use crate::ecs::EntityKind;
use crate::sampler::roulette;
use crate::sim::blueprint::{Blueprint, spawn_entity};
use crate::world::World;

/// Horizontal margin kept clear when picking a spawn x
const SPAWN_EDGE_MARGIN: f32 = 24.0;
/// Enemies appear just above the top edge
const SPAWN_Y: f32 = -24.0;

/// Income multiplier at `t_secs`, always within `1 ± amplitude`
pub fn wave_multiplier(economy: &EconomyDef, t_secs: f32) -> f32 {
    let amplitude = economy.wave_amplitude.clamp(0.0, 1.0);
    if economy.wave_period_secs <= 0.0 {
        return 1.0;
    }
    1.0 + amplitude * (TAU * t_secs / economy.wave_period_secs).sin()
}

/// Add this frame's income, clamped at the level cap
pub fn accrue_credits(world: &mut World, dt_ms: f32) {
    let level = world.current_level();
    let (income, cap) = (level.base_income, level.credit_cap);
    let wave = wave_multiplier(&world.config.economy, world.elapsed_secs());
    let gained = income * wave * crate::ms_to_secs(dt_ms);
    world.spawn_credits = (world.spawn_credits + gained.max(0.0)).min(cap);
}

/// Why a purchase round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEnd {
    /// Every attempt bought something
    Completed,
    /// The drawn entry cost more than the credits on hand
    Unaffordable,
    /// Live enemy cap reached
    AtCapacity,
    /// Nothing drawable in the pool
    EmptyPool,
}

/// Run one purchase round. Returns how many enemies were bought and why the
/// round stopped.
pub fn attempt_purchases(world: &mut World) -> (u32, RoundEnd) {
    let config = std::sync::Arc::clone(&world.config);
    let level = world.level.min(config.levels.len().saturating_sub(1));
    let pool: &[SpawnEntry] = &config.levels[level].pool;
    let economy = &config.economy;
    let mut bought = 0;

    for _ in 0..economy.max_purchases {
        let Some(entry) = roulette(pool, |e| e.weight, &mut world.rng) else {
            log::warn!("Spawn pool for '{}' has no usable weight", config.levels[level].name);
            return (bought, RoundEnd::EmptyPool);
        };
        if world.spawn_credits < entry.cost {
            return (bought, RoundEnd::Unaffordable);
        }
        if world.count_kind(EntityKind::Enemy) >= economy.max_live_enemies {
            return (bought, RoundEnd::AtCapacity);
        }

        let x = spawn_x(world);
        match spawn_entity(world, &Blueprint::Enemy(entry.enemy_id.clone()), x, SPAWN_Y) {
            Ok(_) => {
                world.spawn_credits -= entry.cost;
                bought += 1;
            }
            Err(e) => {
                // Validated tables never get here
                log::warn!("Purchase of '{}' failed: {e}", entry.enemy_id);
                return (bought, RoundEnd::EmptyPool);
            }
        }
    }
    (bought, RoundEnd::Completed)
}

fn spawn_x(world: &mut World) -> f32 {
    use rand::Rng;
    let b = world.bounds;
    let lo = b.min.x + SPAWN_EDGE_MARGIN;
    let hi = b.max.x - SPAWN_EDGE_MARGIN;
    if hi <= lo {
        return b.center().x;
    }
    world.rng.random_range(lo..hi)
}

/// Accrue credits every frame; run a purchase round whenever the real-time
/// interval elapses
pub fn run(world: &mut World, dt_ms: f32) {
    accrue_credits(world, dt_ms);

    world.spawn_timer_ms += world.real_dt_ms;
    let interval = world.config.economy.spawn_interval_ms;
    if world.spawn_timer_ms < interval {
        return;
    }
    // One round per frame at most, even after a long stall
    world.spawn_timer_ms %= interval;

    let (bought, end) = attempt_purchases(world);
    if bought > 0 {
        log::debug!(
            "Purchase round: {bought} bought ({end:?}), {:.1} credits left",
            world.spawn_credits
        );
    }
}
