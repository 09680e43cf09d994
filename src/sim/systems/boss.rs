//! Boss movement (Decision) and phase transitions (Resolution)

use glam::Vec2;

use crate::ecs::{BossState, Health, Transform, Velocity, Weapon};
use crate::sim::blueprint::weapon_from_def;
use crate::sim::events::{AudioCue, Event};
use crate::world::World;

/// Line the boss descends to before it starts sweeping
pub const BOSS_HOLD_Y: f32 = 120.0;
/// Sideways sweep frequency (rad/s)
const SWEEP_RATE: f32 = 0.8;
/// Shake on every phase change
const PHASE_SHAKE: f32 = 0.6;

/// Enter from the top, then sweep side to side keeping inside the arena
pub fn steer(world: &mut World, dt_ms: f32) {
    let Some(boss) = world.boss_id.filter(|id| world.is_active(*id)) else {
        return;
    };
    let dt_secs = crate::ms_to_secs(dt_ms);
    let bounds = world.bounds;
    let has_player = world.player_id.is_some();

    let Some(state) = world.get_component_mut::<BossState>(boss) else {
        return;
    };
    state.age_secs += dt_secs;
    let (age, speed) = (state.age_secs, state.speed);

    let Some(pos) = world.get_component::<Transform>(boss).map(|t| t.pos) else {
        return;
    };
    let velocity = if pos.y < BOSS_HOLD_Y {
        Vec2::new(0.0, speed)
    } else {
        let margin = bounds.width() * 0.15;
        let mut vx = speed * (age * SWEEP_RATE).cos();
        // Turn back at the edges regardless of the sweep phase
        if pos.x < bounds.min.x + margin {
            vx = vx.abs();
        } else if pos.x > bounds.max.x - margin {
            vx = -vx.abs();
        }
        Vec2::new(vx, 0.0)
    };

    if let Some(vel) = world.get_component_mut::<Velocity>(boss) {
        vel.0 = velocity;
    }
    if let Some(weapon) = world.get_component_mut::<Weapon>(boss) {
        weapon.trigger = has_player && pos.y >= bounds.min.y;
    }
}

/// Advance the boss phase when HP crosses the next threshold, swapping in the
/// phase weapon. A big hit can skip phases; every crossed phase is announced.
pub fn phases(world: &mut World, _dt_ms: f32) {
    let Some(boss) = world.boss_id.filter(|id| world.is_active(*id)) else {
        return;
    };
    let Some(fraction) = world.get_component::<Health>(boss).map(|h| h.fraction()) else {
        return;
    };
    let Some(state) = world.get_component::<BossState>(boss) else {
        return;
    };
    let boss_key = state.boss_id.clone();
    let start = state.phase;
    let mut phase = start;
    while let Some(threshold) = state.thresholds.get(phase) {
        if fraction > *threshold {
            break;
        }
        phase += 1;
    }
    if phase == start {
        return;
    }

    let config = std::sync::Arc::clone(&world.config);
    let weapon_def = config
        .bosses
        .get(&boss_key)
        .and_then(|def| def.phases.get(phase - 1))
        .map(|p| &p.weapon);

    if let Some(state) = world.get_component_mut::<BossState>(boss) {
        state.phase = phase;
    }
    if let Some(def) = weapon_def {
        let trigger = world.get_component::<Weapon>(boss).is_some_and(|w| w.trigger);
        let mut weapon = weapon_from_def(def, Vec2::Y);
        weapon.trigger = trigger;
        world.add_component(boss, weapon);
    }

    for reached in start + 1..=phase {
        world.emit(Event::BossPhaseChange {
            boss,
            phase: reached,
        });
    }
    world.emit(Event::CameraShake {
        intensity: PHASE_SHAKE,
    });
    world.emit(Event::Audio {
        cue: AudioCue::BossPhase,
    });
    log::info!("Boss {boss} entered phase {phase} at {:.0}% hp", fraction * 100.0);
}
