//! Presentation hooks: camera shake, death bursts, audio cues
//!
//! Nothing here feeds back into gameplay. Particle spread uses a hash of the
//! frame number instead of the session RNG so effects never shift spawns or
//! loot.

use glam::Vec2;

use crate::consts::MAX_PARTICLES;
use crate::ecs::{CameraState, EntityKind};
use crate::sim::blueprint::spawn_particle;
use crate::sim::events::{AudioCue, Event};
use crate::world::World;

/// Shake intensity below this snaps to zero
const SHAKE_EPSILON: f32 = 0.01;
/// Largest camera offset at full shake (px)
pub const MAX_SHAKE_OFFSET: f32 = 12.0;

/// Accumulate this frame's shake requests, then decay
pub fn camera(world: &mut World, _dt_ms: f32) {
    let requested: f32 = world
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::CameraShake { intensity } => Some(*intensity),
            _ => None,
        })
        .sum();
    let Some(camera) = world.camera_id else {
        return;
    };
    let frame = world.frame;
    let Some(state) = world.get_component_mut::<CameraState>(camera) else {
        return;
    };

    state.shake = (state.shake + requested).min(1.0);
    let shake = state.shake;
    state.offset = if shake > 0.0 {
        // Cheap deterministic jitter
        let t = frame as f32;
        Vec2::new((t * 12.9898).sin(), (t * 78.233).cos()) * shake * MAX_SHAKE_OFFSET
    } else {
        Vec2::ZERO
    };

    state.shake *= 0.9; // Fast decay
    if state.shake < SHAKE_EPSILON {
        state.shake = 0.0;
    }
}

/// Burst size and palette per kind of death
fn burst_for(kind: EntityKind) -> Option<(usize, u32, AudioCue)> {
    match kind {
        EntityKind::Enemy => Some((12, 0xFF8A3D, AudioCue::Explosion)),
        EntityKind::Boss => Some((40, 0xFFD23D, AudioCue::BigExplosion)),
        EntityKind::Player => Some((24, 0x3DC8FF, AudioCue::BigExplosion)),
        _ => None,
    }
}

/// Death bursts and explosion cues
pub fn effects(world: &mut World, _dt_ms: f32) {
    let deaths: Vec<_> = world.events().deaths().collect();
    let seed = world.frame as u32;

    for (entity, kind, pos, _) in deaths {
        let Some((count, color, cue)) = burst_for(kind) else {
            continue;
        };
        world.emit(Event::Audio { cue });

        let live = world.count_kind(EntityKind::Particle);
        let count = count.min(MAX_PARTICLES.saturating_sub(live));
        for i in 0..count {
            // Deterministic "random" spread using hash
            let hash = seed
                .wrapping_mul(2654435761)
                .wrapping_add(entity.0.wrapping_mul(40503))
                .wrapping_add(i as u32 * 7919);
            let angle = (hash % 1000) as f32 / 1000.0 * std::f32::consts::TAU;
            let speed = 60.0 + (hash / 1000 % 180) as f32;
            let size = 2.0 + (hash / 100_000 % 100) as f32 / 100.0 * 4.0;
            let life_ms = 300.0 + (hash / 10_000 % 500) as f32;
            let velocity = crate::direction_from_angle(angle) * speed;
            spawn_particle(world, pos, velocity, color, size, life_ms);
        }
    }
}
