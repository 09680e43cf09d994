//! End of frame (Cleanup phase)
//!
//! Expiry and culling only schedule removal; `remove_dead` then destroys
//! everything scheduled this frame in one pass, and `clear_events` empties
//! the queue. Nothing runs after these two.

use crate::consts::OFFSCREEN_MARGIN;
use crate::ecs::{EntityKind, Transform};
use crate::world::World;

/// Count down lifetimes and schedule the expired
pub fn expire_lifetimes(world: &mut World, dt_ms: f32) {
    let expired: Vec<_> = world
        .components
        .lifetimes
        .iter_mut()
        .filter_map(|(id, life)| {
            life.remaining_ms -= dt_ms;
            (life.remaining_ms <= 0.0).then_some(id)
        })
        .collect();
    for id in expired {
        world.mark_for_deletion(id);
    }
}

/// Schedule bullets, enemies and powerups that left the arena. Culled
/// entities die silently: no `Death`, no score, no loot.
pub fn cull_offscreen(world: &mut World, _dt_ms: f32) {
    let bounds = world.bounds;
    let gone: Vec<_> = world
        .query::<(Transform,)>()
        .filter(|(id, (t,))| {
            let cullable = world.kind_of(*id).is_some_and(|k| {
                k.is_bullet() || matches!(k, EntityKind::Enemy | EntityKind::Powerup)
            });
            cullable && !bounds.contains_with_margin(t.pos, OFFSCREEN_MARGIN)
        })
        .map(|(id, _)| id)
        .collect();
    for id in gone {
        world.mark_for_deletion(id);
    }
}

pub fn remove_dead(world: &mut World, _dt_ms: f32) {
    let removed = world.flush_removals();
    if removed > 0 {
        log::trace!("Cleanup removed {removed} entities");
    }
}

/// The single full clear of the frame
pub fn clear_events(world: &mut World, _dt_ms: f32) {
    world.events.clear();
}
