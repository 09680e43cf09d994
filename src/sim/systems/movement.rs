//! Integration (Physics phase)

use crate::ecs::{Collider, Transform, Velocity};
use crate::world::World;

/// Explicit Euler step for every moving entity, then keep the player inside
/// the arena (its hitbox may touch the edge but not cross it).
pub fn run(world: &mut World, dt_ms: f32) {
    let dt_secs = crate::ms_to_secs(dt_ms);

    for id in world.query_ids::<(Transform, Velocity)>() {
        let Some(vel) = world.get_component::<Velocity>(id).map(|v| v.0) else {
            continue;
        };
        if let Some(t) = world.get_component_mut::<Transform>(id) {
            t.pos += vel * dt_secs;
        }
    }

    let Some(player) = world.player_id else {
        return;
    };
    let inset = world
        .get_component::<Collider>(player)
        .map(|c| c.shape.shrunk(c.shrink).bounding_radius())
        .unwrap_or(0.0);
    let bounds = world.bounds;
    if let Some(t) = world.get_component_mut::<Transform>(player) {
        let lo = bounds.min + inset;
        let hi = (bounds.max - inset).max(lo);
        t.pos = t.pos.clamp(lo, hi);
    }
}
