//! Timed effects (State phase)

use crate::ecs::{ActiveBuff, Buff, EntityId, Invincibility};
use crate::world::World;

/// Count down buffs and invincibility windows, and end slow motion.
pub fn run(world: &mut World, dt_ms: f32) {
    for (_, buff) in world.components.buffs.iter_mut() {
        buff.tick(dt_ms);
    }

    let expired: Vec<_> = world
        .components
        .invincibilities
        .iter_mut()
        .filter_map(|(id, inv)| {
            inv.remaining_ms -= dt_ms;
            (!inv.is_active()).then_some(id)
        })
        .collect();
    for id in expired {
        world.remove_component::<Invincibility>(id);
    }

    // Slow motion is measured in real time so its length doesn't stretch
    if world.slowmo_ms > 0.0 {
        world.slowmo_ms -= world.real_dt_ms;
        if world.slowmo_ms <= 0.0 {
            world.slowmo_ms = 0.0;
            world.time_scale = 1.0;
            log::debug!("Slow motion over");
        }
    }
}

/// Grant or extend invincibility on `id`
pub fn grant_invincibility(world: &mut World, id: EntityId, duration_ms: f32) {
    match world.get_component_mut::<Invincibility>(id) {
        Some(inv) => inv.remaining_ms = inv.remaining_ms.max(duration_ms),
        None => {
            world.add_component(
                id,
                Invincibility {
                    remaining_ms: duration_ms,
                },
            );
        }
    }
}

/// Whether `id` currently ignores damage
pub fn is_invincible(world: &World, id: EntityId) -> bool {
    world
        .get_component::<Invincibility>(id)
        .is_some_and(|inv| inv.is_active())
}

/// Active buffs on `id`, for the snapshot
pub fn active_buffs(world: &World, id: EntityId) -> Vec<ActiveBuff> {
    world
        .get_component::<Buff>(id)
        .map(|b| b.active.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::ecs::BuffKind;

    #[test]
    fn test_spawn_invincibility_runs_out() {
        let mut w = World::new(GameConfig::default()).unwrap();
        let player = w.player_id.unwrap();
        assert!(is_invincible(&w, player));

        let window = w.config().player.spawn_invincibility_ms;
        run(&mut w, window - 1.0);
        assert!(is_invincible(&w, player));
        run(&mut w, 2.0);
        assert!(!is_invincible(&w, player));
        assert!(!w.has_component::<Invincibility>(player));
    }

    #[test]
    fn test_grant_extends_but_never_shortens() {
        let mut w = World::new(GameConfig::default()).unwrap();
        let player = w.player_id.unwrap();
        grant_invincibility(&mut w, player, 5000.0);
        grant_invincibility(&mut w, player, 100.0);
        assert_eq!(
            w.get_component::<Invincibility>(player).map(|i| i.remaining_ms),
            Some(5000.0)
        );
    }

    #[test]
    fn test_buffs_tick_down() {
        let mut w = World::new(GameConfig::default()).unwrap();
        let player = w.player_id.unwrap();
        if let Some(b) = w.get_component_mut::<Buff>(player) {
            b.grant(BuffKind::RapidFire, 100.0);
        }
        run(&mut w, 60.0);
        assert_eq!(active_buffs(&w, player).len(), 1);
        run(&mut w, 60.0);
        assert!(active_buffs(&w, player).is_empty());
    }

    #[test]
    fn test_slowmo_ends_on_real_time() {
        let mut w = World::new(GameConfig::default()).unwrap();
        w.time_scale = 0.25;
        w.slowmo_ms = 100.0;
        w.real_dt_ms = 60.0;
        run(&mut w, 15.0);
        assert_eq!(w.time_scale, 0.25);
        run(&mut w, 15.0);
        assert_eq!(w.time_scale, 1.0);
        assert_eq!(w.slowmo_ms, 0.0);
    }
}
