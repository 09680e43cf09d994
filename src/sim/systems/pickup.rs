//! Powerup collection (Resolution phase)
//!
//! `collect` turns player/powerup contacts into `Pickup` events; `apply`
//! consumes those events and grants the effect.

use crate::ecs::{Buff, BuffKind, EntityId, EntityKind, Health, PickupItem, PowerupKind, Shield};
use crate::sim::events::{AudioCue, Event};
use crate::sim::systems::buffs::grant_invincibility;
use crate::world::World;

/// Share of max HP restored by a Heal pickup
pub const HEAL_FRACTION: f32 = 0.3;
/// Flat points for a ScoreBonus pickup
pub const SCORE_BONUS: u64 = 500;

pub fn collect(world: &mut World, _dt_ms: f32) {
    let contacts: Vec<(EntityId, EntityId)> = world
        .events()
        .collisions()
        .map(|(_, owner, victim, _)| (owner, victim))
        .collect();

    for (item, collector) in contacts {
        if world.kind_of(item) != Some(EntityKind::Powerup) || world.kind_of(collector) != Some(EntityKind::Player) {
            continue;
        }
        // One pickup per item, even if two contacts were recorded
        if !world.is_active(item) || !world.is_active(collector) {
            continue;
        }
        let Some(pickup) = world.get_component::<PickupItem>(item).copied() else {
            continue;
        };
        world.mark_for_deletion(item);
        world.emit(Event::Pickup {
            collector,
            item,
            kind: pickup.kind,
        });
    }
}

pub fn apply(world: &mut World, _dt_ms: f32) {
    let pickups: Vec<_> = world.events().pickups().collect();

    for (collector, item, kind) in pickups {
        let duration = world
            .get_component::<PickupItem>(item)
            .map(|p| p.duration_ms)
            .unwrap_or_else(|| world.config.powerup_duration(kind));

        match kind {
            PowerupKind::RapidFire | PowerupKind::SpreadShot => {
                let buff_kind = if kind == PowerupKind::RapidFire {
                    BuffKind::RapidFire
                } else {
                    BuffKind::SpreadShot
                };
                match world.get_component_mut::<Buff>(collector) {
                    Some(buff) => buff.grant(buff_kind, duration),
                    None => {
                        let mut buff = Buff::default();
                        buff.grant(buff_kind, duration);
                        world.add_component(collector, buff);
                    }
                }
            }
            PowerupKind::ShieldRecharge => {
                if let Some(shield) = world.get_component_mut::<Shield>(collector) {
                    shield.value = shield.capacity;
                }
            }
            PowerupKind::Invincibility => grant_invincibility(world, collector, duration),
            PowerupKind::Heal => {
                if let Some(health) = world.get_component_mut::<Health>(collector) {
                    let amount = health.max * HEAL_FRACTION;
                    health.heal(amount);
                }
            }
            PowerupKind::ScoreBonus => world.score = world.score.saturating_add(SCORE_BONUS),
        }

        world.emit(Event::Audio {
            cue: AudioCue::Pickup,
        });
        log::debug!("{collector} picked up {kind:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::blueprint::{Blueprint, spawn_entity};
    use glam::Vec2;

    fn touch(w: &mut World, kind: PowerupKind) -> EntityId {
        let player = w.player_id.unwrap();
        let item = spawn_entity(w, &Blueprint::Powerup(kind), 0.0, 0.0).unwrap();
        // Both directions, as the collision system records them
        w.emit(Event::Collision {
            pos: Vec2::ZERO,
            owner: player,
            victim: item,
            damage: 40.0,
        });
        w.emit(Event::Collision {
            pos: Vec2::ZERO,
            owner: item,
            victim: player,
            damage: 0.0,
        });
        item
    }

    #[test]
    fn test_pickup_emits_once_and_removes_item() {
        let mut w = World::new(GameConfig::default()).unwrap();
        let item = touch(&mut w, PowerupKind::ScoreBonus);
        collect(&mut w, 0.0);
        collect(&mut w, 0.0);
        assert_eq!(w.events().pickups().count(), 1);
        assert!(w.is_pending_removal(item));

        apply(&mut w, 0.0);
        assert_eq!(w.score, SCORE_BONUS);
    }

    #[test]
    fn test_timed_buff_granted() {
        let mut w = World::new(GameConfig::default()).unwrap();
        let player = w.player_id.unwrap();
        touch(&mut w, PowerupKind::SpreadShot);
        collect(&mut w, 0.0);
        apply(&mut w, 0.0);
        assert!(w.get_component::<Buff>(player).unwrap().has(BuffKind::SpreadShot));
    }

    #[test]
    fn test_restoratives() {
        let mut w = World::new(GameConfig::default()).unwrap();
        let player = w.player_id.unwrap();
        if let Some(h) = w.get_component_mut::<Health>(player) {
            h.hp = 10.0;
        }
        if let Some(s) = w.get_component_mut::<Shield>(player) {
            s.value = 0.0;
        }
        touch(&mut w, PowerupKind::Heal);
        touch(&mut w, PowerupKind::ShieldRecharge);
        collect(&mut w, 0.0);
        apply(&mut w, 0.0);

        let health = w.get_component::<Health>(player).unwrap();
        assert_eq!(health.hp, 10.0 + health.max * HEAL_FRACTION);
        let shield = w.get_component::<Shield>(player).unwrap();
        assert_eq!(shield.value, shield.capacity);
    }
}
