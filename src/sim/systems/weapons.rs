//! Weapon fire (Decision phase, after input and AI have set triggers)

use std::f32::consts::TAU;

use glam::Vec2;

use crate::ecs::{Buff, BuffKind, EntityId, EntityKind, FirePattern, Transform, Weapon};
use crate::sim::blueprint::spawn_bullet;
use crate::sim::events::{AudioCue, Event};
use crate::world::World;

/// Cooldown multiplier while RapidFire is active
pub const RAPID_FIRE_FACTOR: f32 = 0.5;
/// Pattern a forward gun becomes under SpreadShot
pub const SPREAD_SHOT: FirePattern = FirePattern::Spread {
    count: 3,
    arc_deg: 24.0,
};

/// Unit directions of one volley
pub fn volley_directions(pattern: FirePattern, base: Vec2, aim: Option<Vec2>) -> Vec<Vec2> {
    let base_angle = crate::angle_of(base);
    match pattern {
        FirePattern::Forward => vec![base],
        FirePattern::Aimed => vec![aim.and_then(|a| a.try_normalize()).unwrap_or(base)],
        FirePattern::Spread { count, arc_deg } => {
            if count <= 1 {
                return vec![base];
            }
            let arc = arc_deg.to_radians();
            let step = arc / (count - 1) as f32;
            (0..count)
                .map(|i| crate::direction_from_angle(base_angle - arc * 0.5 + step * i as f32))
                .collect()
        }
        FirePattern::Radial { count } => {
            let step = TAU / count.max(1) as f32;
            (0..count.max(1))
                .map(|i| crate::direction_from_angle(base_angle + step * i as f32))
                .collect()
        }
    }
}

pub fn run(world: &mut World, dt_ms: f32) {
    let player_pos = world.player_pos();

    for id in world.query_ids::<(Transform, Weapon)>() {
        if !world.is_active(id) {
            continue;
        }
        let (rapid, spread) = world
            .get_component::<Buff>(id)
            .map(|b| (b.has(BuffKind::RapidFire), b.has(BuffKind::SpreadShot)))
            .unwrap_or((false, false));

        let Some(weapon) = world.get_component_mut::<Weapon>(id) else {
            continue;
        };
        weapon.timer_ms = (weapon.timer_ms - dt_ms).max(0.0);
        if !weapon.trigger || weapon.timer_ms > 0.0 {
            continue;
        }
        weapon.timer_ms = if rapid {
            weapon.cooldown_ms * RAPID_FIRE_FACTOR
        } else {
            weapon.cooldown_ms
        };
        let weapon = weapon.clone();

        let pattern = match weapon.pattern {
            FirePattern::Forward if spread => SPREAD_SHOT,
            other => other,
        };
        let Some(pos) = world.get_component::<Transform>(id).map(|t| t.pos) else {
            continue;
        };
        fire(world, id, pos, &weapon, pattern, player_pos.map(|p| p - pos));
    }
}

fn fire(world: &mut World, shooter: EntityId, pos: Vec2, weapon: &Weapon, pattern: FirePattern, aim: Option<Vec2>) {
    let from_player = world.kind_of(shooter) == Some(EntityKind::Player);
    let kind = if from_player {
        EntityKind::PlayerBullet
    } else {
        EntityKind::EnemyBullet
    };

    let directions = volley_directions(pattern, weapon.direction, aim);
    for dir in &directions {
        spawn_bullet(
            world,
            kind,
            pos,
            *dir * weapon.bullet_speed,
            weapon.damage,
            weapon.bullet_radius,
        );
    }

    world.emit(Event::WeaponFired {
        shooter,
        pos,
        bullets: directions.len() as u32,
    });
    world.emit(Event::Audio {
        cue: if from_player {
            AudioCue::PlayerShot
        } else {
            AudioCue::EnemyShot
        },
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::ecs::Velocity;

    fn armed_world() -> (World, EntityId) {
        let mut w = World::new(GameConfig::default()).unwrap();
        let player = w.player_id.unwrap();
        if let Some(weapon) = w.get_component_mut::<Weapon>(player) {
            weapon.trigger = true;
        }
        (w, player)
    }

    fn fired(w: &World) -> Vec<u32> {
        w.events()
            .iter()
            .filter_map(|e| match e {
                Event::WeaponFired { bullets, .. } => Some(*bullets),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_spread_is_symmetric() {
        let dirs = volley_directions(
            FirePattern::Spread {
                count: 3,
                arc_deg: 90.0,
            },
            Vec2::NEG_Y,
            None,
        );
        assert_eq!(dirs.len(), 3);
        assert!(dirs[1].abs_diff_eq(Vec2::NEG_Y, 1e-5));
        assert!((dirs[0].x + dirs[2].x).abs() < 1e-5);
    }

    #[test]
    fn test_radial_covers_circle() {
        let dirs = volley_directions(FirePattern::Radial { count: 4 }, Vec2::X, None);
        let sum: Vec2 = dirs.iter().copied().sum();
        assert!(sum.length() < 1e-4);
    }

    #[test]
    fn test_aimed_falls_back_to_base() {
        let dirs = volley_directions(FirePattern::Aimed, Vec2::Y, None);
        assert_eq!(dirs, vec![Vec2::Y]);
        let dirs = volley_directions(FirePattern::Aimed, Vec2::Y, Some(Vec2::new(3.0, 0.0)));
        assert!(dirs[0].abs_diff_eq(Vec2::X, 1e-6));
    }

    #[test]
    fn test_cooldown_gates_fire() {
        let (mut w, _) = armed_world();
        run(&mut w, 1.0);
        assert_eq!(fired(&w), vec![1]);
        assert_eq!(w.count_kind(EntityKind::PlayerBullet), 1);

        // Still cooling down
        run(&mut w, 1.0);
        assert_eq!(fired(&w).len(), 1);

        let cooldown = w.config().player.weapon.cooldown_ms;
        run(&mut w, cooldown);
        assert_eq!(fired(&w).len(), 2);
    }

    #[test]
    fn test_player_bullets_go_up() {
        let (mut w, _) = armed_world();
        run(&mut w, 1.0);
        let (_, (vel,)) = w.query::<(Velocity,)>().last().unwrap();
        assert!(vel.0.y < 0.0);
    }

    #[test]
    fn test_buffs_change_volley() {
        let (mut w, player) = armed_world();
        if let Some(buff) = w.get_component_mut::<Buff>(player) {
            buff.grant(BuffKind::SpreadShot, 1000.0);
            buff.grant(BuffKind::RapidFire, 1000.0);
        }
        run(&mut w, 1.0);
        assert_eq!(fired(&w), vec![3]);
        let weapon = w.get_component::<Weapon>(player).unwrap();
        assert_eq!(weapon.timer_ms, weapon.cooldown_ms * RAPID_FIRE_FACTOR);
    }

    #[test]
    fn test_released_trigger_does_not_fire() {
        let (mut w, player) = armed_world();
        if let Some(weapon) = w.get_component_mut::<Weapon>(player) {
            weapon.trigger = false;
        }
        run(&mut w, 500.0);
        assert!(fired(&w).is_empty());
    }
}
