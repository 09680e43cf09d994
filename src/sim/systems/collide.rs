//! Collision detection (Interaction phase)
//!
//! Every active collider is tested against every other once, after the layer
//! matrix has had a chance to reject the pair. An overlapping pair produces
//! two `Collision` events, one per direction, each carrying the damage the
//! owner deals on contact.

use glam::Vec2;

use crate::ecs::{Collider, EntityId, Transform};
use crate::sim::collision::shapes_overlap;
use crate::sim::events::Event;
use crate::world::World;

/// A collider positioned for this frame
#[derive(Debug, Clone, Copy)]
struct Body {
    id: EntityId,
    pos: Vec2,
    collider: Collider,
}

/// Overlapping pairs in `(lower id, higher id)` order, with contact points
pub fn overlapping_pairs(world: &World) -> Vec<(EntityId, EntityId, Vec2)> {
    let bodies: Vec<Body> = world
        .query::<(Transform, Collider)>()
        .filter(|(id, _)| world.is_active(*id))
        .map(|(id, (t, c))| Body {
            id,
            pos: t.pos,
            collider: *c,
        })
        .collect();

    // TODO: replace the all-pairs scan with a uniform grid broad-phase once
    // bullet counts make this show up in profiles
    let mut pairs = Vec::new();
    for (i, a) in bodies.iter().enumerate() {
        for b in &bodies[i + 1..] {
            if !world.layers.can_collide(a.collider.layer, b.collider.layer) {
                continue;
            }
            let hit = shapes_overlap(
                a.pos,
                a.collider.shape.shrunk(a.collider.shrink),
                b.pos,
                b.collider.shape.shrunk(b.collider.shrink),
            );
            if hit.hit {
                pairs.push((a.id, b.id, hit.point));
            }
        }
    }
    pairs
}

pub fn run(world: &mut World, _dt_ms: f32) {
    for (a, b, point) in overlapping_pairs(world) {
        let damage_of = |id| {
            world
                .get_component::<Collider>(id)
                .map(|c| c.contact_damage)
                .unwrap_or(0.0)
        };
        let (a_damage, b_damage) = (damage_of(a), damage_of(b));

        world.emit(Event::Collision {
            pos: point,
            owner: a,
            victim: b,
            damage: a_damage,
        });
        world.emit(Event::Collision {
            pos: point,
            owner: b,
            victim: a,
            damage: b_damage,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::ecs::EntityKind;
    use crate::sim::collision::{CollisionLayer, Shape};

    fn body(w: &mut World, kind: EntityKind, layer: CollisionLayer, pos: Vec2, damage: f32) -> EntityId {
        let id = w.create_entity(kind);
        w.add_component(id, Transform::at(pos.x, pos.y));
        w.add_component(
            id,
            Collider {
                shape: Shape::Circle { radius: 10.0 },
                layer,
                shrink: 1.0,
                contact_damage: damage,
            },
        );
        id
    }

    fn empty_world() -> World {
        let mut w = World::new(GameConfig::default()).unwrap();
        if let Some(player) = w.player_id {
            w.destroy_entity(player);
        }
        w
    }

    #[test]
    fn test_enemy_pairs_never_collide() {
        let mut w = empty_world();
        body(&mut w, EntityKind::Enemy, CollisionLayer::Enemy, Vec2::ZERO, 5.0);
        body(&mut w, EntityKind::Enemy, CollisionLayer::Enemy, Vec2::new(1.0, 0.0), 5.0);
        run(&mut w, 0.0);
        assert_eq!(w.events().collisions().count(), 0);
    }

    #[test]
    fn test_player_enemy_emits_both_directions() {
        let mut w = empty_world();
        let p = body(&mut w, EntityKind::Player, CollisionLayer::Player, Vec2::ZERO, 40.0);
        let e = body(&mut w, EntityKind::Enemy, CollisionLayer::Enemy, Vec2::new(5.0, 0.0), 20.0);
        run(&mut w, 0.0);

        let hits: Vec<_> = w.events().collisions().map(|(_, o, v, d)| (o, v, d)).collect();
        assert_eq!(hits, vec![(p, e, 40.0), (e, p, 20.0)]);
    }

    #[test]
    fn test_pending_removal_is_ignored() {
        let mut w = empty_world();
        body(&mut w, EntityKind::Player, CollisionLayer::Player, Vec2::ZERO, 40.0);
        let e = body(&mut w, EntityKind::Enemy, CollisionLayer::Enemy, Vec2::ZERO, 20.0);
        w.mark_for_deletion(e);
        run(&mut w, 0.0);
        assert!(w.events().is_empty());
    }

    #[test]
    fn test_matrix_edit_takes_effect() {
        let mut w = empty_world();
        body(&mut w, EntityKind::Enemy, CollisionLayer::Enemy, Vec2::ZERO, 5.0);
        body(&mut w, EntityKind::EnemyBullet, CollisionLayer::EnemyBullet, Vec2::ZERO, 5.0);
        assert!(overlapping_pairs(&w).is_empty());

        w.layers_mut().allow(CollisionLayer::Enemy, CollisionLayer::EnemyBullet);
        assert_eq!(overlapping_pairs(&w).len(), 1);
    }

    #[test]
    fn test_apart_bodies_do_not_collide() {
        let mut w = empty_world();
        body(&mut w, EntityKind::Player, CollisionLayer::Player, Vec2::ZERO, 40.0);
        body(&mut w, EntityKind::Enemy, CollisionLayer::Enemy, Vec2::new(25.0, 0.0), 20.0);
        run(&mut w, 0.0);
        assert!(w.events().is_empty());
    }
}
