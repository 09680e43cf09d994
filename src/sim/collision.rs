//! Collision layers and hitbox geometry
//!
//! Layers prune pairs before any geometry runs: a symmetric bitmask matrix
//! says which categories are ever tested against each other. Geometry is
//! discrete (positions at the end of the physics step), supporting circles,
//! axis-aligned rects, and circle-vs-rect.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Collision categories. Each is one bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CollisionLayer {
    Player = 1 << 0,
    Enemy = 1 << 1,
    PlayerBullet = 1 << 2,
    EnemyBullet = 1 << 3,
    Pickup = 1 << 4,
}

impl CollisionLayer {
    pub const ALL: [CollisionLayer; 5] = [
        CollisionLayer::Player,
        CollisionLayer::Enemy,
        CollisionLayer::PlayerBullet,
        CollisionLayer::EnemyBullet,
        CollisionLayer::Pickup,
    ];

    #[inline]
    pub fn bit(self) -> u8 {
        self as u8
    }

    /// Row index into the layer matrix
    #[inline]
    fn index(self) -> usize {
        self.bit().trailing_zeros() as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionLayer::Player => "player",
            CollisionLayer::Enemy => "enemy",
            CollisionLayer::PlayerBullet => "player_bullet",
            CollisionLayer::EnemyBullet => "enemy_bullet",
            CollisionLayer::Pickup => "pickup",
        }
    }
}

impl std::str::FromStr for CollisionLayer {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "player" => Ok(CollisionLayer::Player),
            "enemy" => Ok(CollisionLayer::Enemy),
            "player_bullet" | "playerbullet" => Ok(CollisionLayer::PlayerBullet),
            "enemy_bullet" | "enemybullet" => Ok(CollisionLayer::EnemyBullet),
            "pickup" => Ok(CollisionLayer::Pickup),
            _ => Err(ConfigError::UnknownLayer(s.to_string())),
        }
    }
}

/// Symmetric "may collide" matrix, one mask row per layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMatrix {
    rows: [u8; 5],
}

impl Default for LayerMatrix {
    fn default() -> Self {
        Self::standard()
    }
}

impl LayerMatrix {
    /// Nothing collides
    pub fn empty() -> Self {
        Self { rows: [0; 5] }
    }

    /// Shooter rules: the player meets enemies, enemy bullets and pickups;
    /// enemies meet player bullets. Nothing else is ever tested.
    pub fn standard() -> Self {
        let mut m = Self::empty();
        m.allow(CollisionLayer::Player, CollisionLayer::Enemy);
        m.allow(CollisionLayer::Player, CollisionLayer::EnemyBullet);
        m.allow(CollisionLayer::Player, CollisionLayer::Pickup);
        m.allow(CollisionLayer::Enemy, CollisionLayer::PlayerBullet);
        m
    }

    /// Enable a pair in both directions
    pub fn allow(&mut self, a: CollisionLayer, b: CollisionLayer) {
        self.rows[a.index()] |= b.bit();
        self.rows[b.index()] |= a.bit();
    }

    /// Disable a pair in both directions
    pub fn deny(&mut self, a: CollisionLayer, b: CollisionLayer) {
        self.rows[a.index()] &= !b.bit();
        self.rows[b.index()] &= !a.bit();
    }

    #[inline]
    pub fn can_collide(&self, a: CollisionLayer, b: CollisionLayer) -> bool {
        self.rows[a.index()] & b.bit() != 0
    }
}

/// Hitbox shape, centred on the entity position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half_width: f32, half_height: f32 },
}

impl Shape {
    /// Shape after applying a hitbox shrink factor
    pub fn shrunk(self, shrink: f32) -> Shape {
        let s = if shrink.is_finite() {
            shrink.clamp(0.0, 1.0)
        } else {
            1.0
        };
        match self {
            Shape::Circle { radius } => Shape::Circle { radius: radius * s },
            Shape::Rect {
                half_width,
                half_height,
            } => Shape::Rect {
                half_width: half_width * s,
                half_height: half_height * s,
            },
        }
    }

    /// Radius of the bounding circle
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => radius,
            Shape::Rect {
                half_width,
                half_height,
            } => Vec2::new(half_width, half_height).length(),
        }
    }
}

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Contact point (if hit)
    pub point: Vec2,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
        }
    }

    fn hit_at(point: Vec2) -> Self {
        Self { hit: true, point }
    }
}

/// Circle-circle: overlapping when the centre distance is below the sum of radii
pub fn circle_circle(a: Vec2, ra: f32, b: Vec2, rb: f32) -> CollisionResult {
    let delta = b - a;
    let reach = ra + rb;
    if delta.length_squared() < reach * reach {
        // Contact on the line between centres, split by radius
        let t = if reach > 0.0 { ra / reach } else { 0.5 };
        CollisionResult::hit_at(a + delta * t)
    } else {
        CollisionResult::miss()
    }
}

/// Axis-aligned rect overlap
pub fn rect_rect(a: Vec2, a_half: Vec2, b: Vec2, b_half: Vec2) -> CollisionResult {
    let delta = (b - a).abs();
    let reach = a_half + b_half;
    if delta.x < reach.x && delta.y < reach.y {
        CollisionResult::hit_at((a + b) * 0.5)
    } else {
        CollisionResult::miss()
    }
}

/// Circle against an axis-aligned rect, via the closest point on the rect
pub fn circle_rect(center: Vec2, radius: f32, rect: Vec2, half: Vec2) -> CollisionResult {
    let closest = center.clamp(rect - half, rect + half);
    if (center - closest).length_squared() < radius * radius {
        CollisionResult::hit_at(closest)
    } else {
        CollisionResult::miss()
    }
}

/// Test two shaped hitboxes, each already shrunk
pub fn shapes_overlap(a_pos: Vec2, a: Shape, b_pos: Vec2, b: Shape) -> CollisionResult {
    match (a, b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(a_pos, ra, b_pos, rb)
        }
        (
            Shape::Rect {
                half_width: aw,
                half_height: ah,
            },
            Shape::Rect {
                half_width: bw,
                half_height: bh,
            },
        ) => rect_rect(a_pos, Vec2::new(aw, ah), b_pos, Vec2::new(bw, bh)),
        (
            Shape::Circle { radius },
            Shape::Rect {
                half_width,
                half_height,
            },
        ) => circle_rect(a_pos, radius, b_pos, Vec2::new(half_width, half_height)),
        (
            Shape::Rect {
                half_width,
                half_height,
            },
            Shape::Circle { radius },
        ) => circle_rect(b_pos, radius, a_pos, Vec2::new(half_width, half_height)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_matrix_is_symmetric() {
        let m = LayerMatrix::standard();
        for a in CollisionLayer::ALL {
            for b in CollisionLayer::ALL {
                assert_eq!(m.can_collide(a, b), m.can_collide(b, a), "{a:?}/{b:?}");
            }
        }
    }

    #[test]
    fn test_standard_pairs() {
        let m = LayerMatrix::standard();
        assert!(m.can_collide(CollisionLayer::Player, CollisionLayer::Enemy));
        assert!(m.can_collide(CollisionLayer::PlayerBullet, CollisionLayer::Enemy));
        assert!(m.can_collide(CollisionLayer::Pickup, CollisionLayer::Player));
        assert!(!m.can_collide(CollisionLayer::Enemy, CollisionLayer::Enemy));
        assert!(!m.can_collide(CollisionLayer::Enemy, CollisionLayer::EnemyBullet));
        assert!(!m.can_collide(CollisionLayer::PlayerBullet, CollisionLayer::EnemyBullet));
        assert!(!m.can_collide(CollisionLayer::Player, CollisionLayer::PlayerBullet));
    }

    #[test]
    fn test_deny_removes_both_directions() {
        let mut m = LayerMatrix::standard();
        m.deny(CollisionLayer::Enemy, CollisionLayer::Player);
        assert!(!m.can_collide(CollisionLayer::Player, CollisionLayer::Enemy));
        assert!(!m.can_collide(CollisionLayer::Enemy, CollisionLayer::Player));
    }

    #[test]
    fn test_layer_names_round_trip() {
        for layer in CollisionLayer::ALL {
            assert_eq!(layer.as_str().parse::<CollisionLayer>().ok(), Some(layer));
        }
        assert_eq!("Enemy_Bullet".parse::<CollisionLayer>().ok(), Some(CollisionLayer::EnemyBullet));
        assert!(matches!(
            "scenery".parse::<CollisionLayer>(),
            Err(ConfigError::UnknownLayer(name)) if name == "scenery"
        ));
    }

    #[test]
    fn test_circle_circle() {
        assert!(circle_circle(Vec2::ZERO, 10.0, Vec2::new(15.0, 0.0), 6.0).hit);
        // Touching exactly is not overlapping
        assert!(!circle_circle(Vec2::ZERO, 10.0, Vec2::new(16.0, 0.0), 6.0).hit);

        let r = circle_circle(Vec2::ZERO, 10.0, Vec2::new(10.0, 0.0), 10.0);
        assert!((r.point.x - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_rect_rect() {
        let half = Vec2::new(5.0, 5.0);
        assert!(rect_rect(Vec2::ZERO, half, Vec2::new(9.0, 9.0), half).hit);
        assert!(!rect_rect(Vec2::ZERO, half, Vec2::new(11.0, 0.0), half).hit);
    }

    #[test]
    fn test_circle_rect() {
        let half = Vec2::new(10.0, 4.0);
        assert!(circle_rect(Vec2::new(0.0, 8.0), 5.0, Vec2::ZERO, half).hit);
        assert!(!circle_rect(Vec2::new(0.0, 10.0), 5.0, Vec2::ZERO, half).hit);
        // Corner case: diagonal distance matters, not the bounding box
        assert!(!circle_rect(Vec2::new(14.0, 8.0), 5.0, Vec2::ZERO, half).hit);
    }

    #[test]
    fn test_shrink_reduces_hitbox() {
        let a = Shape::Circle { radius: 10.0 };
        let b = Shape::Circle { radius: 10.0 };
        let pos_b = Vec2::new(15.0, 0.0);
        assert!(shapes_overlap(Vec2::ZERO, a, pos_b, b).hit);
        assert!(!shapes_overlap(Vec2::ZERO, a.shrunk(0.5), pos_b, b.shrunk(0.5)).hit);
    }

    #[test]
    fn test_mixed_shapes_are_order_independent() {
        let circle = Shape::Circle { radius: 6.0 };
        let rect = Shape::Rect {
            half_width: 8.0,
            half_height: 3.0,
        };
        let p = Vec2::new(3.0, 7.0);
        assert_eq!(
            shapes_overlap(Vec2::ZERO, rect, p, circle).hit,
            shapes_overlap(p, circle, Vec2::ZERO, rect).hit
        );
    }

    fn shape() -> impl Strategy<Value = Shape> {
        prop_oneof![
            (0.5f32..40.0).prop_map(|radius| Shape::Circle { radius }),
            (0.5f32..40.0, 0.5f32..40.0).prop_map(|(half_width, half_height)| Shape::Rect {
                half_width,
                half_height
            }),
        ]
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(
            a in shape(),
            b in shape(),
            ax in -100.0f32..100.0,
            ay in -100.0f32..100.0,
            bx in -100.0f32..100.0,
            by in -100.0f32..100.0,
        ) {
            let pa = Vec2::new(ax, ay);
            let pb = Vec2::new(bx, by);
            prop_assert_eq!(shapes_overlap(pa, a, pb, b).hit, shapes_overlap(pb, b, pa, a).hit);
        }
    }
}
