//! Read-only render snapshot
//!
//! A plain, serialisable projection of the world for whatever draws it.
//! Building one never mutates anything.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ecs::{
    ActiveBuff, BossState, CameraState, Collider, EntityId, EntityKind, Health, Invincibility,
    Lifetime, ParticleFx, PickupItem, PowerupKind, Shield, Transform,
};
use crate::world::World;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: EntityId,
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub shield: f32,
    pub max_shield: f32,
    pub invincible: bool,
    pub buffs: Vec<ActiveBuff>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipView {
    pub id: EntityId,
    pub pos: Vec2,
    pub rot: f32,
    /// Hitbox bounding radius, for sprite sizing
    pub radius: f32,
    pub hp_fraction: f32,
    pub shielded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossView {
    pub ship: ShipView,
    pub boss_id: String,
    pub phase: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletView {
    pub pos: Vec2,
    pub rot: f32,
    pub radius: f32,
    /// Fired by the player (otherwise hostile)
    pub friendly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupView {
    pub pos: Vec2,
    pub kind: PowerupKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub color: u32,
    pub size: f32,
    /// 1 when fresh, 0 when about to expire
    pub life: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboView {
    pub count: u32,
    pub multiplier: f32,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub frame: u64,
    pub player: Option<PlayerView>,
    pub enemies: Vec<ShipView>,
    pub bullets: Vec<BulletView>,
    pub powerups: Vec<PowerupView>,
    pub boss: Option<BossView>,
    pub particles: Vec<ParticleView>,
    pub score: u64,
    /// 1-based level number
    pub level: usize,
    pub level_name: String,
    pub combo: ComboView,
    /// Simulated seconds
    pub time: f32,
    pub camera_offset: Vec2,
    pub time_scale: f32,
    pub game_over: bool,
}

fn ship_view(world: &World, id: EntityId, t: &Transform) -> ShipView {
    ShipView {
        id,
        pos: t.pos,
        rot: t.rot,
        radius: world
            .get_component::<Collider>(id)
            .map(|c| c.shape.bounding_radius())
            .unwrap_or(0.0),
        hp_fraction: world.get_component::<Health>(id).map(|h| h.fraction()).unwrap_or(0.0),
        shielded: world.get_component::<Shield>(id).is_some_and(|s| s.value > 0.0),
    }
}

/// Project the world into a [`Snapshot`]. Entities scheduled for removal are
/// left out.
pub fn build_snapshot(world: &World) -> Snapshot {
    let mut enemies = Vec::new();
    let mut bullets = Vec::new();
    let mut powerups = Vec::new();
    let mut particles = Vec::new();
    let mut boss = None;
    let mut player = None;

    for (id, (t,)) in world.query::<(Transform,)>() {
        if !world.is_active(id) {
            continue;
        }
        match world.kind_of(id) {
            Some(EntityKind::Player) => {
                let health = world.get_component::<Health>(id);
                let shield = world.get_component::<Shield>(id);
                player = Some(PlayerView {
                    id,
                    pos: t.pos,
                    hp: health.map(|h| h.hp.max(0.0)).unwrap_or(0.0),
                    max_hp: health.map(|h| h.max).unwrap_or(0.0),
                    shield: shield.map(|s| s.value).unwrap_or(0.0),
                    max_shield: shield.map(|s| s.capacity).unwrap_or(0.0),
                    invincible: world
                        .get_component::<Invincibility>(id)
                        .is_some_and(|i| i.is_active()),
                    buffs: crate::sim::systems::buffs::active_buffs(world, id),
                });
            }
            Some(EntityKind::Enemy) => enemies.push(ship_view(world, id, t)),
            Some(EntityKind::Boss) => {
                let state = world.get_component::<BossState>(id);
                boss = Some(BossView {
                    ship: ship_view(world, id, t),
                    boss_id: state.map(|s| s.boss_id.clone()).unwrap_or_default(),
                    phase: state.map(|s| s.phase).unwrap_or(0),
                });
            }
            Some(kind @ (EntityKind::PlayerBullet | EntityKind::EnemyBullet)) => {
                bullets.push(BulletView {
                    pos: t.pos,
                    rot: t.rot,
                    radius: world
                        .get_component::<Collider>(id)
                        .map(|c| c.shape.bounding_radius())
                        .unwrap_or(0.0),
                    friendly: kind == EntityKind::PlayerBullet,
                });
            }
            Some(EntityKind::Powerup) => {
                if let Some(item) = world.get_component::<PickupItem>(id) {
                    powerups.push(PowerupView {
                        pos: t.pos,
                        kind: item.kind,
                    });
                }
            }
            Some(EntityKind::Particle) => {
                if let Some(fx) = world.get_component::<ParticleFx>(id) {
                    let remaining = world
                        .get_component::<Lifetime>(id)
                        .map(|l| l.remaining_ms)
                        .unwrap_or(0.0);
                    let life = if fx.total_ms > 0.0 {
                        (remaining / fx.total_ms).clamp(0.0, 1.0)
                    } else {
                        0.0
                    };
                    particles.push(ParticleView {
                        pos: t.pos,
                        color: fx.color,
                        size: fx.size,
                        life,
                    });
                }
            }
            Some(EntityKind::Camera) | None => {}
        }
    }

    let camera_offset = world
        .camera_id
        .and_then(|id| world.get_component::<CameraState>(id))
        .map(|c| c.offset)
        .unwrap_or(Vec2::ZERO);

    Snapshot {
        frame: world.frame,
        player,
        enemies,
        bullets,
        powerups,
        boss,
        particles,
        score: world.score,
        level: world.level + 1,
        level_name: world.current_level().name.clone(),
        combo: ComboView {
            count: world.combo.count,
            multiplier: world.combo.multiplier,
        },
        time: world.elapsed_secs(),
        camera_offset,
        time_scale: world.time_scale,
        game_over: world.game_over,
    }
}
