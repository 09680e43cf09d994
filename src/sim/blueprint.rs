//! Declarative spawn factory
//!
//! Every entity in the game is assembled here from a [`Blueprint`] plus the
//! balance tables, so systems never hand-build component sets.

use glam::Vec2;

use crate::config::WeaponDef;
use crate::consts::{BULLET_LIFETIME_MS, POWERUP_FALL_SPEED, POWERUP_LIFETIME_MS, POWERUP_RADIUS};
use crate::ecs::{
    AiState, BossState, Buff, Collider, Defense, EntityId, EntityKind, Health, Invincibility,
    Lifetime, Loot, ParticleFx, PickupItem, PowerupKind, ScoreValue, Shield, Transform, Velocity,
    Weapon,
};
use crate::error::ConfigError;
use crate::sim::collision::{CollisionLayer, Shape};
use crate::world::World;

/// What to spawn
#[derive(Debug, Clone, PartialEq)]
pub enum Blueprint {
    Player,
    /// Enemy type id from the balance table
    Enemy(String),
    /// Boss type id from the balance table
    Boss(String),
    PlayerBullet { velocity: Vec2, damage: f32, radius: f32 },
    EnemyBullet { velocity: Vec2, damage: f32, radius: f32 },
    Powerup(PowerupKind),
    Particle { velocity: Vec2, color: u32, size: f32, life_ms: f32 },
}

/// Build the entity described by `blueprint` at `(x, y)`.
///
/// Unknown enemy or boss ids are configuration errors; validated tables never
/// produce them.
pub fn spawn_entity(world: &mut World, blueprint: &Blueprint, x: f32, y: f32) -> Result<EntityId, ConfigError> {
    let pos = Vec2::new(x, y);
    let id = match blueprint {
        Blueprint::Player => spawn_player(world, x, y),
        Blueprint::Enemy(enemy_id) => spawn_enemy(world, enemy_id, pos)?,
        Blueprint::Boss(boss_id) => spawn_boss(world, boss_id, pos)?,
        Blueprint::PlayerBullet {
            velocity,
            damage,
            radius,
        } => spawn_bullet(world, EntityKind::PlayerBullet, pos, *velocity, *damage, *radius),
        Blueprint::EnemyBullet {
            velocity,
            damage,
            radius,
        } => spawn_bullet(world, EntityKind::EnemyBullet, pos, *velocity, *damage, *radius),
        Blueprint::Powerup(kind) => spawn_powerup(world, *kind, pos),
        Blueprint::Particle {
            velocity,
            color,
            size,
            life_ms,
        } => spawn_particle(world, pos, *velocity, *color, *size, *life_ms),
    };
    Ok(id)
}

/// Turn weapon stats into a ready-to-fire weapon component
pub fn weapon_from_def(def: &WeaponDef, direction: Vec2) -> Weapon {
    let direction = direction.normalize_or_zero();
    Weapon {
        pattern: def.pattern,
        cooldown_ms: def.cooldown_ms,
        timer_ms: 0.0,
        damage: def.damage,
        bullet_speed: def.bullet_speed,
        bullet_radius: def.bullet_radius,
        direction: if direction == Vec2::ZERO { Vec2::Y } else { direction },
        trigger: false,
    }
}

pub(crate) fn spawn_player(world: &mut World, x: f32, y: f32) -> EntityId {
    let config = std::sync::Arc::clone(&world.config);
    let def = &config.player;

    let id = world.create_entity(EntityKind::Player);
    world.add_component(id, Transform::at(x, y));
    world.add_component(id, Velocity::default());
    world.add_component(id, Health::new(def.hp));
    world.add_component(id, Shield::full(def.shield));
    world.add_component(id, Defense { pct: def.defense_pct });
    world.add_component(
        id,
        Invincibility {
            remaining_ms: def.spawn_invincibility_ms,
        },
    );
    // Player fires up the screen
    world.add_component(id, weapon_from_def(&def.weapon, Vec2::NEG_Y));
    world.add_component(
        id,
        Collider {
            shape: def.hitbox,
            layer: CollisionLayer::Player,
            shrink: def.shrink,
            contact_damage: def.contact_damage,
        },
    );
    world.add_component(id, Buff::default());
    world.player_id = Some(id);

    log::debug!("Spawned player {id} at ({x:.0}, {y:.0})");
    id
}

fn spawn_enemy(world: &mut World, enemy_id: &str, pos: Vec2) -> Result<EntityId, ConfigError> {
    let config = std::sync::Arc::clone(&world.config);
    let def = config
        .enemies
        .get(enemy_id)
        .ok_or_else(|| ConfigError::UnknownEnemy(enemy_id.to_string()))?;
    let layer = config.enemy_layer(def);
    let hp = def.hp * world.difficulty;

    let id = world.create_entity(EntityKind::Enemy);
    world.add_component(id, Transform::at(pos.x, pos.y));
    world.add_component(id, Velocity(Vec2::new(0.0, def.speed)));
    world.add_component(id, Health::new(hp));
    if def.shield > 0.0 {
        world.add_component(id, Shield::full(def.shield));
    }
    if def.defense_pct != 0.0 {
        world.add_component(id, Defense { pct: def.defense_pct });
    }
    if let Some(weapon) = &def.weapon {
        let mut weapon = weapon_from_def(weapon, Vec2::Y);
        // Stagger the first volley so a wave doesn't fire in unison
        weapon.timer_ms = weapon.cooldown_ms * 0.5;
        world.add_component(id, weapon);
    }
    world.add_component(
        id,
        Collider {
            shape: def.hitbox,
            layer,
            shrink: def.shrink,
            contact_damage: def.contact_damage,
        },
    );
    world.add_component(
        id,
        AiState {
            behaviour: def.ai,
            age_secs: 0.0,
            anchor_x: pos.x,
            speed: def.speed,
        },
    );
    world.add_component(id, ScoreValue(def.score));
    if def.loot_chance > 0.0 {
        world.add_component(
            id,
            Loot {
                chance: def.loot_chance,
                rolls: 1,
            },
        );
    }

    log::debug!("Spawned enemy '{enemy_id}' {id} (hp {hp:.0})");
    Ok(id)
}

fn spawn_boss(world: &mut World, boss_id: &str, pos: Vec2) -> Result<EntityId, ConfigError> {
    let config = std::sync::Arc::clone(&world.config);
    let def = config
        .bosses
        .get(boss_id)
        .ok_or_else(|| ConfigError::UnknownBoss(boss_id.to_string()))?;
    let hp = def.hp * world.difficulty;

    let id = world.create_entity(EntityKind::Boss);
    world.add_component(id, Transform::at(pos.x, pos.y));
    world.add_component(id, Velocity(Vec2::new(0.0, def.speed)));
    world.add_component(id, Health::new(hp));
    if def.shield > 0.0 {
        world.add_component(id, Shield::full(def.shield));
    }
    world.add_component(id, Defense { pct: def.defense_pct });
    world.add_component(id, weapon_from_def(&def.weapon, Vec2::Y));
    world.add_component(
        id,
        Collider {
            shape: def.hitbox,
            layer: CollisionLayer::Enemy,
            shrink: def.shrink,
            contact_damage: def.contact_damage,
        },
    );
    world.add_component(
        id,
        BossState {
            boss_id: boss_id.to_string(),
            phase: 0,
            thresholds: def.phases.iter().map(|p| p.hp_fraction).collect(),
            age_secs: 0.0,
            speed: def.speed,
        },
    );
    world.add_component(id, ScoreValue(def.score));
    if def.loot_rolls > 0 {
        world.add_component(
            id,
            Loot {
                chance: 1.0,
                rolls: def.loot_rolls,
            },
        );
    }
    world.boss_id = Some(id);

    log::info!("Boss '{boss_id}' {id} arrived (hp {hp:.0})");
    Ok(id)
}

pub(crate) fn spawn_bullet(
    world: &mut World,
    kind: EntityKind,
    pos: Vec2,
    velocity: Vec2,
    damage: f32,
    radius: f32,
) -> EntityId {
    let layer = if kind == EntityKind::PlayerBullet {
        CollisionLayer::PlayerBullet
    } else {
        CollisionLayer::EnemyBullet
    };

    let id = world.create_entity(kind);
    world.add_component(
        id,
        Transform {
            pos,
            rot: crate::angle_of(velocity),
        },
    );
    world.add_component(id, Velocity(velocity));
    world.add_component(
        id,
        Collider {
            shape: Shape::Circle { radius },
            layer,
            shrink: 1.0,
            contact_damage: damage,
        },
    );
    world.add_component(
        id,
        Lifetime {
            remaining_ms: BULLET_LIFETIME_MS,
        },
    );
    id
}

pub(crate) fn spawn_powerup(world: &mut World, kind: PowerupKind, pos: Vec2) -> EntityId {
    let duration_ms = world.config.powerup_duration(kind);

    let id = world.create_entity(EntityKind::Powerup);
    world.add_component(id, Transform { pos, rot: 0.0 });
    world.add_component(id, Velocity(Vec2::new(0.0, POWERUP_FALL_SPEED)));
    world.add_component(id, PickupItem { kind, duration_ms });
    world.add_component(
        id,
        Collider {
            shape: Shape::Circle {
                radius: POWERUP_RADIUS,
            },
            layer: CollisionLayer::Pickup,
            shrink: 1.0,
            contact_damage: 0.0,
        },
    );
    world.add_component(
        id,
        Lifetime {
            remaining_ms: POWERUP_LIFETIME_MS,
        },
    );
    log::debug!("Dropped powerup {kind:?} {id}");
    id
}

pub(crate) fn spawn_particle(
    world: &mut World,
    pos: Vec2,
    velocity: Vec2,
    color: u32,
    size: f32,
    life_ms: f32,
) -> EntityId {
    let id = world.create_entity(EntityKind::Particle);
    world.add_component(id, Transform { pos, rot: 0.0 });
    world.add_component(id, Velocity(velocity));
    world.add_component(
        id,
        ParticleFx {
            color,
            size,
            total_ms: life_ms,
        },
    );
    world.add_component(id, Lifetime { remaining_ms: life_ms });
    id
}
