//! Entity identifiers

use serde::{Deserialize, Serialize};

/// Opaque entity handle. Ids are allocated monotonically and never reused
/// within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an entity was spawned as. Recorded in the entity set so the snapshot
/// and the economy can partition entities without probing components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    Boss,
    PlayerBullet,
    EnemyBullet,
    Powerup,
    Particle,
    Camera,
}

impl EntityKind {
    pub fn is_bullet(self) -> bool {
        matches!(self, EntityKind::PlayerBullet | EntityKind::EnemyBullet)
    }

    /// Enemies and bosses: things the player scores for killing
    pub fn is_hostile_ship(self) -> bool {
        matches!(self, EntityKind::Enemy | EntityKind::Boss)
    }
}

/// Monotonic id source
#[derive(Debug, Clone)]
pub struct EntityAllocator {
    next: u32,
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}
