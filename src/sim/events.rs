//! Per-frame event queue
//!
//! Systems talk to each other through events instead of calling each other:
//! collision appends `Collision`, damage resolution reads those and appends
//! `Death`, loot and combo read `Death`, and so on. The queue is append-only
//! while a frame runs and is cleared exactly once, by Cleanup.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ecs::{EntityId, EntityKind, PowerupKind};

/// Sound cues for the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCue {
    PlayerShot,
    EnemyShot,
    Hurt,
    ShieldHit,
    Explosion,
    BigExplosion,
    Pickup,
    BossWarning,
    BossPhase,
    LevelUp,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// One ordered direction of an overlapping pair: `owner` hits `victim`
    Collision {
        pos: Vec2,
        owner: EntityId,
        victim: EntityId,
        damage: f32,
    },
    /// Damage not caused by contact
    Damage {
        victim: EntityId,
        source: Option<EntityId>,
        amount: f32,
    },
    Death {
        entity: EntityId,
        kind: EntityKind,
        pos: Vec2,
        killer: Option<EntityId>,
    },
    Pickup {
        collector: EntityId,
        item: EntityId,
        kind: PowerupKind,
    },
    WeaponFired {
        shooter: EntityId,
        pos: Vec2,
        bullets: u32,
    },
    BossPhaseChange {
        boss: EntityId,
        phase: usize,
    },
    Combo {
        count: u32,
        multiplier: f32,
    },
    CameraShake {
        intensity: f32,
    },
    Audio {
        cue: AudioCue,
    },
}

/// Append-only event list for the current frame
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<Event>,
}

impl EventQueue {
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Copy of everything queued so far
    pub fn to_vec(&self) -> Vec<Event> {
        self.events.clone()
    }

    /// `(pos, owner, victim, damage)` of every collision, in emission order
    pub fn collisions(&self) -> impl Iterator<Item = (Vec2, EntityId, EntityId, f32)> + '_ {
        self.events.iter().filter_map(|e| match *e {
            Event::Collision {
                pos,
                owner,
                victim,
                damage,
            } => Some((pos, owner, victim, damage)),
            _ => None,
        })
    }

    /// `(entity, kind, pos, killer)` of every death, in emission order
    pub fn deaths(&self) -> impl Iterator<Item = (EntityId, EntityKind, Vec2, Option<EntityId>)> + '_ {
        self.events.iter().filter_map(|e| match *e {
            Event::Death {
                entity,
                kind,
                pos,
                killer,
            } => Some((entity, kind, pos, killer)),
            _ => None,
        })
    }

    pub fn pickups(&self) -> impl Iterator<Item = (EntityId, EntityId, PowerupKind)> + '_ {
        self.events.iter().filter_map(|e| match *e {
            Event::Pickup {
                collector,
                item,
                kind,
            } => Some((collector, item, kind)),
            _ => None,
        })
    }

    /// Drop every event. Only the Cleanup phase calls this.
    pub(crate) fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_keep_emission_order() {
        let mut q = EventQueue::default();
        q.push(Event::Collision {
            pos: Vec2::ZERO,
            owner: EntityId(1),
            victim: EntityId(2),
            damage: 5.0,
        });
        q.push(Event::CameraShake { intensity: 0.2 });
        q.push(Event::Collision {
            pos: Vec2::ONE,
            owner: EntityId(2),
            victim: EntityId(1),
            damage: 7.0,
        });

        let hits: Vec<_> = q.collisions().map(|(_, o, v, d)| (o, v, d)).collect();
        assert_eq!(
            hits,
            vec![(EntityId(1), EntityId(2), 5.0), (EntityId(2), EntityId(1), 7.0)]
        );
        assert_eq!(q.deaths().count(), 0);
        assert_eq!(q.len(), 3);

        q.clear();
        assert!(q.is_empty());
    }
}
