//! Component types
//!
//! A closed set: every variant has an explicit [`ComponentKind`] discriminant
//! and its own [`Storage`] inside [`Components`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::storage::Storage;
use crate::sim::collision::{CollisionLayer, Shape};

/// A component type with a dedicated map in [`Components`]
pub trait Component: Sized + 'static {
    const KIND: ComponentKind;

    fn storage(components: &Components) -> &Storage<Self>;
    fn storage_mut(components: &mut Components) -> &mut Storage<Self>;
}

/// Position and facing
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub pos: Vec2,
    /// Facing angle (radians)
    pub rot: f32,
}

impl Transform {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            rot: 0.0,
        }
    }
}

/// Linear velocity (px/s)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity(pub Vec2);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub hp: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { hp: max, max }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Remaining fraction in [0, 1]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.hp / self.max).clamp(0.0, 1.0)
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max);
    }
}

/// Absorbs damage before health
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shield {
    pub value: f32,
    pub capacity: f32,
}

impl Shield {
    pub fn full(capacity: f32) -> Self {
        Self {
            value: capacity,
            capacity,
        }
    }
}

/// Fractional damage reduction. Clamped to [0, 1] when applied.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Defense {
    pub pct: f32,
}

/// While active, incoming damage is ignored entirely
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Invincibility {
    pub remaining_ms: f32,
}

impl Invincibility {
    pub fn is_active(&self) -> bool {
        self.remaining_ms > 0.0
    }
}

/// Bullet emission patterns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FirePattern {
    /// One bullet along the weapon direction
    Forward,
    /// `count` bullets fanned across `arc_deg` around the weapon direction
    Spread { count: u32, arc_deg: f32 },
    /// One bullet toward the player
    Aimed,
    /// `count` bullets evenly around the shooter
    Radial { count: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub pattern: FirePattern,
    pub cooldown_ms: f32,
    /// Time until the weapon may fire again
    pub timer_ms: f32,
    pub damage: f32,
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    /// Base firing direction (unit vector)
    pub direction: Vec2,
    /// Set by input/AI each frame; the weapon system fires when ready
    pub trigger: bool,
}

/// Hitbox and the layer that decides what it is tested against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: Shape,
    pub layer: CollisionLayer,
    /// Effective hitbox scale in (0, 1]
    pub shrink: f32,
    /// Raw damage dealt to whatever this collider touches
    pub contact_damage: f32,
}

/// Enemy movement behaviours
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AiBehaviour {
    /// Straight down
    Drifter,
    /// Steers toward the player, limited by `turn_rate` (rad/s)
    Chaser { turn_rate: f32 },
    /// Descends while weaving sideways
    Strafer { amplitude: f32, frequency: f32 },
    /// Moves down to `hold_y` then stays put
    Turret { hold_y: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiState {
    pub behaviour: AiBehaviour,
    /// Seconds since spawn
    pub age_secs: f32,
    /// Spawn x, the centre line strafers weave around
    pub anchor_x: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossState {
    pub boss_id: String,
    pub phase: usize,
    /// HP fractions at which the next phase begins, descending
    pub thresholds: Vec<f32>,
    pub age_secs: f32,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffKind {
    RapidFire,
    SpreadShot,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub kind: BuffKind,
    pub remaining_ms: f32,
}

/// Timed effects on an entity. One component holds all of them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Buff {
    pub active: Vec<ActiveBuff>,
}

impl Buff {
    pub fn has(&self, kind: BuffKind) -> bool {
        self.active.iter().any(|b| b.kind == kind && b.remaining_ms > 0.0)
    }

    /// Add a buff, or refresh its duration if already running
    pub fn grant(&mut self, kind: BuffKind, duration_ms: f32) {
        match self.active.iter_mut().find(|b| b.kind == kind) {
            Some(existing) => existing.remaining_ms = existing.remaining_ms.max(duration_ms),
            None => self.active.push(ActiveBuff {
                kind,
                remaining_ms: duration_ms,
            }),
        }
    }

    /// Count down all buffs and drop the expired ones
    pub fn tick(&mut self, dt_ms: f32) {
        for buff in &mut self.active {
            buff.remaining_ms -= dt_ms;
        }
        self.active.retain(|b| b.remaining_ms > 0.0);
    }
}

/// Entity expires when this reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lifetime {
    pub remaining_ms: f32,
}

/// Powerup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    RapidFire,
    SpreadShot,
    ShieldRecharge,
    Invincibility,
    Heal,
    ScoreBonus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickupItem {
    pub kind: PowerupKind,
    /// How long timed effects last once collected
    pub duration_ms: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraState {
    /// Shake intensity in [0, 1]
    pub shake: f32,
    /// Current shake offset for the renderer
    pub offset: Vec2,
}

/// Points awarded on kill (before combo multiplier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreValue(pub u64);

/// Drop chance rolled on death
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Loot {
    pub chance: f32,
    pub rolls: u32,
}

/// Visual-only particle data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleFx {
    pub color: u32,
    pub size: f32,
    /// Initial lifetime, for fading
    pub total_ms: f32,
}

/// Generates [`ComponentKind`], [`Components`] and the [`Component`] impls from
/// one table so the three cannot drift apart.
macro_rules! component_storages {
    ($($field:ident: $ty:ty => $kind:ident),+ $(,)?) => {
        /// Explicit discriminant for each component variant
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ComponentKind {
            $($kind),+
        }

        impl ComponentKind {
            pub const ALL: &'static [ComponentKind] = &[$(ComponentKind::$kind),+];
        }

        /// One map per component variant
        #[derive(Debug, Clone, Default)]
        pub struct Components {
            $(pub $field: Storage<$ty>,)+
        }

        impl Components {
            pub fn contains(&self, kind: ComponentKind, id: EntityId) -> bool {
                match kind {
                    $(ComponentKind::$kind => self.$field.contains(id),)+
                }
            }

            pub fn len_of(&self, kind: ComponentKind) -> usize {
                match kind {
                    $(ComponentKind::$kind => self.$field.len(),)+
                }
            }

            /// Ids holding `kind`, in map order
            pub fn ids_of(&self, kind: ComponentKind) -> Box<dyn Iterator<Item = EntityId> + '_> {
                match kind {
                    $(ComponentKind::$kind => Box::new(self.$field.ids()),)+
                }
            }

            /// Remove every component of `id`. Returns how many were removed.
            pub fn remove_all(&mut self, id: EntityId) -> usize {
                let mut removed = 0;
                $(
                    if self.$field.remove(id).is_some() {
                        removed += 1;
                    }
                )+
                removed
            }

            pub fn clear(&mut self) {
                $(self.$field.clear();)+
            }
        }

        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$kind;

                fn storage(components: &Components) -> &Storage<Self> {
                    &components.$field
                }

                fn storage_mut(components: &mut Components) -> &mut Storage<Self> {
                    &mut components.$field
                }
            }
        )+
    };
}

component_storages! {
    transforms: Transform => Transform,
    velocities: Velocity => Velocity,
    healths: Health => Health,
    shields: Shield => Shield,
    defenses: Defense => Defense,
    invincibilities: Invincibility => Invincibility,
    weapons: Weapon => Weapon,
    colliders: Collider => Collider,
    ai_states: AiState => AiState,
    boss_states: BossState => BossState,
    buffs: Buff => Buff,
    lifetimes: Lifetime => Lifetime,
    pickups: PickupItem => PickupItem,
    cameras: CameraState => CameraState,
    score_values: ScoreValue => ScoreValue,
    loot: Loot => Loot,
    particles: ParticleFx => ParticleFx,
}

impl Components {
    /// The requested kind with the fewest live instances
    pub fn smallest_of(&self, kinds: &[ComponentKind]) -> Option<ComponentKind> {
        kinds.iter().copied().min_by_key(|k| self.len_of(*k))
    }
}
