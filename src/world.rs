//! The World: aggregate root of a session
//!
//! Owns the entity set, every component map, the per-frame event queue and
//! the scalar session state (score, level, credits, ...). Every system reads
//! and writes it directly; ordering discipline comes from the pipeline.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::config::{GameConfig, LevelDef};
use crate::ecs::entity::EntityAllocator;
use crate::ecs::query::{self, Query, QueryIter};
use crate::ecs::{CameraState, Component, ComponentKind, Components, EntityId, EntityKind, PowerupKind};
use crate::error::ConfigError;
use crate::sampler::AliasTable;
use crate::sim::blueprint;
use crate::sim::collision::LayerMatrix;
use crate::sim::events::{Event, EventQueue};
use crate::sim::systems::input::InputState;

/// Playfield rectangle (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(width, height),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Whether `p` lies inside the bounds grown by `margin` on every side
    pub fn contains_with_margin(&self, p: Vec2, margin: f32) -> bool {
        p.x >= self.min.x - margin
            && p.x <= self.max.x + margin
            && p.y >= self.min.y - margin
            && p.y <= self.max.y + margin
    }
}

/// Kill-chain state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboState {
    pub count: u32,
    /// Time left to extend the chain
    pub timer_ms: f32,
    pub multiplier: f32,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            count: 0,
            timer_ms: 0.0,
            multiplier: 1.0,
        }
    }
}

pub struct World {
    entities: BTreeMap<EntityId, EntityKind>,
    allocator: EntityAllocator,
    pending_removal: BTreeSet<EntityId>,
    pub(crate) components: Components,
    pub(crate) events: EventQueue,
    pub(crate) config: Arc<GameConfig>,
    /// Precomputed once: powerup kinds are drawn far more often than the table changes
    pub(crate) powerup_table: Arc<AliasTable<PowerupKind>>,
    pub(crate) layers: LayerMatrix,
    pub(crate) rng: Pcg32,

    /// Score
    pub score: u64,
    /// Score banked when the current level began
    pub level_start_score: u64,
    /// Current level index (0-based)
    pub level: usize,
    /// Multiplier applied to every frame's dt
    pub time_scale: f32,
    /// Slow motion remaining (unscaled ms)
    pub slowmo_ms: f32,
    /// Spendable spawn currency
    pub spawn_credits: f32,
    /// Time accumulated toward the next purchase round
    pub spawn_timer_ms: f32,
    pub difficulty: f32,
    pub player_id: Option<EntityId>,
    pub boss_id: Option<EntityId>,
    pub camera_id: Option<EntityId>,
    pub bounds: Bounds,
    /// Unscaled dt of the frame in progress
    pub real_dt_ms: f32,
    /// Total simulated time
    pub elapsed_ms: f32,
    /// Simulated time in the current level
    pub level_elapsed_ms: f32,
    pub boss_spawned: bool,
    pub combo: ComboState,
    /// Frames stepped so far
    pub frame: u64,
    pub game_over: bool,
    /// Input snapshot for the current frame
    pub input: InputState,
}

impl World {
    /// Validate `config` and build a fresh world from it
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(Arc::new(config)))
    }

    /// Build from a table that already passed validation
    pub(crate) fn from_validated(config: Arc<GameConfig>) -> Self {
        let powerup_table = AliasTable::new(
            config.powerups.iter().map(|p| (p.kind, p.weight)),
            PowerupKind::ScoreBonus,
        );
        let bounds = Bounds::new(config.arena.width, config.arena.height);
        let starting_credits = config.levels.first().map(|l| l.starting_credits).unwrap_or(0.0);

        let mut world = Self {
            entities: BTreeMap::new(),
            allocator: EntityAllocator::default(),
            pending_removal: BTreeSet::new(),
            components: Components::default(),
            events: EventQueue::default(),
            rng: Pcg32::seed_from_u64(config.seed),
            powerup_table: Arc::new(powerup_table),
            layers: LayerMatrix::standard(),
            config,
            score: 0,
            level_start_score: 0,
            level: 0,
            time_scale: 1.0,
            slowmo_ms: 0.0,
            spawn_credits: starting_credits,
            spawn_timer_ms: 0.0,
            difficulty: 1.0,
            player_id: None,
            boss_id: None,
            camera_id: None,
            bounds,
            real_dt_ms: 0.0,
            elapsed_ms: 0.0,
            level_elapsed_ms: 0.0,
            boss_spawned: false,
            combo: ComboState::default(),
            frame: 0,
            game_over: false,
            input: InputState::default(),
        };

        let camera = world.create_entity(EntityKind::Camera);
        world.add_component(camera, CameraState::default());
        world.camera_id = Some(camera);

        let spawn = Vec2::new(bounds.center().x, bounds.max.y - 80.0);
        blueprint::spawn_player(&mut world, spawn.x, spawn.y);

        log::info!(
            "World created: seed={}, level '{}', {} credits",
            world.config.seed,
            world.current_level().name,
            world.spawn_credits
        );
        world
    }

    /// Throw everything away and start over from the same balance table
    pub fn reset(&mut self) {
        *self = Self::from_validated(Arc::clone(&self.config));
    }

    // --- entity set ---

    /// Allocate a new id and register it live
    pub fn create_entity(&mut self, kind: EntityKind) -> EntityId {
        let id = self.allocator.allocate();
        self.entities.insert(id, kind);
        id
    }

    /// Remove `id` from every component map and the entity set, and clear any
    /// session scalar pointing at it. Missing ids are a no-op.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        if self.entities.remove(&id).is_none() {
            log::trace!("destroy_entity: {id} not found");
            return false;
        }
        self.components.remove_all(id);
        self.pending_removal.remove(&id);

        if self.player_id == Some(id) {
            self.player_id = None;
        }
        if self.boss_id == Some(id) {
            self.boss_id = None;
        }
        if self.camera_id == Some(id) {
            self.camera_id = None;
        }
        true
    }

    /// Schedule removal for Cleanup. The entity stays fully visible until then.
    pub fn mark_for_deletion(&mut self, id: EntityId) {
        if self.entities.contains_key(&id) {
            self.pending_removal.insert(id);
        }
    }

    pub fn is_pending_removal(&self, id: EntityId) -> bool {
        self.pending_removal.contains(&id)
    }

    /// Ids awaiting removal
    pub fn pending_removal(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.pending_removal.iter().copied()
    }

    /// Destroy everything scheduled for removal. Returns how many went.
    pub(crate) fn flush_removals(&mut self) -> usize {
        let doomed = std::mem::take(&mut self.pending_removal);
        let count = doomed.len();
        for id in doomed {
            self.destroy_entity(id);
        }
        count
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Alive and not already scheduled for removal
    pub fn is_active(&self, id: EntityId) -> bool {
        self.is_alive(id) && !self.pending_removal.contains(&id)
    }

    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        self.entities.get(&id).copied()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, EntityKind)> + '_ {
        self.entities.iter().map(|(id, kind)| (*id, *kind))
    }

    /// Active entities of `kind`
    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.entities
            .iter()
            .filter(|(id, k)| **k == kind && !self.pending_removal.contains(*id))
            .count()
    }

    // --- components ---

    /// Attach `component`, replacing any existing instance of the same variant.
    /// Returns the replaced instance. No-op on a missing id.
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> Option<T> {
        if !self.entities.contains_key(&id) {
            log::trace!("add_component {:?}: {id} not found", T::KIND);
            return None;
        }
        T::storage_mut(&mut self.components).insert(id, component)
    }

    pub fn get_component<T: Component>(&self, id: EntityId) -> Option<&T> {
        T::storage(&self.components).get(id)
    }

    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        T::storage_mut(&mut self.components).get_mut(id)
    }

    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Option<T> {
        T::storage_mut(&mut self.components).remove(id)
    }

    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        T::storage(&self.components).contains(id)
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    // --- queries ---

    /// Lazily iterate entities holding every component in `Q`
    pub fn query<Q: Query>(&self) -> QueryIter<'_, Q> {
        QueryIter::new(&self.components)
    }

    /// Matching ids collected up front, so the caller may mutate the world
    /// (including adding components) while walking them
    pub fn query_ids<Q: Query>(&self) -> Vec<EntityId> {
        self.query::<Q>().map(|(id, _)| id).collect()
    }

    /// Ids holding every listed component variant
    pub fn query_kinds<'w>(&'w self, kinds: &'w [ComponentKind]) -> impl Iterator<Item = EntityId> + 'w {
        query::query_kinds(&self.components, kinds)
    }

    // --- events ---

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    // --- session ---

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn current_level(&self) -> &LevelDef {
        let last = self.config.levels.len().saturating_sub(1);
        &self.config.levels[self.level.min(last)]
    }

    pub fn layers(&self) -> &LayerMatrix {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerMatrix {
        &mut self.layers
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_ms / 1000.0
    }

    pub fn player_pos(&self) -> Option<Vec2> {
        let id = self.player_id?;
        self.get_component::<crate::ecs::Transform>(id).map(|t| t.pos)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("pending_removal", &self.pending_removal.len())
            .field("events", &self.events.len())
            .field("score", &self.score)
            .field("level", &self.level)
            .field("spawn_credits", &self.spawn_credits)
            .field("frame", &self.frame)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Health, Shield, Transform, Velocity};
    use proptest::prelude::*;

    fn world() -> World {
        World::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn test_new_world_has_player_and_camera() {
        let w = world();
        let player = w.player_id.unwrap();
        assert_eq!(w.kind_of(player), Some(EntityKind::Player));
        assert!(w.has_component::<Health>(player));
        assert!(w.camera_id.is_some());
        assert_eq!(w.spawn_credits, w.config().levels[0].starting_credits);
    }

    #[test]
    fn test_invalid_config_blocks_construction() {
        let mut config = GameConfig::default();
        config.levels[0].pool.clear();
        assert!(World::new(config).is_err());
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut w = world();
        let a = w.create_entity(EntityKind::Enemy);
        w.destroy_entity(a);
        let b = w.create_entity(EntityKind::Enemy);
        assert!(b > a);
    }

    #[test]
    fn test_add_component_replaces() {
        let mut w = world();
        let e = w.create_entity(EntityKind::Enemy);
        assert!(w.add_component(e, Health::new(10.0)).is_none());
        let old = w.add_component(e, Health::new(25.0));
        assert_eq!(old.map(|h| h.max), Some(10.0));
        assert_eq!(w.get_component::<Health>(e).map(|h| h.max), Some(25.0));
        assert_eq!(w.components().healths.iter().filter(|(id, _)| *id == e).count(), 1);
    }

    #[test]
    fn test_missing_ids_are_noops() {
        let mut w = world();
        let ghost = EntityId(9999);
        assert!(w.add_component(ghost, Health::new(1.0)).is_none());
        assert!(w.get_component::<Health>(ghost).is_none());
        assert!(w.remove_component::<Health>(ghost).is_none());
        assert!(!w.destroy_entity(ghost));
        w.mark_for_deletion(ghost);
        assert!(!w.is_pending_removal(ghost));
    }

    #[test]
    fn test_destroy_clears_every_map_and_player_id() {
        let mut w = world();
        let player = w.player_id.unwrap();
        assert!(w.destroy_entity(player));
        assert!(w.player_id.is_none());
        assert!(!w.is_alive(player));
        for kind in ComponentKind::ALL {
            assert!(!w.components().contains(*kind, player));
        }
        // Second destroy is a no-op
        assert!(!w.destroy_entity(player));
    }

    #[test]
    fn test_deferred_removal() {
        let mut w = world();
        let e = w.create_entity(EntityKind::Enemy);
        w.add_component(e, Transform::at(0.0, 0.0));
        w.mark_for_deletion(e);
        assert!(w.is_alive(e));
        assert!(!w.is_active(e));
        assert!(w.get_component::<Transform>(e).is_some());

        assert_eq!(w.flush_removals(), 1);
        assert!(!w.is_alive(e));
        assert!(w.get_component::<Transform>(e).is_none());
    }

    #[test]
    fn test_query_ids_allow_mutation_while_walking() {
        let mut w = world();
        let created: Vec<EntityId> = (0..4)
            .map(|i| {
                let e = w.create_entity(EntityKind::Enemy);
                w.add_component(e, Transform::at(i as f32, 0.0));
                w.add_component(e, Velocity(Vec2::Y));
                e
            })
            .collect();
        let mut extras = Vec::new();
        for id in w.query_ids::<(Transform, Velocity)>() {
            w.add_component(id, Shield::full(5.0));
            let extra = w.create_entity(EntityKind::Particle);
            w.add_component(extra, Transform::default());
            w.add_component(extra, Velocity(Vec2::Y));
            extras.push(extra);
        }

        let shielded = w.query_ids::<(Transform, Velocity, Shield)>();
        assert!(created.iter().all(|id| shielded.contains(id)));
        // Entities created mid-walk are not visited
        assert!(extras.iter().all(|id| !w.has_component::<Shield>(*id)));
        assert_eq!(shielded.len(), extras.len());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut w = world();
        w.score = 1234;
        w.level = 1;
        let e = w.create_entity(EntityKind::Enemy);
        w.reset();
        assert_eq!(w.score, 0);
        assert_eq!(w.level, 0);
        assert!(!w.is_alive(e) || w.kind_of(e) != Some(EntityKind::Enemy));
        assert!(w.player_id.is_some());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create,
        AddTransform(usize),
        AddHealth(usize),
        AddVelocity(usize),
        RemoveHealth(usize),
        Destroy(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Create),
            (0usize..32).prop_map(Op::AddTransform),
            (0usize..32).prop_map(Op::AddHealth),
            (0usize..32).prop_map(Op::AddVelocity),
            (0usize..32).prop_map(Op::RemoveHealth),
            (0usize..32).prop_map(Op::Destroy),
        ]
    }

    proptest! {
        #[test]
        fn prop_store_invariants(ops in proptest::collection::vec(op(), 1..120)) {
            let mut w = world();
            let mut created: Vec<EntityId> = Vec::new();
            let mut destroyed: Vec<EntityId> = Vec::new();
            let pick = |created: &Vec<EntityId>, i: usize| created.get(i % created.len().max(1)).copied();

            for op in ops {
                match op {
                    Op::Create => created.push(w.create_entity(EntityKind::Enemy)),
                    Op::AddTransform(i) => if let Some(e) = pick(&created, i) {
                        w.add_component(e, Transform::default());
                    },
                    Op::AddHealth(i) => if let Some(e) = pick(&created, i) {
                        w.add_component(e, Health::new(1.0));
                    },
                    Op::AddVelocity(i) => if let Some(e) = pick(&created, i) {
                        w.add_component(e, Velocity::default());
                    },
                    Op::RemoveHealth(i) => if let Some(e) = pick(&created, i) {
                        w.remove_component::<Health>(e);
                    },
                    Op::Destroy(i) => if let Some(e) = pick(&created, i) {
                        if w.destroy_entity(e) {
                            destroyed.push(e);
                        }
                    },
                }
            }

            // Destroyed entities are gone from every map and the entity set
            for e in &destroyed {
                prop_assert!(!w.is_alive(*e));
                for kind in ComponentKind::ALL {
                    prop_assert!(!w.components().contains(*kind, *e));
                }
            }

            // Query membership matches component ownership exactly
            let matched: BTreeSet<EntityId> = w.query::<(Transform, Health)>().map(|(id, _)| id).collect();
            let kinds = [ComponentKind::Health, ComponentKind::Transform];
            let dynamic: BTreeSet<EntityId> = w.query_kinds(&kinds).collect();
            prop_assert_eq!(&matched, &dynamic);
            for (id, _) in w.entities() {
                let expected = w.has_component::<Transform>(id) && w.has_component::<Health>(id);
                prop_assert_eq!(matched.contains(&id), expected);
            }
        }
    }
}
