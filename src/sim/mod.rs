//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, balance table and
//! input sequence, a session plays out identically on one machine:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod blueprint;
pub mod collision;
pub mod events;
pub mod pipeline;
pub mod snapshot;
pub mod systems;

pub use blueprint::{Blueprint, spawn_entity};
pub use collision::{CollisionLayer, CollisionResult, LayerMatrix, Shape};
pub use events::{AudioCue, Event, EventQueue};
pub use pipeline::{FrameReport, Phase, Pipeline, SystemFn};
pub use snapshot::{Snapshot, build_snapshot};
pub use systems::InputState;

use crate::world::World;

/// Advance `world` by `dt_ms` milliseconds with the standard pipeline
pub fn step(world: &mut World, input: &InputState, dt_ms: f32) -> FrameReport {
    Pipeline::standard().run_frame(world, input, dt_ms)
}
