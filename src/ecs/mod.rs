//! Entity-component storage
//!
//! Entities are bare ids. Every component variant gets its own map keyed by
//! entity id, which makes "one instance per variant per entity" structural
//! rather than something the store has to police.

pub mod components;
pub mod entity;
pub mod query;
pub mod storage;

pub use components::*;
pub use entity::{EntityId, EntityKind};
pub use query::{Query, QueryIter};
pub use storage::Storage;
