//! Frame systems
//!
//! Each system is a plain `fn(&mut World, dt_ms)` run once per frame by the
//! pipeline. `dt_ms` is already scaled by the world's time scale.

pub mod ai;
pub mod boss;
pub mod buffs;
pub mod cleanup;
pub mod collide;
pub mod combo;
pub mod damage;
pub mod death;
pub mod input;
pub mod loot;
pub mod movement;
pub mod pickup;
pub mod presentation;
pub mod progression;
pub mod spawn;
pub mod weapons;

pub use input::InputState;
