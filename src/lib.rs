//! Nova Strike - simulation core for a vertical arcade shooter
//!
//! Core modules:
//! - `ecs`: Entity ids, component storage and component queries
//! - `world`: The aggregate root owning every entity, component and session scalar
//! - `sim`: Events, the fixed-order frame pipeline, collision, spawning and snapshots
//! - `sampler`: Weighted discrete sampling (roulette and alias method)
//! - `config`: Data-driven balance tables
//! - `session`: Host-loop facing wrapper (fixed timestep, pause, observers)

pub mod config;
pub mod ecs;
pub mod error;
pub mod sampler;
pub mod session;
pub mod sim;
pub mod world;

pub use config::GameConfig;
pub use error::ConfigError;
pub use session::Session;
pub use sim::{Blueprint, InputState, Snapshot, build_snapshot, spawn_entity, step};
pub use world::World;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (120 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 120.0;
    /// Maximum substeps per host tick to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest real-time delta accepted from the host in one tick
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Default arena dimensions (y grows downward, player starts at the bottom)
    pub const ARENA_WIDTH: f32 = 480.0;
    pub const ARENA_HEIGHT: f32 = 720.0;
    /// Distance past the arena edge before bullets and enemies are culled
    pub const OFFSCREEN_MARGIN: f32 = 96.0;

    /// Bullet lifetime before expiry (ms)
    pub const BULLET_LIFETIME_MS: f32 = 4000.0;
    /// Uncollected powerups expire after this long (ms)
    pub const POWERUP_LIFETIME_MS: f32 = 8000.0;
    /// Powerups drift downward at this speed (px/s)
    pub const POWERUP_FALL_SPEED: f32 = 60.0;
    pub const POWERUP_RADIUS: f32 = 12.0;

    /// Maximum live particles
    pub const MAX_PARTICLES: usize = 256;
}

/// Milliseconds to seconds
#[inline]
pub fn ms_to_secs(ms: f32) -> f32 {
    ms / 1000.0
}

/// Unit vector pointing along `angle` (radians, 0 = +x, positive = clockwise on screen)
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a direction vector
#[inline]
pub fn angle_of(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x)
}
