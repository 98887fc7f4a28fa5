//! Veggie Merge - A drop-and-merge vegetable arcade game
//!
//! Core modules:
//! - `sim`: Merge-progression engine (merges, combo scoring, stages, loss detection)
//! - `catalog`: Tier and stage tables
//! - `tuning`: Data-driven game balance
//! - `highscores`: Best score persistence
//! - `error`: Error types for configuration and session commands
//!
//! Rigid-body simulation, rendering and audio live outside this crate. The physics
//! engine plugs in through [`sim::PhysicsWorld`]; presentation reads [`sim::GameEvent`]s.

pub mod catalog;
pub mod error;
pub mod highscores;
pub mod sim;
pub mod tuning;

pub use catalog::{Stage, StageCatalog, Tier, TierCatalog, TierIndex};
pub use error::{ConfigError, HighScoreError, ShootError};
pub use highscores::{HighScoreStore, JsonFileHighScore, MemoryHighScore};
pub use tuning::{GameConfig, Tuning};

use glam::Vec2;

/// Milliseconds on the session timeline
pub type Millis = u64;

/// Game configuration constants
pub mod consts {
    use crate::Millis;

    /// Arena dimensions (pixels)
    pub const ARENA_WIDTH: f32 = 450.0;
    pub const ARENA_HEIGHT: f32 = 800.0;
    pub const WALL_THICKNESS: f32 = 20.0;

    /// Launcher row - pieces enter here and float toward the ceiling
    pub const LAUNCHER_Y: f32 = 750.0;
    /// Initial launch speed (pixels per physics step, toward the ceiling)
    pub const LAUNCH_SPEED: f32 = 15.0;
    /// Reverse gravity: pieces fall up
    pub const BASE_GRAVITY_Y: f32 = -1.0;

    /// Default loss line shared by every stage
    pub const DANGER_LINE_Y: f32 = 650.0;

    /// Combo window - combo resets if no merge happens within this time
    pub const COMBO_WINDOW_MS: Millis = 1500;
    /// Combo multiplier cap
    pub const MAX_COMBO_MULTIPLIER: u32 = 5;
    /// Flat bonus for merging two top-tier pieces (never multiplied)
    pub const TERMINAL_MERGE_BONUS: u64 = 1000;

    /// Delay between stage clear and the next stage starting
    pub const STAGE_ADVANCE_DELAY_MS: Millis = 2500;
    /// Loss detector polling interval
    pub const LOSS_CHECK_INTERVAL_MS: Millis = 1000;
    /// A piece slower than this is considered at rest
    pub const REST_SPEED_THRESHOLD: f32 = 0.5;
    /// Time after a shot before the next piece is ready
    pub const SHOOT_COOLDOWN_MS: Millis = 600;
    /// Upper bound for any configured delay (one hour)
    pub const MAX_DELAY_MS: Millis = 60 * 60 * 1000;
}

/// Midpoint between two positions
#[inline]
pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
    (a + b) * 0.5
}
