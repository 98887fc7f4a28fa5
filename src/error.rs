//! Error types
//!
//! Gameplay noise (contacts with walls, mismatched tiers, double reports) is never an
//! error; those are dropped inside the merge resolver. Only configuration loading,
//! high score storage and rejected commands surface as `Err`.

use std::path::PathBuf;

use crate::{Millis, TierIndex};

/// Problems loading or validating a [`crate::GameConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("tier catalog is empty")]
    NoTiers,

    #[error("tier {index} must be larger and worth more than the tier before it")]
    TiersNotAscending { index: TierIndex },

    #[error("stage catalog is empty")]
    NoStages,

    #[error("stage has id {id}, expected {expected}")]
    StageIdOutOfSequence { id: u32, expected: u32 },

    #[error("stage {id}: spawn range {spawn_range} must be within 1..={tier_count}")]
    SpawnRangeOutOfBounds {
        id: u32,
        spawn_range: usize,
        tier_count: usize,
    },

    #[error("stage {id}: goal tier {goal_tier} does not exist ({tier_count} tiers)")]
    GoalTierOutOfBounds {
        id: u32,
        goal_tier: TierIndex,
        tier_count: usize,
    },

    #[error("stage {id}: only the last stage may be endless")]
    EndlessNotLast { id: u32 },

    #[error("stage {id}: gravity scale must be positive, got {gravity_scale}")]
    InvalidGravityScale { id: u32, gravity_scale: f32 },

    #[error("stage {id}: only an endless stage may omit its goal tier")]
    NoGoal { id: u32 },

    #[error("tuning {field} must be within {min}..={max} ms, got {value}")]
    DelayOutOfRange {
        field: &'static str,
        value: Millis,
        min: Millis,
        max: Millis,
    },

    #[error("tuning {field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("arena {width}x{height} leaves no room inside {wall_thickness}px walls")]
    ArenaTooSmall {
        width: f32,
        height: f32,
        wall_thickness: f32,
    },
}

/// Why a shot was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ShootError {
    #[error("game is over")]
    GameOver,
    #[error("launcher is locked")]
    Locked,
}

/// High score file problems (logged by the session, never fatal)
#[derive(Debug, thiserror::Error)]
pub enum HighScoreError {
    #[error("high score file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("high score file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}
