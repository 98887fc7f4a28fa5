//! Presentation events
//!
//! The session queues these instead of calling into UI or audio code. Renderers and
//! sound players drain them after each call into the session.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::InstanceHandle;
use crate::catalog::{Stage, TierIndex};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// A piece settled past the loss line
    Loss,
    /// Every stage cleared
    Victory,
}

/// Stage summary for banners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageInfo {
    /// Position in the stage catalog
    pub index: usize,
    pub id: u32,
    pub name: String,
    pub goal_tier: Option<TierIndex>,
    pub goal_count: u32,
    pub endless: bool,
}

impl StageInfo {
    pub fn new(index: usize, stage: &Stage) -> Self {
        Self {
            index,
            id: stage.id,
            name: stage.name.clone(),
            goal_tier: stage.goal_tier,
            goal_count: stage.goal_count,
            endless: stage.endless,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreChanged(u64),
    ComboChanged(u32),
    HighScoreChanged(u64),
    StageStarted(StageInfo),
    StageCleared {
        stage: StageInfo,
        next: Option<StageInfo>,
    },
    GameOver {
        final_score: u64,
        reason: GameOverReason,
    },
    /// Preview piece changed
    NextTierChanged(TierIndex),
    Shot {
        handle: InstanceHandle,
        tier: TierIndex,
        position: Vec2,
    },
    Merged {
        tier: TierIndex,
        point: Vec2,
        terminal: bool,
        points: u64,
    },
}
