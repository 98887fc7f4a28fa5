//! Stage progression
//!
//! `Playing -> ClearPending -> (next stage) Playing` or `-> Victory`. Endless stages
//! never leave `Playing`.

use serde::{Deserialize, Serialize};

use crate::catalog::{Stage, StageCatalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StagePhase {
    Playing,
    /// Goal met, waiting for the advance timer
    ClearPending,
    /// Last stage cleared
    Victory,
}

/// Result of the delayed advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Now playing the stage at this index
    NextStage(usize),
    Victory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageProgress {
    stage_index: usize,
    goal_progress: u32,
    cleared: bool,
    phase: StagePhase,
}

impl Default for StageProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl StageProgress {
    pub fn new() -> Self {
        Self {
            stage_index: 0,
            goal_progress: 0,
            cleared: false,
            phase: StagePhase::Playing,
        }
    }

    pub fn stage_index(&self) -> usize {
        self.stage_index
    }

    pub fn goal_progress(&self) -> u32 {
        self.goal_progress
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn phase(&self) -> StagePhase {
        self.phase
    }

    /// Count one goal-tier merge. Returns true exactly once per stage: when the goal
    /// is first met.
    pub fn record_goal_progress(&mut self, stage: &Stage) -> bool {
        if stage.goal_tier.is_none() {
            return false;
        }
        self.goal_progress += 1;
        self.check_clear(stage)
    }

    fn check_clear(&mut self, stage: &Stage) -> bool {
        if stage.endless || self.cleared || self.phase != StagePhase::Playing {
            return false;
        }
        if self.goal_progress >= stage.goal_count {
            self.cleared = true;
            self.phase = StagePhase::ClearPending;
            return true;
        }
        false
    }

    /// Run the delayed transition after a clear
    pub fn complete_advance(&mut self, stages: &StageCatalog) -> Advance {
        let next = self.stage_index + 1;
        if next < stages.len() {
            self.stage_index = next;
            self.goal_progress = 0;
            self.cleared = false;
            self.phase = StagePhase::Playing;
            Advance::NextStage(next)
        } else {
            self.phase = StagePhase::Victory;
            Advance::Victory
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
