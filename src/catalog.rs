//! Tier and stage tables
//!
//! Both catalogs are loaded once and never mutated. Tier order is merge order:
//! two pieces of tier `i` become one piece of tier `i + 1`.

use serde::{Deserialize, Serialize};

use crate::consts::DANGER_LINE_Y;
use crate::error::ConfigError;

/// Position of a tier in the [`TierCatalog`]
pub type TierIndex = usize;

/// A merge rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub name: String,
    /// Collision radius (pixels)
    pub radius: f32,
    /// Base points awarded when two of these merge
    pub score_value: u64,
}

impl Tier {
    pub fn new(name: &str, radius: f32, score_value: u64) -> Self {
        Self {
            name: name.to_string(),
            radius,
            score_value,
        }
    }
}

/// Tiers ordered smallest to largest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierCatalog {
    tiers: Vec<Tier>,
}

impl TierCatalog {
    pub fn new(tiers: Vec<Tier>) -> Self {
        Self { tiers }
    }

    pub fn get(&self, index: TierIndex) -> Option<&Tier> {
        self.tiers.get(index)
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Index of the largest tier
    pub fn max_index(&self) -> Option<TierIndex> {
        self.tiers.len().checked_sub(1)
    }

    /// Tier produced by merging two pieces of `index`, or `None` at the top tier
    pub fn promote(&self, index: TierIndex) -> Option<TierIndex> {
        let next = index + 1;
        (next < self.tiers.len()).then_some(next)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tier> {
        self.tiers.iter()
    }

    /// Tiers must grow in both size and value
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiers.is_empty() {
            return Err(ConfigError::NoTiers);
        }
        for (index, pair) in self.tiers.windows(2).enumerate() {
            if pair[1].radius <= pair[0].radius || pair[1].score_value <= pair[0].score_value {
                return Err(ConfigError::TiersNotAscending { index: index + 1 });
            }
        }
        Ok(())
    }
}

impl Default for TierCatalog {
    fn default() -> Self {
        Self::new(vec![
            Tier::new("corn", 15.0, 10),
            Tier::new("bean", 25.0, 20),
            Tier::new("chestnut", 35.0, 30),
            Tier::new("eggplant", 45.0, 40),
            Tier::new("carrot", 55.0, 50),
            Tier::new("cucumber", 65.0, 60),
            Tier::new("cabbage", 75.0, 70),
            Tier::new("lettuce", 85.0, 80),
            Tier::new("napa", 95.0, 90),
            Tier::new("pumpkin", 110.0, 100),
        ])
    }
}

/// A stage definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// 1-based, sequential
    pub id: u32,
    pub name: String,
    /// Exclusive upper bound on spawnable tier index
    pub spawn_range: usize,
    /// Multiplier on the base gravity
    pub gravity_scale: f32,
    /// Tier whose creation counts toward clearing the stage
    #[serde(default)]
    pub goal_tier: Option<TierIndex>,
    /// Goal-tier merges needed to clear
    #[serde(default)]
    pub goal_count: u32,
    #[serde(default = "default_loss_line_y")]
    pub loss_line_y: f32,
    /// Goal checks disabled; the stage never clears
    #[serde(default)]
    pub endless: bool,
}

fn default_loss_line_y() -> f32 {
    DANGER_LINE_Y
}

impl Stage {
    /// Whether merging into `tier` counts toward this stage's goal
    pub fn counts_toward_goal(&self, tier: TierIndex) -> bool {
        self.goal_tier.is_some_and(|goal| tier >= goal)
    }
}

/// Stages in play order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageCatalog {
    stages: Vec<Stage>,
}

impl StageCatalog {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn get(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }

    /// Check stage order, spawn ranges and goals against the tier table
    pub fn validate(&self, tiers: &TierCatalog) -> Result<(), ConfigError> {
        if self.stages.is_empty() {
            return Err(ConfigError::NoStages);
        }
        let tier_count = tiers.len();
        let last = self.stages.len() - 1;
        for (position, stage) in self.stages.iter().enumerate() {
            let expected = position as u32 + 1;
            if stage.id != expected {
                return Err(ConfigError::StageIdOutOfSequence {
                    id: stage.id,
                    expected,
                });
            }
            if stage.spawn_range == 0 || stage.spawn_range > tier_count {
                return Err(ConfigError::SpawnRangeOutOfBounds {
                    id: stage.id,
                    spawn_range: stage.spawn_range,
                    tier_count,
                });
            }
            if let Some(goal_tier) = stage.goal_tier.filter(|&goal| goal >= tier_count) {
                return Err(ConfigError::GoalTierOutOfBounds {
                    id: stage.id,
                    goal_tier,
                    tier_count,
                });
            }
            if stage.goal_tier.is_none() && !stage.endless {
                return Err(ConfigError::NoGoal { id: stage.id });
            }
            if stage.endless && position != last {
                return Err(ConfigError::EndlessNotLast { id: stage.id });
            }
            if !(stage.gravity_scale > 0.0) {
                return Err(ConfigError::InvalidGravityScale {
                    id: stage.id,
                    gravity_scale: stage.gravity_scale,
                });
            }
        }
        Ok(())
    }
}

impl Default for StageCatalog {
    fn default() -> Self {
        let stage = |id, name: &str, spawn_range, gravity_scale, goal_tier| Stage {
            id,
            name: name.to_string(),
            spawn_range,
            gravity_scale,
            goal_tier: Some(goal_tier),
            goal_count: 1,
            loss_line_y: DANGER_LINE_Y,
            endless: false,
        };
        Self::new(vec![
            stage(1, "Very Easy", 3, 0.8, 6),
            stage(2, "Easy", 4, 0.9, 7),
            stage(3, "Normal", 5, 1.0, 8),
            stage(4, "Hard", 5, 1.1, 9),
            Stage {
                id: 5,
                name: "Endless".to_string(),
                spawn_range: 5,
                gravity_scale: 1.0,
                goal_tier: None,
                goal_count: 0,
                loss_line_y: DANGER_LINE_Y,
                endless: true,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalogs_are_valid() {
        let tiers = TierCatalog::default();
        let stages = StageCatalog::default();
        assert!(tiers.validate().is_ok());
        assert!(stages.validate(&tiers).is_ok());
        assert_eq!(tiers.len(), 10);
        assert_eq!(stages.len(), 5);
        assert!(stages.get(4).unwrap().endless);
    }

    #[test]
    fn test_promote_stops_at_top_tier() {
        let tiers = TierCatalog::default();
        assert_eq!(tiers.promote(0), Some(1));
        assert_eq!(tiers.promote(8), Some(9));
        assert_eq!(tiers.promote(9), None);
        assert_eq!(tiers.max_index(), Some(9));
    }

    #[test]
    fn test_goal_counting() {
        let stages = StageCatalog::default();
        let first = stages.get(0).unwrap();
        assert!(!first.counts_toward_goal(5));
        assert!(first.counts_toward_goal(6));
        assert!(first.counts_toward_goal(9));
        // Endless has no goal tier
        assert!(!stages.get(4).unwrap().counts_toward_goal(9));
    }

    #[test]
    fn test_endless_must_be_last() {
        let tiers = TierCatalog::default();
        let mut stages: Vec<Stage> = StageCatalog::default().iter().cloned().collect();
        stages.swap(3, 4);
        stages[3].id = 4;
        stages[4].id = 5;
        let err = StageCatalog::new(stages).validate(&tiers).unwrap_err();
        assert!(matches!(err, ConfigError::EndlessNotLast { id: 4 }));
    }

    #[test]
    fn test_spawn_range_bounds() {
        let tiers = TierCatalog::new(vec![Tier::new("a", 10.0, 1), Tier::new("b", 20.0, 2)]);
        let mut stages: Vec<Stage> = StageCatalog::default().iter().take(1).cloned().collect();
        stages[0].goal_tier = Some(1);
        stages[0].spawn_range = 3;
        let err = StageCatalog::new(stages.clone()).validate(&tiers).unwrap_err();
        assert!(matches!(err, ConfigError::SpawnRangeOutOfBounds { spawn_range: 3, .. }));

        stages[0].spawn_range = 0;
        assert!(StageCatalog::new(stages).validate(&tiers).is_err());
    }

    #[test]
    fn test_goal_tier_bounds() {
        let tiers = TierCatalog::new(vec![Tier::new("a", 10.0, 1), Tier::new("b", 20.0, 2)]);
        let mut stages: Vec<Stage> = StageCatalog::default().iter().take(1).cloned().collect();
        stages[0].spawn_range = 1;
        // Default stage 1 wants tier 6
        let err = StageCatalog::new(stages).validate(&tiers).unwrap_err();
        assert!(matches!(err, ConfigError::GoalTierOutOfBounds { goal_tier: 6, .. }));
    }

    #[test]
    fn test_goal_required_unless_endless() {
        let tiers = TierCatalog::default();
        let mut stages: Vec<Stage> = StageCatalog::default().iter().cloned().collect();
        stages[2].goal_tier = None;
        let err = StageCatalog::new(stages.clone()).validate(&tiers).unwrap_err();
        assert!(matches!(err, ConfigError::NoGoal { id: 3 }));

        // The endless stage may omit it
        stages[2].goal_tier = Some(8);
        assert_eq!(stages[4].goal_tier, None);
        assert!(StageCatalog::new(stages).validate(&tiers).is_ok());
    }

    #[test]
    fn test_stage_ids_sequential() {
        let tiers = TierCatalog::default();
        let mut stages: Vec<Stage> = StageCatalog::default().iter().cloned().collect();
        stages[1].id = 7;
        let err = StageCatalog::new(stages).validate(&tiers).unwrap_err();
        assert!(matches!(err, ConfigError::StageIdOutOfSequence { id: 7, expected: 2 }));
    }

    #[test]
    fn test_tiers_must_ascend() {
        let tiers = TierCatalog::new(vec![Tier::new("a", 20.0, 1), Tier::new("b", 10.0, 2)]);
        assert!(matches!(
            tiers.validate(),
            Err(ConfigError::TiersNotAscending { index: 1 })
        ));
        assert!(matches!(TierCatalog::new(vec![]).validate(), Err(ConfigError::NoTiers)));
    }
}
