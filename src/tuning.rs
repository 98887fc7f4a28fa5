//! Data-driven game balance
//!
//! Everything that shapes a run lives in [`GameConfig`]: timing windows, arena geometry
//! and the tier/stage catalogs. Defaults reproduce the shipped game; a JSON file may
//! override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Millis;
use crate::catalog::{StageCatalog, TierCatalog};
use crate::consts::*;
use crate::error::ConfigError;

/// Timing and geometry constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Scoring ===
    /// Combo resets when no merge happens for this long
    pub combo_window_ms: Millis,
    /// Cap on the combo multiplier
    pub max_combo_multiplier: u32,
    /// Flat bonus for a top-tier merge
    pub terminal_merge_bonus: u64,

    // === Timers ===
    pub stage_advance_delay_ms: Millis,
    pub loss_check_interval_ms: Millis,
    pub shoot_cooldown_ms: Millis,

    // === Physics hand-off ===
    /// Speed below which a piece counts as settled
    pub rest_speed_threshold: f32,
    pub base_gravity_y: f32,
    pub launch_speed: f32,

    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,
    pub wall_thickness: f32,
    pub launcher_y: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            combo_window_ms: COMBO_WINDOW_MS,
            max_combo_multiplier: MAX_COMBO_MULTIPLIER,
            terminal_merge_bonus: TERMINAL_MERGE_BONUS,

            stage_advance_delay_ms: STAGE_ADVANCE_DELAY_MS,
            loss_check_interval_ms: LOSS_CHECK_INTERVAL_MS,
            shoot_cooldown_ms: SHOOT_COOLDOWN_MS,

            rest_speed_threshold: REST_SPEED_THRESHOLD,
            base_gravity_y: BASE_GRAVITY_Y,
            launch_speed: LAUNCH_SPEED,

            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            wall_thickness: WALL_THICKNESS,
            launcher_y: LAUNCHER_Y,
        }
    }
}

impl Tuning {
    /// Clamp a launch x so a piece of `radius` stays clear of the side walls
    pub fn clamp_launch_x(&self, x: f32, radius: f32) -> f32 {
        let min = radius + self.wall_thickness;
        let max = (self.arena_width - radius - self.wall_thickness).max(min);
        x.clamp(min, max)
    }

    /// Reject delays that could overflow the timeline and physics values that disable
    /// shooting or loss detection
    pub fn validate(&self) -> Result<(), ConfigError> {
        let delays = [
            ("combo_window_ms", self.combo_window_ms, 0),
            ("stage_advance_delay_ms", self.stage_advance_delay_ms, 0),
            ("loss_check_interval_ms", self.loss_check_interval_ms, 1),
            ("shoot_cooldown_ms", self.shoot_cooldown_ms, 0),
        ];
        for (field, value, min) in delays {
            if !(min..=MAX_DELAY_MS).contains(&value) {
                return Err(ConfigError::DelayOutOfRange {
                    field,
                    value,
                    min,
                    max: MAX_DELAY_MS,
                });
            }
        }

        let positives = [
            ("rest_speed_threshold", self.rest_speed_threshold),
            ("launch_speed", self.launch_speed),
        ];
        for (field, value) in positives {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let walls = self.wall_thickness * 2.0;
        let fits =
            self.wall_thickness >= 0.0 && self.arena_width > walls && self.arena_height > walls;
        if !fits {
            return Err(ConfigError::ArenaTooSmall {
                width: self.arena_width,
                height: self.arena_height,
                wall_thickness: self.wall_thickness,
            });
        }
        Ok(())
    }
}

/// Complete configuration for a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tuning: Tuning,
    pub tiers: TierCatalog,
    pub stages: StageCatalog,
}

impl GameConfig {
    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!(
            "Loaded config from {} ({} tiers, {} stages)",
            path.display(),
            config.tiers.len(),
            config.stages.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tuning.validate()?;
        self.tiers.validate()?;
        self.stages.validate(&self.tiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json_str(r#"{ "tuning": { "combo_window_ms": 2000 } }"#)
            .unwrap();
        assert_eq!(config.tuning.combo_window_ms, 2000);
        assert_eq!(config.tuning.rest_speed_threshold, REST_SPEED_THRESHOLD);
        assert_eq!(config.tiers, TierCatalog::default());
        assert_eq!(config.stages, StageCatalog::default());
    }

    #[test]
    fn test_custom_stages_from_json() {
        let json = r#"{
            "stages": [
                { "id": 1, "name": "Only", "spawn_range": 2, "gravity_scale": 1.5,
                  "goal_tier": 3, "goal_count": 2 }
            ]
        }"#;
        let config = GameConfig::from_json_str(json).unwrap();
        let stage = config.stages.get(0).unwrap();
        assert_eq!(stage.goal_tier, Some(3));
        assert_eq!(stage.goal_count, 2);
        assert_eq!(stage.loss_line_y, DANGER_LINE_Y);
        assert!(!stage.endless);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let json = r#"{ "stages": [] }"#;
        assert!(matches!(
            GameConfig::from_json_str(json),
            Err(ConfigError::NoStages)
        ));
        assert!(matches!(
            GameConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let huge = r#"{ "tuning": { "combo_window_ms": 18446744073709551615 } }"#;
        assert!(matches!(
            GameConfig::from_json_str(huge),
            Err(ConfigError::DelayOutOfRange {
                field: "combo_window_ms",
                ..
            })
        ));

        let no_poll = r#"{ "tuning": { "loss_check_interval_ms": 0 } }"#;
        assert!(matches!(
            GameConfig::from_json_str(no_poll),
            Err(ConfigError::DelayOutOfRange {
                field: "loss_check_interval_ms",
                ..
            })
        ));

        let never_rests = r#"{ "tuning": { "rest_speed_threshold": -1.0 } }"#;
        assert!(matches!(
            GameConfig::from_json_str(never_rests),
            Err(ConfigError::NotPositive {
                field: "rest_speed_threshold",
                ..
            })
        ));

        let stalled = r#"{ "tuning": { "launch_speed": 0.0 } }"#;
        assert!(matches!(
            GameConfig::from_json_str(stalled),
            Err(ConfigError::NotPositive {
                field: "launch_speed",
                ..
            })
        ));

        let cramped = r#"{ "tuning": { "arena_width": 40.0 } }"#;
        assert!(matches!(
            GameConfig::from_json_str(cramped),
            Err(ConfigError::ArenaTooSmall { .. })
        ));

        let longest = format!(r#"{{ "tuning": {{ "stage_advance_delay_ms": {MAX_DELAY_MS} }} }}"#);
        assert!(GameConfig::from_json_str(&longest).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = GameConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_clamp_launch_x() {
        let tuning = Tuning::default();
        assert_eq!(tuning.clamp_launch_x(0.0, 15.0), 35.0);
        assert_eq!(tuning.clamp_launch_x(1000.0, 15.0), 415.0);
        assert_eq!(tuning.clamp_launch_x(200.0, 110.0), 200.0);
    }
}
