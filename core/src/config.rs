//! Game tuning: level scaling, scoring, timing and layout breakpoints.
//!
//! Every field has a default matching the shipped game. A host may load
//! overrides from JSON with `GameConfig::load`; missing keys fall back to
//! the defaults.

use crate::{
    error::{GameError, GameResult},
    types::Millis,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub level:  LevelConfig,
    pub timing: TimingConfig,
    pub layout: LayoutConfig,
}

/// Difficulty curve and scoring constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LevelConfig {
    pub base_pairs:            usize,
    pub pairs_per_level:       usize,
    pub max_pairs:             usize,
    /// Seconds on the clock at level 1.
    pub base_time:             u32,
    pub time_per_level:        u32,
    pub max_lives:             u32,
    pub points_per_match:      u64,
    /// Extra points per consecutive match after the first.
    pub combo_multiplier:      u64,
    /// Seconds added to the clock on every match.
    pub time_bonus_per_match:  u32,
    /// Points per remaining second when a level is cleared.
    pub time_bonus_multiplier: u64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            base_pairs:            5,
            pairs_per_level:       5,
            max_pairs:             30,
            base_time:             60,
            time_per_level:        15,
            max_lives:             5,
            points_per_match:      100,
            combo_multiplier:      50,
            time_bonus_per_match:  3,
            time_bonus_multiplier: 10,
        }
    }
}

impl LevelConfig {
    /// Pairs on the board for `level` (1-based), capped at `max_pairs`.
    pub fn pair_count(&self, level: u32) -> usize {
        let steps = level.saturating_sub(1) as usize;
        self.base_pairs
            .saturating_add(steps.saturating_mul(self.pairs_per_level))
            .min(self.max_pairs)
    }

    /// Clock budget in seconds for `level`. Uncapped, saturating at `u32::MAX`.
    pub fn time_budget(&self, level: u32) -> u32 {
        self.base_time
            .saturating_add(level.saturating_sub(1).saturating_mul(self.time_per_level))
    }

    /// Points for a match that brings the streak to `combo`.
    pub fn match_points(&self, combo: u32) -> u64 {
        self.points_per_match
            .saturating_add(u64::from(combo.saturating_sub(1)).saturating_mul(self.combo_multiplier))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub preview_ms:         Millis,
    pub mismatch_review_ms: Millis,
    pub clock_interval_ms:  Millis,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            preview_ms:         1500,
            mismatch_review_ms: 800,
            clock_interval_ms:  1000,
        }
    }
}

/// Column hints for the board renderer, keyed by total tile count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// `(max_tiles, columns)` pairs in ascending `max_tiles` order.
    pub breakpoints:      Vec<(usize, usize)>,
    pub fallback_columns: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            breakpoints:      vec![(12, 4), (20, 5), (30, 5), (42, 6)],
            fallback_columns: 6,
        }
    }
}

impl LayoutConfig {
    pub fn columns_for(&self, total_tiles: usize) -> usize {
        self.breakpoints
            .iter()
            .find(|(max_tiles, _)| total_tiles <= *max_tiles)
            .map(|(_, columns)| *columns)
            .unwrap_or(self.fallback_columns)
    }
}

impl GameConfig {
    /// Load from a JSON tuning file such as `data/game.json`.
    /// In tests, use `GameConfig::default()`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: GameConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded game config from {path}");
        Ok(config)
    }

    /// Reject tunings the engine cannot run with.
    pub fn validate(&self) -> GameResult<()> {
        let checks: [(&'static str, bool); 6] = [
            ("level.base_pairs",          self.level.base_pairs == 0),
            ("level.max_pairs",           self.level.max_pairs == 0),
            ("level.max_lives",           self.level.max_lives == 0),
            ("level.base_time",           self.level.base_time == 0),
            ("timing.clock_interval_ms",  self.timing.clock_interval_ms == 0),
            ("layout.fallback_columns",   self.layout.fallback_columns == 0),
        ];
        if let Some((field, _)) = checks.into_iter().find(|(_, bad)| *bad) {
            return Err(GameError::InvalidConfig {
                field,
                reason: "must be greater than zero".into(),
            });
        }
        let ascending = self
            .layout
            .breakpoints
            .windows(2)
            .all(|w| w[0].0 < w[1].0);
        if !ascending {
            return Err(GameError::InvalidConfig {
                field:  "layout.breakpoints",
                reason: "must be sorted by ascending tile count".into(),
            });
        }
        Ok(())
    }
}
