//! Spread Bet Ramp
//!
//! The engine's default bet for counts without a freeze bet:
//!     true count <= 0  -> spread_min
//!     true count >= 4  -> spread_max
//!     otherwise        -> spread_min + (spread_max - spread_min) * tc / 4
//!
//! Used to preview the effective betting schedule before a run.

use serde::{Deserialize, Serialize};

use super::freeze::FreezeBetSchedule;
use super::validate::SimulationConfig;

/// True count at which the ramp reaches the top of the spread
pub const RAMP_TOP_COUNT: f64 = 4.0;

/// Linear bet ramp between the spread bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRamp {
    pub spread_min: u64,
    pub spread_max: u64,
}

impl BetRamp {
    pub fn new(spread_min: u64, spread_max: u64) -> Self {
        Self {
            spread_min,
            spread_max,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.spread_min, config.spread_max)
    }

    /// Bet for a true count (truncated to whole units)
    pub fn bet_for_count(&self, true_count: f64) -> u64 {
        if true_count <= 0.0 {
            return self.spread_min;
        }
        if true_count >= RAMP_TOP_COUNT {
            return self.spread_max;
        }

        let span = self.spread_max.saturating_sub(self.spread_min) as f64;
        self.spread_min + (span * true_count / RAMP_TOP_COUNT) as u64
    }

    /// Spread ratio (max / min), e.g. 10.0 for a 1-10 spread
    pub fn spread_ratio(&self) -> f64 {
        if self.spread_min == 0 {
            return 0.0;
        }
        self.spread_max as f64 / self.spread_min as f64
    }
}

/// Where an effective bet comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetSource {
    Freeze,
    Ramp,
}

/// Bet placed at a count, accounting for freeze overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveBet {
    pub count_index: i32,
    pub bet: u64,
    pub hands_cap: u32,
    pub source: BetSource,
}

/// Effective bet for a count: freeze override if present, else the ramp
pub fn effective_bet(schedule: &FreezeBetSchedule, ramp: &BetRamp, count_index: i32) -> EffectiveBet {
    match schedule.get(count_index) {
        Some(freeze) => EffectiveBet {
            count_index,
            bet: freeze.bet_value,
            hands_cap: freeze.hands_cap,
            source: BetSource::Freeze,
        },
        None => EffectiveBet {
            count_index,
            bet: ramp.bet_for_count(count_index as f64),
            hands_cap: 0,
            source: BetSource::Ramp,
        },
    }
}

/// Effective bets over an inclusive count range
pub fn betting_table(config: &SimulationConfig, counts: std::ops::RangeInclusive<i32>) -> Vec<EffectiveBet> {
    let ramp = BetRamp::from_config(config);
    counts
        .map(|count| effective_bet(&config.freeze_bets, &ramp, count))
        .collect()
}
