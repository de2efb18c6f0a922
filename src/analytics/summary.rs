//! Bankroll Summary Statistics
//!
//! Derive hourly EV, hourly standard deviation, risk of ruin and hours to
//! target from a completed simulation. Undefined quantities are reported as
//! [`Stat::NotApplicable`] instead of failing the whole summary.

use serde::{Deserialize, Serialize};

use crate::core::ruin::{
    hand_deltas, hands_to_hours, hands_to_target, hourly_std_dev, risk_of_ruin, sample_variance,
    AnalyticsError,
};
use crate::models::SimulationResult;

/// Hands dealt per hour at a typical full table
pub const DEFAULT_ROUNDS_PER_HOUR: f64 = 100.0;

/// Profit goal for the hours-to-target figure
pub const DEFAULT_TARGET_PROFIT: f64 = 1000.0;

/// Session-level constants the summary depends on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    pub rounds_per_hour: f64,
    /// Target bankroll is the initial bankroll plus this amount
    pub target_profit: f64,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            rounds_per_hour: DEFAULT_ROUNDS_PER_HOUR,
            target_profit: DEFAULT_TARGET_PROFIT,
        }
    }
}

/// Why a statistic has no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotApplicable {
    EmptyHistory,
    DivisionByZero,
    InsufficientSamples,
    Unreachable,
}

impl From<AnalyticsError> for NotApplicable {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::EmptyHistory => NotApplicable::EmptyHistory,
            AnalyticsError::DivisionByZero(_) => NotApplicable::DivisionByZero,
            AnalyticsError::InsufficientSamples { .. } => NotApplicable::InsufficientSamples,
            AnalyticsError::Unreachable => NotApplicable::Unreachable,
        }
    }
}

/// A statistic that may be undefined
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat<T> {
    Value(T),
    NotApplicable(NotApplicable),
}

impl<T: Copy> Stat<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            Stat::Value(v) => Some(*v),
            Stat::NotApplicable(_) => None,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, Stat::Value(_))
    }
}

impl<T> From<Result<T, AnalyticsError>> for Stat<T> {
    fn from(result: Result<T, AnalyticsError>) -> Self {
        match result {
            Ok(v) => Stat::Value(v),
            Err(e) => Stat::NotApplicable(e.into()),
        }
    }
}

/// Where a set of statistics came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Computed,
    /// Reference values shown before any simulation has run
    Placeholder,
}

/// Summary statistics derived from one simulation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedStatistics {
    pub provenance: Provenance,
    pub rounds_per_hour: f64,
    pub target_bankroll: Stat<f64>,

    // Profit/loss framing
    pub initial_bankroll: Stat<f64>,
    pub final_bankroll: Stat<f64>,
    pub is_profit: Stat<bool>,
    pub absolute_change: Stat<f64>,
    pub percent_change: Stat<f64>,

    // Hourly figures
    pub expected_hourly_value: f64,
    pub standard_deviation: Stat<f64>,

    // Risk
    pub risk_of_ruin: Stat<f64>,
    pub hours_to_target: Stat<f64>,
}

impl DerivedStatistics {
    pub fn is_placeholder(&self) -> bool {
        self.provenance == Provenance::Placeholder
    }
}

/// First and last bankroll of a trajectory
fn endpoints(history: &[f64]) -> Result<(f64, f64), AnalyticsError> {
    match (history.first(), history.last()) {
        (Some(&first), Some(&last)) => Ok((first, last)),
        _ => Err(AnalyticsError::EmptyHistory),
    }
}

fn percent_change(initial: f64, change: f64) -> Result<f64, AnalyticsError> {
    if initial == 0.0 {
        return Err(AnalyticsError::DivisionByZero("percent change"));
    }
    Ok(change * 100.0 / initial)
}

/// Summarize a simulation result
///
/// Pure: the same result and settings always give the same statistics.
pub fn summarize(result: &SimulationResult, settings: &AnalyticsSettings) -> DerivedStatistics {
    let history = &result.bankroll_history;
    let ev = result.ev_per_hand;
    let rounds_per_hour = settings.rounds_per_hour;

    let ends = endpoints(history);
    let initial = ends.map(|(first, _)| first);
    let change = ends.map(|(first, last)| last - first);

    let variance = if history.is_empty() {
        Err(AnalyticsError::EmptyHistory)
    } else {
        sample_variance(&hand_deltas(history))
    };

    // Non-positive drift is certain ruin whatever the trajectory looks like
    let risk = if ev <= 0.0 {
        Ok(1.0)
    } else {
        initial.and_then(|b| variance.map(|var| risk_of_ruin(ev, var, b)))
    };

    let target = initial.and_then(|b| {
        let target = b + settings.target_profit;
        if target.is_finite() {
            Ok(target)
        } else {
            Err(AnalyticsError::Unreachable)
        }
    });
    let hours = initial.and_then(|b| {
        let hands = hands_to_target(b, target?, ev)?;
        hands_to_hours(hands, rounds_per_hour)
    });

    DerivedStatistics {
        provenance: Provenance::Computed,
        rounds_per_hour,
        target_bankroll: target.into(),
        initial_bankroll: initial.into(),
        final_bankroll: ends.map(|(_, last)| last).into(),
        is_profit: ends.map(|(first, last)| last > first).into(),
        absolute_change: change.into(),
        percent_change: ends
            .and_then(|(first, last)| percent_change(first, last - first))
            .into(),
        expected_hourly_value: ev * rounds_per_hour,
        standard_deviation: variance
            .and_then(|var| hourly_std_dev(var.sqrt(), rounds_per_hour))
            .into(),
        risk_of_ruin: risk.into(),
        hours_to_target: hours.into(),
    }
}

/// Reference figures shown before the first run
pub fn placeholder_statistics() -> DerivedStatistics {
    DerivedStatistics {
        provenance: Provenance::Placeholder,
        rounds_per_hour: DEFAULT_ROUNDS_PER_HOUR,
        target_bankroll: Stat::Value(10_000.0 + DEFAULT_TARGET_PROFIT),
        initial_bankroll: Stat::Value(10_000.0),
        final_bankroll: Stat::Value(10_000.0),
        is_profit: Stat::Value(false),
        absolute_change: Stat::Value(0.0),
        percent_change: Stat::Value(0.0),
        expected_hourly_value: 6.00,
        standard_deviation: Stat::Value(219.61),
        risk_of_ruin: Stat::Value(0.0831),
        hours_to_target: Stat::Value(1340.87),
    }
}
