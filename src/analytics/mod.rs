//! Results analytics for completed simulations

pub mod metrics;
pub mod summary;

pub use metrics::{analyze_by_segment, calculate_metrics, SegmentAnalysis, TrajectoryMetrics};
pub use summary::{
    placeholder_statistics, summarize, AnalyticsSettings, DerivedStatistics, NotApplicable,
    Provenance, Stat, DEFAULT_ROUNDS_PER_HOUR, DEFAULT_TARGET_PROFIT,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::SimulationResult;

/// Everything the presentation layer shows for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsReport {
    /// Run sequence number; `None` for offline or placeholder reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub statistics: DerivedStatistics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<TrajectoryMetrics>,
    /// Hour-by-hour results
    #[serde(default)]
    pub hourly: Vec<SegmentAnalysis>,
    /// Bankroll trajectory for charting
    #[serde(default)]
    pub bankroll_history: Vec<f64>,
}

impl ResultsReport {
    /// Build a report from a result; recomputed on every call
    pub fn build(result: &SimulationResult, settings: &AnalyticsSettings) -> Self {
        let hands_per_hour = settings.rounds_per_hour.round().max(0.0) as usize;

        Self {
            request_id: None,
            completed_at: None,
            statistics: summarize(result, settings),
            metrics: Some(calculate_metrics(result)),
            hourly: analyze_by_segment(&result.bankroll_history, hands_per_hour),
            bankroll_history: result.bankroll_history.clone(),
        }
    }

    /// Report shown before any run has completed
    pub fn placeholder() -> Self {
        Self {
            request_id: None,
            completed_at: None,
            statistics: placeholder_statistics(),
            metrics: None,
            hourly: Vec::new(),
            bankroll_history: Vec::new(),
        }
    }

    pub fn with_run(mut self, request_id: u64, completed_at: DateTime<Utc>) -> Self {
        self.request_id = Some(request_id);
        self.completed_at = Some(completed_at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_report() {
        let history: Vec<f64> = (0..=250).map(|i| 10_000.0 + (i % 7) as f64).collect();
        let result = SimulationResult {
            final_bankroll: *history.last().unwrap(),
            bankroll_history: history,
            ev_per_hand: 0.01,
            hands_played: 250,
            win_rate: 0.45,
            wins: 112,
            losses: 120,
            pushes: 18,
            blackjacks: 11,
            total_bet: 5000.0,
        };

        let report = ResultsReport::build(&result, &AnalyticsSettings::default());

        assert!(!report.statistics.is_placeholder());
        assert_eq!(report.hourly.len(), 3);
        assert_eq!(report.hourly[2].end_hand, 250);
        assert_eq!(report.bankroll_history.len(), 251);
        assert!(report.metrics.is_some());
        assert!(report.request_id.is_none());
    }

    #[test]
    fn test_placeholder_report() {
        let report = ResultsReport::placeholder();
        assert!(report.statistics.is_placeholder());
        assert!(report.metrics.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["statistics"]["provenance"], "placeholder");
        assert!(json.get("request_id").is_none());
    }
}
