//! Trajectory Metrics
//!
//! Outcome rates, ROI and drawdown of a single simulated bankroll trajectory.

use serde::{Deserialize, Serialize};

use crate::models::SimulationResult;

/// Outcome and drawdown metrics for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryMetrics {
    // Outcome counts
    pub hands_played: u64,
    pub hit_rate: f64,
    pub loss_rate: f64,
    pub push_rate: f64,
    pub blackjack_rate: f64,

    // Money
    pub total_bet: f64,
    pub average_bet: f64,
    pub net_profit: f64,
    pub roi: f64,

    // Risk
    pub peak_bankroll: f64,
    pub trough_bankroll: f64,
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    /// Bankroll hit zero before the run finished
    pub busted: bool,
}

impl Default for TrajectoryMetrics {
    fn default() -> Self {
        Self {
            hands_played: 0,
            hit_rate: 0.0,
            loss_rate: 0.0,
            push_rate: 0.0,
            blackjack_rate: 0.0,
            total_bet: 0.0,
            average_bet: 0.0,
            net_profit: 0.0,
            roi: 0.0,
            peak_bankroll: 0.0,
            trough_bankroll: 0.0,
            max_drawdown: 0.0,
            max_drawdown_pct: 0.0,
            busted: false,
        }
    }
}

/// Largest peak-to-trough decline, absolute and relative to the peak
pub fn max_drawdown(history: &[f64]) -> (f64, f64) {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0;
    let mut max_dd_pct = 0.0;

    for &value in history {
        if value > peak {
            peak = value;
        }
        let drawdown = peak - value;
        if drawdown > max_dd {
            max_dd = drawdown;
        }
        if peak > 0.0 {
            let pct = drawdown / peak;
            if pct > max_dd_pct {
                max_dd_pct = pct;
            }
        }
    }

    (max_dd, max_dd_pct)
}

/// Calculate metrics from an engine result
pub fn calculate_metrics(result: &SimulationResult) -> TrajectoryMetrics {
    let history = &result.bankroll_history;
    if history.is_empty() {
        return TrajectoryMetrics::default();
    }

    let hands = result.hands_played;
    let rate = |count: u64| {
        if hands > 0 {
            count as f64 / hands as f64
        } else {
            0.0
        }
    };

    let first = history[0];
    let last = history[history.len() - 1];
    let net_profit = last - first;

    let peak_bankroll = history.iter().copied().fold(f64::MIN, f64::max);
    let trough_bankroll = history.iter().copied().fold(f64::MAX, f64::min);
    let (max_drawdown, max_drawdown_pct) = max_drawdown(history);

    let average_bet = if hands > 0 {
        result.total_bet / hands as f64
    } else {
        0.0
    };

    // ROI
    let roi = if result.total_bet > 0.0 {
        net_profit / result.total_bet
    } else {
        0.0
    };

    TrajectoryMetrics {
        hands_played: hands,
        hit_rate: rate(result.wins),
        loss_rate: rate(result.losses),
        push_rate: rate(result.pushes),
        blackjack_rate: rate(result.blackjacks),
        total_bet: result.total_bet,
        average_bet,
        net_profit,
        roi,
        peak_bankroll,
        trough_bankroll,
        max_drawdown,
        max_drawdown_pct,
        busted: last <= 0.0,
    }
}

/// Profit over one block of hands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentAnalysis {
    pub index: usize,
    pub start_hand: usize,
    pub end_hand: usize,
    pub start_bankroll: f64,
    pub end_bankroll: f64,
    pub profit: f64,
}

/// Split a trajectory into consecutive blocks of `hands_per_segment` hands
///
/// With hands-per-hour as the block size this gives the hour-by-hour
/// results of the run. The last block may be shorter.
pub fn analyze_by_segment(history: &[f64], hands_per_segment: usize) -> Vec<SegmentAnalysis> {
    if history.len() < 2 || hands_per_segment == 0 {
        return Vec::new();
    }

    let hands = history.len() - 1;
    (0..hands)
        .step_by(hands_per_segment)
        .enumerate()
        .map(|(index, start_hand)| {
            let end_hand = (start_hand + hands_per_segment).min(hands);
            let start_bankroll = history[start_hand];
            let end_bankroll = history[end_hand];

            SegmentAnalysis {
                index,
                start_hand,
                end_hand,
                start_bankroll,
                end_bankroll,
                profit: end_bankroll - start_bankroll,
            }
        })
        .collect()
}

/// Fraction of segments that finished ahead
pub fn winning_segment_rate(segments: &[SegmentAnalysis]) -> f64 {
    if segments.is_empty() {
        return 0.0;
    }
    let winners = segments.iter().filter(|s| s.profit > 0.0).count();
    winners as f64 / segments.len() as f64
}
