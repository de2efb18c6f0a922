//! Bankroll Risk Math
//!
//! Risk of ruin for a biased random walk (gambler's ruin, diffusion form):
//!     RoR = exp(-2 * mu * B / sigma^2)    for mu > 0
//!     RoR = 1                             for mu <= 0
//!
//! Where:
//!     mu      = expected profit per hand
//!     sigma^2 = variance of profit per hand
//!     B       = bankroll
//!
//! Hands to reach a target: (target - start) / mu.

use thiserror::Error;

/// Analytics errors
///
/// These never escape the analytics model; the summary turns them into
/// not-applicable markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    #[error("Bankroll history is empty")]
    EmptyHistory,

    #[error("Division by zero computing {0}")]
    DivisionByZero(&'static str),

    #[error("Need at least {required} samples, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("Target is unreachable with the current drift")]
    Unreachable,
}

/// Per-hand profit deltas of a bankroll trajectory
pub fn hand_deltas(history: &[f64]) -> Vec<f64> {
    history.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Sample variance (n - 1 denominator)
pub fn sample_variance(samples: &[f64]) -> Result<f64, AnalyticsError> {
    let n = samples.len();
    if n < 2 {
        return Err(AnalyticsError::InsufficientSamples {
            required: 2,
            actual: n,
        });
    }

    let mean = samples.iter().sum::<f64>() / n as f64;
    let sum_sq: f64 = samples.iter().map(|x| (x - mean).powi(2)).sum();

    Ok(sum_sq / (n - 1) as f64)
}

/// Risk of ruin
///
/// # Arguments
/// * `ev_per_hand` - Expected profit per hand (drift)
/// * `variance_per_hand` - Variance of profit per hand
/// * `bankroll` - Starting bankroll
///
/// # Returns
/// Probability of losing the whole bankroll, clamped to [0, 1]
///
/// # Examples
/// ```
/// use blackjack_sim::core::ruin::risk_of_ruin;
/// assert_eq!(risk_of_ruin(0.0, 100.0, 10_000.0), 1.0);
/// assert!(risk_of_ruin(1.0, 1_000.0, 1_000.0) < 0.2);
/// ```
pub fn risk_of_ruin(ev_per_hand: f64, variance_per_hand: f64, bankroll: f64) -> f64 {
    if ev_per_hand <= 0.0 || bankroll <= 0.0 {
        return 1.0;
    }
    if variance_per_hand <= 0.0 {
        // Deterministic positive drift never loses
        return 0.0;
    }

    (-2.0 * ev_per_hand * bankroll / variance_per_hand)
        .exp()
        .clamp(0.0, 1.0)
}

/// Bankroll needed to keep risk of ruin at `target_ror`
///
/// Inverse of [`risk_of_ruin`]: B = -sigma^2 * ln(RoR) / (2 * mu)
pub fn bankroll_for_risk(
    target_ror: f64,
    ev_per_hand: f64,
    variance_per_hand: f64,
) -> Result<f64, AnalyticsError> {
    if ev_per_hand <= 0.0 {
        return Err(AnalyticsError::Unreachable);
    }
    if !(target_ror > 0.0 && target_ror < 1.0) {
        return Err(AnalyticsError::DivisionByZero("ln(risk of ruin)"));
    }

    Ok(-variance_per_hand * target_ror.ln() / (2.0 * ev_per_hand))
}

/// Expected hands to move from `start` to `target`
pub fn hands_to_target(start: f64, target: f64, ev_per_hand: f64) -> Result<f64, AnalyticsError> {
    let distance = target - start;
    if distance == 0.0 {
        return Ok(0.0);
    }
    if ev_per_hand == 0.0 {
        return Err(AnalyticsError::Unreachable);
    }

    let hands = distance / ev_per_hand;
    if hands < 0.0 {
        // Drift points away from the target
        return Err(AnalyticsError::Unreachable);
    }

    Ok(hands)
}

/// Convert a hand count to hours of play
pub fn hands_to_hours(hands: f64, rounds_per_hour: f64) -> Result<f64, AnalyticsError> {
    if !(rounds_per_hour.is_finite() && rounds_per_hour > 0.0) {
        return Err(AnalyticsError::DivisionByZero("rounds per hour"));
    }
    Ok(hands / rounds_per_hour)
}

/// Scale a per-hand standard deviation to an hourly one
pub fn hourly_std_dev(per_hand_std_dev: f64, rounds_per_hour: f64) -> Result<f64, AnalyticsError> {
    if !(rounds_per_hour.is_finite() && rounds_per_hour > 0.0) {
        return Err(AnalyticsError::DivisionByZero("rounds per hour"));
    }
    Ok(per_hand_std_dev * rounds_per_hour.sqrt())
}
