//! Core bankroll math

pub mod ruin;

// Re-export commonly used items
pub use ruin::{
    bankroll_for_risk, hand_deltas, hands_to_hours, hands_to_target, risk_of_ruin,
    sample_variance, AnalyticsError,
};
