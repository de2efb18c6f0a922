//! Blackjack Sim - bankroll analytics for a card-counting simulator
//!
//! This library provides:
//! - Simulation parameter validation and the per-count freeze bet schedule
//! - The request/response contract of the external simulation engine
//! - Summary statistics (hourly EV and deviation, risk of ruin, hours to target)
//! - A session that keeps the latest result and drops stale responses
//!
//! # Example
//!
//! ```
//! use blackjack_sim::analytics::{summarize, AnalyticsSettings, Stat};
//! use blackjack_sim::config::{validate, RawInput};
//! use blackjack_sim::SimulationResult;
//!
//! let config = validate(&RawInput::default()).unwrap();
//! assert_eq!(config.freeze_bets.len(), 12);
//!
//! let result = SimulationResult {
//!     bankroll_history: vec![10000.0, 10500.0, 10200.0, 11000.0],
//!     final_bankroll: 11000.0,
//!     ev_per_hand: 333.33,
//!     hands_played: 3,
//!     win_rate: 0.667,
//!     wins: 2,
//!     losses: 1,
//!     pushes: 0,
//!     blackjacks: 0,
//!     total_bet: 1600.0,
//! };
//! let stats = summarize(&result, &AnalyticsSettings::default());
//! assert_eq!(stats.percent_change, Stat::Value(10.0));
//! ```

pub mod analytics;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod models;
pub mod session;
pub mod settings;

// Re-export commonly used types
pub use analytics::{summarize, AnalyticsSettings, DerivedStatistics, ResultsReport, Stat};
pub use config::{validate, FreezeBetSchedule, RawInput, SimulationConfig};
pub use engine::{EngineClient, EngineConfig, EngineError};
pub use models::{SimulateRequest, SimulationResult};
pub use session::{RunOutcome, RunTicket, Session};
pub use settings::Settings;
