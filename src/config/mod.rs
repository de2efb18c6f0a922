//! Simulation configuration model
//!
//! Raw input, validation, the freeze bet schedule, and the spread ramp.

pub mod freeze;
pub mod input;
pub mod ramp;
pub mod validate;

pub use freeze::{FreezeBet, FreezeBetSchedule};
pub use input::{RawField, RawFreezeBet, RawInput};
pub use ramp::{betting_table, effective_bet, BetRamp, BetSource, EffectiveBet};
pub use validate::{validate, ConfigError, DeckCount, RangeKind, SimulationConfig};
