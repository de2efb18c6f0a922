//! Boundary to the external simulation engine
//!
//! The engine deals the shoe, tracks the count and plays every hand; this
//! crate only sends it parameters and reads back the trajectory.
//!
//! # Example
//!
//! ```no_run
//! use blackjack_sim::config::SimulationConfig;
//! use blackjack_sim::engine::{EngineClient, EngineConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = EngineClient::new(EngineConfig::default())?;
//!     let result = client.simulate(&SimulationConfig::default()).await?;
//!     println!("Final bankroll: {}", result.final_bankroll);
//!     Ok(())
//! }
//! ```

mod client;

pub use client::{EngineClient, EngineConfig, EngineError, SIMULATION_FAILED_MESSAGE};
