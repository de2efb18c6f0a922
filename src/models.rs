use serde::{Deserialize, Serialize};

use crate::config::{FreezeBetSchedule, SimulationConfig};

/// Freeze bet bucket as sent to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeBetEntry {
    pub count_index: i32,
    pub bet_value: u64,
    pub hands_cap: u32,
}

/// Body of `POST /simulate` on the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateRequest {
    pub bankroll: u64,
    pub spread_min: u64,
    pub spread_max: u64,
    pub decks: u8,
    pub penetration: f64,
    pub hands: u32,
    pub dealer_hits_soft_17: bool,
    pub blackjack_payout: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub freeze_bets: Vec<FreezeBetEntry>,
}

impl SimulateRequest {
    /// Build the engine payload for a validated config
    pub fn from_config(config: &SimulationConfig, include_freeze_bets: bool) -> Self {
        let freeze_bets = if include_freeze_bets {
            config.freeze_bets.to_entries()
        } else {
            Vec::new()
        };

        Self {
            bankroll: config.bankroll,
            spread_min: config.spread_min,
            spread_max: config.spread_max,
            decks: config.decks.get(),
            penetration: config.penetration,
            hands: config.hands,
            dealer_hits_soft_17: config.dealer_hits_soft_17,
            blackjack_payout: config.blackjack_payout,
            freeze_bets,
        }
    }
}

/// Engine response for a completed simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub bankroll_history: Vec<f64>,
    pub final_bankroll: f64,
    pub ev_per_hand: f64,
    pub hands_played: u64,
    pub win_rate: f64,
    pub wins: u64,
    pub losses: u64,
    pub pushes: u64,
    pub blackjacks: u64,
    pub total_bet: f64,
}

/// Freeze bet edit body for `PUT /freeze-bets/{count}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeBetUpdate {
    pub bet_value: u64,
    #[serde(default)]
    pub hands_cap: u32,
}

/// One row of the freeze bet view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeBetView {
    pub count_index: i32,
    pub bet_value: u64,
    pub hands_cap: u32,
    /// Bet the engine would place at this count without the override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ramp_bet: Option<u64>,
}

impl FreezeBetView {
    pub fn rows(schedule: &FreezeBetSchedule, ramp: Option<&crate::config::BetRamp>) -> Vec<Self> {
        schedule
            .iter()
            .map(|(count_index, bet)| FreezeBetView {
                count_index,
                bet_value: bet.bet_value,
                hands_cap: bet.hands_cap,
                ramp_bet: ramp.map(|r| r.bet_for_count(count_index as f64)),
            })
            .collect()
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine_url: String,
    pub has_result: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
