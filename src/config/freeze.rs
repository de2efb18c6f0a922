//! Freeze Bet Schedule
//!
//! Per-count betting overrides. A bucket pins the bet at a running count,
//! optionally capped to a number of hands. Counts without a bucket fall back
//! to the engine's spread ramp (see [`super::ramp`]).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::FreezeBetEntry;

/// Count buckets covered by the default schedule
pub const DEFAULT_COUNT_RANGE: std::ops::RangeInclusive<i32> = -5..=6;

/// Default bets for counts -5 through +6
const DEFAULT_BETS: [u64; 12] = [0, 0, 0, 0, 10, 10, 20, 30, 40, 50, 50, 50];

/// Betting override for one count bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeBet {
    /// Bet at this count; 0 sits the count out
    pub bet_value: u64,
    /// Hands to play at this count; 0 means no cap
    pub hands_cap: u32,
}

impl FreezeBet {
    pub fn new(bet_value: u64, hands_cap: u32) -> Self {
        Self {
            bet_value,
            hands_cap,
        }
    }

    pub fn sits_out(&self) -> bool {
        self.bet_value == 0
    }

    pub fn is_capped(&self) -> bool {
        self.hands_cap > 0
    }
}

/// Count-indexed freeze bet schedule
///
/// Edits never mutate in place: `upsert`, `remove` and `reset` each return a
/// new schedule so callers can keep the previous one for diff or undo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<FreezeBetEntry>", into = "Vec<FreezeBetEntry>")]
pub struct FreezeBetSchedule {
    buckets: BTreeMap<i32, FreezeBet>,
}

impl FreezeBetSchedule {
    /// Schedule with no overrides
    pub fn empty() -> Self {
        Self::default()
    }

    /// Canonical default schedule (-5..=+6 with a linear-ish ramp)
    pub fn reset() -> Self {
        let buckets = DEFAULT_COUNT_RANGE
            .zip(DEFAULT_BETS)
            .map(|(count, bet)| (count, FreezeBet::new(bet, 0)))
            .collect();

        Self { buckets }
    }

    /// Insert or replace the bucket at `count_index`
    pub fn upsert(&self, count_index: i32, bet_value: u64, hands_cap: u32) -> Self {
        let mut buckets = self.buckets.clone();
        buckets.insert(count_index, FreezeBet::new(bet_value, hands_cap));
        Self { buckets }
    }

    /// Remove the bucket at `count_index`; absent buckets are a no-op
    pub fn remove(&self, count_index: i32) -> Self {
        let mut buckets = self.buckets.clone();
        buckets.remove(&count_index);
        Self { buckets }
    }

    pub fn get(&self, count_index: i32) -> Option<FreezeBet> {
        self.buckets.get(&count_index).copied()
    }

    pub fn contains(&self, count_index: i32) -> bool {
        self.buckets.contains_key(&count_index)
    }

    /// Buckets in ascending count order
    pub fn iter(&self) -> impl Iterator<Item = (i32, FreezeBet)> + '_ {
        self.buckets.iter().map(|(&count, &bet)| (count, bet))
    }

    pub fn counts(&self) -> Vec<i32> {
        self.buckets.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Wire representation, ascending by count
    pub fn to_entries(&self) -> Vec<FreezeBetEntry> {
        self.iter()
            .map(|(count_index, bet)| FreezeBetEntry {
                count_index,
                bet_value: bet.bet_value,
                hands_cap: bet.hands_cap,
            })
            .collect()
    }
}

impl From<Vec<FreezeBetEntry>> for FreezeBetSchedule {
    /// Later entries replace earlier ones with the same count
    fn from(entries: Vec<FreezeBetEntry>) -> Self {
        let buckets = entries
            .into_iter()
            .map(|e| (e.count_index, FreezeBet::new(e.bet_value, e.hands_cap)))
            .collect();
        Self { buckets }
    }
}

impl From<FreezeBetSchedule> for Vec<FreezeBetEntry> {
    fn from(schedule: FreezeBetSchedule) -> Self {
        schedule.to_entries()
    }
}
