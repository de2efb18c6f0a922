//! Simulation Session
//!
//! Holds the editable freeze bet schedule and the latest completed run.
//! Runs are numbered with a monotonic sequence; only the most recently issued
//! run may replace the displayed result, so a slow response from an older
//! request is dropped instead of overwriting newer data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::{AnalyticsSettings, ResultsReport};
use crate::config::{FreezeBetSchedule, SimulationConfig};
use crate::models::SimulationResult;

/// Identifies one in-flight run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RunTicket(u64);

impl RunTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A result accepted into the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedRun {
    pub request_id: u64,
    pub completed_at: DateTime<Utc>,
    pub config: SimulationConfig,
    pub result: SimulationResult,
}

/// What happened to a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Applied,
    /// A newer run was issued; the response was dropped
    Stale,
}

/// Single-user simulation session
#[derive(Debug, Clone)]
pub struct Session {
    schedule: FreezeBetSchedule,
    last_issued: u64,
    in_flight: Option<RunTicket>,
    latest: Option<CompletedRun>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            schedule: FreezeBetSchedule::reset(),
            last_issued: 0,
            in_flight: None,
            latest: None,
        }
    }

    pub fn freeze_bets(&self) -> &FreezeBetSchedule {
        &self.schedule
    }

    /// Replace the schedule; returns the previous one
    pub fn set_freeze_bets(&mut self, schedule: FreezeBetSchedule) -> FreezeBetSchedule {
        std::mem::replace(&mut self.schedule, schedule)
    }

    pub fn upsert_freeze_bet(&mut self, count_index: i32, bet_value: u64, hands_cap: u32) {
        self.schedule = self.schedule.upsert(count_index, bet_value, hands_cap);
    }

    pub fn remove_freeze_bet(&mut self, count_index: i32) {
        self.schedule = self.schedule.remove(count_index);
    }

    pub fn reset_freeze_bets(&mut self) {
        self.schedule = FreezeBetSchedule::reset();
    }

    /// Issue a ticket for a new run, superseding any run in flight
    pub fn begin_run(&mut self) -> RunTicket {
        self.last_issued += 1;
        let ticket = RunTicket(self.last_issued);
        if let Some(previous) = self.in_flight.replace(ticket) {
            tracing::debug!("Run {} superseded by run {}", previous.0, ticket.0);
        }
        ticket
    }

    /// Id of the most recently issued run
    pub fn latest_request_id(&self) -> u64 {
        self.last_issued
    }

    pub fn is_current(&self, ticket: RunTicket) -> bool {
        ticket.0 == self.last_issued
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Accept a result if `ticket` is still the newest run
    pub fn complete_run(
        &mut self,
        ticket: RunTicket,
        config: SimulationConfig,
        result: SimulationResult,
    ) -> RunOutcome {
        if !self.is_current(ticket) {
            tracing::warn!(
                "Dropping stale result for run {} (latest is {})",
                ticket.0,
                self.last_issued
            );
            return RunOutcome::Stale;
        }

        self.in_flight = None;
        self.latest = Some(CompletedRun {
            request_id: ticket.0,
            completed_at: Utc::now(),
            config,
            result,
        });
        tracing::info!("Run {} applied", ticket.0);
        RunOutcome::Applied
    }

    /// Record a failed run; the previous result stays in place
    pub fn fail_run(&mut self, ticket: RunTicket) {
        if self.is_current(ticket) {
            self.in_flight = None;
        }
    }

    pub fn latest(&self) -> Option<&CompletedRun> {
        self.latest.as_ref()
    }

    /// Report for the latest run, or the placeholder before the first one
    pub fn report(&self, settings: &AnalyticsSettings) -> ResultsReport {
        match self.latest {
            Some(ref run) => {
                ResultsReport::build(&run.result, settings).with_run(run.request_id, run.completed_at)
            }
            None => ResultsReport::placeholder(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
