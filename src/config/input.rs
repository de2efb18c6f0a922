//! Raw user input as it arrives from a form, a JSON body, or CLI flags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single unparsed field value
///
/// Form inputs arrive as text while JSON clients send numbers or booleans;
/// all three are accepted here and parsed during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl RawField {
    pub fn text(value: impl Into<String>) -> Self {
        RawField::Text(value.into())
    }

    /// Trimmed textual form used by the parsers
    pub fn as_text(&self) -> String {
        match self {
            RawField::Bool(b) => b.to_string(),
            RawField::Number(n) => n.to_string(),
            RawField::Text(s) => s.trim().to_string(),
        }
    }
}

impl fmt::Display for RawField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField::text(value)
    }
}

impl From<String> for RawField {
    fn from(value: String) -> Self {
        RawField::Text(value)
    }
}

impl From<bool> for RawField {
    fn from(value: bool) -> Self {
        RawField::Bool(value)
    }
}

/// Unvalidated freeze bet row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFreezeBet {
    pub count_index: RawField,
    pub bet_value: RawField,
    #[serde(default)]
    pub hands_cap: Option<RawField>,
}

/// Unvalidated simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub bankroll: RawField,
    pub spread_min: RawField,
    pub spread_max: RawField,
    pub decks: RawField,
    pub penetration: RawField,
    pub hands: RawField,
    #[serde(default)]
    pub dealer_hits_soft_17: Option<RawField>,
    #[serde(default)]
    pub blackjack_payout: Option<RawField>,
    /// `None` means "use the default schedule"
    #[serde(default)]
    pub freeze_bets: Option<Vec<RawFreezeBet>>,
}

impl Default for RawInput {
    /// Defaults of the settings form
    fn default() -> Self {
        Self {
            bankroll: "10000".into(),
            spread_min: "10".into(),
            spread_max: "100".into(),
            decks: "6".into(),
            penetration: "0.75".into(),
            hands: "1000".into(),
            dealer_hits_soft_17: None,
            blackjack_payout: None,
            freeze_bets: None,
        }
    }
}
