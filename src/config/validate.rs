//! Simulation Config Validation
//!
//! Turns [`RawInput`] into an engine-ready [`SimulationConfig`]. Invalid input
//! is rejected here so it is never sent to the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use super::freeze::FreezeBetSchedule;
use super::input::{RawField, RawFreezeBet, RawInput};

/// Deck counts the engine supports
pub const ALLOWED_DECKS: [u8; 5] = [1, 2, 4, 6, 8];

/// 3:2 blackjack payout
pub const DEFAULT_BLACKJACK_PAYOUT: f64 = 1.5;

/// Range violation sub-kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeKind {
    SpreadInverted,
    PenetrationOutOfBounds,
    InvalidDeckCount,
    NonPositiveBankroll,
    NonPositiveSpread,
    NonPositiveHands,
    NonPositivePayout,
    NegativeBetValue,
    NegativeHandsCap,
    DuplicateCountIndex,
}

impl RangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeKind::SpreadInverted => "spread_inverted",
            RangeKind::PenetrationOutOfBounds => "penetration_out_of_bounds",
            RangeKind::InvalidDeckCount => "invalid_deck_count",
            RangeKind::NonPositiveBankroll => "non_positive_bankroll",
            RangeKind::NonPositiveSpread => "non_positive_spread",
            RangeKind::NonPositiveHands => "non_positive_hands",
            RangeKind::NonPositivePayout => "non_positive_payout",
            RangeKind::NegativeBetValue => "negative_bet_value",
            RangeKind::NegativeHandsCap => "negative_hands_cap",
            RangeKind::DuplicateCountIndex => "duplicate_count_index",
        }
    }
}

impl fmt::Display for RangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to parse {field}: {value:?}")]
    Parse { field: &'static str, value: String },

    #[error("Value out of range: {0}")]
    Range(RangeKind),
}

impl ConfigError {
    fn parse(field: &'static str, raw: &RawField) -> Self {
        ConfigError::Parse {
            field,
            value: raw.as_text(),
        }
    }
}

/// Number of decks in the shoe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DeckCount(u8);

impl DeckCount {
    pub fn new(decks: u8) -> Result<Self, ConfigError> {
        if ALLOWED_DECKS.contains(&decks) {
            Ok(Self(decks))
        } else {
            Err(ConfigError::Range(RangeKind::InvalidDeckCount))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn cards(&self) -> u32 {
        self.0 as u32 * 52
    }
}

impl TryFrom<u8> for DeckCount {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DeckCount> for u8 {
    fn from(decks: DeckCount) -> Self {
        decks.0
    }
}

/// Validated simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub bankroll: u64,
    pub spread_min: u64,
    pub spread_max: u64,
    pub decks: DeckCount,
    /// Fraction of the shoe dealt before a reshuffle
    pub penetration: f64,
    pub hands: u32,
    pub dealer_hits_soft_17: bool,
    pub blackjack_payout: f64,
    pub freeze_bets: FreezeBetSchedule,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            bankroll: 10_000,
            spread_min: 10,
            spread_max: 100,
            decks: DeckCount(6),
            penetration: 0.75,
            hands: 1000,
            dealer_hits_soft_17: false,
            blackjack_payout: DEFAULT_BLACKJACK_PAYOUT,
            freeze_bets: FreezeBetSchedule::reset(),
        }
    }
}

impl SimulationConfig {
    /// Render back to raw input; validating the result yields `self`
    pub fn to_raw(&self) -> RawInput {
        RawInput {
            bankroll: self.bankroll.to_string().into(),
            spread_min: self.spread_min.to_string().into(),
            spread_max: self.spread_max.to_string().into(),
            decks: self.decks.get().to_string().into(),
            penetration: self.penetration.to_string().into(),
            hands: self.hands.to_string().into(),
            dealer_hits_soft_17: Some(RawField::Bool(self.dealer_hits_soft_17)),
            blackjack_payout: Some(self.blackjack_payout.to_string().into()),
            freeze_bets: Some(
                self.freeze_bets
                    .iter()
                    .map(|(count, bet)| RawFreezeBet {
                        count_index: count.to_string().into(),
                        bet_value: bet.bet_value.to_string().into(),
                        hands_cap: Some(bet.hands_cap.to_string().into()),
                    })
                    .collect(),
            ),
        }
    }

    /// Copy of this config with a different schedule
    pub fn with_freeze_bets(&self, freeze_bets: FreezeBetSchedule) -> Self {
        Self {
            freeze_bets,
            ..self.clone()
        }
    }
}

/// Validate raw input into a config
pub fn validate(raw: &RawInput) -> Result<SimulationConfig, ConfigError> {
    let bankroll = parse_whole("bankroll", &raw.bankroll)?;
    if bankroll <= 0 {
        return Err(ConfigError::Range(RangeKind::NonPositiveBankroll));
    }

    let spread_min = parse_whole("spread_min", &raw.spread_min)?;
    let spread_max = parse_whole("spread_max", &raw.spread_max)?;
    if spread_min <= 0 || spread_max <= 0 {
        return Err(ConfigError::Range(RangeKind::NonPositiveSpread));
    }
    if spread_min > spread_max {
        return Err(ConfigError::Range(RangeKind::SpreadInverted));
    }

    let decks = parse_whole("decks", &raw.decks)?;
    let decks = u8::try_from(decks)
        .map_err(|_| ConfigError::Range(RangeKind::InvalidDeckCount))
        .and_then(DeckCount::new)?;

    let penetration = parse_real("penetration", &raw.penetration)?;
    if !(penetration > 0.0 && penetration <= 1.0) {
        return Err(ConfigError::Range(RangeKind::PenetrationOutOfBounds));
    }

    let hands = parse_whole("hands", &raw.hands)?;
    if hands <= 0 {
        return Err(ConfigError::Range(RangeKind::NonPositiveHands));
    }
    let hands = u32::try_from(hands).map_err(|_| ConfigError::parse("hands", &raw.hands))?;

    let dealer_hits_soft_17 = match raw.dealer_hits_soft_17 {
        Some(ref field) => parse_bool("dealer_hits_soft_17", field)?,
        None => false,
    };

    let blackjack_payout = match raw.blackjack_payout {
        Some(ref field) => parse_real("blackjack_payout", field)?,
        None => DEFAULT_BLACKJACK_PAYOUT,
    };
    if blackjack_payout <= 0.0 {
        return Err(ConfigError::Range(RangeKind::NonPositivePayout));
    }

    let freeze_bets = match raw.freeze_bets {
        Some(ref rows) => validate_freeze_bets(rows)?,
        None => FreezeBetSchedule::reset(),
    };

    Ok(SimulationConfig {
        bankroll: bankroll as u64,
        spread_min: spread_min as u64,
        spread_max: spread_max as u64,
        decks,
        penetration,
        hands,
        dealer_hits_soft_17,
        blackjack_payout,
        freeze_bets,
    })
}

/// Validate freeze bet rows; duplicate counts are rejected
pub fn validate_freeze_bets(rows: &[RawFreezeBet]) -> Result<FreezeBetSchedule, ConfigError> {
    let mut seen = BTreeSet::new();
    let mut schedule = FreezeBetSchedule::empty();

    for row in rows {
        let count = parse_whole("count_index", &row.count_index)?;
        let count =
            i32::try_from(count).map_err(|_| ConfigError::parse("count_index", &row.count_index))?;
        if !seen.insert(count) {
            return Err(ConfigError::Range(RangeKind::DuplicateCountIndex));
        }

        let bet_value = parse_whole("bet_value", &row.bet_value)?;
        if bet_value < 0 {
            return Err(ConfigError::Range(RangeKind::NegativeBetValue));
        }

        let hands_cap = match row.hands_cap {
            Some(ref field) => {
                let cap = parse_whole("hands_cap", field)?;
                if cap < 0 {
                    return Err(ConfigError::Range(RangeKind::NegativeHandsCap));
                }
                u32::try_from(cap).map_err(|_| ConfigError::parse("hands_cap", field))?
            }
            None => 0,
        };

        schedule = schedule.upsert(count, bet_value as u64, hands_cap);
    }

    Ok(schedule)
}

/// Parse a whole number; integral decimals such as "10000.0" are accepted
fn parse_whole(field: &'static str, raw: &RawField) -> Result<i64, ConfigError> {
    let text = raw.as_text();
    if let Ok(value) = text.parse::<i64>() {
        return Ok(value);
    }

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
            Ok(value as i64)
        }
        _ => Err(ConfigError::parse(field, raw)),
    }
}

fn parse_real(field: &'static str, raw: &RawField) -> Result<f64, ConfigError> {
    match raw.as_text().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ConfigError::parse(field, raw)),
    }
}

fn parse_bool(field: &'static str, raw: &RawField) -> Result<bool, ConfigError> {
    match raw.as_text().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::parse(field, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::freeze::FreezeBet;

    fn raw() -> RawInput {
        RawInput::default()
    }

    #[test]
    fn test_validate_defaults() {
        let config = validate(&raw()).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_validate_is_idempotent() {
        let inputs = vec![
            raw(),
            RawInput {
                penetration: "0.6666666666666666".into(),
                blackjack_payout: Some("1.2".into()),
                dealer_hits_soft_17: Some("TRUE".into()),
                decks: "2".into(),
                ..raw()
            },
            RawInput {
                freeze_bets: Some(vec![RawFreezeBet {
                    count_index: "-3".into(),
                    bet_value: "0".into(),
                    hands_cap: Some("12".into()),
                }]),
                ..raw()
            },
        ];

        for input in inputs {
            let once = validate(&input).unwrap();
            let twice = validate(&once.to_raw()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_spread_inverted() {
        let input = RawInput {
            spread_min: "200".into(),
            spread_max: "100".into(),
            ..raw()
        };
        assert_eq!(
            validate(&input),
            Err(ConfigError::Range(RangeKind::SpreadInverted))
        );
    }

    #[test]
    fn test_equal_spread_is_valid() {
        let input = RawInput {
            spread_min: "25".into(),
            spread_max: "25".into(),
            ..raw()
        };
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn test_penetration_bounds() {
        for bad in ["0", "-0.5", "1.01", "2"] {
            let input = RawInput {
                penetration: bad.into(),
                ..raw()
            };
            assert_eq!(
                validate(&input),
                Err(ConfigError::Range(RangeKind::PenetrationOutOfBounds)),
                "penetration {}",
                bad
            );
        }

        let full = RawInput {
            penetration: "1".into(),
            ..raw()
        };
        assert_eq!(validate(&full).unwrap().penetration, 1.0);
    }

    #[test]
    fn test_invalid_deck_count() {
        for bad in ["0", "3", "5", "7", "300"] {
            let input = RawInput {
                decks: bad.into(),
                ..raw()
            };
            assert_eq!(
                validate(&input),
                Err(ConfigError::Range(RangeKind::InvalidDeckCount)),
                "decks {}",
                bad
            );
        }
        for good in ALLOWED_DECKS {
            let input = RawInput {
                decks: good.to_string().into(),
                ..raw()
            };
            assert_eq!(validate(&input).unwrap().decks.get(), good);
        }
    }

    #[test]
    fn test_non_numeric_is_parse_error() {
        let input = RawInput {
            bankroll: "lots".into(),
            ..raw()
        };
        assert_eq!(
            validate(&input),
            Err(ConfigError::Parse {
                field: "bankroll",
                value: "lots".to_string()
            })
        );

        let input = RawInput {
            penetration: "".into(),
            ..raw()
        };
        assert!(matches!(
            validate(&input),
            Err(ConfigError::Parse {
                field: "penetration",
                ..
            })
        ));
    }

    #[test]
    fn test_fractional_whole_field_is_parse_error() {
        let input = RawInput {
            hands: "10.5".into(),
            ..raw()
        };
        assert!(matches!(
            validate(&input),
            Err(ConfigError::Parse { field: "hands", .. })
        ));

        let integral = RawInput {
            bankroll: "10000.0".into(),
            ..raw()
        };
        assert_eq!(validate(&integral).unwrap().bankroll, 10_000);
    }

    #[test]
    fn test_bool_parsing() {
        let input = RawInput {
            dealer_hits_soft_17: Some("yes".into()),
            ..raw()
        };
        assert!(matches!(
            validate(&input),
            Err(ConfigError::Parse {
                field: "dealer_hits_soft_17",
                ..
            })
        ));

        let input = RawInput {
            dealer_hits_soft_17: Some(" true ".into()),
            ..raw()
        };
        assert!(validate(&input).unwrap().dealer_hits_soft_17);
    }

    #[test]
    fn test_non_positive_values() {
        let cases = [
            (
                RawInput {
                    bankroll: "0".into(),
                    ..raw()
                },
                RangeKind::NonPositiveBankroll,
            ),
            (
                RawInput {
                    spread_min: "-10".into(),
                    ..raw()
                },
                RangeKind::NonPositiveSpread,
            ),
            (
                RawInput {
                    hands: "0".into(),
                    ..raw()
                },
                RangeKind::NonPositiveHands,
            ),
            (
                RawInput {
                    blackjack_payout: Some("0".into()),
                    ..raw()
                },
                RangeKind::NonPositivePayout,
            ),
        ];

        for (input, kind) in cases {
            assert_eq!(validate(&input), Err(ConfigError::Range(kind)));
        }
    }

    #[test]
    fn test_freeze_bets_validation() {
        let rows = vec![
            RawFreezeBet {
                count_index: "2".into(),
                bet_value: "30".into(),
                hands_cap: None,
            },
            RawFreezeBet {
                count_index: "-1".into(),
                bet_value: "0".into(),
                hands_cap: Some("5".into()),
            },
        ];
        let schedule = validate_freeze_bets(&rows).unwrap();
        assert_eq!(schedule.counts(), vec![-1, 2]);
        assert_eq!(schedule.get(-1), Some(FreezeBet::new(0, 5)));

        let dup = vec![rows[0].clone(), rows[0].clone()];
        assert_eq!(
            validate_freeze_bets(&dup),
            Err(ConfigError::Range(RangeKind::DuplicateCountIndex))
        );

        let negative = vec![RawFreezeBet {
            count_index: "0".into(),
            bet_value: "-5".into(),
            hands_cap: None,
        }];
        assert_eq!(
            validate_freeze_bets(&negative),
            Err(ConfigError::Range(RangeKind::NegativeBetValue))
        );
    }

    #[test]
    fn test_empty_freeze_bet_list_is_kept_empty() {
        let input = RawInput {
            freeze_bets: Some(Vec::new()),
            ..raw()
        };
        assert!(validate(&input).unwrap().freeze_bets.is_empty());
    }

    #[test]
    fn test_range_kind_names() {
        assert_eq!(RangeKind::SpreadInverted.to_string(), "spread_inverted");
        assert_eq!(
            serde_json::to_value(RangeKind::PenetrationOutOfBounds).unwrap(),
            "penetration_out_of_bounds"
        );
    }

    #[test]
    fn test_deck_count_serde_rejects_unsupported() {
        assert!(serde_json::from_str::<DeckCount>("6").is_ok());
        assert!(serde_json::from_str::<DeckCount>("3").is_err());
    }
}
