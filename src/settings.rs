//! Runtime settings read from the environment

use std::str::FromStr;
use tracing::warn;

use crate::analytics::{AnalyticsSettings, DEFAULT_ROUNDS_PER_HOUR, DEFAULT_TARGET_PROFIT};
use crate::engine::EngineConfig;
use crate::error::{validate_rounds_per_hour, validate_target_profit, AppError};

/// Server and engine settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub engine: EngineConfig,
    pub analytics: AnalyticsSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            engine: EngineConfig::default(),
            analytics: AnalyticsSettings::default(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unparsable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let engine_defaults = defaults.engine;

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            engine: EngineConfig {
                base_url: lookup("ENGINE_URL").unwrap_or(engine_defaults.base_url),
                timeout_secs: parse_or(&lookup, "ENGINE_TIMEOUT_SECS", engine_defaults.timeout_secs),
                max_attempts: parse_or(&lookup, "ENGINE_MAX_ATTEMPTS", engine_defaults.max_attempts),
                retry_delay_ms: parse_or(
                    &lookup,
                    "ENGINE_RETRY_DELAY_MS",
                    engine_defaults.retry_delay_ms,
                ),
                send_freeze_bets: parse_or(
                    &lookup,
                    "SEND_FREEZE_BETS",
                    engine_defaults.send_freeze_bets,
                ),
            },
            analytics: AnalyticsSettings {
                rounds_per_hour: checked_or(
                    parse_or(&lookup, "ROUNDS_PER_HOUR", DEFAULT_ROUNDS_PER_HOUR),
                    "ROUNDS_PER_HOUR",
                    DEFAULT_ROUNDS_PER_HOUR,
                    validate_rounds_per_hour,
                ),
                target_profit: checked_or(
                    parse_or(&lookup, "TARGET_PROFIT", DEFAULT_TARGET_PROFIT),
                    "TARGET_PROFIT",
                    DEFAULT_TARGET_PROFIT,
                    validate_target_profit,
                ),
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Keep `value` if it passes `check`, else warn and use `default`
fn checked_or<T, C>(value: T, key: &str, default: T, check: C) -> T
where
    T: Copy + std::fmt::Display,
    C: Fn(T) -> Result<(), AppError>,
{
    match check(value) {
        Ok(()) => value,
        Err(e) => {
            warn!("Invalid {}={}: {}; using default {}", key, value, e, default);
            default
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("Invalid {}={:?}, using default {}", key, raw, default);
                default
            }
        },
        None => default,
    }
}
