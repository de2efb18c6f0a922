use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

use crate::config::ConfigError;
use crate::engine::{EngineError, SIMULATION_FAILED_MESSAGE};
use crate::models::ErrorResponse;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Invalid simulation parameters
    ValidationError(ConfigError),
    /// Invalid query or path parameter
    BadRequest(String),
    /// Engine unreachable or failed
    EngineError(EngineError),
    /// A newer run superseded this one
    StaleRun { request_id: u64, latest: u64 },
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(e) => write!(f, "Validation error: {}", e),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::EngineError(e) => write!(f, "Engine error: {}", e),
            AppError::StaleRun { request_id, latest } => write!(
                f,
                "Run {} was superseded by run {}",
                request_id, latest
            ),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::ValidationError(e)
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        AppError::EngineError(e)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::EngineError(_) => StatusCode::BAD_GATEWAY,
            AppError::StaleRun { .. } => StatusCode::CONFLICT,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(ConfigError::Range(kind)) => {
                (kind.as_str().to_string(), self.to_string())
            }
            AppError::ValidationError(ConfigError::Parse { .. }) => {
                ("parse_error".to_string(), self.to_string())
            }
            AppError::BadRequest(msg) => ("bad_request".to_string(), msg.clone()),
            // The engine detail goes to the log; the user gets one notice
            AppError::EngineError(_) => (
                "simulation_failed".to_string(),
                SIMULATION_FAILED_MESSAGE.to_string(),
            ),
            AppError::StaleRun { .. } => ("stale_run".to_string(), self.to_string()),
            AppError::InternalError(msg) => ("internal_error".to_string(), msg.clone()),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_code,
            message,
        })
    }
}

/// Validation functions
pub fn validate_rounds_per_hour(rounds: f64) -> Result<(), AppError> {
    if !rounds.is_finite() || rounds <= 0.0 {
        return Err(AppError::BadRequest(format!(
            "Rounds per hour must be positive, got {}",
            rounds
        )));
    }
    Ok(())
}

pub fn validate_target_profit(target: f64) -> Result<(), AppError> {
    if !target.is_finite() {
        return Err(AppError::BadRequest(format!(
            "Target profit must be finite, got {}",
            target
        )));
    }
    Ok(())
}
