use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

use crate::AppState;
use blackjack_sim::analytics::AnalyticsSettings;
use blackjack_sim::error::{validate_rounds_per_hour, validate_target_profit, AppError};

/// Optional overrides for the session constants
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub rounds_per_hour: Option<f64>,
    pub target_profit: Option<f64>,
}

/// Report for the latest run, or the placeholder before the first one
pub async fn get_summary(
    state: web::Data<Arc<AppState>>,
    query: web::Query<SummaryQuery>,
) -> Result<HttpResponse, AppError> {
    let defaults = state.settings.analytics;

    let rounds_per_hour = query.rounds_per_hour.unwrap_or(defaults.rounds_per_hour);
    validate_rounds_per_hour(rounds_per_hour)?;
    let target_profit = query.target_profit.unwrap_or(defaults.target_profit);
    validate_target_profit(target_profit)?;

    let settings = AnalyticsSettings {
        rounds_per_hour,
        target_profit,
    };

    let report = state.session()?.report(&settings);
    Ok(HttpResponse::Ok().json(report))
}
