use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::AppState;
use blackjack_sim::error::AppError;
use blackjack_sim::models::HealthResponse;

/// Health check endpoint
pub async fn health_check(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let has_result = state.session()?.latest().is_some();

    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine_url: state.engine.config().base_url.clone(),
        has_result,
    };

    Ok(HttpResponse::Ok().json(response))
}
