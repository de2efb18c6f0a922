use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::info;

use crate::AppState;
use blackjack_sim::config::{BetRamp, SimulationConfig};
use blackjack_sim::error::AppError;
use blackjack_sim::models::{FreezeBetUpdate, FreezeBetView};
use blackjack_sim::Session;

/// Schedule rows annotated with the ramp bet of the latest (or default) config
fn view(session: &Session) -> Vec<FreezeBetView> {
    let ramp = match session.latest() {
        Some(run) => BetRamp::from_config(&run.config),
        None => BetRamp::from_config(&SimulationConfig::default()),
    };
    FreezeBetView::rows(session.freeze_bets(), Some(&ramp))
}

/// List the freeze bet schedule in ascending count order
pub async fn list_freeze_bets(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let session = state.session()?;
    Ok(HttpResponse::Ok().json(view(&session)))
}

/// Add or replace the bucket for one count
pub async fn upsert_freeze_bet(
    state: web::Data<Arc<AppState>>,
    path: web::Path<i32>,
    req: web::Json<FreezeBetUpdate>,
) -> Result<HttpResponse, AppError> {
    let count_index = path.into_inner();
    let mut session = state.session()?;

    session.upsert_freeze_bet(count_index, req.bet_value, req.hands_cap);
    info!(
        "Freeze bet at count {} set to {} (cap {})",
        count_index, req.bet_value, req.hands_cap
    );

    Ok(HttpResponse::Ok().json(view(&session)))
}

/// Remove the bucket for one count; absent counts are a no-op
pub async fn remove_freeze_bet(
    state: web::Data<Arc<AppState>>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let count_index = path.into_inner();
    let mut session = state.session()?;

    session.remove_freeze_bet(count_index);
    Ok(HttpResponse::Ok().json(view(&session)))
}

/// Restore the default schedule
pub async fn reset_freeze_bets(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let mut session = state.session()?;

    session.reset_freeze_bets();
    info!("Freeze bets reset to defaults");

    Ok(HttpResponse::Ok().json(view(&session)))
}
