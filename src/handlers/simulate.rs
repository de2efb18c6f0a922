use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::{error, info};

use crate::AppState;
use blackjack_sim::config::{validate, RawInput};
use blackjack_sim::error::AppError;
use blackjack_sim::RunOutcome;

/// Validate parameters, run the engine and return the refreshed report
pub async fn run_simulation(
    state: web::Data<Arc<AppState>>,
    req: web::Json<RawInput>,
) -> Result<HttpResponse, AppError> {
    let raw = req.into_inner();
    let config = validate(&raw)?;

    // An explicit schedule is adopted only once its run is applied
    let adopted_schedule = raw.freeze_bets.as_ref().map(|_| config.freeze_bets.clone());

    let (ticket, config) = {
        let mut session = state.session()?;
        let config = match adopted_schedule {
            Some(_) => config,
            None => config.with_freeze_bets(session.freeze_bets().clone()),
        };
        (session.begin_run(), config)
    };

    info!(
        "Run {}: bankroll {}, {} hands, {} freeze bets",
        ticket.id(),
        config.bankroll,
        config.hands,
        config.freeze_bets.len()
    );

    let outcome = state.engine.simulate(&config).await;

    let mut session = state.session()?;
    match outcome {
        Ok(result) => match session.complete_run(ticket, config, result) {
            RunOutcome::Applied => {
                if let Some(schedule) = adopted_schedule {
                    session.set_freeze_bets(schedule);
                }
                Ok(HttpResponse::Ok().json(session.report(&state.settings.analytics)))
            }
            RunOutcome::Stale => Err(AppError::StaleRun {
                request_id: ticket.id(),
                latest: session.latest_request_id(),
            }),
        },
        Err(e) => {
            error!("Run {} failed: {}", ticket.id(), e);
            session.fail_run(ticket);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App, HttpServer};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    use blackjack_sim::config::FreezeBetSchedule;

    use blackjack_sim::models::{SimulateRequest, SimulationResult};
    use blackjack_sim::{EngineConfig, Settings};

    /// Fake engine that echoes the freeze bet count as `hands_played`
    fn spawn_engine(status: u16) -> String {
        let server = HttpServer::new(move || {
            App::new().route(
                "/simulate",
                web::post().to(move |req: web::Json<SimulateRequest>| async move {
                    if status != 200 {
                        return HttpResponse::build(StatusCode::from_u16(status).unwrap())
                            .body("engine exploded");
                    }
                    let start = req.bankroll as f64;
                    HttpResponse::Ok().json(SimulationResult {
                        bankroll_history: vec![start, start + 10.0, start + 5.0, start + 20.0],
                        final_bankroll: start + 20.0,
                        ev_per_hand: 20.0 / 3.0,
                        hands_played: req.freeze_bets.len() as u64,
                        win_rate: 2.0 / 3.0,
                        wins: 2,
                        losses: 1,
                        pushes: 0,
                        blackjacks: 0,
                        total_bet: 30.0,
                    })
                }),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", addr)
    }

    /// Fake engine that starts a newer run on `slot`'s session before answering
    fn spawn_superseding_engine(slot: Arc<Mutex<Option<Arc<AppState>>>>) -> String {
        let server = HttpServer::new(move || {
            let slot = slot.clone();
            App::new().route(
                "/simulate",
                web::post().to(move |req: web::Json<SimulateRequest>| {
                    let slot = slot.clone();
                    async move {
                        if let Some(state) = slot.lock().unwrap().as_ref() {
                            state.session.lock().unwrap().begin_run();
                        }
                        let start = req.bankroll as f64;
                        HttpResponse::Ok().json(SimulationResult {
                            bankroll_history: vec![start, start - 10.0],
                            final_bankroll: start - 10.0,
                            ev_per_hand: -10.0,
                            hands_played: 1,
                            win_rate: 0.0,
                            wins: 0,
                            losses: 1,
                            pushes: 0,
                            blackjacks: 0,
                            total_bet: 10.0,
                        })
                    }
                }),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", addr)
    }

    fn state_for(base_url: String) -> Arc<AppState> {
        let settings = Settings {
            engine: EngineConfig {
                base_url,
                max_attempts: 1,
                retry_delay_ms: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        Arc::new(AppState::new(settings).unwrap())
    }

    #[actix_web::test]
    async fn test_simulate_applies_result() {
        let state = state_for(spawn_engine(200));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/simulate")
            .set_json(json!({
                "bankroll": "10000", "spread_min": "10", "spread_max": "100",
                "decks": "6", "penetration": "0.75", "hands": "3"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["request_id"], 1);
        assert_eq!(body["statistics"]["provenance"], "computed");
        assert_eq!(body["statistics"]["final_bankroll"]["value"], 10020.0);
        assert_eq!(body["bankroll_history"].as_array().unwrap().len(), 4);

        let session = state.session.lock().unwrap();
        let run = session.latest().unwrap();
        // Session schedule was sent since the request carried none
        assert_eq!(run.result.hands_played, 12);
        assert!(!session.is_running());
    }

    #[actix_web::test]
    async fn test_explicit_schedule_replaces_session_schedule() {
        let state = state_for(spawn_engine(200));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/simulate")
            .set_json(json!({
                "bankroll": 5000, "spread_min": 5, "spread_max": 50,
                "decks": 2, "penetration": 0.8, "hands": 100,
                "freeze_bets": [{"count_index": 3, "bet_value": 40}]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let session = state.session.lock().unwrap();
        assert_eq!(session.freeze_bets().counts(), vec![3]);
        assert_eq!(session.latest().unwrap().result.hands_played, 1);
    }

    #[actix_web::test]
    async fn test_invalid_input_never_reaches_engine() {
        let state = state_for("http://127.0.0.1:9".to_string());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/simulate")
            .set_json(json!({
                "bankroll": "10000", "spread_min": "200", "spread_max": "100",
                "decks": "6", "penetration": "0.75", "hands": "1000"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "spread_inverted");
        assert_eq!(state.session.lock().unwrap().latest_request_id(), 0);
    }

    #[actix_web::test]
    async fn test_engine_failure_keeps_previous_result() {
        let state = state_for(spawn_engine(500));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/simulate")
            .set_json(RawInput::default())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "simulation_failed");

        let session = state.session.lock().unwrap();
        assert!(session.latest().is_none());
        assert!(!session.is_running());
    }

    #[actix_web::test]
    async fn test_failed_run_keeps_session_schedule() {
        let state = state_for(spawn_engine(500));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/simulate")
            .set_json(json!({
                "bankroll": 5000, "spread_min": 5, "spread_max": 50,
                "decks": 2, "penetration": 0.8, "hands": 100,
                "freeze_bets": [{"count_index": 3, "bet_value": 40}]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let session = state.session.lock().unwrap();
        assert_eq!(session.freeze_bets(), &FreezeBetSchedule::reset());
        assert_eq!(session.freeze_bets().len(), 12);
        assert!(!session.is_running());
    }

    #[actix_web::test]
    async fn test_superseded_run_reports_conflict() {
        let slot = Arc::new(Mutex::new(None));
        let state = state_for(spawn_superseding_engine(slot.clone()));
        *slot.lock().unwrap() = Some(state.clone());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/simulate")
            .set_json(json!({
                "bankroll": 5000, "spread_min": 5, "spread_max": 50,
                "decks": 2, "penetration": 0.8, "hands": 100,
                "freeze_bets": [{"count_index": 3, "bet_value": 40}]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "stale_run");
        assert_eq!(body["message"], "Run 1 was superseded by run 2");

        let session = state.session.lock().unwrap();
        assert!(session.latest().is_none());
        // Dropped run does not adopt its schedule
        assert_eq!(session.freeze_bets(), &FreezeBetSchedule::reset());
        assert!(session.is_running());
    }

    #[actix_web::test]
    async fn test_malformed_json_is_error_response() {
        let state = state_for("http://127.0.0.1:9".to_string());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/simulate")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"bankroll\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "bad_request");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }
}
