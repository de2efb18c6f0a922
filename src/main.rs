use actix_web::{error, middleware, web, App, HttpRequest, HttpServer};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod handlers;

use blackjack_sim::error::AppError;
use blackjack_sim::{EngineClient, Session, Settings};
use handlers::{freeze_bets, health, simulate, summary};

/// Application state shared across handlers
pub struct AppState {
    pub session: Mutex<Session>,
    pub engine: EngineClient,
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        let engine = EngineClient::new(settings.engine.clone())?;
        Ok(Self {
            session: Mutex::new(Session::new()),
            engine,
            settings,
        })
    }

    pub fn session(&self) -> Result<MutexGuard<'_, Session>, AppError> {
        self.session
            .lock()
            .map_err(|_| AppError::InternalError("Session lock poisoned".to_string()))
    }
}

/// Malformed JSON bodies get the same error shape as every other failure
fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Register all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .route("/health", web::get().to(health::health_check))
        .route("/simulate", web::post().to(simulate::run_simulation))
        .route("/summary", web::get().to(summary::get_summary))
        .route("/freeze-bets", web::get().to(freeze_bets::list_freeze_bets))
        .route("/freeze-bets/reset", web::post().to(freeze_bets::reset_freeze_bets))
        .route("/freeze-bets/{count}", web::put().to(freeze_bets::upsert_freeze_bet))
        .route("/freeze-bets/{count}", web::delete().to(freeze_bets::remove_freeze_bet));
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    let settings = Settings::from_env();
    let addr = settings.bind_addr();

    info!("Simulation engine at {}", settings.engine.base_url);
    info!(
        "Analytics: {} rounds/hour, target profit {}",
        settings.analytics.rounds_per_hour, settings.analytics.target_profit
    );

    let app_state = Arc::new(
        AppState::new(settings)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?,
    );

    info!("Starting Blackjack Sim API server at http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(&addr)?
    .run()
    .await
}
