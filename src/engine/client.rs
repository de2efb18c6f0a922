//! HTTP client for the simulation engine

use std::time::Duration;
use thiserror::Error;

use crate::config::SimulationConfig;
use crate::models::{SimulateRequest, SimulationResult};

/// Message shown to the user when a run fails
pub const SIMULATION_FAILED_MESSAGE: &str =
    "Simulation failed: check that the backend is reachable";

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Engine returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid engine URL: {0}")]
    InvalidUrl(String),
}

impl EngineError {
    /// Server-side failures and transport errors are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => !e.is_decode(),
            EngineError::Status { status, .. } => *status >= 500,
            EngineError::InvalidUrl(_) => false,
        }
    }
}

/// Engine client configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base URL, e.g. `http://localhost:8000`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Attempts per run, including the first
    pub max_attempts: u32,
    /// Base delay between attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Send the freeze bet schedule along with the parameters
    pub send_freeze_bets: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
            max_attempts: 2,
            retry_delay_ms: 500,
            send_freeze_bets: true,
        }
    }
}

/// Client for `POST /simulate`
#[derive(Debug, Clone)]
pub struct EngineClient {
    client: reqwest::Client,
    config: EngineConfig,
}

impl EngineClient {
    /// Create a new client with the given configuration
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
            return Err(EngineError::InvalidUrl(config.base_url));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("blackjack-sim/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Full URL of the simulate endpoint
    pub fn simulate_url(&self) -> String {
        format!("{}/simulate", self.config.base_url.trim_end_matches('/'))
    }

    /// Run one simulation, retrying transient failures
    pub async fn simulate(&self, config: &SimulationConfig) -> Result<SimulationResult, EngineError> {
        let request = SimulateRequest::from_config(config, self.config.send_freeze_bets);
        let url = self.simulate_url();
        let attempts = self.config.max_attempts.max(1);

        tracing::info!(
            "Requesting {} hands ({} decks, spread {}-{}) from {}",
            request.hands,
            request.decks,
            request.spread_min,
            request.spread_max,
            url
        );

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.post(&url, &request).await {
                Ok(result) => {
                    tracing::debug!(
                        "Engine returned {} history points",
                        result.bankroll_history.len()
                    );
                    return Ok(result);
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::warn!(
                        "Simulation request failed (attempt {}/{}): {}",
                        attempt,
                        attempts,
                        e
                    );
                    tokio::time::sleep(self.backoff(attempt)).await;
                }
                Err(e) => {
                    tracing::warn!("Simulation request failed: {}", e);
                    return Err(e);
                }
            }
        }
    }

    /// Linear backoff after the given failed attempt
    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.config.retry_delay_ms.saturating_mul(attempt as u64))
    }

    async fn post(&self, url: &str, request: &SimulateRequest) -> Result<SimulationResult, EngineError> {
        let response = self.client.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<SimulationResult>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use crate::models::SimulateRequest;

    fn engine_result(bankroll: u64) -> SimulationResult {
        SimulationResult {
            bankroll_history: vec![bankroll as f64, bankroll as f64 + 10.0],
            final_bankroll: bankroll as f64 + 10.0,
            ev_per_hand: 10.0,
            hands_played: 1,
            win_rate: 1.0,
            wins: 1,
            losses: 0,
            pushes: 0,
            blackjacks: 0,
            total_bet: 10.0,
        }
    }

    /// Fake engine that fails the first `failures` requests with a 503
    fn spawn_engine(failures: u32) -> (String, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let server = HttpServer::new(move || {
            let counter = counter.clone();
            App::new().route(
                "/simulate",
                web::post().to(move |req: web::Json<SimulateRequest>| {
                    let counter = counter.clone();
                    async move {
                        let n = counter.fetch_add(1, Ordering::SeqCst);
                        if n < failures {
                            return HttpResponse::ServiceUnavailable().body("warming up");
                        }
                        assert_eq!(req.freeze_bets.len(), 12);
                        HttpResponse::Ok().json(engine_result(req.bankroll))
                    }
                }),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        (format!("http://{}", addr), calls)
    }

    fn client_for(base_url: String, max_attempts: u32) -> EngineClient {
        EngineClient::new(EngineConfig {
            base_url,
            max_attempts,
            retry_delay_ms: 1,
            timeout_secs: 5,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.max_attempts, 2);
        assert!(config.send_freeze_bets);
    }

    #[test]
    fn test_backoff_is_linear_and_saturates() {
        let client = EngineClient::new(EngineConfig {
            retry_delay_ms: 500,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.backoff(1), Duration::from_millis(500));
        assert_eq!(client.backoff(3), Duration::from_millis(1500));

        let client = EngineClient::new(EngineConfig {
            retry_delay_ms: u64::MAX,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.backoff(2), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_simulate_url_trims_slash() {
        let client = client_for("http://localhost:8000/".to_string(), 1);
        assert_eq!(client.simulate_url(), "http://localhost:8000/simulate");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = EngineClient::new(EngineConfig {
            base_url: "localhost:8000".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(EngineError::InvalidUrl(_))));
    }

    #[test]
    fn test_status_retryability() {
        let server_error = EngineError::Status {
            status: 502,
            body: String::new(),
        };
        let rejected = EngineError::Status {
            status: 422,
            body: String::new(),
        };
        assert!(server_error.is_retryable());
        assert!(!rejected.is_retryable());
    }

    #[actix_web::test]
    async fn test_simulate_round_trip() {
        let (url, calls) = spawn_engine(0);
        let client = client_for(url, 1);

        let result = client.simulate(&SimulationConfig::default()).await.unwrap();

        assert_eq!(result.bankroll_history, vec![10_000.0, 10_010.0]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn test_simulate_retries_server_errors() {
        let (url, calls) = spawn_engine(1);
        let client = client_for(url, 3);

        let result = client.simulate(&SimulationConfig::default()).await.unwrap();

        assert_eq!(result.final_bankroll, 10_010.0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn test_simulate_gives_up_after_attempts() {
        let (url, calls) = spawn_engine(5);
        let client = client_for(url, 2);

        let err = client.simulate(&SimulationConfig::default()).await.unwrap_err();

        assert!(matches!(err, EngineError::Status { status: 503, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn test_unreachable_engine_is_transport_error() {
        // Bind and drop a listener to get a port nobody is serving
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = client_for(format!("http://127.0.0.1:{}", port), 1);

        let err = client.simulate(&SimulationConfig::default()).await.unwrap_err();
        assert!(matches!(err, EngineError::RequestFailed(_)));
    }
}
