pub mod routes;

use crate::api::client::PricingClient;
use crate::config::AppConfig;
use crate::feeds::fred::FredClient;
use axum::routing::{get, post};
use axum::Router;
use portable_atomic::AtomicU64;
use std::sync::Arc;

/// Lock-free request counters, exposed at `/api/counters`.
#[derive(Debug, Default)]
pub struct Counters {
    pub requests_proxied: AtomicU64,
    pub backend_failures: AtomicU64,
    pub payoff_curves: AtomicU64,
    pub rate_lookups: AtomicU64,
    pub invalid_requests: AtomicU64,
}

pub struct AppState {
    pub config: AppConfig,
    pub pricing: PricingClient,
    pub fred: FredClient,
    pub counters: Counters,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        let pricing = PricingClient::new(&config.pricing_api_base_url, config.request_timeout_secs);
        let fred = FredClient::new(
            &config.fred_base_url,
            config.fred_api_key.clone(),
            config.request_timeout_secs,
        );
        Arc::new(Self {
            config,
            pricing,
            fred,
            counters: Counters::default(),
        })
    }
}

/// Full HTTP surface: backend proxies, payoff generation, catalogue, counters,
/// and the built dashboard as a static fallback.
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route("/api/v1/price", post(routes::post_price))
        .route("/api/v1/calibrate", post(routes::post_calibrate))
        .route("/api/v1/market-data/{symbol}", get(routes::get_market_data))
        .route("/api/v1/risk-free-rate/{years}", get(routes::get_risk_free_rate))
        .route("/api/v1/payoff", post(routes::post_payoff))
        .route("/api/v1/catalogue", get(routes::get_catalogue))
        .route("/api/counters", get(routes::get_counters))
        .fallback_service(
            tower_http::services::ServeDir::new(&static_dir)
                .fallback(tower_http::services::ServeFile::new(static_dir.join("index.html"))),
        )
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}
