use super::AppState;
use crate::api::types::{CalibrationRequest, ErrorBody, PricingRequest, RiskFreeRate};
use crate::catalogue;
use crate::errors::AppError;
use crate::feeds::treasury::TreasurySeries;
use crate::payoff::{self, OptionParameters};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use portable_atomic::Ordering::Relaxed;
use std::sync::Arc;

#[derive(serde::Deserialize)]
pub struct MarketDataQuery {
    pub total_results: Option<u32>,
}

#[derive(serde::Deserialize)]
pub struct PayoffRequest {
    #[serde(flatten)]
    pub params: OptionParameters,
    pub steps: Option<usize>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: message.into() })).into_response()
}

/// Local validation failures are the caller's fault; everything else is
/// reported with the route's generic message.
fn proxy_failure(state: &AppState, err: AppError, generic: &'static str) -> Response {
    match err {
        AppError::InvalidParameter(msg) => {
            state.counters.invalid_requests.fetch_add(1, Relaxed);
            error_response(StatusCode::BAD_REQUEST, msg)
        }
        _ => {
            state.counters.backend_failures.fetch_add(1, Relaxed);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, generic)
        }
    }
}

/// POST /api/v1/price -- forward to the pricing backend
pub async fn post_price(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PricingRequest>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    state.counters.requests_proxied.fetch_add(1, Relaxed);

    match state.pricing.price(&req).await {
        Ok(resp) => {
            tracing::info!(
                %request_id,
                model = %req.model.model(),
                solution = %req.solution_type,
                price = resp.price,
                "priced"
            );
            Json(resp).into_response()
        }
        Err(e) => {
            tracing::warn!(%request_id, error = %e, "price request failed");
            proxy_failure(&state, e, "Failed to fetch price")
        }
    }
}

/// POST /api/v1/calibrate -- forward to the backend; `success: false` is relayed as-is
pub async fn post_calibrate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CalibrationRequest>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    state.counters.requests_proxied.fetch_add(1, Relaxed);

    match state.pricing.calibrate(&req).await {
        Ok(resp) => {
            if resp.success {
                tracing::info!(%request_id, symbol = %req.symbol, kappa = resp.kappa, rho = resp.rho, "calibrated");
            } else {
                tracing::warn!(
                    %request_id,
                    symbol = %req.symbol,
                    error = resp.error.as_deref().unwrap_or(""),
                    "calibration unsuccessful"
                );
            }
            Json(resp).into_response()
        }
        Err(e) => {
            tracing::warn!(%request_id, symbol = %req.symbol, error = %e, "calibrate request failed");
            proxy_failure(&state, e, "Failed to calibrate")
        }
    }
}

/// GET /api/v1/market-data/{symbol} -- listed contracts for a ticker
pub async fn get_market_data(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(params): Query<MarketDataQuery>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    state.counters.requests_proxied.fetch_add(1, Relaxed);

    match state.pricing.market_data(&symbol, params.total_results).await {
        Ok(quotes) => {
            tracing::info!(%request_id, symbol = %symbol, contracts = quotes.len(), "market data");
            Json(quotes).into_response()
        }
        Err(e) => {
            tracing::warn!(%request_id, symbol = %symbol, error = %e, "market data request failed");
            proxy_failure(&state, e, "Failed to fetch data")
        }
    }
}

/// GET /api/v1/risk-free-rate/{years} -- latest Treasury yield for the horizon, in percent
pub async fn get_risk_free_rate(
    State(state): State<Arc<AppState>>,
    Path(years): Path<String>,
) -> Response {
    let series = match years.trim().parse::<f64>().map_err(|_| ()).and_then(|y| {
        TreasurySeries::for_horizon(y).map_err(|_| ())
    }) {
        Ok(s) => s,
        Err(()) => return error_response(StatusCode::BAD_REQUEST, "Years must be a valid number"),
    };

    if !state.fred.has_api_key() {
        tracing::error!("risk-free rate requested but FRED_API_KEY is not set");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "API Key is missing.");
    }

    state.counters.rate_lookups.fetch_add(1, Relaxed);
    match state.fred.latest_value(series).await {
        Ok(value) => {
            tracing::info!(series = %series, label = series.label(), value, "risk-free rate");
            Json(RiskFreeRate { value }).into_response()
        }
        Err(AppError::RateLookup(msg)) => {
            tracing::warn!(series = %series, "{msg}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "No data available for the selected rate.",
            )
        }
        Err(e) => {
            tracing::error!(series = %series, error = %e, "error in risk-free-rate lookup");
            state.counters.backend_failures.fetch_add(1, Relaxed);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error fetching risk-free rate.")
        }
    }
}

/// POST /api/v1/payoff -- payoff/profit diagram data (pure, no IO)
pub async fn post_payoff(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PayoffRequest>,
) -> Response {
    let steps = req.steps.unwrap_or(state.config.payoff_steps);
    match payoff::generate(&req.params, steps) {
        Ok(curve) => {
            state.counters.payoff_curves.fetch_add(1, Relaxed);
            Json(curve).into_response()
        }
        Err(e) => {
            state.counters.invalid_requests.fetch_add(1, Relaxed);
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

/// GET /api/v1/catalogue -- pricing approaches, solution methods, asset types
pub async fn get_catalogue() -> Json<Vec<catalogue::ModelEntry>> {
    Json(catalogue::catalogue())
}

/// GET /api/counters -- request counters (lock-free reads)
pub async fn get_counters(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let c = &state.counters;
    Json(serde_json::json!({
        "requests_proxied": c.requests_proxied.load(Relaxed),
        "backend_failures": c.backend_failures.load(Relaxed),
        "payoff_curves": c.payoff_curves.load(Relaxed),
        "rate_lookups": c.rate_lookups.load(Relaxed),
        "invalid_requests": c.invalid_requests.load(Relaxed),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::server::router;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get as get_route, post};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    // Nothing listens on the discard port: every outbound call fails fast.
    const DEAD_BACKEND: &str = "http://127.0.0.1:9/api/v1";

    fn state_with(pricing_url: &str, fred_key: Option<&str>) -> Arc<AppState> {
        AppState::new(AppConfig {
            pricing_api_base_url: pricing_url.to_string(),
            fred_api_key: fred_key.map(str::to_string),
            fred_base_url: "http://127.0.0.1:9/fred".into(),
            request_timeout_secs: 2,
            ..AppConfig::default()
        })
    }

    async fn send(state: Arc<AppState>, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router(state).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn price_body() -> Value {
        json!({
            "model_type": "blackScholes",
            "solution_type": "closedForm",
            "option_type": "call",
            "underlying_price": 100,
            "strike_price": 100,
            "yearsToExpiration": 1,
            "risk_free_rate": 0.05,
            "volatility": 0.2,
            "dividend_yield": 0.0
        })
    }

    async fn stub_backend() -> String {
        let app = axum::Router::new()
            .route(
                "/api/v1/price",
                post(|Json(_): Json<Value>| async {
                    Json(json!({"price": 10.23, "methodology": "Black-Scholes Closed-Form Solution"}))
                }),
            )
            .route(
                "/api/v1/calibrate",
                post(|Json(_): Json<Value>| async {
                    Json(json!({"success": false, "error": "not enough liquid strikes", "kappa": 0.0}))
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/v1")
    }

    #[tokio::test]
    async fn test_payoff_route_matches_generator() {
        let state = state_with(DEAD_BACKEND, None);
        let body = json!({
            "optionType": "call", "underlyingPrice": 100, "strikePrice": 150, "volatility": 0.1
        });
        let (status, curve) = send(state.clone(), post_json("/api/v1/payoff", body)).await;
        assert_eq!(status, StatusCode::OK);
        let points = curve["points"].as_array().unwrap();
        assert_eq!(points.len(), 21);
        assert_eq!(curve["minPrice"], 50.0);
        assert_eq!(curve["maxPrice"], 150.0);
        assert_eq!(points[20]["longProfit"], -4.0);
        assert_eq!(points[20]["shortProfit"], 4.0);
        assert_eq!(state.counters.payoff_curves.load(Relaxed), 1);
    }

    #[tokio::test]
    async fn test_payoff_route_custom_steps_and_rejection() {
        let state = state_with(DEAD_BACKEND, None);
        let body = json!({
            "option_type": "put", "underlying_price": 100, "strike_price": 90,
            "volatility": 0.2, "steps": 1
        });
        let (status, curve) = send(state.clone(), post_json("/api/v1/payoff", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(curve["points"][0]["longPayoff"], 40.0);

        let bad = json!({"optionType": "put", "underlyingPrice": -1, "strikePrice": 90, "volatility": 0.2});
        let (status, err) = send(state, post_json("/api/v1/payoff", bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"].as_str().unwrap().contains("underlying price"));
    }

    #[tokio::test]
    async fn test_payoff_route_rejects_oversized_steps() {
        let state = state_with(DEAD_BACKEND, None);
        let body = json!({
            "optionType": "call", "underlyingPrice": 1e12, "strikePrice": 1e12,
            "volatility": 0.2, "steps": 100_000_000_000u64
        });
        let (status, err) = send(state.clone(), post_json("/api/v1/payoff", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(err["error"].as_str().unwrap().contains("at most"), "got {err}");
        assert_eq!(state.counters.payoff_curves.load(Relaxed), 0);
        assert_eq!(state.counters.invalid_requests.load(Relaxed), 1);
    }

    #[tokio::test]
    async fn test_price_proxy_passes_backend_result() {
        let state = state_with(&stub_backend().await, None);
        let (status, body) = send(state.clone(), post_json("/api/v1/price", price_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["price"], 10.23);
        assert!(body.get("delta").is_none());
        assert_eq!(state.counters.requests_proxied.load(Relaxed), 1);
    }

    #[tokio::test]
    async fn test_price_proxy_generic_failure() {
        let state = state_with(DEAD_BACKEND, None);
        let (status, body) = send(state.clone(), post_json("/api/v1/price", price_body())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch price");
        assert_eq!(state.counters.backend_failures.load(Relaxed), 1);
    }

    #[tokio::test]
    async fn test_price_proxy_rejects_unsupported_solution() {
        let state = state_with(DEAD_BACKEND, None);
        let mut body = price_body();
        body["solution_type"] = json!("fokkerPlanck");
        let (status, _) = send(state.clone(), post_json("/api/v1/price", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.counters.backend_failures.load(Relaxed), 0);
    }

    #[tokio::test]
    async fn test_calibrate_relays_unsuccessful_payload() {
        let state = state_with(&stub_backend().await, None);
        let body = json!({
            "symbol": "AAPL", "expiration": "2025-06-20",
            "underlying_price": 190.0, "risk_free_rate": 0.045
        });
        let (status, resp) = send(state, post_json("/api/v1/calibrate", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["success"], false);
        assert_eq!(resp["error"], "not enough liquid strikes");
    }

    #[tokio::test]
    async fn test_calibrate_and_market_data_failures() {
        let state = state_with(DEAD_BACKEND, None);
        let body = json!({
            "symbol": "AAPL", "expiration": "2025-06-20",
            "underlying_price": 190.0, "risk_free_rate": 0.045
        });
        let (status, resp) = send(state.clone(), post_json("/api/v1/calibrate", body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp["error"], "Failed to calibrate");

        let (status, resp) = send(state, get("/api/v1/market-data/AAPL")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp["error"], "Failed to fetch data");
    }

    #[tokio::test]
    async fn test_risk_free_rate_errors() {
        let (status, body) = send(state_with(DEAD_BACKEND, Some("k")), get("/api/v1/risk-free-rate/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Years must be a valid number");

        let (status, body) = send(state_with(DEAD_BACKEND, None), get("/api/v1/risk-free-rate/2")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "API Key is missing.");

        let (status, body) = send(state_with(DEAD_BACKEND, Some("k")), get("/api/v1/risk-free-rate/0.5")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Error fetching risk-free rate.");
    }

    #[tokio::test]
    async fn test_risk_free_rate_without_observations() {
        // FRED answers, but only with an empty list
        let app = axum::Router::new().route(
            "/fred/series/observations",
            get_route(|| async { Json(json!({"units": "lin", "observations": []})) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let state = AppState::new(AppConfig {
            pricing_api_base_url: DEAD_BACKEND.into(),
            fred_api_key: Some("k".into()),
            fred_base_url: format!("http://{addr}/fred"),
            request_timeout_secs: 2,
            ..AppConfig::default()
        });
        let (status, body) = send(state.clone(), get("/api/v1/risk-free-rate/2")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "No data available for the selected rate.");
        assert_eq!(state.counters.rate_lookups.load(Relaxed), 1);
        assert_eq!(state.counters.backend_failures.load(Relaxed), 0);
    }

    #[tokio::test]
    async fn test_catalogue_and_counters() {
        let state = state_with(DEAD_BACKEND, None);
        let (status, cat) = send(state.clone(), get("/api/v1/catalogue")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cat.as_array().unwrap().len(), 3);
        assert_eq!(cat[1]["label"], "Heston (Stochastic Vol)");

        let (status, counters) = send(state, get("/api/counters")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(counters["requests_proxied"], 0);
    }
}
