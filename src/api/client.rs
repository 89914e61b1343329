use super::types::*;
use crate::errors::{AppError, AppResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Client for the remote pricing backend. All methods return Result, never panic.
/// One request per call: no retries, no caching.
#[derive(Clone)]
pub struct PricingClient {
    client: Client,
    base_url: String,
}

impl PricingClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .pool_max_idle_per_host(4)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<T>().await.map_err(|e| AppError::Parse(format!("GET {path}: {e}")))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.post(&url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<T>().await.map_err(|e| AppError::Parse(format!("POST {path}: {e}")))
    }

    /// `POST /price`. The request is shape-checked before it leaves the process.
    pub async fn price(&self, req: &PricingRequest) -> AppResult<PricingResponse> {
        req.validate()?;
        tracing::debug!(
            model = %req.model.model(),
            solution = %req.solution_type,
            option_type = %req.option_type,
            "pricing request"
        );
        self.post_json("/price", req).await
    }

    /// `POST /calibrate`. A `success: false` payload is returned as-is;
    /// use [`CalibrationResponse::into_result`] to turn it into an error.
    pub async fn calibrate(&self, req: &CalibrationRequest) -> AppResult<CalibrationResponse> {
        if req.symbol.trim().is_empty() {
            return Err(AppError::InvalidParameter("symbol must not be empty".into()));
        }
        self.post_json("/calibrate", req).await
    }

    /// `GET /market-data/{symbol}`, optionally capping the number of contracts.
    pub async fn market_data(&self, symbol: &str, total_results: Option<u32>) -> AppResult<Vec<OptionQuote>> {
        let symbol = normalize_symbol(symbol)?;
        let mut parts: smallvec::SmallVec<[String; 1]> = smallvec::SmallVec::new();
        if let Some(n) = total_results { parts.push(format!("total_results={n}")); }
        let query = if parts.is_empty() { String::new() } else { format!("?{}", parts.join("&")) };
        self.get_json(&format!("/market-data/{symbol}{query}")).await
    }
}

/// Tickers are upper-case ASCII letters, digits, `.`, `-` or `^`.
pub fn normalize_symbol(symbol: &str) -> AppResult<String> {
    let s = symbol.trim().to_ascii_uppercase();
    let valid = !s.is_empty()
        && s.len() <= 12
        && s.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^'));
    if !valid {
        return Err(AppError::InvalidParameter(format!("invalid ticker symbol: {symbol:?}")));
    }
    Ok(s)
}
