use super::treasury::TreasurySeries;
use crate::errors::{AppError, AppResult};
use reqwest::Client;

/// FRED (St. Louis Fed) observations client. One lookup per call.
#[derive(Clone)]
pub struct FredClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

// FRED observations response (abridged):
// {
//   "observation_start": "1776-07-04",
//   "units": "lin",
//   "count": 16120,
//   "observations": [
//     { "realtime_start": "2025-03-14", "date": "2025-03-13", "value": "4.31" },
//     { "realtime_start": "2025-03-14", "date": "2025-03-14", "value": "." }
//   ]
// }
// "." marks a day without a print (holidays).

#[derive(serde::Deserialize)]
struct ObservationsResponse {
    observations: Option<Vec<Observation>>,
}

#[derive(serde::Deserialize)]
struct Observation {
    #[allow(dead_code)]
    date: Option<String>,
    value: Option<String>,
}

impl FredClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Most recent published value of `series`, in percent.
    pub async fn latest_value(&self, series: TreasurySeries) -> AppResult<f64> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("FRED API key is missing".into()))?;

        let mut parts: smallvec::SmallVec<[String; 3]> = smallvec::SmallVec::new();
        parts.push(format!("series_id={}", series.series_id()));
        parts.push(format!("api_key={api_key}"));
        parts.push("file_type=json".to_string());
        let url = format!("{}/series/observations?{}", self.base_url, parts.join("&"));

        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let data: ObservationsResponse = resp
            .json()
            .await
            .map_err(|e| AppError::Parse(format!("FRED {series}: {e}")))?;

        latest_numeric(data.observations.as_deref().unwrap_or_default())
            .ok_or_else(|| AppError::RateLookup(format!("no observations for {series}")))
    }
}

/// Last observation carrying a number; placeholder rows are skipped.
fn latest_numeric(observations: &[Observation]) -> Option<f64> {
    observations
        .iter()
        .rev()
        .filter_map(|o| o.value.as_deref())
        .find_map(|v| v.trim().parse::<f64>().ok().filter(|x| x.is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::routing::get;
    use axum::Json;
    use serde_json::json;
    use std::collections::HashMap;

    fn obs(value: &str) -> Observation {
        Observation {
            date: None,
            value: Some(value.to_string()),
        }
    }

    #[test]
    fn test_latest_numeric_skips_placeholders() {
        let rows = [obs("4.10"), obs("4.31"), obs("."), obs("")];
        assert_eq!(latest_numeric(&rows), Some(4.31));
        assert_eq!(latest_numeric(&[obs(".")]), None);
        assert_eq!(latest_numeric(&[]), None);
    }

    async fn stub_fred() -> String {
        let app = axum::Router::new().route(
            "/fred/series/observations",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let rows = match q.get("series_id").map(String::as_str) {
                    Some("DGS3MO") => json!([{"date": "2025-03-13", "value": "4.31"}, {"date": "2025-03-14", "value": "."}]),
                    Some("DGS5") => json!([{"date": "2025-03-14", "value": "4.05"}]),
                    _ => json!([]),
                };
                Json(json!({ "observations": rows, "key_seen": q.contains_key("api_key") }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/fred")
    }

    #[tokio::test]
    async fn test_latest_value_per_series() {
        let client = FredClient::new(&stub_fred().await, Some("test-key".into()), 5);
        assert_eq!(client.latest_value(TreasurySeries::ThreeMonth).await.unwrap(), 4.31);
        assert_eq!(client.latest_value(TreasurySeries::FiveYear).await.unwrap(), 4.05);
        let err = client.latest_value(TreasurySeries::TenYear).await.unwrap_err();
        assert!(matches!(err, AppError::RateLookup(_)), "got {err}");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let client = FredClient::new("http://127.0.0.1:9/fred", None, 1);
        assert!(!client.has_api_key());
        let err = client.latest_value(TreasurySeries::TenYear).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
