use crate::errors::{AppError, AppResult};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pricing_api_base_url: String,
    pub fred_api_key: Option<String>,
    pub fred_base_url: String,
    pub server_port: u16,
    pub payoff_steps: usize,
    pub request_timeout_secs: u64,
    pub static_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let server_port = env_var_or("SERVER_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("SERVER_PORT: {e}")))?;

        let payoff_steps = env_var_or("PAYOFF_STEPS", "20")
            .parse::<usize>()
            .map_err(|e| AppError::Config(format!("PAYOFF_STEPS: {e}")))?;
        if payoff_steps == 0 || payoff_steps > crate::payoff::MAX_STEP_COUNT {
            return Err(AppError::Config(format!(
                "PAYOFF_STEPS must be between 1 and {}",
                crate::payoff::MAX_STEP_COUNT
            )));
        }

        let request_timeout_secs = env_var_or("REQUEST_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| AppError::Config(format!("REQUEST_TIMEOUT_SECS: {e}")))?;

        Ok(Self {
            pricing_api_base_url: env_var_or(
                "PRICING_API_BASE_URL",
                "http://127.0.0.1:8000/api/v1",
            ),
            // An empty key counts as missing; the rate route reports it per request.
            fred_api_key: std::env::var("FRED_API_KEY").ok().filter(|k| !k.is_empty()),
            fred_base_url: env_var_or("FRED_BASE_URL", "https://api.stlouisfed.org/fred"),
            server_port,
            payoff_steps,
            request_timeout_secs,
            static_dir: PathBuf::from(env_var_or("STATIC_DIR", "dashboard/dist")),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pricing_api_base_url: "http://127.0.0.1:8000/api/v1".into(),
            fred_api_key: None,
            fred_base_url: "https://api.stlouisfed.org/fred".into(),
            server_port: 3000,
            payoff_steps: crate::payoff::DEFAULT_STEP_COUNT,
            request_timeout_secs: 10,
            static_dir: PathBuf::from("dashboard/dist"),
        }
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
