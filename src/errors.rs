/// Domain-specific error types for the desk.
/// Input validation fails fast with `InvalidParameter`; every outbound call
/// surfaces its failure as a value, never a panic.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("pricing backend error: {status} {body}")]
    Backend { status: u16, body: String },

    #[error("calibration failed: {0}")]
    Calibration(String),

    #[error("rate lookup error: {0}")]
    RateLookup(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Parse(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Network(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
