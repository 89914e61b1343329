use crate::errors::{AppError, AppResult};
use crate::payoff::round_cents;
use chrono::NaiveDate;
use serde::Serialize;

/// Treasury constant-maturity series used as the risk-free proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TreasurySeries {
    #[serde(rename = "DGS3MO")]
    ThreeMonth,
    #[serde(rename = "DGS5")]
    FiveYear,
    #[serde(rename = "DGS10")]
    TenYear,
}

impl TreasurySeries {
    /// Pick the series closest to an option's horizon:
    /// under a year uses the 3-month bill, under five the 5-year note,
    /// anything longer the 10-year note.
    pub fn for_horizon(years: f64) -> AppResult<Self> {
        if years.is_nan() {
            return Err(AppError::InvalidParameter("Years must be a valid number".into()));
        }
        Ok(if years < 1.0 {
            Self::ThreeMonth
        } else if years < 5.0 {
            Self::FiveYear
        } else {
            Self::TenYear
        })
    }

    /// FRED series identifier.
    pub fn series_id(self) -> &'static str {
        match self {
            Self::ThreeMonth => "DGS3MO",
            Self::FiveYear => "DGS5",
            Self::TenYear => "DGS10",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ThreeMonth => "3-month T-Bill",
            Self::FiveYear => "5-year Treasury Note",
            Self::TenYear => "10-year Treasury Note",
        }
    }
}

impl std::fmt::Display for TreasurySeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.series_id())
    }
}

/// Time to expiry in years (365.25-day years), rounded to two decimals.
/// Negative once the date has passed.
pub fn years_to_expiration(expiration: NaiveDate, today: NaiveDate) -> f64 {
    let days = (expiration - today).num_days() as f64;
    round_cents(days / 365.25)
}
