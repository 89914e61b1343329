use crate::catalogue::{PricingModel, SolutionMethod};
use crate::errors::{AppError, AppResult};
use crate::payoff::{OptionParameters, OptionType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Pricing ──

/// Stochastic-volatility inputs the backend's Heston solvers read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HestonParams {
    /// Mean-reversion speed of the variance.
    pub kappa: f64,
    /// Long-run variance.
    pub theta: f64,
    /// Volatility of variance.
    pub xi: f64,
    pub rho: f64,
    /// Initial variance.
    pub v0: f64,
}

/// The model block of a pricing request, keyed by `model_type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model_type")]
pub enum ModelSpec {
    #[serde(rename = "blackScholes")]
    BlackScholes {},
    #[serde(rename = "heston")]
    Heston(HestonParams),
    #[serde(rename = "ou")]
    OrnsteinUhlenbeck {},
}

impl ModelSpec {
    pub fn model(&self) -> PricingModel {
        match self {
            ModelSpec::BlackScholes {} => PricingModel::BlackScholes,
            ModelSpec::Heston(_) => PricingModel::Heston,
            ModelSpec::OrnsteinUhlenbeck {} => PricingModel::OrnsteinUhlenbeck,
        }
    }
}

/// Body of `POST /api/v1/price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    #[serde(flatten)]
    pub model: ModelSpec,
    pub solution_type: SolutionMethod,
    pub option_type: OptionType,
    pub underlying_price: f64,
    pub strike_price: f64,
    #[serde(rename = "yearsToExpiration")]
    pub years_to_expiration: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    #[serde(default)]
    pub dividend_yield: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monte_carlo_simulations: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_steps: Option<u32>,
}

impl PricingRequest {
    /// Shape checks only. The backend owns every pricing decision.
    pub fn validate(&self) -> AppResult<()> {
        let model = self.model.model();
        if !model.supports(self.solution_type) {
            return Err(AppError::InvalidParameter(format!(
                "{model} cannot be solved with {}",
                self.solution_type
            )));
        }

        for (name, v) in [
            ("underlying_price", self.underlying_price),
            ("strike_price", self.strike_price),
            ("yearsToExpiration", self.years_to_expiration),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(AppError::InvalidParameter(format!("{name} must be positive, got {v}")));
            }
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(AppError::InvalidParameter(format!(
                "volatility must be non-negative, got {}",
                self.volatility
            )));
        }
        if !self.risk_free_rate.is_finite() || !self.dividend_yield.is_finite() {
            return Err(AppError::InvalidParameter("rates must be finite".into()));
        }

        if self.solution_type == SolutionMethod::MonteCarlo
            && !self.monte_carlo_simulations.is_some_and(|n| n > 0)
        {
            return Err(AppError::InvalidParameter(
                "monte carlo pricing needs monte_carlo_simulations > 0".into(),
            ));
        }

        if let ModelSpec::Heston(h) = &self.model {
            if [h.kappa, h.theta, h.xi, h.rho, h.v0].iter().any(|v| !v.is_finite()) {
                return Err(AppError::InvalidParameter("heston parameters must be finite".into()));
            }
            if !(-1.0..=1.0).contains(&h.rho) {
                return Err(AppError::InvalidParameter(format!("rho must lie in [-1, 1], got {}", h.rho)));
            }
            if h.v0 < 0.0 || h.theta < 0.0 {
                return Err(AppError::InvalidParameter("variances must be non-negative".into()));
            }
        }
        Ok(())
    }
}

/// Sensitivities as reported by the backend. Which ones are present depends
/// on the solution method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GreekSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vega: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rho: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

impl GreekSet {
    /// All five sensitivities, or `None` if the method reported only some.
    pub fn complete(&self) -> Option<Greeks> {
        Some(Greeks {
            delta: self.delta?,
            gamma: self.gamma?,
            theta: self.theta?,
            vega: self.vega?,
            rho: self.rho?,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == GreekSet::default()
    }
}

/// Body returned by `POST /api/v1/price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResponse {
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodology: Option<String>,
    /// Milliseconds spent in the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_time: Option<f64>,
    #[serde(flatten)]
    pub greeks: GreekSet,
}

// ── Calibration ──

/// Body of `POST /api/v1/calibrate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationRequest {
    pub symbol: String,
    pub expiration: NaiveDate,
    pub underlying_price: f64,
    pub risk_free_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividend_yield: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationMetrics {
    #[serde(rename = "MSE", default, skip_serializing_if = "Option::is_none")]
    pub mse: Option<f64>,
    #[serde(rename = "RMSE", default, skip_serializing_if = "Option::is_none")]
    pub rmse: Option<f64>,
    #[serde(rename = "MAE", default, skip_serializing_if = "Option::is_none")]
    pub mae: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_abs_error: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_rel_error_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median_rel_error_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_options_used: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_n_options: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimizer_iterations: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_time_seconds: Option<f64>,
}

/// Body returned by `POST /api/v1/calibrate`. Failures arrive as
/// `success: false` with an `error` message rather than an HTTP error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResponse {
    pub success: bool,
    #[serde(default)]
    pub kappa: f64,
    #[serde(default)]
    pub theta: f64,
    #[serde(default)]
    pub volvol: f64,
    #[serde(default)]
    pub rho: f64,
    #[serde(default)]
    pub var0: f64,
    #[serde(default)]
    pub div: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration_metrics: Option<CalibrationMetrics>,
    /// Rows the optimizer fitted against; columns vary with the data source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub market_data_used: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

/// A successful Heston fit.
#[derive(Debug, Clone, PartialEq)]
pub struct HestonCalibration {
    pub params: HestonParams,
    pub dividend_yield: f64,
    pub metrics: CalibrationMetrics,
    pub market_data_used: Vec<serde_json::Value>,
}

impl CalibrationResponse {
    pub fn into_result(self) -> AppResult<HestonCalibration> {
        if !self.success {
            return Err(AppError::Calibration(
                self.error.unwrap_or_else(|| "calibration failed".into()),
            ));
        }
        Ok(HestonCalibration {
            params: HestonParams {
                kappa: self.kappa,
                theta: self.theta,
                xi: self.volvol,
                rho: self.rho,
                v0: self.var0,
            },
            dividend_yield: self.div,
            metrics: self.calibration_metrics.unwrap_or_default(),
            market_data_used: self.market_data_used,
        })
    }
}

impl HestonCalibration {
    /// Model block for pricing with the fitted parameters.
    pub fn model_spec(&self) -> ModelSpec {
        ModelSpec::Heston(self.params)
    }
}

// ── Market data ──

/// One listed contract from `GET /api/v1/market-data/{symbol}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub symbol: String,
    pub option_type: OptionType,
    pub strike_price: f64,
    pub expiration: NaiveDate,
    pub stock_price: f64,
    pub market_price: f64,
    pub implied_volatility: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl OptionQuote {
    /// Autofill: the quote's spot, strike, implied vol and traded price.
    pub fn to_parameters(&self) -> OptionParameters {
        OptionParameters::new(
            self.option_type,
            self.stock_price,
            self.strike_price,
            self.implied_volatility,
        )
        .with_premium(self.market_price)
    }
}

// ── Rates ──

/// Latest Treasury yield, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFreeRate {
    pub value: f64,
}

/// Error payload shared by every proxy route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
