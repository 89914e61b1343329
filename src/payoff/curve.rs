use super::{round_cents, OptionParameters, PayoffCurve, PayoffPoint};
use crate::errors::{AppError, AppResult};

/// Samples per diagram used by the dashboard.
pub const DEFAULT_STEP_COUNT: usize = 20;

/// Upper bound on samples per diagram.
pub const MAX_STEP_COUNT: usize = 2_000;

/// Smallest spot increment that survives rounding to cents without two
/// samples collapsing onto the same price.
const MIN_SPOT_STEP: f64 = 0.01;

/// Build the long/short payoff and profit diagram for `params`.
///
/// The spot axis spans `S ± 0.5 S` with the lower bound floored at 1 and is
/// sampled at `step_count + 1` evenly spaced prices. Pure function: identical
/// inputs give identical curves.
pub fn generate(params: &OptionParameters, step_count: usize) -> AppResult<PayoffCurve> {
    validate(params, step_count)?;

    let premium = params.resolved_premium();
    let (min_price, max_price) = display_range(params.underlying_price);
    let step_size = (max_price - min_price) / step_count as f64;

    if step_size < MIN_SPOT_STEP {
        return Err(AppError::InvalidParameter(format!(
            "{step_count} steps over [{min_price}, {max_price}] is finer than one cent"
        )));
    }

    let points = (0..=step_count)
        .map(|i| {
            let spot = min_price + step_size * i as f64;
            let long_payoff = params.option_type.intrinsic(spot, params.strike_price);
            let short_payoff = -long_payoff;

            PayoffPoint {
                spot_price: round_cents(spot),
                long_payoff: round_cents(long_payoff),
                long_profit: round_cents(long_payoff - premium),
                short_payoff: round_cents(short_payoff),
                short_profit: round_cents(short_payoff + premium),
                premium: round_cents(premium),
            }
        })
        .collect();

    Ok(PayoffCurve {
        option_type: params.option_type,
        strike_price: params.strike_price,
        premium: round_cents(premium),
        min_price: round_cents(min_price),
        max_price: round_cents(max_price),
        tick_count: tick_count(params.underlying_price),
        points,
    })
}

/// Spot-axis bounds: half the underlying either side, never below 1.
#[inline]
pub fn display_range(underlying_price: f64) -> (f64, f64) {
    let price_delta = underlying_price * 0.5;
    let min_price = (underlying_price - price_delta).max(1.0);
    let max_price = underlying_price + price_delta;
    (min_price, max_price)
}

/// Axis tick hint: one tick per 20 currency units of half-range, clamped to 5..=10.
#[inline]
fn tick_count(underlying_price: f64) -> u32 {
    let half_range = (underlying_price * 0.5).abs();
    (half_range / 20.0).floor().clamp(5.0, 10.0) as u32
}

fn validate(params: &OptionParameters, step_count: usize) -> AppResult<()> {
    if step_count == 0 {
        return Err(AppError::InvalidParameter("step count must be at least 1".into()));
    }
    if step_count > MAX_STEP_COUNT {
        return Err(AppError::InvalidParameter(format!(
            "step count must be at most {MAX_STEP_COUNT}, got {step_count}"
        )));
    }
    if !params.underlying_price.is_finite() || params.underlying_price <= 0.0 {
        return Err(AppError::InvalidParameter(format!(
            "underlying price must be positive and finite, got {}",
            params.underlying_price
        )));
    }
    if !params.strike_price.is_finite() || params.strike_price <= 0.0 {
        return Err(AppError::InvalidParameter(format!(
            "strike price must be positive and finite, got {}",
            params.strike_price
        )));
    }
    if !params.volatility.is_finite() || params.volatility < 0.0 {
        return Err(AppError::InvalidParameter(format!(
            "volatility must be non-negative and finite, got {}",
            params.volatility
        )));
    }
    if let Some(p) = params.premium {
        if !p.is_finite() || p < 0.0 {
            return Err(AppError::InvalidParameter(format!(
                "premium must be non-negative and finite, got {p}"
            )));
        }
    }
    Ok(())
}
