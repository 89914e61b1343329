pub mod curve;

pub use curve::{generate, DEFAULT_STEP_COUNT, MAX_STEP_COUNT};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Terminal value of one long contract at `spot`.
    #[inline]
    pub fn intrinsic(self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Contract inputs for a payoff diagram.
///
/// `premium` is what was paid for one contract. When it is absent (or zero)
/// the curve falls back to [`estimate_premium`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionParameters {
    #[serde(alias = "option_type")]
    pub option_type: OptionType,
    #[serde(alias = "underlying_price")]
    pub underlying_price: f64,
    #[serde(alias = "strike_price")]
    pub strike_price: f64,
    pub volatility: f64,
    #[serde(default, alias = "market_price", skip_serializing_if = "Option::is_none")]
    pub premium: Option<f64>,
}

impl OptionParameters {
    pub fn new(option_type: OptionType, underlying_price: f64, strike_price: f64, volatility: f64) -> Self {
        Self {
            option_type,
            underlying_price,
            strike_price,
            volatility,
            premium: None,
        }
    }

    pub fn with_premium(mut self, premium: f64) -> Self {
        self.premium = Some(premium);
        self
    }

    /// Premium the curve is drawn with: the supplied one, or the placeholder
    /// estimate when none (or zero) was given.
    pub fn resolved_premium(&self) -> f64 {
        match self.premium {
            Some(p) if p != 0.0 => p,
            _ => estimate_premium(self.underlying_price, self.volatility),
        }
    }
}

/// Placeholder premium used when no market or model price is available.
/// Not a pricing model: `max(2, S * vol * 0.4)`.
#[inline]
pub fn estimate_premium(underlying_price: f64, volatility: f64) -> f64 {
    (underlying_price * volatility * 0.4).max(2.0)
}

/// One sample of the payoff diagram. All values are rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffPoint {
    pub spot_price: f64,
    pub long_payoff: f64,
    pub long_profit: f64,
    pub short_payoff: f64,
    pub short_profit: f64,
    pub premium: f64,
}

/// Output of [`generate`]: the sampled points plus what the chart axes need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffCurve {
    pub option_type: OptionType,
    pub strike_price: f64,
    pub premium: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub tick_count: u32,
    pub points: Vec<PayoffPoint>,
}

/// Magnitudes from here up have no fractional bits.
const INTEGRAL_FLOOR: f64 = 4_503_599_627_370_496.0; // 2^52

/// The single rounding policy for generated data. Rounds the exact decimal
/// value of the float to two places, as `Number(x.toFixed(2))` does in the
/// charting client: `50.025` (stored as 50.02499...) becomes 50.02 while the
/// exact tie `1.125` goes away from zero to 1.13. Never returns negative zero.
pub fn round_cents(value: f64) -> f64 {
    if !value.is_finite() || value.abs() >= INTEGRAL_FLOOR {
        return value + 0.0;
    }

    let magnitude = value.abs();
    // Enough digits to print the binary value exactly: no rounding in formatting.
    let exact = format!("{magnitude:.prec$}", prec = exact_fraction_digits(magnitude).max(3));
    let Some((whole, frac)) = exact.split_once('.') else {
        return value + 0.0;
    };
    let Ok(whole) = whole.parse::<u64>() else {
        return value + 0.0;
    };
    let digit = |i: usize| u64::from(frac.as_bytes()[i] - b'0');

    let mut cents = whole * 100 + digit(0) * 10 + digit(1);
    if digit(2) >= 5 {
        cents += 1;
    }

    // Parsing the decimal text picks the nearest float, as the client does.
    let rounded = format!("{}.{:02}", cents / 100, cents % 100)
        .parse::<f64>()
        .unwrap_or(magnitude);
    if value < 0.0 {
        -rounded + 0.0
    } else {
        rounded
    }
}

/// Number of decimal places in the exact expansion of a finite, non-negative float.
fn exact_fraction_digits(magnitude: f64) -> usize {
    if magnitude == 0.0 {
        return 0;
    }
    let bits = magnitude.to_bits();
    let exp_bits = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    let (exponent, mantissa) = if exp_bits == 0 {
        (-1074, fraction)
    } else {
        (exp_bits - 1075, fraction | (1u64 << 52))
    };
    let lowest_bit = exponent + mantissa.trailing_zeros() as i32;
    if lowest_bit >= 0 {
        0
    } else {
        (-lowest_bit) as usize
    }
}
