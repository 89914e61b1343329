//! Pricing approaches the desk offers, the solution methods each one can be
//! solved with, and the asset classes it is suggested for.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricingModel {
    #[serde(rename = "blackScholes")]
    BlackScholes,
    #[serde(rename = "heston")]
    Heston,
    #[serde(rename = "ou")]
    OrnsteinUhlenbeck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SolutionMethod {
    ClosedForm,
    Fourier,
    MonteCarlo,
    CharacteristicFunction,
    FokkerPlanck,
    Fft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    Stocks,
    Indices,
    #[serde(rename = "ETFs")]
    Etfs,
    Commodities,
    #[serde(rename = "FX")]
    Fx,
    #[serde(rename = "Interest Rates")]
    InterestRates,
    #[serde(rename = "Energy Prices")]
    EnergyPrices,
}

/// A solution method as presented to the user.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SolutionEntry {
    pub name: &'static str,
    pub value: SolutionMethod,
    pub desc: &'static str,
}

/// One pricing approach with everything a selector needs to render it.
#[derive(Debug, Clone, Serialize)]
pub struct ModelEntry {
    pub label: &'static str,
    pub value: PricingModel,
    pub solutions: &'static [SolutionEntry],
    pub asset_types: &'static [AssetType],
}

pub const ALL_MODELS: [PricingModel; 3] = [
    PricingModel::BlackScholes,
    PricingModel::Heston,
    PricingModel::OrnsteinUhlenbeck,
];

const BLACK_SCHOLES_SOLUTIONS: [SolutionEntry; 3] = [
    SolutionEntry {
        name: "Black-Scholes Closed-Form Solution",
        value: SolutionMethod::ClosedForm,
        desc: "(Fast, Exact)",
    },
    SolutionEntry {
        name: "Fourier Transform via Carr-Madan",
        value: SolutionMethod::Fourier,
        desc: "(Fast, Suitable for Characteristic Functions)",
    },
    SolutionEntry {
        name: "Monte Carlo Simulation",
        value: SolutionMethod::MonteCarlo,
        desc: "(Slow, Flexible for Path-Dependent Options)",
    },
];

const HESTON_SOLUTIONS: [SolutionEntry; 3] = [
    SolutionEntry {
        name: "Heston Characteristic Function",
        value: SolutionMethod::CharacteristicFunction,
        desc: "(Very Fast, Exact in Fourier Space)",
    },
    SolutionEntry {
        name: "Fourier Transform via Carr-Madan",
        value: SolutionMethod::Fourier,
        desc: "(Fast, Works Well for European Options)",
    },
    SolutionEntry {
        name: "Monte Carlo Simulation",
        value: SolutionMethod::MonteCarlo,
        desc: "(Slow, Suitable for Complex Payoffs)",
    },
];

const OU_SOLUTIONS: [SolutionEntry; 3] = [
    SolutionEntry {
        name: "Analytical Solution via Fokker-Planck Equation",
        value: SolutionMethod::FokkerPlanck,
        desc: "(Fast, Exact for Simple Cases)",
    },
    SolutionEntry {
        name: "Fast Fourier Transform (FFT)",
        value: SolutionMethod::Fft,
        desc: "(Fast, Spectral Approach)",
    },
    SolutionEntry {
        name: "Monte Carlo Simulation",
        value: SolutionMethod::MonteCarlo,
        desc: "(Slow, Useful for Stochastic Interest Rate Models)",
    },
];

impl PricingModel {
    pub fn label(self) -> &'static str {
        match self {
            Self::BlackScholes => "Black-Scholes (Vanilla)",
            Self::Heston => "Heston (Stochastic Vol)",
            Self::OrnsteinUhlenbeck => "Ornstein-Uhlenbeck (OU)",
        }
    }

    pub fn solutions(self) -> &'static [SolutionEntry] {
        match self {
            Self::BlackScholes => &BLACK_SCHOLES_SOLUTIONS,
            Self::Heston => &HESTON_SOLUTIONS,
            Self::OrnsteinUhlenbeck => &OU_SOLUTIONS,
        }
    }

    pub fn asset_types(self) -> &'static [AssetType] {
        match self {
            Self::BlackScholes => &[AssetType::Stocks, AssetType::Indices, AssetType::Etfs],
            Self::Heston => &[AssetType::Stocks, AssetType::Commodities, AssetType::Fx],
            Self::OrnsteinUhlenbeck => &[
                AssetType::Indices,
                AssetType::InterestRates,
                AssetType::Commodities,
                AssetType::EnergyPrices,
            ],
        }
    }

    #[inline]
    pub fn supports(self, method: SolutionMethod) -> bool {
        self.solutions().iter().any(|s| s.value == method)
    }

    pub fn entry(self) -> ModelEntry {
        ModelEntry {
            label: self.label(),
            value: self,
            solutions: self.solutions(),
            asset_types: self.asset_types(),
        }
    }
}

impl std::fmt::Display for PricingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlackScholes => write!(f, "blackScholes"),
            Self::Heston => write!(f, "heston"),
            Self::OrnsteinUhlenbeck => write!(f, "ou"),
        }
    }
}

impl std::fmt::Display for SolutionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ClosedForm => "closedForm",
            Self::Fourier => "fourier",
            Self::MonteCarlo => "monteCarlo",
            Self::CharacteristicFunction => "characteristicFunction",
            Self::FokkerPlanck => "fokkerPlanck",
            Self::Fft => "fft",
        };
        f.write_str(s)
    }
}

/// Full catalogue in display order.
pub fn catalogue() -> Vec<ModelEntry> {
    ALL_MODELS.iter().map(|m| m.entry()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_model_offers_monte_carlo() {
        for m in ALL_MODELS {
            assert!(m.supports(SolutionMethod::MonteCarlo), "{m} lacks monte carlo");
            assert_eq!(m.solutions().len(), 3);
        }
    }

    #[test]
    fn test_solution_support_is_model_specific() {
        assert!(PricingModel::BlackScholes.supports(SolutionMethod::ClosedForm));
        assert!(!PricingModel::Heston.supports(SolutionMethod::ClosedForm));
        assert!(PricingModel::Heston.supports(SolutionMethod::CharacteristicFunction));
        assert!(PricingModel::OrnsteinUhlenbeck.supports(SolutionMethod::Fft));
        assert!(!PricingModel::OrnsteinUhlenbeck.supports(SolutionMethod::Fourier));
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_value(catalogue()).unwrap();
        assert_eq!(json[0]["value"], "blackScholes");
        assert_eq!(json[1]["solutions"][0]["value"], "characteristicFunction");
        assert_eq!(json[2]["value"], "ou");
        assert_eq!(json[2]["asset_types"][1], "Interest Rates");
        assert_eq!(json[0]["asset_types"][2], "ETFs");
    }
}
