use crate::contract::{OptionContract, OptionKind, VolatilityQuote};
use crate::error::PricingResultOf;
use crate::models::bs;
use crate::models::heston::heston_model::{HestonParamBounds, HestonParams};
use crate::models::iv::{self, ImpliedVol, IvSolverConfig};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Objective value returned for parameter vectors the model cannot price.
pub const OBJECTIVE_PENALTY: f64 = 1.0e12;

/// One calibration target: a contract and the price the model should reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationQuote {
    pub contract: OptionContract,
    /// Price the Heston Monte Carlo estimate is fitted to
    pub target_price: f64,
    /// Black-Scholes implied volatility the target was rebuilt from, if any
    pub implied_vol: Option<f64>,
}

impl CalibrationQuote {
    /// Target taken as given (synthetic or already cleaned prices).
    pub fn new(contract: OptionContract, target_price: f64) -> Self {
        Self {
            contract,
            target_price,
            implied_vol: None,
        }
    }

    /// Rebuilds a target from a market quote: market price → implied volatility
    /// → Black-Scholes price at that volatility.
    ///
    /// Returns `Ok(None)` when the quote admits no implied volatility.
    pub fn from_market(
        quote: &VolatilityQuote,
        config: &IvSolverConfig,
    ) -> PricingResultOf<Option<Self>> {
        match iv::implied_volatility(&quote.contract, quote.market_price, config)? {
            ImpliedVol::Found(sigma) => {
                let target_price = bs::price(&quote.contract, sigma)?;
                Ok(Some(Self {
                    contract: quote.contract,
                    target_price,
                    implied_vol: Some(sigma),
                }))
            }
            ImpliedVol::NotFound(reason) => {
                debug!(
                    strike = quote.contract.strike,
                    expiry = quote.contract.expiry,
                    ?reason,
                    "no implied volatility for quote"
                );
                Ok(None)
            }
        }
    }
}

/// Builds calibration targets for a batch of market quotes.
///
/// Quotes without an implied volatility are skipped with a warning. A quote with
/// an invalid contract or price aborts the whole batch.
pub fn build_calibration_targets(
    quotes: &[VolatilityQuote],
    config: &IvSolverConfig,
) -> Result<Vec<CalibrationQuote>> {
    config
        .validate()
        .context("Invalid implied volatility solver configuration")?;

    let mut targets = Vec::with_capacity(quotes.len());
    for (i, quote) in quotes.iter().enumerate() {
        let target = CalibrationQuote::from_market(quote, config)
            .with_context(|| format!("Quote {} ({:?}) is invalid", i, quote.contract))?;
        match target {
            Some(t) => targets.push(t),
            None => warn!(
                index = i,
                strike = quote.contract.strike,
                expiry = quote.contract.expiry,
                kind = %quote.contract.kind,
                market_price = quote.market_price,
                "skipping quote without implied volatility"
            ),
        }
    }

    if targets.is_empty() && !quotes.is_empty() {
        return Err(anyhow!(
            "None of the {} quotes produced an implied volatility",
            quotes.len()
        ));
    }
    Ok(targets)
}

/// Outcome of a Heston calibration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Best parameter set found
    pub params: HestonParams,
    /// Σ (model price − target price)² at `params`
    pub residual_sum_squares: f64,
    /// False when the optimizer failed or only penalty-level solutions were seen.
    /// `params` is still the best point evaluated.
    pub converged: bool,
    /// Bounds the optimizer searched in
    pub bounds: HestonParamBounds,
}

/// Model calibrator trait for parameter optimization
pub trait ModelCalibrator: Send + Sync {
    /// Returns the name of the model (e.g., "heston")
    fn model_name(&self) -> &str;

    /// How many parameters are in the model's optimization vector
    fn param_count(&self) -> usize;

    /// Returns the vector of (min, max) bounds for each parameter
    fn param_bounds(&self) -> &[(f64, f64)];

    /// Given a parameter vector `x` and targets, returns the objective value.
    /// Vectors the model cannot price map to [`OBJECTIVE_PENALTY`].
    fn evaluate_objective(&self, x: &[f64], data: &[CalibrationQuote]) -> f64;

    /// Model prices for every target at `best_params`
    fn price_quotes(&self, data: &[CalibrationQuote], best_params: &[f64]) -> Vec<QuoteFit>;

    /// Returns parameter names in the order they appear in the optimization vector
    fn param_names(&self) -> Vec<&str>;
}

/// Model versus target price for one calibration quote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteFit {
    pub kind: OptionKind,
    pub strike: f64,
    pub expiry: f64,
    pub target_price: f64,
    pub model_price: f64,
    /// Monte Carlo standard error of `model_price`
    pub std_error: f64,
}

impl QuoteFit {
    pub fn residual(&self) -> f64 {
        self.model_price - self.target_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(strike: f64) -> OptionContract {
        OptionContract::new(100.0, strike, 0.5, 0.02, OptionKind::Call).unwrap()
    }

    #[test]
    fn test_from_market_reprices_at_implied_vol() {
        let c = call(105.0);
        let market = bs::price(&c, 0.27).unwrap();
        let quote = VolatilityQuote::new(c, market);
        let target = CalibrationQuote::from_market(&quote, &IvSolverConfig::default())
            .unwrap()
            .unwrap();
        assert!((target.implied_vol.unwrap() - 0.27).abs() < 1e-4);
        assert!((target.target_price - market).abs() < 1e-3);
    }

    #[test]
    fn test_from_market_without_iv() {
        let quote = VolatilityQuote::new(call(50.0), 0.0);
        let target = CalibrationQuote::from_market(&quote, &IvSolverConfig::default()).unwrap();
        assert!(target.is_none());
    }

    #[test]
    fn test_build_targets_skips_unsolvable_quotes() {
        let good = call(100.0);
        let quotes = vec![
            VolatilityQuote::new(good, bs::price(&good, 0.2).unwrap()),
            VolatilityQuote::new(call(50.0), 0.0),
        ];
        let targets = build_calibration_targets(&quotes, &IvSolverConfig::default()).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].contract.strike, 100.0);
    }

    #[test]
    fn test_build_targets_fails_fast_on_invalid_input() {
        let good = call(100.0);
        let quotes = vec![
            VolatilityQuote::new(good, 5.0),
            VolatilityQuote::new(good, f64::NAN),
        ];
        assert!(build_calibration_targets(&quotes, &IvSolverConfig::default()).is_err());

        let only_bad = vec![VolatilityQuote::new(call(50.0), 0.0)];
        assert!(build_calibration_targets(&only_bad, &IvSolverConfig::default()).is_err());
    }

    #[test]
    fn test_quote_fit_residual() {
        let fit = QuoteFit {
            kind: OptionKind::Put,
            strike: 95.0,
            expiry: 0.25,
            target_price: 2.0,
            model_price: 2.5,
            std_error: 0.1,
        };
        assert_eq!(fit.residual(), 0.5);
    }
}
