//! Implied volatility by bracketed root-finding on the Black-Scholes price.
//!
//! The objective `f(σ) = BS(σ) - market_price` is monotone increasing in σ for
//! vanilla options, so a root exists inside the search bracket exactly when the
//! market price lies strictly between the no-arbitrage bounds and between the
//! model prices at the bracket ends. Every other case is reported as
//! [`ImpliedVol::NotFound`] with the reason attached; callers working through a
//! batch of quotes can skip those without aborting.

pub mod forecast;

use crate::contract::{OptionContract, VolatilityQuote};
use crate::error::{ensure_positive, PricingError, PricingResultOf};
use crate::models::bs;
use rayon::prelude::*;
use roots::{find_root_brent, SearchError, SimpleConvergency};
use serde::{Deserialize, Serialize};

/// Search policy for the implied-volatility solver.
///
/// The bracket is a modelling assumption (volatility between 1% and 200% by
/// default), not a property of the pricing formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IvSolverConfig {
    /// Lower end of the volatility bracket
    #[serde(default = "default_lower_vol")]
    pub lower_vol: f64,
    /// Upper end of the volatility bracket
    #[serde(default = "default_upper_vol")]
    pub upper_vol: f64,
    /// Stop once the bracket width or |f(σ)| drops below this
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Iteration budget before giving up with [`IvFailure::NoConvergence`]
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for IvSolverConfig {
    fn default() -> Self {
        Self {
            lower_vol: default_lower_vol(),
            upper_vol: default_upper_vol(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl IvSolverConfig {
    /// Same policy with a different convergence tolerance.
    pub fn with_tolerance(self, tolerance: f64) -> Self {
        Self { tolerance, ..self }
    }

    pub fn validate(&self) -> PricingResultOf<()> {
        ensure_positive("lower_vol", self.lower_vol)?;
        ensure_positive("upper_vol", self.upper_vol)?;
        ensure_positive("tolerance", self.tolerance)?;
        if self.upper_vol <= self.lower_vol {
            return Err(PricingError::InvalidConfig(format!(
                "Volatility bracket is empty: [{}, {}]",
                self.lower_vol, self.upper_vol
            )));
        }
        if self.max_iterations == 0 {
            return Err(PricingError::InvalidConfig(
                "max_iterations must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_lower_vol() -> f64 {
    0.01
}

fn default_upper_vol() -> f64 {
    2.0
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_max_iterations() -> usize {
    100
}

/// Why no implied volatility could be produced for a quote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IvFailure {
    /// Price at or below the discounted intrinsic value
    BelowLowerBound { price: f64, bound: f64 },
    /// Price at or above the underlying (calls) or discounted strike (puts)
    AboveUpperBound { price: f64, bound: f64 },
    /// Arbitrage-free price, but the matching volatility lies outside the bracket
    OutsideBracket { lower_vol: f64, upper_vol: f64 },
    /// Root-finder exhausted its iteration budget
    NoConvergence { max_iterations: usize },
}

/// Outcome of an implied-volatility inversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ImpliedVol {
    Found(f64),
    NotFound(IvFailure),
}

impl ImpliedVol {
    /// The volatility, if one was found.
    pub fn value(&self) -> Option<f64> {
        match self {
            ImpliedVol::Found(v) => Some(*v),
            ImpliedVol::NotFound(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ImpliedVol::Found(_))
    }
}

/// Inverts the Black-Scholes price of `contract` at `market_price`.
///
/// Returns `Err` only for invalid inputs (degenerate contract, non-finite
/// price, inconsistent solver configuration). Prices that admit no volatility
/// are `Ok(ImpliedVol::NotFound(..))`.
///
/// # Example
///
/// ```rust
/// use pricing_lib::{bs, iv, OptionContract, OptionKind};
///
/// let call = OptionContract::new(100.0, 105.0, 0.5, 0.02, OptionKind::Call)?;
/// let quote = bs::price(&call, 0.25)?;
/// let vol = iv::implied_volatility(&call, quote, &iv::IvSolverConfig::default())?;
/// assert!((vol.value().unwrap() - 0.25).abs() < 1e-4);
/// # Ok::<(), pricing_lib::PricingError>(())
/// ```
pub fn implied_volatility(
    contract: &OptionContract,
    market_price: f64,
    config: &IvSolverConfig,
) -> PricingResultOf<ImpliedVol> {
    contract.validate()?;
    config.validate()?;
    if !market_price.is_finite() {
        return Err(PricingError::InvalidInput {
            field: "market_price",
            value: market_price,
        });
    }

    let lower = contract.intrinsic_value();
    if market_price <= lower {
        return Ok(ImpliedVol::NotFound(IvFailure::BelowLowerBound {
            price: market_price,
            bound: lower,
        }));
    }
    let upper = contract.upper_bound();
    if market_price >= upper {
        return Ok(ImpliedVol::NotFound(IvFailure::AboveUpperBound {
            price: market_price,
            bound: upper,
        }));
    }

    let objective = |sigma: f64| -> f64 {
        match bs::price(contract, sigma) {
            Ok(p) => p - market_price,
            Err(_) => f64::NAN,
        }
    };

    let f_lo = objective(config.lower_vol);
    let f_hi = objective(config.upper_vol);
    if f_lo == 0.0 {
        return Ok(ImpliedVol::Found(config.lower_vol));
    }
    if f_hi == 0.0 {
        return Ok(ImpliedVol::Found(config.upper_vol));
    }
    if !(f_lo < 0.0 && f_hi > 0.0) {
        return Ok(ImpliedVol::NotFound(IvFailure::OutsideBracket {
            lower_vol: config.lower_vol,
            upper_vol: config.upper_vol,
        }));
    }

    let mut convergency = SimpleConvergency {
        eps: config.tolerance,
        max_iter: config.max_iterations,
    };
    match find_root_brent(config.lower_vol, config.upper_vol, &objective, &mut convergency) {
        Ok(sigma) if sigma.is_finite() => Ok(ImpliedVol::Found(sigma)),
        Err(SearchError::NoBracketing) => Ok(ImpliedVol::NotFound(IvFailure::OutsideBracket {
            lower_vol: config.lower_vol,
            upper_vol: config.upper_vol,
        })),
        _ => Ok(ImpliedVol::NotFound(IvFailure::NoConvergence {
            max_iterations: config.max_iterations,
        })),
    }
}

/// Implied volatilities for a batch of quotes, evaluated in parallel.
///
/// Output order matches input order. Each entry carries its own outcome so a
/// stale or malformed quote never poisons the rest of the batch.
pub fn implied_volatilities(
    quotes: &[VolatilityQuote],
    config: &IvSolverConfig,
) -> Vec<PricingResultOf<ImpliedVol>> {
    quotes
        .par_iter()
        .map(|q| implied_volatility(&q.contract, q.market_price, config))
        .collect()
}
