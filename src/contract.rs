//! Option contract value types consumed by every pricing component.

use crate::error::{ensure_finite, ensure_positive, PricingError, PricingResultOf};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exercise right of a vanilla European option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Undiscounted payoff at expiry for terminal underlying price `s`.
    #[inline]
    pub fn payoff(self, s: f64, strike: f64) -> f64 {
        match self {
            OptionKind::Call => (s - strike).max(0.0),
            OptionKind::Put => (strike - s).max(0.0),
        }
    }

    pub fn is_call(self) -> bool {
        matches!(self, OptionKind::Call)
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            OptionKind::Call => "call",
            OptionKind::Put => "put",
        })
    }
}

impl FromStr for OptionKind {
    type Err = PricingError;

    /// Accepts `call`/`put`, single letters and exchange style `CE`/`PE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "call" | "c" | "ce" => Ok(OptionKind::Call),
            "put" | "p" | "pe" => Ok(OptionKind::Put),
            other => Err(PricingError::InvalidConfig(format!(
                "Invalid option type: {}",
                other
            ))),
        }
    }
}

/// A single vanilla European option under a flat risk-free rate.
///
/// Built through [`OptionContract::new`], which rejects non-positive spot,
/// strike or expiry so that downstream pricers never see a degenerate contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Underlying price S
    pub spot: f64,
    /// Strike price K
    pub strike: f64,
    /// Time to maturity T in years
    pub expiry: f64,
    /// Continuously compounded risk-free rate r
    pub rate: f64,
    pub kind: OptionKind,
}

impl OptionContract {
    /// Creates a validated contract.
    pub fn new(
        spot: f64,
        strike: f64,
        expiry: f64,
        rate: f64,
        kind: OptionKind,
    ) -> PricingResultOf<Self> {
        let contract = Self {
            spot,
            strike,
            expiry,
            rate,
            kind,
        };
        contract.validate()?;
        Ok(contract)
    }

    /// Re-checks the contract invariants. Useful for values built with struct
    /// literal syntax or deserialised from external data.
    pub fn validate(&self) -> PricingResultOf<()> {
        ensure_positive("spot", self.spot)?;
        ensure_positive("strike", self.strike)?;
        ensure_positive("expiry", self.expiry)?;
        ensure_finite("rate", self.rate)?;
        Ok(())
    }

    /// Same contract with a different underlying price.
    pub fn with_spot(&self, spot: f64) -> Self {
        Self { spot, ..*self }
    }

    /// e^{-rT}
    #[inline]
    pub fn discount_factor(&self) -> f64 {
        (-self.rate * self.expiry).exp()
    }

    /// No-arbitrage lower bound: intrinsic value against the discounted strike.
    pub fn intrinsic_value(&self) -> f64 {
        let pv_strike = self.strike * self.discount_factor();
        match self.kind {
            OptionKind::Call => (self.spot - pv_strike).max(0.0),
            OptionKind::Put => (pv_strike - self.spot).max(0.0),
        }
    }

    /// No-arbitrage upper bound: the underlying for a call, the discounted strike for a put.
    pub fn upper_bound(&self) -> f64 {
        match self.kind {
            OptionKind::Call => self.spot,
            OptionKind::Put => self.strike * self.discount_factor(),
        }
    }
}

/// An option contract together with its observed market price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityQuote {
    pub contract: OptionContract,
    pub market_price: f64,
}

impl VolatilityQuote {
    pub fn new(contract: OptionContract, market_price: f64) -> Self {
        Self {
            contract,
            market_price,
        }
    }
}
