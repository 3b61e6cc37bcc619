// Closed-form Black-Scholes pricing and Greeks for a single European option.
// This is the one place d1/d2 are derived; the implied-volatility solver, the
// calibration target builder and the spot sweep all call into it.

pub mod sweep;

use crate::contract::{OptionContract, OptionKind};
use crate::error::{ensure_positive, PricingResultOf};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Trading-calendar convention used to express theta as a daily rate.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Vega is quoted per one volatility point (1%).
const VEGA_SCALE: f64 = 0.01;

/// Analytic sensitivities of one option at one volatility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// ∂V/∂S
    pub delta: f64,
    /// ∂²V/∂S², identical for calls and puts
    pub gamma: f64,
    /// ∂V/∂σ per one volatility point
    pub vega: f64,
    /// Daily time decay (negative of ∂V/∂T divided by 365)
    pub theta: f64,
}

/// Price plus Greeks for one contract at one volatility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
}

/// Standard normal CDF, N(x) = erfc(-x/√2)/2. `erfc` keeps precision in the left tail.
#[inline]
pub(crate) fn norm_cdf(x: f64) -> f64 {
    0.5 * libm::erfc(-x * FRAC_1_SQRT_2)
}

/// Standard normal density.
#[inline]
pub(crate) fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

#[allow(non_snake_case)]
struct D1D2 {
    d1: f64,
    d2: f64,
    sqrt_T: f64,
}

#[allow(non_snake_case)]
fn d1_d2(contract: &OptionContract, sigma: f64) -> PricingResultOf<D1D2> {
    contract.validate()?;
    ensure_positive("sigma", sigma)?;

    let S = contract.spot;
    let K = contract.strike;
    let T = contract.expiry;
    let r = contract.rate;

    let sqrt_T = T.sqrt();
    let d1 = ((S / K).ln() + (r + 0.5 * sigma * sigma) * T) / (sigma * sqrt_T);
    let d2 = d1 - sigma * sqrt_T;
    Ok(D1D2 { d1, d2, sqrt_T })
}

/// Black-Scholes price of a European option.
///
/// Fails with [`crate::PricingError::InvalidInput`] when spot, strike, expiry
/// or `sigma` is not strictly positive.
///
/// # Example
///
/// ```rust
/// use pricing_lib::{bs, OptionContract, OptionKind};
///
/// let call = OptionContract::new(100.0, 100.0, 1.0, 0.05, OptionKind::Call)?;
/// let value = bs::price(&call, 0.2)?;
/// assert!((value - 10.4506).abs() < 1e-4);
/// # Ok::<(), pricing_lib::PricingError>(())
/// ```
#[allow(non_snake_case)]
pub fn price(contract: &OptionContract, sigma: f64) -> PricingResultOf<f64> {
    let D1D2 { d1, d2, .. } = d1_d2(contract, sigma)?;
    let S = contract.spot;
    let pv_K = contract.strike * contract.discount_factor();

    let value = match contract.kind {
        OptionKind::Call => S * norm_cdf(d1) - pv_K * norm_cdf(d2),
        OptionKind::Put => pv_K * norm_cdf(-d2) - S * norm_cdf(-d1),
    };
    Ok(value)
}

/// Analytic Greeks (delta, gamma, vega per vol point, daily theta).
#[allow(non_snake_case)]
pub fn greeks(contract: &OptionContract, sigma: f64) -> PricingResultOf<Greeks> {
    let D1D2 { d1, d2, sqrt_T } = d1_d2(contract, sigma)?;
    let S = contract.spot;
    let r = contract.rate;
    let pv_K = contract.strike * contract.discount_factor();
    let pdf_d1 = norm_pdf(d1);

    let gamma = pdf_d1 / (S * sigma * sqrt_T);
    let vega = S * pdf_d1 * sqrt_T * VEGA_SCALE;
    let decay = -S * pdf_d1 * sigma / (2.0 * sqrt_T);

    let (delta, theta_annual) = match contract.kind {
        OptionKind::Call => (norm_cdf(d1), decay - r * pv_K * norm_cdf(d2)),
        OptionKind::Put => (norm_cdf(d1) - 1.0, decay + r * pv_K * norm_cdf(-d2)),
    };

    Ok(Greeks {
        delta,
        gamma,
        vega,
        theta: theta_annual / DAYS_PER_YEAR,
    })
}

/// Price and Greeks in one call.
pub fn price_with_greeks(contract: &OptionContract, sigma: f64) -> PricingResultOf<PricingResult> {
    let value = price(contract, sigma)?;
    let g = greeks(contract, sigma)?;
    Ok(PricingResult {
        price: value,
        delta: g.delta,
        gamma: g.gamma,
        vega: g.vega,
        theta: g.theta,
    })
}
