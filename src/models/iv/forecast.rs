//! Forecasting a daily implied-volatility series.
//!
//! Two tools sit on top of the solver output:
//!
//! - [`ewma`] smooths a series with an exponential moving average
//!   (`α = 2 / (span + 1)`, seeded with the first observation).
//! - [`fit_garch`] fits a zero-mean GARCH(1,1) to the percentage log changes
//!   of the series by maximum likelihood and [`GarchFit::forecast`] projects
//!   the variance forward with confidence bands around the last level.
//!
//! ```text
//! r_t   = 100 ln(iv_t / iv_{t-1})
//! h_t   = ω + α r_{t-1}² + β h_{t-1}
//! -ln L = ½ Σ (ln 2π + ln h_t + r_t² / h_t)
//! ```

use crate::calibration::config::OptimizationConfig;
use crate::calibration::pipeline::optimize_bounded;
use crate::calibration::types::OBJECTIVE_PENALTY;
use crate::error::{PricingError, PricingResultOf};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::{debug, info, warn};

/// Fewest log changes a GARCH fit accepts.
pub const MIN_GARCH_OBSERVATIONS: usize = 5;

/// Two-sided 95% normal quantile used for the forecast bands.
const BAND_Z: f64 = 1.96;

/// Largest α + β treated as stationary.
const MAX_PERSISTENCE: f64 = 0.9999;

/// Exponential moving average with `α = 2 / (span + 1)`.
///
/// The first output equals the first input; an empty series gives an empty
/// result.
///
/// ```rust
/// use pricing_lib::iv::forecast::ewma;
///
/// let smooth = ewma(&[0.30, 0.36, 0.24], 5)?;
/// assert_eq!(smooth[0], 0.30);
/// assert!((smooth[1] - 0.32).abs() < 1e-12);
/// # Ok::<(), pricing_lib::PricingError>(())
/// ```
pub fn ewma(values: &[f64], span: usize) -> PricingResultOf<Vec<f64>> {
    if span == 0 {
        return Err(PricingError::InvalidConfig(
            "EWMA span must be >= 1".to_string(),
        ));
    }
    if let Some(&bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(PricingError::InvalidInput {
            field: "series",
            value: bad,
        });
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut level = match values.first() {
        Some(&v) => v,
        None => return Ok(out),
    };
    for &v in values {
        level = alpha * v + (1.0 - alpha) * level;
        out.push(level);
    }
    Ok(out)
}

/// Percentage log changes `100 ln(iv_t / iv_{t-1})` of a positive series.
pub fn log_changes_pct(iv_series: &[f64]) -> PricingResultOf<Vec<f64>> {
    if let Some(&bad) = iv_series.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
        return Err(PricingError::InvalidInput {
            field: "implied_vol",
            value: bad,
        });
    }
    Ok(iv_series
        .windows(2)
        .map(|w| 100.0 * (w[1] / w[0]).ln())
        .collect())
}

/// GARCH(1,1) coefficients for percentage log changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GarchParams {
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl GarchParams {
    pub fn persistence(&self) -> f64 {
        self.alpha + self.beta
    }

    /// Unconditional variance `ω / (1 − α − β)`, if the process is stationary.
    pub fn long_run_variance(&self) -> Option<f64> {
        let p = self.persistence();
        (p < 1.0).then(|| self.omega / (1.0 - p))
    }

    fn is_admissible(&self) -> bool {
        self.omega > 0.0
            && self.alpha >= 0.0
            && self.beta >= 0.0
            && self.persistence() < MAX_PERSISTENCE
    }
}

/// Runs the variance recursion over `returns`. Returns the negative
/// log-likelihood and the one-step-ahead variance after the last return.
fn garch_filter(params: &GarchParams, returns: &[f64], backcast: f64) -> (f64, f64) {
    let ln_2pi = (2.0 * std::f64::consts::PI).ln();
    let mut h = backcast;
    let mut nll = 0.0;
    for &r in returns {
        nll += 0.5 * (ln_2pi + h.ln() + r * r / h);
        h = params.omega + params.alpha * r * r + params.beta * h;
    }
    (nll, h)
}

/// One projected step of an implied-volatility forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IvForecast {
    /// Steps ahead of the last observation (1-based)
    pub step: usize,
    /// Point forecast; log changes have zero mean, so this is the last level
    pub iv: f64,
    /// Forecast conditional volatility of the log change at this step, in percent
    pub change_vol_pct: f64,
    pub lower: f64,
    pub upper: f64,
}

/// A fitted GARCH(1,1) model together with the state needed to forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarchFit {
    pub params: GarchParams,
    pub log_likelihood: f64,
    pub observations: usize,
    pub converged: bool,
    last_iv: f64,
    next_variance: f64,
}

impl GarchFit {
    /// Projects `horizon` steps ahead.
    ///
    /// Step variances follow `h_{k+1} = ω + (α + β) h_k` from the filtered
    /// one-step-ahead variance. The band at step k is
    /// `iv · exp(±1.96 · sqrt(h_1 + … + h_k) / 100)`.
    pub fn forecast(&self, horizon: usize) -> Vec<IvForecast> {
        let p = &self.params;
        let mut h = self.next_variance;
        let mut cumulative = 0.0;
        let mut out = Vec::with_capacity(horizon);
        for step in 1..=horizon {
            if step > 1 {
                h = p.omega + p.persistence() * h;
            }
            cumulative += h;
            let half_width = BAND_Z * cumulative.sqrt() / 100.0;
            out.push(IvForecast {
                step,
                iv: self.last_iv,
                change_vol_pct: h.sqrt(),
                lower: self.last_iv * (-half_width).exp(),
                upper: self.last_iv * half_width.exp(),
            });
        }
        out
    }
}

/// Fits a zero-mean GARCH(1,1) to the log changes of `iv_series` by maximum
/// likelihood, using the same CMA-ES and L-BFGS-B search as the option
/// calibrations.
///
/// The variance recursion starts from the mean squared change. The search
/// starts at `ω = 0.1·var, α = 0.1, β = 0.8`.
///
/// # Errors
///
/// * Non-positive or non-finite levels
/// * Fewer than [`MIN_GARCH_OBSERVATIONS`] changes, or a constant series
/// * An invalid optimization config
pub fn fit_garch(iv_series: &[f64], config: &OptimizationConfig) -> Result<GarchFit> {
    config.validate()?;
    let returns = log_changes_pct(iv_series)?;
    if returns.len() < MIN_GARCH_OBSERVATIONS {
        return Err(anyhow!(
            "GARCH(1,1) needs at least {} log changes, got {}",
            MIN_GARCH_OBSERVATIONS,
            returns.len()
        ));
    }
    let backcast = returns.iter().map(|r| r * r).mean();
    if !(backcast > 0.0) {
        return Err(anyhow!("Implied volatility series is constant"));
    }

    let objective = |x: &[f64]| -> f64 {
        let params = GarchParams {
            omega: x[0],
            alpha: x[1],
            beta: x[2],
        };
        if !params.is_admissible() {
            return OBJECTIVE_PENALTY;
        }
        let (nll, _) = garch_filter(&params, &returns, backcast);
        if nll.is_finite() {
            nll
        } else {
            OBJECTIVE_PENALTY
        }
    };
    let bounds = [(1e-8 * backcast, 2.0 * backcast), (0.0, 0.999), (0.0, 0.999)];
    let guess = vec![0.1 * backcast, 0.1, 0.8];

    debug!(
        observations = returns.len(),
        backcast, "fitting GARCH(1,1) to implied volatility changes"
    );
    let outcome = optimize_bounded("garch", &objective, &bounds, config, Some(guess.clone()));

    let fitted = GarchParams {
        omega: outcome.params[0],
        alpha: outcome.params[1],
        beta: outcome.params[2],
    };
    let (params, converged) = if fitted.is_admissible() {
        (fitted, outcome.converged)
    } else {
        warn!(params = ?fitted, "GARCH(1,1) search ended outside the stationary region");
        let start = GarchParams {
            omega: guess[0],
            alpha: guess[1],
            beta: guess[2],
        };
        (start, false)
    };
    let (nll, next_variance) = garch_filter(&params, &returns, backcast);
    info!(
        omega = params.omega,
        alpha = params.alpha,
        beta = params.beta,
        nll,
        converged,
        "GARCH(1,1) fit finished"
    );

    Ok(GarchFit {
        params,
        log_likelihood: -nll,
        observations: returns.len(),
        converged,
        last_iv: iv_series[iv_series.len() - 1],
        next_variance,
    })
}
