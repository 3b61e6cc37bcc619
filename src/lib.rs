//! # Pricing-Lib: Option Pricing, Implied Volatility and Heston Calibration
//!
//! `pricing-lib` covers the analytic and simulation side of a vanilla option
//! desk: closed-form Black-Scholes prices and Greeks, implied volatility
//! inversion, Monte Carlo simulation of the Heston stochastic volatility model,
//! and calibration of the five Heston parameters to market prices.
//!
//! ## Core Features
//!
//! - **Black-Scholes**: prices, delta, gamma, vega per vol point, daily theta, lazy spot sweeps
//! - **Implied Volatility**: bracketed Brent inversion with a typed "not found" outcome
//! - **IV Forecasting**: EWMA smoothing and GARCH(1,1) forecasts of an implied-vol series
//! - **Heston Simulation**: full-truncation Euler paths, seeded and parallel over path blocks
//! - **Calibration**: CMA-ES and L-BFGS-B on a common-random-numbers Monte Carlo objective
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pricing_lib::{
//!     build_calibration_targets, calibrate_heston, default_configs, simulate_heston,
//!     CalibrationParams, IvSolverConfig, OptionContract, OptionKind, SimulationConfig,
//!     VolatilityQuote,
//! };
//!
//! # fn load_quotes() -> Vec<VolatilityQuote> { vec![] }
//! let quotes: Vec<VolatilityQuote> = load_quotes();
//!
//! // Market prices -> implied vols -> Black-Scholes targets
//! let targets = build_calibration_targets(&quotes, &IvSolverConfig::default())?;
//!
//! // Fit the Heston parameters
//! let config = default_configs::fast();
//! let result = calibrate_heston(targets, config, CalibrationParams::default(), None)?;
//! println!("{:?} (converged: {})", result.params, result.converged);
//!
//! // Forecast with the calibrated model
//! let sim = SimulationConfig::new(30, 1000);
//! let paths = simulate_heston(5300.0, &result.params, 0.02, 30.0 / 365.0, &sim)?;
//! let summary = paths.summary();
//! println!("terminal mean {:.2}", summary.terminal_mean);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Configuration Presets
//!
//! The library provides several optimization configuration presets:
//! - `production()`: High accuracy for live calibration
//! - `fast()`: Balanced speed/accuracy for development
//! - `research()`: High-precision settings for research
//! - `minimal()`: Quick validation settings

// ================================================================================================
// MODULES
// ================================================================================================

pub mod calibration;
pub mod contract;
pub mod error;
pub mod model_params;
pub mod models;

use crate::calibration::pipeline::calibrate_model;
use crate::calibration::types::ModelCalibrator;
use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

// Contracts and errors
pub use contract::{OptionContract, OptionKind, VolatilityQuote};
pub use error::{PricingError, PricingResultOf};

// Core types for calibration and configuration
pub use calibration::{
    config::{CmaEsConfig, OptimizationConfig},
    types::{build_calibration_targets, CalibrationQuote, CalibrationResult, QuoteFit},
};

// Analytic pricing and implied volatility
pub use models::{bs, iv};
pub use models::bs::{sweep::SpotSweep, Greeks, PricingResult};
pub use models::iv::forecast::{ewma, fit_garch, GarchFit, GarchParams, IvForecast};
pub use models::iv::{implied_volatility, ImpliedVol, IvFailure, IvSolverConfig};

// Heston model types and simulation
pub use models::heston::{
    heston_calibrator::HestonModelCalibrator,
    heston_model::{HestonParamBounds, HestonParams},
    heston_simulator::{
        price as price_heston, simulate as simulate_heston, MonteCarloPrice, PathSample,
        ShockBuffer, SimulatedPath, SimulatedPaths, SimulationConfig, SimulationSummary,
    },
};

// Model parameter types
pub use model_params::{HestonModelParams, ModelParams};

// ================================================================================================
// DEFAULT CONFIGURATIONS
// ================================================================================================

/// Pre-configured optimization settings for common use cases.
///
/// Each objective evaluation of a Heston calibration reprices every quote by
/// Monte Carlo, so the presets differ mostly in evaluation budget.
///
/// # Available Configurations
///
/// - [`production()`]: Production-grade settings
/// - [`fast()`]: Development-optimized settings
/// - [`research()`]: High-precision settings for research
/// - [`minimal()`]: Quick validation settings
pub mod default_configs {
    use crate::calibration::config::OptimizationConfig;

    /// Production-grade configuration.
    ///
    /// - Population 20, 60 generations, 2 BIPOP restarts
    /// - L-BFGS-B tolerance 1e-8
    ///
    /// # Example
    ///
    /// ```rust
    /// use pricing_lib::default_configs;
    ///
    /// let config = default_configs::production();
    /// assert!(config.cmaes.lbfgsb_enabled);
    /// ```
    pub fn production() -> OptimizationConfig {
        OptimizationConfig::production()
    }

    /// Fast configuration for development and integration tests.
    ///
    /// ```rust
    /// use pricing_lib::default_configs;
    ///
    /// let config = default_configs::fast();
    /// let production = default_configs::production();
    /// assert!(config.cmaes.total_evals_budget <= production.cmaes.total_evals_budget);
    /// ```
    pub fn fast() -> OptimizationConfig {
        OptimizationConfig::fast()
    }

    /// High-precision configuration for research and backtesting: large
    /// populations, IPOP and BIPOP restarts, long L-BFGS-B refinement.
    pub fn research() -> OptimizationConfig {
        OptimizationConfig::research()
    }

    /// Minimal configuration for quick validation and debugging.
    pub fn minimal() -> OptimizationConfig {
        OptimizationConfig::minimal()
    }
}

/// Configuration parameters for Heston model calibration.
#[derive(Debug)]
pub struct CalibrationParams {
    /// Custom parameter bounds (None for [`HestonParamBounds::default`])
    pub param_bounds: Option<HestonParamBounds>,
    /// Optional model-specific parameters (type-erased, [`HestonModelParams`] expected)
    pub model_params: Option<Box<dyn ModelParams>>,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            param_bounds: None,
            model_params: Some(Box::new(HestonModelParams::default())),
        }
    }
}

impl CalibrationParams {
    /// More paths and steps for a smoother objective.
    pub fn conservative() -> Self {
        Self {
            model_params: Some(Box::new(HestonModelParams {
                steps: 100,
                paths: 10000,
                ..HestonModelParams::default()
            })),
            ..Self::default()
        }
    }

    /// Fewer paths for quick iterations.
    pub fn fast() -> Self {
        Self {
            model_params: Some(Box::new(HestonModelParams {
                steps: 25,
                paths: 500,
                ..HestonModelParams::default()
            })),
            ..Self::default()
        }
    }

    pub fn with_bounds(mut self, bounds: HestonParamBounds) -> Self {
        self.param_bounds = Some(bounds);
        self
    }

    pub fn with_model_params(mut self, params: HestonModelParams) -> Self {
        self.model_params = Some(Box::new(params));
        self
    }

    /// Resolves the Monte Carlo settings (default if not supplied or type mismatch).
    pub fn heston_model_params(&self) -> HestonModelParams {
        match &self.model_params {
            Some(mp) => mp
                .as_any()
                .downcast_ref::<HestonModelParams>()
                .cloned()
                .unwrap_or_else(|| {
                    warn!("model_params is not HestonModelParams, using defaults");
                    HestonModelParams::default()
                }),
            None => HestonModelParams::default(),
        }
    }
}

/// Calibrate Heston model parameters to option price targets.
///
/// Minimises Σ (Monte Carlo price − target)² over `[v0, kappa, theta, sigma_v, rho]`
/// within the bounds of `calib_params`. All candidate vectors are priced on one
/// shock buffer drawn from the configured seed. The search starts at
/// `initial_guess` (default [`HestonParams::default`]) projected into the bounds,
/// runs a short CMA-ES around it and refines with L-BFGS-B.
///
/// # Errors
///
/// * No quotes, an invalid contract or a non-finite target price
/// * Inconsistent bounds, zero paths/steps, or an invalid optimization config
///
/// A run that completes but does not converge is not an error: it returns the
/// best point seen with [`CalibrationResult::converged`] set to `false`.
///
/// # Example
///
/// ```rust,no_run
/// use pricing_lib::{calibrate_heston, default_configs, CalibrationParams, CalibrationQuote};
///
/// # let targets: Vec<CalibrationQuote> = vec![];
/// let config = default_configs::fast();
/// let result = calibrate_heston(targets, config, CalibrationParams::fast(), None)?;
/// if !result.converged {
///     eprintln!("calibration did not converge, rss = {}", result.residual_sum_squares);
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn calibrate_heston(
    quotes: Vec<CalibrationQuote>,
    config: OptimizationConfig,
    calib_params: CalibrationParams,
    initial_guess: Option<HestonParams>,
) -> Result<CalibrationResult> {
    config.validate().context("Invalid optimization config")?;
    let model_params = calib_params.heston_model_params();
    let calibrator =
        HestonModelCalibrator::new(&quotes, calib_params.param_bounds, model_params)?;
    let bounds = calibrator.bounds();

    let guess = bounds.clamp(&initial_guess.unwrap_or_default());
    guess
        .validate()
        .context("Initial guess is not a valid Heston parameter set")?;

    info!(
        quotes = quotes.len(),
        guess = ?guess,
        "starting Heston calibration"
    );
    let outcome = calibrate_model(&calibrator, &quotes, &config, Some(guess.to_vec()));

    let (params, converged) = match HestonParams::try_from(outcome.params.as_slice()) {
        Ok(p) => (p, outcome.converged),
        Err(e) => {
            warn!("Optimizer returned an invalid parameter vector: {}", e);
            (guess, false)
        }
    };
    let residual_sum_squares = calibrator.evaluate_objective(&params.to_vec(), &quotes);

    info!(
        rss = residual_sum_squares,
        converged,
        params = ?params,
        "Heston calibration finished"
    );

    Ok(CalibrationResult {
        params,
        residual_sum_squares,
        converged,
        bounds,
    })
}

/// Evaluate the Heston calibration objective for a fixed parameter set.
///
/// Produces exactly the loss that [`calibrate_heston`] minimises for the same
/// quotes and `calib_params`, so callers can monitor fit quality without
/// re-running the optimiser.
pub fn evaluate_heston(
    quotes: &[CalibrationQuote],
    params: &HestonParams,
    calib_params: &CalibrationParams,
) -> Result<f64> {
    params.validate()?;
    let calibrator = HestonModelCalibrator::new(
        quotes,
        calib_params.param_bounds.clone(),
        calib_params.heston_model_params(),
    )?;
    Ok(calibrator.evaluate_objective(&params.to_vec(), quotes))
}

/// Model prices next to targets for a fixed parameter set, sorted by expiry
/// then strike.
pub fn price_with_heston(
    quotes: &[CalibrationQuote],
    params: &HestonParams,
    calib_params: &CalibrationParams,
) -> Result<Vec<QuoteFit>> {
    params.validate()?;
    let calibrator = HestonModelCalibrator::new(
        quotes,
        calib_params.param_bounds.clone(),
        calib_params.heston_model_params(),
    )?;
    let fits = calibrator.price_quotes(quotes, &params.to_vec());
    if fits.iter().any(|f| !f.model_price.is_finite()) {
        return Err(anyhow!("Monte Carlo pricing failed for at least one quote"));
    }
    Ok(fits)
}
