// src/models/heston/heston_calibrator.rs

//! Heston model calibrator implementation
//!
//! The objective is the plain sum of squared differences between Monte Carlo
//! prices and target prices across all quotes. A single [`ShockBuffer`] is drawn
//! when the calibrator is built and reused for every evaluation, so the
//! objective is a deterministic function of the parameter vector and the
//! optimizer does not chase simulation noise.

use crate::calibration::types::{CalibrationQuote, ModelCalibrator, QuoteFit, OBJECTIVE_PENALTY};
use crate::model_params::HestonModelParams;
use crate::models::heston::heston_model::{HestonParamBounds, HestonParams};
use crate::models::heston::heston_simulator::{price_with_shocks, ShockBuffer};
use anyhow::{anyhow, Context, Result};
use tracing::{debug, warn};

/// Calibrator for the Heston model with 5 parameters:
/// [v0, kappa, theta, sigma_v, rho]
#[derive(Debug, Clone)]
pub struct HestonModelCalibrator {
    bounds: HestonParamBounds,
    param_bounds: Vec<(f64, f64)>,
    params: HestonModelParams,
    shocks: ShockBuffer,
}

impl HestonModelCalibrator {
    /// Validates the targets and bounds, then draws the shared shocks.
    pub fn new(
        data: &[CalibrationQuote],
        param_bounds_opt: Option<HestonParamBounds>,
        params: HestonModelParams,
    ) -> Result<Self> {
        if data.is_empty() {
            return Err(anyhow!("HestonModelCalibrator requires at least one quote"));
        }
        for (i, q) in data.iter().enumerate() {
            q.contract
                .validate()
                .with_context(|| format!("Calibration quote {} has an invalid contract", i))?;
            if !q.target_price.is_finite() || q.target_price < 0.0 {
                return Err(anyhow!(
                    "Calibration quote {} has invalid target price {}",
                    i,
                    q.target_price
                ));
            }
        }

        let bounds = param_bounds_opt.unwrap_or_default().clamped();
        bounds.validate()?;

        let shocks = ShockBuffer::generate(params.seed, params.steps, params.paths)
            .context("Invalid Monte Carlo settings for Heston calibration")?;
        debug!(
            quotes = data.len(),
            steps = params.steps,
            paths = params.paths,
            seed = params.seed,
            "drew shared calibration shocks"
        );

        Ok(Self {
            param_bounds: bounds.to_vec(),
            bounds,
            params,
            shocks,
        })
    }

    pub fn bounds(&self) -> HestonParamBounds {
        self.bounds.clone()
    }
}

impl ModelCalibrator for HestonModelCalibrator {
    fn model_name(&self) -> &str {
        "heston"
    }

    fn param_count(&self) -> usize {
        self.param_bounds.len()
    }

    fn param_bounds(&self) -> &[(f64, f64)] {
        &self.param_bounds
    }

    fn evaluate_objective(&self, x: &[f64], data: &[CalibrationQuote]) -> f64 {
        let params = match HestonParams::try_from(x) {
            Ok(p) => p,
            Err(_) => return OBJECTIVE_PENALTY,
        };

        let mut sse = 0.0;
        for q in data {
            match price_with_shocks(&q.contract, &params, &self.shocks, self.params.parallel) {
                Ok(mc) => {
                    let diff = mc.price - q.target_price;
                    sse += diff * diff;
                }
                Err(_) => return OBJECTIVE_PENALTY,
            }
        }

        if sse.is_finite() {
            sse
        } else {
            OBJECTIVE_PENALTY
        }
    }

    fn price_quotes(&self, data: &[CalibrationQuote], best_params: &[f64]) -> Vec<QuoteFit> {
        let params = match HestonParams::try_from(best_params) {
            Ok(p) => p,
            Err(e) => {
                warn!("Cannot price quotes with parameters {:?}: {}", best_params, e);
                return Vec::new();
            }
        };

        let mut results = Vec::with_capacity(data.len());
        for q in data {
            let (model_price, std_error) =
                match price_with_shocks(&q.contract, &params, &self.shocks, self.params.parallel) {
                    Ok(mc) => (mc.price, mc.std_error),
                    Err(e) => {
                        warn!(
                            strike = q.contract.strike,
                            expiry = q.contract.expiry,
                            "Error pricing quote: {}",
                            e
                        );
                        (f64::NAN, f64::NAN)
                    }
                };
            results.push(QuoteFit {
                kind: q.contract.kind,
                strike: q.contract.strike,
                expiry: q.contract.expiry,
                target_price: q.target_price,
                model_price,
                std_error,
            });
        }

        results.sort_by(|a, b| a.expiry.total_cmp(&b.expiry).then(a.strike.total_cmp(&b.strike)));
        results
    }

    fn param_names(&self) -> Vec<&str> {
        vec!["v0", "kappa", "theta", "sigma_v", "rho"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{OptionContract, OptionKind};
    use crate::models::heston::heston_simulator::{price, SimulationConfig};

    fn small_params() -> HestonModelParams {
        HestonModelParams {
            steps: 10,
            paths: 300,
            seed: 17,
            parallel: false,
        }
    }

    fn quotes(truth: &HestonParams) -> Vec<CalibrationQuote> {
        let cfg = small_params().simulation_config();
        [90.0, 100.0, 110.0]
            .iter()
            .map(|&k| {
                let c = OptionContract::new(100.0, k, 0.5, 0.02, OptionKind::Call).unwrap();
                CalibrationQuote::new(c, price(&c, truth, &cfg).unwrap().price)
            })
            .collect()
    }

    #[test]
    fn test_objective_is_zero_at_generating_params() {
        let truth = HestonParams::default();
        let data = quotes(&truth);
        let cal = HestonModelCalibrator::new(&data, None, small_params()).unwrap();
        assert_eq!(cal.evaluate_objective(&truth.to_vec(), &data), 0.0);

        let off = HestonParams {
            v0: 0.09,
            ..truth
        };
        assert!(cal.evaluate_objective(&off.to_vec(), &data) > 0.0);
    }

    #[test]
    fn test_objective_is_deterministic() {
        let data = quotes(&HestonParams::default());
        let cal = HestonModelCalibrator::new(&data, None, small_params()).unwrap();
        let x = [0.05, 1.5, 0.03, 0.4, -0.5];
        assert_eq!(
            cal.evaluate_objective(&x, &data),
            cal.evaluate_objective(&x, &data)
        );
    }

    #[test]
    fn test_invalid_candidates_are_penalised() {
        let data = quotes(&HestonParams::default());
        let cal = HestonModelCalibrator::new(&data, None, small_params()).unwrap();
        assert_eq!(
            cal.evaluate_objective(&[0.04, 2.0, 0.04, 0.3, -1.5], &data),
            OBJECTIVE_PENALTY
        );
        assert_eq!(
            cal.evaluate_objective(&[0.0, 2.0, 0.04, 0.3, 0.0], &data),
            OBJECTIVE_PENALTY
        );
        assert_eq!(cal.evaluate_objective(&[0.04, 2.0], &data), OBJECTIVE_PENALTY);
    }

    #[test]
    fn test_constructor_rejects_bad_input() {
        assert!(HestonModelCalibrator::new(&[], None, small_params()).is_err());

        let data = quotes(&HestonParams::default());
        let zero_paths = HestonModelParams {
            paths: 0,
            ..small_params()
        };
        assert!(HestonModelCalibrator::new(&data, None, zero_paths).is_err());

        let mut bad = data.clone();
        bad[0].target_price = f64::NAN;
        assert!(HestonModelCalibrator::new(&bad, None, small_params()).is_err());
    }

    #[test]
    fn test_price_quotes_sorted_and_consistent() {
        let truth = HestonParams::default();
        let mut data = quotes(&truth);
        data.reverse();
        let cal = HestonModelCalibrator::new(&data, None, small_params()).unwrap();
        let fits = cal.price_quotes(&data, &truth.to_vec());
        assert_eq!(fits.len(), 3);
        assert!(fits.windows(2).all(|w| w[0].strike < w[1].strike));
        for fit in &fits {
            assert_eq!(fit.residual(), 0.0);
        }
        assert_eq!(cal.param_names().len(), cal.param_count());
        assert_eq!(cal.bounds(), HestonParamBounds::default());
    }

    #[test]
    fn test_simulation_config_matches_shocks() {
        // the calibrator and a seeded stand-alone run see identical draws
        let p = small_params();
        let c = OptionContract::new(100.0, 100.0, 1.0, 0.0, OptionKind::Put).unwrap();
        let sim: SimulationConfig = p.simulation_config();
        let direct = price(&c, &HestonParams::default(), &sim).unwrap();
        let data = vec![CalibrationQuote::new(c, direct.price)];
        let cal = HestonModelCalibrator::new(&data, None, p).unwrap();
        assert_eq!(
            cal.evaluate_objective(&HestonParams::default().to_vec(), &data),
            0.0
        );
    }
}
