use crate::calibration::config::OptimizationConfig;
use crate::calibration::types::{CalibrationQuote, ModelCalibrator, OBJECTIVE_PENALTY};
use cmaes_lbfgsb::cmaes::{canonical_cmaes_optimize, CmaesCanonicalConfig};
use cmaes_lbfgsb::lbfgsb_optimize::lbfgsb_optimize;
use tracing::{debug, info, warn};

/// Best point found by [`calibrate_model`].
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerOutcome {
    pub objective: f64,
    pub params: Vec<f64>,
    /// The objective is below the penalty level and either L-BFGS-B finished
    /// cleanly or the objective already meets `obj_tol`.
    pub converged: bool,
}

/// A calibration run bundling a model, its targets and the optimizer settings.
pub struct CalibrationProcess {
    model: Box<dyn ModelCalibrator>,
    config: OptimizationConfig,
    market_data: Vec<CalibrationQuote>,
    initial_guess: Option<Vec<f64>>,
}

impl CalibrationProcess {
    pub fn new(
        model: Box<dyn ModelCalibrator>,
        config: OptimizationConfig,
        market_data: Vec<CalibrationQuote>,
    ) -> Self {
        Self {
            model,
            config,
            market_data,
            initial_guess: None,
        }
    }

    /// Set initial guess for optimization
    pub fn with_initial_guess(mut self, guess: Vec<f64>) -> Self {
        self.initial_guess = Some(guess);
        self
    }

    pub fn model(&self) -> &dyn ModelCalibrator {
        &*self.model
    }

    /// Run the calibration process and return the best parameters
    pub fn run(&self) -> OptimizerOutcome {
        calibrate_model(
            &*self.model,
            &self.market_data,
            &self.config,
            self.initial_guess.clone(),
        )
    }
}

fn is_penalised(objective: f64) -> bool {
    !objective.is_finite() || objective >= OBJECTIVE_PENALTY
}

/// Bounded optimization combining CMA-ES for global search and L-BFGS-B for
/// local refinement.
///
/// With an initial guess a short CMA-ES run is centred on it (or skipped when
/// `mini_cmaes_on_refinement` is off); without one a full BIPOP CMA-ES search
/// covers the bounds. There is no retry: a failed refinement keeps the CMA-ES
/// point and reports `converged = false`.
pub fn calibrate_model(
    model: &dyn ModelCalibrator,
    market_data: &[CalibrationQuote],
    config: &OptimizationConfig,
    initial_guess: Option<Vec<f64>>,
) -> OptimizerOutcome {
    optimize_bounded(
        model.model_name(),
        &|x: &[f64]| model.evaluate_objective(x, market_data),
        model.param_bounds(),
        config,
        initial_guess,
    )
}

/// The CMA-ES then L-BFGS-B search behind [`calibrate_model`], for any
/// objective over a box. Non-finite values and values at or above
/// [`OBJECTIVE_PENALTY`] count as infeasible.
pub fn optimize_bounded<F>(
    name: &str,
    objective: &F,
    bounds: &[(f64, f64)],
    config: &OptimizationConfig,
    initial_guess: Option<Vec<f64>>,
) -> OptimizerOutcome
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    let obj_fn = |x: &[f64]| objective(x);

    // 1) CMA-ES stage
    let (best_obj, best_sol) = {
        let cmaes_config = CmaesCanonicalConfig {
            population_size: config.pop_size,
            max_generations: config.max_gen,
            seed: config.cmaes.seed.unwrap_or(123456),
            c1: None,
            c_mu: None,
            c_sigma: None,
            d_sigma: None,
            parallel_eval: config.cmaes.parallel_eval,
            verbosity: config.cmaes.verbosity,
            ipop_restarts: config.cmaes.ipop_restarts,
            ipop_increase_factor: config.cmaes.ipop_increase_factor,
            bipop_restarts: config.cmaes.bipop_restarts,
            total_evals_budget: config.cmaes.total_evals_budget,
            use_subrun_budgeting: config.cmaes.use_subrun_budgeting,
            alpha_mu: None,
            hsig_threshold_factor: None,
            bipop_small_population_factor: None,
            bipop_small_budget_factor: None,
            bipop_large_budget_factor: None,
            bipop_large_pop_increase_factor: None,
            max_bound_iterations: None,
            eig_precision_threshold: None,
            min_eig_value: None,
            matrix_op_threshold: None,
            stagnation_limit: None,
            min_sigma: None,
        };

        match initial_guess {
            Some(guess) if config.cmaes.mini_cmaes_on_refinement => {
                let guess_obj = obj_fn(&guess);
                info!(
                    model = name,
                    guess_obj, "launching mini CMA-ES around initial guess"
                );
                let cmaes_result =
                    canonical_cmaes_optimize(obj_fn, bounds, cmaes_config, Some(guess));
                let (_, params) = cmaes_result.best_solution;
                (obj_fn(&params), params)
            }
            Some(guess) => {
                let guess_obj = obj_fn(&guess);
                info!(
                    model = name,
                    guess_obj, "skipping mini CMA-ES, refining initial guess directly"
                );
                (guess_obj, guess)
            }
            None => {
                info!(
                    model = name,
                    "no initial guess, running full CMA-ES with BIPOP restarts"
                );
                let cmaes_result = canonical_cmaes_optimize(obj_fn, bounds, cmaes_config, None);
                let (_, params) = cmaes_result.best_solution;
                (obj_fn(&params), params)
            }
        }
    };
    debug!(objective = best_obj, params = ?best_sol, "CMA-ES stage finished");

    // 2) Local refinement with L-BFGS-B
    if !config.cmaes.lbfgsb_enabled {
        debug!("L-BFGS-B refinement disabled, using CMA-ES solution directly");
        return OptimizerOutcome {
            objective: best_obj,
            converged: !is_penalised(best_obj),
            params: best_sol,
        };
    }

    let mut refined_solution = best_sol.clone();
    let refine_res = lbfgsb_optimize(
        &mut refined_solution,
        bounds,
        &obj_fn,
        config.cmaes.lbfgsb_max_iterations,
        config.tolerance,
        if config.cmaes.verbosity >= 2 {
            Some(|_current_x: &[f64], current_obj: f64| {
                debug!(objective = current_obj, "L-BFGS-B iteration");
            })
        } else {
            None
        },
        None,
    );

    let (objective, params, refined) = match refine_res {
        Ok((loc_obj, loc_sol)) => {
            if loc_obj < best_obj {
                info!(from = best_obj, to = loc_obj, "L-BFGS-B improved objective");
                (loc_obj, loc_sol, true)
            } else {
                debug!("L-BFGS-B did not improve objective, keeping CMA-ES solution");
                (best_obj, best_sol, true)
            }
        }
        Err(e) => {
            warn!("L-BFGS-B failed: {:?}, keeping CMA-ES solution", e);
            (best_obj, best_sol, false)
        }
    };

    OptimizerOutcome {
        objective,
        converged: !is_penalised(objective) && (refined || objective <= config.obj_tol),
        params,
    }
}
