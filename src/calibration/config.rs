use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// CMA-ES specific configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CmaEsConfig {
    /// Random seed for reproducibility
    pub seed: Option<u64>,
    /// Whether to evaluate the population in parallel
    pub parallel_eval: bool,
    /// Verbosity level handed to the CMA-ES backend (0=silent, 1=minimal, 2=normal)
    pub verbosity: u8,
    /// Number of IPOP restarts (0 = no IPOP)
    pub ipop_restarts: usize,
    /// Factor to increase population size in IPOP restarts
    pub ipop_increase_factor: f64,
    /// Number of BIPOP restarts (0 = no BIPOP)
    pub bipop_restarts: usize,
    /// Enable L-BFGS-B refinement after CMA-ES?
    pub lbfgsb_enabled: bool,
    /// Max iterations for L-BFGS-B
    pub lbfgsb_max_iterations: usize,
    /// Total function evaluations budget
    pub total_evals_budget: usize,
    /// Whether to use advanced sub-run budgeting logic
    pub use_subrun_budgeting: bool,
    /// Run a short CMA-ES around the initial guess before L-BFGS-B
    pub mini_cmaes_on_refinement: bool,
}

impl Default for CmaEsConfig {
    fn default() -> Self {
        Self {
            seed: Some(123456),
            parallel_eval: true,
            verbosity: 0,
            ipop_restarts: 0,
            ipop_increase_factor: 2.0,
            bipop_restarts: 2,
            lbfgsb_enabled: true,
            lbfgsb_max_iterations: 200,
            total_evals_budget: 5000,
            use_subrun_budgeting: false,
            mini_cmaes_on_refinement: true,
        }
    }
}

/// Main configuration struct for optimization
///
/// Every objective evaluation runs a full Monte Carlo repricing of the quote
/// set, so the presets trade evaluation budget against wall time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationConfig {
    /// L-BFGS-B convergence tolerance
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// CMA-ES population size
    #[serde(default = "default_pop_size")]
    pub pop_size: usize,

    /// CMA-ES generations per run
    #[serde(default = "default_max_gen")]
    pub max_gen: usize,

    /// Objective value regarded as converged even if L-BFGS-B reports failure
    #[serde(default = "default_obj_tol")]
    pub obj_tol: f64,

    /// CMA-ES specific configuration
    #[serde(default)]
    pub cmaes: CmaEsConfig,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            pop_size: default_pop_size(),
            max_gen: default_max_gen(),
            obj_tol: default_obj_tol(),
            cmaes: CmaEsConfig::default(),
        }
    }
}

impl OptimizationConfig {
    /// Default configuration for production calibration with high accuracy
    pub fn production() -> Self {
        Self {
            tolerance: 1e-8,
            pop_size: 20,
            max_gen: 60,
            obj_tol: 1e-6,
            cmaes: CmaEsConfig {
                total_evals_budget: 10000,
                ..CmaEsConfig::default()
            },
        }
    }

    /// Fast configuration for development and testing
    pub fn fast() -> Self {
        Self {
            tolerance: 1e-6,
            pop_size: 12,
            max_gen: 30,
            obj_tol: 1e-4,
            cmaes: CmaEsConfig {
                verbosity: 1,
                bipop_restarts: 1,
                lbfgsb_max_iterations: 100,
                total_evals_budget: 2000,
                ..CmaEsConfig::default()
            },
        }
    }

    /// High-precision configuration for research and backtesting
    pub fn research() -> Self {
        Self {
            tolerance: 1e-9,
            pop_size: 40,
            max_gen: 150,
            obj_tol: 1e-8,
            cmaes: CmaEsConfig {
                verbosity: 1,
                bipop_restarts: 5,
                ipop_restarts: 3,
                lbfgsb_max_iterations: 500,
                total_evals_budget: 50000,
                ..CmaEsConfig::default()
            },
        }
    }

    /// Minimal configuration for quick validation and debugging
    pub fn minimal() -> Self {
        Self {
            tolerance: 1e-4,
            pop_size: 8,
            max_gen: 15,
            obj_tol: 1e-2,
            cmaes: CmaEsConfig {
                bipop_restarts: 0,
                lbfgsb_max_iterations: 30,
                total_evals_budget: 300,
                ..CmaEsConfig::default()
            },
        }
    }

    /// Parses a TOML document. Missing keys fall back to the defaults.
    ///
    /// ```rust
    /// use pricing_lib::OptimizationConfig;
    ///
    /// let config = OptimizationConfig::from_toml_str(
    ///     "pop_size = 16\n[cmaes]\nlbfgsb_enabled = false\n",
    /// )?;
    /// assert_eq!(config.pop_size, 16);
    /// assert!(!config.cmaes.lbfgsb_enabled);
    /// assert_eq!(config.max_gen, OptimizationConfig::default().max_gen);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("Failed to parse optimization config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("In config file {}", path.display()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize optimization config")
    }

    pub fn validate(&self) -> Result<()> {
        if self.pop_size < 2 {
            return Err(anyhow!("pop_size must be >= 2, got {}", self.pop_size));
        }
        if self.max_gen == 0 {
            return Err(anyhow!("max_gen must be > 0"));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(anyhow!("tolerance must be > 0, got {}", self.tolerance));
        }
        if !(self.obj_tol >= 0.0 && self.obj_tol.is_finite()) {
            return Err(anyhow!("obj_tol must be >= 0, got {}", self.obj_tol));
        }
        if self.cmaes.ipop_increase_factor < 1.0 {
            return Err(anyhow!(
                "ipop_increase_factor must be >= 1, got {}",
                self.cmaes.ipop_increase_factor
            ));
        }
        Ok(())
    }
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_pop_size() -> usize {
    16
}

fn default_max_gen() -> usize {
    50
}

fn default_obj_tol() -> f64 {
    1e-6
}
