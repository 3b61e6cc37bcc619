#![allow(dead_code)] // Each integration test binary uses a different subset

use pricing_lib::{
    price_heston, CalibrationQuote, HestonModelParams, HestonParams, OptimizationConfig,
    OptionContract, OptionKind, VolatilityQuote,
};
use serde::Deserialize;

pub const QUOTES_PATH: &str = "tests/data/quotes.csv";

/// CSV row structure matching the fixture format
#[derive(Debug, Deserialize)]
pub struct CsvRow {
    pub symbol: String,
    pub option_type: String,
    pub strike_price: f64,
    pub underlying_price: f64,
    pub years_to_exp: f64,
    pub rate: f64,
    pub mark_price: f64,
    /// Implied volatility the fixture price was generated from (0 for stale quotes)
    pub mark_iv: f64,
}

impl CsvRow {
    pub fn to_quote(&self) -> Result<VolatilityQuote, Box<dyn std::error::Error>> {
        let kind: OptionKind = self.option_type.parse()?;
        let contract = OptionContract::new(
            self.underlying_price,
            self.strike_price,
            self.years_to_exp,
            self.rate,
            kind,
        )?;
        Ok(VolatilityQuote::new(contract, self.mark_price))
    }
}

/// Load raw fixture rows
pub fn load_rows(file_path: &str) -> Result<Vec<CsvRow>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(file_path)?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Load market quotes from the CSV fixture
pub fn load_test_data(file_path: &str) -> Result<Vec<VolatilityQuote>, Box<dyn std::error::Error>> {
    load_rows(file_path)?.iter().map(CsvRow::to_quote).collect()
}

/// Parameters the synthetic calibration quotes are generated from.
/// v0 differs from theta so the term structure pins both down.
pub fn true_heston_params() -> HestonParams {
    HestonParams::new(0.05, 2.0, 0.03, 0.3, -0.7).unwrap()
}

/// Small Monte Carlo settings shared by quote generation and calibration
pub fn test_model_params() -> HestonModelParams {
    HestonModelParams {
        steps: 20,
        paths: 500,
        seed: 2024,
        parallel: true,
    }
}

/// Heston prices for a strike/maturity grid, priced on the same draws the
/// calibrator will use. Maturities from five weeks to two years separate the
/// short-end variance v0 from the long-run level theta and pin down kappa.
pub fn synthetic_heston_quotes(params: &HestonParams) -> Vec<CalibrationQuote> {
    let sim = test_model_params().simulation_config();
    let mut quotes = Vec::new();
    for &expiry in &[0.1, 0.25, 0.5, 1.0, 2.0] {
        for &strike in &[80.0, 90.0, 100.0, 110.0, 120.0] {
            let kind = if strike < 100.0 {
                OptionKind::Put
            } else {
                OptionKind::Call
            };
            let contract = OptionContract::new(100.0, strike, expiry, 0.02, kind).unwrap();
            let mc = price_heston(&contract, params, &sim).unwrap();
            quotes.push(CalibrationQuote::new(contract, mc.price));
        }
    }
    quotes
}

/// Create default test configuration
pub fn create_test_config() -> OptimizationConfig {
    let mut config = OptimizationConfig::fast();
    config.pop_size = 10;
    config.max_gen = 30;
    config.tolerance = 1e-12;
    config.cmaes.verbosity = 0;
    config.cmaes.bipop_restarts = 0;
    config.cmaes.total_evals_budget = 600;
    config.cmaes.lbfgsb_max_iterations = 100;
    config
}

/// Budget for the parameter recovery test: a wider CMA-ES search with one
/// BIPOP restart and a long L-BFGS-B polish.
pub fn create_recovery_config() -> OptimizationConfig {
    let mut config = OptimizationConfig::fast();
    config.pop_size = 16;
    config.max_gen = 150;
    config.tolerance = 1e-15;
    config.obj_tol = 1e-10;
    config.cmaes.verbosity = 0;
    config.cmaes.bipop_restarts = 1;
    config.cmaes.total_evals_budget = 5000;
    config.cmaes.lbfgsb_max_iterations = 500;
    config.cmaes.mini_cmaes_on_refinement = true;
    config
}
