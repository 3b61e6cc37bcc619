pub mod heston_calibrator;
pub mod heston_model;
pub mod heston_simulator;

pub use heston_calibrator::HestonModelCalibrator;
pub use heston_model::{HestonParamBounds, HestonParams};
pub use heston_simulator::{
    price, price_with_shocks, simulate, MonteCarloPrice, PathSample, ShockBuffer,
    SimulatedPath, SimulatedPaths, SimulationConfig, SimulationSummary,
};
