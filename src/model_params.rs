//! Model-specific parameter containers used to tweak calibrators without hard-coding
//! constants in the model implementation. Each model provides its own struct
//! implementing [`ModelParams`] so the calibration entry points can carry it
//! type-erased inside [`crate::CalibrationParams`].

use crate::models::heston::heston_simulator::SimulationConfig;
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Marker trait for type-erased parameter structs.
///
/// Only provides a down-casting hook via `as_any`.
pub trait ModelParams: Send + Sync + std::fmt::Debug {
    /// Returns the boxed value as `&dyn Any` so that callers can attempt a
    /// concrete `downcast_ref::<T>()` when the concrete type is known.
    fn as_any(&self) -> &dyn Any;
}

/// Monte Carlo settings used by the Heston calibrator.
///
/// The seed is fixed per calibration: every candidate parameter vector is priced
/// on the same shocks, which keeps the objective a deterministic function of the
/// parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HestonModelParams {
    /// Time steps per path
    pub steps: usize,
    /// Paths per price estimate
    pub paths: usize,
    /// Seed for the shared shock buffer
    pub seed: u64,
    /// Price each quote's paths on the rayon pool
    pub parallel: bool,
}

impl Default for HestonModelParams {
    fn default() -> Self {
        Self {
            steps: 50,
            paths: 2000,
            seed: 42,
            parallel: true,
        }
    }
}

impl HestonModelParams {
    /// Simulation settings that reproduce the calibrator's draws.
    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            steps: self.steps,
            paths: self.paths,
            seed: Some(self.seed),
            parallel: self.parallel,
        }
    }
}

impl ModelParams for HestonModelParams {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
