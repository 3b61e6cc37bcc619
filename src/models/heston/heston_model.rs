// src/models/heston/heston_model.rs

//! Heston stochastic volatility model parameters
//!
//! Under the risk-neutral measure the underlying and its instantaneous
//! variance follow
//!
//! ```text
//! dS_t = r S_t dt + sqrt(v_t) S_t dW1_t
//! dv_t = κ(θ - v_t) dt + σ_v sqrt(v_t) dW2_t,     d<W1, W2>_t = ρ dt
//! ```
//!
//! where:
//! - v0: initial variance
//! - κ (kappa): mean-reversion speed of the variance
//! - θ (theta): long-run variance level
//! - σ_v (sigma_v): volatility of variance
//! - ρ (rho): correlation between price and variance shocks

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// The five Heston parameters, in optimizer vector order `[v0, kappa, theta, sigma_v, rho]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HestonParams {
    /// Initial variance (> 0)
    pub v0: f64,
    /// Mean-reversion speed (> 0)
    pub kappa: f64,
    /// Long-run variance (> 0)
    pub theta: f64,
    /// Volatility of variance (> 0)
    pub sigma_v: f64,
    /// Price/variance correlation, in [-1, 1]
    pub rho: f64,
}

/// Validates Heston parameters.
fn validate_heston_params(v0: f64, kappa: f64, theta: f64, sigma_v: f64, rho: f64) -> Result<()> {
    for (name, value) in [
        ("v0", v0),
        ("kappa", kappa),
        ("theta", theta),
        ("sigma_v", sigma_v),
    ] {
        if value <= 0.0 || !value.is_finite() {
            return Err(anyhow!(
                "HestonParams validation: parameter {} ({}={}) must be > 0 and finite",
                name,
                name,
                value
            ));
        }
    }
    if !(-1.0..=1.0).contains(&rho) {
        return Err(anyhow!(
            "HestonParams validation: parameter rho (rho={}) must be in [-1, 1]",
            rho
        ));
    }
    Ok(())
}

impl HestonParams {
    /// Creates new Heston parameters with validation.
    pub fn new(v0: f64, kappa: f64, theta: f64, sigma_v: f64, rho: f64) -> Result<Self> {
        validate_heston_params(v0, kappa, theta, sigma_v, rho)?;
        Ok(Self {
            v0,
            kappa,
            theta,
            sigma_v,
            rho,
        })
    }

    /// Validates the current parameter set.
    pub fn validate(&self) -> Result<()> {
        validate_heston_params(self.v0, self.kappa, self.theta, self.sigma_v, self.rho)
    }

    /// Flattens into the optimizer vector `[v0, kappa, theta, sigma_v, rho]`.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.v0, self.kappa, self.theta, self.sigma_v, self.rho]
    }

    /// Feller condition 2κθ > σ_v². When it fails the continuous-time variance
    /// can touch zero; the simulator's variance floor handles that case.
    pub fn feller_satisfied(&self) -> bool {
        2.0 * self.kappa * self.theta > self.sigma_v * self.sigma_v
    }
}

/// The fixed calibration starting point `v0=0.04, κ=2, θ=0.04, σ_v=0.3, ρ=-0.7`.
impl Default for HestonParams {
    fn default() -> Self {
        Self {
            v0: 0.04,
            kappa: 2.0,
            theta: 0.04,
            sigma_v: 0.3,
            rho: -0.7,
        }
    }
}

impl TryFrom<&[f64]> for HestonParams {
    type Error = anyhow::Error;

    fn try_from(x: &[f64]) -> Result<Self> {
        if x.len() != 5 {
            return Err(anyhow!(
                "Heston parameter vector must have 5 entries, got {}",
                x.len()
            ));
        }
        Self::new(x[0], x[1], x[2], x[3], x[4])
    }
}

/// Structure to hold parameter bounds for the Heston model calibration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HestonParamBounds {
    pub v0: (f64, f64),
    pub kappa: (f64, f64),
    pub theta: (f64, f64),
    pub sigma_v: (f64, f64),
    /// Always kept inside [-1, 1]
    pub rho: (f64, f64),
}

impl Default for HestonParamBounds {
    fn default() -> Self {
        Self {
            v0: (0.01, 0.1),
            kappa: (0.1, 5.0),
            theta: (0.01, 0.1),
            sigma_v: (0.01, 1.0),
            rho: (-1.0, 1.0),
        }
    }
}

impl HestonParamBounds {
    /// Returns a copy with the rho interval clamped into [-1, 1].
    pub fn clamped(mut self) -> Self {
        self.rho = (self.rho.0.clamp(-1.0, 1.0), self.rho.1.clamp(-1.0, 1.0));
        self
    }

    /// Bounds in optimizer vector order.
    pub fn to_vec(&self) -> Vec<(f64, f64)> {
        vec![self.v0, self.kappa, self.theta, self.sigma_v, self.rho]
    }

    /// Checks every interval is finite, non-empty and strictly positive where
    /// the parameter must be.
    pub fn validate(&self) -> Result<()> {
        for (name, (lo, hi)) in [
            ("v0", self.v0),
            ("kappa", self.kappa),
            ("theta", self.theta),
            ("sigma_v", self.sigma_v),
        ] {
            if !(lo > 0.0 && hi >= lo && hi.is_finite()) {
                return Err(anyhow!("Invalid bounds for {}: ({}, {})", name, lo, hi));
            }
        }
        let (lo, hi) = self.rho;
        if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
            return Err(anyhow!("Invalid bounds for rho: {:?}", self.rho));
        }
        Ok(())
    }

    /// Projects `params` onto the box. Only call on bounds that passed
    /// [`validate`](Self::validate).
    pub fn clamp(&self, params: &HestonParams) -> HestonParams {
        HestonParams {
            v0: params.v0.clamp(self.v0.0, self.v0.1),
            kappa: params.kappa.clamp(self.kappa.0, self.kappa.1),
            theta: params.theta.clamp(self.theta.0, self.theta.1),
            sigma_v: params.sigma_v.clamp(self.sigma_v.0, self.sigma_v.1),
            rho: params.rho.clamp(self.rho.0, self.rho.1),
        }
    }
}

impl TryFrom<&[(f64, f64)]> for HestonParamBounds {
    type Error = anyhow::Error;

    /// Builds bounds from optimizer vector order, clamping rho into [-1, 1].
    fn try_from(bounds: &[(f64, f64)]) -> Result<Self> {
        if bounds.len() != 5 {
            return Err(anyhow!(
                "Heston bounds vector must have 5 entries, got {}",
                bounds.len()
            ));
        }
        let bounds = Self {
            v0: bounds[0],
            kappa: bounds[1],
            theta: bounds[2],
            sigma_v: bounds[3],
            rho: bounds[4],
        }
        .clamped();
        bounds.validate()?;
        Ok(bounds)
    }
}
