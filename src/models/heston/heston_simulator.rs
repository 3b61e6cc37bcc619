// src/models/heston/heston_simulator.rs

//! Monte Carlo simulation of the Heston model
//!
//! The horizon `[0, T]` is cut into `steps` intervals of width `dt = T / steps`.
//! Each step draws two independent standard normals `z1, w` per path and sets
//! `z2 = ρ z1 + sqrt(1 - ρ²) w`. Variance follows a full-truncation Euler step
//!
//! ```text
//! v_{t+1} = max(v_t + κ(θ - v_t) dt + σ_v sqrt(v_t) sqrt(dt) z2, 0)
//! ```
//!
//! and the price a log-Euler step driven by the pre-update variance
//!
//! ```text
//! S_{t+1} = S_t exp((r - v_t / 2) dt + sqrt(v_t) sqrt(dt) z1)
//! ```
//!
//! Option prices are `e^{-rT}` times the sample mean of the payoff. No variance
//! reduction is applied, so the standard error shrinks like `1/sqrt(paths)`;
//! [`MonteCarloPrice::std_error`] reports it and the path count is the
//! accuracy/runtime knob.
//!
//! # Random streams
//!
//! Paths are processed in blocks of [`PATH_BLOCK`]. Block `b` owns its own
//! `StdRng` seeded from `(seed, b)`, so a seeded run produces the same numbers
//! whether blocks execute sequentially or on the rayon pool, and no two blocks
//! share a stream.

use crate::contract::{OptionContract, OptionKind};
use crate::error::{ensure_finite, ensure_positive, PricingError, PricingResultOf};
use crate::models::bs::DAYS_PER_YEAR;
use crate::models::heston::heston_model::HestonParams;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

/// Number of paths sharing one random stream.
pub const PATH_BLOCK: usize = 256;

/// Discretisation, sample size and seeding for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of time steps over `[0, T]`
    pub steps: usize,
    /// Number of Monte Carlo paths
    pub paths: usize,
    /// Seed for reproducible runs. `None` draws a fresh seed from the thread
    /// RNG, so results differ from call to call.
    pub seed: Option<u64>,
    /// Spread path blocks over the rayon pool
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: 100,
            paths: 1000,
            seed: None,
            parallel: true,
        }
    }
}

impl SimulationConfig {
    pub fn new(steps: usize, paths: usize) -> Self {
        Self {
            steps,
            paths,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn validate(&self) -> PricingResultOf<()> {
        validate_grid(self.steps, self.paths)
    }

    fn resolve_seed(&self) -> u64 {
        match self.seed {
            Some(seed) => seed,
            None => {
                let seed: u64 = rand::thread_rng().gen();
                debug!(seed, "no simulation seed supplied, drew a fresh one");
                seed
            }
        }
    }
}

fn validate_grid(steps: usize, paths: usize) -> PricingResultOf<()> {
    if steps == 0 {
        return Err(PricingError::InvalidConfig("steps must be > 0".to_string()));
    }
    if paths == 0 {
        return Err(PricingError::InvalidConfig("paths must be > 0".to_string()));
    }
    Ok(())
}

fn check_params(params: &HestonParams) -> PricingResultOf<()> {
    ensure_positive("v0", params.v0)?;
    ensure_positive("kappa", params.kappa)?;
    ensure_positive("theta", params.theta)?;
    ensure_positive("sigma_v", params.sigma_v)?;
    if !(-1.0..=1.0).contains(&params.rho) {
        return Err(PricingError::InvalidInput {
            field: "rho",
            value: params.rho,
        });
    }
    Ok(())
}

/// Derives an independent stream for path block `block`.
fn block_rng(seed: u64, block: usize) -> StdRng {
    // SplitMix64 finaliser so neighbouring block indices give unrelated seeds
    let mut z = seed ^ (block as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    StdRng::seed_from_u64(z ^ (z >> 31))
}

#[inline]
fn draw_pair(rng: &mut StdRng) -> (f64, f64) {
    (rng.sample(StandardNormal), rng.sample(StandardNormal))
}

/// Per-run constants of the discretisation.
#[derive(Debug, Clone, Copy)]
struct StepContext {
    kappa: f64,
    theta: f64,
    sigma_v: f64,
    rho: f64,
    rho_bar: f64,
    r: f64,
    dt: f64,
    sqrt_dt: f64,
}

impl StepContext {
    fn new(params: &HestonParams, r: f64, t: f64, steps: usize) -> Self {
        let dt = t / steps as f64;
        Self {
            kappa: params.kappa,
            theta: params.theta,
            sigma_v: params.sigma_v,
            rho: params.rho,
            rho_bar: (1.0 - params.rho * params.rho).max(0.0).sqrt(),
            r,
            dt,
            sqrt_dt: dt.sqrt(),
        }
    }

    /// One full-truncation step. `variance` is never negative on entry.
    #[inline]
    fn advance(&self, price: f64, variance: f64, z1: f64, w: f64) -> (f64, f64) {
        let z2 = self.rho * z1 + self.rho_bar * w;
        let vol = variance.sqrt();
        let next_variance = (variance
            + self.kappa * (self.theta - variance) * self.dt
            + self.sigma_v * vol * self.sqrt_dt * z2)
            .max(0.0);
        let next_price =
            price * ((self.r - 0.5 * variance) * self.dt + vol * self.sqrt_dt * z1).exp();
        (next_price, next_variance)
    }
}

/// A Monte Carlo option value with its sampling error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloPrice {
    /// Discounted mean payoff
    pub price: f64,
    /// Discounted standard error of the mean
    pub std_error: f64,
    pub paths: usize,
}

/// Running payoff moments of one block.
#[derive(Debug, Clone, Copy, Default)]
struct PayoffMoments {
    sum: f64,
    sum_sq: f64,
}

impl PayoffMoments {
    fn push(&mut self, payoff: f64) {
        self.sum += payoff;
        self.sum_sq += payoff * payoff;
    }
}

/// Combines block moments in block order so the result does not depend on
/// how rayon scheduled the blocks.
fn finish_price(blocks: &[PayoffMoments], paths: usize, discount: f64) -> MonteCarloPrice {
    let (sum, sum_sq) = blocks
        .iter()
        .fold((0.0, 0.0), |(s, q), m| (s + m.sum, q + m.sum_sq));
    let n = paths as f64;
    let mean = sum / n;
    let std_error = if paths > 1 {
        let variance = ((sum_sq - n * mean * mean) / (n - 1.0)).max(0.0);
        (variance / n).sqrt()
    } else {
        0.0
    };
    MonteCarloPrice {
        price: discount * mean,
        std_error: discount * std_error,
        paths,
    }
}

fn block_count(paths: usize) -> usize {
    paths.div_ceil(PATH_BLOCK)
}

fn block_size(paths: usize, block: usize) -> usize {
    PATH_BLOCK.min(paths - block * PATH_BLOCK)
}

/// Simulates `config.paths` joint price/variance trajectories starting at
/// `(s0, params.v0)` over `[0, t]` under rate `r`.
///
/// Every variance sample is ≥ 0.
///
/// # Example
///
/// ```rust
/// use pricing_lib::{simulate_heston, HestonParams, SimulationConfig};
///
/// let config = SimulationConfig::new(50, 500).with_seed(7);
/// let paths = simulate_heston(100.0, &HestonParams::default(), 0.02, 0.5, &config)?;
/// assert_eq!(paths.num_paths(), 500);
/// assert!(paths.variances().iter().all(|v| *v >= 0.0));
/// # Ok::<(), pricing_lib::PricingError>(())
/// ```
pub fn simulate(
    s0: f64,
    params: &HestonParams,
    r: f64,
    t: f64,
    config: &SimulationConfig,
) -> PricingResultOf<SimulatedPaths> {
    ensure_positive("spot", s0)?;
    ensure_positive("expiry", t)?;
    ensure_finite("rate", r)?;
    check_params(params)?;
    config.validate()?;

    let steps = config.steps;
    let seed = config.resolve_seed();
    let ctx = StepContext::new(params, r, t, steps);
    let width = steps + 1;
    let v0 = params.v0;

    debug!(steps, paths = config.paths, seed, "simulating Heston paths");

    let mut prices = vec![0.0; config.paths * width];
    let mut variances = vec![0.0; config.paths * width];
    let block_len = PATH_BLOCK * width;

    let fill = |(block, (price_rows, var_rows)): (usize, (&mut [f64], &mut [f64]))| {
        let mut rng = block_rng(seed, block);
        for (p_row, v_row) in price_rows
            .chunks_mut(width)
            .zip(var_rows.chunks_mut(width))
        {
            p_row[0] = s0;
            v_row[0] = v0;
            for i in 0..steps {
                let (z1, w) = draw_pair(&mut rng);
                let (p, v) = ctx.advance(p_row[i], v_row[i], z1, w);
                p_row[i + 1] = p;
                v_row[i + 1] = v;
            }
        }
    };

    if config.parallel {
        prices
            .par_chunks_mut(block_len)
            .zip(variances.par_chunks_mut(block_len))
            .enumerate()
            .for_each(fill);
    } else {
        prices
            .chunks_mut(block_len)
            .zip(variances.chunks_mut(block_len))
            .enumerate()
            .for_each(fill);
    }

    let times = (0..width).map(|i| i as f64 * ctx.dt).collect();

    Ok(SimulatedPaths {
        times,
        prices,
        variances,
        steps,
        paths: config.paths,
        seed,
    })
}

/// Monte Carlo price of a European option under Heston dynamics.
///
/// Streams paths without storing them. For a given seed the result equals
/// [`SimulatedPaths::price_option`] on the output of [`simulate`].
pub fn price(
    contract: &OptionContract,
    params: &HestonParams,
    config: &SimulationConfig,
) -> PricingResultOf<MonteCarloPrice> {
    contract.validate()?;
    check_params(params)?;
    config.validate()?;

    let seed = config.resolve_seed();
    let steps = config.steps;
    let paths = config.paths;
    let ctx = StepContext::new(params, contract.rate, contract.expiry, steps);

    let run_block = |block: usize| -> PayoffMoments {
        let mut rng = block_rng(seed, block);
        let mut moments = PayoffMoments::default();
        for _ in 0..block_size(paths, block) {
            let (mut s, mut v) = (contract.spot, params.v0);
            for _ in 0..steps {
                let (z1, w) = draw_pair(&mut rng);
                (s, v) = ctx.advance(s, v, z1, w);
            }
            moments.push(contract.kind.payoff(s, contract.strike));
        }
        moments
    };

    let blocks: Vec<PayoffMoments> = if config.parallel {
        (0..block_count(paths)).into_par_iter().map(run_block).collect()
    } else {
        (0..block_count(paths)).map(run_block).collect()
    };

    Ok(finish_price(&blocks, paths, contract.discount_factor()))
}

/// Pre-drawn normal shocks `(z1, w)` for every path and step.
///
/// Drawn with the same block streams as [`price`], so re-pricing with
/// [`price_with_shocks`] reproduces `price` for the same seed while skipping
/// the random number generation. Calibration uses this to evaluate every
/// candidate parameter set against identical draws.
#[derive(Debug, Clone)]
pub struct ShockBuffer {
    shocks: Vec<f64>,
    steps: usize,
    paths: usize,
    seed: u64,
}

impl ShockBuffer {
    pub fn generate(seed: u64, steps: usize, paths: usize) -> PricingResultOf<Self> {
        validate_grid(steps, paths)?;
        let row = 2 * steps;
        let mut shocks = vec![0.0; paths * row];
        shocks
            .par_chunks_mut(PATH_BLOCK * row)
            .enumerate()
            .for_each(|(block, chunk)| {
                let mut rng = block_rng(seed, block);
                for pair in chunk.chunks_exact_mut(2) {
                    let (z1, w) = draw_pair(&mut rng);
                    pair[0] = z1;
                    pair[1] = w;
                }
            });
        Ok(Self {
            shocks,
            steps,
            paths,
            seed,
        })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn paths(&self) -> usize {
        self.paths
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Monte Carlo price driven by pre-drawn shocks.
pub fn price_with_shocks(
    contract: &OptionContract,
    params: &HestonParams,
    shocks: &ShockBuffer,
    parallel: bool,
) -> PricingResultOf<MonteCarloPrice> {
    contract.validate()?;
    check_params(params)?;

    let steps = shocks.steps;
    let row = 2 * steps;
    let ctx = StepContext::new(params, contract.rate, contract.expiry, steps);

    let run_block = |chunk: &[f64]| -> PayoffMoments {
        let mut moments = PayoffMoments::default();
        for path in chunk.chunks_exact(row) {
            let (mut s, mut v) = (contract.spot, params.v0);
            for pair in path.chunks_exact(2) {
                (s, v) = ctx.advance(s, v, pair[0], pair[1]);
            }
            moments.push(contract.kind.payoff(s, contract.strike));
        }
        moments
    };

    let block_len = PATH_BLOCK * row;
    let blocks: Vec<PayoffMoments> = if parallel {
        shocks.shocks.par_chunks(block_len).map(run_block).collect()
    } else {
        shocks.shocks.chunks(block_len).map(run_block).collect()
    };

    Ok(finish_price(
        &blocks,
        shocks.paths,
        contract.discount_factor(),
    ))
}

/// One `(time, price, variance)` observation on a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathSample {
    pub time: f64,
    pub price: f64,
    pub variance: f64,
}

/// Borrowed view of a single simulated trajectory.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedPath<'a> {
    times: &'a [f64],
    prices: &'a [f64],
    variances: &'a [f64],
}

impl<'a> SimulatedPath<'a> {
    /// Samples in time order.
    pub fn samples(&self) -> impl Iterator<Item = PathSample> + 'a {
        let (times, prices, variances) = (self.times, self.prices, self.variances);
        times
            .iter()
            .zip(prices)
            .zip(variances)
            .map(|((&time, &price), &variance)| PathSample {
                time,
                price,
                variance,
            })
    }

    pub fn prices(&self) -> &'a [f64] {
        self.prices
    }

    pub fn variances(&self) -> &'a [f64] {
        self.variances
    }

    pub fn terminal_price(&self) -> f64 {
        self.prices[self.prices.len() - 1]
    }
}

/// A batch of simulated trajectories on a shared time grid.
///
/// Storage is row-major: path `i` occupies `[i * (steps + 1), (i + 1) * (steps + 1))`.
#[derive(Debug, Clone)]
pub struct SimulatedPaths {
    times: Vec<f64>,
    prices: Vec<f64>,
    variances: Vec<f64>,
    steps: usize,
    paths: usize,
    seed: u64,
}

impl SimulatedPaths {
    pub fn num_paths(&self) -> usize {
        self.paths
    }

    pub fn num_steps(&self) -> usize {
        self.steps
    }

    /// Seed that produced this batch (the drawn one when none was supplied).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Time grid in years, `steps + 1` points starting at 0.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Every price sample, row-major by path.
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Every variance sample, row-major by path.
    pub fn variances(&self) -> &[f64] {
        &self.variances
    }

    pub fn path(&self, index: usize) -> Option<SimulatedPath<'_>> {
        if index >= self.paths {
            return None;
        }
        let width = self.steps + 1;
        let range = index * width..(index + 1) * width;
        Some(SimulatedPath {
            times: &self.times,
            prices: &self.prices[range.clone()],
            variances: &self.variances[range],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = SimulatedPath<'_>> {
        (0..self.paths).filter_map(move |i| self.path(i))
    }

    pub fn terminal_prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.iter().map(|p| p.terminal_price())
    }

    /// Discounted mean payoff over the stored terminal prices.
    pub fn price_option(&self, strike: f64, kind: OptionKind, r: f64) -> MonteCarloPrice {
        let t = self.times[self.times.len() - 1];
        let discount = (-r * t).exp();
        let payoffs: Vec<f64> = self
            .terminal_prices()
            .map(|s| kind.payoff(s, strike))
            .collect();
        let mean = payoffs.iter().mean();
        let std_error = if payoffs.len() > 1 {
            payoffs.iter().std_dev() / (payoffs.len() as f64).sqrt()
        } else {
            0.0
        };
        MonteCarloPrice {
            price: discount * mean,
            std_error: discount * std_error,
            paths: self.paths,
        }
    }

    pub fn summary(&self) -> SimulationSummary {
        SimulationSummary::from_paths(self)
    }
}

/// Cross-sectional statistics of a simulated batch, one entry per time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Time grid in calendar days
    pub days: Vec<f64>,
    /// Mean underlying price at each step
    pub mean_price: Vec<f64>,
    /// `sqrt(mean variance) * 100` at each step
    pub mean_volatility_pct: Vec<f64>,
    pub terminal_mean: f64,
    pub terminal_std_dev: f64,
}

impl SimulationSummary {
    pub fn from_paths(paths: &SimulatedPaths) -> Self {
        let width = paths.steps + 1;
        let column = |data: &[f64], i: usize| -> f64 {
            (0..paths.paths).map(|p| data[p * width + i]).mean()
        };

        let days = paths.times.iter().map(|t| t * DAYS_PER_YEAR).collect();
        let mean_price = (0..width).map(|i| column(&paths.prices, i)).collect();
        let mean_volatility_pct = (0..width)
            .map(|i| column(&paths.variances, i).max(0.0).sqrt() * 100.0)
            .collect();

        let terminal: Vec<f64> = paths.terminal_prices().collect();
        let terminal_mean = terminal.iter().mean();
        let terminal_std_dev = if terminal.len() > 1 {
            terminal.iter().std_dev()
        } else {
            0.0
        };

        Self {
            days,
            mean_price,
            mean_volatility_pct,
            terminal_mean,
            terminal_std_dev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> HestonParams {
        HestonParams::default()
    }

    #[test]
    fn test_shape_and_initial_values() {
        let cfg = SimulationConfig::new(20, 300).with_seed(1);
        let sim = simulate(100.0, &params(), 0.02, 0.5, &cfg).unwrap();
        assert_eq!(sim.num_paths(), 300);
        assert_eq!(sim.num_steps(), 20);
        assert_eq!(sim.times().len(), 21);
        assert!((sim.times()[20] - 0.5).abs() < 1e-12);

        for path in sim.iter() {
            let first = path.samples().next().unwrap();
            assert_eq!(first.price, 100.0);
            assert_eq!(first.variance, 0.04);
            assert_eq!(path.samples().count(), 21);
        }
        assert!(sim.path(300).is_none());
    }

    #[test]
    fn test_variance_floor_under_feller_violation() {
        // 2κθ = 0.02 << σ_v² = 0.81: Euler steps overshoot below zero constantly
        let harsh = HestonParams::new(0.01, 0.5, 0.02, 0.9, -0.9).unwrap();
        let cfg = SimulationConfig::new(50, 1000).with_seed(3);
        let sim = simulate(100.0, &harsh, 0.0, 1.0, &cfg).unwrap();
        assert!(sim.variances().iter().all(|v| *v >= 0.0));
        assert!(sim.variances().iter().any(|v| *v == 0.0));
        assert!(sim.prices().iter().all(|p| p.is_finite() && *p > 0.0));
    }

    #[test]
    fn test_seeded_runs_reproducible_and_thread_independent() {
        let cfg = SimulationConfig::new(10, 700).with_seed(99);
        let a = simulate(50.0, &params(), 0.01, 0.25, &cfg).unwrap();
        let b = simulate(50.0, &params(), 0.01, 0.25, &cfg.sequential()).unwrap();
        assert_eq!(a.prices(), b.prices());
        assert_eq!(a.variances(), b.variances());

        let c = simulate(50.0, &params(), 0.01, 0.25, &cfg.with_seed(100)).unwrap();
        assert_ne!(a.prices(), c.prices());
    }

    #[test]
    fn test_unseeded_run_records_its_seed() {
        let cfg = SimulationConfig::new(5, 10);
        let a = simulate(100.0, &params(), 0.0, 0.1, &cfg).unwrap();
        let replay = simulate(100.0, &params(), 0.0, 0.1, &cfg.with_seed(a.seed())).unwrap();
        assert_eq!(a.prices(), replay.prices());
    }

    #[test]
    fn test_price_matches_materialised_paths() {
        let contract = OptionContract::new(100.0, 105.0, 0.5, 0.03, OptionKind::Call).unwrap();
        let cfg = SimulationConfig::new(25, 1500).with_seed(11);
        let streamed = price(&contract, &params(), &cfg).unwrap();
        let sim = simulate(100.0, &params(), 0.03, 0.5, &cfg).unwrap();
        let stored = sim.price_option(105.0, OptionKind::Call, 0.03);
        assert!((streamed.price - stored.price).abs() < 1e-9 * streamed.price.max(1.0));
        assert!((streamed.std_error - stored.std_error).abs() < 1e-9);
        assert_eq!(streamed.paths, 1500);
    }

    #[test]
    fn test_shocks_reproduce_streamed_price() {
        let contract = OptionContract::new(100.0, 95.0, 1.0, 0.02, OptionKind::Put).unwrap();
        let cfg = SimulationConfig::new(30, 1000).with_seed(5);
        let streamed = price(&contract, &params(), &cfg).unwrap();

        let shocks = ShockBuffer::generate(5, 30, 1000).unwrap();
        let replayed = price_with_shocks(&contract, &params(), &shocks, true).unwrap();
        let replayed_seq = price_with_shocks(&contract, &params(), &shocks, false).unwrap();
        assert_eq!(streamed.price, replayed.price);
        assert_eq!(replayed.price, replayed_seq.price);
    }

    #[test]
    fn test_std_error_shrinks_with_paths() {
        let contract = OptionContract::new(100.0, 100.0, 1.0, 0.02, OptionKind::Call).unwrap();
        let small_cfg = SimulationConfig::new(10, 1000).with_seed(2);
        let large_cfg = SimulationConfig::new(10, 16000).with_seed(2);
        let small = price(&contract, &params(), &small_cfg).unwrap();
        let large = price(&contract, &params(), &large_cfg).unwrap();
        let ratio = small.std_error / large.std_error;
        assert!(ratio > 3.0 && ratio < 5.0, "ratio = {}", ratio);
    }

    #[test]
    fn test_summary_statistics() {
        let cfg = SimulationConfig::new(30, 2000).with_seed(8);
        let sim = simulate(5300.0, &params(), 0.02, 30.0 / 365.0, &cfg).unwrap();
        let summary = sim.summary();
        assert_eq!(summary.days.len(), 31);
        assert!((summary.days[30] - 30.0).abs() < 1e-9);
        assert_eq!(summary.mean_price[0], 5300.0);
        assert!((summary.mean_volatility_pct[0] - 20.0).abs() < 1e-9);
        assert!((summary.terminal_mean - summary.mean_price[30]).abs() < 1e-6);
        assert!(summary.terminal_std_dev > 0.0);
    }

    #[test]
    fn test_invalid_inputs() {
        let cfg = SimulationConfig::new(10, 10).with_seed(1);
        assert!(simulate(0.0, &params(), 0.02, 1.0, &cfg).is_err());
        assert!(simulate(100.0, &params(), 0.02, 0.0, &cfg).is_err());
        assert!(simulate(100.0, &params(), 0.02, 1.0, &SimulationConfig::new(0, 10)).is_err());
        assert!(simulate(100.0, &params(), 0.02, 1.0, &SimulationConfig::new(10, 0)).is_err());

        let bad_rho = HestonParams {
            rho: 1.5,
            ..params()
        };
        assert_eq!(
            simulate(100.0, &bad_rho, 0.02, 1.0, &cfg).unwrap_err(),
            PricingError::InvalidInput {
                field: "rho",
                value: 1.5
            }
        );
        assert!(ShockBuffer::generate(1, 0, 10).is_err());
    }
}
