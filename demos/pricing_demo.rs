// demos/pricing_demo.rs

//! End-to-end walk through the library
//!
//! This example shows how to:
//! 1. Price an index option and its Greeks with Black-Scholes
//! 2. Invert a quote chain to implied volatilities
//! 3. Calibrate Heston parameters to the re-priced targets
//! 4. Forecast price and volatility paths with the calibrated model
//!
//! Run with `RUST_LOG=debug` to see the calibration progress.

use anyhow::Result;
use pricing_lib::{
    bs, build_calibration_targets, calibrate_heston, default_configs, price_with_heston,
    simulate_heston, CalibrationParams, IvSolverConfig, OptionContract, OptionKind,
    SimulationConfig, SpotSweep, VolatilityQuote,
};

const SPOT: f64 = 5300.0;
const RATE: f64 = 0.02;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    println!("Black-Scholes / Heston Pricing Demo");
    println!("===================================");

    // Step 1: analytic price and Greeks
    let call = OptionContract::new(SPOT, SPOT, 30.0 / 365.0, RATE, OptionKind::Call)?;
    let result = bs::price_with_greeks(&call, 0.30)?;
    println!("\nStep 1: ATM call, 30 days, 30% vol");
    println!("  Price: {:.4}", result.price);
    println!("  Delta: {:.4}", result.delta);
    println!("  Gamma: {:.6}", result.gamma);
    println!("  Vega:  {:.4} per vol point", result.vega);
    println!("  Theta: {:.4} per day", result.theta);

    println!("\n  Delta across ±10% spot:");
    for (spot, r) in SpotSweep::around_spot(call, 0.30, 0.1, 5)? {
        println!("    S={:>8.1}  delta={:.4}  gamma={:.6}", spot, r.delta, r.gamma);
    }

    // Step 2: implied volatilities from a quote chain
    let quotes = create_demo_quotes()?;
    let iv_config = IvSolverConfig::default();
    println!("\nStep 2: Inverting {} quotes", quotes.len());
    println!("{:<6} {:<8} {:<12} {:<10}", "Type", "Strike", "Market", "IV");
    println!("{}", "-".repeat(40));
    for q in &quotes {
        let iv = pricing_lib::implied_volatility(&q.contract, q.market_price, &iv_config)?;
        let iv_text = match iv.value() {
            Some(v) => format!("{:.2}%", v * 100.0),
            None => format!("{:?}", iv),
        };
        println!(
            "{:<6} {:<8.0} {:<12.4} {:<10}",
            q.contract.kind, q.contract.strike, q.market_price, iv_text
        );
    }

    // Step 3: Heston calibration
    let targets = build_calibration_targets(&quotes, &iv_config)?;
    println!("\nStep 3: Calibrating Heston to {} targets...", targets.len());
    let calib_params = CalibrationParams::fast();
    let calibration = calibrate_heston(
        targets.clone(),
        default_configs::minimal(),
        CalibrationParams::fast(),
        None,
    )?;
    let p = calibration.params;
    println!("Calibration completed! (converged: {})", calibration.converged);
    println!("  Residual sum of squares: {:.6}", calibration.residual_sum_squares);
    println!("  v0      (initial variance):  {:.6}", p.v0);
    println!("  kappa   (mean reversion):    {:.6}", p.kappa);
    println!("  theta   (long-run variance): {:.6}", p.theta);
    println!("  sigma_v (vol of variance):   {:.6}", p.sigma_v);
    println!("  rho     (correlation):       {:.6}", p.rho);
    println!("  Feller condition satisfied:  {}", p.feller_satisfied());

    println!("\n{:<6} {:<8} {:<12} {:<12} {:<10}", "Type", "Strike", "Target", "Model", "Std err");
    println!("{}", "-".repeat(52));
    for fit in price_with_heston(&targets, &p, &calib_params)? {
        println!(
            "{:<6} {:<8.0} {:<12.4} {:<12.4} {:<10.4}",
            fit.kind, fit.strike, fit.target_price, fit.model_price, fit.std_error
        );
    }

    // Step 4: forecast
    let config = SimulationConfig::new(30, 2000).with_seed(7);
    let paths = simulate_heston(SPOT, &p, RATE, 30.0 / 365.0, &config)?;
    let summary = paths.summary();
    println!("\nStep 4: 30-day forecast ({} paths)", paths.num_paths());
    println!("{:<6} {:<12} {:<10}", "Day", "Mean price", "Mean vol");
    for i in (0..summary.days.len()).step_by(5) {
        println!(
            "{:<6.0} {:<12.2} {:<10.2}%",
            summary.days[i], summary.mean_price[i], summary.mean_volatility_pct[i]
        );
    }
    println!(
        "Terminal: mean {:.2}, std dev {:.2}",
        summary.terminal_mean, summary.terminal_std_dev
    );

    Ok(())
}

/// A 16-day SPX-like chain with a downside skew.
fn create_demo_quotes() -> Result<Vec<VolatilityQuote>> {
    let expiry = 16.0 / 365.0;
    let mut quotes = Vec::new();
    for strike in (5100..=5500).step_by(100) {
        let strike = strike as f64;
        let m = (strike / SPOT).ln();
        let vol = 0.18 - 0.25 * m + 0.9 * m * m;
        let kind = if strike < SPOT {
            OptionKind::Put
        } else {
            OptionKind::Call
        };
        let contract = OptionContract::new(SPOT, strike, expiry, RATE, kind)?;
        quotes.push(VolatilityQuote::new(contract, bs::price(&contract, vol)?));
    }
    // A stale print below intrinsic; gets skipped
    let stale = OptionContract::new(SPOT, 4000.0, expiry, RATE, OptionKind::Call)?;
    quotes.push(VolatilityQuote::new(stale, 0.0));
    Ok(quotes)
}
