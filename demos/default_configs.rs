// demos/default_configs.rs

//! Tour of the optimization presets and TOML configuration loading.

use anyhow::Result;
use pricing_lib::{default_configs, HestonModelParams, IvSolverConfig, OptimizationConfig};

fn describe(name: &str, use_case: &str, config: &OptimizationConfig) {
    println!("{}:", name);
    println!("   Tolerance: {:.1e}", config.tolerance);
    println!("   Population size: {}", config.pop_size);
    println!("   Max generations: {}", config.max_gen);
    println!("   Total evaluations budget: {}", config.cmaes.total_evals_budget);
    println!("   BIPOP restarts: {}", config.cmaes.bipop_restarts);
    println!(
        "   L-BFGS-B: {} ({} iterations)",
        config.cmaes.lbfgsb_enabled, config.cmaes.lbfgsb_max_iterations
    );
    println!("   Use case: {}\n", use_case);
}

fn main() -> Result<()> {
    println!("Pricing-lib Default Configuration Examples\n");

    describe(
        "1. Fast Configuration",
        "Development, quick prototyping",
        &default_configs::fast(),
    );
    describe(
        "2. Production Configuration",
        "Scheduled recalibration",
        &default_configs::production(),
    );
    describe(
        "3. Research Configuration",
        "Backtesting, parameter stability studies",
        &default_configs::research(),
    );
    describe(
        "4. Minimal Configuration",
        "Smoke tests, debugging",
        &default_configs::minimal(),
    );

    println!("5. Custom configuration from TOML:");
    let custom = OptimizationConfig::from_toml_str(
        r#"
        tolerance = 1e-7
        pop_size = 24

        [cmaes]
        seed = 99
        bipop_restarts = 1
        "#,
    )?;
    println!("   Parsed: pop_size={}, seed={:?}", custom.pop_size, custom.cmaes.seed);
    println!("\n   Serialized back:\n{}", custom.to_toml_string()?);

    println!("6. Solver and simulation knobs:");
    let iv: IvSolverConfig = toml::from_str("upper_vol = 3.0")?;
    println!("   {:?}", iv);
    let mc: HestonModelParams = toml::from_str("paths = 5000\nseed = 1")?;
    println!("   {:?}", mc);

    Ok(())
}
