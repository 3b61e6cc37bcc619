// Example: plot_heston_paths.rs
// Simulates Heston paths for an index and writes an SVG with a sample of price
// paths on top and the cross-sectional mean volatility underneath.
//
// Usage:
//     cargo run --example plot_heston_paths -- [paths] [seed]
//
// The output image is written to heston_paths.svg in the working directory.

use std::env;
use std::error::Error;

use plotters::prelude::*;
use pricing_lib::{simulate_heston, HestonParams, SimulationConfig};

const SPOT: f64 = 5300.0;
const RATE: f64 = 0.02;
const HORIZON_DAYS: f64 = 30.0;
const SHOWN_PATHS: usize = 25;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let paths: usize = args.get(1).map(|s| s.parse()).transpose()?.unwrap_or(1000);
    let seed: u64 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(42);

    let params = HestonParams::new(0.04, 2.0, 0.04, 0.3, -0.7)?;
    let config = SimulationConfig::new(HORIZON_DAYS as usize, paths).with_seed(seed);
    let sim = simulate_heston(SPOT, &params, RATE, HORIZON_DAYS / 365.0, &config)?;
    let summary = sim.summary();

    let (p_min, p_max) = sim
        .iter()
        .take(SHOWN_PATHS)
        .flat_map(|p| p.prices().iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let pad = (p_max - p_min) * 0.05;
    let v_max = summary
        .mean_volatility_pct
        .iter()
        .copied()
        .fold(0.0, f64::max)
        * 1.2;

    let root = SVGBackend::new("heston_paths.svg", (1280, 960)).into_drawing_area();
    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(640);

    let mut price_chart = ChartBuilder::on(&upper)
        .margin(20)
        .caption(
            format!(
                "Heston paths | S0={} v0={} κ={} θ={} σv={} ρ={}",
                SPOT, params.v0, params.kappa, params.theta, params.sigma_v, params.rho
            ),
            ("sans-serif", 26),
        )
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..HORIZON_DAYS, (p_min - pad)..(p_max + pad))?;
    price_chart
        .configure_mesh()
        .x_desc("Day")
        .y_desc("Price")
        .draw()?;

    for (i, path) in sim.iter().take(SHOWN_PATHS).enumerate() {
        let color = Palette99::pick(i).mix(0.6);
        price_chart.draw_series(LineSeries::new(
            summary.days.iter().copied().zip(path.prices().iter().copied()),
            color.stroke_width(1),
        ))?;
    }
    price_chart.draw_series(LineSeries::new(
        summary
            .days
            .iter()
            .copied()
            .zip(summary.mean_price.iter().copied()),
        BLACK.stroke_width(3),
    ))?;

    let mut vol_chart = ChartBuilder::on(&lower)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..HORIZON_DAYS, 0.0..v_max)?;
    vol_chart
        .configure_mesh()
        .x_desc("Day")
        .y_desc("Mean volatility (%)")
        .draw()?;
    vol_chart.draw_series(LineSeries::new(
        summary
            .days
            .iter()
            .copied()
            .zip(summary.mean_volatility_pct.iter().copied()),
        RED.stroke_width(2),
    ))?;

    root.present()?;
    println!(
        "Terminal mean {:.2}, std dev {:.2} over {} paths",
        summary.terminal_mean,
        summary.terminal_std_dev,
        sim.num_paths()
    );
    println!("Chart saved to heston_paths.svg");
    Ok(())
}
