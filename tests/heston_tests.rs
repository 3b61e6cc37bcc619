use pricing_lib::{
    bs, price_heston, simulate_heston, HestonParams, OptionContract, OptionKind,
    SimulationConfig,
};

/// With vanishing vol-of-vol and v0 = theta the variance stays at theta and the
/// price process is geometric Brownian motion with volatility sqrt(theta).
#[test]
fn test_gbm_reduction_matches_black_scholes() {
    let params = HestonParams::new(0.04, 2.0, 0.04, 1e-6, -0.5).unwrap();
    let config = SimulationConfig::new(8, 400_000).with_seed(20240601);

    for kind in [OptionKind::Call, OptionKind::Put] {
        let contract = OptionContract::new(100.0, 100.0, 1.0, 0.05, kind).unwrap();
        let mc = price_heston(&contract, &params, &config).unwrap();
        let analytic = bs::price(&contract, 0.2).unwrap();
        let rel = (mc.price - analytic).abs() / analytic;
        assert!(
            rel < 0.01,
            "{:?}: MC {} ± {} vs BS {}",
            kind,
            mc.price,
            mc.std_error,
            analytic
        );
        assert!(mc.std_error < 0.01 * analytic);
    }
}

#[test]
fn test_martingale_and_parity_on_shared_paths() {
    let params = HestonParams::default();
    let config = SimulationConfig::new(50, 20_000).with_seed(77);
    let (s0, strike, r, t) = (100.0, 105.0, 0.03, 0.75);

    let call = OptionContract::new(s0, strike, t, r, OptionKind::Call).unwrap();
    let put = OptionContract {
        kind: OptionKind::Put,
        ..call
    };
    let c = price_heston(&call, &params, &config).unwrap();
    let p = price_heston(&put, &params, &config).unwrap();

    let paths = simulate_heston(s0, &params, r, t, &config).unwrap();
    let discounted_mean = paths.terminal_prices().sum::<f64>() / paths.num_paths() as f64
        * (-r * t).exp();

    // Same draws for both legs, so parity holds up to the drift estimate
    let parity_gap = (c.price - p.price) - (discounted_mean - strike * (-r * t).exp());
    assert!(parity_gap.abs() < 1e-8, "gap {}", parity_gap);
    assert!((discounted_mean - s0).abs() < 0.6, "E[S_T] e^-rT = {}", discounted_mean);
}

#[test]
fn test_variance_never_negative() {
    let harsh = HestonParams::new(0.02, 0.3, 0.02, 1.0, -0.95).unwrap();
    assert!(!harsh.feller_satisfied());

    let cfg = SimulationConfig::new(100, 2000).with_seed(5);
    let paths = simulate_heston(100.0, &harsh, 0.01, 2.0, &cfg).unwrap();
    for path in paths.iter() {
        for sample in path.samples() {
            assert!(sample.variance >= 0.0);
            assert!(sample.price.is_finite() && sample.price > 0.0);
        }
    }
}

#[test]
fn test_forecast_summary_for_index() {
    let params = HestonParams::default();
    let config = SimulationConfig::new(30, 5000).with_seed(11);
    let paths = simulate_heston(5300.0, &params, 0.02, 30.0 / 365.0, &config).unwrap();
    let summary = paths.summary();

    assert_eq!(summary.days.len(), 31);
    assert_eq!(summary.days[0], 0.0);
    assert!((summary.days[30] - 30.0).abs() < 1e-9);
    // Risk-neutral drift over a month is small relative to the level
    assert!((summary.terminal_mean - 5300.0).abs() < 30.0);
    // Variance mean-reverts around theta = v0 = 0.04, i.e. ~20 vol points
    for vol in &summary.mean_volatility_pct {
        assert!(*vol > 15.0 && *vol < 25.0, "vol {}", vol);
    }
    assert!(summary.terminal_std_dev > 100.0);
}

#[test]
fn test_results_independent_of_parallelism() {
    let params = HestonParams::new(0.06, 1.2, 0.05, 0.5, -0.4).unwrap();
    let contract = OptionContract::new(50.0, 48.0, 0.5, 0.01, OptionKind::Put).unwrap();
    let parallel = SimulationConfig::new(40, 3000).with_seed(123);
    let a = price_heston(&contract, &params, &parallel).unwrap();
    let b = price_heston(&contract, &params, &parallel.sequential()).unwrap();
    assert_eq!(a, b);
}
