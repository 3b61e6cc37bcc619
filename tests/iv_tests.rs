mod test_utils;

use pricing_lib::iv::{implied_volatilities, implied_volatility};
use pricing_lib::{
    bs, build_calibration_targets, default_configs, ewma, fit_garch, ImpliedVol, IvFailure,
    IvSolverConfig, OptionContract, OptionKind,
};
use proptest::prelude::*;
use test_utils::{load_rows, load_test_data, QUOTES_PATH};

#[test]
fn test_fixture_vols_recovered() {
    let rows = load_rows(QUOTES_PATH).expect("Failed to load test data");
    let quotes = load_test_data(QUOTES_PATH).expect("Failed to load test data");
    let results = implied_volatilities(&quotes, &IvSolverConfig::default());
    assert_eq!(results.len(), rows.len());

    for (row, result) in rows.iter().zip(&results) {
        let outcome = result.as_ref().expect("fixture quotes are valid contracts");
        if row.mark_iv > 0.0 {
            let vol = outcome
                .value()
                .unwrap_or_else(|| panic!("{}: {:?}", row.symbol, outcome));
            assert!(
                (vol - row.mark_iv).abs() < 1e-4,
                "{}: solved {} vs fixture {}",
                row.symbol,
                vol,
                row.mark_iv
            );
        } else {
            assert!(matches!(
                outcome,
                ImpliedVol::NotFound(IvFailure::BelowLowerBound { .. })
            ));
        }
    }
}

#[test]
fn test_targets_from_fixture_skip_stale_quote() {
    let quotes = load_test_data(QUOTES_PATH).expect("Failed to load test data");
    let targets = build_calibration_targets(&quotes, &IvSolverConfig::default()).unwrap();
    assert_eq!(targets.len(), quotes.len() - 1);
    for (t, q) in targets.iter().zip(&quotes) {
        assert_eq!(t.contract, q.contract);
        assert!((t.target_price - q.market_price).abs() < 1e-3);
        assert!(t.implied_vol.is_some());
    }
}

#[test]
fn test_zero_price_deep_itm_call() {
    let call = OptionContract::new(5300.0, 4000.0, 30.0 / 365.0, 0.02, OptionKind::Call).unwrap();
    let result = implied_volatility(&call, 0.0, &IvSolverConfig::default()).unwrap();
    assert!(!result.is_found());
}

#[test]
fn test_prices_outside_bounds_not_found() {
    let cfg = IvSolverConfig::default();
    let put = OptionContract::new(100.0, 90.0, 1.0, 0.05, OptionKind::Put).unwrap();
    let pv_strike = 90.0 * (-0.05f64).exp();

    let at_bound = implied_volatility(&put, pv_strike, &cfg).unwrap();
    assert!(matches!(
        at_bound,
        ImpliedVol::NotFound(IvFailure::AboveUpperBound { .. })
    ));

    // Arbitrage-free, but the matching volatility sits under the bracket floor
    let cheap = bs::price(&put, 0.1).unwrap();
    let narrow = IvSolverConfig {
        lower_vol: 0.2,
        ..cfg
    };
    let below = implied_volatility(&put, cheap, &narrow).unwrap();
    assert!(matches!(
        below,
        ImpliedVol::NotFound(IvFailure::OutsideBracket { .. })
    ));
}

#[test]
fn test_tight_tolerance_improves_accuracy() {
    let call = OptionContract::new(100.0, 100.0, 0.5, 0.01, OptionKind::Call).unwrap();
    let target = bs::price(&call, 0.3456789).unwrap();
    let tight = IvSolverConfig::default().with_tolerance(1e-12);
    let vol = implied_volatility(&call, target, &tight).unwrap().value().unwrap();
    assert!((vol - 0.3456789).abs() < 1e-9);
}

/// Daily ATM call IVs of a contract rolling towards expiry, solved from
/// prices, then smoothed and forecast.
#[test]
fn test_daily_iv_series_smoothing_and_forecast() {
    let expiry_days = 16.0;
    let true_vols = [
        0.14, 0.15, 0.17, 0.16, 0.18, 0.21, 0.19, 0.18, 0.2, 0.22, 0.19, 0.17, 0.18,
    ];
    let cfg = IvSolverConfig::default();
    let mut solved = Vec::new();
    for (day, &vol) in true_vols.iter().enumerate() {
        let t = (expiry_days - day as f64) / 365.0;
        let contract = OptionContract::new(5300.0, 5300.0, t, 0.02, OptionKind::Call).unwrap();
        let price = bs::price(&contract, vol).unwrap();
        let iv = implied_volatility(&contract, price, &cfg).unwrap();
        solved.push(iv.value().expect("ATM call has an implied vol"));
    }

    let smooth = ewma(&solved, 5).unwrap();
    assert_eq!(smooth.len(), solved.len());
    assert!((smooth[0] - 0.14).abs() < 1e-5);
    let (lo, hi) = (0.14 - 1e-5, 0.22 + 1e-5);
    assert!(smooth.iter().all(|v| *v > lo && *v < hi));
    // Smoothing damps the day-to-day moves
    let roughness = |s: &[f64]| s.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f64>();
    assert!(roughness(&smooth) < roughness(&solved));

    let mut config = default_configs::minimal();
    config.cmaes.parallel_eval = false;
    let fit = fit_garch(&solved, &config).unwrap();
    assert_eq!(fit.observations, true_vols.len() - 1);
    assert!(fit.params.persistence() < 1.0);

    let forecast = fit.forecast(5);
    assert_eq!(forecast.len(), 5);
    let last = solved[solved.len() - 1];
    for f in &forecast {
        assert!((f.iv - last).abs() < 1e-12);
        assert!(f.lower < last && last < f.upper);
    }
    assert!(forecast[4].upper - forecast[4].lower > forecast[0].upper - forecast[0].lower);
}

proptest! {
    #[test]
    fn prop_iv_round_trip(
        moneyness in 0.8f64..1.25,
        expiry in 0.1f64..2.0,
        sigma in 0.05f64..1.5,
        is_call in any::<bool>(),
    ) {
        let kind = if is_call { OptionKind::Call } else { OptionKind::Put };
        let contract = OptionContract::new(100.0, 100.0 * moneyness, expiry, 0.02, kind).unwrap();
        // Vega per unit vol; below this the price carries no volatility information
        let vega = bs::greeks(&contract, sigma).unwrap().vega * 100.0;
        prop_assume!(vega > 0.5);

        let price = bs::price(&contract, sigma).unwrap();
        let solved = implied_volatility(&contract, price, &IvSolverConfig::default()).unwrap();
        match solved {
            ImpliedVol::Found(v) => prop_assert!((v - sigma).abs() < 1e-4, "{} vs {}", v, sigma),
            ImpliedVol::NotFound(reason) => prop_assert!(false, "not found: {:?}", reason),
        }
    }
}
