#![cfg(feature = "ratios")]

use lendfund_core::portfolio::ratios::{
    beta, calmar_ratio, downside_deviation, information_ratio, max_drawdown, sharpe_ratio,
    sortino_ratio, sortino_ratio_estimated, treynor_ratio, FALLBACK_BETA,
};
use lendfund_core::portfolio::returns::{
    analyze_return_series, ReturnFrequency, ReturnSeriesInput,
};
use lendfund_core::LendFundError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Ratio functions over plain numbers (simulation outputs, reported figures)
// ===========================================================================

#[test]
fn test_ratio_suite_on_reported_figures() {
    // A fund reporting 14% on 11% vol with a 3% risk-free rate
    let sharpe = sharpe_ratio(dec!(0.14), dec!(0.03), dec!(0.11)).unwrap();
    assert!((sharpe - dec!(1)).abs() < dec!(0.0001), "sharpe {sharpe}");

    let sortino = sortino_ratio(dec!(0.14), dec!(0.03), dec!(0.07)).unwrap();
    assert!((sortino - dec!(1.5714)).abs() < dec!(0.001), "sortino {sortino}");

    let calmar = calmar_ratio(dec!(0.14), dec!(0.20)).unwrap();
    assert_eq!(calmar, dec!(0.7));

    let treynor = treynor_ratio(dec!(0.14), dec!(0.03), dec!(1.1)).unwrap();
    assert!((treynor - dec!(0.1)).abs() < dec!(0.0001), "treynor {treynor}");

    let ir = information_ratio(dec!(0.14), dec!(0.11), dec!(0.06)).unwrap();
    assert_eq!(ir, dec!(0.5));
}

#[test]
fn test_every_undefined_denominator_is_an_error() {
    assert!(matches!(
        sharpe_ratio(dec!(0.14), dec!(0.03), Decimal::ZERO).unwrap_err(),
        LendFundError::InvalidInput { .. }
    ));
    assert!(sortino_ratio(dec!(0.14), dec!(0.03), Decimal::ZERO).is_err());
    assert!(sortino_ratio_estimated(dec!(0.14), dec!(0.03), Decimal::ZERO).is_err());
    assert!(calmar_ratio(dec!(0.14), Decimal::ZERO).is_err());
    assert!(treynor_ratio(dec!(0.14), dec!(0.03), Decimal::ZERO).is_err());
    assert!(information_ratio(dec!(0.14), dec!(0.11), Decimal::ZERO).is_err());
}

#[test]
fn test_estimated_sortino_uses_scaled_volatility() {
    // Estimated downside = 0.7 * vol, so the estimate = sharpe / 0.7
    let sharpe = sharpe_ratio(dec!(0.14), dec!(0.03), dec!(0.11)).unwrap();
    let estimated = sortino_ratio_estimated(dec!(0.14), dec!(0.03), dec!(0.11)).unwrap();
    assert!(
        (estimated - sharpe / dec!(0.7)).abs() < dec!(0.0000001),
        "estimate {estimated} vs sharpe {sharpe}"
    );
}

#[test]
fn test_fallback_beta_is_one_and_distinct_from_solver() {
    assert_eq!(FALLBACK_BETA, Decimal::ONE);
    // The beta() function itself never falls back
    let flat = vec![dec!(0.01), dec!(0.01), dec!(0.01)];
    let moving = vec![dec!(0.02), dec!(0.00), dec!(0.03)];
    assert!(beta(&moving, &flat).is_err());
}

// ===========================================================================
// Series statistics
// ===========================================================================

#[test]
fn test_max_drawdown_crash_and_recovery() {
    // +20%, -50%, +30%: peak 1.2, trough 0.6, recovery to 0.78
    let returns = vec![dec!(0.20), dec!(-0.50), dec!(0.30)];
    let dd = max_drawdown(&returns);
    assert_eq!(dd, dec!(0.5));
}

#[test]
fn test_max_drawdown_edge_series() {
    assert_eq!(max_drawdown(&[]), Decimal::ZERO);
    assert_eq!(max_drawdown(&[dec!(-0.99)]), Decimal::ZERO);
    assert_eq!(
        max_drawdown(&[dec!(0.05), dec!(0.05), dec!(0.05)]),
        Decimal::ZERO
    );
}

#[test]
fn test_beta_against_scaled_market() {
    let market = vec![dec!(0.02), dec!(-0.01), dec!(0.03), dec!(0.01), dec!(-0.02)];
    let half_exposed: Vec<Decimal> = market.iter().map(|r| r / dec!(2)).collect();
    assert_eq!(beta(&half_exposed, &market).unwrap(), dec!(0.5));
}

#[test]
fn test_downside_deviation_vs_target() {
    let returns = vec![dec!(0.03), dec!(-0.01), dec!(0.02), dec!(-0.03)];
    // Against a 0 target only the negatives count
    let dd_zero = downside_deviation(&returns, Decimal::ZERO);
    // Against a high target everything counts
    let dd_high = downside_deviation(&returns, dec!(0.05));
    assert!(dd_high > dd_zero);
    assert!(dd_zero > Decimal::ZERO);
}

// ===========================================================================
// Return-series analysis end to end
// ===========================================================================

fn fund_returns() -> Vec<Decimal> {
    vec![
        dec!(0.021),
        dec!(-0.008),
        dec!(0.015),
        dec!(0.011),
        dec!(-0.014),
        dec!(0.019),
        dec!(0.007),
        dec!(-0.003),
        dec!(0.024),
        dec!(0.009),
        dec!(-0.006),
        dec!(0.013),
    ]
}

fn index_returns() -> Vec<Decimal> {
    vec![
        dec!(0.017),
        dec!(-0.011),
        dec!(0.012),
        dec!(0.008),
        dec!(-0.016),
        dec!(0.014),
        dec!(0.005),
        dec!(-0.007),
        dec!(0.019),
        dec!(0.006),
        dec!(-0.009),
        dec!(0.010),
    ]
}

#[test]
fn test_return_series_full_suite() {
    let input = ReturnSeriesInput {
        returns: fund_returns(),
        risk_free_rate: dec!(0.02),
        market_returns: Some(index_returns()),
        frequency: ReturnFrequency::Monthly,
        target_return: None,
    };
    let output = analyze_return_series(&input).unwrap();
    let a = &output.result;

    assert!(a.annualised_return > Decimal::ZERO);
    assert!(a.annualised_volatility > Decimal::ZERO);
    assert!(a.sharpe_ratio.is_some());
    assert!(a.sortino_ratio.is_some());
    assert!(a.calmar_ratio.is_some());
    assert!(a.max_drawdown > Decimal::ZERO);

    // This fund shadows the index closely
    let beta_value = a.beta.unwrap();
    assert!(
        beta_value > dec!(0.5) && beta_value < dec!(1.5),
        "beta {beta_value}"
    );
    assert!(a.treynor_ratio.is_some());
    assert!(a.information_ratio.is_some());
    assert!(a.tracking_error.unwrap() > Decimal::ZERO);
    assert!(a.alpha.is_some());
}

#[test]
fn test_return_series_without_market() {
    let input = ReturnSeriesInput {
        returns: fund_returns(),
        risk_free_rate: dec!(0.02),
        market_returns: None,
        frequency: ReturnFrequency::Monthly,
        target_return: None,
    };
    let output = analyze_return_series(&input).unwrap();
    let a = &output.result;

    assert!(a.beta.is_none());
    assert!(a.treynor_ratio.is_none());
    assert!(a.information_ratio.is_none());
    assert!(a.tracking_error.is_none());
    assert!(a.alpha.is_none());
}

#[test]
fn test_return_series_validation() {
    let short = ReturnSeriesInput {
        returns: vec![dec!(0.01)],
        risk_free_rate: dec!(0.02),
        market_returns: None,
        frequency: ReturnFrequency::Monthly,
        target_return: None,
    };
    assert!(analyze_return_series(&short).is_err());

    let mismatched = ReturnSeriesInput {
        returns: fund_returns(),
        risk_free_rate: dec!(0.02),
        market_returns: Some(vec![dec!(0.01), dec!(0.02)]),
        frequency: ReturnFrequency::Monthly,
        target_return: None,
    };
    assert!(matches!(
        analyze_return_series(&mismatched).unwrap_err(),
        LendFundError::InvalidInput { ref field, .. } if field == "market_returns"
    ));
}

#[test]
fn test_frequency_changes_annualisation() {
    let monthly = ReturnSeriesInput {
        returns: fund_returns(),
        risk_free_rate: dec!(0.00),
        market_returns: None,
        frequency: ReturnFrequency::Monthly,
        target_return: None,
    };
    let mut quarterly = monthly.clone();
    quarterly.frequency = ReturnFrequency::Quarterly;

    let monthly_out = analyze_return_series(&monthly).unwrap();
    let quarterly_out = analyze_return_series(&quarterly).unwrap();
    // Same series annualised at 12x vs 4x
    assert_eq!(
        monthly_out.result.annualised_return,
        quarterly_out.result.annualised_return * dec!(3)
    );
}
