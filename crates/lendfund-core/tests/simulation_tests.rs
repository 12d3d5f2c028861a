#![cfg(feature = "simulation")]

use lendfund_core::monte_carlo::simulation::{
    closed_form_var, simulate_portfolio, SimulationSpec, StepScheme,
};

const SEED: u64 = 42;

fn scenario_spec() -> SimulationSpec {
    SimulationSpec {
        initial_value: 1_000_000.0,
        expected_annual_return_percent: 10.0,
        annual_volatility_percent: 15.0,
        horizon_years: 1.0,
        path_count: 50_000,
        confidence_level: 0.95,
        random_seed: Some(SEED),
        step_scheme: StepScheme::TerminalDraw,
    }
}

// ===========================================================================
// Scenario: 1M at 10%/15% over 1 year, 50k paths, seed 42
// ===========================================================================

#[test]
fn test_scenario_var_is_positive_and_stable() {
    let first = simulate_portfolio(&scenario_spec()).unwrap();
    let second = simulate_portfolio(&scenario_spec()).unwrap();

    assert!(
        first.result.value_at_risk > 0.0,
        "loss-side tail expected, got VaR {}",
        first.result.value_at_risk
    );
    // Bit-identical across runs with the same seed
    assert_eq!(
        first.result.terminal_values,
        second.result.terminal_values
    );
    assert_eq!(first.result.value_at_risk, second.result.value_at_risk);
    assert_eq!(
        first.result.expected_shortfall,
        second.result.expected_shortfall
    );
}

#[test]
fn test_scenario_agrees_with_closed_form() {
    let output = simulate_portfolio(&scenario_spec()).unwrap();
    let r = &output.result;

    // Lognormal 5% quantile puts VaR near 146k on 1M
    assert!(
        (r.value_at_risk - r.value_at_risk_closed_form).abs() < 0.02 * 1_000_000.0,
        "mc {} vs closed form {}",
        r.value_at_risk,
        r.value_at_risk_closed_form
    );

    let standalone = closed_form_var(&scenario_spec()).unwrap();
    assert_eq!(standalone, r.value_at_risk_closed_form);
}

#[test]
fn test_scenario_expected_shortfall_exceeds_var() {
    let output = simulate_portfolio(&scenario_spec()).unwrap();
    let r = &output.result;

    assert!(!r.sample_too_small);
    assert!(
        r.expected_shortfall > r.value_at_risk,
        "ES {} should exceed VaR {}",
        r.expected_shortfall,
        r.value_at_risk
    );
}

// ===========================================================================
// VaR monotonicity in volatility (fixed seed, large sample)
// ===========================================================================

#[test]
fn test_var_monotone_in_volatility() {
    let volatilities = [5.0, 10.0, 15.0, 25.0, 40.0];
    let mut last_var = f64::NEG_INFINITY;

    for vol in volatilities {
        let mut spec = scenario_spec();
        spec.path_count = 100_000;
        spec.annual_volatility_percent = vol;
        let var = simulate_portfolio(&spec).unwrap().result.value_at_risk;
        assert!(
            var >= last_var,
            "VaR fell from {last_var} to {var} when volatility rose to {vol}%"
        );
        last_var = var;
    }
}

// ===========================================================================
// Step schemes
// ===========================================================================

#[test]
fn test_daily_steps_var_close_to_terminal_draw() {
    // Same lognormal law either way; the tail estimates should agree to
    // within sampling error.
    let mut daily = scenario_spec();
    daily.step_scheme = StepScheme::DailySteps;
    daily.path_count = 20_000;
    let mut terminal = scenario_spec();
    terminal.path_count = 20_000;

    let var_daily = simulate_portfolio(&daily).unwrap().result.value_at_risk;
    let var_terminal = simulate_portfolio(&terminal).unwrap().result.value_at_risk;
    assert!(
        (var_daily - var_terminal).abs() < 0.03 * 1_000_000.0,
        "daily {var_daily} vs terminal {var_terminal}"
    );
}

#[test]
fn test_unseeded_runs_are_valid() {
    let mut spec = scenario_spec();
    spec.random_seed = None;
    spec.path_count = 1_000;
    let output = simulate_portfolio(&spec).unwrap();
    let r = &output.result;

    assert_eq!(r.terminal_values.len(), 1_000);
    assert!(r.terminal_values.iter().all(|v| *v > 0.0));
    assert!(r.std_dev_terminal_value > 0.0, "sample must not be degenerate");
}
