//! Monte Carlo simulation of portfolio value under geometric Brownian
//! motion, with Value-at-Risk, Expected Shortfall, and a closed-form VaR
//! cross-check. Simulation runs in `f64`; the lognormal model makes decimal
//! precision meaningless here.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::time::Instant;

use crate::error::LendFundError;
use crate::types::{ComputationMetadata, ComputationOutput};
use crate::LendFundResult;

// ---------------------------------------------------------------------------
// Helper: build ComputationOutput without requiring Decimal
// ---------------------------------------------------------------------------

fn with_metadata_f64<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// How each path walks from today to the horizon.
///
/// Both schemes draw from the same lognormal distribution; they are NOT
/// numerically identical path-by-path under the same seed, since the daily
/// scheme consumes one normal draw per trading day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepScheme {
    /// One draw per path straight to the terminal value.
    #[default]
    TerminalDraw,
    /// Compound `round(horizon_years * 252)` daily sub-steps per path.
    DailySteps,
}

/// Input for a portfolio value simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSpec {
    /// Portfolio value today (must be positive).
    pub initial_value: f64,
    /// Annual drift in percent terms (10 means 10%).
    pub expected_annual_return_percent: f64,
    /// Annual volatility in percent terms (must be non-negative).
    pub annual_volatility_percent: f64,
    /// Horizon in years (must be positive).
    pub horizon_years: f64,
    /// Number of independent paths (minimum 1).
    pub path_count: u32,
    /// VaR confidence level, strictly between 0 and 1 (e.g. 0.95).
    pub confidence_level: f64,
    /// Seed for reproducible runs; entropy-seeded when omitted.
    pub random_seed: Option<u64>,
    #[serde(default)]
    pub step_scheme: StepScheme,
}

/// Percentile summary of the terminal value distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Percentiles {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

/// Output of a portfolio value simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Terminal value of every path, in draw order.
    pub terminal_values: Vec<f64>,
    /// `initial_value - sorted[floor((1-c) * n)]`. Deliberately not clamped
    /// at zero; a negative VaR reports a gains-only tail.
    pub value_at_risk: f64,
    /// Mean of the positive losses below the VaR cutoff; 0 when that tail
    /// holds no losses (see `sample_too_small`).
    pub expected_shortfall: f64,
    /// Lognormal-quantile VaR for the same parameters, as a cross-check.
    pub value_at_risk_closed_form: f64,
    /// True when the loss tail was empty and `expected_shortfall` was
    /// reported as 0 instead of dividing by zero.
    pub sample_too_small: bool,
    pub mean_terminal_value: f64,
    pub std_dev_terminal_value: f64,
    pub percentiles: Percentiles,
}

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

/// Compute the percentile value from a **sorted** slice using linear interpolation.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

fn standard_normal() -> LendFundResult<Normal> {
    Normal::new(0.0, 1.0).map_err(|e| LendFundError::InvalidInput {
        field: "distribution".into(),
        reason: format!("Invalid Normal parameters: {e}"),
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Lognormal-quantile VaR for the given spec, without simulating:
/// `V0 - V0 * exp((mu - sigma^2/2) * T + sigma * sqrt(T) * z_(1-c))`.
pub fn closed_form_var(spec: &SimulationSpec) -> LendFundResult<f64> {
    validate_simulation_spec(spec)?;

    let mu = spec.expected_annual_return_percent / 100.0;
    let sigma = spec.annual_volatility_percent / 100.0;
    let horizon = spec.horizon_years;
    let drift = mu - 0.5 * sigma * sigma;

    let z = standard_normal()?.inverse_cdf(1.0 - spec.confidence_level);
    let quantile = spec.initial_value * (drift * horizon + sigma * horizon.sqrt() * z).exp();
    Ok(spec.initial_value - quantile)
}

/// Simulate the portfolio value at the horizon and derive tail risk.
///
/// Each of `path_count` paths draws independent standard normals and walks
/// `initial_value` forward under GBM with drift `mu - sigma^2/2`. VaR reads
/// the terminal distribution at `confidence_level`; Expected Shortfall
/// averages the positive losses beyond that cutoff. Identical specs with the
/// same `random_seed` reproduce `terminal_values` bit for bit.
pub fn simulate_portfolio(
    spec: &SimulationSpec,
) -> LendFundResult<ComputationOutput<SimulationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_simulation_spec(spec)?;

    let mu = spec.expected_annual_return_percent / 100.0;
    let sigma = spec.annual_volatility_percent / 100.0;
    let horizon = spec.horizon_years;
    let drift = mu - 0.5 * sigma * sigma;

    let mut rng = match spec.random_seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let normal = standard_normal()?;

    let n = spec.path_count as usize;
    let mut terminal_values: Vec<f64> = Vec::with_capacity(n);

    match spec.step_scheme {
        StepScheme::TerminalDraw => {
            let sqrt_horizon = horizon.sqrt();
            for _ in 0..n {
                let z: f64 = rng.sample(normal);
                let terminal =
                    spec.initial_value * (drift * horizon + sigma * sqrt_horizon * z).exp();
                terminal_values.push(terminal);
            }
        }
        StepScheme::DailySteps => {
            let steps = (horizon * TRADING_DAYS_PER_YEAR).round().max(1.0) as u32;
            let dt = horizon / steps as f64;
            let sqrt_dt = dt.sqrt();
            for _ in 0..n {
                let mut value = spec.initial_value;
                for _ in 0..steps {
                    let z: f64 = rng.sample(normal);
                    value *= (drift * dt + sigma * sqrt_dt * z).exp();
                }
                terminal_values.push(value);
            }
        }
    }

    let mut sorted = terminal_values.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    // Tail cutoff: floor((1-c) * n), kept inside the sample.
    let var_index =
        (((1.0 - spec.confidence_level) * n as f64).floor() as usize).min(n - 1);
    let value_at_risk = spec.initial_value - sorted[var_index];

    // ES averages the positive losses strictly below the cutoff.
    let tail_losses: Vec<f64> = sorted[..var_index]
        .iter()
        .map(|v| spec.initial_value - v)
        .filter(|loss| *loss > 0.0)
        .collect();

    let (expected_shortfall, sample_too_small) = if tail_losses.is_empty() {
        warnings.push(format!(
            "No positive losses below the VaR cutoff ({} tail paths of {}); expected shortfall reported as 0",
            var_index, n
        ));
        (0.0, true)
    } else {
        (
            tail_losses.iter().sum::<f64>() / tail_losses.len() as f64,
            false,
        )
    };

    let value_at_risk_closed_form = closed_form_var(spec)?;

    let mean = terminal_values.iter().sum::<f64>() / n as f64;
    let variance = terminal_values
        .iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / n as f64;

    let percentiles = Percentiles {
        p5: percentile_sorted(&sorted, 5.0),
        p10: percentile_sorted(&sorted, 10.0),
        p25: percentile_sorted(&sorted, 25.0),
        p50: percentile_sorted(&sorted, 50.0),
        p75: percentile_sorted(&sorted, 75.0),
        p90: percentile_sorted(&sorted, 90.0),
        p95: percentile_sorted(&sorted, 95.0),
    };

    let result = SimulationResult {
        terminal_values,
        value_at_risk,
        expected_shortfall,
        value_at_risk_closed_form,
        sample_too_small,
        mean_terminal_value: mean,
        std_dev_terminal_value: variance.sqrt(),
        percentiles,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata_f64(
        "Monte Carlo Portfolio Simulation — GBM terminal values, VaR/ES",
        &serde_json::json!({
            "initial_value": spec.initial_value,
            "expected_annual_return_percent": spec.expected_annual_return_percent,
            "annual_volatility_percent": spec.annual_volatility_percent,
            "horizon_years": spec.horizon_years,
            "path_count": spec.path_count,
            "confidence_level": spec.confidence_level,
            "random_seed": spec.random_seed,
            "step_scheme": spec.step_scheme,
        }),
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_simulation_spec(spec: &SimulationSpec) -> LendFundResult<()> {
    if !spec.initial_value.is_finite() || spec.initial_value <= 0.0 {
        return Err(LendFundError::InvalidInput {
            field: "initial_value".into(),
            reason: "Initial value must be positive".into(),
        });
    }
    if !spec.expected_annual_return_percent.is_finite() {
        return Err(LendFundError::InvalidInput {
            field: "expected_annual_return_percent".into(),
            reason: "Expected return must be finite".into(),
        });
    }
    if !spec.annual_volatility_percent.is_finite() || spec.annual_volatility_percent < 0.0 {
        return Err(LendFundError::InvalidInput {
            field: "annual_volatility_percent".into(),
            reason: "Volatility cannot be negative".into(),
        });
    }
    if !spec.horizon_years.is_finite() || spec.horizon_years <= 0.0 {
        return Err(LendFundError::InvalidInput {
            field: "horizon_years".into(),
            reason: "Horizon must be positive".into(),
        });
    }
    if spec.path_count == 0 {
        return Err(LendFundError::InvalidInput {
            field: "path_count".into(),
            reason: "Must be at least 1".into(),
        });
    }
    if !(spec.confidence_level > 0.0 && spec.confidence_level < 1.0) {
        return Err(LendFundError::InvalidInput {
            field: "confidence_level".into(),
            reason: "Confidence level must be strictly between 0 and 1".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
