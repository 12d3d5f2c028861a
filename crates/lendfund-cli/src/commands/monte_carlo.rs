use clap::Args;
use serde_json::Value;

use lendfund_core::monte_carlo::simulation::{simulate_portfolio, SimulationSpec, StepScheme};

use crate::input;

/// Arguments for Monte Carlo portfolio simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON/YAML input file with a SimulationSpec
    #[arg(long)]
    pub input: Option<String>,

    /// Portfolio value today
    #[arg(long)]
    pub initial_value: Option<f64>,

    /// Expected annual return in percent (10 means 10%)
    #[arg(long, allow_hyphen_values = true)]
    pub expected_return: Option<f64>,

    /// Annual volatility in percent
    #[arg(long)]
    pub volatility: Option<f64>,

    /// Horizon in years
    #[arg(long, default_value = "1")]
    pub horizon: f64,

    /// Number of simulation paths
    #[arg(long, default_value = "10000")]
    pub paths: u32,

    /// VaR confidence level, strictly between 0 and 1
    #[arg(long, default_value = "0.95")]
    pub confidence: f64,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Compound daily sub-steps instead of a single terminal draw
    #[arg(long)]
    pub daily_steps: bool,

    /// Include every terminal path value in the output (large)
    #[arg(long)]
    pub include_paths: bool,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let spec: SimulationSpec = match input::resolve(&args.input)? {
        Some(s) => s,
        None => SimulationSpec {
            initial_value: args
                .initial_value
                .ok_or("--initial-value required (or use --input / stdin)")?,
            expected_annual_return_percent: args
                .expected_return
                .ok_or("--expected-return required (or use --input / stdin)")?,
            annual_volatility_percent: args
                .volatility
                .ok_or("--volatility required (or use --input / stdin)")?,
            horizon_years: args.horizon,
            path_count: args.paths,
            confidence_level: args.confidence,
            random_seed: args.seed,
            step_scheme: if args.daily_steps {
                StepScheme::DailySteps
            } else {
                StepScheme::TerminalDraw
            },
        },
    };

    let output = simulate_portfolio(&spec)?;
    let mut value = serde_json::to_value(output)?;

    // Tens of thousands of path values drown the report; keep them only on
    // request.
    if !args.include_paths {
        if let Some(result) = value.get_mut("result").and_then(|r| r.as_object_mut()) {
            result.remove("terminal_values");
        }
    }

    Ok(value)
}
