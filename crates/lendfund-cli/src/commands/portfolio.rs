use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use lendfund_core::portfolio::ratios;
use lendfund_core::portfolio::returns::{
    analyze_return_series, ReturnFrequency, ReturnSeriesInput,
};

use crate::input;

/// Arguments for scalar risk-adjusted ratios
#[derive(Args)]
pub struct RatiosArgs {
    /// Annualised portfolio return (decimal, 0.12 = 12%)
    #[arg(long, allow_hyphen_values = true)]
    pub portfolio_return: Decimal,

    /// Annualised risk-free rate (decimal)
    #[arg(long, default_value = "0.042", allow_hyphen_values = true)]
    pub risk_free_rate: Decimal,

    /// Annualised volatility (decimal); enables Sharpe and estimated Sortino
    #[arg(long)]
    pub volatility: Option<Decimal>,

    /// Measured downside deviation (decimal); overrides the Sortino estimate
    #[arg(long)]
    pub downside_deviation: Option<Decimal>,

    /// Maximum drawdown (decimal); enables Calmar
    #[arg(long, allow_hyphen_values = true)]
    pub max_drawdown: Option<Decimal>,

    /// Portfolio beta; enables Treynor
    #[arg(long, allow_hyphen_values = true)]
    pub beta: Option<Decimal>,

    /// Benchmark return (decimal); with --tracking-error enables Information ratio
    #[arg(long, allow_hyphen_values = true)]
    pub benchmark_return: Option<Decimal>,

    /// Annualised tracking error (decimal)
    #[arg(long)]
    pub tracking_error: Option<Decimal>,
}

/// Arguments for full return-series analysis
#[derive(Args)]
pub struct SeriesArgs {
    /// Path to JSON/YAML input file with a ReturnSeriesInput
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated periodic returns (e.g. "0.05,0.02,-0.01,0.03")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub returns: Option<Vec<Decimal>>,

    /// Comma-separated market returns at the same frequency
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub market_returns: Option<Vec<Decimal>>,

    /// Risk-free rate (annualised, decimal)
    #[arg(long, default_value = "0.042")]
    pub risk_free_rate: Decimal,

    /// Return frequency: daily, weekly, monthly, quarterly, annual
    #[arg(long, default_value = "monthly")]
    pub frequency: String,

    /// Target return for downside deviation (annualised, decimal)
    #[arg(long, allow_hyphen_values = true)]
    pub target_return: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RatiosOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    sharpe_ratio: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sortino_ratio: Option<Decimal>,
    /// True when the Sortino denominator was estimated from volatility
    /// rather than measured from a return series.
    sortino_is_estimate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    calmar_ratio: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    treynor_ratio: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    information_ratio: Option<Decimal>,
    portfolio_return: Decimal,
    risk_free_rate: Decimal,
}

fn parse_frequency(s: &str) -> Result<ReturnFrequency, Box<dyn std::error::Error>> {
    match s.to_lowercase().as_str() {
        "daily" => Ok(ReturnFrequency::Daily),
        "weekly" => Ok(ReturnFrequency::Weekly),
        "monthly" => Ok(ReturnFrequency::Monthly),
        "quarterly" => Ok(ReturnFrequency::Quarterly),
        "annual" | "annually" => Ok(ReturnFrequency::Annual),
        _ => Err(format!(
            "Unknown frequency '{}'. Use: daily, weekly, monthly, quarterly, annual",
            s
        )
        .into()),
    }
}

/// Compute every ratio the supplied figures support. Each ratio needs its
/// own denominator flag; anything not computable is omitted rather than
/// guessed.
pub fn run_ratios(args: RatiosArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rp = args.portfolio_return;
    let rf = args.risk_free_rate;

    let sharpe_ratio = match args.volatility {
        Some(vol) => Some(ratios::sharpe_ratio(rp, rf, vol)?),
        None => None,
    };

    let (sortino_ratio, sortino_is_estimate) = match (args.downside_deviation, args.volatility) {
        (Some(dd), _) => (Some(ratios::sortino_ratio(rp, rf, dd)?), false),
        (None, Some(vol)) => (Some(ratios::sortino_ratio_estimated(rp, rf, vol)?), true),
        (None, None) => (None, false),
    };

    let calmar_ratio = match args.max_drawdown {
        Some(dd) => Some(ratios::calmar_ratio(rp, dd)?),
        None => None,
    };

    let treynor_ratio = match args.beta {
        Some(b) => Some(ratios::treynor_ratio(rp, rf, b)?),
        None => None,
    };

    let information_ratio = match (args.benchmark_return, args.tracking_error) {
        (Some(bench), Some(te)) => Some(ratios::information_ratio(rp, bench, te)?),
        (Some(_), None) | (None, Some(_)) => {
            return Err(
                "Information ratio needs both --benchmark-return and --tracking-error".into(),
            )
        }
        (None, None) => None,
    };

    if sharpe_ratio.is_none()
        && sortino_ratio.is_none()
        && calmar_ratio.is_none()
        && treynor_ratio.is_none()
        && information_ratio.is_none()
    {
        return Err("No ratio computable: supply --volatility, --downside-deviation, \
                    --max-drawdown, --beta, or --benchmark-return with --tracking-error"
            .into());
    }

    let output = RatiosOutput {
        sharpe_ratio,
        sortino_ratio,
        sortino_is_estimate,
        calmar_ratio,
        treynor_ratio,
        information_ratio,
        portfolio_return: rp,
        risk_free_rate: rf,
    };

    Ok(serde_json::to_value(output)?)
}

pub fn run_series(args: SeriesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series_input: ReturnSeriesInput = match input::resolve(&args.input)? {
        Some(s) => s,
        None => {
            let returns = args
                .returns
                .clone()
                .ok_or("Provide --returns or --input file or pipe JSON via stdin")?;
            ReturnSeriesInput {
                returns,
                risk_free_rate: args.risk_free_rate,
                market_returns: args.market_returns.clone(),
                frequency: parse_frequency(&args.frequency)?,
                target_return: args.target_return,
            }
        }
    };

    let output = analyze_return_series(&series_input)?;
    Ok(serde_json::to_value(output)?)
}
