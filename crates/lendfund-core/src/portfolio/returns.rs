//! Return-series analysis: annualised return and volatility plus the full
//! ratio suite. Ratios with a degenerate denominator come back as `None`,
//! never as a silent numeric stand-in.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LendFundError;
use crate::portfolio::ratios;
use crate::types::*;
use crate::LendFundResult;

/// Frequency of return observations
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ReturnFrequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl ReturnFrequency {
    /// Number of periods in a year for annualisation
    pub fn periods_per_year(&self) -> Decimal {
        match self {
            ReturnFrequency::Daily => dec!(252),
            ReturnFrequency::Weekly => dec!(52),
            ReturnFrequency::Monthly => dec!(12),
            ReturnFrequency::Quarterly => dec!(4),
            ReturnFrequency::Annual => dec!(1),
        }
    }
}

/// Input for return-series analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnSeriesInput {
    /// Periodic returns, chronological, consistently percent or decimal
    /// (never mixed; ratios are scale-free, annualisation is not)
    pub returns: Vec<Decimal>,
    /// Risk-free rate (annualised, same scale as `returns`)
    pub risk_free_rate: Rate,
    /// Market returns at the same frequency, for beta-family metrics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_returns: Option<Vec<Decimal>>,
    /// Observation frequency
    pub frequency: ReturnFrequency,
    /// Target return for downside deviation (annualised); defaults to
    /// risk_free_rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_return: Option<Rate>,
}

/// Output of return-series analysis. `None` marks a ratio whose
/// denominator was degenerate for this series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnSeriesAnalysis {
    pub annualised_return: Rate,
    pub annualised_volatility: Rate,
    pub sharpe_ratio: Option<Decimal>,
    pub sortino_ratio: Option<Decimal>,
    pub calmar_ratio: Option<Decimal>,
    pub information_ratio: Option<Decimal>,
    pub treynor_ratio: Option<Decimal>,
    pub max_drawdown: Rate,
    pub downside_deviation: Rate,
    pub tracking_error: Option<Rate>,
    pub beta: Option<Decimal>,
    pub alpha: Option<Rate>,
}

/// Analyze a return series end to end.
///
/// Annualises the mean and sample volatility by `frequency`, measures
/// downside deviation against the (per-period) target, and fills every
/// ratio the series supports. Market-dependent fields are `None` without
/// `market_returns`.
pub fn analyze_return_series(
    input: &ReturnSeriesInput,
) -> LendFundResult<ComputationOutput<ReturnSeriesAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let n = input.returns.len();
    if n < 2 {
        return Err(LendFundError::InvalidInput {
            field: "returns".into(),
            reason: "At least 2 return observations required".into(),
        });
    }

    let n_dec = Decimal::from(n as i64);
    let periods = input.frequency.periods_per_year();

    let sum: Decimal = input.returns.iter().sum();
    let mean_return = sum / n_dec;
    let annualised_return = mean_return * periods;

    let variance = ratios::sample_variance(&input.returns, mean_return);
    let std_dev = ratios::sqrt_decimal(variance);
    let annualised_volatility = std_dev * ratios::sqrt_decimal(periods);

    let sharpe_ratio =
        ratios::sharpe_ratio(annualised_return, input.risk_free_rate, annualised_volatility).ok();
    if sharpe_ratio.is_none() {
        warnings.push("Zero volatility; Sharpe ratio omitted".into());
    }

    let target_per_period = input.target_return.unwrap_or(input.risk_free_rate) / periods;
    let downside_dev = ratios::downside_deviation(&input.returns, target_per_period);
    let annualised_downside = downside_dev * ratios::sqrt_decimal(periods);

    let sortino_ratio =
        ratios::sortino_ratio(annualised_return, input.risk_free_rate, annualised_downside).ok();
    if sortino_ratio.is_none() {
        warnings.push("No below-target observations; Sortino ratio omitted".into());
    }

    let max_dd = ratios::max_drawdown(&input.returns);
    let calmar_ratio = ratios::calmar_ratio(annualised_return, max_dd).ok();

    // Market-dependent metrics
    let (information_ratio, tracking_error, beta, alpha, treynor_ratio) =
        if let Some(ref market) = input.market_returns {
            if market.len() != n {
                return Err(LendFundError::InvalidInput {
                    field: "market_returns".into(),
                    reason: "Market series must have same length as returns".into(),
                });
            }

            let market_mean: Decimal = market.iter().sum::<Decimal>() / n_dec;

            // Excess returns over the market
            let excess: Vec<Decimal> = input
                .returns
                .iter()
                .zip(market.iter())
                .map(|(r, m)| r - m)
                .collect();
            let excess_mean: Decimal = excess.iter().sum::<Decimal>() / n_dec;
            let te_var = ratios::sample_variance(&excess, excess_mean);
            let te = ratios::sqrt_decimal(te_var) * ratios::sqrt_decimal(periods);

            let ir =
                ratios::information_ratio(annualised_return, market_mean * periods, te).ok();

            let beta_val = ratios::beta(&input.returns, market).ok();

            // Alpha = Rp - [Rf + Beta * (Rm - Rf)] (annualised)
            let alpha_val = beta_val.map(|b| {
                annualised_return
                    - (input.risk_free_rate
                        + b * (market_mean * periods - input.risk_free_rate))
            });

            let treynor = beta_val.and_then(|b| {
                ratios::treynor_ratio(annualised_return, input.risk_free_rate, b).ok()
            });

            (ir, Some(te), beta_val, alpha_val, treynor)
        } else {
            (None, None, None, None, None)
        };

    let analysis = ReturnSeriesAnalysis {
        annualised_return,
        annualised_volatility,
        sharpe_ratio,
        sortino_ratio,
        calmar_ratio,
        information_ratio,
        treynor_ratio,
        max_drawdown: max_dd,
        downside_deviation: annualised_downside,
        tracking_error,
        beta,
        alpha,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Return Series Analysis (Sharpe, Sortino, Calmar, Information Ratio, Treynor, Alpha/Beta)",
        &serde_json::json!({
            "observations": n,
            "frequency": format!("{:?}", input.frequency),
            "risk_free_rate": input.risk_free_rate.to_string(),
        }),
        warnings,
        elapsed,
        analysis,
    ))
}
