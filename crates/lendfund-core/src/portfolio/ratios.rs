//! Risk-adjusted performance ratios as pure functions over already-computed
//! numbers. Every undefined denominator is a hard error; these functions
//! never substitute a default where the ratio does not exist.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LendFundError;
use crate::types::Rate;
use crate::LendFundResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Downside deviation estimate as a share of total volatility, for callers
/// with no return series. An assumption, not a measurement.
const DOWNSIDE_ESTIMATE_FACTOR: Decimal = dec!(0.7);

/// Documented fallback beta for callers with no market series at all.
/// Using it is an explicit modelling choice; `beta()` never returns it.
pub const FALLBACK_BETA: Decimal = Decimal::ONE;

// ---------------------------------------------------------------------------
// Ratios
// ---------------------------------------------------------------------------

/// `(portfolio_return - risk_free_rate) / volatility`. The ratio is
/// undefined at zero volatility and that is an error, not a zero.
pub fn sharpe_ratio(
    portfolio_return: Rate,
    risk_free_rate: Rate,
    volatility: Rate,
) -> LendFundResult<Decimal> {
    if volatility <= Decimal::ZERO {
        return Err(LendFundError::InvalidInput {
            field: "volatility".into(),
            reason: "Sharpe ratio is undefined at zero or negative volatility".into(),
        });
    }
    Ok((portfolio_return - risk_free_rate) / volatility)
}

/// Sharpe numerator over a **measured** downside deviation.
pub fn sortino_ratio(
    portfolio_return: Rate,
    risk_free_rate: Rate,
    downside_deviation: Rate,
) -> LendFundResult<Decimal> {
    if downside_deviation <= Decimal::ZERO {
        return Err(LendFundError::InvalidInput {
            field: "downside_deviation".into(),
            reason: "Sortino ratio is undefined at zero or negative downside deviation".into(),
        });
    }
    Ok((portfolio_return - risk_free_rate) / downside_deviation)
}

/// Sortino ratio with downside deviation **estimated** as 70% of total
/// volatility. For callers without a return series; results carry the
/// estimate's error and must be labeled as estimates downstream.
pub fn sortino_ratio_estimated(
    portfolio_return: Rate,
    risk_free_rate: Rate,
    volatility: Rate,
) -> LendFundResult<Decimal> {
    if volatility <= Decimal::ZERO {
        return Err(LendFundError::InvalidInput {
            field: "volatility".into(),
            reason: "Estimated Sortino ratio is undefined at zero or negative volatility".into(),
        });
    }
    Ok((portfolio_return - risk_free_rate) / (volatility * DOWNSIDE_ESTIMATE_FACTOR))
}

/// `annual_return / |max_drawdown|`. Accepts drawdowns in either sign
/// convention; errs when the drawdown is exactly zero.
pub fn calmar_ratio(annual_return: Rate, max_drawdown: Rate) -> LendFundResult<Decimal> {
    if max_drawdown.is_zero() {
        return Err(LendFundError::InvalidInput {
            field: "max_drawdown".into(),
            reason: "Calmar ratio is undefined at zero drawdown".into(),
        });
    }
    Ok(annual_return / max_drawdown.abs())
}

/// `(portfolio_return - risk_free_rate) / beta`. A negative beta is a valid
/// (short-market) input; zero beta is an error.
pub fn treynor_ratio(
    portfolio_return: Rate,
    risk_free_rate: Rate,
    beta: Decimal,
) -> LendFundResult<Decimal> {
    if beta.is_zero() {
        return Err(LendFundError::InvalidInput {
            field: "beta".into(),
            reason: "Treynor ratio is undefined at zero beta".into(),
        });
    }
    Ok((portfolio_return - risk_free_rate) / beta)
}

/// `(portfolio_return - benchmark_return) / tracking_error`.
pub fn information_ratio(
    portfolio_return: Rate,
    benchmark_return: Rate,
    tracking_error: Rate,
) -> LendFundResult<Decimal> {
    if tracking_error <= Decimal::ZERO {
        return Err(LendFundError::InvalidInput {
            field: "tracking_error".into(),
            reason: "Information ratio is undefined at zero or negative tracking error".into(),
        });
    }
    Ok((portfolio_return - benchmark_return) / tracking_error)
}

// ---------------------------------------------------------------------------
// Series statistics
// ---------------------------------------------------------------------------

/// Maximum drawdown of a compounded return series: the largest
/// `(peak - current) / peak` over the running peak. Empty and
/// single-element series yield 0.
pub fn max_drawdown(returns: &[Decimal]) -> Rate {
    if returns.len() < 2 {
        return Decimal::ZERO;
    }

    let mut cumulative = Decimal::ONE;
    let mut peak = Decimal::ONE;
    let mut max_dd = Decimal::ZERO;

    for r in returns {
        cumulative *= Decimal::ONE + r;
        if cumulative > peak {
            peak = cumulative;
        }
        if !peak.is_zero() {
            let dd = (peak - cumulative) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Sample beta: `Cov(portfolio, market) / Var(market)` with n-1 denominators.
/// Requires equal-length series of at least 2 observations and a market
/// series with spread; anything else is `InvalidInput`, never a default
/// (see [`FALLBACK_BETA`] for the explicit no-series fallback).
pub fn beta(portfolio_returns: &[Decimal], market_returns: &[Decimal]) -> LendFundResult<Decimal> {
    if portfolio_returns.len() != market_returns.len() {
        return Err(LendFundError::InvalidInput {
            field: "market_returns".into(),
            reason: "Market series must have the same length as portfolio returns".into(),
        });
    }
    if portfolio_returns.len() < 2 {
        return Err(LendFundError::InvalidInput {
            field: "portfolio_returns".into(),
            reason: "Beta requires at least 2 observations".into(),
        });
    }

    let n = Decimal::from(portfolio_returns.len() as i64);
    let portfolio_mean: Decimal = portfolio_returns.iter().sum::<Decimal>() / n;
    let market_mean: Decimal = market_returns.iter().sum::<Decimal>() / n;

    let market_variance = sample_variance(market_returns, market_mean);
    if market_variance.is_zero() {
        return Err(LendFundError::InvalidInput {
            field: "market_returns".into(),
            reason: "Beta is undefined against a zero-variance market series".into(),
        });
    }

    let cov = covariance(portfolio_returns, market_returns, portfolio_mean, market_mean);
    Ok(cov / market_variance)
}

/// Downside deviation: root mean square of below-target shortfalls,
/// n denominator. Empty series yields 0.
pub fn downside_deviation(returns: &[Decimal], target: Decimal) -> Rate {
    let n = returns.len();
    if n == 0 {
        return Decimal::ZERO;
    }
    let sum_sq: Decimal = returns
        .iter()
        .map(|r| {
            let diff = r - target;
            if diff < Decimal::ZERO {
                diff * diff
            } else {
                Decimal::ZERO
            }
        })
        .sum();
    sqrt_decimal(sum_sq / Decimal::from(n as i64))
}

/// Sample variance (n-1 denominator)
pub(crate) fn sample_variance(data: &[Decimal], mean: Decimal) -> Decimal {
    let n = data.len();
    if n < 2 {
        return Decimal::ZERO;
    }
    let sum_sq: Decimal = data.iter().map(|x| (x - mean) * (x - mean)).sum();
    sum_sq / Decimal::from((n - 1) as i64)
}

/// Covariance between two series (sample, n-1)
fn covariance(x: &[Decimal], y: &[Decimal], x_mean: Decimal, y_mean: Decimal) -> Decimal {
    let n = x.len();
    if n < 2 {
        return Decimal::ZERO;
    }
    let sum: Decimal = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
        .sum();
    sum / Decimal::from((n - 1) as i64)
}

/// Square root via Decimal::sqrt(), zero for non-positive input
pub(crate) fn sqrt_decimal(val: Decimal) -> Decimal {
    if val <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    val.sqrt().unwrap_or(Decimal::ZERO)
}
