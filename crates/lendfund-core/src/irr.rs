use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::LendFundError;
use crate::types::{Money, Percent, Rate};
use crate::LendFundResult;

const NPV_TOLERANCE: Decimal = dec!(0.000001);
const NPV_TOLERANCE_F64: f64 = 1e-6;
const STEP_TOLERANCE: Decimal = dec!(0.00000001);
const MAX_NEWTON_ITERATIONS: u32 = 100;
const BISECTION_MAX_ITER: u32 = 200;
/// Bracket for the bisection fallback, as decimal rates (-99% to 1000%).
const BRACKET_LO: Decimal = dec!(-0.99);
const BRACKET_HI: Decimal = dec!(10.0);

const PERCENT_DIVISOR: Decimal = dec!(100);

/// Conventional starting guess when the caller has no better seed (10%).
pub const DEFAULT_GUESS_PERCENT: Decimal = dec!(10);

/// Internal rate of return of a cash flow series, in percent terms.
///
/// `cash_flows[0]` occurs now; flow `t` occurs `t` periods out. The series
/// must contain at least 2 flows and at least one sign change, otherwise
/// `InvalidInput`. Newton-Raphson runs first; when it stalls or walks
/// outside -99%..1000%, bisection over that bracket takes over. If no sign
/// change of NPV exists over the bracket either, `ConvergenceFailure`.
///
/// The result is the decimal rate times 100, rounded to 4 decimal places.
pub fn solve_irr(
    cash_flows: &[Money],
    initial_guess_percent: Percent,
) -> LendFundResult<Percent> {
    if cash_flows.len() < 2 {
        return Err(LendFundError::InvalidInput {
            field: "cash_flows".into(),
            reason: "IRR requires at least 2 cash flows".into(),
        });
    }
    if !has_sign_change(cash_flows) {
        return Err(LendFundError::InvalidInput {
            field: "cash_flows".into(),
            reason: "IRR requires at least one sign change in the cash flows".into(),
        });
    }

    let mut rate = initial_guess_percent / PERCENT_DIVISOR;

    // A guess outside the solvable bracket goes straight to bisection.
    if rate < BRACKET_LO || rate > BRACKET_HI {
        let found = bisect(cash_flows)?;
        return Ok(to_percent(found));
    }

    for _ in 0..MAX_NEWTON_ITERATIONS {
        // Overflow near the bracket floor (discount terms blow past the
        // 128-bit decimal range) hands over to bisection like any other
        // stalled step.
        let Some((npv, dnpv)) = npv_and_derivative(cash_flows, rate) else {
            let found = bisect(cash_flows)?;
            return Ok(to_percent(found));
        };

        if npv.abs() < NPV_TOLERANCE {
            return Ok(to_percent(rate));
        }

        if dnpv.is_zero() {
            // Flat derivative: Newton-Raphson cannot make progress.
            let found = bisect(cash_flows)?;
            return Ok(to_percent(found));
        }

        let next = rate - npv / dnpv;

        if (next - rate).abs() < STEP_TOLERANCE {
            return Ok(to_percent(next));
        }

        if next < BRACKET_LO || next > BRACKET_HI {
            let found = bisect(cash_flows)?;
            return Ok(to_percent(found));
        }

        rate = next;
    }

    let found = bisect(cash_flows)?;
    Ok(to_percent(found))
}

fn to_percent(rate: Rate) -> Percent {
    (rate * PERCENT_DIVISOR).round_dp(4)
}

/// True if the series holds both a strictly positive and a strictly
/// negative flow (zeros are ignored).
fn has_sign_change(cash_flows: &[Money]) -> bool {
    let mut has_positive = false;
    let mut has_negative = false;
    for cf in cash_flows {
        if *cf > Decimal::ZERO {
            has_positive = true;
        } else if *cf < Decimal::ZERO {
            has_negative = true;
        }
        if has_positive && has_negative {
            return true;
        }
    }
    false
}

/// NPV and its derivative with respect to the rate, at a decimal rate.
///
/// `None` means the evaluation left the decimal range: near -99% the
/// discount terms grow as `0.01^-t`, so a long series over- or underflows
/// well inside the bracket. Callers fall back to bisection in that case.
fn npv_and_derivative(cash_flows: &[Money], rate: Rate) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    let mut npv = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t == 0 {
            npv = npv.checked_add(*cf)?;
            continue;
        }
        discount = discount.checked_mul(one_plus_r)?;
        if discount.is_zero() {
            return None;
        }
        npv = npv.checked_add(cf.checked_div(discount)?)?;
        let slope_denom = discount.checked_mul(one_plus_r)?;
        if slope_denom.is_zero() {
            return None;
        }
        let term = Decimal::from(t as i64)
            .checked_mul(*cf)?
            .checked_div(slope_denom)?;
        dnpv = dnpv.checked_sub(term)?;
    }

    Some((npv, dnpv))
}

/// NPV in `f64`, for the bisection path. The bracket ends produce values
/// far outside the decimal range (a 12-payment loan reaches ~1e28 at -99%)
/// but only the sign and rough magnitude matter there, so the float
/// evaluation is the right representation.
fn npv_f64(cash_flows: &[Money], rate: f64) -> f64 {
    let one_plus_r = 1.0 + rate;
    let mut npv = 0.0;
    let mut discount = 1.0;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        npv += cf.to_f64().unwrap_or(0.0) / discount;
    }

    npv
}

fn delta_from_f64(npv: f64) -> Decimal {
    Decimal::from_f64(npv).unwrap_or(Decimal::MAX)
}

/// Bisection over the full bracket. Verifies NPV changes sign across it
/// before halving; a same-signed bracket means no root is reachable.
fn bisect(cash_flows: &[Money]) -> LendFundResult<Rate> {
    let mut lo = BRACKET_LO;
    let mut hi = BRACKET_HI;
    let mut npv_lo = npv_f64(cash_flows, lo.to_f64().unwrap_or(0.0));
    let npv_hi = npv_f64(cash_flows, hi.to_f64().unwrap_or(0.0));

    if npv_lo.is_sign_positive() == npv_hi.is_sign_positive() {
        return Err(LendFundError::ConvergenceFailure {
            function: "solve_irr".into(),
            iterations: 0,
            last_delta: delta_from_f64(npv_lo.abs().min(npv_hi.abs())),
        });
    }

    let mut last_npv = npv_lo;

    for _ in 0..BISECTION_MAX_ITER {
        let mid = (lo + hi) / dec!(2);
        let npv_mid = npv_f64(cash_flows, mid.to_f64().unwrap_or(0.0));
        last_npv = npv_mid;

        if npv_mid.abs() < NPV_TOLERANCE_F64 {
            return Ok(mid);
        }

        if npv_lo.is_sign_positive() != npv_mid.is_sign_positive() {
            hi = mid;
        } else {
            lo = mid;
            npv_lo = npv_mid;
        }

        if (hi - lo).abs() < STEP_TOLERANCE {
            return Ok(mid);
        }
    }

    Err(LendFundError::ConvergenceFailure {
        function: "solve_irr".into(),
        iterations: BISECTION_MAX_ITER,
        last_delta: delta_from_f64(last_npv.abs()),
    })
}
