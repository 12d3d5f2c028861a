use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LendFundError;
use crate::types::{Money, Percent};
use crate::LendFundResult;

const PERCENT_DIVISOR: Decimal = dec!(100);

/// Present value of a single future amount discounted over whole periods.
///
/// `discount_rate_percent` is in percent terms (5 = 5%). A rate of exactly
/// -100% makes the discount factor zero and fails with `DivisionByZero`;
/// any other rate, including rates below -100%, produces a finite value as
/// long as it stays inside the 128-bit decimal range, otherwise
/// `InvalidInput`.
pub fn present_value(
    future_value: Money,
    discount_rate_percent: Percent,
    periods: u32,
) -> LendFundResult<Money> {
    let one_plus_r = Decimal::ONE + discount_rate_percent / PERCENT_DIVISOR;
    if one_plus_r.is_zero() {
        return Err(LendFundError::DivisionByZero {
            context: "present value discount factor (rate of -100%)".into(),
        });
    }

    let factor = one_plus_r
        .checked_powi(periods as i64)
        .ok_or_else(|| range_exceeded("discount_rate_percent", periods as usize))?;
    if factor.is_zero() {
        return Err(LendFundError::DivisionByZero {
            context: format!("present value discount factor at period {periods}"),
        });
    }

    future_value
        .checked_div(factor)
        .ok_or_else(|| range_exceeded("future_value", periods as usize))
}

/// Net present value of a series of cash flows.
///
/// `cash_flows[0]` occurs now and is not discounted; flow `t` is discounted
/// by `(1 + r)^t`. Fails with `DivisionByZero` when the rate is exactly
/// -100% (or the discount factor underflows to zero); rates below -100%
/// alternate the sign of the discount factor but remain finite. A
/// discounted flow past the 128-bit decimal range is `InvalidInput`, not
/// a panic.
pub fn net_present_value(
    cash_flows: &[Money],
    discount_rate_percent: Percent,
) -> LendFundResult<Money> {
    let one_plus_r = Decimal::ONE + discount_rate_percent / PERCENT_DIVISOR;
    if one_plus_r.is_zero() {
        return Err(LendFundError::DivisionByZero {
            context: "NPV discount factor (rate of -100%)".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount
                .checked_mul(one_plus_r)
                .ok_or_else(|| range_exceeded("discount_rate_percent", t))?;
        }
        if discount.is_zero() {
            return Err(LendFundError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        let term = cf
            .checked_div(discount)
            .ok_or_else(|| range_exceeded("cash_flows", t))?;
        result = result
            .checked_add(term)
            .ok_or_else(|| range_exceeded("cash_flows", t))?;
    }

    Ok(result)
}

fn range_exceeded(field: &str, period: usize) -> LendFundError {
    LendFundError::InvalidInput {
        field: field.into(),
        reason: format!("discounted value at period {period} exceeds the representable range"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_present_value_single_period() {
        // 1000 one period out at 5% => 952.38
        let result = present_value(dec!(1000), dec!(5), 1).unwrap();
        assert!((result - dec!(952.380952)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_present_value_zero_periods() {
        let result = present_value(dec!(1000), dec!(5), 0).unwrap();
        assert_eq!(result, dec!(1000));
    }

    #[test]
    fn test_present_value_zero_rate() {
        let result = present_value(dec!(1000), dec!(0), 10).unwrap();
        assert_eq!(result, dec!(1000));
    }

    #[test]
    fn test_present_value_minus_100_percent_fails() {
        let err = present_value(dec!(1000), dec!(-100), 1).unwrap_err();
        assert!(matches!(err, LendFundError::DivisionByZero { .. }));
    }

    #[test]
    fn test_present_value_below_minus_100_is_finite() {
        // 1 + r = -0.5; one period => 1000 / -0.5 = -2000
        let result = present_value(dec!(1000), dec!(-150), 1).unwrap();
        assert_eq!(result, dec!(-2000));
    }

    #[test]
    fn test_present_value_out_of_range_factor_is_an_error() {
        // 101^20 sits far past the decimal range.
        let err = present_value(dec!(1000), dec!(10000), 20).unwrap_err();
        assert!(matches!(err, LendFundError::InvalidInput { .. }));
    }

    #[test]
    fn test_npv_basic() {
        // -1000 now, then 500 x3 at 10%: -1000 + 454.55 + 413.22 + 375.66 = 243.43
        let cfs = vec![dec!(-1000), dec!(500), dec!(500), dec!(500)];
        let result = net_present_value(&cfs, dec!(10)).unwrap();
        assert!((result - dec!(243.43)).abs() < dec!(0.01));
    }

    #[test]
    fn test_npv_first_flow_undiscounted() {
        let cfs = vec![dec!(-1000)];
        let result = net_present_value(&cfs, dec!(50)).unwrap();
        assert_eq!(result, dec!(-1000));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        let result = net_present_value(&cfs, dec!(0)).unwrap();
        assert_eq!(result, dec!(50));
    }

    #[test]
    fn test_npv_minus_100_percent_fails() {
        let cfs = vec![dec!(-100), dec!(200)];
        let err = net_present_value(&cfs, dec!(-100)).unwrap_err();
        assert!(matches!(err, LendFundError::DivisionByZero { .. }));
    }

    #[test]
    fn test_npv_below_minus_100_is_finite() {
        // 1 + r = -0.5: -100 + 50/(-0.5) = -200
        let cfs = vec![dec!(-100), dec!(50)];
        let result = net_present_value(&cfs, dec!(-150)).unwrap();
        assert_eq!(result, dec!(-200));
    }

    #[test]
    fn test_npv_deep_negative_rate_overflow_is_an_error() {
        // At -99% the discount shrinks 100x per period; by period 13 a
        // 30k flow discounts past the decimal range.
        let mut cfs = vec![dec!(-100)];
        cfs.extend(std::iter::repeat(dec!(30000)).take(14));
        let err = net_present_value(&cfs, dec!(-99)).unwrap_err();
        assert!(matches!(err, LendFundError::InvalidInput { .. }));
    }

    #[test]
    fn test_npv_empty_cashflows() {
        let cfs: Vec<Decimal> = vec![];
        let result = net_present_value(&cfs, dec!(10)).unwrap();
        assert_eq!(result, Decimal::ZERO);
    }
}
