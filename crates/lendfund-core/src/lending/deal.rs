//! Whole-deal economics for a single loan: schedule, NPV at a hurdle rate,
//! realized IRR, and money multiple from the lender's seat.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::irr::solve_irr;
use crate::lending::schedule::{generate_schedule, CashFlowSchedule, LoanTerms};
use crate::time_value::net_present_value;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::LendFundResult;

const PERCENT_DIVISOR: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);

/// A named loan plus the fund's hurdle rate for discounting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealInput {
    pub deal_name: String,
    pub terms: LoanTerms,
    /// Annual discount rate in percent terms; applied monthly as
    /// `discount_rate_percent / 12`.
    pub discount_rate_percent: Percent,
}

/// Deal-level economics derived from the cash flow schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealAnalysis {
    pub schedule: CashFlowSchedule,
    /// NPV of `[-principal, payments...]` at the monthly hurdle rate.
    pub npv: Money,
    pub irr_monthly_percent: Percent,
    /// Monthly IRR compounded to an annual figure.
    pub irr_annual_percent: Percent,
    pub total_interest: Money,
    /// Total payments received over principal advanced.
    pub multiple_on_principal: Decimal,
}

/// Analyze a deal end to end: build the schedule, discount the lender cash
/// flows, and solve for the realized IRR.
///
/// The lender sequence is the principal out at period 0 followed by every
/// scheduled payment. The IRR solver is seeded with the monthly coupon,
/// which is exact for interest-only deals and close for the rest.
pub fn analyze_deal(input: &DealInput) -> LendFundResult<ComputationOutput<DealAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = generate_schedule(&input.terms)?;

    let mut lender_flows: Vec<Money> = Vec::with_capacity(schedule.entries.len() + 1);
    lender_flows.push(-input.terms.principal);
    lender_flows.extend(schedule.entries.iter().map(|e| e.payment));

    let monthly_discount_percent = input.discount_rate_percent / MONTHS_PER_YEAR;
    let npv = net_present_value(&lender_flows, monthly_discount_percent)?;
    if npv < Decimal::ZERO {
        warnings.push(format!(
            "NPV is negative ({npv}) at a {}% annual discount rate; deal yields below the hurdle",
            input.discount_rate_percent
        ));
    }

    let coupon_guess = input.terms.annual_rate_percent / MONTHS_PER_YEAR;
    let irr_monthly_percent = solve_irr(&lender_flows, coupon_guess)?;

    let monthly_rate = irr_monthly_percent / PERCENT_DIVISOR;
    let irr_annual_percent =
        (((Decimal::ONE + monthly_rate).powi(12) - Decimal::ONE) * PERCENT_DIVISOR).round_dp(4);

    let multiple_on_principal = schedule.total_payments / input.terms.principal;
    let total_interest = schedule.total_interest;

    let analysis = DealAnalysis {
        schedule,
        npv,
        irr_monthly_percent,
        irr_annual_percent,
        total_interest,
        multiple_on_principal,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Deal Analysis — schedule, hurdle NPV, realized IRR, money multiple",
        &serde_json::json!({
            "deal_name": input.deal_name,
            "principal": input.terms.principal.to_string(),
            "annual_rate_percent": input.terms.annual_rate_percent.to_string(),
            "term_months": input.terms.term_months,
            "payment_type": input.terms.payment_type,
            "discount_rate_percent": input.discount_rate_percent.to_string(),
        }),
        warnings,
        elapsed,
        analysis,
    ))
}
