//! Monthly cash flow schedules for interest-only, amortizing, and balloon
//! loans. All math uses `rust_decimal::Decimal`; rates enter as annual
//! percentages and are converted to monthly decimal rates exactly once.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LendFundError;
use crate::types::{Money, Percent, Rate};
use crate::LendFundResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const PERCENT_DIVISOR: Decimal = dec!(100);
const MONTHS_PER_YEAR: Decimal = dec!(12);
/// A final balance may drift below zero by less than this before it snaps
/// to zero. Applied only on the last period.
const RESIDUAL_TOLERANCE: Decimal = dec!(0.000001);

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Repayment profile of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    /// Interest every period, full principal at maturity.
    InterestOnly,
    /// Level payments that retire the principal over the term.
    Amortizing,
    /// A fraction of principal stays interest-only and falls due at
    /// maturity; the remainder amortizes over the term.
    Balloon,
}

/// Terms of a single loan. Immutable once built; a changed deal is a new
/// `LoanTerms`, never a mutated one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Annual rate in percent terms (18 means 18%).
    pub annual_rate_percent: Percent,
    pub term_months: u32,
    pub payment_type: PaymentType,
    /// Share of principal deferred to maturity; required for `BALLOON`,
    /// rejected otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balloon_fraction: Option<Decimal>,
}

/// One month of the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowEntry {
    /// 1-based period number.
    pub period_index: u32,
    pub payment: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
    /// Balance after this period's payment.
    pub remaining_balance: Money,
}

/// Full schedule plus totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowSchedule {
    pub entries: Vec<CashFlowEntry>,
    pub total_payments: Money,
    pub total_interest: Money,
    pub total_principal: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the period-by-period cash flow schedule for a loan.
///
/// Interest accrues on the outstanding balance at the monthly rate
/// (`annual_rate_percent / 100 / 12`). A zero rate degrades amortizing
/// payments to `principal / term_months`. Balloon schedules split the
/// principal: the balloon tranche accrues interest only and is repaid in
/// the final period, the rest follows the level-payment formula. A
/// `balloon_fraction` of 1 reproduces `INTEREST_ONLY`, 0 reproduces
/// `AMORTIZING`.
pub fn generate_schedule(terms: &LoanTerms) -> LendFundResult<CashFlowSchedule> {
    validate_loan_terms(terms)?;

    let monthly_rate: Rate = terms.annual_rate_percent / PERCENT_DIVISOR / MONTHS_PER_YEAR;

    let balloon_fraction = match terms.payment_type {
        PaymentType::InterestOnly => Decimal::ONE,
        PaymentType::Amortizing => Decimal::ZERO,
        PaymentType::Balloon => terms.balloon_fraction.unwrap_or(Decimal::ZERO),
    };

    let balloon_portion = terms.principal * balloon_fraction;
    let amortizing_portion = terms.principal - balloon_portion;
    let amortizing_payment = level_payment(amortizing_portion, monthly_rate, terms.term_months);

    let mut entries: Vec<CashFlowEntry> = Vec::with_capacity(terms.term_months as usize);
    let mut amortizing_balance = amortizing_portion;

    for period_index in 1..=terms.term_months {
        // Interest on everything still outstanding, balloon tranche included.
        let interest_portion = (amortizing_balance + balloon_portion) * monthly_rate;

        let amortizing_interest = amortizing_balance * monthly_rate;
        let mut principal_portion = amortizing_payment - amortizing_interest;
        amortizing_balance -= principal_portion;

        let mut payment = interest_portion + principal_portion;

        let remaining_balance = if period_index == terms.term_months {
            if amortizing_balance < Decimal::ZERO && amortizing_balance > -RESIDUAL_TOLERANCE {
                amortizing_balance = Decimal::ZERO;
            }
            // Balloon tranche falls due alongside the last installment.
            principal_portion += balloon_portion;
            payment += balloon_portion;
            amortizing_balance
        } else {
            amortizing_balance + balloon_portion
        };

        entries.push(CashFlowEntry {
            period_index,
            payment,
            interest_portion,
            principal_portion,
            remaining_balance,
        });
    }

    let total_payments: Money = entries.iter().map(|e| e.payment).sum();
    let total_interest: Money = entries.iter().map(|e| e.interest_portion).sum();
    let total_principal: Money = entries.iter().map(|e| e.principal_portion).sum();

    Ok(CashFlowSchedule {
        entries,
        total_payments,
        total_interest,
        total_principal,
    })
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Level monthly payment that retires `principal` over `term_months` at
/// `monthly_rate`. Zero rate degrades to straight-line principal.
fn level_payment(principal: Money, monthly_rate: Rate, term_months: u32) -> Money {
    if principal.is_zero() {
        return Decimal::ZERO;
    }
    if monthly_rate.is_zero() {
        return principal / Decimal::from(term_months);
    }
    let growth = (Decimal::ONE + monthly_rate).powi(term_months as i64);
    principal * monthly_rate * growth / (growth - Decimal::ONE)
}

fn validate_loan_terms(terms: &LoanTerms) -> LendFundResult<()> {
    if terms.principal <= Decimal::ZERO {
        return Err(LendFundError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if terms.annual_rate_percent < Decimal::ZERO {
        return Err(LendFundError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: "Annual rate cannot be negative".into(),
        });
    }
    if terms.term_months == 0 {
        return Err(LendFundError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least 1 month".into(),
        });
    }
    match (terms.payment_type, terms.balloon_fraction) {
        (PaymentType::Balloon, None) => Err(LendFundError::InvalidInput {
            field: "balloon_fraction".into(),
            reason: "Balloon loans require a balloon fraction".into(),
        }),
        (PaymentType::Balloon, Some(f)) if f < Decimal::ZERO || f > Decimal::ONE => {
            Err(LendFundError::InvalidInput {
                field: "balloon_fraction".into(),
                reason: "Balloon fraction must be between 0 and 1".into(),
            })
        }
        (PaymentType::InterestOnly | PaymentType::Amortizing, Some(_)) => {
            Err(LendFundError::InvalidInput {
                field: "balloon_fraction".into(),
                reason: "Balloon fraction only applies to BALLOON loans".into(),
            })
        }
        _ => Ok(()),
    }
}
