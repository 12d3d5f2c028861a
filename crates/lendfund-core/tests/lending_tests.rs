#![cfg(feature = "lending")]

use lendfund_core::lending::deal::{analyze_deal, DealInput};
use lendfund_core::lending::schedule::{generate_schedule, LoanTerms, PaymentType};
use lendfund_core::LendFundError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn terms(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_months: u32,
    payment_type: PaymentType,
    balloon_fraction: Option<Decimal>,
) -> LoanTerms {
    LoanTerms {
        principal,
        annual_rate_percent,
        term_months,
        payment_type,
        balloon_fraction,
    }
}

// ===========================================================================
// Schedule round-trip properties
// ===========================================================================

#[test]
fn test_amortizing_round_trip_across_terms() {
    // Principal portions must sum back to the principal and the final
    // balance must land on zero, within 1e-4 currency units.
    let cases = [
        (dec!(100000), dec!(18), 12u32),
        (dec!(250000), dec!(7.25), 36),
        (dec!(1000000), dec!(12), 60),
        (dec!(5000), dec!(36), 6),
        (dec!(75000), dec!(0.5), 120),
    ];
    for (principal, rate, months) in cases {
        let schedule =
            generate_schedule(&terms(principal, rate, months, PaymentType::Amortizing, None))
                .unwrap();

        assert!(
            (schedule.total_principal - principal).abs() < dec!(0.0001),
            "principal drift for {principal} @ {rate}% x{months}: {}",
            schedule.total_principal
        );
        let final_balance = schedule.entries.last().unwrap().remaining_balance;
        assert!(
            final_balance.abs() < dec!(0.0001),
            "final balance for {principal} @ {rate}% x{months}: {final_balance}"
        );
    }
}

#[test]
fn test_balloon_round_trip() {
    for fraction in [dec!(0.1), dec!(0.25), dec!(0.5), dec!(0.75), dec!(0.9)] {
        let schedule = generate_schedule(&terms(
            dec!(200000),
            dec!(10),
            24,
            PaymentType::Balloon,
            Some(fraction),
        ))
        .unwrap();

        assert!(
            (schedule.total_principal - dec!(200000)).abs() < dec!(0.0001),
            "principal drift at fraction {fraction}: {}",
            schedule.total_principal
        );
        assert!(
            schedule.entries.last().unwrap().remaining_balance.abs() < dec!(0.0001),
            "final balance at fraction {fraction}"
        );
    }
}

#[test]
fn test_zero_rate_boundary() {
    // annual_rate_percent = 0 on AMORTIZING: payment == principal / term
    // for every period.
    let schedule =
        generate_schedule(&terms(dec!(9000), dec!(0), 9, PaymentType::Amortizing, None)).unwrap();
    for entry in &schedule.entries {
        assert_eq!(entry.payment, dec!(1000));
        assert_eq!(entry.interest_portion, Decimal::ZERO);
        assert_eq!(entry.principal_portion, dec!(1000));
    }
}

#[test]
fn test_balance_is_monotone_non_increasing() {
    let profiles = [
        (PaymentType::InterestOnly, None),
        (PaymentType::Amortizing, None),
        (PaymentType::Balloon, Some(dec!(0.3))),
    ];
    for (payment_type, fraction) in profiles {
        let schedule =
            generate_schedule(&terms(dec!(100000), dec!(15), 18, payment_type, fraction)).unwrap();
        let mut previous = dec!(100000);
        for entry in &schedule.entries {
            assert!(
                entry.remaining_balance <= previous,
                "{payment_type:?} balance rose at period {}",
                entry.period_index
            );
            previous = entry.remaining_balance;
        }
    }
}

// ===========================================================================
// Scenario: 100k at 18% over 12 months, amortizing
// ===========================================================================

#[test]
fn test_scenario_standard_amortizing_loan() {
    // Level-payment formula at 1.5%/month: 100000 * 0.015 * 1.015^12
    // / (1.015^12 - 1) = 9,168.00 to the cent.
    let schedule =
        generate_schedule(&terms(dec!(100000), dec!(18), 12, PaymentType::Amortizing, None))
            .unwrap();

    let payment = schedule.entries[0].payment;
    assert!(
        (payment - dec!(9168.00)).abs() < dec!(0.01),
        "Expected monthly payment ~9,168.00, got {payment}"
    );
    assert!(
        (schedule.total_interest - dec!(10016)).abs() < dec!(1),
        "Expected total interest ~10,016, got {}",
        schedule.total_interest
    );
    assert_eq!(schedule.entries.len(), 12);
}

// ===========================================================================
// Deal analysis
// ===========================================================================

#[test]
fn test_deal_at_par() {
    let input = DealInput {
        deal_name: "Harborview Term Loan".into(),
        terms: terms(dec!(100000), dec!(18), 12, PaymentType::Amortizing, None),
        discount_rate_percent: dec!(18),
    };
    let output = analyze_deal(&input).unwrap();
    let deal = &output.result;

    assert!(deal.npv.abs() < dec!(0.0001), "par deal NPV {}", deal.npv);
    assert!((deal.irr_monthly_percent - dec!(1.5)).abs() < dec!(0.0001));
    assert!((deal.irr_annual_percent - dec!(19.5618)).abs() < dec!(0.001));
    assert!((deal.multiple_on_principal - dec!(1.10016)).abs() < dec!(0.0001));
    assert!(output.warnings.is_empty());
}

#[test]
fn test_deal_below_hurdle_warns() {
    let input = DealInput {
        deal_name: "Underwater Bridge".into(),
        terms: terms(dec!(100000), dec!(10), 12, PaymentType::InterestOnly, None),
        discount_rate_percent: dec!(15),
    };
    let output = analyze_deal(&input).unwrap();

    assert!(output.result.npv < Decimal::ZERO);
    assert_eq!(output.warnings.len(), 1);
}

#[test]
fn test_deal_rejects_invalid_terms() {
    let input = DealInput {
        deal_name: "Bad Terms".into(),
        terms: terms(dec!(100000), dec!(18), 12, PaymentType::Amortizing, Some(dec!(0.5))),
        discount_rate_percent: dec!(18),
    };
    assert!(matches!(
        analyze_deal(&input).unwrap_err(),
        LendFundError::InvalidInput { ref field, .. } if field == "balloon_fraction"
    ));
}

#[test]
fn test_interest_only_deal_economics() {
    let input = DealInput {
        deal_name: "Coupon Clipper".into(),
        terms: terms(dec!(500000), dec!(12), 24, PaymentType::InterestOnly, None),
        discount_rate_percent: dec!(12),
    };
    let output = analyze_deal(&input).unwrap();
    let deal = &output.result;

    // 1% per month for 24 months on 500k
    assert_eq!(deal.total_interest, dec!(120000));
    assert_eq!(deal.irr_monthly_percent, dec!(1.0000));
    assert_eq!(deal.schedule.entries.len(), 24);
    // 620k back over 500k out
    assert_eq!(deal.multiple_on_principal, dec!(1.24));
}
