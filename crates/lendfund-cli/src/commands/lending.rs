use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lendfund_core::lending::deal::{analyze_deal, DealInput};
use lendfund_core::lending::schedule::{generate_schedule, LoanTerms, PaymentType};

use crate::input;

/// Arguments for schedule generation
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input file with LoanTerms
    #[arg(long)]
    pub input: Option<String>,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate in percent (18 means 18%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Payment type: interest-only, amortizing, balloon
    #[arg(long, default_value = "amortizing")]
    pub payment_type: String,

    /// Share of principal deferred to maturity (balloon loans only)
    #[arg(long)]
    pub balloon_fraction: Option<Decimal>,
}

/// Arguments for whole-deal analysis
#[derive(Args)]
pub struct DealArgs {
    /// Path to JSON/YAML input file with a DealInput
    #[arg(long)]
    pub input: Option<String>,

    /// Deal name for the report
    #[arg(long, default_value = "unnamed deal")]
    pub name: String,

    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term_months: Option<u32>,

    /// Payment type: interest-only, amortizing, balloon
    #[arg(long, default_value = "amortizing")]
    pub payment_type: String,

    /// Share of principal deferred to maturity (balloon loans only)
    #[arg(long)]
    pub balloon_fraction: Option<Decimal>,

    /// Annual hurdle rate in percent for discounting
    #[arg(long, default_value = "12")]
    pub discount_rate: Decimal,
}

fn parse_payment_type(s: &str) -> Result<PaymentType, Box<dyn std::error::Error>> {
    match s.to_lowercase().as_str() {
        "interest-only" | "interest_only" | "io" => Ok(PaymentType::InterestOnly),
        "amortizing" | "amortising" | "am" => Ok(PaymentType::Amortizing),
        "balloon" => Ok(PaymentType::Balloon),
        _ => Err(format!(
            "Unknown payment type '{}'. Use: interest-only, amortizing, balloon",
            s
        )
        .into()),
    }
}

fn terms_from_flags(
    principal: Option<Decimal>,
    rate: Option<Decimal>,
    term_months: Option<u32>,
    payment_type: &str,
    balloon_fraction: Option<Decimal>,
) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    let principal = principal.ok_or("--principal required (or use --input / stdin)")?;
    let annual_rate_percent = rate.ok_or("--rate required (or use --input / stdin)")?;
    let term_months = term_months.ok_or("--term-months required (or use --input / stdin)")?;
    Ok(LoanTerms {
        principal,
        annual_rate_percent,
        term_months,
        payment_type: parse_payment_type(payment_type)?,
        balloon_fraction,
    })
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = match input::resolve(&args.input)? {
        Some(t) => t,
        None => terms_from_flags(
            args.principal,
            args.rate,
            args.term_months,
            &args.payment_type,
            args.balloon_fraction,
        )?,
    };
    let schedule = generate_schedule(&terms)?;
    Ok(serde_json::to_value(schedule)?)
}

pub fn run_deal(args: DealArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deal_input: DealInput = match input::resolve(&args.input)? {
        Some(d) => d,
        None => DealInput {
            deal_name: args.name.clone(),
            terms: terms_from_flags(
                args.principal,
                args.rate,
                args.term_months,
                &args.payment_type,
                args.balloon_fraction,
            )?,
            discount_rate_percent: args.discount_rate,
        },
    };
    let output = analyze_deal(&deal_input)?;
    Ok(serde_json::to_value(output)?)
}
