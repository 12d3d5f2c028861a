use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lendfund_core::irr::solve_irr;
use lendfund_core::time_value::{net_present_value, present_value};

use crate::input;

/// Arguments for present value of a single amount
#[derive(Args)]
pub struct PvArgs {
    /// Future amount to discount
    #[arg(long, allow_hyphen_values = true)]
    pub future_value: Decimal,

    /// Discount rate per period, in percent
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Decimal,

    /// Number of whole periods out
    #[arg(long)]
    pub periods: u32,
}

/// Arguments for NPV of a cash flow series
#[derive(Args)]
pub struct NpvArgs {
    /// Path to JSON/YAML file with a cash flow array (or {"cash_flows": [...]})
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated cash flows; the first occurs now and is undiscounted
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Discount rate per period, in percent
    #[arg(long, allow_hyphen_values = true)]
    pub rate: Decimal,
}

/// Arguments for IRR of a cash flow series
#[derive(Args)]
pub struct IrrArgs {
    /// Path to JSON/YAML file with a cash flow array (or {"cash_flows": [...]})
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated cash flows; the first occurs now
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Starting guess for the solver, in percent
    #[arg(long, default_value = "10", allow_hyphen_values = true)]
    pub guess: Decimal,
}

/// Pull a cash flow series from flags, a file, or piped stdin. Files and
/// stdin accept either a bare array or an object with a "cash_flows" key.
fn get_cash_flows(
    input_path: &Option<String>,
    cli_flows: &Option<Vec<Decimal>>,
) -> Result<Vec<Decimal>, Box<dyn std::error::Error>> {
    if let Some(ref flows) = cli_flows {
        return Ok(flows.clone());
    }

    let data: Option<Value> = if let Some(ref path) = input_path {
        Some(input::file::read_value(path)?)
    } else {
        input::stdin::read_stdin()?
    };

    let Some(data) = data else {
        return Err("Provide --cash-flows or --input file or pipe JSON via stdin".into());
    };

    let array = match &data {
        Value::Array(arr) => arr.clone(),
        Value::Object(map) => match map.get("cash_flows") {
            Some(Value::Array(arr)) => arr.clone(),
            _ => return Err("JSON object must contain a 'cash_flows' array".into()),
        },
        _ => return Err("Expected a JSON array of cash flows".into()),
    };

    array
        .iter()
        .map(|v| -> Result<Decimal, Box<dyn std::error::Error>> {
            if let Some(s) = v.as_str() {
                s.parse::<Decimal>().map_err(|e| e.to_string().into())
            } else if let Some(n) = v.as_f64() {
                Decimal::try_from(n).map_err(|e| e.to_string().into())
            } else {
                Err(format!("Cash flow entry '{}' is not numeric", v).into())
            }
        })
        .collect()
}

pub fn run_pv(args: PvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pv = present_value(args.future_value, args.rate, args.periods)?;
    Ok(serde_json::json!({
        "present_value": pv.to_string(),
        "future_value": args.future_value.to_string(),
        "rate_percent": args.rate.to_string(),
        "periods": args.periods,
    }))
}

pub fn run_npv(args: NpvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cash_flows = get_cash_flows(&args.input, &args.cash_flows)?;
    let npv = net_present_value(&cash_flows, args.rate)?;
    Ok(serde_json::json!({
        "npv": npv.to_string(),
        "rate_percent": args.rate.to_string(),
        "num_flows": cash_flows.len(),
    }))
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cash_flows = get_cash_flows(&args.input, &args.cash_flows)?;
    let irr = solve_irr(&cash_flows, args.guess)?;
    // Re-substitute so the caller can see how tight the root is.
    let npv_at_irr = net_present_value(&cash_flows, irr)?;
    Ok(serde_json::json!({
        "irr_percent": irr.to_string(),
        "npv_at_irr": npv_at_irr.to_string(),
        "initial_guess_percent": args.guess.to_string(),
        "num_flows": cash_flows.len(),
    }))
}
