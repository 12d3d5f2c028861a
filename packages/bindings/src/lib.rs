use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Lending
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_schedule(input_json: String) -> NapiResult<String> {
    let terms: lendfund_core::lending::schedule::LoanTerms =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let schedule =
        lendfund_core::lending::schedule::generate_schedule(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

#[napi]
pub fn analyze_deal(input_json: String) -> NapiResult<String> {
    let input: lendfund_core::lending::deal::DealInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lendfund_core::lending::deal::analyze_deal(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Time value and IRR
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct PresentValueBindingInput {
    future_value: rust_decimal::Decimal,
    discount_rate_percent: rust_decimal::Decimal,
    periods: u32,
}

#[napi]
pub fn present_value(input_json: String) -> NapiResult<String> {
    let input: PresentValueBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let pv = lendfund_core::time_value::present_value(
        input.future_value,
        input.discount_rate_percent,
        input.periods,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "present_value": pv.to_string() }))
        .map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct NpvBindingInput {
    cash_flows: Vec<rust_decimal::Decimal>,
    discount_rate_percent: rust_decimal::Decimal,
}

#[napi]
pub fn net_present_value(input_json: String) -> NapiResult<String> {
    let input: NpvBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let npv =
        lendfund_core::time_value::net_present_value(&input.cash_flows, input.discount_rate_percent)
            .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "npv": npv.to_string() })).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct IrrBindingInput {
    cash_flows: Vec<rust_decimal::Decimal>,
    #[serde(default)]
    initial_guess_percent: Option<rust_decimal::Decimal>,
}

#[napi]
pub fn solve_irr(input_json: String) -> NapiResult<String> {
    let input: IrrBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let guess = input
        .initial_guess_percent
        .unwrap_or(lendfund_core::irr::DEFAULT_GUESS_PERCENT);
    let irr = lendfund_core::irr::solve_irr(&input.cash_flows, guess).map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "irr_percent": irr.to_string() }))
        .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_portfolio(input_json: String) -> NapiResult<String> {
    let spec: lendfund_core::monte_carlo::simulation::SimulationSpec =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lendfund_core::monte_carlo::simulation::simulate_portfolio(&spec)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn closed_form_var(input_json: String) -> NapiResult<String> {
    let spec: lendfund_core::monte_carlo::simulation::SimulationSpec =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let var =
        lendfund_core::monte_carlo::simulation::closed_form_var(&spec).map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "value_at_risk": var })).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_return_series(input_json: String) -> NapiResult<String> {
    let input: lendfund_core::portfolio::returns::ReturnSeriesInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = lendfund_core::portfolio::returns::analyze_return_series(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
