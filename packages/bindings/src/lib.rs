use napi::Result as NapiResult;
use napi_derive::napi;

use fund_model_core::fund::{DefaultParameters, FundModelRequest};
use fund_model_core::report::run_fund_model as run_model;
use fund_model_core::returns::calculate_portfolio_returns;
use fund_model_core::waterfall::{sensitivity_analysis_with, SensitivityScenario};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// An empty string means "all defaults", as for a request with no body.
fn parse_request(input_json: &str) -> NapiResult<FundModelRequest> {
    if input_json.trim().is_empty() {
        return Ok(FundModelRequest::default());
    }
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Fund model
// ---------------------------------------------------------------------------

#[napi]
pub fn run_fund_model(input_json: String) -> NapiResult<String> {
    let config = parse_request(&input_json)?
        .into_config()
        .map_err(to_napi_error)?;
    let output = run_model(&config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn default_parameters() -> NapiResult<String> {
    let params = DefaultParameters::current().map_err(to_napi_error)?;
    serde_json::to_string(&params).map_err(to_napi_error)
}

/// Request body plus the scenarios to run against it.
#[derive(serde::Deserialize)]
struct SensitivityRequest {
    #[serde(default)]
    request: FundModelRequest,
    scenarios: Vec<SensitivityScenario>,
}

#[napi]
pub fn custom_sensitivity(input_json: String) -> NapiResult<String> {
    let input: SensitivityRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = input.request.into_config().map_err(to_napi_error)?;
    let portfolio = calculate_portfolio_returns(&config).map_err(to_napi_error)?;
    let table =
        sensitivity_analysis_with(&config, &portfolio, &input.scenarios).map_err(to_napi_error)?;
    serde_json::to_string(&table).map_err(to_napi_error)
}
