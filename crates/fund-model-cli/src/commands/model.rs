use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;

use fund_model_core::fund::{DefaultParameters, FundConfig, FundModelRequest};
use fund_model_core::report::run_fund_model;
use fund_model_core::returns::calculate_portfolio_returns;
use fund_model_core::types::with_metadata;
use fund_model_core::waterfall::{
    calculate_cash_flows, calculate_lp_returns, sensitivity_analysis_with,
    unscheduled_distribution_warnings, SensitivityScenario,
};

use crate::input;
use crate::output::sheets;

/// Fund parameters shared by every modelling command
#[derive(Args, Debug, Default)]
pub struct FundArgs {
    /// Path to JSON or YAML request file (flags below override its values)
    #[arg(long)]
    pub input: Option<String>,

    /// Committed capital
    #[arg(long)]
    pub fund_size: Option<Decimal>,

    /// Annual management fee as a fraction of committed capital
    #[arg(long)]
    pub management_fee_rate: Option<Decimal>,

    /// GP share of fund-level profit
    #[arg(long)]
    pub carried_interest_rate: Option<Decimal>,

    /// Fund life in years
    #[arg(long)]
    pub fund_life: Option<u32>,

    /// Investment period in years
    #[arg(long)]
    pub investment_period: Option<u32>,
}

impl FundArgs {
    /// Overlay any flags given on the command line onto a request.
    fn overlay(&self, request: &mut FundModelRequest) {
        if let Some(v) = self.fund_size {
            request.fund_size = Some(v);
        }
        if let Some(v) = self.management_fee_rate {
            request.management_fee_rate = Some(v);
        }
        if let Some(v) = self.carried_interest_rate {
            request.carried_interest_rate = Some(v);
        }
        if let Some(v) = self.fund_life {
            request.fund_life = Some(v);
        }
        if let Some(v) = self.investment_period {
            request.investment_period = Some(v);
        }
    }

    fn load_config(&self) -> Result<FundConfig, Box<dyn std::error::Error>> {
        let mut request: FundModelRequest = if let Some(ref path) = self.input {
            input::file::read_input(path)?
        } else if let Some(request) = input::stdin::read_stdin_request()? {
            request
        } else {
            FundModelRequest::default()
        };
        self.overlay(&mut request);
        Ok(request.into_config()?)
    }
}

/// Arguments for sensitivity analysis
#[derive(Args, Debug)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub fund: FundArgs,

    /// Custom scenario as NAME=MULTIPLIER, repeatable (replaces the defaults)
    #[arg(long = "scenario", value_parser = parse_scenario)]
    pub scenarios: Vec<SensitivityScenario>,
}

/// Arguments for CSV sheet export
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub fund: FundArgs,

    /// Directory to write the CSV sheets into (created if missing)
    #[arg(long)]
    pub dir: PathBuf,
}

fn parse_scenario(s: &str) -> Result<SensitivityScenario, String> {
    let (name, multiplier) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=MULTIPLIER, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("scenario name missing in '{s}'"));
    }
    let multiplier: Decimal = multiplier
        .trim()
        .parse()
        .map_err(|e| format!("invalid multiplier in '{s}': {e}"))?;
    Ok(SensitivityScenario::new(name, multiplier))
}

fn elapsed_us(start: Instant) -> u64 {
    start.elapsed().as_micros() as u64
}

pub fn run_model(args: FundArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = args.load_config()?;
    let output = run_fund_model(&config)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_portfolio(args: FundArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let config = args.load_config()?;
    let table = calculate_portfolio_returns(&config)?;
    let output = with_metadata(
        "Expected gross returns per category: power-law expectation for equity, \
         revenue share plus equity kicker for Shared SAFE, target multiples otherwise",
        &config,
        Vec::new(),
        elapsed_us(start),
        table,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_cash_flows(args: FundArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let config = args.load_config()?;
    let schedule = calculate_cash_flows(&config)?;
    let output = with_metadata(
        "Annual capital calls and distributions with cumulative DPI and whole-fund carry",
        &config,
        unscheduled_distribution_warnings(&config),
        elapsed_us(start),
        schedule,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_lp_returns(args: FundArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let config = args.load_config()?;
    let portfolio = calculate_portfolio_returns(&config)?;
    let schedule = calculate_cash_flows(&config)?;
    let lp = calculate_lp_returns(&config, &portfolio, &schedule)?;
    let output = with_metadata(
        "Whole-fund carry on gross profit; net IRR solved on capital calls and a terminal LP distribution",
        &config,
        unscheduled_distribution_warnings(&config),
        elapsed_us(start),
        lp,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let config = args.fund.load_config()?;
    let portfolio = calculate_portfolio_returns(&config)?;
    let scenarios = if args.scenarios.is_empty() {
        SensitivityScenario::defaults()
    } else {
        args.scenarios
    };
    let table = sensitivity_analysis_with(&config, &portfolio, &scenarios)?;
    let output = with_metadata(
        "Base-case gross returns scaled per scenario; net IRR estimated as the CAGR of net MOIC over the fund life",
        &config,
        Vec::new(),
        elapsed_us(start),
        table,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_defaults() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(DefaultParameters::current()?)?)
}

/// What `export` wrote, printed in place of a model result.
#[derive(Serialize)]
struct ExportSummary {
    directory: String,
    files: Vec<String>,
    warnings: Vec<String>,
}

pub fn run_export(args: ExportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = args.fund.load_config()?;
    let output = run_fund_model(&config)?;
    let files = sheets::write_sheets(&args.dir, &output.result)?;
    tracing::info!(dir = %args.dir.display(), files = files.len(), "exported sheets");

    let summary = ExportSummary {
        directory: args.dir.display().to_string(),
        files: files.iter().map(|p| p.display().to_string()).collect(),
        warnings: output.warnings,
    };
    Ok(serde_json::to_value(summary)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flags_override_request() {
        let mut request = FundModelRequest {
            fund_size: Some(dec!(80)),
            fund_life: Some(12),
            ..Default::default()
        };
        let args = FundArgs {
            fund_size: Some(dec!(50)),
            carried_interest_rate: Some(dec!(0.25)),
            ..Default::default()
        };
        args.overlay(&mut request);
        assert_eq!(request.fund_size, Some(dec!(50)));
        assert_eq!(request.carried_interest_rate, Some(dec!(0.25)));
        assert_eq!(request.fund_life, Some(12));
    }

    #[test]
    fn test_parse_scenario() {
        let s = parse_scenario("Bear=0.5").unwrap();
        assert_eq!(s.name, "Bear");
        assert_eq!(s.multiplier, dec!(0.5));

        let s = parse_scenario("Down (x=0.6)=0.6").unwrap();
        assert_eq!(s.name, "Down (x=0.6)");

        assert!(parse_scenario("Bear").is_err());
        assert!(parse_scenario("=1.2").is_err());
        assert!(parse_scenario("Bull=lots").is_err());
    }
}
