//! One-pass model run producing every output section, as consumed by
//! renderers and exporters.

use std::collections::BTreeMap;
use std::time::Instant;

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::fund::{CategoryKind, FundConfig};
use crate::returns::{
    calculate_equity_returns, calculate_portfolio_returns, calculate_revenue_share_returns,
    EquityReturns, PortfolioTable, RevenueShareReturns,
};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::waterfall::{
    calculate_cash_flows, calculate_lp_returns, sensitivity_analysis,
    unscheduled_distribution_warnings, CashFlowSchedule, IrrSource, LpReturns, SensitivityTable,
};
use crate::FundModelResult;

/// Capital stack of the fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundOverview {
    pub fund_size: Money,
    pub management_fees: Money,
    pub operating_expenses: Money,
    pub net_investable: Money,
    pub recycling_amount: Money,
    pub total_deployable: Money,
}

impl FundOverview {
    pub fn from_config(config: &FundConfig) -> Self {
        FundOverview {
            fund_size: config.fund_size(),
            management_fees: config.total_management_fees(),
            operating_expenses: config.operating_expenses(),
            net_investable: config.net_investable(),
            recycling_amount: config.recycling_amount(),
            total_deployable: config.total_deployable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub management_fee_rate: Rate,
    pub carried_interest_rate: Rate,
    pub fund_life: u32,
    pub investment_period: u32,
}

/// First years in which DPI passes 0.5x and 1.0x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpiMilestones {
    pub half_returned_year: Option<u32>,
    pub capital_returned_year: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundModelReport {
    pub fund_overview: FundOverview,
    pub portfolio_returns: PortfolioTable,
    pub lp_returns: LpReturns,
    pub cash_flows: CashFlowSchedule,
    pub sensitivity_analysis: SensitivityTable,
    pub model_parameters: ModelParameters,
    pub dpi_milestones: DpiMilestones,
    /// Per-bucket expectations for the power-law categories
    pub outcome_breakdowns: BTreeMap<CategoryKind, EquityReturns>,
    pub revenue_share: RevenueShareReturns,
}

/// Run the full model for one configuration.
pub fn run_fund_model(config: &FundConfig) -> FundModelResult<ComputationOutput<FundModelReport>> {
    let start = Instant::now();
    let mut warnings = unscheduled_distribution_warnings(config);

    let portfolio_returns = calculate_portfolio_returns(config)?;
    let cash_flows = calculate_cash_flows(config)?;
    let lp_returns = calculate_lp_returns(config, &portfolio_returns, &cash_flows)?;
    let sensitivity_analysis = sensitivity_analysis(config, &portfolio_returns)?;

    if lp_returns.net_irr_source == IrrSource::DefaultFallback {
        warnings.push(format!(
            "Net IRR could not be solved from the LP cash flows; reporting the default rate {}",
            lp_returns.net_irr
        ));
    }
    warnings.push(
        "Sensitivity IRRs are CAGR estimates from net MOIC and differ in method from the solved base-case net IRR"
            .to_string(),
    );

    let mut outcome_breakdowns = BTreeMap::new();
    for kind in [CategoryKind::Seed, CategoryKind::SeriesA] {
        outcome_breakdowns.insert(kind, calculate_equity_returns(config, kind)?);
    }

    let report = FundModelReport {
        fund_overview: FundOverview::from_config(config),
        dpi_milestones: DpiMilestones {
            half_returned_year: cash_flows.first_year_dpi_above(dec!(0.5)),
            capital_returned_year: cash_flows.first_year_dpi_above(dec!(1.0)),
        },
        model_parameters: ModelParameters {
            management_fee_rate: config.management_fee_rate(),
            carried_interest_rate: config.carried_interest_rate(),
            fund_life: config.fund_life(),
            investment_period: config.investment_period(),
        },
        revenue_share: calculate_revenue_share_returns(config)?,
        portfolio_returns,
        lp_returns,
        cash_flows,
        sensitivity_analysis,
        outcome_breakdowns,
    };

    tracing::info!(
        fund_size = %config.fund_size(),
        net_moic = %report.lp_returns.net_moic,
        net_irr = %report.lp_returns.net_irr,
        "fund model run complete"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Venture fund economics: power-law portfolio returns, table-driven cash flows, whole-fund carry waterfall",
        config,
        warnings,
        elapsed,
        report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_sections() {
        let config = FundConfig::new(dec!(50)).unwrap();
        let out = run_fund_model(&config).unwrap();
        let report = &out.result;
        assert_eq!(report.fund_overview.total_deployable, dec!(45));
        assert_eq!(report.portfolio_returns.rows.len(), 6);
        assert_eq!(report.cash_flows.rows.len(), 10);
        assert_eq!(report.sensitivity_analysis.rows.len(), 3);
        assert_eq!(report.outcome_breakdowns.len(), 2);
        assert_eq!(report.dpi_milestones.half_returned_year, Some(4));
        assert_eq!(report.dpi_milestones.capital_returned_year, Some(5));
        assert_eq!(report.model_parameters.fund_life, 10);
        // Only the IRR methodology note for a default run
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_report_serialises_with_snake_case_keys() {
        let config = FundConfig::new(dec!(50)).unwrap();
        let out = run_fund_model(&config).unwrap();
        let value = serde_json::to_value(&out).unwrap();
        assert!(value["result"]["outcome_breakdowns"]["seed"].is_object());
        assert_eq!(value["result"]["lp_returns"]["net_irr_source"], "solved");
        assert!(value["assumptions"]["fund_size"].is_string());
    }
}
