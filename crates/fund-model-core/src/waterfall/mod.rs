pub mod cash_flows;
pub mod lp_returns;
pub mod sensitivity;

pub use cash_flows::{calculate_cash_flows, unscheduled_distribution_warnings, CashFlowRow, CashFlowSchedule};
pub use lp_returns::{
    calculate_lp_returns, lp_cash_flow_series, solve_lp_irr, whole_fund_waterfall, FundWaterfall,
    IrrSource, LpReturns,
};
pub use sensitivity::{
    sensitivity_analysis, sensitivity_analysis_with, IrrMethod, SensitivityRow, SensitivityScenario,
    SensitivityTable,
};
