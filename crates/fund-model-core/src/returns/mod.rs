pub mod category;
pub mod portfolio;
pub mod power_law;

pub use category::{
    calculate_category_returns, calculate_equity_returns, calculate_fixed_moic_returns,
    calculate_revenue_share_returns, CategoryReturns, EquityReturns, FixedMoicReturns,
    RevenueShareReturns, RevenueShareSchedule,
};
pub use portfolio::{calculate_portfolio_returns, PortfolioRow, PortfolioTable, TOTAL_ROW_LABEL};
pub use power_law::{OutcomeBreakdown, OutcomeBucket, OutcomeModel, PowerLawModels};
