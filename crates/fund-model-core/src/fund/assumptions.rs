//! Fixed business constants of the fund model, kept as data so alternative
//! schedules can be supplied alongside a [`super::FundConfig`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FundModelError;
use crate::returns::power_law::PowerLawModels;
use crate::types::{Money, Multiple, Rate};
use crate::FundModelResult;

/// Committed capital is drawn in equal tranches over this many years.
pub const CAPITAL_CALL_YEARS: u32 = 4;

/// Revenue-share SAFE economics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueShareTerms {
    /// Revenue share collected as a multiple of invested capital
    pub revenue_multiple: Multiple,
    /// Fraction of invested capital that converts to equity
    pub equity_fraction: Rate,
    /// Multiple earned on the converted equity
    pub equity_multiple: Multiple,
    pub timing: RevenueShareTiming,
}

/// How the revenue-share return is spread over the early fund years.
/// The equity kicker always lands in years 7-10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueShareTiming {
    pub years_1_2: Rate,
    pub years_3_4: Rate,
    pub year_5: Rate,
}

impl Default for RevenueShareTerms {
    fn default() -> Self {
        RevenueShareTerms {
            revenue_multiple: dec!(2.5),
            equity_fraction: dec!(0.40),
            equity_multiple: dec!(1.5),
            timing: RevenueShareTiming {
                years_1_2: dec!(0.20),
                years_3_4: dec!(0.40),
                year_5: dec!(0.40),
            },
        }
    }
}

/// Table-driven distribution assumptions used by the cash-flow projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowAssumptions {
    /// Split of the years 1-2 revenue-share bucket between year 1 and year 2
    pub years_1_2_split: [Rate; 2],
    /// Split of the years 3-4 revenue-share bucket between year 3 and year 4
    pub years_3_4_split: [Rate; 2],
    /// Flat revenue-share distribution paid in each tail year
    pub tail_distribution: Money,
    /// First tail year (1-based, inclusive)
    pub tail_first_year: u32,
    /// Last tail year (1-based, inclusive)
    pub tail_last_year: u32,
    /// Expected secondary / IPO proceeds per year, year 1 first
    pub equity_exits: Vec<Money>,
}

impl Default for CashFlowAssumptions {
    fn default() -> Self {
        CashFlowAssumptions {
            years_1_2_split: [dec!(0.4), dec!(0.6)],
            years_3_4_split: [dec!(0.4), dec!(0.6)],
            tail_distribution: dec!(1.8),
            tail_first_year: 6,
            tail_last_year: 9,
            equity_exits: vec![
                dec!(0),
                dec!(0),
                dec!(3),
                dec!(8),
                dec!(12),
                dec!(20),
                dec!(32),
                dec!(40),
                dec!(32),
                dec!(75.5),
            ],
        }
    }
}

/// Every constant the calculators rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelAssumptions {
    pub power_law: PowerLawModels,
    pub revenue_share: RevenueShareTerms,
    pub cash_flows: CashFlowAssumptions,
    /// Unmodelled upside / write-off slack added to the portfolio total
    pub portfolio_residual: Money,
    /// Net IRR reported when the LP cash flows cannot be solved
    pub irr_fallback_rate: Rate,
    /// Largest accepted gap between category allocations and total deployable
    pub allocation_tolerance: Money,
}

impl Default for ModelAssumptions {
    fn default() -> Self {
        ModelAssumptions {
            power_law: PowerLawModels::default(),
            revenue_share: RevenueShareTerms::default(),
            cash_flows: CashFlowAssumptions::default(),
            portfolio_residual: dec!(5.0),
            irr_fallback_rate: dec!(0.185),
            allocation_tolerance: dec!(0.01),
        }
    }
}

fn non_negative(field: &str, value: Decimal) -> FundModelResult<()> {
    if value < Decimal::ZERO {
        return Err(FundModelError::config(field, "Cannot be negative"));
    }
    Ok(())
}

impl ModelAssumptions {
    pub fn validate(&self) -> FundModelResult<()> {
        self.power_law.validate()?;

        let rs = &self.revenue_share;
        non_negative("revenue_share.revenue_multiple", rs.revenue_multiple)?;
        non_negative("revenue_share.equity_multiple", rs.equity_multiple)?;
        if rs.equity_fraction < Decimal::ZERO || rs.equity_fraction > Decimal::ONE {
            return Err(FundModelError::config(
                "revenue_share.equity_fraction",
                "Equity fraction must be in [0, 1]",
            ));
        }
        non_negative("revenue_share.timing.years_1_2", rs.timing.years_1_2)?;
        non_negative("revenue_share.timing.years_3_4", rs.timing.years_3_4)?;
        non_negative("revenue_share.timing.year_5", rs.timing.year_5)?;

        let cf = &self.cash_flows;
        for (i, share) in cf.years_1_2_split.iter().chain(&cf.years_3_4_split).enumerate() {
            non_negative(&format!("cash_flows.split[{i}]"), *share)?;
        }
        non_negative("cash_flows.tail_distribution", cf.tail_distribution)?;
        if cf.tail_first_year == 0 || cf.tail_first_year > cf.tail_last_year {
            return Err(FundModelError::config(
                "cash_flows.tail_first_year",
                "Tail years must satisfy 1 <= first <= last",
            ));
        }
        for (i, exit) in cf.equity_exits.iter().enumerate() {
            non_negative(&format!("cash_flows.equity_exits[{i}]"), *exit)?;
        }

        if self.irr_fallback_rate <= dec!(-1) {
            return Err(FundModelError::config(
                "irr_fallback_rate",
                "Fallback rate must be greater than -100%",
            ));
        }
        non_negative("allocation_tolerance", self.allocation_tolerance)?;
        Ok(())
    }
}
