use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::power_law::OutcomeBreakdown;
use crate::error::FundModelError;
use crate::fund::{CategoryKind, FundConfig, ReturnStrategy};
use crate::types::{checked_product, checked_sum, Money, Multiple};
use crate::FundModelResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Expected returns of a power-law equity category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityReturns {
    pub category: CategoryKind,
    pub total_invested: Money,
    pub total_return: Money,
    pub moic: Multiple,
    /// One entry per outcome bucket, in model order
    pub breakdown: Vec<OutcomeBreakdown>,
}

/// When the revenue-share SAFE pays out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueShareSchedule {
    pub year_1_2: Money,
    pub year_3_4: Money,
    pub year_5: Money,
    /// Equity kicker, realised in years 7-10
    pub year_7_10: Money,
}

/// Returns of the revenue-share SAFE category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueShareReturns {
    pub total_invested: Money,
    pub revenue_share_return: Money,
    pub equity_return: Money,
    pub total_return: Money,
    pub moic: Multiple,
    pub cash_flow_schedule: RevenueShareSchedule,
}

/// Returns of a category modelled at a fixed target multiple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedMoicReturns {
    pub category: CategoryKind,
    pub total_invested: Money,
    pub total_return: Money,
    pub moic: Multiple,
}

/// Per-category result, whichever strategy produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum CategoryReturns {
    PowerLaw(EquityReturns),
    RevenueShare(RevenueShareReturns),
    FixedMoic(FixedMoicReturns),
}

impl CategoryReturns {
    pub fn total_invested(&self) -> Money {
        match self {
            CategoryReturns::PowerLaw(r) => r.total_invested,
            CategoryReturns::RevenueShare(r) => r.total_invested,
            CategoryReturns::FixedMoic(r) => r.total_invested,
        }
    }

    pub fn total_return(&self) -> Money {
        match self {
            CategoryReturns::PowerLaw(r) => r.total_return,
            CategoryReturns::RevenueShare(r) => r.total_return,
            CategoryReturns::FixedMoic(r) => r.total_return,
        }
    }

    pub fn moic(&self) -> Multiple {
        match self {
            CategoryReturns::PowerLaw(r) => r.moic,
            CategoryReturns::RevenueShare(r) => r.moic,
            CategoryReturns::FixedMoic(r) => r.moic,
        }
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

fn moic(total_return: Money, total_invested: Money, kind: CategoryKind) -> FundModelResult<Multiple> {
    if total_invested.is_zero() {
        return Err(FundModelError::DivisionByZero {
            context: format!("MOIC of {kind} with zero invested capital"),
        });
    }
    total_return
        .checked_div(total_invested)
        .ok_or_else(|| FundModelError::overflow(format!("MOIC of {kind}")))
}

/// Expected returns of a power-law equity category (seed or series A).
///
/// Each outcome bucket receives `probability` of the companies and of the
/// capital; the bucket's return is its capital times its multiple.
pub fn calculate_equity_returns(
    config: &FundConfig,
    kind: CategoryKind,
) -> FundModelResult<EquityReturns> {
    let model = match kind {
        CategoryKind::Seed => &config.assumptions().power_law.seed,
        CategoryKind::SeriesA => &config.assumptions().power_law.series_a,
        other => {
            return Err(FundModelError::config(
                format!("investment_params.{other}"),
                "Category has no power-law outcome model",
            ))
        }
    };

    let params = config.category(kind);
    let total_invested = params.allocation;
    let breakdown = model.breakdown(params.count, total_invested)?;
    let total_return = checked_sum(
        breakdown.iter().map(|b| b.expected_return),
        &format!("{kind} expected return"),
    )?;
    let moic = moic(total_return, total_invested, kind)?;

    tracing::debug!(category = %kind, %total_invested, %total_return, %moic, "equity returns");

    Ok(EquityReturns {
        category: kind,
        total_invested,
        total_return,
        moic,
        breakdown,
    })
}

/// Revenue-share SAFE: a revenue multiple on the whole cheque plus an
/// equity kicker on the converted fraction.
pub fn calculate_revenue_share_returns(config: &FundConfig) -> FundModelResult<RevenueShareReturns> {
    let terms = &config.assumptions().revenue_share;
    let total_invested = config.category(CategoryKind::SharedSafe).allocation;

    let context = "revenue share returns";
    let revenue_share_return = checked_product(total_invested, terms.revenue_multiple, context)?;
    let equity_portion = checked_product(total_invested, terms.equity_fraction, context)?;
    let equity_return = checked_product(equity_portion, terms.equity_multiple, context)?;
    let total_return = checked_sum([revenue_share_return, equity_return], context)?;
    let moic = moic(total_return, total_invested, CategoryKind::SharedSafe)?;

    let cash_flow_schedule = RevenueShareSchedule {
        year_1_2: checked_product(revenue_share_return, terms.timing.years_1_2, context)?,
        year_3_4: checked_product(revenue_share_return, terms.timing.years_3_4, context)?,
        year_5: checked_product(revenue_share_return, terms.timing.year_5, context)?,
        year_7_10: equity_return,
    };

    tracing::debug!(%total_invested, %revenue_share_return, %equity_return, "revenue share returns");

    Ok(RevenueShareReturns {
        total_invested,
        revenue_share_return,
        equity_return,
        total_return,
        moic,
        cash_flow_schedule,
    })
}

/// Allocation times target MOIC. No outcome breakdown.
pub fn calculate_fixed_moic_returns(
    config: &FundConfig,
    kind: CategoryKind,
) -> FundModelResult<FixedMoicReturns> {
    let params = config.category(kind);
    let target = params.target_moic.ok_or_else(|| {
        FundModelError::config(
            format!("investment_params.{kind}.target_moic"),
            "Fixed-return categories require a target MOIC",
        )
    })?;

    Ok(FixedMoicReturns {
        category: kind,
        total_invested: params.allocation,
        total_return: checked_product(
            params.allocation,
            target,
            &format!("{kind} fixed-MOIC return"),
        )?,
        moic: target,
    })
}

/// Dispatch to the calculator matching the category's strategy.
pub fn calculate_category_returns(
    config: &FundConfig,
    kind: CategoryKind,
) -> FundModelResult<CategoryReturns> {
    Ok(match kind.strategy() {
        ReturnStrategy::PowerLaw => CategoryReturns::PowerLaw(calculate_equity_returns(config, kind)?),
        ReturnStrategy::RevenueShare => {
            CategoryReturns::RevenueShare(calculate_revenue_share_returns(config)?)
        }
        ReturnStrategy::FixedMoic => {
            CategoryReturns::FixedMoic(calculate_fixed_moic_returns(config, kind)?)
        }
    })
}

impl EquityReturns {
    /// Sum of expected capital across buckets; equals `total_invested` when
    /// the model's probabilities sum to 1.
    pub fn breakdown_capital(&self) -> Money {
        self.breakdown.iter().map(|b| b.capital).sum::<Decimal>()
    }
}
