//! Fund-level configuration.
//!
//! A [`FundConfig`] is only ever produced by [`FundConfigBuilder::build`],
//! which validates every input and derives the fee and deployable-capital
//! totals in one step. To change an input, go back through
//! [`FundConfig::to_builder`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::assumptions::{CashFlowAssumptions, ModelAssumptions, RevenueShareTerms, CAPITAL_CALL_YEARS};
use super::categories::{default_categories, Categories, CategoryKind, CategoryOverride, InvestmentCategory};
use crate::error::FundModelError;
use crate::returns::power_law::PowerLawModels;
use crate::types::{checked_sum, Money, Rate};
use crate::FundModelResult;

/// Longest fund life the model accepts.
pub const MAX_FUND_LIFE: u32 = 50;

/// Validated, immutable fund parameters plus derived capital totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundConfig {
    fund_size: Money,
    management_fee_rate: Rate,
    carried_interest_rate: Rate,
    fund_life: u32,
    investment_period: u32,
    operating_expenses: Money,
    recycling_amount: Money,
    total_management_fees: Money,
    net_investable: Money,
    total_deployable: Money,
    categories: Categories,
    assumptions: ModelAssumptions,
}

impl FundConfig {
    /// Default configuration scaled to `fund_size`.
    pub fn new(fund_size: Money) -> FundModelResult<Self> {
        FundConfigBuilder::new(fund_size).build()
    }

    pub fn builder(fund_size: Money) -> FundConfigBuilder {
        FundConfigBuilder::new(fund_size)
    }

    /// A builder seeded with this configuration's inputs.
    pub fn to_builder(&self) -> FundConfigBuilder {
        FundConfigBuilder {
            fund_size: self.fund_size,
            management_fee_rate: self.management_fee_rate,
            carried_interest_rate: self.carried_interest_rate,
            fund_life: self.fund_life,
            investment_period: self.investment_period,
            operating_expenses: self.operating_expenses,
            recycling_amount: self.recycling_amount,
            categories: self.categories.clone(),
            assumptions: self.assumptions.clone(),
        }
    }

    pub fn fund_size(&self) -> Money {
        self.fund_size
    }

    pub fn management_fee_rate(&self) -> Rate {
        self.management_fee_rate
    }

    pub fn carried_interest_rate(&self) -> Rate {
        self.carried_interest_rate
    }

    pub fn fund_life(&self) -> u32 {
        self.fund_life
    }

    pub fn investment_period(&self) -> u32 {
        self.investment_period
    }

    pub fn operating_expenses(&self) -> Money {
        self.operating_expenses
    }

    pub fn recycling_amount(&self) -> Money {
        self.recycling_amount
    }

    /// fund_size × management_fee_rate × fund_life
    pub fn total_management_fees(&self) -> Money {
        self.total_management_fees
    }

    /// fund_size − management fees − operating expenses
    pub fn net_investable(&self) -> Money {
        self.net_investable
    }

    /// net_investable + recycling_amount
    pub fn total_deployable(&self) -> Money {
        self.total_deployable
    }

    pub fn categories(&self) -> &Categories {
        &self.categories
    }

    pub fn category(&self, kind: CategoryKind) -> &InvestmentCategory {
        // build() guarantees every kind is present
        &self.categories[&kind]
    }

    pub fn assumptions(&self) -> &ModelAssumptions {
        &self.assumptions
    }
}

/// Collects fund inputs; [`FundConfigBuilder::build`] validates them and
/// derives the totals.
#[derive(Debug, Clone)]
pub struct FundConfigBuilder {
    fund_size: Money,
    management_fee_rate: Rate,
    carried_interest_rate: Rate,
    fund_life: u32,
    investment_period: u32,
    operating_expenses: Money,
    recycling_amount: Money,
    categories: Categories,
    assumptions: ModelAssumptions,
}

impl FundConfigBuilder {
    pub fn new(fund_size: Money) -> Self {
        FundConfigBuilder {
            fund_size,
            management_fee_rate: dec!(0.02),
            carried_interest_rate: dec!(0.20),
            fund_life: 10,
            investment_period: 4,
            operating_expenses: dec!(2.0),
            recycling_amount: dec!(7.0),
            categories: default_categories(),
            assumptions: ModelAssumptions::default(),
        }
    }

    pub fn fund_size(mut self, fund_size: Money) -> Self {
        self.fund_size = fund_size;
        self
    }

    pub fn management_fee_rate(mut self, rate: Rate) -> Self {
        self.management_fee_rate = rate;
        self
    }

    pub fn carried_interest_rate(mut self, rate: Rate) -> Self {
        self.carried_interest_rate = rate;
        self
    }

    pub fn fund_life(mut self, years: u32) -> Self {
        self.fund_life = years;
        self
    }

    pub fn investment_period(mut self, years: u32) -> Self {
        self.investment_period = years;
        self
    }

    pub fn operating_expenses(mut self, amount: Money) -> Self {
        self.operating_expenses = amount;
        self
    }

    pub fn recycling_amount(mut self, amount: Money) -> Self {
        self.recycling_amount = amount;
        self
    }

    /// Merge a partial update into one category; unset fields are kept.
    pub fn category(mut self, kind: CategoryKind, update: CategoryOverride) -> Self {
        if let Some(existing) = self.categories.get_mut(&kind) {
            existing.apply(&update);
        }
        self
    }

    pub fn power_law(mut self, models: PowerLawModels) -> Self {
        self.assumptions.power_law = models;
        self
    }

    pub fn revenue_share(mut self, terms: RevenueShareTerms) -> Self {
        self.assumptions.revenue_share = terms;
        self
    }

    pub fn cash_flow_assumptions(mut self, assumptions: CashFlowAssumptions) -> Self {
        self.assumptions.cash_flows = assumptions;
        self
    }

    pub fn equity_exits(mut self, exits: Vec<Money>) -> Self {
        self.assumptions.cash_flows.equity_exits = exits;
        self
    }

    pub fn portfolio_residual(mut self, residual: Money) -> Self {
        self.assumptions.portfolio_residual = residual;
        self
    }

    pub fn irr_fallback_rate(mut self, rate: Rate) -> Self {
        self.assumptions.irr_fallback_rate = rate;
        self
    }

    pub fn allocation_tolerance(mut self, tolerance: Money) -> Self {
        self.assumptions.allocation_tolerance = tolerance;
        self
    }

    pub fn build(self) -> FundModelResult<FundConfig> {
        if self.fund_size <= Decimal::ZERO {
            return Err(FundModelError::config("fund_size", "Fund size must be positive"));
        }
        for (field, rate) in [
            ("management_fee_rate", self.management_fee_rate),
            ("carried_interest_rate", self.carried_interest_rate),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(FundModelError::config(field, "Rate must be in [0, 1]"));
            }
        }
        if self.fund_life < CAPITAL_CALL_YEARS {
            return Err(FundModelError::config(
                "fund_life",
                format!(
                    "Fund life must be at least {CAPITAL_CALL_YEARS} years to cover the capital-call period"
                ),
            ));
        }
        if self.fund_life > MAX_FUND_LIFE {
            return Err(FundModelError::config(
                "fund_life",
                format!("Fund life cannot exceed {MAX_FUND_LIFE} years"),
            ));
        }
        if self.investment_period == 0 || self.investment_period > self.fund_life {
            return Err(FundModelError::config(
                "investment_period",
                "Investment period must be between 1 year and the fund life",
            ));
        }
        if self.operating_expenses < Decimal::ZERO {
            return Err(FundModelError::config(
                "operating_expenses",
                "Operating expenses cannot be negative",
            ));
        }
        if self.recycling_amount < Decimal::ZERO {
            return Err(FundModelError::config(
                "recycling_amount",
                "Recycling amount cannot be negative",
            ));
        }

        let out_of_range = |field: &str| {
            FundModelError::config(field, "Value is outside the representable range")
        };
        let total_management_fees = self
            .fund_size
            .checked_mul(self.management_fee_rate)
            .and_then(|annual| annual.checked_mul(Decimal::from(self.fund_life)))
            .ok_or_else(|| out_of_range("fund_size"))?;
        let net_investable = self
            .fund_size
            .checked_sub(total_management_fees)
            .and_then(|n| n.checked_sub(self.operating_expenses))
            .ok_or_else(|| out_of_range("operating_expenses"))?;
        let total_deployable = net_investable
            .checked_add(self.recycling_amount)
            .ok_or_else(|| out_of_range("recycling_amount"))?;

        if total_deployable <= Decimal::ZERO {
            return Err(FundModelError::config(
                "total_deployable",
                format!("Fees and expenses leave nothing to deploy ({total_deployable})"),
            ));
        }

        for kind in CategoryKind::ALL {
            let category = self.categories.get(&kind).ok_or_else(|| {
                FundModelError::config(
                    format!("investment_params.{}", kind.key()),
                    "Category is missing",
                )
            })?;
            category.validate(kind)?;
        }
        self.assumptions.validate()?;

        let allocated = checked_sum(
            self.categories.values().map(|c| c.allocation),
            "category allocations",
        )?;
        if (allocated - total_deployable).abs() > self.assumptions.allocation_tolerance {
            return Err(FundModelError::AllocationMismatch {
                allocated,
                deployable: total_deployable,
            });
        }

        tracing::debug!(
            fund_size = %self.fund_size,
            %total_management_fees,
            %net_investable,
            %total_deployable,
            "fund configuration built"
        );

        Ok(FundConfig {
            fund_size: self.fund_size,
            management_fee_rate: self.management_fee_rate,
            carried_interest_rate: self.carried_interest_rate,
            fund_life: self.fund_life,
            investment_period: self.investment_period,
            operating_expenses: self.operating_expenses,
            recycling_amount: self.recycling_amount,
            total_management_fees,
            net_investable,
            total_deployable,
            categories: self.categories,
            assumptions: self.assumptions,
        })
    }
}
