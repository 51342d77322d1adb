use std::collections::BTreeMap;

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::categories::{Categories, CategoryKind, CategoryOverride};
use super::config::{FundConfig, FundConfigBuilder};
use crate::returns::power_law::PowerLawModels;
use crate::types::{Money, Rate};
use crate::FundModelResult;

/// Default fund size when a request does not name one.
pub const DEFAULT_FUND_SIZE: Money = dec!(50.0);

/// A model-run request: every field is optional and overlays the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FundModelRequest {
    pub fund_size: Option<Money>,
    pub management_fee_rate: Option<Rate>,
    pub carried_interest_rate: Option<Rate>,
    pub fund_life: Option<u32>,
    pub investment_period: Option<u32>,
    pub operating_expenses: Option<Money>,
    pub recycling_amount: Option<Money>,
    /// Partial per-category updates, merged field by field
    pub investment_params: BTreeMap<CategoryKind, CategoryOverride>,
    pub power_law_distributions: Option<PowerLawModels>,
    pub equity_exits: Option<Vec<Money>>,
}

impl FundModelRequest {
    pub fn into_builder(self) -> FundConfigBuilder {
        let mut builder = FundConfigBuilder::new(self.fund_size.unwrap_or(DEFAULT_FUND_SIZE));

        if let Some(rate) = self.management_fee_rate {
            builder = builder.management_fee_rate(rate);
        }
        if let Some(rate) = self.carried_interest_rate {
            builder = builder.carried_interest_rate(rate);
        }
        if let Some(years) = self.fund_life {
            builder = builder.fund_life(years);
        }
        if let Some(years) = self.investment_period {
            builder = builder.investment_period(years);
        }
        if let Some(amount) = self.operating_expenses {
            builder = builder.operating_expenses(amount);
        }
        if let Some(amount) = self.recycling_amount {
            builder = builder.recycling_amount(amount);
        }
        for (kind, update) in self.investment_params {
            builder = builder.category(kind, update);
        }
        if let Some(models) = self.power_law_distributions {
            builder = builder.power_law(models);
        }
        if let Some(exits) = self.equity_exits {
            builder = builder.equity_exits(exits);
        }
        builder
    }

    pub fn into_config(self) -> FundModelResult<FundConfig> {
        self.into_builder().build()
    }
}

/// The parameters a fresh model starts from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultParameters {
    pub fund_size: Money,
    pub management_fee_rate: Rate,
    pub carried_interest_rate: Rate,
    pub fund_life: u32,
    pub investment_period: u32,
    pub operating_expenses: Money,
    pub recycling_amount: Money,
    pub investment_params: Categories,
    pub power_law_distributions: PowerLawModels,
}

impl DefaultParameters {
    pub fn current() -> FundModelResult<Self> {
        let config = FundConfig::new(DEFAULT_FUND_SIZE)?;
        Ok(DefaultParameters {
            fund_size: config.fund_size(),
            management_fee_rate: config.management_fee_rate(),
            carried_interest_rate: config.carried_interest_rate(),
            fund_life: config.fund_life(),
            investment_period: config.investment_period(),
            operating_expenses: config.operating_expenses(),
            recycling_amount: config.recycling_amount(),
            investment_params: config.categories().clone(),
            power_law_distributions: config.assumptions().power_law.clone(),
        })
    }
}
