use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FundModelError;
use crate::types::{Money, Multiple, Rate};
use crate::FundModelResult;

/// The five investment strategies a fund allocates to. Declaration order is
/// the portfolio table row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Seed,
    SharedSafe,
    SeriesA,
    Incubation,
    Recycled,
}

/// How a category's gross return is modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStrategy {
    /// Expected value over a power-law outcome model
    PowerLaw,
    /// Revenue-share SAFE with an equity kicker
    RevenueShare,
    /// Allocation times a target MOIC
    FixedMoic,
}

impl CategoryKind {
    pub const ALL: [CategoryKind; 5] = [
        CategoryKind::Seed,
        CategoryKind::SharedSafe,
        CategoryKind::SeriesA,
        CategoryKind::Incubation,
        CategoryKind::Recycled,
    ];

    /// Snake-case key used in requests and maps.
    pub fn key(self) -> &'static str {
        match self {
            CategoryKind::Seed => "seed",
            CategoryKind::SharedSafe => "shared_safe",
            CategoryKind::SeriesA => "series_a",
            CategoryKind::Incubation => "incubation",
            CategoryKind::Recycled => "recycled",
        }
    }

    /// Display name used in the portfolio table.
    pub fn label(self) -> &'static str {
        match self {
            CategoryKind::Seed => "Seed",
            CategoryKind::SharedSafe => "Shared SAFE",
            CategoryKind::SeriesA => "Series A",
            CategoryKind::Incubation => "Incubation",
            CategoryKind::Recycled => "Recycled",
        }
    }

    pub fn strategy(self) -> ReturnStrategy {
        match self {
            CategoryKind::Seed | CategoryKind::SeriesA => ReturnStrategy::PowerLaw,
            CategoryKind::SharedSafe => ReturnStrategy::RevenueShare,
            CategoryKind::Incubation | CategoryKind::Recycled => ReturnStrategy::FixedMoic,
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Parameters of one investment category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentCategory {
    /// Expected number of portfolio companies
    pub count: u32,
    /// Average cheque size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_check: Option<Money>,
    /// Pre-money valuation at entry
    #[serde(default, alias = "pre_money_val", skip_serializing_if = "Option::is_none")]
    pub pre_money_valuation: Option<Money>,
    /// Ownership acquired per company (0.10 = 10%)
    #[serde(default, alias = "ownership", skip_serializing_if = "Option::is_none")]
    pub ownership_fraction: Option<Rate>,
    /// Capital committed to the category
    pub allocation: Money,
    /// Target multiple for fixed-return categories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_moic: Option<Multiple>,
}

/// Partial update of an [`InvestmentCategory`]. Only the fields that are
/// set overwrite the current values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoryOverride {
    pub count: Option<u32>,
    pub avg_check: Option<Money>,
    #[serde(alias = "pre_money_val")]
    pub pre_money_valuation: Option<Money>,
    #[serde(alias = "ownership")]
    pub ownership_fraction: Option<Rate>,
    pub allocation: Option<Money>,
    pub target_moic: Option<Multiple>,
}

impl CategoryOverride {
    pub fn allocation(allocation: Money) -> Self {
        CategoryOverride {
            allocation: Some(allocation),
            ..Default::default()
        }
    }
}

impl InvestmentCategory {
    /// Merge an override field by field.
    pub fn apply(&mut self, update: &CategoryOverride) {
        if let Some(count) = update.count {
            self.count = count;
        }
        if let Some(avg_check) = update.avg_check {
            self.avg_check = Some(avg_check);
        }
        if let Some(pre_money) = update.pre_money_valuation {
            self.pre_money_valuation = Some(pre_money);
        }
        if let Some(ownership) = update.ownership_fraction {
            self.ownership_fraction = Some(ownership);
        }
        if let Some(allocation) = update.allocation {
            self.allocation = allocation;
        }
        if let Some(target) = update.target_moic {
            self.target_moic = Some(target);
        }
    }

    pub(crate) fn validate(&self, kind: CategoryKind) -> FundModelResult<()> {
        let field = |name: &str| format!("investment_params.{}.{name}", kind.key());

        if self.allocation < Decimal::ZERO {
            return Err(FundModelError::config(
                field("allocation"),
                "Allocation cannot be negative",
            ));
        }
        for (name, value) in [
            ("avg_check", self.avg_check),
            ("pre_money_valuation", self.pre_money_valuation),
        ] {
            if value.is_some_and(|v| v < Decimal::ZERO) {
                return Err(FundModelError::config(field(name), "Cannot be negative"));
            }
        }
        if let Some(ownership) = self.ownership_fraction {
            if ownership < Decimal::ZERO || ownership > Decimal::ONE {
                return Err(FundModelError::config(
                    field("ownership_fraction"),
                    "Ownership must be in [0, 1]",
                ));
            }
        }

        match kind.strategy() {
            ReturnStrategy::PowerLaw | ReturnStrategy::RevenueShare => {
                if self.allocation.is_zero() {
                    return Err(FundModelError::config(
                        field("allocation"),
                        "Allocation must be positive; MOIC is undefined for zero invested capital",
                    ));
                }
            }
            ReturnStrategy::FixedMoic => match self.target_moic {
                None => {
                    return Err(FundModelError::config(
                        field("target_moic"),
                        "Fixed-return categories require a target MOIC",
                    ));
                }
                Some(target) if target < Decimal::ZERO => {
                    return Err(FundModelError::config(
                        field("target_moic"),
                        "Target MOIC cannot be negative",
                    ));
                }
                Some(_) => {}
            },
        }

        Ok(())
    }
}

/// Category parameters keyed by kind, iterated in table order.
pub type Categories = BTreeMap<CategoryKind, InvestmentCategory>;

/// Default category book for a $50M fund.
pub fn default_categories() -> Categories {
    let mut categories = Categories::new();
    categories.insert(
        CategoryKind::Seed,
        InvestmentCategory {
            count: 10,
            avg_check: Some(dec!(1.5)),
            pre_money_valuation: Some(dec!(15.0)),
            ownership_fraction: Some(dec!(0.10)),
            allocation: dec!(15.0),
            target_moic: None,
        },
    );
    categories.insert(
        CategoryKind::SharedSafe,
        InvestmentCategory {
            count: 6,
            avg_check: Some(dec!(2.0)),
            pre_money_valuation: Some(dec!(10.0)),
            ownership_fraction: Some(dec!(0.20)),
            allocation: dec!(12.0),
            target_moic: None,
        },
    );
    categories.insert(
        CategoryKind::SeriesA,
        InvestmentCategory {
            count: 6,
            avg_check: Some(dec!(2.0)),
            pre_money_valuation: Some(dec!(40.0)),
            ownership_fraction: Some(dec!(0.05)),
            allocation: dec!(12.0),
            target_moic: None,
        },
    );
    categories.insert(
        CategoryKind::Incubation,
        InvestmentCategory {
            count: 0,
            avg_check: None,
            pre_money_valuation: None,
            ownership_fraction: None,
            allocation: dec!(4.0),
            target_moic: Some(dec!(3.0)),
        },
    );
    categories.insert(
        CategoryKind::Recycled,
        InvestmentCategory {
            count: 3,
            avg_check: Some(dec!(0.67)),
            pre_money_valuation: None,
            ownership_fraction: None,
            allocation: dec!(2.0),
            target_moic: Some(dec!(5.0)),
        },
    );
    categories
}
