use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::category::calculate_category_returns;
use crate::error::FundModelError;
use crate::fund::{CategoryKind, FundConfig};
use crate::types::{checked_sum, Money, Multiple};
use crate::FundModelResult;

/// Label of the synthetic total row.
pub const TOTAL_ROW_LABEL: &str = "Total Portfolio";

/// One row of the portfolio table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRow {
    /// Display name
    pub category: String,
    /// Category key; `None` on the total row
    #[serde(default)]
    pub key: Option<CategoryKind>,
    pub invested: Money,
    pub gross_return: Money,
    pub moic: Multiple,
    /// Share of total deployable capital, in percent (100 = everything)
    pub pct_of_portfolio: Decimal,
}

/// Category rows in fixed order followed by the "Total Portfolio" row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTable {
    pub rows: Vec<PortfolioRow>,
}

impl PortfolioTable {
    /// The total row, looked up by name.
    pub fn total(&self) -> FundModelResult<&PortfolioRow> {
        self.rows
            .iter()
            .find(|r| r.key.is_none() && r.category == TOTAL_ROW_LABEL)
            .ok_or_else(|| {
                FundModelError::InsufficientData(format!(
                    "portfolio table has no '{TOTAL_ROW_LABEL}' row"
                ))
            })
    }

    pub fn row(&self, kind: CategoryKind) -> Option<&PortfolioRow> {
        self.rows.iter().find(|r| r.key == Some(kind))
    }

    /// Category rows only.
    pub fn categories(&self) -> impl Iterator<Item = &PortfolioRow> {
        self.rows.iter().filter(|r| r.key.is_some())
    }
}

/// Run every category calculator and aggregate into the portfolio table.
///
/// The total row's gross return carries the configured residual on top of
/// the category sum; its percentage is 100 by definition.
pub fn calculate_portfolio_returns(config: &FundConfig) -> FundModelResult<PortfolioTable> {
    let deployable = config.total_deployable();
    if deployable <= Decimal::ZERO {
        return Err(FundModelError::DivisionByZero {
            context: "percent of total deployable".into(),
        });
    }

    let mut rows: Vec<PortfolioRow> = Vec::with_capacity(CategoryKind::ALL.len() + 1);
    for kind in CategoryKind::ALL {
        let returns = calculate_category_returns(config, kind)?;
        let invested = returns.total_invested();
        rows.push(PortfolioRow {
            category: kind.label().to_string(),
            key: Some(kind),
            invested,
            gross_return: returns.total_return(),
            moic: returns.moic(),
            pct_of_portfolio: invested / deployable * dec!(100),
        });
    }

    let total_invested = checked_sum(rows.iter().map(|r| r.invested), "total invested")?;
    let total_gross = checked_sum(
        rows.iter()
            .map(|r| r.gross_return)
            .chain([config.assumptions().portfolio_residual]),
        "total gross return",
    )?;

    if total_invested.is_zero() {
        return Err(FundModelError::DivisionByZero {
            context: "portfolio MOIC with zero invested capital".into(),
        });
    }
    let total_moic = total_gross
        .checked_div(total_invested)
        .ok_or_else(|| FundModelError::overflow("portfolio MOIC"))?;

    tracing::debug!(%total_invested, %total_gross, %total_moic, "portfolio returns");

    rows.push(PortfolioRow {
        category: TOTAL_ROW_LABEL.to_string(),
        key: None,
        invested: total_invested,
        gross_return: total_gross,
        moic: total_moic,
        pct_of_portfolio: dec!(100),
    });

    Ok(PortfolioTable { rows })
}
