//! Return-scenario sensitivity.
//!
//! Scales the portfolio's gross returns and re-runs the whole-fund carry
//! waterfall. The IRR here is a compound-annual-growth estimate over the
//! fund life, not a solve over scaled cash-flow timing, so it is not
//! directly comparable with [`super::LpReturns::net_irr`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::lp_returns::whole_fund_waterfall;
use crate::error::FundModelError;
use crate::fund::FundConfig;
use crate::returns::PortfolioTable;
use crate::time_value::annualised_return;
use crate::types::{Money, Multiple, Rate};
use crate::FundModelResult;

/// A named multiplier on base-case gross returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityScenario {
    pub name: String,
    pub multiplier: Decimal,
}

impl SensitivityScenario {
    pub fn new(name: impl Into<String>, multiplier: Decimal) -> Self {
        SensitivityScenario {
            name: name.into(),
            multiplier,
        }
    }

    /// Downside (×0.7), base (×1.0), upside (×1.3).
    pub fn defaults() -> Vec<Self> {
        vec![
            SensitivityScenario::new("Downside (-30%)", dec!(0.7)),
            SensitivityScenario::new("Base Case", dec!(1.0)),
            SensitivityScenario::new("Upside (+30%)", dec!(1.3)),
        ]
    }
}

/// How a sensitivity row's IRR was estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrMethod {
    /// net_moic^(1 / fund_life) − 1
    CagrApproximation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub scenario: String,
    pub multiplier: Decimal,
    pub gross_returns: Money,
    pub gross_moic: Multiple,
    pub net_moic: Multiple,
    pub net_irr_estimate: Rate,
    pub irr_method: IrrMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityTable {
    pub rows: Vec<SensitivityRow>,
}

impl SensitivityTable {
    pub fn scenario(&self, name: &str) -> Option<&SensitivityRow> {
        self.rows.iter().find(|r| r.scenario == name)
    }
}

/// Sensitivity over the three default scenarios.
pub fn sensitivity_analysis(
    config: &FundConfig,
    portfolio: &PortfolioTable,
) -> FundModelResult<SensitivityTable> {
    sensitivity_analysis_with(config, portfolio, &SensitivityScenario::defaults())
}

/// Sensitivity over caller-supplied scenarios, in the order given.
pub fn sensitivity_analysis_with(
    config: &FundConfig,
    portfolio: &PortfolioTable,
    scenarios: &[SensitivityScenario],
) -> FundModelResult<SensitivityTable> {
    if scenarios.is_empty() {
        return Err(FundModelError::InsufficientData(
            "sensitivity analysis needs at least one scenario".into(),
        ));
    }

    let base_gross = portfolio.total()?.gross_return;
    let mut rows = Vec::with_capacity(scenarios.len());

    for scenario in scenarios {
        if scenario.multiplier < Decimal::ZERO {
            return Err(FundModelError::config(
                format!("scenario.{}.multiplier", scenario.name),
                "Multiplier cannot be negative",
            ));
        }

        let scaled_gross = base_gross.checked_mul(scenario.multiplier).ok_or_else(|| {
            FundModelError::config(
                format!("scenario.{}.multiplier", scenario.name),
                format!("Multiplier {} scales gross returns beyond the representable range", scenario.multiplier),
            )
        })?;
        let waterfall = whole_fund_waterfall(
            scaled_gross,
            config.fund_size(),
            config.carried_interest_rate(),
        )?;
        let net_irr_estimate = annualised_return(waterfall.net_moic, config.fund_life())?;

        rows.push(SensitivityRow {
            scenario: scenario.name.clone(),
            multiplier: scenario.multiplier,
            gross_returns: waterfall.gross_returns,
            gross_moic: waterfall.gross_moic,
            net_moic: waterfall.net_moic,
            net_irr_estimate,
            irr_method: IrrMethod::CagrApproximation,
        });
    }

    tracing::debug!(scenarios = rows.len(), %base_gross, "sensitivity analysis");

    Ok(SensitivityTable { rows })
}
