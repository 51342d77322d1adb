use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::cash_flows::CashFlowSchedule;
use crate::error::FundModelError;
use crate::fund::FundConfig;
use crate::returns::PortfolioTable;
use crate::time_value::{has_sign_change, irr, irr_bisection, IRR_LOWER_BOUND, IRR_UPPER_BOUND};
use crate::types::{Money, Multiple, Rate};
use crate::FundModelResult;

const IRR_GUESS: Rate = dec!(0.10);

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Whole-fund split of gross returns between GP carry and LPs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundWaterfall {
    pub gross_returns: Money,
    pub gross_moic: Multiple,
    pub gross_profit: Money,
    pub carry: Money,
    pub net_profit_to_lps: Money,
    pub total_lp_distribution: Money,
    pub net_moic: Multiple,
}

/// Where a reported net IRR came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrSource {
    /// Root of the LP cash-flow series
    Solved,
    /// Series could not be solved; the configured default rate is reported
    DefaultFallback,
}

/// Net returns to LPs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpReturns {
    pub gross_returns: Money,
    pub gross_moic: Multiple,
    pub gross_profit: Money,
    pub carry: Money,
    pub net_profit_to_lps: Money,
    pub total_lp_distribution: Money,
    pub net_moic: Multiple,
    pub net_irr: Rate,
    pub net_irr_source: IrrSource,
    pub management_fees: Money,
    pub operating_expenses: Money,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Single whole-fund carry on cumulative profit: no hurdle, no per-deal
/// carry, nothing charged on a loss.
pub fn whole_fund_waterfall(
    gross_returns: Money,
    fund_size: Money,
    carry_rate: Rate,
) -> FundModelResult<FundWaterfall> {
    if fund_size <= Decimal::ZERO {
        return Err(FundModelError::DivisionByZero {
            context: "fund multiples with non-positive fund size".into(),
        });
    }

    let overflow = || FundModelError::overflow("fund waterfall");

    let gross_profit = gross_returns.checked_sub(fund_size).ok_or_else(overflow)?;
    let carry = if gross_profit > Decimal::ZERO {
        gross_profit.checked_mul(carry_rate).ok_or_else(overflow)?
    } else {
        Decimal::ZERO
    };
    let net_profit_to_lps = gross_profit.checked_sub(carry).ok_or_else(overflow)?;
    let total_lp_distribution = fund_size.checked_add(net_profit_to_lps).ok_or_else(overflow)?;

    Ok(FundWaterfall {
        gross_returns,
        gross_moic: gross_returns.checked_div(fund_size).ok_or_else(overflow)?,
        gross_profit,
        carry,
        net_profit_to_lps,
        total_lp_distribution,
        net_moic: total_lp_distribution.checked_div(fund_size).ok_or_else(overflow)?,
    })
}

/// LP cash flows for the IRR: every year's capital call, then one terminal
/// inflow carrying the sum of all years' net-to-LP distributions.
pub fn lp_cash_flow_series(schedule: &CashFlowSchedule) -> Vec<Money> {
    let mut flows = schedule.capital_calls();
    flows.push(schedule.total_net_to_lps());
    flows
}

/// Solve the IRR of `cash_flows`, falling back to `fallback` when the
/// series has no sign change or neither Newton-Raphson nor bisection
/// converges.
pub fn solve_lp_irr(cash_flows: &[Money], fallback: Rate) -> (Rate, IrrSource) {
    if !has_sign_change(cash_flows) {
        tracing::warn!(
            flows = cash_flows.len(),
            %fallback,
            "LP cash flows have no sign change; reporting default IRR"
        );
        return (fallback, IrrSource::DefaultFallback);
    }

    match irr(cash_flows, IRR_GUESS) {
        Ok(rate) => {
            tracing::debug!(%rate, "LP IRR solved by Newton-Raphson");
            (rate, IrrSource::Solved)
        }
        Err(newton_err) => {
            tracing::debug!(error = %newton_err, "Newton-Raphson failed; trying bisection");
            match irr_bisection(cash_flows, IRR_LOWER_BOUND, IRR_UPPER_BOUND) {
                Ok(rate) => (rate, IrrSource::Solved),
                Err(e) => {
                    tracing::warn!(error = %e, %fallback, "LP IRR did not converge; reporting default IRR");
                    (fallback, IrrSource::DefaultFallback)
                }
            }
        }
    }
}

/// Gross and net fund returns from the portfolio total and the cash-flow
/// schedule. Pure: the same inputs always give the same output.
pub fn calculate_lp_returns(
    config: &FundConfig,
    portfolio: &PortfolioTable,
    schedule: &CashFlowSchedule,
) -> FundModelResult<LpReturns> {
    let gross_returns = portfolio.total()?.gross_return;
    let waterfall = whole_fund_waterfall(
        gross_returns,
        config.fund_size(),
        config.carried_interest_rate(),
    )?;

    let flows = lp_cash_flow_series(schedule);
    let (net_irr, net_irr_source) = solve_lp_irr(&flows, config.assumptions().irr_fallback_rate);

    Ok(LpReturns {
        gross_returns: waterfall.gross_returns,
        gross_moic: waterfall.gross_moic,
        gross_profit: waterfall.gross_profit,
        carry: waterfall.carry,
        net_profit_to_lps: waterfall.net_profit_to_lps,
        total_lp_distribution: waterfall.total_lp_distribution,
        net_moic: waterfall.net_moic,
        net_irr,
        net_irr_source,
        management_fees: config.total_management_fees(),
        operating_expenses: config.operating_expenses(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::calculate_portfolio_returns;
    use crate::waterfall::cash_flows::{calculate_cash_flows, CashFlowRow};

    fn default_inputs() -> (FundConfig, PortfolioTable, CashFlowSchedule) {
        let config = FundConfig::new(dec!(50)).unwrap();
        let portfolio = calculate_portfolio_returns(&config).unwrap();
        let schedule = calculate_cash_flows(&config).unwrap();
        (config, portfolio, schedule)
    }

    fn flat_row(year: u32, capital_call: Money, distribution: Money) -> CashFlowRow {
        CashFlowRow {
            year,
            capital_call,
            revenue_share: distribution,
            equity_exits: Decimal::ZERO,
            total_distribution: distribution,
            net_cash_flow: capital_call + distribution,
            cumulative_distribution: Decimal::ZERO,
            dpi: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            carry_due: Decimal::ZERO,
            net_to_lps: distribution,
        }
    }

    #[test]
    fn test_waterfall_profit_and_carry() {
        let w = whole_fund_waterfall(dec!(254.1), dec!(50), dec!(0.20)).unwrap();
        assert_eq!(w.gross_profit, dec!(204.1));
        assert_eq!(w.carry, dec!(40.82));
        assert_eq!(w.net_profit_to_lps, dec!(163.28));
        assert_eq!(w.total_lp_distribution, dec!(213.28));
        assert_eq!(w.net_moic, dec!(4.2656));
        assert_eq!(w.gross_moic, dec!(5.082));
    }

    #[test]
    fn test_waterfall_no_carry_on_loss() {
        let w = whole_fund_waterfall(dec!(40), dec!(50), dec!(0.20)).unwrap();
        assert_eq!(w.carry, Decimal::ZERO);
        assert_eq!(w.net_profit_to_lps, dec!(-10));
        assert_eq!(w.net_moic, dec!(0.8));
    }

    #[test]
    fn test_waterfall_overflow_is_an_error() {
        assert!(matches!(
            whole_fund_waterfall(Decimal::MAX, dec!(0.0001), dec!(0.20)),
            Err(FundModelError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_twenty_year_fund_with_deep_loss_is_solved() {
        use crate::fund::{CashFlowAssumptions, CategoryKind, CategoryOverride, RevenueShareTerms};

        // 45 deployable: 26 seed, 12 series A, 1 shared SAFE, 4 incubation, 2 recycled
        let config = FundConfig::builder(dec!(50))
            .fund_life(20)
            .management_fee_rate(dec!(0.01))
            .revenue_share(RevenueShareTerms {
                revenue_multiple: dec!(0.01),
                ..Default::default()
            })
            .cash_flow_assumptions(CashFlowAssumptions {
                tail_distribution: Decimal::ZERO,
                equity_exits: vec![],
                ..Default::default()
            })
            .category(CategoryKind::SharedSafe, CategoryOverride::allocation(dec!(1)))
            .category(CategoryKind::Seed, CategoryOverride::allocation(dec!(26)))
            .build()
            .unwrap();
        let portfolio = calculate_portfolio_returns(&config).unwrap();
        let schedule = calculate_cash_flows(&config).unwrap();
        let flows = lp_cash_flow_series(&schedule);
        assert_eq!(flows.len(), 21);
        assert_eq!(flows[20], dec!(0.01));

        let lp = calculate_lp_returns(&config, &portfolio, &schedule).unwrap();
        assert_eq!(lp.net_irr_source, IrrSource::Solved);
        assert!(lp.net_irr > dec!(-0.40) && lp.net_irr < dec!(-0.34), "got {}", lp.net_irr);
    }

    #[test]
    fn test_default_lp_returns() {
        let (config, portfolio, schedule) = default_inputs();
        let lp = calculate_lp_returns(&config, &portfolio, &schedule).unwrap();
        assert_eq!(lp.gross_returns, dec!(254.1));
        assert_eq!(lp.carry, dec!(40.82));
        assert_eq!(lp.net_moic, dec!(4.2656));
        assert_eq!(lp.management_fees, dec!(10));
        assert_eq!(lp.operating_expenses, dec!(2));
        assert_eq!(lp.net_irr_source, IrrSource::Solved);
        assert!(lp.net_irr > dec!(0.18) && lp.net_irr < dec!(0.20), "got {}", lp.net_irr);
    }

    #[test]
    fn test_lp_series_shape() {
        let (_, _, schedule) = default_inputs();
        let flows = lp_cash_flow_series(&schedule);
        assert_eq!(flows.len(), 11);
        assert_eq!(flows[0], dec!(-12.5));
        assert_eq!(flows[10], dec!(217.76));
    }

    #[test]
    fn test_fallback_without_sign_change() {
        let (config, portfolio, _) = default_inputs();
        let schedule = CashFlowSchedule {
            rows: (1..=10).map(|y| flat_row(y, Decimal::ZERO, dec!(5))).collect(),
        };
        let lp = calculate_lp_returns(&config, &portfolio, &schedule).unwrap();
        assert_eq!(lp.net_irr, dec!(0.185));
        assert_eq!(lp.net_irr_source, IrrSource::DefaultFallback);
    }

    #[test]
    fn test_fallback_on_empty_schedule() {
        let (config, portfolio, _) = default_inputs();
        let schedule = CashFlowSchedule { rows: vec![] };
        let lp = calculate_lp_returns(&config, &portfolio, &schedule).unwrap();
        assert_eq!(lp.net_irr, dec!(0.185));
    }

    #[test]
    fn test_fallback_on_all_outflows() {
        let (irr, source) = solve_lp_irr(&[dec!(-10), dec!(-10), dec!(0)], dec!(0.185));
        assert_eq!(irr, dec!(0.185));
        assert_eq!(source, IrrSource::DefaultFallback);
    }

    #[test]
    fn test_configured_fallback_rate_is_used() {
        let config = FundConfig::builder(dec!(50))
            .irr_fallback_rate(dec!(0.12))
            .build()
            .unwrap();
        let portfolio = calculate_portfolio_returns(&config).unwrap();
        let schedule = CashFlowSchedule { rows: vec![] };
        let lp = calculate_lp_returns(&config, &portfolio, &schedule).unwrap();
        assert_eq!(lp.net_irr, dec!(0.12));
    }

    #[test]
    fn test_missing_total_row_is_an_error() {
        let (config, _, schedule) = default_inputs();
        let empty = PortfolioTable { rows: vec![] };
        assert!(calculate_lp_returns(&config, &empty, &schedule).is_err());
    }
}
