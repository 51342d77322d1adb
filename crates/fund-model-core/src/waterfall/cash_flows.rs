//! Year-by-year capital calls, distributions and carry accrual.
//!
//! The schedule is table driven: capital is called in equal tranches over
//! the first [`CAPITAL_CALL_YEARS`] years, revenue-share receipts follow the
//! SAFE timing buckets plus a flat tail, and equity exits come straight from
//! the configured exit sequence. Carry accrues on cumulative gross profit
//! and is only ever charged incrementally; there is no claw-back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fund::assumptions::CAPITAL_CALL_YEARS;
use crate::fund::FundConfig;
use crate::returns::calculate_revenue_share_returns;
use crate::error::FundModelError;
use crate::types::{checked_product, checked_sum, Money, Multiple};
use crate::FundModelResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One fund year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowRow {
    /// Fund year, 1-based
    pub year: u32,
    /// Capital called from LPs (zero or negative)
    pub capital_call: Money,
    /// Revenue-share receipts
    pub revenue_share: Money,
    /// Equity exit proceeds
    pub equity_exits: Money,
    pub total_distribution: Money,
    /// capital_call + total_distribution
    pub net_cash_flow: Money,
    pub cumulative_distribution: Money,
    /// cumulative_distribution / fund_size
    pub dpi: Multiple,
    /// cumulative_distribution − fund_size
    pub gross_profit: Money,
    /// Cumulative carry accrued to date; never decreases
    pub carry_due: Money,
    /// Distribution less the carry accrued this year
    pub net_to_lps: Money,
}

/// The full projection, one row per year of fund life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSchedule {
    pub rows: Vec<CashFlowRow>,
}

impl CashFlowSchedule {
    pub fn capital_calls(&self) -> Vec<Money> {
        self.rows.iter().map(|r| r.capital_call).collect()
    }

    pub fn total_net_to_lps(&self) -> Money {
        self.rows.iter().map(|r| r.net_to_lps).sum()
    }

    /// First year whose DPI strictly exceeds `threshold`.
    pub fn first_year_dpi_above(&self, threshold: Multiple) -> Option<u32> {
        self.rows.iter().find(|r| r.dpi > threshold).map(|r| r.year)
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Revenue-share receipts for the first five years, in year order.
fn early_revenue_share(config: &FundConfig) -> FundModelResult<[Money; 5]> {
    let rs = calculate_revenue_share_returns(config)?.cash_flow_schedule;
    let cf = &config.assumptions().cash_flows;
    let context = "revenue share timing";
    Ok([
        checked_product(rs.year_1_2, cf.years_1_2_split[0], context)?,
        checked_product(rs.year_1_2, cf.years_1_2_split[1], context)?,
        checked_product(rs.year_3_4, cf.years_3_4_split[0], context)?,
        checked_product(rs.year_3_4, cf.years_3_4_split[1], context)?,
        rs.year_5,
    ])
}

/// Describe every scheduled amount that falls after the fund's last year.
/// Those amounts are left out of the projection.
pub fn unscheduled_distribution_warnings(config: &FundConfig) -> Vec<String> {
    let fund_life = config.fund_life() as usize;
    let cf = &config.assumptions().cash_flows;
    let mut warnings = Vec::new();

    if let Ok(early) = early_revenue_share(config) {
        for (i, amount) in early.iter().enumerate().skip(fund_life) {
            if !amount.is_zero() {
                warnings.push(format!(
                    "Revenue share of {amount} scheduled for year {} falls outside the {fund_life}-year fund life",
                    i + 1
                ));
            }
        }
    }

    if !cf.tail_distribution.is_zero() && cf.tail_last_year as usize > fund_life {
        let first_dropped = (cf.tail_first_year as usize).max(fund_life + 1);
        warnings.push(format!(
            "Tail distribution of {} in years {first_dropped}-{} falls outside the {fund_life}-year fund life",
            cf.tail_distribution, cf.tail_last_year
        ));
    }

    let dropped = &cf.equity_exits[fund_life.min(cf.equity_exits.len())..];
    match checked_sum(dropped.iter().copied(), "dropped equity exits") {
        Ok(total) if total.is_zero() => {}
        Ok(total) => warnings.push(format!(
            "Equity exits totalling {total} are scheduled after year {fund_life} and were ignored"
        )),
        Err(_) => warnings.push(format!(
            "{} equity exits are scheduled after year {fund_life} and were ignored",
            dropped.len()
        )),
    }

    warnings
}

/// Build the year-by-year cash-flow schedule.
pub fn calculate_cash_flows(config: &FundConfig) -> FundModelResult<CashFlowSchedule> {
    let n = config.fund_life() as usize;
    let fund_size = config.fund_size();
    let carry_rate = config.carried_interest_rate();
    let cf = &config.assumptions().cash_flows;

    for warning in unscheduled_distribution_warnings(config) {
        tracing::warn!("{warning}");
    }

    let tranche = fund_size / Decimal::from(CAPITAL_CALL_YEARS);
    let mut capital_calls = vec![Decimal::ZERO; n];
    for call in capital_calls.iter_mut().take(CAPITAL_CALL_YEARS as usize) {
        *call = -tranche;
    }

    let mut revenue_share = vec![Decimal::ZERO; n];
    for (slot, amount) in revenue_share.iter_mut().zip(early_revenue_share(config)?) {
        *slot += amount;
    }
    for year in cf.tail_first_year..=cf.tail_last_year.min(config.fund_life()) {
        let slot = &mut revenue_share[year as usize - 1];
        *slot = checked_sum([*slot, cf.tail_distribution], "revenue share tail")?;
    }

    let mut rows: Vec<CashFlowRow> = Vec::with_capacity(n);
    let mut cumulative_distribution = Decimal::ZERO;
    let mut prior_carry = Decimal::ZERO;

    for i in 0..n {
        let year = i as u32 + 1;
        let overflow = || FundModelError::overflow(format!("cash flows in year {year}"));

        let equity_exits = cf.equity_exits.get(i).copied().unwrap_or(Decimal::ZERO);
        let total_distribution = revenue_share[i]
            .checked_add(equity_exits)
            .ok_or_else(overflow)?;
        let net_cash_flow = capital_calls[i]
            .checked_add(total_distribution)
            .ok_or_else(overflow)?;
        cumulative_distribution = cumulative_distribution
            .checked_add(total_distribution)
            .ok_or_else(overflow)?;

        let dpi = cumulative_distribution
            .checked_div(fund_size)
            .ok_or_else(overflow)?;
        let gross_profit = cumulative_distribution
            .checked_sub(fund_size)
            .ok_or_else(overflow)?;
        // Carry is a claim on cumulative profit: once accrued it is never
        // handed back.
        let carry_due = gross_profit
            .checked_mul(carry_rate)
            .ok_or_else(overflow)?
            .max(prior_carry)
            .max(Decimal::ZERO);
        let net_to_lps = total_distribution - (carry_due - prior_carry);
        prior_carry = carry_due;

        rows.push(CashFlowRow {
            year,
            capital_call: capital_calls[i],
            revenue_share: revenue_share[i],
            equity_exits,
            total_distribution,
            net_cash_flow,
            cumulative_distribution,
            dpi,
            gross_profit,
            carry_due,
            net_to_lps,
        });
    }

    tracing::debug!(
        years = n,
        %cumulative_distribution,
        carry_due = %prior_carry,
        "cash flow schedule"
    );

    Ok(CashFlowSchedule { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn default_schedule() -> CashFlowSchedule {
        calculate_cash_flows(&FundConfig::new(dec!(50)).unwrap()).unwrap()
    }

    #[test]
    fn test_one_row_per_year() {
        let s = default_schedule();
        assert_eq!(s.rows.len(), 10);
        assert_eq!(s.rows[0].year, 1);
        assert_eq!(s.rows[9].year, 10);
    }

    #[test]
    fn test_capital_calls_first_four_years() {
        let calls = default_schedule().capital_calls();
        assert_eq!(&calls[..4], &[dec!(-12.5); 4]);
        assert!(calls[4..].iter().all(|c| c.is_zero()));
        assert_eq!(calls.iter().sum::<Decimal>(), dec!(-50));
    }

    #[test]
    fn test_revenue_share_timing() {
        let s = default_schedule();
        let rs: Vec<Decimal> = s.rows.iter().map(|r| r.revenue_share).collect();
        assert_eq!(
            rs,
            vec![
                dec!(2.4),
                dec!(3.6),
                dec!(4.8),
                dec!(7.2),
                dec!(12),
                dec!(1.8),
                dec!(1.8),
                dec!(1.8),
                dec!(1.8),
                dec!(0)
            ]
        );
    }

    #[test]
    fn test_default_totals_and_carry() {
        let s = default_schedule();
        let last = s.rows.last().unwrap();
        assert_eq!(last.cumulative_distribution, dec!(259.7));
        assert_eq!(last.dpi, dec!(259.7) / dec!(50));
        assert_eq!(last.gross_profit, dec!(209.7));
        assert_eq!(last.carry_due, dec!(41.94));
        assert_eq!(s.total_net_to_lps(), dec!(217.76));
        // Carry first accrues in year 5, when cumulative distributions pass 50
        assert_eq!(s.rows[3].carry_due, Decimal::ZERO);
        assert_eq!(s.rows[4].carry_due, dec!(0.6));
        assert_eq!(s.rows[4].net_to_lps, dec!(24) - dec!(0.6));
    }

    #[test]
    fn test_monotonic_columns_and_dpi_identity() {
        let s = default_schedule();
        for pair in s.rows.windows(2) {
            assert!(pair[1].cumulative_distribution >= pair[0].cumulative_distribution);
            assert!(pair[1].carry_due >= pair[0].carry_due);
        }
        for r in &s.rows {
            assert_eq!(r.dpi, r.cumulative_distribution / dec!(50));
            assert_eq!(r.net_cash_flow, r.capital_call + r.total_distribution);
        }
    }

    #[test]
    fn test_dpi_milestones() {
        let s = default_schedule();
        assert_eq!(s.first_year_dpi_above(dec!(0.5)), Some(4));
        assert_eq!(s.first_year_dpi_above(dec!(1.0)), Some(5));
        assert_eq!(s.first_year_dpi_above(dec!(100)), None);
    }

    #[test]
    fn test_zero_carry_passes_everything_to_lps() {
        let config = FundConfig::builder(dec!(50))
            .carried_interest_rate(dec!(0))
            .build()
            .unwrap();
        let s = calculate_cash_flows(&config).unwrap();
        for r in &s.rows {
            assert_eq!(r.carry_due, Decimal::ZERO);
            assert_eq!(r.net_to_lps, r.total_distribution);
        }
    }

    #[test]
    fn test_short_fund_life_drops_late_amounts() {
        // Six years of fees leave 49 to deploy
        let config = FundConfig::builder(dec!(50))
            .fund_life(6)
            .category(
                crate::fund::CategoryKind::Seed,
                crate::fund::CategoryOverride::allocation(dec!(19)),
            )
            .build()
            .unwrap();
        let s = calculate_cash_flows(&config).unwrap();
        assert_eq!(s.rows.len(), 6);
        assert_eq!(s.rows[5].revenue_share, dec!(1.8));
        assert_eq!(s.rows[5].equity_exits, dec!(20));
        let warnings = unscheduled_distribution_warnings(&config);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_long_fund_life_pads_exits() {
        let config = FundConfig::builder(dec!(50))
            .fund_life(12)
            .management_fee_rate(dec!(0.015))
            .category(
                crate::fund::CategoryKind::Seed,
                crate::fund::CategoryOverride::allocation(dec!(16)),
            )
            .build()
            .unwrap();
        let s = calculate_cash_flows(&config).unwrap();
        assert_eq!(s.rows.len(), 12);
        assert_eq!(s.rows[10].equity_exits, Decimal::ZERO);
        assert_eq!(s.rows[11].total_distribution, Decimal::ZERO);
        assert!(unscheduled_distribution_warnings(&config).is_empty());
    }

    #[test]
    fn test_cumulative_overflow_is_an_error() {
        let config = FundConfig::builder(dec!(50))
            .equity_exits(vec![Decimal::MAX, Decimal::MAX])
            .build()
            .unwrap();
        match calculate_cash_flows(&config).unwrap_err() {
            crate::error::FundModelError::ArithmeticOverflow { context } => {
                assert!(context.starts_with("cash flows in year"), "got {context}")
            }
            other => panic!("Expected ArithmeticOverflow, got: {other:?}"),
        }
    }
}
