use fund_model_core::fund::{CategoryKind, CategoryOverride, FundConfig, FundModelRequest};
use fund_model_core::report::run_fund_model;
use fund_model_core::returns::{calculate_equity_returns, calculate_portfolio_returns};
use fund_model_core::waterfall::{
    calculate_cash_flows, calculate_lp_returns, sensitivity_analysis, CashFlowSchedule, IrrSource,
};
use fund_model_core::FundModelError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn default_config() -> FundConfig {
    FundConfig::new(dec!(50)).unwrap()
}

// ===========================================================================
// Category returns
// ===========================================================================

#[test]
fn test_equity_breakdown_capital_sums_to_invested() {
    let config = default_config();
    for kind in [CategoryKind::Seed, CategoryKind::SeriesA] {
        let r = calculate_equity_returns(&config, kind).unwrap();
        let capital: Decimal = r.breakdown.iter().map(|b| b.capital).sum();
        assert_eq!(capital, r.total_invested);
        assert_eq!(r.moic, r.total_return / r.total_invested);
    }
}

#[test]
fn test_equity_returns_follow_allocation_changes() {
    let config = FundConfig::builder(dec!(50))
        .category(CategoryKind::Seed, CategoryOverride::allocation(dec!(20)))
        .category(CategoryKind::SeriesA, CategoryOverride::allocation(dec!(7)))
        .build()
        .unwrap();
    let seed = calculate_equity_returns(&config, CategoryKind::Seed).unwrap();
    assert_eq!(seed.total_return, dec!(162));
    assert_eq!(seed.moic, dec!(8.1));
}

// ===========================================================================
// Portfolio aggregation
// ===========================================================================

#[test]
fn test_total_row_sums_categories_plus_residual() {
    let table = calculate_portfolio_returns(&default_config()).unwrap();
    let total = table.total().unwrap();
    let invested: Decimal = table.categories().map(|r| r.invested).sum();
    let gross: Decimal = table.categories().map(|r| r.gross_return).sum();
    assert_eq!(total.invested, invested);
    assert_eq!(total.gross_return, gross + dec!(5.0));
    assert_eq!(table.rows.last().unwrap().category, "Total Portfolio");
}

#[test]
fn test_default_total_invested_equals_total_deployable() {
    let config = default_config();
    let table = calculate_portfolio_returns(&config).unwrap();
    assert_eq!(table.total().unwrap().invested, config.total_deployable());
    assert_eq!(
        config.total_deployable(),
        config.net_investable() + config.recycling_amount()
    );
}

// ===========================================================================
// Cash flows
// ===========================================================================

#[test]
fn test_cash_flow_invariants() {
    let config = default_config();
    let schedule = calculate_cash_flows(&config).unwrap();
    for pair in schedule.rows.windows(2) {
        assert!(pair[1].cumulative_distribution >= pair[0].cumulative_distribution);
        assert!(pair[1].carry_due >= pair[0].carry_due);
    }
    for row in &schedule.rows {
        assert_eq!(row.dpi, row.cumulative_distribution / config.fund_size());
    }
}

#[test]
fn test_zero_carry_rate_zeroes_all_carry() {
    let config = FundConfig::builder(dec!(50))
        .carried_interest_rate(dec!(0.0))
        .build()
        .unwrap();
    let portfolio = calculate_portfolio_returns(&config).unwrap();
    let schedule = calculate_cash_flows(&config).unwrap();
    let lp = calculate_lp_returns(&config, &portfolio, &schedule).unwrap();

    assert_eq!(lp.carry, Decimal::ZERO);
    for row in &schedule.rows {
        assert_eq!(row.carry_due, Decimal::ZERO);
        assert_eq!(row.net_to_lps, row.total_distribution);
    }
}

#[test]
fn test_carry_rate_drives_schedule_carry() {
    let config = FundConfig::builder(dec!(50))
        .carried_interest_rate(dec!(0.30))
        .build()
        .unwrap();
    let schedule = calculate_cash_flows(&config).unwrap();
    let last = schedule.rows.last().unwrap();
    assert_eq!(last.carry_due, dec!(209.7) * dec!(0.30));
}

#[test]
fn test_alternative_exit_schedule() {
    let config = FundConfig::builder(dec!(50))
        .equity_exits(vec![dec!(0); 10])
        .build()
        .unwrap();
    let schedule = calculate_cash_flows(&config).unwrap();
    let last = schedule.rows.last().unwrap();
    // Revenue share only: 2.4 + 3.6 + 4.8 + 7.2 + 12 + 4 * 1.8
    assert_eq!(last.cumulative_distribution, dec!(37.2));
    assert!(schedule.rows.iter().all(|r| r.carry_due.is_zero()));
}

// ===========================================================================
// LP returns and IRR
// ===========================================================================

#[test]
fn test_lp_returns_idempotent() {
    let config = default_config();
    let portfolio = calculate_portfolio_returns(&config).unwrap();
    let schedule = calculate_cash_flows(&config).unwrap();
    let first = calculate_lp_returns(&config, &portfolio, &schedule).unwrap();
    let second = calculate_lp_returns(&config, &portfolio, &schedule).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_irr_fallback_for_non_negative_series() {
    let config = default_config();
    let portfolio = calculate_portfolio_returns(&config).unwrap();
    let mut schedule = calculate_cash_flows(&config).unwrap();
    for row in &mut schedule.rows {
        row.capital_call = Decimal::ZERO;
    }
    let lp = calculate_lp_returns(&config, &portfolio, &schedule).unwrap();
    assert_eq!(lp.net_irr, dec!(0.185));
    assert_eq!(lp.net_irr_source, IrrSource::DefaultFallback);
}

#[test]
fn test_irr_fallback_for_empty_schedule() {
    let config = default_config();
    let portfolio = calculate_portfolio_returns(&config).unwrap();
    let lp = calculate_lp_returns(&config, &portfolio, &CashFlowSchedule { rows: vec![] }).unwrap();
    assert_eq!(lp.net_irr, dec!(0.185));
}

// ===========================================================================
// Sensitivity
// ===========================================================================

#[test]
fn test_sensitivity_scaling_and_base_case() {
    let config = default_config();
    let portfolio = calculate_portfolio_returns(&config).unwrap();
    let schedule = calculate_cash_flows(&config).unwrap();
    let lp = calculate_lp_returns(&config, &portfolio, &schedule).unwrap();
    let table = sensitivity_analysis(&config, &portfolio).unwrap();

    let base = table.scenario("Base Case").unwrap();
    assert_eq!(base.gross_moic, lp.gross_moic);
    assert_eq!(base.net_moic, lp.net_moic);
    assert_eq!(
        table.scenario("Downside (-30%)").unwrap().gross_returns,
        dec!(0.7) * base.gross_returns
    );
    assert_eq!(
        table.scenario("Upside (+30%)").unwrap().gross_returns,
        dec!(1.3) * base.gross_returns
    );
}

#[test]
fn test_sensitivity_irr_is_monotonic_in_returns() {
    let config = default_config();
    let portfolio = calculate_portfolio_returns(&config).unwrap();
    let table = sensitivity_analysis(&config, &portfolio).unwrap();
    assert!(table.rows[0].net_irr_estimate < table.rows[1].net_irr_estimate);
    assert!(table.rows[1].net_irr_estimate < table.rows[2].net_irr_estimate);
}

// ===========================================================================
// Configuration errors and requests
// ===========================================================================

#[test]
fn test_configuration_errors_are_named() {
    assert!(matches!(
        FundConfig::new(dec!(0)),
        Err(FundModelError::InvalidConfiguration { .. })
    ));
    assert!(matches!(
        FundConfig::builder(dec!(50)).fund_life(3).build(),
        Err(FundModelError::InvalidConfiguration { .. })
    ));
    assert!(matches!(
        FundConfig::builder(dec!(50))
            .category(CategoryKind::SharedSafe, CategoryOverride::allocation(dec!(0)))
            .build(),
        Err(FundModelError::InvalidConfiguration { .. })
    ));
    assert!(matches!(
        FundConfig::builder(dec!(50))
            .category(CategoryKind::Seed, CategoryOverride::allocation(dec!(30)))
            .build(),
        Err(FundModelError::AllocationMismatch { .. })
    ));
}

#[test]
fn test_request_round_trip_through_full_model() {
    let request: FundModelRequest = serde_json::from_str(
        r#"{
            "fund_size": 100,
            "investment_params": {
                "seed": {"allocation": 30},
                "shared_safe": {"allocation": 24},
                "series_a": {"allocation": 22},
                "incubation": {"allocation": 5},
                "recycled": {"allocation": 4}
            }
        }"#,
    )
    .unwrap();
    let config = request.into_config().unwrap();
    assert_eq!(config.total_deployable(), dec!(85));

    let out = run_fund_model(&config).unwrap();
    let total = out.result.portfolio_returns.total().unwrap();
    assert_eq!(total.invested, dec!(85));
    assert_eq!(out.result.cash_flows.rows[0].capital_call, dec!(-25));
}
