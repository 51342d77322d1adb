use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::FundModelError;
use crate::types::{Money, Multiple, Rate};
use crate::FundModelResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const MAX_BISECTION_ITERATIONS: u32 = 200;

/// Lowest rate the IRR solvers will consider.
pub const IRR_LOWER_BOUND: Rate = dec!(-0.99);
/// Highest rate the IRR solvers will consider.
pub const IRR_UPPER_BOUND: Rate = dec!(10.0);

/// Net Present Value of a series of annual cash flows (index 0 is undiscounted).
///
/// Discount factors too small to represent contribute nothing; a factor too
/// large to represent (deeply negative rates over long series) is an error.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> FundModelResult<Money> {
    if rate <= dec!(-1) {
        return Err(FundModelError::config(
            "rate",
            "Discount rate must be greater than -100%",
        ));
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut result = Decimal::ZERO;
    // 1 / (1 + r)^t, built up iteratively
    let mut df = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            df = df
                .checked_div(one_plus_r)
                .ok_or_else(|| FundModelError::overflow(format!("NPV discount factor at period {t}")))?;
        }
        let pv = cf
            .checked_mul(df)
            .ok_or_else(|| FundModelError::overflow(format!("NPV present value at period {t}")))?;
        result = result
            .checked_add(pv)
            .ok_or_else(|| FundModelError::overflow("NPV sum"))?;
    }

    Ok(result)
}

/// A value with the same sign as the NPV at `rate`, finite over the whole
/// solver bracket. Below 0% the series is compounded forward to its last
/// period (NPV × (1 + r)^n), where every factor is below one.
fn npv_sign_value(rate: Rate, cash_flows: &[Money]) -> FundModelResult<Decimal> {
    let growth = Decimal::ONE + rate;
    if growth >= Decimal::ONE {
        return npv(rate, cash_flows);
    }
    if growth <= Decimal::ZERO {
        return Err(FundModelError::config(
            "rate",
            "Discount rate must be greater than -100%",
        ));
    }

    let mut acc = Decimal::ZERO;
    for cf in cash_flows {
        acc = acc
            .checked_mul(growth)
            .and_then(|v| v.checked_add(*cf))
            .ok_or_else(|| FundModelError::overflow("compounded cash-flow value"))?;
    }
    Ok(acc)
}

/// NPV and its derivative with respect to the rate. `None` when the discount
/// factors leave the representable range.
fn npv_with_derivative(rate: Rate, cash_flows: &[Money]) -> Option<(Decimal, Decimal)> {
    let denom = Decimal::ONE + rate;
    if denom <= Decimal::ZERO {
        return None;
    }

    let mut npv_val = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    // 1 / (1 + r)^t, built up iteratively
    let mut df = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            df = df.checked_div(denom)?;
        }
        npv_val = npv_val.checked_add(cf.checked_mul(df)?)?;
        if t > 0 {
            let term = Decimal::from(t as u64)
                .checked_mul(*cf)?
                .checked_mul(df)?
                .checked_div(denom)?;
            dnpv = dnpv.checked_sub(term)?;
        }
    }

    Some((npv_val, dnpv))
}

/// True when the series holds at least one inflow and one outflow.
pub fn has_sign_change(cash_flows: &[Money]) -> bool {
    let any_negative = cash_flows.iter().any(|cf| cf.is_sign_negative() && !cf.is_zero());
    let any_positive = cash_flows.iter().any(|cf| cf.is_sign_positive() && !cf.is_zero());
    any_negative && any_positive
}

/// Internal Rate of Return using Newton-Raphson, clamped to
/// [`IRR_LOWER_BOUND`, `IRR_UPPER_BOUND`].
pub fn irr(cash_flows: &[Money], guess: Rate) -> FundModelResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(FundModelError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }
    if !has_sign_change(cash_flows) {
        return Err(FundModelError::InsufficientData(
            "IRR requires both an outflow and an inflow".into(),
        ));
    }

    let mut rate = guess;
    let mut last_delta = Decimal::MAX;

    for i in 0..MAX_IRR_ITERATIONS {
        let (npv_val, dnpv) =
            npv_with_derivative(rate, cash_flows).ok_or_else(|| FundModelError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta,
            })?;

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(FundModelError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        let delta = npv_val
            .checked_div(dnpv)
            .ok_or_else(|| FundModelError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            })?;
        rate = match rate.checked_sub(delta) {
            Some(next) => next,
            None if delta.is_sign_positive() => IRR_LOWER_BOUND,
            None => IRR_UPPER_BOUND,
        };
        last_delta = npv_val;

        // Guard against divergence
        if rate < IRR_LOWER_BOUND {
            rate = IRR_LOWER_BOUND;
        } else if rate > IRR_UPPER_BOUND {
            rate = IRR_UPPER_BOUND;
        }

        if delta.abs() < CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }
    }

    Err(FundModelError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta,
    })
}

/// IRR by bisection over `[low, high]`. Requires the NPV to change sign
/// across the bracket. Only the sign of the NPV is used, so long series stay
/// solvable at both ends of the bracket.
pub fn irr_bisection(cash_flows: &[Money], low: Rate, high: Rate) -> FundModelResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(FundModelError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }
    if low >= high {
        return Err(FundModelError::config("low", "Bracket low must be below high"));
    }

    let mut lo = low;
    let mut hi = high;
    let value_lo = npv_sign_value(lo, cash_flows)?;
    let value_hi = npv_sign_value(hi, cash_flows)?;

    if value_lo.is_zero() {
        return Ok(lo);
    }
    if value_hi.is_zero() {
        return Ok(hi);
    }
    let lo_positive = value_lo.is_sign_positive();
    if lo_positive == value_hi.is_sign_positive() {
        return Err(FundModelError::ConvergenceFailure {
            function: "IRR bisection".into(),
            iterations: 0,
            last_delta: value_lo,
        });
    }

    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        if hi - lo < CONVERGENCE_THRESHOLD {
            return Ok(mid);
        }

        let value_mid = npv_sign_value(mid, cash_flows)?;
        if value_mid.is_zero() {
            return Ok(mid);
        }
        if value_mid.is_sign_positive() == lo_positive {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Err(FundModelError::ConvergenceFailure {
        function: "IRR bisection".into(),
        iterations: MAX_BISECTION_ITERATIONS,
        last_delta: hi - lo,
    })
}

/// Compound annual growth rate implied by a multiple earned over `years`:
/// `multiple^(1/years) - 1`. A non-positive multiple is a total loss (-100%).
pub fn annualised_return(multiple: Multiple, years: u32) -> FundModelResult<Rate> {
    if years == 0 {
        return Err(FundModelError::DivisionByZero {
            context: "annualised return over zero years".into(),
        });
    }
    if multiple <= Decimal::ZERO {
        return Ok(dec!(-1));
    }

    let exponent = Decimal::ONE / Decimal::from(years);
    let growth = multiple
        .checked_powd(exponent)
        .ok_or_else(|| FundModelError::ConvergenceFailure {
            function: "annualised return".into(),
            iterations: 0,
            last_delta: multiple,
        })?;
    Ok(growth - Decimal::ONE)
}
