use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::FundModelError;
use crate::FundModelResult;

/// All monetary values, in fund currency units (typically $M).
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Multiples (e.g., 3.1x MOIC)
pub type Multiple = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Sum of `values`, reporting overflow as an error rather than panicking.
pub(crate) fn checked_sum(
    values: impl IntoIterator<Item = Decimal>,
    context: &str,
) -> FundModelResult<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v).ok_or_else(|| FundModelError::overflow(context))
    })
}

/// Product of `a` and `b`, reporting overflow as an error.
pub(crate) fn checked_product(a: Decimal, b: Decimal, context: &str) -> FundModelResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| FundModelError::overflow(context))
}
