use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FundModelError {
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Allocation mismatch: categories allocate {allocated} but total deployable is {deployable}")]
    AllocationMismatch {
        allocated: Decimal,
        deployable: Decimal,
    },

    #[error("Probability mismatch: outcome model '{model}' probabilities sum to {total}, expected 1")]
    ProbabilityMismatch { model: String, total: Decimal },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },
}

impl FundModelError {
    pub(crate) fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FundModelError::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        FundModelError::ArithmeticOverflow {
            context: context.into(),
        }
    }
}
