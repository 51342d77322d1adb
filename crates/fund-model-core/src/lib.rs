//! Venture fund economics engine.
//!
//! Turns a [`fund::FundConfig`] into portfolio returns, a year-by-year
//! cash-flow schedule, LP (net) returns and a return-scenario sensitivity
//! table. Every calculation is a pure function of the configuration.

pub mod error;
pub mod fund;
pub mod report;
pub mod returns;
pub mod time_value;
pub mod types;
pub mod waterfall;

pub use error::FundModelError;
pub use fund::{CategoryKind, FundConfig, FundConfigBuilder};
pub use types::*;

/// Standard result type for all fund-model operations
pub type FundModelResult<T> = Result<T, FundModelError>;
