pub mod assumptions;
pub mod categories;
pub mod config;
pub mod request;

pub use assumptions::{CashFlowAssumptions, ModelAssumptions, RevenueShareTerms, RevenueShareTiming};
pub use categories::{CategoryKind, CategoryOverride, InvestmentCategory, ReturnStrategy};
pub use config::{FundConfig, FundConfigBuilder};
pub use request::{DefaultParameters, FundModelRequest};
