//! Deterministic power-law outcome model for early-stage equity.
//!
//! A model is a fixed set of mutually exclusive outcome buckets, each with a
//! probability and a return multiple. Expected returns are probability
//! weighted; nothing is sampled.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FundModelError;
use crate::types::{checked_product, checked_sum, Money, Multiple, Rate};
use crate::FundModelResult;

/// Bucket probabilities may drift from 1 by at most this much.
const PROBABILITY_TOLERANCE: Decimal = dec!(0.000001);

/// One outcome bucket (e.g. "home_run").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeBucket {
    pub name: String,
    /// Share of companies (and capital) landing in this bucket
    pub probability: Rate,
    /// Return multiple on capital in this bucket
    pub multiple: Multiple,
}

/// A named set of outcome buckets whose probabilities sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeModel {
    pub name: String,
    pub buckets: Vec<OutcomeBucket>,
}

/// Expected result for a single bucket of a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeBreakdown {
    pub outcome: String,
    /// Expected number of companies in the bucket
    pub companies: Decimal,
    /// Expected capital in the bucket
    pub capital: Money,
    /// Expected return from the bucket
    #[serde(rename = "return")]
    pub expected_return: Money,
    pub multiple: Multiple,
}

fn bucket(name: &str, probability: Rate, multiple: Multiple) -> OutcomeBucket {
    OutcomeBucket {
        name: name.to_string(),
        probability,
        multiple,
    }
}

impl OutcomeModel {
    /// Seed-stage distribution: fatter right tail.
    pub fn seed() -> Self {
        OutcomeModel {
            name: "seed".into(),
            buckets: vec![
                bucket("home_run", dec!(0.10), dec!(50)),
                bucket("winners", dec!(0.20), dec!(10)),
                bucket("moderate", dec!(0.30), dec!(3)),
                bucket("return_capital", dec!(0.20), dec!(1)),
                bucket("write_off", dec!(0.20), dec!(0)),
            ],
        }
    }

    /// Series A distribution.
    pub fn series_a() -> Self {
        OutcomeModel {
            name: "series_a".into(),
            buckets: vec![
                bucket("home_run", dec!(0.10), dec!(30)),
                bucket("winners", dec!(0.20), dec!(8)),
                bucket("moderate", dec!(0.30), dec!(3)),
                bucket("return_capital", dec!(0.20), dec!(1)),
                bucket("write_off", dec!(0.20), dec!(0)),
            ],
        }
    }

    pub fn total_probability(&self) -> Decimal {
        self.buckets.iter().map(|b| b.probability).sum()
    }

    /// Probability-weighted multiple across all buckets.
    pub fn expected_multiple(&self) -> FundModelResult<Multiple> {
        let context = format!("expected multiple of {}", self.name);
        let weighted = self
            .buckets
            .iter()
            .map(|b| checked_product(b.probability, b.multiple, &context))
            .collect::<FundModelResult<Vec<_>>>()?;
        checked_sum(weighted, &context)
    }

    pub fn validate(&self) -> FundModelResult<()> {
        if self.buckets.is_empty() {
            return Err(FundModelError::config(
                format!("power_law.{}", self.name),
                "Outcome model needs at least one bucket",
            ));
        }
        for b in &self.buckets {
            if b.probability < Decimal::ZERO || b.probability > Decimal::ONE {
                return Err(FundModelError::config(
                    format!("power_law.{}.{}.probability", self.name, b.name),
                    "Probability must be in [0, 1]",
                ));
            }
            if b.multiple < Decimal::ZERO {
                return Err(FundModelError::config(
                    format!("power_law.{}.{}.multiple", self.name, b.name),
                    "Multiple cannot be negative",
                ));
            }
        }
        let total = self.total_probability();
        if (total - Decimal::ONE).abs() > PROBABILITY_TOLERANCE {
            return Err(FundModelError::ProbabilityMismatch {
                model: self.name.clone(),
                total,
            });
        }
        Ok(())
    }

    /// Spread `count` companies and `invested` capital across the buckets.
    pub fn breakdown(&self, count: u32, invested: Money) -> FundModelResult<Vec<OutcomeBreakdown>> {
        let count = Decimal::from(count);
        self.buckets
            .iter()
            .map(|b| {
                let context = format!("{} outcome {}", self.name, b.name);
                let capital = checked_product(invested, b.probability, &context)?;
                Ok(OutcomeBreakdown {
                    outcome: b.name.clone(),
                    companies: checked_product(count, b.probability, &context)?,
                    capital,
                    expected_return: checked_product(capital, b.multiple, &context)?,
                    multiple: b.multiple,
                })
            })
            .collect()
    }
}

/// The two fixed equity outcome models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerLawModels {
    pub seed: OutcomeModel,
    pub series_a: OutcomeModel,
}

impl Default for PowerLawModels {
    fn default() -> Self {
        PowerLawModels {
            seed: OutcomeModel::seed(),
            series_a: OutcomeModel::series_a(),
        }
    }
}

impl PowerLawModels {
    pub fn validate(&self) -> FundModelResult<()> {
        self.seed.validate()?;
        self.series_a.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models_are_valid() {
        PowerLawModels::default().validate().unwrap();
        assert_eq!(OutcomeModel::seed().total_probability(), Decimal::ONE);
    }

    #[test]
    fn test_expected_multiples() {
        // 0.1*50 + 0.2*10 + 0.3*3 + 0.2*1 = 8.1
        assert_eq!(OutcomeModel::seed().expected_multiple().unwrap(), dec!(8.1));
        // 0.1*30 + 0.2*8 + 0.3*3 + 0.2*1 = 5.7
        assert_eq!(OutcomeModel::series_a().expected_multiple().unwrap(), dec!(5.7));
    }

    #[test]
    fn test_probability_mismatch_is_named() {
        let mut model = OutcomeModel::seed();
        model.buckets[0].probability = dec!(0.15);
        match model.validate().unwrap_err() {
            FundModelError::ProbabilityMismatch { model, total } => {
                assert_eq!(model, "seed");
                assert_eq!(total, dec!(1.05));
            }
            other => panic!("Expected ProbabilityMismatch, got: {other:?}"),
        }
    }

    #[test]
    fn test_negative_multiple_rejected() {
        let mut model = OutcomeModel::series_a();
        model.buckets[4].multiple = dec!(-1);
        assert!(matches!(
            model.validate(),
            Err(FundModelError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_breakdown_scales_count_and_capital() {
        let rows = OutcomeModel::seed().breakdown(10, dec!(15)).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].outcome, "home_run");
        assert_eq!(rows[0].companies, dec!(1.0));
        assert_eq!(rows[0].capital, dec!(1.5));
        assert_eq!(rows[0].expected_return, dec!(75));
        let capital: Decimal = rows.iter().map(|r| r.capital).sum();
        assert_eq!(capital, dec!(15));
    }

    #[test]
    fn test_oversized_multiple_reports_overflow() {
        let mut model = OutcomeModel::seed();
        model.buckets[0].multiple = Decimal::MAX;
        assert!(matches!(
            model.breakdown(10, dec!(15)),
            Err(FundModelError::ArithmeticOverflow { .. })
        ));
    }
}
