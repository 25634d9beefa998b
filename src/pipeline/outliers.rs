//! Capping of physically impossible values
//!
//! Age outside the adult range is almost always a data-entry error, so it is
//! replaced by the median of the plausible ages seen at fit time. Bank account
//! counts are hard-capped to a conservative consumer range.

use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::columns::{float_values, has_column, put_float_column, AGE, NUM_BANK_ACCOUNTS};
use super::stats::median;

/// Youngest plausible applicant age (inclusive)
pub const AGE_MIN: f64 = 18.0;

/// Oldest plausible applicant age (inclusive)
pub const AGE_MAX: f64 = 100.0;

/// Upper bound on the number of bank accounts
pub const MAX_BANK_ACCOUNTS: f64 = 20.0;

/// Replacement age when the fit batch has no in-range ages
pub const DEFAULT_MEDIAN_AGE: f64 = 30.0;

/// Bounds used by the capper before it has seen any data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierCapper {
    pub age_min: f64,
    pub age_max: f64,
    pub max_bank_accounts: f64,
    pub default_median_age: f64,
}

impl Default for OutlierCapper {
    fn default() -> Self {
        Self {
            age_min: AGE_MIN,
            age_max: AGE_MAX,
            max_bank_accounts: MAX_BANK_ACCOUNTS,
            default_median_age: DEFAULT_MEDIAN_AGE,
        }
    }
}

impl OutlierCapper {
    /// Learn the median of in-range ages. Expects `Age` to be numeric already.
    pub(crate) fn fit(&self, df: &DataFrame) -> Result<FittedOutlierCapper> {
        let mut median_age = self.default_median_age;

        if has_column(df, AGE) {
            let in_range = float_values(df, AGE)?
                .into_iter()
                .filter(|age| matches!(age, Some(a) if *a >= self.age_min && *a <= self.age_max));

            match median(in_range) {
                Some(m) => median_age = m,
                None => log::warn!(
                    "No ages within [{}, {}]; using default median age {}",
                    self.age_min,
                    self.age_max,
                    self.default_median_age
                ),
            }
        }

        Ok(FittedOutlierCapper {
            bounds: *self,
            median_age,
        })
    }
}

/// Outlier capper with its learned median age
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedOutlierCapper {
    bounds: OutlierCapper,
    median_age: f64,
}

impl FittedOutlierCapper {
    pub fn median_age(&self) -> f64 {
        self.median_age
    }

    /// Replace out-of-range ages and clamp bank account counts.
    ///
    /// A null age is not out of range and stays null.
    pub(crate) fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();
        let b = &self.bounds;

        if has_column(df, AGE) {
            let ages = float_values(df, AGE)?
                .into_iter()
                .map(|age| {
                    age.map(|a| {
                        if a < b.age_min || a > b.age_max {
                            self.median_age
                        } else {
                            a
                        }
                    })
                })
                .collect();
            put_float_column(&mut out, AGE, ages)?;
        }

        if has_column(df, NUM_BANK_ACCOUNTS) {
            let accounts = float_values(df, NUM_BANK_ACCOUNTS)?
                .into_iter()
                .map(|count| {
                    count.map(|c| {
                        if c > b.max_bank_accounts {
                            b.max_bank_accounts
                        } else if c < 0.0 {
                            0.0
                        } else {
                            c
                        }
                    })
                })
                .collect();
            put_float_column(&mut out, NUM_BANK_ACCOUNTS, accounts)?;
        }

        Ok(out)
    }
}
