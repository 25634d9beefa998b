//! Target column mapping
//!
//! Credit score labels are mapped to fixed class codes
//! (`Good` → 0, `Standard` → 1, `Poor` → 2). Rows whose label does not map
//! are excluded from training.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One of the three credit score classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CreditClass {
    Good,
    Standard,
    Poor,
}

impl CreditClass {
    /// All classes in code order
    pub const ALL: [CreditClass; 3] = [CreditClass::Good, CreditClass::Standard, CreditClass::Poor];

    pub fn code(self) -> usize {
        match self {
            CreditClass::Good => 0,
            CreditClass::Standard => 1,
            CreditClass::Poor => 2,
        }
    }

    pub fn from_code(code: usize) -> Option<Self> {
        Self::ALL.get(code).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            CreditClass::Good => "Good",
            CreditClass::Standard => "Standard",
            CreditClass::Poor => "Poor",
        }
    }

    pub fn risk_tier(self) -> RiskTier {
        match self {
            CreditClass::Good => RiskTier::Low,
            CreditClass::Standard => RiskTier::Medium,
            CreditClass::Poor => RiskTier::High,
        }
    }
}

impl fmt::Display for CreditClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for CreditClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Good" => Ok(CreditClass::Good),
            "Standard" => Ok(CreditClass::Standard),
            "Poor" => Ok(CreditClass::Poor),
            _ => Err(format!(
                "Unknown credit score label: '{}'. Expected Good, Standard or Poor.",
                s
            )),
        }
    }
}

/// Coarse risk level derived from the predicted class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => write!(f, "Low"),
            RiskTier::Medium => write!(f, "Medium"),
            RiskTier::High => write!(f, "High"),
        }
    }
}

/// Map every row's label to a class. Unknown or null labels map to `None`.
pub fn map_labels(df: &DataFrame, target: &str) -> Result<Vec<Option<CreditClass>>> {
    let target_col = df
        .column(target)
        .with_context(|| format!("Target column '{}' not found", target))?;

    if target_col.len() == 0 {
        anyhow::bail!("Target column '{}' is empty", target);
    }

    let cast = target_col.cast(&DataType::String)?;
    let labels = cast
        .str()?
        .into_iter()
        .map(|v| v.and_then(|s| s.parse::<CreditClass>().ok()))
        .collect();

    Ok(labels)
}

/// Count rows per class, plus rows whose label did not map
pub fn count_mapped_records(labels: &[Option<CreditClass>]) -> ([usize; 3], usize) {
    let mut counts = [0usize; 3];
    let mut ignored = 0usize;

    for label in labels {
        match label {
            Some(class) => counts[class.code()] += 1,
            None => ignored += 1,
        }
    }

    (counts, ignored)
}
