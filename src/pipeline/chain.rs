//! The ordered cleaning chain
//!
//! Stages only run through this type: clean → cap → impute → engineer. Each
//! stage relies on the previous one (the capper needs numeric ages, the imputer
//! needs capped values), so the order is fixed here rather than left to callers.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::cleaning::NumericCleaner;
use super::columns::ColumnConfig;
use super::features::RatioFeatureEngineer;
use super::imputer::{FittedGroupedImputer, GroupedImputer};
use super::outliers::{FittedOutlierCapper, OutlierCapper};

/// Unfitted chain configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TransformChain {
    cleaner: NumericCleaner,
    capper: OutlierCapper,
    imputer: GroupedImputer,
    engineer: RatioFeatureEngineer,
}

impl Default for TransformChain {
    fn default() -> Self {
        Self::new(&ColumnConfig::default())
    }
}

impl TransformChain {
    pub fn new(columns: &ColumnConfig) -> Self {
        Self {
            cleaner: NumericCleaner::new(columns.dirty_numeric.clone()),
            capper: OutlierCapper::default(),
            imputer: GroupedImputer::default(),
            engineer: RatioFeatureEngineer,
        }
    }

    /// Fit every stage on the output of the stages before it
    pub fn fit(&self, df: &DataFrame) -> Result<FittedChain> {
        self.fit_transform(df).map(|(fitted, _)| fitted)
    }

    /// Fit the chain and return the transformed training batch alongside it
    pub fn fit_transform(&self, df: &DataFrame) -> Result<(FittedChain, DataFrame)> {
        let cleaned = self
            .cleaner
            .transform(df)
            .context("Numeric cleaning failed")?;

        let capper = self.capper.fit(&cleaned).context("Fitting outlier capper failed")?;
        let capped = capper.transform(&cleaned).context("Outlier capping failed")?;

        let imputer = self.imputer.fit(&capped).context("Fitting imputer failed")?;
        let imputed = imputer.transform(&capped).context("Imputation failed")?;

        let engineered = self
            .engineer
            .transform(&imputed)
            .context("Feature engineering failed")?;

        let fitted = FittedChain {
            cleaner: self.cleaner.clone(),
            capper,
            imputer,
            engineer: self.engineer,
        };

        Ok((fitted, engineered))
    }
}

/// Chain with all learned statistics; immutable after fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedChain {
    cleaner: NumericCleaner,
    capper: FittedOutlierCapper,
    imputer: FittedGroupedImputer,
    engineer: RatioFeatureEngineer,
}

impl FittedChain {
    /// Apply all four stages in order. Does not modify `df`.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let cleaned = self
            .cleaner
            .transform(df)
            .context("Numeric cleaning failed")?;
        let capped = self.capper.transform(&cleaned).context("Outlier capping failed")?;
        let imputed = self.imputer.transform(&capped).context("Imputation failed")?;
        self.engineer
            .transform(&imputed)
            .context("Feature engineering failed")
    }

    pub fn capper(&self) -> &FittedOutlierCapper {
        &self.capper
    }

    pub fn imputer(&self) -> &FittedGroupedImputer {
        &self.imputer
    }
}
