//! Column-major numeric feature matrix fed to the classifier

use anyhow::{Context, Result};
use polars::prelude::*;

/// Dense features, one `Vec` per column. Missing values are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<Vec<f64>>,
    pub rows: usize,
}

impl FeatureMatrix {
    /// Select `names` from `df` in that order. Every column must exist and be numeric.
    pub fn from_frame(df: &DataFrame, names: &[String]) -> Result<Self> {
        let mut columns = Vec::with_capacity(names.len());

        for name in names {
            let column = df
                .column(name)
                .with_context(|| format!("Feature column '{}' missing from input", name))?;

            if !column.dtype().is_primitive_numeric() {
                anyhow::bail!(
                    "Feature column '{}' has non-numeric type {} after cleaning",
                    name,
                    column.dtype()
                );
            }

            let cast = column.cast(&DataType::Float64)?;
            let values: Vec<f64> = cast
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect();
            columns.push(values);
        }

        Ok(Self {
            columns,
            rows: df.height(),
        })
    }

    pub fn feature_count(&self) -> usize {
        self.columns.len()
    }

    /// One row's features in column order
    pub fn row(&self, idx: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[idx]).collect()
    }
}
