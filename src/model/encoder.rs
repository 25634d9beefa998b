//! Ordinal encoding of categorical columns
//!
//! Categories seen at fit time get codes `0..n` in sorted order. Categories
//! never seen at fit time, and nulls, encode as `-1`.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::pipeline::columns::{has_column, put_float_column, string_values};

/// Code assigned to categories not seen during fit
pub const UNKNOWN_CODE: f64 = -1.0;

/// Categories learned for one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCategories {
    pub column: String,
    /// Sorted; a category's index is its code
    pub categories: Vec<String>,
}

impl ColumnCategories {
    pub fn code(&self, value: Option<&str>) -> f64 {
        value
            .and_then(|v| self.categories.binary_search_by(|c| c.as_str().cmp(v)).ok())
            .map(|idx| idx as f64)
            .unwrap_or(UNKNOWN_CODE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalEncoder {
    columns: Vec<String>,
}

impl OrdinalEncoder {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Learn the category set of every configured column. All of them must exist.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedOrdinalEncoder> {
        let mut learned = Vec::with_capacity(self.columns.len());

        for column in &self.columns {
            let values = string_values(df, column)
                .with_context(|| format!("Categorical column '{}' not found", column))?;
            let categories: BTreeSet<String> = values.into_iter().flatten().collect();

            log::debug!("Column '{}': {} categories", column, categories.len());

            learned.push(ColumnCategories {
                column: column.clone(),
                categories: categories.into_iter().collect(),
            });
        }

        Ok(FittedOrdinalEncoder { columns: learned })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedOrdinalEncoder {
    columns: Vec<ColumnCategories>,
}

impl FittedOrdinalEncoder {
    pub fn columns(&self) -> &[ColumnCategories] {
        &self.columns
    }

    /// Replace every encoded column with its `Float64` codes
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();

        for learned in &self.columns {
            if !has_column(df, &learned.column) {
                anyhow::bail!("Categorical column '{}' missing from input", learned.column);
            }

            let values = string_values(df, &learned.column)?;
            let unknown = values
                .iter()
                .filter(|v| learned.code(v.as_deref()) == UNKNOWN_CODE)
                .count();
            if unknown > 0 {
                log::debug!(
                    "Column '{}': {} unseen or missing value(s) encoded as {}",
                    learned.column,
                    unknown,
                    UNKNOWN_CODE
                );
            }

            let codes = values
                .iter()
                .map(|v| Some(learned.code(v.as_deref())))
                .collect();
            put_float_column(&mut out, &learned.column, codes)?;
        }

        Ok(out)
    }
}
