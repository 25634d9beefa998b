//! Numeric cleaning of string-polluted columns
//!
//! Raw credit exports store many numbers as text with stray formatting
//! characters (`"23_"`, `"1000.00_"`, `"__-500"`). The cleaner keeps only
//! digits, dots and minus signs and parses what is left. Anything that still
//! fails to parse becomes null rather than an error.

use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::columns::{has_column, put_float_column};

/// Strips non-numeric characters from the configured columns. Learns nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericCleaner {
    columns: Vec<String>,
}

impl NumericCleaner {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Columns this cleaner rewrites (when present in a batch)
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rewrite every configured column present in `df` as `Float64`.
    ///
    /// Columns that are missing from the batch are skipped. Columns that are
    /// already numeric are cast directly; non-finite values become null, the
    /// same outcome the text path gives for `"nan"` and `"inf"`.
    pub(crate) fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();

        for name in &self.columns {
            if !has_column(df, name) {
                continue;
            }
            let column = df.column(name)?;

            let cleaned: Vec<Option<f64>> = if column.dtype().is_primitive_numeric() {
                let cast = column.cast(&DataType::Float64)?;
                cast.f64()?
                    .into_iter()
                    .map(|v| v.filter(|x| x.is_finite()))
                    .collect()
            } else {
                let text = column.cast(&DataType::String)?;
                text.str()?
                    .into_iter()
                    .map(|v| v.and_then(parse_dirty_number))
                    .collect()
            };

            let invalid = cleaned
                .iter()
                .filter(|v| v.is_none())
                .count()
                .saturating_sub(column.null_count());
            if invalid > 0 {
                log::debug!("Column '{}': {} value(s) could not be parsed, set to null", name, invalid);
            }

            put_float_column(&mut out, name, cleaned)?;
        }

        Ok(out)
    }
}

/// Parse a polluted numeric string.
///
/// Every character other than an ASCII digit, `.` or `-` is removed. An empty
/// remainder or one that is not a valid float (`"1.2.3"`, `"5-"`) yields `None`.
pub fn parse_dirty_number(raw: &str) -> Option<f64> {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if kept.is_empty() {
        return None;
    }

    kept.parse::<f64>().ok()
}
