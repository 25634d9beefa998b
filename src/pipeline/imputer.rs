//! Grouped median imputation
//!
//! Missing `Monthly_Balance` values are filled with the median balance of the
//! applicant's occupation. Unseen occupations, missing occupations and groups
//! that had no observed balance at fit time fall back to the global median.

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::columns::{
    float_values, has_column, put_float_column, string_values, MONTHLY_BALANCE, OCCUPATION,
};
use super::stats::median;

/// Global fallback used when the fit batch lacked the target or group column
pub const DEFAULT_GLOBAL_MEDIAN: f64 = 0.0;

/// Which numeric column to fill, grouped by which categorical column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedImputer {
    pub target: String,
    pub group_by: String,
}

impl Default for GroupedImputer {
    fn default() -> Self {
        Self {
            target: MONTHLY_BALANCE.to_string(),
            group_by: OCCUPATION.to_string(),
        }
    }
}

impl GroupedImputer {
    /// Learn global and per-group medians of the target column.
    pub(crate) fn fit(&self, df: &DataFrame) -> Result<FittedGroupedImputer> {
        let mut fitted = FittedGroupedImputer {
            target: self.target.clone(),
            group_by: self.group_by.clone(),
            global_median: Some(DEFAULT_GLOBAL_MEDIAN),
            group_medians: BTreeMap::new(),
        };

        if !has_column(df, &self.target) || !has_column(df, &self.group_by) {
            return Ok(fitted);
        }

        let values = float_values(df, &self.target)?;
        let groups = string_values(df, &self.group_by)?;

        fitted.global_median = median(values.iter().copied());

        // Rows with a null group do not form a group of their own
        let mut grouped: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
        for (value, group) in values.into_iter().zip(groups) {
            if let Some(g) = group {
                grouped.entry(g).or_default().push(value);
            }
        }

        fitted.group_medians = grouped
            .into_iter()
            .map(|(group, members)| (group, median(members)))
            .collect();

        let empty_groups = fitted.group_medians.values().filter(|m| m.is_none()).count();
        if empty_groups > 0 {
            log::info!(
                "{} '{}' group(s) have no observed '{}'; they will use the global median",
                empty_groups,
                self.group_by,
                self.target
            );
        }

        Ok(fitted)
    }
}

/// Grouped imputer with its learned medians
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedGroupedImputer {
    target: String,
    group_by: String,
    /// `None` only when every target value in the fit batch was missing
    global_median: Option<f64>,
    /// `None` for groups with no observed target value
    group_medians: BTreeMap<String, Option<f64>>,
}

impl FittedGroupedImputer {
    pub fn global_median(&self) -> Option<f64> {
        self.global_median
    }

    pub fn group_median(&self, group: &str) -> Option<f64> {
        self.group_medians.get(group).copied().flatten()
    }

    pub fn group_medians(&self) -> &BTreeMap<String, Option<f64>> {
        &self.group_medians
    }

    /// Value used to fill a missing target for a row in `group`
    pub fn fill_value(&self, group: Option<&str>) -> Option<f64> {
        group
            .and_then(|g| self.group_median(g))
            .or(self.global_median)
    }

    /// Fill missing target values. A no-op when either column is absent.
    pub(crate) fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !has_column(df, &self.target) || !has_column(df, &self.group_by) {
            return Ok(df.clone());
        }

        let values = float_values(df, &self.target)?;
        let groups = string_values(df, &self.group_by)?;

        let filled = values
            .into_iter()
            .zip(groups)
            .map(|(value, group)| value.or_else(|| self.fill_value(group.as_deref())))
            .collect();

        let mut out = df.clone();
        put_float_column(&mut out, &self.target, filled)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn training_frame() -> DataFrame {
        df! {
            "Occupation" => [Some("Engineer"), Some("Engineer"), Some("Engineer"), Some("Lawyer"), Some("Lawyer"), Some("Writer"), None],
            "Monthly_Balance" => [Some(100.0f64), Some(200.0), Some(300.0), Some(1000.0), None, None, Some(50.0)],
        }
        .unwrap()
    }

    #[test]
    fn test_fit_learns_group_and_global_medians() {
        let fitted = GroupedImputer::default().fit(&training_frame()).unwrap();

        assert_eq!(fitted.global_median(), Some(200.0));
        assert_eq!(fitted.group_median("Engineer"), Some(200.0));
        assert_eq!(fitted.group_median("Lawyer"), Some(1000.0));
        assert_eq!(fitted.group_median("Writer"), None);
        assert!(fitted.group_medians().contains_key("Writer"));
        assert_eq!(fitted.group_medians().len(), 3);
    }

    #[test]
    fn test_transform_fills_with_fallbacks() {
        let fitted = GroupedImputer::default().fit(&training_frame()).unwrap();

        let df = df! {
            "Occupation" => [Some("Engineer"), Some("Lawyer"), Some("Writer"), Some("Astronaut"), None, Some("Engineer")],
            "Monthly_Balance" => [None, None, None, None, None, Some(42.0f64)],
        }
        .unwrap();
        let out = fitted.transform(&df).unwrap();

        assert_eq!(
            float_values(&out, "Monthly_Balance").unwrap(),
            vec![Some(200.0), Some(1000.0), Some(200.0), Some(200.0), Some(200.0), Some(42.0)]
        );
    }

    #[test]
    fn test_noop_when_columns_absent() {
        let fitted = GroupedImputer::default().fit(&training_frame()).unwrap();
        let df = df! { "Monthly_Balance" => [None::<f64>, Some(1.0)] }.unwrap();
        let out = fitted.transform(&df).unwrap();
        assert!(out.equals_missing(&df));
    }

    #[test]
    fn test_fit_without_columns_keeps_default() {
        let df = df! { "Age" => [30.0f64] }.unwrap();
        let fitted = GroupedImputer::default().fit(&df).unwrap();
        assert_eq!(fitted.global_median(), Some(DEFAULT_GLOBAL_MEDIAN));
        assert!(fitted.group_medians().is_empty());
    }

    #[test]
    fn test_all_missing_target_leaves_rows_missing() {
        let df = df! {
            "Occupation" => ["Engineer", "Lawyer"],
            "Monthly_Balance" => [None::<f64>, None],
        }
        .unwrap();
        let fitted = GroupedImputer::default().fit(&df).unwrap();
        assert_eq!(fitted.global_median(), None);

        let out = fitted.transform(&df).unwrap();
        assert_eq!(float_values(&out, "Monthly_Balance").unwrap(), vec![None, None]);
    }
}
