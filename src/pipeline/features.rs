//! Financial ratio features
//!
//! Every ratio divides by `x + 1.0` so a zero income or zero card count can
//! never produce an infinite value.

use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::columns::{
    float_values, has_column, put_float_column, ANNUAL_INCOME, DTI_RATIO, INCOME_STABILITY,
    MONTHLY_INHAND_SALARY, NUM_CREDIT_CARD, OUTSTANDING_DEBT, UTILIZATION_PROXY,
};

/// Assumed credit limit per card when the real limit is unknown
pub const PROXY_LIMIT_PER_CARD: f64 = 5000.0;

/// Added to every denominator
const DENOMINATOR_OFFSET: f64 = 1.0;

/// Ratio inputs, coerced to numbers with missing values read as zero
const RATIO_INPUTS: [&str; 4] = [
    ANNUAL_INCOME,
    OUTSTANDING_DEBT,
    NUM_CREDIT_CARD,
    MONTHLY_INHAND_SALARY,
];

/// Derives `DTI_Ratio`, `Utilization_Proxy` and `Income_Stability`. Learns nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatioFeatureEngineer;

impl RatioFeatureEngineer {
    pub(crate) fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();

        for name in RATIO_INPUTS {
            if has_column(&out, name) {
                let zero_filled = float_values(&out, name)?
                    .into_iter()
                    .map(|v| Some(v.filter(|x| !x.is_nan()).unwrap_or(0.0)))
                    .collect();
                put_float_column(&mut out, name, zero_filled)?;
            }
        }

        let income = dense_values(&out, ANNUAL_INCOME)?;
        let debt = dense_values(&out, OUTSTANDING_DEBT)?;
        let cards = dense_values(&out, NUM_CREDIT_CARD)?;
        let salary = dense_values(&out, MONTHLY_INHAND_SALARY)?;

        if let (Some(debt), Some(income)) = (&debt, &income) {
            let ratio = debt
                .iter()
                .zip(income)
                .map(|(d, i)| Some(dti_ratio(*d, *i)))
                .collect();
            put_float_column(&mut out, DTI_RATIO, ratio)?;
        }

        if let (Some(debt), Some(cards)) = (&debt, &cards) {
            let ratio = debt
                .iter()
                .zip(cards)
                .map(|(d, c)| Some(utilization_proxy(*d, *c)))
                .collect();
            put_float_column(&mut out, UTILIZATION_PROXY, ratio)?;
        }

        if let (Some(income), Some(salary)) = (&income, &salary) {
            let ratio = income
                .iter()
                .zip(salary)
                .map(|(i, s)| Some(income_stability(*i, *s)))
                .collect();
            put_float_column(&mut out, INCOME_STABILITY, ratio)?;
        }

        Ok(out)
    }
}

/// Outstanding debt relative to annual income
pub fn dti_ratio(debt: f64, annual_income: f64) -> f64 {
    debt / (annual_income + DENOMINATOR_OFFSET)
}

/// Outstanding debt relative to an assumed total card limit
pub fn utilization_proxy(debt: f64, num_credit_cards: f64) -> f64 {
    debt / (num_credit_cards * PROXY_LIMIT_PER_CARD + DENOMINATOR_OFFSET)
}

/// Disagreement between reported annual income and twelve monthly salaries.
/// Near zero for consistent records; large values flag a likely data error.
pub fn income_stability(annual_income: f64, monthly_salary: f64) -> f64 {
    (annual_income - monthly_salary * 12.0).abs() / (annual_income + DENOMINATOR_OFFSET)
}

/// Zero-filled values of a column, or `None` when the column is absent
fn dense_values(df: &DataFrame, name: &str) -> Result<Option<Vec<f64>>> {
    if !has_column(df, name) {
        return Ok(None);
    }
    let values = float_values(df, name)?
        .into_iter()
        .map(|v| v.unwrap_or(0.0))
        .collect();
    Ok(Some(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratios_on_known_values() {
        let df = df! {
            "Annual_Income" => [65000.0f64],
            "Monthly_Inhand_Salary" => [4500.0f64],
            "Num_Credit_Card" => [3.0f64],
            "Outstanding_Debt" => [800.0f64],
        }
        .unwrap();

        let out = RatioFeatureEngineer.transform(&df).unwrap();

        let dti = float_values(&out, DTI_RATIO).unwrap()[0].unwrap();
        let util = float_values(&out, UTILIZATION_PROXY).unwrap()[0].unwrap();
        let stability = float_values(&out, INCOME_STABILITY).unwrap()[0].unwrap();

        assert!((dti - 800.0 / 65001.0).abs() < 1e-12);
        assert!((util - 800.0 / 15001.0).abs() < 1e-12);
        assert!((stability - 11000.0 / 65001.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_denominators_stay_finite() {
        assert_eq!(dti_ratio(500.0, 0.0), 500.0);
        assert_eq!(utilization_proxy(500.0, 0.0), 500.0);
        assert_eq!(income_stability(0.0, 100.0), 1200.0);
    }

    #[test]
    fn test_missing_inputs_read_as_zero() {
        let df = df! {
            "Annual_Income" => [None::<f64>, Some(999.0)],
            "Outstanding_Debt" => [Some(100.0f64), None],
        }
        .unwrap();

        let out = RatioFeatureEngineer.transform(&df).unwrap();
        assert_eq!(float_values(&out, ANNUAL_INCOME).unwrap(), vec![Some(0.0), Some(999.0)]);
        assert_eq!(float_values(&out, DTI_RATIO).unwrap(), vec![Some(100.0), Some(0.0)]);
    }

    #[test]
    fn test_absent_inputs_skip_only_their_ratio() {
        let df = df! {
            "Annual_Income" => [1000.0f64],
            "Outstanding_Debt" => [100.0f64],
        }
        .unwrap();

        let out = RatioFeatureEngineer.transform(&df).unwrap();
        assert!(has_column(&out, DTI_RATIO));
        assert!(!has_column(&out, UTILIZATION_PROXY));
        assert!(!has_column(&out, INCOME_STABILITY));
    }

    #[test]
    fn test_ratios_appended_in_order() {
        let df = df! {
            "Outstanding_Debt" => [1.0f64],
            "Num_Credit_Card" => [1.0f64],
            "Annual_Income" => [1.0f64],
            "Monthly_Inhand_Salary" => [1.0f64],
        }
        .unwrap();

        let out = RatioFeatureEngineer.transform(&df).unwrap();
        let names: Vec<String> = out.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(&names[4..], &[DTI_RATIO, UTILIZATION_PROXY, INCOME_STABILITY]);
    }

    #[test]
    fn test_rerun_overwrites_with_same_values() {
        let df = df! {
            "Annual_Income" => [50000.0f64],
            "Outstanding_Debt" => [2500.0f64],
        }
        .unwrap();

        let once = RatioFeatureEngineer.transform(&df).unwrap();
        let twice = RatioFeatureEngineer.transform(&once).unwrap();
        assert!(once.equals_missing(&twice));
    }
}
