//! Column layout of the credit dataset and small frame access helpers

use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const AGE: &str = "Age";
pub const ANNUAL_INCOME: &str = "Annual_Income";
pub const NUM_BANK_ACCOUNTS: &str = "Num_Bank_Accounts";
pub const NUM_CREDIT_CARD: &str = "Num_Credit_Card";
pub const OUTSTANDING_DEBT: &str = "Outstanding_Debt";
pub const MONTHLY_INHAND_SALARY: &str = "Monthly_Inhand_Salary";
pub const MONTHLY_BALANCE: &str = "Monthly_Balance";
pub const OCCUPATION: &str = "Occupation";

/// Derived ratio columns, appended in this order
pub const DTI_RATIO: &str = "DTI_Ratio";
pub const UTILIZATION_PROXY: &str = "Utilization_Proxy";
pub const INCOME_STABILITY: &str = "Income_Stability";

/// Label column of the training data
pub const TARGET_COLUMN: &str = "Credit_Score";

/// Numeric fields that arrive as text polluted with stray characters (e.g. `"23_"`)
pub const DIRTY_NUMERIC_COLUMNS: [&str; 15] = [
    AGE,
    ANNUAL_INCOME,
    "Num_of_Loan",
    NUM_BANK_ACCOUNTS,
    NUM_CREDIT_CARD,
    "Interest_Rate",
    "Delay_from_due_date",
    "Num_of_Delayed_Payment",
    "Changed_Credit_Limit",
    "Num_Credit_Inquiries",
    OUTSTANDING_DEBT,
    MONTHLY_INHAND_SALARY,
    "Total_EMI_per_month",
    "Amount_invested_monthly",
    MONTHLY_BALANCE,
];

pub const CATEGORICAL_COLUMNS: [&str; 4] = [
    OCCUPATION,
    "Credit_Mix",
    "Payment_of_Min_Amount",
    "Payment_Behaviour",
];

/// Identifier and free-text columns that carry no signal
pub const DROP_COLUMNS: [&str; 7] = [
    "ID",
    "Customer_ID",
    "Name",
    "SSN",
    "Month",
    "Type_of_Loan",
    "Credit_History_Age",
];

/// Which columns play which role in the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Columns run through the numeric cleaner
    pub dirty_numeric: Vec<String>,
    /// Columns handed to the ordinal encoder
    pub categorical: Vec<String>,
    /// Columns removed before training
    pub dropped: Vec<String>,
    /// Label column
    pub target: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            dirty_numeric: DIRTY_NUMERIC_COLUMNS.iter().map(|s| s.to_string()).collect(),
            categorical: CATEGORICAL_COLUMNS.iter().map(|s| s.to_string()).collect(),
            dropped: DROP_COLUMNS.iter().map(|s| s.to_string()).collect(),
            target: TARGET_COLUMN.to_string(),
        }
    }
}

/// Whether the frame has a column with this name
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Read a column as `Float64`, nulls preserved. Non-numeric text becomes null.
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let cast = df.column(name)?.cast(&DataType::Float64)?;
    let values = cast.f64()?.into_iter().collect();
    Ok(values)
}

/// Read a column as text, nulls preserved
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let cast = df.column(name)?.cast(&DataType::String)?;
    let values = cast
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

/// Replace a column in place (keeping its position) or append it when new
pub fn put_float_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

/// Keep only the rows at `indices`, in that order
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}
