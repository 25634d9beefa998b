//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

use credit_risk::model::{FittedPipeline, GbdtConfig};
use credit_risk::pipeline::runner::{prepare_training_frame, TrainConfig};
use credit_risk::pipeline::ColumnConfig;
use credit_risk::service::CreditApplication;

const OCCUPATIONS: [&str; 5] = ["Engineer", "Teacher", "Lawyer", "Doctor", "_______"];
const MIXES: [&str; 4] = ["Good", "Standard", "Bad", "_"];
const PAYMENT_BEHAVIOURS: [&str; 3] = [
    "High_spent_Small_value_payments",
    "Low_spent_Large_value_payments",
    "Low_spent_Small_value_payments",
];

/// Small raw frame with every kind of dirt the chain handles
///
/// - `Age`: polluted text, one under-age and one over-age value, one null
/// - `Num_Bank_Accounts`: one value far above the cap
/// - `Monthly_Balance`: nulls inside and outside known occupations
pub fn create_raw_frame() -> DataFrame {
    df! {
        "Age" => [Some("23"), Some("17"), Some("45_"), Some("101"), None, Some("35"), Some("18"), Some("100")],
        "Occupation" => [Some("Engineer"), Some("Engineer"), Some("Teacher"), Some("Teacher"), Some("Lawyer"), Some("Engineer"), None, Some("Teacher")],
        "Annual_Income" => ["19114.12", "34847.84_", "143162.64", "30689.89", "_", "50000", "60000", "70000"],
        "Monthly_Inhand_Salary" => [Some(1824.84f64), None, Some(12187.22), Some(2612.49), Some(3000.0), Some(4000.0), Some(5000.0), Some(6000.0)],
        "Num_Bank_Accounts" => [3i64, 1500, 1, 2, 4, 5, 6, -1],
        "Num_Credit_Card" => [4i64, 7, 5, 0, 3, 2, 1, 6],
        "Outstanding_Debt" => ["809.98", "605.03", "1303.01_", "632.46", "400", "500", "600", "700"],
        "Monthly_Balance" => [Some("312.49"), None, Some("1043.31"), None, None, Some("500.0"), None, Some("200.0")],
        "Credit_Mix" => ["Good", "Standard", "Bad", "_", "Good", "Good", "Standard", "Bad"],
    }
    .unwrap()
}

/// Synthetic raw credit dataset in the layout of the real export.
///
/// Labels follow debt load and payment delays so a classifier can learn them.
/// About 5% of numeric cells are polluted with `_`, a few ages are impossible,
/// some balances are missing and a handful of labels are unknown.
pub fn create_credit_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut ids = Vec::with_capacity(rows);
    let mut customer_ids = Vec::with_capacity(rows);
    let mut months = Vec::with_capacity(rows);
    let mut names = Vec::with_capacity(rows);
    let mut ages = Vec::with_capacity(rows);
    let mut ssns = Vec::with_capacity(rows);
    let mut occupations = Vec::with_capacity(rows);
    let mut incomes = Vec::with_capacity(rows);
    let mut salaries: Vec<Option<f64>> = Vec::with_capacity(rows);
    let mut bank_accounts = Vec::with_capacity(rows);
    let mut cards = Vec::with_capacity(rows);
    let mut interest = Vec::with_capacity(rows);
    let mut loans = Vec::with_capacity(rows);
    let mut loan_types = Vec::with_capacity(rows);
    let mut delays = Vec::with_capacity(rows);
    let mut delayed_payments = Vec::with_capacity(rows);
    let mut limit_changes = Vec::with_capacity(rows);
    let mut inquiries = Vec::with_capacity(rows);
    let mut mixes = Vec::with_capacity(rows);
    let mut debts = Vec::with_capacity(rows);
    let mut utilization = Vec::with_capacity(rows);
    let mut history = Vec::with_capacity(rows);
    let mut min_payments = Vec::with_capacity(rows);
    let mut emis = Vec::with_capacity(rows);
    let mut invested = Vec::with_capacity(rows);
    let mut behaviours = Vec::with_capacity(rows);
    let mut balances: Vec<Option<String>> = Vec::with_capacity(rows);
    let mut scores: Vec<Option<String>> = Vec::with_capacity(rows);

    for i in 0..rows {
        let risk: f64 = rng.gen();
        let income = 20_000.0 + rng.gen::<f64>() * 100_000.0;
        let debt = 100.0 + risk * 4_000.0 + rng.gen::<f64>() * 300.0;
        let delay = (risk * 40.0 + rng.gen::<f64>() * 5.0).round();
        let occupation = OCCUPATIONS[i % OCCUPATIONS.len()];

        ids.push(format!("0x{:x}", 0x1600 + i));
        customer_ids.push(format!("CUS_{:04}", i / 8));
        months.push(["January", "February", "March"][i % 3].to_string());
        names.push(format!("Applicant {}", i));
        let age = match i % 50 {
            7 => -500,
            13 => 8_698,
            _ => 20 + (i * 7 % 50) as i64,
        };
        ages.push(pollute(&mut rng, age.to_string()));
        ssns.push(format!("{:03}-{:02}-{:04}", i % 900, i % 90, i % 9000));
        occupations.push(occupation.to_string());
        incomes.push(pollute(&mut rng, format!("{:.2}", income)));
        salaries.push(if i % 10 == 3 { None } else { Some(income / 12.0) });
        bank_accounts.push(if i % 97 == 5 { 1_200i64 } else { (risk * 10.0) as i64 });
        cards.push(1 + (i % 7) as i64);
        interest.push((5.0 + risk * 25.0).round() as i64);
        loans.push(pollute(&mut rng, ((risk * 6.0) as i64).to_string()));
        loan_types.push("Auto Loan, Personal Loan".to_string());
        delays.push(delay as i64);
        delayed_payments.push(pollute(&mut rng, ((risk * 20.0) as i64).to_string()));
        limit_changes.push(if i % 40 == 0 {
            "_".to_string()
        } else {
            format!("{:.2}", rng.gen::<f64>() * 20.0)
        });
        inquiries.push((risk * 12.0).round());
        mixes.push(
            if risk < 0.33 {
                MIXES[0]
            } else if risk < 0.66 {
                MIXES[1]
            } else if i % 9 == 0 {
                MIXES[3]
            } else {
                MIXES[2]
            }
            .to_string(),
        );
        debts.push(pollute(&mut rng, format!("{:.2}", debt)));
        utilization.push(20.0 + rng.gen::<f64>() * 20.0);
        history.push(format!("{} Years and {} Months", i % 30, i % 12));
        min_payments.push(if risk > 0.5 { "Yes" } else { "No" }.to_string());
        emis.push(format!("{:.2}", debt / 20.0));
        invested.push(if i % 25 == 0 {
            "__10000__".to_string()
        } else {
            format!("{:.2}", income / 500.0)
        });
        behaviours.push(PAYMENT_BEHAVIOURS[i % PAYMENT_BEHAVIOURS.len()].to_string());
        balances.push(if i % 6 == 2 {
            None
        } else {
            Some(format!("{:.2}", income / 40.0 - debt / 10.0))
        });

        let label = if i % 83 == 11 {
            None
        } else if risk < 0.33 {
            Some("Good")
        } else if risk < 0.66 {
            Some("Standard")
        } else {
            Some("Poor")
        };
        scores.push(label.map(|s| s.to_string()));
    }

    df! {
        "ID" => ids,
        "Customer_ID" => customer_ids,
        "Month" => months,
        "Name" => names,
        "Age" => ages,
        "SSN" => ssns,
        "Occupation" => occupations,
        "Annual_Income" => incomes,
        "Monthly_Inhand_Salary" => salaries,
        "Num_Bank_Accounts" => bank_accounts,
        "Num_Credit_Card" => cards,
        "Interest_Rate" => interest,
        "Num_of_Loan" => loans,
        "Type_of_Loan" => loan_types,
        "Delay_from_due_date" => delays,
        "Num_of_Delayed_Payment" => delayed_payments,
        "Changed_Credit_Limit" => limit_changes,
        "Num_Credit_Inquiries" => inquiries,
        "Credit_Mix" => mixes,
        "Outstanding_Debt" => debts,
        "Credit_Utilization_Ratio" => utilization,
        "Credit_History_Age" => history,
        "Payment_of_Min_Amount" => min_payments,
        "Total_EMI_per_month" => emis,
        "Amount_invested_monthly" => invested,
        "Payment_Behaviour" => behaviours,
        "Monthly_Balance" => balances,
        "Credit_Score" => scores,
    }
    .unwrap()
}

/// Append a stray `_` to about one value in twenty
fn pollute(rng: &mut StdRng, value: String) -> String {
    if rng.gen::<f64>() < 0.05 {
        format!("{}_", value)
    } else {
        value
    }
}

/// Boosting settings small enough for fast tests
pub fn fast_gbdt() -> GbdtConfig {
    GbdtConfig {
        n_estimators: 20,
        max_depth: 3,
        learning_rate: 0.3,
        ..GbdtConfig::default()
    }
}

pub fn fast_train_config() -> TrainConfig {
    TrainConfig {
        gbdt: fast_gbdt(),
        ..TrainConfig::default()
    }
}

/// Fit a pipeline on all labeled rows of a synthetic dataset
pub fn fit_small_pipeline(rows: usize) -> FittedPipeline {
    let df = create_credit_dataframe(rows, 7);
    let columns = ColumnConfig::default();
    let frame = prepare_training_frame(&df, &columns).unwrap();
    FittedPipeline::fit(&columns, &fast_gbdt(), &frame.features, &frame.labels).unwrap()
}

/// The applicant used in the serving examples
pub fn sample_application() -> CreditApplication {
    serde_json::from_str(SAMPLE_REQUEST).unwrap()
}

pub const SAMPLE_REQUEST: &str = r#"{
    "Age": 34,
    "Occupation": "Engineer",
    "Annual_Income": 65000.0,
    "Monthly_Inhand_Salary": 4500.0,
    "Num_Bank_Accounts": 4,
    "Num_Credit_Card": 3,
    "Interest_Rate": 15,
    "Num_of_Loan": 2,
    "Delay_from_due_date": 5,
    "Num_of_Delayed_Payment": 1,
    "Changed_Credit_Limit": 1200.0,
    "Num_Credit_Inquiries": 4,
    "Credit_Mix": "Good",
    "Outstanding_Debt": 800.0,
    "Credit_Utilization_Ratio": 30.0,
    "Payment_of_Min_Amount": "No",
    "Total_EMI_per_month": 150.0,
    "Amount_invested_monthly": 80.0,
    "Payment_Behaviour": "High_spent_Small_value_payments",
    "Monthly_Balance": 350.0
}"#;

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("credit.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("credit.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}
