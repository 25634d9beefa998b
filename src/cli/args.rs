//! Command-line argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::model::GbdtConfig;
use crate::pipeline::columns::ColumnConfig;
use crate::pipeline::runner::TrainConfig;

/// credit-risk - Train and serve a credit score classifier on raw applicant data
#[derive(Parser, Debug)]
#[command(name = "credit-risk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit the cleaning pipeline and classifier, report held-out metrics and save the model
    Train(TrainArgs),

    /// Score one applicant given as JSON
    Predict {
        /// Model artifact written by `train`
        #[arg(short, long)]
        model: PathBuf,

        /// Request JSON file. Reads standard input when omitted.
        #[arg(short, long)]
        request: Option<PathBuf>,
    },

    /// Report whether the model artifact loads
    Health {
        /// Model artifact written by `train`
        #[arg(short, long)]
        model: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Training data (CSV or Parquet) with a Credit_Score column
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the model artifact (JSON)
    #[arg(short, long, default_value = "model.json")]
    pub output: PathBuf,

    /// Share of rows held out for evaluation, strictly between 0 and 1
    #[arg(long, default_value = "0.2", value_parser = validate_test_size)]
    pub test_size: f64,

    /// Seed for the stratified split
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Boosting rounds
    #[arg(long, default_value = "200")]
    pub n_estimators: usize,

    /// Maximum tree depth
    #[arg(long, default_value = "6")]
    pub max_depth: usize,

    /// Shrinkage applied to each tree
    #[arg(long, default_value = "0.1", value_parser = validate_learning_rate)]
    pub learning_rate: f64,

    /// Minimum rows in each child of a split
    #[arg(long, default_value = "1")]
    pub min_samples_leaf: usize,

    /// Overwrite an existing model without asking
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for a full table scan.
    #[arg(long, default_value = "0")]
    pub infer_schema_length: usize,
}

impl TrainArgs {
    /// Build the training configuration from the parsed flags
    pub fn to_config(&self) -> TrainConfig {
        TrainConfig {
            test_size: self.test_size,
            seed: self.seed,
            columns: ColumnConfig::default(),
            gbdt: GbdtConfig {
                n_estimators: self.n_estimators,
                max_depth: self.max_depth,
                learning_rate: self.learning_rate,
                min_samples_leaf: self.min_samples_leaf,
                ..GbdtConfig::default()
            },
        }
    }
}

fn validate_test_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be strictly between 0.0 and 1.0, got {}",
            value
        ))
    }
}

fn validate_learning_rate(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(format!("learning_rate must be positive, got {}", value))
    }
}
