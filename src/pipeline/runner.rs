//! Offline training run: label mapping, split, fit and evaluation

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use polars::prelude::*;

use super::columns::{has_column, take_rows, ColumnConfig};
use super::split::stratified_split;
use super::target::{count_mapped_records, map_labels, CreditClass};
use crate::model::{FittedPipeline, GbdtConfig};
use crate::report::{evaluate, ClassificationReport};

/// Default share of rows held out for evaluation
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
/// Default seed for the stratified split
pub const DEFAULT_SEED: u64 = 42;

/// Everything a training run needs besides the data
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub test_size: f64,
    pub seed: u64,
    pub columns: ColumnConfig,
    pub gbdt: GbdtConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_size: DEFAULT_TEST_SIZE,
            seed: DEFAULT_SEED,
            columns: ColumnConfig::default(),
            gbdt: GbdtConfig::default(),
        }
    }
}

/// Feature rows with their labels, unmapped rows removed
#[derive(Debug, Clone)]
pub struct TrainingFrame {
    pub features: DataFrame,
    pub labels: Vec<CreditClass>,
    /// Rows per class, indexed by class code
    pub class_counts: [usize; 3],
    /// Rows dropped because their label did not map
    pub dropped_rows: usize,
}

/// Outcome of [`train`]
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub pipeline: FittedPipeline,
    pub report: ClassificationReport,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Map labels, drop unlabeled rows, then remove the label and identifier columns
pub fn prepare_training_frame(df: &DataFrame, columns: &ColumnConfig) -> Result<TrainingFrame> {
    if !has_column(df, &columns.target) {
        let available: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        anyhow::bail!(
            "Target column '{}' not found in dataset. Available columns: {:?}",
            columns.target,
            available
        );
    }

    let mapped = map_labels(df, &columns.target)?;
    let (class_counts, dropped_rows) = count_mapped_records(&mapped);
    if dropped_rows > 0 {
        log::warn!("Dropping {} row(s) with unmapped credit score labels", dropped_rows);
    }

    let (keep, labels): (Vec<usize>, Vec<CreditClass>) = mapped
        .iter()
        .enumerate()
        .filter_map(|(idx, label)| label.map(|class| (idx, class)))
        .unzip();

    if labels.is_empty() {
        anyhow::bail!("No rows with a valid '{}' label", columns.target);
    }

    let kept = take_rows(df, &keep)?;

    let mut to_drop: Vec<String> = vec![columns.target.clone()];
    to_drop.extend(
        columns
            .dropped
            .iter()
            .filter(|name| has_column(&kept, name))
            .cloned(),
    );
    let features = kept.drop_many(&to_drop);

    Ok(TrainingFrame {
        features,
        labels,
        class_counts,
        dropped_rows,
    })
}

/// Split, fit the pipeline on the training part and score the held-out part
pub fn train(df: &DataFrame, config: &TrainConfig) -> Result<TrainingOutcome> {
    train_with_progress(df, config, &ProgressBar::hidden())
}

pub fn train_with_progress(
    df: &DataFrame,
    config: &TrainConfig,
    progress: &ProgressBar,
) -> Result<TrainingOutcome> {
    let frame = prepare_training_frame(df, &config.columns)?;
    train_on_frame(&frame, config, progress)
}

/// Train on an already prepared frame
pub fn train_on_frame(
    frame: &TrainingFrame,
    config: &TrainConfig,
    progress: &ProgressBar,
) -> Result<TrainingOutcome> {
    let split = stratified_split(&frame.labels, config.test_size, config.seed);
    if split.train.is_empty() || split.test.is_empty() {
        anyhow::bail!(
            "Split produced {} training and {} test rows; need at least one of each",
            split.train.len(),
            split.test.len()
        );
    }
    log::info!(
        "Stratified split: {} train / {} test rows",
        split.train.len(),
        split.test.len()
    );

    let train_df = take_rows(&frame.features, &split.train)?;
    let test_df = take_rows(&frame.features, &split.test)?;
    let train_labels: Vec<CreditClass> = split.train.iter().map(|&i| frame.labels[i]).collect();
    let test_labels: Vec<CreditClass> = split.test.iter().map(|&i| frame.labels[i]).collect();

    let pipeline = FittedPipeline::fit_with_progress(
        &config.columns,
        &config.gbdt,
        &train_df,
        &train_labels,
        progress,
    )
    .context("Fitting pipeline failed")?;

    let predicted = pipeline
        .predict(&test_df)
        .context("Scoring the test split failed")?;
    let report = evaluate(&test_labels, &predicted)?;

    Ok(TrainingOutcome {
        pipeline,
        report,
        train_rows: split.train.len(),
        test_rows: split.test.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_drops_unmapped_rows_and_columns() {
        let df = df! {
            "ID" => ["a", "b", "c"],
            "Name" => ["x", "y", "z"],
            "Age" => ["30", "40_", "50"],
            "Credit_Score" => [Some("Good"), Some("Bad"), None],
        }
        .unwrap();

        let frame = prepare_training_frame(&df, &ColumnConfig::default()).unwrap();
        assert_eq!(frame.labels, vec![CreditClass::Good]);
        assert_eq!(frame.dropped_rows, 2);
        assert_eq!(frame.class_counts, [1, 0, 0]);
        assert_eq!(frame.features.shape(), (1, 1));
        assert!(has_column(&frame.features, "Age"));
    }

    #[test]
    fn test_prepare_requires_target() {
        let df = df! { "Age" => ["30"] }.unwrap();
        let err = prepare_training_frame(&df, &ColumnConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Credit_Score"));
    }

    #[test]
    fn test_prepare_rejects_all_unmapped() {
        let df = df! {
            "Age" => ["30"],
            "Credit_Score" => ["Unknown"],
        }
        .unwrap();
        assert!(prepare_training_frame(&df, &ColumnConfig::default()).is_err());
    }
}
