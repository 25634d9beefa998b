//! The fitted pipeline and its persisted form
//!
//! One JSON file holds everything needed to serve: the cleaning chain with its
//! learned statistics, the categorical encoder, the feature column order and
//! the classifier. Loading it reproduces training-time behaviour exactly.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::ProgressBar;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::encoder::{FittedOrdinalEncoder, OrdinalEncoder};
use super::gbdt::{GbdtClassifier, GbdtConfig};
use super::matrix::FeatureMatrix;
use crate::pipeline::chain::{FittedChain, TransformChain};
use crate::pipeline::columns::ColumnConfig;
use crate::pipeline::target::CreditClass;

/// Descriptive information stored alongside the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Version of this crate that trained the model
    pub version: String,
    /// Training timestamp (RFC 3339)
    pub created_at: String,
    /// Rows the pipeline was fitted on
    pub training_rows: usize,
    /// Class labels in code order
    pub classes: Vec<String>,
    /// Hyperparameters used for the classifier
    pub gbdt: GbdtConfig,
}

/// Cleaning chain, encoder and classifier fitted together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedPipeline {
    metadata: ArtifactMetadata,
    chain: FittedChain,
    encoder: FittedOrdinalEncoder,
    /// Classifier input columns: categorical first, then the remaining columns
    /// in the order the chain produced them
    feature_columns: Vec<String>,
    classifier: GbdtClassifier,
}

impl FittedPipeline {
    /// Fit every stage on `df` (features only) against `labels`
    pub fn fit(
        columns: &ColumnConfig,
        gbdt: &GbdtConfig,
        df: &DataFrame,
        labels: &[CreditClass],
    ) -> Result<Self> {
        Self::fit_with_progress(columns, gbdt, df, labels, &ProgressBar::hidden())
    }

    pub fn fit_with_progress(
        columns: &ColumnConfig,
        gbdt: &GbdtConfig,
        df: &DataFrame,
        labels: &[CreditClass],
        progress: &ProgressBar,
    ) -> Result<Self> {
        if df.height() != labels.len() {
            anyhow::bail!(
                "Row count {} does not match label count {}",
                df.height(),
                labels.len()
            );
        }

        let (chain, transformed) = TransformChain::new(columns).fit_transform(df)?;

        let encoder = OrdinalEncoder::new(columns.categorical.clone())
            .fit(&transformed)
            .context("Fitting categorical encoder failed")?;
        let encoded = encoder.transform(&transformed)?;

        let feature_columns = feature_order(&encoded, &columns.categorical);
        log::info!("Classifier features: {:?}", feature_columns);

        let matrix = FeatureMatrix::from_frame(&encoded, &feature_columns)?;
        let y: Vec<usize> = labels.iter().map(|c| c.code()).collect();

        let classifier = GbdtClassifier::fit_with_progress(
            gbdt,
            &matrix,
            &y,
            CreditClass::ALL.len(),
            progress,
        )
        .context("Training classifier failed")?;

        let metadata = ArtifactMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now().to_rfc3339(),
            training_rows: df.height(),
            classes: CreditClass::ALL.iter().map(|c| c.label().to_string()).collect(),
            gbdt: gbdt.clone(),
        };

        Ok(Self {
            metadata,
            chain,
            encoder,
            feature_columns,
            classifier,
        })
    }

    /// Run the chain and encoder, then select the classifier columns
    pub fn features(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        let transformed = self.chain.transform(df)?;
        let encoded = self.encoder.transform(&transformed)?;
        FeatureMatrix::from_frame(&encoded, &self.feature_columns)
    }

    /// Probabilities per row, indexed by class code
    pub fn predict_proba(&self, df: &DataFrame) -> Result<Vec<Vec<f64>>> {
        let matrix = self.features(df)?;
        self.classifier.predict_proba(&matrix)
    }

    pub fn predict(&self, df: &DataFrame) -> Result<Vec<CreditClass>> {
        let matrix = self.features(df)?;
        self.classifier
            .predict(&matrix)?
            .into_iter()
            .map(|code| {
                CreditClass::from_code(code)
                    .ok_or_else(|| anyhow::anyhow!("Classifier produced unknown class {}", code))
            })
            .collect()
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    pub fn chain(&self) -> &FittedChain {
        &self.chain
    }

    pub fn encoder(&self) -> &FittedOrdinalEncoder {
        &self.encoder
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn classifier(&self) -> &GbdtClassifier {
        &self.classifier
    }

    /// Write the artifact as JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create model file: {}", path.display()))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write model file: {}", path.display()))?;
        Ok(())
    }

    /// Read an artifact written by [`FittedPipeline::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open model file: {}", path.display()))?;
        let pipeline: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse model file: {}", path.display()))?;
        Ok(pipeline)
    }
}

/// Categorical columns first, then every other column in frame order
fn feature_order(df: &DataFrame, categorical: &[String]) -> Vec<String> {
    let mut order: Vec<String> = categorical.to_vec();
    for name in df.get_column_names() {
        let name = name.to_string();
        if !categorical.contains(&name) {
            order.push(name);
        }
    }
    order
}
