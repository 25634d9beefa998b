//! Multiclass gradient-boosted decision trees
//!
//! Softmax boosting with one regression tree per class per round. Each
//! feature is pre-binned into quantile cut points so split search runs over
//! histograms of gradient sums instead of re-sorting rows at every node.
//! Missing values (`NaN`) learn a default direction at every split.
//!
//! Training is deterministic: the split search is parallel per feature but
//! ties are broken by gain, then by lowest feature index.

use anyhow::Result;
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::matrix::FeatureMatrix;

/// Bin index reserved for missing values
const MISSING_BIN: u16 = u16::MAX;

/// Splits must improve the objective by more than this
const MIN_SPLIT_GAIN: f64 = 1e-12;

/// Floor on per-row hessians to keep leaf values bounded
const MIN_HESSIAN: f64 = 1e-6;

/// Floor on class priors when computing base scores
const MIN_PRIOR: f64 = 1e-6;

/// Boosting hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtConfig {
    /// Boosting rounds (one tree per class per round)
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    /// Minimum rows on each side of a split
    pub min_samples_leaf: usize,
    /// Minimum hessian sum on each side of a split
    pub min_child_weight: f64,
    /// L2 regularization on leaf values
    pub lambda: f64,
    /// Maximum histogram bins per feature (at most 65535)
    pub max_bins: usize,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: 6,
            learning_rate: 0.1,
            min_samples_leaf: 1,
            min_child_weight: 1.0,
            lambda: 1.0,
            max_bins: 64,
        }
    }
}

/// A tree node; children are indices into `Tree::nodes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        /// Rows with `value <= threshold` go left
        threshold: f64,
        /// Where rows with a missing value go
        missing_left: bool,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Evaluate the tree; `value(f)` returns feature `f` of the row
    pub fn evaluate<F>(&self, value: F) -> f64
    where
        F: Fn(usize) -> f64,
    {
        let mut idx = 0usize;

        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    missing_left,
                    left,
                    right,
                } => {
                    let v = value(*feature);
                    let go_left = if v.is_nan() {
                        *missing_left
                    } else {
                        v <= *threshold
                    };
                    idx = if go_left { *left } else { *right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }
}

/// Trained softmax boosting model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtClassifier {
    n_classes: usize,
    n_features: usize,
    learning_rate: f64,
    /// Initial margin per class (log prior)
    base_scores: Vec<f64>,
    /// `rounds[r][c]` is the tree for class `c` in round `r`
    rounds: Vec<Vec<Tree>>,
}

impl GbdtClassifier {
    /// Train without progress output
    pub fn fit(
        config: &GbdtConfig,
        x: &FeatureMatrix,
        y: &[usize],
        n_classes: usize,
    ) -> Result<Self> {
        Self::fit_with_progress(config, x, y, n_classes, &ProgressBar::hidden())
    }

    /// Train, advancing `progress` by one per boosting round
    pub fn fit_with_progress(
        config: &GbdtConfig,
        x: &FeatureMatrix,
        y: &[usize],
        n_classes: usize,
        progress: &ProgressBar,
    ) -> Result<Self> {
        validate(config, x, y, n_classes)?;

        let n = x.rows;
        let binned: Vec<BinnedFeature> = x
            .columns
            .par_iter()
            .map(|values| BinnedFeature::new(values, config.max_bins))
            .collect();

        let mut counts = vec![0usize; n_classes];
        for &label in y {
            counts[label] += 1;
        }
        let base_scores: Vec<f64> = counts
            .iter()
            .map(|&c| (c as f64 / n as f64).max(MIN_PRIOR).ln())
            .collect();

        // margins[c][i]: current raw score of row i for class c
        let mut margins: Vec<Vec<f64>> = base_scores.iter().map(|&b| vec![b; n]).collect();
        let all_rows: Vec<usize> = (0..n).collect();
        let mut rounds = Vec::with_capacity(config.n_estimators);

        progress.set_length(config.n_estimators as u64);

        for round in 0..config.n_estimators {
            let probs = softmax_columns(&margins, n);
            let mut trees = Vec::with_capacity(n_classes);

            for class in 0..n_classes {
                let mut grad = Vec::with_capacity(n);
                let mut hess = Vec::with_capacity(n);
                for (i, &label) in y.iter().enumerate() {
                    let p = probs[class][i];
                    let target = if label == class { 1.0 } else { 0.0 };
                    grad.push(p - target);
                    hess.push((2.0 * p * (1.0 - p)).max(MIN_HESSIAN));
                }

                let builder = TreeBuilder {
                    binned: &binned,
                    grad: &grad,
                    hess: &hess,
                    config,
                };
                let tree = builder.build(&all_rows);

                for (i, margin) in margins[class].iter_mut().enumerate() {
                    *margin += config.learning_rate * tree.evaluate(|f| x.columns[f][i]);
                }

                trees.push(tree);
            }

            log::debug!(
                "Round {}/{}: tree depths {:?}",
                round + 1,
                config.n_estimators,
                trees.iter().map(Tree::depth).collect::<Vec<_>>()
            );

            rounds.push(trees);
            progress.inc(1);
        }

        Ok(Self {
            n_classes,
            n_features: x.feature_count(),
            learning_rate: config.learning_rate,
            base_scores,
            rounds,
        })
    }

    pub fn n_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// Class probabilities per row; each row sums to 1
    pub fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
        if x.feature_count() != self.n_features {
            anyhow::bail!(
                "Expected {} features, got {}",
                self.n_features,
                x.feature_count()
            );
        }

        let probs = (0..x.rows)
            .into_par_iter()
            .map(|i| {
                let mut margins = self.base_scores.clone();
                for trees in &self.rounds {
                    for (class, tree) in trees.iter().enumerate() {
                        margins[class] += self.learning_rate * tree.evaluate(|f| x.columns[f][i]);
                    }
                }
                softmax(&margins)
            })
            .collect();

        Ok(probs)
    }

    /// Most probable class per row (lowest class index on ties)
    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<usize>> {
        Ok(self.predict_proba(x)?.iter().map(|p| argmax(p)).collect())
    }
}

fn validate(config: &GbdtConfig, x: &FeatureMatrix, y: &[usize], n_classes: usize) -> Result<()> {
    if x.rows == 0 {
        anyhow::bail!("Cannot train on an empty dataset");
    }
    if y.len() != x.rows {
        anyhow::bail!("Label count {} does not match row count {}", y.len(), x.rows);
    }
    if n_classes < 2 {
        anyhow::bail!("Need at least 2 classes, got {}", n_classes);
    }
    if let Some(bad) = y.iter().find(|&&label| label >= n_classes) {
        anyhow::bail!("Label {} out of range for {} classes", bad, n_classes);
    }
    if config.learning_rate <= 0.0 {
        anyhow::bail!("Learning rate must be positive, got {}", config.learning_rate);
    }
    if config.max_bins < 2 || config.max_bins >= MISSING_BIN as usize {
        anyhow::bail!("max_bins must be between 2 and {}", MISSING_BIN - 1);
    }
    Ok(())
}

/// Index of the largest value; first one wins on ties
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

fn softmax(margins: &[f64]) -> Vec<f64> {
    let max = margins.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = margins.iter().map(|m| (m - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Softmax over per-class margin columns; result is indexed `[class][row]`
fn softmax_columns(margins: &[Vec<f64>], n: usize) -> Vec<Vec<f64>> {
    let k = margins.len();
    let mut probs = vec![vec![0.0; n]; k];
    let mut row = vec![0.0; k];

    for i in 0..n {
        for c in 0..k {
            row[c] = margins[c][i];
        }
        for (c, p) in softmax(&row).into_iter().enumerate() {
            probs[c][i] = p;
        }
    }

    probs
}

/// A feature reduced to histogram bins
struct BinnedFeature {
    /// Strictly increasing; bin `b` holds values in `(cuts[b-1], cuts[b]]`
    cuts: Vec<f64>,
    /// Bin per row, `MISSING_BIN` for NaN
    bins: Vec<u16>,
}

impl BinnedFeature {
    fn new(values: &[f64], max_bins: usize) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mut cuts: Vec<f64> = Vec::new();
        if let Some(&max) = sorted.last() {
            let mut unique = sorted.clone();
            unique.dedup();

            if unique.len() <= max_bins {
                cuts = unique;
            } else {
                for i in 1..max_bins {
                    let q = sorted[i * sorted.len() / max_bins];
                    if cuts.last().map_or(true, |&last| q > last) {
                        cuts.push(q);
                    }
                }
            }

            // A cut at the maximum separates nothing
            if cuts.last() == Some(&max) {
                cuts.pop();
            }
        }

        let bins = values
            .iter()
            .map(|&v| {
                if v.is_nan() {
                    MISSING_BIN
                } else {
                    cuts.partition_point(|&c| c < v) as u16
                }
            })
            .collect();

        Self { cuts, bins }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    /// Last bin on the left side
    bin: usize,
    missing_left: bool,
    gain: f64,
}

struct TreeBuilder<'a> {
    binned: &'a [BinnedFeature],
    grad: &'a [f64],
    hess: &'a [f64],
    config: &'a GbdtConfig,
}

impl TreeBuilder<'_> {
    fn build(&self, rows: &[usize]) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(rows, 0, &mut nodes);
        Tree { nodes }
    }

    fn build_node(&self, rows: &[usize], depth: usize, nodes: &mut Vec<Node>) -> usize {
        let current = nodes.len();
        let (g, h) = self.sums(rows);
        let leaf = Node::Leaf {
            value: -g / (h + self.config.lambda),
        };

        if depth >= self.config.max_depth || rows.len() < 2 * self.config.min_samples_leaf {
            nodes.push(leaf);
            return current;
        }

        let Some(split) = self.find_best_split(rows, g, h) else {
            nodes.push(leaf);
            return current;
        };

        let feature = &self.binned[split.feature];
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows.iter().partition(|&&r| {
            let b = feature.bins[r];
            if b == MISSING_BIN {
                split.missing_left
            } else {
                (b as usize) <= split.bin
            }
        });

        nodes.push(Node::Split {
            feature: split.feature,
            threshold: feature.cuts[split.bin],
            missing_left: split.missing_left,
            left: 0,
            right: 0,
        });

        let left_idx = self.build_node(&left_rows, depth + 1, nodes);
        let right_idx = self.build_node(&right_rows, depth + 1, nodes);

        if let Node::Split { left, right, .. } = &mut nodes[current] {
            *left = left_idx;
            *right = right_idx;
        }

        current
    }

    fn sums(&self, rows: &[usize]) -> (f64, f64) {
        rows.iter()
            .fold((0.0, 0.0), |(g, h), &r| (g + self.grad[r], h + self.hess[r]))
    }

    fn find_best_split(&self, rows: &[usize], g: f64, h: f64) -> Option<SplitCandidate> {
        let candidates: Vec<SplitCandidate> = (0..self.binned.len())
            .into_par_iter()
            .filter_map(|f| self.best_split_for_feature(f, rows, g, h))
            .collect();

        // Candidates are in feature order; strict comparison keeps the lowest index on ties
        let mut best: Option<SplitCandidate> = None;
        for candidate in candidates {
            if best.map_or(true, |b| candidate.gain > b.gain) {
                best = Some(candidate);
            }
        }
        best
    }

    fn best_split_for_feature(
        &self,
        f: usize,
        rows: &[usize],
        g: f64,
        h: f64,
    ) -> Option<SplitCandidate> {
        let feature = &self.binned[f];
        if feature.cuts.is_empty() {
            return None;
        }

        let n_bins = feature.cuts.len() + 1;
        let mut hist_g = vec![0.0; n_bins];
        let mut hist_h = vec![0.0; n_bins];
        let mut hist_n = vec![0usize; n_bins];
        let (mut miss_g, mut miss_h, mut miss_n) = (0.0, 0.0, 0usize);

        for &r in rows {
            let b = feature.bins[r];
            if b == MISSING_BIN {
                miss_g += self.grad[r];
                miss_h += self.hess[r];
                miss_n += 1;
            } else {
                let b = b as usize;
                hist_g[b] += self.grad[r];
                hist_h[b] += self.hess[r];
                hist_n[b] += 1;
            }
        }

        let lambda = self.config.lambda;
        let parent_score = g * g / (h + lambda);
        let total_n = rows.len();

        let (mut left_g, mut left_h, mut left_n) = (0.0, 0.0, 0usize);
        let mut best: Option<SplitCandidate> = None;

        for bin in 0..feature.cuts.len() {
            left_g += hist_g[bin];
            left_h += hist_h[bin];
            left_n += hist_n[bin];

            for missing_left in [true, false] {
                let (lg, lh, ln) = if missing_left {
                    (left_g + miss_g, left_h + miss_h, left_n + miss_n)
                } else {
                    (left_g, left_h, left_n)
                };
                let (rg, rh, rn) = (g - lg, h - lh, total_n - ln);

                if ln < self.config.min_samples_leaf
                    || rn < self.config.min_samples_leaf
                    || lh < self.config.min_child_weight
                    || rh < self.config.min_child_weight
                {
                    continue;
                }

                let gain =
                    0.5 * (lg * lg / (lh + lambda) + rg * rg / (rh + lambda) - parent_score);

                if gain > MIN_SPLIT_GAIN && best.map_or(true, |b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature: f,
                        bin,
                        missing_left,
                        gain,
                    });
                }
            }
        }

        best
    }
}
