//! credit-risk: credit score classification library
//!
//! A deterministic cleaning chain (numeric cleaning, outlier capping, grouped
//! imputation, ratio features) feeding an ordinal encoder and a multiclass
//! boosted-tree classifier, persisted as one artifact and served per applicant.

pub mod cli;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod service;
pub mod utils;
