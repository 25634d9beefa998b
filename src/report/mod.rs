//! Report module - evaluation metrics and the training summary

pub mod evaluation;
pub mod summary;

pub use evaluation::*;
pub use summary::*;
