//! Model module - categorical encoding, boosted trees and the persisted artifact

pub mod artifact;
pub mod encoder;
pub mod gbdt;
pub mod matrix;

pub use artifact::*;
pub use encoder::*;
pub use gbdt::{GbdtClassifier, GbdtConfig};
pub use matrix::*;
