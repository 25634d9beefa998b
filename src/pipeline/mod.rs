//! Pipeline module - the cleaning chain and the training run around it

pub mod chain;
pub mod cleaning;
pub mod columns;
pub mod features;
pub mod imputer;
pub mod loader;
pub mod outliers;
pub mod runner;
pub mod split;
pub mod stats;
pub mod target;

pub use chain::{FittedChain, TransformChain};
pub use cleaning::{parse_dirty_number, NumericCleaner};
pub use columns::ColumnConfig;
pub use features::RatioFeatureEngineer;
pub use imputer::{FittedGroupedImputer, GroupedImputer};
pub use loader::*;
pub use outliers::{FittedOutlierCapper, OutlierCapper};
pub use runner::*;
pub use split::*;
pub use target::*;
