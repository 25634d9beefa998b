//! CLI module - argument parsing, prompts and the command runners

pub mod args;
pub mod predict;
pub mod prompts;
pub mod train;

pub use args::{Cli, Commands, TrainArgs};
pub use predict::{run_health, run_predict};
pub use prompts::*;
pub use train::run_train;
