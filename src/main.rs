//! credit-risk: train and serve a credit score classifier

use anyhow::Result;
use clap::Parser;

use credit_risk::cli::{run_health, run_predict, run_train, Cli, Commands};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Train(args) => run_train(args),
        Commands::Predict { model, request } => run_predict(model, request.as_deref()),
        Commands::Health { model } => run_health(model),
    }
}
