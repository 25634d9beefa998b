//! The `predict` and `health` commands

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

use crate::service::{CreditApplication, PredictionService};

/// Read one JSON request from `request` (or stdin), print the JSON response
pub fn run_predict(model: &Path, request: Option<&Path>) -> Result<()> {
    let application = read_application(request)?;

    let service = PredictionService::start(model);
    let response = service.predict(&application)?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Print the health status. Succeeds whether or not the model loads.
pub fn run_health(model: &Path) -> Result<()> {
    let service = PredictionService::start(model);
    println!("{}", serde_json::to_string(&service.health())?);
    Ok(())
}

fn read_application(request: Option<&Path>) -> Result<CreditApplication> {
    match request {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open request file: {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Invalid request in {}", path.display()))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            serde_json::from_str(&buf).context("Invalid request on stdin")
        }
    }
}
