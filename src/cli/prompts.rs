//! Interactive prompts using dialoguer

use std::path::Path;

use anyhow::Result;
use dialoguer::Confirm;

/// Ask before replacing an existing model artifact. Defaults to no.
pub fn confirm_overwrite(path: &Path) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite?", path.display()))
        .default(false)
        .interact()?;
    Ok(confirmed)
}
