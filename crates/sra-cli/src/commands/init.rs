use std::path::Path;

use anyhow::{Result, bail};
use sra_core::JobConfig;

/// Config file name `init` writes and the other commands default to.
pub const CONFIG_FILE: &str = "sra-dispatch.toml";

/// Placeholder query date for a fresh scaffold.
const SCAFFOLD_DATE: &str = "2024-01-01";

pub fn init(path: &str, keyword: &str) -> Result<()> {
    let output = Path::new(path).join(CONFIG_FILE);
    if output.exists() {
        bail!("{} already exists", output.display());
    }

    let config = JobConfig::scaffold(keyword, SCAFFOLD_DATE);
    std::fs::write(&output, config.to_toml_string()?)?;
    println!("✓ Generated {}", output.display());

    Ok(())
}
