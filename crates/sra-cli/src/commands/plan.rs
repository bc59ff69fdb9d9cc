use std::path::Path;

use anyhow::Context;
use sra_catalog::{CatalogSource, FileCatalog};
use sra_core::JobConfig;

pub fn plan(config_path: &str, catalog_path: &str, format: &str) -> anyhow::Result<()> {
    let config = JobConfig::from_file(Path::new(config_path))
        .with_context(|| format!("loading config {config_path}"))?;
    let catalog = FileCatalog::new(catalog_path)
        .fetch(&config.query)
        .with_context(|| format!("loading size table {catalog_path}"))?;

    let planned = sra_balance::plan(&catalog, &config)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&planned.submit_configs)?);
        }
        _ => {
            println!("{}", sra_submit::report::format_table(&planned.submit_configs));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn plan_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = JobConfig::scaffold("RNA-Seq", "2024-01-01");
        config.directory.record_lists = dir.path().join("lists");
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, config.to_toml_string().unwrap()).unwrap();
        let catalog_path = dir.path().join("sizes.tsv");
        fs::write(&catalog_path, "SRR1\t100\nSRR2\t200\n").unwrap();

        plan(
            config_path.to_str().unwrap(),
            catalog_path.to_str().unwrap(),
            "json",
        )
        .unwrap();

        assert!(!dir.path().join("lists").exists());
    }

    #[test]
    fn plan_surfaces_threshold_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = JobConfig::scaffold("RNA-Seq", "2024-01-01");
        config.process.min_submission.value = 5;
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, config.to_toml_string().unwrap()).unwrap();
        let catalog_path = dir.path().join("sizes.tsv");
        fs::write(&catalog_path, "SRR1\t100\n").unwrap();

        let err = plan(
            config_path.to_str().unwrap(),
            catalog_path.to_str().unwrap(),
            "text",
        )
        .unwrap_err();

        assert!(err.to_string().contains("below submission threshold"), "{err}");
    }
}
