//! `sra-dispatch dispatch` — the full preparation run.
//!
//! Loads the config and size table, balances records across nodes, writes
//! the per-node record lists and renders the HTCondor submission. Any
//! failure aborts the run before a submission file exists.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use sra_balance::AllocationError;
use sra_catalog::{CatalogSource, FileCatalog};
use sra_core::JobConfig;
use sra_submit::SubmissionBuilder;
use tracing::info;

pub fn dispatch(config_path: &str, catalog_path: &str) -> Result<()> {
    let started = Instant::now();

    let config = JobConfig::from_file(Path::new(config_path))
        .with_context(|| format!("loading config {config_path}"))?;

    let results_dir = &config.directory.output_results;
    if config.process.on_cluster {
        info!(dir = %results_dir.display(), "running on cluster");
        if results_dir.exists() {
            bail!(
                "results directory {} already exists; refusing to mix runs",
                results_dir.display()
            );
        }
    } else {
        info!("not running on cluster; results directory left untouched");
    }

    let catalog = FileCatalog::new(catalog_path)
        .fetch(&config.query)
        .with_context(|| format!("loading size table {catalog_path}"))?;

    let rows = match sra_balance::allocate(&catalog, &config) {
        Ok(rows) => rows,
        Err(e) => {
            report_allocation_failure(&e);
            return Err(e.into());
        }
    };

    let submission = SubmissionBuilder::new(&config).render(&rows)?;
    submission.write(&config.files)?;

    if config.process.on_cluster {
        std::fs::create_dir_all(results_dir)
            .with_context(|| format!("creating results directory {}", results_dir.display()))?;
    }

    let elapsed = started.elapsed();
    info!(
        nodes = rows.len(),
        records = catalog.len(),
        elapsed_secs = elapsed.as_secs_f64(),
        "dispatch prepared"
    );
    println!("✓ {} node(s) ready", rows.len());
    println!("  Submit file: {}", config.files.submit_file.display());
    println!("  Total time:  {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

fn report_allocation_failure(err: &AllocationError) {
    eprintln!("Allocation failed: {err}");
    if let AllocationError::ArtifactWriteFailed { written, failed } = err {
        eprintln!("  Record lists verified on disk for nodes: {written:?}");
        for failure in failed {
            eprintln!(
                "  Node {} ({}): {}",
                failure.node_index,
                failure.path.display(),
                failure.reason
            );
        }
    }
}
