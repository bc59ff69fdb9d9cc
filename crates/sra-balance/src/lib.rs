//! sra-dispatch node balancing — bin-packing records onto compute nodes.
//!
//! This crate decides which node downloads and processes which archive
//! records. It does NOT query the archive (that's `sra-catalog`) or render
//! the scheduler submission (that's `sra-submit`). It packs, sizes and
//! writes the per-node record lists the submission refers to.
//!
//! # Components
//!
//! - **`packer`** — First-fit-decreasing packing under the disk budget
//! - **`resources`** — Per-node CPU, memory and disk requests
//! - **`artifacts`** — Per-node record-list files

pub mod artifacts;
pub mod error;
pub mod packer;
pub mod resources;

use sra_core::{JobConfig, MinSubmission, SizeCatalog, SubmitConfig, ThresholdUnit};
use tracing::info;

pub use artifacts::{render_record_list, write_record_lists};
pub use error::{AllocationError, AllocationResult, WriteFailure};
pub use packer::{NodeBatch, pack, packing_order};
pub use resources::{TableSummary, derive_submit_config, record_list_path, resource_table, summarize};

/// A packed, sized allocation that has not touched the filesystem yet.
#[derive(Debug, Clone)]
pub struct AllocationPlan {
    pub batches: Vec<NodeBatch>,
    /// One row per batch, same order.
    pub submit_configs: Vec<SubmitConfig>,
}

/// Refuse workloads too small to be worth a submission.
pub fn check_threshold(catalog: &SizeCatalog, min: &MinSubmission) -> AllocationResult<()> {
    let actual = match min.unit {
        ThresholdUnit::Records => catalog.len() as u64,
        ThresholdUnit::Bytes => catalog.total_bytes(),
    };

    if actual < min.value {
        return Err(AllocationError::BelowThreshold {
            unit: min.unit,
            actual,
            required: min.value,
        });
    }
    Ok(())
}

/// Pack a catalog and derive every node's resource request.
pub fn plan(catalog: &SizeCatalog, config: &JobConfig) -> AllocationResult<AllocationPlan> {
    let process = &config.process;

    check_threshold(catalog, &process.min_submission)?;

    let capacity = process.effective_capacity();
    let batches = pack(catalog, capacity, process.max_nodes)?;
    let submit_configs = resource_table(&batches, process, &config.directory.record_lists);

    let summary = summarize(&submit_configs);
    info!(
        nodes = summary.nodes,
        records = summary.records,
        total_bytes = summary.total_bytes,
        capacity_bytes = capacity,
        margin_bytes = process.margin_bytes(),
        max_disk_request_gb = summary.max_disk_request_gb,
        "balanced records across nodes"
    );

    Ok(AllocationPlan {
        batches,
        submit_configs,
    })
}

/// Plan an allocation and write one record list per node.
///
/// Nothing is written unless planning succeeds. If a write fails the error
/// lists which nodes made it to disk; the run must not be submitted.
pub fn allocate(catalog: &SizeCatalog, config: &JobConfig) -> AllocationResult<Vec<SubmitConfig>> {
    let AllocationPlan {
        batches,
        submit_configs,
    } = plan(catalog, config)?;

    write_record_lists(&config.directory.record_lists, &batches, &submit_configs)?;

    info!(
        nodes = submit_configs.len(),
        dir = %config.directory.record_lists.display(),
        "wrote record lists"
    );

    Ok(submit_configs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sra_core::Record;

    fn catalog(records: &[(&str, u64)]) -> SizeCatalog {
        SizeCatalog::new(
            records
                .iter()
                .map(|(id, size)| Record::new(*id, *size))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn threshold_by_records() {
        let min = MinSubmission {
            unit: ThresholdUnit::Records,
            value: 3,
        };

        let err = check_threshold(&catalog(&[("a", 1000), ("b", 1000)]), &min).unwrap_err();
        assert!(matches!(
            err,
            AllocationError::BelowThreshold {
                unit: ThresholdUnit::Records,
                actual: 2,
                required: 3
            }
        ));

        check_threshold(&catalog(&[("a", 0), ("b", 0), ("c", 0)]), &min).unwrap();
    }

    #[test]
    fn threshold_by_bytes() {
        let min = MinSubmission {
            unit: ThresholdUnit::Bytes,
            value: 100,
        };

        assert!(check_threshold(&catalog(&[("a", 40), ("b", 59)]), &min).is_err());
        check_threshold(&catalog(&[("a", 100)]), &min).unwrap();
    }

    #[test]
    fn empty_catalog_is_below_any_threshold() {
        let min = MinSubmission {
            unit: ThresholdUnit::Records,
            value: 1,
        };
        assert!(check_threshold(&SizeCatalog::default(), &min).is_err());
    }

    #[test]
    fn threshold_error_names_the_unit() {
        let min = MinSubmission {
            unit: ThresholdUnit::Bytes,
            value: 10,
        };
        let err = check_threshold(&catalog(&[("a", 3)]), &min).unwrap_err();
        assert_eq!(
            err.to_string(),
            "workload below submission threshold: 3 bytes < 10 bytes"
        );
    }
}
