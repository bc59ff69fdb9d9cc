//! Resource derivation for packed batches.
//!
//! Bridges `packer::NodeBatch` and `sra_core::config::ProcessConfig` to the
//! `SubmitConfig` rows handed to the submission renderer.

use std::path::{Path, PathBuf};

use sra_core::config::ProcessConfig;
use sra_core::{SubmitConfig, ceil_gb};

use crate::packer::NodeBatch;

/// Totals over a resource table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSummary {
    pub nodes: usize,
    pub records: usize,
    pub total_bytes: u64,
    pub max_disk_request_gb: u64,
}

/// File name of the record list for a node.
pub fn record_list_name(node_index: usize) -> String {
    format!("node_{node_index:04}.txt")
}

/// Whether `name` has the shape `record_list_name` produces.
pub fn is_record_list_name(name: &str) -> bool {
    name.strip_prefix("node_")
        .and_then(|rest| rest.strip_suffix(".txt"))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Where a node's record list is written inside `dir`.
pub fn record_list_path(dir: &Path, node_index: usize) -> PathBuf {
    dir.join(record_list_name(node_index))
}

/// Resolve the resource request for one batch.
///
/// CPU and memory are per-node constants; disk is the packed size plus the
/// configured margin.
pub fn derive_submit_config(
    node_index: usize,
    batch: &NodeBatch,
    process: &ProcessConfig,
    record_list_path: PathBuf,
) -> SubmitConfig {
    let disk_request_bytes = batch.total_bytes().saturating_add(process.margin_bytes());

    SubmitConfig {
        node_index,
        record_count: batch.len(),
        total_bytes: batch.total_bytes(),
        cpu_per_node: process.cpu_per_node,
        memory_request_gb: process.memory_request_gb,
        disk_request_bytes,
        disk_request_gb: ceil_gb(disk_request_bytes),
        record_list_path,
    }
}

/// Build the full table, one row per batch in creation order.
pub fn resource_table(
    batches: &[NodeBatch],
    process: &ProcessConfig,
    record_list_dir: &Path,
) -> Vec<SubmitConfig> {
    batches
        .iter()
        .enumerate()
        .map(|(idx, batch)| {
            derive_submit_config(idx, batch, process, record_list_path(record_list_dir, idx))
        })
        .collect()
}

/// Summarize a table for logging and reports.
pub fn summarize(rows: &[SubmitConfig]) -> TableSummary {
    rows.iter().fold(TableSummary::default(), |acc, row| TableSummary {
        nodes: acc.nodes + 1,
        records: acc.records + row.record_count,
        total_bytes: acc.total_bytes.saturating_add(row.total_bytes),
        max_disk_request_gb: acc.max_disk_request_gb.max(row.disk_request_gb),
    })
}
