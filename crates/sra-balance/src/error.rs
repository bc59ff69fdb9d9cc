//! Allocation error types.

use std::path::PathBuf;

use sra_core::ThresholdUnit;
use thiserror::Error;

/// Result type alias for allocation operations.
pub type AllocationResult<T> = Result<T, AllocationError>;

/// Errors that abort an allocation run.
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("workload below submission threshold: {actual} {unit} < {required} {unit}")]
    BelowThreshold {
        unit: ThresholdUnit,
        actual: u64,
        required: u64,
    },

    #[error("record {id} ({size_bytes} bytes) exceeds per-node capacity of {capacity_bytes} bytes")]
    RecordTooLarge {
        id: String,
        size_bytes: u64,
        capacity_bytes: u64,
    },

    #[error("packing needs {required} nodes but the pool is capped at {max_nodes}")]
    NodePoolExhausted { required: usize, max_nodes: u32 },

    #[error("failed to remove stale record list {path}: {reason}")]
    StaleRecordList { path: PathBuf, reason: String },

    #[error(
        "failed to write {} record list(s) {:?}; written: {written:?}",
        .failed.len(),
        failed_indices(.failed)
    )]
    ArtifactWriteFailed {
        written: Vec<usize>,
        failed: Vec<WriteFailure>,
    },
}

/// A record list that could not be persisted.
#[derive(Debug, Clone)]
pub struct WriteFailure {
    pub node_index: usize,
    pub path: PathBuf,
    pub reason: String,
}

fn failed_indices(failed: &[WriteFailure]) -> Vec<usize> {
    failed.iter().map(|f| f.node_index).collect()
}

impl AllocationError {
    /// Node indices whose record lists are on disk, for `ArtifactWriteFailed`.
    pub fn written_nodes(&self) -> &[usize] {
        match self {
            AllocationError::ArtifactWriteFailed { written, .. } => written,
            _ => &[],
        }
    }
}
