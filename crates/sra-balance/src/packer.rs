//! Packing engine — spreads records over nodes under a disk budget.
//!
//! First-fit decreasing:
//! 1. Order records largest first (ties by id, so runs are reproducible)
//! 2. Drop each record into the first open batch with room for it
//! 3. Open a new batch when none has room

use sra_core::{Record, SizeCatalog};
use tracing::debug;

use crate::error::{AllocationError, AllocationResult};

/// Records assigned to one compute node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeBatch {
    records: Vec<Record>,
    total_bytes: u64,
}

impl NodeBatch {
    fn with_record(record: Record) -> Self {
        let mut batch = Self::default();
        batch.push(record);
        batch
    }

    fn push(&mut self, record: Record) {
        self.total_bytes += record.size_bytes;
        self.records.push(record);
    }

    /// Whether `size_bytes` more would still fit under `capacity`.
    pub fn has_room(&self, size_bytes: u64, capacity: u64) -> bool {
        self.total_bytes
            .checked_add(size_bytes)
            .is_some_and(|total| total <= capacity)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Aggregate size of the batch's records.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}

/// Order records for packing: size descending, then id ascending.
pub fn packing_order(catalog: &SizeCatalog) -> Vec<Record> {
    let mut ordered = catalog.records().to_vec();
    ordered.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes).then_with(|| a.id.cmp(&b.id)));
    ordered
}

/// Pack a catalog into node batches, each holding at most `capacity` bytes.
///
/// Fails with `RecordTooLarge` before placing anything if a single record
/// cannot fit on an empty node, and with `NodePoolExhausted` if the result
/// needs more than `max_nodes` batches.
pub fn pack(
    catalog: &SizeCatalog,
    capacity: u64,
    max_nodes: Option<u32>,
) -> AllocationResult<Vec<NodeBatch>> {
    let ordered = packing_order(catalog);

    if let Some(largest) = ordered.first() {
        if largest.size_bytes > capacity {
            return Err(AllocationError::RecordTooLarge {
                id: largest.id.clone(),
                size_bytes: largest.size_bytes,
                capacity_bytes: capacity,
            });
        }
    }

    let mut batches: Vec<NodeBatch> = Vec::new();

    for record in ordered {
        match batches
            .iter()
            .position(|batch| batch.has_room(record.size_bytes, capacity))
        {
            Some(idx) => {
                debug!(
                    record = %record.id,
                    size = record.size_bytes,
                    node = idx,
                    "placed record"
                );
                batches[idx].push(record);
            }
            None => {
                debug!(
                    record = %record.id,
                    size = record.size_bytes,
                    node = batches.len(),
                    "opened node for record"
                );
                batches.push(NodeBatch::with_record(record));
            }
        }
    }

    if let Some(max_nodes) = max_nodes {
        if batches.len() > max_nodes as usize {
            return Err(AllocationError::NodePoolExhausted {
                required: batches.len(),
                max_nodes,
            });
        }
    }

    Ok(batches)
}
