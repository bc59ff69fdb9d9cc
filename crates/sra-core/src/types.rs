//! Shared types used across sra-dispatch crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Decimal gigabyte, the unit HTCondor resource requests are reported in.
pub const BYTES_PER_GB: u64 = 1_000_000_000;

/// Round a byte count up to whole gigabytes, never below 1.
pub fn ceil_gb(bytes: u64) -> u64 {
    bytes.div_ceil(BYTES_PER_GB).max(1)
}

/// Resolved resource request for one node batch.
///
/// Every numeric field is final; renderers copy them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitConfig {
    /// Position of the batch in creation order.
    pub node_index: usize,
    pub record_count: usize,
    /// Sum of record sizes packed into the batch.
    pub total_bytes: u64,
    pub cpu_per_node: u32,
    pub memory_request_gb: f64,
    /// `total_bytes` plus the configured safety margin.
    pub disk_request_bytes: u64,
    /// `disk_request_bytes` rounded up to whole gigabytes.
    pub disk_request_gb: u64,
    pub record_list_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceil_gb_rounds_up() {
        assert_eq!(ceil_gb(1), 1);
        assert_eq!(ceil_gb(BYTES_PER_GB), 1);
        assert_eq!(ceil_gb(BYTES_PER_GB + 1), 2);
        assert_eq!(ceil_gb(250 * BYTES_PER_GB), 250);
    }

    #[test]
    fn ceil_gb_has_floor_of_one() {
        assert_eq!(ceil_gb(0), 1);
    }
}
