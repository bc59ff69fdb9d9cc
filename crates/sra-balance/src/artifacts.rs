//! Record-list artifacts — one newline-delimited id file per node.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::Path;

use sra_core::SubmitConfig;
use tracing::{debug, warn};

use crate::error::{AllocationError, AllocationResult, WriteFailure};
use crate::packer::NodeBatch;
use crate::resources::is_record_list_name;

/// Render a batch's ids, one per line.
pub fn render_record_list(batch: &NodeBatch) -> String {
    let mut out = String::new();
    for id in batch.ids() {
        out.push_str(id);
        out.push('\n');
    }
    out
}

/// Write every batch's record list to the path named in its row.
///
/// Lists left in `dir` by an earlier run with more nodes are removed first,
/// so the directory holds exactly this run's lists. All batches are
/// attempted even after a failure so the error can report exactly which
/// nodes are on disk.
pub fn write_record_lists(
    dir: &Path,
    batches: &[NodeBatch],
    rows: &[SubmitConfig],
) -> AllocationResult<()> {
    debug_assert_eq!(batches.len(), rows.len());

    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!(dir = %dir.display(), error = %e, "cannot create record list directory");
        return Err(AllocationError::ArtifactWriteFailed {
            written: Vec::new(),
            failed: rows
                .iter()
                .map(|row| WriteFailure {
                    node_index: row.node_index,
                    path: row.record_list_path.clone(),
                    reason: e.to_string(),
                })
                .collect(),
        });
    }

    prune_stale_lists(dir, rows)?;

    let mut written = Vec::with_capacity(rows.len());
    let mut failed = Vec::new();

    for (batch, row) in batches.iter().zip(rows) {
        match std::fs::write(&row.record_list_path, render_record_list(batch)) {
            Ok(()) => {
                debug!(
                    node = row.node_index,
                    records = row.record_count,
                    path = %row.record_list_path.display(),
                    "wrote record list"
                );
                written.push(row.node_index);
            }
            Err(e) => {
                warn!(
                    node = row.node_index,
                    path = %row.record_list_path.display(),
                    error = %e,
                    "failed to write record list"
                );
                failed.push(WriteFailure {
                    node_index: row.node_index,
                    path: row.record_list_path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(AllocationError::ArtifactWriteFailed { written, failed })
    }
}

/// Remove `node_NNNN.txt` files in `dir` that no row refers to.
fn prune_stale_lists(dir: &Path, rows: &[SubmitConfig]) -> AllocationResult<()> {
    let stale_err = |path: &Path, e: std::io::Error| AllocationError::StaleRecordList {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let current: HashSet<OsString> = rows
        .iter()
        .filter_map(|row| row.record_list_path.file_name().map(|n| n.to_os_string()))
        .collect();

    for entry in std::fs::read_dir(dir).map_err(|e| stale_err(dir, e))? {
        let entry = entry.map_err(|e| stale_err(dir, e))?;
        let name = entry.file_name();
        let is_stale = name.to_str().is_some_and(is_record_list_name) && !current.contains(&name);
        if !is_stale || !entry.path().is_file() {
            continue;
        }

        let path = entry.path();
        std::fs::remove_file(&path).map_err(|e| stale_err(&path, e))?;
        debug!(path = %path.display(), "removed stale record list");
    }
    Ok(())
}
