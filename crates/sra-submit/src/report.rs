//! Human-readable allocation report.

use sra_core::{BYTES_PER_GB, SubmitConfig};

pub fn format_table(rows: &[SubmitConfig]) -> String {
    let mut out = String::new();

    out.push_str("\n╔══════════════════════════════════════════╗\n");
    out.push_str("║  sra-dispatch Node Allocation            ║\n");
    out.push_str("╚══════════════════════════════════════════╝\n\n");

    if rows.is_empty() {
        out.push_str("No nodes allocated.\n");
        return out;
    }

    out.push_str(&format!(
        "{:>5}  {:>8}  {:>12}  {:>5}  {:>8}  {:>8}  {}\n",
        "node", "records", "packed GB", "cpus", "mem GB", "disk GB", "record list"
    ));

    let mut records = 0;
    let mut bytes = 0u64;
    for row in rows {
        out.push_str(&format!(
            "{:>5}  {:>8}  {:>12.2}  {:>5}  {:>8}  {:>8}  {}\n",
            row.node_index,
            row.record_count,
            row.total_bytes as f64 / BYTES_PER_GB as f64,
            row.cpu_per_node,
            row.memory_request_gb,
            row.disk_request_gb,
            row.record_list_path.display()
        ));
        records += row.record_count;
        bytes = bytes.saturating_add(row.total_bytes);
    }

    out.push_str(&format!(
        "\n{} node(s), {records} record(s), {:.2} GB packed\n",
        rows.len(),
        bytes as f64 / BYTES_PER_GB as f64
    ));
    out
}
