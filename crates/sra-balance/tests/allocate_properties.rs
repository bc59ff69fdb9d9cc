//! End-to-end allocation properties.
//!
//! Runs `allocate` against generated catalogs and checks the partition,
//! capacity, threshold and determinism guarantees, plus the on-disk
//! record lists.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use sra_balance::{AllocationError, allocate, plan};
use sra_core::{JobConfig, MinSubmission, Record, SizeCatalog, ThresholdUnit};

fn test_config(dir: &Path, budget: u64, margin_percent: u32) -> JobConfig {
    let mut config = JobConfig::scaffold("RNA-Seq", "2024-01-01");
    config.process.disk_budget_bytes = budget;
    config.process.disk_margin_percent = margin_percent;
    config.process.min_submission = MinSubmission {
        unit: ThresholdUnit::Records,
        value: 1,
    };
    config.directory.record_lists = dir.join("sra_lists");
    config
}

/// Deterministic pseudo-random sizes (64-bit LCG).
fn generated_records(count: usize, max_size: u64, seed: u64) -> Vec<Record> {
    let mut state = seed;
    (0..count)
        .map(|i| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            Record::new(format!("SRR{i:07}"), (state >> 33) % (max_size + 1))
        })
        .collect()
}

fn catalog(records: Vec<Record>) -> SizeCatalog {
    SizeCatalog::new(records).unwrap()
}

fn list_dir_is_empty(dir: &Path) -> bool {
    !dir.exists() || fs::read_dir(dir).unwrap().next().is_none()
}

#[test]
fn example_scenario_packs_into_two_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 100, 0);
    let catalog = catalog(vec![
        Record::new("a", 60),
        Record::new("b", 50),
        Record::new("c", 10),
        Record::new("d", 40),
    ]);

    let rows = allocate(&catalog, &config).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].total_bytes, 100);
    assert_eq!(rows[1].total_bytes, 60);
    assert_eq!(fs::read_to_string(&rows[0].record_list_path).unwrap(), "a\nd\n");
    assert_eq!(fs::read_to_string(&rows[1].record_list_path).unwrap(), "b\nc\n");
}

#[test]
fn partition_is_complete_and_disjoint() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 10_000, 10);
    let records = generated_records(2_000, 9_000, 7);
    let expected: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();

    let rows = allocate(&catalog(records), &config).unwrap();

    let mut seen = HashSet::new();
    let mut total = 0;
    for row in &rows {
        let content = fs::read_to_string(&row.record_list_path).unwrap();
        let ids: Vec<&str> = content.lines().collect();
        assert_eq!(ids.len(), row.record_count);
        for id in ids {
            assert!(seen.insert(id.to_string()), "record {id} assigned twice");
        }
        total += row.record_count;
    }

    assert_eq!(total, expected.len());
    assert_eq!(seen, expected);
}

#[test]
fn every_node_respects_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 1_000_000, 30);
    let capacity = config.process.effective_capacity();
    let records = generated_records(5_000, capacity, 99);

    let planned = plan(&catalog(records), &config).unwrap();

    for (batch, row) in planned.batches.iter().zip(&planned.submit_configs) {
        assert!(batch.total_bytes() <= capacity, "node {} over capacity", row.node_index);
        assert_eq!(row.disk_request_bytes, batch.total_bytes() + config.process.margin_bytes());
    }
}

#[test]
fn input_order_does_not_change_partition() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 5_000, 0);
    let records = generated_records(500, 2_500, 3);
    let mut reversed = records.clone();
    reversed.reverse();

    let a = plan(&catalog(records), &config).unwrap();
    let b = plan(&catalog(reversed), &config).unwrap();

    assert_eq!(a.batches, b.batches);
    assert_eq!(a.submit_configs, b.submit_configs);
}

#[test]
fn below_threshold_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path(), 100, 0);
    config.process.min_submission = MinSubmission {
        unit: ThresholdUnit::Bytes,
        value: 1_000,
    };

    let err = allocate(&catalog(vec![Record::new("a", 10)]), &config).unwrap_err();

    assert!(matches!(err, AllocationError::BelowThreshold { .. }));
    assert!(list_dir_is_empty(&config.directory.record_lists));
}

#[test]
fn oversize_record_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 100, 0);

    let err = allocate(
        &catalog(vec![Record::new("small", 5), Record::new("x", 150)]),
        &config,
    )
    .unwrap_err();

    assert!(matches!(err, AllocationError::RecordTooLarge { ref id, .. } if id == "x"));
    assert!(list_dir_is_empty(&config.directory.record_lists));
}

#[test]
fn margin_shrinks_packable_space() {
    let dir = tempfile::tempdir().unwrap();
    // 100 bytes with half held back: a 60-byte record no longer fits.
    let config = test_config(dir.path(), 100, 50);

    let err = plan(&catalog(vec![Record::new("a", 60)]), &config).unwrap_err();
    assert!(matches!(
        err,
        AllocationError::RecordTooLarge {
            capacity_bytes: 50,
            ..
        }
    ));
}

#[test]
fn node_pool_cap_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path(), 100, 0);
    config.process.max_nodes = Some(1);

    let err = allocate(
        &catalog(vec![Record::new("a", 70), Record::new("b", 70)]),
        &config,
    )
    .unwrap_err();

    assert!(matches!(err, AllocationError::NodePoolExhausted { required: 2, max_nodes: 1 }));
    assert!(list_dir_is_empty(&config.directory.record_lists));
}

#[test]
fn partial_write_reports_nodes_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 100, 0);
    let blocked = config.directory.record_lists.join("node_0001.txt");
    fs::create_dir_all(&blocked).unwrap();

    let err = allocate(
        &catalog(vec![
            Record::new("a", 60),
            Record::new("b", 50),
            Record::new("c", 10),
            Record::new("d", 40),
        ]),
        &config,
    )
    .unwrap_err();

    match &err {
        AllocationError::ArtifactWriteFailed { failed, .. } => {
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].node_index, 1);
            assert_eq!(failed[0].path, blocked);
        }
        other => panic!("expected ArtifactWriteFailed, got {other:?}"),
    }
    assert_eq!(err.written_nodes(), &[0]);
    assert_eq!(
        fs::read_to_string(config.directory.record_lists.join("node_0000.txt")).unwrap(),
        "a\nd\n"
    );
    assert!(blocked.is_dir());
}
