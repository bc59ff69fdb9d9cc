//! Archive records and the size catalog fed to the allocator.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// One archive entry: an accession id and its size on the archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub size_bytes: u64,
}

impl Record {
    pub fn new(id: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id: id.into(),
            size_bytes,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read size table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed size table at line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("duplicate record id: {0}")]
    DuplicateRecord(String),
    #[error("record at position {position} has an empty id")]
    EmptyId { position: usize },
}

/// De-duplicated set of records discovered for one run.
///
/// Input order is kept as-is; the allocator imposes its own ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SizeCatalog {
    records: Vec<Record>,
    total_bytes: u64,
}

impl SizeCatalog {
    /// Build a catalog, rejecting empty or repeated ids.
    pub fn new(records: Vec<Record>) -> Result<Self, CatalogError> {
        let total_bytes = {
            let mut seen = HashSet::with_capacity(records.len());
            let mut total = 0u64;

            for (position, record) in records.iter().enumerate() {
                if record.id.trim().is_empty() {
                    return Err(CatalogError::EmptyId { position });
                }
                if !seen.insert(record.id.as_str()) {
                    return Err(CatalogError::DuplicateRecord(record.id.clone()));
                }
                total = total.saturating_add(record.size_bytes);
            }
            total
        };

        Ok(Self {
            records,
            total_bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Aggregate size of every record in the catalog.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl TryFrom<Vec<Record>> for SizeCatalog {
    type Error = CatalogError;

    fn try_from(records: Vec<Record>) -> Result<Self, Self::Error> {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a SizeCatalog {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
