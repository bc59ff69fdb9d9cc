//! Size tables on disk.
//!
//! Delimited tables hold one `id<sep>size` row per line, where `<sep>` is a
//! tab, a comma or any run of whitespace. Blank lines and `#` comments are
//! skipped. A leading header row is tolerated only when it looks like one:
//! column names without digits. Any other unparsable size is an error, so a
//! record is never dropped. A `.json` file instead
//! holds an array of `{"id": ..., "size_bytes": ...}` objects.

use std::path::{Path, PathBuf};

use sra_core::config::QueryConfig;
use sra_core::{CatalogError, Record, SizeCatalog};
use tracing::{info, warn};

use crate::CatalogSource;

/// Reads a previously exported query result.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}

impl CatalogSource for FileCatalog {
    fn fetch(&self, query: &QueryConfig) -> Result<SizeCatalog, CatalogError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| CatalogError::Read {
            path: self.path.clone(),
            source,
        })?;

        let records = if self.is_json() {
            parse_json(&content)?
        } else {
            parse_table(&content)?
        };
        let catalog = SizeCatalog::new(records)?;

        info!(
            path = %self.path.display(),
            keyword = %query.keyword,
            start = %query.start_date,
            end = %query.end_date,
            records = catalog.len(),
            total_bytes = catalog.total_bytes(),
            "loaded size table"
        );

        Ok(catalog)
    }
}

/// Parse a JSON array of records.
pub fn parse_json(content: &str) -> Result<Vec<Record>, CatalogError> {
    serde_json::from_str(content).map_err(|e| CatalogError::Parse {
        line: e.line(),
        reason: e.to_string(),
    })
}

/// Parse a delimited `id`/`size` table.
pub fn parse_table(content: &str) -> Result<Vec<Record>, CatalogError> {
    let mut records = Vec::new();
    let mut seen_row = false;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (id, size) = split_row(line).ok_or_else(|| CatalogError::Parse {
            line: line_no,
            reason: format!("expected two columns, got {line:?}"),
        })?;

        match size.parse::<u64>() {
            Ok(size_bytes) => records.push(Record::new(id, size_bytes)),
            Err(_) if !seen_row && is_header_row(id, size) => {
                warn!(line = line_no, header = line, "skipping header row");
            }
            Err(e) => {
                return Err(CatalogError::Parse {
                    line: line_no,
                    reason: format!("invalid size {size:?} for {id}: {e}"),
                });
            }
        }
        seen_row = true;
    }

    Ok(records)
}

/// Column names: no digits anywhere, so no accession or size can match.
fn is_header_row(id: &str, size: &str) -> bool {
    let is_name = |col: &str| {
        col.chars()
            .all(|c| c.is_ascii_alphabetic() || matches!(c, '_' | '-' | ' '))
    };
    is_name(id) && is_name(size)
}

fn split_row(line: &str) -> Option<(&str, &str)> {
    let (id, rest) = line
        .split_once('\t')
        .or_else(|| line.split_once(','))
        .or_else(|| line.split_once(char::is_whitespace))?;

    let id = id.trim();
    let size = rest.trim();
    if id.is_empty() || size.is_empty() || size.contains(['\t', ',']) {
        return None;
    }
    Some((id, size))
}
