//! In-memory catalog source.

use sra_core::config::QueryConfig;
use sra_core::{CatalogError, Record, SizeCatalog};

use crate::CatalogSource;

/// Serves a fixed record list regardless of the query.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    records: Vec<Record>,
}

impl StaticCatalog {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl CatalogSource for StaticCatalog {
    fn fetch(&self, _query: &QueryConfig) -> Result<SizeCatalog, CatalogError> {
        SizeCatalog::new(self.records.clone())
    }
}
