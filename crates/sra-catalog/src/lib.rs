//! Catalog sources — where the allocator's records come from.
//!
//! The live archive query is an external collaborator. This crate defines
//! the seam it plugs into ([`CatalogSource`]) and ships two sources:
//!
//! - **`file`** — size tables exported from an earlier query (TSV, CSV, JSON)
//! - **`memory`** — a fixed record list, for tests and dry runs

pub mod file;
pub mod memory;

use sra_core::config::QueryConfig;
use sra_core::{CatalogError, SizeCatalog};

pub use file::FileCatalog;
pub use memory::StaticCatalog;

/// Produces the size catalog for a query.
///
/// Implementations must return a de-duplicated catalog with byte-accurate
/// sizes; the allocator does not re-verify them.
pub trait CatalogSource {
    fn fetch(&self, query: &QueryConfig) -> Result<SizeCatalog, CatalogError>;
}
