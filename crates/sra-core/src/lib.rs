pub mod catalog;
pub mod config;
pub mod types;

pub use catalog::{CatalogError, Record, SizeCatalog};
pub use config::{
    ConfigError, DirectoryConfig, FilesConfig, JobConfig, MinSubmission, ProcessConfig,
    QueryConfig, ThresholdUnit,
};
pub use types::*;
