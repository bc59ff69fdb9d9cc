//! Job configuration parser.
//!
//! TOML is the default format; a `.json` extension switches to JSON so the
//! configs already kept next to earlier pipeline runs load unchanged.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("failed to serialize config: {0}")]
    Serialize(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub query: QueryConfig,
    pub process: ProcessConfig,
    pub directory: DirectoryConfig,
    pub files: FilesConfig,
}

/// Parameters handed to the archive query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Inclusive, `YYYY-MM-DD`.
    pub start_date: String,
    /// Inclusive, `YYYY-MM-DD`.
    pub end_date: String,
    pub keyword: String,
}

/// Per-node resources and packing constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessConfig {
    pub cpu_per_node: u32,
    /// Memory requested per node, in GB.
    pub memory_request_gb: f64,
    /// Disk available to one node, in bytes.
    pub disk_budget_bytes: u64,
    /// Share of the disk budget held back for decompressed and intermediate output.
    #[serde(default)]
    pub disk_margin_percent: u32,
    /// Upper bound on the node pool; unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_nodes: Option<u32>,
    /// Create the results directory before dispatching (only on the submit host).
    #[serde(default)]
    pub on_cluster: bool,
    pub min_submission: MinSubmission,
}

impl ProcessConfig {
    /// Bytes reserved per node on top of the packed records, rounded up.
    pub fn margin_bytes(&self) -> u64 {
        let scaled = u128::from(self.disk_budget_bytes) * u128::from(self.disk_margin_percent);
        scaled.div_ceil(100).min(u128::from(self.disk_budget_bytes)) as u64
    }

    /// Largest aggregate record size a single node may hold.
    pub fn effective_capacity(&self) -> u64 {
        self.disk_budget_bytes.saturating_sub(self.margin_bytes())
    }
}

/// Smallest workload worth submitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinSubmission {
    pub unit: ThresholdUnit,
    pub value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdUnit {
    /// Count of records in the catalog.
    Records,
    /// Aggregate byte size of the catalog.
    Bytes,
}

impl fmt::Display for ThresholdUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdUnit::Records => f.write_str("records"),
            ThresholdUnit::Bytes => f.write_str("bytes"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Where the per-node record lists are written.
    pub record_lists: PathBuf,
    /// Where processed results land on the cluster.
    pub output_results: PathBuf,
    /// Scratch directory on the execute node.
    pub scratch: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesConfig {
    pub processing_program: PathBuf,
    #[serde(default)]
    pub static_files: Vec<PathBuf>,
    #[serde(default)]
    pub modules: Vec<PathBuf>,
    #[serde(default = "default_queue_list")]
    pub queue_list: PathBuf,
    #[serde(default = "default_submit_file")]
    pub submit_file: PathBuf,
    #[serde(default = "default_submit_configs")]
    pub submit_configs: PathBuf,
}

fn default_queue_list() -> PathBuf {
    PathBuf::from("batches.txt")
}

fn default_submit_file() -> PathBuf {
    PathBuf::from("submit_file.sub")
}

fn default_submit_configs() -> PathBuf {
    PathBuf::from("submit_configs.json")
}

impl JobConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: JobConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: JobConfig =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Check every field the allocator and renderer rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let process = &self.process;

        if process.cpu_per_node == 0 {
            return Err(invalid("process.cpu_per_node must be positive"));
        }
        if !process.memory_request_gb.is_finite() || process.memory_request_gb <= 0.0 {
            return Err(invalid("process.memory_request_gb must be a positive number"));
        }
        if process.disk_budget_bytes == 0 {
            return Err(invalid("process.disk_budget_bytes must be positive"));
        }
        if process.disk_margin_percent >= 100 {
            return Err(invalid("process.disk_margin_percent must be below 100"));
        }
        if process.effective_capacity() == 0 {
            return Err(invalid("disk margin leaves no room for records"));
        }
        if process.max_nodes == Some(0) {
            return Err(invalid("process.max_nodes must be positive when set"));
        }
        if process.min_submission.value == 0 {
            return Err(invalid("process.min_submission.value must be positive"));
        }

        let start = parse_date(&self.query.start_date, "query.start_date")?;
        let end = parse_date(&self.query.end_date, "query.end_date")?;
        if start > end {
            return Err(ConfigError::Invalid(format!(
                "query.start_date {} is after query.end_date {}",
                self.query.start_date, self.query.end_date
            )));
        }
        if self.query.keyword.trim().is_empty() {
            return Err(invalid("query.keyword must not be empty"));
        }

        for (name, path) in [
            ("directory.record_lists", &self.directory.record_lists),
            ("directory.output_results", &self.directory.output_results),
            ("directory.scratch", &self.directory.scratch),
            ("files.processing_program", &self.files.processing_program),
            ("files.queue_list", &self.files.queue_list),
            ("files.submit_file", &self.files.submit_file),
            ("files.submit_configs", &self.files.submit_configs),
        ] {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }

        Ok(())
    }

    /// Scaffold a config for a single-day query with conservative node sizes.
    pub fn scaffold(keyword: &str, date: &str) -> Self {
        JobConfig {
            query: QueryConfig {
                start_date: date.to_string(),
                end_date: date.to_string(),
                keyword: keyword.to_string(),
            },
            process: ProcessConfig {
                cpu_per_node: 4,
                memory_request_gb: 16.0,
                disk_budget_bytes: 100 * crate::BYTES_PER_GB,
                disk_margin_percent: 50,
                max_nodes: None,
                on_cluster: false,
                min_submission: MinSubmission {
                    unit: ThresholdUnit::Records,
                    value: 1,
                },
            },
            directory: DirectoryConfig {
                record_lists: PathBuf::from("sra_lists"),
                output_results: PathBuf::from("output"),
                scratch: PathBuf::from("/tmp/fasterq"),
            },
            files: FilesConfig {
                processing_program: PathBuf::from("process_sra.sh"),
                static_files: Vec::new(),
                modules: Vec::new(),
                queue_list: default_queue_list(),
                submit_file: default_submit_file(),
                submit_configs: default_submit_configs(),
            },
        }
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}

/// Parse a `YYYY-MM-DD` calendar date.
fn parse_date(value: &str, field: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| {
        ConfigError::Invalid(format!("{field} must be a YYYY-MM-DD date, got {value:?}: {e}"))
    })
}
