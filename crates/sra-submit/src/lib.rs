//! sra-dispatch submission — turns the resolved resource table into an
//! HTCondor job.
//!
//! Rendering is pure: every number in the output comes straight from a
//! `SubmitConfig` row or the job config. Persisting is a separate step.

pub mod report;

use std::path::{Path, PathBuf};

use sra_core::{FilesConfig, JobConfig, SubmitConfig};
use thiserror::Error;
use tracing::info;

/// Execute-node requirements used unless overridden.
pub const DEFAULT_REQUIREMENTS: &str =
    "((OpSysMajorVer == 7) || (OpSysMajorVer == 8) || (OpSysMajorVer == 9)) && (Target.HasCHTCStaging == true)";

/// Result type alias for submission operations.
pub type SubmitResult<T> = Result<T, SubmitError>;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no node batches to submit")]
    EmptyTable,

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize submit configs: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Rendered job files, not yet on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    /// HTCondor submit description.
    pub submit_file: String,
    /// `queue BATCH, DISK from` input: one `record_list, disk_gb` line per node.
    pub queue_list: String,
    /// Pretty JSON copy of the resource table, shipped with the job.
    pub submit_configs_json: String,
}

/// Renders submissions for one job config.
#[derive(Debug, Clone)]
pub struct SubmissionBuilder<'a> {
    config: &'a JobConfig,
    requirements: String,
}

impl<'a> SubmissionBuilder<'a> {
    pub fn new(config: &'a JobConfig) -> Self {
        Self {
            config,
            requirements: DEFAULT_REQUIREMENTS.to_string(),
        }
    }

    /// Builder method: replace the execute-node requirements expression.
    pub fn with_requirements(self, requirements: impl Into<String>) -> Self {
        Self {
            requirements: requirements.into(),
            ..self
        }
    }

    pub fn render(&self, rows: &[SubmitConfig]) -> SubmitResult<Submission> {
        let first = rows.first().ok_or(SubmitError::EmptyTable)?;

        Ok(Submission {
            submit_file: self.render_submit_file(first),
            queue_list: render_queue_list(rows),
            submit_configs_json: serde_json::to_string_pretty(rows)?,
        })
    }

    fn render_submit_file(&self, row: &SubmitConfig) -> String {
        let config = self.config;
        let files = &config.files;
        let dirs = &config.directory;

        let mut transfer = vec![display(&files.submit_configs)];
        transfer.extend(files.static_files.iter().map(|p| display(p)));
        transfer.extend(files.modules.iter().map(|p| display(p)));
        transfer.push(display(&files.processing_program));
        transfer.push(display(&files.queue_list));
        transfer.push(display(&dirs.record_lists));

        let mut out = String::new();
        out.push_str(&format!("executable = {}\n", display(&files.processing_program)));
        out.push_str(&format!(
            "arguments = $(BATCH) {}\n\n",
            display(&dirs.output_results)
        ));

        out.push_str(&format!("requirements = {}\n", self.requirements));
        out.push_str(&format!("_CONDOR_SCRATCH_DIR = {}\n", display(&dirs.scratch)));
        out.push_str(&format!("request_cpus = {}\n", row.cpu_per_node));
        out.push_str(&format!(
            "request_memory = {}G\n",
            format_gb(row.memory_request_gb)
        ));
        out.push_str("request_disk = $(DISK)G\n\n");

        out.push_str("# file transfer options\n");
        out.push_str(&format!("transfer_input_files = {}\n", transfer.join(", ")));
        out.push_str("should_transfer_files = YES\n");
        out.push_str("when_to_transfer_output = ON_EXIT\n\n");

        out.push_str("# logging\n");
        out.push_str("error = logs/$(Cluster).$(Process).err.txt\n");
        out.push_str("output = logs/$(Cluster).$(Process).out.txt\n");
        out.push_str("log = logs/$(Cluster).$(Process).log.txt\n\n");

        out.push_str(&format!(
            "queue BATCH, DISK from {}\n",
            display(&files.queue_list)
        ));
        out
    }
}

/// One `record_list, disk_gb` line per node, in table order.
///
/// Record lists are named as they appear on the execute node, where the
/// transferred list directory lands by its own name in the scratch dir.
pub fn render_queue_list(rows: &[SubmitConfig]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&format!(
            "{}, {}\n",
            execute_node_path(&row.record_list_path).display(),
            row.disk_request_gb
        ));
    }
    out
}

/// `<list dir name>/<file name>` for a record list on the submit host.
pub fn execute_node_path(record_list_path: &Path) -> PathBuf {
    let file = record_list_path.file_name().map(Path::new);
    let dir = record_list_path.parent().and_then(Path::file_name).map(Path::new);
    match (dir, file) {
        (Some(dir), Some(file)) => dir.join(file),
        (None, Some(file)) => file.to_path_buf(),
        _ => record_list_path.to_path_buf(),
    }
}

impl Submission {
    /// Write the three job files to the paths named in `files`.
    pub fn write(&self, files: &FilesConfig) -> SubmitResult<()> {
        write_file(&files.submit_configs, &self.submit_configs_json)?;
        write_file(&files.queue_list, &self.queue_list)?;
        write_file(&files.submit_file, &self.submit_file)?;

        info!(
            submit_file = %files.submit_file.display(),
            queue_list = %files.queue_list.display(),
            submit_configs = %files.submit_configs.display(),
            "wrote submission"
        );
        Ok(())
    }
}

fn write_file(path: &Path, content: &str) -> SubmitResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| SubmitError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| SubmitError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

/// `16.0` → `16`, `7.5` → `7.5`.
fn format_gb(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
