//! JSON report persistence

use crate::error::Result;
use crate::models::BenchmarkReport;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes benchmark reports to the output directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Create a writer rooted at the given directory
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Path the report for an instance will be written to
    pub fn report_path(&self, instance: &str) -> PathBuf {
        self.output_dir.join(format!("{}_report.json", instance))
    }

    /// Persist a report as pretty-printed JSON, creating the directory
    pub fn write(&self, instance: &str, report: &BenchmarkReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let path = self.report_path(instance);
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json)?;

        Ok(path)
    }
}
