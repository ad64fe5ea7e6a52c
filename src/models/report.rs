//! Consolidated benchmark report model

use crate::models::LoadTestReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Environment metrics sampled around the load test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentMetrics {
    /// Service-reported startup duration in seconds (-1.0 when unknown)
    pub startup_time_s: f64,

    /// Container memory usage before the load test, in megabytes
    pub memory_idle_mb: f64,

    /// Container memory usage after the load test, in megabytes
    pub memory_loaded_mb: f64,
}

impl EnvironmentMetrics {
    /// Check whether the startup duration could be scraped from the logs
    pub fn startup_time_known(&self) -> bool {
        self.startup_time_s >= 0.0
    }
}

/// Terminal artifact of a benchmark run
///
/// Created once per run and never mutated afterwards; serialized to stdout
/// and to `<output-dir>/<instance>_report.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Image that was benchmarked
    pub image: String,

    /// Correlation ID of this run
    pub run_id: Uuid,

    /// When the report was generated
    pub generated_at: DateTime<Utc>,

    /// Service-reported startup duration in seconds (-1.0 when unknown)
    pub startup_time_s: f64,

    /// Container memory before the load test, in megabytes
    pub memory_idle_mb: f64,

    /// Container memory after the load test, in megabytes
    pub memory_loaded_mb: f64,

    /// Load test aggregate
    pub load_test: LoadTestReport,
}

impl BenchmarkReport {
    /// Assemble the terminal report for a completed run
    pub fn new(
        image: String,
        run_id: Uuid,
        environment: EnvironmentMetrics,
        load_test: LoadTestReport,
    ) -> Self {
        Self {
            image,
            run_id,
            generated_at: Utc::now(),
            startup_time_s: environment.startup_time_s,
            memory_idle_mb: environment.memory_idle_mb,
            memory_loaded_mb: environment.memory_loaded_mb,
            load_test,
        }
    }

    /// Memory growth between the idle and loaded samples, in megabytes
    pub fn memory_delta_mb(&self) -> f64 {
        self.memory_loaded_mb - self.memory_idle_mb
    }
}
