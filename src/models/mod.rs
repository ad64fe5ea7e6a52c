//! Data models for request outcomes and benchmark reports

pub mod metrics;
pub mod report;

pub use metrics::{LoadTestReport, RequestOutcome};
pub use report::{BenchmarkReport, EnvironmentMetrics};
