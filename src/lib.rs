//! Container Bench
//!
//! A benchmarking harness for containerized HTTP services. It starts a
//! service instance from an image, waits for it to report healthy, samples
//! startup latency and memory footprint, drives a fixed-concurrency HTTP
//! load test against a target endpoint and writes a consolidated JSON
//! report.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod loadgen;
pub mod logging;
pub mod models;
pub mod output;
pub mod runtime;
pub mod stats;

// Re-export commonly used types
pub use config::{Config, LoadTestConfig};
pub use error::{AppError, Result};
pub use loadgen::LoadGenerator;
pub use models::{BenchmarkReport, EnvironmentMetrics, LoadTestReport, RequestOutcome};
pub use output::{ColoredFormatter, OutputFormatter, OutputFormatterFactory, PlainFormatter, ReportWriter};
pub use runtime::{CliRuntime, ContainerRuntime, EnvironmentController};
pub use stats::LatencySummary;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_HOST: &str = "localhost";
    pub const DEFAULT_PORT: u16 = 8080;
    pub const DEFAULT_ENDPOINT: &str = "/api/recipes";
    pub const DEFAULT_HEALTH_ENDPOINT: &str = "/health";
    pub const DEFAULT_TOTAL_REQUESTS: u32 = 2000;
    pub const DEFAULT_CONCURRENCY: u32 = 20;
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_HEALTH_ATTEMPTS: u32 = 30;
    pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(1);
    pub const DEFAULT_STABILIZE_DELAY: Duration = Duration::from_secs(2);
    pub const DEFAULT_OUTPUT_DIR: &str = "benchmarks";
    pub const DEFAULT_RUNTIME_BINARY: &str = "docker";
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
