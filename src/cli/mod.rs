//! Command-line interface definition

use clap::Parser;
use std::io::IsTerminal;

/// Container Bench - benchmark a containerized HTTP service
#[derive(Parser, Debug, Clone)]
#[command(name = "cbench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Container image to benchmark
    pub image: String,

    /// Name for the container instance under test
    pub instance: String,

    /// Total number of requests to issue during the load test
    #[arg(long, env = "CBENCH_REQUESTS", default_value_t = crate::defaults::DEFAULT_TOTAL_REQUESTS)]
    pub requests: u32,

    /// Number of concurrent load test workers
    #[arg(long, env = "CBENCH_CONCURRENCY", default_value_t = crate::defaults::DEFAULT_CONCURRENCY)]
    pub concurrency: u32,

    /// Host the service listens on
    #[arg(long, default_value = crate::defaults::DEFAULT_HOST)]
    pub host: String,

    /// Port the service listens on (also published from the container)
    #[arg(long, default_value_t = crate::defaults::DEFAULT_PORT)]
    pub port: u16,

    /// Endpoint path targeted by the load test
    #[arg(long, default_value = crate::defaults::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Endpoint path polled for readiness
    #[arg(long, default_value = crate::defaults::DEFAULT_HEALTH_ENDPOINT)]
    pub health_endpoint: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "CBENCH_TIMEOUT", default_value_t = crate::defaults::DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Maximum number of health-check polling attempts (one per second)
    #[arg(long, default_value_t = crate::defaults::DEFAULT_HEALTH_ATTEMPTS)]
    pub health_attempts: u32,

    /// Directory the JSON report is written to
    #[arg(long, env = "CBENCH_OUTPUT_DIR", default_value = crate::defaults::DEFAULT_OUTPUT_DIR)]
    pub output_dir: String,

    /// KEY=VALUE file whose entries are passed to the container environment
    #[arg(long)]
    pub env_file: Option<String>,

    /// Container runtime binary to drive
    #[arg(long, default_value = crate::defaults::DEFAULT_RUNTIME_BINARY)]
    pub runtime: String,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts and requirements
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.image.trim().is_empty() {
            return Err("Image name cannot be empty".to_string());
        }

        if self.instance.trim().is_empty() {
            return Err("Instance name cannot be empty".to_string());
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Detect whether the terminal supports colored output
fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    std::io::stdout().is_terminal()
}
