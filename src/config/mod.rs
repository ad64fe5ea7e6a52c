//! Configuration data model and validation

use crate::cli::Cli;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Container image to benchmark
    #[serde(default)]
    pub image: String,

    /// Name of the container instance under test
    #[serde(default)]
    pub instance: String,

    /// Host the service listens on
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the service listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Endpoint path targeted by the load test
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Endpoint path polled for readiness
    #[serde(default = "default_health_endpoint")]
    pub health_endpoint: String,

    /// Total number of requests to issue during the load test
    #[serde(default = "default_total_requests")]
    pub total_requests: u32,

    /// Number of concurrent load test workers
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Maximum number of health-check polling attempts
    #[serde(default = "default_health_attempts")]
    pub health_attempts: u32,

    /// Directory the JSON report is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Optional KEY=VALUE file forwarded to the container environment
    #[serde(default)]
    pub env_file: Option<String>,

    /// Container runtime binary to drive
    #[serde(default = "default_runtime_binary")]
    pub runtime: String,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image: String::new(),
            instance: String::new(),
            host: default_host(),
            port: default_port(),
            endpoint: default_endpoint(),
            health_endpoint: default_health_endpoint(),
            total_requests: default_total_requests(),
            concurrency: default_concurrency(),
            timeout_seconds: default_timeout_secs(),
            health_attempts: default_health_attempts(),
            output_dir: default_output_dir(),
            env_file: None,
            runtime: default_runtime_binary(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get per-request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Build the load test target URL
    pub fn target_url(&self) -> Result<Url> {
        build_url(&self.host, self.port, &self.endpoint)
    }

    /// Build the health-check URL
    pub fn health_url(&self) -> Result<Url> {
        build_url(&self.host, self.port, &self.health_endpoint)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.image.trim().is_empty() {
            return Err(AppError::config("Image name cannot be empty"));
        }

        if self.instance.trim().is_empty() {
            return Err(AppError::config("Instance name cannot be empty"));
        }

        if self
            .instance
            .chars()
            .any(|c| !c.is_ascii_alphanumeric() && c != '-' && c != '_' && c != '.')
        {
            return Err(AppError::config(format!(
                "Instance name '{}' contains characters the container runtime rejects",
                self.instance
            )));
        }

        if self.host.trim().is_empty() {
            return Err(AppError::config("Host cannot be empty"));
        }

        if !self.endpoint.starts_with('/') {
            return Err(AppError::config(format!(
                "Endpoint path must start with '/': {}",
                self.endpoint
            )));
        }

        if !self.health_endpoint.starts_with('/') {
            return Err(AppError::config(format!(
                "Health endpoint path must start with '/': {}",
                self.health_endpoint
            )));
        }

        // Both URLs must parse before the run starts
        self.target_url()?;
        self.health_url()?;

        if self.total_requests > 1_000_000 {
            return Err(AppError::config("Total requests cannot exceed 1000000"));
        }

        if self.concurrency > 1000 {
            return Err(AppError::config("Concurrency cannot exceed 1000"));
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > 300 {
            return Err(AppError::config("Timeout cannot exceed 300 seconds"));
        }

        if self.health_attempts == 0 {
            return Err(AppError::config("Health attempts must be greater than 0"));
        }

        if let Some(env_file) = &self.env_file {
            if !Path::new(env_file).is_file() {
                return Err(AppError::config(format!(
                    "Environment file not found: {}",
                    env_file
                )));
            }
        }

        Ok(())
    }

    /// Load KEY=VALUE pairs destined for the container environment
    pub fn container_env(&self) -> Result<Vec<(String, String)>> {
        let Some(env_file) = &self.env_file else {
            return Ok(Vec::new());
        };

        let mut pairs = Vec::new();
        for item in dotenv::from_path_iter(Path::new(env_file))? {
            let (key, value) = item?;
            pairs.push((key, value));
        }

        Ok(pairs)
    }

    /// Derive the load generator configuration for this run
    pub fn load_test_config(&self) -> Result<LoadTestConfig> {
        Ok(LoadTestConfig {
            target_url: self.target_url()?,
            total_requests: self.total_requests,
            concurrency: self.concurrency,
            request_timeout: self.timeout(),
        })
    }
}

/// Immutable parameters handed to the load generator
#[derive(Debug, Clone)]
pub struct LoadTestConfig {
    /// Fully assembled target URL
    pub target_url: Url,

    /// Shared attempt budget across all workers
    pub total_requests: u32,

    /// Number of concurrent workers
    pub concurrency: u32,

    /// Per-request timeout
    pub request_timeout: Duration,
}

/// Assemble the runtime configuration from parsed CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    let enable_color = cli.use_colors();

    let config = Config {
        image: cli.image,
        instance: cli.instance,
        host: cli.host,
        port: cli.port,
        endpoint: cli.endpoint,
        health_endpoint: cli.health_endpoint,
        total_requests: cli.requests,
        concurrency: cli.concurrency,
        timeout_seconds: cli.timeout,
        health_attempts: cli.health_attempts,
        output_dir: cli.output_dir,
        env_file: cli.env_file,
        runtime: cli.runtime,
        enable_color,
        verbose: cli.verbose,
        debug: cli.debug,
    };

    config.validate()?;
    Ok(config)
}

fn build_url(host: &str, port: u16, path: &str) -> Result<Url> {
    let raw = format!("http://{}:{}{}", host, port, path);
    Url::parse(&raw)
        .map_err(|e| AppError::config(format!("Invalid target URL '{}': {}", raw, e)))
}

fn default_host() -> String {
    crate::defaults::DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    crate::defaults::DEFAULT_PORT
}

fn default_endpoint() -> String {
    crate::defaults::DEFAULT_ENDPOINT.to_string()
}

fn default_health_endpoint() -> String {
    crate::defaults::DEFAULT_HEALTH_ENDPOINT.to_string()
}

fn default_total_requests() -> u32 {
    crate::defaults::DEFAULT_TOTAL_REQUESTS
}

fn default_concurrency() -> u32 {
    crate::defaults::DEFAULT_CONCURRENCY
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_REQUEST_TIMEOUT.as_secs()
}

fn default_health_attempts() -> u32 {
    crate::defaults::DEFAULT_HEALTH_ATTEMPTS
}

fn default_output_dir() -> String {
    crate::defaults::DEFAULT_OUTPUT_DIR.to_string()
}

fn default_runtime_binary() -> String {
    crate::defaults::DEFAULT_RUNTIME_BINARY.to_string()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
