//! Container runtime control and environment metric scraping
//!
//! Thin async wrappers over a container runtime CLI (`docker` by default).
//! The two derived metrics are scraped from textual output: startup
//! duration from the service log line and memory usage from the runtime's
//! stats command. Both parsers are defensive and substitute a sentinel on
//! any mismatch instead of failing the run.

use crate::error::{AppError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::process::Command;
use url::Url;

/// Sentinel reported when the startup duration cannot be scraped
pub const STARTUP_TIME_UNKNOWN: f64 = -1.0;

/// Sentinel reported when memory usage cannot be parsed
pub const MEMORY_UNKNOWN_MB: f64 = 0.0;

/// Abstraction over a container runtime command-line interface
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Start a detached container publishing `port` from the image
    async fn run_detached(
        &self,
        image: &str,
        instance: &str,
        port: u16,
        env: &[(String, String)],
    ) -> Result<()>;

    /// Stop a running container
    async fn stop(&self, instance: &str) -> Result<()>;

    /// Remove a stopped container
    async fn remove(&self, instance: &str) -> Result<()>;

    /// One-shot memory usage line, e.g. `45.5MiB / 7.6GiB`
    async fn mem_usage(&self, instance: &str) -> Result<String>;

    /// Full container log output
    async fn logs(&self, instance: &str) -> Result<String>;
}

/// Container runtime driven through its CLI binary
pub struct CliRuntime {
    binary: String,
}

impl CliRuntime {
    /// Create a runtime wrapper around the given binary name
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn exec(&self, args: &[String]) -> Result<String> {
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                AppError::runtime(format!("Failed to spawn '{}': {}", self.binary, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::runtime(format!(
                "'{} {}' failed: {}",
                self.binary,
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl ContainerRuntime for CliRuntime {
    async fn run_detached(
        &self,
        image: &str,
        instance: &str,
        port: u16,
        env: &[(String, String)],
    ) -> Result<()> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            instance.to_string(),
            "-p".to_string(),
            format!("{}:{}", port, port),
        ];

        for (key, value) in env {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }

        args.push(image.to_string());

        self.exec(&args).await?;
        Ok(())
    }

    async fn stop(&self, instance: &str) -> Result<()> {
        self.exec(&["stop".to_string(), instance.to_string()]).await?;
        Ok(())
    }

    async fn remove(&self, instance: &str) -> Result<()> {
        self.exec(&["rm".to_string(), instance.to_string()]).await?;
        Ok(())
    }

    async fn mem_usage(&self, instance: &str) -> Result<String> {
        self.exec(&[
            "stats".to_string(),
            "--no-stream".to_string(),
            "--format".to_string(),
            "{{.MemUsage}}".to_string(),
            instance.to_string(),
        ])
        .await
    }

    async fn logs(&self, instance: &str) -> Result<String> {
        self.exec(&["logs".to_string(), instance.to_string()]).await
    }
}

/// Parse a runtime MemUsage value into megabytes
///
/// Input looks like `45.5MiB / 7.6GiB`; only the part before the slash is
/// relevant. Returns the sentinel on any mismatch.
pub fn parse_mem_usage(raw: &str) -> f64 {
    let Some(mem_str) = raw.split('/').next() else {
        return MEMORY_UNKNOWN_MB;
    };
    let mem_str = mem_str.trim();

    let (value, scale) = if let Some(v) = mem_str.strip_suffix("GiB") {
        (v, 1024.0)
    } else if let Some(v) = mem_str.strip_suffix("MiB") {
        (v, 1.0)
    } else if let Some(v) = mem_str.strip_suffix("KiB") {
        (v, 1.0 / 1024.0)
    } else if let Some(v) = mem_str.strip_suffix('B') {
        (v, 1.0 / (1024.0 * 1024.0))
    } else {
        return MEMORY_UNKNOWN_MB;
    };

    match value.trim().parse::<f64>() {
        Ok(parsed) => parsed * scale,
        Err(_) => MEMORY_UNKNOWN_MB,
    }
}

/// Scrape the self-reported startup duration from container logs
///
/// Matches the framework's readiness line, e.g.
/// `... started in 2.851s. Listening on: http://0.0.0.0:8080`.
/// Returns the sentinel when no line matches.
pub fn parse_startup_seconds(logs: &str) -> f64 {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"started in ([0-9]+(?:\.[0-9]+)?)s\.").expect("startup pattern is valid")
    });

    for line in logs.lines() {
        if let Some(captures) = pattern.captures(line) {
            if let Ok(seconds) = captures[1].parse::<f64>() {
                return seconds;
            }
        }
    }

    STARTUP_TIME_UNKNOWN
}

/// Lifecycle controller for the single service instance under test
pub struct EnvironmentController {
    runtime: Arc<dyn ContainerRuntime>,
    image: String,
    instance: String,
    port: u16,
}

impl EnvironmentController {
    /// Create a controller for one instance
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        image: String,
        instance: String,
        port: u16,
    ) -> Self {
        Self {
            runtime,
            image,
            instance,
            port,
        }
    }

    /// Start the instance, replacing any stale container with the same name
    pub async fn start(&self, env: &[(String, String)]) -> Result<()> {
        // Stale containers from aborted runs would make `run --name` fail;
        // cleanup failures here are expected and ignored.
        let _ = self.runtime.stop(&self.instance).await;
        let _ = self.runtime.remove(&self.instance).await;

        self.runtime
            .run_detached(&self.image, &self.instance, self.port, env)
            .await
    }

    /// Poll the health endpoint until it returns 200 or attempts run out
    pub async fn await_healthy(
        &self,
        client: &Client,
        health_url: &Url,
        attempts: u32,
        interval: Duration,
    ) -> bool {
        for _ in 0..attempts {
            match client.get(health_url.clone()).send().await {
                Ok(response) if response.status() == StatusCode::OK => return true,
                _ => {}
            }
            tokio::time::sleep(interval).await;
        }

        false
    }

    /// Sample current memory usage in megabytes (sentinel on failure)
    pub async fn sample_memory(&self) -> f64 {
        match self.runtime.mem_usage(&self.instance).await {
            Ok(raw) => parse_mem_usage(&raw),
            Err(_) => MEMORY_UNKNOWN_MB,
        }
    }

    /// Scrape the service's self-reported startup duration (sentinel on failure)
    pub async fn sample_startup_duration(&self) -> f64 {
        match self.runtime.logs(&self.instance).await {
            Ok(logs) => parse_startup_seconds(&logs),
            Err(_) => STARTUP_TIME_UNKNOWN,
        }
    }

    /// Capture container logs for diagnostics (empty on failure)
    pub async fn capture_logs(&self) -> String {
        self.runtime.logs(&self.instance).await.unwrap_or_default()
    }

    /// Stop and remove the instance
    pub async fn stop_and_remove(&self) -> Result<()> {
        self.runtime.stop(&self.instance).await?;
        self.runtime.remove(&self.instance).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Canned-response runtime for controller tests
    struct FakeRuntime {
        mem_usage: Result<String>,
        logs: Result<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeRuntime {
        fn new(mem_usage: Result<String>, logs: Result<String>) -> Self {
            Self {
                mem_usage,
                logs,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: &str) {
            self.calls.lock().unwrap().push(call.to_string());
        }

        fn clone_result(result: &Result<String>) -> Result<String> {
            match result {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(AppError::runtime(e.to_string())),
            }
        }
    }

    #[async_trait]
    impl ContainerRuntime for FakeRuntime {
        async fn run_detached(
            &self,
            _image: &str,
            _instance: &str,
            _port: u16,
            _env: &[(String, String)],
        ) -> Result<()> {
            self.record("run");
            Ok(())
        }

        async fn stop(&self, _instance: &str) -> Result<()> {
            self.record("stop");
            Err(AppError::runtime("no such container"))
        }

        async fn remove(&self, _instance: &str) -> Result<()> {
            self.record("rm");
            Err(AppError::runtime("no such container"))
        }

        async fn mem_usage(&self, _instance: &str) -> Result<String> {
            self.record("stats");
            Self::clone_result(&self.mem_usage)
        }

        async fn logs(&self, _instance: &str) -> Result<String> {
            self.record("logs");
            Self::clone_result(&self.logs)
        }
    }

    fn controller(runtime: FakeRuntime) -> EnvironmentController {
        EnvironmentController::new(
            Arc::new(runtime),
            "quarkus-app:latest".to_string(),
            "bench-1".to_string(),
            8080,
        )
    }

    #[test]
    fn test_parse_mem_usage_units() {
        assert_eq!(parse_mem_usage("45.5MiB / 7.6GiB"), 45.5);
        assert_eq!(parse_mem_usage("2GiB / 7.6GiB"), 2048.0);
        assert_eq!(parse_mem_usage("512KiB / 7.6GiB"), 0.5);
        assert!((parse_mem_usage("1048576B / 7.6GiB") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_mem_usage_sentinel_on_garbage() {
        assert_eq!(parse_mem_usage(""), MEMORY_UNKNOWN_MB);
        assert_eq!(parse_mem_usage("not memory"), MEMORY_UNKNOWN_MB);
        assert_eq!(parse_mem_usage("abcMiB / 7.6GiB"), MEMORY_UNKNOWN_MB);
        assert_eq!(parse_mem_usage("45.5TiB / 7.6GiB"), MEMORY_UNKNOWN_MB);
    }

    #[test]
    fn test_parse_startup_seconds() {
        let logs = "\
__  ____  __  _____\n\
2024-01-01 INFO  [io.quarkus] quarkus-app 1.0 on JVM started in 2.851s. Listening on: http://0.0.0.0:8080\n\
2024-01-01 INFO  [io.quarkus] Profile prod activated.";
        assert_eq!(parse_startup_seconds(logs), 2.851);
    }

    #[test]
    fn test_parse_startup_seconds_sentinel() {
        assert_eq!(parse_startup_seconds(""), STARTUP_TIME_UNKNOWN);
        assert_eq!(
            parse_startup_seconds("no readiness line here"),
            STARTUP_TIME_UNKNOWN
        );
        // A matching phrase without the trailing period delimiter
        assert_eq!(
            parse_startup_seconds("started in a hurry"),
            STARTUP_TIME_UNKNOWN
        );
    }

    #[test]
    fn test_parse_startup_seconds_integer_value() {
        assert_eq!(
            parse_startup_seconds("app started in 3s. Listening on: http://0.0.0.0:8080"),
            3.0
        );
    }

    #[tokio::test]
    async fn test_sample_memory_sentinel_on_runtime_error() {
        let controller = controller(FakeRuntime::new(
            Err(AppError::runtime("stats failed")),
            Ok(String::new()),
        ));
        assert_eq!(controller.sample_memory().await, MEMORY_UNKNOWN_MB);
    }

    #[tokio::test]
    async fn test_sample_memory_parses_runtime_output() {
        let controller = controller(FakeRuntime::new(
            Ok("128MiB / 7.6GiB".to_string()),
            Ok(String::new()),
        ));
        assert_eq!(controller.sample_memory().await, 128.0);
    }

    #[tokio::test]
    async fn test_sample_startup_duration_sentinel_on_error() {
        let controller = controller(FakeRuntime::new(
            Ok(String::new()),
            Err(AppError::runtime("logs failed")),
        ));
        assert_eq!(
            controller.sample_startup_duration().await,
            STARTUP_TIME_UNKNOWN
        );
    }

    #[tokio::test]
    async fn test_capture_logs_empty_on_error() {
        let controller = controller(FakeRuntime::new(
            Ok(String::new()),
            Err(AppError::runtime("logs failed")),
        ));
        assert_eq!(controller.capture_logs().await, "");
    }

    #[tokio::test]
    async fn test_start_ignores_cleanup_failures() {
        let runtime = Arc::new(FakeRuntime::new(Ok(String::new()), Ok(String::new())));
        let runtime_dyn: Arc<dyn ContainerRuntime> = runtime.clone();
        let controller = EnvironmentController::new(
            runtime_dyn,
            "quarkus-app:latest".to_string(),
            "bench-1".to_string(),
            8080,
        );

        // stop/rm both fail in FakeRuntime; start must still succeed
        assert!(controller.start(&[]).await.is_ok());

        let calls = runtime.calls.lock().unwrap().clone();
        assert_eq!(calls, ["stop", "rm", "run"]);
    }
}
