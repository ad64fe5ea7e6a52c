//! Main application orchestration
//!
//! Sequences one benchmark run: start the container, wait for health,
//! sample startup time and idle memory, drive the load test, sample loaded
//! memory, tear the container down and emit the consolidated report.

use crate::{
    cli::Cli,
    config::{load_config, Config},
    error::{AppError, Result},
    loadgen::{LoadGenerator, SystemResources},
    logging::{LogLevel, Logger},
    models::{BenchmarkReport, EnvironmentMetrics},
    output::{OutputFormatterFactory, ReportWriter},
    runtime::{CliRuntime, ContainerRuntime, EnvironmentController},
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Coordinates one full benchmark run
pub struct App {
    config: Config,
    logger: Logger,
}

impl App {
    /// Create a new application instance from parsed CLI arguments
    pub fn new(cli: Cli) -> Result<Self> {
        cli.validate().map_err(AppError::config)?;
        let config = load_config(cli)?;

        let min_level = if config.debug {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };
        let logger = Logger::new(min_level, config.enable_color);

        Ok(Self { config, logger })
    }

    /// Run the benchmark to completion
    pub async fn run(self) -> Result<()> {
        let config = &self.config;

        println!("=== Benchmarking {} ===", config.image);

        if config.debug {
            let resources = SystemResources::detect();
            self.logger.debug(&format!("run id: {}", self.logger.run_id()));
            self.logger.debug(&format!(
                "target: {} | health: {} | {} requests, {} workers, {}s timeout",
                config.target_url()?,
                config.health_url()?,
                config.total_requests,
                config.concurrency,
                config.timeout_seconds
            ));
            self.logger.debug(&format!(
                "host resources: {} cores, suggested concurrency {}",
                resources.cpu_cores, resources.suggested_concurrency
            ));
            if resources.oversubscribed(config.concurrency) {
                self.logger.warn(&format!(
                    "concurrency {} heavily oversubscribes {} cores; latency numbers may reflect the load generator rather than the service",
                    config.concurrency, resources.cpu_cores
                ));
            }
        }

        let runtime: Arc<dyn ContainerRuntime> = Arc::new(CliRuntime::new(config.runtime.clone()));
        let controller = EnvironmentController::new(
            runtime,
            config.image.clone(),
            config.instance.clone(),
            config.port,
        );

        let container_env = config.container_env()?;
        if config.verbose && !container_env.is_empty() {
            println!(
                "Forwarding {} environment entries to the container",
                container_env.len()
            );
        }

        println!("Starting container...");
        controller.start(&container_env).await?;

        println!("Waiting for health check...");
        let health_client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;
        let health_url = config.health_url()?;
        let healthy = controller
            .await_healthy(
                &health_client,
                &health_url,
                config.health_attempts,
                crate::defaults::DEFAULT_HEALTH_INTERVAL,
            )
            .await;

        if !healthy {
            eprintln!("Container failed to start or pass health check");
            let logs = controller.capture_logs().await;
            if !logs.is_empty() {
                eprintln!("{}", logs);
            }
            if let Err(e) = controller.stop_and_remove().await {
                self.logger.warn(&format!("Cleanup after failed start: {}", e));
            }
            return Err(AppError::health_check(format!(
                "Service did not pass the health check within {} attempts",
                config.health_attempts
            )));
        }

        let startup_time_s = controller.sample_startup_duration().await;

        // Let the freshly started service settle before the idle sample.
        tokio::time::sleep(crate::defaults::DEFAULT_STABILIZE_DELAY).await;
        let memory_idle_mb = controller.sample_memory().await;

        println!("Startup Time: {}s", startup_time_s);
        println!("Idle Memory: {:.2} MB", memory_idle_mb);

        println!(
            "Running Load Test ({} requests, {} concurrency)...",
            config.total_requests, config.concurrency
        );
        let generator = LoadGenerator::new(config.load_test_config()?)?;
        let load_test = generator.run().await?;

        let memory_loaded_mb = controller.sample_memory().await;
        println!("Loaded Memory: {:.2} MB", memory_loaded_mb);

        if let Err(e) = controller.stop_and_remove().await {
            // The measurements already exist; a failed teardown should not
            // discard them.
            self.logger.warn(&format!("Teardown failed: {}", e));
        }

        let report = BenchmarkReport::new(
            config.image.clone(),
            self.logger.run_id(),
            EnvironmentMetrics {
                startup_time_s,
                memory_idle_mb,
                memory_loaded_mb,
            },
            load_test,
        );

        let formatter = OutputFormatterFactory::create_formatter(config.enable_color);
        println!();
        println!("{}", formatter.format_report(&report));
        println!("{}", serde_json::to_string_pretty(&report)?);

        let writer = ReportWriter::new(&config.output_dir);
        let path = writer.write(&config.instance, &report)?;
        println!("Report written to {}", path.display());

        Ok(())
    }
}
