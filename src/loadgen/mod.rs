//! Concurrent HTTP load generation
//!
//! A fixed pool of workers drains a shared attempt budget, each worker
//! looping over claim-one-token, issue-one-GET, record-outcome. The budget
//! is claimed through an atomic counter so the grand total of attempts is
//! exact regardless of how the workers interleave; per-worker counts stay
//! non-deterministic. The generator never fails as a whole on request
//! errors - it always completes and returns whatever aggregate it
//! collected.

use crate::config::LoadTestConfig;
use crate::error::{AppError, Result};
use crate::models::{LoadTestReport, RequestOutcome};
use futures::future::join_all;
use reqwest::Client;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;

/// System resource snapshot used for concurrency hints in debug output
#[derive(Debug, Clone)]
pub struct SystemResources {
    /// Number of logical CPU cores
    pub cpu_cores: usize,
    /// Concurrency level this host comfortably sustains for I/O-bound work
    pub suggested_concurrency: usize,
}

impl SystemResources {
    /// Detect system resources
    pub fn detect() -> Self {
        let cpu_cores = num_cpus::get();
        let suggested_concurrency = (cpu_cores * 2).clamp(4, 50);

        Self {
            cpu_cores,
            suggested_concurrency,
        }
    }

    /// Check whether a configured concurrency level far exceeds this host
    pub fn oversubscribed(&self, concurrency: u32) -> bool {
        concurrency as usize > self.cpu_cores * 8
    }
}

/// Fixed-concurrency HTTP load generator
pub struct LoadGenerator {
    config: LoadTestConfig,
    client: Client,
}

impl LoadGenerator {
    /// Create a generator with a connection pool sized for the worker count
    pub fn new(config: LoadTestConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(config.concurrency.max(1) as usize)
            .connect_timeout(config.request_timeout)
            .user_agent(concat!("container-bench/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Run the load test to completion and aggregate the outcomes
    pub async fn run(&self) -> Result<LoadTestReport> {
        if self.config.total_requests == 0 || self.config.concurrency == 0 {
            return Ok(LoadTestReport::empty());
        }

        let claimed = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let mut workers = Vec::with_capacity(self.config.concurrency as usize);
        for _ in 0..self.config.concurrency {
            let client = self.client.clone();
            let url = self.config.target_url.clone();
            let budget = Arc::clone(&claimed);
            let total = self.config.total_requests;
            let request_timeout = self.config.request_timeout;

            workers.push(tokio::spawn(async move {
                let mut outcomes = Vec::new();
                // fetch_add hands each worker a unique attempt index; an
                // index at or past the budget means the pool is done.
                while budget.fetch_add(1, Ordering::Relaxed) < total {
                    outcomes.push(Self::execute_request(&client, &url, request_timeout).await);
                }
                outcomes
            }));
        }

        let mut outcomes = Vec::with_capacity(self.config.total_requests as usize);
        for worker in join_all(workers).await {
            let worker_outcomes = worker
                .map_err(|e| AppError::load_test(format!("Load test worker failed: {}", e)))?;
            outcomes.extend(worker_outcomes);
        }

        Ok(LoadTestReport::from_outcomes(&outcomes, start.elapsed()))
    }

    /// Issue one GET attempt and classify the outcome
    ///
    /// Latency is measured from dispatch to full body consumption. Any
    /// received response is a success regardless of status code; transport
    /// errors and timeouts are failures.
    async fn execute_request(
        client: &Client,
        url: &Url,
        request_timeout: Duration,
    ) -> RequestOutcome {
        let start = Instant::now();

        let attempt = timeout(request_timeout, async {
            let response = client.get(url.clone()).send().await?;
            let status = response.status().as_u16();
            response.bytes().await?;
            Ok::<u16, reqwest::Error>(status)
        })
        .await;

        match attempt {
            Ok(Ok(status)) => RequestOutcome::success(start.elapsed(), status),
            Ok(Err(e)) => RequestOutcome::failure(e.to_string()),
            Err(_) => RequestOutcome::failure(format!(
                "Request timed out after {:.1}s",
                request_timeout.as_secs_f64()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(total_requests: u32, concurrency: u32, port: u16) -> LoadTestConfig {
        LoadTestConfig {
            target_url: Url::parse(&format!("http://127.0.0.1:{}/api/recipes", port)).unwrap(),
            total_requests,
            concurrency,
            request_timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn test_zero_requests_completes_immediately() {
        let generator = LoadGenerator::new(config(0, 20, 1)).unwrap();
        let report = generator.run().await.unwrap();
        assert_eq!(report, LoadTestReport::empty());
    }

    #[tokio::test]
    async fn test_zero_concurrency_completes_immediately() {
        let generator = LoadGenerator::new(config(2000, 0, 1)).unwrap();
        let report = generator.run().await.unwrap();
        assert_eq!(report, LoadTestReport::empty());
    }

    #[tokio::test]
    async fn test_unreachable_target_counts_errors() {
        // Port 1 on loopback refuses connections immediately.
        let generator = LoadGenerator::new(config(5, 2, 1)).unwrap();
        let report = generator.run().await.unwrap();

        assert_eq!(report.total_requests, 0);
        assert_eq!(report.errors, 5);
        assert_eq!(report.throughput_rps, 0.0);
        assert_eq!(report.avg_latency_ms, 0.0);
    }

    #[tokio::test]
    async fn test_more_workers_than_requests() {
        let generator = LoadGenerator::new(config(3, 20, 1)).unwrap();
        let report = generator.run().await.unwrap();
        // Exactly three attempts even with 20 workers racing for them.
        assert_eq!(report.attempts(), 3);
    }

    #[test]
    fn test_system_resources_detection() {
        let resources = SystemResources::detect();
        assert!(resources.cpu_cores >= 1);
        assert!(resources.suggested_concurrency >= 4);
        assert!(resources.suggested_concurrency <= 50);
        assert!(!resources.oversubscribed(1));
    }
}
