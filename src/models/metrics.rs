//! Request outcome and load test aggregate models

use crate::stats::LatencySummary;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a single load test request attempt
///
/// Exactly one of the two variants holds per completed attempt. A response
/// of any HTTP status counts as a success; only transport-level failures
/// (connection errors, timeouts) are recorded as failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RequestOutcome {
    /// A response was received within the timeout
    Success {
        /// Wall-clock time from dispatch to full body consumption
        latency: Duration,
        /// HTTP status code received (recorded, not classified)
        http_status: u16,
    },
    /// The attempt failed at the transport level
    Failure {
        /// Opaque description of the failure
        reason: String,
    },
}

impl RequestOutcome {
    /// Create a successful outcome
    pub fn success(latency: Duration, http_status: u16) -> Self {
        Self::Success {
            latency,
            http_status,
        }
    }

    /// Create a failed outcome
    pub fn failure<S: Into<String>>(reason: S) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }

    /// Check if this outcome is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Latency in milliseconds for successful outcomes
    pub fn latency_ms(&self) -> Option<f64> {
        match self {
            Self::Success { latency, .. } => Some(latency.as_secs_f64() * 1000.0),
            Self::Failure { .. } => None,
        }
    }

    /// Failure reason, if any
    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason } => Some(reason.as_str()),
        }
    }
}

/// Aggregate of all load test outcomes
///
/// `total_requests` counts successful requests, matching the report shape
/// consumers of this tool already parse; failed attempts are in `errors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadTestReport {
    /// Number of successful requests
    pub total_requests: usize,

    /// Number of failed request attempts
    pub errors: usize,

    /// Wall-clock duration of the entire load test run in seconds
    pub total_time_sec: f64,

    /// Successful requests per second over the whole run
    pub throughput_rps: f64,

    /// Mean latency over successful requests (milliseconds)
    pub avg_latency_ms: f64,

    /// 95th percentile latency (0.0 below the reporting threshold)
    pub p95_latency_ms: f64,

    /// 99th percentile latency (0.0 below the reporting threshold)
    pub p99_latency_ms: f64,

    /// Minimum successful latency (milliseconds)
    pub min_latency_ms: f64,

    /// Maximum successful latency (milliseconds)
    pub max_latency_ms: f64,
}

impl LoadTestReport {
    /// Create an empty report for degenerate runs
    pub fn empty() -> Self {
        Self {
            total_requests: 0,
            errors: 0,
            total_time_sec: 0.0,
            throughput_rps: 0.0,
            avg_latency_ms: 0.0,
            p95_latency_ms: 0.0,
            p99_latency_ms: 0.0,
            min_latency_ms: 0.0,
            max_latency_ms: 0.0,
        }
    }

    /// Aggregate a completed run's outcomes
    pub fn from_outcomes(outcomes: &[RequestOutcome], elapsed: Duration) -> Self {
        let latencies: Vec<f64> = outcomes.iter().filter_map(|o| o.latency_ms()).collect();
        let errors = outcomes.len() - latencies.len();
        let total_time_sec = elapsed.as_secs_f64();

        let throughput_rps = if total_time_sec > 0.0 {
            latencies.len() as f64 / total_time_sec
        } else {
            0.0
        };

        let summary = LatencySummary::from_samples(&latencies);

        Self {
            total_requests: latencies.len(),
            errors,
            total_time_sec,
            throughput_rps,
            avg_latency_ms: summary.avg_ms,
            p95_latency_ms: summary.p95_ms,
            p99_latency_ms: summary.p99_ms,
            min_latency_ms: summary.min_ms,
            max_latency_ms: summary.max_ms,
        }
    }

    /// Total number of attempts issued
    pub fn attempts(&self) -> usize {
        self.total_requests + self.errors
    }

    /// Success rate as a percentage of attempts
    pub fn success_rate(&self) -> f64 {
        let attempts = self.attempts();
        if attempts == 0 {
            0.0
        } else {
            (self.total_requests as f64 / attempts as f64) * 100.0
        }
    }
}
