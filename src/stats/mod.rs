//! Latency aggregation for load test runs

use serde::{Deserialize, Serialize};

/// Minimum sample count before a p95 value is reported
const P95_MIN_SAMPLES: usize = 21;

/// Minimum sample count before a p99 value is reported
const P99_MIN_SAMPLES: usize = 101;

/// Latency distribution summary over successful request samples
///
/// Percentiles use floor-index binning over the ascending sorted samples.
/// Sample sets too small to support a percentile meaningfully report the
/// 0.0 sentinel instead of a misleading value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    /// Mean latency in milliseconds
    pub avg_ms: f64,

    /// Minimum latency in milliseconds
    pub min_ms: f64,

    /// Maximum latency in milliseconds
    pub max_ms: f64,

    /// 95th percentile latency (0.0 below the reporting threshold)
    pub p95_ms: f64,

    /// 99th percentile latency (0.0 below the reporting threshold)
    pub p99_ms: f64,

    /// Number of samples the summary was computed from
    pub sample_count: usize,
}

impl LatencySummary {
    /// Create an all-zero summary
    pub fn empty() -> Self {
        Self {
            avg_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            sample_count: 0,
        }
    }

    /// Compute a summary over latency samples in milliseconds
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::empty();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();

        let p95_ms = if count >= P95_MIN_SAMPLES {
            percentile(&sorted, 0.95)
        } else {
            0.0
        };

        let p99_ms = if count >= P99_MIN_SAMPLES {
            percentile(&sorted, 0.99)
        } else {
            0.0
        };

        Self {
            avg_ms: sum / count as f64,
            min_ms: sorted[0],
            max_ms: sorted[count - 1],
            p95_ms,
            p99_ms,
            sample_count: count,
        }
    }
}

/// Pick the floor-index percentile from an ascending sorted slice
///
/// Index is ⌊n · p⌋, clamped to the last element. No interpolation.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let index = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_samples() {
        let summary = LatencySummary::from_samples(&[]);
        assert_eq!(summary, LatencySummary::empty());
    }

    #[test]
    fn test_single_sample() {
        let summary = LatencySummary::from_samples(&[42.0]);
        assert_eq!(summary.avg_ms, 42.0);
        assert_eq!(summary.min_ms, 42.0);
        assert_eq!(summary.max_ms, 42.0);
        // Below both reporting thresholds
        assert_eq!(summary.p95_ms, 0.0);
        assert_eq!(summary.p99_ms, 0.0);
        assert_eq!(summary.sample_count, 1);
    }

    #[test]
    fn test_small_sample_sentinels() {
        // 20 samples: still below the p95 threshold
        let samples: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let summary = LatencySummary::from_samples(&samples);
        assert_eq!(summary.p95_ms, 0.0);
        assert_eq!(summary.p99_ms, 0.0);

        // 21 samples: p95 reported, p99 still suppressed
        let samples: Vec<f64> = (1..=21).map(|i| i as f64).collect();
        let summary = LatencySummary::from_samples(&samples);
        assert!(summary.p95_ms > 0.0);
        assert_eq!(summary.p99_ms, 0.0);

        // 101 samples: both reported
        let samples: Vec<f64> = (1..=101).map(|i| i as f64).collect();
        let summary = LatencySummary::from_samples(&samples);
        assert!(summary.p95_ms > 0.0);
        assert!(summary.p99_ms > 0.0);
    }

    #[test]
    fn test_percentile_binning() {
        // 100 samples 1..=100: ⌊100 * 0.95⌋ = index 95 → value 96
        let samples: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        let summary = LatencySummary::from_samples(&samples);
        assert_eq!(summary.p95_ms, 96.0);
        assert_eq!(summary.min_ms, 1.0);
        assert_eq!(summary.max_ms, 100.0);
        assert_eq!(summary.avg_ms, 50.5);
    }

    #[test]
    fn test_percentile_index_clamped() {
        let sorted = vec![1.0, 2.0, 3.0];
        assert_eq!(percentile(&sorted, 1.0), 3.0);
    }

    #[test]
    fn test_unsorted_input() {
        let samples = vec![30.0, 10.0, 20.0];
        let summary = LatencySummary::from_samples(&samples);
        assert_eq!(summary.min_ms, 10.0);
        assert_eq!(summary.max_ms, 30.0);
        assert_eq!(summary.avg_ms, 20.0);
    }

    #[test]
    fn test_uniform_samples() {
        let samples = vec![10.0; 2000];
        let summary = LatencySummary::from_samples(&samples);
        assert_eq!(summary.avg_ms, 10.0);
        assert_eq!(summary.min_ms, 10.0);
        assert_eq!(summary.max_ms, 10.0);
        assert_eq!(summary.p95_ms, 10.0);
        assert_eq!(summary.p99_ms, 10.0);
    }

    proptest! {
        #[test]
        fn prop_percentiles_bounded_by_min_max(
            samples in prop::collection::vec(0.0f64..10_000.0, 101..500)
        ) {
            let summary = LatencySummary::from_samples(&samples);

            prop_assert!(summary.min_ms <= summary.avg_ms);
            prop_assert!(summary.avg_ms <= summary.max_ms);
            prop_assert!(summary.p95_ms >= summary.min_ms);
            prop_assert!(summary.p95_ms <= summary.max_ms);
            prop_assert!(summary.p99_ms >= summary.min_ms);
            prop_assert!(summary.p99_ms <= summary.max_ms);
            prop_assert!(summary.p95_ms <= summary.p99_ms);
        }

        #[test]
        fn prop_summary_ignores_input_order(
            mut samples in prop::collection::vec(0.0f64..10_000.0, 1..200)
        ) {
            let forward = LatencySummary::from_samples(&samples);
            samples.reverse();
            let reversed = LatencySummary::from_samples(&samples);
            prop_assert_eq!(forward, reversed);
        }
    }
}
