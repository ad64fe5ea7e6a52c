//! Load generator integration tests against a mock HTTP server

use container_bench::config::LoadTestConfig;
use container_bench::loadgen::LoadGenerator;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_config(base: &str, total_requests: u32, concurrency: u32) -> LoadTestConfig {
    LoadTestConfig {
        target_url: Url::parse(&format!("{}/api/recipes", base)).unwrap(),
        total_requests,
        concurrency,
        request_timeout: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn test_budget_is_exact_under_contention() {
    let server = MockServer::start().await;

    // The mock verifies on drop that exactly the configured budget arrived,
    // no overshoot from racing workers.
    Mock::given(method("GET"))
        .and(path("/api/recipes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(120)
        .mount(&server)
        .await;

    let generator = LoadGenerator::new(load_config(&server.uri(), 120, 16)).unwrap();
    let report = generator.run().await.unwrap();

    assert_eq!(report.total_requests, 120);
    assert_eq!(report.errors, 0);
    assert_eq!(report.attempts(), 120);
    assert!(report.total_time_sec > 0.0);
    assert!(report.throughput_rps > 0.0);
}

#[tokio::test]
async fn test_latency_statistics_are_consistent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/recipes"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("[]")
                .set_delay(Duration::from_millis(5)),
        )
        .mount(&server)
        .await;

    let generator = LoadGenerator::new(load_config(&server.uri(), 50, 10)).unwrap();
    let report = generator.run().await.unwrap();

    assert_eq!(report.total_requests, 50);
    assert!(report.min_latency_ms >= 5.0);
    assert!(report.min_latency_ms <= report.avg_latency_ms);
    assert!(report.avg_latency_ms <= report.max_latency_ms);

    // 50 samples clears the p95 threshold but not the p99 one.
    assert!(report.p95_latency_ms >= report.min_latency_ms);
    assert!(report.p95_latency_ms <= report.max_latency_ms);
    assert_eq!(report.p99_latency_ms, 0.0);
}

#[tokio::test]
async fn test_error_status_codes_count_as_requests() {
    let server = MockServer::start().await;

    // Only transport failures count as errors; a 503 is still a response.
    Mock::given(method("GET"))
        .and(path("/api/recipes"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let generator = LoadGenerator::new(load_config(&server.uri(), 25, 5)).unwrap();
    let report = generator.run().await.unwrap();

    assert_eq!(report.total_requests, 25);
    assert_eq!(report.errors, 0);
}

#[tokio::test]
async fn test_unreachable_server_records_all_errors() {
    // Grab a loopback port that refuses connections by letting the mock
    // server allocate it and then shut down.
    let server = MockServer::start().await;
    let base = server.uri();
    drop(server);

    let generator = LoadGenerator::new(load_config(&base, 5, 2)).unwrap();
    let report = generator.run().await.unwrap();

    assert_eq!(report.total_requests, 0);
    assert_eq!(report.errors, 5);
    assert_eq!(report.throughput_rps, 0.0);
    assert_eq!(report.avg_latency_ms, 0.0);
    assert_eq!(report.min_latency_ms, 0.0);
    assert_eq!(report.max_latency_ms, 0.0);
}

#[tokio::test]
async fn test_single_worker_issues_requests_sequentially() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/recipes"))
        .respond_with(ResponseTemplate::new(200))
        .expect(10)
        .mount(&server)
        .await;

    let generator = LoadGenerator::new(load_config(&server.uri(), 10, 1)).unwrap();
    let report = generator.run().await.unwrap();

    assert_eq!(report.total_requests, 10);
    assert_eq!(report.errors, 0);
}
