//! End-to-end benchmark runs against a local mock server
//!
//! These drive the real scheduler, executor and aggregator over loopback
//! HTTP, so tick counts are asserted with one tick of slack.

use http_rate_bench::{
    output::BenchmarkReport, run_benchmark, BenchmarkConfig, OutcomeStatus,
};
use std::time::Duration;
use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

async fn server_responding(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_steady_target_at_one_request_per_second() {
    let server = server_responding(
        ResponseTemplate::new(200).set_delay(Duration::from_millis(50)),
    )
    .await;

    let plan = BenchmarkConfig::new(&server.uri(), 1, 5.0, 3.0).unwrap();
    let results = run_benchmark(&plan).await.unwrap();

    assert!(
        (3..=4).contains(&results.total_requests()),
        "unexpected request count {}",
        results.total_requests()
    );
    assert_eq!(results.successful_requests(), results.total_requests());
    assert!(results.error_counts().is_empty());
    assert_eq!(results.success_percentage(), Some(100.0));

    let mean = results.mean_latency_ms().unwrap();
    assert!((50.0..250.0).contains(&mean), "mean latency {}", mean);
    assert!(results.window_seconds() >= 3.0);
}

#[tokio::test]
async fn test_hanging_target_times_out_every_request() {
    let server = server_responding(
        ResponseTemplate::new(200).set_delay(Duration::from_secs(30)),
    )
    .await;

    let plan = BenchmarkConfig::new(&server.uri(), 5, 1.0, 2.0).unwrap();
    let results = run_benchmark(&plan).await.unwrap();
    let total = results.total_requests();

    assert!((10..=11).contains(&total), "unexpected request count {}", total);
    assert_eq!(results.successful_requests(), 0);
    assert_eq!(results.error_counts().len(), 1);
    assert_eq!(results.error_counts().get(&OutcomeStatus::Timeout), total);
    assert_eq!(results.mean_latency_ms(), None);
    assert_eq!(results.success_percentage(), Some(0.0));

    let report = BenchmarkReport::new(&plan, &results, 3);
    assert!(report.results.all_failed());
    assert_eq!(report.results.top_errors[0].classification, "Timeout");
}

#[tokio::test]
async fn test_missing_resource_ranks_first() {
    let server = server_responding(ResponseTemplate::new(404)).await;

    let plan = BenchmarkConfig::new(&format!("{}/missing", server.uri()), 10, 2.0, 1.0).unwrap();
    let results = run_benchmark(&plan).await.unwrap();

    assert!(results.total_requests() >= 10);
    assert_eq!(results.failed_requests(), results.total_requests());

    let top = results.top_errors(1);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].status, OutcomeStatus::HttpStatus(404));
    assert_eq!(top[0].count, results.total_requests());
}

#[tokio::test]
async fn test_refused_connections_are_transport_errors() {
    // Nothing listens on port 1
    let plan = BenchmarkConfig::new("http://127.0.0.1:1", 4, 1.0, 0.5).unwrap();
    let results = run_benchmark(&plan).await.unwrap();

    assert!(results.total_requests() >= 2);
    assert_eq!(results.successful_requests(), 0);
    assert!(results
        .error_counts()
        .iter()
        .all(|entry| matches!(entry.status, OutcomeStatus::TransportError(_))));
}
