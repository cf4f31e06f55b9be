//! Outcome aggregation and derived run statistics


use crate::{
    models::metrics::{ErrorCount, ErrorCounts, RequestOutcome, RunResults},
    types::OutcomeStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Percentiles reported for successful request latencies
pub const REPORTED_PERCENTILES: [f64; 3] = [50.0, 90.0, 99.0];

/// Reduces the outcomes of one run into [`RunResults`]
///
/// Aggregation is a pure function of its inputs: the same outcomes and window
/// always produce the same results.
pub struct Aggregator;

impl Aggregator {
    /// Fold every outcome of a run into its results
    pub fn aggregate(
        outcomes: Vec<RequestOutcome>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> RunResults {
        let total = outcomes.len();
        let mut successful = 0;
        let mut latencies = Vec::new();
        let mut error_counts = ErrorCounts::new();

        for outcome in outcomes {
            if outcome.is_success() {
                successful += 1;
                latencies.push(outcome.elapsed);
            } else {
                error_counts.record(outcome.status);
            }
        }

        RunResults::new(window_start, window_end, total, successful, latencies, error_counts)
    }

    /// Derive the reported statistics of a run
    pub fn summarize(results: &RunResults, top_k: usize) -> RunSummary {
        RunSummary::from_results(results, top_k)
    }
}

/// One ranked failure classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    /// Display form, e.g. `404`, `Timeout` or `ClientError: ...`
    pub classification: String,
    pub kind: String,
    pub status_code: Option<u16>,
    pub count: usize,
}

impl From<&ErrorCount> for ErrorSummary {
    fn from(entry: &ErrorCount) -> Self {
        Self {
            classification: entry.status.to_string(),
            kind: entry.status.kind().to_string(),
            status_code: entry.status.status_code(),
            count: entry.count,
        }
    }
}

/// Derived statistics of one run
///
/// Every value that needs a non-empty sample is `None` when there is none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub window_seconds: f64,
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub achieved_rate: Option<f64>,
    pub success_percentage: Option<f64>,
    pub mean_latency_ms: Option<f64>,
    pub min_latency_ms: Option<f64>,
    pub max_latency_ms: Option<f64>,
    pub p50_latency_ms: Option<f64>,
    pub p90_latency_ms: Option<f64>,
    pub p99_latency_ms: Option<f64>,
    pub top_errors: Vec<ErrorSummary>,
    pub peak_in_flight: usize,
}

impl RunSummary {
    pub fn from_results(results: &RunResults, top_k: usize) -> Self {
        let mut sorted: Vec<f64> = results
            .latencies()
            .iter()
            .map(|d| d.as_secs_f64() * 1000.0)
            .collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let [p50, p90, p99] = REPORTED_PERCENTILES.map(|p| calculate_percentile(&sorted, p));

        Self {
            window_start: results.window_start(),
            window_end: results.window_end(),
            window_seconds: results.window_seconds(),
            total_requests: results.total_requests(),
            successful_requests: results.successful_requests(),
            failed_requests: results.failed_requests(),
            achieved_rate: results.achieved_rate(),
            success_percentage: results.success_percentage(),
            mean_latency_ms: results.mean_latency_ms(),
            min_latency_ms: sorted.first().copied(),
            max_latency_ms: sorted.last().copied(),
            p50_latency_ms: p50,
            p90_latency_ms: p90,
            p99_latency_ms: p99,
            top_errors: results.top_errors(top_k).iter().map(ErrorSummary::from).collect(),
            peak_in_flight: results.peak_in_flight(),
        }
    }

    /// Whether every request of the run failed
    pub fn all_failed(&self) -> bool {
        self.total_requests > 0 && self.successful_requests == 0
    }

    /// Top errors as `classification:count` pairs joined by `; `
    pub fn top_errors_compact(&self) -> String {
        self.top_errors
            .iter()
            .map(|e| format!("{}:{}", e.classification, e.count))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Count recorded for `status` among the reported top errors
    pub fn reported_count(&self, status: &OutcomeStatus) -> Option<usize> {
        let classification = status.to_string();
        self.top_errors
            .iter()
            .find(|e| e.classification == classification)
            .map(|e| e.count)
    }
}

/// Linear-interpolated percentile of ascending `sorted_values`
pub fn calculate_percentile(sorted_values: &[f64], percentile: f64) -> Option<f64> {
    if sorted_values.is_empty() {
        return None;
    }

    let percentile = percentile.clamp(0.0, 100.0);
    let index = (percentile / 100.0) * (sorted_values.len() as f64 - 1.0);
    let lower_index = index.floor() as usize;
    let upper_index = index.ceil() as usize;

    if lower_index == upper_index {
        Some(sorted_values[lower_index])
    } else {
        let lower_value = sorted_values[lower_index];
        let upper_value = sorted_values[upper_index];
        let weight = index - lower_index as f64;
        Some(lower_value + weight * (upper_value - lower_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    fn window(seconds: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        (start, start + chrono::Duration::seconds(seconds))
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_aggregate_counts() {
        let (start, end) = window(2);
        let outcomes = vec![
            RequestOutcome::http(ms(40), 200),
            RequestOutcome::http(ms(60), 200),
            RequestOutcome::http(ms(10), 404),
            RequestOutcome::timeout(ms(1000)),
            RequestOutcome::http(ms(12), 404),
            RequestOutcome::transport_error(ms(3), "connection reset"),
        ];

        let results = Aggregator::aggregate(outcomes, start, end);

        assert_eq!(results.total_requests(), 6);
        assert_eq!(results.successful_requests(), 2);
        assert_eq!(results.failed_requests(), 4);
        assert_eq!(results.latencies(), &[ms(40), ms(60)]);
        assert_eq!(results.error_counts().get(&OutcomeStatus::HttpStatus(404)), 2);
        assert_eq!(results.error_counts().get(&OutcomeStatus::Timeout), 1);
        assert_eq!(results.error_counts().total(), 4);
        assert_eq!(results.achieved_rate(), Some(3.0));
    }

    #[test]
    fn test_redirect_and_created_are_failures() {
        let (start, end) = window(1);
        let results = Aggregator::aggregate(
            vec![RequestOutcome::http(ms(5), 201), RequestOutcome::http(ms(5), 302)],
            start,
            end,
        );
        assert_eq!(results.successful_requests(), 0);
        assert!(results.latencies().is_empty());
        assert_eq!(results.mean_latency_ms(), None);
        assert_eq!(results.success_percentage(), Some(0.0));
    }

    #[test]
    fn test_empty_run() {
        let (start, end) = window(5);
        let results = Aggregator::aggregate(Vec::new(), start, end);
        let summary = Aggregator::summarize(&results, 3);

        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.achieved_rate, None);
        assert_eq!(summary.success_percentage, None);
        assert_eq!(summary.mean_latency_ms, None);
        assert_eq!(summary.p50_latency_ms, None);
        assert_eq!(summary.min_latency_ms, None);
        assert!(summary.top_errors.is_empty());
        assert!(!summary.all_failed());
    }

    #[test]
    fn test_summary_statistics() {
        let (start, end) = window(4);
        let outcomes: Vec<_> = (1..=10).map(|i| RequestOutcome::http(ms(i * 10), 200)).collect();

        let summary = Aggregator::summarize(&Aggregator::aggregate(outcomes, start, end), 3);

        assert_eq!(summary.window_seconds, 4.0);
        assert_eq!(summary.achieved_rate, Some(2.5));
        assert_eq!(summary.success_percentage, Some(100.0));
        assert!((summary.mean_latency_ms.unwrap() - 55.0).abs() < 1e-9);
        assert_eq!(summary.min_latency_ms, Some(10.0));
        assert_eq!(summary.max_latency_ms, Some(100.0));
        assert!((summary.p50_latency_ms.unwrap() - 55.0).abs() < 1e-9);
        assert!((summary.p90_latency_ms.unwrap() - 91.0).abs() < 1e-9);
        assert!((summary.p99_latency_ms.unwrap() - 99.1).abs() < 1e-9);
    }

    #[test]
    fn test_top_errors_ranking() {
        let (start, end) = window(1);
        let outcomes = vec![
            RequestOutcome::http(ms(1), 500),
            RequestOutcome::timeout(ms(1)),
            RequestOutcome::http(ms(1), 404),
            RequestOutcome::http(ms(1), 404),
            RequestOutcome::timeout(ms(1)),
            RequestOutcome::other_error(ms(1), "boom"),
            RequestOutcome::http(ms(1), 404),
        ];

        let summary = Aggregator::summarize(&Aggregator::aggregate(outcomes, start, end), 2);

        assert_eq!(summary.top_errors.len(), 2);
        assert_eq!(summary.top_errors[0].classification, "404");
        assert_eq!(summary.top_errors[0].status_code, Some(404));
        assert_eq!(summary.top_errors[0].count, 3);
        assert_eq!(summary.top_errors[1].classification, "Timeout");
        assert_eq!(summary.top_errors[1].kind, "timeout");
        assert_eq!(summary.top_errors_compact(), "404:3; Timeout:2");
        assert_eq!(summary.reported_count(&OutcomeStatus::Timeout), Some(2));
        assert_eq!(summary.reported_count(&OutcomeStatus::HttpStatus(500)), None);
    }

    #[test]
    fn test_all_failed() {
        let (start, end) = window(1);
        let results = Aggregator::aggregate(vec![RequestOutcome::timeout(ms(1))], start, end);
        assert!(Aggregator::summarize(&results, 3).all_failed());
    }

    #[test]
    fn test_percentile_calculation() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];

        assert_eq!(calculate_percentile(&values, 50.0), Some(5.5));
        assert_eq!(calculate_percentile(&values, 0.0), Some(1.0));
        assert_eq!(calculate_percentile(&values, 100.0), Some(10.0));
        assert_eq!(calculate_percentile(&[7.0], 90.0), Some(7.0));
        assert_eq!(calculate_percentile(&[], 50.0), None);
    }
}
