//! Request outcome and run result data models

use crate::types::OutcomeStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Classified result of one issued request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOutcome {
    /// Time from just before dispatch until the outcome was known
    pub elapsed: Duration,
    /// Normalized classification
    pub status: OutcomeStatus,
}

impl RequestOutcome {
    pub fn new(elapsed: Duration, status: OutcomeStatus) -> Self {
        Self { elapsed, status }
    }

    /// A response carrying an HTTP status code
    pub fn http(elapsed: Duration, code: u16) -> Self {
        Self::new(elapsed, OutcomeStatus::HttpStatus(code))
    }

    /// No response within the timeout
    pub fn timeout(elapsed: Duration) -> Self {
        Self::new(elapsed, OutcomeStatus::Timeout)
    }

    /// Connection-level failure
    pub fn transport_error<S: Into<String>>(elapsed: Duration, detail: S) -> Self {
        Self::new(elapsed, OutcomeStatus::TransportError(detail.into()))
    }

    /// Any other failure
    pub fn other_error<S: Into<String>>(elapsed: Duration, detail: S) -> Self {
        Self::new(elapsed, OutcomeStatus::OtherError(detail.into()))
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// One classification and how often it was seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCount {
    pub status: OutcomeStatus,
    pub count: usize,
}

/// Failure classifications with their counts, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ErrorCount>", into = "Vec<ErrorCount>")]
pub struct ErrorCounts {
    entries: Vec<ErrorCount>,
    index: HashMap<OutcomeStatus, usize>,
}

impl ErrorCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `status`
    pub(crate) fn record(&mut self, status: OutcomeStatus) {
        match self.index.get(&status) {
            Some(&position) => self.entries[position].count += 1,
            None => {
                self.index.insert(status.clone(), self.entries.len());
                self.entries.push(ErrorCount { status, count: 1 });
            }
        }
    }

    /// Occurrences of `status`, zero when never seen
    pub fn get(&self, status: &OutcomeStatus) -> usize {
        self.index
            .get(status)
            .map_or(0, |&position| self.entries[position].count)
    }

    /// Number of distinct classifications
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &ErrorCount> {
        self.entries.iter()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|entry| entry.count).sum()
    }

    /// The `k` most frequent classifications
    ///
    /// Sorted by count descending. The sort is stable, so equal counts keep
    /// first-seen order.
    pub fn top(&self, k: usize) -> Vec<ErrorCount> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(k);
        ranked
    }
}

impl From<Vec<ErrorCount>> for ErrorCounts {
    fn from(entries: Vec<ErrorCount>) -> Self {
        let mut counts = Self::new();
        for entry in entries {
            match counts.index.get(&entry.status) {
                Some(&position) => counts.entries[position].count += entry.count,
                None => {
                    counts.index.insert(entry.status.clone(), counts.entries.len());
                    counts.entries.push(entry);
                }
            }
        }
        counts
    }
}

impl From<ErrorCounts> for Vec<ErrorCount> {
    fn from(counts: ErrorCounts) -> Self {
        counts.entries
    }
}

/// Aggregated results of one benchmark run
///
/// Built once by the aggregator after every launched request has settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResults {
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    total_requests: usize,
    successful_requests: usize,
    failed_requests: usize,
    latencies: Vec<Duration>,
    error_counts: ErrorCounts,
    #[serde(default)]
    peak_in_flight: usize,
}

impl RunResults {
    pub(crate) fn new(
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        total_requests: usize,
        successful_requests: usize,
        latencies: Vec<Duration>,
        error_counts: ErrorCounts,
    ) -> Self {
        Self {
            window_start,
            window_end,
            total_requests,
            successful_requests,
            failed_requests: total_requests - successful_requests,
            latencies,
            error_counts,
            peak_in_flight: 0,
        }
    }

    pub(crate) fn with_peak_in_flight(mut self, peak: usize) -> Self {
        self.peak_in_flight = peak;
        self
    }

    pub fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    pub fn window_end(&self) -> DateTime<Utc> {
        self.window_end
    }

    pub fn total_requests(&self) -> usize {
        self.total_requests
    }

    pub fn successful_requests(&self) -> usize {
        self.successful_requests
    }

    pub fn failed_requests(&self) -> usize {
        self.failed_requests
    }

    /// Elapsed times of successful requests, in completion order
    pub fn latencies(&self) -> &[Duration] {
        &self.latencies
    }

    pub fn error_counts(&self) -> &ErrorCounts {
        &self.error_counts
    }

    /// Most requests outstanding at the same time during the run
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight
    }

    /// Actual run length in seconds, zero if the window is empty or inverted
    pub fn window_seconds(&self) -> f64 {
        (self.window_end - self.window_start)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Requests per second over the actual run length
    pub fn achieved_rate(&self) -> Option<f64> {
        let seconds = self.window_seconds();
        if self.total_requests == 0 || seconds <= 0.0 {
            return None;
        }
        Some(self.total_requests as f64 / seconds)
    }

    /// Share of requests answered with 200, in percent
    pub fn success_percentage(&self) -> Option<f64> {
        if self.total_requests == 0 {
            return None;
        }
        Some(self.successful_requests as f64 / self.total_requests as f64 * 100.0)
    }

    /// Mean latency of successful requests in milliseconds
    pub fn mean_latency_ms(&self) -> Option<f64> {
        if self.latencies.is_empty() {
            return None;
        }
        let total: f64 = self.latencies.iter().map(|d| d.as_secs_f64() * 1000.0).sum();
        Some(total / self.latencies.len() as f64)
    }

    /// The `k` most frequent failure classifications
    pub fn top_errors(&self, k: usize) -> Vec<ErrorCount> {
        self.error_counts.top(k)
    }
}
