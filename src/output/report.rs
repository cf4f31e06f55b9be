//! Per-run report handed to formatters and the CSV writer

use crate::{
    models::{BenchmarkConfig, RunResults},
    stats::{Aggregator, RunSummary},
};
use serde::{Deserialize, Serialize};

/// One finished run: what was asked for and what happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub url: String,
    pub qps: u32,
    pub timeout_seconds: f64,
    pub duration_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_in_flight: Option<usize>,
    pub results: RunSummary,
}

impl BenchmarkReport {
    pub fn new(plan: &BenchmarkConfig, results: &RunResults, top_k: usize) -> Self {
        Self {
            url: plan.url().to_string(),
            qps: plan.rate(),
            timeout_seconds: plan.timeout().as_secs_f64(),
            duration_seconds: plan.duration().as_secs_f64(),
            max_in_flight: plan.max_in_flight().map(|n| n.get()),
            results: Aggregator::summarize(results, top_k),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::{models::RequestOutcome, stats::Aggregator};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    /// Ten requests over two seconds: seven 200s, two 404s and one timeout
    pub fn mixed_report() -> BenchmarkReport {
        let plan = BenchmarkConfig::new("http://example.com", 5, 1.0, 2.0).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let end = start + chrono::Duration::milliseconds(2_000);

        let mut outcomes: Vec<RequestOutcome> = (0..7)
            .map(|i| RequestOutcome::http(Duration::from_millis(40 + i * 10), 200))
            .collect();
        outcomes.push(RequestOutcome::http(Duration::from_millis(5), 404));
        outcomes.push(RequestOutcome::timeout(Duration::from_secs(1)));
        outcomes.push(RequestOutcome::http(Duration::from_millis(6), 404));

        let results = Aggregator::aggregate(outcomes, start, end);
        BenchmarkReport::new(&plan, &results, 3)
    }

    /// A run that issued nothing
    pub fn empty_report() -> BenchmarkReport {
        let plan = BenchmarkConfig::new("https://quiet.example", 1, 1.0, 1.0).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let results = Aggregator::aggregate(Vec::new(), start, start);
        BenchmarkReport::new(&plan, &results, 3)
    }
}
