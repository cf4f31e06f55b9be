//! CSV persistence of run results, one row per run

use super::report::BenchmarkReport;
use crate::error::{ErrorContext, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Column names, in row order
pub const CSV_HEADER: [&str; 11] = [
    "URL",
    "QPS",
    "Timeout",
    "Duration",
    "Total Requests",
    "Successful Requests",
    "Failed Requests",
    "% Successful Requests",
    "Average Latency (ms)",
    "Achieved QPS",
    "Top Errors",
];

/// Appends run reports to a CSV file
pub struct CsvReporter;

impl CsvReporter {
    /// Append one row for `report`, writing the header first when the file is new or empty
    pub fn append(path: &Path, report: &BenchmarkReport) -> Result<()> {
        let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

        let mut content = String::new();
        if needs_header {
            content.push_str(&Self::header_row());
            content.push('\n');
        }
        content.push_str(&Self::row(report));
        content.push('\n');

        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write CSV file {}", path.display()))?;

        Ok(())
    }

    pub fn header_row() -> String {
        CSV_HEADER.join(",")
    }

    /// Render `report` as a CSV row without the trailing newline
    pub fn row(report: &BenchmarkReport) -> String {
        let results = &report.results;
        let optional = |value: Option<f64>| value.map(|v| format!("{:.2}", v)).unwrap_or_default();

        [
            csv_escape(&report.url),
            report.qps.to_string(),
            report.timeout_seconds.to_string(),
            report.duration_seconds.to_string(),
            results.total_requests.to_string(),
            results.successful_requests.to_string(),
            results.failed_requests.to_string(),
            optional(results.success_percentage),
            optional(results.mean_latency_ms),
            optional(results.achieved_rate),
            csv_escape(&results.top_errors_compact()),
        ]
        .join(",")
    }
}

/// Wrap a field value in quotes and escape any embedded quotes
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
