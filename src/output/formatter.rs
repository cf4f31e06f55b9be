//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides the
//! plain text and JSON implementations. Every run is rendered as a boxed
//! list of `Config:`, `Results:` and `Top Errors:` lines; a sweep of several
//! runs additionally gets a one-row-per-run table.

use super::report::BenchmarkReport;
use crate::error::{AppError, Result};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format one finished run
    fn format_report(&self, report: &BenchmarkReport) -> Result<String>;

    /// Format the overview of a multi-run sweep
    fn format_sweep_summary(&self, reports: &[BenchmarkReport]) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Add latency percentiles and peak in-flight to each report
    pub verbose_mode: bool,
    /// Show table borders
    pub table_borders: bool,
    /// Maximum width of a table cell
    pub max_cell_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
            max_cell_width: 60,
        }
    }
}

/// What a report line shows, used to pick its color
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Section,
    Field,
    SuccessRate(Option<f64>),
    Latency(Option<f64>),
    Error,
}

/// One line of a boxed run report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    pub text: String,
    pub kind: LineKind,
}

impl ReportLine {
    fn section(text: &str) -> Self {
        Self { text: text.to_string(), kind: LineKind::Section }
    }

    fn field(label: &str, value: impl std::fmt::Display) -> Self {
        Self { text: format!("  {}: {}", label, value), kind: LineKind::Field }
    }

    fn with_kind(mut self, kind: LineKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Render an optional statistic with a fixed number of decimals, `None` when absent
pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "None".to_string(),
    }
}

/// Lines of the boxed report for one run
pub fn report_lines(report: &BenchmarkReport, verbose: bool) -> Vec<ReportLine> {
    let results = &report.results;
    let mut lines = vec![
        ReportLine::section("Config:"),
        ReportLine::field("URL", &report.url),
        ReportLine::field("QPS", report.qps),
        ReportLine::field("Timeout", format!("{} seconds", report.timeout_seconds)),
    ];
    if let Some(limit) = report.max_in_flight {
        lines.push(ReportLine::field("Max In Flight", limit));
    }

    lines.push(ReportLine::section("Results:"));
    lines.push(ReportLine::field("Duration", format!("{:.1} seconds", results.window_seconds)));
    lines.push(ReportLine::field("Achieved QPS", format_optional(results.achieved_rate, 2)));
    lines.push(ReportLine::field("Num Requests", results.total_requests));
    lines.push(ReportLine::field("Num Successful Requests", results.successful_requests));
    lines.push(ReportLine::field("Num Failed Requests", results.failed_requests));
    lines.push(
        ReportLine::field("% Successful Requests", format_optional(results.success_percentage, 2))
            .with_kind(LineKind::SuccessRate(results.success_percentage)),
    );
    lines.push(
        ReportLine::field("Average Latency (ms)", format_optional(results.mean_latency_ms, 2))
            .with_kind(LineKind::Latency(results.mean_latency_ms)),
    );

    if verbose {
        for (label, value) in [
            ("Min Latency (ms)", results.min_latency_ms),
            ("P50 Latency (ms)", results.p50_latency_ms),
            ("P90 Latency (ms)", results.p90_latency_ms),
            ("P99 Latency (ms)", results.p99_latency_ms),
            ("Max Latency (ms)", results.max_latency_ms),
        ] {
            lines.push(ReportLine::field(label, format_optional(value, 2)).with_kind(LineKind::Latency(value)));
        }
        lines.push(ReportLine::field("Peak In Flight", results.peak_in_flight));
    }

    if !results.top_errors.is_empty() {
        lines.push(ReportLine::section("Top Errors:"));
        for error in &results.top_errors {
            lines.push(ReportLine::field(&error.classification, error.count).with_kind(LineKind::Error));
        }
    }

    lines
}

/// Draw lines inside a dashed box sized to the longest line
///
/// `paint` receives each line padded to the common width; `border` receives
/// each separator.
pub fn render_box<P, B>(lines: &[ReportLine], paint: P, border: B) -> String
where
    P: Fn(&ReportLine, &str) -> String,
    B: Fn(&str) -> String,
{
    let max_len = lines.iter().map(|l| l.text.chars().count()).max().unwrap_or(0);
    let separator = border(&"-".repeat(max_len + 4));

    let mut output = String::new();
    output.push_str(&separator);
    for line in lines {
        let padding = max_len - line.text.chars().count() + 1;
        let padded = format!("{}{}", line.text, " ".repeat(padding));
        output.push('\n');
        output.push_str(&format!("| {}|", paint(line, &padded)));
        output.push('\n');
        output.push_str(&separator);
    }

    output
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Show borders around table
    pub show_borders: bool,
    /// Maximum column width
    pub max_column_width: usize,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    /// Column header
    pub header: String,
    /// Column alignment
    pub alignment: Alignment,
}

impl Column {
    pub fn new(header: &str, alignment: Alignment) -> Self {
        Self { header: header.to_string(), alignment }
    }
}

/// Text alignment options
#[derive(Debug, Clone)]
pub enum Alignment {
    Left,
    Right,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormattingOptions {
        &self.options
    }

    /// Column layout of the sweep overview
    pub fn sweep_table_format(&self) -> TableFormat {
        TableFormat {
            columns: vec![
                Column::new("URL", Alignment::Left),
                Column::new("QPS", Alignment::Right),
                Column::new("Timeout (s)", Alignment::Right),
                Column::new("Duration (s)", Alignment::Right),
                Column::new("Requests", Alignment::Right),
                Column::new("Success %", Alignment::Right),
                Column::new("Avg Latency (ms)", Alignment::Right),
                Column::new("Achieved QPS", Alignment::Right),
                Column::new("Top Errors", Alignment::Left),
            ],
            show_borders: self.options.table_borders,
            max_column_width: self.options.max_cell_width,
        }
    }

    /// One sweep table row per run
    pub fn sweep_rows(reports: &[BenchmarkReport]) -> Vec<RowData> {
        reports
            .iter()
            .map(|r| {
                vec![
                    r.url.clone(),
                    r.qps.to_string(),
                    r.timeout_seconds.to_string(),
                    r.duration_seconds.to_string(),
                    r.results.total_requests.to_string(),
                    format_optional(r.results.success_percentage, 2),
                    format_optional(r.results.mean_latency_ms, 2),
                    format_optional(r.results.achieved_rate, 2),
                    r.results.top_errors_compact(),
                ]
            })
            .collect()
    }

    /// Create a table with the given format and data
    pub fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let column_widths = self.calculate_column_widths(format, rows);
        let mut output = String::new();

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
            output.push('\n');
        }

        let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
        output.push_str(&self.create_row(&headers, &column_widths, format));
        output.push('\n');

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
            output.push('\n');
        }

        for row in rows {
            output.push_str(&self.create_row(row, &column_widths, format));
            output.push('\n');
        }

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
        }

        output
    }

    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        let num_columns = format.columns.len().max(rows.iter().map(|r| r.len()).max().unwrap_or(0));

        (0..num_columns)
            .map(|col_idx| {
                let header = format.columns.get(col_idx).map_or(0, |c| c.header.chars().count());
                let content = rows
                    .iter()
                    .filter_map(|row| row.get(col_idx))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0);
                header.max(content).min(format.max_column_width)
            })
            .collect()
    }

    fn create_row(&self, data: &[String], widths: &[usize], format: &TableFormat) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format.columns.get(idx).map_or(&Alignment::Left, |c| &c.alignment);
            let padded_cell = align_text(cell, width, alignment);

            if format.show_borders {
                row.push(' ');
            }
            row.push_str(&padded_cell);
            if format.show_borders {
                row.push_str(" |");
            } else {
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::new();

        if !widths.is_empty() {
            border.push('+');
            for &width in widths {
                border.push_str(&"-".repeat(width + 2));
                border.push('+');
            }
        }

        border
    }
}

/// Align text within specified width, truncating overlong cells
fn align_text(text: &str, width: usize, alignment: &Alignment) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }

    let padding = " ".repeat(width - len);
    match alignment {
        Alignment::Left => format!("{}{}", text, padding),
        Alignment::Right => format!("{}{}", padding, text),
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.chars().count() + 4);

        writeln!(output, "{}", border)
            .and_then(|_| writeln!(output, "  {}  ", title))
            .and_then(|_| write!(output, "{}", border))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;

        Ok(output)
    }

    fn format_report(&self, report: &BenchmarkReport) -> Result<String> {
        let lines = report_lines(report, self.options.verbose_mode);
        Ok(render_box(&lines, |_, padded| padded.to_string(), str::to_string))
    }

    fn format_sweep_summary(&self, reports: &[BenchmarkReport]) -> Result<String> {
        if reports.len() < 2 {
            return Ok(String::new());
        }

        let mut output = String::new();
        writeln!(output, "Sweep Summary ({} runs):", reports.len())
            .map_err(|e| AppError::io(format!("Failed to format sweep summary: {}", e)))?;
        output.push_str(&self.create_table(&self.sweep_table_format(), &Self::sweep_rows(reports)));

        Ok(output)
    }
}

/// Pretty-printed JSON, one document per run
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_header(&self, _title: &str) -> Result<String> {
        Ok(String::new())
    }

    fn format_report(&self, report: &BenchmarkReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    fn format_sweep_summary(&self, _reports: &[BenchmarkReport]) -> Result<String> {
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::fixtures::{empty_report, mixed_report};

    fn plain(verbose: bool) -> PlainFormatter {
        PlainFormatter::new(FormattingOptions {
            enable_color: false,
            verbose_mode: verbose,
            ..FormattingOptions::default()
        })
    }

    #[test]
    fn test_report_lines() {
        let lines = report_lines(&mixed_report(), false);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();

        assert_eq!(
            texts,
            vec![
                "Config:",
                "  URL: http://example.com",
                "  QPS: 5",
                "  Timeout: 1 seconds",
                "Results:",
                "  Duration: 2.0 seconds",
                "  Achieved QPS: 5.00",
                "  Num Requests: 10",
                "  Num Successful Requests: 7",
                "  Num Failed Requests: 3",
                "  % Successful Requests: 70.00",
                "  Average Latency (ms): 70.00",
                "Top Errors:",
                "  404: 2",
                "  Timeout: 1",
            ]
        );
        assert_eq!(lines[10].kind, LineKind::SuccessRate(Some(70.0)));
        assert_eq!(lines[13].kind, LineKind::Error);
    }

    #[test]
    fn test_boxed_layout() {
        let output = plain(false).format_report(&mixed_report()).unwrap();
        let rows: Vec<&str> = output.lines().collect();

        // 15 lines, each followed by a separator, plus the leading one
        assert_eq!(rows.len(), 31);
        let width = rows[0].len();
        assert!(rows.iter().step_by(2).all(|r| *r == "-".repeat(width)));
        assert!(rows.iter().skip(1).step_by(2).all(|r| r.starts_with("| ") && r.ends_with('|') && r.len() == width));
        assert_eq!(width, "  % Successful Requests: 70.00".len() + 4);
        assert!(output.contains("| Config:"));
    }

    #[test]
    fn test_absent_values_print_none() {
        let output = plain(false).format_report(&empty_report()).unwrap();

        assert!(output.contains("  Achieved QPS: None"));
        assert!(output.contains("  % Successful Requests: None"));
        assert!(output.contains("  Average Latency (ms): None"));
        assert!(!output.contains("Top Errors:"));
    }

    #[test]
    fn test_verbose_adds_percentiles() {
        let output = plain(true).format_report(&mixed_report()).unwrap();

        assert!(output.contains("  P50 Latency (ms): 70.00"));
        assert!(output.contains("  Min Latency (ms): 40.00"));
        assert!(output.contains("  Max Latency (ms): 100.00"));
        assert!(output.contains("  Peak In Flight: 0"));
    }

    #[test]
    fn test_sweep_summary() {
        let formatter = plain(false);
        assert!(formatter.format_sweep_summary(&[mixed_report()]).unwrap().is_empty());

        let output = formatter.format_sweep_summary(&[mixed_report(), empty_report()]).unwrap();
        assert!(output.starts_with("Sweep Summary (2 runs):"));
        assert!(output.contains("| URL "));
        assert!(output.contains("404:2; Timeout:1"));
        assert!(output.contains("None"));
        assert!(output.lines().filter(|l| l.starts_with('+')).count() == 3);
    }

    #[test]
    fn test_header() {
        let formatter = plain(false);
        let header = formatter.format_header("HTTP Rate Bench").unwrap();
        assert_eq!(header.lines().count(), 3);
        assert!(header.contains("  HTTP Rate Bench  "));
    }

    #[test]
    fn test_json_formatter() {
        let formatter = JsonFormatter::new();
        let output = formatter.format_report(&mixed_report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["url"], "http://example.com");
        assert_eq!(parsed["results"]["total_requests"], 10);
        assert_eq!(parsed["results"]["success_percentage"], 70.0);
        assert!(output.contains('\n'));
        assert!(formatter.format_header("x").unwrap().is_empty());
        assert!(formatter.format_sweep_summary(&[mixed_report(), empty_report()]).unwrap().is_empty());
    }

    #[test]
    fn test_align_text() {
        assert_eq!(align_text("ab", 4, &Alignment::Left), "ab  ");
        assert_eq!(align_text("ab", 4, &Alignment::Right), "  ab");
        assert_eq!(align_text("abcdef", 3, &Alignment::Left), "abc");
    }
}
