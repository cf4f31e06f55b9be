//! Colored formatter implementation with terminal color support
//!
//! Same layout as the plain formatter. Colors are applied after padding so
//! escape codes never disturb the box width.

use super::{
    formatter::{render_box, report_lines, FormattingOptions, LineKind, OutputFormatter, PlainFormatter, ReportLine},
    report::BenchmarkReport,
};
use crate::error::Result;
use colored::*;

/// Performance level classification for color coding
#[derive(Debug, Clone, PartialEq)]
pub enum PerformanceLevel {
    Excellent,  // < 50ms
    Good,       // 50-100ms
    Fair,       // 100-300ms
    Poor,       // 300-1000ms
    VeryPoor,   // > 1000ms
}

impl PerformanceLevel {
    /// Determine performance level from response time in milliseconds
    pub fn from_response_time(time_ms: f64) -> Self {
        if time_ms < 50.0 {
            Self::Excellent
        } else if time_ms < 100.0 {
            Self::Good
        } else if time_ms < 300.0 {
            Self::Fair
        } else if time_ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    /// Get color for this performance level
    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
            Self::VeryPoor => "Very Poor",
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
            border: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self {
            plain_formatter: PlainFormatter::new(options.clone()),
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    /// Color for a success percentage
    pub fn success_rate_color(&self, percentage: f64) -> Color {
        if percentage >= 99.0 {
            self.color_scheme.success
        } else if percentage >= 90.0 {
            self.color_scheme.warning
        } else {
            self.color_scheme.error
        }
    }

    fn paint_line(&self, line: &ReportLine, padded: &str) -> String {
        match line.kind {
            LineKind::Section => {
                if self.options.enable_color {
                    padded.bold().color(self.color_scheme.header).to_string()
                } else {
                    padded.to_string()
                }
            }
            LineKind::Field => padded.to_string(),
            LineKind::SuccessRate(Some(rate)) => self.colorize(padded, self.success_rate_color(rate)).to_string(),
            LineKind::Latency(Some(ms)) => {
                self.colorize(padded, PerformanceLevel::from_response_time(ms).color()).to_string()
            }
            LineKind::SuccessRate(None) | LineKind::Latency(None) => {
                self.colorize(padded, self.color_scheme.muted).to_string()
            }
            LineKind::Error => self.colorize(padded, self.color_scheme.error).to_string(),
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let plain = self.plain_formatter.format_header(title)?;
        if !self.options.enable_color {
            return Ok(plain);
        }
        Ok(plain
            .lines()
            .map(|line| line.bold().color(self.color_scheme.header).to_string())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn format_report(&self, report: &BenchmarkReport) -> Result<String> {
        let lines = report_lines(report, self.options.verbose_mode);
        Ok(render_box(
            &lines,
            |line, padded| self.paint_line(line, padded),
            |separator| self.colorize(separator, self.color_scheme.border).to_string(),
        ))
    }

    fn format_sweep_summary(&self, reports: &[BenchmarkReport]) -> Result<String> {
        let table = self.plain_formatter.format_sweep_summary(reports)?;
        if table.is_empty() || !self.options.enable_color {
            return Ok(table);
        }

        let mut lines = table.lines();
        let mut output = String::new();
        if let Some(title) = lines.next() {
            output.push_str(&title.bold().color(self.color_scheme.header).to_string());
        }
        for line in lines {
            output.push('\n');
            if line.starts_with('+') {
                output.push_str(&self.colorize(line, self.color_scheme.border).to_string());
            } else {
                output.push_str(line);
            }
        }

        Ok(output)
    }
}
