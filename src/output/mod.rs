//! Output formatting and result persistence
//!
//! Reports are rendered as a boxed table (plain or colored) or as JSON, and
//! can additionally be appended to a CSV file.

mod colored;
mod csv;
mod formatter;
mod report;

pub use colored::{ColorScheme, ColoredFormatter, PerformanceLevel};
pub use csv::{CsvReporter, CSV_HEADER};
pub use formatter::{
    format_optional, render_box, report_lines, Alignment, Column, FormattingOptions, JsonFormatter,
    LineKind, OutputFormatter, PlainFormatter, ReportLine, RowData, TableFormat,
};
pub use report::BenchmarkReport;

use crate::{models::Config, types::OutputFormat};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter for the given format and color preference
    pub fn create_formatter(format: OutputFormat, enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..FormattingOptions::default()
        };

        match format {
            OutputFormat::Json => Box::new(JsonFormatter::new()),
            OutputFormat::Table if enable_color => Box::new(ColoredFormatter::new(options)),
            OutputFormat::Table => Box::new(PlainFormatter::new(options)),
        }
    }

    /// Formatter matching a loaded configuration
    pub fn from_config(config: &Config) -> Box<dyn OutputFormatter> {
        Self::create_formatter(config.output_format, config.enable_color, config.verbose)
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(OutputFormat::Table, false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use report::fixtures::mixed_report;

    #[test]
    fn test_factory_picks_formatter() {
        let report = mixed_report();

        let json = OutputFormatterFactory::create_formatter(OutputFormat::Json, true, false);
        assert!(json.format_report(&report).unwrap().trim_start().starts_with('{'));

        let plain = OutputFormatterFactory::create_plain_formatter();
        let output = plain.format_report(&report).unwrap();
        assert!(output.starts_with("----"));
        assert!(!output.contains('\x1b'));
    }

    #[test]
    fn test_factory_from_config() {
        let mut config = Config::default();
        config.output_format = OutputFormat::Json;
        let formatter = OutputFormatterFactory::from_config(&config);

        assert!(formatter.format_header("ignored").unwrap().is_empty());
    }
}
