//! Command-line interface

use crate::types::OutputFormat;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// HTTP Rate Bench - fire GET requests at a fixed rate and report latency and errors
#[derive(Parser, Debug, Clone)]
#[command(name = "http-rate-bench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Target URL to benchmark (can be used multiple times)
    #[arg(short = 'u', long = "url", action = ArgAction::Append)]
    pub urls: Vec<String>,

    /// Target requests per second (can be used multiple times)
    #[arg(short = 'q', long = "qps", action = ArgAction::Append, value_parser = parse_rate)]
    pub qps: Vec<u32>,

    /// Per-request timeout in seconds (can be used multiple times)
    #[arg(short = 't', long = "timeout", action = ArgAction::Append, value_parser = parse_seconds)]
    pub timeouts: Vec<f64>,

    /// Window duration in seconds (can be used multiple times)
    #[arg(short = 'd', long = "duration", action = ArgAction::Append, value_parser = parse_seconds)]
    pub durations: Vec<f64>,

    /// Number of most frequent errors to report
    #[arg(short = 'k', long)]
    pub top_errors: Option<usize>,

    /// Cap on simultaneously outstanding requests (unbounded when omitted)
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    /// Append one row per run to this CSV file
    #[arg(long = "csv", value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Skip the HEAD check of each target before benchmarking
    #[arg(long)]
    pub no_preflight: bool,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.max_in_flight == Some(0) {
            return Err("--max-in-flight must be greater than 0".to_string());
        }

        if self.top_errors == Some(0) {
            return Err("--top-errors must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Parse a positive integer request rate
fn parse_rate(s: &str) -> Result<u32, String> {
    if s.starts_with('+') {
        return Err(format!("Invalid rate: {}", s));
    }

    s.parse::<u32>()
        .map_err(|_| format!("Invalid rate: {}", s))
        .and_then(|rate| {
            if rate == 0 {
                Err("Rate must be greater than 0".to_string())
            } else {
                Ok(rate)
            }
        })
}

/// Parse a positive, finite number of seconds
fn parse_seconds(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .map_err(|_| format!("Invalid number of seconds: {}", s))
        .and_then(|secs| {
            if !secs.is_finite() {
                Err(format!("Invalid number of seconds: {}", s))
            } else if secs <= 0.0 {
                Err("Seconds must be greater than 0".to_string())
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
pub(crate) fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
