//! Configuration data model and validation

use crate::types::{AppError, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Immutable configuration of a single benchmark run
///
/// Only obtainable through [`BenchmarkConfig::new`], which rejects
/// non-positive numbers and malformed targets.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    url: String,
    rate: u32,
    timeout: Duration,
    duration: Duration,
    max_in_flight: Option<NonZeroUsize>,
}

impl BenchmarkConfig {
    /// Validate and build a run configuration
    ///
    /// A target without a scheme gets `http://` prepended.
    pub fn new(url: &str, rate: u32, timeout_secs: f64, duration_secs: f64) -> Result<Self> {
        if rate == 0 {
            return Err(AppError::validation("Rate must be a positive number of requests per second"));
        }

        let timeout = positive_seconds("Timeout", timeout_secs)?;
        let duration = positive_seconds("Duration", duration_secs)?;
        let url = normalize_url(url)?;

        Ok(Self {
            url,
            rate,
            timeout,
            duration,
            max_in_flight: None,
        })
    }

    /// Cap the number of simultaneously outstanding requests
    pub fn with_max_in_flight(mut self, limit: NonZeroUsize) -> Self {
        self.max_in_flight = Some(limit);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Target requests per second
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Length of the issuing window
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Gap between two consecutive launches (`1 / rate`)
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.rate))
    }

    pub fn max_in_flight(&self) -> Option<NonZeroUsize> {
        self.max_in_flight
    }
}

fn positive_seconds(name: &str, seconds: f64) -> Result<Duration> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(AppError::validation(format!(
            "{} must be a positive number of seconds, got {}",
            name, seconds
        )));
    }

    let duration = Duration::try_from_secs_f64(seconds)
        .map_err(|e| AppError::validation(format!("{} of {}s is out of range: {}", name, seconds, e)))?;

    // Sub-nanosecond values round down to zero
    if duration.is_zero() {
        return Err(AppError::validation(format!(
            "{} of {}s is shorter than one nanosecond",
            name, seconds
        )));
    }

    Ok(duration)
}

/// Ensure a target has an HTTP(S) scheme and a host
pub fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Target URL cannot be empty"));
    }

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else if let Some((scheme, _)) = trimmed.split_once("://") {
        return Err(AppError::validation(format!(
            "Unsupported URL scheme '{}' in '{}'",
            scheme, raw
        )));
    } else {
        format!("http://{}", trimmed)
    };

    let parsed = url::Url::parse(&candidate)
        .map_err(|e| AppError::validation(format!("Invalid target URL '{}': {}", raw, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(AppError::validation(format!(
                "Unsupported URL scheme '{}' in '{}'",
                other, raw
            )))
        }
    }

    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(AppError::validation(format!("Target URL '{}' has no host", raw)));
    }

    Ok(candidate)
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target URLs to benchmark
    #[serde(default)]
    pub target_urls: Vec<String>,

    /// Request rates (requests per second) to sweep
    #[serde(default = "default_qps")]
    pub qps: Vec<u32>,

    /// Per-request timeouts in seconds to sweep
    #[serde(default = "default_timeouts")]
    pub timeouts_seconds: Vec<f64>,

    /// Window durations in seconds to sweep
    #[serde(default = "default_durations")]
    pub durations_seconds: Vec<f64>,

    /// Number of most frequent errors to report
    #[serde(default = "default_top_errors")]
    pub top_errors: usize,

    /// Optional ceiling on simultaneously outstanding requests
    #[serde(default)]
    pub max_in_flight: Option<usize>,

    /// Append one CSV row per run to this file
    #[serde(default)]
    pub csv_path: Option<PathBuf>,

    /// Probe each target with a HEAD request before benchmarking
    #[serde(default = "default_preflight")]
    pub preflight: bool,

    /// Report rendering
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_urls: Vec::new(),
            qps: default_qps(),
            timeouts_seconds: default_timeouts(),
            durations_seconds: default_durations(),
            top_errors: default_top_errors(),
            max_in_flight: None,
            csv_path: None,
            preflight: default_preflight(),
            output_format: OutputFormat::default(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.target_urls.is_empty() {
            return Err(AppError::config(
                "No target URL given. Pass --url or set BENCH_URLS",
            ));
        }

        for url in &self.target_urls {
            normalize_url(url).map_err(|e| match e {
                AppError::Validation(msg) => AppError::config(msg),
                other => other,
            })?;
        }

        if self.qps.is_empty() {
            return Err(AppError::config("At least one QPS value is required"));
        }
        if self.qps.contains(&0) {
            return Err(AppError::config("QPS must be greater than 0"));
        }

        check_seconds("Timeout", &self.timeouts_seconds)?;
        check_seconds("Duration", &self.durations_seconds)?;

        if self.top_errors == 0 {
            return Err(AppError::config("Top errors count must be greater than 0"));
        }

        if self.max_in_flight == Some(0) {
            return Err(AppError::config("Max in-flight must be greater than 0 when set"));
        }

        Ok(())
    }

    /// Expand the sweep into one run configuration per combination
    ///
    /// Order is url, then qps, then timeout, then duration, each in the
    /// order given.
    pub fn create_benchmark_plans(&self) -> Result<Vec<BenchmarkConfig>> {
        let limit = self.max_in_flight.and_then(NonZeroUsize::new);
        let mut plans = Vec::with_capacity(self.plan_count());

        for url in &self.target_urls {
            for &qps in &self.qps {
                for &timeout in &self.timeouts_seconds {
                    for &duration in &self.durations_seconds {
                        let mut plan = BenchmarkConfig::new(url, qps, timeout, duration)?;
                        if let Some(limit) = limit {
                            plan = plan.with_max_in_flight(limit);
                        }
                        plans.push(plan);
                    }
                }
            }
        }

        Ok(plans)
    }

    /// Number of runs the sweep expands to
    pub fn plan_count(&self) -> usize {
        self.target_urls.len()
            * self.qps.len()
            * self.timeouts_seconds.len()
            * self.durations_seconds.len()
    }

    /// Smallest configured per-request timeout, used for the preflight probe
    pub fn min_timeout(&self) -> Duration {
        self.timeouts_seconds
            .iter()
            .copied()
            .filter(|t| t.is_finite() && *t > 0.0)
            .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.min(t))))
            .and_then(|t| Duration::try_from_secs_f64(t).ok())
            .unwrap_or(Duration::from_secs_f64(crate::defaults::DEFAULT_TIMEOUT_SECONDS))
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(urls) = std::env::var("BENCH_URLS") {
            self.target_urls = split_list(&urls).map(str::to_string).collect();
        }

        if let Ok(qps) = std::env::var("BENCH_QPS") {
            self.qps = parse_list("BENCH_QPS", &qps)?;
        }

        if let Ok(timeouts) = std::env::var("BENCH_TIMEOUT_SECONDS") {
            self.timeouts_seconds = parse_list("BENCH_TIMEOUT_SECONDS", &timeouts)?;
        }

        if let Ok(durations) = std::env::var("BENCH_DURATION_SECONDS") {
            self.durations_seconds = parse_list("BENCH_DURATION_SECONDS", &durations)?;
        }

        if let Ok(top_errors) = std::env::var("BENCH_TOP_ERRORS") {
            self.top_errors = top_errors.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid BENCH_TOP_ERRORS value '{}': {}", top_errors, e)))?;
        }

        if let Ok(max_in_flight) = std::env::var("BENCH_MAX_IN_FLIGHT") {
            self.max_in_flight = Some(max_in_flight.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid BENCH_MAX_IN_FLIGHT value '{}': {}", max_in_flight, e)))?);
        }

        if let Ok(csv_path) = std::env::var("BENCH_CSV_PATH") {
            let csv_path = csv_path.trim();
            if !csv_path.is_empty() {
                self.csv_path = Some(PathBuf::from(csv_path));
            }
        }

        if let Ok(preflight) = std::env::var("BENCH_PREFLIGHT") {
            self.preflight = preflight.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid BENCH_PREFLIGHT value '{}': {}", preflight, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

fn check_seconds(name: &str, values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(AppError::config(format!("At least one {} value is required", name.to_lowercase())));
    }

    for value in values {
        if !value.is_finite() || *value <= 0.0 {
            return Err(AppError::config(format!(
                "{} must be a positive number of seconds, got {}",
                name, value
            )));
        }
    }

    Ok(())
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_list<T>(name: &str, value: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    split_list(value)
        .map(|item| {
            item.parse::<T>()
                .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", name, item, e)))
        })
        .collect()
}

// Default value functions for serde
fn default_qps() -> Vec<u32> {
    vec![crate::defaults::DEFAULT_QPS]
}

fn default_timeouts() -> Vec<f64> {
    vec![crate::defaults::DEFAULT_TIMEOUT_SECONDS]
}

fn default_durations() -> Vec<f64> {
    vec![crate::defaults::DEFAULT_DURATION_SECONDS]
}

fn default_top_errors() -> usize {
    crate::defaults::DEFAULT_TOP_ERRORS
}

fn default_preflight() -> bool {
    crate::defaults::DEFAULT_PREFLIGHT
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
