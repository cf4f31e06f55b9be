//! Configuration validation utilities and rules

use crate::{
    client::{HttpExecutor, ProbeResult},
    error::Result,
    models::{config::normalize_url, Config},
};
use colored::Colorize;
use std::net::IpAddr;

/// `qps × timeout` above which unbounded runs may pile up this many requests
pub const IN_FLIGHT_WARNING_THRESHOLD: f64 = 1_000.0;

/// Total sweep window, in seconds, that earns a long-run warning
pub const LONG_SWEEP_SECONDS: f64 = 600.0;

/// Configuration validator with advanced validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration and collect non-fatal findings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_target_urls(&config.target_urls)?);
        warnings.extend(Self::validate_rate_settings(config));
        warnings.extend(Self::validate_sweep_length(config));

        Ok(warnings)
    }

    fn validate_target_urls(urls: &[String]) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        for raw in urls {
            let normalized = normalize_url(raw)?;
            let parsed = url::Url::parse(&normalized)?;

            if normalized != raw.trim() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("URL '{}' has no scheme, using '{}'", raw, normalized),
                ));
            }

            if parsed.scheme() == "http" {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("URL '{}' uses plain HTTP", normalized),
                ));
            }

            if Self::is_local_host(&parsed) {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!(
                        "URL '{}' targets a private/local address, latencies will not include the wider network",
                        normalized
                    ),
                ));
            }
        }

        Ok(warnings)
    }

    fn validate_rate_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for &qps in &config.qps {
            let interval = 1.0 / f64::from(qps);

            for &duration in &config.durations_seconds {
                if duration < interval {
                    warnings.push(ValidationWarning::new(
                        ValidationLevel::Warning,
                        format!(
                            "Duration {}s is shorter than one tick at {} QPS ({:.3}s), only one request will be sent",
                            duration, qps, interval
                        ),
                    ));
                }
            }

            for &timeout in &config.timeouts_seconds {
                let worst_case = f64::from(qps) * timeout;

                match config.max_in_flight {
                    None if worst_case > IN_FLIGHT_WARNING_THRESHOLD => {
                        warnings.push(ValidationWarning::new(
                            ValidationLevel::Warning,
                            format!(
                                "{} QPS with a {}s timeout can leave up to {:.0} requests outstanding against a slow target; consider --max-in-flight",
                                qps, timeout, worst_case
                            ),
                        ));
                    }
                    Some(limit) if (limit as f64) < worst_case => {
                        warnings.push(ValidationWarning::new(
                            ValidationLevel::Info,
                            format!(
                                "Max in-flight of {} may hold back requests at {} QPS with a {}s timeout",
                                limit, qps, timeout
                            ),
                        ));
                    }
                    _ => {}
                }
            }
        }

        warnings
    }

    fn validate_sweep_length(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let runs = config.plan_count();
        let per_combination = config.target_urls.len() * config.qps.len() * config.timeouts_seconds.len();
        let total_seconds = per_combination as f64 * config.durations_seconds.iter().sum::<f64>();

        if total_seconds > LONG_SWEEP_SECONDS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Configuration will perform {} runs lasting at least {:.0}s in total",
                    runs, total_seconds
                ),
            ));
        } else if runs > 1 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Configuration will perform {} runs", runs),
            ));
        }

        warnings
    }

    fn is_local_host(url: &url::Url) -> bool {
        match url.host() {
            Some(url::Host::Ipv4(ip)) => ip.is_private() || ip.is_loopback() || ip.is_link_local(),
            Some(url::Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
            Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
            None => false,
        }
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> &'static str {
        match self {
            Self::Info => "blue",
            Self::Warning => "yellow",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()).bold(), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}

/// HEAD every distinct target once before benchmarking
///
/// Unreachable targets are errors. Targets that answer with an error status
/// only produce a warning, since benchmarking an endpoint that returns 4xx or
/// 5xx on purpose is legitimate.
pub async fn preflight_targets(config: &Config, executor: &HttpExecutor) -> Result<Vec<ValidationWarning>> {
    let probe_timeout = config.min_timeout();
    let mut seen: Vec<String> = Vec::new();
    let mut warnings = Vec::new();

    for raw in &config.target_urls {
        let url = normalize_url(raw)?;
        if seen.contains(&url) {
            continue;
        }

        let probe = executor.probe(&url, probe_timeout).await?;
        warnings.extend(preflight_warning(&probe));
        seen.push(url);
    }

    Ok(warnings)
}

/// Warning for a preflight answer that was not 2xx/3xx
pub fn preflight_warning(probe: &ProbeResult) -> Option<ValidationWarning> {
    if probe.is_success() {
        return None;
    }

    Some(ValidationWarning::new(
        ValidationLevel::Warning,
        format!(
            "Preflight check of {} returned HTTP {}, benchmarking anyway",
            probe.url, probe.status_code
        ),
    ))
}
