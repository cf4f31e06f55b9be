//! Environment variable handling and .env file management

use crate::{
    error::{AppError, Result},
    models::config::normalize_url,
};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        if Path::new(".env").exists() {
            dotenv::from_filename(".env")
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

            if debug {
                eprintln!("Loaded configuration from .env file");
            }
        } else if debug {
            eprintln!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "BENCH_URLS" => {
                for url in entries(value) {
                    normalize_url(url)
                        .map_err(|e| AppError::config(format!("Invalid BENCH_URLS entry '{}': {}", url, e)))?;
                }
            }
            "BENCH_QPS" => {
                for entry in entries(value) {
                    let qps: u32 = entry
                        .parse()
                        .map_err(|e| AppError::config(format!("Invalid BENCH_QPS value '{}': {}", entry, e)))?;
                    if qps == 0 {
                        return Err(AppError::config("BENCH_QPS values must be greater than 0"));
                    }
                }
            }
            "BENCH_TIMEOUT_SECONDS" | "BENCH_DURATION_SECONDS" => {
                for entry in entries(value) {
                    let seconds: f64 = entry
                        .parse()
                        .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, entry, e)))?;
                    if !seconds.is_finite() || seconds <= 0.0 {
                        return Err(AppError::config(format!(
                            "{} values must be positive, got: {}",
                            key, entry
                        )));
                    }
                }
            }
            "BENCH_TOP_ERRORS" | "BENCH_MAX_IN_FLIGHT" => {
                let count: usize = value
                    .trim()
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if count == 0 {
                    return Err(AppError::config(format!("{} must be greater than 0", key)));
                }
            }
            "BENCH_PREFLIGHT" | "ENABLE_COLOR" => {
                value
                    .trim()
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            _ => {
                // BENCH_CSV_PATH accepts any path; unknown keys are ignored
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("BENCH_URLS", "Comma-separated list of URLs to benchmark", "https://example.com/health"),
            ("BENCH_QPS", "Comma-separated requests per second", "10,50"),
            ("BENCH_TIMEOUT_SECONDS", "Comma-separated per-request timeouts", "1,5"),
            ("BENCH_DURATION_SECONDS", "Comma-separated window durations", "30"),
            ("BENCH_TOP_ERRORS", "Number of most frequent errors to report", "3"),
            ("BENCH_MAX_IN_FLIGHT", "Cap on outstanding requests", "500"),
            ("BENCH_CSV_PATH", "CSV file to append results to", "results.csv"),
            ("BENCH_PREFLIGHT", "HEAD check targets before benchmarking", "true"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<24} {}\n", var, description));
            help.push_str(&format!("  {:<24} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(name, _, _)| {
                let value = std::env::var(name).ok()?;
                Self::validate_env_var(name, &value).err()
            })
            .map(|e| format!("Warning: {}", e))
            .collect()
    }

    /// Check if .env file exists and validate its contents
    pub fn check_env_file() -> Result<Option<Vec<String>>> {
        Self::check_env_file_at(Path::new(".env"))
    }

    /// Validate the `KEY=value` lines of an env file
    pub fn check_env_file_at(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut warnings = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                if let Err(e) = Self::validate_env_var(key.trim(), value.trim()) {
                    warnings.push(format!("Line '{}': {}", line, e));
                }
            }
        }

        Ok(Some(warnings))
    }
}

fn entries(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_LOCK;
    use tempfile::TempDir;

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("BENCH_URLS", "https://a.test,example.com/health").is_ok());
        assert!(EnvManager::validate_env_var("BENCH_QPS", "1, 10,100").is_ok());
        assert!(EnvManager::validate_env_var("BENCH_TIMEOUT_SECONDS", "0.5,2").is_ok());
        assert!(EnvManager::validate_env_var("BENCH_DURATION_SECONDS", "30").is_ok());
        assert!(EnvManager::validate_env_var("BENCH_TOP_ERRORS", "5").is_ok());
        assert!(EnvManager::validate_env_var("BENCH_MAX_IN_FLIGHT", "64").is_ok());
        assert!(EnvManager::validate_env_var("BENCH_PREFLIGHT", "false").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "true").is_ok());
        assert!(EnvManager::validate_env_var("BENCH_CSV_PATH", "anything.csv").is_ok());
        assert!(EnvManager::validate_env_var("UNRELATED", "whatever").is_ok());

        assert!(EnvManager::validate_env_var("BENCH_URLS", "ftp://files.test").is_err());
        assert!(EnvManager::validate_env_var("BENCH_QPS", "0").is_err());
        assert!(EnvManager::validate_env_var("BENCH_QPS", "fast").is_err());
        assert!(EnvManager::validate_env_var("BENCH_TIMEOUT_SECONDS", "-1").is_err());
        assert!(EnvManager::validate_env_var("BENCH_DURATION_SECONDS", "inf").is_err());
        assert!(EnvManager::validate_env_var("BENCH_TOP_ERRORS", "0").is_err());
        assert!(EnvManager::validate_env_var("BENCH_MAX_IN_FLIGHT", "lots").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();

        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("BENCH_URLS"));
        assert!(help.contains("BENCH_MAX_IN_FLIGHT"));
        assert!(help.contains("Configuration Priority"));
    }

    #[test]
    fn test_validate_current_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for (name, _, _) in EnvManager::get_supported_env_vars() {
            std::env::remove_var(name);
        }
        assert!(EnvManager::validate_current_env().is_empty());

        std::env::set_var("BENCH_QPS", "0");
        let warnings = EnvManager::validate_current_env();
        std::env::remove_var("BENCH_QPS");

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("BENCH_QPS"));
    }

    #[test]
    fn test_check_env_file_at() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        assert!(EnvManager::check_env_file_at(&path).unwrap().is_none());

        std::fs::write(&path, "# comment\nBENCH_QPS=10\nBENCH_TOP_ERRORS=0\n\nENABLE_COLOR=yes\n").unwrap();
        let warnings = EnvManager::check_env_file_at(&path).unwrap().unwrap();

        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("BENCH_TOP_ERRORS"));
        assert!(warnings[1].contains("ENABLE_COLOR"));
    }
}
