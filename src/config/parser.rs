//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Configuration parser that combines CLI arguments with environment variables
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Parse without reading `.env`, used where the working directory must not leak in
    pub fn parse_without_env_file(&self) -> Result<Config> {
        let mut config = Config::default();
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    ///
    /// A repeatable flag given at least once replaces the whole list.
    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if !cli.urls.is_empty() {
            config.target_urls = cli.urls.clone();
        }
        if !cli.qps.is_empty() {
            config.qps = cli.qps.clone();
        }
        if !cli.timeouts.is_empty() {
            config.timeouts_seconds = cli.timeouts.clone();
        }
        if !cli.durations.is_empty() {
            config.durations_seconds = cli.durations.clone();
        }
        if let Some(top_errors) = cli.top_errors {
            config.top_errors = top_errors;
        }
        if let Some(limit) = cli.max_in_flight {
            config.max_in_flight = Some(limit);
        }
        if let Some(ref path) = cli.csv {
            config.csv_path = Some(path.clone());
        }
        if let Some(format) = cli.format {
            config.output_format = format;
        }
        if cli.no_preflight {
            config.preflight = false;
        }

        if cli.no_color {
            config.enable_color = false;
        } else if cli.color {
            config.enable_color = true;
        }

        // CLI-only flags
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
            eprintln!(
                "Final config: urls={}, plans={}, enable_color={}",
                config.target_urls.len(),
                config.plan_count(),
                config.enable_color
            );
        }
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Target URLs: {}", config.target_urls.join(", ")));
    summary.push(format!("QPS: {}", join(&config.qps)));
    summary.push(format!("Timeouts: {}s", join(&config.timeouts_seconds)));
    summary.push(format!("Durations: {}s", join(&config.durations_seconds)));
    summary.push(format!("Runs: {}", config.plan_count()));
    summary.push(format!("Top Errors: {}", config.top_errors));
    summary.push(format!(
        "Max In Flight: {}",
        config.max_in_flight.map_or_else(|| "unbounded".to_string(), |n| n.to_string())
    ));
    if let Some(ref path) = config.csv_path {
        summary.push(format!("CSV Output: {}", path.display()));
    }
    summary.push(format!("Preflight: {}", config.preflight));
    summary.push(format!("Output Format: {}", config.output_format));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}

fn join<T: ToString>(values: &[T]) -> String {
    values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
