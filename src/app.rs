//! Main application orchestration and execution

use crate::{
    cli::Cli,
    client::HttpExecutor,
    config::{display_config_summary, load_config, EnvManager, preflight_targets, validate_config, ValidationLevel, ValidationWarning},
    error::{AppError, Result},
    log_debug, log_info,
    logging::{Logger, LoggerFactory},
    models::Config,
    output::{BenchmarkReport, CsvReporter, OutputFormatter, OutputFormatterFactory},
    scheduler::run_benchmark_with_logger,
};
use std::sync::Arc;

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
}

impl App {
    /// Check the command line and load the layered configuration
    pub fn new(cli: Cli) -> Result<Self> {
        cli.validate().map_err(AppError::config)?;
        let config = load_config(cli)?;
        Ok(Self { config })
    }

    /// Use an already loaded configuration
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Validate, preflight, then run every plan of the sweep in order
    ///
    /// Reports go to stdout as each run finishes; warnings and progress go
    /// to stderr so JSON output stays parseable.
    pub async fn run(self) -> Result<Vec<BenchmarkReport>> {
        let config = &self.config;

        let warnings = validate_config(config)?;
        self.print_warnings(&warnings);

        if config.debug {
            eprintln!(
                "{} v{} ({}, built {} for {})",
                crate::PKG_NAME,
                crate::VERSION,
                crate::GIT_COMMIT,
                crate::BUILD_TIME,
                crate::TARGET_TRIPLE
            );
            eprintln!("\nConfiguration Summary:");
            eprintln!("{}\n", display_config_summary(config));
            eprintln!("{}", EnvManager::display_env_help());
        }

        let factory = LoggerFactory::new(config.clone());
        let app_logger = factory.create_logger("APP").await;
        let run_logger = Arc::new(factory.create_run_logger().await);

        if config.preflight {
            self.preflight(&app_logger, &factory).await?;
        }

        let plans = config.create_benchmark_plans()?;
        log_debug!(app_logger, "Expanded configuration into {} plan(s)", plans.len());
        let formatter = OutputFormatterFactory::from_config(config);

        let header = formatter.format_header(&format!("HTTP Rate Bench v{}", crate::VERSION))?;
        if !header.is_empty() {
            println!("{}", header);
        }

        let mut reports = Vec::with_capacity(plans.len());
        for (index, plan) in plans.iter().enumerate() {
            if plans.len() > 1 || config.verbose {
                eprintln!(
                    "Run {}/{}: {} at {} QPS, timeout {}s, duration {}s",
                    index + 1,
                    plans.len(),
                    plan.url(),
                    plan.rate(),
                    plan.timeout().as_secs_f64(),
                    plan.duration().as_secs_f64()
                );
            }

            let results = run_benchmark_with_logger(plan, Some(Arc::clone(&run_logger))).await?;
            let report = BenchmarkReport::new(plan, &results, config.top_errors);

            println!("{}", formatter.format_report(&report)?);

            if let Some(ref path) = config.csv_path {
                if let Err(e) = CsvReporter::append(path, &report) {
                    factory.create_error_logger().log_error(&e, Some("CSV export"), None).await;
                    return Err(e);
                }
            }

            reports.push(report);
        }

        let summary = formatter.format_sweep_summary(&reports)?;
        if !summary.is_empty() {
            println!("\n{}", summary);
        }

        if let Some(ref path) = config.csv_path {
            log_info!(app_logger, "Appended {} run(s) to {}", reports.len(), path.display());
        }

        Ok(reports)
    }

    async fn preflight(&self, logger: &Logger, factory: &LoggerFactory) -> Result<()> {
        let executor = HttpExecutor::new()?;
        log_info!(logger, "Preflight check of {} target(s)", self.config.target_urls.len());

        match preflight_targets(&self.config, &executor).await {
            Ok(warnings) => {
                self.print_warnings(&warnings);
                Ok(())
            }
            Err(e) => {
                factory.create_error_logger().log_error(&e, Some("Preflight"), None).await;
                Err(e)
            }
        }
    }

    /// Warnings always, informational notes only in verbose mode
    fn print_warnings(&self, warnings: &[ValidationWarning]) {
        let shown: Vec<_> = warnings
            .iter()
            .filter(|w| w.level != ValidationLevel::Info || self.config.verbose)
            .collect();
        if shown.is_empty() {
            return;
        }

        for warning in shown {
            eprintln!("{}", warning.format(self.config.enable_color));
        }
    }
}

/// Convenience entry point used by the binary
pub async fn run(cli: Cli) -> Result<Vec<BenchmarkReport>> {
    App::new(cli)?.run().await
}
