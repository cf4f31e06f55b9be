//! HTTP Rate Bench
//!
//! A fixed-rate HTTP load generator. A [`Scheduler`](scheduler::Scheduler)
//! launches one GET per tick without waiting for earlier requests, the
//! [`HttpExecutor`](client::HttpExecutor) classifies every outcome, and the
//! [`Aggregator`](stats::Aggregator) turns the outcomes of a run into counts,
//! achieved rate, success percentage, mean latency and the most frequent
//! errors.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod scheduler;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use client::{HttpExecutor, RequestExecutor};
pub use error::{AppError, Result};
pub use models::{BenchmarkConfig, Config, RequestOutcome, RunResults};
pub use output::{BenchmarkReport, CsvReporter, OutputFormatter, OutputFormatterFactory};
pub use scheduler::{run_benchmark, Scheduler};
pub use stats::{Aggregator, RunSummary};
pub use types::{OutcomeStatus, OutputFormat};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata recorded by the build script
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_QPS: u32 = 10;
    pub const DEFAULT_TIMEOUT_SECONDS: f64 = 10.0;
    pub const DEFAULT_DURATION_SECONDS: f64 = 10.0;
    pub const DEFAULT_TOP_ERRORS: usize = 3;
    pub const DEFAULT_PREFLIGHT: bool = true;
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
