//! Data models for benchmark configuration and results

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::{BenchmarkConfig, Config};
pub use metrics::{ErrorCount, ErrorCounts, RequestOutcome, RunResults};
