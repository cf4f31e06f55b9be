//! Fixed-rate request scheduling
//!
//! The scheduler launches one request per tick for the length of the window
//! and never waits for a request before launching the next one. After the
//! window closes it waits for every launched request, then hands the
//! outcomes to the [`Aggregator`](crate::stats::Aggregator).

pub mod limits;

pub use limits::{InFlightGuard, InFlightLimiter};

use crate::{
    client::{HttpExecutor, RequestExecutor},
    error::Result,
    logging::RunLogger,
    models::{BenchmarkConfig, RequestOutcome, RunResults},
    stats::Aggregator,
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::{sync::Arc, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle, time::Instant};

/// Raw output of one scheduling pass, before aggregation
#[derive(Debug, Clone)]
pub struct CollectedRun {
    /// Outcomes in completion order
    pub outcomes: Vec<RequestOutcome>,
    pub window_start: DateTime<Utc>,
    /// Taken after every launched request has settled
    pub window_end: DateTime<Utc>,
    /// Requests launched
    pub issued: usize,
    pub peak_in_flight: usize,
}

/// Drives one benchmark run at a fixed nominal rate
pub struct Scheduler {
    config: BenchmarkConfig,
    executor: Arc<dyn RequestExecutor>,
    logger: Option<Arc<RunLogger>>,
}

impl Scheduler {
    pub fn new(config: BenchmarkConfig, executor: Arc<dyn RequestExecutor>) -> Self {
        Self {
            config,
            executor,
            logger: None,
        }
    }

    /// Log run start, end and per-request failures through `logger`
    pub fn with_logger(mut self, logger: Arc<RunLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run the window and aggregate the outcomes
    pub async fn run(&self) -> RunResults {
        let correlation_id = match &self.logger {
            Some(logger) => Some(logger.log_run_start(&self.config).await),
            None => None,
        };

        let collected = self.collect(correlation_id.as_deref()).await;
        let issued = collected.issued;
        let results = Aggregator::aggregate(collected.outcomes, collected.window_start, collected.window_end)
            .with_peak_in_flight(collected.peak_in_flight);

        if let (Some(logger), Some(id)) = (&self.logger, &correlation_id) {
            logger.log_run_complete(id, &self.config, &results, issued).await;
        }

        results
    }

    /// Launch requests for the whole window and gather every outcome
    pub async fn collect(&self, correlation_id: Option<&str>) -> CollectedRun {
        let interval = self.config.interval();
        let duration = self.config.duration();
        let request_timeout = self.config.timeout();
        let url: Arc<str> = Arc::from(self.config.url());
        let correlation_id: Option<Arc<str>> = correlation_id.map(Arc::from);

        let limiter = Arc::new(InFlightLimiter::new(self.config.max_in_flight()));
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let mut handles: Vec<JoinHandle<()>> = Vec::new();

        let window_start = Utc::now();
        let start = Instant::now();

        while start.elapsed() <= duration {
            let executor = Arc::clone(&self.executor);
            let limiter = Arc::clone(&limiter);
            let sender = sender.clone();
            let url = Arc::clone(&url);
            let logger = self.logger.clone();
            let correlation_id = correlation_id.clone();

            handles.push(tokio::spawn(async move {
                let _slot = limiter.acquire().await;
                let outcome = executor.execute(&url, request_timeout).await;

                if let (Some(logger), Some(id)) = (logger, correlation_id) {
                    logger.log_outcome(&id, &outcome).await;
                }

                // The receiver outlives every task
                let _ = sender.send(outcome);
            }));

            tokio::time::sleep(interval).await;
        }
        drop(sender);

        let issued = handles.len();
        let joined = join_all(handles).await;

        let mut outcomes = Vec::with_capacity(issued);
        while let Some(outcome) = receiver.recv().await {
            outcomes.push(outcome);
        }

        // A task that died before reporting still counts as an issued request
        for failure in joined.into_iter().filter_map(|r| r.err()) {
            outcomes.push(RequestOutcome::other_error(
                Duration::ZERO,
                format!("request task failed: {}", failure),
            ));
        }

        CollectedRun {
            outcomes,
            window_start,
            window_end: Utc::now(),
            issued,
            peak_in_flight: limiter.peak(),
        }
    }
}

/// Run one benchmark against a real HTTP target
///
/// Builds a fresh connection-pooling client for the run and drops it when
/// the run ends.
pub async fn run_benchmark(config: &BenchmarkConfig) -> Result<RunResults> {
    run_benchmark_with_logger(config, None).await
}

/// [`run_benchmark`] with run lifecycle logging
pub async fn run_benchmark_with_logger(
    config: &BenchmarkConfig,
    logger: Option<Arc<RunLogger>>,
) -> Result<RunResults> {
    let executor: Arc<dyn RequestExecutor> = Arc::new(HttpExecutor::new()?);
    let mut scheduler = Scheduler::new(config.clone(), executor);
    if let Some(logger) = logger {
        scheduler = scheduler.with_logger(logger);
    }
    Ok(scheduler.run().await)
}
