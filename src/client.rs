//! HTTP request execution and outcome classification


use crate::{
    error::{AppError, Result},
    models::metrics::RequestOutcome,
    types::OutcomeStatus,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::{
    error::Error as StdError,
    time::{Duration, Instant},
};
use tokio::time::timeout;

/// User agent sent with every request
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Performs one request and classifies what happened
///
/// Implementations never fail: every problem is folded into the returned
/// [`RequestOutcome`].
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Issue one GET against `url`, waiting at most `request_timeout` for the
    /// complete response
    async fn execute(&self, url: &str, request_timeout: Duration) -> RequestOutcome;
}

/// Build the connection-pooling client shared by all requests of a run
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {}", error_chain(&e))))
}

/// Request executor backed by a shared `reqwest` client
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// Create an executor with a freshly built client
    pub fn new() -> Result<Self> {
        Ok(Self { client: build_client()? })
    }

    /// Send a single HEAD request to check that `url` is reachable
    ///
    /// Any HTTP status counts as reachable. Transport failures and timeouts
    /// are network errors.
    pub async fn probe(&self, url: &str, request_timeout: Duration) -> Result<ProbeResult> {
        let start = Instant::now();

        match timeout(request_timeout, self.client.head(url).send()).await {
            Ok(Ok(response)) => Ok(ProbeResult {
                url: url.to_string(),
                status_code: response.status().as_u16(),
                response_time: start.elapsed(),
            }),
            Ok(Err(e)) => Err(AppError::network(format!(
                "Preflight check of {} failed: {}",
                url,
                error_chain(&e)
            ))),
            Err(_) => Err(AppError::network(format!(
                "Preflight check of {} timed out after {:.1}s",
                url,
                request_timeout.as_secs_f64()
            ))),
        }
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, url: &str, request_timeout: Duration) -> RequestOutcome {
        let start = Instant::now();

        let attempt = async {
            let response = self.client.get(url).send().await?;
            let code = response.status().as_u16();
            // The response only counts once the whole body has arrived
            response.bytes().await?;
            Ok::<u16, reqwest::Error>(code)
        };

        let status = match timeout(request_timeout, attempt).await {
            Ok(Ok(code)) => OutcomeStatus::HttpStatus(code),
            Ok(Err(e)) => classify_reqwest_error(&e),
            Err(_) => OutcomeStatus::Timeout,
        };

        RequestOutcome::new(start.elapsed(), status)
    }
}

/// Map a client error onto the outcome taxonomy
pub fn classify_reqwest_error(error: &reqwest::Error) -> OutcomeStatus {
    if error.is_timeout() {
        OutcomeStatus::Timeout
    } else if error.is_connect() || error.is_request() || error.is_body() || error.is_decode() {
        OutcomeStatus::TransportError(error_chain(error))
    } else {
        OutcomeStatus::OtherError(error_chain(error))
    }
}

/// Render an error with all of its sources, outermost first
pub fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !rendered.ends_with(&message) {
            rendered.push_str(": ");
            rendered.push_str(&message);
        }
        source = cause.source();
    }
    rendered
}

/// Result of a preflight HEAD request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub url: String,
    pub status_code: u16,
    pub response_time: Duration,
}

impl ProbeResult {
    /// 2xx and 3xx answers
    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer {
        message: &'static str,
        source: Option<Box<Layer>>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source.as_deref().map(|s| s as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let error = Layer {
            message: "error sending request",
            source: Some(Box::new(Layer {
                message: "tcp connect error",
                source: Some(Box::new(Layer { message: "Connection refused", source: None })),
            })),
        };

        assert_eq!(
            error_chain(&error),
            "error sending request: tcp connect error: Connection refused"
        );
    }

    #[test]
    fn test_error_chain_skips_repeated_suffix() {
        let error = Layer {
            message: "connect failed: refused",
            source: Some(Box::new(Layer { message: "refused", source: None })),
        };
        assert_eq!(error_chain(&error), "connect failed: refused");
    }

    #[test]
    fn test_probe_result_success_range() {
        let mut result = ProbeResult {
            url: "http://example.com".to_string(),
            status_code: 204,
            response_time: Duration::from_millis(3),
        };
        assert!(result.is_success());
        result.status_code = 301;
        assert!(result.is_success());
        result.status_code = 404;
        assert!(!result.is_success());
    }

    #[test]
    fn test_build_client() {
        assert!(build_client().is_ok());
        assert!(HttpExecutor::new().is_ok());
        assert!(USER_AGENT.starts_with("http-rate-bench/"));
    }

    #[tokio::test]
    async fn test_invalid_url_is_other_error() {
        let executor = HttpExecutor::new().unwrap();
        let outcome = executor.execute("not a url", Duration::from_secs(1)).await;

        match outcome.status {
            OutcomeStatus::OtherError(detail) => assert!(!detail.is_empty()),
            other => panic!("expected OtherError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let executor = HttpExecutor::new().unwrap();
        // Nothing listens on port 1
        let outcome = executor.execute("http://127.0.0.1:1/", Duration::from_secs(5)).await;

        assert!(!outcome.is_success());
        match outcome.status {
            OutcomeStatus::TransportError(detail) => assert!(!detail.is_empty()),
            other => panic!("expected TransportError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_probe_refused_connection_is_network_error() {
        let executor = HttpExecutor::new().unwrap();
        let error = executor
            .probe("http://127.0.0.1:1/", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(error.category(), "NETWORK");
        assert_eq!(error.exit_code(), 2);
        assert!(error.to_string().contains("127.0.0.1:1"));
    }
}
