//! Type definitions and aliases

use std::fmt;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Normalized classification of a single request attempt
///
/// The variant set is closed. Anything the HTTP client reports that is not a
/// status, a timeout or a transport failure ends up in `OtherError` with the
/// original message kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeStatus {
    /// A response arrived (headers and full body) with this status code
    HttpStatus(u16),
    /// No complete response within the per-request timeout
    Timeout,
    /// Connection-level failure without a status code
    TransportError(String),
    /// Anything else
    OtherError(String),
}

impl OutcomeStatus {
    /// The only classification counted as a success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::HttpStatus(200))
    }

    /// Short machine-friendly kind name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HttpStatus(_) => "http_status",
            Self::Timeout => "timeout",
            Self::TransportError(_) => "transport_error",
            Self::OtherError(_) => "other_error",
        }
    }

    /// Status code, when a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(code) => write!(f, "{}", code),
            Self::Timeout => write!(f, "Timeout"),
            Self::TransportError(detail) => write!(f, "ClientError: {}", detail),
            Self::OtherError(detail) => write!(f, "Other: {}", detail),
        }
    }
}

/// Report rendering selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Boxed human-readable table
    #[default]
    Table,
    /// Pretty-printed JSON document
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
        }
    }
}
