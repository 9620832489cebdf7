//! Error types for ChatGenie
//!
//! This module defines the error types used throughout the crate, using
//! `thiserror` for ergonomic error handling. Exchange failures have their own
//! enum because they are surfaced to the user as text, while the remaining
//! variants are ordinary operational errors.

use thiserror::Error;

/// Main error type for ChatGenie operations
///
/// Covers configuration loading, storage backends, the remote exchange,
/// and the serialization layers underneath them.
#[derive(Error, Debug)]
pub enum ChatGenieError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Key-value storage errors (open, read, write, flush)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Rejected user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Remote chat exchange failures
    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure kinds of a single request/response cycle
///
/// The `Display` output is the human-readable reason that follows the
/// `"Failed to send message: "` prefix in banners and transcript entries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// No response arrived within the configured bound; the request was aborted
    #[error("Request timed out")]
    Timeout,

    /// The endpoint answered with a non-2xx status
    #[error("Server Error: {status} {reason}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase for the status, if any
        reason: String,
    },

    /// The endpoint answered 2xx with `status: "error"`
    #[error("{0}")]
    ApplicationError(String),

    /// Transport failure (connection refused, DNS, reset, undecodable body)
    #[error("Network connection error: {0}")]
    NetworkError(String),
}

impl ExchangeError {
    /// Whether a retry policy may repeat the network step after this failure
    ///
    /// An application error is a deliberate answer from the server, so
    /// repeating the same request is not expected to change it.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ApplicationError(_))
    }
}

/// Result type alias for ChatGenie operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
