//! Error type definitions.

use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use serde::Serialize;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error building the TLS client configuration.
    #[error("TLS configuration error: {0}")]
    TlsConfigError(#[from] rustls::Error),
}

/// Top-level failure of a chase.
///
/// Transport failures never show up here: they end the chase quietly and are
/// visible on the last recorded page instead.
#[derive(Error, Debug)]
pub enum ChaseError {
    /// The number of recorded pages reached the configured hop limit.
    #[error("too many redirects ({0})")]
    TooManyRedirects(usize),

    /// The overall chase deadline expired while a hop was in flight.
    #[error("chase timed out after {0:?}")]
    Timeout(Duration),

    /// The progress sink asked the chase to stop. Carries the sink's own error.
    #[error(transparent)]
    Aborted(anyhow::Error),
}

/// Broad category of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// The request could not be built (bad URL, bad header).
    Builder,
    /// A redirect policy error. Unexpected, since redirects are disabled.
    Redirect,
    /// Connect, read or lookup timed out.
    Timeout,
    /// Generic request failure.
    Request,
    /// TCP/TLS connection could not be established.
    Connect,
    /// Failure while reading the response body.
    Body,
    /// Failure decoding the response.
    Decode,
    /// Anything else.
    Other,
}

impl TransportErrorKind {
    /// Returns a human-readable name for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Builder => "request builder error",
            TransportErrorKind::Redirect => "redirect error",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Request => "request error",
            TransportErrorKind::Connect => "connect error",
            TransportErrorKind::Body => "body error",
            TransportErrorKind::Decode => "decode error",
            TransportErrorKind::Other => "other error",
        }
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A network, TLS or DNS failure during one hop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    /// Creates a transport error of the given kind.
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The failure category.
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// The full failure description, including underlying causes.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ReqwestError> for TransportError {
    fn from(error: ReqwestError) -> Self {
        Self {
            kind: super::categorize_reqwest_error(&error),
            message: super::error_chain(&error),
        }
    }
}

/// A redirect target or starting URL that cannot become a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    /// The target is not a valid absolute or relative URL.
    #[error("invalid URL: {0}")]
    Parse(#[from] url::ParseError),

    /// The target parsed but uses a scheme other than http or https.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// Error types for the result sinks.
#[derive(Error, Debug)]
pub enum ExportError {
    /// There is no page whose body could be written.
    #[error("No pages retrieved")]
    NoPages,

    /// The page trace could not be serialized.
    #[error("Failed to serialize details: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing to the destination failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
