//! Configuration types.
//!
//! This module defines the structs consumed by the chase engine and the
//! HTTP transport, plus the logging enums shared with the CLI.

use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_HOP_LIMIT, DNS_TIMEOUT_SECS, POOL_IDLE_TIMEOUT, POOL_MAX_IDLE_PER_HOST,
    TCP_CONNECT_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Configuration for a single chase.
///
/// Every chase reads this once when it starts; nothing in it changes while
/// hops are being followed.
///
/// # Examples
///
/// ```
/// use chaselink::ChaseConfig;
/// use std::time::Duration;
///
/// let config = ChaseConfig::default()
///     .with_limit(5)
///     .with_timeout(Duration::from_secs(30))
///     .with_user_agent("chaselink-test/1.0");
/// assert_eq!(config.limit, 5);
/// ```
#[derive(Debug, Clone)]
pub struct ChaseConfig {
    /// Maximum number of recorded pages (0 = unlimited)
    pub limit: usize,

    /// Deadline spanning the whole chase (None = no deadline)
    pub timeout: Option<Duration>,

    /// User-Agent applied to every hop (None = transport default)
    pub user_agent: Option<String>,
}

impl Default for ChaseConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HOP_LIMIT,
            timeout: None,
            user_agent: None,
        }
    }
}

impl ChaseConfig {
    /// Sets the hop limit. Zero disables the limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the overall chase deadline. A zero duration disables it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Sets the User-Agent override. An empty string keeps the transport default.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        self.user_agent = (!user_agent.is_empty()).then_some(user_agent);
        self
    }
}

/// Connection-level knobs for the reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// DNS lookup timeout
    pub dns_timeout: Duration,
    /// TLS handshake timeout for the session probe
    pub tls_handshake_timeout: Duration,
    /// Idle timeout for pooled connections
    pub pool_idle_timeout: Duration,
    /// Maximum idle pooled connections per host
    pub pool_max_idle_per_host: usize,
    /// DER certificates trusted in addition to the webpki roots, by both the
    /// client and the TLS session probe
    pub extra_root_certificates: Vec<Vec<u8>>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
            dns_timeout: Duration::from_secs(DNS_TIMEOUT_SECS),
            tls_handshake_timeout: Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
            pool_idle_timeout: POOL_IDLE_TIMEOUT,
            pool_max_idle_per_host: POOL_MAX_IDLE_PER_HOST,
            extra_root_certificates: Vec::new(),
        }
    }
}
