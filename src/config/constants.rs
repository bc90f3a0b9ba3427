//! Configuration constants.
//!
//! Defaults used by the chase engine, the HTTP transport and the CLI.

use std::time::Duration;

/// Default maximum number of recorded hops per chase.
///
/// A chase that records this many pages without reaching a terminal
/// response fails with "too many redirects".
pub const DEFAULT_HOP_LIMIT: usize = 10;

// Network operation timeouts
/// DNS query timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 10;
/// TLS handshake timeout for the session probe in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 10;
/// How long an idle pooled connection is kept around.
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
/// Maximum idle connections kept per host.
pub const POOL_MAX_IDLE_PER_HOST: usize = 100;

/// Text recorded when the negotiated TLS parameters could not be determined.
pub const UNKNOWN_TLS_PARAMETER: &str = "unknown";

/// Path value that stands for stdout in the CLI's output flags.
pub const STDOUT_PATH: &str = "-";
