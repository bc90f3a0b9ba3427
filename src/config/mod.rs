//! Chase configuration and constants.
//!
//! This module provides:
//! - Configuration constants (hop limit, network timeouts, pool sizes)
//! - Library configuration types (`ChaseConfig`, `ClientOptions`)
//! - CLI option types and parsing

mod cli;
mod constants;
mod types;

// Re-export public API
pub use cli::Cli;
pub use constants::*;
pub use types::{ChaseConfig, ClientOptions, LogFormat, LogLevel};
