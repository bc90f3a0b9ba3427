//! Command-line application helpers.
//!
//! This module provides the start URL normalization and the colored progress
//! printer used by the `chaselink` binary.

pub mod progress;
pub mod url;

// Re-export public API
pub use progress::ProgressPrinter;
pub use url::parse_start_url;
