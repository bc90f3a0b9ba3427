//! Error handling.
//!
//! This module provides:
//! - Error type definitions for initialization, transport, chase and export failures
//! - Categorization of `reqwest::Error` into transport error kinds
//!
//! Only `ChaseError` ever reaches the caller of a chase as a top-level failure.
//! Transport failures are recorded on the page they happened on.

mod categorization;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, error_chain};
pub use types::{
    ChaseError, ExportError, InitializationError, TargetError, TransportError,
    TransportErrorKind,
};
