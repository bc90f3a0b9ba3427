//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - HTTP client (redirects disabled, cookie jar, observing resolver)
//! - DNS resolver
//! - Logger
//! - TLS crypto provider

mod client;
mod logger;
mod resolver;

use rustls::crypto::{ring::default_provider, CryptoProvider};

// Re-export public API
pub(crate) use client::init_client;
pub use logger::init_logger_with;
pub use resolver::init_resolver;

/// Initializes the crypto provider for TLS operations.
///
/// Configures the global crypto provider for `rustls`. The transport builds
/// its own provider-bound configs, so this only matters for code that calls
/// `ClientConfig::builder()` directly.
pub fn init_crypto_provider() {
    // Err means a provider is already installed
    let _ = CryptoProvider::install_default(default_provider());
}
