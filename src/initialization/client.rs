//! HTTP client initialization.

use std::sync::Arc;

use reqwest::{Certificate, ClientBuilder};

use crate::config::ClientOptions;
use crate::transport::dns::ObservingResolver;

/// Initializes the HTTP client used for every hop.
///
/// Creates a `reqwest::Client` configured with:
/// - Redirect following disabled (the chase engine owns redirect policy)
/// - The observing DNS resolver
/// - TLS info capture, so the leaf certificate of each connection is available
/// - Connect and pool timeouts from `options`
/// - The webpki roots plus `options.extra_root_certificates`
///
/// No cookie store and no overall request timeout are set. Cookies belong to
/// each chase's jar, and the chase deadline covers timing.
///
/// # Errors
///
/// Returns a `reqwest::Error` if an extra root certificate is not valid DER
/// or client creation fails.
pub(crate) fn init_client(
    options: &ClientOptions,
    resolver: ObservingResolver,
) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = ClientBuilder::new();
    for der in &options.extra_root_certificates {
        builder = builder.add_root_certificate(Certificate::from_der(der)?);
    }
    builder
        .redirect(reqwest::redirect::Policy::none())
        .dns_resolver(Arc::new(resolver))
        .tls_info(true)
        .connect_timeout(options.connect_timeout)
        .pool_idle_timeout(options.pool_idle_timeout)
        .pool_max_idle_per_host(options.pool_max_idle_per_host)
        .build()
}
