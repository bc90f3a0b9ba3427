//! DNS resolver initialization.

use std::sync::Arc;

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use hickory_resolver::TokioAsyncResolver;

use crate::config::ClientOptions;

/// Initializes the DNS resolver used for hop hostnames.
///
/// Uses the system resolver configuration (so `/etc/hosts` and local
/// nameservers apply, as they would for any other HTTP client) and falls back
/// to the hickory defaults when it cannot be read. Timeouts come from
/// `options` to avoid hanging on unresponsive DNS servers.
pub fn init_resolver(options: &ClientOptions) -> Arc<TokioAsyncResolver> {
    let (config, mut opts) = match read_system_conf() {
        Ok(system) => system,
        Err(e) => {
            log::warn!("Failed to read system DNS configuration, using defaults: {e}");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };
    opts.timeout = options.dns_timeout;
    opts.attempts = 2;

    Arc::new(TokioAsyncResolver::tokio(config, opts))
}
