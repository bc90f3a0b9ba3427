//! DNS resolution for the HTTP transport.
//!
//! reqwest resolves hostnames through a client-wide resolver, so there is no
//! per-request hook. `ObservingResolver` wraps the hickory resolver and reports
//! every completed lookup to the `DnsObserver` of the hop currently being
//! sent, which `HttpTransport` installs as a task-local for the duration of
//! the send.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use hickory_resolver::TokioAsyncResolver;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};

use super::DnsObserver;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

tokio::task_local! {
    pub(crate) static HOP_DNS: DnsObserver;
}

/// reqwest resolver that reports lookups to the current hop's observer.
#[derive(Clone)]
pub(crate) struct ObservingResolver {
    resolver: Arc<TokioAsyncResolver>,
}

impl ObservingResolver {
    pub(crate) fn new(resolver: Arc<TokioAsyncResolver>) -> Self {
        Self { resolver }
    }
}

impl Resolve for ObservingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = Arc::clone(&self.resolver);
        Box::pin(async move {
            let host = name.as_str().to_string();
            let lookup = resolver.lookup_ip(host.as_str()).await?;
            let addresses: Vec<IpAddr> = lookup.iter().collect();
            log::debug!("Resolved {host} to {addresses:?}");

            // Outside a hop scope (e.g. a connect finishing in the background)
            // there is nobody to tell.
            let _ = HOP_DNS.try_with(|observer| observer.notify(addresses.iter().copied()));

            // Port 0 is replaced by the connector with the URL's port.
            let addrs: Addrs = Box::new(addresses.into_iter().map(|ip| SocketAddr::new(ip, 0)));
            Ok::<_, BoxError>(addrs)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_task_local_observer_receives_notification() {
        let observer = DnsObserver::new();
        HOP_DNS
            .scope(observer.clone(), async {
                HOP_DNS.with(|o| o.notify(["10.0.0.1".parse::<IpAddr>().unwrap()]));
            })
            .await;
        assert_eq!(observer.addresses(), vec!["10.0.0.1".parse::<IpAddr>().unwrap()]);
    }

    #[test]
    fn test_no_observer_outside_scope() {
        assert!(HOP_DNS.try_with(|_| ()).is_err());
    }
}
