//! reqwest-backed transport.

use async_trait::async_trait;
use futures::TryStreamExt;
use log::{debug, warn};
use reqwest::cookie::Jar;
use reqwest::header::COOKIE;
use reqwest::tls::TlsInfo;
use reqwest::Url;

use crate::config::{ClientOptions, UNKNOWN_TLS_PARAMETER};
use crate::error_handling::{InitializationError, TransportError};
use crate::initialization::{init_client, init_resolver};
use crate::tls::TlsProbe;

use super::dns::{ObservingResolver, HOP_DNS};
use super::{
    jar_cookie_header, store_response_cookies, DnsObserver, HopRequest, HopResponse,
    TlsHandshake, Transport,
};

/// Sends hops with a shared reqwest client.
///
/// - Redirects are disabled so every 3xx comes back as a response.
/// - Cookies come from the chase's jar; the client itself keeps none.
/// - Name resolution goes through an observing hickory resolver.
/// - TLS hops are followed by a session probe against the same remote address.
///
/// The client pools connections, so a transport may be shared by concurrent
/// chases. Each chase brings its own jar, so they share no cookies.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    probe: TlsProbe,
}

impl HttpTransport {
    /// Builds the transport.
    ///
    /// # Errors
    ///
    /// Returns an `InitializationError` if the reqwest client or the TLS
    /// probe configuration cannot be built.
    pub fn new(options: &ClientOptions) -> Result<Self, InitializationError> {
        let resolver = ObservingResolver::new(init_resolver(options));
        let client = init_client(options, resolver)?;
        let probe = TlsProbe::new(options)?;
        Ok(Self { client, probe })
    }

    /// TLS facts for a hop served from `response`.
    ///
    /// Prefers a fresh probe of the same remote address; falls back to the
    /// leaf certificate reqwest captured on the real connection.
    async fn tls_session(
        &self,
        url: &Url,
        response: &reqwest::Response,
    ) -> TlsHandshake {
        let leaf = response
            .extensions()
            .get::<TlsInfo>()
            .and_then(TlsInfo::peer_certificate)
            .map(<[u8]>::to_vec);

        if let (Some(host), Some(addr)) = (url.host(), response.remote_addr()) {
            match self.probe.probe(&host, addr).await {
                Ok(handshake) => return handshake,
                Err(e) => warn!("TLS session probe for {url} failed: {e:#}"),
            }
        }

        let server_name = match url.host() {
            Some(url::Host::Domain(domain)) => domain.to_string(),
            _ => String::new(),
        };
        TlsHandshake {
            protocol_version: UNKNOWN_TLS_PARAMETER.to_string(),
            cipher_suite: UNKNOWN_TLS_PARAMETER.to_string(),
            server_name,
            peer_certificates: leaf.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: HopRequest,
        dns: DnsObserver,
        jar: &Jar,
    ) -> Result<HopResponse, TransportError> {
        let url = request.url.clone();
        debug!("Sending {} {}", request.method, url);

        let jar_cookies = jar_cookie_header(jar, &request);
        let mut headers = request.headers;
        if let Some(cookies) = jar_cookies {
            headers.insert(COOKIE, cookies);
        }
        let builder = self
            .client
            .request(request.method, url.clone())
            .headers(headers);
        let response = HOP_DNS.scope(dns, builder.send()).await?;
        store_response_cookies(jar, &url, response.headers());

        let tls = if url.scheme() == "https" {
            Some(self.tls_session(&url, &response).await)
        } else {
            None
        };

        let mut hop = HopResponse::new(response.status());
        hop.version = response.version();
        hop.headers = response.headers().clone();
        hop.tls = tls;
        // reqwest does not expose the local end of its connections.
        hop.remote_addr = response.remote_addr();
        hop.body = Box::pin(response.bytes_stream().map_err(TransportError::from));
        Ok(hop)
    }
}
