//! Builds a [`Page`] from a hop's request and outcome.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use log::{debug, warn};
use reqwest::header::HeaderValue;
use reqwest::StatusCode;

use crate::error_handling::TransportError;
use crate::tls::{CertificateFormatter, X509TextFormatter};
use crate::transport::{DnsObserver, HopRequest, HopResponse, TlsHandshake};

use super::{
    request_cookies, response_cookies, CookieRecord, Headers, HopError, HopOutcome, Page,
    ResponseFacet, TlsFacet,
};

/// The outgoing request as it looked before it was handed to the transport.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    request: HopRequest,
    method: String,
    url: String,
    protocol: String,
    headers: Headers,
    cookies: Vec<CookieRecord>,
}

impl RequestSnapshot {
    /// Captures `request` plus the `Cookie` header the transport's jar will add.
    pub fn capture(request: &HopRequest, jar_cookies: Option<&HeaderValue>) -> Self {
        Self {
            request: request.clone(),
            method: request.method.to_string(),
            url: request.url.to_string(),
            protocol: request.protocol(),
            headers: Headers::from(&request.headers),
            cookies: request_cookies(&request.headers, jar_cookies),
        }
    }

    /// The captured request.
    pub fn request(&self) -> &HopRequest {
        &self.request
    }
}

/// Turns hop outcomes into pages.
#[derive(Clone)]
pub struct HopRecorder {
    formatter: Arc<dyn CertificateFormatter>,
}

impl Default for HopRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl HopRecorder {
    /// Creates a recorder that renders certificates with [`X509TextFormatter`].
    pub fn new() -> Self {
        Self::with_formatter(Arc::new(X509TextFormatter))
    }

    /// Creates a recorder with a custom certificate formatter.
    pub fn with_formatter(formatter: Arc<dyn CertificateFormatter>) -> Self {
        Self { formatter }
    }

    /// Records one hop.
    ///
    /// On success the body is read to the end. A failure partway through the
    /// body keeps whatever arrived and is only logged; the hop still counts as
    /// a response. `dns` is read last so every notification made while the
    /// body was streaming is included.
    pub async fn record(
        &self,
        snapshot: RequestSnapshot,
        outcome: Result<HopResponse, TransportError>,
        dns: &DnsObserver,
        started_at: DateTime<Utc>,
        start: Instant,
    ) -> Page {
        let RequestSnapshot {
            request,
            method,
            url,
            protocol,
            headers,
            cookies,
        } = snapshot;

        let (outcome, tls, local_addr, remote_addr) = match outcome {
            Ok(response) => {
                let tls = response.tls.as_ref().map(|tls| self.tls_facet(tls));
                let (local_addr, remote_addr) = (response.local_addr, response.remote_addr);
                let facet = read_response(&url, response).await;
                (HopOutcome::Response(facet), tls, local_addr, remote_addr)
            }
            Err(error) => {
                debug!("Recording transport failure for {url}: {error}");
                (HopOutcome::Error(HopError::from(&error)), None, None, None)
            }
        };

        Page {
            request,
            request_method: method,
            request_url: url,
            request_protocol: protocol,
            request_header: headers,
            request_cookies: cookies,
            outcome,
            tls,
            dns_addresses: dns.addresses(),
            local_addr,
            remote_addr,
            started_at,
            elapsed: start.elapsed(),
        }
    }

    fn tls_facet(&self, tls: &TlsHandshake) -> TlsFacet {
        let certificates = tls
            .peer_certificates
            .iter()
            .map(|der| {
                self.formatter
                    .certificate_text(der)
                    .unwrap_or_else(|e| format!("certificate error: {e}"))
            })
            .collect();
        TlsFacet {
            version: tls.protocol_version.clone(),
            cipher_suite: tls.cipher_suite.clone(),
            server_name: tls.server_name.clone(),
            certificates,
        }
    }
}

async fn read_response(url: &str, mut response: HopResponse) -> ResponseFacet {
    let mut body = Vec::new();
    while let Some(chunk) = response.body.next().await {
        match chunk {
            Ok(bytes) => body.extend_from_slice(&bytes),
            Err(e) => {
                warn!("Failed to read body of {url} after {} bytes: {e}", body.len());
                break;
            }
        }
    }

    ResponseFacet {
        status_code: response.status.as_u16(),
        status_message: status_message(response.status),
        proto: format!("{:?}", response.version),
        header: Headers::from(&response.headers),
        trailer: Headers::from(&response.trailers),
        cookies: response_cookies(&response.headers),
        body,
    }
}

/// Status line text in the "301 Moved Permanently" form.
fn status_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_str()),
        None => status.as_str().to_string(),
    }
}
