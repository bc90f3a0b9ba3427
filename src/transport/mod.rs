//! Transport collaborator.
//!
//! The chase engine never talks to the network itself. It hands each hop's
//! request to a [`Transport`] and gets back either a [`HopResponse`] or a
//! [`TransportError`]. This module defines that boundary:
//! - `HopRequest` / `HopResponse`: the values crossing it
//! - `DnsObserver`: the out-of-band channel for resolved addresses
//! - the session cookie jar helpers every transport applies per hop
//! - `HttpTransport`: the reqwest-backed implementation used by the CLI

pub(crate) mod dns;
mod http;

use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, SET_COOKIE};
use reqwest::{Method, StatusCode, Url, Version};

use crate::error_handling::{TargetError, TransportError};

pub use http::HttpTransport;

/// Response body as it arrives from the transport.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// A fully-formed request for one hop.
#[derive(Debug, Clone)]
pub struct HopRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute target URL
    pub url: Url,
    /// Protocol version the request is written for
    pub version: Version,
    /// Request headers (session cookies are added by the transport)
    pub headers: HeaderMap,
}

impl HopRequest {
    /// Builds a body-less GET for `url`.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
        }
    }

    /// Parses `url` and builds a GET for it.
    ///
    /// # Errors
    ///
    /// Returns `TargetError` if the URL does not parse or is not http/https.
    pub fn parse_get(url: &str) -> Result<Self, TargetError> {
        let url = Url::parse(url)?;
        Self::checked_get(url)
    }

    /// Builds a GET for an already-parsed URL, rejecting non-HTTP schemes.
    pub(crate) fn checked_get(url: Url) -> Result<Self, TargetError> {
        match url.scheme() {
            "http" | "https" => Ok(Self::get(url)),
            other => Err(TargetError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Adds or replaces a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Protocol string in the "HTTP/1.1" form.
    pub fn protocol(&self) -> String {
        format!("{:?}", self.version)
    }

    /// True when the hop is TLS-secured.
    pub fn is_tls(&self) -> bool {
        self.url.scheme() == "https"
    }
}

/// Negotiated TLS session parameters of a hop, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsHandshake {
    /// Protocol version name, e.g. "TLS 1.3"
    pub protocol_version: String,
    /// Cipher suite name, e.g. "TLS13_AES_128_GCM_SHA256"
    pub cipher_suite: String,
    /// Server name indication sent by the client (empty for IP literals)
    pub server_name: String,
    /// DER-encoded peer certificates, leaf first
    pub peer_certificates: Vec<Vec<u8>>,
}

/// What came back for one hop.
pub struct HopResponse {
    /// Response protocol version
    pub version: Version,
    /// Status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response trailers
    pub trailers: HeaderMap,
    /// Body, not yet read
    pub body: BodyStream,
    /// TLS session facts, present only for TLS hops
    pub tls: Option<TlsHandshake>,
    /// Local socket address of the connection, when known
    pub local_addr: Option<SocketAddr>,
    /// Remote socket address of the connection, when known
    pub remote_addr: Option<SocketAddr>,
}

impl HopResponse {
    /// Creates an HTTP/1.1 response with the given status and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: Version::HTTP_11,
            status,
            headers: HeaderMap::new(),
            trailers: HeaderMap::new(),
            body: Box::pin(futures::stream::empty()),
            tls: None,
            local_addr: None,
            remote_addr: None,
        }
    }

    /// Appends a header value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replaces the body with a single in-memory chunk.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        let chunk: Result<Bytes, TransportError> = Ok(body.into());
        self.body = Box::pin(futures::stream::once(async move { chunk }));
        self
    }

    /// Attaches TLS session facts.
    pub fn with_tls(mut self, tls: TlsHandshake) -> Self {
        self.tls = Some(tls);
        self
    }
}

impl std::fmt::Debug for HopResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HopResponse")
            .field("version", &self.version)
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("trailers", &self.trailers)
            .field("tls", &self.tls)
            .field("local_addr", &self.local_addr)
            .field("remote_addr", &self.remote_addr)
            .finish_non_exhaustive()
    }
}

/// Receives resolved addresses for one hop while the request is in flight.
///
/// The engine creates a fresh observer per hop and hands a clone to the
/// transport. Whatever has been reported by the time the hop's outcome is
/// recorded ends up on the page.
#[derive(Debug, Clone, Default)]
pub struct DnsObserver {
    addresses: Arc<Mutex<Vec<IpAddr>>>,
}

impl DnsObserver {
    /// Creates an observer with nothing recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the addresses of a completed lookup.
    pub fn notify(&self, addresses: impl IntoIterator<Item = IpAddr>) {
        let mut guard = self
            .addresses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.extend(addresses);
    }

    /// Everything recorded so far, in notification order.
    pub fn addresses(&self) -> Vec<IpAddr> {
        self.addresses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// The `Cookie` header `jar` contributes to `request`.
///
/// Cookies already set on the request win; the jar only fills in a request
/// that carries none.
pub fn jar_cookie_header(jar: &Jar, request: &HopRequest) -> Option<HeaderValue> {
    if request.headers.contains_key(COOKIE) {
        None
    } else {
        jar.cookies(&request.url)
    }
}

/// Stores every `Set-Cookie` in `headers` as if served from `url`.
pub fn store_response_cookies(jar: &Jar, url: &Url, headers: &HeaderMap) {
    let mut set_cookies = headers.get_all(SET_COOKIE).iter();
    jar.set_cookies(&mut set_cookies, url);
}

/// Sends one hop's request.
///
/// Implementations must not follow redirects themselves. Cookies live in the
/// `jar` the engine passes with every hop, which belongs to a single chase:
/// apply it with [`jar_cookie_header`] and feed responses back through
/// [`store_response_cookies`]. A transport holds no cookie state of its own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the response with its body still unread.
    ///
    /// `dns` should be notified with the addresses of any name resolution
    /// performed for this request.
    async fn send(
        &self,
        request: HopRequest,
        dns: DnsObserver,
        jar: &Jar,
    ) -> Result<HopResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(
        &self,
        request: HopRequest,
        dns: DnsObserver,
        jar: &Jar,
    ) -> Result<HopResponse, TransportError> {
        (**self).send(request, dns, jar).await
    }
}
