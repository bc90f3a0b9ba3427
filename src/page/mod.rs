//! Per-hop trace records.
//!
//! A [`Page`] is the immutable record of one hop. It is built once by the
//! [`HopRecorder`] and never changed after the engine appends it.

mod cookies;
mod headers;
mod recorder;

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::error_handling::{TransportError, TransportErrorKind};
use crate::transport::HopRequest;

pub use cookies::{request_cookies, response_cookies, CookieRecord};
pub use headers::Headers;
pub use recorder::{HopRecorder, RequestSnapshot};

/// One hop of a chase.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// The request as it was issued, for diagnostics.
    #[serde(skip)]
    pub request: HopRequest,
    /// Request method
    pub request_method: String,
    /// Request URL
    pub request_url: String,
    /// Request protocol, e.g. "HTTP/1.1"
    pub request_protocol: String,
    /// Request headers as sent by the engine
    pub request_header: Headers,
    /// Cookies sent with the request
    pub request_cookies: Vec<CookieRecord>,
    /// Either the response or the transport failure.
    #[serde(flatten)]
    pub outcome: HopOutcome,
    /// TLS session facts, present only for TLS hops.
    pub tls: Option<TlsFacet>,
    /// Addresses resolved while the hop was in flight.
    pub dns_addresses: Vec<IpAddr>,
    /// Local end of the connection, when known
    pub local_addr: Option<SocketAddr>,
    /// Remote end of the connection, when known
    pub remote_addr: Option<SocketAddr>,
    /// When the hop was issued
    pub started_at: DateTime<Utc>,
    /// Time from issuing the hop to finishing its record
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl Page {
    /// The response facet, if the hop got a response.
    pub fn response(&self) -> Option<&ResponseFacet> {
        match &self.outcome {
            HopOutcome::Response(response) => Some(response),
            HopOutcome::Error(_) => None,
        }
    }

    /// The error facet, if the transport failed.
    pub fn error(&self) -> Option<&HopError> {
        match &self.outcome {
            HopOutcome::Response(_) => None,
            HopOutcome::Error(error) => Some(error),
        }
    }

    /// Response status code, if any.
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|r| r.status_code)
    }

    /// True when the hop was TLS-secured.
    pub fn is_tls(&self) -> bool {
        self.request.is_tls()
    }
}

/// Outcome of a hop. Exactly one of response or error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HopOutcome {
    /// The transport returned a response.
    Response(ResponseFacet),
    /// The transport failed outright.
    Error(HopError),
}

/// Everything recorded about a response.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFacet {
    /// Numeric status code
    pub status_code: u16,
    /// Status line text, e.g. "200 OK"
    pub status_message: String,
    /// Response protocol, e.g. "HTTP/2.0"
    pub proto: String,
    /// Response headers
    pub header: Headers,
    /// Response trailers
    pub trailer: Headers,
    /// Full response body
    #[serde(serialize_with = "serialize_base64")]
    pub body: Vec<u8>,
    /// Cookies set by the response
    pub cookies: Vec<CookieRecord>,
}

/// A transport failure recorded on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HopError {
    /// Failure category
    pub kind: TransportErrorKind,
    /// Failure description including its causes
    pub message: String,
}

impl From<&TransportError> for HopError {
    fn from(error: &TransportError) -> Self {
        Self {
            kind: error.kind(),
            message: error.message().to_string(),
        }
    }
}

impl std::fmt::Display for HopError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Negotiated TLS parameters of a hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsFacet {
    /// Protocol version name, e.g. "TLS 1.3"
    pub version: String,
    /// Cipher suite name
    pub cipher_suite: String,
    /// Server name indication sent
    pub server_name: String,
    /// Peer certificates as text, leaf first
    pub certificates: Vec<String>,
}

fn serialize_base64<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(body))
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;

    fn page(outcome: HopOutcome) -> Page {
        let request = HopRequest::get(Url::parse("https://example.com/").unwrap());
        Page {
            request_method: "GET".to_string(),
            request_url: "https://example.com/".to_string(),
            request_protocol: "HTTP/1.1".to_string(),
            request_header: Headers::default(),
            request_cookies: Vec::new(),
            request,
            outcome,
            tls: None,
            dns_addresses: vec!["93.184.216.34".parse().unwrap()],
            local_addr: None,
            remote_addr: Some("93.184.216.34:443".parse().unwrap()),
            started_at: DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
            elapsed: Duration::from_millis(1500),
        }
    }

    fn response() -> ResponseFacet {
        ResponseFacet {
            status_code: 200,
            status_message: "200 OK".to_string(),
            proto: "HTTP/1.1".to_string(),
            header: Headers::default(),
            trailer: Headers::default(),
            body: b"hi".to_vec(),
            cookies: Vec::new(),
        }
    }

    #[test]
    fn test_accessors_response() {
        let page = page(HopOutcome::Response(response()));
        assert_eq!(page.status_code(), Some(200));
        assert!(page.response().is_some());
        assert!(page.error().is_none());
        assert!(page.is_tls());
    }

    #[test]
    fn test_accessors_error() {
        let error = TransportError::new(TransportErrorKind::Connect, "connection refused");
        let page = page(HopOutcome::Error(HopError::from(&error)));
        assert!(page.response().is_none());
        assert_eq!(page.status_code(), None);
        assert_eq!(page.error().unwrap().to_string(), "connection refused");
    }

    #[test]
    fn test_serialize_response_page() {
        let value = serde_json::to_value(page(HopOutcome::Response(response()))).unwrap();
        assert_eq!(value["request_url"], "https://example.com/");
        assert_eq!(value["response"]["status_message"], "200 OK");
        assert_eq!(value["response"]["body"], "aGk=");
        assert!(value.get("error").is_none());
        assert!(value.get("request").is_none());
        assert_eq!(value["dns_addresses"][0], "93.184.216.34");
        assert_eq!(value["remote_addr"], "93.184.216.34:443");
        assert_eq!(value["elapsed_ms"], 1500);
        assert!(value["tls"].is_null());
    }

    #[test]
    fn test_serialize_error_page() {
        let error = TransportError::new(TransportErrorKind::Timeout, "operation timed out");
        let value = serde_json::to_value(page(HopOutcome::Error(HopError::from(&error)))).unwrap();
        assert_eq!(value["error"]["kind"], "timeout");
        assert_eq!(value["error"]["message"], "operation timed out");
        assert!(value.get("response").is_none());
    }
}
