//! TLS session inspection.
//!
//! This module provides:
//! - `TlsProbe`: a short tokio-rustls handshake against the address a hop was
//!   served from, reporting negotiated protocol version, cipher suite, SNI and
//!   the peer certificate chain
//! - `CertificateFormatter`: conversion of DER certificates into readable text
//!
//! reqwest exposes the leaf certificate of a connection but not the negotiated
//! parameters, so the transport repeats the handshake with the same server name
//! against the same remote address. The probe trusts the same roots and offers
//! the same ALPN protocols as the client, so the server sees an equivalent
//! ClientHello.

mod certificate;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::debug;
use rustls::crypto::ring::default_provider;
use rustls::pki_types::{CertificateDer, ServerName};
use rustls::ProtocolVersion;
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use url::Host;

use crate::config::ClientOptions;
use crate::error_handling::InitializationError;
use crate::transport::TlsHandshake;

pub use certificate::{CertificateFormatter, X509TextFormatter};

/// ALPN protocols reqwest offers with the `http2` feature, in its order.
const CLIENT_ALPN_PROTOCOLS: [&[u8]; 2] = [b"h2", b"http/1.1"];

/// Performs TLS handshakes to read back negotiated session parameters.
#[derive(Clone)]
pub struct TlsProbe {
    connector: TlsConnector,
    connect_timeout: Duration,
    handshake_timeout: Duration,
}

impl TlsProbe {
    /// Creates a probe that trusts the webpki root set plus
    /// `options.extra_root_certificates`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::TlsConfigError` if an extra root is not
    /// a usable certificate or rustls rejects the protocol version selection.
    pub fn new(options: &ClientOptions) -> Result<Self, InitializationError> {
        let config = probe_config(options)?;
        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            connect_timeout: options.connect_timeout,
            handshake_timeout: options.tls_handshake_timeout,
        })
    }

    /// Handshakes with `addr`, presenting `host` as the server name.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not a valid server name, or if the TCP
    /// connect or the TLS handshake fails or times out.
    pub async fn probe(&self, host: &Host<&str>, addr: SocketAddr) -> Result<TlsHandshake> {
        let (server_name, sni) = server_name_for(host)?;
        debug!("Probing TLS session of {addr} with server name {server_name:?}");

        let sock = match tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr)).await
        {
            Ok(Ok(sock)) => sock,
            Ok(Err(e)) => return Err(anyhow::anyhow!("Failed to connect to {addr}: {e}")),
            Err(_) => {
                return Err(anyhow::anyhow!(
                    "TCP connection timeout for {addr} ({:?})",
                    self.connect_timeout
                ))
            }
        };

        let tls_stream = match tokio::time::timeout(
            self.handshake_timeout,
            self.connector.connect(server_name, sock),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(anyhow::anyhow!("TLS handshake with {addr} failed: {e}")),
            Err(_) => {
                return Err(anyhow::anyhow!(
                    "TLS handshake timeout for {addr} ({:?})",
                    self.handshake_timeout
                ))
            }
        };

        let (_, connection) = tls_stream.get_ref();
        let protocol_version = connection
            .protocol_version()
            .map(protocol_version_name)
            .unwrap_or_else(|| crate::config::UNKNOWN_TLS_PARAMETER.to_string());
        let cipher_suite = connection
            .negotiated_cipher_suite()
            .map(|cs| format!("{:?}", cs.suite()))
            .unwrap_or_else(|| crate::config::UNKNOWN_TLS_PARAMETER.to_string());
        let peer_certificates = connection
            .peer_certificates()
            .map(|certs| certs.iter().map(|cert| cert.as_ref().to_vec()).collect())
            .unwrap_or_default();

        Ok(TlsHandshake {
            protocol_version,
            cipher_suite,
            server_name: sni,
            peer_certificates,
        })
    }
}

fn probe_config(options: &ClientOptions) -> Result<ClientConfig, InitializationError> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    for der in &options.extra_root_certificates {
        root_store.add(CertificateDer::from(der.clone()))?;
    }

    let mut config = ClientConfig::builder_with_provider(Arc::new(default_provider()))
        .with_safe_default_protocol_versions()?
        .with_root_certificates(root_store)
        .with_no_client_auth();
    config.alpn_protocols = CLIENT_ALPN_PROTOCOLS.iter().map(|p| p.to_vec()).collect();
    Ok(config)
}

/// Server name to present for `host`, plus the SNI value actually sent.
///
/// IP literals are verified against the certificate but carry no SNI.
fn server_name_for(host: &Host<&str>) -> Result<(ServerName<'static>, String)> {
    match host {
        Host::Domain(domain) => {
            let name = ServerName::try_from(domain.to_string())
                .map_err(|e| anyhow::anyhow!("Invalid domain name {domain}: {e}"))?;
            Ok((name, domain.to_string()))
        }
        Host::Ipv4(ip) => Ok((ServerName::from(IpAddr::V4(*ip)), String::new())),
        Host::Ipv6(ip) => Ok((ServerName::from(IpAddr::V6(*ip)), String::new())),
    }
}

/// Maps a rustls protocol version to the "TLS 1.x" naming.
pub fn protocol_version_name(version: ProtocolVersion) -> String {
    match version {
        ProtocolVersion::TLSv1_0 => "TLS 1.0".to_string(),
        ProtocolVersion::TLSv1_1 => "TLS 1.1".to_string(),
        ProtocolVersion::TLSv1_2 => "TLS 1.2".to_string(),
        ProtocolVersion::TLSv1_3 => "TLS 1.3".to_string(),
        other => format!("{other:?}"),
    }
}
