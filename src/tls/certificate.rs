//! Human-readable certificate text.
//!
//! Peer certificates are stored on each page as diagnostic text rather than
//! DER. The default formatter renders an openssl-like summary with x509-parser.

use std::fmt::Write;

use anyhow::Result;
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::{GeneralName, ParsedExtension};

/// Converts a DER-encoded certificate into diagnostic text.
pub trait CertificateFormatter: Send + Sync {
    /// Renders `der` as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the certificate cannot be parsed or rendered.
    fn certificate_text(&self, der: &[u8]) -> Result<String>;
}

/// Default formatter backed by x509-parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct X509TextFormatter;

impl CertificateFormatter for X509TextFormatter {
    fn certificate_text(&self, der: &[u8]) -> Result<String> {
        let (_, cert) = x509_parser::parse_x509_certificate(der)
            .map_err(|e| anyhow::anyhow!("failed to parse certificate: {e}"))?;
        let tbs = &cert.tbs_certificate;

        let mut text = String::new();
        writeln!(text, "Certificate:")?;
        writeln!(text, "    Data:")?;
        writeln!(
            text,
            "        Version: {} (0x{:x})",
            tbs.version.0 + 1,
            tbs.version.0
        )?;
        writeln!(text, "        Serial Number:")?;
        writeln!(text, "            {}", tbs.raw_serial_as_string())?;
        writeln!(
            text,
            "    Signature Algorithm: {}",
            signature_algorithm_name(&cert.signature_algorithm.algorithm.to_id_string())
        )?;
        writeln!(text, "        Issuer: {}", tbs.issuer)?;
        writeln!(text, "        Validity")?;
        writeln!(text, "            Not Before: {}", tbs.validity.not_before)?;
        writeln!(text, "            Not After : {}", tbs.validity.not_after)?;
        writeln!(text, "        Subject: {}", tbs.subject)?;
        writeln!(text, "        Subject Public Key Info:")?;
        writeln!(
            text,
            "            Public Key Algorithm: {}",
            key_algorithm_name(&tbs.subject_pki.algorithm.algorithm.to_id_string())
        )?;

        let sans = extract_certificate_sans(&cert);
        let oids = extract_certificate_oids(&cert);
        if !sans.is_empty() || !oids.is_empty() {
            writeln!(text, "        X509v3 extensions:")?;
        }
        if let Ok(Some(constraints)) = cert.basic_constraints() {
            writeln!(
                text,
                "            X509v3 Basic Constraints:{}",
                if constraints.critical { " critical" } else { "" }
            )?;
            writeln!(
                text,
                "                CA:{}",
                if constraints.value.ca { "TRUE" } else { "FALSE" }
            )?;
        }
        if !sans.is_empty() {
            writeln!(text, "            X509v3 Subject Alternative Name:")?;
            writeln!(text, "                {}", sans.join(", "))?;
        }
        if !oids.is_empty() {
            writeln!(text, "            Extension OIDs:")?;
            writeln!(text, "                {}", oids.join(", "))?;
        }
        Ok(text)
    }
}

fn signature_algorithm_name(oid: &str) -> String {
    match oid {
        "1.2.840.113549.1.1.5" => "sha1WithRSAEncryption".to_string(),
        "1.2.840.113549.1.1.11" => "sha256WithRSAEncryption".to_string(),
        "1.2.840.113549.1.1.12" => "sha384WithRSAEncryption".to_string(),
        "1.2.840.113549.1.1.13" => "sha512WithRSAEncryption".to_string(),
        "1.2.840.113549.1.1.10" => "rsassaPss".to_string(),
        "1.2.840.10045.4.3.2" => "ecdsa-with-SHA256".to_string(),
        "1.2.840.10045.4.3.3" => "ecdsa-with-SHA384".to_string(),
        "1.2.840.10045.4.3.4" => "ecdsa-with-SHA512".to_string(),
        "1.3.101.112" => "ED25519".to_string(),
        "1.3.101.113" => "ED448".to_string(),
        other => other.to_string(),
    }
}

fn key_algorithm_name(oid: &str) -> String {
    match oid {
        "1.2.840.113549.1.1.1" => "RSA".to_string(),
        "1.2.840.10045.2.1" => "ECDSA".to_string(),
        "1.3.101.112" => "Ed25519".to_string(),
        "1.3.101.113" => "Ed448".to_string(),
        // Unknown algorithms are reported by OID
        other => other.to_string(),
    }
}

/// Collects extension OIDs plus the policy and extended key usage OIDs they carry.
pub(crate) fn extract_certificate_oids(cert: &X509Certificate<'_>) -> Vec<String> {
    let mut oids: Vec<String> = Vec::new();

    for ext in cert.extensions() {
        oids.push(ext.oid.to_id_string());

        match ext.parsed_extension() {
            ParsedExtension::CertificatePolicies(ref policies) => {
                oids.extend(policies.iter().map(|policy| policy.policy_id.to_id_string()));
            }
            ParsedExtension::ExtendedKeyUsage(ref eku) => {
                if eku.server_auth {
                    oids.push("1.3.6.1.5.5.7.3.1".to_string());
                }
                if eku.client_auth {
                    oids.push("1.3.6.1.5.5.7.3.2".to_string());
                }
                if eku.code_signing {
                    oids.push("1.3.6.1.5.5.7.3.3".to_string());
                }
                if eku.email_protection {
                    oids.push("1.3.6.1.5.5.7.3.4".to_string());
                }
                if eku.time_stamping {
                    oids.push("1.3.6.1.5.5.7.3.8".to_string());
                }
                if eku.ocsp_signing {
                    oids.push("1.3.6.1.5.5.7.3.9".to_string());
                }
                oids.extend(eku.other.iter().map(|oid| oid.to_id_string()));
            }
            _ => {}
        }
    }

    oids
}

/// Collects DNS and IP Subject Alternative Names in "DNS:x" / "IP:y" form.
pub(crate) fn extract_certificate_sans(cert: &X509Certificate<'_>) -> Vec<String> {
    let mut sans = Vec::new();

    for ext in cert.extensions() {
        if let ParsedExtension::SubjectAlternativeName(ref san) = ext.parsed_extension() {
            for general_name in &san.general_names {
                match general_name {
                    GeneralName::DNSName(dns_name) => sans.push(format!("DNS:{dns_name}")),
                    GeneralName::IPAddress(bytes) => {
                        if let Some(ip) = ip_from_bytes(bytes) {
                            sans.push(format!("IP:{ip}"));
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    sans
}

fn ip_from_bytes(bytes: &[u8]) -> Option<std::net::IpAddr> {
    match bytes.len() {
        4 => <[u8; 4]>::try_from(bytes).ok().map(std::net::IpAddr::from),
        16 => <[u8; 16]>::try_from(bytes).ok().map(std::net::IpAddr::from),
        _ => None,
    }
}
