//! Next-hop resolution.
//!
//! Given a recorded page, decide whether the chase continues and where to:
//! - 301, 302, 307 and 308 with a `Location` header are followed
//! - 200 `text/html` responses are scanned for a meta refresh
//! - everything else ends the chase
//!
//! Problems with the redirect target itself (unparseable URL, unsupported
//! scheme, unparseable `Content-Type`) end the chase cleanly rather than
//! failing it.

mod media_type;
mod refresh;

use log::debug;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;
use url::Url;

use crate::page::Page;
use crate::transport::HopRequest;

pub use media_type::{parse_media_type, MediaTypeError};
pub use refresh::MetaRefreshScanner;

/// How the next hop was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectVia {
    /// A 3xx `Location` header
    Location,
    /// A meta refresh in a 200 HTML body
    MetaRefresh,
}

/// Why a page does not lead anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalReason {
    /// The hop failed in transport.
    TransportFailure,
    /// The status is not one that redirects.
    NotRedirect(u16),
    /// A redirect status without a usable `Location`.
    MissingLocation,
    /// The redirect target could not be turned into a request.
    MalformedTarget {
        /// The target as found on the page
        target: String,
        /// What was wrong with it
        reason: String,
    },
    /// The 200 response's `Content-Type` could not be parsed.
    ContentTypeUnparseable(String),
    /// The 200 response is not HTML.
    NotHtml(String),
    /// The HTML has no usable meta refresh.
    NoRefresh,
}

impl std::fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TransportFailure => f.write_str("transport failure"),
            Self::NotRedirect(status) => write!(f, "status {status} does not redirect"),
            Self::MissingLocation => f.write_str("redirect without Location"),
            Self::MalformedTarget { target, reason } => {
                write!(f, "malformed redirect target {target:?}: {reason}")
            }
            Self::ContentTypeUnparseable(reason) => {
                write!(f, "unparseable Content-Type: {reason}")
            }
            Self::NotHtml(media_type) => write!(f, "media type {media_type} is not HTML"),
            Self::NoRefresh => f.write_str("no meta refresh"),
        }
    }
}

/// The resolver's decision for one page.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Continue with `request`.
    Follow {
        /// The next hop
        request: HopRequest,
        /// Where the target came from
        via: RedirectVia,
    },
    /// The chase ends here.
    Terminal(TerminalReason),
}

/// Decides the next hop of a chase from the last recorded page.
#[derive(Debug, Default, Clone, Copy)]
pub struct RedirectResolver;

impl RedirectResolver {
    /// Resolves the next hop, with the reason when there is none.
    pub fn resolve(page: &Page) -> Resolution {
        let Some(response) = page.response() else {
            return Resolution::Terminal(TerminalReason::TransportFailure);
        };

        match StatusCode::from_u16(response.status_code) {
            Ok(
                StatusCode::MOVED_PERMANENTLY
                | StatusCode::FOUND
                | StatusCode::TEMPORARY_REDIRECT
                | StatusCode::PERMANENT_REDIRECT,
            ) => match response.header.get(LOCATION.as_str()) {
                Some(location) if !location.is_empty() => {
                    follow(&page.request.url, location, RedirectVia::Location)
                }
                _ => Resolution::Terminal(TerminalReason::MissingLocation),
            },
            Ok(StatusCode::OK) => {
                let content_type = response.header.get(CONTENT_TYPE.as_str()).unwrap_or("");
                let media_type = match parse_media_type(content_type) {
                    Ok(media_type) => media_type,
                    Err(e) => {
                        return Resolution::Terminal(TerminalReason::ContentTypeUnparseable(
                            e.to_string(),
                        ))
                    }
                };
                if media_type != "text/html" {
                    return Resolution::Terminal(TerminalReason::NotHtml(media_type));
                }
                match MetaRefreshScanner::scan(&response.body) {
                    Some(target) => follow(&page.request.url, &target, RedirectVia::MetaRefresh),
                    None => Resolution::Terminal(TerminalReason::NoRefresh),
                }
            }
            _ => Resolution::Terminal(TerminalReason::NotRedirect(response.status_code)),
        }
    }

    /// The next request, if the chase continues.
    pub fn next(page: &Page) -> Option<HopRequest> {
        match Self::resolve(page) {
            Resolution::Follow { request, .. } => Some(request),
            Resolution::Terminal(reason) => {
                debug!("{} is terminal: {reason}", page.request_url);
                None
            }
        }
    }
}

/// Builds a GET for `target`, resolved against the URL of the hop it came from.
fn follow(base: &Url, target: &str, via: RedirectVia) -> Resolution {
    let malformed = |reason: String| {
        Resolution::Terminal(TerminalReason::MalformedTarget {
            target: target.to_string(),
            reason,
        })
    };
    let url = match base.join(target) {
        Ok(url) => url,
        Err(e) => return malformed(e.to_string()),
    };
    match HopRequest::checked_get(url) {
        Ok(request) => {
            debug!("Following {via:?} to {}", request.url);
            Resolution::Follow { request, via }
        }
        Err(e) => malformed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{HopRecorder, RequestSnapshot};
    use crate::error_handling::{TransportError, TransportErrorKind};
    use crate::transport::{DnsObserver, HopResponse};
    use chrono::Utc;
    use reqwest::header::{HeaderValue, USER_AGENT};
    use reqwest::Method;
    use std::time::Instant;

    async fn page_for(url: &str, outcome: Result<HopResponse, TransportError>) -> Page {
        let request = HopRequest::parse_get(url)
            .unwrap()
            .with_header(USER_AGENT, HeaderValue::from_static("custom"));
        HopRecorder::new()
            .record(
                RequestSnapshot::capture(&request, None),
                outcome,
                &DnsObserver::new(),
                Utc::now(),
                Instant::now(),
            )
            .await
    }

    fn redirect(status: StatusCode, location: &'static str) -> HopResponse {
        HopResponse::new(status).with_header(LOCATION, HeaderValue::from_static(location))
    }

    fn html(content_type: &'static str, body: &'static str) -> HopResponse {
        HopResponse::new(StatusCode::OK)
            .with_header(CONTENT_TYPE, HeaderValue::from_static(content_type))
            .with_body(body)
    }

    #[tokio::test]
    async fn test_relative_location_is_resolved() {
        let page = page_for(
            "https://example.com/a/b",
            Ok(redirect(StatusCode::MOVED_PERMANENTLY, "/relative")),
        )
        .await;
        let request = RedirectResolver::next(&page).unwrap();
        assert_eq!(request.url.as_str(), "https://example.com/relative");
        assert_eq!(request.method, Method::GET);
        // The next hop starts from a clean request.
        assert!(request.headers.is_empty());
    }

    #[tokio::test]
    async fn test_all_redirect_statuses_follow() {
        for status in [
            StatusCode::MOVED_PERMANENTLY,
            StatusCode::FOUND,
            StatusCode::TEMPORARY_REDIRECT,
            StatusCode::PERMANENT_REDIRECT,
        ] {
            let page = page_for(
                "http://example.com/",
                Ok(redirect(status, "https://other.example/x")),
            )
            .await;
            match RedirectResolver::resolve(&page) {
                Resolution::Follow { request, via } => {
                    assert_eq!(request.url.as_str(), "https://other.example/x");
                    assert_eq!(via, RedirectVia::Location);
                }
                other => panic!("{status} should redirect, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_missing_or_empty_location_is_terminal() {
        let page = page_for(
            "http://example.com/",
            Ok(HopResponse::new(StatusCode::FOUND)),
        )
        .await;
        assert!(matches!(
            RedirectResolver::resolve(&page),
            Resolution::Terminal(TerminalReason::MissingLocation)
        ));

        let page = page_for("http://example.com/", Ok(redirect(StatusCode::FOUND, ""))).await;
        assert!(RedirectResolver::next(&page).is_none());
    }

    #[tokio::test]
    async fn test_other_statuses_are_terminal() {
        for status in [
            StatusCode::SEE_OTHER,
            StatusCode::NOT_MODIFIED,
            StatusCode::NOT_FOUND,
            StatusCode::CREATED,
        ] {
            let page = page_for("http://example.com/", Ok(redirect(status, "/elsewhere"))).await;
            assert!(matches!(
                RedirectResolver::resolve(&page),
                Resolution::Terminal(TerminalReason::NotRedirect(code)) if code == status.as_u16()
            ));
        }
    }

    #[tokio::test]
    async fn test_malformed_targets_are_terminal() {
        let page = page_for(
            "http://example.com/",
            Ok(redirect(StatusCode::FOUND, "http://[::1")),
        )
        .await;
        assert!(matches!(
            RedirectResolver::resolve(&page),
            Resolution::Terminal(TerminalReason::MalformedTarget { .. })
        ));

        let page = page_for(
            "http://example.com/",
            Ok(redirect(StatusCode::FOUND, "mailto:someone@example.com")),
        )
        .await;
        match RedirectResolver::resolve(&page) {
            Resolution::Terminal(TerminalReason::MalformedTarget { target, reason }) => {
                assert_eq!(target, "mailto:someone@example.com");
                assert!(reason.contains("mailto"));
            }
            other => panic!("expected malformed target, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_meta_refresh_is_followed() {
        let page = page_for(
            "http://example.com/",
            Ok(html(
                "text/html; charset=utf-8",
                r#"<meta http-equiv="refresh" content="0; http://example.com/next">"#,
            )),
        )
        .await;
        match RedirectResolver::resolve(&page) {
            Resolution::Follow { request, via } => {
                assert_eq!(request.url.as_str(), "http://example.com/next");
                assert_eq!(request.method, Method::GET);
                assert_eq!(via, RedirectVia::MetaRefresh);
            }
            other => panic!("expected refresh, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_html_without_refresh_is_terminal() {
        let page = page_for(
            "http://example.com/",
            Ok(html("text/html", "<html><body>done</body></html>")),
        )
        .await;
        assert!(matches!(
            RedirectResolver::resolve(&page),
            Resolution::Terminal(TerminalReason::NoRefresh)
        ));
    }

    #[tokio::test]
    async fn test_non_html_is_not_scanned() {
        let body = r#"<meta http-equiv="refresh" content="0; /next">"#;
        let page = page_for("http://example.com/", Ok(html("text/plain", body))).await;
        assert!(matches!(
            RedirectResolver::resolve(&page),
            Resolution::Terminal(TerminalReason::NotHtml(ref media)) if media == "text/plain"
        ));

        let page = page_for("http://example.com/", Ok(html("text/html;;", body))).await;
        assert!(matches!(
            RedirectResolver::resolve(&page),
            Resolution::Terminal(TerminalReason::ContentTypeUnparseable(_))
        ));

        let page = page_for(
            "http://example.com/",
            Ok(HopResponse::new(StatusCode::OK).with_body(body)),
        )
        .await;
        assert!(matches!(
            RedirectResolver::resolve(&page),
            Resolution::Terminal(TerminalReason::ContentTypeUnparseable(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_terminal() {
        let error = TransportError::new(TransportErrorKind::Connect, "refused");
        let page = page_for("http://example.com/", Err(error)).await;
        assert!(matches!(
            RedirectResolver::resolve(&page),
            Resolution::Terminal(TerminalReason::TransportFailure)
        ));
    }
}
