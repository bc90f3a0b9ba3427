//! Cookie records for requests and responses.

use cookie::Cookie;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use serde::Serialize;

/// One cookie as seen on the wire.
///
/// Request cookies only carry a name and value; the attributes are filled in
/// for cookies set by a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CookieRecord {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain attribute
    pub domain: Option<String>,
    /// Path attribute
    pub path: Option<String>,
    /// Expires attribute, normalised to a timestamp string
    pub expires: Option<String>,
    /// Max-Age attribute in seconds
    pub max_age: Option<i64>,
    /// Secure flag
    pub secure: bool,
    /// HttpOnly flag
    pub http_only: bool,
    /// SameSite attribute
    pub same_site: Option<String>,
}

impl From<&Cookie<'_>> for CookieRecord {
    fn from(cookie: &Cookie<'_>) -> Self {
        Self {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            domain: cookie.domain().map(str::to_string),
            path: cookie.path().map(str::to_string),
            expires: cookie.expires_datetime().map(|dt| dt.to_string()),
            max_age: cookie.max_age().map(|age| age.whole_seconds()),
            secure: cookie.secure().unwrap_or(false),
            http_only: cookie.http_only().unwrap_or(false),
            same_site: cookie.same_site().map(|s| s.to_string()),
        }
    }
}

/// Cookies set by a response, one per well-formed `Set-Cookie` header.
///
/// Malformed `Set-Cookie` values are skipped.
pub fn response_cookies(headers: &HeaderMap) -> Vec<CookieRecord> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| {
            let text = value.to_str().ok()?;
            match Cookie::parse(text) {
                Ok(cookie) => Some(CookieRecord::from(&cookie)),
                Err(e) => {
                    debug!("Skipping malformed Set-Cookie {text:?}: {e}");
                    None
                }
            }
        })
        .collect()
}

/// Cookies a request carries: its own `Cookie` headers followed by whatever
/// the transport's jar will add (`jar_header`).
pub fn request_cookies(headers: &HeaderMap, jar_header: Option<&HeaderValue>) -> Vec<CookieRecord> {
    headers
        .get_all(COOKIE)
        .iter()
        .chain(jar_header)
        .filter_map(|value| value.to_str().ok())
        .flat_map(|text| Cookie::split_parse(text).filter_map(Result::ok))
        .map(|cookie| CookieRecord {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            ..CookieRecord::default()
        })
        .collect()
}
