//! Meta-refresh detection.

use std::sync::LazyLock;

use regex::Regex;
use scraper::node::Element;
use scraper::{Html, Selector};

/// `<meta>` elements. The parser keeps `<noscript>` content as raw text, so
/// tags inside it are never selected.
static META_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("meta").expect("Failed to parse meta selector - this is a bug")
});

/// Delay in seconds, a semicolon, then the target token.
static REFRESH_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[0-9]+\s*;\s*(\S+)")
        .expect("Failed to compile refresh regex - this is a bug")
});

/// Finds `<meta http-equiv="refresh" content="N; URL">` targets in HTML.
///
/// Scanning is a pure function of the body bytes: nothing is fetched and no
/// script runs. Bytes that are not valid UTF-8 are replaced before parsing,
/// and the HTML parser recovers from any malformed markup, so the scan never
/// fails; it just finds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetaRefreshScanner;

impl MetaRefreshScanner {
    /// Returns the first refresh target in document order.
    ///
    /// The target is the first run of non-whitespace after the semicolon,
    /// returned exactly as written: `content="0; url=/home"` yields
    /// `url=/home`. Refresh tags whose content does not match are skipped.
    pub fn scan(body: &[u8]) -> Option<String> {
        let text = String::from_utf8_lossy(body);
        let document = Html::parse_document(&text);
        document
            .select(&META_SELECTOR)
            .find_map(|element| refresh_target(element.value()))
    }
}

fn refresh_target(meta: &Element) -> Option<String> {
    let http_equiv = meta.attr("http-equiv")?;
    if !http_equiv.trim().eq_ignore_ascii_case("refresh") {
        return None;
    }
    let content = meta.attr("content")?;
    let target = REFRESH_CONTENT.captures(content)?.get(1)?;
    Some(target.as_str().to_string())
}
