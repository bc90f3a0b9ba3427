//! Error categorization.

use std::error::Error as StdError;

use super::types::TransportErrorKind;

/// Categorizes a `reqwest::Error` into a `TransportErrorKind`.
///
/// Status errors cannot occur here because responses of every status are
/// recorded as pages, so only the request-side categories are checked.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> TransportErrorKind {
    if error.is_builder() {
        TransportErrorKind::Builder
    } else if error.is_redirect() {
        TransportErrorKind::Redirect
    } else if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_connect() {
        TransportErrorKind::Connect
    } else if error.is_request() {
        TransportErrorKind::Request
    } else if error.is_body() {
        TransportErrorKind::Body
    } else if error.is_decode() {
        TransportErrorKind::Decode
    } else {
        TransportErrorKind::Other
    }
}

/// Renders an error and all of its sources as one line, joined with ": ".
///
/// reqwest's own `Display` only names the outermost failure ("error sending
/// request"), which hides the DNS/TLS/socket cause we want on the page.
pub fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.ends_with(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl std::fmt::Display for Layer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.1.as_deref().map(|l| l as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn test_error_chain_joins_sources() {
        let err = Layer(
            "error sending request",
            Some(Box::new(Layer(
                "client error (Connect)",
                Some(Box::new(Layer("Connection refused", None))),
            ))),
        );
        assert_eq!(
            error_chain(&err),
            "error sending request: client error (Connect): Connection refused"
        );
    }

    #[test]
    fn test_error_chain_single() {
        let err = Layer("dns error", None);
        assert_eq!(error_chain(&err), "dns error");
    }

    #[test]
    fn test_error_chain_skips_repeated_suffix() {
        let err = Layer("lookup failed: timed out", Some(Box::new(Layer("timed out", None))));
        assert_eq!(error_chain(&err), "lookup failed: timed out");
    }

    #[tokio::test]
    async fn test_categorize_connect_error() {
        // Port 9 on localhost is the discard port; nothing listens there in CI.
        let client = reqwest::Client::new();
        let err = client
            .get("http://127.0.0.1:9/")
            .send()
            .await
            .expect_err("nothing should be listening");
        assert_eq!(categorize_reqwest_error(&err), TransportErrorKind::Connect);
    }

    #[test]
    fn test_categorize_builder_error() {
        let client = reqwest::Client::new();
        let err = client.get("not a url").build().expect_err("invalid url");
        assert_eq!(categorize_reqwest_error(&err), TransportErrorKind::Builder);
    }
}
