//! End-to-end chases through the reqwest transport against local mock servers.
//!
//! These tests use `httptest` servers on 127.0.0.1, so they do not make real
//! network requests. Tests that need working name resolution are marked
//! `#[ignore]`; run them with `cargo test -- --ignored`.

use std::time::Duration;

use httptest::{all_of, matchers::*, responders::*, Expectation, Server};

use chaselink::export::{write_details, write_final_body};
use chaselink::{
    ChaseConfig, ChaseEngine, ChaseError, ClientOptions, HopRequest, HttpTransport,
    TransportErrorKind,
};

fn engine(config: ChaseConfig) -> ChaseEngine<HttpTransport> {
    chaselink::initialization::init_crypto_provider();
    let transport = HttpTransport::new(&ClientOptions::default()).expect("transport should build");
    ChaseEngine::new(transport, config)
}

fn start(server: &Server, path: &str) -> HopRequest {
    HopRequest::parse_get(&format!("http://{}{}", server.addr(), path)).expect("valid URL")
}

#[tokio::test]
async fn test_redirect_chain_is_traced() {
    let server = Server::run();
    let absolute = format!("http://{}/second", server.addr());
    server.expect(
        Expectation::matching(request::method_path("GET", "/first"))
            .respond_with(status_code(301).append_header("Location", absolute.as_str())),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/second"))
            .respond_with(status_code(307).append_header("Location", "/final?x=1")),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/final")).respond_with(
            status_code(200)
                .append_header("Content-Type", "text/html; charset=utf-8")
                .body("<html><body>done</body></html>"),
        ),
    );

    let report = engine(ChaseConfig::default()).chase(start(&server, "/first")).await;

    assert!(report.error.is_none(), "unexpected error: {:?}", report.error);
    assert!(report.is_clean());
    let statuses: Vec<_> = report.pages.iter().map(|p| p.status_code()).collect();
    assert_eq!(statuses, [Some(301), Some(307), Some(200)]);
    assert_eq!(
        report.pages[2].request_url,
        format!("http://{}/final?x=1", server.addr())
    );

    for page in &report.pages {
        assert_eq!(page.request_method, "GET");
        assert!(page.tls.is_none());
        assert!(page.dns_addresses.is_empty(), "IP literals need no lookup");
        assert_eq!(page.remote_addr, Some(server.addr()));
        assert!(page.local_addr.is_none());
    }

    let last = report.final_page().unwrap().response().unwrap();
    assert_eq!(last.status_message, "200 OK");
    assert_eq!(last.body, b"<html><body>done</body></html>");
    assert_eq!(last.header.get("content-type"), Some("text/html; charset=utf-8"));
}

#[tokio::test]
async fn test_meta_refresh_is_followed() {
    let server = Server::run();
    let next = format!("http://{}/next", server.addr());
    let body =
        format!(r#"<html><head><meta http-equiv="refresh" content="0; {next}"></head></html>"#);
    server.expect(
        Expectation::matching(request::method_path("GET", "/")).respond_with(
            status_code(200)
                .append_header("Content-Type", "text/html")
                .body(body),
        ),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/next")).respond_with(
            status_code(200)
                .append_header("Content-Type", "application/json")
                .body(r#"{"ok":true}"#),
        ),
    );

    let report = engine(ChaseConfig::default()).chase(start(&server, "/")).await;

    assert!(report.error.is_none());
    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.pages[1].request_url, next);
}

#[tokio::test]
async fn test_cookies_carry_across_hops() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/login")).respond_with(
            status_code(302)
                .append_header("Set-Cookie", "session=abc123; Path=/; HttpOnly")
                .append_header("Location", "/home"),
        ),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/home"),
            request::headers(contains(("cookie", "session=abc123"))),
        ])
        .respond_with(status_code(200).append_header("Content-Type", "text/plain")),
    );

    let report = engine(ChaseConfig::default()).chase(start(&server, "/login")).await;

    assert!(report.error.is_none());
    assert_eq!(report.pages.len(), 2);

    let set = &report.pages[0].response().unwrap().cookies;
    assert_eq!(set.len(), 1);
    assert_eq!(set[0].name, "session");
    assert!(set[0].http_only);
    assert_eq!(set[0].path.as_deref(), Some("/"));

    let sent = &report.pages[1].request_cookies;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].name, "session");
    assert_eq!(sent[0].value, "abc123");
}

#[tokio::test]
async fn test_cookies_stay_with_their_chase() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/set")).respond_with(
            status_code(200)
                .append_header("Set-Cookie", "leak=1; Path=/")
                .append_header("Content-Type", "text/plain"),
        ),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/other"),
            request::headers(not(contains(key("cookie")))),
        ])
        .respond_with(status_code(200).append_header("Content-Type", "text/plain")),
    );

    let mut engine = engine(ChaseConfig::default());
    let first = engine.chase(start(&server, "/set")).await;
    assert!(first.is_clean());
    assert_eq!(first.pages[0].response().unwrap().cookies[0].name, "leak");

    let second = engine.chase(start(&server, "/other")).await;
    assert!(second.is_clean(), "unexpected outcome: {:?}", second.pages);
    assert!(second.pages[0].request_cookies.is_empty());
}

#[tokio::test]
async fn test_user_agent_override_reaches_server() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/a"),
            request::headers(contains(("user-agent", "chaselink-test/1.0"))),
        ])
        .respond_with(status_code(308).append_header("Location", "/b")),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/b"),
            request::headers(contains(("user-agent", "chaselink-test/1.0"))),
        ])
        .respond_with(status_code(404)),
    );

    let config = ChaseConfig::default().with_user_agent("chaselink-test/1.0");
    let report = engine(config).chase(start(&server, "/a")).await;

    assert!(report.error.is_none());
    assert_eq!(report.pages.len(), 2);
    assert_eq!(report.pages[1].status_code(), Some(404));
    assert_eq!(
        report.pages[1].request_header.get("user-agent"),
        Some("chaselink-test/1.0")
    );
}

#[tokio::test]
async fn test_redirect_loop_hits_limit() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/loop"))
            .times(4)
            .respond_with(status_code(302).append_header("Location", "/loop")),
    );

    let report = engine(ChaseConfig::default().with_limit(4))
        .chase(start(&server, "/loop"))
        .await;

    assert_eq!(report.pages.len(), 4);
    assert!(matches!(report.error, Some(ChaseError::TooManyRedirects(4))));
}

#[tokio::test]
async fn test_connection_failure_ends_chase_quietly() {
    // Reserve a port, then free it so nothing is listening there.
    let closed = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .unwrap();

    let server = Server::run();
    let dead_end = format!("http://{closed}/gone");
    server.expect(
        Expectation::matching(request::method_path("GET", "/"))
            .respond_with(status_code(302).append_header("Location", dead_end.as_str())),
    );

    let report = engine(ChaseConfig::default()).chase(start(&server, "/")).await;

    assert!(report.error.is_none());
    assert_eq!(report.pages.len(), 2);
    let failed = &report.pages[1];
    assert!(failed.response().is_none());
    assert_eq!(failed.error().unwrap().kind, TransportErrorKind::Connect);
    assert!(failed.remote_addr.is_none());
}

#[tokio::test]
async fn test_overall_timeout() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/slow")).respond_with(delay_and_then(
            Duration::from_secs(5),
            status_code(200),
        )),
    );

    let config = ChaseConfig::default().with_timeout(Duration::from_millis(300));
    let report = engine(config).chase(start(&server, "/slow")).await;

    assert!(report.pages.is_empty());
    assert!(matches!(report.error, Some(ChaseError::Timeout(_))));
}

#[tokio::test]
async fn test_sinks_write_trace_and_final_body() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/"))
            .respond_with(status_code(301).append_header("Location", "/page")),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/page")).respond_with(
            status_code(200)
                .append_header("Content-Type", "text/html")
                .body("<p>final body</p>"),
        ),
    );

    let report = engine(ChaseConfig::default()).chase(start(&server, "/")).await;
    let dir = tempfile::tempdir().unwrap();

    let details = dir.path().join("details.json");
    write_details(&report.pages, std::fs::File::create(&details).unwrap()).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&details).unwrap()).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[0]["response"]["status_code"], 301);
    assert_eq!(value[1]["response"]["header"]["content-type"][0], "text/html");

    let body = dir.path().join("body.html");
    write_final_body(&report.pages, std::fs::File::create(&body).unwrap()).unwrap();
    assert_eq!(std::fs::read(&body).unwrap(), b"<p>final body</p>");
}

#[tokio::test]
#[ignore] // Needs a resolver that answers for "localhost"
async fn test_dns_addresses_recorded_for_names() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/"))
            .respond_with(status_code(204)),
    );

    let url = format!("http://localhost:{}/", server.addr().port());
    let report = engine(ChaseConfig::default())
        .chase(HopRequest::parse_get(&url).unwrap())
        .await;

    let page = report.final_page().unwrap();
    assert_eq!(page.status_code(), Some(204));
    assert!(!page.dns_addresses.is_empty());
    assert!(page.dns_addresses.iter().all(|ip| ip.is_loopback()));
}
