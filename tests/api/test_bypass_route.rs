// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! `/yeet` end to end: validation, retrieval and error pages

use super::common::{body_text, get, target, test_app, test_config};
use axum::http::StatusCode;
use hidewall::blocklist::{Blocklist, MatchMode};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> (MockServer, TempDir) {
    (MockServer::start().await, TempDir::new().unwrap())
}

fn flagged() -> Blocklist {
    Blocklist::new(["paywalled.test"], MatchMode::Host)
}

#[tokio::test]
async fn test_missing_url_is_bad_request() {
    let (server, dir) = setup().await;
    let app = test_app(&test_config(&server, dir.path()), Blocklist::default());

    for uri in ["/yeet", "/yeet?y=", "/yeet?y=%20%20"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body_text(response).await.contains("<h3>Invalid Request</h3>"));
    }
}

#[tokio::test]
async fn test_invalid_urls_are_bad_request() {
    let (server, dir) = setup().await;
    let app = test_app(&test_config(&server, dir.path()), Blocklist::default());

    for bad in [
        "not-a-url",
        "ftp://files.example/a",
        "javascript:alert(1)",
        "http://localhost/",
        "http://10.0.0.1/",
        "http://169.254.169.254/latest/meta-data/",
        "http://intranet.test/wiki",
    ] {
        let response = get(&app, &format!("/yeet?y={}", bad)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", bad);
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_open_site_served_with_security_headers() {
    let (server, dir) = setup().await;
    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><p>Hello reader</p><aside>ad</aside><img src=\"/pic.jpg\"></body></html>",
        ))
        .expect(1)
        .mount(&server)
        .await;
    let app = test_app(&test_config(&server, dir.path()), Blocklist::default());

    let response = get(
        &app,
        &format!("/yeet?y={}", target(&server, "open.test", "/news")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert!(headers["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(headers.contains_key("referrer-policy"));
    assert!(headers.contains_key("permissions-policy"));

    let body = body_text(response).await;
    assert!(body.contains("Hello reader"));
    assert!(!body.contains("<aside"));
    assert!(body.contains(&target(&server, "open.test", "/pic.jpg")));
}

#[tokio::test]
async fn test_open_site_http_error_is_bad_gateway() {
    let (server, dir) = setup().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    let app = test_app(&test_config(&server, dir.path()), Blocklist::default());

    let response = get(
        &app,
        &format!("/yeet?y={}", target(&server, "open.test", "/gone")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_text(response).await.contains("<h3>Site Access Error</h3>"));
}

#[tokio::test]
async fn test_flagged_site_served_from_archive_mirror() {
    let (server, dir) = setup().await;
    let article = format!(
        "<html><body><article>{}</article></body></html>",
        "<p>The archived copy of the paywalled story.</p>".repeat(40)
    );
    Mock::given(method("GET"))
        .and(path_regex("^/mirror/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/story"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let app = test_app(&test_config(&server, dir.path()), flagged());

    let response = get(
        &app,
        &format!("/yeet?y={}", target(&server, "paywalled.test", "/story")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("archived copy"));
}

#[tokio::test]
async fn test_flagged_site_all_failed_is_unavailable() {
    let (server, dir) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let app = test_app(&test_config(&server, dir.path()), flagged());

    let response = get(
        &app,
        &format!("/yeet?y={}", target(&server, "paywalled.test", "/story")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_text(response).await;
    assert!(body.contains("<h3>Paywall Bypass Failed</h3>"));
    assert!(body.contains("archive.today"));
}

#[tokio::test]
async fn test_upstream_url_is_escaped_in_error_page() {
    let (server, dir) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = test_app(&test_config(&server, dir.path()), Blocklist::default());

    let uri = format!(
        "/yeet?y={}",
        target(&server, "open.test", "/%3Cscript%3Ealert(1)%3C/script%3E")
    );
    let response = get(&app, &uri).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(!body_text(response).await.contains("<script>"));
}

#[tokio::test]
async fn test_slow_retrieval_cut_off_at_request_timeout() {
    let (server, dir) = setup().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<p>too late</p>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let mut config = test_config(&server, dir.path());
    config.server.request_timeout_secs = 1;
    let app = test_app(&config, Blocklist::default());

    let response = get(
        &app,
        &format!("/yeet?y={}", target(&server, "open.test", "/slow")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}
