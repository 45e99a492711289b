// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Static routes, health and per-client rate limiting

use super::common::{body_text, get, get_from, test_app, test_config};
use axum::http::StatusCode;
use hidewall::api::HealthResponse;
use hidewall::blocklist::{Blocklist, MatchMode};
use std::fs;
use tempfile::TempDir;
use wiremock::MockServer;

#[tokio::test]
async fn test_index_falls_back_to_builtin_form() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = test_app(&test_config(&server, dir.path()), Blocklist::default());

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("action=\"/yeet\""));
    assert!(body.contains("name=\"y\""));
}

#[tokio::test]
async fn test_index_serves_template_when_present() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("templates")).unwrap();
    fs::write(
        dir.path().join("templates/index.html"),
        "<html><body>custom landing</body></html>",
    )
    .unwrap();
    let app = test_app(&test_config(&server, dir.path()), Blocklist::default());

    let body = body_text(get(&app, "/").await).await;
    assert!(body.contains("custom landing"));
}

#[tokio::test]
async fn test_service_worker_is_javascript() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = test_app(&test_config(&server, dir.path()), Blocklist::default());

    let response = get(&app, "/service-worker.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/javascript");
}

#[tokio::test]
async fn test_static_files_served() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("static/css")).unwrap();
    fs::write(dir.path().join("static/css/style.css"), "body { color: red; }").unwrap();
    fs::write(dir.path().join("static/manifest.json"), "{\"name\":\"Hidewall\"}").unwrap();
    let app = test_app(&test_config(&server, dir.path()), Blocklist::default());

    let css = get(&app, "/static/css/style.css").await;
    assert_eq!(css.status(), StatusCode::OK);
    assert!(body_text(css).await.contains("color: red"));

    let manifest = get(&app, "/manifest.json").await;
    assert_eq!(manifest.status(), StatusCode::OK);

    let missing = get(&app, "/static/nope.css").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_flagged_sites() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let blocklist = Blocklist::new(["nytimes.com", "wsj.com"], MatchMode::Substring);
    let app = test_app(&test_config(&server, dir.path()), blocklist);

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.build, hidewall::version::VERSION);
    assert_eq!(health.date, hidewall::version::BUILD_DATE);
    assert!(health.features.iter().any(|f| f == "ssrf-guard"));
    assert_eq!(health.flagged_sites, 2);
}

#[tokio::test]
async fn test_eleventh_request_rate_limited() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let app = test_app(&test_config(&server, dir.path()), Blocklist::default());

    for i in 0..10 {
        let response = get_from(&app, "/health", "203.0.113.9").await;
        assert_eq!(response.status(), StatusCode::OK, "request {}", i + 1);
    }

    let limited = get_from(&app, "/health", "203.0.113.9").await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.headers().contains_key("retry-after"));
    assert_eq!(limited.headers()["x-frame-options"], "DENY");
    assert_eq!(
        body_text(limited).await,
        "Rate limit exceeded. Please try again later."
    );

    // A different client keeps its own allowance
    let other = get_from(&app, "/health", "198.51.100.4").await;
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_forwarded_for_first_hop_is_the_client() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&server, dir.path());
    config.server.rate_limit_per_minute = 1;
    let app = test_app(&config, Blocklist::default());

    assert_eq!(
        get_from(&app, "/health", "203.0.113.20, 10.0.0.1").await.status(),
        StatusCode::OK
    );
    // Same first hop behind a different proxy
    assert_eq!(
        get_from(&app, "/health", "203.0.113.20, 10.0.0.2").await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}
