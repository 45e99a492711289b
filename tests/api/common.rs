// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared router setup for API tests

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use hidewall::api::{create_app, AppState};
use hidewall::blocklist::Blocklist;
use hidewall::config::AppConfig;
use hidewall::guard::{StaticResolver, UrlGuard};
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`
use wiremock::MockServer;

/// Config with every upstream pointed at the mock server and assets under `assets`
pub fn test_config(server: &MockServer, assets: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    let base = server.uri();
    config.retrieval.archive_mirrors = vec![format!("{}/mirror/", base)];
    config.retrieval.unlock_proxy_url = format!("{}/proxy/", base);
    config.retrieval.web_archive_url = format!("{}/wayback/", base);
    config.server.static_dir = assets.join("static");
    config.server.index_template = assets.join("templates/index.html");
    config.server.service_worker = assets.join("service-worker.js");
    config
}

/// Router whose guard maps `paywalled.test` and `open.test` to the mock server
pub fn test_app(config: &AppConfig, blocklist: Blocklist) -> Router {
    let resolver = StaticResolver::new()
        .with_host("paywalled.test", vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
        .with_host("open.test", vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
        .with_host("intranet.test", vec!["192.168.10.5".parse().unwrap()]);
    let guard = UrlGuard::with_resolver(Arc::new(resolver)).allow_loopback(true);
    create_app(Arc::new(AppState::with_guard(config, blocklist, guard)))
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_from(app: &Router, uri: &str, client: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("x-forwarded-for", client)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Target URL for a host served by the mock server
pub fn target(server: &MockServer, host: &str, path: &str) -> String {
    format!("http://{}:{}{}", host, server.address().port(), path)
}
