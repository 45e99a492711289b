// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Redirect handling: hop limits and per-hop destination checks

use hidewall::fetch::{FetchConfig, FetchError, FetchRequest, PageFetcher, SecureFetcher};
use hidewall::guard::{StaticResolver, UrlGuard, ValidationError};
use reqwest::header::HeaderMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> SecureFetcher {
    let resolver = StaticResolver::new()
        .with_host("paywalled.test", vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
        .with_host("intranet.test", vec!["10.20.30.40".parse().unwrap()]);
    let guard = UrlGuard::with_resolver(Arc::new(resolver)).allow_loopback(true);
    SecureFetcher::new(Arc::new(guard), FetchConfig::default())
}

fn get(url: String) -> FetchRequest {
    FetchRequest {
        url,
        headers: HeaderMap::new(),
        timeout: Duration::from_secs(5),
    }
}

/// Mount `/hop/0 -> /hop/1 -> ... -> /hop/{hops}` where the last hop serves a page
async fn mount_chain(server: &MockServer, hops: usize) {
    for i in 0..hops {
        Mock::given(method("GET"))
            .and(path(format!("/hop/{}", i)))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", format!("/hop/{}", i + 1)),
            )
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/hop/{}", hops)))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>landed</p>"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_ten_redirects_allowed() {
    let server = MockServer::start().await;
    mount_chain(&server, 10).await;

    let result = fetcher()
        .fetch(&get(format!("{}/hop/0", server.uri())))
        .await
        .unwrap();

    assert_eq!(result.status, 200);
    assert!(result.final_url.path().ends_with("/hop/10"));
    assert_eq!(result.body, b"<p>landed</p>");
}

#[tokio::test]
async fn test_eleventh_redirect_fails() {
    let server = MockServer::start().await;
    mount_chain(&server, 11).await;

    let err = fetcher()
        .fetch(&get(format!("{}/hop/0", server.uri())))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::TooManyRedirects { limit: 10 }));
}

#[tokio::test]
async fn test_redirect_to_private_address_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/go"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "http://10.0.0.1/admin"))
        .mount(&server)
        .await;

    let err = fetcher()
        .fetch(&get(format!("{}/go", server.uri())))
        .await
        .unwrap_err();

    match err {
        FetchError::BlockedRedirect { target, reason } => {
            assert_eq!(target, "http://10.0.0.1/admin");
            assert!(matches!(reason, ValidationError::NonPublicAddress { .. }));
        }
        other => panic!("expected BlockedRedirect, got {:?}", other),
    }
}

#[tokio::test]
async fn test_redirect_to_metadata_and_localhost_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metadata"))
        .respond_with(
            ResponseTemplate::new(307)
                .insert_header("location", "http://169.254.169.254/latest/meta-data/"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/local"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "http://localhost/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/named"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "http://intranet.test/wiki"),
        )
        .mount(&server)
        .await;

    let fetcher = fetcher();
    for route in ["/metadata", "/local", "/named"] {
        let err = fetcher
            .fetch(&get(format!("{}{}", server.uri(), route)))
            .await
            .unwrap_err();
        assert!(err.is_fatal(), "{} should be blocked, got {:?}", route, err);
    }
}

#[tokio::test]
async fn test_redirect_to_unsupported_scheme_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/file"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "file:///etc/passwd"))
        .mount(&server)
        .await;

    let err = fetcher()
        .fetch(&get(format!("{}/file", server.uri())))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetchError::BlockedRedirect {
            reason: ValidationError::UnsupportedScheme(_),
            ..
        }
    ));
}

#[tokio::test]
async fn test_named_host_redirect_followed_through_pinned_address() {
    let server = MockServer::start().await;
    let port = server.address().port();
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("http://paywalled.test:{}/article", port)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_string("article body"))
        .mount(&server)
        .await;

    let result = fetcher()
        .fetch(&get(format!("{}/start", server.uri())))
        .await
        .unwrap();

    assert_eq!(result.final_url.host_str(), Some("paywalled.test"));
    assert_eq!(result.body, b"article body");
}

#[tokio::test]
async fn test_redirect_without_location_is_final() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/odd"))
        .respond_with(ResponseTemplate::new(302).set_body_string("no location"))
        .mount(&server)
        .await;

    let result = fetcher()
        .fetch(&get(format!("{}/odd", server.uri())))
        .await
        .unwrap();

    assert_eq!(result.status, 302);
    assert_eq!(result.body, b"no location");
}
