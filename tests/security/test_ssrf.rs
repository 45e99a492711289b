// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Server-side request forgery tests
//!
//! The guard must refuse every spelling of an internal destination, and
//! nothing may reach the network once it has.

use hidewall::fetch::{FetchConfig, FetchError, FetchRequest, PageFetcher, SecureFetcher};
use hidewall::guard::{StaticResolver, UrlGuard, ValidationError};
use reqwest::header::HeaderMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn strict_guard() -> UrlGuard {
    let resolver = StaticResolver::new()
        .with_host("public.test", vec!["93.184.216.34".parse().unwrap()])
        .with_host("rebind.test", vec!["127.0.0.1".parse().unwrap()])
        .with_host(
            "split.test",
            vec!["93.184.216.34".parse().unwrap(), "10.9.8.7".parse().unwrap()],
        )
        .with_host("v6-internal.test", vec!["fd00::5".parse().unwrap()]);
    UrlGuard::with_resolver(Arc::new(resolver))
}

//
// SECURITY TEST 1: Alternate spellings of internal addresses
//

#[tokio::test]
async fn test_encoded_internal_forms_blocked() {
    let guard = strict_guard();

    for url in [
        "http://127.0.0.1/",
        "http://2130706433/",
        "http://0x7f.0.0.1/",
        "http://0177.0.0.1/",
        "http://127.1/",
        "http://[::1]/",
        "http://[::ffff:127.0.0.1]/",
        "http://[::ffff:a9fe:a9fe]/",
        "http://[64:ff9b::a9fe:a9fe]/",
        "http://[::10.0.0.1]/",
        "http://[2002:a9fe:a9fe::1]/",
    ] {
        let err = guard.validate(url).await.unwrap_err();
        assert!(
            matches!(err, ValidationError::NonPublicAddress { .. }),
            "{} -> {:?}",
            url,
            err
        );
    }
}

#[tokio::test]
async fn test_localhost_names_blocked_without_resolution() {
    let guard = strict_guard();

    for url in [
        "http://localhost/",
        "http://LOCALHOST:8080/",
        "http://localhost./",
        "http://api.localhost/",
        "http://printer.local/",
        "http://0.0.0.0/",
    ] {
        let err = guard.validate(url).await.unwrap_err();
        assert!(
            matches!(
                err,
                ValidationError::ForbiddenHost(_) | ValidationError::NonPublicAddress { .. }
            ),
            "{} -> {:?}",
            url,
            err
        );
    }
}

#[tokio::test]
async fn test_userinfo_does_not_hide_real_host() {
    let err = strict_guard()
        .validate("http://public.test@10.0.0.1/")
        .await
        .unwrap_err();
    assert!(matches!(err, ValidationError::NonPublicAddress { .. }));
}

//
// SECURITY TEST 2: Names resolving into private space
//

#[tokio::test]
async fn test_names_resolving_internally_blocked() {
    let guard = strict_guard();

    for url in [
        "http://rebind.test/",
        "http://split.test/",
        "http://v6-internal.test/",
    ] {
        assert!(guard.validate(url).await.is_err(), "{} should be blocked", url);
    }
    assert!(guard.validate("https://public.test/story").await.is_ok());
}

#[tokio::test]
async fn test_unresolvable_host_rejected() {
    let err = strict_guard()
        .validate("https://nowhere.test/")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::Unresolvable {
            host: "nowhere.test".to_string()
        }
    );
}

//
// SECURITY TEST 3: Blocked targets never reach the network
//

#[tokio::test]
async fn test_fetcher_refuses_loopback_upstream() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = SecureFetcher::new(Arc::new(strict_guard()), FetchConfig::default());
    let err = fetcher
        .fetch(&FetchRequest {
            url: format!("{}/internal", server.uri()),
            headers: HeaderMap::new(),
            timeout: Duration::from_secs(2),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetchError::Blocked(ValidationError::NonPublicAddress { .. })
    ));
}

#[tokio::test]
async fn test_loopback_allowance_does_not_open_private_space() {
    let guard = strict_guard().allow_loopback(true);

    assert!(guard.validate("http://127.0.0.1:9/").await.is_ok());
    assert!(guard.validate("http://10.0.0.1/").await.is_err());
    assert!(guard.validate("http://169.254.169.254/").await.is_err());
    assert!(guard.validate("http://localhost/").await.is_err());
}
