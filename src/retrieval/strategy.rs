// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Retrieval strategy descriptors
//!
//! A strategy is data: how to turn the target into request URLs, which
//! headers to send, how long to wait and how to judge the result. The
//! orchestrator consumes them in order.

use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use super::acceptance::{AcceptAll, Acceptance, ArchiveMirrorCheck, UnlockProxyCheck};
use super::config::RetrievalConfig;
use crate::fetch::FetchRequest;
use crate::guard::TargetUrl;

pub const GOOGLEBOT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (PlayStation; PlayStation 5/6.50) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.4 Safari/605.1.15";
pub const TWITTERBOT_USER_AGENT: &str = "Twitterbot/1.0";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.5";
/// Only encodings the fetcher can undo are advertised
const ACCEPT_ENCODING_SUPPORTED: &str = "gzip, br";

/// Facebook's outbound link shim only redirects when it sees its own referer
const FACEBOOK_LINK_SHIM: &str = "facebook.com/l.php";
const FACEBOOK_REFERER: &str = "https://facebook.com/";

/// Where a strategy sends its requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// The target itself, query string included
    Target,
    /// Each prefix with the query-stripped target appended, tried in order
    Prefixed(Vec<String>),
}

/// One named retrieval technique
#[derive(Clone)]
pub struct Strategy {
    pub name: &'static str,
    pub endpoint: Endpoint,
    pub headers: HeaderMap,
    pub timeout: Duration,
    pub acceptance: Arc<dyn Acceptance>,
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Strategy {
    /// Plain fetch with a link-preview bot user agent
    pub fn direct(config: &RetrievalConfig) -> Self {
        Self {
            name: "direct",
            endpoint: Endpoint::Target,
            headers: full_browser_headers(TWITTERBOT_USER_AGENT),
            timeout: config.direct_timeout(),
            acceptance: Arc::new(AcceptAll),
        }
    }

    /// Search each archive mirror for an existing snapshot
    pub fn archive_mirrors(config: &RetrievalConfig) -> Self {
        let mut headers = base_headers(BROWSER_USER_AGENT);
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));
        Self {
            name: "archive-mirror",
            endpoint: Endpoint::Prefixed(config.archive_mirrors.clone()),
            headers,
            timeout: config.mirror_timeout(),
            acceptance: Arc::new(ArchiveMirrorCheck {
                min_chars: config.mirror_min_chars,
            }),
        }
    }

    pub fn unlock_proxy(config: &RetrievalConfig) -> Self {
        let mut headers = base_headers(BROWSER_USER_AGENT);
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));
        headers.insert(
            ACCEPT_ENCODING,
            HeaderValue::from_static(ACCEPT_ENCODING_SUPPORTED),
        );
        Self {
            name: "unlock-proxy",
            endpoint: Endpoint::Prefixed(vec![config.unlock_proxy_url.clone()]),
            headers,
            timeout: config.unlock_proxy_timeout(),
            acceptance: Arc::new(UnlockProxyCheck {
                min_chars: config.unlock_proxy_min_chars,
            }),
        }
    }

    /// Latest web-archive snapshot; only HTTP and parse errors count as failure
    pub fn web_archive(config: &RetrievalConfig) -> Self {
        Self {
            name: "web-archive",
            endpoint: Endpoint::Prefixed(vec![config.web_archive_url.clone()]),
            headers: base_headers(BROWSER_USER_AGENT),
            timeout: config.web_archive_timeout(),
            acceptance: Arc::new(AcceptAll),
        }
    }

    /// Direct fetch posing as a crawler arriving from a search engine
    pub fn search_referrer(config: &RetrievalConfig) -> Self {
        let mut headers = full_browser_headers(GOOGLEBOT_USER_AGENT);
        match HeaderValue::from_str(&config.search_referrer) {
            Ok(value) => {
                headers.insert(REFERER, value);
            }
            Err(e) => warn!(
                "Ignoring unusable search referrer '{}': {}",
                config.search_referrer, e
            ),
        }
        Self {
            name: "search-referrer",
            endpoint: Endpoint::Target,
            headers,
            timeout: config.referrer_timeout(),
            acceptance: Arc::new(AcceptAll),
        }
    }

    /// Requests this strategy issues for a target, in the order they are tried
    pub fn requests(&self, target: &TargetUrl) -> Vec<FetchRequest> {
        match &self.endpoint {
            Endpoint::Target => {
                let mut headers = self.headers.clone();
                if !headers.contains_key(REFERER) && target.as_str().contains(FACEBOOK_LINK_SHIM) {
                    headers.insert(REFERER, HeaderValue::from_static(FACEBOOK_REFERER));
                }
                vec![FetchRequest {
                    url: target.as_str().to_string(),
                    headers,
                    timeout: self.timeout,
                }]
            }
            Endpoint::Prefixed(prefixes) => {
                let clean = target.without_query();
                prefixes
                    .iter()
                    .map(|prefix| FetchRequest {
                        url: format!("{}{}", prefix, clean),
                        headers: self.headers.clone(),
                        timeout: self.timeout,
                    })
                    .collect()
            }
        }
    }
}

/// The ordered fallback chain used for flagged sites
pub fn fallback_chain(config: &RetrievalConfig) -> Vec<Strategy> {
    vec![
        Strategy::archive_mirrors(config),
        Strategy::unlock_proxy(config),
        Strategy::web_archive(config),
        Strategy::search_referrer(config),
    ]
}

fn base_headers(user_agent: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers
}

fn full_browser_headers(user_agent: &'static str) -> HeaderMap {
    let mut headers = base_headers(user_agent);
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_EN));
    headers.insert(
        ACCEPT_ENCODING,
        HeaderValue::from_static(ACCEPT_ENCODING_SUPPORTED),
    );
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}
