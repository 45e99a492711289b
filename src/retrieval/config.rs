// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for retrieval strategies
//!
//! Upstream endpoints, per-strategy timeouts and acceptance thresholds.

use std::env;
use std::time::Duration;
use url::Url;

/// Archive mirrors queried in order by the first fallback strategy
pub const DEFAULT_ARCHIVE_MIRRORS: &[&str] = &[
    "https://archive.today/",
    "https://archive.ph/",
    "https://archive.is/",
    "https://archive.vn/",
];

pub const DEFAULT_UNLOCK_PROXY_URL: &str = "https://12ft.io/";
pub const DEFAULT_WEB_ARCHIVE_URL: &str = "https://web.archive.org/web/2/";
pub const DEFAULT_SEARCH_REFERRER: &str = "https://www.google.com";

/// Configuration for the retrieval orchestrator
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Mirror search prefixes; the target URL is appended to each
    pub archive_mirrors: Vec<String>,
    /// Unlocking proxy prefix (default: 12ft.io)
    pub unlock_proxy_url: String,
    /// Latest-snapshot prefix (default: web.archive.org/web/2/)
    pub web_archive_url: String,
    /// Referer sent by the search-referrer strategy
    pub search_referrer: String,
    /// Timeout for the plain direct fetch in seconds (default: 10)
    pub direct_timeout_secs: u64,
    /// Timeout per archive mirror in seconds (default: 10)
    pub mirror_timeout_secs: u64,
    /// Timeout for the unlocking proxy in seconds (default: 15)
    pub unlock_proxy_timeout_secs: u64,
    /// Timeout for the web archive in seconds (default: 20)
    pub web_archive_timeout_secs: u64,
    /// Timeout for the search-referrer fetch in seconds (default: 10)
    pub referrer_timeout_secs: u64,
    /// Minimum text length of an accepted mirror page (default: 1000)
    pub mirror_min_chars: usize,
    /// Minimum text length of an accepted proxy page (default: 500)
    pub unlock_proxy_min_chars: usize,
}

impl RetrievalConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            archive_mirrors: env::var("ARCHIVE_MIRRORS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|m| !m.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or(defaults.archive_mirrors),
            unlock_proxy_url: env::var("UNLOCK_PROXY_URL").unwrap_or(defaults.unlock_proxy_url),
            web_archive_url: env::var("WEB_ARCHIVE_URL").unwrap_or(defaults.web_archive_url),
            search_referrer: env::var("SEARCH_REFERRER").unwrap_or(defaults.search_referrer),
            ..defaults
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        for prefix in self
            .archive_mirrors
            .iter()
            .chain([&self.unlock_proxy_url, &self.web_archive_url])
        {
            Url::parse(prefix).map_err(|e| format!("invalid endpoint '{}': {}", prefix, e))?;
        }
        if reqwest::header::HeaderValue::from_str(&self.search_referrer).is_err() {
            return Err(format!(
                "search_referrer '{}' is not a valid header value",
                self.search_referrer
            ));
        }
        if self.direct_timeout_secs == 0
            || self.mirror_timeout_secs == 0
            || self.unlock_proxy_timeout_secs == 0
            || self.web_archive_timeout_secs == 0
            || self.referrer_timeout_secs == 0
        {
            return Err("strategy timeouts must be at least 1 second".to_string());
        }
        Ok(())
    }

    pub fn direct_timeout(&self) -> Duration {
        Duration::from_secs(self.direct_timeout_secs)
    }

    pub fn mirror_timeout(&self) -> Duration {
        Duration::from_secs(self.mirror_timeout_secs)
    }

    pub fn unlock_proxy_timeout(&self) -> Duration {
        Duration::from_secs(self.unlock_proxy_timeout_secs)
    }

    pub fn web_archive_timeout(&self) -> Duration {
        Duration::from_secs(self.web_archive_timeout_secs)
    }

    pub fn referrer_timeout(&self) -> Duration {
        Duration::from_secs(self.referrer_timeout_secs)
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            archive_mirrors: DEFAULT_ARCHIVE_MIRRORS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            unlock_proxy_url: DEFAULT_UNLOCK_PROXY_URL.to_string(),
            web_archive_url: DEFAULT_WEB_ARCHIVE_URL.to_string(),
            search_referrer: DEFAULT_SEARCH_REFERRER.to_string(),
            direct_timeout_secs: 10,
            mirror_timeout_secs: 10,
            unlock_proxy_timeout_secs: 15,
            web_archive_timeout_secs: 20,
            referrer_timeout_secs: 10,
            mirror_min_chars: 1000,
            unlock_proxy_min_chars: 500,
        }
    }
}
