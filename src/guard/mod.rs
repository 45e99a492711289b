// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Target URL validation and private-network guarding
//!
//! Every URL the service is asked to fetch, and every redirect target it
//! encounters on the way, passes through [`UrlGuard`]. The guard rejects
//! malformed input, non-HTTP schemes and any destination that resolves
//! into loopback, private, link-local, multicast or reserved space.
//!
//! ## Architecture
//!
//! ```text
//! raw string → syntax checks → literal host checks → HostResolver → address checks → TargetUrl
//! ```
//!
//! Resolution failures are treated as hostile: an unresolvable host is
//! rejected rather than assumed to be down.

pub mod address;
pub mod resolver;

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use url::{Host, Url};

pub use address::{is_forbidden_hostname, is_loopback, is_non_public};
pub use resolver::{HostResolver, StaticResolver, SystemResolver};

/// Longest accepted target URL, in bytes
pub const MAX_URL_LENGTH: usize = 2048;

/// Reasons a URL is refused before any network request is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No URL provided")]
    Empty,

    #[error("URL is {length} characters long (limit {MAX_URL_LENGTH})")]
    TooLong { length: usize },

    #[error("Malformed URL: {0}")]
    Malformed(String),

    #[error("Unsupported scheme '{0}', only http and https are allowed")]
    UnsupportedScheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("Host '{0}' is not allowed")]
    ForbiddenHost(String),

    #[error("Host '{host}' could not be resolved")]
    Unresolvable { host: String },

    #[error("Host '{host}' resolves to non-public address {addr}")]
    NonPublicAddress { host: String, addr: IpAddr },
}

/// A validated, absolute http(s) URL
///
/// The full URL (query and fragment included) is what gets fetched;
/// [`TargetUrl::without_query`] is the form used for blocklist checks and
/// for building archive lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    url: Url,
    addrs: Vec<IpAddr>,
}

impl TargetUrl {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Host portion as it appears in the URL
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Addresses the host resolved to at validation time
    pub fn addrs(&self) -> &[IpAddr] {
        &self.addrs
    }

    /// The URL with query string and fragment removed
    pub fn without_query(&self) -> String {
        let mut clean = self.url.clone();
        clean.set_query(None);
        clean.set_fragment(None);
        clean.into()
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Validates URLs and the addresses they resolve to
pub struct UrlGuard {
    resolver: Arc<dyn HostResolver>,
    allow_loopback: bool,
}

impl UrlGuard {
    /// Create a guard that resolves through the operating system
    pub fn new() -> Self {
        Self::with_resolver(Arc::new(SystemResolver))
    }

    pub fn with_resolver(resolver: Arc<dyn HostResolver>) -> Self {
        Self {
            resolver,
            allow_loopback: false,
        }
    }

    /// Permit loopback destinations
    ///
    /// Only meant for local harnesses where upstreams are served from
    /// 127.0.0.1. Literal `localhost` names stay blocked either way.
    pub fn allow_loopback(mut self, allow: bool) -> Self {
        self.allow_loopback = allow;
        self
    }

    /// Validate a raw client-supplied string
    pub async fn validate(&self, raw: &str) -> Result<TargetUrl, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::Empty);
        }
        if raw.len() > MAX_URL_LENGTH {
            return Err(ValidationError::TooLong { length: raw.len() });
        }

        let url = Url::parse(raw).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        let addrs = self.check_destination(&url).await?;

        Ok(TargetUrl { url, addrs })
    }

    /// Check an already-parsed URL and return the addresses it may connect to
    ///
    /// Used for the initial request and again for every redirect hop.
    pub async fn check_destination(&self, url: &Url) -> Result<Vec<IpAddr>, ValidationError> {
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
        }

        let host = url.host().ok_or(ValidationError::MissingHost)?;
        let addrs = match host {
            Host::Ipv4(v4) => vec![IpAddr::V4(v4)],
            Host::Ipv6(v6) => vec![IpAddr::V6(v6)],
            Host::Domain(name) => {
                if name.is_empty() {
                    return Err(ValidationError::MissingHost);
                }
                if is_forbidden_hostname(name) {
                    warn!("Blocked request to forbidden host: {}", name);
                    return Err(ValidationError::ForbiddenHost(name.to_string()));
                }
                let port = url.port_or_known_default().unwrap_or(80);
                self.resolve(name, port).await?
            }
        };

        let label = url.host_str().unwrap_or_default();
        for addr in &addrs {
            if self.allow_loopback && is_loopback(*addr) {
                continue;
            }
            if is_non_public(*addr) {
                warn!("Blocked request to {} resolving to {}", label, addr);
                return Err(ValidationError::NonPublicAddress {
                    host: label.to_string(),
                    addr: *addr,
                });
            }
        }

        Ok(addrs)
    }

    async fn resolve(&self, host: &str, port: u16) -> Result<Vec<IpAddr>, ValidationError> {
        let unresolvable = || ValidationError::Unresolvable {
            host: host.to_string(),
        };

        let addrs = self.resolver.resolve(host, port).await.map_err(|e| {
            debug!("Resolution of {} failed: {}", host, e);
            unresolvable()
        })?;

        if addrs.is_empty() {
            return Err(unresolvable());
        }
        Ok(addrs)
    }
}

impl Default for UrlGuard {
    fn default() -> Self {
        Self::new()
    }
}
