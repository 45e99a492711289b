// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP fetching with guarded redirects and bounded bodies
//!
//! Redirects are followed by hand so that each hop is re-validated by the
//! guard, and every connection is pinned to the addresses the guard
//! approved for that hop.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_ENCODING, LOCATION};
use reqwest::redirect::Policy;
use reqwest::Client;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::{Host, Url};

use super::config::FetchConfig;
use super::decode::{decode_body, BodyEncoding};
use crate::guard::{UrlGuard, ValidationError};

/// A single GET request as issued by a retrieval strategy
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub timeout: Duration,
}

/// Raw upstream response, before any HTML handling
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// URL the body was served from, after redirects
    pub final_url: Url,
    pub status: u16,
    /// Value of the `Content-Encoding` header, if any
    pub content_encoding: Option<String>,
    /// Body bytes, capped at the configured maximum
    pub body: Vec<u8>,
    /// Whether bytes past the cap were discarded
    pub truncated: bool,
}

impl FetchResult {
    /// Undo gzip/brotli encoding, falling back to the raw bytes on failure
    pub fn into_decoded(self, limit: usize) -> Vec<u8> {
        let encoding = BodyEncoding::from_header(self.content_encoding.as_deref());
        if encoding == BodyEncoding::Passthrough {
            return self.body;
        }

        match decode_body(&self.body, encoding, limit) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(
                    "Decompression of {:?} body from {} failed: {}",
                    encoding, self.final_url, e
                );
                self.body
            }
        }
    }
}

/// Fetch failures
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Request URL could not be parsed
    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Request URL failed validation before any connection was made
    #[error("Request blocked: {0}")]
    Blocked(#[from] ValidationError),

    /// A redirect pointed somewhere the guard refuses
    #[error("Redirect to {target} blocked: {reason}")]
    BlockedRedirect {
        target: String,
        reason: ValidationError,
    },

    #[error("Too many redirects (limit {limit})")]
    TooManyRedirects { limit: u32 },

    /// Upstream answered with a status >= 400
    #[error("HTTP error {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// Upstream did not answer within the strategy timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// DNS, connect, TLS or body-read failure
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    /// Errors that mean the request itself is unsafe and must not be retried
    /// through another strategy
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::BlockedRedirect { .. })
    }

    /// HTTP status, when the upstream produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn from_reqwest(url: &Url, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

/// Anything that can perform a guarded GET
///
/// The orchestrator only sees this trait, so strategies can be exercised
/// against a stub without touching the network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, FetchError>;

    /// Ceiling applied to decoded bodies
    fn max_response_bytes(&self) -> usize;
}

/// Fetcher enforcing redirect, address and size limits
pub struct SecureFetcher {
    guard: Arc<UrlGuard>,
    config: FetchConfig,
}

impl SecureFetcher {
    pub fn new(guard: Arc<UrlGuard>, config: FetchConfig) -> Self {
        Self { guard, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Build a client for one hop, pinned to the validated addresses
    fn client_for(&self, url: &Url, addrs: &[IpAddr], timeout: Duration) -> Result<Client, FetchError> {
        let mut builder = Client::builder()
            .redirect(Policy::none())
            .no_proxy()
            .timeout(timeout)
            .connect_timeout(self.config.connect_timeout());

        if let Some(Host::Domain(domain)) = url.host() {
            // Port 0 keeps the port from the URL itself
            let pinned: Vec<SocketAddr> = addrs.iter().map(|ip| SocketAddr::new(*ip, 0)).collect();
            if !pinned.is_empty() {
                builder = builder.resolve_to_addrs(domain, &pinned);
            }
        }

        builder.build().map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: format!("client construction failed: {}", e),
        })
    }

    async fn read_capped(
        &self,
        url: &Url,
        mut response: reqwest::Response,
    ) -> Result<(Vec<u8>, bool), FetchError> {
        let limit = self.config.max_response_bytes;
        let mut body = Vec::new();
        let mut truncated = false;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?
        {
            let remaining = limit - body.len();
            if chunk.len() > remaining {
                body.extend_from_slice(&chunk[..remaining]);
                truncated = true;
                break;
            }
            body.extend_from_slice(&chunk);
        }

        if truncated {
            debug!("Response from {} truncated at {} bytes", url, limit);
        }
        Ok((body, truncated))
    }
}

#[async_trait]
impl PageFetcher for SecureFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResult, FetchError> {
        let mut current = Url::parse(&request.url).map_err(|e| FetchError::InvalidUrl {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;
        let mut addrs = self.guard.check_destination(&current).await?;
        let mut redirects = 0u32;

        loop {
            debug!("GET {}", current);
            let client = self.client_for(&current, &addrs, request.timeout)?;
            let response = client
                .get(current.clone())
                .headers(request.headers.clone())
                .send()
                .await
                .map_err(|e| FetchError::from_reqwest(&current, e))?;

            let status = response.status();
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            if status.is_redirection() {
                if let Some(location) = location {
                    redirects += 1;
                    if redirects > self.config.max_redirects {
                        return Err(FetchError::TooManyRedirects {
                            limit: self.config.max_redirects,
                        });
                    }

                    let next = current.join(&location).map_err(|e| FetchError::Transport {
                        url: current.to_string(),
                        message: format!("unusable Location header '{}': {}", location, e),
                    })?;

                    addrs = self
                        .guard
                        .check_destination(&next)
                        .await
                        .map_err(|reason| {
                            warn!("Blocked redirect from {} to {}: {}", current, next, reason);
                            FetchError::BlockedRedirect {
                                target: next.to_string(),
                                reason,
                            }
                        })?;

                    debug!("Following redirect {} -> {}", current, next);
                    current = next;
                    continue;
                }
            }

            if status.as_u16() >= 400 {
                return Err(FetchError::HttpStatus {
                    status: status.as_u16(),
                    url: current.to_string(),
                });
            }

            let content_encoding = response
                .headers()
                .get(CONTENT_ENCODING)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let (body, truncated) = self.read_capped(&current, response).await?;

            return Ok(FetchResult {
                final_url: current,
                status: status.as_u16(),
                content_encoding,
                body,
                truncated,
            });
        }
    }

    fn max_response_bytes(&self) -> usize {
        self.config.max_response_bytes
    }
}
