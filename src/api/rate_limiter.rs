// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-client rate limiting

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovRateLimiter};
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::errors::ApiError;
use super::http_server::AppState;

/// How often idle client entries are dropped
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(5 * 60);

type KeyedLimiter = GovRateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Rate limiter keyed by client address
pub struct ClientRateLimiter {
    limiter: KeyedLimiter,
    requests_per_minute: u32,
}

impl ClientRateLimiter {
    /// Create a limiter allowing `requests_per_minute`, with the same burst
    pub fn new(requests_per_minute: u32) -> Self {
        let rpm = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: GovRateLimiter::keyed(Quota::per_minute(rpm)),
            requests_per_minute: rpm.get(),
        }
    }

    /// Check a request from `client`
    pub fn check(&self, client: &str) -> Result<(), ApiError> {
        self.limiter
            .check_key(&client.to_string())
            .map_err(|_| ApiError::RateLimitExceeded {
                retry_after: self.replenish_secs(),
            })
    }

    /// Seconds until one more request is allowed after the burst is spent
    fn replenish_secs(&self) -> u64 {
        60u64.div_ceil(u64::from(self.requests_per_minute))
    }

    /// Drop entries for clients whose quota has fully replenished
    pub fn prune(&self) {
        self.limiter.retain_recent();
        debug!("Rate limiter tracking {} clients", self.limiter.len());
    }

    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }

    /// Prune periodically for as long as the limiter is alive
    pub fn spawn_pruning(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let limiter = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match limiter.upgrade() {
                    Some(limiter) => limiter.prune(),
                    None => break,
                }
            }
        })
    }
}

/// Client identity used as the rate-limit key
///
/// First `X-Forwarded-For` hop, then `X-Real-IP`, then the peer address.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(first) = header("x-forwarded-for")
        .and_then(|xff| xff.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }
    if let Some(real_ip) = header("x-real-ip") {
        return real_ip.to_string();
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// axum middleware rejecting clients over their quota
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let client = client_key(request.headers(), peer);

    if let Err(e) = state.rate_limiter.check(&client) {
        warn!("Rate limit exceeded for {}", client);
        return e.into_response();
    }
    next.run(request).await
}
