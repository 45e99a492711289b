// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for upstream fetching
//!
//! Defines the redirect, size and connection limits applied to every fetch.

use std::env;
use std::time::Duration;

/// Configuration for the secure fetcher
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum bytes kept from a response body (default: 10 MiB)
    pub max_response_bytes: usize,
    /// Maximum redirects followed per fetch (default: 10)
    pub max_redirects: u32,
    /// TCP/TLS connect timeout in seconds (default: 5)
    pub connect_timeout_secs: u64,
}

impl FetchConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_response_bytes: env::var("FETCH_MAX_RESPONSE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_response_bytes),
            max_redirects: env::var("FETCH_MAX_REDIRECTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_redirects),
            connect_timeout_secs: env::var("FETCH_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.connect_timeout_secs),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_response_bytes == 0 {
            return Err("max_response_bytes must be at least 1".to_string());
        }
        if self.connect_timeout_secs == 0 {
            return Err("connect_timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_response_bytes: 10 * 1024 * 1024,
            max_redirects: 10,
            connect_timeout_secs: 5,
        }
    }
}
