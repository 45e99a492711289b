// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Aggregates server, blocklist, fetch and retrieval settings. Every value
//! has a default and can be overridden from the environment (and a `.env`
//! file loaded by the binary).

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::blocklist::MatchMode;
use crate::fetch::FetchConfig;
use crate::retrieval::RetrievalConfig;

/// HTTP boundary settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0)
    pub host: IpAddr,
    /// Bind port (default: 80)
    pub port: u16,
    /// Requests per minute allowed per client address (default: 10)
    pub rate_limit_per_minute: u32,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Page served at `/`
    pub index_template: PathBuf,
    /// Script served at `/service-worker.js`
    pub service_worker: PathBuf,
    /// Upper bound on handling one request, fallback chain included (default: 120)
    pub request_timeout_secs: u64,
    /// How long in-flight requests may drain after a shutdown signal (default: 30)
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 80,
            rate_limit_per_minute: 10,
            static_dir: PathBuf::from("static"),
            index_template: PathBuf::from("templates/index.html"),
            service_worker: PathBuf::from("service-worker.js"),
            request_timeout_secs: 120,
            shutdown_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub blocklist_path: PathBuf,
    pub blocklist_match: MatchMode,
    pub fetch: FetchConfig,
    pub retrieval: RetrievalConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let server_defaults = ServerConfig::default();
        let server = ServerConfig {
            host: env::var("HOST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(server_defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(server_defaults.port),
            rate_limit_per_minute: env::var("RATE_LIMIT_PER_MINUTE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(server_defaults.rate_limit_per_minute),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(server_defaults.static_dir),
            index_template: env::var("INDEX_TEMPLATE")
                .map(PathBuf::from)
                .unwrap_or(server_defaults.index_template),
            service_worker: env::var("SERVICE_WORKER")
                .map(PathBuf::from)
                .unwrap_or(server_defaults.service_worker),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(server_defaults.request_timeout_secs),
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(server_defaults.shutdown_timeout_secs),
        };

        Self {
            server,
            blocklist_path: env::var("BLOCKLIST_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_blocklist_path()),
            blocklist_match: env::var("BLOCKLIST_MATCH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            fetch: FetchConfig::from_env(),
            retrieval: RetrievalConfig::from_env(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.server.rate_limit_per_minute == 0 {
            return Err("rate_limit_per_minute must be at least 1".to_string());
        }
        if self.server.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        self.fetch.validate().map_err(|e| format!("fetch: {}", e))?;
        self.retrieval
            .validate()
            .map_err(|e| format!("retrieval: {}", e))?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            blocklist_path: default_blocklist_path(),
            blocklist_match: MatchMode::default(),
            fetch: FetchConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

fn default_blocklist_path() -> PathBuf {
    PathBuf::from("blocked_sites.txt")
}
