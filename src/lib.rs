// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod blocklist;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod guard;
pub mod retrieval;
pub mod rewrite;
pub mod version;

// Re-export commonly used types
pub use blocklist::{Blocklist, MatchMode};
pub use config::AppConfig;
pub use fetch::{FetchConfig, FetchError, PageFetcher, SecureFetcher};
pub use guard::{TargetUrl, UrlGuard, ValidationError};
pub use retrieval::{RetrievalConfig, RetrievalError, RetrievalOrchestrator};
pub use rewrite::{rewrite, Document};
