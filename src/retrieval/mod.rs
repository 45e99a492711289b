// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multi-strategy content retrieval
//!
//! ## Architecture
//!
//! ```text
//! TargetUrl ─► flagged? ──no──► direct (Twitterbot) ─► result or error
//!                 │
//!                yes
//!                 ▼
//!   archive mirrors ─► unlocking proxy ─► web archive ─► search referrer
//!          (first accepted page wins, otherwise "all bypass methods failed")
//! ```
//!
//! Every attempt goes through the same pipeline: [`PageFetcher`] →
//! decode → parse → rewrite → [`Acceptance`] check. Strategies run one at a
//! time; a later one starts only after the previous one has failed.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use hidewall::blocklist::Blocklist;
//! use hidewall::fetch::{FetchConfig, SecureFetcher};
//! use hidewall::guard::UrlGuard;
//! use hidewall::retrieval::{RetrievalConfig, RetrievalOrchestrator};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let guard = Arc::new(UrlGuard::new());
//! let fetcher = Arc::new(SecureFetcher::new(guard.clone(), FetchConfig::default()));
//! let orchestrator = RetrievalOrchestrator::new(
//!     &RetrievalConfig::default(),
//!     fetcher,
//!     Arc::new(Blocklist::default()),
//! );
//!
//! let target = guard.validate("https://news.example/story").await?;
//! let html = orchestrator.retrieve(&target).await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`PageFetcher`]: crate::fetch::PageFetcher

pub mod acceptance;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod strategy;

pub use acceptance::{AcceptAll, Acceptance, ArchiveMirrorCheck, PageView, UnlockProxyCheck, Verdict};
pub use config::RetrievalConfig;
pub use error::RetrievalError;
pub use orchestrator::{process_page, RetrievalOrchestrator};
pub use strategy::{
    fallback_chain, Endpoint, Strategy, BROWSER_USER_AGENT, GOOGLEBOT_USER_AGENT,
    TWITTERBOT_USER_AGENT,
};
