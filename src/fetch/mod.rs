// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Guarded HTTP fetching
//!
//! ## Architecture
//!
//! ```text
//! FetchRequest → UrlGuard (per hop) → pinned reqwest client → capped body → FetchResult
//!                                                                              ↓
//!                                                              into_decoded (gzip/br)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let guard = Arc::new(UrlGuard::new());
//! let fetcher = SecureFetcher::new(guard, FetchConfig::from_env());
//!
//! let result = fetcher.fetch(&FetchRequest {
//!     url: "https://example.com/story".to_string(),
//!     headers: HeaderMap::new(),
//!     timeout: Duration::from_secs(10),
//! }).await?;
//! let bytes = result.into_decoded(fetcher.max_response_bytes());
//! ```

pub mod config;
pub mod decode;
pub mod fetcher;

pub use config::FetchConfig;
pub use decode::{decode_body, BodyEncoding};
pub use fetcher::{FetchError, FetchRequest, FetchResult, PageFetcher, SecureFetcher};
