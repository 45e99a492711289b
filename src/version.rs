// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Hidewall service

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-guarded-retrieval-2026-10-15";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-15";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "ssrf-guard",
    "dns-pinning",
    "guarded-redirects",
    "gzip-brotli-decoding",
    "archive-mirrors",
    "unlock-proxy",
    "web-archive",
    "search-referrer",
    "html-rewrite",
    "rate-limiting",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Hidewall {} ({})", VERSION_NUMBER, BUILD_DATE)
}
