// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Reference resolution for resource attributes

use url::Url;

/// Whether a reference is already treated as absolute
///
/// Anything starting with `http` (so both `http:` and `https:`) is left alone.
pub fn is_absolute(reference: &str) -> bool {
    reference.starts_with("http")
}

/// Resolve a reference against a base URL
///
/// References that cannot be resolved are returned unchanged.
pub fn resolve_reference(base: &Url, reference: &str) -> String {
    match base.join(reference.trim()) {
        Ok(resolved) => resolved.into(),
        Err(_) => reference.to_string(),
    }
}

/// Resolve every relative candidate URL in a `srcset` value
///
/// Width/density descriptors are kept as they are.
pub fn resolve_srcset(base: &Url, srcset: &str) -> String {
    srcset
        .split(',')
        .filter_map(|candidate| {
            let mut parts = candidate.split_whitespace();
            let url = parts.next()?;
            let url = if is_absolute(url) {
                url.to_string()
            } else {
                resolve_reference(base, url)
            };
            let descriptors: Vec<&str> = parts.collect();
            if descriptors.is_empty() {
                Some(url)
            } else {
                Some(format!("{} {}", url, descriptors.join(" ")))
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// First candidate URL of a `srcset` list
pub fn first_srcset_candidate(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .next()
        .and_then(|candidate| candidate.split_whitespace().next())
}

/// Whether every candidate in a `srcset` is already absolute
pub fn srcset_is_absolute(srcset: &str) -> bool {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .all(is_absolute)
}
