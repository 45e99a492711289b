// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Acceptance checks deciding whether a retrieved page is the real article
//!
//! Each strategy carries one [`Acceptance`] implementation. Checks are pure
//! functions of the rewritten page, so they can be tested and swapped
//! without any network involvement.

/// Rewritten page handed to an acceptance check
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    /// Document text content
    pub text: &'a str,
    /// Serialized HTML
    pub html: &'a str,
}

impl PageView<'_> {
    /// Length of the text content in characters
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Outcome of an acceptance check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(String),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Trait for per-strategy page acceptance
pub trait Acceptance: Send + Sync {
    fn evaluate(&self, page: &PageView<'_>) -> Verdict;
}

/// Accepts any page that parsed
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl Acceptance for AcceptAll {
    fn evaluate(&self, _page: &PageView<'_>) -> Verdict {
        Verdict::Accept
    }
}

/// Text that only appears on an archive mirror's own search UI
const MIRROR_UI_PHRASES: &[&str] = &[
    "No results found",
    "Enter a URL to search",
    "This page shows only",
];

/// Markup of the mirror's search form
const MIRROR_SEARCH_FORM: &str = "id=\"search_form\"";

/// Short pages naming the mirror are its landing page, not an archive
const MIRROR_BRAND: &str = "archive.today";
const MIRROR_BRAND_MAX_CHARS: usize = 2000;

/// Rejects archive-mirror search, landing and empty-result pages
#[derive(Debug, Clone, Copy)]
pub struct ArchiveMirrorCheck {
    pub min_chars: usize,
}

impl Acceptance for ArchiveMirrorCheck {
    fn evaluate(&self, page: &PageView<'_>) -> Verdict {
        if let Some(phrase) = MIRROR_UI_PHRASES.iter().find(|p| page.text.contains(*p)) {
            return Verdict::Reject(format!("mirror search page ('{}')", phrase));
        }
        if page.html.contains(MIRROR_SEARCH_FORM) {
            return Verdict::Reject("mirror search form".to_string());
        }

        let len = page.text_len();
        if page.text.contains(MIRROR_BRAND) && len < MIRROR_BRAND_MAX_CHARS {
            return Verdict::Reject("mirror landing page".to_string());
        }
        if len < self.min_chars {
            return Verdict::Reject(format!(
                "page too short ({} < {} chars)",
                len, self.min_chars
            ));
        }
        Verdict::Accept
    }
}

/// Placeholder and error text served by the unlocking proxy
const PROXY_ERROR_PHRASES: &[&str] = &["Cleaning Webpage", "You can talk 3x faster", "12ft.io"];

/// Rejects the unlocking proxy's interstitial and error pages
#[derive(Debug, Clone, Copy)]
pub struct UnlockProxyCheck {
    pub min_chars: usize,
}

impl Acceptance for UnlockProxyCheck {
    fn evaluate(&self, page: &PageView<'_>) -> Verdict {
        if let Some(phrase) = PROXY_ERROR_PHRASES.iter().find(|p| page.text.contains(*p)) {
            return Verdict::Reject(format!("proxy placeholder ('{}')", phrase));
        }

        let len = page.text_len();
        if len < self.min_chars {
            return Verdict::Reject(format!(
                "page too short ({} < {} chars)",
                len, self.min_chars
            ));
        }
        Verdict::Accept
    }
}
