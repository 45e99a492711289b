// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Flagged-site table
//!
//! Loaded once at startup and shared read-only afterwards. A flagged target
//! gets the full fallback chain; everything else is fetched once directly.

use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};
use url::Url;

use crate::guard::TargetUrl;

/// How blocklist entries are compared against a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Entry appears anywhere in the query-stripped URL
    #[default]
    Substring,
    /// Entry equals the target host or is a parent domain of it
    Host,
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "host" => Ok(Self::Host),
            other => Err(format!(
                "unknown blocklist match mode '{}', expected 'substring' or 'host'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Blocklist {
    entries: Vec<String>,
    mode: MatchMode,
}

impl Blocklist {
    pub fn new<I, S>(entries: I, mode: MatchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(Into::into)
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .map(|e| match mode {
                MatchMode::Substring => e,
                MatchMode::Host => e.to_ascii_lowercase(),
            })
            .collect();
        Self { entries, mode }
    }

    /// Parse file contents: one entry per line, blanks and `#` comments skipped
    pub fn parse(contents: &str, mode: MatchMode) -> Self {
        Self::new(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.starts_with('#')),
            mode,
        )
    }

    /// Load a blocklist file
    ///
    /// A missing file is not an error: no site is flagged.
    pub fn load(path: &Path, mode: MatchMode) -> io::Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let list = Self::parse(&contents, mode);
                info!(
                    "Loaded {} flagged sites from {} ({:?} matching)",
                    list.len(),
                    path.display(),
                    mode
                );
                Ok(list)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    "Blocklist {} not found, no sites will be treated as flagged",
                    path.display()
                );
                Ok(Self::new(Vec::<String>::new(), mode))
            }
            Err(e) => Err(e),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Whether a validated target should get the fallback chain
    pub fn is_flagged(&self, target: &TargetUrl) -> bool {
        self.matches(&target.without_query())
    }

    /// Match a query-stripped URL string against the table
    pub fn matches(&self, clean_url: &str) -> bool {
        match self.mode {
            MatchMode::Substring => self.entries.iter().any(|e| clean_url.contains(e.as_str())),
            MatchMode::Host => {
                let Some(host) = Url::parse(clean_url)
                    .ok()
                    .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
                else {
                    return false;
                };
                self.entries.iter().any(|entry| {
                    host == *entry
                        || (host.len() > entry.len()
                            && host.ends_with(entry.as_str())
                            && host.as_bytes()[host.len() - entry.len() - 1] == b'.')
                })
            }
        }
    }
}
