// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use super::acceptance::{PageView, Verdict};
use super::config::RetrievalConfig;
use super::error::RetrievalError;
use super::strategy::{fallback_chain, Strategy};
use crate::blocklist::Blocklist;
use crate::fetch::PageFetcher;
use crate::guard::TargetUrl;
use crate::rewrite::{rewrite, Document};

/// Runs strategies against a validated target until one is accepted
pub struct RetrievalOrchestrator {
    fetcher: Arc<dyn PageFetcher>,
    blocklist: Arc<Blocklist>,
    direct: Strategy,
    chain: Vec<Strategy>,
}

impl RetrievalOrchestrator {
    pub fn new(
        config: &RetrievalConfig,
        fetcher: Arc<dyn PageFetcher>,
        blocklist: Arc<Blocklist>,
    ) -> Self {
        Self::with_strategies(
            fetcher,
            blocklist,
            Strategy::direct(config),
            fallback_chain(config),
        )
    }

    /// Build with an explicit direct strategy and fallback chain
    pub fn with_strategies(
        fetcher: Arc<dyn PageFetcher>,
        blocklist: Arc<Blocklist>,
        direct: Strategy,
        chain: Vec<Strategy>,
    ) -> Self {
        Self {
            fetcher,
            blocklist,
            direct,
            chain,
        }
    }

    pub fn blocklist(&self) -> &Blocklist {
        &self.blocklist
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.chain
    }

    /// Retrieve a target, consulting the blocklist for the strategy set
    pub async fn retrieve(&self, target: &TargetUrl) -> Result<String, RetrievalError> {
        let flagged = self.blocklist.is_flagged(target);
        self.retrieve_with(target, flagged).await
    }

    /// Retrieve a target with an explicit flagged decision
    ///
    /// Unflagged targets get exactly one direct attempt whose error is
    /// returned unchanged. Flagged targets walk the fallback chain in order
    /// and stop at the first accepted page.
    pub async fn retrieve_with(
        &self,
        target: &TargetUrl,
        flagged: bool,
    ) -> Result<String, RetrievalError> {
        if !flagged {
            debug!("Direct fetch for {}", target);
            return self.attempt(&self.direct, target).await;
        }

        info!("Flagged site, trying fallback chain for {}", target);
        for strategy in &self.chain {
            debug!("Trying {} for {}", strategy.name, target);
            match self.attempt(strategy, target).await {
                Ok(html) => {
                    info!("Retrieved {} via {}", target, strategy.name);
                    return Ok(html);
                }
                Err(e) if e.is_fatal() => {
                    warn!("{} aborted the chain for {}: {}", strategy.name, target, e);
                    return Err(e);
                }
                Err(e) => warn!("{} failed for {}: {}", strategy.name, target, e),
            }
        }

        warn!("All bypass methods failed for {}", target);
        Err(RetrievalError::AllStrategiesFailed)
    }

    /// Run one strategy; prefixed strategies try each endpoint in turn
    async fn attempt(
        &self,
        strategy: &Strategy,
        target: &TargetUrl,
    ) -> Result<String, RetrievalError> {
        let mut last_error = None;

        for request in strategy.requests(target) {
            let result = match self.fetcher.fetch(&request).await {
                Ok(result) => result,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    if e.status() == Some(429) {
                        warn!("Rate limited by {}", request.url);
                    } else {
                        debug!("{} request to {} failed: {}", strategy.name, request.url, e);
                    }
                    last_error = Some(e.into());
                    continue;
                }
            };

            let body = result.into_decoded(self.fetcher.max_response_bytes());
            match process_page(&body, target.url(), strategy) {
                Ok(html) => return Ok(html),
                Err(e) => {
                    debug!("{} response from {} not used: {}", strategy.name, request.url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(RetrievalError::Rejected {
            strategy: strategy.name,
            reason: "no endpoints configured".to_string(),
        }))
    }
}

/// Parse, rewrite and judge one response body
///
/// Kept synchronous: the parsed tree never lives across an await point.
pub fn process_page(
    body: &[u8],
    base: &Url,
    strategy: &Strategy,
) -> Result<String, RetrievalError> {
    let mut document = Document::parse(body)?;
    rewrite(&mut document, base);

    let text = document.text();
    let html = document.to_html();
    match strategy.acceptance.evaluate(&PageView {
        text: &text,
        html: &html,
    }) {
        Verdict::Accept => Ok(html),
        Verdict::Reject(reason) => Err(RetrievalError::Rejected {
            strategy: strategy.name,
            reason,
        }),
    }
}
