// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

use crate::fetch::FetchError;
use crate::guard::ValidationError;
use crate::rewrite::ParseError;

#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The page arrived but its content failed the strategy's check
    #[error("{strategy} result rejected: {reason}")]
    Rejected {
        strategy: &'static str,
        reason: String,
    },

    /// Every fallback strategy for a flagged site was exhausted
    #[error("all bypass methods failed")]
    AllStrategiesFailed,
}

impl RetrievalError {
    /// Errors that stop a fallback chain instead of advancing it
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Fetch(e) => e.is_fatal(),
            _ => false,
        }
    }
}
