// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Content-Encoding handling for fetched bodies

use std::io::{self, Read};

use flate2::read::GzDecoder;

const BROTLI_BUFFER_SIZE: usize = 4096;

/// Encodings the fetcher knows how to undo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Gzip,
    Brotli,
    /// Anything else, including a missing header; bytes are used as-is
    Passthrough,
}

impl BodyEncoding {
    /// Interpret a `Content-Encoding` header value
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("gzip") | Some("x-gzip") => Self::Gzip,
            Some("br") => Self::Brotli,
            _ => Self::Passthrough,
        }
    }
}

/// Decode a body according to its encoding
///
/// Decoded output is capped at `limit` bytes, the same ceiling applied to
/// the raw body. Errors are returned to the caller, which decides whether
/// to fall back to the raw bytes.
pub fn decode_body(body: &[u8], encoding: BodyEncoding, limit: usize) -> io::Result<Vec<u8>> {
    let limit = limit as u64;
    let mut decoded = Vec::new();
    match encoding {
        BodyEncoding::Gzip => {
            GzDecoder::new(body).take(limit).read_to_end(&mut decoded)?;
        }
        BodyEncoding::Brotli => {
            brotli::Decompressor::new(body, BROTLI_BUFFER_SIZE)
                .take(limit)
                .read_to_end(&mut decoded)?;
        }
        BodyEncoding::Passthrough => return Ok(body.to_vec()),
    }
    Ok(decoded)
}
