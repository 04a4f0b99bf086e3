// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Practice-set selector grammar.
//!
//! Parses free text like `"1-10, 1,7,8, 2-5, 9, 12-14"` into an ordered,
//! deduplicated list of 0-based verse indices. Tokens are comma-separated
//! bare positive integers or `A-B` ranges; range bounds are
//! order-independent. One malformed token fails the whole parse and the
//! caller's previous set state stays untouched.

use std::collections::HashSet;

use thiserror::Error;

/// Selector parse failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetSpecError {
    /// A token matched neither a bare integer nor an `A-B` range
    #[error("invalid practice-set token: '{0}'")]
    InvalidToken(String),
}

/// Parse a practice-set selector into 0-based catalog indices.
///
/// Values outside `[1, max_n]` are dropped after expansion; duplicates
/// keep their first occurrence. Empty or whitespace-only input yields an
/// empty list, which callers interpret as "set inactive".
pub fn parse_practice_set(text: &str, max_n: usize) -> Result<Vec<usize>, SetSpecError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen: HashSet<u64> = HashSet::new();
    let mut indices = Vec::new();
    let max_n = max_n as u64;

    for token in text.split(',') {
        let token = token.trim();
        let (lo, hi) = parse_token(token)?;

        // Clamp the expansion bounds instead of filtering afterwards;
        // same result, and a token like "1-99999999" stays cheap
        let lo = lo.max(1);
        let hi = hi.min(max_n);
        if lo > hi {
            continue;
        }
        for value in lo..=hi {
            if seen.insert(value) {
                indices.push((value - 1) as usize);
            }
        }
    }

    Ok(indices)
}

/// Parse one token into an inclusive `(lo, hi)` value range
fn parse_token(token: &str) -> Result<(u64, u64), SetSpecError> {
    let invalid = || SetSpecError::InvalidToken(token.to_string());

    if let Some((a, b)) = token.split_once('-') {
        let a: u64 = a.trim().parse().map_err(|_| invalid())?;
        let b: u64 = b.trim().parse().map_err(|_| invalid())?;
        Ok((a.min(b), a.max(b)))
    } else {
        let value: u64 = token.parse().map_err(|_| invalid())?;
        Ok((value, value))
    }
}
