// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Subresource Integrity (SRI) metadata
//!
//! Parses a request's `integrity` string and checks a response body
//! against it, the way a fetch with `integrity` set does.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// SRI hash algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SriAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl SriAlgorithm {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sha256" => Some(SriAlgorithm::Sha256),
            "sha384" => Some(SriAlgorithm::Sha384),
            "sha512" => Some(SriAlgorithm::Sha512),
            _ => None,
        }
    }

    fn digest(&self, body: &[u8]) -> Vec<u8> {
        match self {
            SriAlgorithm::Sha256 => Sha256::digest(body).to_vec(),
            SriAlgorithm::Sha384 => Sha384::digest(body).to_vec(),
            SriAlgorithm::Sha512 => Sha512::digest(body).to_vec(),
        }
    }
}

/// One `alg-digest` token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityEntry {
    pub algorithm: SriAlgorithm,
    /// Base64 or base64url digest, padding stripped
    pub digest: String,
}

/// Parsed integrity metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityMetadata {
    entries: Vec<IntegrityEntry>,
}

impl IntegrityMetadata {
    /// Parse whitespace separated `alg-digest[?options]` tokens
    ///
    /// Tokens with an unknown algorithm or no digest are skipped.
    pub fn parse(metadata: &str) -> Self {
        let entries = metadata
            .split_whitespace()
            .filter_map(|token| {
                let (algorithm, rest) = token.split_once('-')?;
                let algorithm = SriAlgorithm::parse(algorithm)?;
                let digest = rest.split('?').next().unwrap_or("").trim_end_matches('=');
                if digest.is_empty() {
                    return None;
                }
                Some(IntegrityEntry {
                    algorithm,
                    digest: digest.to_string(),
                })
            })
            .collect();

        Self { entries }
    }

    /// No usable entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries using the strongest algorithm present
    pub fn strongest(&self) -> Vec<&IntegrityEntry> {
        let Some(best) = self.entries.iter().map(|e| e.algorithm).max() else {
            return Vec::new();
        };
        self.entries.iter().filter(|e| e.algorithm == best).collect()
    }

    /// Check a body against the strongest entries
    ///
    /// Empty metadata always matches.
    pub fn matches(&self, body: &[u8]) -> bool {
        let strongest = self.strongest();
        if strongest.is_empty() {
            return true;
        }

        let algorithm = strongest[0].algorithm;
        let digest = algorithm.digest(body);
        let standard = STANDARD_NO_PAD.encode(&digest);
        let url_safe = URL_SAFE_NO_PAD.encode(&digest);

        strongest
            .iter()
            .any(|e| e.digest == standard || e.digest == url_safe)
    }
}
