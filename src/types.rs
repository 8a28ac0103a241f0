// src/types.rs
//! Strongly-typed identifiers used across the sync engine.
//!
//! Notion object ids arrive in several formats (bare 32-hex, hyphenated
//! UUID, full browser URL); `NotionId` normalizes all of them so that a
//! configured database id compares equal to the `parent.database_id` the
//! API reports. `ArticleId` is the local, permalink-stable identifier a
//! remote page is assigned on first sync.

use crate::error::AppError;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized Notion object id (page, database, or block).
///
/// Stored as the compact 32-character lowercase hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotionId(String);

impl NotionId {
    /// Parses user-supplied input into a normalized id.
    ///
    /// Accepts the bare 32-hex form, the hyphenated UUID form, and a full
    /// Notion URL pasted from the browser (the id is the trailing hex run
    /// of the last path segment).
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let mut candidate = input.trim();

        if candidate.starts_with("http://") || candidate.starts_with("https://") {
            candidate = candidate.split(['?', '#']).next().unwrap_or(candidate);
            candidate = candidate.rsplit('/').next().unwrap_or(candidate);
            // Page URLs embed the id after the slugified title: Some-Title-<32hex>
            if let Some(idx) = candidate.rfind('-') {
                if candidate.len() - idx - 1 == 32 {
                    candidate = &candidate[idx + 1..];
                }
            }
        }

        let compact: String = candidate
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        if compact.len() != 32 || !compact.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AppError::InvalidId(input.to_string()));
        }

        Ok(Self(compact))
    }

    /// Returns the compact 32-hex form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the hyphenated 8-4-4-4-12 form the API endpoints expect.
    pub fn as_hyphenated(&self) -> String {
        let v = &self.0;
        format!(
            "{}-{}-{}-{}-{}",
            &v[0..8],
            &v[8..12],
            &v[12..16],
            &v[16..20],
            &v[20..32]
        )
    }
}

impl fmt::Display for NotionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for NotionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NotionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Wire values are trusted; normalize without rejecting so an odd id
        // in an API response cannot fail the whole deserialization.
        let value = String::deserialize(deserializer)?;
        let compact = value
            .chars()
            .filter(|c| *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Ok(Self(compact))
    }
}

/// The locally-assigned article identifier: the Markdown file's base name.
///
/// Once assigned to a remote page the id never changes across updates, so
/// permalinks stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

impl ArticleId {
    /// Generates a fresh id: millisecond timestamp plus a random base-36
    /// suffix, so two pages first synced in the same run cannot collide.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| ID_SUFFIX_ALPHABET[rng.random_range(0..ID_SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self(format!("{}-{}", Utc::now().timestamp_millis(), suffix))
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A filesystem-safe rendering for image filenames: anything outside
    /// `[A-Za-z0-9_-]` is dropped.
    pub fn sanitized(&self) -> String {
        self.0
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect()
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The Notion integration token, validated non-empty at configuration time.
#[derive(Debug, Clone)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(value: impl Into<String>) -> Result<Self, AppError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::MissingConfiguration(
                "API token must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
