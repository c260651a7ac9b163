//! Resume state types
//!
//! These types are serialized to JSON and persisted between runs.

use crate::pagination::ContinuationToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every saved query, keyed by caller-chosen name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeState {
    /// Saved queries
    #[serde(default)]
    pub queries: BTreeMap<String, SavedQuery>,
}

impl ResumeState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Token saved under `name`
    pub fn token(&self, name: &str) -> Option<&ContinuationToken> {
        self.queries.get(name).map(|q| &q.token)
    }

    /// Save a token under `name`
    ///
    /// An empty token means the query ran to completion; the entry is kept
    /// so the next run starts fresh instead of guessing.
    pub fn set_token(&mut self, name: &str, token: ContinuationToken) {
        self.queries.insert(name.to_string(), SavedQuery::new(token));
    }

    /// Drop the entry for `name`
    pub fn remove(&mut self, name: &str) -> Option<SavedQuery> {
        self.queries.remove(name)
    }
}

/// One saved continuation token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedQuery {
    /// Where to resume
    #[serde(default)]
    pub token: ContinuationToken,
    /// When the token was saved
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl SavedQuery {
    /// Stamp a token with the current time
    pub fn new(token: ContinuationToken) -> Self {
        Self {
            token,
            updated_at: Utc::now(),
        }
    }

    /// Whether the saved fetch had finished
    pub fn is_complete(&self) -> bool {
        self.token.is_empty()
    }
}
