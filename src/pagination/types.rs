//! Pagination types
//!
//! Defines the list query, its limit, the opaque continuation token and
//! the page returned by a fetch.

use crate::error::{Error, Result};
use crate::params::RequestSpec;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Page size value asking the server for its protocol maximum
pub const PROTOCOL_MAX: &str = "max";

/// Cursor suffixes understood in continuation blocks, in priority order
pub const CURSOR_SUFFIXES: [&str; 4] = ["continue", "offset", "start", "from"];

/// Bare marker accompanying cursors in the current continuation protocol
pub const CONTINUE_MARKER: &str = "continue";

/// Cursor parameter names for a code prefix, in priority order
pub fn cursor_keys(code: &str) -> [String; 4] {
    CURSOR_SUFFIXES.map(|suffix| format!("{code}{suffix}"))
}

// ============================================================================
// List Limit
// ============================================================================

/// Client-side cap on the number of items a fetch returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListLimit {
    /// No cap: follow continuations until the server runs out
    #[default]
    All,
    /// One round trip at the server's maximum page size
    ProtocolMax,
    /// At most this many items
    Count(u64),
}

impl ListLimit {
    /// Interpret a caller-supplied limit
    ///
    /// `None` means no cap and `-1` means protocol maximum. Zero and other
    /// negative values are rejected.
    pub fn from_option(limit: Option<i64>) -> Result<Self> {
        match limit {
            None => Ok(Self::All),
            Some(-1) => Ok(Self::ProtocolMax),
            Some(n) if n > 0 => Ok(Self::Count(n as u64)),
            Some(n) => Err(Error::bad_param(
                "limit",
                format!("expected a positive integer or -1, got {n}"),
            )),
        }
    }

    /// Value of `<code>limit` for the next page, given items already fetched
    pub fn page_size(&self, fetched: usize) -> String {
        match self {
            Self::All | Self::ProtocolMax => PROTOCOL_MAX.to_string(),
            Self::Count(n) => n.saturating_sub(fetched as u64).max(1).to_string(),
        }
    }

    /// Hard cap on returned items, if any
    pub fn cap(&self) -> Option<usize> {
        match self {
            Self::Count(n) => Some(*n as usize),
            _ => None,
        }
    }
}

impl std::str::FromStr for ListLimit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parsed = s.trim().parse::<i64>().map_err(|_| {
            Error::bad_param("limit", format!("expected an integer, got '{s}'"))
        })?;
        Self::from_option(Some(parsed))
    }
}

impl fmt::Display for ListLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::ProtocolMax => f.write_str(PROTOCOL_MAX),
            Self::Count(n) => write!(f, "{n}"),
        }
    }
}

// ============================================================================
// List Query
// ============================================================================

/// A list-style query to page through
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Parameter prefix of the list module (`rc`, `ap`, `cm`, ...)
    pub code: String,
    /// Client-side cap
    pub limit: ListLimit,
    /// Base request parameters
    pub params: RequestSpec,
    /// Key whose value replaces each item when present
    pub head_title: Option<String>,
}

impl ListQuery {
    /// Create an uncapped query
    pub fn new(code: impl Into<String>, params: RequestSpec) -> Self {
        Self {
            code: code.into(),
            params,
            ..Self::default()
        }
    }

    /// Set the limit
    #[must_use]
    pub fn with_limit(mut self, limit: ListLimit) -> Self {
        self.limit = limit;
        self
    }

    /// Set the list-head title
    #[must_use]
    pub fn with_head_title(mut self, key: impl Into<String>) -> Self {
        self.head_title = Some(key.into());
        self
    }

    /// Check the query before any round trip
    pub fn validate(&self) -> Result<()> {
        if self.code.trim().is_empty() {
            return Err(Error::missing_param("code"));
        }
        Ok(())
    }
}

// ============================================================================
// Continuation Token
// ============================================================================

/// Opaque resume state: parameter name to cursor value
///
/// Empty means there is nothing left to resume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(BTreeMap<String, String>);

impl ContinuationToken {
    /// Create an empty token
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Whether the token is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Cursor value by parameter name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set a cursor value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

// ============================================================================
// List Page
// ============================================================================

/// Items returned by a fetch (or one page of it) and the state to resume from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    /// Flattened items
    pub items: Vec<JsonValue>,
    /// Where a later fetch should continue
    pub resume: ContinuationToken,
}

impl ListPage {
    /// Whether the server has more to give
    pub fn has_more(&self) -> bool {
        !self.resume.is_empty()
    }
}
