//! Session types and traits

use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token kinds requested on every refresh
pub const TOKEN_KINDS: &str = "csrf|watch|patrol|rollback|userrights|login|createaccount";

/// Password credentials used for (re)login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name (bot passwords use `Name@Label`)
    pub username: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Cached action tokens keyed by kind (`csrf`, `patrol`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionTokens {
    tokens: HashMap<String, String>,
}

impl ActionTokens {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `query.tokens` object of a token response
    ///
    /// Keys arrive as `<kind>token`; the suffix is stripped.
    pub fn from_response(body: &JsonValue) -> Self {
        let mut tokens = HashMap::new();
        if let Some(map) = body
            .get("query")
            .and_then(|q| q.get("tokens"))
            .and_then(JsonValue::as_object)
        {
            for (key, value) in map {
                if let Some(token) = value.as_str() {
                    let kind = key.strip_suffix("token").unwrap_or(key);
                    tokens.insert(kind.to_string(), token.to_string());
                }
            }
        }
        Self { tokens }
    }

    /// Get a token by kind
    pub fn get(&self, kind: &str) -> Option<&str> {
        self.tokens.get(kind).map(String::as_str)
    }

    /// Store a token
    pub fn insert(&mut self, kind: impl Into<String>, token: impl Into<String>) {
        self.tokens.insert(kind.into(), token.into());
    }

    /// Drop every cached token
    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Session state consumed by the request executor
///
/// Implementations must be safe to share between concurrent fetches.
#[async_trait]
pub trait SessionState: Send + Sync {
    /// Current action token of the given kind, fetching on a cache miss
    async fn token(&self, kind: &str) -> Result<Option<String>>;

    /// Force-refresh every cached action token
    async fn refresh_tokens(&self) -> Result<()>;

    /// Log in again from cached credentials and refresh tokens
    async fn reauthenticate(&self) -> Result<()>;

    /// Whether the session currently believes it is logged in
    async fn is_logged_in(&self) -> bool;

    /// Name of the logged-in account
    async fn username(&self) -> Option<String>;
}
