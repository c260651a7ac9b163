//! Common types used throughout wikiapi
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method used against the API endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
}

impl Method {
    /// Uppercase verb as used in signature base strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
        }
    }
}

// ============================================================================
// Assertion Mode
// ============================================================================

/// Session precondition enforced by the server and re-checked by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssertMode {
    /// No assertion
    #[default]
    None,
    /// Must be logged in
    User,
    /// Must hold the bot right
    Bot,
}

impl AssertMode {
    /// Value for the `assert` request parameter
    pub fn param_value(&self) -> Option<&'static str> {
        match self {
            AssertMode::None => None,
            AssertMode::User => Some("user"),
            AssertMode::Bot => Some("bot"),
        }
    }

    /// Whether any assertion is required
    pub fn is_required(&self) -> bool {
        !matches!(self, AssertMode::None)
    }
}

impl fmt::Display for AssertMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param_value().unwrap_or("none"))
    }
}

impl std::str::FromStr for AssertMode {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "" => Ok(AssertMode::None),
            "user" => Ok(AssertMode::User),
            "bot" => Ok(AssertMode::Bot),
            other => Err(crate::error::Error::bad_param(
                "assert",
                format!("expected none, user or bot, got '{other}'"),
            )),
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Backoff strategy between executor attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    #[default]
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    Exponential,
}

// ============================================================================
// Helper Traits
// ============================================================================

/// Extension trait for treating empty strings as absent
pub trait NoneIfEmpty {
    /// Convert to `None` if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl NoneIfEmpty for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl NoneIfEmpty for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}
