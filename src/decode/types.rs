//! Decoder types and traits
//!
//! Defines the decoded response envelope and the decoder abstraction.

use crate::error::Result;
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Reserved key carrying the echoed correlation id
pub const REQUEST_ID_KEY: &str = "requestid";

/// Reserved key carrying the serving node name
pub const SERVED_BY_KEY: &str = "servedby";

/// Error object reported by the remote API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteErrorInfo {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable description
    #[serde(default)]
    pub info: String,
}

/// Decoded result of one physical call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseEnvelope {
    body: JsonObject,
}

impl ResponseEnvelope {
    /// Wrap a decoded object
    pub fn new(body: JsonObject) -> Self {
        Self { body }
    }

    /// Wrap a JSON value, returning `None` unless it is an object
    pub fn from_value(value: JsonValue) -> Option<Self> {
        match value {
            JsonValue::Object(body) => Some(Self { body }),
            _ => None,
        }
    }

    /// Echoed correlation id, if any
    ///
    /// Numbers are accepted as well as strings since some servers echo
    /// numeric ids unquoted.
    pub fn request_id(&self) -> Option<String> {
        match self.body.get(REQUEST_ID_KEY)? {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Name of the node that served the request, if any
    pub fn served_by(&self) -> Option<&str> {
        self.body.get(SERVED_BY_KEY).and_then(JsonValue::as_str)
    }

    /// Whether the envelope carries either reserved liveness marker
    pub fn is_responsive(&self) -> bool {
        self.body.contains_key(REQUEST_ID_KEY) || self.body.contains_key(SERVED_BY_KEY)
    }

    /// The `error` object, if the server reported one
    pub fn error(&self) -> Option<RemoteErrorInfo> {
        let error = self.body.get("error")?;
        let code = error.get("code")?.as_str()?.to_string();
        let info = error
            .get("info")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        Some(RemoteErrorInfo { code, info })
    }

    /// Shortcut for the error code
    pub fn error_code(&self) -> Option<String> {
        self.error().map(|e| e.code)
    }

    /// Top-level value by key
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.body.get(key)
    }

    /// Insert or replace a top-level value
    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) {
        self.body.insert(key.into(), value);
    }

    /// Borrow the whole body
    pub fn as_object(&self) -> &JsonObject {
        &self.body
    }

    /// Convert into a plain JSON value
    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.body)
    }
}

/// Decodes raw response bodies
pub trait ResponseDecoder: Send + Sync {
    /// Value sent as the `format` request parameter
    fn format(&self) -> &'static str;

    /// Decode a body into an envelope
    fn decode(&self, body: &[u8]) -> Result<ResponseEnvelope>;
}
