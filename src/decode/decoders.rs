//! Decoder implementations

use super::types::{ResponseDecoder, ResponseEnvelope};
use crate::error::{Error, Result};
use serde_json::Value;

// ============================================================================
// JSON Decoder
// ============================================================================

/// Decoder for `format=json` responses
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl JsonDecoder {
    /// Create a new JSON decoder
    pub fn new() -> Self {
        Self
    }
}

impl ResponseDecoder for JsonDecoder {
    fn format(&self) -> &'static str {
        "json"
    }

    fn decode(&self, body: &[u8]) -> Result<ResponseEnvelope> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| Error::decode(format!("unserialization failed: {e}")))?;

        ResponseEnvelope::from_value(value)
            .ok_or_else(|| Error::decode("unserialization failed: top level is not an object"))
    }
}
