//! Auth configuration types

use serde::{Deserialize, Serialize};

/// Request signing configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthSettings {
    /// No request signing
    #[default]
    None,

    /// OAuth 1.0a consumer with an access token
    Oauth1 {
        /// Consumer key
        consumer_key: String,
        /// Consumer secret
        consumer_secret: String,
        /// Access token
        access_token: String,
        /// Access token secret
        access_secret: String,
    },

    /// Owner-only OAuth 2 access token
    Bearer {
        /// The bearer token
        token: String,
    },
}

impl AuthSettings {
    /// Whether requests are signed
    pub fn is_configured(&self) -> bool {
        !matches!(self, AuthSettings::None)
    }
}
