//! Request signer implementations

use super::types::AuthSettings;
use crate::error::{Error, Result};
use crate::types::Method;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;
use std::sync::Arc;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay literal, everything else is escaped
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Produces an `Authorization` header value for a request
pub trait Signer: Send + Sync {
    /// Sign a request
    fn sign(&self, method: Method, url: &str, params: &[(String, String)]) -> Result<String>;
}

// ============================================================================
// OAuth 1.0a
// ============================================================================

/// OAuth 1.0a HMAC-SHA1 signer
#[derive(Debug, Clone)]
pub struct OAuth1Signer {
    consumer_key: String,
    consumer_secret: String,
    token: String,
    token_secret: String,
}

impl OAuth1Signer {
    /// Create a new signer
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: token.into(),
            token_secret: token_secret.into(),
        }
    }

    /// Sign with an explicit nonce and timestamp
    pub fn sign_with(
        &self,
        method: Method,
        url: &str,
        params: &[(String, String)],
        nonce: &str,
        timestamp: i64,
    ) -> Result<String> {
        let mut oauth = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.clone()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), "HMAC-SHA1".to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), self.token.clone()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ];

        let mut all_params: Vec<(String, String)> = params.to_vec();
        all_params.extend(oauth.iter().cloned());
        let base = signature_base_string(method, url, &all_params)?;
        let signature = self.hmac(&base)?;
        oauth.push(("oauth_signature".to_string(), signature));
        oauth.sort();

        let fields: Vec<String> = oauth
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", oauth_encode(k), oauth_encode(v)))
            .collect();
        Ok(format!("OAuth {}", fields.join(", ")))
    }

    fn hmac(&self, base: &str) -> Result<String> {
        let key = format!(
            "{}&{}",
            oauth_encode(&self.consumer_secret),
            oauth_encode(&self.token_secret)
        );
        let mut mac =
            HmacSha1::new_from_slice(key.as_bytes()).map_err(|e| Error::signing(e.to_string()))?;
        mac.update(base.as_bytes());
        Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl Signer for OAuth1Signer {
    fn sign(&self, method: Method, url: &str, params: &[(String, String)]) -> Result<String> {
        let nonce = uuid::Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp();
        self.sign_with(method, url, params, &nonce, timestamp)
    }
}

// ============================================================================
// Bearer
// ============================================================================

/// Static bearer token
#[derive(Debug, Clone)]
pub struct BearerSigner {
    token: String,
}

impl BearerSigner {
    /// Create a new bearer signer
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Signer for BearerSigner {
    fn sign(&self, _method: Method, _url: &str, _params: &[(String, String)]) -> Result<String> {
        Ok(format!("Bearer {}", self.token))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Build a signer from configuration, if signing is configured
pub fn signer_from_config(settings: &AuthSettings) -> Option<Arc<dyn Signer>> {
    match settings {
        AuthSettings::None => None,
        AuthSettings::Oauth1 {
            consumer_key,
            consumer_secret,
            access_token,
            access_secret,
        } => Some(Arc::new(OAuth1Signer::new(
            consumer_key,
            consumer_secret,
            access_token,
            access_secret,
        ))),
        AuthSettings::Bearer { token } => Some(Arc::new(BearerSigner::new(token))),
    }
}

/// Percent-encode per RFC 3986 as OAuth requires
pub fn oauth_encode(value: &str) -> String {
    utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Base string URI: scheme and host lowercased, default port dropped,
/// query and fragment removed
pub fn canonical_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::signing(format!("URL has no host: {url}")))?
        .to_ascii_lowercase();
    let port = parsed.port().map(|p| format!(":{p}")).unwrap_or_default();
    Ok(format!(
        "{}://{}{}{}",
        parsed.scheme(),
        host,
        port,
        parsed.path()
    ))
}

/// OAuth 1.0a signature base string
///
/// Query parameters embedded in `url` are folded into the parameter set.
pub fn signature_base_string(
    method: Method,
    url: &str,
    params: &[(String, String)],
) -> Result<String> {
    let base_url = canonical_url(url)?;
    let parsed = Url::parse(url)?;

    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (oauth_encode(k), oauth_encode(v)))
        .chain(
            parsed
                .query_pairs()
                .map(|(k, v)| (oauth_encode(&k), oauth_encode(&v))),
        )
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    Ok(format!(
        "{}&{}&{}",
        method.as_str(),
        oauth_encode(&base_url),
        oauth_encode(&param_string)
    ))
}
