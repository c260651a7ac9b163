//! Authentication module
//!
//! Supports: OAuth 1.0a (HMAC-SHA1), owner-only OAuth 2 bearer tokens
//!
//! A `Signer` turns method + URL + parameters into an `Authorization`
//! header value. Cookie-based password login is handled by the session
//! module instead, since it needs round trips.

mod signer;
mod types;

pub use signer::{
    canonical_url, oauth_encode, signature_base_string, signer_from_config, BearerSigner,
    OAuth1Signer, Signer,
};
pub use types::AuthSettings;
