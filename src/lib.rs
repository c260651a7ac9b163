// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # wikiapi
//!
//! A continuation-following, retrying, assertion-checked request executor
//! for the MediaWiki action API.
//!
//! ## Features
//!
//! - **Request executor**: correlation ids, bounded retries, token refresh
//! - **Assertions**: `assert=user|bot` with automatic re-login on failure
//! - **503 disambiguation**: checks whether a mutation already landed
//! - **List paging**: follows `continue` and legacy `query-continue` cursors
//! - **Resumable fetches**: opaque continuation tokens, persisted on request
//! - **Auth**: password login with cookies, OAuth 1.0a, OAuth 2 bearer
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wikiapi::{
//!     ContinuationToken, HttpTransport, ListFetcher, ListLimit, ListQuery, RequestExecutor,
//!     RequestSpec, Result,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let api = "https://en.wikipedia.org/w/api.php";
//!     let executor = RequestExecutor::new(api, Arc::new(HttpTransport::new()?));
//!     let fetcher = ListFetcher::new(Arc::new(executor));
//!
//!     let query = ListQuery::new(
//!         "rc",
//!         RequestSpec::new().with("action", "query").with("list", "recentchanges"),
//!     )
//!     .with_limit(ListLimit::Count(50));
//!
//!     let page = fetcher.fetch(&query, &ContinuationToken::new()).await?;
//!     println!("{} items, more: {}", page.items.len(), page.has_more());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         ListFetcher                             │
//! │  fetch(query, resume) → (items, resume)    pages() → Stream     │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       RequestExecutor                           │
//! │  requestid · retries · badtoken · assert recovery · 503 check   │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │ Session  │  Signer   │   Transport   │  Decoder  │   State     │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Login    │ OAuth 1.0a│ GET/POST      │ JSON      │ Resume file │
//! │ Tokens   │ Bearer    │ Cookies       │           │             │
//! │ Re-login │           │ Rate Limit    │           │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Request parameters and normalization
pub mod params;

/// Physical HTTP transport and rate limiting
pub mod http;

/// Response decoding
pub mod decode;

/// Request signing
pub mod auth;

/// Login state and action tokens
pub mod session;

/// Retrying request executor
pub mod executor;

/// Continuation-following list fetcher
pub mod pagination;

/// Resume token persistence
pub mod state;

/// Session configuration
pub mod config;

/// Command-line interface
pub mod cli;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::SessionConfig;
pub use decode::ResponseEnvelope;
pub use executor::{ExecuteOptions, MutationIntent, RequestExecutor};
pub use http::{HttpTransport, Transport};
pub use pagination::{ContinuationToken, ListFetcher, ListLimit, ListPage, ListQuery};
pub use params::{ParamValue, RequestSpec};
pub use session::{SessionState, WikiSession};
pub use state::ResumeStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
