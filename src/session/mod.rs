//! Session module
//!
//! Long-lived login state shared by every request: who we are, whether we
//! are logged in, and the cached action tokens (csrf, patrol, ...).
//!
//! The executor only sees the `SessionState` trait. `WikiSession` is the
//! concrete implementation that logs in against the API itself.

mod types;
mod wiki_session;

pub use types::{ActionTokens, Credentials, SessionState, TOKEN_KINDS};
pub use wiki_session::WikiSession;
