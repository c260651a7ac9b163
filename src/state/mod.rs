//! Resume state module
//!
//! Persists continuation tokens between runs so a list fetch can pick up
//! where the previous process stopped.
//!
//! # Overview
//!
//! The state module provides:
//! - `ResumeState` - named continuation tokens, serialized as JSON
//! - `ResumeStore` - file-backed persistence with atomic writes
//!
//! Tokens are stored verbatim; their contents are opaque to the store.

mod store;
mod types;

pub use store::ResumeStore;
pub use types::{ResumeState, SavedQuery};
